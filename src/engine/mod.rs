// ==========================================
// 食品工坊经营系统 - 引擎层
// ==========================================
// 职责: 实现成本核算业务规则,不拼 SQL
// 红线: Engine 不拼 SQL；所有预警判定必须可复现
// 组件依赖顺序: Ledger -> Compiler -> Detector -> Advisor
// ==========================================

pub mod advisor;
pub mod compiler;
pub mod cost_policy;
pub mod detector;
pub mod error;
pub mod ledger;
pub mod ledger_core;

// 重导出核心引擎
pub use advisor::{
    MarginPolicy, PriceEvaluation, PriceTierSuggestion, PricingAdvisor, PricingSuggestion,
};
pub use compiler::CostCompiler;
pub use cost_policy::{LaborOverheadPolicy, RateBasis, StandardCostPolicy};
pub use detector::ChangeDetector;
pub use error::{CostingError, CostingResult};
pub use ledger::CostLedger;
pub use ledger_core::LedgerCore;
