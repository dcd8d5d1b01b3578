// ==========================================
// 食品工坊经营系统 - 核心库
// ==========================================
// 技术栈: Rust + SQLite
// 系统定位: 经营决策支持 (成本核算与预警)
// 核心链路: 采购入账 -> WAC 更新 -> 配方成本编译 -> 快照对比预警 -> 定价建议
// ==========================================

// 初始化国际化系统
rust_i18n::i18n!("locales", fallback = "id");

// ==========================================
// 模块声明
// ==========================================

// 领域层 - 实体与类型
pub mod domain;

// 数据仓储层 - 数据访问
pub mod repository;

// 引擎层 - 成本核算业务规则
pub mod engine;

// 配置层 - 系统配置
pub mod config;

// 数据库基础设施（连接初始化/PRAGMA 统一/schema 初始化）
pub mod db;

// 日志系统
pub mod logging;

// 国际化
pub mod i18n;

// API 层 - 业务接口
pub mod api;

// 应用层 - 状态装配
pub mod app;

// ==========================================
// 重导出核心类型
// ==========================================

// 领域类型
pub use domain::types::{
    AlertKind, AlertSeverity, ConsumptionReason, MarginHealth, PriceTier, PriceTrend,
    RecipeAlertKind,
};

// 领域实体
pub use domain::{
    AffectedRecipe, CostBreakdown, CostChangeAlert, CostSnapshot, Ingredient, IngredientLine,
    PriceVolatility, PurchaseObservation, Recipe, RecipeComponent, RecipeCostAlert,
};

// 引擎
pub use engine::{
    ChangeDetector, CostCompiler, CostLedger, CostingError, CostingResult, LaborOverheadPolicy,
    MarginPolicy, PricingAdvisor, RateBasis, StandardCostPolicy,
};

// API
pub use api::CostingApi;

// ==========================================
// 常量定义
// ==========================================

// 系统版本
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

// 系统名称
pub const APP_NAME: &str = "食品工坊成本核算系统";

// 数据库版本
pub const DB_VERSION: &str = "v0.1";

// ==========================================
// 预编译检查
// ==========================================

// 确保编译时所有模块可见
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version() {
        assert!(!VERSION.is_empty());
    }
}
