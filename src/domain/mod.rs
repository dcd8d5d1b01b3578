// ==========================================
// 食品工坊经营系统 - 领域模型层
// ==========================================
// 职责: 定义领域实体、类型、业务规则接口
// 红线: 不含数据访问逻辑,不含引擎逻辑
// ==========================================

pub mod alert;
pub mod costing;
pub mod ingredient;
pub mod recipe;
pub mod types;

// 重导出核心类型
pub use alert::{AffectedRecipe, CostChangeAlert, RecipeCostAlert};
pub use costing::{CostBreakdown, CostSnapshot, IngredientLine};
pub use ingredient::{Ingredient, PriceVolatility, PurchaseObservation};
pub use recipe::{Recipe, RecipeComponent};
pub use types::{
    AlertKind, AlertSeverity, ConsumptionReason, MarginHealth, PriceTier, PriceTrend,
    RecipeAlertKind,
};
