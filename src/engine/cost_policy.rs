// ==========================================
// 食品工坊经营系统 - 人工/间接成本策略
// ==========================================
// 职责: 将配方费率字段解释为人工成本与间接成本
// 红线: 策略是显式接口,编译算法不内联任何费率算术
// 口径: 同一费率字段在不同经营模式下解释不同
//       （原料占比 / 每批固定额 / 每份固定额）
// ==========================================

use crate::domain::recipe::Recipe;
use serde::{Deserialize, Serialize};

// ==========================================
// Trait: LaborOverheadPolicy
// ==========================================
/// 人工/间接成本策略接口
///
/// 输入为原料成本合计与配方费率字段,输出为成本金额
pub trait LaborOverheadPolicy: Send + Sync {
    /// 计算人工成本
    fn labor_cost(&self, material_cost: f64, recipe: &Recipe) -> f64;

    /// 计算间接成本
    fn overhead_cost(&self, material_cost: f64, recipe: &Recipe) -> f64;
}

// ==========================================
// RateBasis - 费率解释口径
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RateBasis {
    FractionOfMaterial, // 费率为原料成本的比例（如 0.1 = 10%）
    FlatPerBatch,       // 费率为每批固定金额
    PerServing,         // 费率为每份固定金额
}

// ==========================================
// StandardCostPolicy - 标准成本策略
// ==========================================
/// 标准成本策略: 人工与间接各自指定一种费率口径
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StandardCostPolicy {
    pub labor_basis: RateBasis,    // 人工费率口径
    pub overhead_basis: RateBasis, // 间接费率口径
}

impl StandardCostPolicy {
    /// 构造指定口径的策略
    pub fn new(labor_basis: RateBasis, overhead_basis: RateBasis) -> Self {
        Self {
            labor_basis,
            overhead_basis,
        }
    }

    /// 默认策略: 人工与间接均按原料成本比例
    pub fn percent_of_material() -> Self {
        Self::new(RateBasis::FractionOfMaterial, RateBasis::FractionOfMaterial)
    }

    /// 按口径应用费率
    fn apply(basis: RateBasis, rate: f64, material_cost: f64, servings: i64) -> f64 {
        match basis {
            RateBasis::FractionOfMaterial => material_cost * rate,
            RateBasis::FlatPerBatch => rate,
            RateBasis::PerServing => rate * servings as f64,
        }
    }
}

impl Default for StandardCostPolicy {
    fn default() -> Self {
        Self::percent_of_material()
    }
}

impl LaborOverheadPolicy for StandardCostPolicy {
    fn labor_cost(&self, material_cost: f64, recipe: &Recipe) -> f64 {
        Self::apply(
            self.labor_basis,
            recipe.labor_cost_rate,
            material_cost,
            recipe.servings,
        )
    }

    fn overhead_cost(&self, material_cost: f64, recipe: &Recipe) -> f64 {
        Self::apply(
            self.overhead_basis,
            recipe.overhead_cost_rate,
            material_cost,
            recipe.servings,
        )
    }
}
