// ==========================================
// 食品工坊经营系统 - 成本核算领域模型
// ==========================================
// CostBreakdown 是派生值对象: 永远可由当前食材 + 配方用料重算,
// 不作为事实来源；持久化由 CostSnapshot 承担
// ==========================================

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// ==========================================
// IngredientLine - 单个食材成本行
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IngredientLine {
    pub ingredient_id: String,   // 食材 ID
    pub ingredient_name: String, // 食材名称（便于展示）
    pub quantity: f64,           // 每批用量
    pub unit: String,            // 计量单位
    pub unit_cost: f64,          // 当前单位成本（WAC 或报价兜底）
    pub line_cost: f64,          // 行成本 = 用量 × 单位成本
    pub share_pct: f64,          // 占总成本比例（%，总成本为 0 时为 0）
}

// ==========================================
// CostBreakdown - 成本明细（编译结果）
// ==========================================
// 不变量: total_cost == material_cost + labor_cost + overhead_cost
// 不变量: cost_per_unit == total_cost / servings
// 说明: 不携带时钟字段,同一状态下重复编译结果逐位相同
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CostBreakdown {
    pub recipe_id: String,      // 配方 ID
    pub recipe_name: String,    // 配方名称
    pub servings: i64,          // 每批份数（分摊分母）
    pub material_cost: f64,     // 原料成本合计
    pub labor_cost: f64,        // 人工成本（由成本策略计算）
    pub overhead_cost: f64,     // 间接成本（由成本策略计算）
    pub total_cost: f64,        // 总成本（HPP）
    pub cost_per_unit: f64,     // 单位成本 = total_cost / servings
    pub empty_recipe: bool,     // 配方无用料标记（零成本,提示补录用料）
    pub ingredient_lines: Vec<IngredientLine>, // 食材成本行（按食材 ID 排序）
}

impl CostBreakdown {
    /// 构造"无用料"的零成本明细
    ///
    /// 空配方是可恢复的正常状态,调用方据此提示补录用料而非报错
    pub fn empty(recipe_id: &str, recipe_name: &str, servings: i64) -> Self {
        Self {
            recipe_id: recipe_id.to_string(),
            recipe_name: recipe_name.to_string(),
            servings,
            material_cost: 0.0,
            labor_cost: 0.0,
            overhead_cost: 0.0,
            total_cost: 0.0,
            cost_per_unit: 0.0,
            empty_recipe: true,
            ingredient_lines: Vec::new(),
        }
    }
}

// ==========================================
// CostSnapshot - 成本快照
// ==========================================
// 红线: 写入后不可变；仅在显式快照请求时产生（读取不产生快照）
// 变价检测按 captured_at 倒序取最近两条对比
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CostSnapshot {
    pub snapshot_id: String,    // 快照 ID（UUID）
    pub recipe_id: String,      // 配方 ID
    pub material_cost: f64,     // 原料成本合计
    pub labor_cost: f64,        // 人工成本
    pub overhead_cost: f64,     // 间接成本
    pub total_cost: f64,        // 总成本（HPP）
    pub cost_per_unit: f64,     // 单位成本
    pub servings: i64,          // 每批份数
    pub empty_recipe: bool,     // 快照时配方是否无用料
    pub ingredient_lines: Vec<IngredientLine>, // 快照时的食材成本行
    pub selling_price: Option<f64>, // 快照时的售价（可为空）
    pub margin_pct: Option<f64>,    // 快照时的毛利率（%,售价为空或非正时为空）
    pub captured_at: DateTime<Utc>, // 快照时间
}
