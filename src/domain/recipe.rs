// ==========================================
// 食品工坊经营系统 - 配方领域模型
// ==========================================
// 用途: 成本编译的输入；配方用料同时用于变价影响归因
// ==========================================

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// ==========================================
// Recipe - 配方主数据
// ==========================================
// 对齐: recipe 表
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Recipe {
    // ===== 主键 =====
    pub recipe_id: String, // 配方唯一标识

    // ===== 基础信息 =====
    pub name: String,  // 配方名称
    pub servings: i64, // 每批产出份数（> 0，单位成本分摊分母）

    // ===== 定价与费率 =====
    pub selling_price: Option<f64>, // 当前售价（可为空，未定价是正常状态）
    pub labor_cost_rate: f64,       // 人工费率（解释方式由成本策略决定）
    pub overhead_cost_rate: f64,    // 间接费率（解释方式由成本策略决定）

    // ===== 状态 =====
    pub is_active: bool, // 是否启用

    // ===== 审计字段 =====
    pub created_at: DateTime<Utc>, // 记录创建时间
    pub updated_at: DateTime<Utc>, // 记录更新时间
}

impl Recipe {
    /// 新建配方
    pub fn new(recipe_id: &str, name: &str, servings: i64) -> Self {
        let now = Utc::now();
        Self {
            recipe_id: recipe_id.to_string(),
            name: name.to_string(),
            servings,
            selling_price: None,
            labor_cost_rate: 0.0,
            overhead_cost_rate: 0.0,
            is_active: true,
            created_at: now,
            updated_at: now,
        }
    }
}

// ==========================================
// RecipeComponent - 配方用料
// ==========================================
// 定义配方与食材的多对多关系
// 用途: 成本编译（数量 × 单位成本）+ 变价影响归因
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecipeComponent {
    pub recipe_id: String,       // 关联配方（FK）
    pub ingredient_id: String,   // 关联食材（FK）
    pub quantity_per_batch: f64, // 每批用量（> 0）
    pub unit: String,            // 计量单位
}
