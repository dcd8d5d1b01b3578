// ==========================================
// 食品工坊经营系统 - 成本预警领域模型
// ==========================================
// 红线: 预警只生成不修改；是否重复通知（如 24 小时内不重发）、
// 送达渠道、已读状态均由通知协作方负责,检测层不做去重
// ==========================================

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::types::{AlertKind, AlertSeverity, RecipeAlertKind};

// ==========================================
// AffectedRecipe - 受变价影响的配方
// ==========================================
// cost_impact = 单价变动额 × 每批用量
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AffectedRecipe {
    pub recipe_id: String,   // 配方 ID
    pub recipe_name: String, // 配方名称
    pub cost_impact: f64,    // 对该配方每批成本的影响额
}

// ==========================================
// CostChangeAlert - 食材变价预警
// ==========================================
// 触发条件: abs(change_percent) >= 噪声下限 且 至少一个配方受非零影响
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CostChangeAlert {
    pub ingredient_id: String,          // 食材 ID
    pub ingredient_name: String,        // 食材名称
    pub kind: AlertKind,                // 涨价/降价
    pub severity: AlertSeverity,        // 预警级别
    pub previous_unit_price: f64,       // 上一次采购单价
    pub current_unit_price: f64,        // 最新采购单价
    pub change_amount: f64,             // 变动额 = current - previous
    pub change_percent: f64,            // 变动比例（%）
    pub title: String,                  // 预警标题（本地化）
    pub message: String,                // 预警消息（本地化）
    pub affected_recipes: Vec<AffectedRecipe>, // 受影响配方（按配方 ID 稳定排序）
    pub observed_at: DateTime<Utc>,     // 观察时间（取最新采购时间）
}

// ==========================================
// RecipeCostAlert - 配方成本预警
// ==========================================
// 基于最近两条成本快照对比（HPP 变动）或毛利下限规则
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecipeCostAlert {
    pub recipe_id: String,          // 配方 ID
    pub recipe_name: String,        // 配方名称
    pub kind: RecipeAlertKind,      // HPP 涨/跌 或 毛利过低
    pub severity: AlertSeverity,    // 预警级别
    pub previous_value: f64,        // 对比基准值
    pub current_value: f64,         // 当前值
    pub change_percent: f64,        // 变动比例（%；毛利规则时为 0）
    pub title: String,              // 预警标题（本地化）
    pub message: String,            // 预警消息（本地化）
    pub observed_at: DateTime<Utc>, // 观察时间（取最新快照时间）
}
