// ==========================================
// 食品工坊经营系统 - 食材领域模型
// ==========================================
// 红线: weighted_average_cost 只允许 Ledger 引擎修改
// 用途: 采购入账写入,其他组件只读
// ==========================================

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::types::PriceTrend;

// ==========================================
// Ingredient - 食材主数据
// ==========================================
// 对齐: ingredient 表
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Ingredient {
    // ===== 主键 =====
    pub ingredient_id: String, // 食材唯一标识

    // ===== 基础信息 =====
    pub name: String, // 食材名称
    pub unit: String, // 计量单位（kg/liter/pcs 等）

    // ===== 库存与成本 =====
    pub current_stock: f64,          // 当前库存数量（>= 0）
    pub weighted_average_cost: f64,  // 加权平均单位成本（WAC，>= 0）
    pub list_price: f64,             // 报价单价（无采购历史时的成本兜底）

    // ===== 状态 =====
    pub is_active: bool, // 是否启用（软归档）

    // ===== 审计字段 =====
    pub created_at: DateTime<Utc>, // 记录创建时间
    pub updated_at: DateTime<Utc>, // 记录更新时间
}

impl Ingredient {
    /// 新建食材
    ///
    /// 约定: 未有任何采购记录时，WAC 等于报价单价
    pub fn new(ingredient_id: &str, name: &str, unit: &str, list_price: f64) -> Self {
        let now = Utc::now();
        Self {
            ingredient_id: ingredient_id.to_string(),
            name: name.to_string(),
            unit: unit.to_string(),
            current_stock: 0.0,
            weighted_average_cost: list_price,
            list_price,
            is_active: true,
            created_at: now,
            updated_at: now,
        }
    }
}

// ==========================================
// PurchaseObservation - 采购观察记录
// ==========================================
// 红线: 只追加,不修改不删除（删除会破坏 WAC 历史重算）
// 保留策略: 每个食材最近 2 条用于变价检测,更早的可清理
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PurchaseObservation {
    pub observation_id: String,    // 观察记录 ID（UUID）
    pub ingredient_id: String,     // 关联食材（FK）
    pub quantity: f64,             // 采购数量（> 0）
    pub unit_price: f64,           // 采购单价（>= 0）
    pub occurred_at: DateTime<Utc>, // 采购发生时间
    pub created_at: DateTime<Utc>, // 记录写入时间
}

// ==========================================
// PriceVolatility - 价格波动指标
// ==========================================
// 基于近期采购单价的变异系数（CV）
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriceVolatility {
    pub mean: f64,          // 单价均值
    pub std_deviation: f64, // 标准差
    pub coefficient: f64,   // 变异系数（CV，4 位小数）
    pub trend: PriceTrend,  // 趋势判定（CV > 0.15 为波动）
}
