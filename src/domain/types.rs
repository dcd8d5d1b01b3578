// ==========================================
// 食品工坊经营系统 - 领域类型定义
// ==========================================

use serde::{Deserialize, Serialize};
use std::fmt;

// ==========================================
// 预警级别 (Alert Severity)
// ==========================================
// 红线: 等级制,不是评分制
// 序列化格式: SCREAMING_SNAKE_CASE (与数据库一致)
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AlertSeverity {
    Normal, // 一般变动,提示关注
    High,   // 重大变动,需要尽快处理
}

impl fmt::Display for AlertSeverity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AlertSeverity::Normal => write!(f, "NORMAL"),
            AlertSeverity::High => write!(f, "HIGH"),
        }
    }
}

// ==========================================
// 食材价格预警类型 (Alert Kind)
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AlertKind {
    CostIncrease, // 采购价上涨
    CostDecrease, // 采购价下跌
}

impl fmt::Display for AlertKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AlertKind::CostIncrease => write!(f, "COST_INCREASE"),
            AlertKind::CostDecrease => write!(f, "COST_DECREASE"),
        }
    }
}

// ==========================================
// 配方成本预警类型 (Recipe Alert Kind)
// ==========================================
// 基于快照对比的配方级预警
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RecipeAlertKind {
    HppIncrease, // HPP 上涨
    HppDecrease, // HPP 下跌
    MarginLow,   // 毛利率低于下限
}

impl fmt::Display for RecipeAlertKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RecipeAlertKind::HppIncrease => write!(f, "HPP_INCREASE"),
            RecipeAlertKind::HppDecrease => write!(f, "HPP_DECREASE"),
            RecipeAlertKind::MarginLow => write!(f, "MARGIN_LOW"),
        }
    }
}

// ==========================================
// 出库原因 (Consumption Reason)
// ==========================================
// 出库只减库存,不改 WAC
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ConsumptionReason {
    Usage, // 生产领用
    Waste, // 损耗报废
}

impl fmt::Display for ConsumptionReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConsumptionReason::Usage => write!(f, "USAGE"),
            ConsumptionReason::Waste => write!(f, "WASTE"),
        }
    }
}

// ==========================================
// 定价档位 (Price Tier)
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PriceTier {
    Economy,  // 走量档
    Standard, // 标准档
    Premium,  // 高端档
}

impl fmt::Display for PriceTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PriceTier::Economy => write!(f, "ECONOMY"),
            PriceTier::Standard => write!(f, "STANDARD"),
            PriceTier::Premium => write!(f, "PREMIUM"),
        }
    }
}

// ==========================================
// 毛利健康度 (Margin Health)
// ==========================================
// 顺序: Thin < Normal < Healthy
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MarginHealth {
    Thin,    // 毛利过薄 (< 15%)
    Normal,  // 正常
    Healthy, // 健康 (>= 50%)
}

impl fmt::Display for MarginHealth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MarginHealth::Thin => write!(f, "THIN"),
            MarginHealth::Normal => write!(f, "NORMAL"),
            MarginHealth::Healthy => write!(f, "HEALTHY"),
        }
    }
}

// ==========================================
// 价格波动趋势 (Price Trend)
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PriceTrend {
    Stable,   // 稳定
    Volatile, // 波动 (变异系数 > 0.15)
}

impl fmt::Display for PriceTrend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PriceTrend::Stable => write!(f, "STABLE"),
            PriceTrend::Volatile => write!(f, "VOLATILE"),
        }
    }
}
