// ==========================================
// 食品工坊经营系统 - 定价建议引擎
// ==========================================
// 职责: 由单位成本推导走量/标准/高端三档建议价,
//       并评估现有售价是否有利可图
// 红线: 纯函数,无副作用,不落库
// 口径: 加成按成本加法口径 price = cost * (1 + margin/100)
// ==========================================

use crate::domain::costing::CostBreakdown;
use crate::domain::types::{MarginHealth, PriceTier};
use crate::engine::ledger_core::LedgerCore;
use crate::i18n::t;
use serde::{Deserialize, Serialize};

/// 毛利健康线（%）: 高于此为 HEALTHY
pub const MARGIN_HEALTHY_PCT: f64 = 50.0;
/// 毛利过薄线（%）: 低于此为 THIN
pub const MARGIN_THIN_PCT: f64 = 15.0;

// ==========================================
// MarginPolicy - 加成策略
// ==========================================
/// 三档加成策略（可按调用覆盖,不同商家目标毛利不同）
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MarginPolicy {
    pub economy_pct: f64,          // 走量档加成（%）
    pub standard_pct: f64,         // 标准档加成（%）
    pub premium_pct: f64,          // 高端档加成（%）
    pub rounding_step: Option<f64>, // 心理定价取整步长（向上取整；None 不取整）
}

impl Default for MarginPolicy {
    fn default() -> Self {
        Self {
            economy_pct: 30.0,
            standard_pct: 60.0,
            premium_pct: 100.0,
            rounding_step: None,
        }
    }
}

// ==========================================
// PriceTierSuggestion - 单档建议
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriceTierSuggestion {
    pub tier: PriceTier,        // 档位
    pub price: f64,             // 建议售价
    pub margin_percent: f64,    // 加成比例（%）
    pub positioning: String,    // 定位说明（本地化）
}

// ==========================================
// PricingSuggestion - 三档定价建议
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PricingSuggestion {
    pub recipe_id: String,            // 配方 ID
    pub cost_per_unit: f64,           // 依据的单位成本
    pub economy: PriceTierSuggestion, // 走量档
    pub standard: PriceTierSuggestion, // 标准档
    pub premium: PriceTierSuggestion, // 高端档
}

// ==========================================
// PriceEvaluation - 现价评估
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriceEvaluation {
    pub is_profitable: bool,        // 售价是否高于单位成本
    pub margin_percent: f64,        // 毛利率（%；未定价时为 0）
    pub margin_health: MarginHealth, // 毛利健康度
}

// ==========================================
// PricingAdvisor - 定价建议引擎
// ==========================================
pub struct PricingAdvisor {
    // 无状态引擎,不需要注入依赖
    // 默认加成策略由调用方从配置解析后传入
}

impl PricingAdvisor {
    /// 构造函数
    pub fn new() -> Self {
        Self {}
    }

    // ==========================================
    // 核心方法
    // ==========================================

    /// 由成本明细推导三档建议价
    ///
    /// # 参数
    /// - `breakdown`: 编译好的成本明细
    /// - `policy`: 加成策略（调用级可覆盖）
    pub fn suggest_pricing(
        &self,
        breakdown: &CostBreakdown,
        policy: &MarginPolicy,
    ) -> PricingSuggestion {
        let cost_per_unit = breakdown.cost_per_unit;

        PricingSuggestion {
            recipe_id: breakdown.recipe_id.clone(),
            cost_per_unit,
            economy: Self::tier_suggestion(
                PriceTier::Economy,
                cost_per_unit,
                policy.economy_pct,
                policy.rounding_step,
                "pricing.economy.positioning",
            ),
            standard: Self::tier_suggestion(
                PriceTier::Standard,
                cost_per_unit,
                policy.standard_pct,
                policy.rounding_step,
                "pricing.standard.positioning",
            ),
            premium: Self::tier_suggestion(
                PriceTier::Premium,
                cost_per_unit,
                policy.premium_pct,
                policy.rounding_step,
                "pricing.premium.positioning",
            ),
        }
    }

    /// 评估现有售价
    ///
    /// 毛利率 = (售价 - 单位成本) / 售价 * 100（售价 > 0 时）
    /// 未定价或售价非正是正常状态: 返回不盈利 + 毛利率 0,不报错
    pub fn evaluate_current_price(
        &self,
        breakdown: &CostBreakdown,
        selling_price: Option<f64>,
    ) -> PriceEvaluation {
        let price = match selling_price.filter(|p| *p > 0.0) {
            Some(price) => price,
            None => {
                return PriceEvaluation {
                    is_profitable: false,
                    margin_percent: 0.0,
                    margin_health: MarginHealth::Thin,
                };
            }
        };

        let margin_percent = (price - breakdown.cost_per_unit) / price * 100.0;

        PriceEvaluation {
            is_profitable: margin_percent > 0.0,
            margin_percent,
            margin_health: Self::classify_margin(margin_percent),
        }
    }

    // ==========================================
    // 内部计算
    // ==========================================

    /// 单档建议
    fn tier_suggestion(
        tier: PriceTier,
        cost_per_unit: f64,
        margin_pct: f64,
        rounding_step: Option<f64>,
        positioning_key: &str,
    ) -> PriceTierSuggestion {
        let raw_price = cost_per_unit * (1.0 + margin_pct / 100.0);

        let price = match rounding_step {
            Some(step) if step > 0.0 => (raw_price / step).ceil() * step,
            _ => LedgerCore::round2(raw_price),
        };

        PriceTierSuggestion {
            tier,
            price,
            margin_percent: margin_pct,
            positioning: t(positioning_key),
        }
    }

    /// 毛利健康度分级
    fn classify_margin(margin_percent: f64) -> MarginHealth {
        if margin_percent >= MARGIN_HEALTHY_PCT {
            MarginHealth::Healthy
        } else if margin_percent < MARGIN_THIN_PCT {
            MarginHealth::Thin
        } else {
            MarginHealth::Normal
        }
    }
}

// ==========================================
// Default trait 实现
// ==========================================
impl Default for PricingAdvisor {
    fn default() -> Self {
        Self::new()
    }
}
