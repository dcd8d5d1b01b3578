// ==========================================
// 食品工坊经营系统 - WAC 纯计算核心
// ==========================================
// 职责: 加权平均成本的纯函数计算,不做任何 I/O
// 不变量: WAC 永远非负；库存清零后的首次采购将 WAC 重置为该次采购单价
// ==========================================

use crate::domain::ingredient::PriceVolatility;
use crate::domain::types::PriceTrend;

/// 价格波动趋势判定阈值（变异系数）
pub const VOLATILITY_COEFFICIENT_THRESHOLD: f64 = 0.15;

// ==========================================
// LedgerCore - WAC 纯计算
// ==========================================
pub struct LedgerCore;

impl LedgerCore {
    /// 金额取两位小数
    pub fn round2(value: f64) -> f64 {
        (value * 100.0).round() / 100.0
    }

    /// 比率取四位小数
    pub fn round4(value: f64) -> f64 {
        (value * 10_000.0).round() / 10_000.0
    }

    /// 计算采购后的新 WAC
    ///
    /// 公式: new_wac = (old_stock * old_wac + quantity * unit_price) / (old_stock + quantity)
    ///
    /// 约定: old_stock <= 0 时直接取本次采购单价
    /// （避免除零,同时在库存清零后正确重置成本基准）
    ///
    /// # 参数
    /// - `old_stock`: 采购前库存
    /// - `old_wac`: 采购前 WAC
    /// - `quantity`: 采购数量（> 0,由调用方校验）
    /// - `unit_price`: 采购单价（>= 0,由调用方校验）
    ///
    /// # 返回
    /// 新 WAC（两位小数,非负）
    pub fn next_weighted_average_cost(
        old_stock: f64,
        old_wac: f64,
        quantity: f64,
        unit_price: f64,
    ) -> f64 {
        let new_wac = if old_stock <= 0.0 {
            unit_price
        } else {
            (old_stock * old_wac + quantity * unit_price) / (old_stock + quantity)
        };

        Self::round2(new_wac.max(0.0))
    }

    /// 计算出库后的新库存
    ///
    /// 库存下限为 0；出库不改变 WAC
    pub fn apply_consumption(old_stock: f64, quantity: f64) -> f64 {
        (old_stock - quantity).max(0.0)
    }

    /// 计算采购单价序列的波动指标（变异系数）
    ///
    /// 少于 2 条记录时视为无波动
    pub fn price_volatility(prices: &[f64]) -> PriceVolatility {
        if prices.len() < 2 {
            return PriceVolatility {
                mean: Self::round2(prices.first().copied().unwrap_or(0.0)),
                std_deviation: 0.0,
                coefficient: 0.0,
                trend: PriceTrend::Stable,
            };
        }

        let mean = prices.iter().sum::<f64>() / prices.len() as f64;
        let variance =
            prices.iter().map(|p| (p - mean).powi(2)).sum::<f64>() / prices.len() as f64;
        let std_deviation = variance.sqrt();
        let coefficient = if mean > 0.0 { std_deviation / mean } else { 0.0 };

        let trend = if coefficient > VOLATILITY_COEFFICIENT_THRESHOLD {
            PriceTrend::Volatile
        } else {
            PriceTrend::Stable
        };

        PriceVolatility {
            mean: Self::round2(mean),
            std_deviation: Self::round2(std_deviation),
            coefficient: Self::round4(coefficient),
            trend,
        }
    }
}

// ==========================================
// 单元测试
// ==========================================
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wac_first_purchase() {
        // 零库存时首次采购: WAC = 采购单价
        let wac = LedgerCore::next_weighted_average_cost(0.0, 0.0, 10.0, 1000.0);
        assert_eq!(wac, 1000.0);
    }

    #[test]
    fn test_wac_weighted_sequence() {
        // 10 件 @1000 后再 10 件 @1200 -> WAC = 1100
        let wac1 = LedgerCore::next_weighted_average_cost(0.0, 0.0, 10.0, 1000.0);
        let wac2 = LedgerCore::next_weighted_average_cost(10.0, wac1, 10.0, 1200.0);
        assert_eq!(wac2, 1100.0);
    }

    #[test]
    fn test_wac_volume_weighted_mean_property() {
        // 任意采购序列下 WAC 等于按量加权的单价均值
        let purchases = [(5.0, 800.0), (15.0, 1000.0), (30.0, 1300.0)];

        let mut stock = 0.0;
        let mut wac = 0.0;
        for (qty, price) in purchases {
            wac = LedgerCore::next_weighted_average_cost(stock, wac, qty, price);
            stock += qty;
        }

        let total_qty: f64 = purchases.iter().map(|(q, _)| q).sum();
        let total_value: f64 = purchases.iter().map(|(q, p)| q * p).sum();
        let expected = LedgerCore::round2(total_value / total_qty);

        assert_eq!(stock, 50.0);
        assert!((wac - expected).abs() < 0.01);
    }

    #[test]
    fn test_wac_reset_on_depletion() {
        // 库存清零后的新采购忽略历史,WAC 取新单价
        let wac = LedgerCore::next_weighted_average_cost(0.0, 1100.0, 5.0, 900.0);
        assert_eq!(wac, 900.0);
    }

    #[test]
    fn test_wac_never_negative() {
        let wac = LedgerCore::next_weighted_average_cost(10.0, 0.0, 10.0, 0.0);
        assert_eq!(wac, 0.0);
    }

    #[test]
    fn test_apply_consumption_floor_at_zero() {
        assert_eq!(LedgerCore::apply_consumption(10.0, 3.0), 7.0);
        // 出库量超过库存时落在 0,不出现负库存
        assert_eq!(LedgerCore::apply_consumption(10.0, 15.0), 0.0);
    }

    #[test]
    fn test_round2() {
        assert_eq!(LedgerCore::round2(1234.567), 1234.57);
        assert_eq!(LedgerCore::round2(1234.561), 1234.56);
        assert_eq!(LedgerCore::round2(949.0000000000001), 949.0);
    }

    #[test]
    fn test_volatility_insufficient_history() {
        let v = LedgerCore::price_volatility(&[1000.0]);
        assert_eq!(v.coefficient, 0.0);
        assert_eq!(v.trend, PriceTrend::Stable);
    }

    #[test]
    fn test_volatility_identical_prices_stable() {
        let v = LedgerCore::price_volatility(&[1000.0, 1000.0, 1000.0]);
        assert_eq!(v.mean, 1000.0);
        assert_eq!(v.std_deviation, 0.0);
        assert_eq!(v.trend, PriceTrend::Stable);
    }

    #[test]
    fn test_volatility_dispersed_prices_volatile() {
        // 均值 1000,标准差 > 150 -> CV > 0.15
        let v = LedgerCore::price_volatility(&[700.0, 1000.0, 1300.0]);
        assert!(v.coefficient > VOLATILITY_COEFFICIENT_THRESHOLD);
        assert_eq!(v.trend, PriceTrend::Volatile);
    }
}
