// ==========================================
// 食品工坊经营系统 - 成本配置读取接口
// ==========================================
// 职责: 为引擎层提供配置读取抽象,便于测试时注入 Mock
// ==========================================

use async_trait::async_trait;

/// 成本核算配置读取接口
///
/// 阈值与默认费率均为可调策略常量,存储在 config_kv 表
#[async_trait]
pub trait CostingConfigReader: Send + Sync {
    // ===== 食材变价检测阈值 =====

    /// 噪声下限（%）: 低于该幅度的变价不产生预警（默认 1.0）
    async fn noise_floor_pct(&self) -> anyhow::Result<f64>;

    /// 重大变动阈值（%）: 高于该幅度的变价标记为 HIGH（默认 15.0）
    async fn high_severity_pct(&self) -> anyhow::Result<f64>;

    // ===== 配方快照对比阈值 =====

    /// 配方 HPP 变动预警阈值（%，默认 10.0）
    async fn recipe_change_threshold_pct(&self) -> anyhow::Result<f64>;

    /// 配方 HPP 重大变动阈值（%，默认 20.0）
    async fn recipe_high_severity_pct(&self) -> anyhow::Result<f64>;

    /// 毛利率下限（%，低于则预警，默认 15.0）
    async fn margin_floor_pct(&self) -> anyhow::Result<f64>;

    /// 毛利率严重下限（%，低于则 HIGH，默认 10.0）
    async fn margin_critical_pct(&self) -> anyhow::Result<f64>;

    // ===== 定价建议默认费率 =====

    /// 走量档加成（%，默认 30.0）
    async fn margin_economy_pct(&self) -> anyhow::Result<f64>;

    /// 标准档加成（%，默认 60.0）
    async fn margin_standard_pct(&self) -> anyhow::Result<f64>;

    /// 高端档加成（%，默认 100.0）
    async fn margin_premium_pct(&self) -> anyhow::Result<f64>;

    /// 心理定价取整步长（如 500 表示向上取整到 500 的倍数；None 表示不取整）
    async fn price_rounding_step(&self) -> anyhow::Result<Option<f64>>;

    // ===== 维护策略 =====

    /// 采购观察记录保留条数（默认 2,变价检测的最小需求）
    async fn observation_keep_n(&self) -> anyhow::Result<i64>;
}
