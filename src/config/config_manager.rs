// ==========================================
// 食品工坊经营系统 - 配置管理器
// ==========================================
// 职责: 配置加载、查询、覆写管理
// 存储: config_kv 表 (key-value + scope)
// ==========================================

use crate::config::costing_config_trait::CostingConfigReader;
use async_trait::async_trait;
use rusqlite::{params, Connection};
use std::sync::{Arc, Mutex};

// ==========================================
// 默认配置值
// ==========================================

/// 噪声下限（%）
pub const DEFAULT_NOISE_FLOOR_PCT: f64 = 1.0;
/// 食材变价重大变动阈值（%）
pub const DEFAULT_HIGH_SEVERITY_PCT: f64 = 15.0;
/// 配方 HPP 变动预警阈值（%）
pub const DEFAULT_RECIPE_CHANGE_THRESHOLD_PCT: f64 = 10.0;
/// 配方 HPP 重大变动阈值（%）
pub const DEFAULT_RECIPE_HIGH_SEVERITY_PCT: f64 = 20.0;
/// 毛利率下限（%）
pub const DEFAULT_MARGIN_FLOOR_PCT: f64 = 15.0;
/// 毛利率严重下限（%）
pub const DEFAULT_MARGIN_CRITICAL_PCT: f64 = 10.0;
/// 走量档加成（%）
pub const DEFAULT_MARGIN_ECONOMY_PCT: f64 = 30.0;
/// 标准档加成（%）
pub const DEFAULT_MARGIN_STANDARD_PCT: f64 = 60.0;
/// 高端档加成（%）
pub const DEFAULT_MARGIN_PREMIUM_PCT: f64 = 100.0;
/// 采购观察记录保留条数
pub const DEFAULT_OBSERVATION_KEEP_N: i64 = 2;

// ==========================================
// ConfigManager - 配置管理器
// ==========================================
pub struct ConfigManager {
    conn: Arc<Mutex<Connection>>,
}

impl ConfigManager {
    /// 创建新的 ConfigManager 实例
    ///
    /// # 参数
    /// - db_path: 数据库文件路径
    pub fn new(db_path: &str) -> anyhow::Result<Self> {
        let conn = crate::db::open_sqlite_connection(db_path)?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// 从已有连接创建 ConfigManager
    ///
    /// 说明：为保证连接行为一致，会对传入连接再次应用统一 PRAGMA（幂等）。
    pub fn from_connection(conn: Arc<Mutex<Connection>>) -> anyhow::Result<Self> {
        {
            let conn_guard = conn
                .lock()
                .map_err(|e| anyhow::anyhow!("锁获取失败: {}", e))?;
            crate::db::configure_sqlite_connection(&conn_guard)?;
        }

        Ok(Self { conn })
    }

    /// 从 config_kv 表读取配置值（scope_id='global'）
    ///
    /// # 返回
    /// - Some(String): 配置值
    /// - None: 配置不存在
    fn get_config_value(&self, key: &str) -> anyhow::Result<Option<String>> {
        let conn = self
            .conn
            .lock()
            .map_err(|e| anyhow::anyhow!("锁获取失败: {}", e))?;

        let result = conn.query_row(
            "SELECT value FROM config_kv WHERE scope_id = 'global' AND key = ?1",
            params![key],
            |row| row.get::<_, String>(0),
        );

        match result {
            Ok(value) => Ok(Some(value)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    /// 写入 global scope 的配置值（已存在则覆盖）
    pub fn set_global_config_value(&self, key: &str, value: &str) -> anyhow::Result<()> {
        let conn = self
            .conn
            .lock()
            .map_err(|e| anyhow::anyhow!("锁获取失败: {}", e))?;

        conn.execute(
            r#"
            INSERT INTO config_kv (scope_id, key, value, updated_at)
            VALUES ('global', ?1, ?2, datetime('now'))
            ON CONFLICT(scope_id, key)
            DO UPDATE SET value = ?2, updated_at = datetime('now')
            "#,
            params![key, value],
        )?;
        Ok(())
    }

    /// 读取浮点配置,缺失或解析失败时返回默认值
    fn get_f64_or(&self, key: &str, default: f64) -> anyhow::Result<f64> {
        Ok(self
            .get_config_value(key)?
            .and_then(|s| s.trim().parse::<f64>().ok())
            .unwrap_or(default))
    }

    /// 读取整数配置,缺失或解析失败时返回默认值
    fn get_i64_or(&self, key: &str, default: i64) -> anyhow::Result<i64> {
        Ok(self
            .get_config_value(key)?
            .and_then(|s| s.trim().parse::<i64>().ok())
            .unwrap_or(default))
    }
}

// ==========================================
// CostingConfigReader 实现
// ==========================================
#[async_trait]
impl CostingConfigReader for ConfigManager {
    async fn noise_floor_pct(&self) -> anyhow::Result<f64> {
        self.get_f64_or("hpp.noise_floor_pct", DEFAULT_NOISE_FLOOR_PCT)
    }

    async fn high_severity_pct(&self) -> anyhow::Result<f64> {
        self.get_f64_or("hpp.high_severity_pct", DEFAULT_HIGH_SEVERITY_PCT)
    }

    async fn recipe_change_threshold_pct(&self) -> anyhow::Result<f64> {
        self.get_f64_or(
            "hpp.recipe_change_threshold_pct",
            DEFAULT_RECIPE_CHANGE_THRESHOLD_PCT,
        )
    }

    async fn recipe_high_severity_pct(&self) -> anyhow::Result<f64> {
        self.get_f64_or(
            "hpp.recipe_high_severity_pct",
            DEFAULT_RECIPE_HIGH_SEVERITY_PCT,
        )
    }

    async fn margin_floor_pct(&self) -> anyhow::Result<f64> {
        self.get_f64_or("hpp.margin_floor_pct", DEFAULT_MARGIN_FLOOR_PCT)
    }

    async fn margin_critical_pct(&self) -> anyhow::Result<f64> {
        self.get_f64_or("hpp.margin_critical_pct", DEFAULT_MARGIN_CRITICAL_PCT)
    }

    async fn margin_economy_pct(&self) -> anyhow::Result<f64> {
        self.get_f64_or("pricing.margin_economy_pct", DEFAULT_MARGIN_ECONOMY_PCT)
    }

    async fn margin_standard_pct(&self) -> anyhow::Result<f64> {
        self.get_f64_or("pricing.margin_standard_pct", DEFAULT_MARGIN_STANDARD_PCT)
    }

    async fn margin_premium_pct(&self) -> anyhow::Result<f64> {
        self.get_f64_or("pricing.margin_premium_pct", DEFAULT_MARGIN_PREMIUM_PCT)
    }

    async fn price_rounding_step(&self) -> anyhow::Result<Option<f64>> {
        let step = self
            .get_config_value("pricing.rounding_step")?
            .and_then(|s| s.trim().parse::<f64>().ok())
            .filter(|v| *v > 0.0);
        Ok(step)
    }

    async fn observation_keep_n(&self) -> anyhow::Result<i64> {
        self.get_i64_or("ledger.observation_keep_n", DEFAULT_OBSERVATION_KEEP_N)
    }
}
