// ==========================================
// 食品工坊经营系统 - SQLite 连接初始化
// ==========================================
// 目标:
// - 统一所有 Connection::open 的 PRAGMA 行为，避免“部分模块外键开启/部分不开启”
// - 统一 busy_timeout，减少并发写入时的偶发 busy 错误
// - 提供代码内 schema 初始化（核心表集中在这里，一处维护）
// ==========================================

use rusqlite::Connection;
use rusqlite::OptionalExtension;
use std::time::Duration;

/// 默认 busy_timeout（毫秒）
pub const DEFAULT_BUSY_TIMEOUT_MS: u64 = 5_000;

/// 当前代码所期望的 schema_version
///
/// 说明：
/// - 版本号用于**提示/告警**（不做自动迁移），避免静默在旧库上运行导致隐性错误。
pub const CURRENT_SCHEMA_VERSION: i64 = 1;

/// 配置 SQLite 连接的统一 PRAGMA
///
/// 说明：
/// - foreign_keys 需要“每个连接”单独开启
/// - busy_timeout 需要“每个连接”单独配置
pub fn configure_sqlite_connection(conn: &Connection) -> rusqlite::Result<()> {
    conn.execute_batch("PRAGMA foreign_keys = ON;")?;
    conn.busy_timeout(Duration::from_millis(DEFAULT_BUSY_TIMEOUT_MS))?;
    Ok(())
}

/// 打开 SQLite 连接并应用统一配置
pub fn open_sqlite_connection(db_path: &str) -> rusqlite::Result<Connection> {
    let conn = Connection::open(db_path)?;
    configure_sqlite_connection(&conn)?;
    Ok(conn)
}

/// 初始化核心 schema（幂等，CREATE TABLE IF NOT EXISTS）
///
/// 表清单:
/// - schema_version: schema 版本记录
/// - config_scope / config_kv: 配置存储（scope + key-value）
/// - ingredient: 食材主数据（库存 + 加权平均成本）
/// - purchase_observation: 采购观察记录（只追加，不改不删）
/// - recipe: 配方主数据
/// - recipe_component: 配方用料（配方-食材多对多）
/// - cost_snapshot: 成本快照（写入后不可变）
pub fn init_schema(conn: &Connection) -> rusqlite::Result<()> {
    conn.execute_batch(
        r#"
        CREATE TABLE IF NOT EXISTS schema_version (
            version INTEGER PRIMARY KEY,
            applied_at TEXT NOT NULL DEFAULT (datetime('now'))
        );

        CREATE TABLE IF NOT EXISTS config_scope (
            scope_id TEXT PRIMARY KEY,
            scope_type TEXT NOT NULL,
            scope_key TEXT NOT NULL,
            created_at TEXT NOT NULL DEFAULT (datetime('now')),
            UNIQUE(scope_type, scope_key)
        );

        INSERT OR IGNORE INTO config_scope (scope_id, scope_type, scope_key)
        VALUES ('global', 'GLOBAL', 'global');

        CREATE TABLE IF NOT EXISTS config_kv (
            scope_id TEXT NOT NULL REFERENCES config_scope(scope_id) ON DELETE CASCADE,
            key TEXT NOT NULL,
            value TEXT NOT NULL,
            updated_at TEXT NOT NULL DEFAULT (datetime('now')),
            PRIMARY KEY (scope_id, key)
        );

        CREATE TABLE IF NOT EXISTS ingredient (
            ingredient_id TEXT PRIMARY KEY,
            name TEXT NOT NULL,
            unit TEXT NOT NULL,
            current_stock REAL NOT NULL DEFAULT 0,
            weighted_average_cost REAL NOT NULL DEFAULT 0,
            list_price REAL NOT NULL DEFAULT 0,
            is_active INTEGER NOT NULL DEFAULT 1,
            created_at TEXT NOT NULL,
            updated_at TEXT NOT NULL
        );

        CREATE TABLE IF NOT EXISTS purchase_observation (
            observation_id TEXT PRIMARY KEY,
            ingredient_id TEXT NOT NULL REFERENCES ingredient(ingredient_id),
            quantity REAL NOT NULL,
            unit_price REAL NOT NULL,
            occurred_at TEXT NOT NULL,
            created_at TEXT NOT NULL
        );

        CREATE INDEX IF NOT EXISTS idx_purchase_observation_ingredient
          ON purchase_observation(ingredient_id, occurred_at DESC);

        CREATE TABLE IF NOT EXISTS recipe (
            recipe_id TEXT PRIMARY KEY,
            name TEXT NOT NULL,
            servings INTEGER NOT NULL,
            selling_price REAL,
            labor_cost_rate REAL NOT NULL DEFAULT 0,
            overhead_cost_rate REAL NOT NULL DEFAULT 0,
            is_active INTEGER NOT NULL DEFAULT 1,
            created_at TEXT NOT NULL,
            updated_at TEXT NOT NULL
        );

        CREATE TABLE IF NOT EXISTS recipe_component (
            recipe_id TEXT NOT NULL REFERENCES recipe(recipe_id) ON DELETE CASCADE,
            ingredient_id TEXT NOT NULL REFERENCES ingredient(ingredient_id),
            quantity_per_batch REAL NOT NULL,
            unit TEXT NOT NULL,
            PRIMARY KEY (recipe_id, ingredient_id)
        );

        CREATE INDEX IF NOT EXISTS idx_recipe_component_ingredient
          ON recipe_component(ingredient_id);

        CREATE TABLE IF NOT EXISTS cost_snapshot (
            snapshot_id TEXT PRIMARY KEY,
            recipe_id TEXT NOT NULL REFERENCES recipe(recipe_id),
            material_cost REAL NOT NULL,
            labor_cost REAL NOT NULL,
            overhead_cost REAL NOT NULL,
            total_cost REAL NOT NULL,
            cost_per_unit REAL NOT NULL,
            servings INTEGER NOT NULL,
            empty_recipe INTEGER NOT NULL DEFAULT 0,
            ingredient_lines TEXT NOT NULL,
            selling_price REAL,
            margin_pct REAL,
            captured_at TEXT NOT NULL
        );

        CREATE INDEX IF NOT EXISTS idx_cost_snapshot_recipe
          ON cost_snapshot(recipe_id, captured_at DESC);

        INSERT OR IGNORE INTO schema_version (version) VALUES (1);
        "#,
    )?;
    Ok(())
}

/// 读取 schema_version（若表不存在则返回 None）
pub fn read_schema_version(conn: &Connection) -> rusqlite::Result<Option<i64>> {
    let has_table: bool = conn
        .query_row(
            "SELECT 1 FROM sqlite_master WHERE type='table' AND name='schema_version' LIMIT 1",
            [],
            |_row| Ok(true),
        )
        .optional()?
        .unwrap_or(false);

    if !has_table {
        return Ok(None);
    }

    let v: Option<i64> = conn.query_row("SELECT MAX(version) FROM schema_version", [], |row| row.get(0))?;
    Ok(v)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_init_schema_idempotent() {
        let conn = Connection::open_in_memory().unwrap();
        configure_sqlite_connection(&conn).unwrap();
        init_schema(&conn).unwrap();
        // 再次初始化不应报错
        init_schema(&conn).unwrap();

        let version = read_schema_version(&conn).unwrap();
        assert_eq!(version, Some(CURRENT_SCHEMA_VERSION));
    }
}
