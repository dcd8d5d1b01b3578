// ==========================================
// 食品工坊经营系统 - 成本快照仓储
// ==========================================
// 红线: 快照写入后不可变,只有 insert 与查询,没有 update/delete
// ==========================================

use crate::domain::costing::{CostSnapshot, IngredientLine};
use crate::repository::error::{RepositoryError, RepositoryResult};
use rusqlite::{params, Connection, Row};
use std::sync::{Arc, Mutex};

// ==========================================
// CostSnapshotRepository - 成本快照仓储
// ==========================================

/// 成本快照仓储
/// 职责: 管理 cost_snapshot 表（只追加）
pub struct CostSnapshotRepository {
    conn: Arc<Mutex<Connection>>,
}

impl CostSnapshotRepository {
    /// 创建新的成本快照仓储实例
    pub fn new(db_path: &str) -> RepositoryResult<Self> {
        let conn = crate::db::open_sqlite_connection(db_path)?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// 从已有连接创建仓储实例
    pub fn from_connection(conn: Arc<Mutex<Connection>>) -> Self {
        Self { conn }
    }

    /// 获取数据库连接
    fn get_conn(&self) -> RepositoryResult<std::sync::MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|e| RepositoryError::LockError(e.to_string()))
    }

    /// 行映射（ingredient_lines 以 JSON 存储）
    fn map_row(row: &Row<'_>) -> rusqlite::Result<(CostSnapshot, String)> {
        let lines_json: String = row.get(9)?;
        Ok((
            CostSnapshot {
                snapshot_id: row.get(0)?,
                recipe_id: row.get(1)?,
                material_cost: row.get(2)?,
                labor_cost: row.get(3)?,
                overhead_cost: row.get(4)?,
                total_cost: row.get(5)?,
                cost_per_unit: row.get(6)?,
                servings: row.get(7)?,
                empty_recipe: row.get(8)?,
                ingredient_lines: Vec::new(),
                selling_price: row.get(10)?,
                margin_pct: row.get(11)?,
                captured_at: row.get(12)?,
            },
            lines_json,
        ))
    }

    /// 插入成本快照
    pub fn insert(&self, snapshot: &CostSnapshot) -> RepositoryResult<()> {
        let lines_json = serde_json::to_string(&snapshot.ingredient_lines)?;

        let conn = self.get_conn()?;
        conn.execute(
            r#"
            INSERT INTO cost_snapshot (
                snapshot_id, recipe_id, material_cost, labor_cost,
                overhead_cost, total_cost, cost_per_unit, servings,
                empty_recipe, ingredient_lines, selling_price,
                margin_pct, captured_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13)
            "#,
            params![
                snapshot.snapshot_id,
                snapshot.recipe_id,
                snapshot.material_cost,
                snapshot.labor_cost,
                snapshot.overhead_cost,
                snapshot.total_cost,
                snapshot.cost_per_unit,
                snapshot.servings,
                snapshot.empty_recipe,
                lines_json,
                snapshot.selling_price,
                snapshot.margin_pct,
                snapshot.captured_at,
            ],
        )?;
        Ok(())
    }

    /// 查询某配方最近 n 条快照（按快照时间倒序）
    pub fn find_latest(&self, recipe_id: &str, n: i64) -> RepositoryResult<Vec<CostSnapshot>> {
        let conn = self.get_conn()?;
        let mut stmt = conn.prepare(
            r#"
            SELECT
                snapshot_id, recipe_id, material_cost, labor_cost,
                overhead_cost, total_cost, cost_per_unit, servings,
                empty_recipe, ingredient_lines, selling_price,
                margin_pct, captured_at
            FROM cost_snapshot
            WHERE recipe_id = ?1
            ORDER BY captured_at DESC, rowid DESC
            LIMIT ?2
            "#,
        )?;

        let rows = stmt.query_map(params![recipe_id, n], Self::map_row)?;

        let mut snapshots = Vec::new();
        for row in rows {
            let (mut snapshot, lines_json) = row?;
            let lines: Vec<IngredientLine> = serde_json::from_str(&lines_json)?;
            snapshot.ingredient_lines = lines;
            snapshots.push(snapshot);
        }
        Ok(snapshots)
    }

    /// 统计某配方的快照数量
    pub fn count_for(&self, recipe_id: &str) -> RepositoryResult<i64> {
        let conn = self.get_conn()?;
        let count: i64 = conn.query_row(
            "SELECT COUNT(*) FROM cost_snapshot WHERE recipe_id = ?1",
            params![recipe_id],
            |row| row.get(0),
        )?;
        Ok(count)
    }
}
