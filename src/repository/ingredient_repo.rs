// ==========================================
// 食品工坊经营系统 - 食材数据仓储
// ==========================================
// 红线: Repository 不含业务逻辑
// WAC 的计算在 Ledger 引擎完成,这里只负责持久化
// ==========================================

use crate::domain::ingredient::{Ingredient, PurchaseObservation};
use crate::repository::error::{RepositoryError, RepositoryResult};
use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, OptionalExtension, Row};
use std::sync::{Arc, Mutex};

// ==========================================
// IngredientRepository - 食材仓储
// ==========================================

/// 食材仓储
/// 职责: 管理 ingredient 表的 CRUD 操作
pub struct IngredientRepository {
    conn: Arc<Mutex<Connection>>,
}

impl IngredientRepository {
    /// 创建新的食材仓储实例
    ///
    /// # 参数
    /// - db_path: 数据库文件路径
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

    /// 行映射
    fn map_row(row: &Row<'_>) -> rusqlite::Result<Ingredient> {
        Ok(Ingredient {
            ingredient_id: row.get(0)?,
            name: row.get(1)?,
            unit: row.get(2)?,
            current_stock: row.get(3)?,
            weighted_average_cost: row.get(4)?,
            list_price: row.get(5)?,
            is_active: row.get(6)?,
            created_at: row.get(7)?,
            updated_at: row.get(8)?,
        })
    }

    /// 插入食材
    pub fn insert(&self, ingredient: &Ingredient) -> RepositoryResult<()> {
        let conn = self.get_conn()?;
        conn.execute(
            r#"
            INSERT INTO ingredient (
                ingredient_id, name, unit, current_stock,
                weighted_average_cost, list_price, is_active,
                created_at, updated_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)
            "#,
            params![
                ingredient.ingredient_id,
                ingredient.name,
                ingredient.unit,
                ingredient.current_stock,
                ingredient.weighted_average_cost,
                ingredient.list_price,
                ingredient.is_active,
                ingredient.created_at,
                ingredient.updated_at,
            ],
        )?;
        Ok(())
    }

    /// 按 ID 查询食材
    ///
    /// # 返回
    /// - Ok(Some(Ingredient)): 找到食材
    /// - Ok(None): 未找到
    pub fn find_by_id(&self, ingredient_id: &str) -> RepositoryResult<Option<Ingredient>> {
        let conn = self.get_conn()?;
        let mut stmt = conn.prepare(
            r#"
            SELECT
                ingredient_id, name, unit, current_stock,
                weighted_average_cost, list_price, is_active,
                created_at, updated_at
            FROM ingredient
            WHERE ingredient_id = ?1
            "#,
        )?;

        let ingredient = stmt
            .query_row(params![ingredient_id], Self::map_row)
            .optional()?;

        Ok(ingredient)
    }

    /// 查询启用中的食材列表
    pub fn list_active(&self) -> RepositoryResult<Vec<Ingredient>> {
        let conn = self.get_conn()?;
        let mut stmt = conn.prepare(
            r#"
            SELECT
                ingredient_id, name, unit, current_stock,
                weighted_average_cost, list_price, is_active,
                created_at, updated_at
            FROM ingredient
            WHERE is_active = 1
            ORDER BY ingredient_id
            "#,
        )?;

        let rows = stmt.query_map([], Self::map_row)?;
        let mut ingredients = Vec::new();
        for row in rows {
            ingredients.push(row?);
        }
        Ok(ingredients)
    }

    /// 更新食材的库存与 WAC
    ///
    /// # 参数
    /// - ingredient_id: 食材 ID
    /// - current_stock: 新库存
    /// - weighted_average_cost: 新 WAC
    pub fn update_stock_and_cost(
        &self,
        ingredient_id: &str,
        current_stock: f64,
        weighted_average_cost: f64,
    ) -> RepositoryResult<()> {
        let conn = self.get_conn()?;
        let affected = conn.execute(
            r#"
            UPDATE ingredient
            SET current_stock = ?2,
                weighted_average_cost = ?3,
                updated_at = ?4
            WHERE ingredient_id = ?1
            "#,
            params![
                ingredient_id,
                current_stock,
                weighted_average_cost,
                Utc::now(),
            ],
        )?;

        if affected == 0 {
            return Err(RepositoryError::NotFound {
                entity: "Ingredient".to_string(),
                id: ingredient_id.to_string(),
            });
        }
        Ok(())
    }
}

// ==========================================
// PurchaseObservationRepository - 采购观察记录仓储
// ==========================================

/// 采购观察记录仓储
/// 职责: 管理 purchase_observation 表（只追加）
pub struct PurchaseObservationRepository {
    conn: Arc<Mutex<Connection>>,
}

impl PurchaseObservationRepository {
    /// 创建新的采购观察记录仓储实例
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

    /// 追加采购观察记录
    pub fn append(&self, observation: &PurchaseObservation) -> RepositoryResult<()> {
        let conn = self.get_conn()?;
        conn.execute(
            r#"
            INSERT INTO purchase_observation (
                observation_id, ingredient_id, quantity, unit_price,
                occurred_at, created_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6)
            "#,
            params![
                observation.observation_id,
                observation.ingredient_id,
                observation.quantity,
                observation.unit_price,
                observation.occurred_at,
                observation.created_at,
            ],
        )?;
        Ok(())
    }

    /// 查询某食材最近 n 条采购观察记录（按发生时间倒序）
    ///
    /// 排序使用 (occurred_at, created_at, rowid) 三级倒序,保证同刻记录顺序确定
    pub fn find_recent(
        &self,
        ingredient_id: &str,
        n: i64,
    ) -> RepositoryResult<Vec<PurchaseObservation>> {
        let conn = self.get_conn()?;
        let mut stmt = conn.prepare(
            r#"
            SELECT
                observation_id, ingredient_id, quantity, unit_price,
                occurred_at, created_at
            FROM purchase_observation
            WHERE ingredient_id = ?1
            ORDER BY occurred_at DESC, created_at DESC, rowid DESC
            LIMIT ?2
            "#,
        )?;

        let rows = stmt.query_map(params![ingredient_id, n], |row| {
            Ok(PurchaseObservation {
                observation_id: row.get(0)?,
                ingredient_id: row.get(1)?,
                quantity: row.get(2)?,
                unit_price: row.get(3)?,
                occurred_at: row.get(4)?,
                created_at: row.get(5)?,
            })
        })?;

        let mut observations = Vec::new();
        for row in rows {
            observations.push(row?);
        }
        Ok(observations)
    }

    /// 统计某食材的采购观察记录数
    pub fn count_for(&self, ingredient_id: &str) -> RepositoryResult<i64> {
        let conn = self.get_conn()?;
        let count: i64 = conn.query_row(
            "SELECT COUNT(*) FROM purchase_observation WHERE ingredient_id = ?1",
            params![ingredient_id],
            |row| row.get(0),
        )?;
        Ok(count)
    }

    /// 清理某食材较早的采购观察记录,保留最近 keep_n 条
    ///
    /// 变价检测只依赖最近两条;更早的历史允许清理
    ///
    /// # 返回
    /// - Ok(usize): 删除的记录数
    pub fn prune_history(&self, ingredient_id: &str, keep_n: i64) -> RepositoryResult<usize> {
        let conn = self.get_conn()?;
        let deleted = conn.execute(
            r#"
            DELETE FROM purchase_observation
            WHERE ingredient_id = ?1
              AND rowid NOT IN (
                SELECT rowid FROM purchase_observation
                WHERE ingredient_id = ?1
                ORDER BY occurred_at DESC, created_at DESC, rowid DESC
                LIMIT ?2
              )
            "#,
            params![ingredient_id, keep_n],
        )?;
        Ok(deleted)
    }

    /// 最近一次采购时间（无记录时为 None）
    pub fn latest_occurred_at(
        &self,
        ingredient_id: &str,
    ) -> RepositoryResult<Option<DateTime<Utc>>> {
        let conn = self.get_conn()?;
        let result = conn
            .query_row(
                r#"
                SELECT occurred_at FROM purchase_observation
                WHERE ingredient_id = ?1
                ORDER BY occurred_at DESC, created_at DESC, rowid DESC
                LIMIT 1
                "#,
                params![ingredient_id],
                |row| row.get::<_, DateTime<Utc>>(0),
            )
            .optional()?;
        Ok(result)
    }
}
