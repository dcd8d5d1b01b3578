// ==========================================
// 食品工坊经营系统 - 配方数据仓储
// ==========================================
// 红线: Repository 不含业务逻辑
// ==========================================

use crate::domain::recipe::{Recipe, RecipeComponent};
use crate::repository::error::{RepositoryError, RepositoryResult};
use chrono::Utc;
use rusqlite::{params, Connection, OptionalExtension, Row};
use std::sync::{Arc, Mutex};

// ==========================================
// RecipeRepository - 配方仓储
// ==========================================

/// 配方仓储
/// 职责: 管理 recipe 表的 CRUD 操作
pub struct RecipeRepository {
    conn: Arc<Mutex<Connection>>,
}

impl RecipeRepository {
    /// 创建新的配方仓储实例
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
    fn map_row(row: &Row<'_>) -> rusqlite::Result<Recipe> {
        Ok(Recipe {
            recipe_id: row.get(0)?,
            name: row.get(1)?,
            servings: row.get(2)?,
            selling_price: row.get(3)?,
            labor_cost_rate: row.get(4)?,
            overhead_cost_rate: row.get(5)?,
            is_active: row.get(6)?,
            created_at: row.get(7)?,
            updated_at: row.get(8)?,
        })
    }

    /// 插入配方
    pub fn insert(&self, recipe: &Recipe) -> RepositoryResult<()> {
        let conn = self.get_conn()?;
        conn.execute(
            r#"
            INSERT INTO recipe (
                recipe_id, name, servings, selling_price,
                labor_cost_rate, overhead_cost_rate, is_active,
                created_at, updated_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)
            "#,
            params![
                recipe.recipe_id,
                recipe.name,
                recipe.servings,
                recipe.selling_price,
                recipe.labor_cost_rate,
                recipe.overhead_cost_rate,
                recipe.is_active,
                recipe.created_at,
                recipe.updated_at,
            ],
        )?;
        Ok(())
    }

    /// 按 ID 查询配方
    pub fn find_by_id(&self, recipe_id: &str) -> RepositoryResult<Option<Recipe>> {
        let conn = self.get_conn()?;
        let mut stmt = conn.prepare(
            r#"
            SELECT
                recipe_id, name, servings, selling_price,
                labor_cost_rate, overhead_cost_rate, is_active,
                created_at, updated_at
            FROM recipe
            WHERE recipe_id = ?1
            "#,
        )?;

        let recipe = stmt
            .query_row(params![recipe_id], Self::map_row)
            .optional()?;

        Ok(recipe)
    }

    /// 查询启用中的配方 ID 列表（按 ID 排序）
    pub fn list_active_ids(&self) -> RepositoryResult<Vec<String>> {
        let conn = self.get_conn()?;
        let mut stmt = conn.prepare(
            "SELECT recipe_id FROM recipe WHERE is_active = 1 ORDER BY recipe_id",
        )?;

        let rows = stmt.query_map([], |row| row.get::<_, String>(0))?;
        let mut ids = Vec::new();
        for row in rows {
            ids.push(row?);
        }
        Ok(ids)
    }

    /// 更新配方售价
    pub fn update_selling_price(
        &self,
        recipe_id: &str,
        selling_price: f64,
    ) -> RepositoryResult<()> {
        let conn = self.get_conn()?;
        let affected = conn.execute(
            r#"
            UPDATE recipe
            SET selling_price = ?2, updated_at = ?3
            WHERE recipe_id = ?1
            "#,
            params![recipe_id, selling_price, Utc::now()],
        )?;

        if affected == 0 {
            return Err(RepositoryError::NotFound {
                entity: "Recipe".to_string(),
                id: recipe_id.to_string(),
            });
        }
        Ok(())
    }
}

// ==========================================
// IngredientUsage - 食材在配方中的使用情况
// ==========================================
// 用途: 变价影响归因（recipe_component × recipe 联查结果）
#[derive(Debug, Clone)]
pub struct IngredientUsage {
    pub recipe_id: String,       // 配方 ID
    pub recipe_name: String,     // 配方名称
    pub quantity_per_batch: f64, // 每批用量
}

// ==========================================
// RecipeComponentRepository - 配方用料仓储
// ==========================================

/// 配方用料仓储
/// 职责: 管理 recipe_component 表（配方-食材多对多关系）
pub struct RecipeComponentRepository {
    conn: Arc<Mutex<Connection>>,
}

impl RecipeComponentRepository {
    /// 创建新的配方用料仓储实例
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

    /// 写入配方用料（同配方同食材时覆盖用量）
    pub fn upsert(&self, component: &RecipeComponent) -> RepositoryResult<()> {
        let conn = self.get_conn()?;
        conn.execute(
            r#"
            INSERT INTO recipe_component (
                recipe_id, ingredient_id, quantity_per_batch, unit
            ) VALUES (?1, ?2, ?3, ?4)
            ON CONFLICT(recipe_id, ingredient_id)
            DO UPDATE SET quantity_per_batch = ?3, unit = ?4
            "#,
            params![
                component.recipe_id,
                component.ingredient_id,
                component.quantity_per_batch,
                component.unit,
            ],
        )?;
        Ok(())
    }

    /// 查询某配方的全部用料（按食材 ID 排序,保证编译结果顺序确定）
    pub fn find_by_recipe(&self, recipe_id: &str) -> RepositoryResult<Vec<RecipeComponent>> {
        let conn = self.get_conn()?;
        let mut stmt = conn.prepare(
            r#"
            SELECT recipe_id, ingredient_id, quantity_per_batch, unit
            FROM recipe_component
            WHERE recipe_id = ?1
            ORDER BY ingredient_id
            "#,
        )?;

        let rows = stmt.query_map(params![recipe_id], |row| {
            Ok(RecipeComponent {
                recipe_id: row.get(0)?,
                ingredient_id: row.get(1)?,
                quantity_per_batch: row.get(2)?,
                unit: row.get(3)?,
            })
        })?;

        let mut components = Vec::new();
        for row in rows {
            components.push(row?);
        }
        Ok(components)
    }

    /// 查询某食材被哪些启用中的配方使用（按配方 ID 稳定排序）
    ///
    /// 用途: 变价影响归因
    pub fn list_usage(&self, ingredient_id: &str) -> RepositoryResult<Vec<IngredientUsage>> {
        let conn = self.get_conn()?;
        let mut stmt = conn.prepare(
            r#"
            SELECT rc.recipe_id, r.name, rc.quantity_per_batch
            FROM recipe_component rc
            JOIN recipe r ON r.recipe_id = rc.recipe_id
            WHERE rc.ingredient_id = ?1
              AND r.is_active = 1
            ORDER BY rc.recipe_id
            "#,
        )?;

        let rows = stmt.query_map(params![ingredient_id], |row| {
            Ok(IngredientUsage {
                recipe_id: row.get(0)?,
                recipe_name: row.get(1)?,
                quantity_per_batch: row.get(2)?,
            })
        })?;

        let mut usages = Vec::new();
        for row in rows {
            usages.push(row?);
        }
        Ok(usages)
    }
}
