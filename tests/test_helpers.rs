// ==========================================
// 测试辅助函数
// ==========================================
// 职责: 提供测试所需的数据库初始化、测试数据生成等功能
// ==========================================

use std::error::Error;
use std::sync::{Arc, Mutex};

use chrono::Utc;
use rusqlite::Connection;
use tempfile::NamedTempFile;

use fnb_costing::app::AppState;
use fnb_costing::domain::{Ingredient, Recipe, RecipeComponent};

/// 创建临时测试数据库并初始化 schema
///
/// # 返回
/// - NamedTempFile: 临时数据库文件（需要保持存活）
/// - String: 数据库文件路径
pub fn create_test_db() -> Result<(NamedTempFile, String), Box<dyn Error>> {
    let temp_file = NamedTempFile::new()?;
    let db_path = temp_file.path().to_str().unwrap().to_string();

    let conn = fnb_costing::db::open_sqlite_connection(&db_path)?;
    fnb_costing::db::init_schema(&conn)?;

    Ok((temp_file, db_path))
}

/// 创建临时测试数据库并返回共享连接（引擎级测试用）
pub fn create_shared_conn() -> Result<(NamedTempFile, Arc<Mutex<Connection>>), Box<dyn Error>> {
    let (temp_file, db_path) = create_test_db()?;
    let conn = fnb_costing::db::open_sqlite_connection(&db_path)?;
    Ok((temp_file, Arc::new(Mutex::new(conn))))
}

/// 基于临时数据库创建 AppState（API 级测试用）
pub fn create_test_app() -> Result<(NamedTempFile, AppState), Box<dyn Error>> {
    let (temp_file, db_path) = create_test_db()?;
    let state = AppState::new(&db_path)?;
    Ok((temp_file, state))
}

/// 写入测试食材
pub fn seed_ingredient(state: &AppState, ingredient_id: &str, name: &str, list_price: f64) {
    let ingredient = Ingredient::new(ingredient_id, name, "kg", list_price);
    state
        .ingredient_repo
        .insert(&ingredient)
        .expect("写入测试食材失败");
}

/// 写入测试配方
pub fn seed_recipe(
    state: &AppState,
    recipe_id: &str,
    name: &str,
    servings: i64,
    labor_cost_rate: f64,
    overhead_cost_rate: f64,
    selling_price: Option<f64>,
) {
    let mut recipe = Recipe::new(recipe_id, name, servings);
    recipe.labor_cost_rate = labor_cost_rate;
    recipe.overhead_cost_rate = overhead_cost_rate;
    recipe.selling_price = selling_price;
    state.recipe_repo.insert(&recipe).expect("写入测试配方失败");
}

/// 写入测试配方用料
pub fn seed_component(
    state: &AppState,
    recipe_id: &str,
    ingredient_id: &str,
    quantity_per_batch: f64,
) {
    let component = RecipeComponent {
        recipe_id: recipe_id.to_string(),
        ingredient_id: ingredient_id.to_string(),
        quantity_per_batch,
        unit: "kg".to_string(),
    };
    state
        .component_repo
        .upsert(&component)
        .expect("写入测试配方用料失败");
}

/// 采购入账（忽略返回的预警,测试铺数据用）
pub async fn seed_purchase(state: &AppState, ingredient_id: &str, quantity: f64, unit_price: f64) {
    state
        .costing_api
        .record_purchase(ingredient_id, quantity, unit_price, Utc::now())
        .await
        .expect("采购入账失败");
}
