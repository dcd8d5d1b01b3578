// ==========================================
// 食品工坊经营系统 - 主入口
// ==========================================
// 技术栈: Rust + SQLite
// 系统定位: 经营决策支持 (成本核算与预警)
// ==========================================

use fnb_costing::app::{get_default_db_path, AppState};

fn main() {
    // 初始化日志系统
    fnb_costing::logging::init();

    tracing::info!("==================================================");
    tracing::info!("{}", fnb_costing::APP_NAME);
    tracing::info!("系统版本: {}", fnb_costing::VERSION);
    tracing::info!("==================================================");

    // 获取数据库路径
    let db_path = get_default_db_path();
    tracing::info!("使用数据库: {}", db_path);

    // 创建AppState（打开连接 + 初始化 schema + 装配 API）
    tracing::info!("正在初始化AppState...");
    let state = AppState::new(&db_path).expect("无法初始化AppState");

    let ingredients = state
        .ingredient_repo
        .list_active()
        .map(|list| list.len())
        .unwrap_or(0);
    let recipes = state
        .recipe_repo
        .list_active_ids()
        .map(|ids| ids.len())
        .unwrap_or(0);

    tracing::info!("AppState初始化成功: {} 个食材, {} 个配方", ingredients, recipes);
    tracing::info!("库模式使用: fnb_costing::app::AppState");
}
