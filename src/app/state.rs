// ==========================================
// 食品工坊经营系统 - 应用状态
// ==========================================
// 职责: 管理应用级别的共享状态和API实例
// ==========================================

use std::sync::{Arc, Mutex};

use crate::api::CostingApi;
use crate::config::config_manager::ConfigManager;
use crate::engine::advisor::PricingAdvisor;
use crate::engine::compiler::CostCompiler;
use crate::engine::cost_policy::StandardCostPolicy;
use crate::engine::detector::ChangeDetector;
use crate::engine::ledger::CostLedger;
use crate::repository::ingredient_repo::{IngredientRepository, PurchaseObservationRepository};
use crate::repository::recipe_repo::{RecipeComponentRepository, RecipeRepository};
use crate::repository::snapshot_repo::CostSnapshotRepository;

/// 应用状态
///
/// 包含所有API实例和共享资源
pub struct AppState {
    /// 数据库路径
    pub db_path: String,

    /// 成本核算API
    pub costing_api: Arc<CostingApi>,

    /// 配置管理器
    pub config_manager: Arc<ConfigManager>,

    /// 食材仓储（用于食材 CRUD）
    pub ingredient_repo: Arc<IngredientRepository>,

    /// 配方仓储（用于配方 CRUD）
    pub recipe_repo: Arc<RecipeRepository>,

    /// 配方用料仓储（用于配方用料维护）
    pub component_repo: Arc<RecipeComponentRepository>,

    /// 采购观察记录仓储（用于审计与维护）
    pub observation_repo: Arc<PurchaseObservationRepository>,

    /// 成本快照仓储（用于历史查询）
    pub snapshot_repo: Arc<CostSnapshotRepository>,
}

impl AppState {
    /// 创建新的AppState实例
    ///
    /// 打开共享连接,初始化 schema,装配仓储/引擎/API
    ///
    /// # 参数
    /// - db_path: 数据库文件路径
    pub fn new(db_path: &str) -> anyhow::Result<Self> {
        let conn = crate::db::open_sqlite_connection(db_path)?;
        crate::db::init_schema(&conn)?;
        let conn = Arc::new(Mutex::new(conn));

        // 仓储层（共享同一连接）
        let ingredient_repo = Arc::new(IngredientRepository::from_connection(Arc::clone(&conn)));
        let observation_repo =
            Arc::new(PurchaseObservationRepository::from_connection(Arc::clone(&conn)));
        let recipe_repo = Arc::new(RecipeRepository::from_connection(Arc::clone(&conn)));
        let component_repo =
            Arc::new(RecipeComponentRepository::from_connection(Arc::clone(&conn)));
        let snapshot_repo = Arc::new(CostSnapshotRepository::from_connection(Arc::clone(&conn)));

        // 配置层
        let config_manager = Arc::new(ConfigManager::from_connection(Arc::clone(&conn))?);

        // 引擎层
        let ledger = Arc::new(CostLedger::new(
            Arc::clone(&ingredient_repo),
            Arc::clone(&observation_repo),
        ));
        let compiler = Arc::new(CostCompiler::new(
            Arc::clone(&recipe_repo),
            Arc::clone(&component_repo),
            Arc::clone(&ledger),
            Arc::new(StandardCostPolicy::default()),
        ));
        let detector = Arc::new(ChangeDetector::new(
            Arc::clone(&ingredient_repo),
            Arc::clone(&observation_repo),
            Arc::clone(&component_repo),
            Arc::clone(&recipe_repo),
            Arc::clone(&snapshot_repo),
            Arc::clone(&compiler),
            Arc::clone(&config_manager),
        ));
        let advisor = Arc::new(PricingAdvisor::new());

        // API 层
        let costing_api = Arc::new(CostingApi::new(
            ledger,
            compiler,
            detector,
            advisor,
            Arc::clone(&config_manager),
            Arc::clone(&recipe_repo),
            Arc::clone(&observation_repo),
        ));

        Ok(Self {
            db_path: db_path.to_string(),
            costing_api,
            config_manager,
            ingredient_repo,
            recipe_repo,
            component_repo,
            observation_repo,
            snapshot_repo,
        })
    }
}

/// 解析默认数据库路径
pub fn get_default_db_path() -> String {
    use std::path::PathBuf;

    // 允许通过环境变量显式指定 DB 路径（便于调试/测试/CI）
    if let Ok(path) = std::env::var("FNB_COSTING_DB_PATH") {
        let trimmed = path.trim();
        if !trimmed.is_empty() {
            return trimmed.to_string();
        }
    }

    // 使用用户数据目录；先给一个默认回退值,后续如果能拿到 data_dir 再覆盖
    let mut path = PathBuf::from("./fnb_costing.db");

    if let Some(data_dir) = dirs::data_dir() {
        // 开发环境使用独立目录,避免污染生产数据
        #[cfg(debug_assertions)]
        {
            path = data_dir.join("fnb-costing-dev");
        }
        #[cfg(not(debug_assertions))]
        {
            path = data_dir.join("fnb-costing");
        }

        if std::fs::create_dir_all(&path).is_ok() {
            path = path.join("fnb_costing.db");
        } else {
            path = PathBuf::from("./fnb_costing.db");
        }
    }

    path.to_string_lossy().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_get_default_db_path() {
        let path = get_default_db_path();
        assert!(!path.is_empty());
        assert!(path.ends_with(".db"));
    }

    // 注意：AppState::new() 的测试需要真实的数据库文件
    // 这些测试在集成测试中进行
}
