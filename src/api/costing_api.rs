// ==========================================
// 食品工坊经营系统 - 成本核算 API
// ==========================================
// 职责: 组合台账/编译/检测/定价四个引擎,对外提供业务接口
// 说明: HTTP 路由/鉴权/响应整形属于外层边界,不在这里
// 批量接口: 各项相互独立,单项失败不中断批次
// ==========================================

use std::sync::Arc;

use chrono::{DateTime, Utc};
use futures::future;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::api::error::{ApiError, ApiResult};
use crate::config::config_manager::ConfigManager;
use crate::config::costing_config_trait::CostingConfigReader;
use crate::domain::alert::{CostChangeAlert, RecipeCostAlert};
use crate::domain::costing::{CostBreakdown, CostSnapshot};
use crate::domain::ingredient::{Ingredient, PriceVolatility};
use crate::domain::types::ConsumptionReason;
use crate::engine::advisor::{MarginPolicy, PriceEvaluation, PricingAdvisor, PricingSuggestion};
use crate::engine::compiler::CostCompiler;
use crate::engine::detector::ChangeDetector;
use crate::engine::ledger::CostLedger;
use crate::repository::ingredient_repo::PurchaseObservationRepository;
use crate::repository::recipe_repo::RecipeRepository;

// ==========================================
// RecordPurchaseResult - 采购入账结果
// ==========================================
/// 采购入账结果: 更新后的食材 + 本次触发的变价预警
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecordPurchaseResult {
    pub ingredient: Ingredient,
    pub alerts: Vec<CostChangeAlert>,
}

// ==========================================
// BatchCompileItem - 批量编译单项结果
// ==========================================
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchCompileItem {
    pub recipe_id: String,
    pub breakdown: Option<CostBreakdown>,
    pub error: Option<String>,
}

// ==========================================
// BatchSnapshotItem - 批量快照单项结果
// ==========================================
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchSnapshotItem {
    pub recipe_id: String,
    pub snapshot: Option<CostSnapshot>,
    pub error: Option<String>,
}

// ==========================================
// CostingApi - 成本核算 API
// ==========================================

/// 成本核算API
///
/// 职责：
/// 1. 采购入账（入账后显式触发变价检测）
/// 2. 配方成本查询与批量编译
/// 3. 成本快照与配方级预警
/// 4. 定价建议与现价评估
pub struct CostingApi {
    ledger: Arc<CostLedger>,
    compiler: Arc<CostCompiler>,
    detector: Arc<ChangeDetector<ConfigManager>>,
    advisor: Arc<PricingAdvisor>,
    config: Arc<ConfigManager>,
    recipe_repo: Arc<RecipeRepository>,
    observation_repo: Arc<PurchaseObservationRepository>,
}

impl CostingApi {
    /// 创建新的CostingApi实例
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        ledger: Arc<CostLedger>,
        compiler: Arc<CostCompiler>,
        detector: Arc<ChangeDetector<ConfigManager>>,
        advisor: Arc<PricingAdvisor>,
        config: Arc<ConfigManager>,
        recipe_repo: Arc<RecipeRepository>,
        observation_repo: Arc<PurchaseObservationRepository>,
    ) -> Self {
        Self {
            ledger,
            compiler,
            detector,
            advisor,
            config,
            recipe_repo,
            observation_repo,
        }
    }

    // ==========================================
    // 台账接口
    // ==========================================

    /// 采购入账并触发变价检测
    ///
    /// 台账只负责入账；预警在入账成功后由这里显式触发,
    /// 预警值随结果返回,交由通知协作方送达（含去重）
    pub async fn record_purchase(
        &self,
        ingredient_id: &str,
        quantity: f64,
        unit_price: f64,
        occurred_at: DateTime<Utc>,
    ) -> ApiResult<RecordPurchaseResult> {
        if ingredient_id.trim().is_empty() {
            return Err(ApiError::InvalidInput("食材ID不能为空".to_string()));
        }

        let ingredient = self
            .ledger
            .record_purchase(ingredient_id, quantity, unit_price, occurred_at)?;

        let alerts = self.detector.detect_changes(ingredient_id).await?;

        Ok(RecordPurchaseResult { ingredient, alerts })
    }

    /// 出库（生产领用/损耗）
    pub fn record_consumption(
        &self,
        ingredient_id: &str,
        quantity: f64,
        reason: ConsumptionReason,
    ) -> ApiResult<Ingredient> {
        if ingredient_id.trim().is_empty() {
            return Err(ApiError::InvalidInput("食材ID不能为空".to_string()));
        }

        Ok(self
            .ledger
            .record_consumption(ingredient_id, quantity, reason)?)
    }

    /// 查询食材近期采购价波动指标
    pub fn price_volatility(&self, ingredient_id: &str) -> ApiResult<PriceVolatility> {
        Ok(self.ledger.price_volatility(ingredient_id)?)
    }

    /// 清理某食材较早的采购观察记录
    ///
    /// 保留条数下限为 2（变价检测的最小需求）
    pub async fn prune_observation_history(&self, ingredient_id: &str) -> ApiResult<usize> {
        let keep_n = self.config.observation_keep_n().await?;
        if keep_n < 2 {
            return Err(ApiError::InvalidInput(format!(
                "观察记录保留条数不能少于 2: keep_n={}",
                keep_n
            )));
        }
        Ok(self.observation_repo.prune_history(ingredient_id, keep_n)?)
    }

    // ==========================================
    // 成本编译接口
    // ==========================================

    /// 查询配方当前成本明细
    ///
    /// 纯读取,不产生快照；同一状态下重复调用结果逐位相同
    pub fn get_recipe_cost(&self, recipe_id: &str) -> ApiResult<CostBreakdown> {
        Ok(self.compiler.compile(recipe_id)?)
    }

    /// 批量编译（顺序执行,单项失败不中断批次）
    pub fn compile_all(&self, recipe_ids: &[String]) -> Vec<BatchCompileItem> {
        self.compiler
            .compile_all(recipe_ids)
            .into_iter()
            .map(|(recipe_id, result)| match result {
                Ok(breakdown) => BatchCompileItem {
                    recipe_id,
                    breakdown: Some(breakdown),
                    error: None,
                },
                Err(err) => BatchCompileItem {
                    recipe_id,
                    breakdown: None,
                    error: Some(err.to_string()),
                },
            })
            .collect()
    }

    /// 批量编译（并行扇出）
    ///
    /// 各配方读取的是同一瞬间的不可变状态,互不共享可写状态,
    /// 可安全并行；结果按入参顺序返回
    pub async fn compile_all_parallel(&self, recipe_ids: Vec<String>) -> Vec<BatchCompileItem> {
        let handles: Vec<_> = recipe_ids
            .iter()
            .map(|recipe_id| {
                let compiler = Arc::clone(&self.compiler);
                let recipe_id = recipe_id.clone();
                tokio::task::spawn_blocking(move || compiler.compile(&recipe_id))
            })
            .collect();

        let results = future::join_all(handles).await;

        recipe_ids
            .into_iter()
            .zip(results)
            .map(|(recipe_id, joined)| match joined {
                Ok(Ok(breakdown)) => BatchCompileItem {
                    recipe_id,
                    breakdown: Some(breakdown),
                    error: None,
                },
                Ok(Err(err)) => BatchCompileItem {
                    recipe_id,
                    breakdown: None,
                    error: Some(err.to_string()),
                },
                Err(join_err) => BatchCompileItem {
                    recipe_id,
                    breakdown: None,
                    error: Some(format!("任务执行失败: {}", join_err)),
                },
            })
            .collect()
    }

    // ==========================================
    // 快照与预警接口
    // ==========================================

    /// 生成并落库一条成本快照
    pub fn snapshot_recipe(&self, recipe_id: &str) -> ApiResult<CostSnapshot> {
        Ok(self.detector.snapshot(recipe_id)?)
    }

    /// 为全部启用中的配方生成快照（并行扇出）
    ///
    /// 单个配方失败不影响其余配方,失败按配方 ID 单独上报
    pub async fn snapshot_all_active(&self) -> ApiResult<Vec<BatchSnapshotItem>> {
        let recipe_ids = self.recipe_repo.list_active_ids()?;

        let handles: Vec<_> = recipe_ids
            .iter()
            .map(|recipe_id| {
                let detector = Arc::clone(&self.detector);
                let recipe_id = recipe_id.clone();
                tokio::task::spawn_blocking(move || detector.snapshot(&recipe_id))
            })
            .collect();

        let results = future::join_all(handles).await;

        let items = recipe_ids
            .into_iter()
            .zip(results)
            .map(|(recipe_id, joined)| match joined {
                Ok(Ok(snapshot)) => BatchSnapshotItem {
                    recipe_id,
                    snapshot: Some(snapshot),
                    error: None,
                },
                Ok(Err(err)) => {
                    warn!(recipe_id = %recipe_id, error = %err, "配方快照失败");
                    BatchSnapshotItem {
                        recipe_id,
                        snapshot: None,
                        error: Some(err.to_string()),
                    }
                }
                Err(join_err) => BatchSnapshotItem {
                    recipe_id,
                    snapshot: None,
                    error: Some(format!("任务执行失败: {}", join_err)),
                },
            })
            .collect();
        Ok(items)
    }

    /// 多食材变价扫描
    ///
    /// 预警按检查顺序返回；单个食材失败记录日志后继续
    pub async fn detect_ingredient_alerts(
        &self,
        ingredient_ids: &[String],
    ) -> Vec<CostChangeAlert> {
        let results = self.detector.detect_changes_sweep(ingredient_ids).await;

        let mut alerts = Vec::new();
        for (ingredient_id, result) in results {
            match result {
                Ok(mut item_alerts) => alerts.append(&mut item_alerts),
                Err(err) => {
                    warn!(ingredient_id = %ingredient_id, error = %err, "食材变价检测失败");
                }
            }
        }
        alerts
    }

    /// 配方级预警（HPP 变动 + 毛利下限）
    pub async fn detect_recipe_alerts(&self, recipe_id: &str) -> ApiResult<Vec<RecipeCostAlert>> {
        Ok(self.detector.detect_recipe_changes(recipe_id).await?)
    }

    // ==========================================
    // 定价接口
    // ==========================================

    /// 三档定价建议（默认策略取自配置,可被入参覆盖）
    pub async fn suggest_pricing(
        &self,
        recipe_id: &str,
        policy_override: Option<MarginPolicy>,
    ) -> ApiResult<PricingSuggestion> {
        let breakdown = self.compiler.compile(recipe_id)?;

        let policy = match policy_override {
            Some(policy) => policy,
            None => MarginPolicy {
                economy_pct: self.config.margin_economy_pct().await?,
                standard_pct: self.config.margin_standard_pct().await?,
                premium_pct: self.config.margin_premium_pct().await?,
                rounding_step: self.config.price_rounding_step().await?,
            },
        };

        debug!(recipe_id = %recipe_id, cost_per_unit = breakdown.cost_per_unit, "生成定价建议");
        Ok(self.advisor.suggest_pricing(&breakdown, &policy))
    }

    /// 评估配方现有售价
    pub fn evaluate_price(&self, recipe_id: &str) -> ApiResult<PriceEvaluation> {
        let breakdown = self.compiler.compile(recipe_id)?;

        let recipe = self
            .recipe_repo
            .find_by_id(recipe_id)?
            .ok_or_else(|| ApiError::NotFound(format!("Recipe(id={})不存在", recipe_id)))?;

        Ok(self
            .advisor
            .evaluate_current_price(&breakdown, recipe.selling_price))
    }

    /// 采纳建议价,更新配方售价
    pub fn apply_selling_price(&self, recipe_id: &str, selling_price: f64) -> ApiResult<()> {
        if selling_price <= 0.0 {
            return Err(ApiError::InvalidInput(format!(
                "售价必须大于 0: selling_price={}",
                selling_price
            )));
        }
        self.recipe_repo
            .update_selling_price(recipe_id, selling_price)?;
        Ok(())
    }
}
