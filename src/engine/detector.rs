// ==========================================
// 食品工坊经营系统 - 成本快照与变价检测引擎
// ==========================================
// 职责: 快照落库 + 食材变价检测 + 配方 HPP 对比预警
// 红线: 检测是纯判定,只决定"要不要报、报什么"；
//       是否重复通知/送达渠道/已读状态由通知协作方负责
// 阈值: 噪声下限与重大变动阈值为可调配置（config_kv）
// ==========================================

use crate::config::costing_config_trait::CostingConfigReader;
use crate::domain::alert::{AffectedRecipe, CostChangeAlert, RecipeCostAlert};
use crate::domain::costing::CostSnapshot;
use crate::domain::types::{AlertKind, AlertSeverity, RecipeAlertKind};
use crate::engine::compiler::CostCompiler;
use crate::engine::error::{CostingError, CostingResult};
use crate::engine::ledger_core::LedgerCore;
use crate::i18n::{t, t_with_args};
use crate::repository::ingredient_repo::{IngredientRepository, PurchaseObservationRepository};
use crate::repository::recipe_repo::{RecipeComponentRepository, RecipeRepository};
use crate::repository::snapshot_repo::CostSnapshotRepository;
use chrono::Utc;
use std::sync::Arc;
use tracing::{debug, info};
use uuid::Uuid;

/// 金额展示格式（整数金额不带小数位）
fn format_amount(value: f64) -> String {
    if value.fract().abs() < f64::EPSILON {
        format!("{:.0}", value)
    } else {
        format!("{:.2}", value)
    }
}

// ==========================================
// ChangeDetector - 成本快照与变价检测引擎
// ==========================================
pub struct ChangeDetector<C>
where
    C: CostingConfigReader,
{
    ingredient_repo: Arc<IngredientRepository>,
    observation_repo: Arc<PurchaseObservationRepository>,
    component_repo: Arc<RecipeComponentRepository>,
    recipe_repo: Arc<RecipeRepository>,
    snapshot_repo: Arc<CostSnapshotRepository>,
    compiler: Arc<CostCompiler>,
    config: Arc<C>,
}

impl<C> ChangeDetector<C>
where
    C: CostingConfigReader,
{
    /// 创建新的 ChangeDetector 实例
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        ingredient_repo: Arc<IngredientRepository>,
        observation_repo: Arc<PurchaseObservationRepository>,
        component_repo: Arc<RecipeComponentRepository>,
        recipe_repo: Arc<RecipeRepository>,
        snapshot_repo: Arc<CostSnapshotRepository>,
        compiler: Arc<CostCompiler>,
        config: Arc<C>,
    ) -> Self {
        Self {
            ingredient_repo,
            observation_repo,
            component_repo,
            recipe_repo,
            snapshot_repo,
            compiler,
            config,
        }
    }

    // ==========================================
    // 快照
    // ==========================================

    /// 生成并落库一条成本快照
    ///
    /// 编译当前成本,连同快照时刻的售价/毛利率一起写入；
    /// 写入后不可变。每次显式请求产生一条（读取不产生快照）
    pub fn snapshot(&self, recipe_id: &str) -> CostingResult<CostSnapshot> {
        let breakdown = self.compiler.compile(recipe_id)?;

        let recipe = self
            .recipe_repo
            .find_by_id(recipe_id)?
            .ok_or_else(|| CostingError::NotFound {
                entity: "Recipe".to_string(),
                id: recipe_id.to_string(),
            })?;

        let selling_price = recipe.selling_price.filter(|p| *p > 0.0);
        let margin_pct = selling_price
            .map(|price| LedgerCore::round2((price - breakdown.cost_per_unit) / price * 100.0));

        let snapshot = CostSnapshot {
            snapshot_id: Uuid::new_v4().to_string(),
            recipe_id: recipe_id.to_string(),
            material_cost: breakdown.material_cost,
            labor_cost: breakdown.labor_cost,
            overhead_cost: breakdown.overhead_cost,
            total_cost: breakdown.total_cost,
            cost_per_unit: breakdown.cost_per_unit,
            servings: breakdown.servings,
            empty_recipe: breakdown.empty_recipe,
            ingredient_lines: breakdown.ingredient_lines,
            selling_price,
            margin_pct,
            captured_at: Utc::now(),
        };

        self.snapshot_repo.insert(&snapshot)?;

        info!(
            recipe_id = %recipe_id,
            total_cost = snapshot.total_cost,
            "成本快照已落库"
        );

        Ok(snapshot)
    }

    // ==========================================
    // 食材变价检测
    // ==========================================

    /// 检测某食材最近一次采购的变价
    ///
    /// 对比最近两条采购观察记录:
    /// - 不足两条 -> 空列表（历史不足属正常状态,不报错）
    /// - 上一次单价 <= 0 -> 空列表（除零保护,不报错）
    /// - abs(变动比例) 未超过噪声下限 -> 空列表（恰好等于下限不报,1.0% 不报、1.01% 报）
    /// - 无任何配方受非零影响 -> 空列表（价格变动只有被使用才有意义）
    ///
    /// 受影响配方按配方 ID 稳定排序,保证结果可复现
    pub async fn detect_changes(
        &self,
        ingredient_id: &str,
    ) -> CostingResult<Vec<CostChangeAlert>> {
        let noise_floor = self.config.noise_floor_pct().await?;
        let high_threshold = self.config.high_severity_pct().await?;

        let ingredient = self
            .ingredient_repo
            .find_by_id(ingredient_id)?
            .ok_or_else(|| CostingError::NotFound {
                entity: "Ingredient".to_string(),
                id: ingredient_id.to_string(),
            })?;

        let observations = self.observation_repo.find_recent(ingredient_id, 2)?;
        if observations.len() < 2 {
            debug!(ingredient_id = %ingredient_id, "采购历史不足两条,无可对比项");
            return Ok(Vec::new());
        }

        let latest = &observations[0];
        let previous = &observations[1];

        if previous.unit_price <= 0.0 {
            debug!(ingredient_id = %ingredient_id, "上一次采购单价非正,跳过变价计算");
            return Ok(Vec::new());
        }

        let change_amount = latest.unit_price - previous.unit_price;
        let change_percent = change_amount / previous.unit_price * 100.0;

        if change_percent.abs() <= noise_floor {
            return Ok(Vec::new());
        }

        // 影响归因: 变动额 × 每批用量,零影响的配方剔除
        let usages = self.component_repo.list_usage(ingredient_id)?;
        let affected_recipes: Vec<AffectedRecipe> = usages
            .into_iter()
            .map(|usage| AffectedRecipe {
                recipe_id: usage.recipe_id,
                recipe_name: usage.recipe_name,
                cost_impact: LedgerCore::round2(change_amount * usage.quantity_per_batch),
            })
            .filter(|affected| affected.cost_impact != 0.0)
            .collect();

        if affected_recipes.is_empty() {
            debug!(
                ingredient_id = %ingredient_id,
                change_percent,
                "变价未影响任何配方,不产生预警"
            );
            return Ok(Vec::new());
        }

        let severity = if change_percent.abs() > high_threshold {
            AlertSeverity::High
        } else {
            AlertSeverity::Normal
        };
        let kind = if change_amount > 0.0 {
            AlertKind::CostIncrease
        } else {
            AlertKind::CostDecrease
        };

        let key_prefix = match kind {
            AlertKind::CostIncrease => "alert.cost_increase",
            AlertKind::CostDecrease => "alert.cost_decrease",
        };
        let title = t(&format!("{}.title", key_prefix));
        let message = t_with_args(
            &format!("{}.message", key_prefix),
            &[
                ("name", ingredient.name.as_str()),
                ("pct", &format!("{:.1}", change_percent.abs())),
                ("old", &format_amount(previous.unit_price)),
                ("new", &format_amount(latest.unit_price)),
                ("count", &affected_recipes.len().to_string()),
            ],
        );

        let alert = CostChangeAlert {
            ingredient_id: ingredient_id.to_string(),
            ingredient_name: ingredient.name,
            kind,
            severity,
            previous_unit_price: previous.unit_price,
            current_unit_price: latest.unit_price,
            change_amount,
            change_percent,
            title,
            message,
            affected_recipes,
            observed_at: latest.occurred_at,
        };

        info!(
            ingredient_id = %ingredient_id,
            change_percent,
            severity = %alert.severity,
            affected = alert.affected_recipes.len(),
            "检测到食材变价"
        );

        Ok(vec![alert])
    }

    /// 多食材扫描
    ///
    /// 结果按检查顺序返回；单个食材失败不会中断扫描,
    /// 失败按食材 ID 单独上报
    pub async fn detect_changes_sweep(
        &self,
        ingredient_ids: &[String],
    ) -> Vec<(String, CostingResult<Vec<CostChangeAlert>>)> {
        let mut results = Vec::with_capacity(ingredient_ids.len());
        for ingredient_id in ingredient_ids {
            let result = self.detect_changes(ingredient_id).await;
            results.push((ingredient_id.clone(), result));
        }
        results
    }

    // ==========================================
    // 配方 HPP 对比预警
    // ==========================================

    /// 基于最近两条快照的配方级预警
    ///
    /// 规则 1: HPP 变动 abs >= 阈值(默认 10%) -> 预警,超过 20% 为 HIGH
    /// 规则 2: 最新快照毛利率低于下限(默认 15%) -> 预警,低于 10% 为 HIGH
    /// 快照不足两条时规则 1 不适用；没有任何快照时返回空列表
    pub async fn detect_recipe_changes(
        &self,
        recipe_id: &str,
    ) -> CostingResult<Vec<RecipeCostAlert>> {
        let change_threshold = self.config.recipe_change_threshold_pct().await?;
        let high_threshold = self.config.recipe_high_severity_pct().await?;
        let margin_floor = self.config.margin_floor_pct().await?;
        let margin_critical = self.config.margin_critical_pct().await?;

        let recipe = self
            .recipe_repo
            .find_by_id(recipe_id)?
            .ok_or_else(|| CostingError::NotFound {
                entity: "Recipe".to_string(),
                id: recipe_id.to_string(),
            })?;

        let snapshots = self.snapshot_repo.find_latest(recipe_id, 2)?;
        let mut alerts = Vec::new();

        // 规则 1: HPP 变动
        if snapshots.len() >= 2 {
            let current = &snapshots[0];
            let previous = &snapshots[1];

            if previous.total_cost > 0.0 {
                let change_percent =
                    (current.total_cost - previous.total_cost) / previous.total_cost * 100.0;

                if change_percent.abs() >= change_threshold {
                    let kind = if change_percent > 0.0 {
                        RecipeAlertKind::HppIncrease
                    } else {
                        RecipeAlertKind::HppDecrease
                    };
                    let severity = if change_percent.abs() > high_threshold {
                        AlertSeverity::High
                    } else {
                        AlertSeverity::Normal
                    };

                    let key_prefix = match kind {
                        RecipeAlertKind::HppIncrease => "alert.hpp_increase",
                        _ => "alert.hpp_decrease",
                    };
                    alerts.push(RecipeCostAlert {
                        recipe_id: recipe_id.to_string(),
                        recipe_name: recipe.name.clone(),
                        kind,
                        severity,
                        previous_value: previous.total_cost,
                        current_value: current.total_cost,
                        change_percent,
                        title: t(&format!("{}.title", key_prefix)),
                        message: t_with_args(
                            &format!("{}.message", key_prefix),
                            &[
                                ("name", recipe.name.as_str()),
                                ("pct", &format!("{:.1}", change_percent.abs())),
                                ("old", &format_amount(previous.total_cost)),
                                ("new", &format_amount(current.total_cost)),
                            ],
                        ),
                        observed_at: current.captured_at,
                    });
                }
            }
        }

        // 规则 2: 毛利率下限
        if let Some(latest) = snapshots.first() {
            if let Some(margin) = latest.margin_pct {
                if margin < margin_floor {
                    let severity = if margin < margin_critical {
                        AlertSeverity::High
                    } else {
                        AlertSeverity::Normal
                    };

                    alerts.push(RecipeCostAlert {
                        recipe_id: recipe_id.to_string(),
                        recipe_name: recipe.name.clone(),
                        kind: RecipeAlertKind::MarginLow,
                        severity,
                        previous_value: margin_floor,
                        current_value: margin,
                        change_percent: 0.0,
                        title: t("alert.margin_low.title"),
                        message: t_with_args(
                            "alert.margin_low.message",
                            &[
                                ("name", recipe.name.as_str()),
                                ("pct", &format!("{:.1}", margin)),
                                ("floor", &format!("{:.0}", margin_floor)),
                            ],
                        ),
                        observed_at: latest.captured_at,
                    });
                }
            }
        }

        Ok(alerts)
    }
}
