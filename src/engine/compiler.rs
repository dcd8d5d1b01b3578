// ==========================================
// 食品工坊经营系统 - 配方成本编译引擎
// ==========================================
// 职责: 配方用料 × 当前单位成本 -> 成本明细（HPP）
// 红线: 编译是当前状态的纯读取,不产生任何持久化副作用,
//       快照落库由 ChangeDetector 的显式快照请求负责
// 不变量: total_cost == material_cost + labor_cost + overhead_cost
// 不变量: cost_per_unit == total_cost / servings (servings <= 0 报错)
// ==========================================

use crate::domain::costing::{CostBreakdown, IngredientLine};
use crate::engine::cost_policy::LaborOverheadPolicy;
use crate::engine::error::{CostingError, CostingResult};
use crate::engine::ledger::CostLedger;
use crate::engine::ledger_core::LedgerCore;
use crate::repository::recipe_repo::{RecipeComponentRepository, RecipeRepository};
use std::sync::Arc;
use tracing::debug;

// ==========================================
// CostCompiler - 配方成本编译引擎
// ==========================================
pub struct CostCompiler {
    recipe_repo: Arc<RecipeRepository>,
    component_repo: Arc<RecipeComponentRepository>,
    ledger: Arc<CostLedger>,
    policy: Arc<dyn LaborOverheadPolicy>,
}

impl CostCompiler {
    /// 创建新的 CostCompiler 实例
    ///
    /// # 参数
    /// - recipe_repo: 配方仓储
    /// - component_repo: 配方用料仓储
    /// - ledger: 食材成本台账（提供当前单位成本）
    /// - policy: 人工/间接成本策略
    pub fn new(
        recipe_repo: Arc<RecipeRepository>,
        component_repo: Arc<RecipeComponentRepository>,
        ledger: Arc<CostLedger>,
        policy: Arc<dyn LaborOverheadPolicy>,
    ) -> Self {
        Self {
            recipe_repo,
            component_repo,
            ledger,
            policy,
        }
    }

    // ==========================================
    // 核心方法
    // ==========================================

    /// 编译配方成本（使用引擎默认策略）
    pub fn compile(&self, recipe_id: &str) -> CostingResult<CostBreakdown> {
        self.compile_with_policy(recipe_id, self.policy.as_ref())
    }

    /// 编译配方成本（调用级覆盖策略）
    ///
    /// # 参数
    /// - `recipe_id`: 配方 ID
    /// - `policy`: 本次编译使用的成本策略
    ///
    /// # 返回
    /// - Ok(CostBreakdown): 成本明细；配方无用料时返回零成本并置 empty_recipe 标记
    /// - Err(NotFound): 配方不存在
    /// - Err(InvalidServings): servings <= 0
    pub fn compile_with_policy(
        &self,
        recipe_id: &str,
        policy: &dyn LaborOverheadPolicy,
    ) -> CostingResult<CostBreakdown> {
        let recipe = self
            .recipe_repo
            .find_by_id(recipe_id)?
            .ok_or_else(|| CostingError::NotFound {
                entity: "Recipe".to_string(),
                id: recipe_id.to_string(),
            })?;

        if recipe.servings <= 0 {
            return Err(CostingError::InvalidServings {
                recipe_id: recipe_id.to_string(),
                servings: recipe.servings,
            });
        }

        let components = self.component_repo.find_by_recipe(recipe_id)?;

        // 空配方是可恢复的正常状态: 零成本 + 标记,提示补录用料
        if components.is_empty() {
            debug!(recipe_id = %recipe_id, "配方无用料,返回零成本明细");
            return Ok(CostBreakdown::empty(recipe_id, &recipe.name, recipe.servings));
        }

        // 1. 逐行计算原料成本
        let mut lines = Vec::with_capacity(components.len());
        let mut material_cost = 0.0;
        for component in &components {
            let (ingredient, unit_cost) =
                self.ledger.current_cost_entry(&component.ingredient_id)?;
            let line_cost = LedgerCore::round2(component.quantity_per_batch * unit_cost);
            material_cost += line_cost;

            lines.push(IngredientLine {
                ingredient_id: component.ingredient_id.clone(),
                ingredient_name: ingredient.name,
                quantity: component.quantity_per_batch,
                unit: component.unit.clone(),
                unit_cost,
                line_cost,
                share_pct: 0.0, // 总成本确定后回填
            });
        }
        let material_cost = LedgerCore::round2(material_cost);

        // 2. 人工/间接成本由策略计算
        let labor_cost = LedgerCore::round2(policy.labor_cost(material_cost, &recipe));
        let overhead_cost = LedgerCore::round2(policy.overhead_cost(material_cost, &recipe));

        // 3. 汇总
        let total_cost = material_cost + labor_cost + overhead_cost;
        let cost_per_unit = total_cost / recipe.servings as f64;

        // 4. 回填各行占总成本比例
        for line in &mut lines {
            line.share_pct = if total_cost > 0.0 {
                LedgerCore::round2(line.line_cost / total_cost * 100.0)
            } else {
                0.0
            };
        }

        Ok(CostBreakdown {
            recipe_id: recipe_id.to_string(),
            recipe_name: recipe.name,
            servings: recipe.servings,
            material_cost,
            labor_cost,
            overhead_cost,
            total_cost,
            cost_per_unit,
            empty_recipe: false,
            ingredient_lines: lines,
        })
    }

    /// 批量编译
    ///
    /// 各配方相互独立,单个配方失败不会中断批次,
    /// 失败按配方 ID 单独上报
    pub fn compile_all(
        &self,
        recipe_ids: &[String],
    ) -> Vec<(String, CostingResult<CostBreakdown>)> {
        recipe_ids
            .iter()
            .map(|recipe_id| (recipe_id.clone(), self.compile(recipe_id)))
            .collect()
    }
}
