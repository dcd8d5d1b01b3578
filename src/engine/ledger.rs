// ==========================================
// 食品工坊经营系统 - 食材成本台账引擎
// ==========================================
// 职责: 采购入账 + WAC 维护 + 当前单位成本查询
// 红线: 全系统的 WAC 变更集中在这里的唯一入口,
//       非负与清零重置两条不变量只在这一处执行
// 并发: 同一食材同一时刻至多一个进行中的入账
//       （按食材 ID 的互斥锁,读-改-写全程持锁）
// 说明: 入账不触发预警,预警由调用方在入账后显式触发
// ==========================================

use crate::domain::ingredient::{Ingredient, PriceVolatility, PurchaseObservation};
use crate::domain::types::ConsumptionReason;
use crate::engine::error::{CostingError, CostingResult};
use crate::engine::ledger_core::LedgerCore;
use crate::repository::ingredient_repo::{IngredientRepository, PurchaseObservationRepository};
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use tracing::{debug, info};
use uuid::Uuid;

/// 波动指标取样的采购记录条数
const VOLATILITY_SAMPLE_SIZE: i64 = 20;

// ==========================================
// CostLedger - 食材成本台账
// ==========================================
pub struct CostLedger {
    ingredient_repo: Arc<IngredientRepository>,
    observation_repo: Arc<PurchaseObservationRepository>,
    // 按食材 ID 的入账互斥锁
    ingredient_locks: Mutex<HashMap<String, Arc<Mutex<()>>>>,
}

impl CostLedger {
    /// 创建新的 CostLedger 实例
    ///
    /// # 参数
    /// - ingredient_repo: 食材仓储
    /// - observation_repo: 采购观察记录仓储
    pub fn new(
        ingredient_repo: Arc<IngredientRepository>,
        observation_repo: Arc<PurchaseObservationRepository>,
    ) -> Self {
        Self {
            ingredient_repo,
            observation_repo,
            ingredient_locks: Mutex::new(HashMap::new()),
        }
    }

    /// 获取某食材的入账互斥锁
    fn lock_for(&self, ingredient_id: &str) -> CostingResult<Arc<Mutex<()>>> {
        let mut locks = self
            .ingredient_locks
            .lock()
            .map_err(|e| CostingError::Internal(format!("锁获取失败: {}", e)))?;

        Ok(locks
            .entry(ingredient_id.to_string())
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone())
    }

    // ==========================================
    // 核心方法
    // ==========================================

    /// 采购入账
    ///
    /// 效果:
    /// 1. 重算 WAC（清零重置约定见 LedgerCore）
    /// 2. 库存加上采购数量
    /// 3. 追加一条采购观察记录
    ///
    /// # 参数
    /// - `ingredient_id`: 食材 ID
    /// - `quantity`: 采购数量（> 0）
    /// - `unit_price`: 采购单价（>= 0）
    /// - `occurred_at`: 采购发生时间
    ///
    /// # 返回
    /// 更新后的食材
    pub fn record_purchase(
        &self,
        ingredient_id: &str,
        quantity: f64,
        unit_price: f64,
        occurred_at: DateTime<Utc>,
    ) -> CostingResult<Ingredient> {
        // 参数校验
        if quantity <= 0.0 {
            return Err(CostingError::InvalidInput(format!(
                "采购数量必须大于 0: quantity={}",
                quantity
            )));
        }
        if unit_price < 0.0 {
            return Err(CostingError::InvalidInput(format!(
                "采购单价不能为负: unit_price={}",
                unit_price
            )));
        }

        // 同一食材串行化读-改-写,防止丢失更新
        let lock = self.lock_for(ingredient_id)?;
        let _guard = lock
            .lock()
            .map_err(|e| CostingError::Internal(format!("锁获取失败: {}", e)))?;

        let ingredient = self
            .ingredient_repo
            .find_by_id(ingredient_id)?
            .ok_or_else(|| CostingError::NotFound {
                entity: "Ingredient".to_string(),
                id: ingredient_id.to_string(),
            })?;

        let new_wac = LedgerCore::next_weighted_average_cost(
            ingredient.current_stock,
            ingredient.weighted_average_cost,
            quantity,
            unit_price,
        );
        let new_stock = ingredient.current_stock + quantity;

        self.ingredient_repo
            .update_stock_and_cost(ingredient_id, new_stock, new_wac)?;

        let observation = PurchaseObservation {
            observation_id: Uuid::new_v4().to_string(),
            ingredient_id: ingredient_id.to_string(),
            quantity,
            unit_price,
            occurred_at,
            created_at: Utc::now(),
        };
        self.observation_repo.append(&observation)?;

        info!(
            ingredient_id = %ingredient_id,
            quantity,
            unit_price,
            new_wac,
            new_stock,
            "采购入账完成"
        );

        self.ingredient_repo
            .find_by_id(ingredient_id)?
            .ok_or_else(|| CostingError::NotFound {
                entity: "Ingredient".to_string(),
                id: ingredient_id.to_string(),
            })
    }

    /// 出库（生产领用/损耗）
    ///
    /// 只减库存,不改 WAC；库存下限为 0。
    /// 库存清零后,下一次采购的 WAC 将重置为该次采购单价
    // TODO: 出库流水落库（stock_movement 表）,便于期末对账

    pub fn record_consumption(
        &self,
        ingredient_id: &str,
        quantity: f64,
        reason: ConsumptionReason,
    ) -> CostingResult<Ingredient> {
        if quantity <= 0.0 {
            return Err(CostingError::InvalidInput(format!(
                "出库数量必须大于 0: quantity={}",
                quantity
            )));
        }

        let lock = self.lock_for(ingredient_id)?;
        let _guard = lock
            .lock()
            .map_err(|e| CostingError::Internal(format!("锁获取失败: {}", e)))?;

        let ingredient = self
            .ingredient_repo
            .find_by_id(ingredient_id)?
            .ok_or_else(|| CostingError::NotFound {
                entity: "Ingredient".to_string(),
                id: ingredient_id.to_string(),
            })?;

        let new_stock = LedgerCore::apply_consumption(ingredient.current_stock, quantity);

        self.ingredient_repo.update_stock_and_cost(
            ingredient_id,
            new_stock,
            ingredient.weighted_average_cost,
        )?;

        debug!(
            ingredient_id = %ingredient_id,
            quantity,
            reason = %reason,
            new_stock,
            "出库完成"
        );

        self.ingredient_repo
            .find_by_id(ingredient_id)?
            .ok_or_else(|| CostingError::NotFound {
                entity: "Ingredient".to_string(),
                id: ingredient_id.to_string(),
            })
    }

    /// 查询食材当前单位成本
    ///
    /// 有采购记录时取 WAC,否则取报价单价兜底
    pub fn current_unit_cost(&self, ingredient_id: &str) -> CostingResult<f64> {
        let (_, unit_cost) = self.current_cost_entry(ingredient_id)?;
        Ok(unit_cost)
    }

    /// 查询食材及其当前单位成本（编译器用,避免重复查询）
    pub fn current_cost_entry(&self, ingredient_id: &str) -> CostingResult<(Ingredient, f64)> {
        let ingredient = self
            .ingredient_repo
            .find_by_id(ingredient_id)?
            .ok_or_else(|| CostingError::NotFound {
                entity: "Ingredient".to_string(),
                id: ingredient_id.to_string(),
            })?;

        let has_history = self.observation_repo.count_for(ingredient_id)? > 0;
        let unit_cost = if has_history {
            ingredient.weighted_average_cost
        } else {
            ingredient.list_price
        };

        Ok((ingredient, unit_cost))
    }

    /// 查询食材近期采购价波动指标
    pub fn price_volatility(&self, ingredient_id: &str) -> CostingResult<PriceVolatility> {
        // 先确认食材存在
        self.ingredient_repo
            .find_by_id(ingredient_id)?
            .ok_or_else(|| CostingError::NotFound {
                entity: "Ingredient".to_string(),
                id: ingredient_id.to_string(),
            })?;

        let observations = self
            .observation_repo
            .find_recent(ingredient_id, VOLATILITY_SAMPLE_SIZE)?;
        let prices: Vec<f64> = observations.iter().map(|o| o.unit_price).collect();

        Ok(LedgerCore::price_volatility(&prices))
    }
}
