// ==========================================
// 成本核算 API 端到端测试
// ==========================================
// 覆盖: 采购->编译->快照->定价 全链路 / 定价建议 /
//       现价评估 / 并行批量 / 配置化加成
// ==========================================

mod test_helpers;

use chrono::{TimeZone, Utc};
use fnb_costing::api::ApiError;
use fnb_costing::domain::types::{MarginHealth, PriceTier};
use fnb_costing::engine::MarginPolicy;
use test_helpers::*;

#[tokio::test]
async fn test_full_costing_flow() {
    let (_tmp, state) = create_test_app().unwrap();
    let api = &state.costing_api;

    // 1. 建食材与配方
    seed_ingredient(&state, "ING001", "Tepung Terigu", 0.0);
    seed_recipe(&state, "R001", "Roti Tawar", 4, 0.0, 0.1, None);
    seed_component(&state, "R001", "ING001", 2.0);

    // 2. 采购入账两笔 -> WAC = 1100
    let t1 = Utc.with_ymd_and_hms(2026, 8, 1, 8, 0, 0).unwrap();
    let t2 = Utc.with_ymd_and_hms(2026, 8, 2, 8, 0, 0).unwrap();
    api.record_purchase("ING001", 10.0, 1000.0, t1).await.unwrap();
    api.record_purchase("ING001", 10.0, 1200.0, t2).await.unwrap();

    // 3. 编译: 原料 2200, 间接 10% = 220, 总 2420, 单位 605
    let breakdown = api.get_recipe_cost("R001").unwrap();
    assert_eq!(breakdown.material_cost, 2200.0);
    assert_eq!(breakdown.overhead_cost, 220.0);
    assert_eq!(breakdown.total_cost, 2420.0);
    assert_eq!(breakdown.cost_per_unit, 605.0);

    // 4. 快照
    let snapshot = api.snapshot_recipe("R001").unwrap();
    assert_eq!(snapshot.total_cost, 2420.0);
    assert_eq!(snapshot.recipe_id, "R001");

    // 5. 默认加成 30/60/100 的三档建议价
    let suggestion = api.suggest_pricing("R001", None).await.unwrap();
    assert_eq!(suggestion.economy.tier, PriceTier::Economy);
    assert_eq!(suggestion.economy.price, 786.5); // 605 * 1.3
    assert_eq!(suggestion.standard.price, 968.0); // 605 * 1.6
    assert_eq!(suggestion.premium.price, 1210.0); // 605 * 2.0
    assert!(!suggestion.standard.positioning.is_empty());

    // 6. 采纳标准档,评估现价
    api.apply_selling_price("R001", suggestion.standard.price)
        .unwrap();
    let evaluation = api.evaluate_price("R001").unwrap();
    assert!(evaluation.is_profitable);
    // (968 - 605) / 968 = 37.5%
    assert!((evaluation.margin_percent - 37.5).abs() < 0.01);
    assert_eq!(evaluation.margin_health, MarginHealth::Normal);
}

#[tokio::test]
async fn test_suggest_pricing_policy_override() {
    let (_tmp, state) = create_test_app().unwrap();
    let api = &state.costing_api;

    seed_ingredient(&state, "ING001", "Gula", 1000.0);
    seed_recipe(&state, "R001", "Kue Lapis", 2, 0.0, 0.0, None);
    seed_component(&state, "R001", "ING001", 2.0);

    // 单位成本 1000; 调用级覆盖加成并启用取整
    let policy = MarginPolicy {
        economy_pct: 25.0,
        standard_pct: 55.0,
        premium_pct: 90.0,
        rounding_step: Some(500.0),
    };
    let suggestion = api.suggest_pricing("R001", Some(policy)).await.unwrap();

    assert_eq!(suggestion.cost_per_unit, 1000.0);
    assert_eq!(suggestion.economy.price, 1500.0); // 1250 -> 向上取整到 500 倍数
    assert_eq!(suggestion.standard.price, 2000.0); // 1550 -> 2000
    assert_eq!(suggestion.premium.price, 2000.0); // 1900 -> 2000
}

#[tokio::test]
async fn test_suggest_pricing_margins_from_config() {
    let (_tmp, state) = create_test_app().unwrap();
    let api = &state.costing_api;

    seed_ingredient(&state, "ING001", "Gula", 1000.0);
    seed_recipe(&state, "R001", "Kue Lapis", 2, 0.0, 0.0, None);
    seed_component(&state, "R001", "ING001", 2.0);

    // 配置覆写默认加成
    state
        .config_manager
        .set_global_config_value("pricing.margin_economy_pct", "10")
        .unwrap();

    let suggestion = api.suggest_pricing("R001", None).await.unwrap();
    assert_eq!(suggestion.economy.price, 1100.0); // 1000 * 1.1
    assert_eq!(suggestion.economy.margin_percent, 10.0);
    // 未覆写的档位保持默认
    assert_eq!(suggestion.standard.price, 1600.0);
}

#[tokio::test]
async fn test_evaluate_price_unset_is_normal_state() {
    let (_tmp, state) = create_test_app().unwrap();
    let api = &state.costing_api;

    seed_ingredient(&state, "ING001", "Telur", 2000.0);
    seed_recipe(&state, "R001", "Martabak", 4, 0.0, 0.0, None);
    seed_component(&state, "R001", "ING001", 1.0);

    // 未定价: 返回不盈利 + 毛利 0,而不是报错
    let evaluation = api.evaluate_price("R001").unwrap();
    assert!(!evaluation.is_profitable);
    assert_eq!(evaluation.margin_percent, 0.0);
}

#[tokio::test]
async fn test_apply_selling_price_validation() {
    let (_tmp, state) = create_test_app().unwrap();
    let api = &state.costing_api;

    seed_recipe(&state, "R001", "Martabak", 4, 0.0, 0.0, None);

    let result = api.apply_selling_price("R001", 0.0);
    assert!(matches!(result, Err(ApiError::InvalidInput(_))));

    let result = api.apply_selling_price("MISSING", 1000.0);
    assert!(matches!(result, Err(ApiError::NotFound(_))));

    api.apply_selling_price("R001", 15000.0).unwrap();
    let recipe = state.recipe_repo.find_by_id("R001").unwrap().unwrap();
    assert_eq!(recipe.selling_price, Some(15000.0));
}

#[tokio::test]
async fn test_compile_all_parallel_preserves_order_and_isolation() {
    let (_tmp, state) = create_test_app().unwrap();
    let api = &state.costing_api;

    seed_ingredient(&state, "ING001", "Tepung", 1000.0);
    seed_recipe(&state, "R_OK", "Roti", 4, 0.0, 0.0, None);
    seed_component(&state, "R_OK", "ING001", 2.0);
    seed_recipe(&state, "R_BAD", "Rusak", 0, 0.0, 0.0, None);

    let items = api
        .compile_all_parallel(vec![
            "R_OK".to_string(),
            "R_MISSING".to_string(),
            "R_BAD".to_string(),
        ])
        .await;

    // 结果按入参顺序返回,单项失败不取消其余项
    assert_eq!(items.len(), 3);
    assert_eq!(items[0].recipe_id, "R_OK");
    assert!(items[0].breakdown.is_some());
    assert!(items[0].error.is_none());

    assert_eq!(items[1].recipe_id, "R_MISSING");
    assert!(items[1].breakdown.is_none());
    assert!(items[1].error.is_some());

    assert_eq!(items[2].recipe_id, "R_BAD");
    assert!(items[2].error.is_some());
}

#[tokio::test]
async fn test_snapshot_all_active() {
    let (_tmp, state) = create_test_app().unwrap();
    let api = &state.costing_api;

    seed_ingredient(&state, "ING001", "Tepung", 1000.0);
    for recipe_id in ["R_A", "R_B", "R_C"] {
        seed_recipe(&state, recipe_id, recipe_id, 4, 0.0, 0.0, None);
        seed_component(&state, recipe_id, "ING001", 1.0);
    }
    // 一个无效配方混在其中
    seed_recipe(&state, "R_BAD", "Rusak", 0, 0.0, 0.0, None);

    let items = api.snapshot_all_active().await.unwrap();
    assert_eq!(items.len(), 4);

    let ok_count = items.iter().filter(|item| item.snapshot.is_some()).count();
    let err_count = items.iter().filter(|item| item.error.is_some()).count();
    assert_eq!(ok_count, 3);
    assert_eq!(err_count, 1);

    // 快照真实落库
    assert_eq!(state.snapshot_repo.count_for("R_A").unwrap(), 1);
    assert_eq!(state.snapshot_repo.count_for("R_BAD").unwrap(), 0);
}

#[tokio::test]
async fn test_empty_recipe_flows_through_api() {
    let (_tmp, state) = create_test_app().unwrap();
    let api = &state.costing_api;

    seed_recipe(&state, "R001", "Resep Kosong", 4, 0.2, 0.1, None);

    // 空配方贯穿编译与快照,均为零成本标记态
    let breakdown = api.get_recipe_cost("R001").unwrap();
    assert!(breakdown.empty_recipe);

    let snapshot = api.snapshot_recipe("R001").unwrap();
    assert!(snapshot.empty_recipe);
    assert_eq!(snapshot.total_cost, 0.0);
}
