// ==========================================
// 成本快照与变价检测集成测试
// ==========================================
// 覆盖: 阈值边界 / 影响归因 / 历史不足 / 除零保护 /
//       扫描顺序 / 快照对比预警 / 配置覆写
// ==========================================

mod test_helpers;

use chrono::{DateTime, TimeZone, Utc};
use fnb_costing::domain::types::{AlertKind, AlertSeverity, RecipeAlertKind};
use test_helpers::*;

fn at(day: u32, hour: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 8, day, hour, 0, 0).unwrap()
}

#[tokio::test]
async fn test_no_alert_at_exact_noise_floor() {
    let (_tmp, state) = create_test_app().unwrap();
    seed_ingredient(&state, "ING001", "Tepung Terigu", 0.0);
    seed_recipe(&state, "R001", "Roti Tawar", 4, 0.0, 0.0, None);
    seed_component(&state, "R001", "ING001", 2.0);

    state
        .costing_api
        .record_purchase("ING001", 10.0, 10000.0, at(1, 8))
        .await
        .unwrap();

    // 恰好 1.0% 的变动不报警
    let result = state
        .costing_api
        .record_purchase("ING001", 10.0, 10100.0, at(2, 8))
        .await
        .unwrap();
    assert!(result.alerts.is_empty());
}

#[tokio::test]
async fn test_alert_just_above_noise_floor() {
    let (_tmp, state) = create_test_app().unwrap();
    seed_ingredient(&state, "ING001", "Tepung Terigu", 0.0);
    seed_recipe(&state, "R001", "Roti Tawar", 4, 0.0, 0.0, None);
    seed_component(&state, "R001", "ING001", 2.0);

    state
        .costing_api
        .record_purchase("ING001", 10.0, 10000.0, at(1, 8))
        .await
        .unwrap();

    // 1.01% 的变动报警,级别 NORMAL
    let result = state
        .costing_api
        .record_purchase("ING001", 10.0, 10101.0, at(2, 8))
        .await
        .unwrap();
    assert_eq!(result.alerts.len(), 1);

    let alert = &result.alerts[0];
    assert_eq!(alert.kind, AlertKind::CostIncrease);
    assert_eq!(alert.severity, AlertSeverity::Normal);
    assert!((alert.change_percent - 1.01).abs() < 1e-9);
}

#[tokio::test]
async fn test_high_severity_and_impact_attribution() {
    let (_tmp, state) = create_test_app().unwrap();
    seed_ingredient(&state, "ING001", "Gula Pasir", 0.0);
    // 两个配方分别每批用 2 件和 5 件
    seed_recipe(&state, "R_A", "Bolu Pandan", 4, 0.0, 0.0, None);
    seed_component(&state, "R_A", "ING001", 2.0);
    seed_recipe(&state, "R_B", "Nastar", 10, 0.0, 0.0, None);
    seed_component(&state, "R_B", "ING001", 5.0);

    state
        .costing_api
        .record_purchase("ING001", 10.0, 1000.0, at(1, 8))
        .await
        .unwrap();
    state
        .costing_api
        .record_purchase("ING001", 10.0, 1200.0, at(2, 8))
        .await
        .unwrap();

    // 第三笔 @1400: 对比上一笔 1200, 变动 (1400-1200)/1200 ≈ 16.7% -> HIGH
    let result = state
        .costing_api
        .record_purchase("ING001", 10.0, 1400.0, at(3, 8))
        .await
        .unwrap();
    assert_eq!(result.alerts.len(), 1);

    let alert = &result.alerts[0];
    assert_eq!(alert.severity, AlertSeverity::High);
    assert_eq!(alert.previous_unit_price, 1200.0);
    assert_eq!(alert.current_unit_price, 1400.0);
    assert_eq!(alert.change_amount, 200.0);
    assert!((alert.change_percent - 200.0 / 1200.0 * 100.0).abs() < 1e-9);

    // 受影响配方按配方 ID 稳定排序; 影响 = 变动额 × 每批用量
    assert_eq!(alert.affected_recipes.len(), 2);
    assert_eq!(alert.affected_recipes[0].recipe_id, "R_A");
    assert_eq!(alert.affected_recipes[0].cost_impact, 400.0);
    assert_eq!(alert.affected_recipes[1].recipe_id, "R_B");
    assert_eq!(alert.affected_recipes[1].cost_impact, 1000.0);

    // 预警消息本地化且带上食材名
    assert!(alert.message.contains("Gula Pasir"));
}

#[tokio::test]
async fn test_no_alert_when_ingredient_unused() {
    let (_tmp, state) = create_test_app().unwrap();
    // 未被任何配方使用的食材
    seed_ingredient(&state, "ING001", "Pewarna", 0.0);

    state
        .costing_api
        .record_purchase("ING001", 10.0, 1000.0, at(1, 8))
        .await
        .unwrap();

    // 20% 的变动,但没有配方使用 -> 不报警
    let result = state
        .costing_api
        .record_purchase("ING001", 10.0, 1200.0, at(2, 8))
        .await
        .unwrap();
    assert!(result.alerts.is_empty());
}

#[tokio::test]
async fn test_insufficient_history_returns_empty() {
    let (_tmp, state) = create_test_app().unwrap();
    seed_ingredient(&state, "ING001", "Garam", 0.0);
    seed_recipe(&state, "R001", "Roti Asin", 2, 0.0, 0.0, None);
    seed_component(&state, "R001", "ING001", 1.0);

    // 仅一条采购记录: 历史不足是正常状态,不报错也不报警
    let result = state
        .costing_api
        .record_purchase("ING001", 10.0, 1000.0, at(1, 8))
        .await
        .unwrap();
    assert!(result.alerts.is_empty());
}

#[tokio::test]
async fn test_zero_previous_price_guard() {
    let (_tmp, state) = create_test_app().unwrap();
    seed_ingredient(&state, "ING001", "Air Mineral", 0.0);
    seed_recipe(&state, "R001", "Es Teh", 10, 0.0, 0.0, None);
    seed_component(&state, "R001", "ING001", 3.0);

    // 上一次单价为 0: 除零保护,按"无预警"处理而不是报错
    state
        .costing_api
        .record_purchase("ING001", 10.0, 0.0, at(1, 8))
        .await
        .unwrap();
    let result = state
        .costing_api
        .record_purchase("ING001", 10.0, 500.0, at(2, 8))
        .await
        .unwrap();
    assert!(result.alerts.is_empty());
}

#[tokio::test]
async fn test_decrease_alert_kind() {
    let (_tmp, state) = create_test_app().unwrap();
    seed_ingredient(&state, "ING001", "Minyak Goreng", 0.0);
    seed_recipe(&state, "R001", "Donat", 12, 0.0, 0.0, None);
    seed_component(&state, "R001", "ING001", 1.0);

    state
        .costing_api
        .record_purchase("ING001", 10.0, 2000.0, at(1, 8))
        .await
        .unwrap();
    let result = state
        .costing_api
        .record_purchase("ING001", 10.0, 1800.0, at(2, 8))
        .await
        .unwrap();

    let alert = &result.alerts[0];
    assert_eq!(alert.kind, AlertKind::CostDecrease);
    assert!(alert.change_percent < 0.0);
    assert_eq!(alert.affected_recipes[0].cost_impact, -200.0);
}

#[tokio::test]
async fn test_sweep_returns_alerts_in_check_order() {
    let (_tmp, state) = create_test_app().unwrap();
    for (id, name) in [("ING_A", "Tepung"), ("ING_B", "Gula"), ("ING_C", "Mentega")] {
        seed_ingredient(&state, id, name, 0.0);
        seed_recipe(&state, &format!("R_{}", id), name, 4, 0.0, 0.0, None);
        seed_component(&state, &format!("R_{}", id), id, 1.0);

        state
            .costing_api
            .record_purchase(id, 10.0, 1000.0, at(1, 8))
            .await
            .unwrap();
        state
            .costing_api
            .record_purchase(id, 10.0, 1100.0, at(2, 8))
            .await
            .unwrap();
    }

    // 按检查顺序返回 (C, A, B)
    let ids = vec![
        "ING_C".to_string(),
        "ING_A".to_string(),
        "ING_B".to_string(),
    ];
    let alerts = state.costing_api.detect_ingredient_alerts(&ids).await;
    assert_eq!(alerts.len(), 3);
    assert_eq!(alerts[0].ingredient_id, "ING_C");
    assert_eq!(alerts[1].ingredient_id, "ING_A");
    assert_eq!(alerts[2].ingredient_id, "ING_B");
}

#[tokio::test]
async fn test_noise_floor_config_override() {
    let (_tmp, state) = create_test_app().unwrap();
    seed_ingredient(&state, "ING001", "Ragi", 0.0);
    seed_recipe(&state, "R001", "Roti Manis", 8, 0.0, 0.0, None);
    seed_component(&state, "R001", "ING001", 0.5);

    // 把噪声下限调到 5%
    state
        .config_manager
        .set_global_config_value("hpp.noise_floor_pct", "5")
        .unwrap();

    state
        .costing_api
        .record_purchase("ING001", 10.0, 1000.0, at(1, 8))
        .await
        .unwrap();

    // 3% 的变动在新下限之下 -> 不报警
    let result = state
        .costing_api
        .record_purchase("ING001", 10.0, 1030.0, at(2, 8))
        .await
        .unwrap();
    assert!(result.alerts.is_empty());

    // 6% 的变动超过新下限 -> 报警
    let result = state
        .costing_api
        .record_purchase("ING001", 10.0, 1091.8, at(3, 8))
        .await
        .unwrap();
    assert_eq!(result.alerts.len(), 1);
}

#[tokio::test]
async fn test_snapshot_and_recipe_change_alert() {
    let (_tmp, state) = create_test_app().unwrap();
    seed_ingredient(&state, "ING001", "Tepung Terigu", 0.0);
    seed_recipe(&state, "R001", "Roti Tawar", 4, 0.0, 0.0, Some(2000.0));
    seed_component(&state, "R001", "ING001", 2.0);

    state
        .costing_api
        .record_purchase("ING001", 10.0, 1000.0, at(1, 8))
        .await
        .unwrap();

    // 第一条快照: 原料 2000, 售价 2000, 单位成本 500 -> 毛利 75%
    let first = state.costing_api.snapshot_recipe("R001").unwrap();
    assert_eq!(first.total_cost, 2000.0);
    assert_eq!(first.margin_pct, Some(75.0));

    // 库存清零后以更高价进货,抬升 WAC 到 1200
    state
        .costing_api
        .record_consumption(
            "ING001",
            10.0,
            fnb_costing::domain::types::ConsumptionReason::Usage,
        )
        .unwrap();
    state
        .costing_api
        .record_purchase("ING001", 10.0, 1200.0, at(2, 8))
        .await
        .unwrap();

    // 第二条快照: 原料 2400, HPP 上涨 20%
    let second = state.costing_api.snapshot_recipe("R001").unwrap();
    assert_eq!(second.total_cost, 2400.0);

    let alerts = state.costing_api.detect_recipe_alerts("R001").await.unwrap();
    assert_eq!(alerts.len(), 1);
    let alert = &alerts[0];
    assert_eq!(alert.kind, RecipeAlertKind::HppIncrease);
    // 恰好 20% 不超过 HIGH 阈值(> 20)
    assert_eq!(alert.severity, AlertSeverity::Normal);
    assert!((alert.change_percent - 20.0).abs() < 1e-9);
    assert_eq!(alert.previous_value, 2000.0);
    assert_eq!(alert.current_value, 2400.0);
}

#[tokio::test]
async fn test_margin_low_alert() {
    let (_tmp, state) = create_test_app().unwrap();
    seed_ingredient(&state, "ING001", "Keju", 0.0);
    // 售价 520, 单位成本将是 500 -> 毛利约 3.8% (< 10% 严重下限)
    seed_recipe(&state, "R001", "Roti Keju", 4, 0.0, 0.0, Some(520.0));
    seed_component(&state, "R001", "ING001", 2.0);

    state
        .costing_api
        .record_purchase("ING001", 10.0, 1000.0, at(1, 8))
        .await
        .unwrap();

    state.costing_api.snapshot_recipe("R001").unwrap();

    let alerts = state.costing_api.detect_recipe_alerts("R001").await.unwrap();
    assert_eq!(alerts.len(), 1);
    let alert = &alerts[0];
    assert_eq!(alert.kind, RecipeAlertKind::MarginLow);
    assert_eq!(alert.severity, AlertSeverity::High);
    assert!(alert.current_value < 10.0);
}

#[tokio::test]
async fn test_no_recipe_alert_without_snapshots() {
    let (_tmp, state) = create_test_app().unwrap();
    seed_recipe(&state, "R001", "Roti Baru", 4, 0.0, 0.0, None);

    let alerts = state.costing_api.detect_recipe_alerts("R001").await.unwrap();
    assert!(alerts.is_empty());
}

#[tokio::test]
async fn test_snapshots_are_immutable_history() {
    let (_tmp, state) = create_test_app().unwrap();
    seed_ingredient(&state, "ING001", "Gula", 0.0);
    seed_recipe(&state, "R001", "Kue Kering", 4, 0.0, 0.0, None);
    seed_component(&state, "R001", "ING001", 1.0);

    state
        .costing_api
        .record_purchase("ING001", 10.0, 1000.0, at(1, 8))
        .await
        .unwrap();

    // 每次显式请求各产生一条,读取成本不产生快照
    state.costing_api.snapshot_recipe("R001").unwrap();
    state.costing_api.get_recipe_cost("R001").unwrap();
    state.costing_api.snapshot_recipe("R001").unwrap();

    assert_eq!(state.snapshot_repo.count_for("R001").unwrap(), 2);
}
