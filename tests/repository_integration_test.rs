// ==========================================
// Repository 层集成测试
// ==========================================
// 测试目标: 目录连表解析、批次估值口径、AppState 装配
// ==========================================


use std::sync::Arc;

use chrono::Utc;
use textile_workshop::app::AppState;
use textile_workshop::domain::catalog::Fabric;
use textile_workshop::domain::stock::{FabricRoll, FittingBatch};
use textile_workshop::domain::types::MaterialKind;
use textile_workshop::logging;
use textile_workshop::repository::{CatalogRepository, StockRepository};

#[test]
fn test_catalog_lookup_join_and_upsert() {
    logging::init_test();
    let (_temp_file, db_path) = test_helpers::create_test_db().expect("Failed to create test db");
    let raw = test_helpers::open_test_connection(&db_path).unwrap();
    test_helpers::seed_basic_catalog(&raw).unwrap();
    drop(raw);

    let conn = test_helpers::shared_test_connection(&db_path).unwrap();
    let repo = CatalogRepository::new(conn);

    // 连表解析查找表名称
    let fabric = repo.find_fabric("F001").unwrap().expect("应找到 F001");
    assert_eq!(fabric.name, "华夫格棉布");
    assert_eq!(fabric.color_name.as_deref(), Some("米白"));
    assert_eq!(fabric.composition_name.as_deref(), Some("100% 棉"));

    let fitting = repo.find_fitting("T001").unwrap().expect("应找到 T001");
    assert_eq!(fitting.type_name.as_deref(), Some("拉链"));

    // upsert 覆盖价格
    let mut updated = fabric.fabric.clone();
    updated.price = 58.0;
    repo.upsert_fabric(&updated).unwrap();
    let reloaded = repo.find_fabric("F001").unwrap().unwrap();
    assert!((reloaded.fabric.price - 58.0).abs() < 1e-9);

    // 新货号插入后列表按货号排序
    repo.upsert_fabric(&Fabric {
        article: "F000".to_string(),
        name_code: 2,
        color_code: None,
        pattern_code: None,
        composition_code: None,
        width_mm: 1400,
        unit: "m".to_string(),
        price: 30.0,
        image_path: None,
    })
    .unwrap();
    let fabrics = repo.list_fabrics().unwrap();
    assert_eq!(fabrics[0].fabric.article, "F000");
    // 可空查找列保持 None
    assert!(fabrics[0].color_name.is_none());

    assert!(repo.find_good("P404").unwrap().is_none());
}

#[test]
fn test_stock_valuation_rounding_and_average_cost() {
    let (_temp_file, db_path) = test_helpers::create_test_db().expect("Failed to create test db");
    let raw = test_helpers::open_test_connection(&db_path).unwrap();
    test_helpers::seed_basic_catalog(&raw).unwrap();
    drop(raw);

    let conn = test_helpers::shared_test_connection(&db_path).unwrap();
    let repo = StockRepository::new(conn);

    // 2.5 米 × 1500mm 幅宽，目录价 50 元/米
    repo.insert_fabric_roll(&FabricRoll {
        roll_id: "ROLL-A".to_string(),
        fabric_article: "F001".to_string(),
        length_mm: 2_500,
        width_mm: 1_500,
        received_at: Utc::now(),
    })
    .unwrap();

    let valuations = repo.list_fabric_roll_valuations().unwrap();
    assert_eq!(valuations.len(), 1);
    let v = &valuations[0];
    assert_eq!(v.fabric_name, "华夫格棉布");
    // SQL ROUND(,2) 口径
    assert!((v.area_sqm - 3.75).abs() < 1e-9);
    assert!((v.length_m - 2.5).abs() < 1e-9);
    assert!((v.total_cost - 125.0).abs() < 1e-9);

    // 辅料批次估值: 30 件 × 8g × 2.5 元
    repo.insert_fitting_batch(&FittingBatch {
        batch_id: "BATCH-A".to_string(),
        fitting_article: "T001".to_string(),
        quantity: 30.0,
        received_at: Utc::now(),
    })
    .unwrap();
    let valuations = repo.list_fitting_batch_valuations().unwrap();
    assert_eq!(valuations.len(), 1);
    assert!((valuations[0].total_weight - 240.0).abs() < 1e-9);
    assert!((valuations[0].total_cost - 75.0).abs() < 1e-9);

    // 加权平均成本 = 目录价（批次价取自目录连表）
    assert!((repo.average_cost("F001", MaterialKind::Fabric).unwrap() - 50.0).abs() < 1e-9);
    // 空库存为 0
    assert!((repo.average_cost("F002", MaterialKind::Fabric).unwrap() - 0.0).abs() < 1e-9);
}

#[test]
fn test_app_state_assembly_and_session() {
    let (_temp_file, db_path) = test_helpers::create_test_db().expect("Failed to create test db");

    let state = AppState::new(db_path.clone()).expect("AppState 初始化应成功");
    assert_eq!(state.db_path, db_path);

    // 未登录
    assert!(state.current_user().is_err());

    // 写入会话后可读回
    let conn = test_helpers::shared_test_connection(&db_path).unwrap();
    let user = test_helpers::insert_user(
        conn,
        textile_workshop::domain::types::Role::Manager,
        "李经理",
        "manager1",
    )
    .unwrap();
    state.set_session(Some(user.clone())).unwrap();
    assert_eq!(state.current_user().unwrap().id, user.id);

    // 配置可从装配好的 AppState 读取
    assert!(
        (state.config.inventory_approval_threshold_percent().unwrap() - 20.0).abs() < 1e-9
    );

    // 装配好的 API 直接可用
    let goods = state.catalog_api.list_goods().unwrap();
    assert!(goods.is_empty());

    let _ = Arc::new(state);
}
