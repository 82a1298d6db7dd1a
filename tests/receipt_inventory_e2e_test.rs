// ==========================================
// 收料 → 库存 → 盘点 端到端集成测试
// ==========================================
// 测试目标:
// - 收料过账生成批次与入库流水（单事务）
// - 盘点差异阈值审批链（超阈值须总监审批）
// - 盘亏先入先出冲减 / 盘盈落调整批次
// ==========================================


use std::sync::{Arc, Mutex};

use chrono::NaiveDate;
use rusqlite::Connection;
use textile_workshop::api::{ApiError, InventoryApi, NewReceiptItem, ReceiptApi};
use textile_workshop::config::ConfigManager;
use textile_workshop::domain::inventory::InventoryItem;
use textile_workshop::domain::types::{MaterialKind, MovementDirection, Role};
use textile_workshop::domain::user::User;
use textile_workshop::logging;
use textile_workshop::repository::{
    CatalogRepository, InventoryRepository, MovementRepository, ReceiptRepository,
    StockRepository,
};

struct Env {
    _temp_file: tempfile::NamedTempFile,
    conn: Arc<Mutex<Connection>>,
    receipt_api: ReceiptApi,
    inventory_api: InventoryApi,
    stock_repo: Arc<StockRepository>,
    movement_repo: Arc<MovementRepository>,
    config: Arc<ConfigManager>,
    keeper: User,
    director: User,
}

fn setup() -> Env {
    logging::init_test();
    let (temp_file, db_path) = test_helpers::create_test_db().expect("Failed to create test db");

    let raw = test_helpers::open_test_connection(&db_path).unwrap();
    test_helpers::seed_basic_catalog(&raw).unwrap();
    drop(raw);

    let conn = test_helpers::shared_test_connection(&db_path).unwrap();
    let keeper =
        test_helpers::insert_user(conn.clone(), Role::Warehouse, "张库管", "keeper1").unwrap();
    let director =
        test_helpers::insert_user(conn.clone(), Role::Director, "王总", "director1").unwrap();

    let catalog_repo = Arc::new(CatalogRepository::new(conn.clone()));
    let stock_repo = Arc::new(StockRepository::new(conn.clone()));
    let receipt_repo = Arc::new(ReceiptRepository::new(conn.clone()));
    let inventory_repo = Arc::new(InventoryRepository::new(conn.clone()));
    let movement_repo = Arc::new(MovementRepository::new(conn.clone()));
    let config = Arc::new(ConfigManager::from_connection(conn.clone()).unwrap());

    let receipt_api = ReceiptApi::new(conn.clone(), receipt_repo, catalog_repo.clone());
    let inventory_api = InventoryApi::new(
        conn.clone(),
        inventory_repo,
        stock_repo.clone(),
        catalog_repo,
        config.clone(),
    );

    Env {
        _temp_file: temp_file,
        conn,
        receipt_api,
        inventory_api,
        stock_repo,
        movement_repo,
        config,
        keeper,
        director,
    }
}

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

/// 收料入库: F001 面料 + T001 辅料
fn receive_materials(env: &Env) {
    let doc = env
        .receipt_api
        .create_receipt(
            &env.keeper,
            "杭州纺织供应商",
            date(2026, 7, 1),
            &[
                NewReceiptItem {
                    material_article: "F001".to_string(),
                    material_kind: MaterialKind::Fabric,
                    quantity: 50.0,
                    price: None, // 取目录价 50.0
                },
                NewReceiptItem {
                    material_article: "T001".to_string(),
                    material_kind: MaterialKind::Fitting,
                    quantity: 200.0,
                    price: Some(2.0),
                },
            ],
        )
        .expect("创建收料单应成功");

    assert_eq!(doc.document_number, "RCP-2026-0001");
    assert!((doc.total_amount - 2900.0).abs() < 1e-9);
    assert!(!doc.is_processed);

    let processed = env
        .receipt_api
        .process_receipt(&env.keeper, doc.id)
        .expect("过账应成功");
    assert!(processed.is_processed);
}

#[test]
fn test_receipt_processing_creates_lots_and_movements() {
    let env = setup();
    receive_materials(&env);

    // 批次落位
    let rolls = env.stock_repo.list_fabric_rolls_by_article("F001").unwrap();
    assert_eq!(rolls.len(), 1);
    assert_eq!(rolls[0].length_mm, 50_000);
    assert_eq!(rolls[0].width_mm, 1500);

    let batches = env
        .stock_repo
        .list_fitting_batches_by_article("T001")
        .unwrap();
    assert_eq!(batches.len(), 1);
    assert!((batches[0].quantity - 200.0).abs() < 1e-9);

    // 货号级账面数量
    assert!((env.stock_repo.quantity("F001", MaterialKind::Fabric).unwrap() - 50.0).abs() < 1e-9);
    assert!((env.stock_repo.quantity("T001", MaterialKind::Fitting).unwrap() - 200.0).abs() < 1e-9);

    // 入库流水
    let movements = env.movement_repo.list_by_article("F001").unwrap();
    assert_eq!(movements.len(), 1);
    assert_eq!(movements[0].direction, MovementDirection::In);
    assert!((movements[0].quantity - 50.0).abs() < 1e-9);
    assert!((movements[0].amount - 2500.0).abs() < 1e-9);

    // 重复过账被拒绝
    let receipts = env.receipt_api.list_receipts(&env.keeper).unwrap();
    assert!(matches!(
        env.receipt_api.process_receipt(&env.keeper, receipts[0].id),
        Err(ApiError::BusinessRuleViolation(_))
    ));
}

#[test]
fn test_receipt_role_and_validation() {
    let env = setup();

    // 总监不能收料（仅库管）
    assert!(matches!(
        env.receipt_api.create_receipt(
            &env.director,
            "供应商",
            date(2026, 7, 1),
            &[NewReceiptItem {
                material_article: "F001".to_string(),
                material_kind: MaterialKind::Fabric,
                quantity: 1.0,
                price: None,
            }]
        ),
        Err(ApiError::Forbidden { .. })
    ));

    // 未知货号
    assert!(matches!(
        env.receipt_api.create_receipt(
            &env.keeper,
            "供应商",
            date(2026, 7, 1),
            &[NewReceiptItem {
                material_article: "F999".to_string(),
                material_kind: MaterialKind::Fabric,
                quantity: 1.0,
                price: None,
            }]
        ),
        Err(ApiError::NotFound(_))
    ));

    // 非正数量
    assert!(matches!(
        env.receipt_api.create_receipt(
            &env.keeper,
            "供应商",
            date(2026, 7, 1),
            &[NewReceiptItem {
                material_article: "F001".to_string(),
                material_kind: MaterialKind::Fabric,
                quantity: 0.0,
                price: None,
            }]
        ),
        Err(ApiError::InvalidInput(_))
    ));
}

#[test]
fn test_small_variance_inventory_processes_without_approval() {
    let env = setup();
    receive_materials(&env);

    // 快照: 账面 F001=50m, T001=200件（单价取目录价）
    let mut items = env.inventory_api.prepare_snapshot(&env.keeper).unwrap();
    assert_eq!(items.len(), 2);
    let f001 = items
        .iter()
        .position(|it| it.material_article == "F001")
        .unwrap();
    assert!((items[f001].accounting_quantity - 50.0).abs() < 1e-9);
    assert_eq!(items[f001].material_name, "华夫格棉布");

    // 实盘: F001 少 5 米, T001 相符
    for item in &mut items {
        item.actual_quantity = match item.material_article.as_str() {
            "F001" => 45.0,
            _ => item.accounting_quantity,
        };
    }

    // 差异 = 5*50 / (50*50 + 200*2.5) = 250/3000 ≈ 8.33% < 20% → 保存即过账
    let doc = env
        .inventory_api
        .save_document(&env.keeper, date(2026, 7, 10), items, true)
        .expect("小差异应直接过账");
    assert_eq!(doc.document_number, "INV-2026-0001");
    assert!(doc.is_processed);
    assert!((doc.difference_amount + 250.0).abs() < 1e-9);
    assert!(doc.difference_percent > 8.0 && doc.difference_percent < 9.0);

    // 库存冲减到实盘值
    assert!((env.stock_repo.quantity("F001", MaterialKind::Fabric).unwrap() - 45.0).abs() < 1e-9);

    // 出库流水（盘亏）
    let movements = env.movement_repo.list_by_article("F001").unwrap();
    assert_eq!(movements.len(), 2);
    let out = movements
        .iter()
        .find(|m| m.direction == MovementDirection::Out)
        .expect("应有出库流水");
    assert!((out.quantity - 5.0).abs() < 1e-9);
    assert!((out.amount - 250.0).abs() < 1e-9);
}

#[test]
fn test_large_variance_requires_director_approval() {
    let env = setup();
    receive_materials(&env);

    let mut items = env.inventory_api.prepare_snapshot(&env.keeper).unwrap();
    // 实盘: F001 仅剩 10 米（差异 40*50=2000, 占比 2000/3000 ≈ 66.7%）
    for item in &mut items {
        item.actual_quantity = match item.material_article.as_str() {
            "F001" => 10.0,
            _ => item.accounting_quantity,
        };
    }

    // 保存即过账被阈值拦截
    let err = env
        .inventory_api
        .save_document(&env.keeper, date(2026, 7, 10), items.clone(), true)
        .expect_err("超阈值应被拦截");
    assert!(matches!(err, ApiError::ApprovalRequired { .. }));

    // 先保存不过账
    let doc = env
        .inventory_api
        .save_document(&env.keeper, date(2026, 7, 10), items, false)
        .expect("保存应成功");
    assert!(!doc.is_processed);

    // 未审批直接过账 → 拦截
    assert!(matches!(
        env.inventory_api.process_document(&env.keeper, doc.id),
        Err(ApiError::ApprovalRequired { .. })
    ));

    // 库管无权审批
    assert!(matches!(
        env.inventory_api.approve_document(&env.keeper, doc.id),
        Err(ApiError::Forbidden { .. })
    ));

    // 总监审批 → 过账成功
    let approved = env
        .inventory_api
        .approve_document(&env.director, doc.id)
        .expect("总监审批应成功");
    assert!(approved.is_approved);
    assert_eq!(approved.approved_by.as_deref(), Some("王总"));

    let processed = env
        .inventory_api
        .process_document(&env.keeper, doc.id)
        .expect("审批后过账应成功");
    assert!(processed.is_processed);

    // 库存冲减到实盘值
    assert!((env.stock_repo.quantity("F001", MaterialKind::Fabric).unwrap() - 10.0).abs() < 1e-9);

    // 已过账单据不可再审批/过账
    assert!(matches!(
        env.inventory_api.approve_document(&env.director, doc.id),
        Err(ApiError::BusinessRuleViolation(_))
    ));
    assert!(matches!(
        env.inventory_api.process_document(&env.keeper, doc.id),
        Err(ApiError::BusinessRuleViolation(_))
    ));
}

#[test]
fn test_shortage_consumes_oldest_roll_first() {
    let env = setup();
    receive_materials(&env);

    // 第二批 F001 入库 25 米（较晚的卷）
    let doc = env
        .receipt_api
        .create_receipt(
            &env.keeper,
            "杭州纺织供应商",
            date(2026, 7, 3),
            &[NewReceiptItem {
                material_article: "F001".to_string(),
                material_kind: MaterialKind::Fabric,
                quantity: 25.0,
                price: None,
            }],
        )
        .unwrap();
    env.receipt_api.process_receipt(&env.keeper, doc.id).unwrap();
    assert!((env.stock_repo.quantity("F001", MaterialKind::Fabric).unwrap() - 75.0).abs() < 1e-9);

    // 盘亏 5 米 → 应从最早的 50 米卷冲减
    let mut items = env.inventory_api.prepare_snapshot(&env.keeper).unwrap();
    for item in &mut items {
        item.actual_quantity = match item.material_article.as_str() {
            "F001" => 70.0,
            _ => item.accounting_quantity,
        };
    }
    env.inventory_api
        .save_document(&env.keeper, date(2026, 7, 10), items, true)
        .expect("小差异应直接过账");

    let rolls = env.stock_repo.list_fabric_rolls_by_article("F001").unwrap();
    assert_eq!(rolls.len(), 2);
    // 先入先出: 最早的卷 50000 → 45000，后入的 25000 原样
    assert_eq!(rolls[0].length_mm, 45_000);
    assert_eq!(rolls[1].length_mm, 25_000);
}

#[test]
fn test_surplus_creates_adjustment_batch() {
    let env = setup();
    receive_materials(&env);

    // T002 无库存，盘盈 10 件（账面 0 → 差异占比按 0 口径，不触发审批）
    let mut item = InventoryItem {
        id: 0,
        document_id: 0,
        material_article: "T002".to_string(),
        material_name: "羽丝绒填充物".to_string(),
        material_kind: MaterialKind::Fitting,
        accounting_quantity: 0.0,
        actual_quantity: 10.0,
        difference_quantity: 0.0,
        unit: "pcs".to_string(),
        price: 18.0,
        accounting_amount: 0.0,
        actual_amount: 0.0,
        difference_amount: 0.0,
    };
    item.recalculate();

    let doc = env
        .inventory_api
        .save_document(&env.keeper, date(2026, 7, 12), vec![item], true)
        .expect("纯盘盈应直接过账");
    assert!(doc.is_processed);
    assert!((doc.difference_percent - 0.0).abs() < 1e-9);

    // 盘盈批次落位
    assert!((env.stock_repo.quantity("T002", MaterialKind::Fitting).unwrap() - 10.0).abs() < 1e-9);
    let movements = env.movement_repo.list_by_article("T002").unwrap();
    assert_eq!(movements.len(), 1);
    assert_eq!(movements[0].direction, MovementDirection::In);
    assert!((movements[0].amount - 180.0).abs() < 1e-9);
}

#[test]
fn test_threshold_is_configurable() {
    let env = setup();
    receive_materials(&env);

    // 放宽阈值到 80%
    env.config
        .set_global_config_value("inventory.approval_threshold_percent", "80")
        .unwrap();

    let mut items = env.inventory_api.prepare_snapshot(&env.keeper).unwrap();
    for item in &mut items {
        item.actual_quantity = match item.material_article.as_str() {
            "F001" => 10.0, // 差异 ≈ 66.7% < 80%
            _ => item.accounting_quantity,
        };
    }

    let doc = env
        .inventory_api
        .save_document(&env.keeper, date(2026, 7, 10), items, true)
        .expect("阈值放宽后应直接过账");
    assert!(doc.is_processed);

    // 会话级连接未变化（冒烟：仓储仍可用）
    assert!(env.conn.lock().is_ok());
}
