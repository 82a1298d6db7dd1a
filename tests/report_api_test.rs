// ==========================================
// 报表 API 集成测试
// ==========================================
// 测试目标: 库存报表与收发存报表的口径
// 口径: 期初 + 收入 - 发出 = 期末
// ==========================================


use std::sync::{Arc, Mutex};

use chrono::NaiveDate;
use rusqlite::Connection;
use textile_workshop::api::{ApiError, InventoryApi, NewReceiptItem, ReceiptApi, ReportApi};
use textile_workshop::config::ConfigManager;
use textile_workshop::domain::types::{MaterialKind, Role};
use textile_workshop::domain::user::User;
use textile_workshop::logging;
use textile_workshop::repository::{
    CatalogRepository, InventoryRepository, MovementRepository, ReceiptRepository,
    StockRepository,
};

struct Env {
    _temp_file: tempfile::NamedTempFile,
    receipt_api: ReceiptApi,
    inventory_api: InventoryApi,
    report_api: ReportApi,
    keeper: User,
}

fn setup() -> Env {
    logging::init_test();
    let (temp_file, db_path) = test_helpers::create_test_db().expect("Failed to create test db");

    let raw = test_helpers::open_test_connection(&db_path).unwrap();
    test_helpers::seed_basic_catalog(&raw).unwrap();
    drop(raw);

    let conn: Arc<Mutex<Connection>> = test_helpers::shared_test_connection(&db_path).unwrap();
    let keeper =
        test_helpers::insert_user(conn.clone(), Role::Warehouse, "张库管", "keeper1").unwrap();

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
        catalog_repo.clone(),
        config,
    );
    let report_api = ReportApi::new(stock_repo, catalog_repo, movement_repo);

    Env {
        _temp_file: temp_file,
        receipt_api,
        inventory_api,
        report_api,
        keeper,
    }
}

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn receive(env: &Env, day: NaiveDate, article: &str, kind: MaterialKind, quantity: f64) {
    let doc = env
        .receipt_api
        .create_receipt(
            &env.keeper,
            "供应商",
            day,
            &[NewReceiptItem {
                material_article: article.to_string(),
                material_kind: kind,
                quantity,
                price: None,
            }],
        )
        .expect("创建收料单应成功");
    env.receipt_api
        .process_receipt(&env.keeper, doc.id)
        .expect("过账应成功");
}

#[test]
fn test_material_stock_report() {
    let env = setup();
    receive(&env, date(2026, 7, 1), "F001", MaterialKind::Fabric, 50.0);
    receive(&env, date(2026, 7, 2), "T001", MaterialKind::Fitting, 200.0);

    let rows = env
        .report_api
        .material_stock_report(&env.keeper, None)
        .expect("报表应成功");
    assert_eq!(rows.len(), 2);

    let f001 = rows.iter().find(|r| r.article == "F001").unwrap();
    assert_eq!(f001.kind, MaterialKind::Fabric);
    assert_eq!(f001.name, "华夫格棉布");
    assert!((f001.quantity - 50.0).abs() < 1e-9);
    // 金额 = 数量 × 目录单价
    assert!((f001.amount - 2500.0).abs() < 1e-9);

    // 货号过滤
    let filter = vec!["T001".to_string()];
    let filtered = env
        .report_api
        .material_stock_report(&env.keeper, Some(filter.as_slice()))
        .unwrap();
    assert_eq!(filtered.len(), 1);
    assert_eq!(filtered[0].article, "T001");
}

#[test]
fn test_material_movement_report_period_math() {
    let env = setup();

    // 期初区间外: 7/1 收 F001 50 米
    receive(&env, date(2026, 7, 1), "F001", MaterialKind::Fabric, 50.0);
    // 区间内: 7/8 收 F001 25 米
    receive(&env, date(2026, 7, 8), "F001", MaterialKind::Fabric, 25.0);

    // 区间内: 7/10 盘亏 5 米（实盘 70）
    let mut items = env.inventory_api.prepare_snapshot(&env.keeper).unwrap();
    for item in &mut items {
        if item.material_article == "F001" {
            item.actual_quantity = 70.0;
        } else {
            item.actual_quantity = item.accounting_quantity;
        }
    }
    env.inventory_api
        .save_document(&env.keeper, date(2026, 7, 10), items, true)
        .expect("盘点过账应成功");

    // 报表区间 [7/5, 7/15]
    let rows = env
        .report_api
        .material_movement_report(&env.keeper, date(2026, 7, 5), date(2026, 7, 15), None)
        .expect("报表应成功");
    let f001 = rows.iter().find(|r| r.article == "F001").unwrap();

    // 期初 = 7/1 收料 50 米 (2500 元)
    assert!((f001.initial_quantity - 50.0).abs() < 1e-9);
    assert!((f001.initial_amount - 2500.0).abs() < 1e-9);
    // 本期收入 = 25 米
    assert!((f001.receipt_quantity - 25.0).abs() < 1e-9);
    assert!((f001.receipt_amount - 1250.0).abs() < 1e-9);
    // 本期发出 = 盘亏 5 米
    assert!((f001.expense_quantity - 5.0).abs() < 1e-9);
    assert!((f001.expense_amount - 250.0).abs() < 1e-9);
    // 期末 = 期初 + 收入 - 发出
    assert!((f001.final_quantity - 70.0).abs() < 1e-9);
    assert!((f001.final_amount - 3500.0).abs() < 1e-9);

    // 区间完全在流水之前 → 行的期初为 0 且收发为 0，不会出现该货号
    let rows = env
        .report_api
        .material_movement_report(&env.keeper, date(2026, 1, 1), date(2026, 1, 31), None)
        .unwrap();
    assert!(rows.iter().all(|r| r.article != "F001"));

    // 区间在全部流水之后 → 只有期初（= 期末），无收发
    let rows = env
        .report_api
        .material_movement_report(&env.keeper, date(2026, 8, 1), date(2026, 8, 31), None)
        .unwrap();
    let f001 = rows.iter().find(|r| r.article == "F001").unwrap();
    assert!((f001.initial_quantity - 70.0).abs() < 1e-9);
    assert!((f001.receipt_quantity - 0.0).abs() < 1e-9);
    assert!((f001.final_quantity - 70.0).abs() < 1e-9);
}

#[test]
fn test_movement_report_validation_and_roles() {
    let env = setup();

    // 区间倒置
    assert!(matches!(
        env.report_api.material_movement_report(
            &env.keeper,
            date(2026, 7, 15),
            date(2026, 7, 5),
            None
        ),
        Err(ApiError::InvalidInput(_))
    ));

    // 客户无权查看报表
    let (_t, db_path2) = test_helpers::create_test_db().unwrap();
    let conn2 = test_helpers::shared_test_connection(&db_path2).unwrap();
    let customer =
        test_helpers::insert_user(conn2, Role::Customer, "客户", "cust1").unwrap();
    assert!(matches!(
        env.report_api.material_stock_report(&customer, None),
        Err(ApiError::Forbidden { .. })
    ));
}
