// ==========================================
// 订单流程集成测试
// ==========================================
// 测试目标: 下单 → 状态推进 → 列表/报表行的完整链路
// ==========================================


use std::sync::Arc;

use chrono::NaiveDate;
use textile_workshop::api::{ApiError, NewOrderItem, OrderApi};
use textile_workshop::domain::types::{OrderStatus, Role};
use textile_workshop::logging;
use textile_workshop::repository::{CatalogRepository, OrderRepository};

struct OrderEnv {
    _temp_file: tempfile::NamedTempFile,
    db_path: String,
    order_api: OrderApi,
}

fn setup() -> OrderEnv {
    logging::init_test();
    let (temp_file, db_path) = test_helpers::create_test_db().expect("Failed to create test db");

    let conn = test_helpers::open_test_connection(&db_path).unwrap();
    test_helpers::seed_basic_catalog(&conn).unwrap();
    drop(conn);

    let shared = test_helpers::shared_test_connection(&db_path).unwrap();
    let order_api = OrderApi::new(
        Arc::new(OrderRepository::new(shared.clone())),
        Arc::new(CatalogRepository::new(shared)),
    );

    OrderEnv {
        _temp_file: temp_file,
        db_path,
        order_api,
    }
}

#[test]
fn test_create_order_snapshots_catalog() {
    let env = setup();
    let conn = test_helpers::shared_test_connection(&env.db_path).unwrap();
    let customer =
        test_helpers::insert_user(conn, Role::Customer, "演示客户", "customer1").unwrap();

    let order = env
        .order_api
        .create_order(
            &customer,
            &[
                NewOrderItem {
                    product_article: "P001".to_string(),
                    quantity: 3,
                },
                NewOrderItem {
                    product_article: "P002".to_string(),
                    quantity: 1,
                },
            ],
        )
        .expect("下单应成功");

    assert!(order.id > 0);
    assert_eq!(order.status, OrderStatus::New);
    assert_eq!(order.items.len(), 2);
    // 名称与单价从成品目录快照
    assert_eq!(order.items[0].product_name, "华夫格毛巾");
    assert!((order.items[0].price - 45.0).abs() < 1e-9);
    // 总额 = 3*45 + 1*159
    assert!((order.total_amount - 294.0).abs() < 1e-9);

    // 客户能看到自己的订单
    let mine = env.order_api.list_my_orders(&customer).unwrap();
    assert_eq!(mine.len(), 1);
    assert_eq!(mine[0].items.len(), 2);
}

#[test]
fn test_create_order_validation() {
    let env = setup();
    let conn = test_helpers::shared_test_connection(&env.db_path).unwrap();
    let customer =
        test_helpers::insert_user(conn.clone(), Role::Customer, "客户", "customer1").unwrap();
    let manager =
        test_helpers::insert_user(conn, Role::Manager, "经理", "manager1").unwrap();

    // 空明细
    assert!(matches!(
        env.order_api.create_order(&customer, &[]),
        Err(ApiError::InvalidInput(_))
    ));

    // 非正数量
    assert!(matches!(
        env.order_api.create_order(
            &customer,
            &[NewOrderItem {
                product_article: "P001".to_string(),
                quantity: 0,
            }]
        ),
        Err(ApiError::InvalidInput(_))
    ));

    // 未知货号
    assert!(matches!(
        env.order_api.create_order(
            &customer,
            &[NewOrderItem {
                product_article: "P999".to_string(),
                quantity: 1,
            }]
        ),
        Err(ApiError::NotFound(_))
    ));

    // 经理不能替客户下单
    assert!(matches!(
        env.order_api.create_order(
            &manager,
            &[NewOrderItem {
                product_article: "P001".to_string(),
                quantity: 1,
            }]
        ),
        Err(ApiError::Forbidden { .. })
    ));
}

#[test]
fn test_status_progression_and_manager_assignment() {
    let env = setup();
    let conn = test_helpers::shared_test_connection(&env.db_path).unwrap();
    let customer =
        test_helpers::insert_user(conn.clone(), Role::Customer, "客户", "customer1").unwrap();
    let manager =
        test_helpers::insert_user(conn, Role::Manager, "李经理", "manager1").unwrap();

    let order = env
        .order_api
        .create_order(
            &customer,
            &[NewOrderItem {
                product_article: "P001".to_string(),
                quantity: 1,
            }],
        )
        .unwrap();

    // 跳级被拒绝
    assert!(matches!(
        env.order_api
            .update_status(&manager, order.id, OrderStatus::Paid),
        Err(ApiError::InvalidStateTransition { .. })
    ));

    // NEW 阶段不可拒单
    assert!(matches!(
        env.order_api
            .update_status(&manager, order.id, OrderStatus::Rejected),
        Err(ApiError::InvalidStateTransition { .. })
    ));

    // 客户无权推进
    assert!(matches!(
        env.order_api
            .update_status(&customer, order.id, OrderStatus::Waiting),
        Err(ApiError::Forbidden { .. })
    ));

    // 逐步推进主链
    let chain = [
        OrderStatus::Waiting,
        OrderStatus::Processing,
        OrderStatus::WaitingForPayment,
        OrderStatus::Paid,
        OrderStatus::InProduction,
        OrderStatus::Ready,
    ];
    let mut current = order;
    for status in chain {
        current = env
            .order_api
            .update_status(&manager, current.id, status)
            .expect("推进应成功");
        assert_eq!(current.status, status);
        // 首次推进后锁定跟单经理
        assert_eq!(current.manager_user_id, Some(manager.id));
    }

    // 终态不可再推进
    assert!(env
        .order_api
        .update_status(&manager, current.id, OrderStatus::New)
        .is_err());
}

#[test]
fn test_reject_from_processing_is_terminal() {
    let env = setup();
    let conn = test_helpers::shared_test_connection(&env.db_path).unwrap();
    let customer =
        test_helpers::insert_user(conn.clone(), Role::Customer, "客户", "customer1").unwrap();
    let manager =
        test_helpers::insert_user(conn, Role::Manager, "经理", "manager1").unwrap();

    let order = env
        .order_api
        .create_order(
            &customer,
            &[NewOrderItem {
                product_article: "P002".to_string(),
                quantity: 2,
            }],
        )
        .unwrap();

    env.order_api
        .update_status(&manager, order.id, OrderStatus::Waiting)
        .unwrap();
    env.order_api
        .update_status(&manager, order.id, OrderStatus::Processing)
        .unwrap();
    let rejected = env
        .order_api
        .update_status(&manager, order.id, OrderStatus::Rejected)
        .expect("处理中可拒单");
    assert_eq!(rejected.status, OrderStatus::Rejected);

    // 拒单后不可复活
    assert!(matches!(
        env.order_api
            .update_status(&manager, order.id, OrderStatus::WaitingForPayment),
        Err(ApiError::InvalidStateTransition { .. })
    ));
}

#[test]
fn test_order_access_control_and_summaries() {
    let env = setup();
    let conn = test_helpers::shared_test_connection(&env.db_path).unwrap();
    let customer_a =
        test_helpers::insert_user(conn.clone(), Role::Customer, "客户甲", "cust_a").unwrap();
    let customer_b =
        test_helpers::insert_user(conn.clone(), Role::Customer, "客户乙", "cust_b").unwrap();
    let manager =
        test_helpers::insert_user(conn, Role::Manager, "经理", "manager1").unwrap();

    let order = env
        .order_api
        .create_order(
            &customer_a,
            &[NewOrderItem {
                product_article: "P001".to_string(),
                quantity: 5,
            }],
        )
        .unwrap();

    // 其他客户不可见
    assert!(matches!(
        env.order_api.get_order(&customer_b, order.id),
        Err(ApiError::Forbidden { .. })
    ));
    // 经理可见
    assert!(env.order_api.get_order(&manager, order.id).is_ok());

    // 列表行携带客户姓名与行数
    let summaries = env
        .order_api
        .list_order_summaries(&manager, None, None)
        .unwrap();
    assert_eq!(summaries.len(), 1);
    assert_eq!(summaries[0].customer_name, "客户甲");
    assert_eq!(summaries[0].total_items, 1);
    assert_eq!(summaries[0].order_number, order.id.to_string());

    // 未来区间为空
    let far_future = NaiveDate::from_ymd_opt(2999, 1, 1).unwrap();
    let summaries = env
        .order_api
        .list_order_summaries(&manager, Some(far_future), Some(far_future))
        .unwrap();
    assert!(summaries.is_empty());

    // 区间倒置报错
    let today = chrono::Utc::now().date_naive();
    assert!(matches!(
        env.order_api
            .list_order_summaries(&manager, Some(far_future), Some(today)),
        Err(ApiError::InvalidInput(_))
    ));
}
