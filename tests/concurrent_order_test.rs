// ==========================================
// 并发下单集成测试
// ==========================================
// 测试目标: 共享连接（Mutex 串行化 + busy_timeout）下的并发写入
// ==========================================


use std::sync::Arc;

use textile_workshop::api::{NewOrderItem, OrderApi};
use textile_workshop::domain::types::Role;
use textile_workshop::logging;
use textile_workshop::repository::{CatalogRepository, OrderRepository};

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_order_creation() {
    logging::init_test();
    let (_temp_file, db_path) = test_helpers::create_test_db().expect("Failed to create test db");

    let raw = test_helpers::open_test_connection(&db_path).unwrap();
    test_helpers::seed_basic_catalog(&raw).unwrap();
    drop(raw);

    let conn = test_helpers::shared_test_connection(&db_path).unwrap();
    let customer =
        test_helpers::insert_user(conn.clone(), Role::Customer, "并发客户", "concurrent1")
            .unwrap();

    let order_api = Arc::new(OrderApi::new(
        Arc::new(OrderRepository::new(conn.clone())),
        Arc::new(CatalogRepository::new(conn)),
    ));

    // 8 个并发任务同时下单
    let mut handles = Vec::new();
    for i in 0..8i64 {
        let api = order_api.clone();
        let actor = customer.clone();
        handles.push(tokio::task::spawn_blocking(move || {
            api.create_order(
                &actor,
                &[NewOrderItem {
                    product_article: "P001".to_string(),
                    quantity: i + 1,
                }],
            )
        }));
    }

    let mut order_ids = Vec::new();
    for handle in handles {
        let order = handle
            .await
            .expect("任务不应panic")
            .expect("并发下单应全部成功");
        order_ids.push(order.id);
    }

    // 全部成功且ID互不相同
    order_ids.sort_unstable();
    order_ids.dedup();
    assert_eq!(order_ids.len(), 8);

    // 最终一致: 客户可见 8 笔订单
    let orders = order_api.list_my_orders(&customer).unwrap();
    assert_eq!(orders.len(), 8);
}
