// ==========================================
// 纺织家具生产经营系统 - 订单仓储
// ==========================================
// 职责: orders / order_items 表的数据访问
// 说明: 订单 + 明细行的写入在同一事务内
// ==========================================

use crate::domain::order::{Order, OrderItem, OrderSummary};
use crate::domain::types::OrderStatus;
use crate::repository::db_utils::{parse_code, parse_utc};
use crate::repository::error::{RepositoryError, RepositoryResult};
use chrono::NaiveDate;
use rusqlite::{params, Connection, OptionalExtension, Row};
use std::sync::{Arc, Mutex};

// ==========================================
// OrderRepository - 订单仓储
// ==========================================
pub struct OrderRepository {
    conn: Arc<Mutex<Connection>>,
}

impl OrderRepository {
    /// 创建新的 OrderRepository 实例
    pub fn new(conn: Arc<Mutex<Connection>>) -> Self {
        Self { conn }
    }

    /// 获取数据库连接
    fn get_conn(&self) -> RepositoryResult<std::sync::MutexGuard<Connection>> {
        self.conn
            .lock()
            .map_err(|e| RepositoryError::LockError(e.to_string()))
    }

    fn map_order_header(row: &Row<'_>) -> rusqlite::Result<Order> {
        let status_raw: String = row.get(3)?;
        let date_raw: String = row.get(4)?;
        Ok(Order {
            id: row.get(0)?,
            customer_user_id: row.get(1)?,
            manager_user_id: row.get(2)?,
            status: parse_code(3, &status_raw, "订单状态", OrderStatus::from_code)?,
            order_date: parse_utc(4, &date_raw)?,
            total_amount: row.get(5)?,
            items: Vec::new(),
        })
    }

    fn map_order_item(row: &Row<'_>) -> rusqlite::Result<OrderItem> {
        Ok(OrderItem {
            id: row.get(0)?,
            order_id: row.get(1)?,
            product_article: row.get(2)?,
            product_name: row.get(3)?,
            quantity: row.get(4)?,
            price: row.get(5)?,
        })
    }

    /// 为订单列表批量加载明细行
    fn load_items(conn: &Connection, orders: &mut [Order]) -> RepositoryResult<()> {
        let mut stmt = conn.prepare(
            r#"
            SELECT id, order_id, product_article, product_name, quantity, price
            FROM order_items
            WHERE order_id = ?1
            ORDER BY id
            "#,
        )?;
        for order in orders.iter_mut() {
            let rows = stmt.query_map(params![order.id], Self::map_order_item)?;
            for row in rows {
                order.items.push(row?);
            }
        }
        Ok(())
    }

    /// 创建订单（订单头 + 明细行，单事务）
    ///
    /// # 返回
    /// - `Ok(i64)`: 新订单ID
    pub fn create(&self, order: &Order) -> RepositoryResult<i64> {
        let conn = self.get_conn()?;
        let tx = conn.unchecked_transaction()?;

        tx.execute(
            r#"
            INSERT INTO orders (customer_user_id, manager_user_id, status, order_date, total_amount)
            VALUES (?1, ?2, ?3, ?4, ?5)
            "#,
            params![
                order.customer_user_id,
                order.manager_user_id,
                order.status.as_code(),
                order.order_date.to_rfc3339(),
                order.total_amount,
            ],
        )?;
        let order_id = tx.last_insert_rowid();

        for item in &order.items {
            tx.execute(
                r#"
                INSERT INTO order_items (order_id, product_article, product_name, quantity, price)
                VALUES (?1, ?2, ?3, ?4, ?5)
                "#,
                params![
                    order_id,
                    item.product_article,
                    item.product_name,
                    item.quantity,
                    item.price,
                ],
            )?;
        }

        tx.commit()?;
        Ok(order_id)
    }

    /// 按ID查询订单（含明细行）
    pub fn find_by_id(&self, order_id: i64) -> RepositoryResult<Option<Order>> {
        let conn = self.get_conn()?;
        let header = conn
            .query_row(
                r#"
                SELECT id, customer_user_id, manager_user_id, status, order_date, total_amount
                FROM orders
                WHERE id = ?1
                "#,
                params![order_id],
                Self::map_order_header,
            )
            .optional()?;

        match header {
            Some(order) => {
                let mut orders = [order];
                Self::load_items(&conn, &mut orders)?;
                let [order] = orders;
                Ok(Some(order))
            }
            None => Ok(None),
        }
    }

    /// 查询某客户的订单（含明细行），按下单时间降序
    pub fn list_by_customer(&self, customer_user_id: i64) -> RepositoryResult<Vec<Order>> {
        let conn = self.get_conn()?;
        let mut orders = {
            let mut stmt = conn.prepare(
                r#"
                SELECT id, customer_user_id, manager_user_id, status, order_date, total_amount
                FROM orders
                WHERE customer_user_id = ?1
                ORDER BY order_date DESC
                "#,
            )?;
            let rows = stmt.query_map(params![customer_user_id], Self::map_order_header)?;
            let mut collected = Vec::new();
            for row in rows {
                collected.push(row?);
            }
            collected
        };

        Self::load_items(&conn, &mut orders)?;
        Ok(orders)
    }

    /// 查询全部订单（含明细行），按下单时间降序
    pub fn list_all(&self) -> RepositoryResult<Vec<Order>> {
        let conn = self.get_conn()?;
        let mut orders = {
            let mut stmt = conn.prepare(
                r#"
                SELECT id, customer_user_id, manager_user_id, status, order_date, total_amount
                FROM orders
                ORDER BY order_date DESC
                "#,
            )?;
            let rows = stmt.query_map([], Self::map_order_header)?;
            let mut collected = Vec::new();
            for row in rows {
                collected.push(row?);
            }
            collected
        };

        Self::load_items(&conn, &mut orders)?;
        Ok(orders)
    }

    /// 更新订单状态
    ///
    /// # 参数
    /// - manager_user_id: 跟单经理；None 时保留原值（COALESCE 语义）
    pub fn update_status(
        &self,
        order_id: i64,
        status: OrderStatus,
        manager_user_id: Option<i64>,
    ) -> RepositoryResult<()> {
        let conn = self.get_conn()?;
        let updated = conn.execute(
            r#"
            UPDATE orders
            SET status = ?1, manager_user_id = COALESCE(?2, manager_user_id)
            WHERE id = ?3
            "#,
            params![status.as_code(), manager_user_id, order_id],
        )?;

        if updated == 0 {
            return Err(RepositoryError::NotFound {
                entity: "Order".to_string(),
                id: order_id.to_string(),
            });
        }
        Ok(())
    }

    /// 查询订单列表行（报表/列表页），可按日期范围过滤
    ///
    /// # 参数
    /// - from/to: 业务日期闭区间（None 表示不限）
    pub fn list_summaries(
        &self,
        from: Option<NaiveDate>,
        to: Option<NaiveDate>,
    ) -> RepositoryResult<Vec<OrderSummary>> {
        let conn = self.get_conn()?;
        let mut stmt = conn.prepare(
            r#"
            SELECT
                o.id,
                o.order_date,
                o.status,
                COALESCE(u.full_name, '') AS customer_name,
                m.full_name AS manager_name,
                (SELECT COUNT(*) FROM order_items WHERE order_id = o.id) AS total_items
            FROM orders o
            LEFT JOIN users u ON o.customer_user_id = u.id
            LEFT JOIN users m ON o.manager_user_id = m.id
            WHERE (?1 IS NULL OR date(o.order_date) >= ?1)
              AND (?2 IS NULL OR date(o.order_date) <= ?2)
            ORDER BY o.order_date DESC
            "#,
        )?;

        let from_s = from.map(|d| d.format("%Y-%m-%d").to_string());
        let to_s = to.map(|d| d.format("%Y-%m-%d").to_string());

        let rows = stmt.query_map(params![from_s, to_s], |row| {
            let id: i64 = row.get(0)?;
            let date_raw: String = row.get(1)?;
            let status_raw: String = row.get(2)?;
            Ok(OrderSummary {
                id,
                order_number: id.to_string(),
                order_date: parse_utc(1, &date_raw)?,
                status: parse_code(2, &status_raw, "订单状态", OrderStatus::from_code)?,
                customer_name: row.get(3)?,
                manager_name: row.get(4)?,
                total_items: row.get(5)?,
            })
        })?;

        let mut result = Vec::new();
        for row in rows {
            result.push(row?);
        }
        Ok(result)
    }
}
