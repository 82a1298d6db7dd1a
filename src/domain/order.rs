// ==========================================
// 纺织家具生产经营系统 - 订单领域模型
// ==========================================

use crate::domain::types::OrderStatus;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// ==========================================
// OrderItem - 订单明细行
// ==========================================
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderItem {
    pub id: i64,                 // 行ID（插入前为 0）
    pub order_id: i64,           // 订单ID（插入前为 0）
    pub product_article: String, // 成品货号
    pub product_name: String,    // 成品名称（下单时快照）
    pub quantity: i64,           // 数量
    pub price: f64,              // 单价（下单时快照）
}

impl OrderItem {
    /// 行金额
    pub fn line_total(&self) -> f64 {
        self.quantity as f64 * self.price
    }
}

// ==========================================
// Order - 订单
// ==========================================
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Order {
    pub id: i64,                        // 订单ID
    pub customer_user_id: i64,          // 下单客户
    pub manager_user_id: Option<i64>,   // 跟单经理（首次推进时落位）
    pub status: OrderStatus,            // 当前状态
    pub order_date: DateTime<Utc>,      // 下单时间
    pub total_amount: f64,              // 订单总额（行金额合计）
    pub items: Vec<OrderItem>,          // 明细行
}

impl Order {
    /// 按明细行重算总额
    pub fn compute_total(items: &[OrderItem]) -> f64 {
        items.iter().map(|it| it.line_total()).sum()
    }
}

// ==========================================
// OrderSummary - 订单列表行（报表/列表页）
// ==========================================
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderSummary {
    pub id: i64,
    pub order_number: String,       // 展示用单号（即 ID 文本）
    pub order_date: DateTime<Utc>,
    pub status: OrderStatus,
    pub customer_name: String,      // 客户姓名（未知时为空串）
    pub manager_name: Option<String>, // 经理姓名（未指派为 None）
    pub total_items: i64,           // 明细行数
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_compute_total() {
        let items = vec![
            OrderItem {
                id: 0,
                order_id: 0,
                product_article: "P001".to_string(),
                product_name: "毛巾".to_string(),
                quantity: 3,
                price: 120.0,
            },
            OrderItem {
                id: 0,
                order_id: 0,
                product_article: "P002".to_string(),
                product_name: "抱枕".to_string(),
                quantity: 2,
                price: 85.5,
            },
        ];
        assert!((Order::compute_total(&items) - 531.0).abs() < 1e-9);
        assert!((Order::compute_total(&[]) - 0.0).abs() < 1e-9);
    }
}
