// ==========================================
// 纺织家具生产经营系统 - 订单 API
// ==========================================
// 职责: 订单创建、查询、状态推进
// 红线: 状态只允许前进一步；REJECTED 仅可由 PROCESSING 进入
// ==========================================

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::api::access::ensure_role;
use crate::api::error::{ApiError, ApiResult};
use crate::domain::order::{Order, OrderItem, OrderSummary};
use crate::domain::types::{OrderStatus, Role};
use crate::domain::user::User;
use crate::repository::catalog_repo::CatalogRepository;
use crate::repository::order_repo::OrderRepository;

// ==========================================
// NewOrderItem - 下单入参行
// ==========================================
/// 下单入参（单价与名称以下单时目录为准做快照）
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewOrderItem {
    pub product_article: String,
    pub quantity: i64,
}

// ==========================================
// OrderApi - 订单 API
// ==========================================
pub struct OrderApi {
    order_repo: Arc<OrderRepository>,
    catalog_repo: Arc<CatalogRepository>,
}

impl OrderApi {
    /// 创建新的 OrderApi 实例
    pub fn new(order_repo: Arc<OrderRepository>, catalog_repo: Arc<CatalogRepository>) -> Self {
        Self {
            order_repo,
            catalog_repo,
        }
    }

    /// 客户下单
    ///
    /// # 说明
    /// - 明细行为成品货号 + 数量；单价与名称从成品目录快照
    /// - 订单头 + 明细行在同一事务写入
    pub fn create_order(&self, actor: &User, items: &[NewOrderItem]) -> ApiResult<Order> {
        ensure_role(actor, &[Role::Customer])?;

        if items.is_empty() {
            return Err(ApiError::InvalidInput("订单明细不能为空".to_string()));
        }

        let mut order_items = Vec::with_capacity(items.len());
        for item in items {
            if item.quantity <= 0 {
                return Err(ApiError::InvalidInput(format!(
                    "数量必须为正: article={}",
                    item.product_article
                )));
            }
            let good = self
                .catalog_repo
                .find_good(&item.product_article)?
                .ok_or_else(|| {
                    ApiError::NotFound(format!("成品(article={})不存在", item.product_article))
                })?;
            order_items.push(OrderItem {
                id: 0,
                order_id: 0,
                product_article: good.article,
                product_name: good.name,
                quantity: item.quantity,
                price: good.price,
            });
        }

        let mut order = Order {
            id: 0,
            customer_user_id: actor.id,
            manager_user_id: None,
            status: OrderStatus::New,
            order_date: chrono::Utc::now(),
            total_amount: Order::compute_total(&order_items),
            items: order_items,
        };

        let order_id = self.order_repo.create(&order)?;
        order.id = order_id;
        for item in &mut order.items {
            item.order_id = order_id;
        }

        info!(
            order_id,
            customer = actor.id,
            total = order.total_amount,
            "订单创建成功"
        );
        Ok(order)
    }

    /// 客户查询自己的订单（含明细行）
    pub fn list_my_orders(&self, actor: &User) -> ApiResult<Vec<Order>> {
        ensure_role(actor, &[Role::Customer])?;
        Ok(self.order_repo.list_by_customer(actor.id)?)
    }

    /// 经理/总监查询全部订单（含明细行）
    pub fn list_all_orders(&self, actor: &User) -> ApiResult<Vec<Order>> {
        ensure_role(actor, &[Role::Manager, Role::Director])?;
        Ok(self.order_repo.list_all()?)
    }

    /// 按ID查询订单
    ///
    /// # 权限
    /// - 客户只能查看自己的订单；经理/总监不限
    pub fn get_order(&self, actor: &User, order_id: i64) -> ApiResult<Order> {
        let order = self
            .order_repo
            .find_by_id(order_id)?
            .ok_or_else(|| ApiError::NotFound(format!("订单(id={})不存在", order_id)))?;

        if actor.role == Role::Customer && order.customer_user_id != actor.id {
            return Err(ApiError::Forbidden {
                required: "MANAGER/DIRECTOR".to_string(),
                actual: actor.role.as_code().to_string(),
            });
        }
        Ok(order)
    }

    /// 经理推进订单状态
    ///
    /// # 说明
    /// - 状态转换按领域规则校验（一步前进 / PROCESSING→REJECTED）
    /// - 首次推进时落位跟单经理（COALESCE 语义，不覆盖已有经理）
    pub fn update_status(
        &self,
        actor: &User,
        order_id: i64,
        new_status: OrderStatus,
    ) -> ApiResult<Order> {
        ensure_role(actor, &[Role::Manager])?;

        let order = self
            .order_repo
            .find_by_id(order_id)?
            .ok_or_else(|| ApiError::NotFound(format!("订单(id={})不存在", order_id)))?;

        if !order.status.can_transition_to(new_status) {
            warn!(
                order_id,
                from = %order.status,
                to = %new_status,
                "订单状态转换被拒绝"
            );
            return Err(ApiError::InvalidStateTransition {
                from: order.status.as_code().to_string(),
                to: new_status.as_code().to_string(),
            });
        }

        // 首次推进时落位跟单经理；已有经理不覆盖
        let manager_assignment = if order.manager_user_id.is_none() {
            Some(actor.id)
        } else {
            None
        };
        self.order_repo
            .update_status(order_id, new_status, manager_assignment)?;

        info!(order_id, from = %order.status, to = %new_status, manager = actor.id, "订单状态已推进");

        self.order_repo
            .find_by_id(order_id)?
            .ok_or_else(|| ApiError::NotFound(format!("订单(id={})不存在", order_id)))
    }

    /// 订单列表行（报表/列表页），可按日期范围过滤
    pub fn list_order_summaries(
        &self,
        actor: &User,
        from: Option<chrono::NaiveDate>,
        to: Option<chrono::NaiveDate>,
    ) -> ApiResult<Vec<OrderSummary>> {
        ensure_role(actor, &[Role::Manager, Role::Director])?;
        if let (Some(f), Some(t)) = (from, to) {
            if f > t {
                return Err(ApiError::InvalidInput(
                    "起始日期不能晚于结束日期".to_string(),
                ));
            }
        }
        Ok(self.order_repo.list_summaries(from, to)?)
    }
}
