// ==========================================
// 纺织家具生产经营系统 - 领域类型定义
// ==========================================
// 序列化格式: SCREAMING_SNAKE_CASE (与数据库一致)
// 展示名称: 通过 i18n 键解析（locales/*.yml）
// ==========================================

use serde::{Deserialize, Serialize};
use std::fmt;

// ==========================================
// 用户角色 (Role)
// ==========================================
// 权限边界: 客户下单 / 经理推进订单 / 库管收发盘点 / 总监审批
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Role {
    Customer,  // 客户
    Manager,   // 经理
    Warehouse, // 库管
    Director,  // 总监
}

impl Role {
    /// 数据库存储码
    pub fn as_code(&self) -> &'static str {
        match self {
            Role::Customer => "CUSTOMER",
            Role::Manager => "MANAGER",
            Role::Warehouse => "WAREHOUSE",
            Role::Director => "DIRECTOR",
        }
    }

    /// 从数据库存储码解析
    pub fn from_code(code: &str) -> Option<Role> {
        match code {
            "CUSTOMER" => Some(Role::Customer),
            "MANAGER" => Some(Role::Manager),
            "WAREHOUSE" => Some(Role::Warehouse),
            "DIRECTOR" => Some(Role::Director),
            _ => None,
        }
    }

    /// i18n 展示键
    pub fn i18n_key(&self) -> &'static str {
        match self {
            Role::Customer => "role.customer",
            Role::Manager => "role.manager",
            Role::Warehouse => "role.warehouse",
            Role::Director => "role.director",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_code())
    }
}

// ==========================================
// 订单状态 (Order Status)
// ==========================================
// 状态链: NEW → WAITING → PROCESSING → WAITING_FOR_PAYMENT
//         → PAID → IN_PRODUCTION → READY
// 分支:   PROCESSING → REJECTED（终态）
// 红线:   只允许前进一步，不允许跳级/回退
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OrderStatus {
    New,               // 新建
    Waiting,           // 待确认
    Processing,        // 处理中
    Rejected,          // 已拒绝（终态）
    WaitingForPayment, // 待付款
    Paid,              // 已付款
    InProduction,      // 裁剪生产
    Ready,             // 已完成（终态）
}

impl OrderStatus {
    /// 数据库存储码
    pub fn as_code(&self) -> &'static str {
        match self {
            OrderStatus::New => "NEW",
            OrderStatus::Waiting => "WAITING",
            OrderStatus::Processing => "PROCESSING",
            OrderStatus::Rejected => "REJECTED",
            OrderStatus::WaitingForPayment => "WAITING_FOR_PAYMENT",
            OrderStatus::Paid => "PAID",
            OrderStatus::InProduction => "IN_PRODUCTION",
            OrderStatus::Ready => "READY",
        }
    }

    /// 从数据库存储码解析
    pub fn from_code(code: &str) -> Option<OrderStatus> {
        match code {
            "NEW" => Some(OrderStatus::New),
            "WAITING" => Some(OrderStatus::Waiting),
            "PROCESSING" => Some(OrderStatus::Processing),
            "REJECTED" => Some(OrderStatus::Rejected),
            "WAITING_FOR_PAYMENT" => Some(OrderStatus::WaitingForPayment),
            "PAID" => Some(OrderStatus::Paid),
            "IN_PRODUCTION" => Some(OrderStatus::InProduction),
            "READY" => Some(OrderStatus::Ready),
            _ => None,
        }
    }

    /// i18n 展示键
    pub fn i18n_key(&self) -> &'static str {
        match self {
            OrderStatus::New => "order_status.new",
            OrderStatus::Waiting => "order_status.waiting",
            OrderStatus::Processing => "order_status.processing",
            OrderStatus::Rejected => "order_status.rejected",
            OrderStatus::WaitingForPayment => "order_status.waiting_for_payment",
            OrderStatus::Paid => "order_status.paid",
            OrderStatus::InProduction => "order_status.in_production",
            OrderStatus::Ready => "order_status.ready",
        }
    }

    /// 主链下一个状态（终态与 REJECTED 返回 None）
    pub fn next(&self) -> Option<OrderStatus> {
        match self {
            OrderStatus::New => Some(OrderStatus::Waiting),
            OrderStatus::Waiting => Some(OrderStatus::Processing),
            OrderStatus::Processing => Some(OrderStatus::WaitingForPayment),
            OrderStatus::WaitingForPayment => Some(OrderStatus::Paid),
            OrderStatus::Paid => Some(OrderStatus::InProduction),
            OrderStatus::InProduction => Some(OrderStatus::Ready),
            OrderStatus::Rejected | OrderStatus::Ready => None,
        }
    }

    /// 是否为终态
    pub fn is_terminal(&self) -> bool {
        matches!(self, OrderStatus::Rejected | OrderStatus::Ready)
    }

    /// 状态转换校验
    ///
    /// 规则:
    /// - 主链只允许前进一步
    /// - REJECTED 仅可由 PROCESSING 进入
    pub fn can_transition_to(&self, target: OrderStatus) -> bool {
        if target == OrderStatus::Rejected {
            return *self == OrderStatus::Processing;
        }
        self.next() == Some(target)
    }
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_code())
    }
}

// ==========================================
// 物料类别 (Material Kind)
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MaterialKind {
    Fabric,  // 面料（按米计）
    Fitting, // 辅料（按件计）
}

impl MaterialKind {
    pub fn as_code(&self) -> &'static str {
        match self {
            MaterialKind::Fabric => "FABRIC",
            MaterialKind::Fitting => "FITTING",
        }
    }

    pub fn from_code(code: &str) -> Option<MaterialKind> {
        match code {
            "FABRIC" => Some(MaterialKind::Fabric),
            "FITTING" => Some(MaterialKind::Fitting),
            _ => None,
        }
    }

    /// 缺省计量单位
    pub fn default_unit(&self) -> &'static str {
        match self {
            MaterialKind::Fabric => "m",
            MaterialKind::Fitting => "pcs",
        }
    }
}

impl fmt::Display for MaterialKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_code())
    }
}

// ==========================================
// 物料流水方向 (Movement Direction)
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MovementDirection {
    In,  // 入库
    Out, // 出库
}

impl MovementDirection {
    pub fn as_code(&self) -> &'static str {
        match self {
            MovementDirection::In => "IN",
            MovementDirection::Out => "OUT",
        }
    }

    pub fn from_code(code: &str) -> Option<MovementDirection> {
        match code {
            "IN" => Some(MovementDirection::In),
            "OUT" => Some(MovementDirection::Out),
            _ => None,
        }
    }
}

impl fmt::Display for MovementDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_code())
    }
}

// ==========================================
// 流水来源单据类型 (Movement Document Type)
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MovementDocumentType {
    Receipt,   // 收料单
    Inventory, // 盘点单
    Order,     // 订单领料
}

impl MovementDocumentType {
    pub fn as_code(&self) -> &'static str {
        match self {
            MovementDocumentType::Receipt => "RECEIPT",
            MovementDocumentType::Inventory => "INVENTORY",
            MovementDocumentType::Order => "ORDER",
        }
    }

    pub fn from_code(code: &str) -> Option<MovementDocumentType> {
        match code {
            "RECEIPT" => Some(MovementDocumentType::Receipt),
            "INVENTORY" => Some(MovementDocumentType::Inventory),
            "ORDER" => Some(MovementDocumentType::Order),
            _ => None,
        }
    }
}

impl fmt::Display for MovementDocumentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_code())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_role_code_roundtrip() {
        for role in [Role::Customer, Role::Manager, Role::Warehouse, Role::Director] {
            assert_eq!(Role::from_code(role.as_code()), Some(role));
        }
        assert_eq!(Role::from_code("ADMIN"), None);
    }

    #[test]
    fn test_order_status_forward_chain() {
        let mut status = OrderStatus::New;
        let mut hops = 0;
        while let Some(next) = status.next() {
            assert!(status.can_transition_to(next));
            status = next;
            hops += 1;
        }
        assert_eq!(status, OrderStatus::Ready);
        assert_eq!(hops, 6);
    }

    #[test]
    fn test_order_status_no_skip_no_backward() {
        assert!(!OrderStatus::New.can_transition_to(OrderStatus::Processing));
        assert!(!OrderStatus::Paid.can_transition_to(OrderStatus::Waiting));
        assert!(!OrderStatus::Ready.can_transition_to(OrderStatus::New));
    }

    #[test]
    fn test_rejected_only_from_processing() {
        assert!(OrderStatus::Processing.can_transition_to(OrderStatus::Rejected));
        assert!(!OrderStatus::New.can_transition_to(OrderStatus::Rejected));
        assert!(!OrderStatus::Waiting.can_transition_to(OrderStatus::Rejected));
        // REJECTED 为终态
        assert!(!OrderStatus::Rejected.can_transition_to(OrderStatus::WaitingForPayment));
        assert!(OrderStatus::Rejected.is_terminal());
    }

    #[test]
    fn test_serde_screaming_snake() {
        let s = serde_json::to_string(&OrderStatus::WaitingForPayment).unwrap();
        assert_eq!(s, "\"WAITING_FOR_PAYMENT\"");
        let kind: MaterialKind = serde_json::from_str("\"FABRIC\"").unwrap();
        assert_eq!(kind, MaterialKind::Fabric);
    }
}
