// ==========================================
// 纺织家具生产经营系统 - API 层
// ==========================================
// 职责: 业务编排（校验 + 权限 + 事务）；数据访问在仓储层
// ==========================================

pub mod access;
pub mod error;

pub mod auth_api;
pub mod catalog_api;
pub mod inventory_api;
pub mod material_api;
pub mod order_api;
pub mod receipt_api;
pub mod report_api;

// 重导出
pub use auth_api::AuthApi;
pub use catalog_api::CatalogApi;
pub use error::{ApiError, ApiResult};
pub use inventory_api::InventoryApi;
pub use material_api::MaterialApi;
pub use order_api::{NewOrderItem, OrderApi};
pub use receipt_api::{NewReceiptItem, ReceiptApi};
pub use report_api::ReportApi;
