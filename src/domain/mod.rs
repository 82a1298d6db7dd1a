// ==========================================
// 纺织家具生产经营系统 - 领域层
// ==========================================
// 实体与共享类型；不含数据访问与业务编排
// ==========================================

pub mod catalog;
pub mod inventory;
pub mod movement;
pub mod order;
pub mod receipt;
pub mod report;
pub mod stock;
pub mod types;
pub mod user;

// 重导出
pub use catalog::{Fabric, FabricDetails, Fitting, FittingDetails, ManufacturedGood};
pub use inventory::{InventoryDocument, InventoryItem};
pub use movement::MaterialMovement;
pub use order::{Order, OrderItem, OrderSummary};
pub use receipt::{ReceiptDocument, ReceiptItem};
pub use report::{MaterialMovementRow, MaterialStockRow};
pub use stock::{
    FabricRoll, FabricRollValuation, FittingBatch, FittingBatchValuation, StockQuantity,
};
pub use user::{NewUser, User};
