// ==========================================
// 纺织家具生产经营系统 - 物料流水领域模型
// ==========================================
// 红线: 流水只追加不修改，仅由单据过账写入
// ==========================================

use crate::domain::types::{MaterialKind, MovementDirection, MovementDocumentType};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

// ==========================================
// MaterialMovement - 物料流水
// ==========================================
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MaterialMovement {
    pub id: i64,                         // 流水ID
    pub material_article: String,        // 物料货号
    pub material_kind: MaterialKind,     // 物料类别
    pub document_type: MovementDocumentType, // 来源单据类型
    pub document_id: i64,                // 来源单据ID
    pub movement_date: NaiveDate,        // 业务日期
    pub quantity: f64,                   // 数量（恒为正，方向看 direction）
    pub unit: String,                    // 计量单位
    pub price: f64,                      // 单价
    pub amount: f64,                     // 金额（恒为正）
    pub direction: MovementDirection,    // 入库/出库
}
