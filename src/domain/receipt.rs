// ==========================================
// 纺织家具生产经营系统 - 收料单领域模型
// ==========================================
// 收料单: 记录入库物料；"过账"后生成库存批次 + 入库流水
// ==========================================

use crate::domain::types::MaterialKind;
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

// ==========================================
// ReceiptItem - 收料单明细行
// ==========================================
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReceiptItem {
    pub id: i64,                   // 行ID（插入前为 0）
    pub document_id: i64,          // 单据ID（插入前为 0）
    pub material_article: String,  // 物料货号
    pub material_kind: MaterialKind, // 物料类别
    pub quantity: f64,             // 数量（面料=米，辅料=件）
    pub unit: String,              // 计量单位
    pub price: f64,                // 单价
    pub amount: f64,               // 行金额（quantity * price）
}

impl ReceiptItem {
    /// 行金额重算
    pub fn compute_amount(&self) -> f64 {
        self.quantity * self.price
    }
}

// ==========================================
// ReceiptDocument - 收料单
// ==========================================
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReceiptDocument {
    pub id: i64,                    // 单据ID
    pub document_number: String,    // 单号（RCP-<年>-<序号>）
    pub document_date: NaiveDate,   // 单据日期
    pub supplier: String,           // 供应商
    pub total_amount: f64,          // 合计金额
    pub is_processed: bool,         // 是否已过账
    pub created_by: String,         // 制单人
    pub created_at: DateTime<Utc>,  // 创建时间
    pub items: Vec<ReceiptItem>,    // 明细行
}

impl ReceiptDocument {
    /// 按明细行重算合计金额
    pub fn compute_total(items: &[ReceiptItem]) -> f64 {
        items.iter().map(|it| it.amount).sum()
    }
}
