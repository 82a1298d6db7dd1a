// ==========================================
// 纺织家具生产经营系统 - 盘点单领域模型
// ==========================================
// 盘点单: 账面数量 vs 实盘数量对照
// 红线: 差异金额占比超阈值的单据须总监审批后才能过账
// ==========================================

use crate::domain::types::MaterialKind;
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

// ==========================================
// InventoryItem - 盘点明细行
// ==========================================
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InventoryItem {
    pub id: i64,                     // 行ID（插入前为 0）
    pub document_id: i64,            // 单据ID（插入前为 0）
    pub material_article: String,    // 物料货号
    pub material_name: String,       // 物料名称（盘点时快照）
    pub material_kind: MaterialKind, // 物料类别
    pub accounting_quantity: f64,    // 账面数量
    pub actual_quantity: f64,        // 实盘数量
    pub difference_quantity: f64,    // 差异数量（实盘 - 账面）
    pub unit: String,                // 计量单位
    pub price: f64,                  // 单价
    pub accounting_amount: f64,      // 账面金额
    pub actual_amount: f64,          // 实盘金额
    pub difference_amount: f64,      // 差异金额
}

impl InventoryItem {
    /// 按账面/实盘数量与单价重算派生字段
    pub fn recalculate(&mut self) {
        self.accounting_amount = self.accounting_quantity * self.price;
        self.actual_amount = self.actual_quantity * self.price;
        self.difference_quantity = self.actual_quantity - self.accounting_quantity;
        self.difference_amount = self.actual_amount - self.accounting_amount;
    }
}

// ==========================================
// InventoryDocument - 盘点单
// ==========================================
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InventoryDocument {
    pub id: i64,                      // 单据ID
    pub document_number: String,      // 单号（INV-<年>-<序号>）
    pub document_date: NaiveDate,     // 盘点日期
    pub warehouse_keeper: String,     // 盘点库管
    pub total_accounting_amount: f64, // 账面金额合计
    pub total_actual_amount: f64,     // 实盘金额合计
    pub difference_amount: f64,       // 差异金额（实盘 - 账面）
    pub difference_percent: f64,      // 差异占比（|差异| / 账面 * 100）
    pub is_approved: bool,            // 是否已审批
    pub approved_by: Option<String>,  // 审批人
    pub approved_at: Option<DateTime<Utc>>, // 审批时间
    pub is_processed: bool,           // 是否已过账
    pub created_by: String,           // 制单人
    pub created_at: DateTime<Utc>,    // 创建时间
    pub items: Vec<InventoryItem>,    // 明细行
}

impl InventoryDocument {
    /// 按明细行重算合计与差异占比
    ///
    /// 口径:
    /// - difference_percent = |差异金额| / 账面金额合计 * 100
    /// - 账面金额合计为 0 时差异占比记 0
    pub fn recalculate(&mut self) {
        for item in &mut self.items {
            item.recalculate();
        }
        self.total_accounting_amount = self.items.iter().map(|it| it.accounting_amount).sum();
        self.total_actual_amount = self.items.iter().map(|it| it.actual_amount).sum();
        self.difference_amount = self.total_actual_amount - self.total_accounting_amount;
        self.difference_percent = if self.total_accounting_amount != 0.0 {
            (self.difference_amount / self.total_accounting_amount * 100.0).abs()
        } else {
            0.0
        };
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn item(article: &str, accounting: f64, actual: f64, price: f64) -> InventoryItem {
        InventoryItem {
            id: 0,
            document_id: 0,
            material_article: article.to_string(),
            material_name: article.to_string(),
            material_kind: MaterialKind::Fabric,
            accounting_quantity: accounting,
            actual_quantity: actual,
            difference_quantity: 0.0,
            unit: "m".to_string(),
            price,
            accounting_amount: 0.0,
            actual_amount: 0.0,
            difference_amount: 0.0,
        }
    }

    fn doc(items: Vec<InventoryItem>) -> InventoryDocument {
        InventoryDocument {
            id: 0,
            document_number: "INV-2026-0001".to_string(),
            document_date: NaiveDate::from_ymd_opt(2026, 8, 1).unwrap(),
            warehouse_keeper: "keeper".to_string(),
            total_accounting_amount: 0.0,
            total_actual_amount: 0.0,
            difference_amount: 0.0,
            difference_percent: 0.0,
            is_approved: false,
            approved_by: None,
            approved_at: None,
            is_processed: false,
            created_by: "keeper".to_string(),
            created_at: Utc::now(),
            items,
        }
    }

    #[test]
    fn test_item_recalculate() {
        let mut it = item("F001", 100.0, 90.0, 50.0);
        it.recalculate();
        assert!((it.accounting_amount - 5000.0).abs() < 1e-9);
        assert!((it.actual_amount - 4500.0).abs() < 1e-9);
        assert!((it.difference_quantity + 10.0).abs() < 1e-9);
        assert!((it.difference_amount + 500.0).abs() < 1e-9);
    }

    #[test]
    fn test_document_difference_percent() {
        // 账面 5000，实盘 4500：差异 -500，占比 10%
        let mut d = doc(vec![item("F001", 100.0, 90.0, 50.0)]);
        d.recalculate();
        assert!((d.difference_amount + 500.0).abs() < 1e-9);
        assert!((d.difference_percent - 10.0).abs() < 1e-9);
    }

    #[test]
    fn test_document_zero_accounting_total() {
        // 纯盘盈（账面为 0）：差异占比按 0 处理
        let mut d = doc(vec![item("F001", 0.0, 5.0, 50.0)]);
        d.recalculate();
        assert!((d.difference_amount - 250.0).abs() < 1e-9);
        assert!((d.difference_percent - 0.0).abs() < 1e-9);
    }

    #[test]
    fn test_document_surplus_percent() {
        // 盘盈也按绝对值计占比
        let mut d = doc(vec![item("F001", 100.0, 130.0, 10.0)]);
        d.recalculate();
        assert!((d.difference_percent - 30.0).abs() < 1e-9);
    }
}
