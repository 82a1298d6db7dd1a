// ==========================================
// 纺织家具生产经营系统 - 报表行模型
// ==========================================
// 仅承载可打印报表的数据行；排版/导出不在本仓库范围
// ==========================================

use crate::domain::types::MaterialKind;
use serde::{Deserialize, Serialize};

// ==========================================
// MaterialStockRow - 物料库存报表行
// ==========================================
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MaterialStockRow {
    pub article: String,          // 货号
    pub name: String,             // 名称
    pub kind: MaterialKind,       // 类别
    pub quantity: f64,            // 当前账面数量
    pub unit: String,             // 计量单位
    pub price: f64,               // 单价
    pub amount: f64,              // 金额（数量 * 单价）
}

// ==========================================
// MaterialMovementRow - 物料收发存报表行
// ==========================================
// 期初 + 收入 - 发出 = 期末
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MaterialMovementRow {
    pub article: String,          // 货号
    pub name: String,             // 名称
    pub kind: MaterialKind,       // 类别
    pub unit: String,             // 计量单位
    pub price: f64,               // 当前单价
    pub initial_quantity: f64,    // 期初数量
    pub initial_amount: f64,      // 期初金额
    pub receipt_quantity: f64,    // 本期收入数量
    pub receipt_amount: f64,      // 本期收入金额
    pub expense_quantity: f64,    // 本期发出数量
    pub expense_amount: f64,      // 本期发出金额
    pub final_quantity: f64,      // 期末数量
    pub final_amount: f64,        // 期末金额
}
