// ==========================================
// 纺织家具生产经营系统 - 库存领域模型
// ==========================================
// 口径: 库存按"批次"存放（面料=卷，辅料=批）
//       货号层面的账面数量 = 各批次汇总
// 红线: 批次行是库存唯一事实，聚合量一律派生
// ==========================================

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// ==========================================
// FabricRoll - 面料卷
// ==========================================
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FabricRoll {
    pub roll_id: String,        // 卷号（主键，收料时生成）
    pub fabric_article: String, // 面料货号
    pub length_mm: i64,         // 卷长（mm）
    pub width_mm: i64,          // 幅宽（mm）
    pub received_at: DateTime<Utc>, // 入库时间（盘亏冲减按先入先出）
}

impl FabricRoll {
    /// 卷长（米）
    pub fn length_m(&self) -> f64 {
        self.length_mm as f64 / 1000.0
    }

    /// 面积（平方米）
    pub fn area_sqm(&self) -> f64 {
        (self.length_mm as f64 * self.width_mm as f64) / 1_000_000.0
    }
}

// ==========================================
// FittingBatch - 辅料批次
// ==========================================
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FittingBatch {
    pub batch_id: String,        // 批号（主键，收料时生成）
    pub fitting_article: String, // 辅料货号
    pub quantity: f64,           // 批内数量（件）
    pub received_at: DateTime<Utc>, // 入库时间
}

// ==========================================
// 批次级估值行（物料台账页面展示用）
// ==========================================

/// 面料卷估值（长度米/面积平米/金额按 2 位小数四舍五入）
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FabricRollValuation {
    pub roll_id: String,
    pub fabric_article: String,
    pub fabric_name: String,
    pub length_mm: i64,
    pub width_mm: i64,
    pub unit: String,
    pub price: f64,
    pub area_sqm: f64,
    pub length_m: f64,
    pub total_cost: f64,
}

/// 辅料批次估值（总重/金额按 2 位小数四舍五入）
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FittingBatchValuation {
    pub batch_id: String,
    pub fitting_article: String,
    pub fitting_name: String,
    pub quantity: f64,
    pub price: f64,
    pub weight_value: f64,
    pub weight_unit: String,
    pub total_weight: f64,
    pub total_cost: f64,
}

// ==========================================
// StockQuantity - 货号级账面数量
// ==========================================
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StockQuantity {
    pub article: String,  // 货号
    pub quantity: f64,    // 账面数量（面料=米，辅料=件）
}
