// ==========================================
// 纺织家具生产经营系统 - 目录领域模型
// ==========================================
// 三类目录: 面料 / 辅料 / 成品
// 主键: article（货号）
// ==========================================

use serde::{Deserialize, Serialize};

// ==========================================
// Fabric - 面料主数据
// ==========================================
// 名称/颜色/花型/成分 以查找表编码存储，展示时连表解析
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Fabric {
    pub article: String,              // 货号（主键）
    pub name_code: i64,               // 名称编码（lookup_fabric_name）
    pub color_code: Option<i64>,      // 颜色编码
    pub pattern_code: Option<i64>,    // 花型编码
    pub composition_code: Option<i64>, // 成分编码
    pub width_mm: i64,                // 幅宽（mm）
    pub unit: String,                 // 计量单位（米）
    pub price: f64,                   // 单价（每米）
    pub image_path: Option<String>,   // 图片路径
}

/// 面料 + 查找表解析结果（列表/详情展示用）
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FabricDetails {
    #[serde(flatten)]
    pub fabric: Fabric,
    pub name: String,                 // 名称
    pub color_name: Option<String>,   // 颜色
    pub pattern_name: Option<String>, // 花型
    pub composition_name: Option<String>, // 成分
}

// ==========================================
// Fitting - 辅料主数据
// ==========================================
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Fitting {
    pub article: String,            // 货号（主键）
    pub name: String,               // 名称
    pub type_code: Option<i64>,     // 类型编码（lookup_fitting_type）
    pub width_mm: Option<f64>,      // 宽（mm）
    pub length_mm: Option<f64>,     // 长（mm）
    pub dimension_unit: Option<String>, // 尺寸单位
    pub weight_value: Option<f64>,  // 单件重量
    pub weight_unit: Option<String>, // 重量单位
    pub price: f64,                 // 单价（每件）
    pub image_path: Option<String>, // 图片路径
}

/// 辅料 + 类型名称解析结果
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FittingDetails {
    #[serde(flatten)]
    pub fitting: Fitting,
    pub type_name: Option<String>, // 类型名称
}

// ==========================================
// ManufacturedGood - 成品主数据
// ==========================================
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ManufacturedGood {
    pub article: String,            // 货号（主键）
    pub name: String,               // 名称
    pub width_mm: Option<i64>,      // 宽（mm）
    pub length_mm: Option<i64>,     // 长（mm）
    pub unit: String,               // 计量单位
    pub price: f64,                 // 售价
    pub image_path: Option<String>, // 图片路径
    pub comment: Option<String>,    // 备注
}
