// ==========================================
// 纺织家具生产经营系统 - Tauri 命令（按域拆分）
// ==========================================
// 职责: Tauri 命令定义,连接前端与后端 API
// ==========================================

#![cfg(feature = "tauri-app")]

mod auth;
mod catalog;
mod common;
mod inventory;
mod material;
mod order;
mod receipt;
mod report;

pub use auth::*;
pub use catalog::*;
pub use inventory::*;
pub use material::*;
pub use order::*;
pub use receipt::*;
pub use report::*;
