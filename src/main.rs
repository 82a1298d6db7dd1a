// ==========================================
// 纺织家具生产经营系统 - Tauri 主入口
// ==========================================
// 技术栈: Tauri + Rust + SQLite
// ==========================================

// 禁止控制台窗口 (Windows)
#![cfg_attr(not(debug_assertions), windows_subsystem = "windows")]

use textile_workshop::app::get_default_db_path;

#[cfg(feature = "tauri-app")]
fn main() {
    use textile_workshop::app::tauri_commands::*;
    use textile_workshop::app::AppState;

    // 初始化日志系统
    textile_workshop::logging::init();

    tracing::info!("==================================================");
    tracing::info!("{}", textile_workshop::APP_NAME);
    tracing::info!("系统版本: {}", textile_workshop::VERSION);
    tracing::info!("==================================================");

    // 获取数据库路径
    let db_path = get_default_db_path();
    tracing::info!("使用数据库: {}", db_path);

    // 创建AppState
    let app_state = AppState::new(db_path).expect("无法初始化AppState");

    tracing::info!("启动Tauri应用...");

    // 启动Tauri应用
    tauri::Builder::default()
        .manage(app_state)
        .invoke_handler(tauri::generate_handler![
            // ==========================================
            // 认证相关命令 (6个)
            // ==========================================
            login,
            logout,
            current_user,
            register_customer,
            create_user,
            list_users,
            // ==========================================
            // 目录相关命令 (9个)
            // ==========================================
            list_fabrics,
            get_fabric,
            list_fittings,
            get_fitting,
            list_goods,
            get_good,
            upsert_fabric,
            upsert_fitting,
            upsert_good,
            // ==========================================
            // 物料台账相关命令 (4个)
            // ==========================================
            list_fabric_stock,
            list_fitting_stock,
            get_average_cost,
            check_scrap,
            // ==========================================
            // 订单相关命令 (6个)
            // ==========================================
            create_order,
            list_my_orders,
            list_all_orders,
            get_order,
            update_order_status,
            list_order_summaries,
            // ==========================================
            // 收料单相关命令 (4个)
            // ==========================================
            create_receipt,
            process_receipt,
            get_receipt,
            list_receipts,
            // ==========================================
            // 盘点相关命令 (6个)
            // ==========================================
            prepare_inventory_snapshot,
            save_inventory_document,
            approve_inventory_document,
            process_inventory_document,
            get_inventory_document,
            list_inventory_documents,
            // ==========================================
            // 报表相关命令 (2个)
            // ==========================================
            material_stock_report,
            material_movement_report,
        ])
        .run(tauri::generate_context!())
        .expect("启动Tauri应用失败");

    tracing::info!("Tauri应用已退出");
}

#[cfg(not(feature = "tauri-app"))]
fn main() {
    println!("==================================================");
    println!("{}", textile_workshop::APP_NAME);
    println!("系统版本: {}", textile_workshop::VERSION);
    println!("==================================================");
    println!();
    println!("此可执行文件需要启用 tauri-app 特性");
    println!("使用: cargo run --features tauri-app");
    println!();
    println!("或者使用库模式:");
    println!("use textile_workshop::app::AppState;");
    println!();
    println!("默认数据库路径: {}", get_default_db_path());
}
