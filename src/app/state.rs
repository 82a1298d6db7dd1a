// ==========================================
// 纺织家具生产经营系统 - 应用状态
// ==========================================
// 职责: 管理应用级别的共享状态和API实例
// 说明: 所有仓储共享同一个 SQLite 连接（Mutex 串行化）
// ==========================================

use std::sync::{Arc, Mutex};

use rusqlite::Connection;

use crate::api::{
    AuthApi, CatalogApi, InventoryApi, MaterialApi, OrderApi, ReceiptApi, ReportApi,
};
use crate::config::ConfigManager;
use crate::domain::user::User;
use crate::repository::{
    CatalogRepository, InventoryRepository, MovementRepository, OrderRepository,
    ReceiptRepository, StockRepository, UserRepository,
};

/// 应用状态
///
/// 包含所有API实例和共享资源
/// 在Tauri应用中作为全局状态管理
pub struct AppState {
    /// 数据库路径
    pub db_path: String,

    /// 当前登录会话（桌面端单会话）
    pub session: Mutex<Option<User>>,

    /// 认证API
    pub auth_api: Arc<AuthApi>,

    /// 目录API
    pub catalog_api: Arc<CatalogApi>,

    /// 物料台账API
    pub material_api: Arc<MaterialApi>,

    /// 订单API
    pub order_api: Arc<OrderApi>,

    /// 收料单API
    pub receipt_api: Arc<ReceiptApi>,

    /// 盘点API
    pub inventory_api: Arc<InventoryApi>,

    /// 报表API
    pub report_api: Arc<ReportApi>,

    /// 配置管理器
    pub config: Arc<ConfigManager>,
}

impl AppState {
    /// 创建新的AppState实例
    ///
    /// # 参数
    /// - db_path: 数据库文件路径
    ///
    /// # 说明
    /// 该方法会：
    /// 1. 打开共享连接并应用统一 PRAGMA
    /// 2. 初始化所有Repository
    /// 3. 创建所有API实例
    pub fn new(db_path: String) -> Result<Self, String> {
        tracing::info!("初始化AppState，数据库路径: {}", db_path);

        let mut conn = crate::db::open_sqlite_connection(&db_path)
            .map_err(|e| format!("无法打开数据库: {}", e))?;
        crate::perf::install_sqlite_tracing(&mut conn);

        // Best-effort: schema 版本只提示，不阻断启动。
        match crate::db::read_schema_version(&conn) {
            Ok(Some(v)) if v != crate::db::CURRENT_SCHEMA_VERSION => {
                tracing::warn!(
                    "schema_version 不匹配: 期望 {}, 实际 {}",
                    crate::db::CURRENT_SCHEMA_VERSION,
                    v
                );
            }
            Ok(Some(_)) => {}
            Ok(None) => tracing::warn!("数据库缺少 schema_version 表（可能未初始化）"),
            Err(e) => tracing::warn!("读取 schema_version 失败(将继续启动): {}", e),
        }

        let conn = Arc::new(Mutex::new(conn));

        // ==========================================
        // 初始化Repository层
        // ==========================================
        let user_repo = Arc::new(UserRepository::new(conn.clone()));
        let catalog_repo = Arc::new(CatalogRepository::new(conn.clone()));
        let stock_repo = Arc::new(StockRepository::new(conn.clone()));
        let order_repo = Arc::new(OrderRepository::new(conn.clone()));
        let receipt_repo = Arc::new(ReceiptRepository::new(conn.clone()));
        let inventory_repo = Arc::new(InventoryRepository::new(conn.clone()));
        let movement_repo = Arc::new(MovementRepository::new(conn.clone()));

        let config = Arc::new(
            ConfigManager::from_connection(conn.clone())
                .map_err(|e| format!("无法创建ConfigManager: {}", e))?,
        );

        // ==========================================
        // 初始化API层
        // ==========================================
        let auth_api = Arc::new(AuthApi::new(user_repo));
        let catalog_api = Arc::new(CatalogApi::new(catalog_repo.clone()));
        let material_api = Arc::new(MaterialApi::new(
            stock_repo.clone(),
            catalog_repo.clone(),
            config.clone(),
        ));
        let order_api = Arc::new(OrderApi::new(order_repo, catalog_repo.clone()));
        let receipt_api = Arc::new(ReceiptApi::new(
            conn.clone(),
            receipt_repo,
            catalog_repo.clone(),
        ));
        let inventory_api = Arc::new(InventoryApi::new(
            conn.clone(),
            inventory_repo,
            stock_repo.clone(),
            catalog_repo.clone(),
            config.clone(),
        ));
        let report_api = Arc::new(ReportApi::new(
            stock_repo,
            catalog_repo,
            movement_repo,
        ));

        tracing::info!("AppState初始化完成");

        Ok(Self {
            db_path,
            session: Mutex::new(None),
            auth_api,
            catalog_api,
            material_api,
            order_api,
            receipt_api,
            inventory_api,
            report_api,
            config,
        })
    }

    /// 读取当前登录用户
    pub fn current_user(&self) -> Result<User, String> {
        self.session
            .lock()
            .map_err(|e| format!("会话锁获取失败: {}", e))?
            .clone()
            .ok_or_else(|| "未登录".to_string())
    }

    /// 写入当前登录会话
    pub fn set_session(&self, user: Option<User>) -> Result<(), String> {
        *self
            .session
            .lock()
            .map_err(|e| format!("会话锁获取失败: {}", e))? = user;
        Ok(())
    }
}

/// 获取默认数据库路径
pub fn get_default_db_path() -> String {
    use std::path::PathBuf;

    // 允许通过环境变量显式指定 DB 路径（便于调试/测试/CI）
    if let Ok(path) = std::env::var("TEXTILE_WORKSHOP_DB_PATH") {
        let trimmed = path.trim();
        if !trimmed.is_empty() {
            return trimmed.to_string();
        }
    }

    // 使用用户数据目录；开发环境用独立目录，避免污染生产数据
    let mut path = PathBuf::from("./textile_workshop.db");
    if let Some(data_dir) = dirs::data_dir() {
        #[cfg(debug_assertions)]
        let dir = data_dir.join("textile-workshop-dev");
        #[cfg(not(debug_assertions))]
        let dir = data_dir.join("textile-workshop");

        let _ = std::fs::create_dir_all(&dir);
        path = dir.join("textile_workshop.db");
    }

    path.to_string_lossy().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_get_default_db_path() {
        let path = get_default_db_path();
        assert!(!path.is_empty());
        assert!(path.ends_with(".db"));
    }

    // 注意：AppState::new() 的测试需要真实的数据库文件，放在集成测试中
}
