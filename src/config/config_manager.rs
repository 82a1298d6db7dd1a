// ==========================================
// 纺织家具生产经营系统 - 配置管理器
// ==========================================
// 职责: 业务阈值加载、查询、覆写管理
// 存储: config_kv 表 (key-value + scope)
// ==========================================

use crate::repository::error::{RepositoryError, RepositoryResult};
use rusqlite::{params, Connection};
use std::sync::{Arc, Mutex};

// ==========================================
// 配置键与缺省值
// ==========================================

/// 盘点差异审批阈值（百分比）：超过须总监审批后过账
pub const KEY_INVENTORY_APPROVAL_THRESHOLD: &str = "inventory.approval_threshold_percent";
pub const DEFAULT_INVENTORY_APPROVAL_THRESHOLD: f64 = 20.0;

/// 面料余料判定阈值（平方米）：低于视为布头
pub const KEY_FABRIC_SCRAP_AREA_SQM: &str = "stock.fabric_scrap_area_sqm";
pub const DEFAULT_FABRIC_SCRAP_AREA_SQM: f64 = 0.5;

/// 辅料余料判定阈值（件）：低于视为零头
pub const KEY_FITTING_SCRAP_QTY: &str = "stock.fitting_scrap_qty";
pub const DEFAULT_FITTING_SCRAP_QTY: f64 = 10.0;

// ==========================================
// ConfigManager - 配置管理器
// ==========================================
pub struct ConfigManager {
    conn: Arc<Mutex<Connection>>,
}

impl ConfigManager {
    /// 从已有连接创建 ConfigManager
    ///
    /// 说明：为保证连接行为一致，会对传入连接再次应用统一 PRAGMA（幂等）。
    pub fn from_connection(conn: Arc<Mutex<Connection>>) -> RepositoryResult<Self> {
        {
            let conn_guard = conn
                .lock()
                .map_err(|e| RepositoryError::LockError(e.to_string()))?;
            crate::db::configure_sqlite_connection(&conn_guard)?;
        }

        Ok(Self { conn })
    }

    /// 从 config_kv 表读取配置值（scope_id='global'）
    ///
    /// # 返回
    /// - `Some(String)`: 配置值
    /// - `None`: 配置不存在
    fn get_config_value(&self, key: &str) -> RepositoryResult<Option<String>> {
        let conn = self
            .conn
            .lock()
            .map_err(|e| RepositoryError::LockError(e.to_string()))?;

        let result = conn.query_row(
            "SELECT value FROM config_kv WHERE scope_id = 'global' AND key = ?1",
            params![key],
            |row| row.get::<_, String>(0),
        );

        match result {
            Ok(value) => Ok(Some(value)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    /// 读取 global scope 的配置值（公开方法，供其他模块复用）
    pub fn get_global_config_value(&self, key: &str) -> RepositoryResult<Option<String>> {
        self.get_config_value(key)
    }

    /// 写入 global scope 的配置值（upsert 语义）
    pub fn set_global_config_value(&self, key: &str, value: &str) -> RepositoryResult<()> {
        let conn = self
            .conn
            .lock()
            .map_err(|e| RepositoryError::LockError(e.to_string()))?;

        conn.execute(
            r#"
            INSERT INTO config_kv (scope_id, key, value, updated_at)
            VALUES ('global', ?1, ?2, datetime('now'))
            ON CONFLICT (scope_id, key) DO UPDATE SET
                value = excluded.value,
                updated_at = excluded.updated_at
            "#,
            params![key, value],
        )?;
        Ok(())
    }

    /// 读取数值配置（缺失取缺省值；解析失败报 ValidationError）
    fn get_f64_or(&self, key: &str, default: f64) -> RepositoryResult<f64> {
        match self.get_config_value(key)? {
            Some(raw) => raw.trim().parse::<f64>().map_err(|e| {
                RepositoryError::ValidationError(format!("配置 {} 值无效 '{}': {}", key, raw, e))
            }),
            None => Ok(default),
        }
    }

    /// 盘点差异审批阈值（百分比）
    pub fn inventory_approval_threshold_percent(&self) -> RepositoryResult<f64> {
        self.get_f64_or(
            KEY_INVENTORY_APPROVAL_THRESHOLD,
            DEFAULT_INVENTORY_APPROVAL_THRESHOLD,
        )
    }

    /// 面料余料判定阈值（平方米）
    pub fn fabric_scrap_area_sqm(&self) -> RepositoryResult<f64> {
        self.get_f64_or(KEY_FABRIC_SCRAP_AREA_SQM, DEFAULT_FABRIC_SCRAP_AREA_SQM)
    }

    /// 辅料余料判定阈值（件）
    pub fn fitting_scrap_qty(&self) -> RepositoryResult<f64> {
        self.get_f64_or(KEY_FITTING_SCRAP_QTY, DEFAULT_FITTING_SCRAP_QTY)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::configure_sqlite_connection;

    fn test_conn() -> Arc<Mutex<Connection>> {
        let conn = Connection::open_in_memory().unwrap();
        configure_sqlite_connection(&conn).unwrap();
        conn.execute_batch(
            r#"
            CREATE TABLE config_scope (
                scope_id TEXT PRIMARY KEY,
                scope_type TEXT NOT NULL,
                scope_key TEXT NOT NULL,
                created_at TEXT NOT NULL DEFAULT (datetime('now')),
                UNIQUE(scope_type, scope_key)
            );
            INSERT INTO config_scope (scope_id, scope_type, scope_key)
            VALUES ('global', 'GLOBAL', 'global');
            CREATE TABLE config_kv (
                scope_id TEXT NOT NULL REFERENCES config_scope(scope_id) ON DELETE CASCADE,
                key TEXT NOT NULL,
                value TEXT NOT NULL,
                updated_at TEXT NOT NULL DEFAULT (datetime('now')),
                PRIMARY KEY (scope_id, key)
            );
            "#,
        )
        .unwrap();
        Arc::new(Mutex::new(conn))
    }

    #[test]
    fn test_defaults_when_missing() {
        let config = ConfigManager::from_connection(test_conn()).unwrap();
        assert_eq!(
            config.inventory_approval_threshold_percent().unwrap(),
            DEFAULT_INVENTORY_APPROVAL_THRESHOLD
        );
        assert_eq!(
            config.fabric_scrap_area_sqm().unwrap(),
            DEFAULT_FABRIC_SCRAP_AREA_SQM
        );
    }

    #[test]
    fn test_override_and_invalid_value() {
        let config = ConfigManager::from_connection(test_conn()).unwrap();
        config
            .set_global_config_value(KEY_INVENTORY_APPROVAL_THRESHOLD, "15")
            .unwrap();
        assert_eq!(config.inventory_approval_threshold_percent().unwrap(), 15.0);

        config
            .set_global_config_value(KEY_INVENTORY_APPROVAL_THRESHOLD, "abc")
            .unwrap();
        assert!(matches!(
            config.inventory_approval_threshold_percent(),
            Err(RepositoryError::ValidationError(_))
        ));
    }
}
