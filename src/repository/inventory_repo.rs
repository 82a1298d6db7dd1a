// ==========================================
// 纺织家具生产经营系统 - 盘点单仓储
// ==========================================
// 职责: inventory_documents / inventory_document_items 表的数据访问
// 红线: 审批/过账只改标志与戳记，库存效果由 API 层过账事务编排
// ==========================================

use crate::domain::inventory::{InventoryDocument, InventoryItem};
use crate::domain::types::MaterialKind;
use crate::repository::db_utils::{parse_code, parse_date, parse_utc};
use crate::repository::error::{RepositoryError, RepositoryResult};
use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, OptionalExtension, Row};
use std::sync::{Arc, Mutex};

// ==========================================
// InventoryRepository - 盘点单仓储
// ==========================================
pub struct InventoryRepository {
    conn: Arc<Mutex<Connection>>,
}

impl InventoryRepository {
    /// 创建新的 InventoryRepository 实例
    pub fn new(conn: Arc<Mutex<Connection>>) -> Self {
        Self { conn }
    }

    /// 获取数据库连接
    fn get_conn(&self) -> RepositoryResult<std::sync::MutexGuard<Connection>> {
        self.conn
            .lock()
            .map_err(|e| RepositoryError::LockError(e.to_string()))
    }

    fn map_header(row: &Row<'_>) -> rusqlite::Result<InventoryDocument> {
        let date_raw: String = row.get(2)?;
        let approved_at_raw: Option<String> = row.get(10)?;
        let created_raw: String = row.get(13)?;
        Ok(InventoryDocument {
            id: row.get(0)?,
            document_number: row.get(1)?,
            document_date: parse_date(2, &date_raw)?,
            warehouse_keeper: row.get(3)?,
            total_accounting_amount: row.get(4)?,
            total_actual_amount: row.get(5)?,
            difference_amount: row.get(6)?,
            difference_percent: row.get(7)?,
            is_approved: row.get(8)?,
            approved_by: row.get(9)?,
            approved_at: match approved_at_raw {
                Some(raw) => Some(parse_utc(10, &raw)?),
                None => None,
            },
            is_processed: row.get(11)?,
            created_by: row.get(12)?,
            created_at: parse_utc(13, &created_raw)?,
            items: Vec::new(),
        })
    }

    fn map_item(row: &Row<'_>) -> rusqlite::Result<InventoryItem> {
        let kind_raw: String = row.get(4)?;
        Ok(InventoryItem {
            id: row.get(0)?,
            document_id: row.get(1)?,
            material_article: row.get(2)?,
            material_name: row.get(3)?,
            material_kind: parse_code(4, &kind_raw, "物料类别", MaterialKind::from_code)?,
            accounting_quantity: row.get(5)?,
            actual_quantity: row.get(6)?,
            difference_quantity: row.get(7)?,
            unit: row.get(8)?,
            price: row.get(9)?,
            accounting_amount: row.get(10)?,
            actual_amount: row.get(11)?,
            difference_amount: row.get(12)?,
        })
    }

    fn load_items(conn: &Connection, docs: &mut [InventoryDocument]) -> RepositoryResult<()> {
        let mut stmt = conn.prepare(
            r#"
            SELECT id, document_id, material_article, material_name, material_kind,
                   accounting_quantity, actual_quantity, difference_quantity, unit, price,
                   accounting_amount, actual_amount, difference_amount
            FROM inventory_document_items
            WHERE document_id = ?1
            ORDER BY id
            "#,
        )?;
        for doc in docs.iter_mut() {
            let rows = stmt.query_map(params![doc.id], Self::map_item)?;
            for row in rows {
                doc.items.push(row?);
            }
        }
        Ok(())
    }

    /// 生成下一个单号（年度内序列）
    pub fn next_document_number(&self, year: i32) -> RepositoryResult<String> {
        let conn = self.get_conn()?;
        let seq: i64 = conn.query_row(
            r#"
            SELECT COUNT(*) + 1
            FROM inventory_documents
            WHERE strftime('%Y', document_date) = ?1
            "#,
            params![year.to_string()],
            |row| row.get(0),
        )?;
        Ok(format!("INV-{}-{:04}", year, seq))
    }

    /// 创建盘点单（供过账事务复用：单据头 + 明细行）
    pub(crate) fn create_with_conn(
        conn: &Connection,
        doc: &InventoryDocument,
    ) -> RepositoryResult<i64> {
        conn.execute(
            r#"
            INSERT INTO inventory_documents (
                document_number, document_date, warehouse_keeper,
                total_accounting_amount, total_actual_amount, difference_amount, difference_percent,
                is_approved, approved_by, approved_at, is_processed, created_by, created_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13)
            "#,
            params![
                doc.document_number,
                doc.document_date.format("%Y-%m-%d").to_string(),
                doc.warehouse_keeper,
                doc.total_accounting_amount,
                doc.total_actual_amount,
                doc.difference_amount,
                doc.difference_percent,
                doc.is_approved,
                doc.approved_by,
                doc.approved_at.map(|dt| dt.to_rfc3339()),
                doc.is_processed,
                doc.created_by,
                doc.created_at.to_rfc3339(),
            ],
        )?;
        let document_id = conn.last_insert_rowid();

        for item in &doc.items {
            conn.execute(
                r#"
                INSERT INTO inventory_document_items (
                    document_id, material_article, material_name, material_kind,
                    accounting_quantity, actual_quantity, difference_quantity, unit, price,
                    accounting_amount, actual_amount, difference_amount
                ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12)
                "#,
                params![
                    document_id,
                    item.material_article,
                    item.material_name,
                    item.material_kind.as_code(),
                    item.accounting_quantity,
                    item.actual_quantity,
                    item.difference_quantity,
                    item.unit,
                    item.price,
                    item.accounting_amount,
                    item.actual_amount,
                    item.difference_amount,
                ],
            )?;
        }

        Ok(document_id)
    }

    /// 创建盘点单（单事务）
    pub fn create(&self, doc: &InventoryDocument) -> RepositoryResult<i64> {
        let conn = self.get_conn()?;
        let tx = conn.unchecked_transaction()?;
        let document_id = Self::create_with_conn(&tx, doc)?;
        tx.commit()?;
        Ok(document_id)
    }

    /// 按ID查询盘点单（含明细行）
    pub fn find_by_id(&self, document_id: i64) -> RepositoryResult<Option<InventoryDocument>> {
        let conn = self.get_conn()?;
        let header = conn
            .query_row(
                r#"
                SELECT id, document_number, document_date, warehouse_keeper,
                       total_accounting_amount, total_actual_amount, difference_amount,
                       difference_percent, is_approved, approved_by, approved_at,
                       is_processed, created_by, created_at
                FROM inventory_documents
                WHERE id = ?1
                "#,
                params![document_id],
                Self::map_header,
            )
            .optional()?;

        match header {
            Some(doc) => {
                let mut docs = [doc];
                Self::load_items(&conn, &mut docs)?;
                let [doc] = docs;
                Ok(Some(doc))
            }
            None => Ok(None),
        }
    }

    /// 查询盘点单列表（仅单据头），按盘点日期降序
    pub fn list(&self) -> RepositoryResult<Vec<InventoryDocument>> {
        let conn = self.get_conn()?;
        let mut stmt = conn.prepare(
            r#"
            SELECT id, document_number, document_date, warehouse_keeper,
                   total_accounting_amount, total_actual_amount, difference_amount,
                   difference_percent, is_approved, approved_by, approved_at,
                   is_processed, created_by, created_at
            FROM inventory_documents
            ORDER BY document_date DESC, id DESC
            "#,
        )?;
        let rows = stmt.query_map([], Self::map_header)?;

        let mut result = Vec::new();
        for row in rows {
            result.push(row?);
        }
        Ok(result)
    }

    /// 总监审批盘点单（戳记审批人与时间）
    pub fn approve(
        &self,
        document_id: i64,
        approved_by: &str,
        approved_at: DateTime<Utc>,
    ) -> RepositoryResult<()> {
        let conn = self.get_conn()?;
        let updated = conn.execute(
            r#"
            UPDATE inventory_documents
            SET is_approved = 1, approved_by = ?1, approved_at = ?2
            WHERE id = ?3
            "#,
            params![approved_by, approved_at.to_rfc3339(), document_id],
        )?;
        if updated == 0 {
            return Err(RepositoryError::NotFound {
                entity: "InventoryDocument".to_string(),
                id: document_id.to_string(),
            });
        }
        Ok(())
    }

    /// 标记为已过账（供过账事务复用）
    pub(crate) fn mark_processed_with_conn(
        conn: &Connection,
        document_id: i64,
    ) -> RepositoryResult<()> {
        let updated = conn.execute(
            "UPDATE inventory_documents SET is_processed = 1 WHERE id = ?1",
            params![document_id],
        )?;
        if updated == 0 {
            return Err(RepositoryError::NotFound {
                entity: "InventoryDocument".to_string(),
                id: document_id.to_string(),
            });
        }
        Ok(())
    }
}
