// ==========================================
// 纺织家具生产经营系统 - 收料单仓储
// ==========================================
// 职责: receipt_documents / receipt_document_items 表的数据访问
// 说明: 单号按年度序列生成（RCP-<年>-<序号>）
// ==========================================

use crate::domain::receipt::{ReceiptDocument, ReceiptItem};
use crate::domain::types::MaterialKind;
use crate::repository::db_utils::{parse_code, parse_date, parse_utc};
use crate::repository::error::{RepositoryError, RepositoryResult};
use rusqlite::{params, Connection, OptionalExtension, Row};
use std::sync::{Arc, Mutex};

// ==========================================
// ReceiptRepository - 收料单仓储
// ==========================================
pub struct ReceiptRepository {
    conn: Arc<Mutex<Connection>>,
}

impl ReceiptRepository {
    /// 创建新的 ReceiptRepository 实例
    pub fn new(conn: Arc<Mutex<Connection>>) -> Self {
        Self { conn }
    }

    /// 获取数据库连接
    fn get_conn(&self) -> RepositoryResult<std::sync::MutexGuard<Connection>> {
        self.conn
            .lock()
            .map_err(|e| RepositoryError::LockError(e.to_string()))
    }

    fn map_header(row: &Row<'_>) -> rusqlite::Result<ReceiptDocument> {
        let date_raw: String = row.get(2)?;
        let created_raw: String = row.get(7)?;
        Ok(ReceiptDocument {
            id: row.get(0)?,
            document_number: row.get(1)?,
            document_date: parse_date(2, &date_raw)?,
            supplier: row.get(3)?,
            total_amount: row.get(4)?,
            is_processed: row.get(5)?,
            created_by: row.get(6)?,
            created_at: parse_utc(7, &created_raw)?,
            items: Vec::new(),
        })
    }

    fn map_item(row: &Row<'_>) -> rusqlite::Result<ReceiptItem> {
        let kind_raw: String = row.get(3)?;
        Ok(ReceiptItem {
            id: row.get(0)?,
            document_id: row.get(1)?,
            material_article: row.get(2)?,
            material_kind: parse_code(3, &kind_raw, "物料类别", MaterialKind::from_code)?,
            quantity: row.get(4)?,
            unit: row.get(5)?,
            price: row.get(6)?,
            amount: row.get(7)?,
        })
    }

    fn load_items(conn: &Connection, docs: &mut [ReceiptDocument]) -> RepositoryResult<()> {
        let mut stmt = conn.prepare(
            r#"
            SELECT id, document_id, material_article, material_kind, quantity, unit, price, amount
            FROM receipt_document_items
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
            FROM receipt_documents
            WHERE strftime('%Y', document_date) = ?1
            "#,
            params![year.to_string()],
            |row| row.get(0),
        )?;
        Ok(format!("RCP-{}-{:04}", year, seq))
    }

    /// 创建收料单（单据头 + 明细行，单事务）
    pub fn create(&self, doc: &ReceiptDocument) -> RepositoryResult<i64> {
        let conn = self.get_conn()?;
        let tx = conn.unchecked_transaction()?;

        tx.execute(
            r#"
            INSERT INTO receipt_documents (
                document_number, document_date, supplier, total_amount,
                is_processed, created_by, created_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
            "#,
            params![
                doc.document_number,
                doc.document_date.format("%Y-%m-%d").to_string(),
                doc.supplier,
                doc.total_amount,
                doc.is_processed,
                doc.created_by,
                doc.created_at.to_rfc3339(),
            ],
        )?;
        let document_id = tx.last_insert_rowid();

        for item in &doc.items {
            tx.execute(
                r#"
                INSERT INTO receipt_document_items (
                    document_id, material_article, material_kind, quantity, unit, price, amount
                ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
                "#,
                params![
                    document_id,
                    item.material_article,
                    item.material_kind.as_code(),
                    item.quantity,
                    item.unit,
                    item.price,
                    item.amount,
                ],
            )?;
        }

        tx.commit()?;
        Ok(document_id)
    }

    /// 按ID查询收料单（含明细行）
    pub fn find_by_id(&self, document_id: i64) -> RepositoryResult<Option<ReceiptDocument>> {
        let conn = self.get_conn()?;
        let header = conn
            .query_row(
                r#"
                SELECT id, document_number, document_date, supplier, total_amount,
                       is_processed, created_by, created_at
                FROM receipt_documents
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

    /// 查询收料单列表（含明细行），按单据日期降序
    pub fn list(&self) -> RepositoryResult<Vec<ReceiptDocument>> {
        let conn = self.get_conn()?;
        let mut docs = {
            let mut stmt = conn.prepare(
                r#"
                SELECT id, document_number, document_date, supplier, total_amount,
                       is_processed, created_by, created_at
                FROM receipt_documents
                ORDER BY document_date DESC, id DESC
                "#,
            )?;
            let rows = stmt.query_map([], Self::map_header)?;
            let mut collected = Vec::new();
            for row in rows {
                collected.push(row?);
            }
            collected
        };

        Self::load_items(&conn, &mut docs)?;
        Ok(docs)
    }

    /// 标记为已过账（供过账事务复用）
    pub(crate) fn mark_processed_with_conn(
        conn: &Connection,
        document_id: i64,
    ) -> RepositoryResult<()> {
        let updated = conn.execute(
            "UPDATE receipt_documents SET is_processed = 1 WHERE id = ?1",
            params![document_id],
        )?;
        if updated == 0 {
            return Err(RepositoryError::NotFound {
                entity: "ReceiptDocument".to_string(),
                id: document_id.to_string(),
            });
        }
        Ok(())
    }
}
