// ==========================================
// 纺织家具生产经营系统 - 物料流水仓储
// ==========================================
// 职责: material_movements 表的数据访问
// 红线: 只追加；写入必须发生在单据过账事务内
// ==========================================

use crate::domain::movement::MaterialMovement;
use crate::domain::types::{MaterialKind, MovementDirection, MovementDocumentType};
use crate::repository::db_utils::{parse_code, parse_date};
use crate::repository::error::{RepositoryError, RepositoryResult};
use chrono::NaiveDate;
use rusqlite::{params, Connection, Row};
use std::sync::{Arc, Mutex};

// ==========================================
// MovementRepository - 物料流水仓储
// ==========================================
pub struct MovementRepository {
    conn: Arc<Mutex<Connection>>,
}

impl MovementRepository {
    /// 创建新的 MovementRepository 实例
    pub fn new(conn: Arc<Mutex<Connection>>) -> Self {
        Self { conn }
    }

    /// 获取数据库连接
    fn get_conn(&self) -> RepositoryResult<std::sync::MutexGuard<Connection>> {
        self.conn
            .lock()
            .map_err(|e| RepositoryError::LockError(e.to_string()))
    }

    fn map_movement(row: &Row<'_>) -> rusqlite::Result<MaterialMovement> {
        let kind_raw: String = row.get(2)?;
        let doc_type_raw: String = row.get(3)?;
        let date_raw: String = row.get(5)?;
        let direction_raw: String = row.get(10)?;
        Ok(MaterialMovement {
            id: row.get(0)?,
            material_article: row.get(1)?,
            material_kind: parse_code(2, &kind_raw, "物料类别", MaterialKind::from_code)?,
            document_type: parse_code(3, &doc_type_raw, "单据类型", MovementDocumentType::from_code)?,
            document_id: row.get(4)?,
            movement_date: parse_date(5, &date_raw)?,
            quantity: row.get(6)?,
            unit: row.get(7)?,
            price: row.get(8)?,
            amount: row.get(9)?,
            direction: parse_code(10, &direction_raw, "流水方向", MovementDirection::from_code)?,
        })
    }

    /// 追加流水（供过账事务复用）
    pub(crate) fn insert_with_conn(
        conn: &Connection,
        movement: &MaterialMovement,
    ) -> RepositoryResult<i64> {
        conn.execute(
            r#"
            INSERT INTO material_movements (
                material_article, material_kind, document_type, document_id,
                movement_date, quantity, unit, price, amount, direction
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)
            "#,
            params![
                movement.material_article,
                movement.material_kind.as_code(),
                movement.document_type.as_code(),
                movement.document_id,
                movement.movement_date.format("%Y-%m-%d").to_string(),
                movement.quantity,
                movement.unit,
                movement.price,
                movement.amount,
                movement.direction.as_code(),
            ],
        )?;
        Ok(conn.last_insert_rowid())
    }

    /// 按货号查询流水（按业务日期升序）
    pub fn list_by_article(&self, article: &str) -> RepositoryResult<Vec<MaterialMovement>> {
        let conn = self.get_conn()?;
        let mut stmt = conn.prepare(
            r#"
            SELECT id, material_article, material_kind, document_type, document_id,
                   movement_date, quantity, unit, price, amount, direction
            FROM material_movements
            WHERE material_article = ?1
            ORDER BY movement_date, id
            "#,
        )?;
        let rows = stmt.query_map(params![article], Self::map_movement)?;

        let mut result = Vec::new();
        for row in rows {
            result.push(row?);
        }
        Ok(result)
    }

    /// 查询某日期（不含）之前的全部流水
    pub fn list_before(&self, date: NaiveDate) -> RepositoryResult<Vec<MaterialMovement>> {
        let conn = self.get_conn()?;
        let mut stmt = conn.prepare(
            r#"
            SELECT id, material_article, material_kind, document_type, document_id,
                   movement_date, quantity, unit, price, amount, direction
            FROM material_movements
            WHERE movement_date < ?1
            ORDER BY movement_date, id
            "#,
        )?;
        let rows = stmt.query_map(
            params![date.format("%Y-%m-%d").to_string()],
            Self::map_movement,
        )?;

        let mut result = Vec::new();
        for row in rows {
            result.push(row?);
        }
        Ok(result)
    }

    /// 查询日期闭区间内的全部流水
    pub fn list_for_period(
        &self,
        from: NaiveDate,
        to: NaiveDate,
    ) -> RepositoryResult<Vec<MaterialMovement>> {
        let conn = self.get_conn()?;
        let mut stmt = conn.prepare(
            r#"
            SELECT id, material_article, material_kind, document_type, document_id,
                   movement_date, quantity, unit, price, amount, direction
            FROM material_movements
            WHERE movement_date >= ?1 AND movement_date <= ?2
            ORDER BY movement_date, id
            "#,
        )?;
        let rows = stmt.query_map(
            params![
                from.format("%Y-%m-%d").to_string(),
                to.format("%Y-%m-%d").to_string()
            ],
            Self::map_movement,
        )?;

        let mut result = Vec::new();
        for row in rows {
            result.push(row?);
        }
        Ok(result)
    }
}
