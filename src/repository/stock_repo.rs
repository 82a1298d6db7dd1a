// ==========================================
// 纺织家具生产经营系统 - 库存仓储
// ==========================================
// 职责: fabric_rolls / fitting_batches 表的数据访问
// 口径: 面料数量以"米"对外，内部以 mm 存卷长；辅料以"件"
// 红线: 批次冲减只能由单据过账事务调用（*_with_conn）
// ==========================================

use crate::domain::stock::{
    FabricRoll, FabricRollValuation, FittingBatch, FittingBatchValuation, StockQuantity,
};
use crate::domain::types::MaterialKind;
use crate::repository::db_utils::parse_utc;
use crate::repository::error::{RepositoryError, RepositoryResult};
use rusqlite::{params, Connection, Row};
use std::sync::{Arc, Mutex};

// ==========================================
// StockRepository - 库存仓储
// ==========================================
pub struct StockRepository {
    conn: Arc<Mutex<Connection>>,
}

impl StockRepository {
    /// 创建新的 StockRepository 实例
    pub fn new(conn: Arc<Mutex<Connection>>) -> Self {
        Self { conn }
    }

    /// 获取数据库连接
    fn get_conn(&self) -> RepositoryResult<std::sync::MutexGuard<Connection>> {
        self.conn
            .lock()
            .map_err(|e| RepositoryError::LockError(e.to_string()))
    }

    // ==========================================
    // 批次写入
    // ==========================================

    /// 插入面料卷（供过账事务复用）
    pub(crate) fn insert_fabric_roll_with_conn(
        conn: &Connection,
        roll: &FabricRoll,
    ) -> RepositoryResult<()> {
        conn.execute(
            r#"
            INSERT INTO fabric_rolls (roll_id, fabric_article, length_mm, width_mm, received_at)
            VALUES (?1, ?2, ?3, ?4, ?5)
            "#,
            params![
                roll.roll_id,
                roll.fabric_article,
                roll.length_mm,
                roll.width_mm,
                roll.received_at.to_rfc3339(),
            ],
        )?;
        Ok(())
    }

    /// 插入面料卷
    pub fn insert_fabric_roll(&self, roll: &FabricRoll) -> RepositoryResult<()> {
        let conn = self.get_conn()?;
        Self::insert_fabric_roll_with_conn(&conn, roll)
    }

    /// 插入辅料批次（供过账事务复用）
    pub(crate) fn insert_fitting_batch_with_conn(
        conn: &Connection,
        batch: &FittingBatch,
    ) -> RepositoryResult<()> {
        conn.execute(
            r#"
            INSERT INTO fitting_batches (batch_id, fitting_article, quantity, received_at)
            VALUES (?1, ?2, ?3, ?4)
            "#,
            params![
                batch.batch_id,
                batch.fitting_article,
                batch.quantity,
                batch.received_at.to_rfc3339(),
            ],
        )?;
        Ok(())
    }

    /// 插入辅料批次
    pub fn insert_fitting_batch(&self, batch: &FittingBatch) -> RepositoryResult<()> {
        let conn = self.get_conn()?;
        Self::insert_fitting_batch_with_conn(&conn, batch)
    }

    // ==========================================
    // 批次查询
    // ==========================================

    fn map_fabric_roll(row: &Row<'_>) -> rusqlite::Result<FabricRoll> {
        let received_raw: String = row.get(4)?;
        Ok(FabricRoll {
            roll_id: row.get(0)?,
            fabric_article: row.get(1)?,
            length_mm: row.get(2)?,
            width_mm: row.get(3)?,
            received_at: parse_utc(4, &received_raw)?,
        })
    }

    fn map_fitting_batch(row: &Row<'_>) -> rusqlite::Result<FittingBatch> {
        let received_raw: String = row.get(3)?;
        Ok(FittingBatch {
            batch_id: row.get(0)?,
            fitting_article: row.get(1)?,
            quantity: row.get(2)?,
            received_at: parse_utc(3, &received_raw)?,
        })
    }

    /// 查询某货号的全部面料卷（按入库先后）
    pub fn list_fabric_rolls_by_article(&self, article: &str) -> RepositoryResult<Vec<FabricRoll>> {
        let conn = self.get_conn()?;
        let mut stmt = conn.prepare(
            r#"
            SELECT roll_id, fabric_article, length_mm, width_mm, received_at
            FROM fabric_rolls
            WHERE fabric_article = ?1
            ORDER BY received_at, roll_id
            "#,
        )?;
        let rows = stmt.query_map(params![article], Self::map_fabric_roll)?;

        let mut result = Vec::new();
        for row in rows {
            result.push(row?);
        }
        Ok(result)
    }

    /// 查询某货号的全部辅料批次（按入库先后）
    pub fn list_fitting_batches_by_article(
        &self,
        article: &str,
    ) -> RepositoryResult<Vec<FittingBatch>> {
        let conn = self.get_conn()?;
        let mut stmt = conn.prepare(
            r#"
            SELECT batch_id, fitting_article, quantity, received_at
            FROM fitting_batches
            WHERE fitting_article = ?1
            ORDER BY received_at, batch_id
            "#,
        )?;
        let rows = stmt.query_map(params![article], Self::map_fitting_batch)?;

        let mut result = Vec::new();
        for row in rows {
            result.push(row?);
        }
        Ok(result)
    }

    // ==========================================
    // 估值列表（物料台账页面）
    // ==========================================

    /// 面料卷估值列表（长度米/面积平米/金额按 2 位小数四舍五入）
    pub fn list_fabric_roll_valuations(&self) -> RepositoryResult<Vec<FabricRollValuation>> {
        let conn = self.get_conn()?;
        let mut stmt = conn.prepare(
            r#"
            SELECT
                fs.roll_id,
                fs.fabric_article,
                COALESCE(fn.name, '') AS fabric_name,
                fs.length_mm,
                fs.width_mm,
                COALESCE(f.unit, 'm') AS unit,
                COALESCE(f.price, 0) AS price,
                ROUND(fs.length_mm * fs.width_mm / 1000000.0, 2) AS area_sqm,
                ROUND(fs.length_mm / 1000.0, 2) AS length_m,
                ROUND(COALESCE(f.price, 0) * fs.length_mm / 1000.0, 2) AS total_cost
            FROM fabric_rolls fs
            LEFT JOIN fabrics f ON fs.fabric_article = f.article
            LEFT JOIN lookup_fabric_name fn ON f.name_code = fn.id
            ORDER BY fs.fabric_article, fs.roll_id
            "#,
        )?;
        let rows = stmt.query_map([], |row| {
            Ok(FabricRollValuation {
                roll_id: row.get(0)?,
                fabric_article: row.get(1)?,
                fabric_name: row.get(2)?,
                length_mm: row.get(3)?,
                width_mm: row.get(4)?,
                unit: row.get(5)?,
                price: row.get(6)?,
                area_sqm: row.get(7)?,
                length_m: row.get(8)?,
                total_cost: row.get(9)?,
            })
        })?;

        let mut result = Vec::new();
        for row in rows {
            result.push(row?);
        }
        Ok(result)
    }

    /// 辅料批次估值列表（总重/金额按 2 位小数四舍五入）
    pub fn list_fitting_batch_valuations(&self) -> RepositoryResult<Vec<FittingBatchValuation>> {
        let conn = self.get_conn()?;
        let mut stmt = conn.prepare(
            r#"
            SELECT
                fs.batch_id,
                fs.fitting_article,
                COALESCE(f.name, '') AS fitting_name,
                fs.quantity,
                COALESCE(f.price, 0) AS price,
                COALESCE(f.weight_value, 0) AS weight_value,
                COALESCE(f.weight_unit, 'g') AS weight_unit,
                ROUND(fs.quantity * COALESCE(f.weight_value, 0), 2) AS total_weight,
                ROUND(COALESCE(f.price, 0) * fs.quantity, 2) AS total_cost
            FROM fitting_batches fs
            LEFT JOIN fittings f ON fs.fitting_article = f.article
            ORDER BY fs.fitting_article, fs.batch_id
            "#,
        )?;
        let rows = stmt.query_map([], |row| {
            Ok(FittingBatchValuation {
                batch_id: row.get(0)?,
                fitting_article: row.get(1)?,
                fitting_name: row.get(2)?,
                quantity: row.get(3)?,
                price: row.get(4)?,
                weight_value: row.get(5)?,
                weight_unit: row.get(6)?,
                total_weight: row.get(7)?,
                total_cost: row.get(8)?,
            })
        })?;

        let mut result = Vec::new();
        for row in rows {
            result.push(row?);
        }
        Ok(result)
    }

    // ==========================================
    // 货号级聚合
    // ==========================================

    /// 全部面料货号的账面数量（米）
    pub fn fabric_quantities(&self) -> RepositoryResult<Vec<StockQuantity>> {
        let conn = self.get_conn()?;
        let mut stmt = conn.prepare(
            r#"
            SELECT fabric_article, SUM(length_mm) / 1000.0 AS quantity
            FROM fabric_rolls
            GROUP BY fabric_article
            ORDER BY fabric_article
            "#,
        )?;
        let rows = stmt.query_map([], |row| {
            Ok(StockQuantity {
                article: row.get(0)?,
                quantity: row.get(1)?,
            })
        })?;

        let mut result = Vec::new();
        for row in rows {
            result.push(row?);
        }
        Ok(result)
    }

    /// 全部辅料货号的账面数量（件）
    pub fn fitting_quantities(&self) -> RepositoryResult<Vec<StockQuantity>> {
        let conn = self.get_conn()?;
        let mut stmt = conn.prepare(
            r#"
            SELECT fitting_article, SUM(quantity) AS quantity
            FROM fitting_batches
            GROUP BY fitting_article
            ORDER BY fitting_article
            "#,
        )?;
        let rows = stmt.query_map([], |row| {
            Ok(StockQuantity {
                article: row.get(0)?,
                quantity: row.get(1)?,
            })
        })?;

        let mut result = Vec::new();
        for row in rows {
            result.push(row?);
        }
        Ok(result)
    }

    /// 单货号面料账面数量（米，供过账事务复用）
    pub(crate) fn fabric_quantity_with_conn(
        conn: &Connection,
        article: &str,
    ) -> RepositoryResult<f64> {
        let qty: f64 = conn.query_row(
            "SELECT COALESCE(SUM(length_mm), 0) / 1000.0 FROM fabric_rolls WHERE fabric_article = ?1",
            params![article],
            |row| row.get(0),
        )?;
        Ok(qty)
    }

    /// 单货号辅料账面数量（件，供过账事务复用）
    pub(crate) fn fitting_quantity_with_conn(
        conn: &Connection,
        article: &str,
    ) -> RepositoryResult<f64> {
        let qty: f64 = conn.query_row(
            "SELECT COALESCE(SUM(quantity), 0) FROM fitting_batches WHERE fitting_article = ?1",
            params![article],
            |row| row.get(0),
        )?;
        Ok(qty)
    }

    /// 单货号账面数量
    pub fn quantity(&self, article: &str, kind: MaterialKind) -> RepositoryResult<f64> {
        let conn = self.get_conn()?;
        match kind {
            MaterialKind::Fabric => Self::fabric_quantity_with_conn(&conn, article),
            MaterialKind::Fitting => Self::fitting_quantity_with_conn(&conn, article),
        }
    }

    /// 加权平均成本（Σ 数量×单价 / Σ 数量，空库存返回 0）
    pub fn average_cost(&self, article: &str, kind: MaterialKind) -> RepositoryResult<f64> {
        let conn = self.get_conn()?;
        let sql = match kind {
            MaterialKind::Fabric => {
                r#"
                SELECT COALESCE(
                    SUM(fs.length_mm * f.price / 1000.0) / NULLIF(SUM(fs.length_mm / 1000.0), 0),
                    0
                )
                FROM fabric_rolls fs
                LEFT JOIN fabrics f ON fs.fabric_article = f.article
                WHERE fs.fabric_article = ?1
                "#
            }
            MaterialKind::Fitting => {
                r#"
                SELECT COALESCE(
                    SUM(fs.quantity * f.price) / NULLIF(SUM(fs.quantity), 0),
                    0
                )
                FROM fitting_batches fs
                LEFT JOIN fittings f ON fs.fitting_article = f.article
                WHERE fs.fitting_article = ?1
                "#
            }
        };
        let cost: f64 = conn.query_row(sql, params![article], |row| row.get(0))?;
        Ok(cost)
    }

    // ==========================================
    // 盘点冲减（先入先出）
    // ==========================================

    /// 盘亏冲减面料（米）；按入库先后消耗卷，耗尽的卷删除
    ///
    /// # 返回
    /// - `Ok(f64)`: 实际冲减的米数（不超过账面量）
    pub(crate) fn consume_fabric_with_conn(
        conn: &Connection,
        article: &str,
        quantity_m: f64,
    ) -> RepositoryResult<f64> {
        let mut need_mm = (quantity_m * 1000.0).round() as i64;
        if need_mm <= 0 {
            return Ok(0.0);
        }

        let rolls: Vec<(String, i64)> = {
            let mut stmt = conn.prepare(
                r#"
                SELECT roll_id, length_mm
                FROM fabric_rolls
                WHERE fabric_article = ?1
                ORDER BY received_at, roll_id
                "#,
            )?;
            let rows = stmt.query_map(params![article], |row| Ok((row.get(0)?, row.get(1)?)))?;
            let mut collected = Vec::new();
            for row in rows {
                collected.push(row?);
            }
            collected
        };

        let mut consumed_mm: i64 = 0;
        for (roll_id, length_mm) in rolls {
            if need_mm == 0 {
                break;
            }
            let take = length_mm.min(need_mm);
            if take == length_mm {
                conn.execute("DELETE FROM fabric_rolls WHERE roll_id = ?1", params![roll_id])?;
            } else {
                conn.execute(
                    "UPDATE fabric_rolls SET length_mm = length_mm - ?1 WHERE roll_id = ?2",
                    params![take, roll_id],
                )?;
            }
            consumed_mm += take;
            need_mm -= take;
        }

        Ok(consumed_mm as f64 / 1000.0)
    }

    /// 盘亏冲减辅料（件）；按入库先后消耗批次，耗尽的批次删除
    pub(crate) fn consume_fitting_with_conn(
        conn: &Connection,
        article: &str,
        quantity: f64,
    ) -> RepositoryResult<f64> {
        let mut need = quantity;
        if need <= 0.0 {
            return Ok(0.0);
        }

        let batches: Vec<(String, f64)> = {
            let mut stmt = conn.prepare(
                r#"
                SELECT batch_id, quantity
                FROM fitting_batches
                WHERE fitting_article = ?1
                ORDER BY received_at, batch_id
                "#,
            )?;
            let rows = stmt.query_map(params![article], |row| Ok((row.get(0)?, row.get(1)?)))?;
            let mut collected = Vec::new();
            for row in rows {
                collected.push(row?);
            }
            collected
        };

        let mut consumed = 0.0;
        for (batch_id, batch_qty) in batches {
            if need <= 0.0 {
                break;
            }
            let take = batch_qty.min(need);
            if (batch_qty - take).abs() < 1e-9 {
                conn.execute(
                    "DELETE FROM fitting_batches WHERE batch_id = ?1",
                    params![batch_id],
                )?;
            } else {
                conn.execute(
                    "UPDATE fitting_batches SET quantity = quantity - ?1 WHERE batch_id = ?2",
                    params![take, batch_id],
                )?;
            }
            consumed += take;
            need -= take;
        }

        Ok(consumed)
    }
}
