// ==========================================
// 纺织家具生产经营系统 - 目录仓储
// ==========================================
// 职责: fabrics / fittings / manufactured_goods 及查找表的数据访问
// 说明: 列表/详情查询做 LEFT JOIN 解析查找表名称
// ==========================================

use crate::domain::catalog::{Fabric, FabricDetails, Fitting, FittingDetails, ManufacturedGood};
use crate::repository::error::{RepositoryError, RepositoryResult};
use rusqlite::{params, Connection, OptionalExtension, Row};
use std::sync::{Arc, Mutex};

// ==========================================
// CatalogRepository - 目录仓储
// ==========================================
pub struct CatalogRepository {
    conn: Arc<Mutex<Connection>>,
}

const FABRIC_SELECT: &str = r#"
    SELECT f.article, f.name_code, f.color_code, f.pattern_code, f.composition_code,
           f.width_mm, f.unit, f.price, f.image_path,
           COALESCE(fn.name, '') AS name,
           fc.name AS color_name,
           fp.name AS pattern_name,
           fm.name AS composition_name
    FROM fabrics f
    LEFT JOIN lookup_fabric_name fn ON f.name_code = fn.id
    LEFT JOIN lookup_fabric_color fc ON f.color_code = fc.id
    LEFT JOIN lookup_fabric_pattern fp ON f.pattern_code = fp.id
    LEFT JOIN lookup_fabric_composition fm ON f.composition_code = fm.id
"#;

const FITTING_SELECT: &str = r#"
    SELECT f.article, f.name, f.type_code, f.width_mm, f.length_mm, f.dimension_unit,
           f.weight_value, f.weight_unit, f.price, f.image_path,
           ft.name AS type_name
    FROM fittings f
    LEFT JOIN lookup_fitting_type ft ON f.type_code = ft.id
"#;

impl CatalogRepository {
    /// 创建新的 CatalogRepository 实例
    pub fn new(conn: Arc<Mutex<Connection>>) -> Self {
        Self { conn }
    }

    /// 获取数据库连接
    fn get_conn(&self) -> RepositoryResult<std::sync::MutexGuard<Connection>> {
        self.conn
            .lock()
            .map_err(|e| RepositoryError::LockError(e.to_string()))
    }

    fn map_fabric(row: &Row<'_>) -> rusqlite::Result<FabricDetails> {
        Ok(FabricDetails {
            fabric: Fabric {
                article: row.get(0)?,
                name_code: row.get(1)?,
                color_code: row.get(2)?,
                pattern_code: row.get(3)?,
                composition_code: row.get(4)?,
                width_mm: row.get(5)?,
                unit: row.get(6)?,
                price: row.get(7)?,
                image_path: row.get(8)?,
            },
            name: row.get(9)?,
            color_name: row.get(10)?,
            pattern_name: row.get(11)?,
            composition_name: row.get(12)?,
        })
    }

    fn map_fitting(row: &Row<'_>) -> rusqlite::Result<FittingDetails> {
        Ok(FittingDetails {
            fitting: Fitting {
                article: row.get(0)?,
                name: row.get(1)?,
                type_code: row.get(2)?,
                width_mm: row.get(3)?,
                length_mm: row.get(4)?,
                dimension_unit: row.get(5)?,
                weight_value: row.get(6)?,
                weight_unit: row.get(7)?,
                price: row.get(8)?,
                image_path: row.get(9)?,
            },
            type_name: row.get(10)?,
        })
    }

    fn map_good(row: &Row<'_>) -> rusqlite::Result<ManufacturedGood> {
        Ok(ManufacturedGood {
            article: row.get(0)?,
            name: row.get(1)?,
            width_mm: row.get(2)?,
            length_mm: row.get(3)?,
            unit: row.get(4)?,
            price: row.get(5)?,
            image_path: row.get(6)?,
            comment: row.get(7)?,
        })
    }

    // ==========================================
    // 面料
    // ==========================================

    /// 查询面料列表（含查找表名称），按货号排序
    pub fn list_fabrics(&self) -> RepositoryResult<Vec<FabricDetails>> {
        let conn = self.get_conn()?;
        let sql = format!("{} ORDER BY f.article", FABRIC_SELECT);
        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt.query_map([], Self::map_fabric)?;

        let mut result = Vec::new();
        for row in rows {
            result.push(row?);
        }
        Ok(result)
    }

    /// 按货号查询面料
    pub fn find_fabric(&self, article: &str) -> RepositoryResult<Option<FabricDetails>> {
        let conn = self.get_conn()?;
        let sql = format!("{} WHERE f.article = ?1", FABRIC_SELECT);
        let result = conn
            .query_row(&sql, params![article], Self::map_fabric)
            .optional()?;
        Ok(result)
    }

    /// 插入/更新面料（INSERT OR REPLACE 实现 upsert 语义）
    pub fn upsert_fabric(&self, fabric: &Fabric) -> RepositoryResult<()> {
        let conn = self.get_conn()?;
        conn.execute(
            r#"
            INSERT OR REPLACE INTO fabrics (
                article, name_code, color_code, pattern_code, composition_code,
                width_mm, unit, price, image_path
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)
            "#,
            params![
                fabric.article,
                fabric.name_code,
                fabric.color_code,
                fabric.pattern_code,
                fabric.composition_code,
                fabric.width_mm,
                fabric.unit,
                fabric.price,
                fabric.image_path,
            ],
        )?;
        Ok(())
    }

    // ==========================================
    // 辅料
    // ==========================================

    /// 查询辅料列表（含类型名称），按货号排序
    pub fn list_fittings(&self) -> RepositoryResult<Vec<FittingDetails>> {
        let conn = self.get_conn()?;
        let sql = format!("{} ORDER BY f.article", FITTING_SELECT);
        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt.query_map([], Self::map_fitting)?;

        let mut result = Vec::new();
        for row in rows {
            result.push(row?);
        }
        Ok(result)
    }

    /// 按货号查询辅料
    pub fn find_fitting(&self, article: &str) -> RepositoryResult<Option<FittingDetails>> {
        let conn = self.get_conn()?;
        let sql = format!("{} WHERE f.article = ?1", FITTING_SELECT);
        let result = conn
            .query_row(&sql, params![article], Self::map_fitting)
            .optional()?;
        Ok(result)
    }

    /// 插入/更新辅料
    pub fn upsert_fitting(&self, fitting: &Fitting) -> RepositoryResult<()> {
        let conn = self.get_conn()?;
        conn.execute(
            r#"
            INSERT OR REPLACE INTO fittings (
                article, name, type_code, width_mm, length_mm, dimension_unit,
                weight_value, weight_unit, price, image_path
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)
            "#,
            params![
                fitting.article,
                fitting.name,
                fitting.type_code,
                fitting.width_mm,
                fitting.length_mm,
                fitting.dimension_unit,
                fitting.weight_value,
                fitting.weight_unit,
                fitting.price,
                fitting.image_path,
            ],
        )?;
        Ok(())
    }

    // ==========================================
    // 成品
    // ==========================================

    /// 查询成品列表，按货号排序
    pub fn list_goods(&self) -> RepositoryResult<Vec<ManufacturedGood>> {
        let conn = self.get_conn()?;
        let mut stmt = conn.prepare(
            r#"
            SELECT article, name, width_mm, length_mm, unit, price, image_path, comment
            FROM manufactured_goods
            ORDER BY article
            "#,
        )?;
        let rows = stmt.query_map([], Self::map_good)?;

        let mut result = Vec::new();
        for row in rows {
            result.push(row?);
        }
        Ok(result)
    }

    /// 按货号查询成品
    pub fn find_good(&self, article: &str) -> RepositoryResult<Option<ManufacturedGood>> {
        let conn = self.get_conn()?;
        let result = conn
            .query_row(
                r#"
                SELECT article, name, width_mm, length_mm, unit, price, image_path, comment
                FROM manufactured_goods
                WHERE article = ?1
                "#,
                params![article],
                Self::map_good,
            )
            .optional()?;
        Ok(result)
    }

    /// 插入/更新成品
    pub fn upsert_good(&self, good: &ManufacturedGood) -> RepositoryResult<()> {
        let conn = self.get_conn()?;
        conn.execute(
            r#"
            INSERT OR REPLACE INTO manufactured_goods (
                article, name, width_mm, length_mm, unit, price, image_path, comment
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
            "#,
            params![
                good.article,
                good.name,
                good.width_mm,
                good.length_mm,
                good.unit,
                good.price,
                good.image_path,
                good.comment,
            ],
        )?;
        Ok(())
    }
}
