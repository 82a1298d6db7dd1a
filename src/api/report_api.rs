// ==========================================
// 纺织家具生产经营系统 - 报表 API
// ==========================================
// 职责: 物料库存报表、物料收发存报表（数据行；排版在前端）
// 口径: 报表算术在取数后内存完成（期初 + 收入 - 发出 = 期末）
// ==========================================

use std::collections::HashMap;
use std::sync::Arc;

use chrono::NaiveDate;
use tracing::warn;

use crate::api::access::ensure_role;
use crate::api::error::{ApiError, ApiResult};
use crate::domain::report::{MaterialMovementRow, MaterialStockRow};
use crate::domain::types::{MaterialKind, MovementDirection, Role};
use crate::domain::user::User;
use crate::repository::catalog_repo::CatalogRepository;
use crate::repository::movement_repo::MovementRepository;
use crate::repository::stock_repo::StockRepository;

/// 报表可见角色
const REPORT_ROLES: &[Role] = &[Role::Warehouse, Role::Manager, Role::Director];

/// 物料信息（报表行表头数据）
struct MaterialInfo {
    name: String,
    kind: MaterialKind,
    unit: String,
    price: f64,
}

/// 数量/金额累计对
#[derive(Default, Clone, Copy)]
struct QtyAmount {
    quantity: f64,
    amount: f64,
}

// ==========================================
// ReportApi - 报表 API
// ==========================================
pub struct ReportApi {
    stock_repo: Arc<StockRepository>,
    catalog_repo: Arc<CatalogRepository>,
    movement_repo: Arc<MovementRepository>,
}

impl ReportApi {
    /// 创建新的 ReportApi 实例
    pub fn new(
        stock_repo: Arc<StockRepository>,
        catalog_repo: Arc<CatalogRepository>,
        movement_repo: Arc<MovementRepository>,
    ) -> Self {
        Self {
            stock_repo,
            catalog_repo,
            movement_repo,
        }
    }

    /// 物料库存报表（当前账面数量与金额，面料在前辅料在后）
    ///
    /// # 参数
    /// - articles: 货号过滤（None 表示全部）
    pub fn material_stock_report(
        &self,
        actor: &User,
        articles: Option<&[String]>,
    ) -> ApiResult<Vec<MaterialStockRow>> {
        ensure_role(actor, REPORT_ROLES)?;

        let wanted = |article: &str| match articles {
            Some(list) => list.iter().any(|a| a == article),
            None => true,
        };

        let mut rows = Vec::new();

        let fabrics = self.catalog_repo.list_fabrics()?;
        for stock in self.stock_repo.fabric_quantities()? {
            if !wanted(&stock.article) {
                continue;
            }
            let Some(fabric) = fabrics.iter().find(|f| f.fabric.article == stock.article) else {
                warn!(article = %stock.article, "库存货号无面料主数据，跳过");
                continue;
            };
            rows.push(MaterialStockRow {
                article: stock.article.clone(),
                name: fabric.name.clone(),
                kind: MaterialKind::Fabric,
                quantity: stock.quantity,
                unit: fabric.fabric.unit.clone(),
                price: fabric.fabric.price,
                amount: stock.quantity * fabric.fabric.price,
            });
        }

        let fittings = self.catalog_repo.list_fittings()?;
        for stock in self.stock_repo.fitting_quantities()? {
            if !wanted(&stock.article) {
                continue;
            }
            let Some(fitting) = fittings.iter().find(|f| f.fitting.article == stock.article)
            else {
                warn!(article = %stock.article, "库存货号无辅料主数据，跳过");
                continue;
            };
            rows.push(MaterialStockRow {
                article: stock.article.clone(),
                name: fitting.fitting.name.clone(),
                kind: MaterialKind::Fitting,
                quantity: stock.quantity,
                unit: MaterialKind::Fitting.default_unit().to_string(),
                price: fitting.fitting.price,
                amount: stock.quantity * fitting.fitting.price,
            });
        }

        Ok(rows)
    }

    /// 物料收发存报表（期初 / 本期收入 / 本期发出 / 期末）
    ///
    /// # 参数
    /// - from/to: 业务日期闭区间
    /// - articles: 货号过滤（None 表示全部）
    pub fn material_movement_report(
        &self,
        actor: &User,
        from: NaiveDate,
        to: NaiveDate,
        articles: Option<&[String]>,
    ) -> ApiResult<Vec<MaterialMovementRow>> {
        ensure_role(actor, REPORT_ROLES)?;
        if from > to {
            return Err(ApiError::InvalidInput(
                "起始日期不能晚于结束日期".to_string(),
            ));
        }

        // 期初 = from（不含）之前的净流水
        let mut initial: HashMap<String, QtyAmount> = HashMap::new();
        for movement in self.movement_repo.list_before(from)? {
            let entry = initial.entry(movement.material_article.clone()).or_default();
            match movement.direction {
                MovementDirection::In => {
                    entry.quantity += movement.quantity;
                    entry.amount += movement.amount;
                }
                MovementDirection::Out => {
                    entry.quantity -= movement.quantity;
                    entry.amount -= movement.amount;
                }
            }
        }

        // 本期收入/发出
        let mut receipts: HashMap<String, QtyAmount> = HashMap::new();
        let mut expenses: HashMap<String, QtyAmount> = HashMap::new();
        for movement in self.movement_repo.list_for_period(from, to)? {
            let bucket = match movement.direction {
                MovementDirection::In => &mut receipts,
                MovementDirection::Out => &mut expenses,
            };
            let entry = bucket.entry(movement.material_article.clone()).or_default();
            entry.quantity += movement.quantity;
            entry.amount += movement.amount;
        }

        // 货号并集
        let mut all_articles: Vec<String> = initial
            .keys()
            .chain(receipts.keys())
            .chain(expenses.keys())
            .cloned()
            .collect();
        all_articles.sort();
        all_articles.dedup();

        let fabrics = self.catalog_repo.list_fabrics()?;
        let fittings = self.catalog_repo.list_fittings()?;
        let material_info = |article: &str| -> Option<MaterialInfo> {
            if let Some(fabric) = fabrics.iter().find(|f| f.fabric.article == article) {
                return Some(MaterialInfo {
                    name: fabric.name.clone(),
                    kind: MaterialKind::Fabric,
                    unit: fabric.fabric.unit.clone(),
                    price: fabric.fabric.price,
                });
            }
            if let Some(fitting) = fittings.iter().find(|f| f.fitting.article == article) {
                return Some(MaterialInfo {
                    name: fitting.fitting.name.clone(),
                    kind: MaterialKind::Fitting,
                    unit: MaterialKind::Fitting.default_unit().to_string(),
                    price: fitting.fitting.price,
                });
            }
            None
        };

        let mut rows = Vec::new();
        for article in all_articles {
            if let Some(list) = articles {
                if !list.iter().any(|a| a == &article) {
                    continue;
                }
            }

            // 流水里存在但目录已无主数据的货号跳过（与快照口径一致）
            let Some(info) = material_info(&article) else {
                warn!(article = %article, "流水货号无目录主数据，跳过");
                continue;
            };

            let init = initial.get(&article).copied().unwrap_or_default();
            let received = receipts.get(&article).copied().unwrap_or_default();
            let expended = expenses.get(&article).copied().unwrap_or_default();

            rows.push(MaterialMovementRow {
                article,
                name: info.name,
                kind: info.kind,
                unit: info.unit,
                price: info.price,
                initial_quantity: init.quantity,
                initial_amount: init.amount,
                receipt_quantity: received.quantity,
                receipt_amount: received.amount,
                expense_quantity: expended.quantity,
                expense_amount: expended.amount,
                final_quantity: init.quantity + received.quantity - expended.quantity,
                final_amount: init.amount + received.amount - expended.amount,
            });
        }

        Ok(rows)
    }
}
