// ==========================================
// 纺织家具生产经营系统 - 盘点 API
// ==========================================
// 职责: 盘点快照、盘点单保存/审批/过账
// 红线:
// - 差异占比超阈值（config_kv）且未经总监审批的单据不可过账
// - 过账 = 流水写入 + 批次调整 + 标志更新，单事务
// - 盘盈落调整批次；盘亏按入库先后冲减批次
// ==========================================

use std::sync::{Arc, Mutex};

use chrono::{Datelike, NaiveDate};
use rusqlite::Connection;
use tracing::{info, warn};
use uuid::Uuid;

use crate::api::access::ensure_role;
use crate::api::error::{ApiError, ApiResult};
use crate::config::ConfigManager;
use crate::domain::inventory::{InventoryDocument, InventoryItem};
use crate::domain::movement::MaterialMovement;
use crate::domain::stock::{FabricRoll, FittingBatch};
use crate::domain::types::{MaterialKind, MovementDirection, MovementDocumentType, Role};
use crate::domain::user::User;
use crate::repository::catalog_repo::CatalogRepository;
use crate::repository::error::RepositoryError;
use crate::repository::inventory_repo::InventoryRepository;
use crate::repository::movement_repo::MovementRepository;
use crate::repository::stock_repo::StockRepository;

/// 盘点单可见角色
const DOCUMENT_ROLES: &[Role] = &[Role::Warehouse, Role::Manager, Role::Director];

/// 差异数量判零阈值（浮点口径）
const DIFF_EPSILON: f64 = 1e-9;

// ==========================================
// InventoryApi - 盘点 API
// ==========================================
pub struct InventoryApi {
    conn: Arc<Mutex<Connection>>,
    inventory_repo: Arc<InventoryRepository>,
    stock_repo: Arc<StockRepository>,
    catalog_repo: Arc<CatalogRepository>,
    config: Arc<ConfigManager>,
}

impl InventoryApi {
    /// 创建新的 InventoryApi 实例
    pub fn new(
        conn: Arc<Mutex<Connection>>,
        inventory_repo: Arc<InventoryRepository>,
        stock_repo: Arc<StockRepository>,
        catalog_repo: Arc<CatalogRepository>,
        config: Arc<ConfigManager>,
    ) -> Self {
        Self {
            conn,
            inventory_repo,
            stock_repo,
            catalog_repo,
            config,
        }
    }

    // ==========================================
    // 盘点快照
    // ==========================================

    /// 生成当前账面快照（实盘数量初始为 0，待录入）
    ///
    /// # 说明
    /// - 面料数量口径为米（各卷长度汇总），辅料为件
    /// - 无目录主数据的库存货号跳过
    pub fn prepare_snapshot(&self, actor: &User) -> ApiResult<Vec<InventoryItem>> {
        ensure_role(actor, &[Role::Warehouse])?;

        let mut items = Vec::new();

        let fabrics = self.catalog_repo.list_fabrics()?;
        for stock in self.stock_repo.fabric_quantities()? {
            let Some(fabric) = fabrics.iter().find(|f| f.fabric.article == stock.article) else {
                warn!(article = %stock.article, "库存货号无面料主数据，跳过");
                continue;
            };
            let mut item = InventoryItem {
                id: 0,
                document_id: 0,
                material_article: stock.article.clone(),
                material_name: fabric.name.clone(),
                material_kind: MaterialKind::Fabric,
                accounting_quantity: stock.quantity,
                actual_quantity: 0.0,
                difference_quantity: 0.0,
                unit: fabric.fabric.unit.clone(),
                price: fabric.fabric.price,
                accounting_amount: 0.0,
                actual_amount: 0.0,
                difference_amount: 0.0,
            };
            item.recalculate();
            items.push(item);
        }

        let fittings = self.catalog_repo.list_fittings()?;
        for stock in self.stock_repo.fitting_quantities()? {
            let Some(fitting) = fittings.iter().find(|f| f.fitting.article == stock.article)
            else {
                warn!(article = %stock.article, "库存货号无辅料主数据，跳过");
                continue;
            };
            let mut item = InventoryItem {
                id: 0,
                document_id: 0,
                material_article: stock.article.clone(),
                material_name: fitting.fitting.name.clone(),
                material_kind: MaterialKind::Fitting,
                accounting_quantity: stock.quantity,
                actual_quantity: 0.0,
                difference_quantity: 0.0,
                unit: MaterialKind::Fitting.default_unit().to_string(),
                price: fitting.fitting.price,
                accounting_amount: 0.0,
                actual_amount: 0.0,
                difference_amount: 0.0,
            };
            item.recalculate();
            items.push(item);
        }

        Ok(items)
    }

    // ==========================================
    // 盘点单保存 / 审批 / 过账
    // ==========================================

    /// 保存盘点单
    ///
    /// # 参数
    /// - items: 录入实盘数量后的快照行（派生字段由服务端重算）
    /// - process: 保存即过账（同一事务内生效；受审批阈值约束）
    pub fn save_document(
        &self,
        actor: &User,
        document_date: NaiveDate,
        items: Vec<InventoryItem>,
        process: bool,
    ) -> ApiResult<InventoryDocument> {
        ensure_role(actor, &[Role::Warehouse])?;

        if items.is_empty() {
            return Err(ApiError::InvalidInput("盘点明细不能为空".to_string()));
        }
        for item in &items {
            if item.material_article.trim().is_empty() {
                return Err(ApiError::InvalidInput("物料货号不能为空".to_string()));
            }
            if item.actual_quantity < 0.0 || !item.actual_quantity.is_finite() {
                return Err(ApiError::InvalidInput(format!(
                    "实盘数量不能为负: article={}",
                    item.material_article
                )));
            }
        }

        let mut doc = InventoryDocument {
            id: 0,
            document_number: self
                .inventory_repo
                .next_document_number(document_date.year())?,
            document_date,
            warehouse_keeper: actor.full_name.clone(),
            total_accounting_amount: 0.0,
            total_actual_amount: 0.0,
            difference_amount: 0.0,
            difference_percent: 0.0,
            is_approved: false,
            approved_by: None,
            approved_at: None,
            is_processed: false,
            created_by: actor.full_name.clone(),
            created_at: chrono::Utc::now(),
            items,
        };
        doc.recalculate();

        // 保存即过账时，阈值校验在任何写入前完成
        if process {
            self.ensure_processable(&doc)?;
        }

        // 盘盈落卷需要面料幅宽，事务外解析目录
        let fabric_widths = if process {
            self.resolve_fabric_widths(&doc)?
        } else {
            Vec::new()
        };

        let conn = self
            .conn
            .lock()
            .map_err(|e| RepositoryError::LockError(e.to_string()))?;
        let tx = conn.unchecked_transaction().map_err(RepositoryError::from)?;

        let document_id = InventoryRepository::create_with_conn(&tx, &doc)?;
        doc.id = document_id;
        for item in &mut doc.items {
            item.document_id = document_id;
        }

        if process {
            Self::apply_stock_effects(&tx, &doc, &fabric_widths)?;
            InventoryRepository::mark_processed_with_conn(&tx, document_id)?;
            doc.is_processed = true;
        }

        tx.commit().map_err(RepositoryError::from)?;
        drop(conn);

        info!(
            document_id,
            document_number = %doc.document_number,
            difference_percent = doc.difference_percent,
            processed = doc.is_processed,
            "盘点单保存成功"
        );
        Ok(doc)
    }

    /// 总监审批盘点单
    pub fn approve_document(&self, actor: &User, document_id: i64) -> ApiResult<InventoryDocument> {
        ensure_role(actor, &[Role::Director])?;

        let doc = self
            .inventory_repo
            .find_by_id(document_id)?
            .ok_or_else(|| ApiError::NotFound(format!("盘点单(id={})不存在", document_id)))?;

        if doc.is_processed {
            return Err(ApiError::BusinessRuleViolation(format!(
                "盘点单 {} 已过账，无需审批",
                doc.document_number
            )));
        }
        if doc.is_approved {
            return Err(ApiError::BusinessRuleViolation(format!(
                "盘点单 {} 已审批",
                doc.document_number
            )));
        }

        self.inventory_repo
            .approve(document_id, &actor.full_name, chrono::Utc::now())?;

        info!(
            document_id,
            document_number = %doc.document_number,
            approved_by = %actor.full_name,
            "盘点单审批通过"
        );

        self.inventory_repo
            .find_by_id(document_id)?
            .ok_or_else(|| ApiError::NotFound(format!("盘点单(id={})不存在", document_id)))
    }

    /// 盘点单过账：写流水、调整批次、标记已过账
    pub fn process_document(&self, actor: &User, document_id: i64) -> ApiResult<InventoryDocument> {
        ensure_role(actor, &[Role::Warehouse, Role::Director])?;

        let doc = self
            .inventory_repo
            .find_by_id(document_id)?
            .ok_or_else(|| ApiError::NotFound(format!("盘点单(id={})不存在", document_id)))?;

        if doc.is_processed {
            return Err(ApiError::BusinessRuleViolation(format!(
                "盘点单 {} 已过账，不可重复过账",
                doc.document_number
            )));
        }
        self.ensure_processable(&doc)?;

        let fabric_widths = self.resolve_fabric_widths(&doc)?;

        let conn = self
            .conn
            .lock()
            .map_err(|e| RepositoryError::LockError(e.to_string()))?;
        let tx = conn.unchecked_transaction().map_err(RepositoryError::from)?;

        Self::apply_stock_effects(&tx, &doc, &fabric_widths)?;
        InventoryRepository::mark_processed_with_conn(&tx, document_id)?;

        tx.commit().map_err(RepositoryError::from)?;
        drop(conn);

        info!(
            document_id,
            document_number = %doc.document_number,
            difference_amount = doc.difference_amount,
            "盘点单过账完成"
        );

        self.inventory_repo
            .find_by_id(document_id)?
            .ok_or_else(|| ApiError::NotFound(format!("盘点单(id={})不存在", document_id)))
    }

    /// 按ID查询盘点单（含明细行）
    pub fn get_document(&self, actor: &User, document_id: i64) -> ApiResult<InventoryDocument> {
        ensure_role(actor, DOCUMENT_ROLES)?;
        self.inventory_repo
            .find_by_id(document_id)?
            .ok_or_else(|| ApiError::NotFound(format!("盘点单(id={})不存在", document_id)))
    }

    /// 盘点单列表（仅单据头），按盘点日期降序
    pub fn list_documents(&self, actor: &User) -> ApiResult<Vec<InventoryDocument>> {
        ensure_role(actor, DOCUMENT_ROLES)?;
        Ok(self.inventory_repo.list()?)
    }

    // ==========================================
    // 内部: 阈值校验与库存效果
    // ==========================================

    /// 阈值校验: 差异占比超阈值且未审批 → 拒绝过账
    fn ensure_processable(&self, doc: &InventoryDocument) -> ApiResult<()> {
        let threshold = self.config.inventory_approval_threshold_percent()?;
        if doc.difference_percent > threshold && !doc.is_approved {
            warn!(
                document_number = %doc.document_number,
                difference_percent = doc.difference_percent,
                threshold_percent = threshold,
                "盘点差异超阈值，未审批不可过账"
            );
            return Err(ApiError::ApprovalRequired {
                difference_percent: doc.difference_percent,
                threshold_percent: threshold,
            });
        }
        Ok(())
    }

    /// 事务外解析盘盈面料行的幅宽（落调整卷时使用）
    fn resolve_fabric_widths(&self, doc: &InventoryDocument) -> ApiResult<Vec<(String, i64)>> {
        let mut widths = Vec::new();
        for item in &doc.items {
            if item.material_kind == MaterialKind::Fabric
                && item.difference_quantity > DIFF_EPSILON
            {
                let fabric = self
                    .catalog_repo
                    .find_fabric(&item.material_article)?
                    .ok_or_else(|| {
                        ApiError::NotFound(format!("面料(article={})不存在", item.material_article))
                    })?;
                widths.push((item.material_article.clone(), fabric.fabric.width_mm));
            }
        }
        Ok(widths)
    }

    /// 对差异行写流水并调整批次（调用方持有事务）
    fn apply_stock_effects(
        tx: &Connection,
        doc: &InventoryDocument,
        fabric_widths: &[(String, i64)],
    ) -> ApiResult<()> {
        let now = chrono::Utc::now();
        for item in &doc.items {
            if item.difference_quantity.abs() <= DIFF_EPSILON {
                continue;
            }

            let surplus = item.difference_quantity > 0.0;
            let movement = MaterialMovement {
                id: 0,
                material_article: item.material_article.clone(),
                material_kind: item.material_kind,
                document_type: MovementDocumentType::Inventory,
                document_id: doc.id,
                movement_date: doc.document_date,
                quantity: item.difference_quantity.abs(),
                unit: item.unit.clone(),
                price: item.price,
                amount: item.difference_amount.abs(),
                direction: if surplus {
                    MovementDirection::In
                } else {
                    MovementDirection::Out
                },
            };
            MovementRepository::insert_with_conn(tx, &movement)?;

            match (item.material_kind, surplus) {
                (MaterialKind::Fabric, true) => {
                    let width_mm = fabric_widths
                        .iter()
                        .find(|(a, _)| a == &item.material_article)
                        .map(|(_, w)| *w)
                        .ok_or_else(|| {
                            ApiError::InternalError(format!(
                                "面料幅宽缺失: article={}",
                                item.material_article
                            ))
                        })?;
                    let roll = FabricRoll {
                        roll_id: Uuid::new_v4().to_string(),
                        fabric_article: item.material_article.clone(),
                        length_mm: (item.difference_quantity * 1000.0).round() as i64,
                        width_mm,
                        received_at: now,
                    };
                    StockRepository::insert_fabric_roll_with_conn(tx, &roll)?;
                }
                (MaterialKind::Fabric, false) => {
                    StockRepository::consume_fabric_with_conn(
                        tx,
                        &item.material_article,
                        item.difference_quantity.abs(),
                    )?;
                }
                (MaterialKind::Fitting, true) => {
                    let batch = FittingBatch {
                        batch_id: Uuid::new_v4().to_string(),
                        fitting_article: item.material_article.clone(),
                        quantity: item.difference_quantity,
                        received_at: now,
                    };
                    StockRepository::insert_fitting_batch_with_conn(tx, &batch)?;
                }
                (MaterialKind::Fitting, false) => {
                    StockRepository::consume_fitting_with_conn(
                        tx,
                        &item.material_article,
                        item.difference_quantity.abs(),
                    )?;
                }
            }
        }
        Ok(())
    }
}
