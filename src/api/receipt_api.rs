// ==========================================
// 纺织家具生产经营系统 - 收料单 API
// ==========================================
// 职责: 收料单创建、过账（生成库存批次 + 入库流水）
// 红线: 过账 = 批次写入 + 流水写入 + 标志更新，单事务
// ==========================================

use std::sync::{Arc, Mutex};

use chrono::{Datelike, NaiveDate};
use rusqlite::Connection;
use serde::{Deserialize, Serialize};
use tracing::info;
use uuid::Uuid;

use crate::api::access::ensure_role;
use crate::api::error::{ApiError, ApiResult};
use crate::domain::movement::MaterialMovement;
use crate::domain::receipt::{ReceiptDocument, ReceiptItem};
use crate::domain::stock::{FabricRoll, FittingBatch};
use crate::domain::types::{MaterialKind, MovementDirection, MovementDocumentType, Role};
use crate::domain::user::User;
use crate::repository::catalog_repo::CatalogRepository;
use crate::repository::error::RepositoryError;
use crate::repository::movement_repo::MovementRepository;
use crate::repository::receipt_repo::ReceiptRepository;
use crate::repository::stock_repo::StockRepository;

// ==========================================
// NewReceiptItem - 收料入参行
// ==========================================
/// 收料入参（单价缺省取目录价）
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewReceiptItem {
    pub material_article: String,
    pub material_kind: MaterialKind,
    pub quantity: f64,
    pub price: Option<f64>,
}

// ==========================================
// ReceiptApi - 收料单 API
// ==========================================
pub struct ReceiptApi {
    conn: Arc<Mutex<Connection>>,
    receipt_repo: Arc<ReceiptRepository>,
    catalog_repo: Arc<CatalogRepository>,
}

impl ReceiptApi {
    /// 创建新的 ReceiptApi 实例
    pub fn new(
        conn: Arc<Mutex<Connection>>,
        receipt_repo: Arc<ReceiptRepository>,
        catalog_repo: Arc<CatalogRepository>,
    ) -> Self {
        Self {
            conn,
            receipt_repo,
            catalog_repo,
        }
    }

    /// 创建收料单（不过账）
    ///
    /// # 说明
    /// - 逐行解析物料目录：校验货号存在，单价缺省取目录价
    /// - 单号按年度序列生成（RCP-<年>-<序号>）
    pub fn create_receipt(
        &self,
        actor: &User,
        supplier: &str,
        document_date: NaiveDate,
        items: &[NewReceiptItem],
    ) -> ApiResult<ReceiptDocument> {
        ensure_role(actor, &[Role::Warehouse])?;

        let supplier = supplier.trim();
        if supplier.is_empty() {
            return Err(ApiError::InvalidInput("供应商不能为空".to_string()));
        }
        if items.is_empty() {
            return Err(ApiError::InvalidInput("收料明细不能为空".to_string()));
        }

        let mut receipt_items = Vec::with_capacity(items.len());
        for item in items {
            if item.quantity <= 0.0 || !item.quantity.is_finite() {
                return Err(ApiError::InvalidInput(format!(
                    "数量必须为正: article={}",
                    item.material_article
                )));
            }

            let (catalog_price, unit) = match item.material_kind {
                MaterialKind::Fabric => {
                    let fabric = self
                        .catalog_repo
                        .find_fabric(&item.material_article)?
                        .ok_or_else(|| {
                            ApiError::NotFound(format!(
                                "面料(article={})不存在",
                                item.material_article
                            ))
                        })?;
                    (fabric.fabric.price, fabric.fabric.unit)
                }
                MaterialKind::Fitting => {
                    let fitting = self
                        .catalog_repo
                        .find_fitting(&item.material_article)?
                        .ok_or_else(|| {
                            ApiError::NotFound(format!(
                                "辅料(article={})不存在",
                                item.material_article
                            ))
                        })?;
                    (
                        fitting.fitting.price,
                        item.material_kind.default_unit().to_string(),
                    )
                }
            };

            let price = item.price.unwrap_or(catalog_price);
            if price < 0.0 || !price.is_finite() {
                return Err(ApiError::InvalidInput(format!(
                    "单价不能为负: article={}",
                    item.material_article
                )));
            }

            let mut receipt_item = ReceiptItem {
                id: 0,
                document_id: 0,
                material_article: item.material_article.clone(),
                material_kind: item.material_kind,
                quantity: item.quantity,
                unit,
                price,
                amount: 0.0,
            };
            receipt_item.amount = receipt_item.compute_amount();
            receipt_items.push(receipt_item);
        }

        let mut doc = ReceiptDocument {
            id: 0,
            document_number: self.receipt_repo.next_document_number(document_date.year())?,
            document_date,
            supplier: supplier.to_string(),
            total_amount: ReceiptDocument::compute_total(&receipt_items),
            is_processed: false,
            created_by: actor.full_name.clone(),
            created_at: chrono::Utc::now(),
            items: receipt_items,
        };

        let document_id = self.receipt_repo.create(&doc)?;
        doc.id = document_id;
        for item in &mut doc.items {
            item.document_id = document_id;
        }

        info!(
            document_id,
            document_number = %doc.document_number,
            supplier = %doc.supplier,
            total = doc.total_amount,
            "收料单创建成功"
        );
        Ok(doc)
    }

    /// 收料单过账：逐行生成库存批次 + 入库流水，并标记已过账
    ///
    /// # 红线
    /// - 全部写入在同一事务内；任何失败整体回滚
    /// - 已过账单据不可重复过账
    pub fn process_receipt(&self, actor: &User, document_id: i64) -> ApiResult<ReceiptDocument> {
        ensure_role(actor, &[Role::Warehouse])?;

        let doc = self
            .receipt_repo
            .find_by_id(document_id)?
            .ok_or_else(|| ApiError::NotFound(format!("收料单(id={})不存在", document_id)))?;

        if doc.is_processed {
            return Err(ApiError::BusinessRuleViolation(format!(
                "收料单 {} 已过账，不可重复过账",
                doc.document_number
            )));
        }

        // 面料行需要幅宽才能落卷，先在事务外解析目录
        let mut fabric_widths = Vec::new();
        for item in &doc.items {
            if item.material_kind == MaterialKind::Fabric {
                let fabric = self
                    .catalog_repo
                    .find_fabric(&item.material_article)?
                    .ok_or_else(|| {
                        ApiError::NotFound(format!("面料(article={})不存在", item.material_article))
                    })?;
                fabric_widths.push((item.material_article.clone(), fabric.fabric.width_mm));
            }
        }
        let width_of = |article: &str| {
            fabric_widths
                .iter()
                .find(|(a, _)| a == article)
                .map(|(_, w)| *w)
        };

        let conn = self
            .conn
            .lock()
            .map_err(|e| RepositoryError::LockError(e.to_string()))?;
        let tx = conn.unchecked_transaction().map_err(RepositoryError::from)?;

        let now = chrono::Utc::now();
        for item in &doc.items {
            match item.material_kind {
                MaterialKind::Fabric => {
                    let width_mm = width_of(&item.material_article).ok_or_else(|| {
                        ApiError::InternalError(format!(
                            "面料幅宽缺失: article={}",
                            item.material_article
                        ))
                    })?;
                    let roll = FabricRoll {
                        roll_id: Uuid::new_v4().to_string(),
                        fabric_article: item.material_article.clone(),
                        length_mm: (item.quantity * 1000.0).round() as i64,
                        width_mm,
                        received_at: now,
                    };
                    StockRepository::insert_fabric_roll_with_conn(&tx, &roll)?;
                }
                MaterialKind::Fitting => {
                    let batch = FittingBatch {
                        batch_id: Uuid::new_v4().to_string(),
                        fitting_article: item.material_article.clone(),
                        quantity: item.quantity,
                        received_at: now,
                    };
                    StockRepository::insert_fitting_batch_with_conn(&tx, &batch)?;
                }
            }

            let movement = MaterialMovement {
                id: 0,
                material_article: item.material_article.clone(),
                material_kind: item.material_kind,
                document_type: MovementDocumentType::Receipt,
                document_id: doc.id,
                movement_date: doc.document_date,
                quantity: item.quantity,
                unit: item.unit.clone(),
                price: item.price,
                amount: item.amount,
                direction: MovementDirection::In,
            };
            MovementRepository::insert_with_conn(&tx, &movement)?;
        }

        ReceiptRepository::mark_processed_with_conn(&tx, doc.id)?;
        tx.commit().map_err(RepositoryError::from)?;
        drop(conn);

        info!(
            document_id,
            document_number = %doc.document_number,
            items = doc.items.len(),
            "收料单过账完成"
        );

        self.receipt_repo
            .find_by_id(document_id)?
            .ok_or_else(|| ApiError::NotFound(format!("收料单(id={})不存在", document_id)))
    }

    /// 按ID查询收料单
    pub fn get_receipt(&self, actor: &User, document_id: i64) -> ApiResult<ReceiptDocument> {
        ensure_role(actor, &[Role::Warehouse, Role::Manager, Role::Director])?;
        self.receipt_repo
            .find_by_id(document_id)?
            .ok_or_else(|| ApiError::NotFound(format!("收料单(id={})不存在", document_id)))
    }

    /// 收料单列表（按单据日期降序）
    pub fn list_receipts(&self, actor: &User) -> ApiResult<Vec<ReceiptDocument>> {
        ensure_role(actor, &[Role::Warehouse, Role::Manager, Role::Director])?;
        Ok(self.receipt_repo.list()?)
    }
}
