// ==========================================
// 纺织家具生产经营系统 - 物料台账 API
// ==========================================
// 职责: 批次级库存台账、加权平均成本、余料判定
// 权限: 库管/经理/总监
// ==========================================

use std::sync::Arc;

use crate::api::access::ensure_role;
use crate::api::error::{ApiError, ApiResult};
use crate::config::ConfigManager;
use crate::domain::stock::{FabricRollValuation, FittingBatchValuation};
use crate::domain::types::{MaterialKind, Role};
use crate::domain::user::User;
use crate::repository::catalog_repo::CatalogRepository;
use crate::repository::stock_repo::StockRepository;

/// 台账页面的角色范围
const LEDGER_ROLES: &[Role] = &[Role::Warehouse, Role::Manager, Role::Director];

// ==========================================
// MaterialApi - 物料台账 API
// ==========================================
pub struct MaterialApi {
    stock_repo: Arc<StockRepository>,
    catalog_repo: Arc<CatalogRepository>,
    config: Arc<ConfigManager>,
}

impl MaterialApi {
    /// 创建新的 MaterialApi 实例
    pub fn new(
        stock_repo: Arc<StockRepository>,
        catalog_repo: Arc<CatalogRepository>,
        config: Arc<ConfigManager>,
    ) -> Self {
        Self {
            stock_repo,
            catalog_repo,
            config,
        }
    }

    /// 面料卷台账（逐卷估值）
    pub fn list_fabric_stock(&self, actor: &User) -> ApiResult<Vec<FabricRollValuation>> {
        ensure_role(actor, LEDGER_ROLES)?;
        Ok(self.stock_repo.list_fabric_roll_valuations()?)
    }

    /// 辅料批次台账（逐批估值）
    pub fn list_fitting_stock(&self, actor: &User) -> ApiResult<Vec<FittingBatchValuation>> {
        ensure_role(actor, LEDGER_ROLES)?;
        Ok(self.stock_repo.list_fitting_batch_valuations()?)
    }

    /// 加权平均成本（Σ 数量×单价 / Σ 数量，空库存为 0）
    pub fn average_cost(
        &self,
        actor: &User,
        article: &str,
        kind: MaterialKind,
    ) -> ApiResult<f64> {
        ensure_role(actor, LEDGER_ROLES)?;
        if article.trim().is_empty() {
            return Err(ApiError::InvalidInput("货号不能为空".to_string()));
        }
        Ok(self.stock_repo.average_cost(article, kind)?)
    }

    /// 余料判定
    ///
    /// 口径:
    /// - 面料: 剩余长度(米) × 幅宽(米) 低于面积阈值 → 布头
    /// - 辅料: 剩余件数低于件数阈值 → 零头
    pub fn is_scrap(
        &self,
        actor: &User,
        article: &str,
        kind: MaterialKind,
        remaining_quantity: f64,
    ) -> ApiResult<bool> {
        ensure_role(actor, LEDGER_ROLES)?;
        if remaining_quantity < 0.0 {
            return Err(ApiError::InvalidInput("剩余数量不能为负".to_string()));
        }

        match kind {
            MaterialKind::Fabric => {
                let fabric = self
                    .catalog_repo
                    .find_fabric(article)?
                    .ok_or_else(|| ApiError::NotFound(format!("面料(article={})不存在", article)))?;
                let area_sqm = remaining_quantity * (fabric.fabric.width_mm as f64 / 1000.0);
                let threshold = self.config.fabric_scrap_area_sqm()?;
                Ok(area_sqm < threshold)
            }
            MaterialKind::Fitting => {
                let threshold = self.config.fitting_scrap_qty()?;
                Ok(remaining_quantity < threshold)
            }
        }
    }
}
