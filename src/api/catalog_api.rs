// ==========================================
// 纺织家具生产经营系统 - 目录 API
// ==========================================
// 职责: 面料/辅料/成品目录的查询与维护
// 权限: 浏览对所有角色开放；维护仅限经理
// ==========================================

use std::sync::Arc;

use tracing::info;

use crate::api::access::ensure_role;
use crate::api::error::{ApiError, ApiResult};
use crate::domain::catalog::{Fabric, FabricDetails, Fitting, FittingDetails, ManufacturedGood};
use crate::domain::types::Role;
use crate::domain::user::User;
use crate::repository::catalog_repo::CatalogRepository;

// ==========================================
// CatalogApi - 目录 API
// ==========================================
pub struct CatalogApi {
    catalog_repo: Arc<CatalogRepository>,
}

impl CatalogApi {
    /// 创建新的 CatalogApi 实例
    pub fn new(catalog_repo: Arc<CatalogRepository>) -> Self {
        Self { catalog_repo }
    }

    // ==========================================
    // 查询接口（全角色）
    // ==========================================

    /// 面料目录（含查找表名称）
    pub fn list_fabrics(&self) -> ApiResult<Vec<FabricDetails>> {
        Ok(self.catalog_repo.list_fabrics()?)
    }

    /// 按货号查询面料
    pub fn get_fabric(&self, article: &str) -> ApiResult<FabricDetails> {
        self.catalog_repo
            .find_fabric(article)?
            .ok_or_else(|| ApiError::NotFound(format!("面料(article={})不存在", article)))
    }

    /// 辅料目录（含类型名称）
    pub fn list_fittings(&self) -> ApiResult<Vec<FittingDetails>> {
        Ok(self.catalog_repo.list_fittings()?)
    }

    /// 按货号查询辅料
    pub fn get_fitting(&self, article: &str) -> ApiResult<FittingDetails> {
        self.catalog_repo
            .find_fitting(article)?
            .ok_or_else(|| ApiError::NotFound(format!("辅料(article={})不存在", article)))
    }

    /// 成品目录
    pub fn list_goods(&self) -> ApiResult<Vec<ManufacturedGood>> {
        Ok(self.catalog_repo.list_goods()?)
    }

    /// 按货号查询成品
    pub fn get_good(&self, article: &str) -> ApiResult<ManufacturedGood> {
        self.catalog_repo
            .find_good(article)?
            .ok_or_else(|| ApiError::NotFound(format!("成品(article={})不存在", article)))
    }

    // ==========================================
    // 维护接口（经理）
    // ==========================================

    /// 新增/修改面料
    pub fn upsert_fabric(&self, actor: &User, fabric: &Fabric) -> ApiResult<()> {
        ensure_role(actor, &[Role::Manager])?;
        Self::validate_article_and_price(&fabric.article, fabric.price)?;
        if fabric.width_mm <= 0 {
            return Err(ApiError::InvalidInput("面料幅宽必须为正".to_string()));
        }

        self.catalog_repo.upsert_fabric(fabric)?;
        info!(article = %fabric.article, "面料已保存");
        Ok(())
    }

    /// 新增/修改辅料
    pub fn upsert_fitting(&self, actor: &User, fitting: &Fitting) -> ApiResult<()> {
        ensure_role(actor, &[Role::Manager])?;
        Self::validate_article_and_price(&fitting.article, fitting.price)?;
        if fitting.name.trim().is_empty() {
            return Err(ApiError::InvalidInput("辅料名称不能为空".to_string()));
        }

        self.catalog_repo.upsert_fitting(fitting)?;
        info!(article = %fitting.article, "辅料已保存");
        Ok(())
    }

    /// 新增/修改成品
    pub fn upsert_good(&self, actor: &User, good: &ManufacturedGood) -> ApiResult<()> {
        ensure_role(actor, &[Role::Manager])?;
        Self::validate_article_and_price(&good.article, good.price)?;
        if good.name.trim().is_empty() {
            return Err(ApiError::InvalidInput("成品名称不能为空".to_string()));
        }

        self.catalog_repo.upsert_good(good)?;
        info!(article = %good.article, "成品已保存");
        Ok(())
    }

    fn validate_article_and_price(article: &str, price: f64) -> ApiResult<()> {
        if article.trim().is_empty() {
            return Err(ApiError::InvalidInput("货号不能为空".to_string()));
        }
        if price < 0.0 || !price.is_finite() {
            return Err(ApiError::InvalidInput("单价不能为负".to_string()));
        }
        Ok(())
    }
}
