//! 产品业务服务

use std::sync::Arc;

use chrono::{DateTime, SubsecRound, Utc};
use tracing::{debug, info};
use validator::Validate;

use super::model::{page_offset, NewProduct, Product, ProductChanges, PAGE_SIZE};
use super::store::{ProductStore, StoreError};
use crate::core::error::CoreError;

#[derive(Clone)]
pub struct ProductService {
    store: Arc<dyn ProductStore>,
}

impl From<StoreError> for CoreError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::DuplicateSku => {
                CoreError::Conflict("A product with this sku already exists".to_string())
            }
            #[cfg(feature = "database")]
            StoreError::Database(e) => {
                CoreError::InternalServerError(format!("Database error: {}", e))
            }
        }
    }
}

/// PostgreSQL 时间戳精度为微秒，提前截断以保证返回值与存储值一致
fn now() -> DateTime<Utc> {
    Utc::now().trunc_subsecs(6)
}

fn ensure_positive(name: &str, value: i64) -> Result<(), CoreError> {
    if value < 1 {
        return Err(CoreError::Validation(format!(
            "{} must be greater than or equal to 1",
            name
        )));
    }
    Ok(())
}

impl ProductService {
    pub fn new(store: Arc<dyn ProductStore>) -> Self {
        Self { store }
    }

    pub async fn list_products(&self, page: i64) -> Result<Vec<Product>, CoreError> {
        ensure_positive("page", page)?;
        Ok(self.store.list(page_offset(page), PAGE_SIZE).await?)
    }

    pub async fn get_product(&self, id: i64) -> Result<Product, CoreError> {
        ensure_positive("id", id)?;
        self.store
            .get(id)
            .await?
            .ok_or_else(|| CoreError::NotFound("Product not found".to_string()))
    }

    pub async fn create_product(&self, product: NewProduct) -> Result<Product, CoreError> {
        product.validate()?;

        let sku = product.sku.clone();
        let product = self.store.insert(product, now()).await.map_err(|e| match e {
            StoreError::DuplicateSku => {
                CoreError::Conflict(format!("Product with sku '{}' already exists", sku))
            }
            other => other.into(),
        })?;

        info!("Created product: {} ({}, sku {})", product.name, product.id, product.sku);
        Ok(product)
    }

    /// 部分更新；空的变更集同样会刷新 `updated_date`
    pub async fn update_product(
        &self,
        id: i64,
        changes: ProductChanges,
    ) -> Result<Product, CoreError> {
        ensure_positive("id", id)?;
        changes.validate()?;
        if changes.is_empty() {
            debug!("Empty update for product {}, only refreshing updated_date", id);
        }

        let sku = changes.sku.clone();
        let product = self
            .store
            .update(id, changes, now())
            .await
            .map_err(|e| match (e, sku) {
                (StoreError::DuplicateSku, Some(sku)) => {
                    CoreError::Conflict(format!("Product with sku '{}' already exists", sku))
                }
                (other, _) => other.into(),
            })?
            .ok_or_else(|| CoreError::NotFound("Product not found".to_string()))?;

        info!("Updated product: {} ({})", product.name, product.id);
        Ok(product)
    }

    pub async fn health(&self) -> Result<(), CoreError> {
        Ok(self.store.ping().await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::product::model::{ProductCategory, UnitOfMeasure};
    use crate::app::product::store::InMemoryProductStore;
    use std::time::Duration;

    fn service() -> ProductService {
        ProductService::new(Arc::new(InMemoryProductStore::new()))
    }

    fn bolt(sku: &str) -> NewProduct {
        NewProduct {
            name: "Bolt M6".to_string(),
            category: ProductCategory::Raw,
            description: None,
            product_image: None,
            sku: sku.to_string(),
            unit_of_measure: UnitOfMeasure::Unit,
            lead_time: 5,
        }
    }

    #[tokio::test]
    async fn test_create_returns_stored_fields() {
        let service = service();
        let product = service.create_product(bolt("BLT-M6-01")).await.unwrap();

        assert_eq!(product.id, 1);
        assert_eq!(product.name, "Bolt M6");
        assert_eq!(product.category, ProductCategory::Raw);
        assert_eq!(product.sku, "BLT-M6-01");
        assert_eq!(product.unit_of_measure, UnitOfMeasure::Unit);
        assert_eq!(product.lead_time, 5);
        assert_eq!(product.created_date, product.updated_date);

        let fetched = service.get_product(product.id).await.unwrap();
        assert_eq!(fetched, product);
    }

    #[tokio::test]
    async fn test_create_rejects_invalid_input() {
        let service = service();
        let mut product = bolt("BLT-M6-01");
        product.lead_time = 1000;

        let err = service.create_product(product).await.unwrap_err();
        assert!(matches!(err, CoreError::Validation(_)));
        assert!(service.list_products(1).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_create_duplicate_sku_conflicts() {
        let service = service();
        service.create_product(bolt("BLT-M6-01")).await.unwrap();

        let err = service.create_product(bolt("BLT-M6-01")).await.unwrap_err();
        match err {
            CoreError::Conflict(msg) => assert!(msg.contains("BLT-M6-01")),
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_get_missing_and_invalid_id() {
        let service = service();
        assert!(matches!(
            service.get_product(7).await.unwrap_err(),
            CoreError::NotFound(_)
        ));
        assert!(matches!(
            service.get_product(0).await.unwrap_err(),
            CoreError::Validation(_)
        ));
    }

    #[tokio::test]
    async fn test_list_pages() {
        let service = service();
        for i in 0..12 {
            service.create_product(bolt(&format!("SKU-{i}"))).await.unwrap();
        }

        assert_eq!(service.list_products(1).await.unwrap().len(), 10);
        assert_eq!(service.list_products(2).await.unwrap().len(), 2);
        assert!(service.list_products(3).await.unwrap().is_empty());
        assert!(matches!(
            service.list_products(0).await.unwrap_err(),
            CoreError::Validation(_)
        ));
    }

    #[tokio::test]
    async fn test_update_single_field() {
        let service = service();
        let created = service.create_product(bolt("BLT-M6-01")).await.unwrap();
        tokio::time::sleep(Duration::from_millis(5)).await;

        let changes = ProductChanges {
            lead_time: Some(10),
            ..Default::default()
        };
        let updated = service.update_product(created.id, changes).await.unwrap();

        assert_eq!(updated.lead_time, 10);
        assert_eq!(updated.name, created.name);
        assert_eq!(updated.sku, created.sku);
        assert_eq!(updated.category, created.category);
        assert_eq!(updated.created_date, created.created_date);
        assert!(updated.updated_date > created.updated_date);
    }

    #[tokio::test]
    async fn test_empty_update_refreshes_timestamp() {
        let service = service();
        let created = service.create_product(bolt("BLT-M6-01")).await.unwrap();
        tokio::time::sleep(Duration::from_millis(5)).await;

        let updated = service
            .update_product(created.id, ProductChanges::default())
            .await
            .unwrap();

        assert!(updated.updated_date > created.updated_date);
        assert_eq!(
            Product {
                updated_date: created.updated_date,
                ..updated.clone()
            },
            created
        );
    }

    #[tokio::test]
    async fn test_update_errors() {
        let service = service();
        let created = service.create_product(bolt("ONE")).await.unwrap();
        service.create_product(bolt("TWO")).await.unwrap();

        let err = service
            .update_product(99, ProductChanges::default())
            .await
            .unwrap_err();
        assert!(matches!(err, CoreError::NotFound(_)));

        let changes = ProductChanges {
            name: Some("x".to_string()),
            ..Default::default()
        };
        let err = service.update_product(created.id, changes).await.unwrap_err();
        assert!(matches!(err, CoreError::Validation(_)));

        let changes = ProductChanges {
            sku: Some("TWO".to_string()),
            ..Default::default()
        };
        let err = service.update_product(created.id, changes).await.unwrap_err();
        assert!(matches!(err, CoreError::Conflict(_)));

        // 失败的更新不改变记录
        let unchanged = service.get_product(created.id).await.unwrap();
        assert_eq!(unchanged, created);
    }
}
