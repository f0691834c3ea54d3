//! 产品存储抽象与内存实现

use std::collections::BTreeMap;

use axum::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::RwLock;

use super::model::{NewProduct, Product, ProductChanges};

/// 存储层错误
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("sku already exists")]
    DuplicateSku,
    #[cfg(feature = "database")]
    #[error("database error: {0}")]
    Database(sqlx::Error),
}

#[cfg(feature = "database")]
impl From<sqlx::Error> for StoreError {
    fn from(err: sqlx::Error) -> Self {
        if let sqlx::Error::Database(db_err) = &err {
            if db_err.is_unique_violation() {
                return StoreError::DuplicateSku;
            }
        }
        StoreError::Database(err)
    }
}

/// 产品表的最小存储接口
#[async_trait]
pub trait ProductStore: Send + Sync {
    /// 按 id 升序扫描
    async fn list(&self, offset: i64, limit: i64) -> Result<Vec<Product>, StoreError>;

    async fn get(&self, id: i64) -> Result<Option<Product>, StoreError>;

    /// 插入新产品，`created_date` 和 `updated_date` 都设为 `now`
    async fn insert(&self, product: NewProduct, now: DateTime<Utc>)
        -> Result<Product, StoreError>;

    /// 应用部分更新；产品不存在时返回 `Ok(None)`
    async fn update(
        &self,
        id: i64,
        changes: ProductChanges,
        now: DateTime<Utc>,
    ) -> Result<Option<Product>, StoreError>;

    async fn ping(&self) -> Result<(), StoreError>;
}

#[derive(Default)]
struct Table {
    next_id: i64,
    rows: BTreeMap<i64, Product>,
}

/// 内存存储，用于测试和无数据库运行
#[derive(Default)]
pub struct InMemoryProductStore {
    table: RwLock<Table>,
}

impl InMemoryProductStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Table {
    fn sku_taken(&self, sku: &str, except: Option<i64>) -> bool {
        self.rows
            .values()
            .any(|p| p.sku == sku && Some(p.id) != except)
    }
}

#[async_trait]
impl ProductStore for InMemoryProductStore {
    async fn list(&self, offset: i64, limit: i64) -> Result<Vec<Product>, StoreError> {
        let table = self.table.read().await;
        let offset = usize::try_from(offset).unwrap_or(usize::MAX);
        let limit = usize::try_from(limit).unwrap_or(0);
        Ok(table.rows.values().skip(offset).take(limit).cloned().collect())
    }

    async fn get(&self, id: i64) -> Result<Option<Product>, StoreError> {
        Ok(self.table.read().await.rows.get(&id).cloned())
    }

    async fn insert(
        &self,
        product: NewProduct,
        now: DateTime<Utc>,
    ) -> Result<Product, StoreError> {
        let mut table = self.table.write().await;
        if table.sku_taken(&product.sku, None) {
            return Err(StoreError::DuplicateSku);
        }

        table.next_id += 1;
        let product = product.into_product(table.next_id, now);
        table.rows.insert(product.id, product.clone());
        Ok(product)
    }

    async fn update(
        &self,
        id: i64,
        changes: ProductChanges,
        now: DateTime<Utc>,
    ) -> Result<Option<Product>, StoreError> {
        let mut table = self.table.write().await;
        // 先判断是否存在，再检查 sku 冲突
        if !table.rows.contains_key(&id) {
            return Ok(None);
        }
        if let Some(sku) = &changes.sku {
            if table.sku_taken(sku, Some(id)) {
                return Err(StoreError::DuplicateSku);
            }
        }

        let Some(product) = table.rows.get_mut(&id) else {
            return Ok(None);
        };
        changes.apply(product, now);
        Ok(Some(product.clone()))
    }

    async fn ping(&self) -> Result<(), StoreError> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::product::model::{ProductCategory, UnitOfMeasure};

    fn new_product(sku: &str) -> NewProduct {
        NewProduct {
            name: format!("Product {sku}"),
            category: ProductCategory::Finished,
            description: None,
            product_image: None,
            sku: sku.to_string(),
            unit_of_measure: UnitOfMeasure::Pack,
            lead_time: 3,
        }
    }

    #[tokio::test]
    async fn test_insert_assigns_increasing_ids() {
        let store = InMemoryProductStore::new();
        let now = Utc::now();

        let a = store.insert(new_product("A-1"), now).await.unwrap();
        let b = store.insert(new_product("B-1"), now).await.unwrap();

        assert_eq!(a.id, 1);
        assert_eq!(b.id, 2);
        assert_eq!(a.created_date, a.updated_date);
    }

    #[tokio::test]
    async fn test_insert_duplicate_sku() {
        let store = InMemoryProductStore::new();
        let now = Utc::now();

        store.insert(new_product("DUP"), now).await.unwrap();
        let err = store.insert(new_product("DUP"), now).await.unwrap_err();
        assert!(matches!(err, StoreError::DuplicateSku));

        // 失败的插入不消耗 id
        let next = store.insert(new_product("OTHER"), now).await.unwrap();
        assert_eq!(next.id, 2);
    }

    #[tokio::test]
    async fn test_list_offset_and_limit() {
        let store = InMemoryProductStore::new();
        let now = Utc::now();
        for i in 0..15 {
            store.insert(new_product(&format!("SKU-{i:02}")), now).await.unwrap();
        }

        let first = store.list(0, 10).await.unwrap();
        assert_eq!(first.len(), 10);
        assert_eq!(first[0].id, 1);

        let second = store.list(10, 10).await.unwrap();
        assert_eq!(second.len(), 5);
        assert_eq!(second[0].id, 11);

        assert!(store.list(20, 10).await.unwrap().is_empty());
        assert!(store.list(i64::MAX, 10).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_update_missing_row() {
        let store = InMemoryProductStore::new();
        let result = store
            .update(42, ProductChanges::default(), Utc::now())
            .await
            .unwrap();
        assert!(result.is_none());
    }

    #[tokio::test]
    async fn test_update_missing_row_with_taken_sku() {
        let store = InMemoryProductStore::new();
        store.insert(new_product("ONE"), Utc::now()).await.unwrap();

        let changes = ProductChanges {
            sku: Some("ONE".to_string()),
            ..Default::default()
        };
        let result = store.update(99, changes, Utc::now()).await.unwrap();
        assert!(result.is_none());
    }

    #[tokio::test]
    async fn test_update_sku_conflict() {
        let store = InMemoryProductStore::new();
        let now = Utc::now();
        store.insert(new_product("ONE"), now).await.unwrap();
        let two = store.insert(new_product("TWO"), now).await.unwrap();

        let changes = ProductChanges {
            sku: Some("ONE".to_string()),
            ..Default::default()
        };
        let err = store.update(two.id, changes, now).await.unwrap_err();
        assert!(matches!(err, StoreError::DuplicateSku));

        // 改成自己当前的 sku 不算冲突
        let changes = ProductChanges {
            sku: Some("TWO".to_string()),
            ..Default::default()
        };
        assert!(store.update(two.id, changes, now).await.unwrap().is_some());
    }
}
