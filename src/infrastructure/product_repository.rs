//! 基于 PostgreSQL 的产品存储

use axum::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{postgres::PgPool, Postgres, QueryBuilder};

use crate::app::product::{
    model::{NewProduct, Product, ProductChanges},
    store::{ProductStore, StoreError},
};

const COLUMNS: &str = "id, name, category, description, product_image, sku, \
                       unit_of_measure, lead_time, created_date, updated_date";

#[derive(Clone)]
pub struct PgProductStore {
    pool: PgPool,
}

impl PgProductStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ProductStore for PgProductStore {
    async fn list(&self, offset: i64, limit: i64) -> Result<Vec<Product>, StoreError> {
        let products = sqlx::query_as::<_, Product>(&format!(
            "SELECT {COLUMNS} FROM products ORDER BY id LIMIT $1 OFFSET $2"
        ))
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.pool)
        .await?;

        Ok(products)
    }

    async fn get(&self, id: i64) -> Result<Option<Product>, StoreError> {
        let product =
            sqlx::query_as::<_, Product>(&format!("SELECT {COLUMNS} FROM products WHERE id = $1"))
                .bind(id)
                .fetch_optional(&self.pool)
                .await?;

        Ok(product)
    }

    async fn insert(
        &self,
        product: NewProduct,
        now: DateTime<Utc>,
    ) -> Result<Product, StoreError> {
        let product = sqlx::query_as::<_, Product>(&format!(
            "INSERT INTO products \
             (name, category, description, product_image, sku, unit_of_measure, lead_time, \
              created_date, updated_date) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $8) \
             RETURNING {COLUMNS}"
        ))
        .bind(product.name)
        .bind(product.category)
        .bind(product.description)
        .bind(product.product_image)
        .bind(product.sku)
        .bind(product.unit_of_measure)
        .bind(product.lead_time)
        .bind(now)
        .fetch_one(&self.pool)
        .await?;

        Ok(product)
    }

    async fn update(
        &self,
        id: i64,
        changes: ProductChanges,
        now: DateTime<Utc>,
    ) -> Result<Option<Product>, StoreError> {
        // 只更新出现的字段；updated_date 总是刷新
        let mut query: QueryBuilder<Postgres> = QueryBuilder::new("UPDATE products SET ");
        let mut set = query.separated(", ");
        set.push("updated_date = GREATEST(created_date, ")
            .push_bind_unseparated(now)
            .push_unseparated(")");

        if let Some(name) = changes.name {
            set.push("name = ").push_bind_unseparated(name);
        }
        if let Some(category) = changes.category {
            set.push("category = ").push_bind_unseparated(category);
        }
        if let Some(description) = changes.description {
            set.push("description = ").push_bind_unseparated(description);
        }
        if let Some(product_image) = changes.product_image {
            set.push("product_image = ").push_bind_unseparated(product_image);
        }
        if let Some(sku) = changes.sku {
            set.push("sku = ").push_bind_unseparated(sku);
        }
        if let Some(unit_of_measure) = changes.unit_of_measure {
            set.push("unit_of_measure = ").push_bind_unseparated(unit_of_measure);
        }
        if let Some(lead_time) = changes.lead_time {
            set.push("lead_time = ").push_bind_unseparated(lead_time);
        }

        query.push(" WHERE id = ").push_bind(id);
        query.push(format!(" RETURNING {COLUMNS}"));

        let product = query
            .build_query_as::<Product>()
            .fetch_optional(&self.pool)
            .await?;

        Ok(product)
    }

    async fn ping(&self) -> Result<(), StoreError> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }
}
