//! 产品数据模型

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use std::borrow::Cow;
use url::Url;
use validator::{Validate, ValidationError};

/// 每页返回的产品数量
pub const PAGE_SIZE: i64 = 10;

/// 计算某一页的偏移量，页码从 1 开始
pub fn page_offset(page: i64) -> i64 {
    (page - 1).saturating_mul(PAGE_SIZE)
}

/// 只接受 http/https 地址
fn web_url(value: &str) -> Result<(), ValidationError> {
    match Url::parse(value) {
        Ok(url) if matches!(url.scheme(), "http" | "https") && url.has_host() => Ok(()),
        _ => {
            let mut err = ValidationError::new("url");
            err.message = Some(Cow::from("product_image must be a valid http(s) URL"));
            Err(err)
        }
    }
}

/// 产品类别
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "database", derive(sqlx::Type))]
#[cfg_attr(feature = "database", sqlx(type_name = "text", rename_all = "kebab-case"))]
#[serde(rename_all = "kebab-case")]
pub enum ProductCategory {
    Finished,
    SemiFinished,
    Raw,
}

/// 计量单位
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "database", derive(sqlx::Type))]
#[cfg_attr(feature = "database", sqlx(type_name = "text", rename_all = "lowercase"))]
#[serde(rename_all = "lowercase")]
pub enum UnitOfMeasure {
    Mtr,
    Mm,
    Ltr,
    Ml,
    Cm,
    Mg,
    Gm,
    Unit,
    Pack,
}

/// 已持久化的产品
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "database", derive(sqlx::FromRow))]
pub struct Product {
    pub id: i64,
    pub name: String,
    pub category: ProductCategory,
    pub description: Option<String>,
    pub product_image: Option<String>,
    pub sku: String,
    pub unit_of_measure: UnitOfMeasure,
    pub lead_time: i32,
    pub created_date: DateTime<Utc>,
    pub updated_date: DateTime<Utc>,
}

/// 创建产品请求
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct NewProduct {
    #[validate(length(min = 2, max = 100, message = "name must be between 2 and 100 characters"))]
    pub name: String,

    pub category: ProductCategory,

    #[validate(length(max = 250, message = "description must be at most 250 characters"))]
    pub description: Option<String>,

    #[validate(
        custom(function = "web_url"),
        length(max = 500, message = "product_image must be at most 500 characters")
    )]
    pub product_image: Option<String>,

    #[validate(length(min = 2, max = 100, message = "sku must be between 2 and 100 characters"))]
    pub sku: String,

    pub unit_of_measure: UnitOfMeasure,

    #[validate(range(min = 0, max = 999, message = "lead_time must be between 0 and 999"))]
    pub lead_time: i32,
}

impl NewProduct {
    /// 以给定的 id 和时间戳构造产品记录
    pub fn into_product(self, id: i64, now: DateTime<Utc>) -> Product {
        Product {
            id,
            name: self.name,
            category: self.category,
            description: self.description,
            product_image: self.product_image,
            sku: self.sku,
            unit_of_measure: self.unit_of_measure,
            lead_time: self.lead_time,
            created_date: now,
            updated_date: now,
        }
    }
}

/// 部分更新请求
///
/// 字段缺省表示保持原值。`description` 和 `product_image` 可以显式传 `null` 清空。
#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct ProductChanges {
    #[serde(default)]
    #[validate(length(min = 2, max = 100, message = "name must be between 2 and 100 characters"))]
    pub name: Option<String>,

    #[serde(default)]
    pub category: Option<ProductCategory>,

    #[serde(default, deserialize_with = "present")]
    #[validate(length(max = 250, message = "description must be at most 250 characters"))]
    pub description: Option<Option<String>>,

    #[serde(default, deserialize_with = "present")]
    #[validate(
        custom(function = "web_url"),
        length(max = 500, message = "product_image must be at most 500 characters")
    )]
    pub product_image: Option<Option<String>>,

    #[serde(default)]
    #[validate(length(min = 2, max = 100, message = "sku must be between 2 and 100 characters"))]
    pub sku: Option<String>,

    #[serde(default)]
    pub unit_of_measure: Option<UnitOfMeasure>,

    #[serde(default)]
    #[validate(range(min = 0, max = 999, message = "lead_time must be between 0 and 999"))]
    pub lead_time: Option<i32>,
}

/// 字段出现即为 `Some`，即使值为 `null`
fn present<'de, T, D>(deserializer: D) -> Result<Option<T>, D::Error>
where
    T: Deserialize<'de>,
    D: Deserializer<'de>,
{
    T::deserialize(deserializer).map(Some)
}

impl ProductChanges {
    pub fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.category.is_none()
            && self.description.is_none()
            && self.product_image.is_none()
            && self.sku.is_none()
            && self.unit_of_measure.is_none()
            && self.lead_time.is_none()
    }

    /// 将已提供的字段合并到产品上，并刷新 `updated_date`
    pub fn apply(self, product: &mut Product, now: DateTime<Utc>) {
        if let Some(name) = self.name {
            product.name = name;
        }
        if let Some(category) = self.category {
            product.category = category;
        }
        if let Some(description) = self.description {
            product.description = description;
        }
        if let Some(product_image) = self.product_image {
            product.product_image = product_image;
        }
        if let Some(sku) = self.sku {
            product.sku = sku;
        }
        if let Some(unit_of_measure) = self.unit_of_measure {
            product.unit_of_measure = unit_of_measure;
        }
        if let Some(lead_time) = self.lead_time {
            product.lead_time = lead_time;
        }
        product.updated_date = now.max(product.created_date);
    }
}

/// 列表查询参数
#[derive(Debug, Clone, Deserialize)]
pub struct ListQuery {
    #[serde(default = "first_page")]
    pub page: i64,
}

fn first_page() -> i64 {
    1
}

impl Default for ListQuery {
    fn default() -> Self {
        Self { page: first_page() }
    }
}

/// 路径中的产品 id
#[derive(Debug, Clone, Copy, Deserialize)]
pub struct ProductPath {
    pub id: i64,
}
