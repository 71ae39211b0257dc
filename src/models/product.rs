//! Product records stored in the `ProductInformation` table.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A product row in the entity store, partition `"Product"`.
#[derive(Serialize, Deserialize, Clone, FromRow, Debug)]
#[serde(rename_all = "camelCase")]
pub struct ProductInfo {
    /// Partition key, always `"Product"`.
    pub partition_key: String,

    /// Generated row key, unique within the partition.
    pub row_key: String,

    /// Product display name.
    pub name: String,

    /// Free-text description.
    pub description: String,

    /// Unit price.
    pub price: f64,

    /// Units currently in stock.
    pub stock_quantity: i64,

    /// Product category label.
    pub category: String,

    /// When this product was created.
    pub created_at: DateTime<Utc>,
}

/// Attributes supplied by the caller when creating a product.
#[derive(Deserialize, Clone, Debug)]
#[serde(rename_all = "camelCase")]
pub struct NewProduct {
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub price: f64,
    #[serde(default)]
    pub stock_quantity: i64,
    #[serde(default)]
    pub category: String,
}
