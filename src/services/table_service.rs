//! TableService — entity store gateway over the two partitioned tables,
//! `CustomerProfiles` and `ProductInformation`. Partition keys are fixed
//! constants; row keys are generated at insert and never reused. Backed by
//! SQLite for durable metadata.

use crate::errors::{StorageError, StorageResult};
use crate::models::{
    customer::{CustomerProfile, NewCustomer},
    product::{NewProduct, ProductInfo},
};
use chrono::Utc;
use sqlx::SqlitePool;
use std::sync::Arc;
use tracing::debug;
use uuid::Uuid;

/// Partition key for all customer rows.
pub const CUSTOMER_PARTITION: &str = "Customer";
/// Partition key for all product rows.
pub const PRODUCT_PARTITION: &str = "Product";

/// TableService provides the entity store operations:
/// - Insert (fresh row key, fixed partition)
/// - Point lookup by row key (`None` when absent, not an error)
/// - Full-partition scan in store-native order
/// - Idempotent delete
#[derive(Clone)]
pub struct TableService {
    db: Arc<SqlitePool>,
}

impl TableService {
    pub fn new(db: Arc<SqlitePool>) -> Self {
        Self { db }
    }

    /// Insert a customer profile with a freshly generated row key.
    ///
    /// A row-key collision surfaces as EntityConflict; with random keys it is
    /// practically unreachable.
    pub async fn add_customer(&self, new: NewCustomer) -> StorageResult<CustomerProfile> {
        let customer = CustomerProfile {
            partition_key: CUSTOMER_PARTITION.to_string(),
            row_key: Uuid::new_v4().to_string(),
            name: new.name,
            email: new.email,
            phone: new.phone,
            address: new.address,
            created_at: Utc::now(),
        };

        sqlx::query(
            "INSERT INTO customer_profiles
                 (partition_key, row_key, name, email, phone, address, created_at)
             VALUES (?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(&customer.partition_key)
        .bind(&customer.row_key)
        .bind(&customer.name)
        .bind(&customer.email)
        .bind(&customer.phone)
        .bind(&customer.address)
        .bind(customer.created_at)
        .execute(&*self.db)
        .await
        .map_err(|err| self.map_insert_err(err, CUSTOMER_PARTITION, &customer.row_key))?;

        debug!("customer {} added", customer.row_key);
        Ok(customer)
    }

    /// Point lookup of a customer profile. Absence is `None`, not an error.
    pub async fn get_customer(&self, row_key: &str) -> StorageResult<Option<CustomerProfile>> {
        let customer = sqlx::query_as::<_, CustomerProfile>(
            "SELECT partition_key, row_key, name, email, phone, address, created_at
             FROM customer_profiles WHERE partition_key = ? AND row_key = ?",
        )
        .bind(CUSTOMER_PARTITION)
        .bind(row_key)
        .fetch_optional(&*self.db)
        .await?;
        Ok(customer)
    }

    /// Full scan of the customer partition, store-native order.
    pub async fn list_customers(&self) -> StorageResult<Vec<CustomerProfile>> {
        let customers = sqlx::query_as::<_, CustomerProfile>(
            "SELECT partition_key, row_key, name, email, phone, address, created_at
             FROM customer_profiles WHERE partition_key = ?",
        )
        .bind(CUSTOMER_PARTITION)
        .fetch_all(&*self.db)
        .await?;
        Ok(customers)
    }

    /// Delete a customer row. Idempotent: deleting an absent row succeeds.
    pub async fn delete_customer(&self, row_key: &str) -> StorageResult<()> {
        let result =
            sqlx::query("DELETE FROM customer_profiles WHERE partition_key = ? AND row_key = ?")
                .bind(CUSTOMER_PARTITION)
                .bind(row_key)
                .execute(&*self.db)
                .await?;
        if result.rows_affected() == 0 {
            debug!("customer {} already absent on delete", row_key);
        }
        Ok(())
    }

    /// Insert a product with a freshly generated row key.
    pub async fn add_product(&self, new: NewProduct) -> StorageResult<ProductInfo> {
        let product = ProductInfo {
            partition_key: PRODUCT_PARTITION.to_string(),
            row_key: Uuid::new_v4().to_string(),
            name: new.name,
            description: new.description,
            price: new.price,
            stock_quantity: new.stock_quantity,
            category: new.category,
            created_at: Utc::now(),
        };

        sqlx::query(
            "INSERT INTO product_information
                 (partition_key, row_key, name, description, price, stock_quantity,
                  category, created_at)
             VALUES (?, ?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(&product.partition_key)
        .bind(&product.row_key)
        .bind(&product.name)
        .bind(&product.description)
        .bind(product.price)
        .bind(product.stock_quantity)
        .bind(&product.category)
        .bind(product.created_at)
        .execute(&*self.db)
        .await
        .map_err(|err| self.map_insert_err(err, PRODUCT_PARTITION, &product.row_key))?;

        debug!("product {} added", product.row_key);
        Ok(product)
    }

    /// Point lookup of a product. Absence is `None`, not an error.
    pub async fn get_product(&self, row_key: &str) -> StorageResult<Option<ProductInfo>> {
        let product = sqlx::query_as::<_, ProductInfo>(
            "SELECT partition_key, row_key, name, description, price, stock_quantity,
                    category, created_at
             FROM product_information WHERE partition_key = ? AND row_key = ?",
        )
        .bind(PRODUCT_PARTITION)
        .bind(row_key)
        .fetch_optional(&*self.db)
        .await?;
        Ok(product)
    }

    /// Full scan of the product partition, store-native order.
    pub async fn list_products(&self) -> StorageResult<Vec<ProductInfo>> {
        let products = sqlx::query_as::<_, ProductInfo>(
            "SELECT partition_key, row_key, name, description, price, stock_quantity,
                    category, created_at
             FROM product_information WHERE partition_key = ?",
        )
        .bind(PRODUCT_PARTITION)
        .fetch_all(&*self.db)
        .await?;
        Ok(products)
    }

    /// Delete a product row. Idempotent.
    pub async fn delete_product(&self, row_key: &str) -> StorageResult<()> {
        let result =
            sqlx::query("DELETE FROM product_information WHERE partition_key = ? AND row_key = ?")
                .bind(PRODUCT_PARTITION)
                .bind(row_key)
                .execute(&*self.db)
                .await?;
        if result.rows_affected() == 0 {
            debug!("product {} already absent on delete", row_key);
        }
        Ok(())
    }

    fn map_insert_err(&self, err: sqlx::Error, partition: &str, row: &str) -> StorageError {
        if super::is_unique_violation(&err) {
            StorageError::EntityConflict {
                partition: partition.to_string(),
                row: row.to_string(),
            }
        } else {
            StorageError::Sqlx(err)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::test_pool;

    fn sample_customer() -> NewCustomer {
        NewCustomer {
            name: "Alice".into(),
            email: "a@x.com".into(),
            phone: "555-0100".into(),
            address: "1 Main St".into(),
        }
    }

    #[tokio::test]
    async fn customer_roundtrip() {
        let service = TableService::new(test_pool().await);

        let created = service.add_customer(sample_customer()).await.unwrap();
        assert_eq!(created.partition_key, CUSTOMER_PARTITION);
        assert!(!created.row_key.is_empty());

        let fetched = service.get_customer(&created.row_key).await.unwrap();
        let fetched = fetched.expect("customer should exist");
        assert_eq!(fetched.name, "Alice");
        assert_eq!(fetched.email, "a@x.com");

        let all = service.list_customers().await.unwrap();
        assert!(all.iter().any(|c| c.row_key == created.row_key));
    }

    #[tokio::test]
    async fn list_includes_all_inserted_rows() {
        let service = TableService::new(test_pool().await);

        let mut keys = Vec::new();
        for i in 0..5 {
            let mut new = sample_customer();
            new.name = format!("Customer {i}");
            keys.push(service.add_customer(new).await.unwrap().row_key);
        }

        let all = service.list_customers().await.unwrap();
        assert!(all.len() >= 5);
        for key in keys {
            assert!(all.iter().any(|c| c.row_key == key));
        }
    }

    #[tokio::test]
    async fn delete_makes_lookup_return_none_and_is_idempotent() {
        let service = TableService::new(test_pool().await);

        let created = service.add_customer(sample_customer()).await.unwrap();
        service.delete_customer(&created.row_key).await.unwrap();

        assert!(
            service
                .get_customer(&created.row_key)
                .await
                .unwrap()
                .is_none()
        );
        // Second delete of the same row is a silent success.
        service.delete_customer(&created.row_key).await.unwrap();
    }

    #[tokio::test]
    async fn product_roundtrip() {
        let service = TableService::new(test_pool().await);

        let created = service
            .add_product(NewProduct {
                name: "Widget".into(),
                description: "A widget".into(),
                price: 9.99,
                stock_quantity: 42,
                category: "gadgets".into(),
            })
            .await
            .unwrap();
        assert_eq!(created.partition_key, PRODUCT_PARTITION);

        let fetched = service.get_product(&created.row_key).await.unwrap().unwrap();
        assert_eq!(fetched.stock_quantity, 42);
        assert_eq!(fetched.price, 9.99);

        service.delete_product(&created.row_key).await.unwrap();
        assert!(service.get_product(&created.row_key).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn missing_lookup_is_none_not_error() {
        let service = TableService::new(test_pool().await);
        assert!(service.get_customer("no-such-row").await.unwrap().is_none());
        assert!(service.get_product("no-such-row").await.unwrap().is_none());
    }
}
