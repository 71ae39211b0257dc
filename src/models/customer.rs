//! Customer profile records stored in the `CustomerProfiles` table.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A customer profile row in the entity store.
///
/// Records live under the fixed partition `"Customer"`; the row key is a
/// freshly generated id assigned at creation and never reused.
#[derive(Serialize, Deserialize, Clone, FromRow, Debug)]
#[serde(rename_all = "camelCase")]
pub struct CustomerProfile {
    /// Partition key, always `"Customer"`.
    pub partition_key: String,

    /// Generated row key, unique within the partition.
    pub row_key: String,

    /// Customer display name.
    pub name: String,

    /// Contact email address.
    pub email: String,

    /// Contact phone number.
    pub phone: String,

    /// Postal address.
    pub address: String,

    /// When this profile was created.
    pub created_at: DateTime<Utc>,
}

/// Attributes supplied by the caller when creating a profile.
#[derive(Deserialize, Clone, Debug)]
#[serde(rename_all = "camelCase")]
pub struct NewCustomer {
    pub name: String,
    pub email: String,
    #[serde(default)]
    pub phone: String,
    #[serde(default)]
    pub address: String,
}
