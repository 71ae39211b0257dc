//! Listings for the `contracts` file share.

use serde::{Deserialize, Serialize};

/// One file in the share's single-level directory. Derived from filesystem
/// metadata on demand; there is no database record behind it.
#[derive(Serialize, Deserialize, Clone, Debug)]
#[serde(rename_all = "camelCase")]
pub struct ShareFileInfo {
    /// Stored file name (`<stem>_<suffix><ext>`).
    pub name: String,

    /// Size in bytes.
    pub size_bytes: u64,
}
