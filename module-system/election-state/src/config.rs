//! Storage configuration.

use std::path::PathBuf;

/// Configuration of an on-disk storage.
#[derive(serde::Deserialize, serde::Serialize, Debug, Clone, PartialEq, Eq)]
pub struct StorageConfig {
    /// Path to folder where storage files will be stored
    pub path: PathBuf,
}
