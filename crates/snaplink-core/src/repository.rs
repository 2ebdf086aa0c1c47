use crate::error::StorageError;
use crate::shortcode::ShortCode;
use async_trait::async_trait;
use jiff::Timestamp;
use serde::{Deserialize, Serialize};

/// Result type for repository operations.
pub type Result<T> = std::result::Result<T, StorageError>;

/// A durable mapping from a short code to the original URL.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Mapping {
    /// The short code assigned to this mapping.
    pub code: ShortCode,
    /// The original URL that was shortened.
    pub original_url: String,
    /// When the durable store accepted the mapping.
    pub created_at: Timestamp,
    /// Advisory count of successful resolutions.
    pub access_count: u64,
}

/// The system of record for URL mappings.
///
/// Implementations must be safe for concurrent use and must enforce code
/// uniqueness atomically: a single `create` either fully succeeds or fails
/// with [`StorageError::Conflict`].
#[async_trait]
pub trait Repository: Send + Sync + 'static {
    /// Inserts a new mapping and returns it with the store-assigned creation time.
    ///
    /// Returns `Err(Conflict)` if the code already exists.
    async fn create(&self, code: &ShortCode, original_url: &str) -> Result<Mapping>;

    /// Returns the original URL for an existing code.
    ///
    /// Returns `Err(NotFound)` if the code does not exist.
    async fn get_by_code(&self, code: &ShortCode) -> Result<String>;

    /// Lists every mapping, newest first.
    async fn list_all(&self) -> Result<Vec<Mapping>>;

    /// Adds `by` to the advisory access counter of a mapping.
    ///
    /// Unknown codes are ignored.
    async fn increment_access(&self, code: &ShortCode, by: u64) -> Result<()>;
}
