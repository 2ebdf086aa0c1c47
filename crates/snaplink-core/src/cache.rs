use crate::error::CacheError;
use crate::shortcode::ShortCode;
use async_trait::async_trait;
use std::time::Duration;

/// Result type for cache operations.
pub type Result<T> = std::result::Result<T, CacheError>;

/// Expiry applied to cached mappings.
pub const DEFAULT_CACHE_TTL: Duration = Duration::from_secs(24 * 60 * 60);

/// A read accelerator for resolved URLs.
///
/// The cache holds a non-authoritative, expiring copy of `code -> url`.
/// Entries must only ever be derived from durable reads or writes.
#[async_trait]
pub trait UrlCache: Send + Sync + 'static {
    /// Get the cached URL for a code.
    ///
    /// Returns `Ok(None)` on a miss (absent or expired). Transport failures
    /// are reported as `Err` and callers treat them like a miss.
    async fn get_url(&self, code: &ShortCode) -> Result<Option<String>>;

    /// Store the URL for a code, expiring after `ttl`.
    async fn set_url(&self, code: &ShortCode, original_url: &str, ttl: Duration) -> Result<()>;
}
