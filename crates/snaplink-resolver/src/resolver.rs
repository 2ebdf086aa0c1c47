use crate::Result;
use async_trait::async_trait;
use snaplink_core::Mapping;

/// The operations the resolution core exposes to its callers.
#[async_trait]
pub trait Resolver: Send + Sync + 'static {
    /// Creates a mapping for `original_url` under a freshly generated code.
    async fn shorten(&self, original_url: &str) -> Result<Mapping>;

    /// Returns the original URL behind `code`.
    async fn resolve(&self, code: &str) -> Result<String>;

    /// Lists every mapping, newest first.
    async fn list_all(&self) -> Result<Vec<Mapping>>;
}
