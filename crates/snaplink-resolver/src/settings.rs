use snaplink_core::cache::DEFAULT_CACHE_TTL;
use std::time::Duration;
use typed_builder::TypedBuilder;

pub const DEFAULT_MAX_ATTEMPTS: u32 = 5;
pub const DEFAULT_STORE_TIMEOUT: Duration = Duration::from_secs(5);
pub const DEFAULT_CACHE_TIMEOUT: Duration = Duration::from_secs(5);

/// Tunables of the [`ResolutionService`](crate::ResolutionService).
#[derive(Debug, Clone, TypedBuilder)]
pub struct ResolverSettings {
    /// Total number of codes tried by one shorten call before giving up. At least 1.
    #[builder(default = DEFAULT_MAX_ATTEMPTS)]
    pub max_attempts: u32,
    /// Deadline for every durable store call.
    #[builder(default = DEFAULT_STORE_TIMEOUT)]
    pub store_timeout: Duration,
    /// Deadline for every cache call.
    #[builder(default = DEFAULT_CACHE_TIMEOUT)]
    pub cache_timeout: Duration,
    /// Expiry of cache entries written by the service.
    #[builder(default = DEFAULT_CACHE_TTL)]
    pub cache_ttl: Duration,
}

impl Default for ResolverSettings {
    fn default() -> Self {
        Self::builder().build()
    }
}
