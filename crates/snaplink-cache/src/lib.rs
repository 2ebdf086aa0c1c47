//! Cache adapters for resolved short codes.

pub mod moka;
pub mod redis;

pub use crate::moka::{CacheConfig, MokaUrlCache};
pub use crate::redis::RedisUrlCache;
pub use snaplink_core::cache::{Result, UrlCache, DEFAULT_CACHE_TTL};
pub use snaplink_core::CacheError;
