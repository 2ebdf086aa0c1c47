//! The short-code resolution pipeline.
//!
//! [`ResolutionService`] ties a [`Generator`](snaplink_generator::Generator),
//! a durable [`Repository`](snaplink_core::Repository) and a
//! [`UrlCache`](snaplink_core::UrlCache) together:
//!
//! - **Shorten**: generate a code, insert it durably (regenerating on
//!   collision, bounded), then populate the cache on a best-effort basis.
//! - **Resolve**: cache first, durable store on miss or cache failure, then
//!   repair the cache and record the access in the background.
//! - **List**: straight delegation to the durable store.
//!
//! # Example
//!
//! ```rust
//! use snaplink_cache::MokaUrlCache;
//! use snaplink_generator::RandomGenerator;
//! use snaplink_resolver::ResolutionService;
//! use snaplink_storage::InMemoryRepository;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let service = ResolutionService::new(
//!     InMemoryRepository::new(),
//!     MokaUrlCache::new(),
//!     RandomGenerator::new(),
//! );
//!
//! let mapping = service.shorten("https://example.com").await?;
//! assert_eq!(service.resolve(mapping.code.as_str()).await?, "https://example.com");
//! # Ok(())
//! # }
//! ```

pub mod access;
pub mod error;
pub mod resolver;
pub mod service;
pub mod settings;

#[cfg(test)]
mod testing;

pub use access::{AccessConfig, AccessRecorder};
pub use error::{ResolutionError, Result};
pub use resolver::Resolver;
pub use service::ResolutionService;
pub use settings::ResolverSettings;
