//! Core types and traits for the snaplink URL shortener.
//!
//! This crate provides the shared domain types and the collaborator
//! contracts (durable repository, cache, event sink) consumed by the
//! resolution service.

pub mod cache;
pub mod error;
pub mod events;
pub mod repository;
pub mod shortcode;

pub use cache::UrlCache;
pub use error::{CacheError, CoreError, StorageError};
pub use events::{EventSink, NoopEventSink, ResolutionEvent};
pub use repository::{Mapping, Repository};
pub use shortcode::ShortCode;
