//! Durable store adapters for URL mappings.

pub mod memory;
pub mod mysql;

pub use memory::InMemoryRepository;
pub use mysql::MySqlRepository;
pub use snaplink_core::repository::{Mapping, Repository, Result};
pub use snaplink_core::StorageError;
