pub mod random;

pub use random::{RandomGenerator, ALPHABET, CODE_LENGTH};

use snaplink_core::ShortCode;

/// Trait for generating short codes.
///
/// Implementations are pure generators that don't interact with storage.
/// Uniqueness is enforced by the durable store; callers retry on conflict.
pub trait Generator: Send + Sync + 'static {
    /// Produces the next candidate short code. Generation cannot fail.
    fn generate(&self) -> ShortCode;
}
