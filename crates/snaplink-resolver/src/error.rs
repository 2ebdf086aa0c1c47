use snaplink_core::StorageError;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, ResolutionError>;

/// Failures surfaced by the resolution pipeline.
///
/// Cache failures never appear here: they are logged and bypassed.
#[derive(Debug, Clone, Error)]
pub enum ResolutionError {
    #[error("invalid url: {0}")]
    InvalidUrl(String),
    #[error("short code not found: {0}")]
    NotFound(String),
    #[error("could not allocate a unique short code after {attempts} attempts")]
    CollisionExhausted { attempts: u32 },
    #[error("durable store unavailable")]
    StoreUnavailable(#[source] StorageError),
}

impl ResolutionError {
    /// Returns `true` for failures the caller caused, as opposed to server-side faults.
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            ResolutionError::InvalidUrl(_) | ResolutionError::NotFound(_)
        )
    }
}
