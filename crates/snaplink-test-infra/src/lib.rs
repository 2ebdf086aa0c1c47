//! Disposable backing services for integration tests.
//!
//! Each server owns its container; dropping the server stops it.

pub mod error;
pub mod mysql;
pub mod redis;

pub use error::{Result, TestInfraError};

/// Docker reports `localhost`, which may resolve to `::1` while ports are
/// only published on IPv4.
pub(crate) fn ipv4_host(host: String) -> String {
    if host == "localhost" {
        String::from("127.0.0.1")
    } else {
        host
    }
}
