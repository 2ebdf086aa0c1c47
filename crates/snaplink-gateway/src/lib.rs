//! HTTP gateway for the snaplink URL shortener.
//!
//! Thin axum glue over a [`Resolver`](snaplink_resolver::Resolver): request
//! parsing, status mapping and the Prometheus registry behind `/metrics`.

pub mod app;
pub mod error;
pub mod handlers;
pub mod metrics;
pub mod model;
pub mod state;

pub use app::App;
pub use metrics::GatewayMetrics;
pub use state::AppState;
