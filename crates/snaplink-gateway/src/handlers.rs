mod health;
mod metrics;
mod url;

pub use health::health_handler;
pub use metrics::metrics_handler;
pub use url::{list_urls_handler, redirect_handler, shorten_handler};
