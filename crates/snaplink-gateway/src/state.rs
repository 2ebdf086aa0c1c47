use std::sync::Arc;

use snaplink_resolver::Resolver;

use crate::metrics::GatewayMetrics;

#[derive(Clone)]
pub struct AppState {
    resolver: Arc<dyn Resolver>,
    base_url: String,
    metrics: Arc<GatewayMetrics>,
}

impl AppState {
    pub fn new(
        resolver: Arc<dyn Resolver>,
        public_base_url: impl Into<String>,
        metrics: Arc<GatewayMetrics>,
    ) -> Self {
        let base_url: String = public_base_url.into();
        Self {
            resolver,
            base_url: base_url.trim_end_matches('/').to_string(),
            metrics,
        }
    }

    pub fn resolver(&self) -> &dyn Resolver {
        self.resolver.as_ref()
    }

    /// Public base URL without a trailing slash.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn metrics(&self) -> &GatewayMetrics {
        &self.metrics
    }
}
