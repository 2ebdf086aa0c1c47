//! Prometheus metrics for the gateway.
//!
//! Pipeline events arrive through the [`EventSink`] seam and land on one
//! counter each; handlers time themselves against a shared histogram.

use prometheus::{
    Encoder, HistogramOpts, HistogramTimer, HistogramVec, IntCounter, Opts, Registry, TextEncoder,
};
use snaplink_core::{EventSink, ResolutionEvent};

const NAMESPACE: &str = "snaplink";

/// Route label values used for request timing.
pub mod route {
    pub const SHORTEN: &str = "shorten";
    pub const REDIRECT: &str = "redirect";
}

/// Process-wide metrics registry fed by the resolution pipeline and the handlers.
#[derive(Clone)]
pub struct GatewayMetrics {
    registry: Registry,
    /// One counter per [`ResolutionEvent`], in declaration order.
    events: Vec<IntCounter>,
    /// Request latency by route.
    request_duration: HistogramVec,
}

impl GatewayMetrics {
    pub fn new() -> prometheus::Result<Self> {
        let registry = Registry::new();

        let mut events = Vec::with_capacity(ResolutionEvent::ALL.len());
        for event in ResolutionEvent::ALL {
            let counter = IntCounter::with_opts(
                Opts::new(event.name(), describe(event)).namespace(NAMESPACE),
            )?;
            registry.register(Box::new(counter.clone()))?;
            events.push(counter);
        }

        let request_duration = HistogramVec::new(
            HistogramOpts::new("http_request_duration_seconds", "Duration of HTTP requests")
                .namespace(NAMESPACE),
            &["route"],
        )?;
        registry.register(Box::new(request_duration.clone()))?;

        Ok(Self {
            registry,
            events,
            request_duration,
        })
    }

    pub fn get(&self, event: ResolutionEvent) -> u64 {
        self.events[event as usize].get()
    }

    /// Starts timing a request on `route`; the duration is observed when the timer drops.
    pub fn start_timer(&self, route: &str) -> HistogramTimer {
        self.request_duration
            .with_label_values(&[route])
            .start_timer()
    }

    /// Number of timed requests observed for `route`.
    pub fn request_count(&self, route: &str) -> u64 {
        self.request_duration
            .with_label_values(&[route])
            .get_sample_count()
    }

    /// Content type of [`render`](Self::render)'s output.
    pub fn content_type(&self) -> String {
        TextEncoder::new().format_type().to_string()
    }

    /// Encodes every registered metric in the Prometheus text format.
    pub fn render(&self) -> prometheus::Result<String> {
        let encoder = TextEncoder::new();
        let mut buffer = Vec::new();
        encoder.encode(&self.registry.gather(), &mut buffer)?;
        String::from_utf8(buffer).map_err(|e| prometheus::Error::Msg(e.to_string()))
    }
}

impl EventSink for GatewayMetrics {
    fn record(&self, event: ResolutionEvent) {
        self.events[event as usize].inc();
    }
}

fn describe(event: ResolutionEvent) -> &'static str {
    match event {
        ResolutionEvent::ShortenRequested => "Total number of URL shorten requests",
        ResolutionEvent::Shortened => "Total number of URLs shortened",
        ResolutionEvent::CodeCollision => "Total number of generated codes that were already taken",
        ResolutionEvent::ResolveRequested => "Total number of URL redirect requests",
        ResolutionEvent::CacheHit => "Total number of codes resolved from the cache",
        ResolutionEvent::CacheMiss => "Total number of cache misses",
        ResolutionEvent::CacheDegraded => "Total number of failed cache operations",
        ResolutionEvent::NotFound => "Total number of unknown codes requested",
    }
}
