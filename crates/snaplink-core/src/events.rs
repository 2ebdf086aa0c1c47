use std::fmt::Display;

/// Notable events emitted by the resolution pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResolutionEvent {
    ShortenRequested,
    Shortened,
    CodeCollision,
    ResolveRequested,
    CacheHit,
    CacheMiss,
    CacheDegraded,
    NotFound,
}

impl ResolutionEvent {
    pub const ALL: [ResolutionEvent; 8] = [
        ResolutionEvent::ShortenRequested,
        ResolutionEvent::Shortened,
        ResolutionEvent::CodeCollision,
        ResolutionEvent::ResolveRequested,
        ResolutionEvent::CacheHit,
        ResolutionEvent::CacheMiss,
        ResolutionEvent::CacheDegraded,
        ResolutionEvent::NotFound,
    ];

    /// Stable metric-style name of the event.
    pub fn name(&self) -> &'static str {
        match self {
            ResolutionEvent::ShortenRequested => "shorten_requests_total",
            ResolutionEvent::Shortened => "shortened_total",
            ResolutionEvent::CodeCollision => "code_collisions_total",
            ResolutionEvent::ResolveRequested => "resolve_requests_total",
            ResolutionEvent::CacheHit => "cache_hits_total",
            ResolutionEvent::CacheMiss => "cache_misses_total",
            ResolutionEvent::CacheDegraded => "cache_degraded_total",
            ResolutionEvent::NotFound => "not_found_total",
        }
    }
}

impl Display for ResolutionEvent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Receives pipeline events, e.g. to feed process-wide counters.
///
/// Implementations must be cheap and must not block.
pub trait EventSink: Send + Sync + 'static {
    fn record(&self, event: ResolutionEvent);
}

/// An [`EventSink`] that discards every event.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopEventSink;

impl EventSink for NoopEventSink {
    fn record(&self, _event: ResolutionEvent) {}
}
