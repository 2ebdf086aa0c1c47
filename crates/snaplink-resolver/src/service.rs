use crate::access::{AccessConfig, AccessRecorder};
use crate::error::{ResolutionError, Result};
use crate::resolver::Resolver;
use crate::settings::ResolverSettings;
use async_trait::async_trait;
use snaplink_core::{
    CacheError, EventSink, Mapping, NoopEventSink, Repository, ResolutionEvent, ShortCode,
    StorageError, UrlCache,
};
use snaplink_generator::Generator;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tracing::{debug, error, trace, warn};

/// Cache-aside resolution over a durable repository.
///
/// The durable store is the system of record; the cache only ever holds
/// copies of what the store returned or accepted. Cache failures are logged,
/// reported to the event sink as [`ResolutionEvent::CacheDegraded`] and then
/// bypassed. Every collaborator call runs under the deadline configured in
/// [`ResolverSettings`].
pub struct ResolutionService<R, C, G> {
    repository: Arc<R>,
    cache: Arc<C>,
    generator: Arc<G>,
    events: Arc<dyn EventSink>,
    access: Option<AccessRecorder>,
    settings: ResolverSettings,
}

impl<R, C, G> Clone for ResolutionService<R, C, G> {
    fn clone(&self) -> Self {
        Self {
            repository: Arc::clone(&self.repository),
            cache: Arc::clone(&self.cache),
            generator: Arc::clone(&self.generator),
            events: Arc::clone(&self.events),
            access: self.access.clone(),
            settings: self.settings.clone(),
        }
    }
}

impl<R, C, G> ResolutionService<R, C, G>
where
    R: Repository,
    C: UrlCache,
    G: Generator,
{
    /// Creates a service with default settings, no event sink and no access tracking.
    pub fn new(repository: R, cache: C, generator: G) -> Self {
        Self {
            repository: Arc::new(repository),
            cache: Arc::new(cache),
            generator: Arc::new(generator),
            events: Arc::new(NoopEventSink),
            access: None,
            settings: ResolverSettings::default(),
        }
    }

    pub fn with_settings(mut self, settings: ResolverSettings) -> Self {
        self.settings = settings;
        self
    }

    pub fn with_event_sink(mut self, events: Arc<dyn EventSink>) -> Self {
        self.events = events;
        self
    }

    /// Starts the background access-count worker.
    ///
    /// The worker runs until every clone of the returned service is dropped;
    /// await the handle afterwards to let it drain. Must be called inside a
    /// Tokio runtime.
    pub fn with_access_tracking(mut self, config: AccessConfig) -> (Self, JoinHandle<()>) {
        let (recorder, handle) = AccessRecorder::spawn(Arc::clone(&self.repository), config);
        self.access = Some(recorder);
        (self, handle)
    }

    pub fn repository(&self) -> &R {
        &self.repository
    }

    pub fn cache(&self) -> &C {
        &self.cache
    }

    pub fn settings(&self) -> &ResolverSettings {
        &self.settings
    }

    /// Creates a mapping for `original_url` under a freshly generated code.
    ///
    /// Codes are regenerated on collision up to `max_attempts` times in total.
    /// The cache is populated only after the durable write succeeded, and a
    /// failure to do so does not fail the call.
    pub async fn shorten(&self, original_url: &str) -> Result<Mapping> {
        self.events.record(ResolutionEvent::ShortenRequested);

        if original_url.is_empty() {
            return Err(ResolutionError::InvalidUrl(
                "URL cannot be empty".to_string(),
            ));
        }

        let mapping = self.create_with_retry(original_url).await?;
        self.populate_cache(&mapping.code, &mapping.original_url).await;

        debug!(code = %mapping.code, url = %mapping.original_url, "Shortened URL");
        self.events.record(ResolutionEvent::Shortened);
        Ok(mapping)
    }

    /// Resolves `code` to its original URL, consulting the cache first.
    pub async fn resolve(&self, code: &str) -> Result<String> {
        self.events.record(ResolutionEvent::ResolveRequested);
        trace!(code = %code, "resolving short code");

        // Nothing that fails validation can have been stored.
        let Ok(code) = ShortCode::new(code) else {
            debug!(code = %code, "Malformed short code");
            self.events.record(ResolutionEvent::NotFound);
            return Err(ResolutionError::NotFound(code.to_string()));
        };

        match self.cache_call(self.cache.get_url(&code)).await {
            Ok(Some(url)) => {
                debug!(code = %code, "Resolved from cache");
                self.events.record(ResolutionEvent::CacheHit);
                self.track_access(&code);
                return Ok(url);
            }
            Ok(None) => {
                trace!(code = %code, "Cache miss");
                self.events.record(ResolutionEvent::CacheMiss);
            }
            Err(e) => {
                warn!(code = %code, error = %e, "Cache read failed, falling back to store");
                self.events.record(ResolutionEvent::CacheDegraded);
            }
        }

        match self.store_call(self.repository.get_by_code(&code)).await {
            Ok(url) => {
                debug!(code = %code, url = %url, "Resolved from store");
                self.populate_cache(&code, &url).await;
                self.track_access(&code);
                Ok(url)
            }
            Err(e) if e.is_not_found() => {
                trace!(code = %code, "Short code not found");
                self.events.record(ResolutionEvent::NotFound);
                Err(ResolutionError::NotFound(code.to_string()))
            }
            Err(e) => {
                error!(code = %code, error = %e, "Failed to read mapping from store");
                Err(ResolutionError::StoreUnavailable(e))
            }
        }
    }

    /// Lists every mapping, newest first. Never cached.
    pub async fn list_all(&self) -> Result<Vec<Mapping>> {
        self.store_call(self.repository.list_all())
            .await
            .map_err(|e| {
                error!(error = %e, "Failed to list mappings");
                ResolutionError::StoreUnavailable(e)
            })
    }

    async fn create_with_retry(&self, original_url: &str) -> Result<Mapping> {
        let attempts = self.settings.max_attempts.max(1);

        for attempt in 1..=attempts {
            let code = self.generator.generate();
            match self
                .store_call(self.repository.create(&code, original_url))
                .await
            {
                Ok(mapping) => return Ok(mapping),
                Err(e) if e.is_conflict() => {
                    debug!(code = %code, attempt, "Short code collision, regenerating");
                    self.events.record(ResolutionEvent::CodeCollision);
                }
                Err(e) => {
                    error!(code = %code, error = %e, "Failed to store mapping");
                    return Err(ResolutionError::StoreUnavailable(e));
                }
            }
        }

        warn!(attempts, "Exhausted short code attempts");
        Err(ResolutionError::CollisionExhausted { attempts })
    }

    async fn populate_cache(&self, code: &ShortCode, original_url: &str) {
        let ttl = self.settings.cache_ttl;
        if let Err(e) = self
            .cache_call(self.cache.set_url(code, original_url, ttl))
            .await
        {
            warn!(code = %code, error = %e, "Failed to populate cache");
            self.events.record(ResolutionEvent::CacheDegraded);
        }
    }

    fn track_access(&self, code: &ShortCode) {
        if let Some(access) = &self.access {
            access.record(code);
        }
    }

    async fn store_call<T>(
        &self,
        fut: impl Future<Output = std::result::Result<T, StorageError>>,
    ) -> std::result::Result<T, StorageError> {
        let deadline = self.settings.store_timeout;
        tokio::time::timeout(deadline, fut)
            .await
            .unwrap_or_else(|_| Err(StorageError::Timeout(elapsed(deadline))))
    }

    async fn cache_call<T>(
        &self,
        fut: impl Future<Output = std::result::Result<T, CacheError>>,
    ) -> std::result::Result<T, CacheError> {
        let deadline = self.settings.cache_timeout;
        tokio::time::timeout(deadline, fut)
            .await
            .unwrap_or_else(|_| Err(CacheError::Timeout(elapsed(deadline))))
    }
}

fn elapsed(deadline: Duration) -> String {
    format!("no response within {}ms", deadline.as_millis())
}

#[async_trait]
impl<R, C, G> Resolver for ResolutionService<R, C, G>
where
    R: Repository,
    C: UrlCache,
    G: Generator,
{
    async fn shorten(&self, original_url: &str) -> Result<Mapping> {
        ResolutionService::shorten(self, original_url).await
    }

    async fn resolve(&self, code: &str) -> Result<String> {
        ResolutionService::resolve(self, code).await
    }

    async fn list_all(&self) -> Result<Vec<Mapping>> {
        ResolutionService::list_all(self).await
    }
}
