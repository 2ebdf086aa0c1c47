//! Scripted collaborators for exercising the service's failure paths.

use async_trait::async_trait;
use snaplink_cache::MokaUrlCache;
use snaplink_core::{
    CacheError, EventSink, Mapping, Repository, ResolutionEvent, ShortCode, StorageError, UrlCache,
};
use snaplink_generator::{Generator, RandomGenerator};
use snaplink_storage::InMemoryRepository;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Mutex;
use std::time::Duration;

/// An [`InMemoryRepository`] that can be slowed down or made to fail, and counts its calls.
#[derive(Debug, Default)]
pub struct ScriptedRepository {
    inner: InMemoryRepository,
    fail_all: bool,
    fail_increments: bool,
    delay: Option<Duration>,
    calls: AtomicU64,
    create_calls: AtomicU64,
    increment_calls: AtomicU64,
    incremented: AtomicU64,
}

impl ScriptedRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every call fails with `Unavailable`.
    pub fn failing(mut self) -> Self {
        self.fail_all = true;
        self
    }

    /// Only `increment_access` fails.
    pub fn failing_increments(mut self) -> Self {
        self.fail_increments = true;
        self
    }

    /// Every call sleeps for `delay` before doing anything.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    pub fn calls(&self) -> u64 {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn create_calls(&self) -> u64 {
        self.create_calls.load(Ordering::SeqCst)
    }

    pub fn increment_calls(&self) -> u64 {
        self.increment_calls.load(Ordering::SeqCst)
    }

    /// Sum of every increment that was applied.
    pub fn incremented(&self) -> u64 {
        self.incremented.load(Ordering::SeqCst)
    }

    async fn enter(&self) -> Result<(), StorageError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        if self.fail_all {
            return Err(StorageError::Unavailable("scripted outage".into()));
        }
        Ok(())
    }
}

#[async_trait]
impl Repository for ScriptedRepository {
    async fn create(&self, code: &ShortCode, original_url: &str) -> Result<Mapping, StorageError> {
        self.create_calls.fetch_add(1, Ordering::SeqCst);
        self.enter().await?;
        self.inner.create(code, original_url).await
    }

    async fn get_by_code(&self, code: &ShortCode) -> Result<String, StorageError> {
        self.enter().await?;
        self.inner.get_by_code(code).await
    }

    async fn list_all(&self) -> Result<Vec<Mapping>, StorageError> {
        self.enter().await?;
        self.inner.list_all().await
    }

    async fn increment_access(&self, code: &ShortCode, by: u64) -> Result<(), StorageError> {
        self.increment_calls.fetch_add(1, Ordering::SeqCst);
        self.enter().await?;
        if self.fail_increments {
            return Err(StorageError::Unavailable("scripted outage".into()));
        }
        self.inner.increment_access(code, by).await?;
        self.incremented.fetch_add(by, Ordering::SeqCst);
        Ok(())
    }
}

/// A [`MokaUrlCache`] that can be slowed down or made to fail, and counts its calls.
#[derive(Debug, Default)]
pub struct ScriptedCache {
    inner: MokaUrlCache,
    fail_all: bool,
    delay: Option<Duration>,
    gets: AtomicU64,
    sets: AtomicU64,
    last_ttl: Mutex<Option<Duration>>,
}

impl ScriptedCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing(mut self) -> Self {
        self.fail_all = true;
        self
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    pub fn gets(&self) -> u64 {
        self.gets.load(Ordering::SeqCst)
    }

    pub fn sets(&self) -> u64 {
        self.sets.load(Ordering::SeqCst)
    }

    /// TTL passed to the most recent `set_url`, successful or not.
    pub fn last_ttl(&self) -> Option<Duration> {
        *self.last_ttl.lock().unwrap()
    }

    async fn enter(&self) -> Result<(), CacheError> {
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        if self.fail_all {
            return Err(CacheError::Unavailable("scripted outage".into()));
        }
        Ok(())
    }
}

#[async_trait]
impl UrlCache for ScriptedCache {
    async fn get_url(&self, code: &ShortCode) -> Result<Option<String>, CacheError> {
        self.gets.fetch_add(1, Ordering::SeqCst);
        self.enter().await?;
        self.inner.get_url(code).await
    }

    async fn set_url(
        &self,
        code: &ShortCode,
        original_url: &str,
        ttl: Duration,
    ) -> Result<(), CacheError> {
        self.sets.fetch_add(1, Ordering::SeqCst);
        *self.last_ttl.lock().unwrap() = Some(ttl);
        self.enter().await?;
        self.inner.set_url(code, original_url, ttl).await
    }
}

/// Hands out queued codes first, then falls back to random ones.
#[derive(Debug, Default)]
pub struct FixedGenerator {
    queued: Mutex<VecDeque<ShortCode>>,
    fallback: RandomGenerator,
}

impl FixedGenerator {
    pub fn new<'a>(codes: impl IntoIterator<Item = &'a str>) -> Self {
        Self {
            queued: Mutex::new(codes.into_iter().map(ShortCode::new_unchecked).collect()),
            fallback: RandomGenerator::new(),
        }
    }

    /// Hands out `code` `times` times before falling back.
    pub fn repeating(code: &str, times: usize) -> Self {
        Self::new(std::iter::repeat(code).take(times))
    }
}

impl Generator for FixedGenerator {
    fn generate(&self) -> ShortCode {
        let next = self.queued.lock().unwrap().pop_front();
        next.unwrap_or_else(|| self.fallback.generate())
    }
}

/// Keeps every event it receives.
#[derive(Debug, Default)]
pub struct RecordingSink {
    events: Mutex<Vec<ResolutionEvent>>,
}

impl RecordingSink {
    pub fn events(&self) -> Vec<ResolutionEvent> {
        self.events.lock().unwrap().clone()
    }

    pub fn count(&self, event: ResolutionEvent) -> usize {
        self.events
            .lock()
            .unwrap()
            .iter()
            .filter(|e| **e == event)
            .count()
    }
}

impl EventSink for RecordingSink {
    fn record(&self, event: ResolutionEvent) {
        self.events.lock().unwrap().push(event);
    }
}
