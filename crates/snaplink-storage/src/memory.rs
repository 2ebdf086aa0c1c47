use async_trait::async_trait;
use dashmap::mapref::entry::Entry as MapEntry;
use dashmap::DashMap;
use jiff::Timestamp;
use snaplink_core::repository::{Mapping, Repository, Result};
use snaplink_core::{ShortCode, StorageError};
use std::sync::atomic::{AtomicU64, Ordering};

/// In-memory storage entry for a URL mapping.
#[derive(Debug, Clone)]
struct Entry {
    id: u64,
    original_url: String,
    created_at: Timestamp,
    access_count: u64,
}

impl Entry {
    fn to_mapping(&self, code: &str) -> Mapping {
        Mapping {
            code: ShortCode::new_unchecked(code),
            original_url: self.original_url.clone(),
            created_at: self.created_at,
            access_count: self.access_count,
        }
    }
}

/// In-memory implementation of the Repository trait using DashMap.
///
/// Insertion goes through the entry API, so the uniqueness check and the
/// write happen under the same shard lock.
#[derive(Debug, Default)]
pub struct InMemoryRepository {
    storage: DashMap<String, Entry>,
    next_id: AtomicU64,
}

impl InMemoryRepository {
    /// Creates a new in-memory repository.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a new in-memory repository with the specified capacity.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            storage: DashMap::with_capacity(capacity),
            next_id: AtomicU64::new(0),
        }
    }

    /// Returns the number of stored mappings.
    pub fn len(&self) -> usize {
        self.storage.len()
    }

    pub fn is_empty(&self) -> bool {
        self.storage.is_empty()
    }
}

#[async_trait]
impl Repository for InMemoryRepository {
    async fn create(&self, code: &ShortCode, original_url: &str) -> Result<Mapping> {
        match self.storage.entry(code.as_str().to_owned()) {
            MapEntry::Occupied(_) => Err(StorageError::Conflict(code.to_string())),
            MapEntry::Vacant(vacant) => {
                let entry = Entry {
                    id: self.next_id.fetch_add(1, Ordering::SeqCst) + 1,
                    original_url: original_url.to_owned(),
                    created_at: Timestamp::now(),
                    access_count: 0,
                };
                let mapping = entry.to_mapping(code.as_str());
                vacant.insert(entry);
                Ok(mapping)
            }
        }
    }

    async fn get_by_code(&self, code: &ShortCode) -> Result<String> {
        self.storage
            .get(code.as_str())
            .map(|entry| entry.original_url.clone())
            .ok_or_else(|| StorageError::NotFound(code.to_string()))
    }

    async fn list_all(&self) -> Result<Vec<Mapping>> {
        let mut entries: Vec<(u64, Mapping)> = self
            .storage
            .iter()
            .map(|item| (item.id, item.to_mapping(item.key())))
            .collect();

        // Insert ids are strictly increasing; wall-clock timestamps are not.
        entries.sort_unstable_by(|(a_id, _), (b_id, _)| b_id.cmp(a_id));

        Ok(entries.into_iter().map(|(_, mapping)| mapping).collect())
    }

    async fn increment_access(&self, code: &ShortCode, by: u64) -> Result<()> {
        if let Some(mut entry) = self.storage.get_mut(code.as_str()) {
            entry.access_count = entry.access_count.saturating_add(by);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    fn code(s: &str) -> ShortCode {
        ShortCode::new_unchecked(s)
    }

    #[tokio::test]
    async fn create_and_get() {
        let repo = InMemoryRepository::new();

        let mapping = repo
            .create(&code("abc123"), "https://example.com")
            .await
            .unwrap();
        assert_eq!(mapping.code.as_str(), "abc123");
        assert_eq!(mapping.original_url, "https://example.com");
        assert_eq!(mapping.access_count, 0);

        let url = repo.get_by_code(&code("abc123")).await.unwrap();
        assert_eq!(url, "https://example.com");
    }

    #[tokio::test]
    async fn get_nonexistent() {
        let repo = InMemoryRepository::new();

        let err = repo.get_by_code(&code("nope")).await.unwrap_err();
        assert!(matches!(err, StorageError::NotFound(_)));
    }

    #[tokio::test]
    async fn create_conflict() {
        let repo = InMemoryRepository::new();

        repo.create(&code("abc123"), "https://example.com")
            .await
            .unwrap();

        let err = repo
            .create(&code("abc123"), "https://other.com")
            .await
            .unwrap_err();
        assert!(matches!(err, StorageError::Conflict(_)));

        // The first mapping is untouched.
        let url = repo.get_by_code(&code("abc123")).await.unwrap();
        assert_eq!(url, "https://example.com");
    }

    #[tokio::test]
    async fn codes_are_case_sensitive() {
        let repo = InMemoryRepository::new();

        repo.create(&code("abcDEF"), "https://one.example").await.unwrap();
        repo.create(&code("ABCdef"), "https://two.example").await.unwrap();

        assert_eq!(repo.len(), 2);
    }

    #[tokio::test]
    async fn list_empty() {
        let repo = InMemoryRepository::new();
        assert!(repo.list_all().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn list_is_newest_first() {
        let repo = InMemoryRepository::new();

        for (i, c) in ["first1", "second", "third3"].iter().enumerate() {
            repo.create(&code(c), &format!("https://example{}.com", i))
                .await
                .unwrap();
        }

        let codes: Vec<String> = repo
            .list_all()
            .await
            .unwrap()
            .into_iter()
            .map(|m| m.code.to_string())
            .collect();
        assert_eq!(codes, vec!["third3", "second", "first1"]);
    }

    #[tokio::test]
    async fn list_order_ignores_clock_steps() {
        let repo = InMemoryRepository::new();
        let first = repo.create(&code("first1"), "https://one.example").await.unwrap();
        repo.create(&code("second"), "https://two.example").await.unwrap();

        // Simulate the clock stepping backwards between the two inserts.
        repo.storage.get_mut("second").unwrap().created_at =
            first.created_at - jiff::SignedDuration::from_secs(3600);

        let codes: Vec<String> = repo
            .list_all()
            .await
            .unwrap()
            .into_iter()
            .map(|m| m.code.to_string())
            .collect();
        assert_eq!(codes, vec!["second", "first1"]);
    }

    #[tokio::test]
    async fn increment_access_accumulates() {
        let repo = InMemoryRepository::new();
        repo.create(&code("abc123"), "https://example.com")
            .await
            .unwrap();

        repo.increment_access(&code("abc123"), 1).await.unwrap();
        repo.increment_access(&code("abc123"), 2).await.unwrap();

        let listed = repo.list_all().await.unwrap();
        assert_eq!(listed[0].access_count, 3);
    }

    #[tokio::test]
    async fn increment_access_ignores_unknown_code() {
        let repo = InMemoryRepository::new();
        repo.increment_access(&code("ghost1"), 1).await.unwrap();
        assert!(repo.is_empty());
    }

    #[tokio::test]
    async fn concurrent_create_same_code_admits_exactly_one() {
        let repo = Arc::new(InMemoryRepository::new());
        let mut handles = vec![];

        for i in 0..16u64 {
            let repo = Arc::clone(&repo);
            handles.push(tokio::spawn(async move {
                repo.create(&code("race00"), &format!("https://example{}.com", i))
                    .await
            }));
        }

        let mut created = 0;
        let mut conflicts = 0;
        for handle in handles {
            match handle.await.unwrap() {
                Ok(_) => created += 1,
                Err(StorageError::Conflict(_)) => conflicts += 1,
                Err(other) => panic!("unexpected error: {other}"),
            }
        }

        assert_eq!(created, 1);
        assert_eq!(conflicts, 15);
    }

    #[tokio::test]
    async fn concurrent_access() {
        let repo = Arc::new(InMemoryRepository::new());
        let mut handles = vec![];

        for i in 0..10u64 {
            let repo = Arc::clone(&repo);
            handles.push(tokio::spawn(async move {
                let c = ShortCode::new_unchecked(format!("code{:02}", i));
                repo.create(&c, &format!("https://example{}.com", i))
                    .await
                    .unwrap();
            }));
        }

        for handle in handles {
            handle.await.unwrap();
        }

        for i in 0..10u64 {
            let c = ShortCode::new_unchecked(format!("code{:02}", i));
            let url = repo.get_by_code(&c).await.unwrap();
            assert_eq!(url, format!("https://example{}.com", i));
        }
    }
}
