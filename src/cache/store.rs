use bytes::Bytes;
use lru::LruCache;
use serde::Serialize;
use std::num::NonZeroUsize;
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::{Duration, Instant};
use tracing::debug;

use crate::analysis::AnalysisResult;
use crate::config::CacheConfig;

/// A finished analysis and the chart its fallback path points at.
#[derive(Debug, Clone)]
struct CachedAnalysis {
    result: AnalysisResult,
    png: Bytes,
}

struct CachedItem<T> {
    data: T,
    created_at: Instant,
}

impl<T> CachedItem<T> {
    fn new(data: T) -> Self {
        Self {
            data,
            created_at: Instant::now(),
        }
    }

    fn is_expired(&self, ttl: Option<Duration>, now: Instant) -> bool {
        ttl.is_some_and(|ttl| now.duration_since(self.created_at) > ttl)
    }
}

#[derive(Debug, Default, Clone, Serialize)]
pub struct CacheStats {
    pub result_hits: u64,
    pub result_misses: u64,
    pub image_hits: u64,
    pub image_misses: u64,
    pub evictions: u64,
    pub expirations: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Kind {
    Result,
    Image,
}

/// Analysis results and their charts keyed by analysis id.
///
/// A result and its chart share one entry, so they are evicted and expired
/// together: a result that can be retrieved always has its chart. At most
/// `capacity` entries are kept; reading either half marks the entry as
/// recently used.
pub struct AnalysisCache {
    entries: Mutex<LruCache<String, CachedItem<CachedAnalysis>>>,
    capacity: NonZeroUsize,
    ttl: Option<Duration>,
    stats: Mutex<CacheStats>,
}

impl AnalysisCache {
    pub fn new(capacity: NonZeroUsize, ttl: Option<Duration>) -> Self {
        Self {
            entries: Mutex::new(LruCache::new(capacity)),
            capacity,
            ttl,
            stats: Mutex::new(CacheStats::default()),
        }
    }

    /// Zero capacity is clamped to one entry.
    pub fn from_config(config: &CacheConfig) -> Self {
        let capacity = NonZeroUsize::new(config.capacity).unwrap_or(NonZeroUsize::MIN);
        Self::new(capacity, config.ttl())
    }

    pub fn capacity(&self) -> usize {
        self.capacity.get()
    }

    /// Store a result together with its PNG chart.
    pub fn insert(&self, result: AnalysisResult, png: impl Into<Bytes>) {
        let id = result.id.clone();
        let entry = CachedAnalysis {
            result,
            png: png.into(),
        };
        let displaced = lock(&self.entries).push(id.clone(), CachedItem::new(entry));

        // `push` also hands back the old value when the key is replaced
        if let Some((key, _)) = displaced.filter(|(key, _)| *key != id) {
            lock(&self.stats).evictions += 1;
            debug!("Evicted cached analysis {}", key);
        }
    }

    pub fn get_result(&self, id: &str) -> Option<AnalysisResult> {
        self.fetch(id, Kind::Result).map(|entry| entry.result)
    }

    /// The cached chart; cloning `Bytes` shares the buffer.
    pub fn get_image(&self, id: &str) -> Option<Bytes> {
        self.fetch(id, Kind::Image).map(|entry| entry.png)
    }

    pub fn len(&self) -> usize {
        lock(&self.entries).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn stats(&self) -> CacheStats {
        lock(&self.stats).clone()
    }

    /// Drop every expired entry, returning how many were removed.
    pub fn purge_expired(&self) -> usize {
        let now = Instant::now();
        let removed = {
            let mut entries = lock(&self.entries);
            let expired: Vec<String> = entries
                .iter()
                .filter(|(_, item)| item.is_expired(self.ttl, now))
                .map(|(key, _)| key.clone())
                .collect();
            for key in &expired {
                entries.pop(key);
            }
            expired.len()
        };

        if removed > 0 {
            lock(&self.stats).expirations += removed as u64;
            debug!("Purged {} expired cache entries", removed);
        }
        removed
    }

    fn fetch(&self, id: &str, kind: Kind) -> Option<CachedAnalysis> {
        let lookup = {
            let mut entries = lock(&self.entries);
            let expired = entries
                .peek(id)
                .map(|item| item.is_expired(self.ttl, Instant::now()));
            match expired {
                None => Lookup::Missing,
                Some(true) => {
                    entries.pop(id);
                    Lookup::Expired
                }
                Some(false) => entries
                    .get(id)
                    .map(|item| Lookup::Hit(item.data.clone()))
                    .unwrap_or(Lookup::Missing),
            }
        };

        let mut stats = lock(&self.stats);
        let hit = matches!(lookup, Lookup::Hit(_));
        match (kind, hit) {
            (Kind::Result, true) => stats.result_hits += 1,
            (Kind::Result, false) => stats.result_misses += 1,
            (Kind::Image, true) => stats.image_hits += 1,
            (Kind::Image, false) => stats.image_misses += 1,
        }
        match lookup {
            Lookup::Hit(entry) => Some(entry),
            Lookup::Expired => {
                stats.expirations += 1;
                None
            }
            Lookup::Missing => None,
        }
    }
}

enum Lookup {
    Hit(CachedAnalysis),
    Expired,
    Missing,
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn result(id: &str) -> AnalysisResult {
        AnalysisResult {
            id: id.to_string(),
            algo: "linear".to_string(),
            items: 10,
            steps: 2,
            start_time: 1,
            end_time: 2,
            total_time_ms: 0.0,
            time_complexity: "O(n)".to_string(),
            path_to_graph: format!("/download/{}", id),
        }
    }

    fn cache(capacity: usize, ttl: Option<Duration>) -> AnalysisCache {
        AnalysisCache::new(NonZeroUsize::new(capacity).unwrap(), ttl)
    }

    #[test]
    fn test_insert_and_fetch() {
        let cache = cache(4, None);
        cache.insert(result("a"), vec![1, 2, 3]);

        assert_eq!(cache.get_result("a"), Some(result("a")));
        assert_eq!(cache.get_image("a").as_deref(), Some(&[1u8, 2, 3][..]));
        assert!(cache.get_result("b").is_none());
        assert!(cache.get_image("b").is_none());

        let stats = cache.stats();
        assert_eq!(stats.result_hits, 1);
        assert_eq!(stats.result_misses, 1);
        assert_eq!(stats.image_hits, 1);
        assert_eq!(stats.image_misses, 1);
    }

    #[test]
    fn test_capacity_evicts_least_recently_used() {
        let cache = cache(2, None);
        cache.insert(result("a"), vec![0]);
        cache.insert(result("b"), vec![0]);
        // touch "a" so "b" becomes the eviction candidate
        assert!(cache.get_result("a").is_some());
        cache.insert(result("c"), vec![0]);

        assert_eq!(cache.len(), 2);
        assert!(cache.get_result("a").is_some());
        assert!(cache.get_result("b").is_none());
        assert!(cache.get_image("b").is_none());
        assert!(cache.get_result("c").is_some());
        assert_eq!(cache.stats().evictions, 1);
    }

    #[test]
    fn test_retrievable_result_keeps_its_chart() {
        let cache = cache(2, None);
        cache.insert(result("a"), vec![1]);
        cache.insert(result("b"), vec![2]);
        // reads of different halves must not split a pair on eviction
        assert!(cache.get_result("a").is_some());
        assert!(cache.get_image("b").is_some());
        cache.insert(result("c"), vec![3]);

        for id in ["a", "b", "c"] {
            assert_eq!(
                cache.get_result(id).is_some(),
                cache.get_image(id).is_some(),
                "result and chart of {} diverged",
                id
            );
        }
        assert_eq!(cache.len(), 2);
    }

    #[test]
    fn test_image_reads_share_the_cached_buffer() {
        let cache = cache(1, None);
        cache.insert(result("a"), vec![7u8; 64]);
        let first = cache.get_image("a").unwrap();
        let second = cache.get_image("a").unwrap();
        assert_eq!(first.as_ptr(), second.as_ptr());
    }

    #[test]
    fn test_reinserting_same_id_is_not_an_eviction() {
        let cache = cache(1, None);
        cache.insert(result("a"), vec![1]);
        cache.insert(result("a"), vec![2]);
        assert_eq!(cache.len(), 1);
        assert_eq!(cache.stats().evictions, 0);
        assert_eq!(cache.get_image("a").as_deref(), Some(&[2u8][..]));
    }

    #[test]
    fn test_expired_entries_are_dropped() {
        let cache = cache(4, Some(Duration::from_millis(20)));
        cache.insert(result("a"), vec![0]);
        cache.insert(result("b"), vec![0]);
        cache.insert(result("c"), vec![0]);
        std::thread::sleep(Duration::from_millis(50));

        assert!(cache.get_result("a").is_none());
        assert!(cache.get_image("a").is_none());
        assert_eq!(cache.purge_expired(), 2);
        assert!(cache.is_empty());
        assert_eq!(cache.stats().expirations, 3);
    }

    #[test]
    fn test_without_ttl_nothing_expires() {
        let cache = cache(4, None);
        cache.insert(result("a"), vec![0]);
        assert_eq!(cache.purge_expired(), 0);
        assert_eq!(cache.len(), 1);
    }
}
