//! Bounded, expiring store of finished analyses.

use std::num::NonZeroUsize;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::{Duration, Instant};

use lru::LruCache;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::analysis::AnalysisReport;

/// Capacity and lifetime of cached results
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CacheConfig {
    /// Maximum number of analyses kept
    pub capacity: usize,
    /// Age after which an analysis is dropped
    pub ttl: Duration,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            capacity: 32,
            ttl: Duration::from_secs(60 * 60),
        }
    }
}

struct CacheEntry {
    report: Arc<AnalysisReport>,
    dir: Option<PathBuf>,
    inserted: Instant,
}

/// LRU cache of analysis reports keyed by analysis id.
///
/// Each entry may own an export directory; it is removed from disk when the
/// entry is evicted, expires or is replaced.
pub struct ResultCache {
    inner: LruCache<String, CacheEntry>,
    ttl: Duration,
}

impl ResultCache {
    /// Create a new cache; a zero capacity is treated as one.
    pub fn new(config: CacheConfig) -> Self {
        let cap = NonZeroUsize::new(config.capacity.max(1)).unwrap_or(NonZeroUsize::MIN);
        Self {
            inner: LruCache::new(cap),
            ttl: config.ttl,
        }
    }

    /// Store a report, evicting the least recently used one when full.
    pub fn insert(&mut self, report: AnalysisReport, dir: Option<PathBuf>) -> Arc<AnalysisReport> {
        self.purge_expired();
        let report = Arc::new(report);
        let entry = CacheEntry {
            report: Arc::clone(&report),
            dir,
            inserted: Instant::now(),
        };
        let id = report.id.clone();
        if let Some((old_id, old)) = self.inner.push(id.clone(), entry) {
            let replaced_same_dir = old_id == id
                && self.inner.peek(&id).and_then(|e| e.dir.as_deref()) == old.dir.as_deref();
            if !replaced_same_dir {
                debug!(id = %old_id, "evicting cached analysis");
                remove_dir(old.dir.as_deref());
            }
        }
        report
    }

    /// Look up a report, refreshing its recency. Expired entries are dropped.
    pub fn get(&mut self, id: &str) -> Option<Arc<AnalysisReport>> {
        let expired = self.inner.peek(id)?.inserted.elapsed() >= self.ttl;
        if expired {
            self.remove(id);
            return None;
        }
        self.inner.get(id).map(|e| Arc::clone(&e.report))
    }

    /// Export directory of a cached analysis
    pub fn dir(&mut self, id: &str) -> Option<PathBuf> {
        self.get(id)?;
        self.inner.peek(id).and_then(|e| e.dir.clone())
    }

    /// Drop one entry and its directory; returns whether it existed.
    pub fn remove(&mut self, id: &str) -> bool {
        match self.inner.pop(id) {
            Some(entry) => {
                remove_dir(entry.dir.as_deref());
                true
            }
            None => false,
        }
    }

    /// Drop every expired entry; returns how many were removed.
    pub fn purge_expired(&mut self) -> usize {
        let expired: Vec<String> = self
            .inner
            .iter()
            .filter(|(_, e)| e.inserted.elapsed() >= self.ttl)
            .map(|(id, _)| id.clone())
            .collect();
        for id in &expired {
            self.remove(id);
        }
        expired.len()
    }

    /// Number of analyses currently cached.
    pub fn len(&self) -> usize {
        self.inner.len()
    }

    /// Whether the cache is empty.
    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }

    /// Drop everything, removing directories.
    pub fn clear(&mut self) {
        while let Some((_, entry)) = self.inner.pop_lru() {
            remove_dir(entry.dir.as_deref());
        }
    }
}

fn remove_dir(dir: Option<&Path>) {
    let Some(dir) = dir else { return };
    if let Err(e) = std::fs::remove_dir_all(dir) {
        if e.kind() != std::io::ErrorKind::NotFound {
            warn!(dir = %dir.display(), error = %e, "failed to remove analysis directory");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use poromet_algorithms::distribution::{Bin, PoreSizeDistribution};
    use poromet_algorithms::segmentation::PorosityCheck;
    use poromet_algorithms::statistics::summarize_bins;

    fn report(id: &str) -> AnalysisReport {
        let bins = vec![Bin {
            center: 10.0,
            width: 2.0,
            density: 0.5,
        }];
        AnalysisReport {
            id: id.to_string(),
            histogram: vec![(10.0, 0.5)],
            summary: summarize_bins(&bins),
            psd: PoreSizeDistribution {
                radius_bins: bins.clone(),
                bins,
                nm_per_pixel: 1.0,
                sample_count: 1,
            },
            pixel_size_nm: 1.0,
            threshold: 0.5,
            porosity: 0.2,
            porosity_check: PorosityCheck::Ok,
            resolution: (8, 8),
            magnification: 20,
            max_radius_px: 4,
        }
    }

    fn config(capacity: usize, ttl: Duration) -> CacheConfig {
        CacheConfig { capacity, ttl }
    }

    #[test]
    fn test_cache_insert_get() {
        let mut cache = ResultCache::new(config(2, Duration::from_secs(3600)));
        cache.insert(report("a"), None);
        assert_eq!(cache.get("a").unwrap().id, "a");
        assert!(cache.get("missing").is_none());
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn test_cache_eviction_removes_directory() {
        let tmp = tempfile::tempdir().unwrap();
        let dir_a = tmp.path().join("analysis_a");
        std::fs::create_dir(&dir_a).unwrap();

        let mut cache = ResultCache::new(config(2, Duration::from_secs(3600)));
        cache.insert(report("a"), Some(dir_a.clone()));
        cache.insert(report("b"), None);
        cache.insert(report("c"), None); // evicts a

        assert!(cache.get("a").is_none());
        assert!(cache.get("b").is_some());
        assert!(cache.get("c").is_some());
        assert!(!dir_a.exists());
    }

    #[test]
    fn test_expired_entries_dropped() {
        let tmp = tempfile::tempdir().unwrap();
        let dir = tmp.path().join("analysis_old");
        std::fs::create_dir(&dir).unwrap();

        let mut cache = ResultCache::new(config(4, Duration::ZERO));
        cache.insert(report("old"), Some(dir.clone()));
        assert!(cache.get("old").is_none());
        assert!(cache.is_empty());
        assert!(!dir.exists());
    }

    #[test]
    fn test_zero_capacity_holds_one() {
        let mut cache = ResultCache::new(config(0, Duration::from_secs(60)));
        cache.insert(report("a"), None);
        cache.insert(report("b"), None);
        assert_eq!(cache.len(), 1);
        assert!(cache.get("b").is_some());
    }

    #[test]
    fn test_clear_and_remove() {
        let mut cache = ResultCache::new(CacheConfig::default());
        cache.insert(report("a"), None);
        cache.insert(report("b"), None);
        assert!(cache.remove("a"));
        assert!(!cache.remove("a"));
        cache.clear();
        assert!(cache.is_empty());
    }
}
