use async_trait::async_trait;
use futures::stream::{self, StreamExt};
use fxhash::FxHashSet;
use std::sync::Arc;

use super::cache::TileCache;
use super::source::TileSource;
use crate::core::config::TileLoadingConfig;
use crate::core::geo::TileCoord;
use crate::rendering::sequence::FrameSequence;
use crate::Result;

/// Retrieves the bytes behind a tile URL. Implementations own the transport
/// (HTTP client, disk, test fixture); failures should be `MapError::Tile`.
#[async_trait]
pub trait TileFetcher: Send + Sync {
    async fn fetch(&self, url: &str) -> Result<Vec<u8>>;
}

/// Outcome of a preload
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PreloadReport {
    /// Unique canonical tiles asked for
    pub requested: usize,
    /// Already in the cache
    pub cached: usize,
    /// Fetched and stored by this preload
    pub fetched: usize,
    /// Rows above or below the world, nothing to fetch
    pub skipped: usize,
    /// Still failing after every retry
    pub failed: Vec<TileCoord>,
    /// Cached or fetched, then pushed out again because the cache is smaller
    /// than the set of tiles
    pub evicted: Vec<TileCoord>,
}

impl PreloadReport {
    /// Whether every tile that exists is in the cache now
    pub fn is_complete(&self) -> bool {
        self.failed.is_empty() && self.evicted.is_empty()
    }
}

/// Fills a [`TileCache`] with every tile an animation needs before it plays.
pub struct TilePreloader {
    source: Arc<dyn TileSource>,
    fetcher: Arc<dyn TileFetcher>,
    cache: TileCache,
    config: TileLoadingConfig,
}

impl TilePreloader {
    pub fn new(
        source: Arc<dyn TileSource>,
        fetcher: Arc<dyn TileFetcher>,
        cache: TileCache,
        config: TileLoadingConfig,
    ) -> Self {
        Self {
            source,
            fetcher,
            cache,
            config,
        }
    }

    pub fn cache(&self) -> &TileCache {
        &self.cache
    }

    /// Preloads the tiles of every frame of `sequence`.
    pub async fn preload(&self, sequence: &FrameSequence) -> PreloadReport {
        self.preload_tiles(&sequence.required_tiles()).await
    }

    /// Fetches every tile of `tiles` that is not cached yet, at most
    /// `fetch_batch_size` at a time, and returns once all of them have
    /// completed or run out of retries. Completion order is arbitrary.
    pub async fn preload_tiles(&self, tiles: &[TileCoord]) -> PreloadReport {
        let mut seen = FxHashSet::default();
        let unique: Vec<TileCoord> = tiles
            .iter()
            .map(TileCoord::canonical)
            .filter(|tile| seen.insert(*tile))
            .collect();
        let (rows, outside): (Vec<TileCoord>, Vec<TileCoord>) =
            unique.iter().partition(|tile| tile.has_row());
        let missing = self.cache.missing(&rows);

        let mut report = PreloadReport {
            requested: unique.len(),
            cached: rows.len() - missing.len(),
            skipped: outside.len(),
            ..Default::default()
        };
        log::debug!(
            "preloading {} tiles ({} cached, {} outside the world)",
            missing.len(),
            report.cached,
            report.skipped
        );

        let results: Vec<(TileCoord, Result<Vec<u8>>)> = stream::iter(missing)
            .map(|tile| async move { (tile, self.fetch_with_retry(&tile).await) })
            .buffer_unordered(self.config.fetch_batch_size.max(1))
            .collect()
            .await;

        for (tile, result) in results {
            match result {
                Ok(data) => {
                    self.cache.insert(tile, data);
                    report.fetched += 1;
                }
                Err(_) => report.failed.push(tile),
            }
        }

        let failed: FxHashSet<TileCoord> = report.failed.iter().copied().collect();
        report.evicted = self
            .cache
            .missing(&rows)
            .into_iter()
            .filter(|tile| !failed.contains(tile))
            .collect();
        if !report.evicted.is_empty() {
            log::warn!(
                "{} of {} tiles did not stay cached, capacity is {}",
                report.evicted.len(),
                rows.len(),
                self.cache.capacity()
            );
        }
        report
    }

    async fn fetch_with_retry(&self, tile: &TileCoord) -> Result<Vec<u8>> {
        let url = self.source.url(tile);
        let mut attempt = 0;
        loop {
            attempt += 1;
            match self.fetcher.fetch(&url).await {
                Ok(data) => {
                    log::debug!("fetched tile {} ({} bytes)", tile, data.len());
                    return Ok(data);
                }
                Err(e) if attempt <= self.config.max_retries => {
                    log::warn!("tile {} fetch failed on attempt {}: {}", tile, attempt, e);
                }
                Err(e) => {
                    log::error!("giving up on tile {} after {} attempts: {}", tile, attempt, e);
                    return Err(e);
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tiles::source::TemplateSource;
    use crate::MapError;
    use fxhash::FxHashMap;
    use std::sync::Mutex;

    /// Fails each URL `failures` times before answering with its length
    struct FlakyFetcher {
        failures: u32,
        calls: Mutex<FxHashMap<String, u32>>,
    }

    impl FlakyFetcher {
        fn new(failures: u32) -> Self {
            Self {
                failures,
                calls: Mutex::new(FxHashMap::default()),
            }
        }

        fn total_calls(&self) -> u32 {
            self.calls.lock().unwrap().values().sum()
        }
    }

    #[async_trait]
    impl TileFetcher for FlakyFetcher {
        async fn fetch(&self, url: &str) -> Result<Vec<u8>> {
            let count = {
                let mut calls = self.calls.lock().unwrap();
                let count = calls.entry(url.to_string()).or_insert(0);
                *count += 1;
                *count
            };
            if count <= self.failures {
                Err(MapError::Tile(format!("{} unavailable", url)))
            } else {
                Ok(url.as_bytes().to_vec())
            }
        }
    }

    fn preloader(fetcher: Arc<FlakyFetcher>, max_retries: u32) -> TilePreloader {
        let config = TileLoadingConfig {
            cache_size: 64,
            fetch_batch_size: 2,
            max_retries,
        };
        TilePreloader::new(
            Arc::new(TemplateSource::new("{z}/{x}/{y}")),
            fetcher,
            TileCache::from_config(&config),
            config,
        )
    }

    #[tokio::test]
    async fn test_preload_dedups_and_skips() {
        let _ = env_logger::builder().is_test(true).try_init();
        let fetcher = Arc::new(FlakyFetcher::new(0));
        let loader = preloader(fetcher.clone(), 0);

        let tiles = [
            TileCoord::new(0, 0, 1),
            TileCoord::new(2, 0, 1), // wrapped copy of the first
            TileCoord::new(1, 1, 1),
            TileCoord::new(0, -1, 1), // above the world
        ];
        let report = loader.preload_tiles(&tiles).await;

        assert_eq!(report.requested, 3);
        assert_eq!(report.fetched, 2);
        assert_eq!(report.skipped, 1);
        assert!(report.is_complete());
        assert_eq!(fetcher.total_calls(), 2);
        assert_eq!(*loader.cache().get(&TileCoord::new(-2, 0, 1)).unwrap(), b"1/0/0".to_vec());
    }

    #[tokio::test]
    async fn test_preload_skips_cached() {
        let fetcher = Arc::new(FlakyFetcher::new(0));
        let loader = preloader(fetcher.clone(), 0);
        loader.cache().insert(TileCoord::new(0, 0, 0), vec![1]);

        let report = loader.preload_tiles(&[TileCoord::new(0, 0, 0)]).await;
        assert_eq!(report.cached, 1);
        assert_eq!(report.fetched, 0);
        assert_eq!(fetcher.total_calls(), 0);
    }

    #[tokio::test]
    async fn test_preload_retries() {
        let fetcher = Arc::new(FlakyFetcher::new(2));
        let loader = preloader(fetcher.clone(), 2);
        let report = loader.preload_tiles(&[TileCoord::new(1, 1, 2)]).await;
        assert_eq!(report.fetched, 1);
        assert_eq!(fetcher.total_calls(), 3);
    }

    #[tokio::test]
    async fn test_preload_reports_failures() {
        let fetcher = Arc::new(FlakyFetcher::new(5));
        let loader = preloader(fetcher.clone(), 1);
        let tiles = [TileCoord::new(0, 0, 3), TileCoord::new(1, 0, 3)];
        let report = loader.preload_tiles(&tiles).await;

        assert!(!report.is_complete());
        assert_eq!(report.failed.len(), 2);
        assert_eq!(fetcher.total_calls(), 4);
        assert!(loader.cache().is_empty());
    }

    #[tokio::test]
    async fn test_preload_larger_than_cache_is_incomplete() {
        let fetcher = Arc::new(FlakyFetcher::new(0));
        let config = TileLoadingConfig {
            cache_size: 2,
            fetch_batch_size: 1,
            max_retries: 0,
        };
        let loader = TilePreloader::new(
            Arc::new(TemplateSource::new("{z}/{x}/{y}")),
            fetcher.clone(),
            TileCache::from_config(&config),
            config,
        );
        let tiles = [
            TileCoord::new(0, 0, 2),
            TileCoord::new(1, 0, 2),
            TileCoord::new(2, 0, 2),
        ];
        let report = loader.preload_tiles(&tiles).await;

        assert_eq!(report.fetched, 3);
        assert!(report.failed.is_empty());
        assert_eq!(report.evicted.len(), 1);
        assert!(!loader.cache().contains(&report.evicted[0]));
        assert!(!report.is_complete());
        assert_eq!(loader.cache().len(), 2);
    }
}
