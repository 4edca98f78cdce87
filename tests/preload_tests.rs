use async_trait::async_trait;
use mapflight::prelude::*;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

/// Preloading a whole animation against an in-memory tile server
#[cfg(test)]
mod preload_tests {
    use super::*;

    /// Serves every URL, recording the order requests arrive in
    #[derive(Default)]
    struct RecordingFetcher {
        urls: Mutex<Vec<String>>,
        in_flight: AtomicUsize,
        max_in_flight: AtomicUsize,
    }

    #[async_trait]
    impl TileFetcher for RecordingFetcher {
        async fn fetch(&self, url: &str) -> Result<Vec<u8>> {
            let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
            self.max_in_flight.fetch_max(now, Ordering::SeqCst);
            tokio::task::yield_now().await;
            self.urls.lock().unwrap().push(url.to_string());
            self.in_flight.fetch_sub(1, Ordering::SeqCst);
            Ok(url.as_bytes().to_vec())
        }
    }

    fn sequence() -> FrameSequence {
        let transition = create_box_transition(
            ViewPoint::new(48.7734, 9.1829, 12.0),
            ViewPoint::new(48.7392, 9.3049, 12.0),
            Point::new(400.0, 300.0),
            None,
        )
        .unwrap();
        FrameSequence::resolve(
            &transition,
            Point::new(400.0, 300.0),
            &FrameTimingProfile::Preview.resolve(),
        )
        .unwrap()
    }

    #[tokio::test]
    async fn test_preload_fills_cache_for_every_frame() {
        let _ = env_logger::builder().is_test(true).try_init();
        let fetcher = Arc::new(RecordingFetcher::default());
        let config = TileLoadingConfig {
            cache_size: 4096,
            fetch_batch_size: 4,
            max_retries: 0,
        };
        let preloader = TilePreloader::new(
            Arc::new(TemplateSource::new("https://tiles.test/{z}/{x}/{y}.png")),
            fetcher.clone(),
            TileCache::from_config(&config),
            config,
        );

        let sequence = sequence();
        let report = preloader.preload(&sequence).await;
        assert!(report.is_complete());
        assert_eq!(report.requested, sequence.required_tiles().len());
        assert_eq!(report.fetched, report.requested);

        // Each canonical tile was asked for once
        let urls = fetcher.urls.lock().unwrap().clone();
        let mut unique = urls.clone();
        unique.sort();
        unique.dedup();
        assert_eq!(unique.len(), urls.len());
        assert!(fetcher.max_in_flight.load(Ordering::SeqCst) <= 4);

        // Nothing is drawn from a missing tile
        for frame in sequence.frames() {
            for tile in frame.tiles() {
                assert!(preloader.cache().contains(tile), "{} not cached", tile);
            }
        }

        // A second pass is served entirely from the cache
        let again = preloader.preload(&sequence).await;
        assert_eq!(again.fetched, 0);
        assert_eq!(again.cached, again.requested);
        assert_eq!(fetcher.urls.lock().unwrap().len(), urls.len());
    }

    #[tokio::test]
    async fn test_preload_world_wrapping_frames() {
        let fetcher = Arc::new(RecordingFetcher::default());
        let preloader = TilePreloader::new(
            Arc::new(TemplateSource::new("{z}/{x}/{y}")),
            fetcher.clone(),
            TileCache::new(64),
            TileLoadingConfig::default(),
        );

        // Wider than the zoom-1 world and taller than it: rows above and
        // below are skipped, wrapped columns fetched once
        let frame = Frame::calculate(Point::new(1200.0, 800.0), &ViewPoint::new(0.0, 0.0, 1.0));
        let report = preloader.preload_tiles(frame.tiles()).await;

        assert_eq!(report.requested, report.fetched + report.skipped);
        assert_eq!(report.fetched, 4);
        assert!(report.skipped > 0);
        let mut urls = fetcher.urls.lock().unwrap().clone();
        urls.sort();
        assert_eq!(urls, vec!["1/0/0", "1/0/1", "1/1/0", "1/1/1"]);
    }
}
