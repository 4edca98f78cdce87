use lru::LruCache;
use std::num::NonZeroUsize;
use std::sync::{Arc, Mutex};

use crate::core::config::TileLoadingConfig;
use crate::core::geo::TileCoord;

/// In-memory tile store with LRU eviction.
///
/// Keys are canonical tiles, so every wrapped copy of a tile that a frame
/// draws past the antimeridian hits the same entry. Clones share the store.
#[derive(Debug)]
pub struct TileCache {
    cache: Arc<Mutex<LruCache<TileCoord, Arc<Vec<u8>>>>>,
}

impl TileCache {
    /// Create a cache holding up to `capacity` tiles (at least one)
    pub fn new(capacity: usize) -> Self {
        let capacity = NonZeroUsize::new(capacity).unwrap_or(NonZeroUsize::MIN);
        Self {
            cache: Arc::new(Mutex::new(LruCache::new(capacity))),
        }
    }

    pub fn from_config(config: &TileLoadingConfig) -> Self {
        Self::new(config.cache_size)
    }

    pub fn get(&self, coord: &TileCoord) -> Option<Arc<Vec<u8>>> {
        self.cache.lock().ok()?.get(&coord.canonical()).cloned()
    }

    pub fn insert(&self, coord: TileCoord, data: Vec<u8>) {
        self.put(coord, Arc::new(data));
    }

    /// Insert already shared tile data
    pub fn put(&self, coord: TileCoord, data: Arc<Vec<u8>>) {
        if let Ok(mut cache) = self.cache.lock() {
            cache.put(coord.canonical(), data);
        }
    }

    /// Whether the tile is stored, without touching its recency
    pub fn contains(&self, coord: &TileCoord) -> bool {
        self.cache
            .lock()
            .map(|cache| cache.contains(&coord.canonical()))
            .unwrap_or(false)
    }

    /// The tiles of `coords` that are not stored yet, in order
    pub fn missing<'a, I>(&self, coords: I) -> Vec<TileCoord>
    where
        I: IntoIterator<Item = &'a TileCoord>,
    {
        match self.cache.lock() {
            Ok(cache) => coords
                .into_iter()
                .filter(|coord| !cache.contains(&coord.canonical()))
                .copied()
                .collect(),
            Err(_) => coords.into_iter().copied().collect(),
        }
    }

    pub fn remove(&self, coord: &TileCoord) -> Option<Arc<Vec<u8>>> {
        self.cache.lock().ok()?.pop(&coord.canonical())
    }

    pub fn clear(&self) {
        if let Ok(mut cache) = self.cache.lock() {
            cache.clear();
        }
    }

    pub fn len(&self) -> usize {
        self.cache.lock().map(|cache| cache.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn capacity(&self) -> usize {
        self.cache.lock().map(|cache| cache.cap().get()).unwrap_or(0)
    }
}

impl Clone for TileCache {
    fn clone(&self) -> Self {
        Self {
            cache: Arc::clone(&self.cache),
        }
    }
}

impl Default for TileCache {
    fn default() -> Self {
        Self::from_config(&TileLoadingConfig::default())
    }
}
