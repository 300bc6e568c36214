//! Cached tile lookup.
//!
//! The tile store answers `fetch(zoom, x, y)` from a bounded in-memory cache
//! and falls back to the tile database on a miss. Decoded tiles (and the
//! shared placeholder for tiles the database does not have) are inserted
//! into the cache before they are returned.
//!
//! The cache is a `moka::sync::Cache` bounded by entry count, so a long
//! drive across many tiles cannot grow memory without limit. It evicts in
//! LRU order and admits every insert: a freshly fetched tile is always
//! served from the cache on the next frame, even when the cache is full.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use image::imageops::FilterType;
use image::RgbImage;
use moka::policy::EvictionPolicy;
use moka::sync::Cache;
use tracing::{debug, trace, warn};

use super::check_zoom;
use super::placeholder::placeholder_tile;
use super::source::TileSource;
use super::TileError;
use crate::coord::TileKey;

/// Decoded tile raster, always `tile_size × tile_size`.
pub type TileImage = RgbImage;

/// Default maximum number of cached tiles.
///
/// A 5×5 grid needs 25 tiles per frame; 256 tiles of 256×256 RGB is about
/// 50 MB and covers roughly ten screen-widths of travel in each direction.
pub const DEFAULT_CACHE_TILES: u64 = 256;

/// Point-in-time tile store statistics.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TileStoreStats {
    /// Lookups answered from the cache.
    pub hits: u64,
    /// Lookups that went to the database.
    pub misses: u64,
    /// Misses answered with the placeholder tile.
    pub placeholders: u64,
    /// Tiles currently cached.
    pub entries: u64,
}

/// Tile lookup with a bounded cache in front of a [`TileSource`].
pub struct TileStore<S> {
    source: S,
    cache: Cache<TileKey, Arc<TileImage>>,
    tile_size: u32,
    placeholder: Arc<TileImage>,
    hits: AtomicU64,
    misses: AtomicU64,
    placeholders: AtomicU64,
}

impl<S: TileSource> TileStore<S> {
    /// Create a tile store.
    ///
    /// # Arguments
    ///
    /// * `source` - Tile database
    /// * `tile_size` - Side length of every tile in pixels
    /// * `max_tiles` - Maximum number of cached tiles
    pub fn new(source: S, tile_size: u32, max_tiles: u64) -> Self {
        let cache = Cache::builder()
            .max_capacity(max_tiles)
            .eviction_policy(EvictionPolicy::lru())
            .build();

        Self {
            source,
            cache,
            tile_size,
            placeholder: Arc::new(placeholder_tile(tile_size)),
            hits: AtomicU64::new(0),
            misses: AtomicU64::new(0),
            placeholders: AtomicU64::new(0),
        }
    }

    /// Side length of the tiles this store hands out.
    pub fn tile_size(&self) -> u32 {
        self.tile_size
    }

    /// Fetch the tile at `(zoom, x, y)` in the XYZ scheme.
    ///
    /// Tiles missing from the database are answered with a uniform gray
    /// placeholder; that placeholder is cached like any other tile.
    ///
    /// # Errors
    ///
    /// Returns [`TileError::Database`] if the database query itself fails,
    /// or [`TileError::InvalidGeometry`] for zoom levels past
    /// [`MAX_ZOOM`](crate::coord::MAX_ZOOM).
    pub fn fetch(&self, zoom: u8, x: i64, y: i64) -> Result<Arc<TileImage>, TileError> {
        self.fetch_key(TileKey::new(zoom, x, y))
    }

    /// Fetch the tile for `key`. See [`TileStore::fetch`].
    pub fn fetch_key(&self, key: TileKey) -> Result<Arc<TileImage>, TileError> {
        check_zoom(key)?;
        if let Some(tile) = self.cache.get(&key) {
            self.hits.fetch_add(1, Ordering::Relaxed);
            trace!(tile = %key, "Tile cache hit");
            return Ok(tile);
        }
        self.misses.fetch_add(1, Ordering::Relaxed);

        let tile = match self.source.tile_data(key) {
            Ok(bytes) => match self.decode(key, &bytes) {
                Ok(image) => Arc::new(image),
                Err(e) => {
                    warn!(tile = %key, error = %e, "Undecodable tile, using placeholder");
                    self.placeholder()
                }
            },
            Err(TileError::NotFound(_)) => {
                debug!(tile = %key, "Tile not in database, using placeholder");
                self.placeholder()
            }
            Err(e) => return Err(e),
        };

        self.cache.insert(key, Arc::clone(&tile));
        Ok(tile)
    }

    /// Current statistics.
    pub fn stats(&self) -> TileStoreStats {
        self.cache.run_pending_tasks();
        TileStoreStats {
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
            placeholders: self.placeholders.load(Ordering::Relaxed),
            entries: self.cache.entry_count(),
        }
    }

    /// Borrow the underlying tile source.
    pub fn source(&self) -> &S {
        &self.source
    }

    fn placeholder(&self) -> Arc<TileImage> {
        self.placeholders.fetch_add(1, Ordering::Relaxed);
        Arc::clone(&self.placeholder)
    }

    fn decode(&self, key: TileKey, bytes: &[u8]) -> Result<TileImage, TileError> {
        let image = image::load_from_memory(bytes)
            .map_err(|source| TileError::Decode { key, source })?
            .to_rgb8();

        if image.dimensions() == (self.tile_size, self.tile_size) {
            return Ok(image);
        }

        debug!(
            tile = %key,
            width = image.width(),
            height = image.height(),
            tile_size = self.tile_size,
            "Resizing tile to configured tile size"
        );
        Ok(image::imageops::resize(
            &image,
            self.tile_size,
            self.tile_size,
            FilterType::Triangle,
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::coord::MAX_ZOOM;
    use crate::tiles::placeholder::PLACEHOLDER_COLOR;
    use image::{ImageFormat, Rgb};
    use std::cell::RefCell;
    use std::collections::HashMap;
    use std::io::Cursor;

    /// In-memory tile source that records every lookup.
    #[derive(Default)]
    struct MockSource {
        tiles: HashMap<TileKey, Vec<u8>>,
        lookups: RefCell<Vec<TileKey>>,
        fail: bool,
    }

    impl MockSource {
        fn with_tile(mut self, key: TileKey, bytes: Vec<u8>) -> Self {
            self.tiles.insert(key, bytes);
            self
        }

        fn lookup_count(&self) -> usize {
            self.lookups.borrow().len()
        }
    }

    impl TileSource for MockSource {
        fn tile_data(&self, key: TileKey) -> Result<Vec<u8>, TileError> {
            self.lookups.borrow_mut().push(key);
            if self.fail {
                return Err(TileError::Database(rusqlite::Error::InvalidQuery));
            }
            self.tiles.get(&key).cloned().ok_or(TileError::NotFound(key))
        }
    }

    fn png_bytes(size: u32, color: Rgb<u8>) -> Vec<u8> {
        let image = RgbImage::from_pixel(size, size, color);
        let mut bytes = Vec::new();
        image
            .write_to(&mut Cursor::new(&mut bytes), ImageFormat::Png)
            .unwrap();
        bytes
    }

    #[test]
    fn test_missing_tile_returns_placeholder() {
        let store = TileStore::new(MockSource::default(), 256, 16);

        let tile = store.fetch(15, 1, 2).unwrap();
        assert_eq!(tile.dimensions(), (256, 256));
        assert!(tile.pixels().all(|p| *p == PLACEHOLDER_COLOR));
    }

    #[test]
    fn test_second_fetch_returns_cached_instance() {
        let store = TileStore::new(MockSource::default(), 256, 16);

        let first = store.fetch(15, 1, 2).unwrap();
        let second = store.fetch(15, 1, 2).unwrap();

        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(store.source().lookup_count(), 1, "no re-query on hit");
    }

    #[test]
    fn test_decoded_tile_is_cached() {
        let key = TileKey::new(15, 10, 20);
        let source = MockSource::default().with_tile(key, png_bytes(256, Rgb([10, 200, 30])));
        let store = TileStore::new(source, 256, 16);

        let first = store.fetch_key(key).unwrap();
        assert_eq!(first.get_pixel(0, 0), &Rgb([10, 200, 30]));

        let second = store.fetch_key(key).unwrap();
        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(store.source().lookup_count(), 1);
    }

    #[test]
    fn test_wrong_size_tile_is_resized() {
        let key = TileKey::new(15, 10, 20);
        let source = MockSource::default().with_tile(key, png_bytes(512, Rgb([0, 0, 255])));
        let store = TileStore::new(source, 256, 16);

        let tile = store.fetch_key(key).unwrap();
        assert_eq!(tile.dimensions(), (256, 256));
        assert_eq!(tile.get_pixel(128, 128), &Rgb([0, 0, 255]));
    }

    #[test]
    fn test_undecodable_tile_falls_back_to_placeholder() {
        let key = TileKey::new(15, 10, 20);
        let source = MockSource::default().with_tile(key, b"not an image".to_vec());
        let store = TileStore::new(source, 64, 16);

        let tile = store.fetch_key(key).unwrap();
        assert_eq!(tile.dimensions(), (64, 64));
        assert_eq!(tile.get_pixel(0, 0), &PLACEHOLDER_COLOR);
    }

    #[test]
    fn test_database_error_propagates() {
        let source = MockSource {
            fail: true,
            ..Default::default()
        };
        let store = TileStore::new(source, 64, 16);

        let result = store.fetch(15, 1, 1);
        assert!(matches!(result, Err(TileError::Database(_))));
        // Failures are not cached
        let _ = store.fetch(15, 1, 1);
        assert_eq!(store.source().lookup_count(), 2);
    }

    #[test]
    fn test_cache_is_bounded() {
        let store = TileStore::new(MockSource::default(), 8, 4);

        for x in 0..50 {
            store.fetch(10, x, 0).unwrap();
        }

        let stats = store.stats();
        assert!(stats.entries <= 4, "cache holds {} entries", stats.entries);
        assert_eq!(stats.misses, 50);
    }

    #[test]
    fn test_full_cache_admits_new_tiles() {
        let store = TileStore::new(MockSource::default(), 8, 25);

        // Fill the cache with one grid's worth of frequently used tiles
        for _ in 0..10 {
            for x in 0..25 {
                store.fetch(10, x, 0).unwrap();
            }
        }
        let before = store.source().lookup_count();

        let first = store.fetch(10, 100, 0).unwrap();
        let second = store.fetch(10, 100, 0).unwrap();

        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(store.source().lookup_count() - before, 1, "no re-query on hit");
    }

    #[test]
    fn test_moving_grid_is_queried_once_per_tile() {
        let store = TileStore::new(MockSource::default(), 8, 25);
        for x in 0..25 {
            store.fetch(10, x, 0).unwrap();
        }

        // The same five new tiles are needed on every following frame
        let before = store.source().lookup_count();
        for _ in 0..10 {
            for x in 25..30 {
                store.fetch(10, x, 0).unwrap();
            }
        }
        assert_eq!(store.source().lookup_count() - before, 5);
    }

    #[test]
    fn test_zoom_past_maximum_is_rejected() {
        let store = TileStore::new(MockSource::default(), 8, 16);

        let result = store.fetch(MAX_ZOOM + 1, 0, 0);
        assert!(matches!(result, Err(TileError::InvalidGeometry(_))));
        assert!(matches!(store.fetch(63, 0, 0), Err(TileError::InvalidGeometry(_))));
        assert_eq!(store.source().lookup_count(), 0);
    }

    #[test]
    fn test_statistics() {
        let store = TileStore::new(MockSource::default(), 8, 16);

        store.fetch(10, 0, 0).unwrap();
        store.fetch(10, 0, 0).unwrap();
        store.fetch(10, 1, 0).unwrap();

        let stats = store.stats();
        assert_eq!(stats.hits, 1);
        assert_eq!(stats.misses, 2);
        assert_eq!(stats.placeholders, 2);
        assert_eq!(stats.entries, 2);
    }
}
