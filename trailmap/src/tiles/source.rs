//! Tile database access.
//!
//! [`TileSource`] is the seam between the tile store and the persisted
//! tiles. [`MbTiles`] reads an MBTiles file: a SQLite database whose `tiles`
//! table is keyed by `(zoom_level, tile_column, tile_row)` with rows in the
//! TMS scheme.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use rusqlite::{params, Connection, OpenFlags, OptionalExtension};
use tracing::debug;

use super::{check_zoom, TileError};
use crate::coord::TileKey;

/// Source of encoded tile bytes.
///
/// Implementations return the compressed image bytes for a key in the XYZ
/// scheme, or [`TileError::NotFound`] when no tile is stored for it.
pub trait TileSource {
    /// Fetch the encoded bytes for one tile.
    fn tile_data(&self, key: TileKey) -> Result<Vec<u8>, TileError>;
}

const TILE_QUERY: &str =
    "SELECT tile_data FROM tiles WHERE zoom_level = ?1 AND tile_column = ?2 AND tile_row = ?3";

/// Read-only MBTiles tile database.
pub struct MbTiles {
    conn: Connection,
    path: PathBuf,
}

impl MbTiles {
    /// Open an MBTiles file read-only.
    ///
    /// # Errors
    ///
    /// Returns [`TileError::Open`] if the file does not exist or is not a
    /// SQLite database.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, TileError> {
        let path = path.as_ref().to_path_buf();
        let conn = Connection::open_with_flags(
            &path,
            OpenFlags::SQLITE_OPEN_READ_ONLY | OpenFlags::SQLITE_OPEN_NO_MUTEX,
        )
        .map_err(|source| TileError::Open {
            path: path.clone(),
            source,
        })?;

        debug!(path = %path.display(), "Opened tile database");
        Ok(Self { conn, path })
    }

    /// Path of the underlying database file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read the optional `metadata` table.
    ///
    /// Tilesets without a metadata table yield an empty [`TilesetMetadata`].
    pub fn metadata(&self) -> Result<TilesetMetadata, TileError> {
        let has_table: bool = self
            .conn
            .query_row(
                "SELECT COUNT(*) FROM sqlite_master WHERE type = 'table' AND name = 'metadata'",
                [],
                |row| row.get::<_, i64>(0),
            )
            .map(|count| count > 0)?;

        let mut metadata = TilesetMetadata::default();
        if !has_table {
            return Ok(metadata);
        }

        let mut stmt = self.conn.prepare("SELECT name, value FROM metadata")?;
        let rows = stmt.query_map([], |row| {
            Ok((row.get::<_, String>(0)?, row.get::<_, String>(1)?))
        })?;
        for row in rows {
            let (name, value) = row?;
            metadata.entries.insert(name, value);
        }
        Ok(metadata)
    }

    /// Number of stored tiles per zoom level, in ascending zoom order.
    pub fn tile_counts(&self) -> Result<Vec<(u8, u64)>, TileError> {
        let mut stmt = self.conn.prepare(
            "SELECT zoom_level, COUNT(*) FROM tiles GROUP BY zoom_level ORDER BY zoom_level",
        )?;
        let rows = stmt.query_map([], |row| {
            Ok((row.get::<_, u8>(0)?, row.get::<_, i64>(1)? as u64))
        })?;
        rows.collect::<Result<Vec<_>, _>>().map_err(TileError::from)
    }
}

impl TileSource for MbTiles {
    fn tile_data(&self, key: TileKey) -> Result<Vec<u8>, TileError> {
        check_zoom(key)?;
        let mut stmt = self.conn.prepare_cached(TILE_QUERY)?;
        let data = stmt
            .query_row(params![key.zoom, key.x, key.tms_row()], |row| {
                row.get::<_, Vec<u8>>(0)
            })
            .optional()?;

        data.ok_or(TileError::NotFound(key))
    }
}

/// Key/value pairs from an MBTiles `metadata` table.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TilesetMetadata {
    /// Raw entries, sorted by name.
    pub entries: BTreeMap<String, String>,
}

impl TilesetMetadata {
    /// Look up a metadata value by name.
    pub fn get(&self, name: &str) -> Option<&str> {
        self.entries.get(name).map(String::as_str)
    }

    /// Tileset name, if present.
    pub fn name(&self) -> Option<&str> {
        self.get("name")
    }

    /// Tile image format (`png`, `jpg`, `webp`), if present.
    pub fn format(&self) -> Option<&str> {
        self.get("format")
    }

    /// Declared zoom range, if both bounds are present and numeric.
    pub fn zoom_range(&self) -> Option<(u8, u8)> {
        let min = self.get("minzoom")?.trim().parse().ok()?;
        let max = self.get("maxzoom")?.trim().parse().ok()?;
        Some((min, max))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn create_tileset(dir: &TempDir, with_metadata: bool) -> PathBuf {
        let path = dir.path().join("test.mbtiles");
        let conn = Connection::open(&path).unwrap();
        conn.execute_batch(
            "CREATE TABLE tiles (zoom_level INTEGER, tile_column INTEGER, tile_row INTEGER, tile_data BLOB);",
        )
        .unwrap();
        if with_metadata {
            conn.execute_batch(
                "CREATE TABLE metadata (name TEXT, value TEXT);
                 INSERT INTO metadata VALUES ('name', 'Oak Park');
                 INSERT INTO metadata VALUES ('format', 'png');
                 INSERT INTO metadata VALUES ('minzoom', '12');
                 INSERT INTO metadata VALUES ('maxzoom', '16');",
            )
            .unwrap();
        }
        path
    }

    fn insert_tile(path: &Path, zoom: u8, col: i64, tms_row: i64, data: &[u8]) {
        let conn = Connection::open(path).unwrap();
        conn.execute(
            "INSERT INTO tiles VALUES (?1, ?2, ?3, ?4)",
            params![zoom, col, tms_row, data],
        )
        .unwrap();
    }

    #[test]
    fn test_lookup_uses_tms_row() {
        let dir = TempDir::new().unwrap();
        let path = create_tileset(&dir, false);
        // XYZ row 12575 at zoom 15 is stored as TMS row 32767 - 12575
        insert_tile(&path, 15, 5328, 20192, b"tile-bytes");

        let db = MbTiles::open(&path).unwrap();
        let data = db.tile_data(TileKey::new(15, 5328, 12575)).unwrap();
        assert_eq!(data, b"tile-bytes");
    }

    #[test]
    fn test_missing_tile_is_not_found() {
        let dir = TempDir::new().unwrap();
        let path = create_tileset(&dir, false);
        insert_tile(&path, 15, 5328, 20192, b"tile-bytes");

        let db = MbTiles::open(&path).unwrap();
        // Same column, but the XYZ row itself is not the stored row
        let result = db.tile_data(TileKey::new(15, 5328, 20192));
        assert!(matches!(result, Err(TileError::NotFound(_))));
    }

    #[test]
    fn test_zoom_past_maximum_is_rejected() {
        let dir = TempDir::new().unwrap();
        let path = create_tileset(&dir, false);

        let db = MbTiles::open(&path).unwrap();
        let result = db.tile_data(TileKey::new(63, 0, 0));
        assert!(matches!(result, Err(TileError::InvalidGeometry(_))));
    }

    #[test]
    fn test_open_missing_file_fails() {
        let dir = TempDir::new().unwrap();
        let result = MbTiles::open(dir.path().join("absent.mbtiles"));
        assert!(matches!(result, Err(TileError::Open { .. })));
    }

    #[test]
    fn test_metadata_read() {
        let dir = TempDir::new().unwrap();
        let path = create_tileset(&dir, true);

        let db = MbTiles::open(&path).unwrap();
        let metadata = db.metadata().unwrap();
        assert_eq!(metadata.name(), Some("Oak Park"));
        assert_eq!(metadata.format(), Some("png"));
        assert_eq!(metadata.zoom_range(), Some((12, 16)));
    }

    #[test]
    fn test_metadata_absent_table_is_empty() {
        let dir = TempDir::new().unwrap();
        let path = create_tileset(&dir, false);

        let db = MbTiles::open(&path).unwrap();
        let metadata = db.metadata().unwrap();
        assert!(metadata.entries.is_empty());
        assert_eq!(metadata.zoom_range(), None);
    }

    #[test]
    fn test_tile_counts_per_zoom() {
        let dir = TempDir::new().unwrap();
        let path = create_tileset(&dir, false);
        insert_tile(&path, 14, 1, 1, b"a");
        insert_tile(&path, 15, 1, 1, b"b");
        insert_tile(&path, 15, 1, 2, b"c");

        let db = MbTiles::open(&path).unwrap();
        assert_eq!(db.tile_counts().unwrap(), vec![(14, 1), (15, 2)]);
    }
}
