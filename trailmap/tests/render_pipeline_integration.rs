//! End-to-end render pipeline: NMEA stream → MBTiles → ST7796 wire bytes.

use std::cell::RefCell;
use std::convert::Infallible;
use std::io::Cursor;
use std::path::{Path, PathBuf};
use std::rc::Rc;
use std::sync::atomic::Ordering;
use std::time::Duration;

use embedded_hal::delay::DelayNs;
use embedded_hal::digital::{ErrorType as PinErrorType, OutputPin};
use embedded_hal::spi::{ErrorType as SpiErrorType, SpiBus};
use image::{ImageFormat, Rgb, RgbImage};
use rusqlite::{params, Connection};
use tempfile::TempDir;

use trailmap::compose::{Compositor, ScreenSize};
use trailmap::coord::{tile_key, tms_row};
use trailmap::display::{rgb565, PanelPins, St7796, St7796Config};
use trailmap::gps::GpsDecoder;
use trailmap::overlay::{HEADING_COLOR, MARKER_COLOR};
use trailmap::render::{Backoff, MapRenderer, MapView, RenderLoop, RenderLoopConfig};
use trailmap::tiles::{MbTiles, TileStore, PLACEHOLDER_COLOR};

const LAT: f64 = 38.55107;
const LON: f64 = -121.46074;
const ZOOM: u8 = 15;
const TILE: u32 = 64;
const WIDTH: u32 = 120;
const HEIGHT: u32 = 80;

const RMC: &str = "$GNRMC,201512.00,A,3833.06420,N,12127.64440,W,0.012,,161026,,,A*76\r\n";

const GREEN: Rgb<u8> = Rgb([0, 200, 0]);

// ============================================================================
// Fixtures
// ============================================================================

fn png(color: Rgb<u8>) -> Vec<u8> {
    let mut bytes = Vec::new();
    RgbImage::from_pixel(TILE, TILE, color)
        .write_to(&mut Cursor::new(&mut bytes), ImageFormat::Png)
        .unwrap();
    bytes
}

/// MBTiles file holding only the tile under the test position.
fn create_tileset(dir: &TempDir) -> PathBuf {
    let path = dir.path().join("test.mbtiles");
    let conn = Connection::open(&path).unwrap();
    conn.execute_batch(
        "CREATE TABLE metadata (name TEXT, value TEXT);
         INSERT INTO metadata VALUES ('name', 'Integration');
         CREATE TABLE tiles (zoom_level INTEGER, tile_column INTEGER, tile_row INTEGER, tile_data BLOB);",
    )
    .unwrap();

    let key = tile_key(LAT, LON, ZOOM);
    conn.execute(
        "INSERT INTO tiles VALUES (?1, ?2, ?3, ?4)",
        params![ZOOM, key.x, tms_row(ZOOM, key.y), png(GREEN)],
    )
    .unwrap();
    path
}

fn view(path: &Path) -> MapView<MbTiles> {
    let store = TileStore::new(MbTiles::open(path).unwrap(), TILE, 64);
    let compositor = Compositor::new(store, ScreenSize::new(WIDTH, HEIGHT)).unwrap();
    MapView::new(compositor, ZOOM)
}

// ============================================================================
// Recording panel hardware
// ============================================================================

#[derive(Default)]
struct Wire {
    dc_high: bool,
    cs_low: bool,
    /// Bytes written while CS was low and DC high, per burst.
    data_bursts: Vec<Vec<u8>>,
    commands: Vec<u8>,
}

type SharedWire = Rc<RefCell<Wire>>;

struct Bus(SharedWire);
struct Dc(SharedWire);
struct Cs(SharedWire);
struct Rst;
struct NoDelay;

impl SpiErrorType for Bus {
    type Error = Infallible;
}

impl SpiBus<u8> for Bus {
    fn read(&mut self, words: &mut [u8]) -> Result<(), Infallible> {
        words.fill(0);
        Ok(())
    }

    fn write(&mut self, words: &[u8]) -> Result<(), Infallible> {
        let mut wire = self.0.borrow_mut();
        assert!(wire.cs_low, "write without chip select");
        if wire.dc_high {
            if let Some(burst) = wire.data_bursts.last_mut() {
                burst.extend_from_slice(words);
            }
        } else {
            wire.commands.extend_from_slice(words);
        }
        Ok(())
    }

    fn transfer(&mut self, read: &mut [u8], write: &[u8]) -> Result<(), Infallible> {
        read.fill(0);
        self.write(write)
    }

    fn transfer_in_place(&mut self, _words: &mut [u8]) -> Result<(), Infallible> {
        Ok(())
    }

    fn flush(&mut self) -> Result<(), Infallible> {
        Ok(())
    }
}

impl PinErrorType for Dc {
    type Error = Infallible;
}

impl OutputPin for Dc {
    fn set_low(&mut self) -> Result<(), Infallible> {
        self.0.borrow_mut().dc_high = false;
        Ok(())
    }

    fn set_high(&mut self) -> Result<(), Infallible> {
        self.0.borrow_mut().dc_high = true;
        Ok(())
    }
}

impl PinErrorType for Cs {
    type Error = Infallible;
}

impl OutputPin for Cs {
    fn set_low(&mut self) -> Result<(), Infallible> {
        let mut wire = self.0.borrow_mut();
        wire.cs_low = true;
        if wire.dc_high {
            wire.data_bursts.push(Vec::new());
        }
        Ok(())
    }

    fn set_high(&mut self) -> Result<(), Infallible> {
        self.0.borrow_mut().cs_low = false;
        Ok(())
    }
}

impl PinErrorType for Rst {
    type Error = Infallible;
}

impl OutputPin for Rst {
    fn set_low(&mut self) -> Result<(), Infallible> {
        Ok(())
    }

    fn set_high(&mut self) -> Result<(), Infallible> {
        Ok(())
    }
}

impl DelayNs for NoDelay {
    fn delay_ns(&mut self, _ns: u32) {}
}

type TestPanel = St7796<Bus, Dc, Rst, Cs, NoDelay>;

fn panel(chunk_size: usize) -> (TestPanel, SharedWire) {
    let wire = SharedWire::default();
    let pins = PanelPins {
        dc: Dc(wire.clone()),
        rst: Rst,
        cs: Cs(wire.clone()),
    };
    let config = St7796Config::default()
        .with_size(WIDTH, HEIGHT)
        .with_chunk_size(chunk_size);
    let panel = St7796::new(Bus(wire.clone()), pins, NoDelay, config).unwrap();
    (panel, wire)
}

/// Decode the pixel at `(x, y)` from the last frame on the wire.
fn wire_pixel(wire: &Wire, x: u32, y: u32) -> u16 {
    let frame = wire.data_bursts.last().unwrap();
    let offset = ((y * WIDTH + x) * 2) as usize;
    u16::from_be_bytes([frame[offset], frame[offset + 1]])
}

fn color565(color: Rgb<u8>) -> u16 {
    rgb565(color[0], color[1], color[2])
}

// ============================================================================
// Tests
// ============================================================================

#[test]
fn test_single_cycle_reaches_the_wire() {
    let dir = TempDir::new().unwrap();
    let tiles = create_tileset(&dir);
    let (panel, wire) = panel(4096);

    let renderer = MapRenderer::new(view(&tiles), panel).unwrap();
    let nmea = format!("garbage\n$GPGSV,1*00\n{}", RMC);
    let mut render_loop = RenderLoop::new(
        renderer,
        Cursor::new(nmea.into_bytes()),
        GpsDecoder::default(),
        RenderLoopConfig::default(),
    );

    let fix = render_loop.run_cycle().unwrap();
    assert!((fix.latitude - LAT).abs() < 1e-6);
    assert!((fix.longitude - LON).abs() < 1e-6);
    assert_eq!(fix.heading, 0.0);

    let wire = wire.borrow();
    // Start-up then one frame: CASET, RASET, RAMWR
    assert_eq!(
        wire.commands,
        vec![0x11, 0x36, 0x3A, 0x29, 0x2A, 0x2B, 0x2C]
    );

    let frame = wire.data_bursts.last().unwrap();
    assert_eq!(frame.len(), (WIDTH * HEIGHT * 2) as usize);

    // Heading vector from the center over the marker, map tile around it,
    // placeholders beyond
    assert_eq!(wire_pixel(&wire, WIDTH / 2, HEIGHT / 2), color565(HEADING_COLOR));
    assert_eq!(wire_pixel(&wire, WIDTH / 2 - 3, HEIGHT / 2), color565(MARKER_COLOR));
    assert_eq!(wire_pixel(&wire, WIDTH / 2 - 15, HEIGHT / 2 + 15), color565(GREEN));
    assert_eq!(wire_pixel(&wire, 0, HEIGHT - 1), color565(PLACEHOLDER_COLOR));
}

#[test]
fn test_chunk_size_does_not_change_frame_bytes() {
    let dir = TempDir::new().unwrap();
    let tiles = create_tileset(&dir);

    let mut frames = Vec::new();
    for chunk_size in [4096, 100, 7] {
        let (panel, wire) = panel(chunk_size);
        let mut renderer = MapRenderer::new(view(&tiles), panel).unwrap();
        let fix = trailmap::gps::GeoFix::new(LAT, LON, 30.0, true);
        renderer.render_fix(&fix).unwrap();

        let bytes = wire.borrow().data_bursts.last().unwrap().clone();
        frames.push(bytes);
    }

    assert_eq!(frames[0], frames[1]);
    assert_eq!(frames[0], frames[2]);
}

#[test]
fn test_loop_runs_until_shutdown() {
    let dir = TempDir::new().unwrap();
    let tiles = create_tileset(&dir);
    let (panel, wire) = panel(4096);

    let renderer = MapRenderer::new(view(&tiles), panel).unwrap();
    let config = RenderLoopConfig {
        interval: Duration::ZERO,
        backoff: Backoff::new(Duration::ZERO, Duration::ZERO),
        max_fatal_failures: 3,
    };
    let mut render_loop = RenderLoop::new(
        renderer,
        Cursor::new(RMC.repeat(3).into_bytes()),
        GpsDecoder::new(5),
        config,
    );
    let shutdown = render_loop.shutdown_handle();

    // Three fixes, then only time-outs; stop once the stream runs dry
    for _ in 0..3 {
        render_loop.run_cycle().unwrap();
    }
    assert!(render_loop.run_cycle().is_err());
    shutdown.store(true, Ordering::SeqCst);
    let summary = render_loop.run().unwrap();
    assert_eq!(summary.frames, 0);

    // Start-up bursts (MADCTL, COLMOD) plus CASET/RASET/pixels per frame
    assert_eq!(wire.borrow().data_bursts.len(), 2 + 3 * 3);

    let stats = render_loop.renderer().view().compositor().store().stats();
    assert_eq!(stats.misses, 25, "tiles are cached across cycles");
    assert_eq!(stats.hits, 50);
}
