//! Trailmap - GPS moving map for SPI TFT panels
//!
//! This library reads position fixes from an NMEA GPS receiver, assembles a
//! map view around each fix from pre-rendered tiles in an MBTiles database,
//! draws a position/heading overlay and pushes the frame to an ST7796 panel.
//!
//! # Pipeline
//!
//! ```text
//! GPS (NMEA) ──► gps::GpsDecoder ──► GeoFix
//!                                      │
//!      tiles::MbTiles ──► tiles::TileStore ──► compose::Compositor
//!                                                     │
//!                              overlay::OverlayRenderer ◄─┘
//!                                      │
//!                              display::St7796 ──► panel
//! ```
//!
//! [`render::RenderLoop`] runs the pipeline on a fixed cadence.

pub mod compose;
pub mod config;
pub mod coord;
pub mod display;
pub mod gps;
#[cfg(target_os = "linux")]
pub mod hardware;
pub mod logging;
pub mod overlay;
pub mod render;
pub mod tiles;

/// Crate version, for startup banners.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
