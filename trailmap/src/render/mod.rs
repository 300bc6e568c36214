//! Render orchestration.
//!
//! [`MapView`] turns a fix into a decorated frame, [`MapRenderer`] adds the
//! panel, and [`RenderLoop`] repeats the cycle on a fixed cadence with
//! backoff on failure.
//!
//! # Example
//!
//! ```ignore
//! use trailmap::render::{MapRenderer, MapView, RenderLoop, RenderLoopConfig};
//!
//! let renderer = MapRenderer::new(MapView::new(compositor, 15), panel)?;
//! let mut render_loop = RenderLoop::new(renderer, gps_reader, decoder, RenderLoopConfig::default())
//!     .with_shutdown(shutdown);
//! let summary = render_loop.run()?;
//! ```

mod backoff;
mod error;
mod renderer;
mod runner;

pub use backoff::{
    Backoff, DEFAULT_BACKOFF_MULTIPLIER, DEFAULT_INITIAL_DELAY_MS, DEFAULT_MAX_DELAY_SECS,
};
pub use error::RenderError;
pub use renderer::{MapRenderer, MapView};
pub use runner::{
    LoopSummary, RenderLoop, RenderLoopConfig, DEFAULT_INTERVAL_SECS, DEFAULT_MAX_FATAL_FAILURES,
};
