//! The render loop.
//!
//! Each cycle reads a fix, renders it and pushes the frame, then sleeps for
//! the configured interval. Failed cycles are retried after an exponential
//! backoff. Transient failures are retried indefinitely; fatal ones end the
//! loop after `max_fatal_failures` of them without a successful cycle in
//! between.
//!
//! The loop polls a shared shutdown flag between cycles and while sleeping,
//! so a Ctrl+C handler that sets the flag stops it within one poll slice.

use std::io::BufRead;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use tracing::{error, info, warn};

use super::{Backoff, MapRenderer, RenderError};
use crate::display::Panel;
use crate::gps::{GeoFix, GpsDecoder};
use crate::overlay::{MonoTextPainter, TextPainter};
use crate::tiles::TileSource;

/// Default pause between successful cycles (3 seconds).
pub const DEFAULT_INTERVAL_SECS: u64 = 3;

/// Default number of fatal failures tolerated before the loop gives up.
pub const DEFAULT_MAX_FATAL_FAILURES: u32 = 5;

/// Granularity of shutdown polling while sleeping.
const SHUTDOWN_POLL: Duration = Duration::from_millis(100);

/// Render loop timing and failure policy.
#[derive(Clone, Debug, PartialEq)]
pub struct RenderLoopConfig {
    /// Pause after a successful cycle.
    pub interval: Duration,
    /// Delay schedule after failed cycles.
    pub backoff: Backoff,
    /// Fatal failures since the last success before the loop returns.
    pub max_fatal_failures: u32,
}

impl Default for RenderLoopConfig {
    fn default() -> Self {
        Self {
            interval: Duration::from_secs(DEFAULT_INTERVAL_SECS),
            backoff: Backoff::default(),
            max_fatal_failures: DEFAULT_MAX_FATAL_FAILURES,
        }
    }
}

/// Counters reported when the loop stops.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LoopSummary {
    /// Frames successfully displayed.
    pub frames: u64,
    /// Cycles that failed.
    pub failures: u64,
}

/// Drives a [`MapRenderer`] from a GPS stream until shut down.
pub struct RenderLoop<S, P, R, T = MonoTextPainter> {
    renderer: MapRenderer<S, P, T>,
    gps: R,
    decoder: GpsDecoder,
    config: RenderLoopConfig,
    shutdown: Arc<AtomicBool>,
}

impl<S, P, R, T> RenderLoop<S, P, R, T>
where
    S: TileSource,
    P: Panel,
    R: BufRead,
    T: TextPainter,
{
    pub fn new(
        renderer: MapRenderer<S, P, T>,
        gps: R,
        decoder: GpsDecoder,
        config: RenderLoopConfig,
    ) -> Self {
        Self {
            renderer,
            gps,
            decoder,
            config,
            shutdown: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Use an externally owned shutdown flag.
    pub fn with_shutdown(mut self, shutdown: Arc<AtomicBool>) -> Self {
        self.shutdown = shutdown;
        self
    }

    /// Flag that stops the loop when set.
    pub fn shutdown_handle(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.shutdown)
    }

    pub fn renderer(&self) -> &MapRenderer<S, P, T> {
        &self.renderer
    }

    /// Run one cycle: read a fix, render it, display it.
    pub fn run_cycle(&mut self) -> Result<GeoFix, RenderError> {
        let fix = self.decoder.next_fix(&mut self.gps)?;
        self.renderer.render_fix(&fix)?;
        Ok(fix)
    }

    /// Run until the shutdown flag is set.
    ///
    /// # Errors
    ///
    /// Returns [`RenderError::Exhausted`] after `max_fatal_failures` fatal
    /// failures with no successful cycle in between.
    pub fn run(&mut self) -> Result<LoopSummary, RenderError> {
        let mut summary = LoopSummary::default();
        let mut consecutive_failures: u32 = 0;
        let mut fatal_failures: u32 = 0;

        info!(
            interval_ms = self.config.interval.as_millis() as u64,
            zoom = self.renderer.view().zoom(),
            "Render loop started"
        );

        while !self.is_shutdown() {
            match self.run_cycle() {
                Ok(fix) => {
                    summary.frames += 1;
                    consecutive_failures = 0;
                    fatal_failures = 0;
                    info!(
                        latitude = fix.latitude,
                        longitude = fix.longitude,
                        heading = fix.heading,
                        "Map updated"
                    );
                    self.sleep(self.config.interval);
                }
                Err(e) => {
                    summary.failures += 1;
                    consecutive_failures = consecutive_failures.saturating_add(1);

                    if e.is_fatal() {
                        fatal_failures += 1;
                        if fatal_failures >= self.config.max_fatal_failures {
                            error!(error = %e, failures = fatal_failures, "Render loop giving up");
                            return Err(RenderError::Exhausted {
                                failures: fatal_failures,
                                last: Box::new(e),
                            });
                        }
                        error!(
                            error = %e,
                            failures = fatal_failures,
                            max = self.config.max_fatal_failures,
                            "Render cycle failed"
                        );
                    } else {
                        warn!(error = %e, "Render cycle failed, will retry");
                    }

                    let delay = self.config.backoff.delay_for_attempt(consecutive_failures);
                    self.sleep(delay);
                }
            }
        }

        info!(
            frames = summary.frames,
            failures = summary.failures,
            "Render loop stopped"
        );
        Ok(summary)
    }

    fn is_shutdown(&self) -> bool {
        self.shutdown.load(Ordering::SeqCst)
    }

    /// Sleep for `duration`, waking early on shutdown.
    fn sleep(&self, duration: Duration) {
        let mut remaining = duration;
        while !remaining.is_zero() && !self.is_shutdown() {
            let slice = remaining.min(SHUTDOWN_POLL);
            thread::sleep(slice);
            remaining -= slice;
        }
    }
}
