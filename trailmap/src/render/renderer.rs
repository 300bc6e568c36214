//! Frame production: compose, overlay, present.

use tracing::{debug, warn};

use super::RenderError;
use crate::compose::{Compositor, Frame};
use crate::display::{DisplayError, Panel};
use crate::gps::GeoFix;
use crate::overlay::{MonoTextPainter, OverlayRenderer, TextPainter};
use crate::tiles::{TileError, TileSource};

/// Map view at a fixed zoom: tile grid plus position overlay.
///
/// Needs no hardware; used for snapshots and by [`MapRenderer`].
pub struct MapView<S, T = MonoTextPainter> {
    compositor: Compositor<S>,
    overlay: OverlayRenderer<T>,
    zoom: u8,
}

impl<S: TileSource> MapView<S> {
    /// View with the default overlay.
    pub fn new(compositor: Compositor<S>, zoom: u8) -> Self {
        Self::with_overlay(compositor, OverlayRenderer::new(), zoom)
    }
}

impl<S: TileSource, T: TextPainter> MapView<S, T> {
    pub fn with_overlay(compositor: Compositor<S>, overlay: OverlayRenderer<T>, zoom: u8) -> Self {
        Self {
            compositor,
            overlay,
            zoom,
        }
    }

    pub fn zoom(&self) -> u8 {
        self.zoom
    }

    pub fn compositor(&self) -> &Compositor<S> {
        &self.compositor
    }

    /// Render the frame for `fix`.
    pub fn render(&self, fix: &GeoFix) -> Result<Frame, TileError> {
        let mut frame = self
            .compositor
            .compose(fix.latitude, fix.longitude, self.zoom)?;
        self.overlay
            .draw(&mut frame, fix.latitude, fix.longitude, fix.heading);
        Ok(frame)
    }
}

/// Owns everything needed to turn a fix into pixels on a panel.
pub struct MapRenderer<S, P, T = MonoTextPainter> {
    view: MapView<S, T>,
    panel: P,
}

impl<S, P, T> MapRenderer<S, P, T>
where
    S: TileSource,
    P: Panel,
    T: TextPainter,
{
    /// Pair a view with a panel.
    ///
    /// # Errors
    ///
    /// Returns [`DisplayError::FrameSize`] if the view's screen geometry does
    /// not match the panel.
    pub fn new(view: MapView<S, T>, panel: P) -> Result<Self, RenderError> {
        let screen = view.compositor().screen();
        let (width, height) = panel.size();
        if (screen.width, screen.height) != (width, height) {
            return Err(DisplayError::FrameSize {
                width,
                height,
                frame_width: screen.width,
                frame_height: screen.height,
            }
            .into());
        }
        Ok(Self { view, panel })
    }

    pub fn view(&self) -> &MapView<S, T> {
        &self.view
    }

    pub fn panel(&self) -> &P {
        &self.panel
    }

    /// Compose, decorate and display the frame for `fix`.
    pub fn render_fix(&mut self, fix: &GeoFix) -> Result<(), RenderError> {
        if !fix.valid {
            warn!(
                latitude = fix.latitude,
                longitude = fix.longitude,
                "GPS reports no fix, rendering reported position"
            );
        }

        let frame = self.view.render(fix)?;
        self.panel.display(&frame)?;
        debug!(
            latitude = fix.latitude,
            longitude = fix.longitude,
            heading = fix.heading,
            "Frame displayed"
        );
        Ok(())
    }

    /// Split back into the view and the panel.
    pub fn into_parts(self) -> (MapView<S, T>, P) {
        (self.view, self.panel)
    }
}
