//! Position and heading overlay.
//!
//! Draws onto a composed frame, in this order:
//!
//! 1. a filled marker at the screen center (the current position),
//! 2. a heading vector from the center,
//! 3. the coordinates, anchored top-left,
//! 4. a compass label `N <deg>°`, anchored bottom-right.
//!
//! Heading follows the trigonometric convention: 0° points right (east on a
//! north-up map) and angles grow counter-clockwise. Screen y grows downward,
//! so the vector's y displacement is the negated sine.

mod canvas;
mod text;

pub use canvas::FrameTarget;
pub use text::{MonoTextPainter, TextPainter};

use embedded_graphics::prelude::*;
use embedded_graphics::primitives::{Circle, Line, PrimitiveStyle};
use image::Rgb;

use canvas::{infallible, to_rgb888};

use crate::compose::Frame;

/// Radius of the position marker in pixels.
pub const MARKER_RADIUS: u32 = 4;

/// Length of the heading vector in pixels.
pub const HEADING_LENGTH: f64 = 15.0;

/// Stroke width of the heading vector in pixels.
pub const HEADING_WIDTH: u32 = 2;

/// Distance between text and the frame edges.
pub const TEXT_MARGIN: i32 = 5;

pub const MARKER_COLOR: Rgb<u8> = Rgb([255, 0, 0]);
pub const HEADING_COLOR: Rgb<u8> = Rgb([0, 0, 255]);
pub const TEXT_COLOR: Rgb<u8> = Rgb([255, 0, 0]);

/// Draws the position overlay onto frames.
pub struct OverlayRenderer<T = MonoTextPainter> {
    painter: T,
}

impl OverlayRenderer<MonoTextPainter> {
    /// Overlay renderer with the default bitmap font.
    pub fn new() -> Self {
        Self::with_painter(MonoTextPainter::new())
    }
}

impl Default for OverlayRenderer<MonoTextPainter> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: TextPainter> OverlayRenderer<T> {
    pub fn with_painter(painter: T) -> Self {
        Self { painter }
    }

    /// Draw the overlay for a fix onto `frame` in place.
    ///
    /// # Arguments
    ///
    /// * `frame` - Composed map frame
    /// * `lat` - Latitude in degrees
    /// * `lon` - Longitude in degrees
    /// * `heading` - Heading in degrees, 0 = right, counter-clockwise
    pub fn draw(&self, frame: &mut Frame, lat: f64, lon: f64, heading: f64) {
        let (width, height) = frame.dimensions();
        let center = Point::new((width / 2) as i32, (height / 2) as i32);

        {
            let mut target = FrameTarget::new(frame);

            infallible(
                Circle::with_center(center, 2 * MARKER_RADIUS + 1)
                    .into_styled(PrimitiveStyle::with_fill(to_rgb888(MARKER_COLOR)))
                    .draw(&mut target),
            );

            let (end_x, end_y) =
                heading_endpoint((center.x as f64, center.y as f64), heading, HEADING_LENGTH);
            let end = Point::new(end_x.round() as i32, end_y.round() as i32);
            infallible(
                Line::new(center, end)
                    .into_styled(PrimitiveStyle::with_stroke(
                        to_rgb888(HEADING_COLOR),
                        HEADING_WIDTH,
                    ))
                    .draw(&mut target),
            );
        }

        self.painter.draw(
            frame,
            &coordinate_label(lat, lon),
            (TEXT_MARGIN, TEXT_MARGIN),
            TEXT_COLOR,
        );

        let label = compass_label(heading);
        let (text_width, text_height) = self.painter.measure(&label);
        let anchor = (
            width as i32 - text_width as i32 - TEXT_MARGIN,
            height as i32 - text_height as i32 - TEXT_MARGIN,
        );
        self.painter.draw(frame, &label, anchor, TEXT_COLOR);
    }
}

/// End point of a vector of `length` pixels from `center` along `heading`.
///
/// `heading` is in degrees, 0 = right, counter-clockwise positive.
#[inline]
pub fn heading_endpoint(center: (f64, f64), heading: f64, length: f64) -> (f64, f64) {
    let theta = heading.to_radians();
    (
        center.0 + length * theta.cos(),
        center.1 - length * theta.sin(),
    )
}

/// Coordinates rendered to five decimal places.
pub fn coordinate_label(lat: f64, lon: f64) -> String {
    format!("{:.5}, {:.5}", lat, lon)
}

/// Compass label with the heading truncated to whole degrees.
pub fn compass_label(heading: f64) -> String {
    format!("N {}°", heading.trunc() as i64)
}
