//! Text measurement and glyph blitting.
//!
//! The overlay only needs two things from a font: how large a string will
//! be, and drawing it at a top-left anchor. [`TextPainter`] captures that;
//! [`MonoTextPainter`] implements it with the `embedded-graphics` bitmap
//! fonts.

use embedded_graphics::mono_font::iso_8859_1::FONT_6X10;
use embedded_graphics::mono_font::{MonoFont, MonoTextStyle};
use embedded_graphics::pixelcolor::Rgb888;
use embedded_graphics::prelude::*;
use embedded_graphics::text::renderer::TextRenderer;
use embedded_graphics::text::{Baseline, Text};
use image::Rgb;

use super::canvas::{infallible, to_rgb888, FrameTarget};
use crate::compose::Frame;

/// Text measurement and drawing capability used by the overlay.
pub trait TextPainter {
    /// Width and height in pixels of `text` when drawn.
    fn measure(&self, text: &str) -> (u32, u32);

    /// Draw `text` with its bounding box's top-left corner at `top_left`.
    fn draw(&self, frame: &mut Frame, text: &str, top_left: (i32, i32), color: Rgb<u8>);
}

/// Bitmap-font text painter.
///
/// Defaults to the ISO-8859-1 6×10 font, which includes the `°` glyph used
/// by the compass label.
#[derive(Clone, Copy)]
pub struct MonoTextPainter {
    font: &'static MonoFont<'static>,
}

impl MonoTextPainter {
    pub fn new() -> Self {
        Self { font: &FONT_6X10 }
    }

    /// Use a different mono font.
    pub fn with_font(font: &'static MonoFont<'static>) -> Self {
        Self { font }
    }

    fn style(&self, color: Rgb888) -> MonoTextStyle<'static, Rgb888> {
        MonoTextStyle::new(self.font, color)
    }
}

impl Default for MonoTextPainter {
    fn default() -> Self {
        Self::new()
    }
}

impl TextPainter for MonoTextPainter {
    fn measure(&self, text: &str) -> (u32, u32) {
        let metrics = self
            .style(Rgb888::WHITE)
            .measure_string(text, Point::zero(), Baseline::Top);
        let size = metrics.bounding_box.size;
        (size.width, size.height)
    }

    fn draw(&self, frame: &mut Frame, text: &str, top_left: (i32, i32), color: Rgb<u8>) {
        let mut target = FrameTarget::new(frame);
        let origin = Point::new(top_left.0, top_left.1);
        infallible(
            Text::with_baseline(text, origin, self.style(to_rgb888(color)), Baseline::Top)
                .draw(&mut target),
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_measure_monospace() {
        let painter = MonoTextPainter::new();
        assert_eq!(painter.measure("N 45°"), (30, 10));
    }

    #[test]
    fn test_draw_stays_inside_measured_box() {
        let painter = MonoTextPainter::new();
        let mut frame = Frame::new(60, 30);
        let (w, h) = painter.measure("N 270°");
        painter.draw(&mut frame, "N 270°", (10, 5), Rgb([255, 0, 0]));

        let mut drawn = 0;
        for (x, y, pixel) in frame.enumerate_pixels() {
            if *pixel == Rgb([255, 0, 0]) {
                drawn += 1;
                assert!(x >= 10 && x < 10 + w, "x {} outside text box", x);
                assert!(y >= 5 && y < 5 + h, "y {} outside text box", y);
            }
        }
        assert!(drawn > 0);
    }
}
