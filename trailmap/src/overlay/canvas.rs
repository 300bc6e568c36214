//! `embedded-graphics` draw target over an RGB frame.

use std::convert::Infallible;

use embedded_graphics::pixelcolor::Rgb888;
use embedded_graphics::prelude::*;
use image::Rgb;

use crate::compose::Frame;

/// Borrows a [`Frame`] as an `embedded-graphics` [`DrawTarget`].
///
/// Pixels outside the frame are clipped silently.
pub struct FrameTarget<'a> {
    frame: &'a mut Frame,
}

impl<'a> FrameTarget<'a> {
    pub fn new(frame: &'a mut Frame) -> Self {
        Self { frame }
    }
}

impl OriginDimensions for FrameTarget<'_> {
    fn size(&self) -> Size {
        Size::new(self.frame.width(), self.frame.height())
    }
}

impl DrawTarget for FrameTarget<'_> {
    type Color = Rgb888;
    type Error = Infallible;

    fn draw_iter<I>(&mut self, pixels: I) -> Result<(), Self::Error>
    where
        I: IntoIterator<Item = Pixel<Self::Color>>,
    {
        let (width, height) = self.frame.dimensions();
        for Pixel(point, color) in pixels {
            if point.x < 0 || point.y < 0 {
                continue;
            }
            let (x, y) = (point.x as u32, point.y as u32);
            if x >= width || y >= height {
                continue;
            }
            self.frame
                .put_pixel(x, y, Rgb([color.r(), color.g(), color.b()]));
        }
        Ok(())
    }
}

/// Converts an `image` pixel into an `embedded-graphics` color.
#[inline]
pub fn to_rgb888(color: Rgb<u8>) -> Rgb888 {
    Rgb888::new(color[0], color[1], color[2])
}

/// Unwraps a result whose error type cannot be constructed.
#[inline]
pub(crate) fn infallible<T>(result: Result<T, Infallible>) -> T {
    match result {
        Ok(value) => value,
        Err(never) => match never {},
    }
}
