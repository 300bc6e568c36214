//! RGB888 → RGB565 pixel conversion.

use crate::compose::Frame;

/// Pack an 8-bit-per-channel color into RGB565 by truncating the low bits.
#[inline]
pub fn rgb565(r: u8, g: u8, b: u8) -> u16 {
    ((r as u16 >> 3) << 11) | ((g as u16 >> 2) << 5) | (b as u16 >> 3)
}

/// Convert a frame to the panel's wire format: row-major RGB565, big-endian.
pub fn frame_to_rgb565_be(frame: &Frame) -> Vec<u8> {
    let mut out = Vec::with_capacity(frame.width() as usize * frame.height() as usize * 2);
    for pixel in frame.pixels() {
        let [r, g, b] = pixel.0;
        out.extend_from_slice(&rgb565(r, g, b).to_be_bytes());
    }
    out
}
