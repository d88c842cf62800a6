use core::convert::Infallible;

use embedded_graphics::draw_target::DrawTarget;
use embedded_graphics::geometry::OriginDimensions;
use embedded_graphics::geometry::Size;
use embedded_graphics::pixelcolor::RgbColor;
use embedded_graphics::Pixel;

use crate::source::ColorSource;
use crate::Color;

/// Frame buffer for a Hub75 display
///
/// `COL` should match the chain length and `ROW` twice the bank count.
/// Sampling outside the buffer answers black.
#[derive(Clone, PartialEq, Eq)]
pub struct FrameBuffer<const COL: usize, const ROW: usize> {
    data: [[Color; COL]; ROW],
}

impl<const COL: usize, const ROW: usize> Default for FrameBuffer<COL, ROW> {
    fn default() -> Self {
        Self::new()
    }
}

impl<const COL: usize, const ROW: usize> FrameBuffer<COL, ROW> {
    /// Create a new frame buffer
    pub const fn new() -> Self {
        Self {
            data: [[Color::BLACK; COL]; ROW],
        }
    }

    /// Clear the frame buffer to black.
    pub fn clear(&mut self) {
        self.fill(Color::BLACK);
    }

    pub fn fill(&mut self, color: Color) {
        for row in self.data.iter_mut() {
            row.fill(color);
        }
    }

    /// Set a pixel in the frame buffer, ignoring coordinates outside it.
    pub fn set_pixel(&mut self, x: usize, y: usize, color: Color) {
        if let Some(pixel) = self.data.get_mut(y).and_then(|row| row.get_mut(x)) {
            *pixel = color;
        }
    }

    /// Get a pixel from the frame buffer
    pub fn get_pixel(&self, x: usize, y: usize) -> Option<Color> {
        self.data.get(y).and_then(|row| row.get(x)).copied()
    }

    pub fn get_row(&self, y: usize) -> Option<&[Color; COL]> {
        self.data.get(y)
    }
}

impl<const COL: usize, const ROW: usize> ColorSource for FrameBuffer<COL, ROW> {
    #[inline]
    fn sample(&mut self, pixel_index: usize, row: usize) -> Color {
        self.get_pixel(pixel_index, row).unwrap_or(Color::BLACK)
    }
}

impl<const COL: usize, const ROW: usize> OriginDimensions for FrameBuffer<COL, ROW> {
    fn size(&self) -> Size {
        Size::new(COL as u32, ROW as u32)
    }
}

impl<const COL: usize, const ROW: usize> DrawTarget for FrameBuffer<COL, ROW> {
    type Color = Color;

    type Error = Infallible;

    fn draw_iter<I>(&mut self, pixels: I) -> Result<(), Self::Error>
    where
        I: IntoIterator<Item = Pixel<Self::Color>>,
    {
        for Pixel(p, c) in pixels {
            if p.x < 0 || p.y < 0 {
                continue;
            }
            self.set_pixel(p.x as usize, p.y as usize, c);
        }

        Ok(())
    }
}
