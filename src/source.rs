//! Color sources.
//!
//! The engine owns no pixel storage. Every cycle each sub-panel pipeline asks
//! a [`ColorSource`] for the pixel the sequencer is addressing. A source must
//! answer immediately; if it has nothing new it should return the last known
//! or a default color rather than wait.

use embedded_graphics::pixelcolor::RgbColor;

use crate::Color;

/// Supplies the linear color of a pixel on demand.
pub trait ColorSource {
    /// Color of the pixel at chain position `pixel_index` on physical row
    /// `row` (counted across both sub-panels).
    fn sample(&mut self, pixel_index: usize, row: usize) -> Color;
}

impl<T: ColorSource + ?Sized> ColorSource for &mut T {
    #[inline]
    fn sample(&mut self, pixel_index: usize, row: usize) -> Color {
        (**self).sample(pixel_index, row)
    }
}

/// Built-in test pattern: red ramps along the chain, blue down the rows.
///
/// Both ramps wrap once they leave the 8-bit range.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Gradient;

impl ColorSource for Gradient {
    fn sample(&mut self, pixel_index: usize, row: usize) -> Color {
        Color::new((pixel_index << 2) as u8, 0, (row << 3) as u8)
    }
}

/// Every pixel the same color.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Solid(pub Color);

impl Default for Solid {
    fn default() -> Self {
        Self(Color::BLACK)
    }
}

impl ColorSource for Solid {
    fn sample(&mut self, _pixel_index: usize, _row: usize) -> Color {
        self.0
    }
}

/// A source backed by a closure, see [`from_fn`].
#[derive(Clone, Copy)]
pub struct FnSource<F>(F);

impl<F> ColorSource for FnSource<F>
where
    F: FnMut(usize, usize) -> Color,
{
    #[inline]
    fn sample(&mut self, pixel_index: usize, row: usize) -> Color {
        (self.0)(pixel_index, row)
    }
}

/// Wrap a `(pixel_index, row) -> Color` closure as a [`ColorSource`].
///
/// # Example
/// ```rust
/// use hub75_bcm::source::from_fn;
/// use hub75_bcm::Color;
/// use hub75_bcm::ColorSource;
///
/// let mut checker = from_fn(|x, y| {
///     if (x + y) % 2 == 0 {
///         Color::new(255, 255, 255)
///     } else {
///         Color::new(0, 0, 0)
///     }
/// });
/// assert_eq!(checker.sample(1, 1), Color::new(255, 255, 255));
/// ```
pub fn from_fn<F>(f: F) -> FnSource<F>
where
    F: FnMut(usize, usize) -> Color,
{
    FnSource(f)
}
