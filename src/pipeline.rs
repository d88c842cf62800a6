//! Per sub-panel color pipeline.
//!
//! Turns the pixel addressed by the sequencer into the three data bits for
//! one sub-panel: sample the source, gamma correct each channel, and pick the
//! bit belonging to the current plane. There is no state and no latency; the
//! result is registered together with the control signals.

use embedded_graphics::pixelcolor::RgbColor;

use crate::config::PanelGeometry;
use crate::gamma::GammaTable;
use crate::sequencer::ScanAddress;
use crate::source::ColorSource;
use crate::Color;

/// Physical sub-panels sharing each bank address.
pub const SUB_PANELS: usize = 2;

/// Data bits for one sub-panel.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct LaneBits {
    pub red: bool,
    pub green: bool,
    pub blue: bool,
}

impl LaneBits {
    /// Bits of `color` for bit-plane `plane` after gamma correction.
    #[inline]
    pub fn from_color(gamma: &GammaTable, color: Color, plane: u8) -> Self {
        Self {
            red: gamma.bit(color.r(), plane),
            green: gamma.bit(color.g(), plane),
            blue: gamma.bit(color.b(), plane),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PixelColorPipeline {
    row_offset: usize,
}

impl PixelColorPipeline {
    /// Pipeline for sub-panel `sub_panel` (0 = upper, 1 = lower).
    pub fn new(sub_panel: usize, geometry: &PanelGeometry) -> Self {
        Self {
            row_offset: sub_panel * geometry.sub_panel_offset(),
        }
    }

    /// Both pipelines of `geometry`, upper first.
    pub fn pair(geometry: &PanelGeometry) -> [Self; SUB_PANELS] {
        [Self::new(0, geometry), Self::new(1, geometry)]
    }

    /// Physical row driven by this pipeline while `bank` is selected.
    #[inline]
    pub fn row(&self, bank: usize) -> usize {
        bank + self.row_offset
    }

    #[inline]
    pub fn evaluate<S: ColorSource + ?Sized>(
        &self,
        gamma: &GammaTable,
        source: &mut S,
        address: ScanAddress,
    ) -> LaneBits {
        let color = source.sample(address.pixel_index, self.row(address.bank));
        LaneBits::from_color(gamma, color, address.bit_plane)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::from_fn;
    use crate::source::Solid;

    #[test]
    fn rows_of_each_sub_panel() {
        let [upper, lower] = PixelColorPipeline::pair(&PanelGeometry::new(64, 16));
        assert_eq!(upper.row(0), 0);
        assert_eq!(upper.row(15), 15);
        assert_eq!(lower.row(0), 16);
        assert_eq!(lower.row(15), 31);
    }

    #[test]
    fn samples_addressed_pixel() {
        let gamma = GammaTable::reference();
        let pipeline = PixelColorPipeline::new(1, &PanelGeometry::new(64, 16));
        let mut asked = None;
        let mut source = from_fn(|x, y| {
            asked = Some((x, y));
            Color::new(255, 0, 0)
        });
        let address = ScanAddress {
            pixel_index: 7,
            bank: 3,
            bit_plane: 11,
        };
        let bits = pipeline.evaluate(&gamma, &mut source, address);
        drop(source);
        assert_eq!(asked, Some((7, 19)));
        assert_eq!(
            bits,
            LaneBits {
                red: true,
                green: false,
                blue: false
            }
        );
    }

    #[test]
    fn follows_bit_plane() {
        // linear 3-bit table: 128 -> 0b011
        let gamma = GammaTable::new(1.0, 8, 3);
        let pipeline = PixelColorPipeline::new(0, &PanelGeometry::new(4, 2));
        let mut source = Solid(Color::new(128, 255, 0));
        let lanes: Vec<LaneBits> = (0..3)
            .map(|plane| {
                let address = ScanAddress {
                    pixel_index: 0,
                    bank: 0,
                    bit_plane: plane,
                };
                pipeline.evaluate(&gamma, &mut source, address)
            })
            .collect();
        assert_eq!(lanes[0], LaneBits { red: true, green: true, blue: false });
        assert_eq!(lanes[1], LaneBits { red: true, green: true, blue: false });
        assert_eq!(lanes[2], LaneBits { red: false, green: true, blue: false });
    }
}
