//! Registered connector outputs.

use bitfield::bitfield;

use crate::pipeline::LaneBits;
use crate::sequencer::Control;

bitfield! {
    /// A 16-bit word holding the level of every HUB75 output for one cycle.
    ///
    /// The bit layout:
    /// - Bit 15: unused
    /// - Bit 14: Blue channel for the lower sub-panel
    /// - Bit 13: Green channel for the lower sub-panel
    /// - Bit 12: Red channel for the lower sub-panel
    /// - Bit 11: Blue channel for the upper sub-panel
    /// - Bit 10: Green channel for the upper sub-panel
    /// - Bit 9: Red channel for the upper sub-panel
    /// - Bit 8: Output enable (active low, set = blanked)
    /// - Bit 7: unused
    /// - Bit 6: Shift clock
    /// - Bit 5: Latch strobe
    /// - Bits 4-0: Bank address
    #[derive(Clone, Copy, Default, PartialEq, Eq)]
    #[repr(transparent)]
    pub struct Entry(u16);
    impl Debug;
    pub blu2, set_blu2: 14;
    pub grn2, set_grn2: 13;
    pub red2, set_red2: 12;
    pub blu1, set_blu1: 11;
    pub grn1, set_grn1: 10;
    pub red1, set_red1: 9;
    pub oe, set_oe: 8;
    pub clock, set_clock: 6;
    pub latch, set_latch: 5;
    pub addr, set_addr: 4, 0;
}

#[cfg(feature = "defmt")]
impl defmt::Format for Entry {
    fn format(&self, f: defmt::Formatter) {
        defmt::write!(f, "Entry({=u16:#x})", self.0)
    }
}

impl Entry {
    /// Outputs held while the sequencer is idle: panel blanked, clock and
    /// latch low, bank 0, no data.
    pub const fn idle() -> Self {
        Self(1 << 8)
    }

    /// Pack one cycle's control decision and lane data.
    pub fn from_parts(control: Control, upper: LaneBits, lower: LaneBits) -> Self {
        let mut entry = Self(0);
        entry.set_clock(control.clock);
        entry.set_latch(control.latch);
        entry.set_oe(control.oe);
        entry.set_addr(control.bank as u16);
        entry.set_color0(upper);
        entry.set_color1(lower);
        entry
    }

    pub fn bits(&self) -> u16 {
        self.0
    }

    /// The panel is displaying latched data.
    pub fn is_lit(&self) -> bool {
        !self.oe()
    }

    pub fn bank(&self) -> usize {
        self.addr() as usize
    }

    pub fn color0(&self) -> LaneBits {
        LaneBits {
            red: self.red1(),
            green: self.grn1(),
            blue: self.blu1(),
        }
    }

    pub fn color1(&self) -> LaneBits {
        LaneBits {
            red: self.red2(),
            green: self.grn2(),
            blue: self.blu2(),
        }
    }

    fn set_color0(&mut self, lanes: LaneBits) {
        self.set_red1(lanes.red);
        self.set_grn1(lanes.green);
        self.set_blu1(lanes.blue);
    }

    fn set_color1(&mut self, lanes: LaneBits) {
        self.set_red2(lanes.red);
        self.set_grn2(lanes.green);
        self.set_blu2(lanes.blue);
    }
}
