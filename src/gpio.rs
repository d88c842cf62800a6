//! Drive the registered outputs onto `embedded-hal` pins.
//!
//! [`GpioOutput`] replays successive [`Entry`] words onto the connector,
//! one word per engine cycle. Only pins whose level changed are written, and
//! the shift clock is always written last so the data lanes are settled
//! before the panel samples them.

use embedded_hal::digital::OutputPin;

use crate::entry::Entry;

/// The HUB75 connector pins.
pub struct Hub75Pins<P> {
    pub red1: P,
    pub grn1: P,
    pub blu1: P,
    pub red2: P,
    pub grn2: P,
    pub blu2: P,
    pub addr0: P,
    pub addr1: P,
    pub addr2: P,
    pub addr3: P,
    pub addr4: P,
    pub blank: P,
    pub clock: P,
    pub latch: P,
}

pub struct GpioOutput<P> {
    pins: Hub75Pins<P>,
    last: Option<Entry>,
}

impl<P: OutputPin> GpioOutput<P> {
    pub fn new(pins: Hub75Pins<P>) -> Self {
        Self { pins, last: None }
    }

    /// Drive `entry` onto the pins.
    ///
    /// The first write after construction sets every pin.
    ///
    /// # Errors
    /// Returns the first pin error. The cached state is not updated, so the
    /// next write retries every pin that differed.
    pub fn write(&mut self, entry: Entry) -> Result<(), P::Error> {
        let previous = self.last;
        let changed = |f: fn(&Entry) -> bool| match previous {
            Some(prev) => f(&prev) != f(&entry),
            None => true,
        };

        let pins = &mut self.pins;
        let data: [(&mut P, fn(&Entry) -> bool); 13] = [
            (&mut pins.red1, Entry::red1),
            (&mut pins.grn1, Entry::grn1),
            (&mut pins.blu1, Entry::blu1),
            (&mut pins.red2, Entry::red2),
            (&mut pins.grn2, Entry::grn2),
            (&mut pins.blu2, Entry::blu2),
            (&mut pins.addr0, |e| e.addr() & 1 != 0),
            (&mut pins.addr1, |e| e.addr() & 2 != 0),
            (&mut pins.addr2, |e| e.addr() & 4 != 0),
            (&mut pins.addr3, |e| e.addr() & 8 != 0),
            (&mut pins.addr4, |e| e.addr() & 16 != 0),
            (&mut pins.blank, Entry::oe),
            (&mut pins.latch, Entry::latch),
        ];
        for (pin, level) in data {
            if changed(level) {
                pin.set_state(level(&entry).into())?;
            }
        }
        if changed(Entry::clock) {
            pins.clock.set_state(entry.clock().into())?;
        }

        self.last = Some(entry);
        Ok(())
    }

    /// The last word successfully written.
    pub fn last(&self) -> Option<Entry> {
        self.last
    }

    /// Give the pins back.
    pub fn release(self) -> Hub75Pins<P> {
        self.pins
    }
}
