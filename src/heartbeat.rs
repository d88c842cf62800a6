//! Heartbeat indicator.
//!
//! Blinks a status LED from the engine clock in the rhythm of an ECG trace:
//! a short flash for the QRS complex followed by a longer one for the T wave.
//! Handy to see at a glance that the clock is running.

use core::num::NonZeroU32;

pub const DEFAULT_BPM: u32 = 80;

const QRS_MS: u64 = 80;
const T_MS: u64 = 160;
const QT_MS: u64 = 440;

#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Heartbeat {
    period: u32,
    qrs_end: u32,
    t_start: u32,
    qt_end: u32,
    counter: u32,
}

impl Heartbeat {
    /// Heartbeat at [`DEFAULT_BPM`].
    pub fn new(clock_hz: u32) -> Self {
        Self::with_bpm(clock_hz, NonZeroU32::new(DEFAULT_BPM).unwrap_or(NonZeroU32::MIN))
    }

    pub fn with_bpm(clock_hz: u32, bpm: NonZeroU32) -> Self {
        let hz = u64::from(clock_hz);
        let cycles = |ms: u64| (hz * ms / 1000).min(u64::from(u32::MAX)) as u32;
        let period = (hz * 60 / u64::from(bpm.get())).clamp(1, u64::from(u32::MAX)) as u32;
        let st = cycles(QT_MS - T_MS - QRS_MS);
        Self {
            period,
            qrs_end: cycles(QRS_MS),
            t_start: cycles(QRS_MS).saturating_add(st),
            qt_end: cycles(QT_MS),
            counter: 0,
        }
    }

    /// Cycles per beat.
    pub fn period(&self) -> u32 {
        self.period
    }

    pub fn tick(&mut self) {
        if self.counter == 0 {
            self.counter = self.period - 1;
        } else {
            self.counter -= 1;
        }
    }

    /// High during the QRS and T windows of each beat.
    pub fn out(&self) -> bool {
        self.counter < self.qrs_end || (self.counter > self.t_start && self.counter < self.qt_end)
    }

    /// Level for an active-low status LED.
    pub fn led_level(&self) -> bool {
        !self.out()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reference_period() {
        let hb = Heartbeat::new(75_000_000);
        // 60 / 80 s
        assert_eq!(hb.period(), 56_250_000);
    }

    #[test]
    fn beat_shape() {
        // 1 kHz clock: one cycle per millisecond, 60 bpm
        let mut hb = Heartbeat::with_bpm(1000, NonZeroU32::new(60).unwrap());
        assert_eq!(hb.period(), 1000);
        let mut high = Vec::new();
        for _ in 0..hb.period() {
            hb.tick();
            high.push(hb.out());
        }
        // the counter runs 999 down to 0
        let lit: usize = high.iter().filter(|&&h| h).count();
        // counter < 80 and 280 < counter < 440
        assert_eq!(lit, 80 + 159);
        assert!(high[999]);
        assert!(!high[999 - 100]);
        assert!(high[999 - 300]);
        assert!(!high[999 - 500]);
        assert_eq!(hb.led_level(), !hb.out());
    }

    #[test]
    fn repeats_every_period() {
        let mut hb = Heartbeat::with_bpm(1000, NonZeroU32::new(120).unwrap());
        let first: Vec<bool> = (0..hb.period())
            .map(|_| {
                hb.tick();
                hb.out()
            })
            .collect();
        let second: Vec<bool> = (0..hb.period())
            .map(|_| {
                hb.tick();
                hb.out()
            })
            .collect();
        assert_eq!(first, second);
    }
}
