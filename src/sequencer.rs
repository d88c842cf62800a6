//! Scan sequencer.
//!
//! The sequencer is the state machine that paints one bit-plane of one bank
//! per pass:
//!
//! ```text
//!  Idle -> ShiftOut -> LatchPre -> Latch -> LatchPost -> Blank -+
//!   ^                                                           |
//!   +-----------------------------------------------------------+
//! ```
//!
//! * `Idle` rewinds the pixel counter and drops the shift clock.
//! * `ShiftOut` toggles the shift clock every `clock_delay` cycles, advancing
//!   the pixel on each falling edge, until the last pixel of the chain has
//!   been clocked.
//! * `LatchPre`, `Latch` and `LatchPost` each last `clock_delay` cycles; the
//!   latch strobe is high during `Latch` only.
//! * `Blank` holds output enable asserted for the plane's timeslot and then
//!   steps to the next lower plane, or to the next bank after plane 0.
//!
//! [`ScanSequencer::tick`] performs exactly one clock edge. The signals it
//! wants on the connector are read with [`ScanSequencer::control`] *before*
//! the edge; registering them is the caller's job.

use crate::timing::BitPlaneSchedule;
use crate::timing::Timing;

/// Sequencer state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum State {
    Idle,
    ShiftOut,
    LatchPre,
    Latch,
    LatchPost,
    Blank,
}

/// The pixel currently being shifted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ScanAddress {
    pub pixel_index: usize,
    pub bank: usize,
    pub bit_plane: u8,
}

/// Control signals decided for the current cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Control {
    pub clock: bool,
    pub latch: bool,
    /// Level of the active-low output enable line, `false` lights the panel.
    pub oe: bool,
    pub bank: usize,
}

/// Bank / bit-plane scan state machine.
#[derive(Debug, Clone)]
pub struct ScanSequencer {
    schedule: BitPlaneSchedule,
    chain_length: usize,
    bank_count: usize,
    clock_delay: u32,

    state: State,
    pixel_index: usize,
    bank: usize,
    bit_plane: u8,
    delay_counter: u32,
    blank_counter: u32,
    clock: bool,
}

impl ScanSequencer {
    pub fn new(timing: &Timing) -> Self {
        let config = timing.config();
        let schedule = *timing.schedule();
        Self {
            schedule,
            chain_length: config.geometry.chain_length,
            bank_count: config.geometry.bank_count,
            clock_delay: config.clock_delay,
            state: State::Idle,
            pixel_index: 0,
            bank: 0,
            bit_plane: schedule.top_plane(),
            delay_counter: 0,
            blank_counter: 0,
            clock: false,
        }
    }

    /// Return every register to its power-on value.
    pub fn reset(&mut self) {
        self.state = State::Idle;
        self.pixel_index = 0;
        self.bank = 0;
        self.bit_plane = self.schedule.top_plane();
        self.delay_counter = 0;
        self.blank_counter = 0;
        self.clock = false;
    }

    pub fn state(&self) -> State {
        self.state
    }

    pub fn pixel_index(&self) -> usize {
        self.pixel_index
    }

    pub fn bank(&self) -> usize {
        self.bank
    }

    pub fn bit_plane(&self) -> u8 {
        self.bit_plane
    }

    pub fn delay_counter(&self) -> u32 {
        self.delay_counter
    }

    pub fn blank_counter(&self) -> u32 {
        self.blank_counter
    }

    pub fn schedule(&self) -> &BitPlaneSchedule {
        &self.schedule
    }

    pub fn address(&self) -> ScanAddress {
        ScanAddress {
            pixel_index: self.pixel_index,
            bank: self.bank,
            bit_plane: self.bit_plane,
        }
    }

    pub fn control(&self) -> Control {
        Control {
            clock: self.clock,
            latch: self.state == State::Latch,
            oe: self.state != State::Blank,
            bank: self.bank,
        }
    }

    /// True between frames: idle, on bank 0, about to paint the top plane.
    pub fn at_frame_start(&self) -> bool {
        self.state == State::Idle && self.bank == 0 && self.bit_plane == self.schedule.top_plane()
    }

    /// Advance one clock cycle.
    pub fn tick(&mut self) {
        let reload = self.clock_delay - 1;
        match self.state {
            State::Idle => {
                self.pixel_index = 0;
                self.delay_counter = reload;
                self.clock = false;
                self.state = State::ShiftOut;
            }
            State::ShiftOut => {
                if self.delay_counter == 0 {
                    self.delay_counter = reload;
                    if self.clock {
                        if self.pixel_index == self.chain_length - 1 {
                            self.pixel_index = 0;
                            self.state = State::LatchPre;
                        } else {
                            self.pixel_index += 1;
                        }
                    }
                    self.clock = !self.clock;
                } else {
                    self.delay_counter -= 1;
                }
            }
            State::LatchPre => {
                if self.delay_counter == 0 {
                    self.delay_counter = reload;
                    self.state = State::Latch;
                } else {
                    self.delay_counter -= 1;
                }
            }
            State::Latch => {
                if self.delay_counter == 0 {
                    self.delay_counter = reload;
                    self.state = State::LatchPost;
                } else {
                    self.delay_counter -= 1;
                }
            }
            State::LatchPost => {
                if self.delay_counter == 0 {
                    // the counter holds cycles - 1 so Blank lasts exactly `wait` cycles
                    self.blank_counter = self.schedule.wait(self.bit_plane).saturating_sub(1);
                    self.state = State::Blank;
                } else {
                    self.delay_counter -= 1;
                }
            }
            State::Blank => {
                if self.blank_counter == 0 {
                    if self.bit_plane == 0 {
                        trace!("bank {} done", self.bank);
                        self.bank = (self.bank + 1) % self.bank_count;
                        self.bit_plane = self.schedule.top_plane();
                    } else {
                        self.bit_plane -= 1;
                    }
                    self.state = State::Idle;
                } else {
                    self.blank_counter -= 1;
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;

    fn sequencer(config: Config) -> ScanSequencer {
        ScanSequencer::new(&config.validate().unwrap())
    }

    fn small() -> Config {
        Config::default()
            .with_chain_length(3)
            .with_bank_count(2)
            .with_plane_count(3)
            .with_clock_delay(2)
            .with_shortest_timeslot(1)
    }

    /// Ticks spent in `state` from the current position, leaving the
    /// sequencer on the following state.
    fn dwell(seq: &mut ScanSequencer, state: State) -> u64 {
        assert_eq!(seq.state(), state);
        let mut cycles = 0;
        while seq.state() == state {
            seq.tick();
            cycles += 1;
        }
        cycles
    }

    #[test]
    fn power_on_state() {
        let seq = sequencer(small());
        assert_eq!(seq.state(), State::Idle);
        assert_eq!(seq.bank(), 0);
        assert_eq!(seq.bit_plane(), 2);
        assert!(seq.at_frame_start());
        let control = seq.control();
        assert!(!control.clock);
        assert!(!control.latch);
        assert!(control.oe);
    }

    #[test]
    fn state_durations() {
        let mut seq = sequencer(small());
        assert_eq!(dwell(&mut seq, State::Idle), 1);
        assert_eq!(dwell(&mut seq, State::ShiftOut), 2 * 3 * 2);
        assert_eq!(dwell(&mut seq, State::LatchPre), 2);
        assert_eq!(dwell(&mut seq, State::Latch), 2);
        assert_eq!(dwell(&mut seq, State::LatchPost), 2);
        // plane 2, 2^(2 + 1)
        assert_eq!(dwell(&mut seq, State::Blank), 8);
        assert_eq!(seq.state(), State::Idle);
        assert_eq!(seq.bit_plane(), 1);
    }

    #[test]
    fn pixel_advances_on_falling_edge() {
        let mut seq = sequencer(small());
        seq.tick();
        let mut seen = std::vec::Vec::new();
        while seq.state() == State::ShiftOut {
            if seq.control().clock {
                seen.push(seq.pixel_index());
            }
            seq.tick();
        }
        // each pixel is held for one full high half period
        assert_eq!(seen, [0, 0, 1, 1, 2, 2]);
        assert_eq!(seq.pixel_index(), 0);
        assert!(!seq.control().clock);
    }

    #[test]
    fn single_cycle_delay() {
        let mut seq = sequencer(small().with_clock_delay(1).with_chain_length(1));
        assert_eq!(dwell(&mut seq, State::Idle), 1);
        assert_eq!(dwell(&mut seq, State::ShiftOut), 2);
        assert_eq!(dwell(&mut seq, State::LatchPre), 1);
        assert_eq!(dwell(&mut seq, State::Latch), 1);
        assert_eq!(dwell(&mut seq, State::LatchPost), 1);
        assert_eq!(dwell(&mut seq, State::Blank), 8);
    }

    #[test]
    fn planes_descend_then_bank_advances() {
        let mut seq = sequencer(small());
        let mut planes = std::vec::Vec::new();
        for _ in 0..3 {
            while seq.state() != State::Blank {
                seq.tick();
            }
            planes.push((seq.bank(), seq.bit_plane()));
            while seq.state() == State::Blank {
                seq.tick();
            }
        }
        assert_eq!(planes, [(0, 2), (0, 1), (0, 0)]);
        assert_eq!(seq.bank(), 1);
        assert_eq!(seq.bit_plane(), 2);
    }

    #[test]
    fn bank_wraps() {
        let config = small();
        let timing = config.validate().unwrap();
        let mut seq = ScanSequencer::new(&timing);
        for _ in 0..timing.cycles_per_bank() {
            seq.tick();
        }
        assert_eq!(seq.bank(), 1);
        for _ in 0..timing.cycles_per_bank() {
            seq.tick();
        }
        assert_eq!(seq.bank(), 0);
        assert!(seq.at_frame_start());
    }

    #[test]
    fn reset_returns_to_idle() {
        let mut seq = sequencer(small());
        for _ in 0..37 {
            seq.tick();
        }
        assert_ne!(seq.state(), State::Idle);
        seq.reset();
        assert_eq!(seq.state(), State::Idle);
        assert_eq!(seq.address(), ScanAddress {
            pixel_index: 0,
            bank: 0,
            bit_plane: 2
        });
        assert!(!seq.control().clock);
    }
}
