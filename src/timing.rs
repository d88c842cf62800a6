//! Timing plan.
//!
//! All cycle counts the sequencer needs are derived here, once, from the
//! [`Config`]. Nothing in this module is evaluated per clock cycle.
//!
//! # Bit-plane schedule
//!
//! Plane `p` is displayed for `2^(p + shortest_timeslot)` cycles, so each
//! plane is lit exactly twice as long as the one below it. With the default
//! 12 planes and a shortest timeslot of 3 one bank spends
//! `8 * (2^12 - 1) = 32760` cycles with output enable asserted.
//!
//! # Frame time
//!
//! The nominal figures follow the usual estimate: shifting one row takes
//! `(chain_length + 1) / io_freq` seconds, the extra pixel covering the
//! latch, and a frame is `banks * (blanking + transfer)`. The exact number of
//! sequencer cycles, including the latch guard and idle cycles, is available
//! from [`Timing::cycles_per_frame`].

use crate::config::Config;
use crate::TimingError;
use crate::Hub75Error;

/// Largest supported plane count, bounded by the 16-bit gamma output.
pub const MAX_PLANES: u8 = 16;

/// Blanking durations for each bit-plane, least significant first.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct BitPlaneSchedule {
    waits: [u32; MAX_PLANES as usize],
    plane_count: u8,
}

impl BitPlaneSchedule {
    /// Callers must have checked that `plane_count - 1 + shortest_timeslot`
    /// is below 32.
    fn new(plane_count: u8, shortest_timeslot: u8) -> Self {
        let mut waits = [0u32; MAX_PLANES as usize];
        for (plane, wait) in waits.iter_mut().take(plane_count as usize).enumerate() {
            *wait = 1 << (plane as u32 + u32::from(shortest_timeslot));
        }
        Self { waits, plane_count }
    }

    pub fn plane_count(&self) -> u8 {
        self.plane_count
    }

    /// The most significant plane, where every bank sweep starts.
    pub fn top_plane(&self) -> u8 {
        self.plane_count - 1
    }

    /// Blanking cycles for `plane`, 0 outside the schedule.
    #[inline]
    pub fn wait(&self, plane: u8) -> u32 {
        if plane < self.plane_count {
            self.waits[plane as usize]
        } else {
            0
        }
    }

    pub fn waits(&self) -> &[u32] {
        &self.waits[..self.plane_count as usize]
    }

    /// Sum of all blanking windows in one bank sweep.
    pub fn total(&self) -> u64 {
        self.waits().iter().map(|&w| u64::from(w)).sum()
    }

    pub fn longest(&self) -> u32 {
        self.wait(self.top_plane())
    }
}

/// Derives a [`Timing`] from a [`Config`].
pub struct TimingPlanner;

impl TimingPlanner {
    /// Validate `config` and compute its timing plan.
    ///
    /// # Errors
    /// Any geometry or timing constraint violated by `config`.
    pub fn plan(config: &Config) -> Result<Timing, Hub75Error> {
        config.geometry.validate()?;

        if config.clock_hz == 0 {
            return Err(TimingError::ZeroClockFrequency.into());
        }
        if config.clock_delay == 0 {
            return Err(TimingError::ZeroClockDelay.into());
        }
        if config.plane_count == 0 {
            return Err(TimingError::ZeroPlaneCount.into());
        }
        if config.plane_count > MAX_PLANES {
            return Err(TimingError::TooManyPlanes {
                plane_count: config.plane_count,
                max: MAX_PLANES,
            }
            .into());
        }
        if !config.gamma.is_finite() || config.gamma <= 0.0 {
            return Err(TimingError::InvalidGamma.into());
        }
        let bits = config.counter_bits;
        if !(1..=32).contains(&bits) {
            return Err(TimingError::InvalidCounterWidth(bits).into());
        }

        // counters hold `cycles - 1`
        let counter_limit = 1u64 << bits;
        let longest_exp = u32::from(config.plane_count) - 1 + u32::from(config.shortest_timeslot);
        let longest = 1u64 << longest_exp.min(63);
        if longest_exp >= 32 || longest > counter_limit {
            return Err(TimingError::CounterOverflow {
                cycles: longest,
                bits,
            }
            .into());
        }
        if u64::from(config.clock_delay) > counter_limit {
            return Err(TimingError::CounterOverflow {
                cycles: u64::from(config.clock_delay),
                bits,
            }
            .into());
        }

        let timing = Timing::new(*config);
        timing.log();

        if let Some(floor_hz) = config.min_refresh_hz {
            let refresh_hz = timing.refresh_hz();
            if refresh_hz < floor_hz {
                warn!("refresh rate {} Hz below floor {} Hz", refresh_hz, floor_hz);
                return Err(TimingError::RefreshBelowFloor {
                    refresh_hz,
                    floor_hz,
                }
                .into());
            }
        }

        Ok(timing)
    }
}

/// Validated configuration together with every derived timing constant.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Timing {
    config: Config,
    schedule: BitPlaneSchedule,
    io_hz: f64,
    transfer_time: f64,
    total_time: f64,
}

impl Timing {
    fn new(config: Config) -> Self {
        let clock_hz = f64::from(config.clock_hz);
        let schedule = BitPlaneSchedule::new(config.plane_count, config.shortest_timeslot);
        let io_hz = clock_hz / (2.0 * f64::from(config.clock_delay));
        let transfer_time = (config.geometry.chain_length as f64 + 1.0) / io_hz;
        let blanking_time = schedule.total() as f64 / clock_hz;
        let total_time = (blanking_time + transfer_time) * config.geometry.bank_count as f64;
        Self {
            config,
            schedule,
            io_hz,
            transfer_time,
            total_time,
        }
    }

    fn log(&self) {
        info!("Clock frequency (MHz): {}", self.clock_hz() / 1e6);
        info!("IO frequency (MHz): {}", self.io_hz / 1e6);
        info!("Banks: {}", self.config.geometry.bank_count);
        info!("Transfer time (s): {}", self.transfer_time);
        info!("Transfer time (clk cycles): {}", self.transfer_cycles());
        for (plane, &wait) in self.schedule.waits().iter().enumerate() {
            debug!(
                "  Timeslot {}, OE (s): {}, (cycles): {}",
                plane,
                f64::from(wait) / self.clock_hz(),
                wait
            );
        }
        info!("Total time (s): {}", self.total_time);
        info!("Framerate (Hz): {}", self.refresh_hz());
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn schedule(&self) -> &BitPlaneSchedule {
        &self.schedule
    }

    pub fn clock_hz(&self) -> f64 {
        f64::from(self.config.clock_hz)
    }

    /// Shift clock frequency, `clock_hz / (2 * clock_delay)`.
    pub fn io_hz(&self) -> f64 {
        self.io_hz
    }

    /// Seconds to shift out one row plus the guard pixel.
    pub fn transfer_time(&self) -> f64 {
        self.transfer_time
    }

    /// [`transfer_time`](Self::transfer_time) in sequencer cycles.
    pub fn transfer_cycles(&self) -> u64 {
        (self.config.geometry.chain_length as u64 + 1) * 2 * u64::from(self.config.clock_delay)
    }

    /// Seconds output enable is asserted per bank.
    pub fn blanking_time(&self) -> f64 {
        self.schedule.total() as f64 / self.clock_hz()
    }

    /// Nominal frame time in seconds.
    pub fn total_time(&self) -> f64 {
        self.total_time
    }

    /// Nominal frame rate, `1 / total_time`.
    pub fn refresh_hz(&self) -> f64 {
        1.0 / self.total_time
    }

    /// Exact sequencer cycles spent on one bit-plane: the idle cycle, the
    /// shift train, the three latch guards and the blanking window.
    pub fn cycles_per_plane(&self, plane: u8) -> u64 {
        let delay = u64::from(self.config.clock_delay);
        let shift = 2 * self.config.geometry.chain_length as u64 * delay;
        1 + shift + 3 * delay + u64::from(self.schedule.wait(plane))
    }

    /// Exact sequencer cycles for a full sweep of every plane on one bank.
    pub fn cycles_per_bank(&self) -> u64 {
        (0..self.schedule.plane_count())
            .map(|plane| self.cycles_per_plane(plane))
            .sum()
    }

    /// Exact sequencer cycles for one frame.
    pub fn cycles_per_frame(&self) -> u64 {
        self.cycles_per_bank() * self.config.geometry.bank_count as u64
    }

    /// Fraction of the frame with output enable asserted.
    pub fn duty_cycle(&self) -> f64 {
        self.schedule.total() as f64 / self.cycles_per_bank() as f64
    }
}
