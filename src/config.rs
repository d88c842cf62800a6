//! Engine configuration.
//!
//! Everything here is resolved before the sequencer starts. A [`Config`] is
//! only a request; [`Config::validate`] turns it into a [`Timing`] plan or
//! rejects it.

use crate::timing::Timing;
use crate::timing::TimingPlanner;
use crate::GeometryError;
use crate::Hub75Error;

/// Clock frequency the reference timings were tuned against.
pub const DEFAULT_CLOCK_HZ: u32 = 75_000_000;
pub const DEFAULT_CHAIN_LENGTH: usize = 64;
pub const DEFAULT_BANK_COUNT: usize = 16;
pub const DEFAULT_PLANE_COUNT: u8 = 12;
/// Sequencer cycles per shift clock half period.
pub const DEFAULT_CLOCK_DELAY: u32 = 4;
/// Exponent of the shortest blanking window, `2^3 = 8` cycles.
pub const DEFAULT_SHORTEST_TIMESLOT: u8 = 3;
/// 5 seems accurate for LED panels.
pub const DEFAULT_GAMMA: f64 = 5.0;
pub const DEFAULT_COUNTER_BITS: u8 = 16;

/// Five address lines (A-E).
pub const MAX_BANK_COUNT: usize = 32;
pub const MAX_CHAIN_LENGTH: usize = 1 << 16;

/// Physical layout of one chain.
///
/// Two sub-panels share every bank address; the lower one is `bank_count`
/// rows below the upper one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct PanelGeometry {
    /// Pixels shifted out per bank and bit-plane.
    pub chain_length: usize,
    /// Number of row address values.
    pub bank_count: usize,
}

impl PanelGeometry {
    pub const fn new(chain_length: usize, bank_count: usize) -> Self {
        Self {
            chain_length,
            bank_count,
        }
    }

    /// Row offset between the two sub-panels sharing a bank address.
    pub const fn sub_panel_offset(&self) -> usize {
        self.bank_count
    }

    /// Total rows covered by both sub-panels.
    pub const fn rows(&self) -> usize {
        self.bank_count * 2
    }

    /// Width of the bank address signal.
    pub const fn address_bits(&self) -> u32 {
        self.bank_count.trailing_zeros()
    }

    pub fn validate(&self) -> Result<(), GeometryError> {
        if self.chain_length == 0 {
            return Err(GeometryError::ZeroChainLength);
        }
        if self.chain_length > MAX_CHAIN_LENGTH {
            return Err(GeometryError::ChainTooLong {
                chain_length: self.chain_length,
                max: MAX_CHAIN_LENGTH,
            });
        }
        if self.bank_count == 0 {
            return Err(GeometryError::ZeroBankCount);
        }
        if !self.bank_count.is_power_of_two() {
            return Err(GeometryError::BankCountNotPowerOfTwo(self.bank_count));
        }
        if self.bank_count > MAX_BANK_COUNT {
            return Err(GeometryError::BankCountTooLarge {
                bank_count: self.bank_count,
                max: MAX_BANK_COUNT,
            });
        }
        Ok(())
    }
}

impl Default for PanelGeometry {
    fn default() -> Self {
        Self::new(DEFAULT_CHAIN_LENGTH, DEFAULT_BANK_COUNT)
    }
}

/// Engine configuration.
///
/// # Example
/// ```rust
/// use hub75_bcm::Config;
///
/// let timing = Config::default()
///     .with_chain_length(128)
///     .with_clock_delay(2)
///     .with_min_refresh_hz(100.0)
///     .validate()
///     .unwrap();
/// assert!(timing.refresh_hz() >= 100.0);
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Config {
    /// Sequencer clock in Hz.
    pub clock_hz: u32,
    pub geometry: PanelGeometry,
    /// Number of bit-planes, which is also the gamma table output width.
    pub plane_count: u8,
    /// Cycles between shift clock toggles.
    pub clock_delay: u32,
    /// Exponent of the least significant plane's blanking window.
    pub shortest_timeslot: u8,
    pub gamma: f64,
    /// Width of the delay and blanking counters.
    pub counter_bits: u8,
    /// Reject configurations refreshing slower than this.
    pub min_refresh_hz: Option<f64>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            clock_hz: DEFAULT_CLOCK_HZ,
            geometry: PanelGeometry::default(),
            plane_count: DEFAULT_PLANE_COUNT,
            clock_delay: DEFAULT_CLOCK_DELAY,
            shortest_timeslot: DEFAULT_SHORTEST_TIMESLOT,
            gamma: DEFAULT_GAMMA,
            counter_bits: DEFAULT_COUNTER_BITS,
            min_refresh_hz: None,
        }
    }
}

impl Config {
    pub fn with_clock_hz(mut self, clock_hz: u32) -> Self {
        self.clock_hz = clock_hz;
        self
    }

    pub fn with_geometry(mut self, geometry: PanelGeometry) -> Self {
        self.geometry = geometry;
        self
    }

    pub fn with_chain_length(mut self, chain_length: usize) -> Self {
        self.geometry.chain_length = chain_length;
        self
    }

    pub fn with_bank_count(mut self, bank_count: usize) -> Self {
        self.geometry.bank_count = bank_count;
        self
    }

    pub fn with_plane_count(mut self, plane_count: u8) -> Self {
        self.plane_count = plane_count;
        self
    }

    pub fn with_clock_delay(mut self, clock_delay: u32) -> Self {
        self.clock_delay = clock_delay;
        self
    }

    pub fn with_shortest_timeslot(mut self, shortest_timeslot: u8) -> Self {
        self.shortest_timeslot = shortest_timeslot;
        self
    }

    pub fn with_gamma(mut self, gamma: f64) -> Self {
        self.gamma = gamma;
        self
    }

    pub fn with_counter_bits(mut self, counter_bits: u8) -> Self {
        self.counter_bits = counter_bits;
        self
    }

    pub fn with_min_refresh_hz(mut self, min_refresh_hz: f64) -> Self {
        self.min_refresh_hz = Some(min_refresh_hz);
        self
    }

    /// Check the configuration and derive its timing plan.
    ///
    /// # Errors
    /// Returns [`Hub75Error::InvalidGeometry`] or
    /// [`Hub75Error::InvalidTimingBudget`] describing the first violated
    /// constraint.
    pub fn validate(&self) -> Result<Timing, Hub75Error> {
        TimingPlanner::plan(self)
    }
}
