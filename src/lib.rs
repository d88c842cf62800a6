//! Cycle-accurate binary-code-modulation engine for HUB75 LED matrix panels.
//!
//! The engine models a single synchronous clock domain. Every call to
//! [`Controller::tick`] is one clock edge: the [`ScanSequencer`] advances its
//! state machine, the two [`PixelColorPipeline`]s turn the addressed pixel
//! into one bit per color lane for the current bit-plane, and the result is
//! latched into the registered output [`Entry`] that drives the connector.
//!
//! # Concept of operation
//!
//! A HUB75 panel has six data lanes (R1, G1, B1 for the upper sub-panel and
//! R2, G2, B2 for the lower one), a shift clock, a latch strobe, an active-low
//! output enable and a row ("bank") address. For every bank the engine shifts
//! out one row of data per bit-plane, most significant plane first, latches
//! it, and then drives output enable low for `2^(plane + shortest_timeslot)`
//! cycles. Summed over all planes the on-time of each LED is proportional to
//! its gamma corrected intensity.
//!
//! # Example
//! ```rust
//! use hub75_bcm::source::Gradient;
//! use hub75_bcm::Config;
//! use hub75_bcm::Controller;
//!
//! let config = Config::default().with_chain_length(32);
//! let mut controller = Controller::new(config, Gradient).unwrap();
//! let frame = controller.timing().cycles_per_frame();
//! for _ in 0..frame {
//!     let outputs = controller.tick();
//!     let _ = outputs.clock();
//! }
//! ```
#![cfg_attr(not(test), no_std)]

use embedded_graphics::pixelcolor::Rgb888;

#[macro_use]
mod fmt;

pub mod config;
pub mod controller;
pub mod entry;
pub mod framebuffer;
pub mod gamma;
pub mod gpio;
pub mod heartbeat;
pub mod pipeline;
pub mod sequencer;
pub mod source;
pub mod timing;

pub use config::Config;
pub use config::PanelGeometry;
pub use controller::Controller;
pub use entry::Entry;
pub use gamma::GammaTable;
pub use pipeline::PixelColorPipeline;
pub use sequencer::ScanSequencer;
pub use sequencer::State;
pub use source::ColorSource;
pub use timing::BitPlaneSchedule;
pub use timing::Timing;
pub use timing::TimingPlanner;

pub type Color = Rgb888;

/// Reasons a panel geometry is rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum GeometryError {
    /// The chain has no pixels.
    ZeroChainLength,
    /// The chain is longer than the pixel counter can address.
    ChainTooLong { chain_length: usize, max: usize },
    /// There are no banks to scan.
    ZeroBankCount,
    /// The bank address must use every value of its signal width.
    BankCountNotPowerOfTwo(usize),
    /// The bank address does not fit the five address lines.
    BankCountTooLarge { bank_count: usize, max: usize },
}

/// Reasons a timing budget is rejected.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum TimingError {
    ZeroClockFrequency,
    ZeroClockDelay,
    ZeroPlaneCount,
    /// The gamma table output is limited to 16 bits, one per plane.
    TooManyPlanes { plane_count: u8, max: u8 },
    /// The gamma exponent must be finite and positive.
    InvalidGamma,
    /// Counter widths outside `1..=32` bits.
    InvalidCounterWidth(u8),
    /// A delay or blanking duration does not fit the counter.
    CounterOverflow { cycles: u64, bits: u8 },
    /// The frame takes longer than the requested refresh rate allows.
    RefreshBelowFloor { refresh_hz: f64, floor_hz: f64 },
}

/// Errors returned when building or reconfiguring the engine.
///
/// All of these are raised before the sequencer runs; once a [`Controller`]
/// exists, ticking it cannot fail.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Hub75Error {
    InvalidGeometry(GeometryError),
    InvalidTimingBudget(TimingError),
}

impl From<GeometryError> for Hub75Error {
    fn from(e: GeometryError) -> Self {
        Hub75Error::InvalidGeometry(e)
    }
}

impl From<TimingError> for Hub75Error {
    fn from(e: TimingError) -> Self {
        Hub75Error::InvalidTimingBudget(e)
    }
}

impl core::fmt::Display for GeometryError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            GeometryError::ZeroChainLength => write!(f, "chain length is zero"),
            GeometryError::ChainTooLong { chain_length, max } => {
                write!(f, "chain length {chain_length} exceeds {max}")
            }
            GeometryError::ZeroBankCount => write!(f, "bank count is zero"),
            GeometryError::BankCountNotPowerOfTwo(n) => {
                write!(f, "bank count {n} is not a power of two")
            }
            GeometryError::BankCountTooLarge { bank_count, max } => {
                write!(f, "bank count {bank_count} exceeds {max}")
            }
        }
    }
}

impl core::fmt::Display for TimingError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            TimingError::ZeroClockFrequency => write!(f, "clock frequency is zero"),
            TimingError::ZeroClockDelay => write!(f, "shift clock delay is zero"),
            TimingError::ZeroPlaneCount => write!(f, "bit-plane count is zero"),
            TimingError::TooManyPlanes { plane_count, max } => {
                write!(f, "{plane_count} bit-planes exceeds {max}")
            }
            TimingError::InvalidGamma => write!(f, "gamma must be finite and positive"),
            TimingError::InvalidCounterWidth(bits) => {
                write!(f, "counter width of {bits} bits is unsupported")
            }
            TimingError::CounterOverflow { cycles, bits } => {
                write!(f, "{cycles} cycles do not fit a {bits} bit counter")
            }
            TimingError::RefreshBelowFloor {
                refresh_hz,
                floor_hz,
            } => write!(f, "refresh rate {refresh_hz} Hz is below {floor_hz} Hz"),
        }
    }
}

impl core::fmt::Display for Hub75Error {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Hub75Error::InvalidGeometry(e) => write!(f, "invalid geometry: {e}"),
            Hub75Error::InvalidTimingBudget(e) => write!(f, "invalid timing budget: {e}"),
        }
    }
}

impl core::error::Error for Hub75Error {}
