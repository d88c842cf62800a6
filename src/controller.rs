//! Top level engine.
//!
//! A [`Controller`] wires the [`ScanSequencer`] to one
//! [`PixelColorPipeline`] per sub-panel and registers the result. Each call
//! to [`Controller::tick`] is one clock edge:
//!
//! 1. the sequencer's current address and control decision are read,
//! 2. both pipelines sample the color source for that address,
//! 3. everything is latched into the output [`Entry`] together,
//! 4. the sequencer advances.
//!
//! Decisions therefore reach the outputs one cycle after they are made, and
//! all outputs share that same delay so their relative phase is exact.
//!
//! Configuration changes are validated when requested but only take effect
//! between frames, after the last plane of the last bank has been shown.

use crate::config::Config;
use crate::entry::Entry;
use crate::gamma::GammaTable;
use crate::pipeline::PixelColorPipeline;
use crate::pipeline::SUB_PANELS;
use crate::sequencer::ScanSequencer;
use crate::source::ColorSource;
use crate::timing::Timing;
use crate::Hub75Error;

/// Source intensities are 8 bits wide.
const SOURCE_BITS: u8 = 8;

pub struct Controller<S> {
    timing: Timing,
    gamma: GammaTable,
    sequencer: ScanSequencer,
    pipelines: [PixelColorPipeline; SUB_PANELS],
    output: Entry,
    pending: Option<Timing>,
    source: S,
    cycles: u64,
}

impl<S: ColorSource> Controller<S> {
    /// Validate `config` and build an engine reading from `source`.
    ///
    /// # Errors
    /// Returns the first constraint `config` violates.
    pub fn new(config: Config, source: S) -> Result<Self, Hub75Error> {
        let timing = config.validate()?;
        info!(
            "controller: chain {} banks {} planes {}",
            config.geometry.chain_length,
            config.geometry.bank_count,
            config.plane_count
        );
        Ok(Self {
            gamma: GammaTable::new(config.gamma, SOURCE_BITS, config.plane_count),
            sequencer: ScanSequencer::new(&timing),
            pipelines: PixelColorPipeline::pair(&config.geometry),
            output: Entry::idle(),
            pending: None,
            source,
            cycles: 0,
            timing,
        })
    }

    /// Run one clock cycle and return the registered outputs.
    pub fn tick(&mut self) -> Entry {
        let address = self.sequencer.address();
        let control = self.sequencer.control();
        let [upper, lower] = self
            .pipelines
            .map(|pipeline| pipeline.evaluate(&self.gamma, &mut self.source, address));

        self.output = Entry::from_parts(control, upper, lower);
        self.sequencer.tick();
        self.cycles += 1;

        if self.pending.is_some() && self.sequencer.at_frame_start() {
            self.apply_pending();
        }
        self.output
    }

    /// Run `cycles` clock cycles, returning the final outputs.
    pub fn run(&mut self, cycles: u64) -> Entry {
        for _ in 0..cycles {
            self.tick();
        }
        self.output
    }

    /// Run until the next frame boundary, passing every registered output to
    /// `f`. Returns the number of cycles run.
    pub fn run_frame(&mut self, mut f: impl FnMut(Entry)) -> u64 {
        let mut cycles = 0;
        loop {
            f(self.tick());
            cycles += 1;
            if self.sequencer.at_frame_start() {
                return cycles;
            }
        }
    }

    /// Asynchronous reset: sequencer back to idle, outputs blanked.
    ///
    /// A pending configuration is applied immediately since no frame is in
    /// progress afterwards.
    pub fn reset(&mut self) {
        debug!("controller reset after {} cycles", self.cycles);
        self.sequencer.reset();
        self.output = Entry::idle();
        self.cycles = 0;
        if self.pending.is_some() {
            self.apply_pending();
        }
    }

    /// Request a new configuration.
    ///
    /// The configuration is validated now. It is applied at the next frame
    /// boundary, or immediately if the sequencer is sitting on one.
    ///
    /// # Errors
    /// Returns the first constraint `config` violates; the current
    /// configuration is left untouched.
    pub fn reconfigure(&mut self, config: Config) -> Result<(), Hub75Error> {
        let timing = config.validate()?;
        info!("reconfiguration requested at cycle {}", self.cycles);
        self.pending = Some(timing);
        if self.sequencer.at_frame_start() {
            self.apply_pending();
        }
        Ok(())
    }

    pub fn has_pending_config(&self) -> bool {
        self.pending.is_some()
    }

    fn apply_pending(&mut self) {
        if let Some(timing) = self.pending.take() {
            let config = timing.config();
            info!("applying configuration at cycle {}", self.cycles);
            self.gamma = GammaTable::new(config.gamma, SOURCE_BITS, config.plane_count);
            self.sequencer = ScanSequencer::new(&timing);
            self.pipelines = PixelColorPipeline::pair(&config.geometry);
            self.timing = timing;
        }
    }

    /// Registered outputs as currently driven onto the connector.
    pub fn outputs(&self) -> Entry {
        self.output
    }

    pub fn timing(&self) -> &Timing {
        &self.timing
    }

    pub fn config(&self) -> &Config {
        self.timing.config()
    }

    pub fn gamma(&self) -> &GammaTable {
        &self.gamma
    }

    pub fn sequencer(&self) -> &ScanSequencer {
        &self.sequencer
    }

    /// Exact cycles in one frame under the active configuration.
    pub fn cycles_per_frame(&self) -> u64 {
        self.timing.cycles_per_frame()
    }

    /// Cycles since construction or the last reset.
    pub fn cycles(&self) -> u64 {
        self.cycles
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    /// Mutable access to the color source, e.g. to draw into a frame buffer.
    pub fn source_mut(&mut self) -> &mut S {
        &mut self.source
    }

    pub fn into_source(self) -> S {
        self.source
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sequencer::State;
    use crate::source::Gradient;

    fn small() -> Config {
        Config::default()
            .with_chain_length(4)
            .with_bank_count(2)
            .with_plane_count(3)
            .with_clock_delay(2)
            .with_shortest_timeslot(1)
    }

    #[test]
    fn starts_blanked() {
        let controller = Controller::new(small(), Gradient).unwrap();
        assert_eq!(controller.outputs(), Entry::idle());
        assert_eq!(controller.sequencer().state(), State::Idle);
        assert_eq!(controller.gamma().dst_bits(), 3);
    }

    #[test]
    fn rejects_invalid_config() {
        assert!(Controller::new(small().with_bank_count(3), Gradient).is_err());
    }

    #[test]
    fn outputs_lag_sequencer_by_one_cycle() {
        let mut controller = Controller::new(small(), Gradient).unwrap();
        for _ in 0..200 {
            let before = controller.sequencer().control();
            let out = controller.tick();
            assert_eq!(out.clock(), before.clock);
            assert_eq!(out.latch(), before.latch);
            assert_eq!(out.oe(), before.oe);
            assert_eq!(out.bank(), before.bank);
        }
    }

    #[test]
    fn run_frame_counts_cycles() {
        let mut controller = Controller::new(small(), Gradient).unwrap();
        let mut lit = 0u64;
        let cycles = controller.run_frame(|entry| {
            if entry.is_lit() {
                lit += 1;
            }
        });
        assert_eq!(cycles, controller.cycles_per_frame());
        // (2 + 4 + 8) lit cycles per bank
        assert_eq!(lit, 2 * 14);
        assert_eq!(controller.cycles(), cycles);
    }

    #[test]
    fn reconfigure_waits_for_frame_boundary() {
        let mut controller = Controller::new(small(), Gradient).unwrap();
        let frame = controller.timing().cycles_per_frame();
        controller.tick();
        controller.reconfigure(small().with_chain_length(8)).unwrap();
        assert!(controller.has_pending_config());
        controller.run(frame - 2);
        assert!(controller.has_pending_config());
        assert_eq!(controller.config().geometry.chain_length, 4);
        controller.tick();
        assert!(!controller.has_pending_config());
        assert_eq!(controller.config().geometry.chain_length, 8);
        assert!(controller.sequencer().at_frame_start());
    }

    #[test]
    fn reconfigure_between_frames_is_immediate() {
        let mut controller = Controller::new(small(), Gradient).unwrap();
        controller.reconfigure(small().with_gamma(2.2)).unwrap();
        assert!(!controller.has_pending_config());
        assert_eq!(controller.config().gamma, 2.2);
    }

    #[test]
    fn rejected_reconfigure_keeps_current() {
        let mut controller = Controller::new(small(), Gradient).unwrap();
        controller.tick();
        assert!(controller.reconfigure(small().with_plane_count(0)).is_err());
        assert!(!controller.has_pending_config());
        assert_eq!(controller.config().plane_count, 3);
    }

    #[test]
    fn reset_applies_pending_and_blanks() {
        let mut controller = Controller::new(small(), Gradient).unwrap();
        controller.run(50);
        controller.reconfigure(small().with_clock_delay(3)).unwrap();
        controller.reset();
        assert_eq!(controller.outputs(), Entry::idle());
        assert_eq!(controller.cycles(), 0);
        assert_eq!(controller.config().clock_delay, 3);
        assert!(controller.sequencer().at_frame_start());
    }
}
