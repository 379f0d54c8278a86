//! # Site Simulation Driver
//!
//! Owns the generator, the history buffer and the simulated clock for one
//! site. The engine never owns history: each tick borrows the buffer, and the
//! driver appends the produced sample afterwards.

use chrono::{DateTime, Duration, DurationRound, Utc};
use tracing::debug;

use super::generator::SampleGenerator;
use super::history::HistoryBuffer;
use super::moisture::MoistureState;
use super::rainfall::RainfallEngineState;
use super::sample::Sample;
use crate::config::SimulationConfig;

pub struct Simulation {
    generator: SampleGenerator,
    history: HistoryBuffer,
    clock: DateTime<Utc>,
    tick: Duration,
}

impl Simulation {
    /// Create an empty simulation whose first tick is at `start`
    pub fn new(config: &SimulationConfig, start: DateTime<Utc>) -> Self {
        Self {
            generator: SampleGenerator::seeded(config.params.clone(), config.random_seed),
            history: HistoryBuffer::new(config.history_capacity),
            clock: start,
            tick: Duration::minutes(config.tick_minutes.max(1)),
        }
    }

    /// Start a run that catches up to `now`.
    ///
    /// The clock starts `prefill_samples` ticks before `now` (truncated to the
    /// minute) and the prefill is generated immediately.
    pub fn start(config: &SimulationConfig, now: DateTime<Utc>) -> Self {
        let now = now.duration_trunc(Duration::minutes(1)).unwrap_or(now);
        let lead = Duration::minutes(config.tick_minutes.max(1) * config.prefill_samples as i64);
        let mut sim = Self::new(config, now - lead);
        sim.advance(config.prefill_samples);
        debug!(start = %(now - lead), samples = sim.history.len(), "simulation prefilled");
        sim
    }

    /// Run `ticks` ticks, returning the newest sample
    pub fn advance(&mut self, ticks: usize) -> Option<&Sample> {
        for _ in 0..ticks {
            let sample = self.generator.tick(&self.history, self.clock);
            self.history.push(sample);
            self.clock += self.tick;
        }
        self.history.latest()
    }

    /// Simulated time of the next tick
    pub fn clock(&self) -> DateTime<Utc> {
        self.clock
    }

    pub fn history(&self) -> &HistoryBuffer {
        &self.history
    }

    pub fn rainfall_state(&self) -> &RainfallEngineState {
        self.generator.rainfall_state()
    }

    pub fn moisture_state(&self) -> &MoistureState {
        self.generator.moisture_state()
    }
}
