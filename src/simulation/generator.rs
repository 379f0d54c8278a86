//! One simulation tick: rainfall → moisture → [`Sample`].

use chrono::{DateTime, Utc};
use rand::rngs::StdRng;
use rand::Rng;

use super::moisture::{MoistureModel, MoistureState};
use super::params::SimulationParams;
use super::rainfall::{RainfallEngine, RainfallEngineState};
use super::sample::{round2, Reading, Sample};

/// Couples one rainfall engine to one moisture model for a single site
pub struct SampleGenerator<G: Rng = StdRng> {
    rainfall: RainfallEngine<G>,
    moisture: MoistureModel,
}

impl SampleGenerator<StdRng> {
    pub fn seeded(params: SimulationParams, seed: Option<u64>) -> Self {
        Self {
            rainfall: RainfallEngine::seeded(params.rainfall, seed),
            moisture: MoistureModel::new(params.moisture),
        }
    }
}

impl<G: Rng> SampleGenerator<G> {
    pub fn new(rainfall: RainfallEngine<G>, moisture: MoistureModel) -> Self {
        Self { rainfall, moisture }
    }

    pub fn rainfall_state(&self) -> &RainfallEngineState {
        self.rainfall.state()
    }

    pub fn moisture_state(&self) -> &MoistureState {
        self.moisture.state()
    }

    /// Produce the sample for `now`.
    ///
    /// The cumulative total continues from the newest history entry that
    /// carries a valid cumulative value; with none, it starts from this
    /// tick's rainfall.
    pub fn tick<'a, R, I>(&mut self, history: I, now: DateTime<Utc>) -> Sample
    where
        R: Reading + 'a,
        I: IntoIterator<Item = &'a R>,
        I::IntoIter: DoubleEndedIterator + Clone,
    {
        let history = history.into_iter();
        let rainfall_mm = self.rainfall.step(history.clone(), now);
        let moisture = self.moisture.step(rainfall_mm);

        let previous = history.rev().find_map(|r| r.cumulative_rainfall_mm());
        let cumulative = previous.map_or(rainfall_mm, |prev| prev + rainfall_mm);

        Sample {
            timestamp: now,
            rainfall_mm: round2(rainfall_mm),
            cumulative_rainfall_mm: round2(cumulative),
            moisture_depth1_pct: round2(moisture.depth1),
            moisture_depth2_pct: round2(moisture.depth2),
            moisture_depth3_pct: round2(moisture.depth3),
        }
    }
}
