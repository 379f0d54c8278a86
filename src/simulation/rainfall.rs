//! # Rainfall Engine
//!
//! Three-phase storm state machine (DRY → BUILDING → RECEDING → DRY) with
//! rolling-window overrides that pin output to zero for a forced-dry period
//! whenever trailing rainfall crosses the 24h or 72h ceilings.

use chrono::{DateTime, Duration, Utc};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use super::params::RainfallParams;
use super::sample::{round2, Reading};
use super::window::rolling_sums;

/// Storm phase
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, strum::Display)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum WeatherMode {
    /// No rain; each tick may start a storm
    Dry,
    /// Intensity ramping up toward the peak
    Building,
    /// Intensity decaying back to zero
    Receding,
}

/// Mutable state of one rainfall engine
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RainfallEngineState {
    pub weather_mode: WeatherMode,
    /// Current storm intensity (0.0-1.0)
    pub storm_intensity: f64,
    pub cycles_in_state: u32,
    /// Ticks from storm start to peak, drawn per storm
    pub peak_duration: u32,
    /// Ticks from peak back to dry, drawn per storm
    pub recede_duration: u32,
    /// End of the current forced-dry period, if one is active
    pub forced_dry_until: Option<DateTime<Utc>>,
}

impl RainfallEngineState {
    fn new(params: &RainfallParams) -> Self {
        Self {
            weather_mode: WeatherMode::Dry,
            storm_intensity: 0.0,
            cycles_in_state: 0,
            peak_duration: params.peak_duration.0,
            recede_duration: params.recede_duration.0,
            forced_dry_until: None,
        }
    }

    pub fn is_forced_dry(&self) -> bool {
        self.forced_dry_until.is_some()
    }

    fn calm(&mut self) {
        self.weather_mode = WeatherMode::Dry;
        self.storm_intensity = 0.0;
        self.cycles_in_state = 0;
    }
}

/// Rainfall generator for a single site.
///
/// The random stream is owned by the engine so independent instances stay
/// reproducible under their own seeds.
pub struct RainfallEngine<G: Rng = StdRng> {
    params: RainfallParams,
    state: RainfallEngineState,
    rng: G,
}

impl RainfallEngine<StdRng> {
    /// Create an engine backed by `StdRng` (None = seed from entropy)
    pub fn seeded(params: RainfallParams, seed: Option<u64>) -> Self {
        let rng = match seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        Self::new(params, rng)
    }
}

impl<G: Rng> RainfallEngine<G> {
    pub fn new(params: RainfallParams, rng: G) -> Self {
        let state = RainfallEngineState::new(&params);
        Self { params, state, rng }
    }

    pub fn state(&self) -> &RainfallEngineState {
        &self.state
    }

    /// Produce the rainfall for the tick at `now`, in mm rounded to 2 decimals
    pub fn step<'a, R, I>(&mut self, history: I, now: DateTime<Utc>) -> f64
    where
        R: Reading + 'a,
        I: IntoIterator<Item = &'a R>,
        I::IntoIter: DoubleEndedIterator,
    {
        if let Some(until) = self.state.forced_dry_until {
            if now < until {
                self.state.calm();
                return 0.0;
            }
            self.state.forced_dry_until = None;
            debug!(%now, "forced dry period ended");
        }

        let sums = rolling_sums(history, now);
        if sums.sum_72h > self.params.ceiling_72h_mm {
            let until = now + Duration::days(self.params.long_dry_days);
            info!(sum_72h = sums.sum_72h, %until, "72h rain ceiling reached, forcing dry spell");
            self.force_dry(until);
            return 0.0;
        }
        if sums.sum_24h > self.params.ceiling_24h_mm {
            let (lo, hi) = self.params.short_dry_minutes;
            let minutes = self.rng.gen_range(lo..=hi);
            let until = now + Duration::minutes(minutes);
            info!(sum_24h = sums.sum_24h, minutes, "24h rain ceiling reached, pausing rain");
            self.force_dry(until);
            return 0.0;
        }

        let rainfall = match self.state.weather_mode {
            WeatherMode::Dry => {
                if self.rng.gen::<f64>() < self.params.storm_probability {
                    self.start_storm();
                }
                0.0
            }
            WeatherMode::Building => {
                self.state.cycles_in_state += 1;
                self.state.storm_intensity = (self.state.cycles_in_state as f64
                    / self.state.peak_duration as f64)
                    .min(1.0);
                let (lo, hi) = self.params.building_jitter;
                let rain = self.state.storm_intensity
                    * self.params.max_intensity_mm
                    * self.rng.gen_range(lo..hi);
                if self.state.cycles_in_state >= self.state.peak_duration {
                    self.state.weather_mode = WeatherMode::Receding;
                    self.state.cycles_in_state = 0;
                }
                rain
            }
            WeatherMode::Receding => {
                self.state.cycles_in_state += 1;
                self.state.storm_intensity = (1.0
                    - self.state.cycles_in_state as f64 / self.state.recede_duration as f64)
                    .max(0.0);
                let (lo, hi) = self.params.receding_jitter;
                let rain = self.state.storm_intensity
                    * self.params.max_intensity_mm
                    * self.rng.gen_range(lo..hi);
                if self.state.cycles_in_state >= self.state.recede_duration {
                    self.state.calm();
                }
                rain
            }
        };

        round2(rainfall.max(0.0))
    }

    fn force_dry(&mut self, until: DateTime<Utc>) {
        self.state.calm();
        self.state.forced_dry_until = Some(until);
    }

    fn start_storm(&mut self) {
        let (peak_lo, peak_hi) = self.params.peak_duration;
        let (recede_lo, recede_hi) = self.params.recede_duration;
        self.state.weather_mode = WeatherMode::Building;
        self.state.cycles_in_state = 0;
        self.state.storm_intensity = 0.0;
        self.state.peak_duration = self.rng.gen_range(peak_lo..=peak_hi);
        self.state.recede_duration = self.rng.gen_range(recede_lo..=recede_hi);
        debug!(
            peak = self.state.peak_duration,
            recede = self.state.recede_duration,
            "storm building"
        );
    }
}
