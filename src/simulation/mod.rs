//! # Site Simulation
//!
//! Synthetic monitoring feed for a slope-stability site: a stochastic
//! rainfall engine drives a three-depth soil-moisture model, one sample per
//! 10-minute tick.
//!
//! ## Components
//!
//! - **Rainfall**: dry/building/receding storm state machine with 24h and 72h
//!   accumulation ceilings that force dry spells
//! - **Moisture**: infiltration gate, saturation hold and lagged percolation
//!   through depths of 1m, 2m and 2.5m
//! - **Generator**: one tick of rainfall into moisture into a [`Sample`]
//! - **Driver**: simulated clock plus bounded [`HistoryBuffer`]
//!
//! ## Usage
//!
//! ```rust
//! use chrono::Utc;
//! use riskgeo_monitor::config::SimulationConfig;
//! use riskgeo_monitor::simulation::Simulation;
//!
//! let config = SimulationConfig {
//!     random_seed: Some(42),
//!     ..Default::default()
//! };
//! let mut sim = Simulation::start(&config, Utc::now());
//! let latest = sim.advance(6).unwrap();
//! assert!(latest.rainfall_mm >= 0.0);
//! ```

pub mod driver;
pub mod generator;
pub mod history;
pub mod moisture;
pub mod params;
pub mod rainfall;
pub mod sample;
pub mod window;

pub use driver::Simulation;
pub use generator::SampleGenerator;
pub use history::HistoryBuffer;
pub use moisture::{MoistureModel, MoistureReading, MoistureState};
pub use params::{MoistureParams, RainfallParams, SimulationParams};
pub use rainfall::{RainfallEngine, RainfallEngineState, WeatherMode};
pub use sample::{parse_timestamp, round2, HistoryRecord, Reading, Sample};
pub use window::{rolling_sums, WindowSums};
