//! # Simulation Parameters
//!
//! Named, overridable constants for the rainfall engine and the moisture model.
//! Defaults reproduce the reference site; every field can be overridden from
//! the `[simulation.params]` config table.

use serde::{Deserialize, Serialize};

/// Full parameter set for one monitored site
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationParams {
    pub rainfall: RainfallParams,
    pub moisture: MoistureParams,
}

/// Rainfall state machine parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RainfallParams {
    /// Per-tick probability of a storm starting while DRY
    pub storm_probability: f64,
    /// Rainfall per tick at full storm intensity (mm)
    pub max_intensity_mm: f64,
    /// Inclusive range of BUILDING ticks before the peak
    pub peak_duration: (u32, u32),
    /// Inclusive range of RECEDING ticks after the peak
    pub recede_duration: (u32, u32),
    /// Multiplier range applied to rainfall while BUILDING
    pub building_jitter: (f64, f64),
    /// Multiplier range applied to rainfall while RECEDING
    pub receding_jitter: (f64, f64),
    /// Trailing 24h rainfall ceiling (mm)
    pub ceiling_24h_mm: f64,
    /// Trailing 72h rainfall ceiling (mm)
    pub ceiling_72h_mm: f64,
    /// Forced-dry length after the 72h ceiling is crossed (days)
    pub long_dry_days: i64,
    /// Inclusive forced-dry length range after the 24h ceiling is crossed (minutes)
    pub short_dry_minutes: (i64, i64),
}

impl Default for RainfallParams {
    fn default() -> Self {
        Self {
            storm_probability: 0.12,
            max_intensity_mm: 3.0,
            peak_duration: (3, 8),
            recede_duration: (6, 15),
            building_jitter: (0.7, 1.3),
            receding_jitter: (0.5, 1.1),
            ceiling_24h_mm: 85.0,
            ceiling_72h_mm: 120.0,
            long_dry_days: 5,
            short_dry_minutes: (180, 360),
        }
    }
}

/// Three-layer percolation model parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MoistureParams {
    /// Resting moisture per depth (%)
    pub base_pct: [f64; 3],
    /// Saturation ceiling shared by all depths (%)
    pub saturation_pct: f64,
    /// Maximum water that can infiltrate in one tick (mm)
    pub infiltration_cap_mm: f64,
    /// Share of depth1 inflow that bypasses absorption toward depth2
    pub percolation_1_to_2: f64,
    /// Share of depth2 inflow that bypasses absorption toward depth3
    pub percolation_2_to_3: f64,
    /// Exponential relaxation factor per depth
    pub drain_factor: [f64; 3],
    /// Accumulated rainfall required before depth1 starts infiltrating (mm)
    pub gate_threshold_mm: f64,
    /// Distance above base at which depth1 counts as dried out (%)
    pub dry_out_margin_pct: f64,
    /// Distance below saturation that counts as saturated (%)
    pub saturation_tolerance_pct: f64,
}

impl Default for MoistureParams {
    fn default() -> Self {
        Self {
            base_pct: [28.0, 24.0, 22.0],
            saturation_pct: 45.0,
            infiltration_cap_mm: 3.0,
            percolation_1_to_2: 0.28,
            percolation_2_to_3: 0.10,
            drain_factor: [0.020, 0.004, 0.008],
            gate_threshold_mm: 50.0,
            dry_out_margin_pct: 0.1,
            saturation_tolerance_pct: 0.1,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_override_keeps_defaults() {
        let params: SimulationParams = serde_json::from_value(serde_json::json!({
            "rainfall": { "storm_probability": 0.5 },
            "moisture": { "saturation_pct": 50.0 }
        }))
        .unwrap();

        assert_eq!(params.rainfall.storm_probability, 0.5);
        assert_eq!(params.rainfall.peak_duration, (3, 8));
        assert_eq!(params.moisture.saturation_pct, 50.0);
        assert_eq!(params.moisture.base_pct, [28.0, 24.0, 22.0]);
    }
}
