//! # Soil Moisture Model
//!
//! Three-layer percolation model. Each tick:
//!
//! 1. all layers relax exponentially toward their base level (depth1 is held
//!    while saturated),
//! 2. rainfall is capped and gated by the depth1 infiltration latch,
//! 3. water moves one layer down per tick through two transit buffers, so
//!    what depth1 sheds this tick reaches depth2 on the next one.
//!
//! Depth1 latches into a saturation hold once full. While holding it stays at
//! the ceiling and passes every drop straight through, until depth2 fills up
//! or depth1 dries out.

use serde::Serialize;

use super::params::MoistureParams;

/// Moisture percentages of the three depths after a tick
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct MoistureReading {
    pub depth1: f64,
    pub depth2: f64,
    pub depth3: f64,
}

/// Mutable state of one moisture model
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MoistureState {
    pub depth1: f64,
    pub depth2: f64,
    pub depth3: f64,
    /// Water leaving depth1 this tick, delivered to depth2 next tick (mm)
    pub buffer_to_2: f64,
    /// Water leaving depth2 this tick, delivered to depth3 next tick (mm)
    pub buffer_to_3: f64,
    /// Capped rainfall counted toward opening the infiltration gate (mm)
    pub gate_accumulator: f64,
    pub gate_open: bool,
    pub saturation_hold: bool,
}

impl MoistureState {
    /// Dry soil at base level with the gate closed
    pub fn at_base(params: &MoistureParams) -> Self {
        let [depth1, depth2, depth3] = params.base_pct;
        Self {
            depth1,
            depth2,
            depth3,
            buffer_to_2: 0.0,
            buffer_to_3: 0.0,
            gate_accumulator: 0.0,
            gate_open: false,
            saturation_hold: false,
        }
    }

    pub fn reading(&self) -> MoistureReading {
        MoistureReading {
            depth1: self.depth1,
            depth2: self.depth2,
            depth3: self.depth3,
        }
    }
}

pub struct MoistureModel {
    params: MoistureParams,
    state: MoistureState,
}

impl MoistureModel {
    pub fn new(params: MoistureParams) -> Self {
        let state = MoistureState::at_base(&params);
        Self { params, state }
    }

    /// Resume from an explicit state
    pub fn with_state(params: MoistureParams, state: MoistureState) -> Self {
        Self { params, state }
    }

    pub fn state(&self) -> &MoistureState {
        &self.state
    }

    /// Advance one tick with `rainfall_mm` falling on the surface
    pub fn step(&mut self, rainfall_mm: f64) -> MoistureReading {
        let p = &self.params;
        let s = &mut self.state;
        let [base1, base2, base3] = p.base_pct;
        let [drain1, drain2, drain3] = p.drain_factor;
        let sat = p.saturation_pct;
        let saturated = sat - p.saturation_tolerance_pct;

        // Drainage
        let depth1_before = s.depth1;
        if !s.saturation_hold {
            s.depth1 -= (s.depth1 - base1) * drain1;
        }
        s.depth2 -= (s.depth2 - base2) * drain2;
        s.depth3 -= (s.depth3 - base3) * drain3;
        s.depth1 = s.depth1.max(base1);
        s.depth2 = s.depth2.max(base2);
        s.depth3 = s.depth3.max(base3);

        // Dry-out resets the gate and releases any hold
        let dry_line = base1 + p.dry_out_margin_pct;
        if depth1_before > dry_line && s.depth1 <= dry_line {
            s.gate_open = false;
            s.gate_accumulator = 0.0;
            s.saturation_hold = false;
        }

        // Infiltration cap and gate
        let available = rainfall_mm.min(p.infiltration_cap_mm);
        let incoming_1 = if s.gate_open {
            available
        } else {
            s.gate_accumulator += available;
            if s.gate_accumulator >= p.gate_threshold_mm {
                s.gate_open = true;
                available
            } else {
                0.0
            }
        };

        // Water that left the upper layers last tick arrives now
        let incoming_2 = std::mem::take(&mut s.buffer_to_2);
        let incoming_3 = std::mem::take(&mut s.buffer_to_3);

        // Depth1
        if s.saturation_hold {
            s.depth1 = sat;
            s.buffer_to_2 = incoming_1;
        } else {
            let percolated = incoming_1 * p.percolation_1_to_2;
            let potential = incoming_1 - percolated;
            let absorbed = potential.min((sat - s.depth1).max(0.0));
            s.depth1 += absorbed;
            s.buffer_to_2 = percolated + (potential - absorbed);
            if s.depth1 >= saturated {
                s.saturation_hold = true;
            }
        }

        // Depth2
        let forwarded = incoming_2 * p.percolation_2_to_3;
        let potential = incoming_2 - forwarded;
        let absorbed = potential.min((sat - s.depth2).max(0.0));
        s.depth2 += absorbed;
        s.buffer_to_3 = forwarded + (potential - absorbed);

        // Depth3 is terminal; overflow is lost
        s.depth3 += incoming_3.min((sat - s.depth3).max(0.0));

        // Backpressure release
        if s.saturation_hold && s.depth2 >= saturated {
            s.saturation_hold = false;
        }

        s.depth1 = s.depth1.clamp(base1, sat);
        s.depth2 = s.depth2.clamp(base2, sat);
        s.depth3 = s.depth3.clamp(base3, sat);

        s.reading()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPS: f64 = 1e-9;

    fn open_gate_model() -> MoistureModel {
        let params = MoistureParams::default();
        let state = MoistureState {
            gate_open: true,
            ..MoistureState::at_base(&params)
        };
        MoistureModel::with_state(params, state)
    }

    #[test]
    fn test_no_rain_stays_at_base() {
        let mut model = MoistureModel::new(MoistureParams::default());
        for _ in 0..20 {
            let r = model.step(0.0);
            assert_eq!((r.depth1, r.depth2, r.depth3), (28.0, 24.0, 22.0));
        }
    }

    #[test]
    fn test_gate_blocks_until_threshold() {
        let mut model = MoistureModel::new(MoistureParams::default());

        for _ in 0..16 {
            let r = model.step(3.0);
            assert_eq!(r.depth1, 28.0);
            assert_eq!(model.state().buffer_to_2, 0.0);
            assert!(!model.state().gate_open);
        }
        assert_eq!(model.state().gate_accumulator, 48.0);

        // 17th tick crosses 50 mm and infiltrates immediately
        let r = model.step(3.0);
        assert!(model.state().gate_open);
        assert!((r.depth1 - (28.0 + 3.0 * 0.72)).abs() < EPS);
        assert!((model.state().buffer_to_2 - 3.0 * 0.28).abs() < EPS);
    }

    #[test]
    fn test_infiltration_cap_discards_excess() {
        let mut capped = open_gate_model();
        let mut heavy = open_gate_model();

        let a = capped.step(3.0);
        let b = heavy.step(40.0);
        assert_eq!(a, b);
        assert_eq!(capped.state(), heavy.state());
    }

    #[test]
    fn test_one_tick_transport_lag() {
        let mut model = open_gate_model();

        let first = model.step(3.0);
        assert_eq!(first.depth2, 24.0);
        let in_transit = model.state().buffer_to_2;
        assert!((in_transit - 0.84).abs() < EPS);

        let second = model.step(0.0);
        // Depth2 keeps 90% of what arrived, forwards the rest
        assert!((second.depth2 - (24.0 + in_transit * 0.9)).abs() < EPS);
        assert!((model.state().buffer_to_3 - in_transit * 0.1).abs() < EPS);
        assert_eq!(second.depth3, 22.0);

        let third = model.step(0.0);
        assert!(third.depth3 > 22.0);
    }

    #[test]
    fn test_saturation_hold_pins_and_passes_through() {
        let mut model = open_gate_model();

        let mut ticks = 0;
        while !model.state().saturation_hold {
            model.step(3.0);
            ticks += 1;
            assert!(ticks < 100, "depth1 never saturated");
        }

        // Held ticks: depth1 pinned, capped inflow forwarded untouched
        let r = model.step(5.0);
        assert_eq!(r.depth1, 45.0);
        assert_eq!(model.state().buffer_to_2, 3.0);

        // No rain while held: depth1 does not drain
        let r = model.step(0.0);
        assert_eq!(r.depth1, 45.0);
        assert_eq!(model.state().buffer_to_2, 0.0);
    }

    #[test]
    fn test_hold_released_when_depth2_saturates() {
        let params = MoistureParams::default();
        let state = MoistureState {
            depth1: 45.0,
            depth2: 44.0,
            buffer_to_2: 3.0,
            gate_open: true,
            saturation_hold: true,
            ..MoistureState::at_base(&params)
        };
        let mut model = MoistureModel::with_state(params, state);

        let r = model.step(3.0);
        assert!(r.depth2 >= 44.9);
        assert!(!model.state().saturation_hold);
        assert_eq!(r.depth1, 45.0);

        // Released: depth1 drains again
        let r = model.step(0.0);
        assert!(r.depth1 < 45.0);
    }

    #[test]
    fn test_dry_out_closes_gate() {
        let params = MoistureParams::default();
        let state = MoistureState {
            depth1: 28.101,
            gate_open: true,
            gate_accumulator: 55.0,
            saturation_hold: false,
            ..MoistureState::at_base(&params)
        };
        let mut model = MoistureModel::with_state(params, state);

        model.step(0.0);
        assert!(!model.state().gate_open);
        assert_eq!(model.state().gate_accumulator, 0.0);

        // Fresh rain now accumulates again instead of infiltrating
        let r = model.step(3.0);
        assert!(r.depth1 <= 28.1);
        assert_eq!(model.state().gate_accumulator, 3.0);
    }

    #[test]
    fn test_depth3_overflow_is_lost() {
        let params = MoistureParams::default();
        let state = MoistureState {
            depth3: 44.5,
            buffer_to_3: 10.0,
            ..MoistureState::at_base(&params)
        };
        let mut model = MoistureModel::with_state(params, state);

        let r = model.step(0.0);
        assert!((r.depth3 - 45.0).abs() < EPS);
        assert_eq!(model.state().buffer_to_3, 0.0);
    }
}
