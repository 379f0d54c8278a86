use axum::{extract::State, Json};
use serde::Serialize;

use crate::{
    alerts::{monitor::Assessment, AlertLevel},
    controller::AppState,
    simulation::{round2, MoistureState, RainfallEngineState, Sample},
};

#[derive(Debug, Serialize)]
pub struct RiskData {
    accumulated_72h: f64,
}

/// GET /api/risk_data - 72h rainfall ending at the newest sample.
///
/// The window is by timestamp with an inclusive start, so at a 10-minute
/// cadence it covers 433 samples, one more than a fixed count of 72 * 6.
pub async fn get_risk_data(State(state): State<AppState>) -> Json<RiskData> {
    let simulation = state.simulation.read().await;
    let assessment = Assessment::of(simulation.history(), &state.base_pct(), &state.cfg.alerts);
    Json(RiskData {
        accumulated_72h: round2(assessment.accumulated_72h),
    })
}

#[derive(Debug, Serialize)]
pub struct SoilRiskData {
    alert_level: AlertLevel,
    alert_color: &'static str,
    height_percent: u8,
}

/// GET /api/soil_risk_data - soil gauge for the newest sample
pub async fn get_soil_risk_data(State(state): State<AppState>) -> Json<SoilRiskData> {
    let simulation = state.simulation.read().await;
    let level = Assessment::of(simulation.history(), &state.base_pct(), &state.cfg.alerts).soil_level;
    Json(SoilRiskData {
        alert_level: level,
        alert_color: level.color(),
        height_percent: level.height_percent(),
    })
}

#[derive(Debug, Serialize)]
pub struct LevelInfo {
    level: AlertLevel,
    color: &'static str,
}

impl From<AlertLevel> for LevelInfo {
    fn from(level: AlertLevel) -> Self {
        Self {
            level,
            color: level.color(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct SiteStatus {
    latest: Option<Sample>,
    accumulated_72h: f64,
    rain: LevelInfo,
    soil: LevelInfo,
    rainfall_engine: RainfallEngineState,
    moisture_model: MoistureState,
    notification_channels: Vec<&'static str>,
}

/// GET /api/status - newest sample, current levels and engine state
pub async fn get_status(State(state): State<AppState>) -> Json<SiteStatus> {
    let simulation = state.simulation.read().await;
    let assessment = Assessment::of(simulation.history(), &state.base_pct(), &state.cfg.alerts);

    Json(SiteStatus {
        latest: simulation.history().latest().cloned(),
        accumulated_72h: round2(assessment.accumulated_72h),
        rain: assessment.rain_level.into(),
        soil: assessment.soil_level.into(),
        rainfall_engine: simulation.rainfall_state().clone(),
        moisture_model: simulation.moisture_state().clone(),
        notification_channels: state.dispatcher.channels(),
    })
}
