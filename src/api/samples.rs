use axum::{
    extract::{Query, State},
    Json,
};
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::{
    api::error::ApiError,
    controller::AppState,
    report::{rain_axis_max, recomputed_series, SeriesPoint},
};

const DEFAULT_HOURS: u32 = 72;

#[derive(Debug, Deserialize, Validate)]
pub struct SamplesQuery {
    #[validate(range(min = 1, max = 96))]
    pub hours: Option<u32>,
}

#[derive(Debug, Serialize)]
pub struct SamplesResponse {
    hours: u32,
    rain_axis_max: f64,
    samples: Vec<SeriesPoint>,
}

/// GET /api/samples?hours=H - the newest H hours of samples for charting
pub async fn get_samples(
    State(state): State<AppState>,
    Query(query): Query<SamplesQuery>,
) -> Result<Json<SamplesResponse>, ApiError> {
    query.validate()?;
    let hours = query.hours.unwrap_or(DEFAULT_HOURS);
    let count = hours as usize * state.cfg.simulation.samples_per_hour();

    let simulation = state.simulation.read().await;
    let samples = recomputed_series(simulation.history().tail(count));
    let max_rain = samples.iter().map(|p| p.rainfall_mm).fold(0.0_f64, f64::max);

    Ok(Json(SamplesResponse {
        hours,
        rain_axis_max: rain_axis_max(max_rain),
        samples,
    }))
}
