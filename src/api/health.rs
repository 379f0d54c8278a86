use axum::{extract::State, Json};
use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::controller::AppState;

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    status: &'static str,
    /// Time of the next simulated tick
    simulated_time: DateTime<Utc>,
    samples: usize,
}

/// GET /health
pub async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    let simulation = state.simulation.read().await;
    Json(HealthResponse {
        status: "running",
        simulated_time: simulation.clock(),
        samples: simulation.history().len(),
    })
}
