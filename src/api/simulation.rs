use axum::{extract::State, response::Redirect, Json};
use chrono::Utc;
use serde::Deserialize;
use serde_json::Value;
use tracing::debug;

use crate::{
    api::error::ApiError,
    controller::AppState,
    simulation::{parse_timestamp, rolling_sums, HistoryRecord, WindowSums},
};

/// GET /restart-simulation - start a fresh run, then show its status
pub async fn restart_simulation(State(state): State<AppState>) -> Redirect {
    state.restart(Utc::now()).await;
    Redirect::to("/api/status")
}

#[derive(Debug, Deserialize)]
pub struct WindowSumsRequest {
    pub now: String,
    #[serde(default)]
    pub history: Vec<Value>,
}

/// POST /api/window_sums - trailing 24h/72h sums over caller-supplied records.
///
/// Records are validated one by one; malformed entries are skipped rather
/// than failing the request.
pub async fn window_sums(Json(req): Json<WindowSumsRequest>) -> Result<Json<WindowSums>, ApiError> {
    let now = parse_timestamp(&req.now)
        .ok_or_else(|| ApiError::BadRequest(format!("invalid timestamp: {}", req.now)))?;
    let records = windowable_records(&req.history);
    debug!(
        received = req.history.len(),
        skipped = req.history.len() - records.len(),
        "computing window sums"
    );

    Ok(Json(rolling_sums(&records, now)))
}

fn windowable_records(history: &[Value]) -> Vec<HistoryRecord> {
    history
        .iter()
        .map(HistoryRecord::from_json)
        .filter(HistoryRecord::is_windowable)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_windowable_records_drop_incomplete_entries() {
        let history = vec![
            json!({"timestamp": "2024-08-01T00:00:00Z", "rainfall_mm": 1.0}),
            json!({"timestamp": "2024-08-01T00:10:00Z"}),
            json!({"rainfall_mm": 3.0}),
            json!("garbage"),
            json!({"timestamp": "2024-08-01T00:20:00", "pluviometria_mm": 0.5}),
        ];

        let records = windowable_records(&history);

        assert_eq!(records.len(), 2);
        assert_eq!(records[0].rainfall_mm, Some(1.0));
        assert_eq!(records[1].rainfall_mm, Some(0.5));
    }
}
