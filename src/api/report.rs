use axum::{
    extract::{Query, State},
    Json,
};
use chrono::NaiveDate;
use serde::Deserialize;

use crate::{api::error::ApiError, controller::AppState, report::ReportSummary};

#[derive(Debug, Deserialize)]
pub struct ReportQuery {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

/// GET /api/report?start=YYYY-MM-DD&end=YYYY-MM-DD
pub async fn get_report(
    State(state): State<AppState>,
    Query(query): Query<ReportQuery>,
) -> Result<Json<ReportSummary>, ApiError> {
    if query.start > query.end {
        return Err(ApiError::BadRequest(format!(
            "start {} is after end {}",
            query.start, query.end
        )));
    }

    let simulation = state.simulation.read().await;
    ReportSummary::build(simulation.history(), query.start, query.end)
        .map(Json)
        .ok_or_else(|| {
            ApiError::NotFound(format!(
                "no samples between {} and {}",
                query.start, query.end
            ))
        })
}
