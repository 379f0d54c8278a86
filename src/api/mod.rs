pub mod error;
pub mod health;
pub mod report;
pub mod risk;
pub mod samples;
pub mod simulation;

use axum::{
    routing::{get, post},
    Router,
};
use std::time::Duration;
use tower::ServiceBuilder;
use tower_http::{cors::CorsLayer, timeout::TimeoutLayer, trace::TraceLayer};

use crate::{config::Config, controller::AppState};

pub fn router(state: AppState, cfg: &Config) -> Router {
    let mut router = Router::new()
        .route("/health", get(health::health_check))
        .route("/api/risk_data", get(risk::get_risk_data))
        .route("/api/soil_risk_data", get(risk::get_soil_risk_data))
        .route("/api/status", get(risk::get_status))
        .route("/api/samples", get(samples::get_samples))
        .route("/api/report", get(report::get_report))
        .route("/api/window_sums", post(simulation::window_sums))
        .route("/restart-simulation", get(simulation::restart_simulation))
        .with_state(state);

    if cfg.server.enable_cors {
        let cors = CorsLayer::new()
            .allow_origin(tower_http::cors::Any)
            .allow_methods([axum::http::Method::GET, axum::http::Method::POST])
            .allow_headers([axum::http::header::CONTENT_TYPE]);
        router = router.layer(cors);
    }

    router
        .layer(
            ServiceBuilder::new()
                .layer(axum::extract::DefaultBodyLimit::max(1024 * 1024))
                .layer(TimeoutLayer::new(Duration::from_secs(
                    cfg.server.request_timeout_secs.max(1),
                ))),
        )
        .layer(TraceLayer::new_for_http())
}
