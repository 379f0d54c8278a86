use anyhow::Result;
use riskgeo_monitor::{api, config, controller, telemetry};
use config::Config;
use telemetry::init_tracing;
use tracing::{info, warn};

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    init_tracing();

    let cfg = Config::load()?;

    let app_state = controller::AppState::new(cfg.clone())?;
    let app = api::router(app_state.clone(), &cfg);

    let addr = cfg.server.socket_addr()?;
    info!(
        %addr,
        seed = ?cfg.simulation.random_seed,
        prefill = cfg.simulation.prefill_samples,
        "starting RiskGeo monitor"
    );

    let tasks = controller::spawn_background_tasks(app_state);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(telemetry::shutdown_signal())
        .await?;

    for task in tasks {
        task.abort();
    }
    warn!("shutdown complete");
    Ok(())
}
