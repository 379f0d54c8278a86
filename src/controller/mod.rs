use anyhow::Result;
use chrono::{DateTime, Utc};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::alerts::{AlertEvent, AlertMonitor};
use crate::config::Config;
use crate::notify::NotificationDispatcher;
use crate::simulation::Simulation;

#[derive(Clone)]
pub struct AppState {
    pub cfg: Arc<Config>,
    pub simulation: Arc<RwLock<Simulation>>,
    pub alerts: Arc<RwLock<AlertMonitor>>,
    pub dispatcher: Arc<NotificationDispatcher>,
}

impl AppState {
    /// Build state from config and start the simulation at the current time
    pub fn new(cfg: Config) -> Result<Self> {
        let dispatcher = NotificationDispatcher::from_config(&cfg.notifications)?;
        info!(channels = ?dispatcher.channels(), "notification channels ready");
        Ok(Self::with_dispatcher(cfg, dispatcher, Utc::now()))
    }

    pub fn with_dispatcher(
        cfg: Config,
        dispatcher: NotificationDispatcher,
        now: DateTime<Utc>,
    ) -> Self {
        let simulation = Simulation::start(&cfg.simulation, now);
        let alerts = AlertMonitor::new(cfg.alerts.clone());
        Self {
            cfg: Arc::new(cfg),
            simulation: Arc::new(RwLock::new(simulation)),
            alerts: Arc::new(RwLock::new(alerts)),
            dispatcher: Arc::new(dispatcher),
        }
    }

    /// Moisture base levels the soil alert compares against
    pub fn base_pct(&self) -> [f64; 3] {
        self.cfg.simulation.params.moisture.base_pct
    }

    /// Discard the run and start over from `now` with a fresh prefill
    pub async fn restart(&self, now: DateTime<Utc>) {
        let mut simulation = self.simulation.write().await;
        let mut alerts = self.alerts.write().await;
        *simulation = Simulation::start(&self.cfg.simulation, now);
        alerts.reset();
        info!(clock = %simulation.clock(), "simulation restarted");
    }

    /// Advance the simulation by one scheduler step
    pub async fn step_simulation(&self) {
        let mut simulation = self.simulation.write().await;
        if let Some(latest) = simulation.advance(self.cfg.simulation.ticks_per_step) {
            debug!(
                timestamp = %latest.timestamp,
                rainfall_mm = latest.rainfall_mm,
                cumulative_mm = latest.cumulative_rainfall_mm,
                "simulation step"
            );
        }
    }

    /// Evaluate the current history and hand notifiable events to the dispatcher
    pub async fn check_alerts(&self, raised_at: DateTime<Utc>) -> Vec<AlertEvent> {
        let simulation = self.simulation.read().await;
        if simulation.history().is_empty() {
            return Vec::new();
        }
        let events = self
            .alerts
            .write()
            .await
            .evaluate(simulation.history(), &self.base_pct(), raised_at);
        drop(simulation);

        for event in &events {
            if self.dispatcher.is_empty() {
                warn!(event_id = %event.id, "no notification channel configured");
            } else {
                self.dispatcher.dispatch(event.clone());
            }
        }
        events
    }
}

/// Start the simulation scheduler and the alert monitor loops
pub fn spawn_background_tasks(state: AppState) -> Vec<JoinHandle<()>> {
    let sim_state = state.clone();
    let simulation = tokio::spawn(async move {
        let every = Duration::from_secs(sim_state.cfg.simulation.step_interval_secs.max(1));
        let mut interval = tokio::time::interval(every);
        // first tick completes immediately and the prefill already covers it
        interval.tick().await;
        loop {
            interval.tick().await;
            sim_state.step_simulation().await;
        }
    });

    let alert_state = state;
    let alerts = tokio::spawn(async move {
        let every = Duration::from_secs(alert_state.cfg.alerts.check_interval_secs.max(1));
        let mut interval = tokio::time::interval(every);
        interval.tick().await;
        loop {
            interval.tick().await;
            let events = alert_state.check_alerts(Utc::now()).await;
            if !events.is_empty() {
                info!(count = events.len(), "alert events raised");
            }
        }
    });

    vec![simulation, alerts]
}
