//! RiskGeo Monitor: simulated rainfall and soil-moisture feed for slope
//! stability monitoring, with rain/soil alert levels and notifications.

pub mod alerts;
pub mod api;
pub mod config;
pub mod controller;
pub mod notify;
pub mod report;
pub mod simulation;
pub mod telemetry;
