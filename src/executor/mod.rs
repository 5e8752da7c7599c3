//! Scenario execution

mod preflight;
mod runner;

pub use preflight::{HealthCheck, PreFlightChecker, PreFlightResult};
pub use runner::ScenarioRunner;
