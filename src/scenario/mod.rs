//! Scenario driver
//!
//! Reads YAML scenario files, matches their Given/When/Then steps, and
//! drives a workspace through scaffolding, rendering, deploying and
//! verification.

mod config;
mod driver;
mod report;
mod runner;
mod settings;
mod state;
mod steps;

pub use config::{Keyword, ScenarioFile, StepLine, DEFAULT_SCENARIO};
pub use driver::{Failure, ScenarioDriver};
pub use report::ScenarioReport;
pub use runner::{run_scenario, Output};
pub use settings::{DriverSettings, Overrides, TemplateSource};
pub use state::ScenarioState;
pub use steps::{match_step, StepDefinition};
