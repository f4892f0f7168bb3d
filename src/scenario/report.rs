//! Scenario reports

use serde::Serialize;

use super::driver::{Failure, ScenarioDriver};
use super::ScenarioState;
use crate::fixture::Workspace;
use crate::process::{CommandResult, CommandRunner};

/// Outcome of one scenario run
#[derive(Debug, Clone, Serialize)]
pub struct ScenarioReport {
    pub name: String,
    pub passed: bool,
    /// State the driver ended in
    pub state: ScenarioState,
    pub steps_run: usize,
    pub steps_total: usize,
    pub workspace: Option<Workspace>,
    /// Commands that ran to completion
    pub commands: Vec<CommandResult>,
    /// Every command line attempted, including ones that could not start
    pub commands_attempted: Vec<String>,
    pub last_result: Option<CommandResult>,
    pub error: Option<Failure>,
}

impl ScenarioReport {
    /// Snapshot a driver after its steps have run
    pub fn from_driver<R: CommandRunner>(
        name: &str,
        driver: &ScenarioDriver<R>,
        steps_run: usize,
        steps_total: usize,
    ) -> Self {
        let error = driver.failure().cloned();
        Self {
            name: name.to_string(),
            passed: error.is_none() && driver.state() != ScenarioState::Failed,
            state: driver.state(),
            steps_run,
            steps_total,
            workspace: driver.workspace().cloned(),
            commands: driver.results().to_vec(),
            commands_attempted: driver.attempted().to_vec(),
            last_result: driver.last_result().cloned(),
            error,
        }
    }

    /// Commands that exited non-zero without failing the scenario
    pub fn failed_commands(&self) -> impl Iterator<Item = &CommandResult> {
        self.commands.iter().filter(|r| !r.success())
    }
}
