//! Scenario lifecycle states

use serde::Serialize;
use std::fmt;

/// Where a scenario is in its lifecycle
///
/// `Init -> WorkspacePrepared -> AppScaffolded -> ConfigRendered -> Deployed -> Verified`,
/// with `Failed` reachable from anywhere.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ScenarioState {
    Init,
    WorkspacePrepared,
    AppScaffolded,
    ConfigRendered,
    Deployed,
    Verified,
    Failed,
}

impl ScenarioState {
    pub fn is_terminal(self) -> bool {
        matches!(self, ScenarioState::Verified | ScenarioState::Failed)
    }
}

impl fmt::Display for ScenarioState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ScenarioState::Init => "init",
            ScenarioState::WorkspacePrepared => "workspace prepared",
            ScenarioState::AppScaffolded => "app scaffolded",
            ScenarioState::ConfigRendered => "config rendered",
            ScenarioState::Deployed => "deployed",
            ScenarioState::Verified => "verified",
            ScenarioState::Failed => "failed",
        };
        write!(f, "{name}")
    }
}
