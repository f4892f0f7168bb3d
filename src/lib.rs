//! Deploy harness - a scenario-driven test harness for deployment tools
//!
//! This library resets fixture workspaces, renders deploy configuration
//! templates, runs external commands, and drives Given/When/Then scenarios
//! through an explicit state machine.

pub mod cli;
pub mod commands;
pub mod common;
pub mod fixture;
pub mod process;
pub mod scenario;
pub mod template;

// Re-export commonly used types for tests
pub use common::{Error, Result};
pub use fixture::Workspace;
pub use process::{CommandResult, CommandRunner, CommandSpec, ProcessRunner};
pub use scenario::{ScenarioDriver, ScenarioReport, ScenarioState};
pub use template::{DeployVariables, TemplateContext, TemplateError};
