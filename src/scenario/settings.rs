//! Effective settings for one scenario run
//!
//! Precedence: command-line flag, then scenario file, then config file,
//! then built-in default.

use indexmap::IndexMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

use super::ScenarioFile;
use crate::common::config::{Config, Tools};
use crate::common::paths::resolve_against;

/// Where the deploy template comes from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TemplateSource {
    /// The template embedded in the binary
    Builtin,
    /// A template file on disk
    File(PathBuf),
}

/// Command-line overrides
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub base_dir: Option<PathBuf>,
    pub strict: bool,
    pub timeout_secs: Option<u64>,
}

/// Everything the driver needs to know, resolved
#[derive(Debug, Clone)]
pub struct DriverSettings {
    /// Absolute workspace root
    pub base_dir: PathBuf,
    pub tools: Tools,
    pub branch: String,
    pub remote: String,
    pub commit_message: String,
    pub strict: bool,
    pub command_timeout: Duration,
    pub template: TemplateSource,
    pub variables: IndexMap<String, String>,
    /// Login name override; looked up from the environment when unset
    pub current_user: Option<String>,
}

impl DriverSettings {
    /// Settings from the config file alone, rooted at `invocation_dir`
    pub fn from_config(config: &Config, invocation_dir: &Path) -> Self {
        Self {
            base_dir: resolve_against(invocation_dir, &config.defaults.base_dir),
            tools: config.tools.clone(),
            branch: config.defaults.branch.clone(),
            remote: config.defaults.remote.clone(),
            commit_message: config.defaults.commit_message.clone(),
            strict: config.defaults.strict,
            command_timeout: Duration::from_secs(config.timeouts.command_secs),
            template: TemplateSource::Builtin,
            variables: IndexMap::new(),
            current_user: None,
        }
    }

    /// Layer a scenario file and command-line overrides over the config
    ///
    /// Scenario paths are relative to `scenario_dir`, command-line paths to
    /// `invocation_dir`.
    pub fn resolve(
        config: &Config,
        scenario: &ScenarioFile,
        scenario_dir: &Path,
        overrides: &Overrides,
        invocation_dir: &Path,
    ) -> Self {
        let mut settings = Self::from_config(config, invocation_dir);

        if let Some(base_dir) = &scenario.base_dir {
            settings.base_dir = resolve_against(scenario_dir, base_dir);
        }
        if let Some(template) = &scenario.template {
            settings.template = TemplateSource::File(resolve_against(scenario_dir, template));
        }
        if let Some(strict) = scenario.strict {
            settings.strict = strict;
        }
        if let Some(secs) = scenario.timeout_secs {
            settings.command_timeout = Duration::from_secs(secs);
        }
        settings.variables = scenario.variables.clone();

        if let Some(base_dir) = &overrides.base_dir {
            settings.base_dir = resolve_against(invocation_dir, base_dir);
        }
        if overrides.strict {
            settings.strict = true;
        }
        if let Some(secs) = overrides.timeout_secs {
            settings.command_timeout = Duration::from_secs(secs);
        }

        settings
    }
}
