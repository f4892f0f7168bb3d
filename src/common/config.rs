//! Configuration file handling

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use super::paths::config_path;
use super::Result;

/// Main configuration structure
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
pub struct Config {
    /// External tools driven by the harness
    #[serde(default)]
    pub tools: Tools,

    /// Default scenario settings
    #[serde(default)]
    pub defaults: Defaults,

    /// Timeout settings
    #[serde(default)]
    pub timeouts: Timeouts,
}

/// External tool names or paths
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Tools {
    /// Version-control executable
    #[serde(default = "default_vcs")]
    pub vcs: String,

    /// Scaffolding executable run as `<scaffold> .` in the app directory
    #[serde(default = "default_scaffold")]
    pub scaffold: String,

    /// Deployment executable
    #[serde(default = "default_deploy")]
    pub deploy: String,

    /// Deployment tasks, run in order as `<deploy> <task>`
    #[serde(default = "default_deploy_tasks")]
    pub deploy_tasks: Vec<String>,
}

impl Default for Tools {
    fn default() -> Self {
        Self {
            vcs: default_vcs(),
            scaffold: default_scaffold(),
            deploy: default_deploy(),
            deploy_tasks: default_deploy_tasks(),
        }
    }
}

fn default_vcs() -> String {
    "git".to_string()
}
fn default_scaffold() -> String {
    "capify".to_string()
}
fn default_deploy() -> String {
    "cap".to_string()
}
fn default_deploy_tasks() -> Vec<String> {
    vec!["deploy:setup".to_string(), "deploy".to_string()]
}

/// Default scenario settings
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Defaults {
    /// Workspace root, relative to the invocation directory
    #[serde(default = "default_base_dir")]
    pub base_dir: PathBuf,

    /// Branch pushed to the bare repository
    #[serde(default = "default_branch")]
    pub branch: String,

    /// Remote name for the bare repository
    #[serde(default = "default_remote")]
    pub remote: String,

    /// Message of the scaffold commit
    #[serde(default = "default_commit_message")]
    pub commit_message: String,

    /// Abort on the first non-zero exit code
    #[serde(default)]
    pub strict: bool,
}

impl Default for Defaults {
    fn default() -> Self {
        Self {
            base_dir: default_base_dir(),
            branch: default_branch(),
            remote: default_remote(),
            commit_message: default_commit_message(),
            strict: false,
        }
    }
}

fn default_base_dir() -> PathBuf {
    PathBuf::from("test_files")
}
fn default_branch() -> String {
    "master".to_string()
}
fn default_remote() -> String {
    "origin".to_string()
}
fn default_commit_message() -> String {
    "first commit".to_string()
}

/// Timeout settings in seconds
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Timeouts {
    /// Per-command timeout
    #[serde(default = "default_command")]
    pub command_secs: u64,
}

impl Default for Timeouts {
    fn default() -> Self {
        Self {
            command_secs: default_command(),
        }
    }
}

fn default_command() -> u64 {
    300
}

impl Config {
    /// Load configuration from the default config file
    ///
    /// Returns default configuration if file doesn't exist
    pub fn load() -> Result<Self> {
        if let Some(path) = config_path() {
            if path.exists() {
                return Self::load_from(&path);
            }
        }
        Ok(Self::default())
    }

    /// Load configuration from an explicit path
    pub fn load_from(path: &std::path::Path) -> Result<Self> {
        let content =
            std::fs::read_to_string(path).map_err(|e| super::Error::file_read(path, e))?;
        Self::parse(&content)
    }

    /// Parse configuration from TOML text
    pub fn parse(content: &str) -> Result<Self> {
        let config: Self =
            toml::from_str(content).map_err(|e| super::Error::ConfigParse(e.to_string()))?;
        if config.timeouts.command_secs == 0 {
            return Err(super::Error::ConfigParse(
                "timeouts.command_secs must be at least 1".to_string(),
            ));
        }
        Ok(config)
    }

    /// Render the effective configuration as TOML
    pub fn to_toml(&self) -> Result<String> {
        toml::to_string_pretty(self).map_err(|e| super::Error::Config(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_match_capistrano_flow() {
        let config = Config::default();
        assert_eq!(config.tools.vcs, "git");
        assert_eq!(config.tools.scaffold, "capify");
        assert_eq!(config.tools.deploy_tasks, vec!["deploy:setup", "deploy"]);
        assert_eq!(config.defaults.remote, "origin");
        assert_eq!(config.defaults.base_dir, PathBuf::from("test_files"));
        assert!(!config.defaults.strict);
        assert_eq!(config.timeouts.command_secs, 300);
    }

    #[test]
    fn test_partial_file_keeps_defaults() {
        let config = Config::parse(
            r#"
[tools]
deploy = "/opt/bin/cap"

[timeouts]
command_secs = 30
"#,
        )
        .unwrap();
        assert_eq!(config.tools.deploy, "/opt/bin/cap");
        assert_eq!(config.tools.vcs, "git");
        assert_eq!(config.timeouts.command_secs, 30);
        assert_eq!(config.defaults.branch, "master");
    }

    #[test]
    fn test_invalid_file_is_parse_error() {
        let err = Config::parse("[timeouts]\ncommand_secs = \"soon\"").unwrap_err();
        assert!(matches!(err, crate::Error::ConfigParse(_)));
    }

    #[test]
    fn test_round_trips_through_toml() {
        let text = Config::default().to_toml().unwrap();
        let parsed = Config::parse(&text).unwrap();
        assert_eq!(parsed.defaults.commit_message, "first commit");
    }

    #[test]
    fn test_zero_command_timeout_rejected() {
        let err = Config::parse("[timeouts]\ncommand_secs = 0").unwrap_err();
        assert!(matches!(err, crate::Error::ConfigParse(_)));
    }
}
