//! Configuration and log paths
//!
//! Uses the directories crate for platform-appropriate locations:
//! - Linux: `~/.config/deploy-harness/`
//! - macOS: `~/Library/Application Support/deploy-harness/`
//! - Windows: `%APPDATA%\deploy-harness\`

use std::path::{Path, PathBuf};

/// Name used for config and data directories
const APP_NAME: &str = "deploy-harness";

/// Get the configuration directory path
pub fn config_dir() -> Option<PathBuf> {
    directories::ProjectDirs::from("", "", APP_NAME).map(|dirs| dirs.config_dir().to_path_buf())
}

/// Get the path to the configuration file
pub fn config_path() -> Option<PathBuf> {
    config_dir().map(|dir| dir.join("config.toml"))
}

/// Get the path to the log directory
pub fn log_dir() -> Option<PathBuf> {
    directories::ProjectDirs::from("", "", APP_NAME).map(|dirs| dirs.data_dir().join("logs"))
}

/// Resolve `path` against `base` unless it is already absolute
pub fn resolve_against(base: &Path, path: &Path) -> PathBuf {
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        base.join(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_path_is_toml() {
        if let Some(path) = config_path() {
            assert_eq!(path.file_name().and_then(|n| n.to_str()), Some("config.toml"));
        }
    }

    #[test]
    fn test_resolve_against() {
        let base = Path::new("/work/scenarios");
        assert_eq!(
            resolve_against(base, Path::new("templates/deploy.rb.tmpl")),
            PathBuf::from("/work/scenarios/templates/deploy.rb.tmpl")
        );
        assert_eq!(
            resolve_against(base, Path::new("/tmp/t1")),
            PathBuf::from("/tmp/t1")
        );
    }
}
