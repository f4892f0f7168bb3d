//! Environment lookups used to build the template context

use std::path::PathBuf;

use crate::common::{Error, Result};

/// Login name of the user running the harness
///
/// Prefers the controlling terminal's login, then `USER` / `USERNAME`.
pub fn current_user() -> Result<String> {
    if let Some(name) = login_name() {
        return Ok(name);
    }

    ["USER", "USERNAME"]
        .iter()
        .filter_map(|var| std::env::var(var).ok())
        .find(|name| !name.trim().is_empty())
        .ok_or_else(|| Error::Config("Could not determine the current user".to_string()))
}

#[cfg(unix)]
fn login_name() -> Option<String> {
    // getlogin returns a pointer into static storage, or null without a tty
    let ptr = unsafe { libc::getlogin() };
    if ptr.is_null() {
        return None;
    }
    let name = unsafe { std::ffi::CStr::from_ptr(ptr) }
        .to_string_lossy()
        .into_owned();
    (!name.is_empty()).then_some(name)
}

#[cfg(not(unix))]
fn login_name() -> Option<String> {
    None
}

/// Resolve an executable name to an absolute path via PATH
pub fn resolve_executable(name: &str) -> Result<PathBuf> {
    which::which(name).map_err(|_| Error::ExecutableNotFound {
        name: name.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_current_user_is_not_empty() {
        // CI containers may have neither a tty nor USER set
        if let Ok(user) = current_user() {
            assert!(!user.trim().is_empty());
        }
    }

    #[cfg(unix)]
    #[test]
    fn test_resolve_executable_finds_sh() {
        let path = resolve_executable("sh").unwrap();
        assert!(path.is_absolute());
    }

    #[test]
    fn test_resolve_missing_executable() {
        let err = resolve_executable("definitely-not-a-real-tool-4242").unwrap_err();
        assert!(matches!(err, Error::ExecutableNotFound { .. }));
    }
}
