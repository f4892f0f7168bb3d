//! Workspace reset and layout

use std::fs;
use std::io;
use std::path::{Component, Path, PathBuf};

use serde::Serialize;

use crate::common::{Error, Result};

/// Directory tree owned by one scenario run
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Workspace {
    /// Root of the tree, removed and recreated on reset
    pub root_path: PathBuf,
    /// Dummy application that gets scaffolded and pushed
    pub app_path: PathBuf,
    /// Bare repository the app is pushed to
    pub repo_path: PathBuf,
    /// Deploy target standing in for the remote host
    pub deployed_path: PathBuf,
}

impl Workspace {
    /// Compute the layout under `root` without touching the filesystem
    pub fn layout(root: &Path) -> Self {
        Self {
            root_path: root.to_path_buf(),
            app_path: root.join("app"),
            repo_path: root.join("repo"),
            deployed_path: root.join("deployed"),
        }
    }

    /// `<deployed>/shared`, where the deploy tool keeps files across releases
    pub fn shared_path(&self) -> PathBuf {
        self.deployed_path.join("shared")
    }

    /// Expected location of a marker file
    pub fn marker_path(&self, name: &str) -> PathBuf {
        self.shared_path().join(name)
    }

    /// Where the rendered deploy configuration is written
    pub fn deploy_config_path(&self) -> PathBuf {
        self.app_path.join("config").join("deploy.rb")
    }

    /// `file://` URL of the bare repository
    pub fn repo_url(&self) -> String {
        format!("file://{}", self.repo_path.display())
    }
}

/// Resolve `.` and `..` components without touching the filesystem
fn normalize(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                out.pop();
            }
            other => out.push(other.as_os_str()),
        }
    }
    out
}

/// Reset the workspace rooted at `base_dir`
///
/// Removes any existing tree (absent is fine), recreates the root and the
/// app and repo directories. The deployed directory is left for the deploy
/// tool's setup task to create.
pub fn reset(base_dir: &Path) -> Result<Workspace> {
    let root = std::path::absolute(base_dir)
        .map(|path| normalize(&path))
        .map_err(|e| Error::workspace_io(base_dir, e))?;

    // A symlink can still point an innocent-looking path at `/`
    let resolved = fs::canonicalize(&root).unwrap_or_else(|_| root.clone());
    if root.parent().is_none() || resolved.parent().is_none() {
        return Err(Error::Config(format!(
            "Refusing to use filesystem root '{}' as a workspace",
            root.display()
        )));
    }

    match fs::remove_dir_all(&root) {
        Ok(()) => tracing::debug!(path = %root.display(), "Removed previous workspace"),
        Err(e) if e.kind() == io::ErrorKind::NotFound => {}
        Err(e) => return Err(Error::workspace_io(&root, e)),
    }

    let workspace = Workspace::layout(&root);
    for dir in [&workspace.root_path, &workspace.app_path, &workspace.repo_path] {
        fs::create_dir_all(dir).map_err(|e| Error::workspace_io(dir, e))?;
    }

    tracing::info!(root = %root.display(), "Workspace prepared");
    Ok(workspace)
}
