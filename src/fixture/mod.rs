//! Fixture workspace management
//!
//! Every scenario runs against a freshly reset directory tree holding the
//! bare repository, the scaffolded app and the "server" deploy target.

pub mod env;
mod workspace;

pub use env::{current_user, resolve_executable};
pub use workspace::{reset, Workspace};
