//! Deploy configuration templating
//!
//! Templates use `{{ name }}` placeholders. Rendering is strict: a
//! placeholder without a value is an error, never an empty string, so a
//! scenario can't pass against the wrong deploy path.

mod context;
mod error;
mod render;

pub use context::{DeployVariables, TemplateContext};
pub use error::TemplateError;
pub use render::{referenced_variables, render, render_file};
pub(crate) use render::write_rendered;

/// Deploy template shipped with the harness
pub const DEFAULT_DEPLOY_TEMPLATE: &str = include_str!("../../templates/deploy.rb.tmpl");
