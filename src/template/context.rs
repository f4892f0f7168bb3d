//! Template variables

use indexmap::IndexMap;
use serde::Serialize;
use std::path::Path;

use super::TemplateError;
use crate::fixture::Workspace;

/// The variables every deploy template may rely on
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DeployVariables {
    /// Directory the deploy tool releases into
    pub deploy_to: String,
    /// Repository the deploy tool checks out from
    pub repository: String,
    /// Absolute path of the version-control executable
    pub executable_path: String,
    /// User the deploy tool connects as
    pub current_user: String,
    /// Branch the app was pushed to and the deploy tool checks out
    pub branch: String,
}

impl DeployVariables {
    /// Names of the required variables, in context order
    pub const NAMES: [&'static str; 5] = [
        "deploy_to",
        "repository",
        "executable_path",
        "current_user",
        "branch",
    ];

    /// Validate and build the variable set; no value may be blank
    pub fn new(
        deploy_to: impl Into<String>,
        repository: impl Into<String>,
        executable_path: impl Into<String>,
        current_user: impl Into<String>,
        branch: impl Into<String>,
    ) -> Result<Self, TemplateError> {
        let vars = Self {
            deploy_to: deploy_to.into(),
            repository: repository.into(),
            executable_path: executable_path.into(),
            current_user: current_user.into(),
            branch: branch.into(),
        };

        for (name, value) in vars.pairs() {
            if value.trim().is_empty() {
                return Err(TemplateError::EmptyValue {
                    name: name.to_string(),
                });
            }
        }

        Ok(vars)
    }

    /// Variables pointing the deploy tool at a workspace
    pub fn for_workspace(
        workspace: &Workspace,
        executable_path: &Path,
        current_user: &str,
        branch: &str,
    ) -> Result<Self, TemplateError> {
        Self::new(
            workspace.deployed_path.display().to_string(),
            workspace.repo_path.display().to_string(),
            executable_path.display().to_string(),
            current_user,
            branch,
        )
    }

    fn pairs(&self) -> [(&'static str, &str); 5] {
        [
            (Self::NAMES[0], self.deploy_to.as_str()),
            (Self::NAMES[1], self.repository.as_str()),
            (Self::NAMES[2], self.executable_path.as_str()),
            (Self::NAMES[3], self.current_user.as_str()),
            (Self::NAMES[4], self.branch.as_str()),
        ]
    }
}

/// Ordered, read-only mapping of variable names to values
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct TemplateContext {
    vars: IndexMap<String, String>,
}

impl TemplateContext {
    /// Context holding the deploy variables followed by `extra`
    ///
    /// Extra entries never replace a deploy variable.
    pub fn with_extra<I, K, V>(deploy: DeployVariables, extra: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let mut context = Self::from(deploy);
        for (key, value) in extra {
            let key = key.into();
            if context.vars.contains_key(&key) {
                tracing::warn!(variable = %key, "Ignoring extra variable shadowing a deploy variable");
                continue;
            }
            context.vars.insert(key, value.into());
        }
        context
    }

    /// Look up a variable
    pub fn get(&self, name: &str) -> Option<&str> {
        self.vars.get(name).map(String::as_str)
    }

    /// Iterate variables in insertion order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.vars.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.vars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.vars.is_empty()
    }
}

impl From<DeployVariables> for TemplateContext {
    fn from(deploy: DeployVariables) -> Self {
        deploy
            .pairs()
            .into_iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for TemplateContext {
    fn from_iter<T: IntoIterator<Item = (K, V)>>(iter: T) -> Self {
        Self {
            vars: iter
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }
}
