//! Scenario file types
//!
//! Defines the data structures for deserializing YAML scenario files.

use indexmap::IndexMap;
use serde::Deserialize;
use std::fmt;
use std::path::{Path, PathBuf};

use crate::common::{Error, Result};

/// Scenario run when no file is given
pub const DEFAULT_SCENARIO: &str = include_str!("../../features/deploy.yaml");

/// A complete scenario loaded from a YAML file
#[derive(Deserialize, Debug, Clone)]
#[serde(deny_unknown_fields)]
pub struct ScenarioFile {
    /// Name of the scenario
    pub name: String,
    /// Optional description of what the scenario verifies
    pub description: Option<String>,
    /// Workspace root, relative to the scenario file
    pub base_dir: Option<PathBuf>,
    /// Deploy template, relative to the scenario file
    pub template: Option<PathBuf>,
    /// Abort on the first non-zero exit code
    pub strict: Option<bool>,
    /// Per-command timeout in seconds
    pub timeout_secs: Option<u64>,
    /// Template variables beyond the deploy variables
    #[serde(default)]
    pub variables: IndexMap<String, String>,
    /// Given/When/Then steps, in order
    pub steps: Vec<StepLine>,
}

/// One `- given: ...` / `- when: ...` / `- then: ...` entry
#[derive(Deserialize, Debug, Clone, Default)]
#[serde(deny_unknown_fields)]
pub struct StepLine {
    pub given: Option<String>,
    pub when: Option<String>,
    pub then: Option<String>,
    pub and: Option<String>,
}

/// Gherkin keyword a step was written with
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Keyword {
    Given,
    When,
    Then,
    And,
}

impl fmt::Display for Keyword {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Keyword::Given => write!(f, "Given"),
            Keyword::When => write!(f, "When"),
            Keyword::Then => write!(f, "Then"),
            Keyword::And => write!(f, "And"),
        }
    }
}

impl StepLine {
    /// The keyword and text of this step; exactly one must be set
    pub fn keyword_and_text(&self) -> Result<(Keyword, &str)> {
        let set: Vec<(Keyword, &str)> = [
            (Keyword::Given, &self.given),
            (Keyword::When, &self.when),
            (Keyword::Then, &self.then),
            (Keyword::And, &self.and),
        ]
        .into_iter()
        .filter_map(|(k, text)| text.as_deref().map(|t| (k, t.trim())))
        .collect();

        match set.as_slice() {
            [single] => Ok(*single),
            [] => Err(Error::Scenario(
                "Step needs one of 'given', 'when', 'then' or 'and'".to_string(),
            )),
            _ => Err(Error::Scenario(
                "Step must use exactly one of 'given', 'when', 'then' or 'and'".to_string(),
            )),
        }
    }
}

impl ScenarioFile {
    /// Parse a scenario from YAML text
    pub fn parse(content: &str) -> Result<Self> {
        let scenario: Self = serde_yaml::from_str(content)
            .map_err(|e| Error::Scenario(format!("Failed to parse scenario: {}", e)))?;
        if scenario.steps.is_empty() {
            return Err(Error::Scenario(format!(
                "Scenario '{}' has no steps",
                scenario.name
            )));
        }
        if scenario.timeout_secs == Some(0) {
            return Err(Error::Scenario(format!(
                "Scenario '{}': timeout_secs must be at least 1",
                scenario.name
            )));
        }
        for step in &scenario.steps {
            step.keyword_and_text()?;
        }
        Ok(scenario)
    }

    /// Load a scenario file from disk
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            Error::Scenario(format!(
                "Failed to read scenario '{}': {}",
                path.display(),
                e
            ))
        })?;
        Self::parse(&content)
    }

    /// The scenario shipped with the harness
    pub fn builtin() -> Result<Self> {
        Self::parse(DEFAULT_SCENARIO)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_scenario_parses() {
        let scenario = ScenarioFile::builtin().unwrap();
        assert_eq!(scenario.steps.len(), 4);
        let (keyword, text) = scenario.steps[3].keyword_and_text().unwrap();
        assert_eq!(keyword, Keyword::Then);
        assert_eq!(text, "the PEOPLE_LIKE_YOU file should be written to shared");
    }

    #[test]
    fn test_full_scenario_fields() {
        let scenario = ScenarioFile::parse(
            r#"
name: strict deploy
base_dir: work/t1
template: templates/custom.rb.tmpl
strict: true
timeout_secs: 60
variables:
  application: dummy
  stage: test
steps:
  - given: an app
  - when: I deploy
  - and: the PEOPLE_LIKE_YOU file should be written to shared
"#,
        )
        .unwrap();
        assert_eq!(scenario.base_dir, Some(PathBuf::from("work/t1")));
        assert_eq!(scenario.strict, Some(true));
        assert_eq!(scenario.timeout_secs, Some(60));
        let keys: Vec<&str> = scenario.variables.keys().map(String::as_str).collect();
        assert_eq!(keys, ["application", "stage"]);
        assert_eq!(
            scenario.steps[2].keyword_and_text().unwrap().0,
            Keyword::And
        );
    }

    #[test]
    fn test_step_with_two_keywords_rejected() {
        let err = ScenarioFile::parse(
            "name: bad\nsteps:\n  - given: an app\n    when: I deploy\n",
        )
        .unwrap_err();
        assert!(err.to_string().contains("exactly one"));
    }

    #[test]
    fn test_scenario_without_steps_rejected() {
        let err = ScenarioFile::parse("name: empty\nsteps: []\n").unwrap_err();
        assert!(err.to_string().contains("no steps"));
    }

    #[test]
    fn test_unknown_field_rejected() {
        let err = ScenarioFile::parse("name: x\nstepz: []\nsteps:\n  - given: an app\n")
            .unwrap_err();
        assert!(matches!(err, Error::Scenario(_)));
    }

    #[test]
    fn test_zero_timeout_rejected() {
        let err = ScenarioFile::parse("name: hasty\ntimeout_secs: 0\nsteps:\n  - given: an app\n")
            .unwrap_err();
        assert!(err.to_string().contains("timeout_secs"));
    }
}
