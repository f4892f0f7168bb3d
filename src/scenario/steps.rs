//! Step definitions
//!
//! Maps step phrases onto driver transitions, the way a Gherkin runner
//! matches step text against registered patterns.

use regex::Regex;
use std::fmt;
use std::sync::OnceLock;

use crate::common::{Error, Result};

/// What a step phrase asks the driver to do
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StepDefinition {
    /// Reset the fixture workspace
    CleanWorkspace,
    /// Scaffold the app, push it, and render its deploy config
    AnApp,
    /// Run the deploy tasks
    Deploy,
    /// Check a marker file under `<deploy_to>/shared/`
    MarkerWritten(String),
}

impl fmt::Display for StepDefinition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StepDefinition::CleanWorkspace => write!(f, "a clean workspace"),
            StepDefinition::AnApp => write!(f, "an app"),
            StepDefinition::Deploy => write!(f, "I deploy"),
            StepDefinition::MarkerWritten(name) => {
                write!(f, "the {name} file should be written to shared")
            }
        }
    }
}

struct Patterns {
    clean_workspace: Regex,
    an_app: Regex,
    deploy: Regex,
    marker: Regex,
}

fn patterns() -> &'static Patterns {
    static PATTERNS: OnceLock<Patterns> = OnceLock::new();
    PATTERNS.get_or_init(|| Patterns {
        clean_workspace: Regex::new(r"^(?:a )?clean workspace$").unwrap(),
        // "a an app" is the phrase older feature files use
        an_app: Regex::new(r"^(?:a )?an? app$").unwrap(),
        deploy: Regex::new(r"^I deploy$").unwrap(),
        marker: Regex::new(r"^the ([A-Za-z0-9_.\-]+) file should be written to shared$").unwrap(),
    })
}

/// Find the step definition matching `text`
pub fn match_step(text: &str) -> Result<StepDefinition> {
    let text = text.trim();
    let p = patterns();

    if p.clean_workspace.is_match(text) {
        return Ok(StepDefinition::CleanWorkspace);
    }
    if p.an_app.is_match(text) {
        return Ok(StepDefinition::AnApp);
    }
    if p.deploy.is_match(text) {
        return Ok(StepDefinition::Deploy);
    }
    if let Some(caps) = p.marker.captures(text) {
        return Ok(StepDefinition::MarkerWritten(caps[1].to_string()));
    }

    Err(Error::UnknownStep(text.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_matches_known_phrases() {
        assert_eq!(match_step("a clean workspace").unwrap(), StepDefinition::CleanWorkspace);
        assert_eq!(match_step("an app").unwrap(), StepDefinition::AnApp);
        assert_eq!(match_step("a an app").unwrap(), StepDefinition::AnApp);
        assert_eq!(match_step("  I deploy ").unwrap(), StepDefinition::Deploy);
        assert_eq!(
            match_step("the PEOPLE_LIKE_YOU file should be written to shared").unwrap(),
            StepDefinition::MarkerWritten("PEOPLE_LIKE_YOU".to_string())
        );
    }

    #[test]
    fn test_marker_name_is_captured() {
        assert_eq!(
            match_step("the REVISION.txt file should be written to shared").unwrap(),
            StepDefinition::MarkerWritten("REVISION.txt".to_string())
        );
    }

    #[test]
    fn test_marker_name_cannot_escape_shared() {
        assert!(match_step("the ../etc/passwd file should be written to shared").is_err());
    }

    #[test]
    fn test_unknown_phrase() {
        let err = match_step("I roll back").unwrap_err();
        assert!(matches!(err, Error::UnknownStep(ref s) if s == "I roll back"));
    }

    #[test]
    fn test_display_round_trips_through_matcher() {
        for def in [
            StepDefinition::CleanWorkspace,
            StepDefinition::AnApp,
            StepDefinition::Deploy,
            StepDefinition::MarkerWritten("PEOPLE_LIKE_YOU".to_string()),
        ] {
            assert_eq!(match_step(&def.to_string()).unwrap(), def);
        }
    }
}
