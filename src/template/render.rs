//! Placeholder parsing and substitution

use std::path::Path;

use super::{TemplateContext, TemplateError};
use crate::common::{Error, Result};

const OPEN: &str = "{{";
const CLOSE: &str = "}}";

enum Segment<'a> {
    Text(&'a str),
    Var { name: &'a str, line: usize },
}

fn line_of(text: &str, offset: usize) -> usize {
    text[..offset].matches('\n').count() + 1
}

fn is_valid_name(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

fn parse(text: &str) -> std::result::Result<Vec<Segment<'_>>, TemplateError> {
    let mut segments = Vec::new();
    let mut rest = text;
    let mut offset = 0;

    while let Some(start) = rest.find(OPEN) {
        if start > 0 {
            segments.push(Segment::Text(&rest[..start]));
        }
        let line = line_of(text, offset + start);
        let after_open = &rest[start + OPEN.len()..];
        let end = after_open.find(CLOSE).ok_or_else(|| TemplateError::Malformed {
            line,
            reason: "unterminated placeholder".to_string(),
        })?;

        let raw = &after_open[..end];
        let name = raw.trim();
        if !is_valid_name(name) {
            return Err(TemplateError::Malformed {
                line,
                reason: format!("invalid variable name '{}'", raw),
            });
        }
        segments.push(Segment::Var { name, line });

        let consumed = start + OPEN.len() + end + CLOSE.len();
        rest = &rest[consumed..];
        offset += consumed;
    }

    if !rest.is_empty() {
        segments.push(Segment::Text(rest));
    }
    Ok(segments)
}

/// Distinct variable names referenced by a template, in order of first use
pub fn referenced_variables(template: &str) -> std::result::Result<Vec<String>, TemplateError> {
    let mut names: Vec<String> = Vec::new();
    for segment in parse(template)? {
        if let Segment::Var { name, .. } = segment {
            if !names.iter().any(|n| n == name) {
                names.push(name.to_string());
            }
        }
    }
    Ok(names)
}

/// Substitute every placeholder in `template` from `context`
///
/// Fails if any referenced variable is missing; all missing names are
/// reported together.
pub fn render(
    template: &str,
    context: &TemplateContext,
) -> std::result::Result<String, TemplateError> {
    let segments = parse(template)?;

    let mut missing: Vec<String> = Vec::new();
    let mut first_missing_line = None;
    let mut output = String::with_capacity(template.len());

    for segment in &segments {
        match segment {
            Segment::Text(text) => output.push_str(text),
            Segment::Var { name, line } => match context.get(name) {
                Some(value) => output.push_str(value),
                None => {
                    first_missing_line.get_or_insert(*line);
                    if !missing.iter().any(|n| n == name) {
                        missing.push(name.to_string());
                    }
                }
            },
        }
    }

    match first_missing_line {
        Some(line) => Err(TemplateError::Unresolved {
            names: missing,
            line,
        }),
        None => Ok(output),
    }
}

/// Render the template at `template_path` into `output_path`
///
/// Creates the output's parent directory if needed.
pub fn render_file(
    template_path: &Path,
    context: &TemplateContext,
    output_path: &Path,
) -> Result<()> {
    let template = std::fs::read_to_string(template_path)
        .map_err(|e| Error::file_read(template_path, e))?;
    let rendered = render(&template, context)?;
    write_rendered(output_path, &rendered)
}

pub(crate) fn write_rendered(output_path: &Path, rendered: &str) -> Result<()> {
    if let Some(parent) = output_path.parent() {
        std::fs::create_dir_all(parent).map_err(|e| Error::workspace_io(parent, e))?;
    }
    std::fs::write(output_path, rendered).map_err(|e| Error::workspace_io(output_path, e))?;
    tracing::debug!(path = %output_path.display(), bytes = rendered.len(), "Rendered template");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::template::{DeployVariables, DEFAULT_DEPLOY_TEMPLATE};

    fn context(pairs: &[(&str, &str)]) -> TemplateContext {
        pairs.iter().copied().collect()
    }

    #[test]
    fn test_substitutes_deploy_to() {
        let ctx = context(&[("deploy_to", "/tmp/t1/deployed")]);
        let out = render("set :deploy_to, \"{{deploy_to}}\"\n", &ctx).unwrap();
        assert_eq!(out, "set :deploy_to, \"/tmp/t1/deployed\"\n");
        assert!(out.contains("/tmp/t1/deployed"));
        assert!(!out.contains("{{"));
    }

    #[test]
    fn test_whitespace_inside_braces() {
        let ctx = context(&[("current_user", "deployer")]);
        assert_eq!(
            render("user: {{ current_user }}", &ctx).unwrap(),
            "user: deployer"
        );
    }

    #[test]
    fn test_missing_variable_is_error_not_blank() {
        let ctx = context(&[("repository", "/tmp/t1/repo")]);
        let err = render("repo {{repository}}\nto {{deploy_to}}\n{{ current_user }}", &ctx)
            .unwrap_err();
        assert_eq!(
            err,
            TemplateError::Unresolved {
                names: vec!["deploy_to".to_string(), "current_user".to_string()],
                line: 2,
            }
        );
    }

    #[test]
    fn test_every_missing_subset_fails() {
        let template = DEFAULT_DEPLOY_TEMPLATE;
        let full = DeployVariables::NAMES;
        for skip in 0..full.len() {
            let ctx: TemplateContext = full
                .iter()
                .enumerate()
                .filter(|(i, _)| *i != skip)
                .map(|(_, name)| (*name, "/some/value"))
                .collect();
            let err = render(template, &ctx).unwrap_err();
            match err {
                TemplateError::Unresolved { names, .. } => {
                    assert_eq!(names, vec![full[skip].to_string()]);
                }
                other => panic!("Expected Unresolved, got {other:?}"),
            }
        }
    }

    #[test]
    fn test_rendering_is_idempotent() {
        let vars = DeployVariables::new(
            "/tmp/t1/deployed",
            "/tmp/t1/repo",
            "/usr/bin/git",
            "deployer",
            "master",
        )
        .unwrap();
        let ctx = TemplateContext::from(vars);
        let once = render(DEFAULT_DEPLOY_TEMPLATE, &ctx).unwrap();
        assert!(!once.contains("{{"));
        assert_eq!(render(&once, &TemplateContext::default()).unwrap(), once);
    }

    #[test]
    fn test_values_are_not_rescanned() {
        let ctx = context(&[("a", "{{b}}")]);
        assert_eq!(render("x{{a}}y", &ctx).unwrap(), "x{{b}}y");
    }

    #[test]
    fn test_unterminated_placeholder() {
        let err = render("ok\nset :x, {{deploy_to", &TemplateContext::default()).unwrap_err();
        assert!(matches!(err, TemplateError::Malformed { line: 2, .. }));
    }

    #[test]
    fn test_invalid_name() {
        let err = render("{{ 9lives }}", &TemplateContext::default()).unwrap_err();
        assert!(matches!(err, TemplateError::Malformed { line: 1, .. }));

        let err = render("{{}}", &TemplateContext::default()).unwrap_err();
        assert!(matches!(err, TemplateError::Malformed { .. }));
    }

    #[test]
    fn test_referenced_variables_in_order() {
        let names = referenced_variables(DEFAULT_DEPLOY_TEMPLATE).unwrap();
        for required in DeployVariables::NAMES {
            assert!(names.contains(&required.to_string()), "missing {required}");
        }
        assert_eq!(
            referenced_variables("{{b}} {{a}} {{ b }}").unwrap(),
            vec!["b", "a"]
        );
    }

    #[test]
    fn test_render_file_creates_config_dir() {
        let dir = tempfile::tempdir().unwrap();
        let template = dir.path().join("deploy.rb.tmpl");
        std::fs::write(&template, "set :deploy_to, \"{{deploy_to}}\"\n").unwrap();
        let output = dir.path().join("app").join("config").join("deploy.rb");

        let ctx = context(&[("deploy_to", "/tmp/t1/deployed")]);
        render_file(&template, &ctx, &output).unwrap();

        let written = std::fs::read_to_string(&output).unwrap();
        assert_eq!(written, "set :deploy_to, \"/tmp/t1/deployed\"\n");
    }

    #[test]
    fn test_render_file_missing_template() {
        let dir = tempfile::tempdir().unwrap();
        let err = render_file(
            &dir.path().join("nope.tmpl"),
            &TemplateContext::default(),
            &dir.path().join("out"),
        )
        .unwrap_err();
        assert!(matches!(err, Error::FileRead { .. }));
    }
}
