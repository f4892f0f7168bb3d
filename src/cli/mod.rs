//! CLI command handling
//!
//! Dispatches CLI commands to the harness components and formats output.

use colored::Colorize;
use std::path::{Path, PathBuf};

use crate::commands::Commands;
use crate::common::config::Config;
use crate::common::paths::{self, resolve_against};
use crate::common::{Error, Result};
use crate::fixture;
use crate::process::ProcessRunner;
use crate::scenario::{
    run_scenario, DriverSettings, Output, Overrides, ScenarioFile, ScenarioReport,
};
use crate::template::{self, TemplateContext, DEFAULT_DEPLOY_TEMPLATE};

/// Dispatch a CLI command
pub async fn dispatch(command: Commands, verbose: bool) -> Result<()> {
    let config = Config::load()?;
    let invocation_dir = std::env::current_dir()?;

    match command {
        Commands::Run {
            scenarios,
            base_dir,
            strict,
            timeout,
            json,
        } => {
            let overrides = Overrides {
                base_dir,
                strict,
                timeout_secs: timeout,
            };
            let output = Output {
                verbose,
                quiet: json,
            };
            let reports =
                run_scenarios(&config, &scenarios, &overrides, &invocation_dir, output).await?;

            if json {
                println!("{}", serde_json::to_string_pretty(&reports)?);
            } else {
                print_summary(&reports);
            }

            let failed = reports.iter().filter(|r| !r.passed).count();
            if failed > 0 {
                return Err(Error::Scenario(format!(
                    "{} of {} scenario(s) failed",
                    failed,
                    reports.len()
                )));
            }
            Ok(())
        }

        Commands::Render {
            template,
            vars,
            output,
            check,
        } => {
            let text = match &template {
                Some(path) => {
                    std::fs::read_to_string(path).map_err(|e| Error::file_read(path, e))?
                }
                None => DEFAULT_DEPLOY_TEMPLATE.to_string(),
            };

            if check {
                for name in template::referenced_variables(&text)? {
                    println!("{}", name);
                }
                return Ok(());
            }

            let context = parse_vars(&vars)?;
            let rendered = template::render(&text, &context)?;
            match output {
                Some(path) => {
                    template::write_rendered(&path, &rendered)?;
                    println!("Rendered {}", path.display());
                }
                None => print!("{}", rendered),
            }
            Ok(())
        }

        Commands::Reset { base_dir } => {
            let base = base_dir.unwrap_or_else(|| config.defaults.base_dir.clone());
            let ws = fixture::reset(&resolve_against(&invocation_dir, &base))?;
            println!("Workspace reset:");
            println!("  root:     {}", ws.root_path.display());
            println!("  app:      {}", ws.app_path.display());
            println!("  repo:     {}", ws.repo_path.display());
            println!("  deployed: {}", ws.deployed_path.display());
            Ok(())
        }

        Commands::Config => {
            match paths::config_path() {
                Some(path) if path.exists() => println!("# {}", path.display()),
                Some(path) => println!("# {} (not found, using defaults)", path.display()),
                None => println!("# no config directory available, using defaults"),
            }
            print!("{}", config.to_toml()?);
            Ok(())
        }
    }
}

async fn run_scenarios(
    config: &Config,
    paths: &[PathBuf],
    overrides: &Overrides,
    invocation_dir: &Path,
    output: Output,
) -> Result<Vec<ScenarioReport>> {
    let mut loaded = Vec::new();
    if paths.is_empty() {
        loaded.push((ScenarioFile::builtin()?, invocation_dir.to_path_buf()));
    } else {
        for path in paths {
            let path = resolve_against(invocation_dir, path);
            let scenario = ScenarioFile::load(&path)?;
            let dir = path
                .parent()
                .map(Path::to_path_buf)
                .unwrap_or_else(|| invocation_dir.to_path_buf());
            loaded.push((scenario, dir));
        }
    }

    let mut reports = Vec::with_capacity(loaded.len());
    for (scenario, scenario_dir) in &loaded {
        let settings =
            DriverSettings::resolve(config, scenario, scenario_dir, overrides, invocation_dir);
        tracing::info!(
            scenario = %scenario.name,
            base_dir = %settings.base_dir.display(),
            strict = settings.strict,
            "Running scenario"
        );
        let runner = ProcessRunner::new(settings.command_timeout);
        reports.push(run_scenario(scenario, settings, runner, output).await);
    }
    Ok(reports)
}

/// Parse `KEY=VALUE` assignments into a context, keeping their order
fn parse_vars(vars: &[String]) -> Result<TemplateContext> {
    vars.iter()
        .map(|assignment| {
            assignment
                .split_once('=')
                .map(|(k, v)| (k.trim().to_string(), v.to_string()))
                .filter(|(k, _)| !k.is_empty())
                .ok_or_else(|| {
                    Error::Config(format!(
                        "Invalid variable '{}', expected KEY=VALUE",
                        assignment
                    ))
                })
        })
        .collect()
}

fn print_summary(reports: &[ScenarioReport]) {
    let passed = reports.iter().filter(|r| r.passed).count();
    let failed = reports.len() - passed;

    let summary = format!("{} scenario(s): {} passed, {} failed", reports.len(), passed, failed);
    if failed == 0 {
        println!("{}", summary.green().bold());
    } else {
        println!("{}", summary.red().bold());
        for report in reports.iter().filter(|r| !r.passed) {
            let detail = report
                .error
                .as_ref()
                .map(|e| e.message.clone())
                .unwrap_or_default();
            println!("  {} {} [{}]: {}", "✗".red(), report.name, report.state, detail);
        }
    }
}
