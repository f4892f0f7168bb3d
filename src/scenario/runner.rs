//! Scenario runner
//!
//! Matches each step of a scenario file against the step definitions and
//! feeds it to the driver, printing progress as it goes.

use colored::Colorize;

use super::config::ScenarioFile;
use super::driver::ScenarioDriver;
use super::report::ScenarioReport;
use super::settings::DriverSettings;
use super::steps::{match_step, StepDefinition};
use crate::process::CommandRunner;

/// How much to print while running
#[derive(Debug, Clone, Copy, Default)]
pub struct Output {
    /// Print every command and its captured output
    pub verbose: bool,
    /// Print nothing (used for JSON output)
    pub quiet: bool,
}

/// Run one scenario to completion and report the outcome
///
/// A workspace reset runs first as a "before" hook unless the scenario
/// starts with its own clean-workspace step.
pub async fn run_scenario<R: CommandRunner>(
    scenario: &ScenarioFile,
    settings: DriverSettings,
    runner: R,
    output: Output,
) -> ScenarioReport {
    let steps_total = scenario.steps.len();
    let mut driver = ScenarioDriver::new(settings, runner);
    let say = |line: String| {
        if !output.quiet {
            println!("{}", line);
        }
    };

    say(format!(
        "\n{} {}",
        "Scenario:".blue().bold(),
        scenario.name.white().bold()
    ));
    if let Some(desc) = &scenario.description {
        say(format!("  {}", desc.dimmed()));
    }

    let starts_clean = scenario
        .steps
        .first()
        .and_then(|s| s.keyword_and_text().ok())
        .and_then(|(_, text)| match_step(text).ok())
        == Some(StepDefinition::CleanWorkspace);

    if !starts_clean {
        if let Err(e) = driver.prepare_workspace().await {
            say(format!("  {} Before: {}", "✗".red(), e));
            return ScenarioReport::from_driver(&scenario.name, &driver, 0, steps_total);
        }
        say(format!("  {} {}", "✓".green(), "Before: clean workspace".dimmed()));
    }

    for (i, step) in scenario.steps.iter().enumerate() {
        let step_num = i + 1;
        let seen = driver.attempted().len();

        let outcome = match step.keyword_and_text() {
            Ok((keyword, text)) => {
                let label = format!("{} {}", keyword, text);
                match match_step(text) {
                    Ok(definition) => driver.run_step(&definition).await,
                    Err(e) => Err(driver.abort(e)),
                }
                .map(|()| label.clone())
                .map_err(|e| (label, e))
            }
            Err(e) => {
                let e = driver.abort(e);
                Err((format!("step {}", step_num), e))
            }
        };

        if output.verbose && !output.quiet {
            for command in &driver.attempted()[seen..] {
                println!("      $ {}", command.dimmed());
            }
            for result in driver.results().iter().filter(|r| !r.success()) {
                if driver.attempted()[seen..].contains(&result.command) {
                    println!(
                        "      {} {} exited with {:?}",
                        "!".yellow(),
                        result.command,
                        result.exit_code
                    );
                }
            }
        }

        match outcome {
            Ok(label) => say(format!("  {} Step {}: {}", "✓".green(), step_num, label.dimmed())),
            Err((label, e)) => {
                say(format!("  {} Step {}: {}", "✗".red(), step_num, label));
                say(format!("      {}", e.to_string().red()));
                if let Some(last) = driver.last_result() {
                    say(format!(
                        "      last command: {} (exit {:?})",
                        last.command, last.exit_code
                    ));
                }
                say(format!(
                    "\n{} {} ({})\n",
                    "✗".red().bold(),
                    "Scenario Failed".red().bold(),
                    driver.state()
                ));
                return ScenarioReport::from_driver(&scenario.name, &driver, step_num, steps_total);
            }
        }
    }

    let report = ScenarioReport::from_driver(&scenario.name, &driver, steps_total, steps_total);
    let ignored = report.failed_commands().count();
    if ignored > 0 {
        say(format!(
            "  {} {} command(s) exited non-zero",
            "!".yellow(),
            ignored
        ));
    }
    say(format!(
        "\n{} {} ({})\n",
        "✓".green().bold(),
        "Scenario Passed".green().bold(),
        report.state
    ));
    report
}
