//! Scenario driver state machine
//!
//! Each transition checks the current state, does its work, and either
//! advances or moves the scenario to `Failed`. Once failed, every further
//! transition is refused and the first failure is kept.

use serde::Serialize;
use std::path::Path;

use super::settings::{DriverSettings, TemplateSource};
use super::steps::StepDefinition;
use super::ScenarioState;
use crate::common::{Error, Result};
use crate::fixture::{self, Workspace};
use crate::process::{CommandResult, CommandRunner, CommandSpec};
use crate::template::{self, DeployVariables, TemplateContext};

/// First error that failed the scenario
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Failure {
    pub code: &'static str,
    pub message: String,
}

impl From<&Error> for Failure {
    fn from(e: &Error) -> Self {
        Self {
            code: e.code(),
            message: e.to_string(),
        }
    }
}

/// Version-control command with a commit identity that works on bare hosts
fn vcs_command(program: &str, dir: &Path, user: &str) -> CommandSpec {
    let email = format!("{user}@localhost");
    CommandSpec::new(program, dir)
        .env("GIT_AUTHOR_NAME", user)
        .env("GIT_AUTHOR_EMAIL", &email)
        .env("GIT_COMMITTER_NAME", user)
        .env("GIT_COMMITTER_EMAIL", email)
}

/// Drives one scenario through its lifecycle
pub struct ScenarioDriver<R> {
    settings: DriverSettings,
    runner: R,
    state: ScenarioState,
    workspace: Option<Workspace>,
    context: Option<TemplateContext>,
    results: Vec<CommandResult>,
    attempted: Vec<String>,
    failure: Option<Failure>,
    user: Option<String>,
}

impl<R: CommandRunner> ScenarioDriver<R> {
    pub fn new(settings: DriverSettings, runner: R) -> Self {
        let user = settings.current_user.clone();
        Self {
            settings,
            runner,
            state: ScenarioState::Init,
            workspace: None,
            context: None,
            results: Vec::new(),
            attempted: Vec::new(),
            failure: None,
            user,
        }
    }

    pub fn state(&self) -> ScenarioState {
        self.state
    }

    pub fn workspace(&self) -> Option<&Workspace> {
        self.workspace.as_ref()
    }

    /// Template context used to render the deploy config, once rendered
    pub fn context(&self) -> Option<&TemplateContext> {
        self.context.as_ref()
    }

    /// Every command that ran to completion, in order
    pub fn results(&self) -> &[CommandResult] {
        &self.results
    }

    pub fn last_result(&self) -> Option<&CommandResult> {
        self.results.last()
    }

    /// Every command line the driver tried to run, including ones that crashed
    pub fn attempted(&self) -> &[String] {
        &self.attempted
    }

    pub fn failure(&self) -> Option<&Failure> {
        self.failure.as_ref()
    }

    /// Fail the scenario with `err` and hand it back for propagation
    pub fn abort(&mut self, err: Error) -> Error {
        if self.failure.is_none() {
            if err.is_fatal() {
                tracing::error!(state = %self.state, error = %err, "Scenario failed");
            } else {
                tracing::warn!(state = %self.state, error = %err, "Non-zero exit in strict mode");
            }
            self.failure = Some(Failure::from(&err));
        }
        self.state = ScenarioState::Failed;
        err
    }

    fn begin(&mut self, allowed: &[ScenarioState], action: &str) -> Result<()> {
        if allowed.contains(&self.state) {
            return Ok(());
        }
        if self.state.is_terminal() {
            tracing::debug!(state = %self.state, action, "Scenario already finished");
        }
        let err = Error::invalid_state(action, &self.state.to_string());
        Err(self.abort(err))
    }

    fn settle<T>(&mut self, outcome: Result<T>, next: ScenarioState) -> Result<T> {
        match outcome {
            Ok(value) => {
                tracing::debug!(from = %self.state, to = %next, "Scenario transition");
                self.state = next;
                Ok(value)
            }
            Err(e) => Err(self.abort(e)),
        }
    }

    fn prepared_workspace(&self) -> Result<Workspace> {
        self.workspace
            .clone()
            .ok_or_else(|| Error::Scenario("Workspace has not been prepared".to_string()))
    }

    fn current_user(&mut self) -> Result<String> {
        if let Some(user) = &self.user {
            return Ok(user.clone());
        }
        let user = fixture::current_user()?;
        self.user = Some(user.clone());
        Ok(user)
    }

    async fn execute(&mut self, spec: CommandSpec) -> Result<CommandResult> {
        self.attempted.push(spec.command_line());
        let result = self.runner.run(&spec).await?;
        self.results.push(result.clone());
        if self.settings.strict {
            result.check()
        } else {
            Ok(result)
        }
    }

    /// `Init -> WorkspacePrepared`
    ///
    /// Resetting an already prepared workspace is allowed, so an explicit
    /// clean-workspace step can follow the implicit one.
    pub async fn prepare_workspace(&mut self) -> Result<()> {
        self.begin(
            &[ScenarioState::Init, ScenarioState::WorkspacePrepared],
            "prepare the workspace",
        )?;
        let outcome = fixture::reset(&self.settings.base_dir);
        let workspace = self.settle(outcome, ScenarioState::WorkspacePrepared)?;
        self.workspace = Some(workspace);
        Ok(())
    }

    /// `WorkspacePrepared -> AppScaffolded`
    pub async fn scaffold_app(&mut self) -> Result<()> {
        self.begin(&[ScenarioState::WorkspacePrepared], "scaffold the app")?;
        let outcome = self.run_scaffold().await;
        self.settle(outcome, ScenarioState::AppScaffolded)
    }

    async fn run_scaffold(&mut self) -> Result<()> {
        let ws = self.prepared_workspace()?;
        let user = self.current_user()?;
        let settings = self.settings.clone();
        let app = ws.app_path.as_path();
        let vcs = |dir: &Path| vcs_command(&settings.tools.vcs, dir, &user);

        self.execute(vcs(ws.repo_path.as_path()).args(["--bare", "init"]))
            .await?;

        let head = format!("refs/heads/{}", settings.branch);
        self.execute(vcs(app).arg("init")).await?;
        self.execute(vcs(app).args(["symbolic-ref", "HEAD", head.as_str()]))
            .await?;

        let config_dir = app.join("config");
        std::fs::create_dir_all(&config_dir).map_err(|e| Error::workspace_io(&config_dir, e))?;

        let repo_url = ws.repo_url();
        let steps = [
            CommandSpec::new(&settings.tools.scaffold, app).arg("."),
            vcs(app).args(["add", "."]),
            vcs(app).args(["commit", "-m", settings.commit_message.as_str()]),
            vcs(app).args(["remote", "add", settings.remote.as_str(), repo_url.as_str()]),
            vcs(app).args(["push", settings.remote.as_str(), settings.branch.as_str()]),
        ];
        for spec in steps {
            self.execute(spec).await?;
        }

        Ok(())
    }

    /// `AppScaffolded -> ConfigRendered`
    pub async fn render_config(&mut self) -> Result<()> {
        self.begin(&[ScenarioState::AppScaffolded], "render the deploy config")?;
        let outcome = self.run_render();
        self.settle(outcome, ScenarioState::ConfigRendered)
    }

    fn run_render(&mut self) -> Result<()> {
        let ws = self.prepared_workspace()?;
        let executable = fixture::resolve_executable(&self.settings.tools.vcs)?;
        let user = self.current_user()?;

        let vars =
            DeployVariables::for_workspace(&ws, &executable, &user, &self.settings.branch)?;
        let context = TemplateContext::with_extra(vars, self.settings.variables.clone());

        let template_text = match &self.settings.template {
            TemplateSource::Builtin => template::DEFAULT_DEPLOY_TEMPLATE.to_string(),
            TemplateSource::File(path) => {
                std::fs::read_to_string(path).map_err(|e| Error::file_read(path, e))?
            }
        };

        let rendered = template::render(&template_text, &context)?;
        let output = ws.deploy_config_path();
        template::write_rendered(&output, &rendered)?;
        tracing::info!(path = %output.display(), "Deploy config rendered");

        self.context = Some(context);
        Ok(())
    }

    /// `ConfigRendered -> Deployed`
    pub async fn deploy(&mut self) -> Result<()> {
        self.begin(&[ScenarioState::ConfigRendered], "deploy")?;
        let outcome = self.run_deploy().await;
        self.settle(outcome, ScenarioState::Deployed)
    }

    async fn run_deploy(&mut self) -> Result<()> {
        let ws = self.prepared_workspace()?;
        let tools = self.settings.tools.clone();
        for task in &tools.deploy_tasks {
            let spec = CommandSpec::new(&tools.deploy, &ws.app_path).args(task.split_whitespace());
            self.execute(spec).await?;
        }
        Ok(())
    }

    /// `Deployed -> Verified`, or `Failed` if the marker is missing
    ///
    /// Further checks may follow once `Verified`.
    pub async fn verify_marker(&mut self, name: &str) -> Result<()> {
        self.begin(
            &[ScenarioState::Deployed, ScenarioState::Verified],
            "verify the marker file",
        )?;
        let outcome = self.prepared_workspace().and_then(|ws| {
            let marker = ws.marker_path(name);
            if marker.exists() {
                tracing::info!(path = %marker.display(), "Marker file present");
                Ok(())
            } else {
                Err(Error::Assertion(format!(
                    "expected marker file '{}' to exist",
                    marker.display()
                )))
            }
        });
        self.settle(outcome, ScenarioState::Verified)
    }

    /// Run the transitions a step phrase stands for
    pub async fn run_step(&mut self, step: &StepDefinition) -> Result<()> {
        match step {
            StepDefinition::CleanWorkspace => self.prepare_workspace().await,
            StepDefinition::AnApp => {
                self.scaffold_app().await?;
                self.render_config().await
            }
            StepDefinition::Deploy => self.deploy().await,
            StepDefinition::MarkerWritten(name) => self.verify_marker(name).await,
        }
    }
}
