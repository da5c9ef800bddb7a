//! Resolution of step names to runnable invocations.
//!
//! The [`StepLauncher`] discovers where each registered step lives once, at
//! construction, and then builds a [`StepCommand`] honouring the step
//! contract: `<program> <input> <output> [extra args...]`.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Serialize;
use tf_core::config::{LaunchMode, StepsConfig};
use tf_core::StepRegistry;

use crate::command::StepCommand;

/// Mount point of the input payload inside a step container.
const CONTAINER_INPUT: &str = "/app/input.txt";
/// Mount point of the output slot inside a step container.
const CONTAINER_OUTPUT: &str = "/app/output.txt";

/// Availability information for a step, returned by [`StepLauncher::check_all`].
#[derive(Debug, Clone, Serialize)]
pub struct StepInfo {
    /// Step name.
    pub name: String,
    /// Whether the step can currently be launched.
    pub available: bool,
    /// Executable path (process mode) or image reference (docker mode).
    pub location: Option<String>,
}

/// Builds step invocations according to the configured [`LaunchMode`].
#[derive(Debug, Clone)]
pub struct StepLauncher {
    mode: LaunchMode,
    image_prefix: String,
    executables: HashMap<String, PathBuf>,
    timeout: Option<Duration>,
}

impl StepLauncher {
    /// Discover step executables for every entry in `registry`.
    ///
    /// In process mode each step is looked up, in order, as a configured
    /// override, inside `bin_dir`, next to the running executable, and on
    /// `PATH`. Steps that are not found are omitted; launching them yields a
    /// step error.
    pub fn discover(config: &StepsConfig, registry: &StepRegistry) -> Self {
        let mut executables = HashMap::new();

        if config.launcher == LaunchMode::Process {
            let exe_dir = std::env::current_exe()
                .ok()
                .and_then(|p| p.parent().map(Path::to_path_buf));

            for name in registry.names() {
                let resolved = config
                    .overrides
                    .get(name)
                    .filter(|p| p.exists())
                    .cloned()
                    .or_else(|| existing(config.bin_dir.as_deref(), name))
                    .or_else(|| existing(exe_dir.as_deref(), name))
                    .or_else(|| which::which(name).ok());

                match resolved {
                    Some(path) => {
                        tracing::debug!("Step {name} resolved to {}", path.display());
                        executables.insert(name.to_string(), path);
                    }
                    None => tracing::debug!("Step {name} has no executable"),
                }
            }
        }

        Self {
            mode: config.launcher,
            image_prefix: config.image_prefix.clone(),
            executables,
            timeout: None,
        }
    }

    /// Apply a wall-clock limit to every command this launcher builds.
    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }

    /// The launch mode in effect.
    pub fn mode(&self) -> LaunchMode {
        self.mode
    }

    /// Docker image reference for a step.
    pub fn image(&self, step: &str) -> String {
        format!("{}/{}", self.image_prefix, step)
    }

    /// Resolved executable for a step (process mode only).
    pub fn executable(&self, step: &str) -> Option<&Path> {
        self.executables.get(step).map(PathBuf::as_path)
    }

    /// Build the invocation for `step` reading `input` and writing `output`.
    ///
    /// # Errors
    ///
    /// Returns [`tf_core::Error::Step`] in process mode when no executable
    /// was found for the step.
    pub fn command(
        &self,
        step: &str,
        input: &Path,
        output: &Path,
        extra_args: &[String],
    ) -> tf_core::Result<StepCommand> {
        let mut cmd = match self.mode {
            LaunchMode::Process => {
                let program = self.executable(step).ok_or_else(|| {
                    tf_core::Error::step(step, "no executable found for step")
                })?;
                let mut cmd = StepCommand::new(step, program.to_path_buf());
                cmd.arg(input.to_string_lossy())
                    .arg(output.to_string_lossy());
                cmd
            }
            LaunchMode::Docker => {
                let mut cmd = StepCommand::new(step, PathBuf::from("docker"));
                cmd.args(["run", "--rm", "-v"])
                    .arg(format!("{}:{CONTAINER_INPUT}", input.display()))
                    .arg("-v")
                    .arg(format!("{}:{CONTAINER_OUTPUT}", output.display()))
                    .arg(self.image(step))
                    .args([CONTAINER_INPUT, CONTAINER_OUTPUT]);
                cmd
            }
        };

        cmd.args(extra_args.iter().cloned());
        if let Some(limit) = self.timeout {
            cmd.timeout(limit);
        }
        Ok(cmd)
    }

    /// Report how every registered step resolves.
    pub fn check_all(&self, registry: &StepRegistry) -> Vec<StepInfo> {
        let docker = match self.mode {
            LaunchMode::Docker => which::which("docker").is_ok(),
            LaunchMode::Process => false,
        };

        registry
            .names()
            .map(|name| match self.mode {
                LaunchMode::Process => StepInfo {
                    name: name.to_string(),
                    available: self.executables.contains_key(name),
                    location: self
                        .executable(name)
                        .map(|p| p.display().to_string()),
                },
                LaunchMode::Docker => StepInfo {
                    name: name.to_string(),
                    available: docker,
                    location: Some(self.image(name)),
                },
            })
            .collect()
    }
}

fn existing(dir: Option<&Path>, name: &str) -> Option<PathBuf> {
    let candidate = dir?.join(name);
    candidate.is_file().then_some(candidate)
}
