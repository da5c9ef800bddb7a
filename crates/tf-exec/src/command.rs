//! Builder for executing one step process.

use std::path::PathBuf;
use std::process::{ExitStatus, Stdio};
use std::time::Duration;

use tokio::process::Command;

/// Output captured from a step execution.
///
/// Steps deliver their payload through the output file, so stdout is
/// discarded.
#[derive(Debug, Clone)]
pub struct StepOutput {
    /// Process exit status.
    pub status: ExitStatus,
    /// Captured standard error (lossy UTF-8).
    pub stderr: String,
}

/// A builder for constructing and executing a step invocation.
///
/// Unlike most process helpers there is no default timeout: a step runs
/// until it exits unless [`StepCommand::timeout`] is called.
///
/// # Example
///
/// ```no_run
/// use tf_exec::StepCommand;
/// use std::path::PathBuf;
///
/// # async fn example() -> tf_core::Result<()> {
/// let output = StepCommand::new("data-cleaning", PathBuf::from("/usr/local/bin/data-cleaning"))
///     .arg("/tmp/run/input.txt")
///     .arg("/tmp/run/output_0.txt")
///     .execute()
///     .await?;
/// assert!(output.status.success());
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct StepCommand {
    label: String,
    program: PathBuf,
    args: Vec<String>,
    timeout: Option<Duration>,
}

impl StepCommand {
    /// Create a new command. `label` names the step in errors and logs.
    pub fn new(label: impl Into<String>, program: PathBuf) -> Self {
        Self {
            label: label.into(),
            program,
            args: Vec::new(),
            timeout: None,
        }
    }

    /// Append a single argument.
    pub fn arg(&mut self, s: impl Into<String>) -> &mut Self {
        self.args.push(s.into());
        self
    }

    /// Append multiple arguments.
    pub fn args(&mut self, iter: impl IntoIterator<Item = impl Into<String>>) -> &mut Self {
        self.args.extend(iter.into_iter().map(Into::into));
        self
    }

    /// Set the maximum execution time.
    pub fn timeout(&mut self, d: Duration) -> &mut Self {
        self.timeout = Some(d);
        self
    }

    /// The program that will be spawned.
    pub fn program(&self) -> &PathBuf {
        &self.program
    }

    /// Arguments passed to the program, in order.
    pub fn arguments(&self) -> &[String] {
        &self.args
    }

    /// Render the command line for logging.
    pub fn display(&self) -> String {
        let mut parts = vec![self.program.display().to_string()];
        parts.extend(self.args.iter().cloned());
        parts.join(" ")
    }

    /// Execute the command, capturing stderr.
    ///
    /// # Errors
    ///
    /// Returns [`tf_core::Error::Step`] when the process cannot be spawned,
    /// exits with a non-zero status (message is the trimmed stderr, or the
    /// exit status when stderr is empty), or exceeds the configured timeout.
    pub async fn execute(&self) -> tf_core::Result<StepOutput> {
        let mut cmd = Command::new(&self.program);
        cmd.args(&self.args)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .kill_on_drop(true);

        let child = cmd.spawn().map_err(|e| {
            tf_core::Error::step(
                &self.label,
                format!("failed to spawn {}: {e}", self.program.display()),
            )
        })?;

        let output = match self.timeout {
            Some(limit) => match tokio::time::timeout(limit, child.wait_with_output()).await {
                Ok(result) => result,
                Err(_elapsed) => {
                    // Dropping the future drops the child, which kills it.
                    return Err(tf_core::Error::step(
                        &self.label,
                        format!("timed out after {limit:?}"),
                    ));
                }
            },
            None => child.wait_with_output().await,
        }
        .map_err(|e| {
            tf_core::Error::step(&self.label, format!("I/O error waiting for process: {e}"))
        })?;

        let step_output = StepOutput {
            status: output.status,
            stderr: String::from_utf8_lossy(&output.stderr).to_string(),
        };

        if !output.status.success() {
            let stderr = step_output.stderr.trim();
            let message = match (stderr.is_empty(), output.status.code()) {
                (false, _) => stderr.to_string(),
                (true, Some(code)) => format!("exited with status {code}"),
                (true, None) => format!("terminated abnormally ({})", output.status),
            };
            return Err(tf_core::Error::step(&self.label, message));
        }

        Ok(step_output)
    }
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;

    #[tokio::test]
    async fn execute_echo() {
        let output = StepCommand::new("echo", PathBuf::from("echo"))
            .arg("hello")
            .execute()
            .await
            .unwrap();
        assert!(output.status.success());
        assert!(output.stderr.is_empty());
    }

    #[tokio::test]
    async fn chatty_stdout_is_discarded() {
        let output = StepCommand::new("chatty", PathBuf::from("sh"))
            .args(["-c", "yes progress | head -n 100000; echo warning >&2"])
            .execute()
            .await
            .unwrap();
        assert!(output.status.success());
        assert_eq!(output.stderr.trim(), "warning");
    }

    #[tokio::test]
    async fn nonexistent_program_is_step_error() {
        let err = StepCommand::new("ghost", PathBuf::from("nonexistent_step_xyz_12345"))
            .execute()
            .await
            .unwrap_err();
        assert!(matches!(err, tf_core::Error::Step { ref step, .. } if step == "ghost"));
        assert!(err.to_string().contains("failed to spawn"));
    }

    #[tokio::test]
    async fn nonzero_exit_surfaces_stderr() {
        let err = StepCommand::new("failing", PathBuf::from("sh"))
            .args(["-c", "echo 'bad input' >&2; exit 3"])
            .execute()
            .await
            .unwrap_err();
        match err {
            tf_core::Error::Step { step, message } => {
                assert_eq!(step, "failing");
                assert_eq!(message, "bad input");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[tokio::test]
    async fn nonzero_exit_without_stderr_reports_status() {
        let err = StepCommand::new("quiet", PathBuf::from("sh"))
            .args(["-c", "exit 2"])
            .execute()
            .await
            .unwrap_err();
        assert!(err.to_string().contains("exited with status 2"), "got: {err}");
    }

    #[tokio::test]
    async fn timeout_fires() {
        let err = StepCommand::new("sleepy", PathBuf::from("sleep"))
            .arg("10")
            .timeout(Duration::from_millis(100))
            .execute()
            .await
            .unwrap_err();
        assert!(err.to_string().contains("timed out"), "got: {err}");
    }

    #[test]
    fn display_joins_program_and_args() {
        let mut cmd = StepCommand::new("x", PathBuf::from("/bin/step"));
        cmd.args(["in.txt", "out.txt"]);
        assert_eq!(cmd.display(), "/bin/step in.txt out.txt");
        assert_eq!(cmd.arguments().len(), 2);
    }
}
