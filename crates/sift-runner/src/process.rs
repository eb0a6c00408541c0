//! Shell-based test-process execution.

use async_trait::async_trait;
use sift_core::environment::Environment;
use sift_core::ports::{ProcessOutput, TestProcess};
use sift_core::target::TestTarget;
use sift_core::{Error, Result};
use std::process::Stdio;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::process::Command;
use tracing::{debug, info};

/// Configuration for shell execution.
#[derive(Debug, Clone)]
pub struct ProcessConfig {
    pub shell: String,
    /// Command line applied when a target carries no explicit command;
    /// `{target}` expands to the target id.
    pub command_template: String,
}

impl Default for ProcessConfig {
    fn default() -> Self {
        Self {
            shell: "sh".to_string(),
            command_template: "{target}".to_string(),
        }
    }
}

/// Runs test targets as shell commands on the host, exporting the assigned
/// environment's descriptor fields to the child process.
pub struct ShellProcess {
    config: ProcessConfig,
}

impl ShellProcess {
    pub fn new(config: ProcessConfig) -> Self {
        Self { config }
    }

    fn command_for(&self, target: &TestTarget) -> String {
        target.command.clone().unwrap_or_else(|| {
            self.config
                .command_template
                .replace("{target}", target.id.as_str())
        })
    }
}

impl Default for ShellProcess {
    fn default() -> Self {
        Self::new(ProcessConfig::default())
    }
}

#[async_trait]
impl TestProcess for ShellProcess {
    async fn run(&self, target: &TestTarget, environment: &Environment) -> Result<ProcessOutput> {
        let command = self.command_for(target);

        info!(target = %target.id, environment = %environment.id, command = %command, "Spawning test process");

        let mut child = Command::new(&self.config.shell)
            .arg("-c")
            .arg(&command)
            .env("SIFT_TARGET", target.id.as_str())
            .env("SIFT_ENVIRONMENT", environment.id.as_str())
            .env("SIFT_HARDWARE_CLASS", &environment.hardware_class)
            .env("SIFT_ACCELERATOR_TYPE", &environment.accelerator_type)
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            // The executor cancels this future on timeout; the child must
            // not outlive it.
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| Error::ProcessSpawn(format!("{command}: {e}")))?;

        let stdout_pipe = child.stdout.take().ok_or_else(|| {
            Error::Internal("Child process has no stdout handle".to_string())
        })?;
        let stderr_pipe = child.stderr.take().ok_or_else(|| {
            Error::Internal("Child process has no stderr handle".to_string())
        })?;

        let stdout_task = tokio::spawn(capture_lines(stdout_pipe, "stdout"));
        let stderr_task = tokio::spawn(capture_lines(stderr_pipe, "stderr"));

        let status = child
            .wait()
            .await
            .map_err(|e| Error::Internal(format!("Failed to wait for process: {e}")))?;

        let stdout = stdout_task
            .await
            .map_err(|e| Error::Internal(format!("Output capture failed: {e}")))?;
        let stderr = stderr_task
            .await
            .map_err(|e| Error::Internal(format!("Output capture failed: {e}")))?;

        let exit_code = status.code().unwrap_or(-1);
        debug!(target = %target.id, exit_code, "Test process completed");

        Ok(ProcessOutput {
            exit_code,
            stdout,
            stderr,
        })
    }
}

async fn capture_lines<R>(pipe: R, stream: &'static str) -> String
where
    R: tokio::io::AsyncRead + Unpin,
{
    let mut lines = BufReader::new(pipe).lines();
    let mut captured = String::new();
    while let Ok(Some(line)) = lines.next_line().await {
        debug!(stream, "{line}");
        captured.push_str(&line);
        captured.push('\n');
    }
    captured
}

#[cfg(test)]
mod tests {
    use super::*;
    use sift_core::ids::{EnvId, TargetId};
    use sift_core::target::Scope;

    fn make_target(command: &str) -> TestTarget {
        TestTarget {
            id: TargetId::new("tests/ops/test_chunk.py"),
            scope: Scope::Ops,
            requires: Default::default(),
            command: Some(command.to_string()),
        }
    }

    fn make_env() -> Environment {
        Environment {
            id: EnvId::new("node0"),
            hardware_class: "cpu".to_string(),
            accelerator_type: "none".to_string(),
            software_profile: Default::default(),
            exclusivity_key: "node0:host".to_string(),
        }
    }

    #[tokio::test]
    async fn test_captures_stdout() {
        let process = ShellProcess::default();
        let output = process
            .run(&make_target("echo hello"), &make_env())
            .await
            .unwrap();
        assert_eq!(output.exit_code, 0);
        assert!(output.success());
        assert_eq!(output.stdout, "hello\n");
    }

    #[tokio::test]
    async fn test_nonzero_exit_captures_stderr() {
        let process = ShellProcess::default();
        let output = process
            .run(&make_target("echo broken >&2; exit 3"), &make_env())
            .await
            .unwrap();
        assert_eq!(output.exit_code, 3);
        assert!(!output.success());
        assert_eq!(output.stderr, "broken\n");
    }

    #[tokio::test]
    async fn test_environment_descriptor_exported() {
        let process = ShellProcess::default();
        let output = process
            .run(&make_target("echo $SIFT_ENVIRONMENT:$SIFT_HARDWARE_CLASS"), &make_env())
            .await
            .unwrap();
        assert_eq!(output.stdout, "node0:cpu\n");
    }

    #[tokio::test]
    async fn test_command_template_applied() {
        let process = ShellProcess::new(ProcessConfig {
            shell: "sh".to_string(),
            command_template: "echo running {target}".to_string(),
        });
        let mut target = make_target("");
        target.command = None;
        let output = process.run(&target, &make_env()).await.unwrap();
        assert_eq!(output.stdout, "running tests/ops/test_chunk.py\n");
    }
}
