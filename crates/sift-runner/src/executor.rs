//! Timeout-enforced assignment execution.

use async_trait::async_trait;
use sift_core::environment::Environment;
use sift_core::ports::{AssignmentRunner, ExecutionOutcome, TestProcess};
use sift_core::target::TestTarget;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::timeout;
use tracing::{error, warn};

/// Configuration for assignment execution.
#[derive(Debug, Clone)]
pub struct ExecutorConfig {
    /// Hard wall-clock limit per assignment.
    pub timeout: Duration,
}

impl Default for ExecutorConfig {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(3600),
        }
    }
}

/// Runs one assignment against the test-process collaborator.
///
/// On timeout the process future is dropped, which kills the child; the
/// outcome is `timed_out`. There is no automatic retry: these are assumed
/// deterministic checks, and a silent retry would mask a real regression.
pub struct Executor {
    process: Arc<dyn TestProcess>,
    config: ExecutorConfig,
}

impl Executor {
    pub fn new(process: Arc<dyn TestProcess>, config: ExecutorConfig) -> Self {
        Self { process, config }
    }
}

#[async_trait]
impl AssignmentRunner for Executor {
    async fn run(&self, target: &TestTarget, environment: &Environment) -> ExecutionOutcome {
        let start = std::time::Instant::now();

        match timeout(self.config.timeout, self.process.run(target, environment)).await {
            Err(_) => {
                warn!(
                    target = %target.id,
                    timeout_secs = self.config.timeout.as_secs(),
                    "Execution timed out, process killed"
                );
                ExecutionOutcome::timed_out(start.elapsed().as_millis() as u64)
            }
            Ok(Err(e)) => {
                error!(target = %target.id, error = %e, "Test process error");
                ExecutionOutcome::failed(
                    None,
                    String::new(),
                    e.to_string(),
                    start.elapsed().as_millis() as u64,
                )
            }
            Ok(Ok(output)) => {
                let duration_ms = start.elapsed().as_millis() as u64;
                if output.success() {
                    ExecutionOutcome::passed(
                        output.exit_code,
                        output.stdout,
                        output.stderr,
                        duration_ms,
                    )
                } else {
                    ExecutionOutcome::failed(
                        Some(output.exit_code),
                        output.stdout,
                        output.stderr,
                        duration_ms,
                    )
                }
            }
        }
    }
}
