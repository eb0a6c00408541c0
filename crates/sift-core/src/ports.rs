//! Port traits (hexagonal architecture).
//!
//! These traits define the interfaces between the orchestrator core and its
//! external collaborators. The test binaries themselves, and the environments
//! they run in, are provisioned elsewhere; the orchestrator only invokes them
//! through these narrow seams.

use crate::assignment::AssignmentStatus;
use crate::environment::Environment;
use crate::target::TestTarget;
use crate::Result;
use async_trait::async_trait;

/// The opaque test-process collaborator: runs one test target in one
/// environment and reports its exit status and captured output.
#[async_trait]
pub trait TestProcess: Send + Sync {
    async fn run(&self, target: &TestTarget, environment: &Environment) -> Result<ProcessOutput>;
}

/// Raw output of one test-process invocation.
#[derive(Debug, Clone)]
pub struct ProcessOutput {
    pub exit_code: i32,
    pub stdout: String,
    pub stderr: String,
}

impl ProcessOutput {
    pub fn success(&self) -> bool {
        self.exit_code == 0
    }
}

/// Executes one assignment to a terminal outcome. Implementations enforce
/// the wall-clock timeout and never retry; re-invocation is the caller's
/// decision.
#[async_trait]
pub trait AssignmentRunner: Send + Sync {
    async fn run(&self, target: &TestTarget, environment: &Environment) -> ExecutionOutcome;
}

/// Terminal outcome of executing one assignment.
///
/// `status` is one of `Passed`, `Failed`, or `TimedOut`; queue-side skips
/// never reach a runner.
#[derive(Debug, Clone)]
pub struct ExecutionOutcome {
    pub status: AssignmentStatus,
    pub exit_code: Option<i32>,
    pub stdout: String,
    pub stderr: String,
    pub duration_ms: u64,
}

impl ExecutionOutcome {
    pub fn passed(exit_code: i32, stdout: String, stderr: String, duration_ms: u64) -> Self {
        Self {
            status: AssignmentStatus::Passed,
            exit_code: Some(exit_code),
            stdout,
            stderr,
            duration_ms,
        }
    }

    pub fn failed(exit_code: Option<i32>, stdout: String, stderr: String, duration_ms: u64) -> Self {
        Self {
            status: AssignmentStatus::Failed,
            exit_code,
            stdout,
            stderr,
            duration_ms,
        }
    }

    pub fn timed_out(duration_ms: u64) -> Self {
        Self {
            status: AssignmentStatus::TimedOut,
            exit_code: None,
            stdout: String::new(),
            stderr: String::new(),
            duration_ms,
        }
    }
}
