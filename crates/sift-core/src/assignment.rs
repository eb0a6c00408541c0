//! Assignment and execution outcome types.

use crate::environment::Environment;
use crate::target::TestTarget;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One placement of a test target onto an environment, with its outcome.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Assignment {
    pub target: TestTarget,
    /// Absent when the target never reached an environment (unsatisfiable
    /// requirement, wait timeout, abort).
    pub environment: Option<Environment>,
    /// Explicit re-invocations by the caller increment this; the orchestrator
    /// itself never retries.
    pub attempt: u32,
    pub status: AssignmentStatus,
    pub exit_code: Option<i32>,
    pub skip_reason: Option<SkipReason>,
    /// Diagnostic output for non-passed outcomes (stderr tail or error text).
    pub diagnostic: Option<String>,
    pub started_at: Option<DateTime<Utc>>,
    pub completed_at: Option<DateTime<Utc>>,
    pub duration_ms: Option<u64>,
}

impl Assignment {
    /// A skipped assignment that never reached an environment.
    pub fn skipped(target: TestTarget, reason: SkipReason) -> Self {
        Self {
            target,
            environment: None,
            attempt: 1,
            status: AssignmentStatus::Skipped,
            exit_code: None,
            skip_reason: Some(reason),
            diagnostic: None,
            started_at: None,
            completed_at: Some(Utc::now()),
            duration_ms: None,
        }
    }

    /// A failed assignment that could not be placed at all.
    pub fn unplaceable(target: TestTarget, diagnostic: impl Into<String>) -> Self {
        Self {
            target,
            environment: None,
            attempt: 1,
            status: AssignmentStatus::Failed,
            exit_code: None,
            skip_reason: None,
            diagnostic: Some(diagnostic.into()),
            started_at: None,
            completed_at: Some(Utc::now()),
            duration_ms: None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AssignmentStatus {
    Pending,
    Running,
    Passed,
    Failed,
    TimedOut,
    Skipped,
}

impl AssignmentStatus {
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            AssignmentStatus::Passed
                | AssignmentStatus::Failed
                | AssignmentStatus::TimedOut
                | AssignmentStatus::Skipped
        )
    }

    pub fn is_passed(&self) -> bool {
        matches!(self, AssignmentStatus::Passed)
    }
}

/// Why an assignment was skipped without executing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SkipReason {
    /// No compatible environment became free before the per-run deadline.
    EnvironmentTimeout,
    /// The run's abort flag was raised before this target dispatched.
    Aborted,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ids::TargetId;
    use crate::target::Scope;

    fn make_target(id: &str) -> TestTarget {
        TestTarget {
            id: TargetId::new(id),
            scope: Scope::Ops,
            requires: Default::default(),
            command: None,
        }
    }

    #[test]
    fn test_terminal_statuses() {
        assert!(!AssignmentStatus::Pending.is_terminal());
        assert!(!AssignmentStatus::Running.is_terminal());
        assert!(AssignmentStatus::Passed.is_terminal());
        assert!(AssignmentStatus::Failed.is_terminal());
        assert!(AssignmentStatus::TimedOut.is_terminal());
        assert!(AssignmentStatus::Skipped.is_terminal());
    }

    #[test]
    fn test_skipped_assignment() {
        let a = Assignment::skipped(make_target("ops/test_chunk"), SkipReason::EnvironmentTimeout);
        assert_eq!(a.status, AssignmentStatus::Skipped);
        assert_eq!(a.skip_reason, Some(SkipReason::EnvironmentTimeout));
        assert!(a.environment.is_none());
        assert!(a.started_at.is_none());
    }
}
