//! Run verdict and report types.

use crate::assignment::{Assignment, AssignmentStatus, SkipReason};
use crate::ids::{EnvId, RunId, TargetId};
use serde::{Deserialize, Serialize};

/// Aggregate outcome of one orchestrator invocation. Immutable once
/// finalized.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunVerdict {
    pub run_id: RunId,
    pub overall_status: OverallStatus,
    pub failing_targets: Vec<TargetId>,
    pub per_target_results: Vec<TargetResult>,
}

impl RunVerdict {
    /// Process exit code for CLI consumption: zero only when nothing failed.
    pub fn exit_code(&self) -> i32 {
        if self.overall_status.is_success() { 0 } else { 1 }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OverallStatus {
    AllPassed,
    PartialFailure,
    AllSkipped,
    Aborted,
}

impl OverallStatus {
    pub fn is_success(&self) -> bool {
        matches!(self, OverallStatus::AllPassed | OverallStatus::AllSkipped)
    }
}

/// One row of the structured report.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TargetResult {
    pub target: TargetId,
    pub environment: Option<EnvId>,
    pub status: AssignmentStatus,
    pub skip_reason: Option<SkipReason>,
    pub duration_ms: Option<u64>,
}

impl From<&Assignment> for TargetResult {
    fn from(assignment: &Assignment) -> Self {
        Self {
            target: assignment.target.id.clone(),
            environment: assignment.environment.as_ref().map(|e| e.id.clone()),
            status: assignment.status,
            skip_reason: assignment.skip_reason,
            duration_ms: assignment.duration_ms,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exit_codes() {
        for (status, code) in [
            (OverallStatus::AllPassed, 0),
            (OverallStatus::AllSkipped, 0),
            (OverallStatus::PartialFailure, 1),
            (OverallStatus::Aborted, 1),
        ] {
            let verdict = RunVerdict {
                run_id: RunId::new(),
                overall_status: status,
                failing_targets: vec![],
                per_target_results: vec![],
            };
            assert_eq!(verdict.exit_code(), code);
        }
    }
}
