//! Result aggregation with partial-failure semantics.

use sift_core::assignment::{Assignment, AssignmentStatus};
use sift_core::ids::RunId;
use sift_core::verdict::{OverallStatus, RunVerdict, TargetResult};

/// Folds terminal assignments into a run verdict.
pub struct ResultAggregator;

impl ResultAggregator {
    pub fn new() -> Self {
        Self
    }

    /// Finalize a run. `aborted` marks runs the cooperative abort flag cut
    /// short after scheduling began; pre-stage short-circuits (skip
    /// directive, zero targets) arrive here as zero assignments and
    /// aggregate to `AllSkipped`.
    pub fn finalize(&self, run_id: RunId, assignments: &[Assignment], aborted: bool) -> RunVerdict {
        let failing_targets = assignments
            .iter()
            .filter(|a| {
                matches!(
                    a.status,
                    AssignmentStatus::Failed | AssignmentStatus::TimedOut
                )
            })
            .map(|a| a.target.id.clone())
            .collect::<Vec<_>>();

        let overall_status = if aborted {
            OverallStatus::Aborted
        } else if assignments.is_empty() {
            OverallStatus::AllSkipped
        } else if assignments.iter().all(|a| a.status.is_passed()) {
            OverallStatus::AllPassed
        } else if assignments
            .iter()
            .all(|a| a.status == AssignmentStatus::Skipped)
        {
            OverallStatus::AllSkipped
        } else {
            OverallStatus::PartialFailure
        };

        RunVerdict {
            run_id,
            overall_status,
            failing_targets,
            per_target_results: assignments.iter().map(TargetResult::from).collect(),
        }
    }
}

impl Default for ResultAggregator {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sift_core::assignment::SkipReason;
    use sift_core::ids::TargetId;
    use sift_core::target::{Scope, TestTarget};

    fn make_assignment(id: &str, status: AssignmentStatus) -> Assignment {
        let target = TestTarget {
            id: TargetId::new(id),
            scope: Scope::Ops,
            requires: Default::default(),
            command: None,
        };
        match status {
            AssignmentStatus::Skipped => {
                Assignment::skipped(target, SkipReason::EnvironmentTimeout)
            }
            _ => {
                let mut a = Assignment::unplaceable(target, "");
                a.status = status;
                a
            }
        }
    }

    #[test]
    fn test_all_passed() {
        let assignments = vec![
            make_assignment("t1", AssignmentStatus::Passed),
            make_assignment("t2", AssignmentStatus::Passed),
        ];
        let verdict = ResultAggregator::new().finalize(RunId::new(), &assignments, false);
        assert_eq!(verdict.overall_status, OverallStatus::AllPassed);
        assert!(verdict.failing_targets.is_empty());
        assert_eq!(verdict.per_target_results.len(), 2);
    }

    #[test]
    fn test_partial_failure_enumerates_failing_targets() {
        let assignments = vec![
            make_assignment("t1", AssignmentStatus::Passed),
            make_assignment("t2", AssignmentStatus::Failed),
            make_assignment("t3", AssignmentStatus::TimedOut),
            make_assignment("t4", AssignmentStatus::Skipped),
        ];
        let verdict = ResultAggregator::new().finalize(RunId::new(), &assignments, false);
        assert_eq!(verdict.overall_status, OverallStatus::PartialFailure);
        let failing: Vec<&str> = verdict.failing_targets.iter().map(|t| t.as_str()).collect();
        assert_eq!(failing, vec!["t2", "t3"]);
    }

    #[test]
    fn test_zero_assignments_is_all_skipped() {
        let verdict = ResultAggregator::new().finalize(RunId::new(), &[], false);
        assert_eq!(verdict.overall_status, OverallStatus::AllSkipped);
        assert_eq!(verdict.exit_code(), 0);
    }

    #[test]
    fn test_every_assignment_skipped_is_all_skipped() {
        let assignments = vec![
            make_assignment("t1", AssignmentStatus::Skipped),
            make_assignment("t2", AssignmentStatus::Skipped),
        ];
        let verdict = ResultAggregator::new().finalize(RunId::new(), &assignments, false);
        assert_eq!(verdict.overall_status, OverallStatus::AllSkipped);
    }

    #[test]
    fn test_aborted_overrides() {
        let assignments = vec![make_assignment("t1", AssignmentStatus::Passed)];
        let verdict = ResultAggregator::new().finalize(RunId::new(), &assignments, true);
        assert_eq!(verdict.overall_status, OverallStatus::Aborted);
        assert_eq!(verdict.exit_code(), 1);
    }
}
