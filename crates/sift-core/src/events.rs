//! Run lifecycle events.
//!
//! Completed assignments are reported as they finish, not batched, so a
//! consumer can react to failures before the run ends.

use crate::assignment::{AssignmentStatus, SkipReason};
use crate::ids::{EnvId, RunId, TargetId};
use crate::target::Stage;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// All events emitted during a run.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Event {
    RunStarted(RunStartedPayload),
    RunSkipped(RunSkippedPayload),
    RunCompleted(RunCompletedPayload),

    StageStarted(StageStartedPayload),
    StageCompleted(StageCompletedPayload),

    AssignmentStarted(AssignmentStartedPayload),
    AssignmentCompleted(AssignmentCompletedPayload),
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunStartedPayload {
    pub run_id: RunId,
    pub target_count: u32,
    pub started_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunSkippedPayload {
    pub run_id: RunId,
    pub reason: RunSkipReason,
    pub skipped_at: DateTime<Utc>,
}

/// Why an entire run short-circuited before either stage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RunSkipReason {
    SkipDirective,
    NoTargets,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunCompletedPayload {
    pub run_id: RunId,
    pub passed: u32,
    pub failed: u32,
    pub skipped: u32,
    pub completed_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StageStartedPayload {
    pub run_id: RunId,
    pub stage: Stage,
    pub target_count: u32,
    pub started_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StageCompletedPayload {
    pub run_id: RunId,
    pub stage: Stage,
    pub passed: u32,
    pub failed: u32,
    pub skipped: u32,
    pub completed_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AssignmentStartedPayload {
    pub run_id: RunId,
    pub stage: Stage,
    pub target: TargetId,
    pub environment: EnvId,
    pub attempt: u32,
    pub started_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AssignmentCompletedPayload {
    pub run_id: RunId,
    pub stage: Stage,
    pub target: TargetId,
    pub environment: Option<EnvId>,
    pub status: AssignmentStatus,
    pub exit_code: Option<i32>,
    pub skip_reason: Option<SkipReason>,
    pub duration_ms: Option<u64>,
    pub completed_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_event_round_trip() {
        let event = Event::AssignmentCompleted(AssignmentCompletedPayload {
            run_id: RunId::new(),
            stage: Stage::Ops,
            target: TargetId::new("ops/test_chunk"),
            environment: Some(EnvId::new("node0")),
            status: AssignmentStatus::Passed,
            exit_code: Some(0),
            skip_reason: None,
            duration_ms: Some(1200),
            completed_at: Utc::now(),
        });

        let json = serde_json::to_string(&event).unwrap();
        assert!(json.contains("\"type\":\"assignment_completed\""));
        let parsed: Event = serde_json::from_str(&json).unwrap();
        match parsed {
            Event::AssignmentCompleted(p) => assert_eq!(p.status, AssignmentStatus::Passed),
            other => panic!("unexpected event: {other:?}"),
        }
    }
}
