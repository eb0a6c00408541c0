//! Two-stage assignment scheduling.

use crate::lock::ExclusionLock;
use crate::queue::StageQueue;
use crate::registry::EnvironmentRegistry;
use chrono::Utc;
use sift_core::assignment::{Assignment, AssignmentStatus, SkipReason};
use sift_core::environment::Environment;
use sift_core::events::{
    AssignmentCompletedPayload, AssignmentStartedPayload, Event, RunCompletedPayload,
    RunSkipReason, RunSkippedPayload, RunStartedPayload, StageCompletedPayload,
    StageStartedPayload,
};
use sift_core::ids::RunId;
use sift_core::ports::AssignmentRunner;
use sift_core::target::{Stage, TestTarget};
use sift_core::Error;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::task::JoinSet;
use tokio::time::{Instant, sleep};
use tracing::{debug, info, warn};

#[derive(Debug, Clone)]
pub struct SchedulerConfig {
    /// How long a queued target may wait for a free environment before it
    /// resolves to skipped.
    pub env_wait_timeout: Duration,
    pub backoff_initial: Duration,
    pub backoff_max: Duration,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            env_wait_timeout: Duration::from_secs(600),
            backoff_initial: Duration::from_millis(50),
            backoff_max: Duration::from_secs(1),
        }
    }
}

/// Everything the scheduler produced for one run.
#[derive(Debug)]
pub struct RunOutcome {
    pub assignments: Vec<Assignment>,
    /// True when the cooperative abort flag cut the run short.
    pub aborted: bool,
}

/// Assigns targets to environments and drives the two-stage pipeline.
///
/// Ops-scope (and other-scope) targets run in the first stage, model-scope
/// targets in the second. The second stage starts only after every
/// first-stage assignment is terminal, regardless of outcome: model-level
/// regressions are independently informative. Environment availability is
/// mutated only here, through the registry, under the exclusion-lock
/// discipline.
pub struct Scheduler {
    registry: Arc<EnvironmentRegistry>,
    exclusion: Arc<ExclusionLock>,
    runner: Arc<dyn AssignmentRunner>,
    config: SchedulerConfig,
    abort: Arc<AtomicBool>,
}

impl Scheduler {
    pub fn new(
        registry: Arc<EnvironmentRegistry>,
        exclusion: Arc<ExclusionLock>,
        runner: Arc<dyn AssignmentRunner>,
        config: SchedulerConfig,
    ) -> Self {
        Self {
            registry,
            exclusion,
            runner,
            config,
            abort: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Handle for requesting cooperative cancellation. Checked between
    /// dispatches; in-flight assignments run to completion (or their
    /// executor timeout).
    pub fn abort_flag(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.abort)
    }

    /// Run the full pipeline over an ordered target list, streaming one
    /// event per completed assignment.
    pub async fn run(
        &self,
        run_id: RunId,
        targets: Vec<TestTarget>,
        skip_directive: bool,
        events: &mpsc::Sender<Event>,
    ) -> RunOutcome {
        if skip_directive {
            info!(%run_id, "Skip directive set, short-circuiting run");
            emit(
                events,
                Event::RunSkipped(RunSkippedPayload {
                    run_id,
                    reason: RunSkipReason::SkipDirective,
                    skipped_at: Utc::now(),
                }),
            )
            .await;
            return RunOutcome {
                assignments: vec![],
                aborted: false,
            };
        }

        if targets.is_empty() {
            info!(%run_id, "No impacted targets, nothing to test");
            emit(
                events,
                Event::RunSkipped(RunSkippedPayload {
                    run_id,
                    reason: RunSkipReason::NoTargets,
                    skipped_at: Utc::now(),
                }),
            )
            .await;
            return RunOutcome {
                assignments: vec![],
                aborted: false,
            };
        }

        emit(
            events,
            Event::RunStarted(RunStartedPayload {
                run_id,
                target_count: targets.len() as u32,
                started_at: Utc::now(),
            }),
        )
        .await;

        let (ops, models): (Vec<_>, Vec<_>) = targets
            .into_iter()
            .partition(|t| t.scope.stage() == Stage::Ops);

        let deadline = Instant::now() + self.config.env_wait_timeout;
        let mut assignments = Vec::new();

        for (stage, stage_targets) in [(Stage::Ops, ops), (Stage::Models, models)] {
            if stage_targets.is_empty() {
                continue;
            }

            if self.abort.load(Ordering::SeqCst) {
                for target in stage_targets {
                    let assignment = Assignment::skipped(target, SkipReason::Aborted);
                    emit_completed(events, run_id, stage, &assignment).await;
                    assignments.push(assignment);
                }
                continue;
            }

            let stage_assignments = self
                .run_stage(run_id, stage, stage_targets, deadline, events)
                .await;
            assignments.extend(stage_assignments);
        }

        let (passed, failed, skipped) = count(&assignments);
        emit(
            events,
            Event::RunCompleted(RunCompletedPayload {
                run_id,
                passed,
                failed,
                skipped,
                completed_at: Utc::now(),
            }),
        )
        .await;

        RunOutcome {
            assignments,
            aborted: self.abort.load(Ordering::SeqCst),
        }
    }

    /// Run one stage to quiescence: every target terminal, every environment
    /// released.
    async fn run_stage(
        &self,
        run_id: RunId,
        stage: Stage,
        targets: Vec<TestTarget>,
        deadline: Instant,
        events: &mpsc::Sender<Event>,
    ) -> Vec<Assignment> {
        emit(
            events,
            Event::StageStarted(StageStartedPayload {
                run_id,
                stage,
                target_count: targets.len() as u32,
                started_at: Utc::now(),
            }),
        )
        .await;

        let mut completed = Vec::new();

        // Unsatisfiable requirements fail at resolution time; waiting for an
        // environment that will never exist helps nobody.
        let mut runnable = Vec::new();
        for target in targets {
            if self.registry.can_satisfy(&target.requires) {
                runnable.push(target);
            } else {
                let error = Error::NoCompatibleEnvironment {
                    target: target.id.to_string(),
                    requirement: target.requires.to_string(),
                };
                warn!(target = %target.id, "{error}");
                let assignment = Assignment::unplaceable(target, error.to_string());
                emit_completed(events, run_id, stage, &assignment).await;
                completed.push(assignment);
            }
        }

        let mut queue = StageQueue::new(runnable);
        let mut running: JoinSet<Assignment> = JoinSet::new();
        let mut backoff = self.config.backoff_initial;

        loop {
            // Cooperative abort between dispatches.
            if self.abort.load(Ordering::SeqCst) && !queue.is_empty() {
                for target in queue.drain() {
                    let assignment = Assignment::skipped(target, SkipReason::Aborted);
                    emit_completed(events, run_id, stage, &assignment).await;
                    completed.push(assignment);
                }
            }

            // Dispatch in resolution order while placements exist.
            while let Some((target, env)) = queue.take_first(|t| self.try_place(t)) {
                let started_at = Utc::now();
                emit(
                    events,
                    Event::AssignmentStarted(AssignmentStartedPayload {
                        run_id,
                        stage,
                        target: target.id.clone(),
                        environment: env.id.clone(),
                        attempt: 1,
                        started_at,
                    }),
                )
                .await;
                info!(target = %target.id, environment = %env.id, %stage, "Dispatching target");

                let runner = Arc::clone(&self.runner);
                running.spawn(async move {
                    let outcome = runner.run(&target, &env).await;
                    let diagnostic = match outcome.status {
                        AssignmentStatus::Passed => None,
                        _ if !outcome.stderr.is_empty() => Some(outcome.stderr),
                        _ => Some(outcome.stdout),
                    };
                    Assignment {
                        target,
                        environment: Some(env),
                        attempt: 1,
                        status: outcome.status,
                        exit_code: outcome.exit_code,
                        skip_reason: None,
                        diagnostic,
                        started_at: Some(started_at),
                        completed_at: Some(Utc::now()),
                        duration_ms: Some(outcome.duration_ms),
                    }
                });
            }

            if queue.is_empty() && running.is_empty() {
                break;
            }

            // Wait for a completion, or back off while queued targets wait
            // for an environment to free up.
            let joined = if running.is_empty() {
                sleep(backoff).await;
                None
            } else if queue.is_empty() {
                running.join_next().await
            } else {
                tokio::select! {
                    res = running.join_next() => res,
                    _ = sleep(backoff) => None,
                }
            };

            match joined {
                Some(Ok(assignment)) => {
                    if let Some(ref env) = assignment.environment {
                        self.registry.mark_free(&env.id);
                        self.exclusion.release(&env.exclusivity_key);
                    }
                    debug!(
                        target = %assignment.target.id,
                        status = ?assignment.status,
                        "Assignment completed"
                    );
                    emit_completed(events, run_id, stage, &assignment).await;
                    completed.push(assignment);
                    backoff = self.config.backoff_initial;
                }
                Some(Err(join_error)) => {
                    warn!(error = %join_error, "Assignment task failed to join");
                }
                None => {
                    backoff = (backoff * 2).min(self.config.backoff_max);
                }
            }

            // Targets still queued past the deadline resolve to skipped
            // rather than waiting forever.
            if !queue.is_empty() && Instant::now() >= deadline {
                warn!(%stage, remaining = queue.len(), "Environment wait deadline elapsed");
                for target in queue.drain() {
                    let assignment =
                        Assignment::skipped(target, SkipReason::EnvironmentTimeout);
                    emit_completed(events, run_id, stage, &assignment).await;
                    completed.push(assignment);
                }
            }
        }

        let (passed, failed, skipped) = count(&completed);
        emit(
            events,
            Event::StageCompleted(StageCompletedPayload {
                run_id,
                stage,
                passed,
                failed,
                skipped,
                completed_at: Utc::now(),
            }),
        )
        .await;

        completed
    }

    /// Pick the first free compatible environment and commit to it:
    /// exclusivity key acquired, environment marked busy.
    fn try_place(&self, target: &TestTarget) -> Option<Environment> {
        for env in self.registry.available(&target.requires) {
            if self.exclusion.try_acquire(&env.exclusivity_key) {
                self.registry.mark_busy(&env.id);
                return Some(env);
            }
        }
        None
    }
}

fn count(assignments: &[Assignment]) -> (u32, u32, u32) {
    let mut passed = 0;
    let mut failed = 0;
    let mut skipped = 0;
    for assignment in assignments {
        match assignment.status {
            AssignmentStatus::Passed => passed += 1,
            AssignmentStatus::Failed | AssignmentStatus::TimedOut => failed += 1,
            AssignmentStatus::Skipped => skipped += 1,
            AssignmentStatus::Pending | AssignmentStatus::Running => {}
        }
    }
    (passed, failed, skipped)
}

async fn emit(events: &mpsc::Sender<Event>, event: Event) {
    // A dropped receiver means nobody is listening; the run itself goes on.
    let _ = events.send(event).await;
}

async fn emit_completed(
    events: &mpsc::Sender<Event>,
    run_id: RunId,
    stage: Stage,
    assignment: &Assignment,
) {
    emit(
        events,
        Event::AssignmentCompleted(AssignmentCompletedPayload {
            run_id,
            stage,
            target: assignment.target.id.clone(),
            environment: assignment.environment.as_ref().map(|e| e.id.clone()),
            status: assignment.status,
            exit_code: assignment.exit_code,
            skip_reason: assignment.skip_reason,
            duration_ms: assignment.duration_ms,
            completed_at: assignment.completed_at.unwrap_or_else(Utc::now),
        }),
    )
    .await;
}
