//! Scheduling and orchestration for sift.
//!
//! Assigns resolved test targets to registered environments under per-device
//! mutual exclusion, runs the two-stage (cheap-then-expensive) pipeline with
//! a completion barrier between stages, streams per-assignment events, and
//! aggregates outcomes into a run verdict.

pub mod aggregate;
pub mod lock;
pub mod queue;
pub mod registry;
pub mod scheduler;

pub use aggregate::ResultAggregator;
pub use lock::ExclusionLock;
pub use registry::{EnvironmentManifest, EnvironmentRegistry};
pub use scheduler::{RunOutcome, Scheduler, SchedulerConfig};
