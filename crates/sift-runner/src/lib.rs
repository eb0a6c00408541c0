//! Assignment execution for sift.
//!
//! The [`Executor`] drives one assignment to a terminal outcome under a hard
//! wall-clock timeout; [`ShellProcess`] is the default test-process
//! collaborator, shelling out on the host the environment descriptor points
//! at.

pub mod executor;
pub mod process;

pub use executor::{Executor, ExecutorConfig};
pub use process::{ProcessConfig, ShellProcess};
