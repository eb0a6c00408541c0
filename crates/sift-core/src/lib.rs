//! Sift Core
//!
//! Core domain types, traits, and error handling for the sift test-impact
//! orchestrator. This crate has minimal dependencies and defines the shared
//! vocabulary used across all other crates.

pub mod assignment;
pub mod environment;
pub mod error;
pub mod events;
pub mod ids;
pub mod ports;
pub mod target;
pub mod verdict;

pub use error::{Error, Result};
pub use ids::*;
