//! Test target types.

use crate::ids::TargetId;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;

/// A single executable test unit.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TestTarget {
    pub id: TargetId,
    pub scope: Scope,
    #[serde(default)]
    pub requires: EnvRequirement,
    /// Explicit command line for the test-process collaborator. When absent,
    /// the runner applies its command template to the target id.
    #[serde(default)]
    pub command: Option<String>,
}

/// Scope classification of a test target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Scope {
    Ops,
    Models,
    Other,
}

impl Scope {
    /// The pipeline stage this scope runs in. Model suites are expensive and
    /// run in the second stage; everything else runs in the first.
    pub fn stage(&self) -> Stage {
        match self {
            Scope::Models => Stage::Models,
            Scope::Ops | Scope::Other => Stage::Ops,
        }
    }
}

impl fmt::Display for Scope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Scope::Ops => write!(f, "ops"),
            Scope::Models => write!(f, "models"),
            Scope::Other => write!(f, "other"),
        }
    }
}

/// An ordered pipeline stage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    Ops,
    Models,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Stage::Ops => write!(f, "ops"),
            Stage::Models => write!(f, "models"),
        }
    }
}

/// Scope filter applied when resolving impacted targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScopeFilter {
    #[default]
    All,
    ExcludeModels,
    ModelsOnly,
}

impl ScopeFilter {
    pub fn admits(&self, scope: Scope) -> bool {
        match self {
            ScopeFilter::All => true,
            ScopeFilter::ExcludeModels => scope != Scope::Models,
            ScopeFilter::ModelsOnly => scope == Scope::Models,
        }
    }
}

/// Environment requirement declared by a test target.
///
/// `hardware_class` and `accelerator_type` match exactly against the
/// environment; `None` matches any. `software` must be covered by the
/// environment's installed profile.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnvRequirement {
    #[serde(default)]
    pub hardware_class: Option<String>,
    #[serde(default)]
    pub accelerator_type: Option<String>,
    #[serde(default)]
    pub software: BTreeSet<String>,
}

impl fmt::Display for EnvRequirement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "hardware={}, accelerator={}, software=[{}]",
            self.hardware_class.as_deref().unwrap_or("any"),
            self.accelerator_type.as_deref().unwrap_or("any"),
            self.software
                .iter()
                .map(String::as_str)
                .collect::<Vec<_>>()
                .join(", ")
        )
    }
}
