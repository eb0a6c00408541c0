//! Target manifest loading and validation.
//!
//! The manifest declares the target universe and the path-to-targets edges
//! produced by static analysis of the codebase. Example:
//!
//! ```yaml
//! targets:
//!   - id: tests/ops/test_delta_rule.py
//!     scope: ops
//!     requires:
//!       hardware_class: gpu
//!       accelerator_type: cuda
//!       software: [torch, triton]
//!   - id: tests/models/test_rwkv7.py
//!     scope: models
//!     requires:
//!       hardware_class: gpu
//!       accelerator_type: cuda
//! edges:
//!   - path: ops/delta_rule/fused_recurrent.py
//!     targets: [tests/ops/test_delta_rule.py, tests/models/test_rwkv7.py]
//! ```

use serde::{Deserialize, Serialize};
use sift_core::ids::TargetId;
use sift_core::target::TestTarget;
use sift_core::{Error, Result};
use std::collections::BTreeSet;
use std::path::Path;

/// Declarative description of the target universe and its dependency edges.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TargetManifest {
    #[serde(default)]
    pub targets: Vec<TestTarget>,
    #[serde(default)]
    pub edges: Vec<DependencyEdge>,
}

/// One source path and the targets that transitively depend on it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DependencyEdge {
    pub path: String,
    pub targets: Vec<TargetId>,
}

impl TargetManifest {
    pub fn from_yaml(input: &str) -> Result<Self> {
        let manifest: Self = serde_yaml::from_str(input)?;
        manifest.validate()?;
        Ok(manifest)
    }

    pub fn load(path: &Path) -> Result<Self> {
        let input = std::fs::read_to_string(path)?;
        Self::from_yaml(&input)
    }

    /// Reject duplicate target ids and edges referencing undeclared targets.
    pub fn validate(&self) -> Result<()> {
        let mut seen = BTreeSet::new();
        for target in &self.targets {
            if !seen.insert(&target.id) {
                return Err(Error::DuplicateTarget(target.id.to_string()));
            }
        }

        for edge in &self.edges {
            for target in &edge.targets {
                if !seen.contains(target) {
                    return Err(Error::UnknownTarget {
                        path: edge.path.clone(),
                        target: target.to_string(),
                    });
                }
            }
        }

        Ok(())
    }
}
