//! Execution environment types.

use crate::ids::EnvId;
use crate::target::EnvRequirement;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// A concrete execution context capable of running test targets.
///
/// Registered once at startup from static configuration; only its
/// availability changes during a run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Environment {
    pub id: EnvId,
    pub hardware_class: String,
    pub accelerator_type: String,
    #[serde(default)]
    pub software_profile: BTreeSet<String>,
    /// Identifies the physical resource this environment occupies. At most
    /// one running assignment may hold a given key at any instant.
    pub exclusivity_key: String,
}

impl Environment {
    /// Whether this environment can run a target with the given requirement.
    /// Hardware class and accelerator type match exactly; the installed
    /// software profile must cover the required software set.
    pub fn satisfies(&self, requirement: &EnvRequirement) -> bool {
        if let Some(ref hw) = requirement.hardware_class
            && *hw != self.hardware_class
        {
            return false;
        }
        if let Some(ref acc) = requirement.accelerator_type
            && *acc != self.accelerator_type
        {
            return false;
        }
        requirement
            .software
            .iter()
            .all(|s| self.software_profile.contains(s))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EnvStatus {
    Free,
    Busy,
}

impl EnvStatus {
    pub fn is_available(&self) -> bool {
        matches!(self, EnvStatus::Free)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_env(hw: &str, acc: &str, software: Vec<&str>) -> Environment {
        Environment {
            id: EnvId::new("node0"),
            hardware_class: hw.to_string(),
            accelerator_type: acc.to_string(),
            software_profile: software.iter().map(|s| s.to_string()).collect(),
            exclusivity_key: "node0:dev0".to_string(),
        }
    }

    #[test]
    fn test_satisfies_exact_hardware() {
        let env = make_env("gpu", "cuda", vec!["torch"]);

        let mut req = EnvRequirement::default();
        assert!(env.satisfies(&req));

        req.hardware_class = Some("gpu".to_string());
        assert!(env.satisfies(&req));

        req.hardware_class = Some("cpu".to_string());
        assert!(!env.satisfies(&req));
    }

    #[test]
    fn test_satisfies_software_superset() {
        let env = make_env("gpu", "cuda", vec!["torch", "triton"]);

        let req = EnvRequirement {
            software: ["torch"].iter().map(|s| s.to_string()).collect(),
            ..Default::default()
        };
        assert!(env.satisfies(&req));

        let req = EnvRequirement {
            software: ["torch", "jax"].iter().map(|s| s.to_string()).collect(),
            ..Default::default()
        };
        assert!(!env.satisfies(&req));
    }

    #[test]
    fn test_satisfies_accelerator_mismatch() {
        let env = make_env("gpu", "cuda", vec![]);
        let req = EnvRequirement {
            accelerator_type: Some("rocm".to_string()),
            ..Default::default()
        };
        assert!(!env.satisfies(&req));
    }
}
