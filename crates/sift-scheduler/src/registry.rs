//! Environment catalog and availability state.

use serde::{Deserialize, Serialize};
use sift_core::environment::Environment;
use sift_core::ids::EnvId;
use sift_core::target::EnvRequirement;
use sift_core::{Error, Result};
use std::collections::{BTreeMap, BTreeSet};
use std::path::Path;
use std::sync::Mutex;

/// Static environment manifest loaded at startup. Example:
///
/// ```yaml
/// environments:
///   - id: node0-dev0
///     hardware_class: gpu
///     accelerator_type: cuda
///     software_profile: [torch, triton]
///     exclusivity_key: node0:dev0
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EnvironmentManifest {
    #[serde(default)]
    pub environments: Vec<Environment>,
}

impl EnvironmentManifest {
    pub fn from_yaml(input: &str) -> Result<Self> {
        let manifest: Self = serde_yaml::from_str(input)?;
        manifest.validate()?;
        Ok(manifest)
    }

    pub fn load(path: &Path) -> Result<Self> {
        let input = std::fs::read_to_string(path)?;
        Self::from_yaml(&input)
    }

    pub fn validate(&self) -> Result<()> {
        let mut seen = BTreeSet::new();
        for env in &self.environments {
            if !seen.insert(&env.id) {
                return Err(Error::DuplicateEnvironment(env.id.to_string()));
            }
        }
        Ok(())
    }
}

/// Catalog of registered environments plus their busy/free state.
///
/// All availability mutation funnels through [`mark_busy`](Self::mark_busy)
/// and [`mark_free`](Self::mark_free); both are idempotent with
/// last-writer-wins semantics. Environments are never removed mid-run.
#[derive(Debug)]
pub struct EnvironmentRegistry {
    inner: Mutex<RegistryInner>,
}

#[derive(Debug)]
struct RegistryInner {
    environments: BTreeMap<EnvId, Environment>,
    busy: BTreeSet<EnvId>,
}

impl EnvironmentRegistry {
    pub fn new(environments: Vec<Environment>) -> Result<Self> {
        let mut map = BTreeMap::new();
        for env in environments {
            if map.insert(env.id.clone(), env.clone()).is_some() {
                return Err(Error::DuplicateEnvironment(env.id.to_string()));
            }
        }
        Ok(Self {
            inner: Mutex::new(RegistryInner {
                environments: map,
                busy: BTreeSet::new(),
            }),
        })
    }

    pub fn from_manifest(manifest: &EnvironmentManifest) -> Result<Self> {
        manifest.validate()?;
        Self::new(manifest.environments.clone())
    }

    /// Free environments satisfying the requirement, in id order.
    pub fn available(&self, requirement: &EnvRequirement) -> Vec<Environment> {
        let inner = self.inner.lock().unwrap();
        inner
            .environments
            .values()
            .filter(|env| !inner.busy.contains(&env.id) && env.satisfies(requirement))
            .cloned()
            .collect()
    }

    /// Whether any registered environment could ever satisfy the
    /// requirement, busy or not. False means the target is unsatisfiable
    /// for this registry and should fail rather than wait.
    pub fn can_satisfy(&self, requirement: &EnvRequirement) -> bool {
        let inner = self.inner.lock().unwrap();
        inner.environments.values().any(|e| e.satisfies(requirement))
    }

    pub fn mark_busy(&self, id: &EnvId) {
        self.inner.lock().unwrap().busy.insert(id.clone());
    }

    pub fn mark_free(&self, id: &EnvId) {
        self.inner.lock().unwrap().busy.remove(id);
    }

    pub fn is_busy(&self, id: &EnvId) -> bool {
        self.inner.lock().unwrap().busy.contains(id)
    }

    pub fn environments(&self) -> Vec<Environment> {
        self.inner.lock().unwrap().environments.values().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.inner.lock().unwrap().environments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
