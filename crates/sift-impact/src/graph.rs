//! Bipartite dependency mapping from source paths to test targets.

use crate::manifest::TargetManifest;
use sift_core::ids::TargetId;
use sift_core::target::TestTarget;
use sift_core::Result;
use std::collections::{BTreeMap, BTreeSet};

/// Static mapping from source paths to the targets that depend on them.
/// Built once per run; read-only thereafter.
#[derive(Debug)]
pub struct DependencyGraph {
    targets: BTreeMap<TargetId, TestTarget>,
    edges: BTreeMap<String, BTreeSet<TargetId>>,
}

impl DependencyGraph {
    pub fn from_manifest(manifest: &TargetManifest) -> Result<Self> {
        manifest.validate()?;

        let targets: BTreeMap<TargetId, TestTarget> = manifest
            .targets
            .iter()
            .map(|t| (t.id.clone(), t.clone()))
            .collect();

        let mut edges: BTreeMap<String, BTreeSet<TargetId>> = BTreeMap::new();
        for edge in &manifest.edges {
            edges
                .entry(edge.path.clone())
                .or_default()
                .extend(edge.targets.iter().cloned());
        }

        Ok(Self { targets, edges })
    }

    /// All targets affected by any of the given paths. Monotone: adding
    /// paths can only grow the result. Paths absent from the graph have no
    /// known dependents and contribute nothing.
    pub fn targets_affected_by<'a, I>(&self, paths: I) -> BTreeSet<TargetId>
    where
        I: IntoIterator<Item = &'a str>,
    {
        let mut affected = BTreeSet::new();
        for path in paths {
            if let Some(targets) = self.edges.get(path) {
                affected.extend(targets.iter().cloned());
            }
        }
        affected
    }

    pub fn get(&self, id: &TargetId) -> Option<&TestTarget> {
        self.targets.get(id)
    }

    /// The full target universe, in id order.
    pub fn universe(&self) -> impl Iterator<Item = &TestTarget> {
        self.targets.values()
    }

    pub fn target_count(&self) -> usize {
        self.targets.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn make_graph() -> DependencyGraph {
        let manifest = TargetManifest::from_yaml(
            r#"
targets:
  - id: t1
    scope: ops
  - id: t2
    scope: ops
  - id: t3
    scope: models
edges:
  - path: core/graph.py
    targets: [t1, t2]
  - path: models/decoder.py
    targets: [t3]
  - path: core/util.py
    targets: [t2, t3]
"#,
        )
        .unwrap();
        DependencyGraph::from_manifest(&manifest).unwrap()
    }

    #[test]
    fn test_lookup() {
        let graph = make_graph();
        let affected = graph.targets_affected_by(["core/graph.py"]);
        let ids: Vec<&str> = affected.iter().map(|t| t.as_str()).collect();
        assert_eq!(ids, vec!["t1", "t2"]);
    }

    #[test]
    fn test_unknown_path_is_empty() {
        let graph = make_graph();
        assert!(graph.targets_affected_by(["not/in/graph.py"]).is_empty());
    }

    #[test]
    fn test_monotonicity() {
        let graph = make_graph();
        let smaller = graph.targets_affected_by(["core/graph.py"]);
        let larger = graph.targets_affected_by(["core/graph.py", "core/util.py"]);
        assert!(smaller.is_subset(&larger));
        assert_eq!(larger.len(), 3);
    }

    #[test]
    fn test_union_semantics() {
        let graph = make_graph();
        let affected = graph.targets_affected_by(["core/util.py", "models/decoder.py"]);
        let ids: Vec<&str> = affected.iter().map(|t| t.as_str()).collect();
        assert_eq!(ids, vec!["t2", "t3"]);
    }
}
