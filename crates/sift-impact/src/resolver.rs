//! Impact resolution: changed paths to an ordered target list.

use crate::graph::DependencyGraph;
use sift_core::target::{ScopeFilter, TestTarget};
use tracing::debug;

/// Changed-path sentinel requesting a non-incremental full run. The resolver
/// then returns the whole target universe for the scope, bypassing the graph.
pub const FULL_RUN_SENTINEL: &str = "*";

/// Computes the minimal sufficient target set for a change set.
pub struct ImpactResolver<'a> {
    graph: &'a DependencyGraph,
}

impl<'a> ImpactResolver<'a> {
    pub fn new(graph: &'a DependencyGraph) -> Self {
        Self { graph }
    }

    /// Resolve a change set into an ordered, deduplicated target list.
    ///
    /// The result is sorted by target id so identical inputs always produce
    /// identical scheduling order. An empty change set resolves to an empty
    /// list: nothing to test, which is success.
    pub fn resolve(&self, changed_paths: &[String], scope: ScopeFilter) -> Vec<TestTarget> {
        if changed_paths.is_empty() {
            return Vec::new();
        }

        let full_run = changed_paths.iter().any(|p| p == FULL_RUN_SENTINEL);

        // BTreeMap-backed storage keeps both branches in id order.
        let targets: Vec<TestTarget> = if full_run {
            self.graph
                .universe()
                .filter(|t| scope.admits(t.scope))
                .cloned()
                .collect()
        } else {
            self.graph
                .targets_affected_by(changed_paths.iter().map(String::as_str))
                .iter()
                .filter_map(|id| self.graph.get(id))
                .filter(|t| scope.admits(t.scope))
                .cloned()
                .collect()
        };

        debug!(
            changed = changed_paths.len(),
            resolved = targets.len(),
            full_run,
            ?scope,
            "Resolved impacted targets"
        );

        targets
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::manifest::TargetManifest;
    use pretty_assertions::assert_eq;

    fn make_graph() -> DependencyGraph {
        let manifest = TargetManifest::from_yaml(
            r#"
targets:
  - id: tests/ops/test_chunk.py
    scope: ops
  - id: tests/ops/test_scan.py
    scope: ops
  - id: tests/models/test_decoder.py
    scope: models
  - id: tests/test_utils.py
    scope: other
edges:
  - path: core/graph.py
    targets: [tests/ops/test_chunk.py, tests/ops/test_scan.py]
  - path: models/decoder.py
    targets: [tests/models/test_decoder.py, tests/ops/test_scan.py]
"#,
        )
        .unwrap();
        DependencyGraph::from_manifest(&manifest).unwrap()
    }

    fn ids(targets: &[TestTarget]) -> Vec<&str> {
        targets.iter().map(|t| t.id.as_str()).collect()
    }

    #[test]
    fn test_empty_change_set_is_empty() {
        let graph = make_graph();
        let resolver = ImpactResolver::new(&graph);
        assert!(resolver.resolve(&[], ScopeFilter::All).is_empty());
        assert!(resolver.resolve(&[], ScopeFilter::ModelsOnly).is_empty());
    }

    #[test]
    fn test_resolution_is_deterministic() {
        let graph = make_graph();
        let resolver = ImpactResolver::new(&graph);
        let changed = vec!["models/decoder.py".to_string(), "core/graph.py".to_string()];

        let first = resolver.resolve(&changed, ScopeFilter::All);
        let second = resolver.resolve(&changed, ScopeFilter::All);
        assert_eq!(ids(&first), ids(&second));
        assert_eq!(
            ids(&first),
            vec![
                "tests/models/test_decoder.py",
                "tests/ops/test_chunk.py",
                "tests/ops/test_scan.py",
            ]
        );
    }

    #[test]
    fn test_scope_filter() {
        let graph = make_graph();
        let resolver = ImpactResolver::new(&graph);
        let changed = vec!["models/decoder.py".to_string()];

        let excluded = resolver.resolve(&changed, ScopeFilter::ExcludeModels);
        assert_eq!(ids(&excluded), vec!["tests/ops/test_scan.py"]);

        let models = resolver.resolve(&changed, ScopeFilter::ModelsOnly);
        assert_eq!(ids(&models), vec!["tests/models/test_decoder.py"]);
    }

    #[test]
    fn test_full_run_sentinel() {
        let graph = make_graph();
        let resolver = ImpactResolver::new(&graph);
        let changed = vec![FULL_RUN_SENTINEL.to_string()];

        let all = resolver.resolve(&changed, ScopeFilter::All);
        assert_eq!(all.len(), 4);

        let ops_only = resolver.resolve(&changed, ScopeFilter::ExcludeModels);
        assert_eq!(
            ids(&ops_only),
            vec![
                "tests/ops/test_chunk.py",
                "tests/ops/test_scan.py",
                "tests/test_utils.py",
            ]
        );
    }

    #[test]
    fn test_unknown_paths_resolve_to_nothing() {
        let graph = make_graph();
        let resolver = ImpactResolver::new(&graph);
        let changed = vec!["docs/readme.md".to_string()];
        assert!(resolver.resolve(&changed, ScopeFilter::All).is_empty());
    }
}
