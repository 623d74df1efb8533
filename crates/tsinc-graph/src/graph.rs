//! Forward dependency graph over tracked sources.
//!
//! Maps each file to the files it directly imports, as resolved by the
//! compiler's module resolution the last time the file was compiled. Edges
//! for a file are replaced wholesale on each recompilation of that file;
//! stale edges for unchanged files persist until those files are themselves
//! recompiled.

use rustc_hash::{FxHashMap, FxHashSet};
use serde::{Deserialize, Serialize};

use crate::SourceId;

/// Forward map from a file to the files it directly imports.
///
/// Serializes as `map<path, [path, ...]>`, matching the on-disk cache
/// format. Import order within an entry is preserved for deterministic
/// traversal, but has no semantic meaning.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DependencyGraph {
    edges: FxHashMap<SourceId, Vec<SourceId>>,
}

impl DependencyGraph {
    /// Create an empty graph.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of files with a recorded entry.
    pub fn len(&self) -> usize {
        self.edges.len()
    }

    /// Returns `true` if no file has a recorded entry.
    pub fn is_empty(&self) -> bool {
        self.edges.is_empty()
    }

    /// Replace the recorded imports of `file` wholesale.
    ///
    /// A file's edge set is never accumulated across cycles; each
    /// recompilation of the file overwrites the previous entry.
    pub fn set_imports(&mut self, file: SourceId, imports: Vec<SourceId>) {
        self.edges.insert(file, imports);
    }

    /// Direct imports recorded for `file`, if it was ever compiled.
    pub fn imports_of(&self, file: &SourceId) -> Option<&[SourceId]> {
        self.edges.get(file).map(Vec::as_slice)
    }

    /// Iterate over all files with a recorded entry.
    pub fn files(&self) -> impl Iterator<Item = &SourceId> {
        self.edges.keys()
    }

    /// Merge another graph's entries into this one.
    ///
    /// Entries present in `fresh` overwrite the entry for the same file
    /// here; files absent from `fresh` are left untouched. This is the
    /// monotonic merge the cached record relies on.
    pub fn merge(&mut self, fresh: DependencyGraph) {
        self.edges.extend(fresh.edges);
    }

    /// Collect every file reachable from `start` by repeatedly following
    /// import edges, including `start` itself.
    ///
    /// Cycle-safe: each file is visited at most once per call, so
    /// `A -> B -> A` terminates with `[A, B]`. A file with no recorded
    /// entry contributes only itself. Order is discovery order from the
    /// starting file, which keeps work lists deterministic.
    pub fn transitive_closure(&self, start: &SourceId) -> Vec<SourceId> {
        let mut visited = FxHashSet::default();
        let mut result = Vec::new();
        let mut stack = vec![start.clone()];

        while let Some(file) = stack.pop() {
            if !visited.insert(file.clone()) {
                continue;
            }
            if let Some(imports) = self.imports_of(&file) {
                // Reverse so the leftmost import is popped first.
                for import in imports.iter().rev() {
                    if !visited.contains(import) {
                        stack.push(import.clone());
                    }
                }
            }
            result.push(file);
        }

        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn id(path: &str) -> SourceId {
        SourceId::new(path).unwrap()
    }

    #[test]
    fn leaf_contributes_only_itself() {
        let graph = DependencyGraph::new();
        let a = id("/p/a.ts");
        assert_eq!(graph.transitive_closure(&a), vec![a]);
    }

    #[test]
    fn closure_walks_imports_not_importers() {
        // A -> {B, C}, B -> {D}, C -> {D}. Changing D alone must not pull
        // in its importers; changing B pulls in D.
        let (a, b, c, d) = (id("/p/a.ts"), id("/p/b.ts"), id("/p/c.ts"), id("/p/d.ts"));
        let mut graph = DependencyGraph::new();
        graph.set_imports(a.clone(), vec![b.clone(), c.clone()]);
        graph.set_imports(b.clone(), vec![d.clone()]);
        graph.set_imports(c.clone(), vec![d.clone()]);

        assert_eq!(graph.transitive_closure(&d), vec![d.clone()]);
        assert_eq!(graph.transitive_closure(&b), vec![b.clone(), d.clone()]);
        assert_eq!(graph.transitive_closure(&a), vec![a, b, d, c]);
    }

    #[test]
    fn cyclic_graph_terminates() {
        let (a, b) = (id("/p/a.ts"), id("/p/b.ts"));
        let mut graph = DependencyGraph::new();
        graph.set_imports(a.clone(), vec![b.clone()]);
        graph.set_imports(b.clone(), vec![a.clone()]);

        assert_eq!(graph.transitive_closure(&a), vec![a.clone(), b.clone()]);
        assert_eq!(graph.transitive_closure(&b), vec![b, a]);
    }

    #[test]
    fn self_import_terminates() {
        let a = id("/p/a.ts");
        let mut graph = DependencyGraph::new();
        graph.set_imports(a.clone(), vec![a.clone()]);
        assert_eq!(graph.transitive_closure(&a), vec![a]);
    }

    #[test]
    fn set_imports_replaces_wholesale() {
        let (a, b, c) = (id("/p/a.ts"), id("/p/b.ts"), id("/p/c.ts"));
        let mut graph = DependencyGraph::new();
        graph.set_imports(a.clone(), vec![b]);
        graph.set_imports(a.clone(), vec![c.clone()]);
        assert_eq!(graph.imports_of(&a), Some(&[c][..]));
    }

    #[test]
    fn merge_overwrites_only_fresh_entries() {
        let (a, b, c) = (id("/p/a.ts"), id("/p/b.ts"), id("/p/c.ts"));
        let mut cached = DependencyGraph::new();
        cached.set_imports(a.clone(), vec![b.clone()]);
        cached.set_imports(b.clone(), vec![c.clone()]);

        let mut fresh = DependencyGraph::new();
        fresh.set_imports(a.clone(), vec![c.clone()]);

        cached.merge(fresh);
        assert_eq!(cached.imports_of(&a), Some(&[c.clone()][..]));
        assert_eq!(cached.imports_of(&b), Some(&[c][..]));
    }

    #[test]
    fn serde_round_trip() {
        let (a, b) = (id("/p/a.ts"), id("/p/b.ts"));
        let mut graph = DependencyGraph::new();
        graph.set_imports(a, vec![b]);

        let json = serde_json::to_string(&graph).unwrap();
        let back: DependencyGraph = serde_json::from_str(&json).unwrap();
        assert_eq!(graph, back);
    }
}
