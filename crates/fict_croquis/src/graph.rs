//! Reactive dependency graph.
//!
//! Nodes are signal / derived bindings within one module; edges point from
//! dependent to dependency (reader to source). Cycle detection runs before
//! classification so cyclic derived chains fail early with a path listing.

use fict_carton::FxHashMap;

use crate::hir::{BindingId, BindingRecord};

/// Dependency graph over reactive bindings.
#[derive(Debug, Default)]
pub struct DepGraph {
    /// reader -> sources
    edges: FxHashMap<BindingId, Vec<BindingId>>,
}

/// A detected dependency cycle, in traversal order.
#[derive(Debug, Clone)]
pub struct Cycle {
    pub path: Vec<BindingId>,
}

impl Cycle {
    /// Render the cycle as `a -> b -> a`.
    pub fn display(&self, bindings: &[BindingRecord]) -> String {
        let mut names: Vec<&str> = self
            .path
            .iter()
            .map(|id| bindings[id.index()].name.as_str())
            .collect();
        if let Some(first) = names.first().copied() {
            names.push(first);
        }
        names.join(" -> ")
    }
}

impl DepGraph {
    /// Build the graph from binding dependency sets.
    pub fn build(bindings: &[BindingRecord]) -> Self {
        let mut graph = Self::default();
        for binding in bindings {
            if !binding.deps.is_empty() {
                graph.edges.insert(binding.id, binding.deps.clone());
            }
        }
        graph
    }

    #[inline]
    pub fn deps_of(&self, id: BindingId) -> &[BindingId] {
        self.edges.get(&id).map_or(&[], |deps| deps.as_slice())
    }

    /// Find a cycle, if any. Deterministic: nodes are visited in id order.
    pub fn find_cycle(&self) -> Option<Cycle> {
        #[derive(Clone, Copy, PartialEq)]
        enum Mark {
            InProgress,
            Done,
        }

        let mut marks: FxHashMap<BindingId, Mark> = FxHashMap::default();
        let mut roots: Vec<BindingId> = self.edges.keys().copied().collect();
        roots.sort();

        let mut stack: Vec<BindingId> = Vec::new();

        fn visit(
            graph: &DepGraph,
            node: BindingId,
            marks: &mut FxHashMap<BindingId, Mark>,
            stack: &mut Vec<BindingId>,
        ) -> Option<Vec<BindingId>> {
            match marks.get(&node) {
                Some(Mark::Done) => return None,
                Some(Mark::InProgress) => {
                    let pos = stack.iter().position(|&n| n == node).unwrap_or(0);
                    return Some(stack[pos..].to_vec());
                }
                None => {}
            }
            marks.insert(node, Mark::InProgress);
            stack.push(node);
            for &dep in graph.deps_of(node) {
                if let Some(cycle) = visit(graph, dep, marks, stack) {
                    return Some(cycle);
                }
            }
            stack.pop();
            marks.insert(node, Mark::Done);
            None
        }

        for root in roots {
            if let Some(path) = visit(self, root, &mut marks, &mut stack) {
                return Some(Cycle { path });
            }
        }
        None
    }

    /// Transitive closure of dependencies reachable from `roots`.
    pub fn reachable_from(&self, roots: impl IntoIterator<Item = BindingId>) -> Vec<BindingId> {
        let mut seen: FxHashMap<BindingId, ()> = FxHashMap::default();
        let mut work: Vec<BindingId> = roots.into_iter().collect();
        let mut out = Vec::new();
        while let Some(node) = work.pop() {
            if seen.insert(node, ()).is_some() {
                continue;
            }
            out.push(node);
            for &dep in self.deps_of(node) {
                work.push(dep);
            }
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn graph_of(edges: &[(u32, &[u32])]) -> DepGraph {
        let mut graph = DepGraph::default();
        for (from, tos) in edges {
            graph.edges.insert(
                BindingId::new(*from),
                tos.iter().map(|&t| BindingId::new(t)).collect(),
            );
        }
        graph
    }

    #[test]
    fn test_acyclic() {
        let graph = graph_of(&[(1, &[0]), (2, &[1, 0])]);
        assert!(graph.find_cycle().is_none());
    }

    #[test]
    fn test_two_node_cycle() {
        let graph = graph_of(&[(1, &[2]), (2, &[1])]);
        let cycle = graph.find_cycle().expect("cycle");
        assert_eq!(cycle.path.len(), 2);
    }

    #[test]
    fn test_self_cycle() {
        let graph = graph_of(&[(3, &[3])]);
        let cycle = graph.find_cycle().expect("cycle");
        assert_eq!(cycle.path, vec![BindingId::new(3)]);
    }

    #[test]
    fn test_reachable() {
        let graph = graph_of(&[(2, &[1]), (1, &[0])]);
        let mut reached = graph.reachable_from([BindingId::new(2)]);
        reached.sort();
        assert_eq!(
            reached,
            vec![BindingId::new(0), BindingId::new(1), BindingId::new(2)]
        );
    }
}
