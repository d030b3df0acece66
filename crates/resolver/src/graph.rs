use crate::error::{ResolverError, Result};
use petgraph::algo::dijkstra;
use petgraph::graph::{DiGraph, NodeIndex};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};

use crate::identity::UNRESOLVED;

/// Caller signature -> callee signatures in call order, duplicates kept.
///
/// Keys are ordered so serialized output is stable across runs.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CallGraph {
    entries: BTreeMap<String, Vec<String>>,
}

impl CallGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append callees to a caller, creating the entry if needed
    pub fn extend(&mut self, caller: impl Into<String>, callees: impl IntoIterator<Item = String>) {
        self.entries.entry(caller.into()).or_default().extend(callees);
    }

    /// Union with another graph; callees of a shared caller are appended
    pub fn merge(&mut self, other: CallGraph) {
        for (caller, callees) in other.entries {
            self.extend(caller, callees);
        }
    }

    pub fn callees(&self, caller: &str) -> Option<&[String]> {
        self.entries.get(caller).map(Vec::as_slice)
    }

    /// Callers that call `callee` at least once, in key order
    pub fn callers(&self, callee: &str) -> Vec<&str> {
        self.entries
            .iter()
            .filter(|(_, callees)| callees.iter().any(|c| c == callee))
            .map(|(caller, _)| caller.as_str())
            .collect()
    }

    pub fn contains(&self, caller: &str) -> bool {
        self.entries.contains_key(caller)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &[String])> {
        self.entries
            .iter()
            .map(|(caller, callees)| (caller.as_str(), callees.as_slice()))
    }

    /// Number of callers
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Number of call edges, duplicates included
    pub fn call_count(&self) -> usize {
        self.entries.values().map(Vec::len).sum()
    }

    pub fn unresolved_count(&self) -> usize {
        let prefix = format!("{UNRESOLVED}.{UNRESOLVED}.");
        self.entries
            .values()
            .flatten()
            .filter(|callee| callee.starts_with(&prefix))
            .count()
    }

    /// Directed graph with one node per signature and one edge per
    /// distinct caller/callee pair
    pub fn to_digraph(&self) -> (DiGraph<String, ()>, HashMap<String, NodeIndex>) {
        let mut graph = DiGraph::new();
        let mut nodes: HashMap<String, NodeIndex> = HashMap::new();

        let mut node = |graph: &mut DiGraph<String, ()>, name: &str| {
            *nodes
                .entry(name.to_string())
                .or_insert_with(|| graph.add_node(name.to_string()))
        };

        for (caller, callees) in &self.entries {
            let from = node(&mut graph, caller);
            for callee in callees {
                let to = node(&mut graph, callee);
                if graph.find_edge(from, to).is_none() {
                    graph.add_edge(from, to, ());
                }
            }
        }

        (graph, nodes)
    }

    /// Everything reachable from `signature` within `max_depth` calls,
    /// paired with its call distance, nearest first
    pub fn transitive_callees(&self, signature: &str, max_depth: usize) -> Result<Vec<(String, usize)>> {
        let (graph, nodes) = self.to_digraph();
        let start = *nodes
            .get(signature)
            .ok_or_else(|| ResolverError::SignatureNotFound(signature.to_string()))?;

        let distances = dijkstra(&graph, start, None, |_| 1usize);

        let mut reached: Vec<(String, usize)> = distances
            .into_iter()
            .filter(|&(idx, dist)| idx != start && dist <= max_depth)
            .map(|(idx, dist)| (graph[idx].clone(), dist))
            .collect();
        reached.sort_by(|a, b| a.1.cmp(&b.1).then_with(|| a.0.cmp(&b.0)));
        Ok(reached)
    }
}
