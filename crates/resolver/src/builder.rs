use crate::graph::CallGraph;
use crate::identity::MethodIdentity;
use crate::imports::ImportContext;
use crate::infer::Tier;
use crate::resolve::{CallResolver, CallSite, ResolvedVia};
use crate::solver::{Scope, SymbolSolver};
use calltrail_syntax::SourceUnit;
use serde::Serialize;
use std::collections::BTreeMap;

/// Resolution counters for one or more units
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct BuildStats {
    /// Methods walked as callers
    pub methods: usize,
    pub calls: usize,
    pub exact: usize,
    pub enclosing: usize,
    /// Calls typed through receiver inference, by tier name
    pub by_tier: BTreeMap<&'static str, usize>,
    pub unresolved: usize,
}

impl BuildStats {
    fn record(&mut self, via: ResolvedVia) {
        self.calls += 1;
        match via {
            ResolvedVia::Exact => self.exact += 1,
            ResolvedVia::Enclosing => self.enclosing += 1,
            ResolvedVia::Inferred(tier) => *self.by_tier.entry(tier.as_str()).or_default() += 1,
            ResolvedVia::Unresolved => self.unresolved += 1,
        }
    }

    pub fn merge(&mut self, other: &BuildStats) {
        self.methods += other.methods;
        self.calls += other.calls;
        self.exact += other.exact;
        self.enclosing += other.enclosing;
        for (tier, count) in &other.by_tier {
            *self.by_tier.entry(*tier).or_default() += count;
        }
        self.unresolved += other.unresolved;
    }

    pub fn tier(&self, tier: Tier) -> usize {
        self.by_tier.get(tier.as_str()).copied().unwrap_or(0)
    }
}

/// Builds the call graph of one source unit
pub struct CallGraphBuilder<'a> {
    solver: &'a dyn SymbolSolver,
}

impl<'a> CallGraphBuilder<'a> {
    pub fn new(solver: &'a dyn SymbolSolver) -> Self {
        Self { solver }
    }

    pub fn build(&self, unit: &SourceUnit) -> CallGraph {
        self.build_with_stats(unit).0
    }

    /// Every method declared in the unit, with its calls resolved in order.
    ///
    /// Constructors are not callers. Callers are keyed by the type's dotted
    /// path, so no two declarations share an entry.
    pub fn build_with_stats(&self, unit: &SourceUnit) -> (CallGraph, BuildStats) {
        let imports = ImportContext::from_unit(unit);
        let resolver = CallResolver::new(self.solver);
        let mut graph = CallGraph::new();
        let mut stats = BuildStats::default();

        for owner in unit.all_types() {
            for method in owner.methods.iter().filter(|m| !m.is_constructor) {
                let caller = MethodIdentity::declared(&imports, &owner.qualified_name, method);
                let scope = Scope::new(&imports, owner, method);

                let callees: Vec<String> = method
                    .calls
                    .iter()
                    .map(|call| {
                        let site = CallSite {
                            caller: &caller,
                            call,
                        };
                        let resolution = resolver.resolve_traced(&site, &scope);
                        stats.record(resolution.via);
                        resolution.identity.to_string()
                    })
                    .collect();

                stats.methods += 1;
                graph.extend(caller.to_string(), callees);
            }
        }

        log::debug!(
            "{}: {} methods, {} calls, {} unresolved",
            unit.path.display(),
            stats.methods,
            stats.calls,
            stats.unresolved
        );
        (graph, stats)
    }
}
