//! Handler source joined with the source of its direct callees.
//!
//! The three outputs share one key: a method identity in `dependencies.*`
//! is also its key in `code.json`, and `methodMetadata` in
//! `api_endpoints.json` names the same method.

use crate::error::{AnalyzerError, Result};
use crate::output::{graph_path, read_graph, read_snippets, SNIPPETS_FILE};
use calltrail_extract::SnippetMap;
use calltrail_resolver::CallGraph;
use serde::Serialize;
use std::collections::BTreeMap;
use std::path::Path;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HandlerContext {
    pub signature: String,
    pub code: String,
    /// Callee identity -> source, for callees with a snippet
    pub dependencies: BTreeMap<String, String>,
}

impl HandlerContext {
    /// Callees without source (JDK, libraries, unresolved) are left out.
    pub fn build(signature: &str, graph: &CallGraph, snippets: &SnippetMap) -> Result<Self> {
        let callees = graph
            .callees(signature)
            .ok_or_else(|| AnalyzerError::UnknownMethod(signature.to_string()))?;
        let code = snippets
            .get(signature)
            .cloned()
            .ok_or_else(|| AnalyzerError::MissingSource(signature.to_string()))?;

        let dependencies = callees
            .iter()
            .filter_map(|callee| Some((callee.clone(), snippets.get(callee)?.clone())))
            .collect();

        Ok(Self {
            signature: signature.to_string(),
            code,
            dependencies,
        })
    }

    /// Read the call graph and snippets from an `analyze` output directory
    pub fn load(out_dir: &Path, signature: &str) -> Result<Self> {
        let graph = read_graph(&graph_path(out_dir))?;
        let snippets = read_snippets(&out_dir.join(SNIPPETS_FILE))?;
        Self::build(signature, &graph, &snippets)
    }
}
