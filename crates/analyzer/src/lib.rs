//! # Calltrail Analyzer
//!
//! Whole-project call graph analysis.
//!
//! ## Pipeline
//!
//! ```text
//! Project root
//!     │
//!     ├──> File Scanner (.gitignore aware)
//!     │      └─> *.java
//!     │
//!     ├──> Pass 1: parse in parallel (failures recorded, never fatal)
//!     │      └─> ProjectSolver (project types + library sources/archives)
//!     │
//!     ├──> Pass 2: per-unit CallGraphBuilder in parallel, merged
//!     │      ├─> Snippets
//!     │      └─> Endpoints
//!     │
//!     ├──> Writers: dependencies.json|yaml, code.json, api_endpoints.json
//!     │
//!     └──> HandlerContext: a method's source plus its callees' source
//! ```
//!
//! ## Example
//!
//! ```no_run
//! use calltrail_analyzer::{write_analysis, AnalyzerConfig, ProjectAnalyzer};
//! use std::path::Path;
//!
//! fn main() -> calltrail_analyzer::Result<()> {
//!     let root = Path::new("/path/to/project");
//!     let config = AnalyzerConfig::discover(root)?;
//!     let analysis = ProjectAnalyzer::new(root, config.clone())?.analyze()?;
//!
//!     write_analysis(&analysis, Path::new("out"), &config.output)?;
//!     println!("{} methods, {} unresolved calls", analysis.report.methods, analysis.report.unresolved_calls);
//!     Ok(())
//! }
//! ```

mod analyzer;
mod config;
mod context;
mod error;
mod output;
mod report;
mod scanner;

pub use analyzer::{Analysis, ProjectAnalyzer};
pub use config::{AnalyzerConfig, OutputConfig, OutputFormat, CONFIG_FILE_NAME};
pub use context::HandlerContext;
pub use error::{AnalyzerError, Result};
pub use output::{
    graph_path, read_graph, read_snippets, write_analysis, write_graph, write_json, write_yaml,
    DEPENDENCIES_STEM, ENDPOINTS_FILE, SNIPPETS_FILE,
};
pub use report::{FileFailure, ScanReport};
pub use scanner::{FileScanner, ScanOptions};
