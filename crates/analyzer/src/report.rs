use calltrail_resolver::BuildStats;
use serde::Serialize;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

/// A file that was skipped, and why
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FileFailure {
    pub path: PathBuf,
    /// Line of the first syntax error, for parse failures
    #[serde(skip_serializing_if = "Option::is_none")]
    pub line: Option<usize>,
    pub message: String,
}

impl FileFailure {
    pub fn new(path: &Path, message: impl Into<String>) -> Self {
        Self {
            path: path.to_path_buf(),
            line: None,
            message: message.into(),
        }
    }
}

/// Summary of one analysis run
#[derive(Debug, Clone, Default, Serialize)]
pub struct ScanReport {
    /// Java files found under the root
    pub files_scanned: usize,

    /// Files parsed and included in the graph
    pub units_analyzed: usize,

    /// Source units parsed from library directories
    pub library_units: usize,

    /// Type names loaded from library archives
    pub library_types: usize,

    /// Methods with a call graph entry
    pub methods: usize,

    pub calls: usize,
    pub unresolved_calls: usize,
    pub exact_calls: usize,
    pub enclosing_calls: usize,

    /// Calls typed through receiver inference, by tier
    pub inferred_calls: BTreeMap<&'static str, usize>,

    pub parse_failures: Vec<FileFailure>,
    pub io_failures: Vec<FileFailure>,

    /// Library paths that could not be loaded
    pub library_failures: Vec<FileFailure>,

    pub endpoints: usize,
    pub snippets: usize,

    /// Time taken in milliseconds
    pub elapsed_ms: u64,
}

impl ScanReport {
    pub fn add_build_stats(&mut self, stats: &BuildStats) {
        self.methods += stats.methods;
        self.calls += stats.calls;
        self.unresolved_calls += stats.unresolved;
        self.exact_calls += stats.exact;
        self.enclosing_calls += stats.enclosing;
        for (tier, count) in &stats.by_tier {
            *self.inferred_calls.entry(*tier).or_default() += count;
        }
    }

    /// Share of calls that ended up UNRESOLVED (0.0 when there are no calls)
    pub fn unresolved_ratio(&self) -> f64 {
        if self.calls == 0 {
            0.0
        } else {
            self.unresolved_calls as f64 / self.calls as f64
        }
    }

    pub fn failed_files(&self) -> usize {
        self.parse_failures.len() + self.io_failures.len()
    }

    /// Log the headline numbers at info level
    pub fn log_summary(&self) {
        log::info!(
            "Analyzed {}/{} files: {} methods, {} calls ({:.1}% unresolved) in {} ms",
            self.units_analyzed,
            self.files_scanned,
            self.methods,
            self.calls,
            self.unresolved_ratio() * 100.0,
            self.elapsed_ms
        );
        for failure in self.parse_failures.iter().chain(&self.io_failures) {
            log::warn!("Skipped {}: {}", failure.path.display(), failure.message);
        }
    }
}
