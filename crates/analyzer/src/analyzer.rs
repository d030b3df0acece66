use crate::config::AnalyzerConfig;
use crate::error::{AnalyzerError, Result};
use crate::report::{FileFailure, ScanReport};
use crate::scanner::{FileScanner, ScanOptions};
use calltrail_extract::{extract_endpoints, extract_snippets, ApiEndpoint, SnippetMap};
use calltrail_resolver::{BuildStats, CallGraph, CallGraphBuilder, ProjectSolver};
use calltrail_syntax::{JavaParser, SourceUnit, SyntaxError};
use rayon::prelude::*;
use std::path::{Path, PathBuf};
use std::time::Instant;

/// Everything one analysis run produces
#[derive(Debug, Clone, Default)]
pub struct Analysis {
    pub graph: CallGraph,
    pub snippets: SnippetMap,
    pub endpoints: Vec<ApiEndpoint>,
    pub report: ScanReport,
}

/// Parsed units plus the files that could not be turned into one
#[derive(Default)]
struct ParsedFiles {
    units: Vec<SourceUnit>,
    parse_failures: Vec<FileFailure>,
    io_failures: Vec<FileFailure>,
}

/// Two-pass project analysis: parse everything and build the symbol index,
/// then build per-unit call graphs against it
pub struct ProjectAnalyzer {
    root: PathBuf,
    config: AnalyzerConfig,
}

impl ProjectAnalyzer {
    /// The root must be an accessible directory
    pub fn new(root: impl AsRef<Path>, config: AnalyzerConfig) -> Result<Self> {
        let root = root.as_ref().to_path_buf();
        if !root.is_dir() {
            return Err(AnalyzerError::InvalidRoot(root));
        }
        std::fs::read_dir(&root).map_err(|e| AnalyzerError::io(&root, e))?;
        config.validate().map_err(AnalyzerError::Config)?;

        Ok(Self { root, config })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn config(&self) -> &AnalyzerConfig {
        &self.config
    }

    pub fn analyze(&self) -> Result<Analysis> {
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(self.config.threads)
            .build()
            .map_err(|e| AnalyzerError::ThreadPool(e.to_string()))?;

        pool.install(|| self.run())
    }

    fn scan_options(&self) -> ScanOptions {
        ScanOptions {
            max_file_size_bytes: self.config.max_file_size_bytes,
            ignored_dirs: self.config.ignored_dirs.clone(),
            respect_gitignore: self.config.respect_gitignore,
            include_hidden: self.config.include_hidden,
        }
    }

    fn run(&self) -> Result<Analysis> {
        let start = Instant::now();
        let mut report = ScanReport::default();

        // Fail fast if the grammar cannot be loaded at all
        JavaParser::new()?;

        // Pass 1: parse project sources
        let files = FileScanner::new(&self.root, self.scan_options()).scan();
        report.files_scanned = files.len();

        let parsed = parse_files(&files);
        report.units_analyzed = parsed.units.len();
        report.parse_failures = parsed.parse_failures;
        report.io_failures = parsed.io_failures;
        let units = parsed.units;

        // Symbol index over project and library declarations
        let mut solver = ProjectSolver::from_units(&units);
        self.load_libraries(&mut solver, &mut report);
        log::debug!(
            "Symbol index: {} project types, {} library types",
            solver.type_count(),
            solver.library_type_count()
        );

        // Pass 2: per-unit graphs against the frozen index
        let solver = &solver;
        let built: Vec<(CallGraph, BuildStats)> = units
            .par_iter()
            .map(|unit| CallGraphBuilder::new(solver).build_with_stats(unit))
            .collect();

        let mut graph = CallGraph::new();
        for (unit_graph, stats) in built {
            report.add_build_stats(&stats);
            graph.merge(unit_graph);
        }

        let output = &self.config.output;
        let snippets = if output.snippets {
            units
                .par_iter()
                .map(extract_snippets)
                .reduce(SnippetMap::new, |mut acc, part| {
                    for (key, code) in part {
                        acc.entry(key).or_insert(code);
                    }
                    acc
                })
        } else {
            SnippetMap::new()
        };

        let endpoints: Vec<ApiEndpoint> = if output.endpoints {
            units.par_iter().flat_map_iter(extract_endpoints).collect()
        } else {
            Vec::new()
        };

        report.snippets = snippets.len();
        report.endpoints = endpoints.len();
        report.elapsed_ms = start.elapsed().as_millis() as u64;
        report.log_summary();

        Ok(Analysis {
            graph,
            snippets,
            endpoints,
            report,
        })
    }

    /// Library paths are resolved against the project root when relative.
    /// Unloadable libraries are reported and skipped.
    fn load_libraries(&self, solver: &mut ProjectSolver, report: &mut ScanReport) {
        for library in &self.config.library_paths {
            let path = if library.is_absolute() {
                library.clone()
            } else {
                self.root.join(library)
            };

            if path.is_dir() {
                let files = FileScanner::new(&path, self.scan_options()).scan();
                let parsed = parse_files(&files);
                for unit in &parsed.units {
                    solver.add_unit(unit);
                }
                report.library_units += parsed.units.len();
                report
                    .library_failures
                    .extend(parsed.parse_failures.into_iter().chain(parsed.io_failures));
                continue;
            }

            match solver.add_archive(&path) {
                Ok(count) => report.library_types += count,
                Err(e) => {
                    log::warn!("Skipping library {}: {}", path.display(), e);
                    report.library_failures.push(FileFailure::new(&path, e.to_string()));
                }
            }
        }
    }
}

/// Parse files in parallel, one parser per worker. Failures never abort.
fn parse_files(files: &[PathBuf]) -> ParsedFiles {
    let results: Vec<std::result::Result<SourceUnit, (PathBuf, SyntaxError)>> = files
        .par_iter()
        .map_init(JavaParser::new, |parser, path| -> std::result::Result<_, (PathBuf, SyntaxError)> {
            let parser = parser.as_mut().map_err(|e| {
                (path.clone(), SyntaxError::tree_sitter(e.to_string()))
            })?;
            parser.parse_file(path).map_err(|e| (path.clone(), e))
        })
        .collect();

    let mut parsed = ParsedFiles::default();
    for result in results {
        match result {
            Ok(unit) => parsed.units.push(unit),
            Err((path, e @ SyntaxError::Io { .. })) => {
                log::debug!("Cannot read {}: {}", path.display(), e);
                parsed.io_failures.push(FileFailure::new(&path, e.to_string()));
            }
            Err((path, e)) => {
                log::debug!("Parse failure {}: {}", path.display(), e);
                let line = match &e {
                    SyntaxError::Parse { line, .. } => Some(*line),
                    _ => None,
                };
                parsed.parse_failures.push(FileFailure {
                    line,
                    ..FileFailure::new(&path, e.to_string())
                });
            }
        }
    }
    parsed
}
