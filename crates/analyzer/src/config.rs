use crate::error::{AnalyzerError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

/// Config file looked up in the project root when none is given
pub const CONFIG_FILE_NAME: &str = "calltrail.toml";

/// Configuration for a project analysis run
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalyzerConfig {
    /// `.jar`/`.zip` archives and directories of Java sources whose types
    /// feed symbol resolution but not the call graph
    pub library_paths: Vec<PathBuf>,

    /// Worker threads (0 = one per core)
    pub threads: usize,

    /// Larger files are skipped
    pub max_file_size_bytes: u64,

    /// Directory names pruned from the walk, matched case-insensitively
    pub ignored_dirs: Vec<String>,

    /// Honor `.gitignore`, `.git/info/exclude` and the global gitignore
    pub respect_gitignore: bool,

    /// Walk hidden files and directories
    pub include_hidden: bool,

    pub output: OutputConfig,
}

impl Default for AnalyzerConfig {
    fn default() -> Self {
        Self {
            library_paths: Vec::new(),
            threads: 0,
            max_file_size_bytes: 2 * 1_048_576,
            ignored_dirs: DEFAULT_IGNORED_DIRS.iter().map(|d| d.to_string()).collect(),
            respect_gitignore: true,
            include_hidden: false,
            output: OutputConfig::default(),
        }
    }
}

const DEFAULT_IGNORED_DIRS: &[&str] = &[
    ".git",
    ".hg",
    ".svn",
    ".idea",
    ".vscode",
    ".gradle",
    ".mvn",
    "node_modules",
    "build",
    "target",
    "out",
];

impl AnalyzerConfig {
    /// Call graph only, no snippets or endpoints
    pub fn dependencies_only() -> Self {
        Self {
            output: OutputConfig {
                snippets: false,
                endpoints: false,
                ..Default::default()
            },
            ..Default::default()
        }
    }

    /// Single worker, for reproducible timing and debugging
    pub fn single_threaded() -> Self {
        Self {
            threads: 1,
            ..Default::default()
        }
    }

    /// Read a TOML config file; missing keys keep their defaults
    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path).map_err(|e| AnalyzerError::io(path, e))?;
        let config: Self = toml::from_str(&text).map_err(|source| AnalyzerError::ConfigParse {
            path: path.to_path_buf(),
            source,
        })?;
        config.validate().map_err(AnalyzerError::Config)?;
        Ok(config)
    }

    /// `calltrail.toml` from the project root, or defaults when absent
    pub fn discover(root: &Path) -> Result<Self> {
        let path = root.join(CONFIG_FILE_NAME);
        if path.is_file() {
            log::debug!("Using config {}", path.display());
            Self::load(&path)
        } else {
            Ok(Self::default())
        }
    }

    /// Validate configuration
    pub fn validate(&self) -> std::result::Result<(), String> {
        if self.max_file_size_bytes == 0 {
            return Err("max_file_size_bytes must be > 0".to_string());
        }

        if self.threads > MAX_THREADS {
            return Err(format!(
                "threads ({}) cannot exceed {}",
                self.threads, MAX_THREADS
            ));
        }

        if let Some(empty) = self.ignored_dirs.iter().position(|d| d.trim().is_empty()) {
            return Err(format!("ignored_dirs[{empty}] is empty"));
        }

        if !self.output.dependencies && !self.output.snippets && !self.output.endpoints {
            return Err("at least one output must be enabled".to_string());
        }

        Ok(())
    }
}

const MAX_THREADS: usize = 512;

/// What to write and how
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Format of the call graph file
    pub format: OutputFormat,

    /// Write `dependencies.json` / `dependencies.yaml`
    pub dependencies: bool,

    /// Write `code.json`
    pub snippets: bool,

    /// Write `api_endpoints.json`
    pub endpoints: bool,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            format: OutputFormat::Json,
            dependencies: true,
            snippets: true,
            endpoints: true,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Json,
    Yaml,
}

impl OutputFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            OutputFormat::Json => "json",
            OutputFormat::Yaml => "yaml",
        }
    }

    /// Format implied by a file extension
    pub fn from_path(path: &Path) -> Option<Self> {
        path.extension()
            .and_then(|ext| ext.to_str())
            .and_then(|ext| ext.parse().ok())
    }
}

impl FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "json" => Ok(OutputFormat::Json),
            "yaml" | "yml" => Ok(OutputFormat::Yaml),
            other => Err(format!("unknown output format: {other}")),
        }
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.extension())
    }
}
