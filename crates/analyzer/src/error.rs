use std::path::PathBuf;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, AnalyzerError>;

#[derive(Error, Debug)]
pub enum AnalyzerError {
    #[error("Invalid project root: {0}")]
    InvalidRoot(PathBuf),

    #[error("IO error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid configuration: {0}")]
    Config(String),

    #[error("Cannot parse config {path}: {source}")]
    ConfigParse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("Syntax error: {0}")]
    Syntax(#[from] calltrail_syntax::SyntaxError),

    #[error("Resolver error: {0}")]
    Resolver(#[from] calltrail_resolver::ResolverError),

    #[error("Unknown method: {0}")]
    UnknownMethod(String),

    #[error("No source for {0}")]
    MissingSource(String),

    #[error("Thread pool error: {0}")]
    ThreadPool(String),
}

impl AnalyzerError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}
