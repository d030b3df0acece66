use std::path::PathBuf;
use thiserror::Error;

/// Result type for syntax operations
pub type Result<T> = std::result::Result<T, SyntaxError>;

/// Errors that can occur while turning a source file into a [`crate::SourceUnit`]
#[derive(Error, Debug)]
pub enum SyntaxError {
    /// The source contains syntax errors
    #[error("Parse error in {path} at line {line}")]
    Parse { path: PathBuf, line: usize },

    /// Tree-sitter refused the grammar or produced no tree
    #[error("Tree-sitter error: {0}")]
    TreeSitter(String),

    /// The file could not be read
    #[error("IO error reading {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl SyntaxError {
    /// Create a tree-sitter error
    pub fn tree_sitter(msg: impl Into<String>) -> Self {
        Self::TreeSitter(msg.into())
    }

    /// Whether this error means the file was read but is not valid Java
    pub const fn is_parse_failure(&self) -> bool {
        matches!(self, Self::Parse { .. })
    }
}
