//! # Calltrail Extract
//!
//! Per-method side outputs keyed by the same canonical identity as the call
//! graph:
//!
//! - **Snippets**: identity → declaration source text
//! - **Endpoints**: Spring controller handler methods with HTTP verb and path

mod endpoints;
mod snippets;

pub use endpoints::{extract_endpoints, join_paths, ApiEndpoint};
pub use snippets::{extract_snippets, SnippetMap};
