//! # Calltrail Syntax
//!
//! Java source parsing for call graph analysis.
//!
//! ## Architecture
//!
//! ```text
//! Source file
//!     │
//!     ├──> Tree-sitter Parsing → AST (any syntax error rejects the unit)
//!     │
//!     └──> Lowering
//!          ├─> Package and imports
//!          ├─> Type declarations (classes, interfaces, enums, records)
//!          ├─> Methods: parameters, locals, annotations
//!          └─> Call expressions in pre-order, receivers as a closed `Expr` enum
//! ```
//!
//! ## Example
//!
//! ```rust
//! use calltrail_syntax::JavaParser;
//!
//! let mut parser = JavaParser::new().unwrap();
//! let unit = parser
//!     .parse_source("Foo.java", "package a.b; class Foo { void f() { helper(); } }".to_string())
//!     .unwrap();
//!
//! assert_eq!(unit.package.as_deref(), Some("a.b"));
//! assert_eq!(unit.types[0].methods[0].calls[0].name, "helper");
//! ```

mod error;
mod lower;
mod parser;
mod types;

pub use error::{Result, SyntaxError};
pub use parser::{is_java_source, JavaParser, SourceParser};
pub use types::{
    Annotation, AnnotationArg, CallExpr, Expr, Import, Literal, MethodDecl, Param, SourceUnit,
    TypeDecl, TypeKind, Variable,
};
