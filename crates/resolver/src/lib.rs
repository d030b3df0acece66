//! # Calltrail Resolver
//!
//! Best-effort call-site resolution and call graph construction for Java.
//!
//! Every call expression gets exactly one callee identity. When the symbol
//! solver cannot find the declaration, resolution degrades through cheaper
//! guesses instead of failing.
//!
//! ## Architecture
//!
//! ```text
//! SourceUnit
//!     │
//!     ├──> ImportContext (package, imports; built once per unit)
//!     │
//!     └──> CallGraphBuilder (per method, per call in pre-order)
//!            │
//!            └──> CallResolver
//!                   ├─ 1. SymbolSolver::resolve_call     → exact declaration
//!                   ├─ 2. no receiver                    → enclosing type
//!                   ├─ 3. infer_type(receiver)
//!                   │      ├─ Exact         (solver expression type)
//!                   │      ├─ Heuristic     (chained call: return type, naming table, chain root)
//!                   │      ├─ Imported      (bare name of an imported type)
//!                   │      ├─ LocalVariable (local, parameter or field declaration)
//!                   │      └─ Constructed   (`new T(...)`)
//!                   └─ 4. UNRESOLVED.UNRESOLVED.name()
//! ```
//!
//! ## Example
//!
//! ```rust
//! use calltrail_resolver::{CallGraphBuilder, NullSolver};
//! use calltrail_syntax::JavaParser;
//!
//! let unit = JavaParser::new()
//!     .unwrap()
//!     .parse_source("Foo.java", "package a.b; class Foo { void f() { helper(); } }".to_string())
//!     .unwrap();
//!
//! let graph = CallGraphBuilder::new(&NullSolver).build(&unit);
//! assert_eq!(graph.callees("a.b.Foo.f()").unwrap(), ["a.b.Foo.helper()".to_string()]);
//! ```

mod builder;
mod error;
mod graph;
mod identity;
mod imports;
mod index;
mod infer;
mod normalize;
mod resolve;
mod solver;

pub use builder::{BuildStats, CallGraphBuilder};
pub use error::{ResolverError, Result};
pub use graph::CallGraph;
pub use identity::{MethodIdentity, UNRESOLVED};
pub use imports::{ImportContext, DEFAULT_PACKAGE};
pub use index::{MethodInfo, ProjectSolver, TypeInfo};
pub use infer::{heuristic_return_type, infer_type, InferenceContext, Tier, TypeHint};
pub use normalize::{base_type, normalize, split_qualified, split_type};
pub use resolve::{CallResolver, CallSite, Resolution, ResolvedVia};
pub use solver::{Binding, NullSolver, ResolvedMethod, Scope, SymbolSolver};
