//! Receiver type inference.
//!
//! Each expression kind maps to a fixed, ordered slice of strategies. The
//! first strategy that produces a type wins; later ones are never consulted.

use crate::normalize::normalize;
use crate::solver::{Scope, SymbolSolver};
use calltrail_syntax::{CallExpr, Expr};
use once_cell::sync::Lazy;
use regex::Regex;
use std::fmt;

/// How a receiver type was obtained, most reliable first
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Tier {
    Exact,
    Heuristic,
    Imported,
    LocalVariable,
    Constructed,
}

impl Tier {
    pub const ALL: [Tier; 5] = [
        Tier::Exact,
        Tier::Heuristic,
        Tier::Imported,
        Tier::LocalVariable,
        Tier::Constructed,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Tier::Exact => "exact",
            Tier::Heuristic => "heuristic",
            Tier::Imported => "imported",
            Tier::LocalVariable => "local_variable",
            Tier::Constructed => "constructed",
        }
    }
}

impl fmt::Display for Tier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Inferred receiver type
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypeHint {
    pub fully_qualified_name: String,
    pub tier: Tier,
}

impl TypeHint {
    fn new(fully_qualified_name: impl Into<String>, tier: Tier) -> Self {
        Self {
            fully_qualified_name: fully_qualified_name.into(),
            tier,
        }
    }
}

/// Everything a strategy may consult
#[derive(Clone, Copy)]
pub struct InferenceContext<'a> {
    pub scope: &'a Scope<'a>,
    pub solver: &'a dyn SymbolSolver,
}

impl<'a> InferenceContext<'a> {
    pub fn new(scope: &'a Scope<'a>, solver: &'a dyn SymbolSolver) -> Self {
        Self { scope, solver }
    }
}

type Strategy = fn(&Expr, &InferenceContext) -> Option<TypeHint>;

const CALL_STRATEGIES: &[Strategy] = &[exact, chained_call];
const NAME_STRATEGIES: &[Strategy] = &[exact, imported, local_variable];
const NEW_STRATEGIES: &[Strategy] = &[exact, constructed];
const EXACT_ONLY: &[Strategy] = &[exact];

/// Most confident type of a receiver, or `None` when nothing applies
pub fn infer_type(receiver: Option<&Expr>, cx: &InferenceContext) -> Option<TypeHint> {
    let receiver = receiver?;
    strategies(receiver)
        .iter()
        .find_map(|strategy| strategy(receiver, cx))
}

fn strategies(expr: &Expr) -> &'static [Strategy] {
    match expr {
        Expr::Call(_) => CALL_STRATEGIES,
        Expr::Name(_) => NAME_STRATEGIES,
        Expr::New { .. } => NEW_STRATEGIES,
        Expr::This
        | Expr::Super
        | Expr::FieldAccess { .. }
        | Expr::Cast { .. }
        | Expr::Literal(_)
        | Expr::Other(_) => EXACT_ONLY,
    }
}

fn exact(expr: &Expr, cx: &InferenceContext) -> Option<TypeHint> {
    cx.solver
        .expression_type(expr, cx.scope)
        .map(|fqn| TypeHint::new(fqn, Tier::Exact))
}

/// Receiver is itself a call the solver could not type: the naming table,
/// then whatever the root of the chain yields.
///
/// The declared return type is already covered by `exact`, which asks the
/// solver for the call expression's type.
fn chained_call(expr: &Expr, cx: &InferenceContext) -> Option<TypeHint> {
    let inner = expr.as_call()?;

    if let Some(fqn) = heuristic_return_type(&inner.name) {
        log::debug!("Chained call {}() typed by name as {}", inner.name, fqn);
        return Some(TypeHint::new(fqn, Tier::Heuristic));
    }

    chain_root(inner, cx)
}

fn chain_root(inner: &CallExpr, cx: &InferenceContext) -> Option<TypeHint> {
    let hint = infer_type(inner.receiver.as_ref(), cx)?;
    log::debug!(
        "Chained call {}() typed by its root as {}",
        inner.name,
        hint.fully_qualified_name
    );
    Some(hint)
}

static NAMING_TABLE: Lazy<Vec<(Regex, &'static str)>> = Lazy::new(|| {
    [
        // conversions and getters only, never `flatMap` or `isSet`
        (r"^(to|as|get|find|load|fetch|list|read)\w*List$", "java.util.List"),
        (r"^((to|as|get)\w*|\w*[kK]ey|entry)Set$", "java.util.Set"),
        (r"^(to|as|get)\w*Map$", "java.util.Map"),
        (
            r"^(findAll|getAll|loadAll|fetchAll|listAll|queryAll|readAll)",
            "java.util.List",
        ),
        (r"^(stream|parallelStream)$", "java.util.stream.Stream"),
    ]
    .into_iter()
    .filter_map(|(pattern, fqn)| match Regex::new(pattern) {
        Ok(re) => Some((re, fqn)),
        Err(e) => {
            log::warn!("Invalid naming pattern {pattern}: {e}");
            None
        }
    })
    .collect()
});

/// Collection type suggested by a method name alone
pub fn heuristic_return_type(method_name: &str) -> Option<&'static str> {
    NAMING_TABLE
        .iter()
        .find(|(re, _)| re.is_match(method_name))
        .map(|(_, fqn)| *fqn)
}

/// A bare identifier naming an imported type (a static call receiver)
fn imported(expr: &Expr, cx: &InferenceContext) -> Option<TypeHint> {
    let Expr::Name(name) = expr else {
        return None;
    };
    // a variable of the same name shadows the import
    if cx.scope.binding(name).is_some() {
        return None;
    }
    cx.scope
        .imports
        .lookup(name)
        .map(|fqn| TypeHint::new(fqn, Tier::Imported))
}

fn local_variable(expr: &Expr, cx: &InferenceContext) -> Option<TypeHint> {
    let Expr::Name(name) = expr else {
        return None;
    };
    let raw = cx.scope.binding(name)?.declared_type()?;
    Some(TypeHint::new(
        normalize(&raw, cx.scope.imports),
        Tier::LocalVariable,
    ))
}

fn constructed(expr: &Expr, cx: &InferenceContext) -> Option<TypeHint> {
    let Expr::New { type_name } = expr else {
        return None;
    };
    Some(TypeHint::new(
        normalize(type_name, cx.scope.imports),
        Tier::Constructed,
    ))
}
