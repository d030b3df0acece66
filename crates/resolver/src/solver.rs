use crate::identity::MethodIdentity;
use crate::imports::ImportContext;
use calltrail_syntax::{CallExpr, Expr, MethodDecl, Param, TypeDecl, Variable};

/// Immutable context for resolving calls inside one method body
#[derive(Debug, Clone, Copy)]
pub struct Scope<'a> {
    pub imports: &'a ImportContext,
    /// Innermost named type declaring the method
    pub owner: &'a TypeDecl,
    pub method: &'a MethodDecl,
}

impl<'a> Scope<'a> {
    pub fn new(imports: &'a ImportContext, owner: &'a TypeDecl, method: &'a MethodDecl) -> Self {
        Self {
            imports,
            owner,
            method,
        }
    }

    /// Fully-qualified name of the enclosing type
    pub fn owner_fqn(&self) -> String {
        self.imports.in_package(&self.owner.qualified_name)
    }

    /// Declaration a bare name refers to: local, then parameter, then field
    pub fn binding(&self, name: &str) -> Option<Binding<'a>> {
        self.method
            .local(name)
            .map(Binding::Local)
            .or_else(|| self.method.param(name).map(Binding::Param))
            .or_else(|| self.owner.field(name).map(Binding::Field))
    }
}

/// Where a bare identifier was declared
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Binding<'a> {
    Local(&'a Variable),
    Param(&'a Param),
    Field(&'a Variable),
}

impl Binding<'_> {
    /// Raw declared type.
    ///
    /// `var` takes the constructed type of its initializer and is unknown
    /// otherwise; a varargs parameter is an array.
    pub fn declared_type(&self) -> Option<String> {
        let variable = match self {
            Self::Param(param) if param.varargs => {
                let element = param.type_name.trim_end_matches("...");
                return Some(format!("{element}[]"));
            }
            Self::Param(param) => return Some(param.type_name.clone()),
            Self::Local(var) | Self::Field(var) => var,
        };

        if variable.type_name == "var" {
            variable.constructed_type.clone()
        } else {
            Some(variable.type_name.clone())
        }
    }
}

/// A call target found by a symbol solver
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedMethod {
    pub identity: MethodIdentity,
    /// Fully-qualified return type, when declared
    pub return_type: Option<String>,
}

/// Type and call resolution backed by knowledge of declarations.
///
/// Implementations are built once and shared across worker threads.
pub trait SymbolSolver: Send + Sync {
    /// Exact fully-qualified type of an expression
    fn expression_type(&self, expr: &Expr, scope: &Scope) -> Option<String>;

    /// Declaration a call expression targets
    fn resolve_call(&self, call: &CallExpr, scope: &Scope) -> Option<ResolvedMethod>;
}

/// Solver that knows nothing; every lookup fails
#[derive(Debug, Clone, Copy, Default)]
pub struct NullSolver;

impl SymbolSolver for NullSolver {
    fn expression_type(&self, _expr: &Expr, _scope: &Scope) -> Option<String> {
        None
    }

    fn resolve_call(&self, _call: &CallExpr, _scope: &Scope) -> Option<ResolvedMethod> {
        None
    }
}
