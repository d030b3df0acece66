use crate::identity::MethodIdentity;
use crate::infer::{infer_type, InferenceContext, Tier};
use crate::solver::{Scope, SymbolSolver};
use calltrail_syntax::CallExpr;

/// One call expression seen from its caller
#[derive(Debug, Clone, Copy)]
pub struct CallSite<'a> {
    pub caller: &'a MethodIdentity,
    pub call: &'a CallExpr,
}

/// Which fallback produced an identity
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResolvedVia {
    /// The symbol solver found the declaration
    Exact,
    /// No receiver: assumed to be a method of the enclosing type
    Enclosing,
    /// Receiver type inferred
    Inferred(Tier),
    Unresolved,
}

impl ResolvedVia {
    pub fn as_str(&self) -> &'static str {
        match self {
            ResolvedVia::Exact => "exact",
            ResolvedVia::Enclosing => "enclosing",
            ResolvedVia::Inferred(tier) => tier.as_str(),
            ResolvedVia::Unresolved => "unresolved",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resolution {
    pub identity: MethodIdentity,
    pub via: ResolvedVia,
}

/// Maps call sites to callee identities, degrading through fallbacks
/// instead of failing
pub struct CallResolver<'a> {
    solver: &'a dyn SymbolSolver,
}

impl<'a> CallResolver<'a> {
    pub fn new(solver: &'a dyn SymbolSolver) -> Self {
        Self { solver }
    }

    /// Callee identity; always returns exactly one
    pub fn resolve(&self, site: &CallSite, scope: &Scope) -> MethodIdentity {
        self.resolve_traced(site, scope).identity
    }

    /// Callee identity together with the fallback that produced it
    pub fn resolve_traced(&self, site: &CallSite, scope: &Scope) -> Resolution {
        let call = site.call;
        let resolution = self.resolve_inner(call, scope);

        log::trace!(
            "{} -> {} [{}] line {}",
            site.caller,
            resolution.identity,
            resolution.via.as_str(),
            call.line
        );
        resolution
    }

    fn resolve_inner(&self, call: &CallExpr, scope: &Scope) -> Resolution {
        if let Some(resolved) = self.solver.resolve_call(call, scope) {
            return Resolution {
                identity: resolved.identity,
                via: ResolvedVia::Exact,
            };
        }

        let Some(receiver) = &call.receiver else {
            return Resolution {
                identity: MethodIdentity::new(
                    scope.imports.package_name(),
                    scope.owner.qualified_name.as_str(),
                    call.name.as_str(),
                    Vec::new(),
                ),
                via: ResolvedVia::Enclosing,
            };
        };

        let cx = InferenceContext::new(scope, self.solver);
        match infer_type(Some(receiver), &cx) {
            Some(hint) => Resolution {
                identity: MethodIdentity::on_type(&hint.fully_qualified_name, &call.name),
                via: ResolvedVia::Inferred(hint.tier),
            },
            None => {
                log::debug!(
                    "Unresolved call {}() at line {}: receiver type unknown",
                    call.name,
                    call.line
                );
                Resolution {
                    identity: MethodIdentity::unresolved(&call.name),
                    via: ResolvedVia::Unresolved,
                }
            }
        }
    }
}
