use crate::imports::ImportContext;
use crate::normalize::{normalize, split_qualified};
use calltrail_syntax::MethodDecl;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Package and type name of the sentinel identity
pub const UNRESOLVED: &str = "UNRESOLVED";

/// Canonical identity of a method: `package.Type.method(p1, p2)`.
///
/// The string form is the same whichever resolution tier produced it, so
/// it can be used as a join key across outputs.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct MethodIdentity {
    pub package_name: String,
    pub type_name: String,
    pub method_name: String,
    pub parameter_types: Vec<String>,
}

impl MethodIdentity {
    pub fn new(
        package_name: impl Into<String>,
        type_name: impl Into<String>,
        method_name: impl Into<String>,
        parameter_types: Vec<String>,
    ) -> Self {
        Self {
            package_name: package_name.into(),
            type_name: type_name.into(),
            method_name: method_name.into(),
            parameter_types,
        }
    }

    /// `UNRESOLVED.UNRESOLVED.name()`
    pub fn unresolved(method_name: &str) -> Self {
        Self::new(UNRESOLVED, UNRESOLVED, method_name, Vec::new())
    }

    pub fn is_unresolved(&self) -> bool {
        self.package_name == UNRESOLVED && self.type_name == UNRESOLVED
    }

    /// Parameterless identity on a fully-qualified type
    pub fn on_type(type_fqn: &str, method_name: &str) -> Self {
        let (package_name, type_name) = split_qualified(type_fqn);
        Self::new(package_name, type_name, method_name, Vec::new())
    }

    /// Identity of a declared method, parameters normalized in its unit
    pub fn declared(imports: &ImportContext, owner: &str, method: &MethodDecl) -> Self {
        Self::new(
            imports.package_name(),
            owner,
            method.name.as_str(),
            method
                .params
                .iter()
                .map(|p| normalize(&p.type_name, imports))
                .collect(),
        )
    }

    /// `package.Type`
    pub fn qualified_type(&self) -> String {
        format!("{}.{}", self.package_name, self.type_name)
    }
}

impl fmt::Display for MethodIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}.{}.{}({})",
            self.package_name,
            self.type_name,
            self.method_name,
            self.parameter_types.join(", ")
        )
    }
}
