use calltrail_syntax::SourceUnit;
use std::collections::HashMap;

/// Package name used for types declared without a `package` clause
pub const DEFAULT_PACKAGE: &str = "default";

/// Per-unit import table and package.
///
/// Built once when a unit is first visited and only read afterward.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ImportContext {
    package: Option<String>,
    /// Simple type name -> fully-qualified name
    types: HashMap<String, String>,
    /// Statically imported member -> owning type
    static_members: HashMap<String, String>,
    /// Owning types of `import static a.b.C.*`
    static_wildcards: Vec<String>,
    /// Packages of `import a.b.*`
    wildcard_packages: Vec<String>,
}

impl ImportContext {
    /// Empty context for a package (`None` = default package)
    pub fn new(package: Option<&str>) -> Self {
        Self {
            package: package.map(str::to_string),
            ..Self::default()
        }
    }

    pub fn from_unit(unit: &SourceUnit) -> Self {
        let mut ctx = Self::new(unit.package.as_deref());
        for import in &unit.imports {
            match (import.is_static, import.is_wildcard) {
                (false, false) => ctx.add_type(&import.path),
                (false, true) => ctx.wildcard_packages.push(import.path.clone()),
                (true, false) => {
                    if let Some((owner, member)) = import.path.rsplit_once('.') {
                        ctx.static_members
                            .entry(member.to_string())
                            .or_insert_with(|| owner.to_string());
                    }
                }
                (true, true) => ctx.static_wildcards.push(import.path.clone()),
            }
        }
        // member and local types are usable by simple name; imports win
        for decl in unit.all_types() {
            if decl.qualified_name.contains('.') {
                let fqn = ctx.in_package(&decl.qualified_name);
                ctx.types.entry(decl.name.clone()).or_insert(fqn);
            }
        }
        ctx
    }

    /// Builder: add a single-type import
    #[must_use]
    pub fn with_import(mut self, fqn: &str) -> Self {
        self.add_type(fqn);
        self
    }

    fn add_type(&mut self, fqn: &str) {
        let simple = fqn.rsplit('.').next().unwrap_or(fqn);
        // a unit cannot legally import two types with the same simple name
        self.types
            .entry(simple.to_string())
            .or_insert_with(|| fqn.to_string());
    }

    pub fn package(&self) -> Option<&str> {
        self.package.as_deref()
    }

    /// Package as it appears in identities
    pub fn package_name(&self) -> &str {
        self.package.as_deref().unwrap_or(DEFAULT_PACKAGE)
    }

    /// Import whose fully-qualified name ends with `.simple_name`
    pub fn lookup(&self, simple_name: &str) -> Option<&str> {
        self.types.get(simple_name).map(String::as_str)
    }

    /// Owning type of a statically imported member
    pub fn static_owner(&self, member: &str) -> Option<&str> {
        self.static_members.get(member).map(String::as_str)
    }

    pub fn static_wildcards(&self) -> &[String] {
        &self.static_wildcards
    }

    pub fn wildcard_packages(&self) -> &[String] {
        &self.wildcard_packages
    }

    /// Qualify a name declared in this unit's package
    pub fn in_package(&self, name: &str) -> String {
        match &self.package {
            Some(pkg) => format!("{pkg}.{name}"),
            None => name.to_string(),
        }
    }
}
