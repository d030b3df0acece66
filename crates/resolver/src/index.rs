use crate::error::{ResolverError, Result};
use crate::identity::MethodIdentity;
use crate::imports::ImportContext;
use crate::normalize::{base_type, is_primitive, normalize, split_type, tidy};
use crate::solver::{ResolvedMethod, Scope, SymbolSolver};
use calltrail_syntax::{CallExpr, Expr, Literal, MethodDecl, SourceUnit, TypeDecl};
use std::collections::{HashMap, HashSet, VecDeque};
use std::fs::File;
use std::path::Path;

/// Indexed declaration of a project type
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypeInfo {
    /// `package.Outer.Inner` (no package prefix in the default package)
    pub fqn: String,
    /// Package as it appears in identities
    pub package_name: String,
    /// Dotted path through enclosing types
    pub type_name: String,
    pub superclass: Option<String>,
    pub interfaces: Vec<String>,
    /// Field name -> normalized type
    pub fields: HashMap<String, String>,
    pub methods: Vec<MethodInfo>,
}

/// Indexed method signature, types normalized in the declaring unit
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MethodInfo {
    pub name: String,
    pub params: Vec<String>,
    pub return_type: Option<String>,
    pub varargs: bool,
}

impl MethodInfo {
    fn from_decl(method: &MethodDecl, imports: &ImportContext) -> Self {
        Self {
            name: method.name.clone(),
            params: method
                .params
                .iter()
                .map(|p| normalize(&p.type_name, imports))
                .collect(),
            return_type: method.return_type.as_deref().map(|t| normalize(t, imports)),
            varargs: method.is_varargs(),
        }
    }

    fn accepts_arity(&self, args: usize) -> bool {
        if self.varargs {
            args + 1 >= self.params.len()
        } else {
            args == self.params.len()
        }
    }

    /// Parameter type expected at an argument position
    fn param_at(&self, idx: usize) -> Option<&str> {
        match self.params.get(idx) {
            Some(param) => Some(param.trim_end_matches("...")),
            None if self.varargs => self.params.last().map(|p| p.trim_end_matches("...")),
            None => None,
        }
    }
}

/// Symbol solver over every parsed project unit plus library type names.
///
/// Built once between parsing and graph building, then shared read-only.
#[derive(Debug, Default)]
pub struct ProjectSolver {
    types: HashMap<String, TypeInfo>,
    library_types: HashSet<String>,
}

impl ProjectSolver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_units<'a>(units: impl IntoIterator<Item = &'a SourceUnit>) -> Self {
        let mut solver = Self::new();
        for unit in units {
            solver.add_unit(unit);
        }
        solver
    }

    /// Index every type declared in a unit; the first declaration of a name wins
    pub fn add_unit(&mut self, unit: &SourceUnit) {
        let imports = ImportContext::from_unit(unit);
        for decl in unit.all_types() {
            let info = Self::index_type(decl, &imports);
            if self.types.contains_key(&info.fqn) {
                log::debug!(
                    "Duplicate declaration of {} in {}",
                    info.fqn,
                    unit.path.display()
                );
                continue;
            }
            self.types.insert(info.fqn.clone(), info);
        }
    }

    fn index_type(decl: &TypeDecl, imports: &ImportContext) -> TypeInfo {
        TypeInfo {
            fqn: imports.in_package(&decl.qualified_name),
            package_name: imports.package_name().to_string(),
            type_name: decl.qualified_name.clone(),
            superclass: decl.superclass.as_deref().map(|t| normalize(t, imports)),
            interfaces: decl
                .interfaces
                .iter()
                .map(|t| normalize(t, imports))
                .collect(),
            fields: decl
                .fields
                .iter()
                .map(|f| (f.name.clone(), normalize(&f.type_name, imports)))
                .collect(),
            methods: decl
                .methods
                .iter()
                .filter(|m| !m.is_constructor)
                .map(|m| MethodInfo::from_decl(m, imports))
                .collect(),
        }
    }

    /// Register the class entries of a `.jar`/`.zip` as known types.
    ///
    /// Returns the number of newly known type names.
    pub fn add_archive(&mut self, path: &Path) -> Result<usize> {
        let file = File::open(path).map_err(|source| ResolverError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let archive = zip::ZipArchive::new(file).map_err(|source| ResolverError::Archive {
            path: path.to_path_buf(),
            source,
        })?;

        let before = self.library_types.len();
        self.library_types
            .extend(archive.file_names().filter_map(class_entry_name));
        let added = self.library_types.len() - before;

        log::debug!("Loaded {} library types from {}", added, path.display());
        Ok(added)
    }

    /// Register a single library type name
    pub fn add_library_type(&mut self, fqn: impl Into<String>) {
        self.library_types.insert(fqn.into());
    }

    pub fn type_count(&self) -> usize {
        self.types.len()
    }

    pub fn library_type_count(&self) -> usize {
        self.library_types.len()
    }

    pub fn type_info(&self, fqn: &str) -> Option<&TypeInfo> {
        self.types.get(base_type(fqn))
    }

    /// Whether a type name denotes something real: a project or library
    /// type, a JDK type or a primitive
    pub fn is_known(&self, fqn: &str) -> bool {
        let base = base_type(fqn);
        is_primitive(base)
            || self.types.contains_key(base)
            || self.library_types.contains(base)
            || base.starts_with("java.")
            || base.starts_with("javax.")
    }

    /// Normalize a raw type name, falling back to wildcard-imported packages.
    ///
    /// Returns `None` when the name does not denote a known type.
    pub fn resolve_type_name(&self, raw: &str, imports: &ImportContext) -> Option<String> {
        let normalized = normalize(raw, imports);
        if self.is_known(&normalized) {
            return Some(normalized);
        }

        let (base, suffix) = split_type(raw);
        if base.contains('.') {
            return None;
        }
        imports
            .wildcard_packages()
            .iter()
            .map(|pkg| format!("{pkg}.{base}"))
            .find(|candidate| self.is_known(candidate))
            .map(|fqn| format!("{fqn}{}", tidy(suffix)))
    }

    /// The type and its supertypes, most derived first
    fn hierarchy(&self, fqn: &str) -> Vec<&TypeInfo> {
        let mut out = Vec::new();
        let mut visited = HashSet::new();
        let mut queue = VecDeque::from([base_type(fqn).to_string()]);

        while let Some(current) = queue.pop_front() {
            if !visited.insert(current.clone()) {
                continue;
            }
            let Some(info) = self.types.get(&current) else {
                continue;
            };
            out.push(info);
            queue.extend(
                info.superclass
                    .iter()
                    .chain(&info.interfaces)
                    .map(|t| base_type(t).to_string()),
            );
        }

        out
    }

    fn superclass_of(&self, fqn: &str) -> Option<String> {
        let info = self.types.get(base_type(fqn))?;
        Some(
            info.superclass
                .clone()
                .unwrap_or_else(|| "java.lang.Object".to_string()),
        )
    }

    fn field_type(&self, owner: &str, field: &str) -> Option<String> {
        let owner = base_type(owner);
        if let Some((_, _, ty)) = JDK_STATIC_FIELDS
            .iter()
            .find(|(ty, name, _)| *ty == owner && *name == field)
        {
            return Some(ty.to_string());
        }
        self.hierarchy(owner)
            .into_iter()
            .find_map(|info| info.fields.get(field))
            .filter(|ty| self.is_known(ty))
            .cloned()
    }

    /// Known type a bare or dotted name denotes when no variable claims it
    /// (`Math`, `Outer.Inner`, `java.util.Collections`)
    fn named_type(&self, name: &str, scope: &Scope) -> Option<String> {
        let last = name.rsplit('.').next().unwrap_or(name);
        if !last.starts_with(|c: char| c.is_ascii_uppercase()) {
            return None;
        }
        self.resolve_type_name(name, scope.imports)
    }

    /// Dotted text of a qualified-name receiver (`a.b.Utils`)
    fn dotted_name(expr: &Expr) -> Option<String> {
        match expr {
            Expr::Name(name) => Some(name.clone()),
            Expr::FieldAccess { object, field } => {
                Self::dotted_name(object).map(|prefix| format!("{prefix}.{field}"))
            }
            _ => None,
        }
    }

    /// Indexed type a receiver names directly, making the call static
    fn type_receiver(&self, receiver: &Expr, scope: &Scope) -> Option<String> {
        let name = match receiver {
            Expr::Name(name) => {
                if scope.binding(name).is_some()
                    || self.field_type(&scope.owner_fqn(), name).is_some()
                {
                    return None;
                }
                name.clone()
            }
            Expr::FieldAccess { .. } => Self::dotted_name(receiver)?,
            _ => return None,
        };
        self.named_type(&name, scope)
            .filter(|fqn| self.types.contains_key(base_type(fqn)))
    }

    fn find_method(&self, target: &str, call: &CallExpr, scope: &Scope) -> Option<ResolvedMethod> {
        let mut seen = HashSet::new();
        let candidates: Vec<(&TypeInfo, &MethodInfo)> = self
            .hierarchy(target)
            .into_iter()
            .flat_map(|info| info.methods.iter().map(move |m| (info, m)))
            .filter(|(_, m)| m.name == call.name && m.accepts_arity(call.arguments.len()))
            // an override hides the declarations above it
            .filter(|(_, m)| seen.insert(m.params.clone()))
            .collect();

        let chosen = match candidates.as_slice() {
            [] => return None,
            [only] => *only,
            _ => {
                let arg_types: Vec<Option<String>> = call
                    .arguments
                    .iter()
                    .map(|arg| self.expression_type(arg, scope))
                    .collect();
                let matching: Vec<_> = candidates
                    .iter()
                    .filter(|(_, m)| Self::arguments_match(m, &arg_types))
                    .collect();
                match matching.as_slice() {
                    [only] => **only,
                    _ => {
                        log::debug!(
                            "Ambiguous call {}() on {} ({} candidates)",
                            call.name,
                            target,
                            matching.len()
                        );
                        return None;
                    }
                }
            }
        };

        Some(self.resolved(chosen.0, chosen.1))
    }

    fn arguments_match(method: &MethodInfo, arg_types: &[Option<String>]) -> bool {
        arg_types.iter().enumerate().all(|(idx, arg)| {
            let (Some(arg), Some(param)) = (arg, method.param_at(idx)) else {
                return true;
            };
            base_type(arg) == base_type(param) || base_type(param) == "java.lang.Object"
        })
    }

    fn resolved(&self, owner: &TypeInfo, method: &MethodInfo) -> ResolvedMethod {
        ResolvedMethod {
            identity: MethodIdentity::new(
                owner.package_name.as_str(),
                owner.type_name.as_str(),
                method.name.as_str(),
                method.params.clone(),
            ),
            return_type: method
                .return_type
                .clone()
                .filter(|ty| ty != "void" && self.is_known(ty)),
        }
    }
}

impl SymbolSolver for ProjectSolver {
    fn expression_type(&self, expr: &Expr, scope: &Scope) -> Option<String> {
        match expr {
            Expr::This => Some(scope.owner_fqn()),
            Expr::Super => self.superclass_of(&scope.owner_fqn()),
            Expr::Name(name) => match scope.binding(name) {
                Some(binding) => binding
                    .declared_type()
                    .and_then(|raw| self.resolve_type_name(&raw, scope.imports)),
                None => self
                    .field_type(&scope.owner_fqn(), name)
                    .or_else(|| self.named_type(name, scope)),
            },
            Expr::FieldAccess { object, field } => self
                .expression_type(object, scope)
                .and_then(|owner| self.field_type(&owner, field))
                .or_else(|| {
                    Self::dotted_name(expr).and_then(|dotted| self.named_type(&dotted, scope))
                }),
            Expr::Call(call) => self.resolve_call(call, scope)?.return_type,
            Expr::New { type_name } | Expr::Cast { type_name, .. } => {
                self.resolve_type_name(type_name, scope.imports)
            }
            Expr::Literal(literal) => literal_type(*literal).map(str::to_string),
            Expr::Other(_) => None,
        }
    }

    fn resolve_call(&self, call: &CallExpr, scope: &Scope) -> Option<ResolvedMethod> {
        let Some(receiver) = &call.receiver else {
            return self
                .find_method(&scope.owner_fqn(), call, scope)
                .or_else(|| {
                    let owner = scope.imports.static_owner(&call.name)?;
                    self.find_method(owner, call, scope)
                })
                .or_else(|| {
                    scope
                        .imports
                        .static_wildcards()
                        .iter()
                        .find_map(|owner| self.find_method(owner, call, scope))
                });
        };

        let target = match receiver {
            Expr::Super => self.superclass_of(&scope.owner_fqn())?,
            _ => match self.type_receiver(receiver, scope) {
                Some(fqn) => fqn,
                None => self.expression_type(receiver, scope)?,
            },
        };

        self.find_method(&target, call, scope)
    }
}

/// JDK static fields commonly used as call receivers: (owner, field, type)
const JDK_STATIC_FIELDS: &[(&str, &str, &str)] = &[
    ("java.lang.System", "out", "java.io.PrintStream"),
    ("java.lang.System", "err", "java.io.PrintStream"),
    ("java.lang.System", "in", "java.io.InputStream"),
];

fn literal_type(literal: Literal) -> Option<&'static str> {
    match literal {
        Literal::String => Some("java.lang.String"),
        Literal::Char => Some("char"),
        Literal::Int => Some("int"),
        Literal::Long => Some("long"),
        Literal::Float => Some("float"),
        Literal::Double => Some("double"),
        Literal::Boolean => Some("boolean"),
        Literal::Class => Some("java.lang.Class"),
        Literal::Null => None,
    }
}

/// Dotted type name of an archive entry, for named classes only
fn class_entry_name(entry: &str) -> Option<String> {
    let path = entry.strip_suffix(".class")?;
    let path = match path.strip_prefix("META-INF/versions/") {
        // multi-release jars: META-INF/versions/<n>/a/b/C.class
        Some(versioned) => versioned.split_once('/')?.1,
        None if path.starts_with("META-INF/") => return None,
        None => path,
    };

    let simple = path.rsplit('/').next().unwrap_or(path);
    if matches!(simple, "module-info" | "package-info") {
        return None;
    }

    let mut segments = simple.split('$');
    segments.next();
    // `Outer$1` and `Outer$1Local` are anonymous or local classes
    if segments.any(|s| s.is_empty() || s.starts_with(|c: char| c.is_ascii_digit())) {
        return None;
    }

    Some(path.replace(['/', '$'], "."))
}

#[cfg(test)]
mod tests {
    use super::*;
    use calltrail_syntax::JavaParser;
    use pretty_assertions::assert_eq;
    use std::io::Write;

    fn parse(path: &str, code: &str) -> SourceUnit {
        JavaParser::new()
            .unwrap()
            .parse_source(path, code.to_string())
            .unwrap()
    }

    fn project() -> (ProjectSolver, SourceUnit) {
        let repo = parse(
            "Repo.java",
            r"
package a.data;
import java.util.List;
public class Repo extends BaseRepo {
    public List<Owner> findAll() { return null; }
    public Owner find(int id) { return null; }
    public Owner find(String name) { return null; }
}
",
        );
        let base = parse(
            "BaseRepo.java",
            r"
package a.data;
public class BaseRepo {
    protected Session session;
    public void flush() {}
}
",
        );
        let owner = parse(
            "Owner.java",
            r"
package a.data;
public class Owner {
    public String name() { return null; }
}
",
        );
        let service = parse(
            "Service.java",
            r"
package a.web;
import a.data.Repo;
public class Service {
    private Repo repo;
    void handle(String name) {
        repo.find(name).name();
        repo.find(7);
        repo.flush();
        helper();
        Repo.class.getName();
    }
    private void helper() {}
}
",
        );
        let solver = ProjectSolver::from_units([&repo, &base, &owner, &service]);
        (solver, service)
    }

    fn with_scope<R>(unit: &SourceUnit, f: impl FnOnce(&Scope) -> R) -> R {
        let imports = ImportContext::from_unit(unit);
        let owner = &unit.types[0];
        let scope = Scope::new(&imports, owner, &owner.methods[0]);
        f(&scope)
    }

    #[test]
    fn test_index_contents() {
        let (solver, _) = project();
        assert_eq!(solver.type_count(), 4);
        let repo = solver.type_info("a.data.Repo").unwrap();
        assert_eq!(repo.superclass.as_deref(), Some("a.data.BaseRepo"));
        assert_eq!(repo.methods[0].return_type.as_deref(), Some("java.util.List<Owner>"));
        assert!(solver.is_known("java.util.Map<K, V>"));
        assert!(solver.is_known("int[]"));
        assert!(!solver.is_known("org.Unknown"));
    }

    #[test]
    fn test_resolve_calls() {
        let (solver, service) = project();
        let calls = &service.types[0].methods[0].calls;
        let resolved: Vec<Option<String>> = with_scope(&service, |scope| {
            calls
                .iter()
                .map(|c| solver.resolve_call(c, scope).map(|r| r.identity.to_string()))
                .collect()
        });

        assert_eq!(
            resolved,
            vec![
                // pre-order: the outer `name()` comes first
                Some("a.data.Owner.name()".to_string()),
                Some("a.data.Repo.find(java.lang.String)".to_string()),
                Some("a.data.Repo.find(int)".to_string()),
                Some("a.data.BaseRepo.flush()".to_string()),
                Some("a.web.Service.helper()".to_string()),
                None,
            ]
        );
    }

    #[test]
    fn test_expression_types() {
        let (solver, service) = project();
        with_scope(&service, |scope| {
            let ty = |expr: Expr| solver.expression_type(&expr, scope);
            assert_eq!(ty(Expr::This).as_deref(), Some("a.web.Service"));
            assert_eq!(ty(Expr::Super).as_deref(), Some("java.lang.Object"));
            assert_eq!(ty(Expr::Name("repo".into())).as_deref(), Some("a.data.Repo"));
            assert_eq!(ty(Expr::Name("name".into())).as_deref(), Some("java.lang.String"));
            assert_eq!(ty(Expr::Literal(Literal::Long)).as_deref(), Some("long"));
            assert_eq!(ty(Expr::Literal(Literal::Null)), None);
            assert_eq!(
                ty(Expr::FieldAccess {
                    object: Box::new(Expr::Name("repo".into())),
                    field: "session".into(),
                }),
                None
            );
            assert_eq!(
                ty(Expr::New {
                    type_name: "Repo".into()
                })
                .as_deref(),
                Some("a.data.Repo")
            );
        });
    }

    #[test]
    fn test_static_call_on_type_name() {
        let (mut solver, _) = project();
        let util = parse(
            "Util.java",
            r"
package a.util;
public class Util {
    public static int sum(int... xs) { return 0; }
}
",
        );
        let caller = parse(
            "Caller.java",
            r"
package a.util;
class Caller {
    void run() {
        Util.sum();
        Util.sum(1, 2, 3);
        a.util.Util.sum(1);
    }
}
",
        );
        solver.add_unit(&util);
        solver.add_unit(&caller);

        let calls = &caller.types[0].methods[0].calls;
        with_scope(&caller, |scope| {
            for call in calls {
                assert_eq!(
                    solver.resolve_call(call, scope).map(|r| r.identity.to_string()),
                    Some("a.util.Util.sum(int...)".to_string())
                );
            }
        });
    }

    #[test]
    fn test_nested_types_resolve_by_path() {
        let unit = parse(
            "Outer.java",
            r"
package a;
class Outer {
    Inner inner;
    void run() {
        inner.go();
        Inner.make();
        Outer.Inner.make();
    }
    static class Inner {
        void go() {}
        static Inner make() { return null; }
    }
}
",
        );
        let solver = ProjectSolver::from_units([&unit]);
        assert!(solver.type_info("a.Outer.Inner").is_some());
        assert!(solver.type_info("a.Inner").is_none());

        let calls = &unit.types[0].methods[0].calls;
        let resolved: Vec<Option<String>> = with_scope(&unit, |scope| {
            calls
                .iter()
                .map(|c| solver.resolve_call(c, scope).map(|r| r.identity.to_string()))
                .collect()
        });
        assert_eq!(
            resolved,
            vec![
                Some("a.Outer.Inner.go()".to_string()),
                Some("a.Outer.Inner.make()".to_string()),
                Some("a.Outer.Inner.make()".to_string()),
            ]
        );
    }

    #[test]
    fn test_jdk_type_names_have_types() {
        let unit = parse(
            "Main.java",
            r"
package app;
import java.util.Collections;
class Main {
    int Math;
    void run() {}
}
",
        );
        let solver = ProjectSolver::from_units([&unit]);
        with_scope(&unit, |scope| {
            let ty = |expr: Expr| solver.expression_type(&expr, scope);
            let name = |n: &str| Expr::Name(n.to_string());
            let field = |object: Expr, f: &str| Expr::FieldAccess {
                object: Box::new(object),
                field: f.to_string(),
            };

            assert_eq!(ty(name("String")).as_deref(), Some("java.lang.String"));
            assert_eq!(ty(name("Collections")).as_deref(), Some("java.util.Collections"));
            assert_eq!(
                ty(field(name("System"), "out")).as_deref(),
                Some("java.io.PrintStream")
            );
            assert_eq!(
                ty(field(field(name("java"), "util"), "Objects")).as_deref(),
                Some("java.util.Objects")
            );
            // the field shadows the type name
            assert_eq!(ty(name("Math")).as_deref(), Some("int"));
            assert_eq!(ty(name("Unknown")), None);
            assert_eq!(ty(name("lower")), None);
        });
    }

    #[test]
    fn test_class_entry_name() {
        assert_eq!(class_entry_name("a/b/C.class").as_deref(), Some("a.b.C"));
        assert_eq!(class_entry_name("a/b/C$Inner.class").as_deref(), Some("a.b.C.Inner"));
        assert_eq!(class_entry_name("a/b/C$1.class"), None);
        assert_eq!(class_entry_name("a/b/C$1Local.class"), None);
        assert_eq!(class_entry_name("module-info.class"), None);
        assert_eq!(class_entry_name("a/package-info.class"), None);
        assert_eq!(class_entry_name("a/b/readme.txt"), None);
        assert_eq!(
            class_entry_name("META-INF/versions/11/a/b/C.class").as_deref(),
            Some("a.b.C")
        );
    }

    #[test]
    fn test_add_archive() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("lib.jar");
        let mut writer = zip::ZipWriter::new(File::create(&path).unwrap());
        let options = zip::write::SimpleFileOptions::default();
        for name in ["org/lib/Client.class", "org/lib/Client$Builder.class", "META-INF/MANIFEST.MF"] {
            writer.start_file(name, options).unwrap();
            writer.write_all(b"\xca\xfe\xba\xbe").unwrap();
        }
        writer.finish().unwrap();

        let mut solver = ProjectSolver::new();
        assert_eq!(solver.add_archive(&path).unwrap(), 2);
        assert!(solver.is_known("org.lib.Client"));
        assert!(solver.is_known("org.lib.Client.Builder"));

        let imports = ImportContext::new(Some("app")).with_import("org.lib.Client");
        assert_eq!(
            solver.resolve_type_name("Client", &imports).as_deref(),
            Some("org.lib.Client")
        );
    }

    #[test]
    fn test_add_archive_rejects_non_zip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("broken.jar");
        std::fs::write(&path, b"not a zip").unwrap();

        let err = ProjectSolver::new().add_archive(&path).unwrap_err();
        assert!(matches!(err, ResolverError::Archive { .. }));
    }

    #[test]
    fn test_wildcard_import_fallback() {
        let mut solver = ProjectSolver::new();
        solver.add_library_type("org.lib.Client");
        let unit = parse("A.java", "package app;\nimport org.lib.*;\nclass A {}\n");
        let imports = ImportContext::from_unit(&unit);
        assert_eq!(
            solver.resolve_type_name("Client<String>", &imports).as_deref(),
            Some("org.lib.Client<String>")
        );
        assert_eq!(solver.resolve_type_name("Missing", &imports), None);
    }
}
