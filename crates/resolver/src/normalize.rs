//! Raw type text -> fully-qualified type name.
//!
//! Lookup order: primitives, already-qualified names, `java.lang` built-ins,
//! single-type imports, then the unit's own package. Generic arguments and
//! array markers are split off for the lookup and re-attached unchanged.

use crate::imports::{ImportContext, DEFAULT_PACKAGE};

pub const PRIMITIVES: &[&str] = &[
    "byte", "short", "int", "long", "float", "double", "boolean", "char", "void",
];

/// Namespace of types usable without an import
pub const BUILTIN_NAMESPACE: &str = "java.lang";

pub const BUILTIN_TYPES: &[&str] = &[
    "String",
    "Object",
    "Integer",
    "Long",
    "Double",
    "Float",
    "Short",
    "Byte",
    "Character",
    "Boolean",
    "Number",
    "Class",
    "Void",
    "Iterable",
    "Runnable",
    "Exception",
    "RuntimeException",
    "Throwable",
    "Thread",
    "StringBuilder",
    "Math",
    "System",
    "Enum",
    "Record",
    "Comparable",
    "CharSequence",
];

pub fn is_primitive(name: &str) -> bool {
    PRIMITIVES.contains(&name)
}

pub fn is_builtin(name: &str) -> bool {
    BUILTIN_TYPES.contains(&name)
}

/// Normalize a raw type name against a unit's imports
pub fn normalize(raw: &str, imports: &ImportContext) -> String {
    let tidied = tidy(raw);
    let (base, suffix) = split_type(&tidied);

    if base.is_empty() || base.starts_with('?') || is_primitive(base) {
        return tidied;
    }

    if let Some((head, rest)) = base.split_once('.') {
        if in_own_package(base, imports) || !starts_uppercase(head) {
            return tidied;
        }
        // `Map.Entry`, `Outer.Inner`: qualify the outer type
        if let Some(fqn) = imports.lookup(head) {
            return format!("{fqn}.{rest}{suffix}");
        }
        if is_builtin(head) {
            return format!("{BUILTIN_NAMESPACE}.{tidied}");
        }
        return imports.in_package(&tidied);
    }

    if is_builtin(base) {
        return format!("{BUILTIN_NAMESPACE}.{tidied}");
    }

    if let Some(fqn) = imports.lookup(base) {
        return format!("{fqn}{suffix}");
    }

    imports.in_package(&tidied)
}

fn in_own_package(base: &str, imports: &ImportContext) -> bool {
    imports.package().is_some_and(|pkg| {
        base.strip_prefix(pkg)
            .is_some_and(|rest| rest.starts_with('.'))
    })
}

fn starts_uppercase(segment: &str) -> bool {
    segment.chars().next().is_some_and(char::is_uppercase)
}

/// Split `List<String>[]` into (`List`, `<String>[]`).
///
/// The suffix starts at the first generic bracket or array/varargs marker.
pub fn split_type(raw: &str) -> (&str, &str) {
    let cut = raw.find(&['<', '['][..]).into_iter().chain(raw.find("...")).min();
    match cut {
        Some(idx) => (raw[..idx].trim(), &raw[idx..]),
        None => (raw.trim(), ""),
    }
}

/// Type name without generic arguments or array markers
pub fn base_type(raw: &str) -> &str {
    split_type(raw).0
}

/// Split a qualified type into (package, simple type) for identities.
///
/// Generic and array suffixes are dropped; a name with no dots belongs to
/// the default package.
pub fn split_qualified(fqn: &str) -> (String, String) {
    let base = base_type(fqn);
    match base.rsplit_once('.') {
        Some((package, name)) => (package.to_string(), name.to_string()),
        None => (DEFAULT_PACKAGE.to_string(), base.to_string()),
    }
}

/// Canonical spacing: `Map<String ,Integer >` -> `Map<String, Integer>`
pub fn tidy(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    let mut pending_space = false;

    for ch in raw.trim().chars() {
        if ch.is_whitespace() {
            pending_space = true;
            continue;
        }
        if pending_space && out.chars().last().is_some_and(is_word_char) && is_word_char(ch) {
            out.push(' ');
        }
        pending_space = false;
        out.push(ch);
        if ch == ',' {
            out.push(' ');
        }
    }

    out
}

fn is_word_char(ch: char) -> bool {
    ch.is_alphanumeric() || matches!(ch, '_' | '$' | '?' | '@')
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn ctx() -> ImportContext {
        ImportContext::new(Some("a.b"))
            .with_import("java.util.List")
            .with_import("java.util.Map")
            .with_import("x.y.ListType")
    }

    #[test]
    fn test_primitives_pass_through() {
        assert_eq!(normalize("int", &ctx()), "int");
        assert_eq!(normalize("boolean[]", &ctx()), "boolean[]");
        assert_eq!(normalize("void", &ctx()), "void");
    }

    #[test]
    fn test_builtins_get_java_lang() {
        assert_eq!(normalize("String", &ctx()), "java.lang.String");
        assert_eq!(normalize("String...", &ctx()), "java.lang.String...");
        assert_eq!(normalize("Integer[]", &ctx()), "java.lang.Integer[]");
    }

    #[test]
    fn test_imports_keep_generic_suffix() {
        assert_eq!(normalize("List<Owner>", &ctx()), "java.util.List<Owner>");
        assert_eq!(
            normalize("Map<String,Integer>", &ctx()),
            "java.util.Map<String, Integer>"
        );
        assert_eq!(normalize("ListType", &ctx()), "x.y.ListType");
    }

    #[test]
    fn test_nested_type_through_import() {
        assert_eq!(normalize("Map.Entry<K, V>", &ctx()), "java.util.Map.Entry<K, V>");
        assert_eq!(normalize("Outer.Inner", &ctx()), "a.b.Outer.Inner");
    }

    #[test]
    fn test_same_package_fallback() {
        assert_eq!(normalize("Owner", &ctx()), "a.b.Owner");
        assert_eq!(normalize("Owner", &ImportContext::new(None)), "Owner");
    }

    #[test]
    fn test_qualified_names_are_fixed_points() {
        let inputs = [
            "int",
            "String",
            "List<Owner>",
            "Map <String , List<Integer>>",
            "Map.Entry",
            "Owner",
            "Outer.Inner[]",
            "java.util.Optional<Owner>",
            "x.y.ListType",
            "T",
            "String...",
            "? extends Number",
        ];
        for ctx in [ctx(), ImportContext::new(None)] {
            for raw in inputs {
                let once = normalize(raw, &ctx);
                assert_eq!(normalize(&once, &ctx), once, "not a fixed point for {raw}");
            }
        }
    }

    #[test]
    fn test_split_type() {
        assert_eq!(split_type("List<String>"), ("List", "<String>"));
        assert_eq!(split_type("int[][]"), ("int", "[][]"));
        assert_eq!(split_type("String..."), ("String", "..."));
        assert_eq!(split_type("a.b.C"), ("a.b.C", ""));
    }

    #[test]
    fn test_split_qualified() {
        assert_eq!(
            split_qualified("java.util.List<Owner>"),
            ("java.util".to_string(), "List".to_string())
        );
        assert_eq!(
            split_qualified("Foo"),
            (DEFAULT_PACKAGE.to_string(), "Foo".to_string())
        );
    }

    #[test]
    fn test_tidy() {
        assert_eq!(tidy(" Map< String ,Integer > "), "Map<String, Integer>");
        assert_eq!(tidy("List<? extends  Number>"), "List<? extends Number>");
        assert_eq!(tidy("int [ ]"), "int[]");
    }
}
