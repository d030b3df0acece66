use calltrail_resolver::{ImportContext, MethodIdentity};
use calltrail_syntax::SourceUnit;
use std::collections::BTreeMap;

/// Method identity -> source text of the declaration
pub type SnippetMap = BTreeMap<String, String>;

/// Source text of every method in a unit, keyed like the call graph.
///
/// The text spans the declaration's full lines, annotations included.
/// Overloads that normalize to the same identity keep the first body.
pub fn extract_snippets(unit: &SourceUnit) -> SnippetMap {
    let imports = ImportContext::from_unit(unit);
    let mut snippets = SnippetMap::new();

    for owner in unit.all_types() {
        for method in owner.methods.iter().filter(|m| !m.is_constructor) {
            let Some(code) = unit.lines(method.start_line, method.end_line) else {
                log::warn!(
                    "{}: no source for {} at lines {}-{}",
                    unit.path.display(),
                    method.name,
                    method.start_line,
                    method.end_line
                );
                continue;
            };
            let key =
                MethodIdentity::declared(&imports, &owner.qualified_name, method).to_string();
            snippets.entry(key).or_insert(code);
        }
    }

    snippets
}

#[cfg(test)]
mod tests {
    use super::*;
    use calltrail_syntax::JavaParser;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_method_text_by_lines() {
        let unit = JavaParser::new()
            .unwrap()
            .parse_source(
                "Foo.java",
                r"package a;
class Foo {
    Foo() {}

    @Override
    public String toString() {
        return name();
    }

    abstract int size(java.util.List<String> xs);
}
"
                .to_string(),
            )
            .unwrap();

        let snippets = extract_snippets(&unit);
        assert_eq!(snippets.len(), 2);
        assert_eq!(
            snippets["a.Foo.toString()"],
            "    @Override\n    public String toString() {\n        return name();\n    }"
        );
        assert_eq!(
            snippets["a.Foo.size(java.util.List<String>)"],
            "    abstract int size(java.util.List<String> xs);"
        );
    }

    #[test]
    fn test_nested_type_methods_keyed_by_path() {
        let unit = JavaParser::new()
            .unwrap()
            .parse_source(
                "Outer.java",
                r"package a;
class Outer {
    void go() {}
    static class Inner {
        void go() { new Runnable() { public void run() {} }; }
    }
}
"
                .to_string(),
            )
            .unwrap();

        let snippets = extract_snippets(&unit);
        let keys: Vec<&str> = snippets.keys().map(String::as_str).collect();
        assert_eq!(keys, vec!["a.Outer.Inner.go()", "a.Outer.go()"]);
        assert_eq!(
            snippets["a.Outer.Inner.go()"],
            "        void go() { new Runnable() { public void run() {} }; }"
        );
    }
}
