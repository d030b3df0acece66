use crate::error::{Result, SyntaxError};
use crate::lower::{first_error_line, Lowerer};
use crate::types::SourceUnit;
use std::path::{Path, PathBuf};
use tree_sitter::Parser;

/// Tree-sitter backed Java parser.
///
/// A parser holds mutable tree-sitter state, so each worker thread owns its
/// own instance.
pub struct JavaParser {
    parser: Parser,
}

impl JavaParser {
    pub fn new() -> Result<Self> {
        let language: tree_sitter::Language = tree_sitter_java::LANGUAGE.into();
        let mut parser = Parser::new();
        parser
            .set_language(&language)
            .map_err(|e| SyntaxError::tree_sitter(format!("Failed to set language: {e}")))?;
        Ok(Self { parser })
    }

    /// Read and parse a file
    pub fn parse_file(&mut self, path: &Path) -> Result<SourceUnit> {
        let source = std::fs::read_to_string(path).map_err(|source| SyntaxError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        self.parse_source(path, source)
    }

    /// Parse in-memory source. Any syntax error rejects the whole unit.
    pub fn parse_source(&mut self, path: impl Into<PathBuf>, source: String) -> Result<SourceUnit> {
        let path = path.into();
        let tree = self
            .parser
            .parse(&source, None)
            .ok_or_else(|| SyntaxError::tree_sitter("Parser returned no tree"))?;

        let root = tree.root_node();
        if root.has_error() {
            let line = first_error_line(root).unwrap_or(1);
            log::debug!("Syntax error in {} at line {}", path.display(), line);
            return Err(SyntaxError::Parse { path, line });
        }

        let lowered = Lowerer::new(&source).unit(root);

        Ok(SourceUnit {
            path,
            package: lowered.package,
            imports: lowered.imports,
            types: lowered.types,
            source,
        })
    }
}

/// Anything that can turn source text into a [`SourceUnit`]
pub trait SourceParser {
    fn parse(&mut self, path: &Path, text: String) -> Result<SourceUnit>;
}

impl SourceParser for JavaParser {
    fn parse(&mut self, path: &Path, text: String) -> Result<SourceUnit> {
        self.parse_source(path, text)
    }
}

/// Whether a path names a Java source file
pub fn is_java_source(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("java"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Expr, Literal, TypeKind};
    use pretty_assertions::assert_eq;

    fn parse(code: &str) -> SourceUnit {
        JavaParser::new()
            .unwrap()
            .parse_source("Test.java", code.to_string())
            .expect("valid java")
    }

    #[test]
    fn test_package_and_imports() {
        let unit = parse(
            r"
package a.b;

import java.util.List;
import static org.junit.Assert.assertEquals;
import x.y.*;

class Foo {}
",
        );

        assert_eq!(unit.package.as_deref(), Some("a.b"));
        assert_eq!(unit.imports.len(), 3);
        assert_eq!(unit.imports[0].path, "java.util.List");
        assert!(!unit.imports[0].is_static);
        assert!(unit.imports[1].is_static);
        assert_eq!(unit.imports[1].path, "org.junit.Assert.assertEquals");
        assert!(unit.imports[2].is_wildcard);
        assert_eq!(unit.imports[2].path, "x.y");
    }

    #[test]
    fn test_default_package() {
        let unit = parse("class Foo { void a() {} }");
        assert!(unit.package.is_none());
        assert_eq!(unit.types[0].name, "Foo");
        assert_eq!(unit.types[0].methods[0].name, "a");
    }

    #[test]
    fn test_method_params_and_varargs() {
        let unit = parse(
            r"
class Foo {
    public String join(List<String> parts, int n, String... rest) { return null; }
}
",
        );
        let method = &unit.types[0].methods[0];
        assert_eq!(method.return_type.as_deref(), Some("String"));
        let types: Vec<_> = method.params.iter().map(|p| p.type_name.as_str()).collect();
        assert_eq!(types, vec!["List<String>", "int", "String..."]);
        assert!(method.is_varargs());
    }

    #[test]
    fn test_calls_in_preorder() {
        let unit = parse(
            r"
class Foo {
    void run() {
        a.b().c();
        helper();
    }
}
",
        );
        let calls = &unit.types[0].methods[0].calls;
        let names: Vec<_> = calls.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, vec!["c", "b", "helper"]);

        let outer = &calls[0];
        let receiver = outer.receiver.as_ref().and_then(Expr::as_call).unwrap();
        assert_eq!(receiver.name, "b");
        assert_eq!(receiver.receiver, Some(Expr::Name("a".to_string())));
        assert!(calls[2].receiver.is_none());
        assert_eq!(calls[2].line, 5);
    }

    #[test]
    fn test_locals_and_lambda_calls() {
        let unit = parse(
            r#"
class Foo {
    void run(Repo repo) {
        List<String> xs = new ArrayList<>();
        var sb = new StringBuilder();
        for (Item item : repo.items()) {
            xs.forEach(x -> item.accept(x));
        }
        try (Reader r = open()) {
        } catch (IOException e) {
            e.printStackTrace();
        }
        "abc".length();
    }
}
"#,
        );
        let method = &unit.types[0].methods[0];
        let locals: Vec<_> = method
            .locals
            .iter()
            .map(|v| (v.name.as_str(), v.type_name.as_str()))
            .collect();
        assert_eq!(
            locals,
            vec![
                ("xs", "List<String>"),
                ("sb", "var"),
                ("item", "Item"),
                ("r", "Reader"),
                ("e", "IOException"),
            ]
        );
        assert_eq!(method.local("sb").unwrap().constructed_type.as_deref(), Some("StringBuilder"));

        let names: Vec<_> = method.calls.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, vec!["items", "forEach", "accept", "open", "printStackTrace", "length"]);
        assert_eq!(
            method.calls[5].receiver,
            Some(Expr::Literal(Literal::String))
        );
    }

    #[test]
    fn test_anonymous_class_calls_stay_in_enclosing_method() {
        let unit = parse(
            r"
class Outer {
    void start() {
        Runnable r = new Runnable() {
            public void run() { work(); }
        };
    }
}
",
        );
        let outer = &unit.types[0];
        let names: Vec<_> = outer.methods.iter().map(|m| m.name.as_str()).collect();
        assert_eq!(names, vec!["start"]);
        assert_eq!(outer.methods[0].calls.len(), 1);
        assert_eq!(outer.methods[0].calls[0].name, "work");
    }

    #[test]
    fn test_enum_constant_bodies_declare_nothing() {
        let unit = parse(
            r"
enum Op {
    PLUS { int apply() { return add(); } };
    int apply() { return 0; }
}
",
        );
        let op = &unit.types[0];
        assert_eq!(op.methods.len(), 1);
        assert!(op.methods[0].calls.is_empty());
    }

    #[test]
    fn test_local_classes_are_qualified_by_their_owner() {
        let unit = parse(
            r"
class Outer {
    void start() {
        class Helper { void help() { assist(); } }
        new Helper().help();
    }
}
",
        );
        let types = unit.all_types();
        let names: Vec<_> = types.iter().map(|t| t.qualified_name.as_str()).collect();
        assert_eq!(names, vec!["Outer", "Outer.Helper"]);

        let start = &types[0].methods[0];
        let calls: Vec<_> = start.calls.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(calls, vec!["help"]);
        assert_eq!(types[1].methods[0].calls[0].name, "assist");
    }

    #[test]
    fn test_nested_types_and_kinds() {
        let unit = parse(
            r"
public class Outer extends Base implements A, B {
    private Repo repo;
    interface Inner extends C { void x(); }
    enum Color { RED; void paint() {} }
    record Point(int x, int y) {}
}
",
        );
        let types = unit.all_types();
        let summary: Vec<_> = types.iter().map(|t| (t.name.as_str(), t.kind)).collect();
        assert_eq!(
            summary,
            vec![
                ("Outer", TypeKind::Class),
                ("Inner", TypeKind::Interface),
                ("Color", TypeKind::Enum),
                ("Point", TypeKind::Record),
            ]
        );
        let qualified: Vec<_> = types.iter().map(|t| t.qualified_name.as_str()).collect();
        assert_eq!(qualified, vec!["Outer", "Outer.Inner", "Outer.Color", "Outer.Point"]);
        assert_eq!(types[0].superclass.as_deref(), Some("Base"));
        assert_eq!(types[0].interfaces, vec!["A", "B"]);
        assert_eq!(types[0].field("repo").unwrap().type_name, "Repo");
        assert_eq!(types[1].interfaces, vec!["C"]);
        assert!(!types[1].methods[0].has_body);
        assert_eq!(types[2].methods[0].name, "paint");
        assert_eq!(types[3].fields.len(), 2);
    }

    #[test]
    fn test_annotations() {
        let unit = parse(
            r#"
@RestController
@RequestMapping("/owners")
class OwnerController {
    @GetMapping(value = "/{id}", produces = "json")
    String show() { return ""; }
}
"#,
        );
        let controller = &unit.types[0];
        assert!(controller.annotation("RestController").is_some());
        let mapping = controller.annotation("RequestMapping").unwrap();
        assert_eq!(mapping.value_of(&["path", "value"]), Some("\"/owners\""));

        let get = controller.methods[0].annotation("GetMapping").unwrap();
        assert_eq!(get.value_of(&["path", "value"]), Some("\"/{id}\""));
        assert_eq!(get.attribute("produces"), Some("\"json\""));
    }

    #[test]
    fn test_syntax_error_is_parse_failure() {
        let err = JavaParser::new()
            .unwrap()
            .parse_source("Broken.java", "class Broken { void a( { }".to_string())
            .unwrap_err();
        assert!(err.is_parse_failure());
    }

    #[test]
    fn test_is_java_source() {
        assert!(is_java_source(Path::new("src/Foo.java")));
        assert!(!is_java_source(Path::new("src/Foo.kt")));
        assert!(!is_java_source(Path::new("Makefile")));
    }
}
