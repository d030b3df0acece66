use calltrail_syntax::{is_java_source, JavaParser, SourceParser, SyntaxError};
use pretty_assertions::assert_eq;
use std::fs;
use tempfile::tempdir;

#[test]
fn parse_file_reads_from_disk() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("Cart.java");
    fs::write(
        &path,
        "package shop;\n\nclass Cart {\n    int total() {\n        return sum();\n    }\n}\n",
    )
    .unwrap();

    let unit = JavaParser::new().unwrap().parse_file(&path).unwrap();
    assert_eq!(unit.path, path);
    assert_eq!(unit.package.as_deref(), Some("shop"));

    let method = &unit.types[0].methods[0];
    assert_eq!((method.start_line, method.end_line), (4, 6));
    assert_eq!(
        unit.lines(method.start_line, method.end_line).as_deref(),
        Some("    int total() {\n        return sum();\n    }")
    );
}

#[test]
fn missing_file_is_an_io_error() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("Missing.java");

    let err = JavaParser::new().unwrap().parse_file(&path).unwrap_err();
    assert!(!err.is_parse_failure());
    match err {
        SyntaxError::Io { path: failed, .. } => assert_eq!(failed, path),
        other => panic!("expected an IO error, got {other}"),
    }
}

#[test]
fn broken_file_is_a_parse_failure() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("Broken.java");
    fs::write(&path, "package a;\nclass Broken {\n    void run() { helper( }\n}\n").unwrap();

    let err = JavaParser::new().unwrap().parse_file(&path).unwrap_err();
    assert!(err.is_parse_failure());
    assert!(err.to_string().contains("Broken.java"));
}

#[test]
fn one_parser_serves_many_files() {
    let dir = tempdir().unwrap();
    let mut parser = JavaParser::new().unwrap();

    for name in ["A", "B", "C"] {
        let path = dir.path().join(format!("{name}.java"));
        fs::write(&path, format!("class {name} {{ void go() {{ run(); }} }}")).unwrap();
        assert!(is_java_source(&path));

        let text = fs::read_to_string(&path).unwrap();
        let unit = SourceParser::parse(&mut parser, &path, text).unwrap();
        assert_eq!(unit.types[0].name, name);
        assert_eq!(unit.types[0].methods[0].calls[0].name, "run");
    }
    assert!(!is_java_source(&dir.path().join("notes.txt")));
}
