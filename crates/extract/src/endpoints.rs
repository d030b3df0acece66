use calltrail_resolver::{ImportContext, MethodIdentity};
use calltrail_syntax::{Annotation, MethodDecl, SourceUnit, TypeDecl};
use serde::{Deserialize, Serialize};

const CONTROLLER_ANNOTATIONS: &[&str] = &["RestController", "Controller"];

const MAPPING_ANNOTATIONS: &[&str] = &[
    "RequestMapping",
    "GetMapping",
    "PostMapping",
    "PutMapping",
    "DeleteMapping",
    "PatchMapping",
];

/// Verbs recognized in a `@RequestMapping(method = ...)` attribute, in
/// match order
const REQUEST_METHODS: &[&str] = &["GET", "POST", "PUT", "DELETE", "PATCH"];

/// An HTTP handler method of a Spring controller
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiEndpoint {
    /// Canonical identity of the handler, same form as the call graph keys
    pub method_metadata: String,
    pub http_verb: String,
    pub method_path: String,
    /// Path of the controller's `@RequestMapping`, empty if none
    pub class_mapping: String,
    pub full_path: String,
}

/// Collect the endpoints declared in a unit
pub fn extract_endpoints(unit: &SourceUnit) -> Vec<ApiEndpoint> {
    let imports = ImportContext::from_unit(unit);
    let mut endpoints = Vec::new();

    for decl in unit.all_types().into_iter().filter(|d| is_controller(d)) {
        let class_mapping = class_mapping(decl);
        for method in decl.methods.iter().filter(|m| !m.is_constructor) {
            if let Some(endpoint) = endpoint(&imports, decl, method, &class_mapping) {
                endpoints.push(endpoint);
            }
        }
    }

    if !endpoints.is_empty() {
        log::debug!(
            "{}: {} endpoints",
            unit.path.display(),
            endpoints.len()
        );
    }
    endpoints
}

fn is_controller(decl: &TypeDecl) -> bool {
    decl.annotations
        .iter()
        .any(|a| CONTROLLER_ANNOTATIONS.contains(&a.name.as_str()))
}

fn class_mapping(decl: &TypeDecl) -> String {
    decl.annotation("RequestMapping")
        .and_then(path_value)
        .unwrap_or_default()
}

fn endpoint(
    imports: &ImportContext,
    decl: &TypeDecl,
    method: &MethodDecl,
    class_mapping: &str,
) -> Option<ApiEndpoint> {
    // only the first mapping annotation counts
    let mapping = method
        .annotations
        .iter()
        .find(|a| MAPPING_ANNOTATIONS.contains(&a.name.as_str()))?;
    let method_path = path_value(mapping).unwrap_or_default();

    Some(ApiEndpoint {
        method_metadata: MethodIdentity::declared(imports, &decl.qualified_name, method)
            .to_string(),
        http_verb: http_verb(mapping),
        full_path: join_paths(class_mapping, &method_path),
        method_path,
        class_mapping: class_mapping.to_string(),
    })
}

fn http_verb(mapping: &Annotation) -> String {
    match mapping.name.as_str() {
        "RequestMapping" => mapping
            .attribute("method")
            .and_then(|value| REQUEST_METHODS.iter().find(|verb| value.contains(*verb)))
            .map_or_else(|| "ALL".to_string(), |verb| verb.to_string()),
        other => other.trim_end_matches("Mapping").to_uppercase(),
    }
}

/// Path from the single value or the `path`/`value` attribute, unquoted.
///
/// For an array of paths the first one is used.
fn path_value(annotation: &Annotation) -> Option<String> {
    let raw = annotation.value_of(&["path", "value"])?.trim();
    let first = match raw.strip_prefix('{') {
        Some(list) => list
            .trim_end_matches('}')
            .split(',')
            .next()
            .unwrap_or_default()
            .trim(),
        None => raw,
    };
    Some(unquote(first).to_string())
}

fn unquote(value: &str) -> &str {
    let value = value.strip_prefix('"').unwrap_or(value);
    value.strip_suffix('"').unwrap_or(value)
}

/// `/owners/` + `/{id}` -> `/owners/{id}`
pub fn join_paths(class_mapping: &str, method_path: &str) -> String {
    if class_mapping.is_empty() {
        return method_path.to_string();
    }
    format!(
        "{}/{}",
        class_mapping.trim_end_matches('/'),
        method_path.trim_start_matches('/')
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use calltrail_syntax::JavaParser;
    use pretty_assertions::assert_eq;

    fn extract(code: &str) -> Vec<ApiEndpoint> {
        let unit = JavaParser::new()
            .unwrap()
            .parse_source("OwnerController.java", code.to_string())
            .unwrap();
        extract_endpoints(&unit)
    }

    #[test]
    fn test_controller_endpoints() {
        let endpoints = extract(
            r#"
package app.web;

import app.model.Owner;
import org.springframework.web.bind.annotation.*;

@RestController
@RequestMapping("/owners/")
class OwnerController {
    @GetMapping("/{id}")
    public Owner show(@PathVariable int id) { return null; }

    @PostMapping(path = "/new")
    public void create(Owner owner) {}

    @RequestMapping(value = "/search", method = RequestMethod.PUT)
    public void search(String q) {}

    @RequestMapping
    public void any() {}

    @DeleteMapping({"/a", "/b"})
    public void remove() {}

    void helper() {}
}
"#,
        );

        let summary: Vec<(String, String, String)> = endpoints
            .iter()
            .map(|e| (e.http_verb.clone(), e.full_path.clone(), e.method_metadata.clone()))
            .collect();
        let row = |verb: &str, path: &str, id: &str| (verb.to_string(), path.to_string(), id.to_string());

        assert_eq!(
            summary,
            vec![
                row("GET", "/owners/{id}", "app.web.OwnerController.show(int)"),
                row("POST", "/owners/new", "app.web.OwnerController.create(app.model.Owner)"),
                row("PUT", "/owners/search", "app.web.OwnerController.search(java.lang.String)"),
                row("ALL", "/owners/", "app.web.OwnerController.any()"),
                row("DELETE", "/owners/a", "app.web.OwnerController.remove()"),
            ]
        );
        assert_eq!(endpoints[0].class_mapping, "/owners/");
        assert_eq!(endpoints[0].method_path, "/{id}");
    }

    #[test]
    fn test_non_controllers_ignored() {
        let endpoints = extract(
            r#"
package app;
@Service
class OwnerService {
    @GetMapping("/x")
    public void x() {}
}
"#,
        );
        assert!(endpoints.is_empty());
    }

    #[test]
    fn test_json_field_names() {
        let endpoints = extract(
            r#"
@Controller
class Home {
    @GetMapping("/")
    String index() { return "index"; }
}
"#,
        );
        let json = serde_json::to_value(&endpoints[0]).unwrap();
        assert_eq!(json["methodMetadata"], "default.Home.index()");
        assert_eq!(json["httpVerb"], "GET");
        assert_eq!(json["classMapping"], "");
        assert_eq!(json["fullPath"], "/");
    }

    #[test]
    fn test_join_paths() {
        assert_eq!(join_paths("", "/x"), "/x");
        assert_eq!(join_paths("/api/", "/x"), "/api/x");
        assert_eq!(join_paths("/api", "x"), "/api/x");
        assert_eq!(join_paths("/api", ""), "/api/");
    }
}
