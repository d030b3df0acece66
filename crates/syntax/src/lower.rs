use crate::types::{
    Annotation, AnnotationArg, CallExpr, Expr, Import, Literal, MethodDecl, Param, TypeDecl,
    TypeKind, Variable,
};
use tree_sitter::Node;

/// Lowers a tree-sitter Java syntax tree into the [`crate::SourceUnit`] model
pub(crate) struct Lowerer<'s> {
    source: &'s str,
}

/// Everything found while walking one body
#[derive(Default)]
struct BodyWalk {
    locals: Vec<Variable>,
    calls: Vec<CallExpr>,
    /// Local named types declared inside the body
    nested_types: Vec<TypeDecl>,
}

pub(crate) struct LoweredUnit {
    pub package: Option<String>,
    pub imports: Vec<Import>,
    pub types: Vec<TypeDecl>,
}

impl<'s> Lowerer<'s> {
    pub fn new(source: &'s str) -> Self {
        Self { source }
    }

    fn text(&self, node: Node) -> &'s str {
        &self.source[node.byte_range()]
    }

    pub fn unit(&self, root: Node) -> LoweredUnit {
        let mut unit = LoweredUnit {
            package: None,
            imports: Vec::new(),
            types: Vec::new(),
        };

        let mut cursor = root.walk();
        for child in root.named_children(&mut cursor) {
            match child.kind() {
                "package_declaration" => {
                    let mut inner = child.walk();
                    unit.package = child
                        .named_children(&mut inner)
                        .find(|n| matches!(n.kind(), "identifier" | "scoped_identifier"))
                        .map(|n| self.text(n).to_string());
                }
                "import_declaration" => {
                    if let Some(import) = self.import(child) {
                        unit.imports.push(import);
                    }
                }
                _ => {
                    if let Some(decl) = self.type_decl(child, None) {
                        unit.types.push(decl);
                    }
                }
            }
        }

        unit
    }

    fn import(&self, node: Node) -> Option<Import> {
        let mut path = None;
        let mut is_static = false;
        let mut is_wildcard = false;

        let mut cursor = node.walk();
        for child in node.children(&mut cursor) {
            match child.kind() {
                "static" => is_static = true,
                "asterisk" => is_wildcard = true,
                "identifier" | "scoped_identifier" => path = Some(self.text(child).to_string()),
                _ => {}
            }
        }

        path.map(|path| Import {
            path,
            is_static,
            is_wildcard,
        })
    }

    fn type_decl(&self, node: Node, outer: Option<&str>) -> Option<TypeDecl> {
        let kind = match node.kind() {
            "class_declaration" => TypeKind::Class,
            "interface_declaration" => TypeKind::Interface,
            "enum_declaration" => TypeKind::Enum,
            "record_declaration" => TypeKind::Record,
            _ => return None,
        };
        let name = self.text(node.child_by_field_name("name")?).to_string();
        let qualified_name = match outer {
            Some(outer) => format!("{outer}.{name}"),
            None => name.clone(),
        };

        let superclass = node
            .child_by_field_name("superclass")
            .and_then(|s| s.named_child(0))
            .map(|t| self.text(t).to_string());

        let interfaces = match kind {
            TypeKind::Interface => {
                let mut cursor = node.walk();
                let extends = node
                    .children(&mut cursor)
                    .find(|c| c.kind() == "extends_interfaces");
                extends.map(|e| self.type_list(e)).unwrap_or_default()
            }
            _ => node
                .child_by_field_name("interfaces")
                .map(|i| self.type_list(i))
                .unwrap_or_default(),
        };

        let mut decl = TypeDecl {
            name,
            qualified_name,
            kind,
            superclass,
            interfaces,
            annotations: self.annotations(node),
            fields: Vec::new(),
            methods: Vec::new(),
            types: Vec::new(),
            start_line: node.start_position().row + 1,
            end_line: node.end_position().row + 1,
        };

        if kind == TypeKind::Record {
            if let Some(params) = node.child_by_field_name("parameters") {
                decl.fields = self
                    .params(params)
                    .into_iter()
                    .map(|p| Variable {
                        name: p.name,
                        type_name: p.type_name,
                        constructed_type: None,
                    })
                    .collect();
            }
        }

        if let Some(body) = node.child_by_field_name("body") {
            self.members(body, &mut decl);
        }

        Some(decl)
    }

    /// Types inside `super_interfaces` / `extends_interfaces`
    fn type_list(&self, node: Node) -> Vec<String> {
        let mut cursor = node.walk();
        let list = node
            .named_children(&mut cursor)
            .find(|c| c.kind() == "type_list");
        let Some(list) = list else {
            return Vec::new();
        };
        let mut cursor = list.walk();
        list.named_children(&mut cursor)
            .map(|t| self.text(t).to_string())
            .collect()
    }

    fn members(&self, body: Node, decl: &mut TypeDecl) {
        let owner = decl.qualified_name.clone();
        let mut cursor = body.walk();
        for child in body.named_children(&mut cursor) {
            match child.kind() {
                "field_declaration" | "constant_declaration" => {
                    decl.fields.extend(self.declarators(child));
                    self.initializer(child, decl, &owner);
                }
                "method_declaration" | "constructor_declaration" | "compact_constructor_declaration" => {
                    let mut walk = BodyWalk::default();
                    let method = self.method(child, &mut walk, &owner);
                    decl.methods.push(method);
                    decl.types.append(&mut walk.nested_types);
                }
                "enum_body_declarations" => self.members(child, decl),
                "block" | "static_initializer" => self.initializer(child, decl, &owner),
                _ => {
                    if let Some(nested) = self.type_decl(child, Some(&owner)) {
                        decl.types.push(nested);
                    }
                }
            }
        }
    }

    /// Local classes declared in field initializers and initializer blocks
    fn initializer(&self, node: Node, decl: &mut TypeDecl, owner: &str) {
        let mut walk = BodyWalk::default();
        self.walk_body(node, &mut walk, Some(owner));
        decl.types.append(&mut walk.nested_types);
    }

    fn method(&self, node: Node, walk: &mut BodyWalk, owner: &str) -> MethodDecl {
        let name = node
            .child_by_field_name("name")
            .map(|n| self.text(n).to_string())
            .unwrap_or_default();
        let is_constructor = node.kind() != "method_declaration";
        let return_type = if is_constructor {
            None
        } else {
            node.child_by_field_name("type")
                .map(|t| self.text(t).to_string())
        };
        let params = node
            .child_by_field_name("parameters")
            .map(|p| self.params(p))
            .unwrap_or_default();

        let body = node.child_by_field_name("body");
        let mut own = BodyWalk::default();
        if let Some(body) = body {
            self.walk_body(body, &mut own, Some(owner));
        }
        walk.nested_types.append(&mut own.nested_types);

        MethodDecl {
            name,
            return_type,
            params,
            locals: own.locals,
            calls: own.calls,
            annotations: self.annotations(node),
            is_constructor,
            has_body: body.is_some(),
            start_line: node.start_position().row + 1,
            end_line: node.end_position().row + 1,
        }
    }

    /// Pre-order walk collecting calls and local declarations.
    ///
    /// Calls inside lambdas and anonymous class bodies belong to the walked
    /// body. Local classes are registered under `owner` while it is set and
    /// are then skipped, since their methods are callers of their own.
    fn walk_body(&self, node: Node, walk: &mut BodyWalk, owner: Option<&str>) {
        let mut owner_below = owner;

        match node.kind() {
            "method_invocation" => walk.calls.push(self.call(node)),
            "local_variable_declaration" => walk.locals.extend(self.declarators(node)),
            "enhanced_for_statement" | "resource" => {
                if let (Some(ty), Some(name)) = (
                    node.child_by_field_name("type"),
                    node.child_by_field_name("name"),
                ) {
                    walk.locals.push(Variable {
                        name: self.text(name).to_string(),
                        type_name: self.text(ty).to_string(),
                        constructed_type: node
                            .child_by_field_name("value")
                            .and_then(|v| self.constructed_type(v)),
                    });
                }
            }
            "catch_formal_parameter" => {
                let mut cursor = node.walk();
                let first_type = node
                    .named_children(&mut cursor)
                    .find(|c| c.kind() == "catch_type")
                    .and_then(|c| c.named_child(0));
                if let (Some(ty), Some(name)) = (first_type, node.child_by_field_name("name")) {
                    walk.locals.push(Variable {
                        name: self.text(name).to_string(),
                        type_name: self.text(ty).to_string(),
                        constructed_type: None,
                    });
                }
            }
            "formal_parameter" | "spread_parameter" => {
                if let Some(param) = self.param(node) {
                    walk.locals.push(Variable {
                        name: param.name,
                        type_name: param.type_name,
                        constructed_type: None,
                    });
                }
            }
            "class_body" => owner_below = None,
            "class_declaration" | "interface_declaration" | "enum_declaration"
            | "record_declaration" => {
                if let Some(local_type) = owner.and_then(|o| self.type_decl(node, Some(o))) {
                    walk.nested_types.push(local_type);
                    return;
                }
                owner_below = None;
            }
            _ => {}
        }

        let mut cursor = node.walk();
        for child in node.named_children(&mut cursor) {
            self.walk_body(child, walk, owner_below);
        }
    }

    /// Variables of a field or local declaration (`int a = 1, b[];`)
    fn declarators(&self, node: Node) -> Vec<Variable> {
        let Some(ty) = node.child_by_field_name("type") else {
            return Vec::new();
        };
        let type_name = self.text(ty);

        let mut cursor = node.walk();
        node.children_by_field_name("declarator", &mut cursor)
            .filter_map(|declarator| {
                let name = self.text(declarator.child_by_field_name("name")?);
                let dims = declarator
                    .child_by_field_name("dimensions")
                    .map(|d| self.text(d))
                    .unwrap_or_default();
                Some(Variable {
                    name: name.to_string(),
                    type_name: format!("{type_name}{dims}"),
                    constructed_type: declarator
                        .child_by_field_name("value")
                        .and_then(|v| self.constructed_type(v)),
                })
            })
            .collect()
    }

    fn constructed_type(&self, value: Node) -> Option<String> {
        (value.kind() == "object_creation_expression")
            .then(|| value.child_by_field_name("type"))
            .flatten()
            .map(|t| self.text(t).to_string())
    }

    fn params(&self, node: Node) -> Vec<Param> {
        let mut cursor = node.walk();
        node.named_children(&mut cursor)
            .filter_map(|child| self.param(child))
            .collect()
    }

    fn param(&self, node: Node) -> Option<Param> {
        match node.kind() {
            "formal_parameter" => {
                let ty = self.text(node.child_by_field_name("type")?);
                let dims = node
                    .child_by_field_name("dimensions")
                    .map(|d| self.text(d))
                    .unwrap_or_default();
                Some(Param {
                    name: self.text(node.child_by_field_name("name")?).to_string(),
                    type_name: format!("{ty}{dims}"),
                    varargs: false,
                })
            }
            "spread_parameter" => {
                let mut cursor = node.walk();
                let children: Vec<Node> = node.named_children(&mut cursor).collect();
                let ty = node
                    .child_by_field_name("type")
                    .or_else(|| children.iter().copied().find(|c| is_type_node(c.kind())))?;
                let declarator = children
                    .iter()
                    .find(|c| c.kind() == "variable_declarator")?;
                Some(Param {
                    name: self
                        .text(declarator.child_by_field_name("name")?)
                        .to_string(),
                    type_name: format!("{}...", self.text(ty)),
                    varargs: true,
                })
            }
            _ => None,
        }
    }

    fn annotations(&self, node: Node) -> Vec<Annotation> {
        let mut cursor = node.walk();
        let Some(modifiers) = node
            .children(&mut cursor)
            .find(|c| c.kind() == "modifiers")
        else {
            return Vec::new();
        };

        let mut cursor = modifiers.walk();
        modifiers
            .named_children(&mut cursor)
            .filter(|c| matches!(c.kind(), "marker_annotation" | "annotation"))
            .filter_map(|ann| self.annotation(ann))
            .collect()
    }

    fn annotation(&self, node: Node) -> Option<Annotation> {
        let full_name = self.text(node.child_by_field_name("name")?);
        let name = full_name.rsplit('.').next().unwrap_or(full_name).to_string();

        let mut arguments = Vec::new();
        if let Some(args) = node.child_by_field_name("arguments") {
            let mut cursor = args.walk();
            for arg in args.named_children(&mut cursor) {
                if arg.kind() == "element_value_pair" {
                    let (Some(key), Some(value)) = (
                        arg.child_by_field_name("key"),
                        arg.child_by_field_name("value"),
                    ) else {
                        continue;
                    };
                    arguments.push(AnnotationArg {
                        key: Some(self.text(key).to_string()),
                        value: self.text(value).to_string(),
                    });
                } else if !arg.kind().ends_with("comment") {
                    arguments.push(AnnotationArg {
                        key: None,
                        value: self.text(arg).to_string(),
                    });
                }
            }
        }

        Some(Annotation { name, arguments })
    }

    fn call(&self, node: Node) -> CallExpr {
        let arguments = node
            .child_by_field_name("arguments")
            .map(|args| {
                let mut cursor = args.walk();
                args.named_children(&mut cursor)
                    .filter(|a| !a.kind().ends_with("comment"))
                    .map(|a| self.expr(a))
                    .collect()
            })
            .unwrap_or_default();

        CallExpr {
            name: node
                .child_by_field_name("name")
                .map(|n| self.text(n).to_string())
                .unwrap_or_default(),
            receiver: node.child_by_field_name("object").map(|o| self.expr(o)),
            arguments,
            line: node.start_position().row + 1,
        }
    }

    fn expr(&self, node: Node) -> Expr {
        match node.kind() {
            "identifier" => Expr::Name(self.text(node).to_string()),
            "this" => Expr::This,
            "super" => Expr::Super,
            "field_access" => match (
                node.child_by_field_name("object"),
                node.child_by_field_name("field"),
            ) {
                (Some(object), Some(field)) => Expr::FieldAccess {
                    object: Box::new(self.expr(object)),
                    field: self.text(field).to_string(),
                },
                _ => Expr::Other("field_access"),
            },
            "method_invocation" => Expr::Call(Box::new(self.call(node))),
            "object_creation_expression" => match node.child_by_field_name("type") {
                Some(ty) => Expr::New {
                    type_name: self.text(ty).to_string(),
                },
                None => Expr::Other("object_creation_expression"),
            },
            "cast_expression" => match (
                node.child_by_field_name("type"),
                node.child_by_field_name("value"),
            ) {
                (Some(ty), Some(value)) => Expr::Cast {
                    type_name: self.text(ty).to_string(),
                    value: Box::new(self.expr(value)),
                },
                _ => Expr::Other("cast_expression"),
            },
            "parenthesized_expression" => node
                .named_child(0)
                .map_or(Expr::Other("parenthesized_expression"), |inner| {
                    self.expr(inner)
                }),
            "string_literal" | "text_block" => Expr::Literal(Literal::String),
            "character_literal" => Expr::Literal(Literal::Char),
            "decimal_integer_literal"
            | "hex_integer_literal"
            | "octal_integer_literal"
            | "binary_integer_literal" => {
                if self.text(node).ends_with(&['l', 'L'][..]) {
                    Expr::Literal(Literal::Long)
                } else {
                    Expr::Literal(Literal::Int)
                }
            }
            "decimal_floating_point_literal" | "hex_floating_point_literal" => {
                if self.text(node).ends_with(&['f', 'F'][..]) {
                    Expr::Literal(Literal::Float)
                } else {
                    Expr::Literal(Literal::Double)
                }
            }
            "true" | "false" => Expr::Literal(Literal::Boolean),
            "null_literal" => Expr::Literal(Literal::Null),
            "class_literal" => Expr::Literal(Literal::Class),
            other => Expr::Other(other),
        }
    }
}

fn is_type_node(kind: &str) -> bool {
    matches!(
        kind,
        "type_identifier"
            | "scoped_type_identifier"
            | "generic_type"
            | "array_type"
            | "integral_type"
            | "floating_point_type"
            | "boolean_type"
    )
}

/// Line (1-indexed) of the first syntax error below `node`
pub(crate) fn first_error_line(node: Node) -> Option<usize> {
    if node.is_error() || node.is_missing() {
        return Some(node.start_position().row + 1);
    }
    if !node.has_error() {
        return None;
    }
    let mut cursor = node.walk();
    for child in node.children(&mut cursor) {
        if let Some(line) = first_error_line(child) {
            return Some(line);
        }
    }
    Some(node.start_position().row + 1)
}
