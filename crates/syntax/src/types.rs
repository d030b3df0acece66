use std::path::PathBuf;

/// One parsed Java file
#[derive(Debug, Clone, PartialEq)]
pub struct SourceUnit {
    /// Path the unit was read from
    pub path: PathBuf,

    /// Full source text
    pub source: String,

    /// Declared package (`None` for the default package)
    pub package: Option<String>,

    /// Import declarations in file order
    pub imports: Vec<Import>,

    /// Top-level type declarations (nested types hang off their parents)
    pub types: Vec<TypeDecl>,
}

impl SourceUnit {
    /// All type declarations in the unit, parents before their nested types
    pub fn all_types(&self) -> Vec<&TypeDecl> {
        let mut out = Vec::new();
        for decl in &self.types {
            decl.collect_into(&mut out);
        }
        out
    }

    /// Source text for a 1-indexed inclusive line range
    pub fn lines(&self, start_line: usize, end_line: usize) -> Option<String> {
        if start_line == 0 || start_line > end_line {
            return None;
        }
        let lines: Vec<&str> = self.source.lines().collect();
        if end_line > lines.len() {
            return None;
        }
        Some(lines[start_line - 1..end_line].join("\n"))
    }
}

/// An `import` declaration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Import {
    /// Dotted path without `static` or the trailing `.*`
    pub path: String,
    pub is_static: bool,
    pub is_wildcard: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TypeKind {
    Class,
    Interface,
    Enum,
    Record,
}

/// A class, interface, enum or record declaration
#[derive(Debug, Clone, PartialEq)]
pub struct TypeDecl {
    /// Simple name
    pub name: String,

    /// Dotted path through the enclosing types (`Outer.Inner`), package
    /// excluded. Local classes hang off the type whose body declares them.
    pub qualified_name: String,

    pub kind: TypeKind,

    /// Raw text of the `extends` type for classes
    pub superclass: Option<String>,

    /// Raw text of implemented (or, for interfaces, extended) types
    pub interfaces: Vec<String>,

    pub annotations: Vec<Annotation>,

    /// Fields, plus record components
    pub fields: Vec<Variable>,

    /// Methods and constructors declared directly in this type. Methods of
    /// anonymous classes and enum constant bodies are not declarations of
    /// any named type; their calls count toward the enclosing method.
    pub methods: Vec<MethodDecl>,

    /// Member and local named types
    pub types: Vec<TypeDecl>,

    /// Line range (1-indexed, inclusive)
    pub start_line: usize,
    pub end_line: usize,
}

impl TypeDecl {
    fn collect_into<'a>(&'a self, out: &mut Vec<&'a TypeDecl>) {
        out.push(self);
        for nested in &self.types {
            nested.collect_into(out);
        }
    }

    /// Find an annotation by simple name
    pub fn annotation(&self, name: &str) -> Option<&Annotation> {
        self.annotations.iter().find(|a| a.name == name)
    }

    /// Field by name
    pub fn field(&self, name: &str) -> Option<&Variable> {
        self.fields.iter().find(|f| f.name == name)
    }
}

/// A method or constructor declaration
#[derive(Debug, Clone, PartialEq)]
pub struct MethodDecl {
    pub name: String,

    /// Raw return type text (`None` for constructors)
    pub return_type: Option<String>,

    pub params: Vec<Param>,

    /// Every local declaration in the body, nested lambdas and anonymous
    /// classes included
    pub locals: Vec<Variable>,

    /// Every call expression in the body, in pre-order source order
    pub calls: Vec<CallExpr>,

    pub annotations: Vec<Annotation>,

    pub is_constructor: bool,

    /// Abstract and interface methods have no body
    pub has_body: bool,

    /// Line range (1-indexed, inclusive)
    pub start_line: usize,
    pub end_line: usize,
}

impl MethodDecl {
    /// Find an annotation by simple name
    pub fn annotation(&self, name: &str) -> Option<&Annotation> {
        self.annotations.iter().find(|a| a.name == name)
    }

    /// Whether the last parameter is `T...`
    pub fn is_varargs(&self) -> bool {
        self.params.last().is_some_and(|p| p.varargs)
    }

    /// Formal parameter by name
    pub fn param(&self, name: &str) -> Option<&Param> {
        self.params.iter().find(|p| p.name == name)
    }

    /// First local declaration with the given name
    pub fn local(&self, name: &str) -> Option<&Variable> {
        self.locals.iter().find(|v| v.name == name)
    }
}

/// A formal parameter
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Param {
    pub name: String,

    /// Raw type text; varargs parameters carry the trailing `...`
    pub type_name: String,

    pub varargs: bool,
}

/// A field, local variable, loop variable, resource or catch parameter
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Variable {
    pub name: String,

    /// Raw declared type text (may be `var`)
    pub type_name: String,

    /// Type named by the initializer when it is `new T(...)`
    pub constructed_type: Option<String>,
}

/// An annotation attached to a declaration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Annotation {
    /// Simple name (`RequestMapping` for `@org.x.RequestMapping`)
    pub name: String,
    pub arguments: Vec<AnnotationArg>,
}

impl Annotation {
    /// The unnamed single value, or the value of the first matching key
    pub fn value_of(&self, keys: &[&str]) -> Option<&str> {
        self.arguments
            .iter()
            .find(|arg| match &arg.key {
                None => true,
                Some(key) => keys.contains(&key.as_str()),
            })
            .map(|arg| arg.value.as_str())
    }

    /// Value of a named attribute
    pub fn attribute(&self, key: &str) -> Option<&str> {
        self.arguments
            .iter()
            .find(|arg| arg.key.as_deref() == Some(key))
            .map(|arg| arg.value.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnnotationArg {
    /// `None` for `@X("value")`
    pub key: Option<String>,

    /// Raw source text of the value
    pub value: String,
}

/// A method invocation
#[derive(Debug, Clone, PartialEq)]
pub struct CallExpr {
    /// Invoked method name
    pub name: String,

    /// Expression before the `.`, if any
    pub receiver: Option<Expr>,

    pub arguments: Vec<Expr>,

    /// 1-indexed line of the call
    pub line: usize,
}

/// Expression kinds the resolver distinguishes
#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    /// Bare identifier: a variable, field or type name
    Name(String),
    This,
    Super,
    FieldAccess {
        object: Box<Expr>,
        field: String,
    },
    Call(Box<CallExpr>),
    /// `new T(...)`, with `T` as written
    New { type_name: String },
    Cast {
        type_name: String,
        value: Box<Expr>,
    },
    Literal(Literal),
    /// Anything else; carries the tree-sitter node kind
    Other(&'static str),
}

impl Expr {
    pub fn as_call(&self) -> Option<&CallExpr> {
        match self {
            Self::Call(call) => Some(call),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Literal {
    String,
    Char,
    Int,
    Long,
    Float,
    Double,
    Boolean,
    Null,
    /// `Foo.class`
    Class,
}
