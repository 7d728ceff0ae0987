use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Declarations extracted from one source file.
///
/// Types are flattened: nested and member types appear in declaration order
/// after their enclosing type and point back to it through `enclosing`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompilationUnit {
    pub path: PathBuf,
    pub package: Option<String>,
    pub imports: Vec<ImportDeclaration>,
    pub types: Vec<TypeDeclaration>,
}

impl CompilationUnit {
    pub fn new(path: PathBuf, package: Option<String>) -> Self {
        Self {
            path,
            package,
            imports: Vec::new(),
            types: Vec::new(),
        }
    }

    /// Qualified name for a top-level type declared in this unit.
    pub fn qualify(&self, simple_name: &str) -> String {
        match &self.package {
            Some(package) if !package.is_empty() => format!("{}.{}", package, simple_name),
            _ => simple_name.to_string(),
        }
    }

    pub fn top_level_types(&self) -> impl Iterator<Item = &TypeDeclaration> {
        self.types.iter().filter(|t| t.enclosing.is_none())
    }

    pub fn type_index(&self, qualified_name: &str) -> Option<usize> {
        self.types
            .iter()
            .position(|t| t.qualified_name == qualified_name)
    }

    pub fn find_type(&self, qualified_name: &str) -> Option<&TypeDeclaration> {
        self.type_index(qualified_name).map(|i| &self.types[i])
    }

    /// Innermost type whose declaration spans `line`.
    pub fn type_at_line(&self, line: u32) -> Option<&TypeDeclaration> {
        self.types
            .iter()
            .filter(|t| t.start_line <= line && line <= t.end_line)
            .max_by_key(|t| t.start_line)
    }

    pub fn single_type_imports(&self) -> impl Iterator<Item = &ImportDeclaration> {
        self.imports.iter().filter(|i| !i.is_static && !i.on_demand)
    }

    pub fn on_demand_imports(&self) -> impl Iterator<Item = &ImportDeclaration> {
        self.imports.iter().filter(|i| !i.is_static && i.on_demand)
    }

    pub fn static_imports(&self) -> impl Iterator<Item = &ImportDeclaration> {
        self.imports.iter().filter(|i| i.is_static)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImportDeclaration {
    /// Imported name without the trailing `.*`.
    pub path: String,
    pub is_static: bool,
    pub on_demand: bool,
}

impl ImportDeclaration {
    pub fn new(path: impl Into<String>, is_static: bool, on_demand: bool) -> Self {
        Self {
            path: path.into(),
            is_static,
            on_demand,
        }
    }

    /// Last segment of the imported name (`Foo` for `import a.b.Foo`).
    pub fn simple_name(&self) -> &str {
        self.path.rsplit('.').next().unwrap_or(&self.path)
    }

    /// Everything before the last segment (`a.b` for `import a.b.Foo`).
    pub fn container(&self) -> &str {
        self.path
            .rsplit_once('.')
            .map(|(container, _)| container)
            .unwrap_or("")
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TypeKind {
    Class,
    Interface,
    Enum,
    Record,
    Annotation,
}

impl TypeKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            TypeKind::Class => "class",
            TypeKind::Interface => "interface",
            TypeKind::Enum => "enum",
            TypeKind::Record => "record",
            TypeKind::Annotation => "annotation",
        }
    }
}

impl std::fmt::Display for TypeKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TypeDeclaration {
    pub qualified_name: String,
    pub name: String,
    pub kind: TypeKind,
    /// Qualified name of the enclosing type for member and local types.
    pub enclosing: Option<String>,
    pub type_parameters: Vec<String>,
    /// Supertypes as written in source (`extends` first, then `implements`).
    pub super_types: Vec<String>,
    pub fields: Vec<FieldDeclaration>,
    pub enum_constants: Vec<String>,
    pub methods: Vec<MethodDeclaration>,
    /// Simple names of directly nested member types.
    pub member_types: Vec<String>,
    pub start_line: u32,
    pub end_line: u32,
}

impl TypeDeclaration {
    pub fn is_enum(&self) -> bool {
        self.kind == TypeKind::Enum
    }

    pub fn find_field(&self, name: &str) -> Option<&FieldDeclaration> {
        self.fields.iter().find(|f| f.name == name)
    }

    pub fn has_enum_constant(&self, name: &str) -> bool {
        self.enum_constants.iter().any(|c| c == name)
    }

    pub fn methods_named<'a>(
        &'a self,
        name: &'a str,
    ) -> impl Iterator<Item = &'a MethodDeclaration> + 'a {
        self.methods.iter().filter(move |m| m.name == name)
    }

    pub fn has_member_type(&self, simple_name: &str) -> bool {
        self.member_types.iter().any(|m| m == simple_name)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldDeclaration {
    pub name: String,
    pub type_text: String,
    pub is_static: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Parameter {
    pub name: String,
    pub type_text: String,
}

/// Byte range of a syntax node inside its source file.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SourceSpan {
    pub start_byte: usize,
    pub end_byte: usize,
}

impl SourceSpan {
    pub fn new(start_byte: usize, end_byte: usize) -> Self {
        Self {
            start_byte,
            end_byte,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MethodDeclaration {
    pub name: String,
    pub type_parameters: Vec<String>,
    pub parameters: Vec<Parameter>,
    /// `None` for constructors.
    pub return_type: Option<String>,
    pub is_static: bool,
    pub is_varargs: bool,
    pub start_line: u32,
    pub end_line: u32,
    /// `None` for members synthesised from the declaration (record accessors,
    /// implicit enum methods) which have no syntax node of their own.
    pub span: Option<SourceSpan>,
}

impl MethodDeclaration {
    pub fn is_constructor(&self) -> bool {
        self.return_type.is_none()
    }

    /// `name(T1, T2)` with parameter types as written.
    pub fn signature(&self) -> String {
        let params: Vec<&str> = self
            .parameters
            .iter()
            .map(|p| p.type_text.as_str())
            .collect();
        format!("{}({})", self.name, params.join(", "))
    }

    /// Whether a call with `arity` arguments can bind to this declaration.
    pub fn accepts_arity(&self, arity: usize) -> bool {
        if self.is_varargs {
            arity + 1 >= self.parameters.len()
        } else {
            arity == self.parameters.len()
        }
    }
}
