use std::rc::Rc;

use crate::domain::{CompilationUnit, FieldDeclaration, TypeDeclaration, TypeOrigin};

/// A type declaration found by one of the resolvers.
#[derive(Debug, Clone)]
pub enum SolvedType {
    /// Declared in project source; every member is inspectable.
    Source {
        unit: Rc<CompilationUnit>,
        index: usize,
    },
    /// Known by name only. `fields` lists the few members the resolver
    /// can describe without source (platform constants like `System.out`).
    Opaque {
        qualified_name: String,
        origin: TypeOrigin,
        fields: Vec<FieldDeclaration>,
    },
}

impl SolvedType {
    pub fn opaque(qualified_name: impl Into<String>, origin: TypeOrigin) -> Self {
        Self::Opaque {
            qualified_name: qualified_name.into(),
            origin,
            fields: Vec::new(),
        }
    }

    pub fn qualified_name(&self) -> &str {
        match self {
            Self::Source { unit, index } => &unit.types[*index].qualified_name,
            Self::Opaque { qualified_name, .. } => qualified_name,
        }
    }

    pub fn origin(&self) -> TypeOrigin {
        match self {
            Self::Source { .. } => TypeOrigin::Source,
            Self::Opaque { origin, .. } => *origin,
        }
    }

    /// The source declaration, when there is one.
    pub fn declaration(&self) -> Option<&TypeDeclaration> {
        match self {
            Self::Source { unit, index } => unit.types.get(*index),
            Self::Opaque { .. } => None,
        }
    }

    pub fn unit(&self) -> Option<&Rc<CompilationUnit>> {
        match self {
            Self::Source { unit, .. } => Some(unit),
            Self::Opaque { .. } => None,
        }
    }

    pub fn is_opaque(&self) -> bool {
        matches!(self, Self::Opaque { .. })
    }
}

/// One link in the resolver chain.
pub trait TypeResolver {
    fn origin(&self) -> TypeOrigin;

    /// Human-readable label used in logs (`source root /x/src`).
    fn describe(&self) -> String;

    /// Looks up a type by qualified name. Nested types use `.` separators.
    fn solve_type(&self, qualified_name: &str) -> Option<SolvedType>;

    /// Whether any type is known under `package`.
    fn has_package(&self, package: &str) -> bool;
}
