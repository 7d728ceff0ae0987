use serde::Serialize;

use super::ResolvedType;
use crate::domain::ResolutionError;

/// Outcome of the three-tier fallback used for member and call resolution.
///
/// Full resolution is tried first; when that fails, the receiver's static
/// type alone may still identify the owner; when even that fails, only the
/// raw receiver text is left.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution<T> {
    Resolved(T),
    ScopeOnly {
        owner: String,
        reason: ResolutionError,
    },
    Unresolved {
        scope_text: Option<String>,
        reason: ResolutionError,
    },
}

impl<T> Resolution<T> {
    pub fn is_resolved(&self) -> bool {
        matches!(self, Self::Resolved(_))
    }

    pub fn resolved(&self) -> Option<&T> {
        match self {
            Self::Resolved(value) => Some(value),
            _ => None,
        }
    }

    pub fn reason(&self) -> Option<&ResolutionError> {
        match self {
            Self::Resolved(_) => None,
            Self::ScopeOnly { reason, .. } | Self::Unresolved { reason, .. } => Some(reason),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MemberKind {
    Field,
    EnumConstant,
}

/// A field or enum constant together with the type that declares it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MemberRef {
    pub owner: String,
    pub name: String,
    pub kind: MemberKind,
}

impl MemberRef {
    pub fn field(owner: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            owner: owner.into(),
            name: name.into(),
            kind: MemberKind::Field,
        }
    }

    pub fn enum_constant(owner: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            owner: owner.into(),
            name: name.into(),
            kind: MemberKind::EnumConstant,
        }
    }
}

/// A resolved method declaration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MethodRef {
    pub owner: String,
    pub name: String,
    pub signature: String,
}

/// What a bare identifier in expression position refers to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NameTarget {
    Member(MemberRef),
    /// A local variable or parameter; never a cross-class dependency.
    Local,
    /// The identifier names a type (`Color` in `Color.RED`).
    Type(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MethodCallSite {
    pub name: String,
    pub arity: usize,
    /// Static type of the explicit receiver; `None` when the call has no scope.
    pub receiver: Option<Result<ResolvedType, ResolutionError>>,
    pub receiver_text: Option<String>,
    pub resolution: Resolution<MethodRef>,
    /// Declaring types of field-access arguments (`call(Foo.BAR)` → `pkg.Foo`).
    pub argument_owners: Vec<String>,
}

impl MethodCallSite {
    /// `name(?, ?)` for calls whose declaration could not be located.
    pub fn placeholder_signature(&self) -> String {
        let params = vec!["?"; self.arity];
        format!("{}({})", self.name, params.join(", "))
    }
}

/// One symbol-producing expression, tagged by kind.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SiteKind {
    /// `new Foo(..)`
    Construction(Result<ResolvedType, ResolutionError>),
    /// `Foo.class`
    ClassLiteral(Result<ResolvedType, ResolutionError>),
    /// Declared types: parameters, locals, casts, generic arguments, throws.
    TypeReference(Result<ResolvedType, ResolutionError>),
    /// `scope.field`
    FieldAccess {
        name: String,
        resolution: Resolution<MemberRef>,
    },
    /// A bare identifier.
    Name(Result<NameTarget, ResolutionError>),
    Annotation {
        name: String,
        resolved: Result<ResolvedType, ResolutionError>,
    },
    MethodCall(MethodCallSite),
}

impl SiteKind {
    pub fn label(&self) -> &'static str {
        match self {
            SiteKind::Construction(_) => "object creation",
            SiteKind::ClassLiteral(_) => "class literal",
            SiteKind::TypeReference(_) => "type",
            SiteKind::FieldAccess { .. } => "field access",
            SiteKind::Name(_) => "name",
            SiteKind::Annotation { .. } => "annotation",
            SiteKind::MethodCall(_) => "method call",
        }
    }
}

/// A symbol-producing expression found inside a target, with its resolution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExpressionSite {
    pub text: String,
    pub line: u32,
    pub column: u32,
    pub kind: SiteKind,
}

impl ExpressionSite {
    pub fn new(text: impl Into<String>, line: u32, column: u32, kind: SiteKind) -> Self {
        Self {
            text: text.into(),
            line,
            column,
            kind,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_placeholder_signature_matches_arity() {
        let call = MethodCallSite {
            name: "process".to_string(),
            arity: 2,
            receiver: None,
            receiver_text: None,
            resolution: Resolution::Unresolved {
                scope_text: None,
                reason: ResolutionError::unknown_symbol("process"),
            },
            argument_owners: Vec::new(),
        };

        assert_eq!(call.placeholder_signature(), "process(?, ?)");
        assert!(call.resolution.reason().is_some());
    }
}
