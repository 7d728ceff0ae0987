use serde::{Deserialize, Serialize};

/// A reference from the analysed code to a symbol owned by another class.
///
/// This captures relationships like:
/// - Field reads and writes
/// - Enum constant usage
/// - Annotation usage
/// - Type references (declarations, casts, `new`, class literals)
/// - Method invocations
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SymbolReference {
    /// Qualified name of the class that declares the referenced symbol
    owner: String,

    /// Kind of reference
    kind: ReferenceKind,

    /// Field, constant, annotation or method signature; `None` for type references
    member: Option<String>,

    /// `false` when only the receiver's static type identified the owner
    resolved: bool,

    /// Why full resolution failed, when it did
    diagnostic: Option<String>,

    /// Line number where the reference occurs
    line: u32,

    /// Column number where the reference occurs
    column: u32,
}

impl SymbolReference {
    pub fn new(owner: impl Into<String>, kind: ReferenceKind, line: u32, column: u32) -> Self {
        Self {
            owner: owner.into(),
            kind,
            member: None,
            resolved: true,
            diagnostic: None,
            line,
            column,
        }
    }

    pub fn with_member(mut self, member: impl Into<String>) -> Self {
        self.member = Some(member.into());
        self
    }

    /// Marks the reference as inferred from the receiver type only.
    pub fn with_diagnostic(mut self, diagnostic: impl Into<String>) -> Self {
        self.resolved = false;
        self.diagnostic = Some(diagnostic.into());
        self
    }

    // Getters
    pub fn owner(&self) -> &str {
        &self.owner
    }

    pub fn kind(&self) -> ReferenceKind {
        self.kind
    }

    pub fn member(&self) -> Option<&str> {
        self.member.as_deref()
    }

    pub fn is_resolved(&self) -> bool {
        self.resolved
    }

    pub fn diagnostic(&self) -> Option<&str> {
        self.diagnostic.as_deref()
    }

    pub fn line(&self) -> u32 {
        self.line
    }

    pub fn column(&self) -> u32 {
        self.column
    }

    /// Returns `owner.member` or just the owner for type references.
    pub fn qualified_symbol(&self) -> String {
        match &self.member {
            Some(member) => format!("{}.{}", self.owner, member),
            None => self.owner.clone(),
        }
    }
}

/// The kind of symbol reference.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReferenceKind {
    /// Instance or static field: `obj.count`, `Config.TIMEOUT`
    Field,
    /// Enum constant: `Color.RED`, `case RED:`
    EnumConstant,
    /// Annotation usage: `@Transactional`
    Annotation,
    /// The owner used as a type: `new Foo()`, `Foo.class`, `Foo x`
    Type,
    /// Method invocation: `helper.process(x)`
    MethodCall,
}

impl ReferenceKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ReferenceKind::Field => "field",
            ReferenceKind::EnumConstant => "enum_constant",
            ReferenceKind::Annotation => "annotation",
            ReferenceKind::Type => "type",
            ReferenceKind::MethodCall => "method_call",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "field" => Some(ReferenceKind::Field),
            "enum_constant" => Some(ReferenceKind::EnumConstant),
            "annotation" => Some(ReferenceKind::Annotation),
            "type" => Some(ReferenceKind::Type),
            "method_call" => Some(ReferenceKind::MethodCall),
            _ => None,
        }
    }
}

impl std::fmt::Display for ReferenceKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// An expression whose resolution failed, kept instead of being dropped.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Diagnostic {
    pub expression: String,
    pub kind: String,
    pub line: u32,
    pub column: u32,
    pub message: String,
}

impl Diagnostic {
    pub fn new(
        expression: impl Into<String>,
        kind: impl Into<String>,
        line: u32,
        column: u32,
        message: impl Into<String>,
    ) -> Self {
        Self {
            expression: expression.into(),
            kind: kind.into(),
            line,
            column,
            message: message.into(),
        }
    }

    pub fn location(&self) -> String {
        format!("{}:{}", self.line, self.column)
    }
}

impl std::fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} `{}` at {}: {}",
            self.kind,
            self.expression,
            self.location(),
            self.message
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_symbol_reference_creation() {
        let reference = SymbolReference::new("pkg.Bar", ReferenceKind::Field, 42, 10)
            .with_member("field");

        assert_eq!(reference.owner(), "pkg.Bar");
        assert_eq!(reference.member(), Some("field"));
        assert_eq!(reference.kind(), ReferenceKind::Field);
        assert_eq!(reference.line(), 42);
        assert!(reference.is_resolved());
        assert_eq!(reference.qualified_symbol(), "pkg.Bar.field");
    }

    #[test]
    fn test_diagnostic_marks_unresolved() {
        let reference = SymbolReference::new("pkg.Helper", ReferenceKind::MethodCall, 1, 1)
            .with_member("process(?)")
            .with_diagnostic("members of `pkg.Helper` are not available from source");

        assert!(!reference.is_resolved());
        assert!(reference.diagnostic().is_some());
    }

    #[test]
    fn test_reference_kind_roundtrip() {
        let kinds = vec![
            ReferenceKind::Field,
            ReferenceKind::EnumConstant,
            ReferenceKind::Annotation,
            ReferenceKind::Type,
            ReferenceKind::MethodCall,
        ];

        for kind in kinds {
            assert_eq!(ReferenceKind::parse(kind.as_str()), Some(kind));
        }
        assert_eq!(ReferenceKind::parse("import"), None);
    }
}
