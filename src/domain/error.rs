use thiserror::Error;

#[derive(Debug, Error)]
pub enum DomainError {
    #[error("Parse error: {0}")]
    ParseError(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Unresolved symbol `{expression}` at line {line}: {reason}")]
    UnresolvedSymbol {
        expression: String,
        line: u32,
        reason: ResolutionError,
    },

    #[error("Cache error: {0}")]
    CacheError(String),

    #[error("Export error: {0}")]
    ExportError(String),

    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl DomainError {
    pub fn parse(msg: impl Into<String>) -> Self {
        Self::ParseError(msg.into())
    }

    pub fn not_found(msg: impl Into<String>) -> Self {
        Self::NotFound(msg.into())
    }

    pub fn invalid_input(msg: impl Into<String>) -> Self {
        Self::InvalidInput(msg.into())
    }

    pub fn unresolved(expression: impl Into<String>, line: u32, reason: ResolutionError) -> Self {
        Self::UnresolvedSymbol {
            expression: expression.into(),
            line,
            reason,
        }
    }

    pub fn cache(msg: impl Into<String>) -> Self {
        Self::CacheError(msg.into())
    }

    pub fn export(msg: impl Into<String>) -> Self {
        Self::ExportError(msg.into())
    }

    pub fn internal(msg: impl Into<String>) -> Self {
        Self::Internal(msg.into())
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound(_))
    }

    pub fn is_parse_error(&self) -> bool {
        matches!(self, Self::ParseError(_))
    }

    pub fn is_unresolved(&self) -> bool {
        matches!(self, Self::UnresolvedSymbol { .. })
    }
}

/// Why an expression could not be mapped to a declaration.
///
/// Resolution failures are values, not aborts: the collector decides from
/// its configured policy whether one of these becomes a [`DomainError`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ResolutionError {
    #[error("cannot resolve symbol `{0}`")]
    UnknownSymbol(String),

    #[error("cannot resolve type `{0}`")]
    UnknownType(String),

    #[error("no member `{member}` in `{owner}`")]
    MemberNotFound { owner: String, member: String },

    #[error("members of `{0}` are not available from source")]
    OpaqueType(String),

    #[error("`{0}` is not a reference type")]
    NotAReferenceType(String),

    #[error("cannot infer the type of `{0}`")]
    Uninferable(String),

    #[error("unsupported expression kind `{0}`")]
    Unsupported(String),
}

impl ResolutionError {
    pub fn unknown_symbol(name: impl Into<String>) -> Self {
        Self::UnknownSymbol(name.into())
    }

    pub fn unknown_type(name: impl Into<String>) -> Self {
        Self::UnknownType(name.into())
    }

    pub fn member_not_found(owner: impl Into<String>, member: impl Into<String>) -> Self {
        Self::MemberNotFound {
            owner: owner.into(),
            member: member.into(),
        }
    }

    /// The owner is known but its members cannot be inspected.
    pub fn is_opaque(&self) -> bool {
        matches!(self, Self::OpaqueType(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unresolved_message_names_expression() {
        let err = DomainError::unresolved(
            "helper.process(x)",
            14,
            ResolutionError::unknown_symbol("helper"),
        );

        let message = err.to_string();
        assert!(message.contains("helper.process(x)"));
        assert!(message.contains("line 14"));
        assert!(err.is_unresolved());
    }

    #[test]
    fn test_not_found_predicate() {
        assert!(DomainError::not_found("Foo.bar").is_not_found());
        assert!(!DomainError::parse("bad").is_not_found());
    }
}
