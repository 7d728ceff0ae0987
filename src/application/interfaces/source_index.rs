use std::path::Path;
use std::rc::Rc;

use super::SolvedType;
use crate::domain::{CompilationUnit, DomainError, ExpressionSite, MethodTarget};

/// Read access to the parsed project and the resolver chain behind it.
pub trait SourceIndex {
    /// Parses a file (memoized per session).
    ///
    /// Fails with `NotFound` when the file does not exist and `ParseError`
    /// when it cannot be parsed.
    fn compilation_unit(&self, path: &Path) -> Result<Rc<CompilationUnit>, DomainError>;

    /// Queries the resolver chain: sources, then archives, then the platform.
    fn solve_type(&self, qualified_name: &str) -> Option<SolvedType>;

    /// Every symbol-producing expression inside `target`, each already
    /// resolved as far as possible.
    fn expression_sites(&self, target: &MethodTarget) -> Result<Vec<ExpressionSite>, DomainError>;
}
