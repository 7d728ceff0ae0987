use std::cell::RefCell;
use std::collections::HashMap;
use std::path::Path;
use std::rc::Rc;

use tracing::{debug, info};

use super::expression_walker::ExpressionWalker;
use super::java_symbol_solver::JavaSymbolSolver;
use super::source_root_resolver::LocationHints;
use super::source_tree_index::SourceTreeIndex;
use crate::application::{ClassLocationScanner, SolvedType, SourceIndex, TypeResolver};
use crate::domain::{ClassLocations, CompilationUnit, DomainError, ExpressionSite, MethodTarget};

/// The resolver chain over one project.
///
/// Resolvers are queried in the order they were added; the first one that
/// knows a name wins. Answers, including misses, are memoized until the
/// class location map changes.
pub struct TypeIndex {
    tree: Rc<SourceTreeIndex>,
    resolvers: Vec<Box<dyn TypeResolver>>,
    memo: RefCell<HashMap<String, Option<SolvedType>>>,
    hints: LocationHints,
}

impl TypeIndex {
    pub fn new(tree: Rc<SourceTreeIndex>, hints: LocationHints) -> Self {
        Self {
            tree,
            resolvers: Vec::new(),
            memo: RefCell::new(HashMap::new()),
            hints,
        }
    }

    pub fn with_resolver(mut self, resolver: Box<dyn TypeResolver>) -> Self {
        debug!("Adding resolver: {}", resolver.describe());
        self.resolvers.push(resolver);
        self
    }

    pub fn tree(&self) -> &SourceTreeIndex {
        &self.tree
    }

    pub fn resolver_names(&self) -> Vec<String> {
        self.resolvers.iter().map(|r| r.describe()).collect()
    }

    pub fn solve(&self, qualified_name: &str) -> Option<SolvedType> {
        if let Some(known) = self.memo.borrow().get(qualified_name) {
            return known.clone();
        }

        let solved = self
            .resolvers
            .iter()
            .find_map(|resolver| resolver.solve_type(qualified_name));

        self.memo
            .borrow_mut()
            .insert(qualified_name.to_string(), solved.clone());
        solved
    }

    pub fn has_package(&self, package: &str) -> bool {
        self.resolvers.iter().any(|r| r.has_package(package))
    }
}

impl SourceIndex for TypeIndex {
    fn compilation_unit(&self, path: &Path) -> Result<Rc<CompilationUnit>, DomainError> {
        self.tree
            .parse_file(path)
            .map(|parsed| Rc::clone(&parsed.unit))
    }

    fn solve_type(&self, qualified_name: &str) -> Option<SolvedType> {
        self.solve(qualified_name)
    }

    fn expression_sites(&self, target: &MethodTarget) -> Result<Vec<ExpressionSite>, DomainError> {
        let parsed = self.tree.parse_file(&target.source_file)?;
        let solver = JavaSymbolSolver::new(self, &parsed);
        ExpressionWalker::new(&solver).walk(target)
    }
}

impl ClassLocationScanner for TypeIndex {
    fn scan_locations(&self) -> ClassLocations {
        self.tree.scan()
    }

    fn use_locations(&self, locations: Option<Rc<ClassLocations>>) {
        match &locations {
            Some(locations) => info!("Using {} class locations", locations.len()),
            None => debug!("Dropping class locations"),
        }
        *self.hints.borrow_mut() = locations;
        self.memo.borrow_mut().clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::connector::adapter::{PlatformTypeResolver, SourceRootResolver};
    use crate::domain::TypeOrigin;
    use std::fs;
    use tempfile::TempDir;

    fn index(root: &Path) -> TypeIndex {
        let tree = Rc::new(SourceTreeIndex::new(vec![root.to_path_buf()]));
        let hints: LocationHints = Rc::new(RefCell::new(None));
        TypeIndex::new(Rc::clone(&tree), Rc::clone(&hints))
            .with_resolver(Box::new(SourceRootResolver::new(
                root.to_path_buf(),
                tree,
                hints,
            )))
            .with_resolver(Box::new(PlatformTypeResolver::new()))
    }

    #[test]
    fn test_source_wins_over_platform() {
        let dir = TempDir::new().unwrap();
        fs::create_dir_all(dir.path().join("java/util")).unwrap();
        fs::write(
            dir.path().join("java/util/List.java"),
            "package java.util; public interface List<E> {}",
        )
        .unwrap();

        let index = index(dir.path());

        assert_eq!(index.solve("java.util.List").unwrap().origin(), TypeOrigin::Source);
        assert_eq!(index.solve("java.util.Map").unwrap().origin(), TypeOrigin::Platform);
        assert!(index.solve("nowhere.Thing").is_none());
    }

    #[test]
    fn test_adopting_locations_forgets_misses() {
        let dir = TempDir::new().unwrap();
        fs::create_dir_all(dir.path().join("app")).unwrap();
        fs::write(dir.path().join("app/Helpers.java"), "package app; class Formatter {}").unwrap();
        let index = index(dir.path());

        assert!(index.solve("app.Formatter").is_none());

        let locations = index.scan_locations();
        index.use_locations(Some(Rc::new(locations)));

        assert!(index.solve("app.Formatter").is_some());
    }
}
