use std::cell::RefCell;
use std::path::{Path, PathBuf};
use std::rc::Rc;

use tracing::{debug, warn};

use super::source_tree_index::SourceTreeIndex;
use crate::application::{SolvedType, TypeResolver};
use crate::domain::{ClassLocations, TypeOrigin};

/// The class location map currently adopted by the cache, shared with every
/// source root resolver.
pub type LocationHints = Rc<RefCell<Option<Rc<ClassLocations>>>>;

/// Solves types declared under one source root.
///
/// `a.b.C` is looked up at `a/b/C.java` and `a.b.C.D` additionally at
/// `a/b/C.java` as a member type. Types declared in files named differently
/// are found through the class location map, when one has been adopted.
pub struct SourceRootResolver {
    root: PathBuf,
    tree: Rc<SourceTreeIndex>,
    hints: LocationHints,
}

impl SourceRootResolver {
    pub fn new(root: PathBuf, tree: Rc<SourceTreeIndex>, hints: LocationHints) -> Self {
        let root = root.canonicalize().unwrap_or(root);
        Self { root, tree, hints }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn solve_in_file(&self, path: &Path, qualified_name: &str) -> Option<SolvedType> {
        let parsed = match self.tree.parse_file(path) {
            Ok(parsed) => parsed,
            Err(e) => {
                warn!("Cannot use {} to solve {}: {}", path.display(), qualified_name, e);
                return None;
            }
        };
        let index = parsed.unit.type_index(qualified_name)?;
        Some(SolvedType::Source {
            unit: Rc::clone(&parsed.unit),
            index,
        })
    }

    fn by_path(&self, qualified_name: &str) -> Option<SolvedType> {
        let segments: Vec<&str> = qualified_name.split('.').collect();

        for top in (0..segments.len()).rev() {
            let mut path = self.root.clone();
            for package in &segments[..top] {
                path.push(package);
            }
            path.push(format!("{}.java", segments[top]));

            if path.is_file() {
                if let Some(solved) = self.solve_in_file(&path, qualified_name) {
                    return Some(solved);
                }
            }
        }
        None
    }

    fn by_hint(&self, qualified_name: &str) -> Option<SolvedType> {
        let path = {
            let hints = self.hints.borrow();
            let locations = hints.as_ref()?;
            let mut candidate = qualified_name;
            loop {
                if let Some(path) = locations.get(candidate) {
                    break path.to_path_buf();
                }
                candidate = candidate.rsplit_once('.')?.0;
            }
        };

        if !path.starts_with(&self.root) {
            return None;
        }
        debug!("Solving {} through {}", qualified_name, path.display());
        self.solve_in_file(&path, qualified_name)
    }
}

impl TypeResolver for SourceRootResolver {
    fn origin(&self) -> TypeOrigin {
        TypeOrigin::Source
    }

    fn describe(&self) -> String {
        format!("source root {}", self.root.display())
    }

    fn solve_type(&self, qualified_name: &str) -> Option<SolvedType> {
        self.by_path(qualified_name)
            .or_else(|| self.by_hint(qualified_name))
    }

    fn has_package(&self, package: &str) -> bool {
        let mut dir = self.root.clone();
        for segment in package.split('.') {
            dir.push(segment);
        }
        if dir.is_dir() {
            return true;
        }

        let hints = self.hints.borrow();
        let prefix = format!("{}.", package);
        hints.as_ref().map_or(false, |locations| {
            locations.iter().any(|(name, path)| {
                name.starts_with(&prefix)
                    && !name[prefix.len()..].contains('.')
                    && path.starts_with(&self.root)
            })
        })
    }
}
