use std::path::Path;
use std::rc::Rc;

use tracing::{debug, warn};

use super::ClassLocationCache;
use crate::application::SourceIndex;
use crate::domain::{
    CompilationUnit, DomainError, MethodDeclaration, MethodSelector, MethodTarget,
    TypeDeclaration,
};

/// Finds the code a dependency analysis starts from.
pub struct LocateMethodUseCase {
    index: Rc<dyn SourceIndex>,
    locations: Rc<ClassLocationCache>,
}

impl LocateMethodUseCase {
    pub fn new(index: Rc<dyn SourceIndex>, locations: Rc<ClassLocationCache>) -> Self {
        Self { index, locations }
    }

    pub fn locate(&self, selector: &MethodSelector) -> Result<Option<MethodTarget>, DomainError> {
        // Collection needs the map for types declared in files named differently.
        self.locations.locations();

        match selector {
            MethodSelector::ByName {
                class_name,
                method_name,
            } => Ok(self.by_name(class_name, method_name)),
            MethodSelector::InFile { file, method_name } => self.in_file(file, method_name),
            MethodSelector::ByRange {
                file,
                start_line,
                end_line,
            } => self.by_range(file, *start_line, *end_line).map(Some),
        }
    }

    /// First method named `method_name` in the first type whose qualified
    /// name matches `class_identifier` segment-wise.
    ///
    /// `class_identifier` may be a simple name, `Outer.Inner`, a dotted or
    /// slash-separated path fragment, with or without a `.java` suffix.
    /// A constructor matches when `method_name` is the type's simple name.
    pub fn by_name(&self, class_identifier: &str, method_name: &str) -> Option<MethodTarget> {
        let identifier = normalize_class_identifier(class_identifier);
        if identifier.is_empty() {
            return None;
        }
        let segments: Vec<&str> = identifier.split('.').collect();

        let locations = self.locations.locations();
        let mut files: Vec<&Path> = Vec::new();
        for (_, path) in locations.iter() {
            if !files.contains(&path) {
                files.push(path);
            }
        }

        // Files whose top-level type names a segment go first; nested types
        // are only visible after parsing, so the rest are searched on a miss.
        let (likely, rest): (Vec<&Path>, Vec<&Path>) = files.into_iter().partition(|path| {
            locations
                .iter()
                .any(|(name, p)| p == *path && segments.contains(&simple_name(name)))
        });

        likely
            .into_iter()
            .chain(rest)
            .find_map(|path| self.find_in_file(path, &identifier, method_name))
    }

    fn find_in_file(
        &self,
        path: &Path,
        identifier: &str,
        method_name: &str,
    ) -> Option<MethodTarget> {
        let unit = match self.index.compilation_unit(path) {
            Ok(unit) => unit,
            Err(e) => {
                warn!("Skipping {}: {}", path.display(), e);
                return None;
            }
        };

        for declaration in &unit.types {
            if !matches_class_identifier(&declaration.qualified_name, identifier) {
                continue;
            }
            match first_method(declaration, method_name) {
                Some(method) => return Some(method_target(&unit, declaration, method)),
                None => debug!(
                    "{} matches `{}` but declares no `{}`",
                    declaration.qualified_name, identifier, method_name
                ),
            }
        }
        None
    }

    /// First method named `method_name` declared anywhere in `file`.
    pub fn in_file(
        &self,
        file: &Path,
        method_name: &str,
    ) -> Result<Option<MethodTarget>, DomainError> {
        let unit = self.index.compilation_unit(file)?;

        Ok(unit.types.iter().find_map(|declaration| {
            first_method(declaration, method_name)
                .map(|method| method_target(&unit, declaration, method))
        }))
    }

    /// A target covering lines `start_line..=end_line` of `file`.
    pub fn by_range(
        &self,
        file: &Path,
        start_line: u32,
        end_line: u32,
    ) -> Result<MethodTarget, DomainError> {
        if start_line == 0 || end_line < start_line {
            return Err(DomainError::invalid_input(format!(
                "Invalid line range {}-{} for {}",
                start_line,
                end_line,
                file.display()
            )));
        }

        let unit = self.index.compilation_unit(file)?;
        let owner = unit
            .type_at_line(start_line)
            .or_else(|| unit.top_level_types().next())
            .map(|t| t.qualified_name.clone())
            .unwrap_or_else(|| unit.qualify(&file_stem(file)));

        Ok(MethodTarget::line_range(
            owner,
            unit.path.clone(),
            start_line,
            end_line,
        ))
    }
}

fn first_method<'a>(
    declaration: &'a TypeDeclaration,
    method_name: &'a str,
) -> Option<&'a MethodDeclaration> {
    declaration
        .methods_named(method_name)
        .find(|m| m.span.is_some())
}

fn method_target(
    unit: &CompilationUnit,
    declaration: &TypeDeclaration,
    method: &MethodDeclaration,
) -> MethodTarget {
    let span = method.span.unwrap_or_default();
    MethodTarget::method(
        declaration.qualified_name.clone(),
        method.name.clone(),
        method.signature(),
        unit.path.clone(),
        method.start_line,
        method.end_line,
        span,
    )
}

/// `com/acme/Foo.java` → `com.acme.Foo`.
pub fn normalize_class_identifier(identifier: &str) -> String {
    let trimmed = identifier.trim();
    let trimmed = trimmed.strip_suffix(".java").unwrap_or(trimmed);
    trimmed
        .replace(['/', '\\'], ".")
        .trim_matches('.')
        .to_string()
}

/// Whether `qualified_name` and `identifier` agree on whole trailing
/// segments: either is a dotted suffix of the other.
pub fn matches_class_identifier(qualified_name: &str, identifier: &str) -> bool {
    qualified_name == identifier
        || qualified_name.ends_with(&format!(".{}", identifier))
        || identifier.ends_with(&format!(".{}", qualified_name))
}

fn simple_name(qualified_name: &str) -> &str {
    qualified_name.rsplit('.').next().unwrap_or(qualified_name)
}

fn file_stem(path: &Path) -> String {
    path.file_stem()
        .map(|s| s.to_string_lossy().to_string())
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_class_identifier() {
        assert_eq!(normalize_class_identifier("Foo"), "Foo");
        assert_eq!(normalize_class_identifier("com/acme/Foo.java"), "com.acme.Foo");
        assert_eq!(normalize_class_identifier("com\\acme\\Foo"), "com.acme.Foo");
        assert_eq!(normalize_class_identifier(" Outer.Inner "), "Outer.Inner");
    }

    #[test]
    fn test_suffix_match_is_segment_aware() {
        assert!(matches_class_identifier("com.acme.Foo", "Foo"));
        assert!(matches_class_identifier("com.acme.Foo", "acme.Foo"));
        assert!(matches_class_identifier("com.acme.Outer.Inner", "Outer.Inner"));
        assert!(!matches_class_identifier("com.acme.BarFoo", "Foo"));
        assert!(!matches_class_identifier("com.acme.Foo", "cme.Foo"));
    }

    #[test]
    fn test_path_fragment_longer_than_qualified_name() {
        assert!(matches_class_identifier(
            "com.acme.Foo",
            "src.main.java.com.acme.Foo"
        ));
    }
}
