use std::collections::HashSet;
use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};

use tracing::debug;
use zip::ZipArchive;

use crate::application::{SolvedType, TypeResolver};
use crate::domain::{DomainError, TypeOrigin};

/// Types packaged as `.class` entries of one jar or zip archive.
///
/// Only names are known: every type solved here is opaque.
pub struct ArchiveTypeResolver {
    path: PathBuf,
    types: HashSet<String>,
    packages: HashSet<String>,
}

impl ArchiveTypeResolver {
    pub fn open(path: &Path) -> Result<Self, DomainError> {
        let file = File::open(path)
            .map_err(|e| DomainError::not_found(format!("Archive {}: {}", path.display(), e)))?;
        let mut archive = ZipArchive::new(BufReader::new(file)).map_err(|e| {
            DomainError::parse(format!("Failed to read archive {}: {}", path.display(), e))
        })?;

        let mut entries = Vec::with_capacity(archive.len());
        for i in 0..archive.len() {
            let entry = archive.by_index(i).map_err(|e| {
                DomainError::parse(format!("Failed to read archive {}: {}", path.display(), e))
            })?;
            entries.push(entry.name().to_string());
        }

        let resolver = Self::from_entries(path.to_path_buf(), entries.iter().map(String::as_str));
        debug!(
            "Archive {} provides {} types",
            path.display(),
            resolver.types.len()
        );
        Ok(resolver)
    }

    pub fn from_entries<'a>(path: PathBuf, entries: impl IntoIterator<Item = &'a str>) -> Self {
        let mut types = HashSet::new();
        let mut packages = HashSet::new();

        for entry in entries {
            let Some(qualified_name) = class_entry_name(entry) else {
                continue;
            };
            if let Some((package, _)) = entry
                .strip_suffix(".class")
                .and_then(|e| e.rsplit_once('/'))
            {
                packages.insert(package.replace('/', "."));
            }
            types.insert(qualified_name);
        }

        Self {
            path,
            types,
            packages,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn type_count(&self) -> usize {
        self.types.len()
    }
}

/// `a/b/Outer$Inner.class` → `a.b.Outer.Inner`. Metadata, module and
/// package descriptors and anonymous classes yield `None`.
fn class_entry_name(entry: &str) -> Option<String> {
    if entry.starts_with("META-INF/") {
        return None;
    }
    let stem = entry.strip_suffix(".class")?;
    let file_name = stem.rsplit('/').next().unwrap_or(stem);
    if file_name == "module-info" || file_name == "package-info" {
        return None;
    }

    let dotted = stem.replace(['/', '$'], ".");
    let anonymous = dotted
        .split('.')
        .any(|segment| segment.is_empty() || segment.starts_with(|c: char| c.is_ascii_digit()));
    if anonymous {
        return None;
    }
    Some(dotted)
}

impl TypeResolver for ArchiveTypeResolver {
    fn origin(&self) -> TypeOrigin {
        TypeOrigin::Archive
    }

    fn describe(&self) -> String {
        format!("archive {}", self.path.display())
    }

    fn solve_type(&self, qualified_name: &str) -> Option<SolvedType> {
        self.types
            .contains(qualified_name)
            .then(|| SolvedType::opaque(qualified_name, TypeOrigin::Archive))
    }

    fn has_package(&self, package: &str) -> bool {
        self.packages.contains(package)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::TempDir;
    use zip::write::SimpleFileOptions;
    use zip::ZipWriter;

    #[test]
    fn test_class_entry_names() {
        assert_eq!(class_entry_name("a/b/Foo.class").as_deref(), Some("a.b.Foo"));
        assert_eq!(class_entry_name("a/b/Foo$Bar.class").as_deref(), Some("a.b.Foo.Bar"));
        assert_eq!(class_entry_name("a/b/Foo$1.class"), None);
        assert_eq!(class_entry_name("module-info.class"), None);
        assert_eq!(class_entry_name("a/package-info.class"), None);
        assert_eq!(class_entry_name("META-INF/versions/9/a/Foo.class"), None);
        assert_eq!(class_entry_name("a/b/readme.txt"), None);
    }

    #[test]
    fn test_open_lists_archive_types() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("lib.jar");
        {
            let file = File::create(&path).unwrap();
            let mut zip = ZipWriter::new(file);
            let options =
                SimpleFileOptions::default().compression_method(zip::CompressionMethod::Deflated);
            for name in ["META-INF/MANIFEST.MF", "org/lib/Client.class", "org/lib/Client$Config.class"] {
                zip.start_file(name, options).unwrap();
                zip.write_all(b"\xca\xfe\xba\xbe").unwrap();
            }
            zip.finish().unwrap();
        }

        let resolver = ArchiveTypeResolver::open(&path).unwrap();

        assert_eq!(resolver.type_count(), 2);
        assert!(resolver.solve_type("org.lib.Client").unwrap().is_opaque());
        assert!(resolver.solve_type("org.lib.Client.Config").is_some());
        assert!(resolver.has_package("org.lib"));
        assert!(!resolver.has_package("org"));
    }

    #[test]
    fn test_open_rejects_non_archive() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("broken.jar");
        std::fs::write(&path, b"not a zip").unwrap();

        assert!(ArchiveTypeResolver::open(&path).is_err());
    }
}
