use std::fs::{self, File};
use std::io::BufReader;
use std::path::{Path, PathBuf};

use tempfile::NamedTempFile;
use tracing::debug;

use crate::application::ClassLocationStore;
use crate::domain::{ClassLocations, DomainError};

/// Stores the class location map as one JSON object in a file.
///
/// Saves go through a temporary file in the same directory that is renamed
/// over the target, so a reader sees either the old map or the new one.
pub struct JsonClassLocationStore {
    path: PathBuf,
}

impl JsonClassLocationStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl ClassLocationStore for JsonClassLocationStore {
    fn path(&self) -> &Path {
        &self.path
    }

    fn load(&self) -> Result<Option<ClassLocations>, DomainError> {
        if !self.path.exists() {
            return Ok(None);
        }

        let file = File::open(&self.path)?;
        let locations: ClassLocations = serde_json::from_reader(BufReader::new(file))
            .map_err(|e| {
                DomainError::cache(format!("Corrupt cache file {}: {}", self.path.display(), e))
            })?;

        debug!("Loaded {} class locations from {}", locations.len(), self.path.display());
        Ok(Some(locations))
    }

    fn save(&self, locations: &ClassLocations) -> Result<(), DomainError> {
        let parent = match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
            _ => PathBuf::from("."),
        };
        fs::create_dir_all(&parent)?;

        let mut temp = NamedTempFile::new_in(&parent)?;
        serde_json::to_writer_pretty(&mut temp, locations).map_err(|e| {
            DomainError::cache(format!("Failed to write {}: {}", self.path.display(), e))
        })?;
        temp.persist(&self.path).map_err(|e| {
            DomainError::cache(format!("Failed to replace {}: {}", self.path.display(), e))
        })?;

        debug!("Saved {} class locations to {}", locations.len(), self.path.display());
        Ok(())
    }

    fn clear(&self) -> Result<(), DomainError> {
        if self.path.exists() {
            fs::remove_file(&self.path)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn sample() -> ClassLocations {
        vec![
            ("app.Order".to_string(), PathBuf::from("/src/app/Order.java")),
            ("app.Shapes.Circle".to_string(), PathBuf::from("/src/app/Shapes.java")),
        ]
        .into_iter()
        .collect()
    }

    #[test]
    fn test_missing_file_loads_none() {
        let dir = TempDir::new().unwrap();
        let store = JsonClassLocationStore::new(dir.path().join("cache.json"));

        assert!(store.load().unwrap().is_none());
    }

    #[test]
    fn test_save_then_load_round_trips() {
        let dir = TempDir::new().unwrap();
        let store = JsonClassLocationStore::new(dir.path().join("nested/cache.json"));

        store.save(&sample()).unwrap();

        assert_eq!(store.load().unwrap(), Some(sample()));
    }

    #[test]
    fn test_corrupt_file_is_a_cache_error() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("cache.json");
        fs::write(&path, "{ not json").unwrap();

        let err = JsonClassLocationStore::new(&path).load().unwrap_err();

        assert!(matches!(err, DomainError::CacheError(_)));
        assert!(err.to_string().contains("cache.json"));
    }

    #[test]
    fn test_clear_removes_file() {
        let dir = TempDir::new().unwrap();
        let store = JsonClassLocationStore::new(dir.path().join("cache.json"));
        store.save(&sample()).unwrap();

        store.clear().unwrap();
        store.clear().unwrap();

        assert!(store.load().unwrap().is_none());
    }
}
