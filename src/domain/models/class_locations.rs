use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

/// Qualified name of every top-level type mapped to the file declaring it.
///
/// Serialized as a flat JSON object.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ClassLocations(BTreeMap<String, PathBuf>);

impl ClassLocations {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records a location. The first file seen for a name wins.
    pub fn insert(&mut self, qualified_name: impl Into<String>, path: PathBuf) -> bool {
        let qualified_name = qualified_name.into();
        if self.0.contains_key(&qualified_name) {
            return false;
        }
        self.0.insert(qualified_name, path);
        true
    }

    pub fn get(&self, qualified_name: &str) -> Option<&Path> {
        self.0.get(qualified_name).map(PathBuf::as_path)
    }

    pub fn contains(&self, qualified_name: &str) -> bool {
        self.0.contains_key(qualified_name)
    }

    /// Entries in qualified-name order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Path)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_path()))
    }

    /// Qualified names whose last segment equals `simple_name`.
    pub fn with_simple_name<'a>(
        &'a self,
        simple_name: &'a str,
    ) -> impl Iterator<Item = (&'a str, &'a Path)> + 'a {
        self.iter().filter(move |(name, _)| {
            name.rsplit('.').next().map_or(false, |last| last == simple_name)
        })
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn clear(&mut self) {
        self.0.clear();
    }
}

impl FromIterator<(String, PathBuf)> for ClassLocations {
    fn from_iter<I: IntoIterator<Item = (String, PathBuf)>>(iter: I) -> Self {
        let mut locations = Self::new();
        for (name, path) in iter {
            locations.insert(name, path);
        }
        locations
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_first_location_wins() {
        let mut locations = ClassLocations::new();

        assert!(locations.insert("pkg.Foo", PathBuf::from("/a/Foo.java")));
        assert!(!locations.insert("pkg.Foo", PathBuf::from("/b/Foo.java")));
        assert_eq!(locations.get("pkg.Foo"), Some(Path::new("/a/Foo.java")));
    }

    #[test]
    fn test_serializes_as_flat_object() {
        let locations: ClassLocations = vec![
            ("b.Bar".to_string(), PathBuf::from("/src/b/Bar.java")),
            ("a.Foo".to_string(), PathBuf::from("/src/a/Foo.java")),
        ]
        .into_iter()
        .collect();

        let json = serde_json::to_string(&locations).unwrap();
        assert_eq!(
            json,
            r#"{"a.Foo":"/src/a/Foo.java","b.Bar":"/src/b/Bar.java"}"#
        );

        let back: ClassLocations = serde_json::from_str(&json).unwrap();
        assert_eq!(back, locations);
    }

    #[test]
    fn test_with_simple_name_matches_last_segment() {
        let locations: ClassLocations = vec![
            ("a.Foo".to_string(), PathBuf::from("/a/Foo.java")),
            ("b.Foo".to_string(), PathBuf::from("/b/Foo.java")),
            ("b.FooBar".to_string(), PathBuf::from("/b/FooBar.java")),
        ]
        .into_iter()
        .collect();

        let names: Vec<&str> = locations.with_simple_name("Foo").map(|(n, _)| n).collect();
        assert_eq!(names, vec!["a.Foo", "b.Foo"]);
    }
}
