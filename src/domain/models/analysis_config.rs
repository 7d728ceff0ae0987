use std::path::PathBuf;

use serde::{Deserialize, Serialize};

pub const DEFAULT_EXCLUDED_PREFIXES: &[&str] =
    &["java.", "javax.", "jdk.", "sun.", "org.w3c.", "org.xml."];

/// Qualified-name prefixes whose owners never appear in a report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExclusionFilter {
    prefixes: Vec<String>,
}

impl ExclusionFilter {
    pub fn new(prefixes: impl IntoIterator<Item = impl Into<String>>) -> Self {
        Self {
            prefixes: prefixes.into_iter().map(Into::into).collect(),
        }
    }

    pub fn none() -> Self {
        Self {
            prefixes: Vec::new(),
        }
    }

    pub fn is_excluded(&self, qualified_name: &str) -> bool {
        self.prefixes
            .iter()
            .any(|prefix| qualified_name.starts_with(prefix.as_str()))
    }

    pub fn prefixes(&self) -> &[String] {
        &self.prefixes
    }
}

impl Default for ExclusionFilter {
    fn default() -> Self {
        Self::new(DEFAULT_EXCLUDED_PREFIXES.iter().copied())
    }
}

/// Settings for one analysis session.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisConfig {
    pub source_roots: Vec<PathBuf>,
    pub archives: Vec<PathBuf>,
    /// Record unresolved expressions as diagnostics instead of failing.
    pub ignore_unresolved: bool,
    pub exclusions: ExclusionFilter,
    pub cache_file: Option<PathBuf>,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            source_roots: Vec::new(),
            archives: Vec::new(),
            ignore_unresolved: true,
            exclusions: ExclusionFilter::default(),
            cache_file: None,
        }
    }
}

impl AnalysisConfig {
    pub fn new(source_roots: Vec<PathBuf>) -> Self {
        Self {
            source_roots,
            ..Self::default()
        }
    }

    pub fn with_archives(mut self, archives: Vec<PathBuf>) -> Self {
        self.archives = archives;
        self
    }

    pub fn with_ignore_unresolved(mut self, ignore_unresolved: bool) -> Self {
        self.ignore_unresolved = ignore_unresolved;
        self
    }

    pub fn with_exclusions(mut self, exclusions: ExclusionFilter) -> Self {
        self.exclusions = exclusions;
        self
    }

    pub fn with_cache_file(mut self, cache_file: impl Into<PathBuf>) -> Self {
        self.cache_file = Some(cache_file.into());
        self
    }
}

/// Where exported reports are written.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutputConfig {
    pub output_directory: PathBuf,
    pub file_name_prefix: String,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            output_directory: PathBuf::from("output/reports"),
            file_name_prefix: "analysis".to_string(),
        }
    }
}

impl OutputConfig {
    pub fn new(output_directory: impl Into<PathBuf>, file_name_prefix: impl Into<String>) -> Self {
        Self {
            output_directory: output_directory.into(),
            file_name_prefix: file_name_prefix.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_exclusions() {
        let filter = ExclusionFilter::default();

        assert!(filter.is_excluded("java.util.List"));
        assert!(filter.is_excluded("javax.inject.Inject"));
        assert!(filter.is_excluded("org.w3c.dom.Node"));
        assert!(!filter.is_excluded("com.acme.Foo"));
        assert!(!filter.is_excluded("javafx.scene.Node"));
    }

    #[test]
    fn test_config_defaults() {
        let config = AnalysisConfig::new(vec![PathBuf::from("src")]);

        assert!(config.ignore_unresolved);
        assert!(config.cache_file.is_none());
        assert_eq!(OutputConfig::default().file_name_prefix, "analysis");
    }
}
