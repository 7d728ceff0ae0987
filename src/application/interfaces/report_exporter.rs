use std::path::PathBuf;

use chrono::{DateTime, Local};

use crate::domain::{DependencyReport, DomainError};

/// Run information written alongside a report.
#[derive(Debug, Clone)]
pub struct ExportMetadata {
    pub source_file: PathBuf,
    pub method_name: String,
    pub analyzed_at: DateTime<Local>,
}

impl ExportMetadata {
    pub fn new(source_file: impl Into<PathBuf>, method_name: impl Into<String>) -> Self {
        Self {
            source_file: source_file.into(),
            method_name: method_name.into(),
            analyzed_at: Local::now(),
        }
    }

    pub fn with_time(mut self, analyzed_at: DateTime<Local>) -> Self {
        self.analyzed_at = analyzed_at;
        self
    }
}

/// Serializes a report to durable storage.
pub trait ReportExporter {
    /// Writes the report and returns where it went. Never modifies `report`.
    fn export(
        &self,
        report: &DependencyReport,
        metadata: &ExportMetadata,
    ) -> Result<PathBuf, DomainError>;
}
