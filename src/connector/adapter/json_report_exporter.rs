use std::collections::BTreeMap;
use std::fs::{self, File};
use std::io::BufWriter;
use std::path::{Path, PathBuf};

use serde::Serialize;
use tracing::info;

use crate::application::{ExportMetadata, ReportExporter};
use crate::domain::{DependencyReport, Diagnostic, DomainError, OutputConfig};

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ExportedReport<'a> {
    source_file: String,
    method: &'a str,
    analysis_time: String,
    total_classes: usize,
    dependencies: BTreeMap<&'a str, ExportedClass>,
    unresolved: &'a [Diagnostic],
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ExportedClass {
    fields: usize,
    enums: usize,
    annotations: usize,
    methods: usize,
    is_type: bool,
}

/// Writes each report as a timestamped JSON file under the output directory.
pub struct JsonReportExporter {
    config: OutputConfig,
}

impl JsonReportExporter {
    pub fn new(config: OutputConfig) -> Self {
        Self { config }
    }

    /// `{dir}/{prefix}_{stem}_{method}_{yyyyMMdd_HHmmss_SSS}.json`, with a
    /// numeric suffix when that file already exists.
    pub fn report_path(&self, metadata: &ExportMetadata) -> PathBuf {
        let stem = metadata
            .source_file
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_else(|| "unknown".to_string());
        let base = format!(
            "{}_{}_{}_{}",
            self.config.file_name_prefix,
            sanitize(&stem),
            sanitize(&metadata.method_name),
            metadata.analyzed_at.format("%Y%m%d_%H%M%S_%3f")
        );

        let dir = &self.config.output_directory;
        let mut path = dir.join(format!("{}.json", base));
        let mut suffix = 1;
        while path.exists() {
            path = dir.join(format!("{}_{}.json", base, suffix));
            suffix += 1;
        }
        path
    }
}

impl ReportExporter for JsonReportExporter {
    fn export(
        &self,
        report: &DependencyReport,
        metadata: &ExportMetadata,
    ) -> Result<PathBuf, DomainError> {
        fs::create_dir_all(&self.config.output_directory).map_err(|e| {
            DomainError::export(format!(
                "Cannot create {}: {}",
                self.config.output_directory.display(),
                e
            ))
        })?;

        let path = self.report_path(metadata);
        let exported = ExportedReport {
            source_file: metadata.source_file.display().to_string(),
            method: &metadata.method_name,
            analysis_time: metadata.analyzed_at.to_rfc3339(),
            total_classes: report.total_classes(),
            dependencies: report
                .classes()
                .iter()
                .map(|(owner, symbols)| {
                    (
                        owner.as_str(),
                        ExportedClass {
                            fields: symbols.fields.len(),
                            enums: symbols.enum_constants.len(),
                            annotations: symbols.annotations.len(),
                            methods: symbols.methods.len(),
                            is_type: symbols.referenced_as_type,
                        },
                    )
                })
                .collect(),
            unresolved: report.diagnostics(),
        };

        write_json(&path, &exported)?;
        info!("Exported report to {}", path.display());
        Ok(path)
    }
}

fn write_json(path: &Path, value: &impl Serialize) -> Result<(), DomainError> {
    let file = File::create(path)
        .map_err(|e| DomainError::export(format!("Cannot create {}: {}", path.display(), e)))?;
    serde_json::to_writer_pretty(BufWriter::new(file), value)
        .map_err(|e| DomainError::export(format!("Cannot write {}: {}", path.display(), e)))
}

/// Keeps file names portable: `<init>` or `lines 3-9` become `_init_`, `lines_3-9`.
fn sanitize(part: &str) -> String {
    part.chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '-' || c == '.' {
                c
            } else {
                '_'
            }
        })
        .collect()
}
