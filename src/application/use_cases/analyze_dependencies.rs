use std::path::PathBuf;
use std::rc::Rc;

use tracing::{info, warn};

use super::{CollectDependenciesUseCase, LocateMethodUseCase};
use crate::application::{ExportMetadata, ReportExporter};
use crate::domain::{DependencyReport, DomainError, MethodSelector, MethodTarget};

/// Result of one analysis run.
#[derive(Debug)]
pub struct AnalysisOutcome {
    pub targets: Vec<MethodTarget>,
    pub report: DependencyReport,
    pub export_path: Option<PathBuf>,
    /// Set when exporting failed; the report is still complete.
    pub export_error: Option<DomainError>,
}

/// Use case: locate targets, collect their dependencies into one merged
/// report and optionally export it.
pub struct AnalyzeDependenciesUseCase {
    locator: Rc<LocateMethodUseCase>,
    collector: Rc<CollectDependenciesUseCase>,
    exporter: Rc<dyn ReportExporter>,
}

impl AnalyzeDependenciesUseCase {
    pub fn new(
        locator: Rc<LocateMethodUseCase>,
        collector: Rc<CollectDependenciesUseCase>,
        exporter: Rc<dyn ReportExporter>,
    ) -> Self {
        Self {
            locator,
            collector,
            exporter,
        }
    }

    pub fn analyze(
        &self,
        selectors: &[MethodSelector],
        export: bool,
    ) -> Result<AnalysisOutcome, DomainError> {
        if selectors.is_empty() {
            return Err(DomainError::invalid_input("No target method given"));
        }

        let mut targets = Vec::with_capacity(selectors.len());
        let mut report = DependencyReport::new();

        for selector in selectors {
            let target = self
                .locator
                .locate(selector)?
                .ok_or_else(|| DomainError::not_found(format!("Method {}", selector.describe())))?;
            info!("Analyzing {} ({})", target.qualified_method(), target.location());

            let collected = self.collector.collect(&target)?;
            report.merge(&collected);
            targets.push(target);
        }

        let mut outcome = AnalysisOutcome {
            targets,
            report,
            export_path: None,
            export_error: None,
        };

        if export {
            let metadata = export_metadata(&outcome.targets);
            match self.exporter.export(&outcome.report, &metadata) {
                Ok(path) => {
                    info!("Report exported to {}", path.display());
                    outcome.export_path = Some(path);
                }
                Err(e) => {
                    warn!("Report export failed: {}", e);
                    outcome.export_error = Some(e);
                }
            }
        }

        Ok(outcome)
    }
}

fn export_metadata(targets: &[MethodTarget]) -> ExportMetadata {
    let source_file = targets
        .first()
        .map(|t| t.source_file.clone())
        .unwrap_or_default();
    let method_name = targets
        .iter()
        .map(|t| t.method_name.as_str())
        .collect::<Vec<_>>()
        .join("_");
    ExportMetadata::new(source_file, method_name)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::SourceSpan;

    #[test]
    fn test_metadata_joins_method_names() {
        let targets = vec![
            MethodTarget::method(
                "app.Svc",
                "create",
                "create()",
                PathBuf::from("/src/app/Svc.java"),
                3,
                9,
                SourceSpan::new(10, 90),
            ),
            MethodTarget::method(
                "app.Svc",
                "update",
                "update()",
                PathBuf::from("/src/app/Svc.java"),
                11,
                20,
                SourceSpan::new(100, 190),
            ),
        ];

        let metadata = export_metadata(&targets);

        assert_eq!(metadata.method_name, "create_update");
        assert_eq!(metadata.source_file, PathBuf::from("/src/app/Svc.java"));
    }
}
