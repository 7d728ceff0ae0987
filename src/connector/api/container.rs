use std::cell::RefCell;
use std::path::PathBuf;
use std::rc::Rc;

use anyhow::Result;
use tracing::{debug, warn};

use crate::application::{
    AnalyzeDependenciesUseCase, ClassLocationCache, ClassLocationScanner, ClassLocationStore,
    CollectDependenciesUseCase, ExploreReachabilityUseCase, InspectCallsUseCase,
    LocateMethodUseCase, ReportExporter, SourceIndex,
};
use crate::connector::adapter::{
    ArchiveTypeResolver, JsonClassLocationStore, JsonReportExporter, LocationHints,
    PlatformTypeResolver, SourceRootResolver, SourceTreeIndex, TypeIndex,
};
use crate::domain::{AnalysisConfig, OutputConfig};

#[derive(Debug, Clone, Default)]
pub struct ContainerConfig {
    pub analysis: AnalysisConfig,
    pub output: OutputConfig,
}

/// Builds the resolver chain for one analysis session and hands out the
/// use cases that share it.
pub struct Container {
    index: Rc<TypeIndex>,
    locations: Rc<ClassLocationCache>,
    locator: Rc<LocateMethodUseCase>,
    collector: Rc<CollectDependenciesUseCase>,
    exporter: Rc<dyn ReportExporter>,
    config: ContainerConfig,
}

impl Container {
    pub fn new(config: ContainerConfig) -> Result<Self> {
        let analysis = &config.analysis;
        if analysis.source_roots.is_empty() {
            anyhow::bail!("At least one source root is required");
        }

        let tree = Rc::new(SourceTreeIndex::new(analysis.source_roots.clone()));
        let hints: LocationHints = Rc::new(RefCell::new(None));

        // Source roots first, then archives, then the platform library.
        let mut index = TypeIndex::new(Rc::clone(&tree), Rc::clone(&hints));
        for root in tree.roots() {
            index = index.with_resolver(Box::new(SourceRootResolver::new(
                root.clone(),
                Rc::clone(&tree),
                Rc::clone(&hints),
            )));
        }
        for archive in &analysis.archives {
            match ArchiveTypeResolver::open(archive) {
                Ok(resolver) => index = index.with_resolver(Box::new(resolver)),
                Err(e) => warn!("Skipping archive {}: {}", archive.display(), e),
            }
        }
        let index = Rc::new(index.with_resolver(Box::new(PlatformTypeResolver::new())));
        debug!("Resolver chain: {}", index.resolver_names().join(", "));

        let store: Option<Rc<dyn ClassLocationStore>> = analysis.cache_file.as_ref().map(|path| {
            debug!("Using class location cache at {}", path.display());
            Rc::new(JsonClassLocationStore::new(path.clone())) as Rc<dyn ClassLocationStore>
        });

        let locations = Rc::new(ClassLocationCache::new(
            Rc::clone(&index) as Rc<dyn ClassLocationScanner>,
            store,
        ));
        let locator = Rc::new(LocateMethodUseCase::new(
            Rc::clone(&index) as Rc<dyn SourceIndex>,
            Rc::clone(&locations),
        ));
        let collector = Rc::new(CollectDependenciesUseCase::new(
            Rc::clone(&index) as Rc<dyn SourceIndex>,
            analysis.exclusions.clone(),
            analysis.ignore_unresolved,
        ));

        if config.output.file_name_prefix.is_empty() {
            anyhow::bail!("Report file name prefix must not be empty");
        }
        let exporter: Rc<dyn ReportExporter> = Rc::new(JsonReportExporter::new(config.output.clone()));

        Ok(Self {
            index,
            locations,
            locator,
            collector,
            exporter,
            config,
        })
    }

    pub fn config(&self) -> &ContainerConfig {
        &self.config
    }

    pub fn type_index(&self) -> Rc<TypeIndex> {
        Rc::clone(&self.index)
    }

    pub fn class_locations(&self) -> Rc<ClassLocationCache> {
        Rc::clone(&self.locations)
    }

    pub fn locate_use_case(&self) -> Rc<LocateMethodUseCase> {
        Rc::clone(&self.locator)
    }

    pub fn collect_use_case(&self) -> Rc<CollectDependenciesUseCase> {
        Rc::clone(&self.collector)
    }

    pub fn analyze_use_case(&self) -> AnalyzeDependenciesUseCase {
        AnalyzeDependenciesUseCase::new(
            Rc::clone(&self.locator),
            Rc::clone(&self.collector),
            Rc::clone(&self.exporter),
        )
    }

    pub fn inspect_calls_use_case(&self) -> InspectCallsUseCase {
        InspectCallsUseCase::new(
            Rc::clone(&self.index) as Rc<dyn SourceIndex>,
            Rc::clone(&self.locator),
            Rc::clone(&self.locations),
        )
    }

    pub fn reachability_use_case(&self) -> ExploreReachabilityUseCase {
        ExploreReachabilityUseCase::new(
            Rc::clone(&self.index) as Rc<dyn SourceIndex>,
            self.config.analysis.exclusions.clone(),
        )
    }

    /// The cache file in use, if any.
    pub fn cache_file(&self) -> Option<PathBuf> {
        self.config.analysis.cache_file.clone()
    }
}

