pub mod application;
pub mod connector;
pub mod domain;

pub use application::{
    AnalysisOutcome, AnalyzeDependenciesUseCase, ClassLocationCache, ClassLocationScanner,
    ClassLocationStore, CollectDependenciesUseCase, DependencyCollection, ExploreReachabilityUseCase,
    ExportMetadata, InspectCallsUseCase, LocateMethodUseCase, Reachability, ReachedType,
    ReportExporter, SolvedType, SourceIndex, TypeResolver,
};

pub use connector::{
    ArchiveTypeResolver, Container, ContainerConfig, JavaParser, JsonClassLocationStore,
    JsonReportExporter, PlatformTypeResolver, SourceRootResolver, SourceTreeIndex, TypeIndex,
};

pub use domain::{
    AnalysisConfig, CallInspection, CallSite, ClassLocations, ClassSymbols, CompilationUnit,
    DependencyReport, Diagnostic, DomainError, ExclusionFilter, MethodSelector, MethodTarget,
    OutputConfig, ReferenceKind, ResolutionError, ResolvedType, SymbolReference,
};
