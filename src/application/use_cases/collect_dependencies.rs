use std::rc::Rc;

use tracing::{debug, info};

use crate::application::SourceIndex;
use crate::domain::{
    Diagnostic, DependencyReport, DomainError, ExclusionFilter, ExpressionSite, MemberKind,
    MemberRef, MethodTarget, NameTarget, ReferenceKind, Resolution, ResolutionError,
    ResolvedType, SiteKind, SymbolReference,
};

/// References and retained diagnostics for one target.
#[derive(Debug, Clone, Default)]
pub struct DependencyCollection {
    pub references: Vec<SymbolReference>,
    pub diagnostics: Vec<Diagnostic>,
}

impl DependencyCollection {
    pub fn into_report(self) -> DependencyReport {
        let mut report = DependencyReport::from_references(&self.references);
        for diagnostic in self.diagnostics {
            report.add_diagnostic(diagnostic);
        }
        report
    }
}

/// Turns resolved expression sites into symbol references.
///
/// Owners matching the exclusion filter are dropped. Sites that cannot be
/// resolved either become diagnostics or abort the run, depending on
/// `ignore_unresolved`.
pub struct SiteCollector<'a> {
    exclusions: &'a ExclusionFilter,
    ignore_unresolved: bool,
    collection: DependencyCollection,
}

impl<'a> SiteCollector<'a> {
    pub fn new(exclusions: &'a ExclusionFilter, ignore_unresolved: bool) -> Self {
        Self {
            exclusions,
            ignore_unresolved,
            collection: DependencyCollection::default(),
        }
    }

    pub fn collect(mut self, sites: &[ExpressionSite]) -> Result<DependencyCollection, DomainError> {
        for site in sites {
            self.visit(site)?;
        }
        Ok(self.collection)
    }

    fn visit(&mut self, site: &ExpressionSite) -> Result<(), DomainError> {
        match &site.kind {
            SiteKind::Construction(resolved)
            | SiteKind::ClassLiteral(resolved)
            | SiteKind::TypeReference(resolved) => match resolved {
                Ok(ty) => {
                    self.record_type(site, ty);
                    Ok(())
                }
                Err(reason) => self.unresolved(site, reason),
            },
            SiteKind::FieldAccess { name, resolution } => match resolution {
                Resolution::Resolved(member) => {
                    self.record_member(site, member);
                    Ok(())
                }
                Resolution::ScopeOnly { owner, reason } => {
                    let reference = self
                        .reference(owner, ReferenceKind::Field, site)
                        .with_member(name.as_str())
                        .with_diagnostic(reason.to_string());
                    self.push(reference);
                    Ok(())
                }
                Resolution::Unresolved { reason, .. } => self.unresolved(site, reason),
            },
            SiteKind::Name(target) => match target {
                Ok(NameTarget::Member(member)) => {
                    self.record_member(site, member);
                    Ok(())
                }
                Ok(NameTarget::Type(owner)) => {
                    let reference = self.reference(owner, ReferenceKind::Type, site);
                    self.push(reference);
                    Ok(())
                }
                Ok(NameTarget::Local) => Ok(()),
                Err(reason) => self.unresolved(site, reason),
            },
            SiteKind::Annotation { name, resolved } => match resolved {
                Ok(ty) => {
                    if let Some(owner) = ty.qualified_name() {
                        let simple = name.rsplit('.').next().unwrap_or(name);
                        let reference = self
                            .reference(owner, ReferenceKind::Annotation, site)
                            .with_member(simple);
                        self.push(reference);
                    }
                    Ok(())
                }
                Err(reason) => self.unresolved(site, reason),
            },
            SiteKind::MethodCall(call) => match &call.resolution {
                Resolution::Resolved(method) => {
                    let reference = self
                        .reference(&method.owner, ReferenceKind::MethodCall, site)
                        .with_member(method.signature.as_str());
                    self.push(reference);
                    Ok(())
                }
                Resolution::ScopeOnly { owner, reason } => {
                    let reference = self
                        .reference(owner, ReferenceKind::MethodCall, site)
                        .with_member(call.placeholder_signature())
                        .with_diagnostic(reason.to_string());
                    self.push(reference);
                    Ok(())
                }
                Resolution::Unresolved { reason, .. } => self.unresolved(site, reason),
            },
        }
    }

    fn record_type(&mut self, site: &ExpressionSite, ty: &ResolvedType) {
        // Arrays count as a use of their element type.
        if let Some(owner) = ty.innermost_reference() {
            let reference = self.reference(owner, ReferenceKind::Type, site);
            self.push(reference);
        }
    }

    fn record_member(&mut self, site: &ExpressionSite, member: &MemberRef) {
        let kind = match member.kind {
            MemberKind::Field => ReferenceKind::Field,
            MemberKind::EnumConstant => ReferenceKind::EnumConstant,
        };
        let reference = self
            .reference(&member.owner, kind, site)
            .with_member(member.name.as_str());
        self.push(reference);
    }

    fn reference(&self, owner: &str, kind: ReferenceKind, site: &ExpressionSite) -> SymbolReference {
        SymbolReference::new(owner, kind, site.line, site.column)
    }

    fn push(&mut self, reference: SymbolReference) {
        if self.exclusions.is_excluded(reference.owner()) {
            return;
        }
        self.collection.references.push(reference);
    }

    fn unresolved(&mut self, site: &ExpressionSite, reason: &ResolutionError) -> Result<(), DomainError> {
        if !self.ignore_unresolved {
            return Err(DomainError::unresolved(
                site.text.as_str(),
                site.line,
                reason.clone(),
            ));
        }

        debug!(
            "Ignoring unresolved {} `{}` at line {}: {}",
            site.kind.label(),
            site.text,
            site.line,
            reason
        );
        self.collection.diagnostics.push(Diagnostic::new(
            site.text.as_str(),
            site.kind.label(),
            site.line,
            site.column,
            reason.to_string(),
        ));
        Ok(())
    }
}

/// Use case: extract every external symbol a target references.
pub struct CollectDependenciesUseCase {
    index: Rc<dyn SourceIndex>,
    exclusions: ExclusionFilter,
    ignore_unresolved: bool,
}

impl CollectDependenciesUseCase {
    pub fn new(index: Rc<dyn SourceIndex>, exclusions: ExclusionFilter, ignore_unresolved: bool) -> Self {
        Self {
            index,
            exclusions,
            ignore_unresolved,
        }
    }

    pub fn collect_references(&self, target: &MethodTarget) -> Result<DependencyCollection, DomainError> {
        let sites = self.index.expression_sites(target)?;
        debug!("{} expression sites in {}", sites.len(), target.qualified_method());

        SiteCollector::new(&self.exclusions, self.ignore_unresolved).collect(&sites)
    }

    pub fn collect(&self, target: &MethodTarget) -> Result<DependencyReport, DomainError> {
        let report = self.collect_references(target)?.into_report();
        info!(
            "Collected dependencies on {} classes from {} ({} unresolved)",
            report.total_classes(),
            target.qualified_method(),
            report.diagnostics().len()
        );
        Ok(report)
    }
}
