use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

use super::{Diagnostic, ReferenceKind, SymbolReference};

/// Everything the analysed code uses from one owning class.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassSymbols {
    pub fields: BTreeSet<String>,
    pub enum_constants: BTreeSet<String>,
    pub annotations: BTreeSet<String>,
    /// Invoked method signatures (`process(String)` or `process(?)`).
    pub methods: BTreeSet<String>,
    pub referenced_as_type: bool,
}

impl ClassSymbols {
    pub fn record(&mut self, reference: &SymbolReference) {
        let member = reference.member().map(str::to_string);
        match (reference.kind(), member) {
            (ReferenceKind::Field, Some(name)) => {
                self.fields.insert(name);
            }
            (ReferenceKind::EnumConstant, Some(name)) => {
                self.enum_constants.insert(name);
            }
            (ReferenceKind::Annotation, Some(name)) => {
                self.annotations.insert(name);
            }
            (ReferenceKind::MethodCall, Some(signature)) => {
                self.methods.insert(signature);
            }
            (ReferenceKind::Type, _) => self.referenced_as_type = true,
            (_, None) => {}
        }
    }

    /// Additive union; nothing already present is removed or replaced.
    pub fn merge(&mut self, other: &ClassSymbols) {
        self.fields.extend(other.fields.iter().cloned());
        self.enum_constants
            .extend(other.enum_constants.iter().cloned());
        self.annotations.extend(other.annotations.iter().cloned());
        self.methods.extend(other.methods.iter().cloned());
        self.referenced_as_type |= other.referenced_as_type;
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
            && self.enum_constants.is_empty()
            && self.annotations.is_empty()
            && self.methods.is_empty()
            && !self.referenced_as_type
    }
}

/// Per-owner aggregate of the symbols a target references, plus the
/// expressions that could not be resolved.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DependencyReport {
    classes: BTreeMap<String, ClassSymbols>,
    diagnostics: Vec<Diagnostic>,
}

impl DependencyReport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_references<'a>(references: impl IntoIterator<Item = &'a SymbolReference>) -> Self {
        let mut report = Self::new();
        for reference in references {
            report.record(reference);
        }
        report
    }

    pub fn record(&mut self, reference: &SymbolReference) {
        self.classes
            .entry(reference.owner().to_string())
            .or_default()
            .record(reference);
    }

    pub fn add_diagnostic(&mut self, diagnostic: Diagnostic) {
        if !self.diagnostics.contains(&diagnostic) {
            self.diagnostics.push(diagnostic);
        }
    }

    /// Folds `other` into this report. Buckets for the same owner are unioned.
    pub fn merge(&mut self, other: &DependencyReport) {
        for (owner, symbols) in &other.classes {
            self.classes.entry(owner.clone()).or_default().merge(symbols);
        }
        for diagnostic in &other.diagnostics {
            self.add_diagnostic(diagnostic.clone());
        }
    }

    pub fn classes(&self) -> &BTreeMap<String, ClassSymbols> {
        &self.classes
    }

    pub fn get(&self, owner: &str) -> Option<&ClassSymbols> {
        self.classes.get(owner)
    }

    pub fn owners(&self) -> impl Iterator<Item = &str> {
        self.classes.keys().map(String::as_str)
    }

    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }

    pub fn total_classes(&self) -> usize {
        self.classes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.classes.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn field(owner: &str, name: &str) -> SymbolReference {
        SymbolReference::new(owner, ReferenceKind::Field, 1, 1).with_member(name)
    }

    #[test]
    fn test_record_routes_by_kind() {
        let references = vec![
            field("pkg.Bar", "count"),
            SymbolReference::new("pkg.Color", ReferenceKind::EnumConstant, 2, 1)
                .with_member("RED"),
            SymbolReference::new("pkg.Audit", ReferenceKind::Annotation, 3, 1)
                .with_member("Audit"),
            SymbolReference::new("pkg.Helper", ReferenceKind::MethodCall, 4, 1)
                .with_member("process(String)"),
            SymbolReference::new("pkg.Helper", ReferenceKind::Type, 5, 1),
        ];

        let report = DependencyReport::from_references(&references);

        assert_eq!(report.total_classes(), 4);
        assert!(report.get("pkg.Bar").unwrap().fields.contains("count"));
        assert!(report.get("pkg.Color").unwrap().enum_constants.contains("RED"));
        assert!(report.get("pkg.Audit").unwrap().annotations.contains("Audit"));
        let helper = report.get("pkg.Helper").unwrap();
        assert!(helper.methods.contains("process(String)"));
        assert!(helper.referenced_as_type);
    }

    #[test]
    fn test_merge_is_additive() {
        let mut first = DependencyReport::from_references(&[field("pkg.Bar", "a")]);
        let second = DependencyReport::from_references(&[
            field("pkg.Bar", "b"),
            SymbolReference::new("pkg.Bar", ReferenceKind::Type, 1, 1),
        ]);

        first.merge(&second);
        first.merge(&DependencyReport::new());

        let bar = first.get("pkg.Bar").unwrap();
        assert_eq!(bar.fields.len(), 2);
        assert!(bar.fields.contains("a"));
        assert!(bar.referenced_as_type);
    }

    #[test]
    fn test_duplicate_diagnostics_are_kept_once() {
        let mut report = DependencyReport::new();
        let diagnostic = Diagnostic::new("x.y()", "method call", 3, 5, "cannot resolve symbol `x`");

        report.add_diagnostic(diagnostic.clone());
        report.add_diagnostic(diagnostic);

        assert_eq!(report.diagnostics().len(), 1);
        assert!(report.is_empty());
    }
}
