use std::collections::{HashSet, VecDeque};
use std::rc::Rc;

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::application::SourceIndex;
use crate::domain::{
    Diagnostic, DomainError, ExclusionFilter, MethodTarget, ResolvedType, SiteKind,
};

/// A type reached through a chain of call receivers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReachedType {
    pub qualified_name: String,
    /// Hop distance from the target (1 = receiver of a call in the target).
    pub depth: usize,
    /// The type whose code led here; the target's owner for depth 1.
    pub via: String,
}

/// Every type reachable from a target through call receivers.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Reachability {
    pub root: String,
    pub dependencies: Vec<ReachedType>,
    /// Receivers whose static type could not be determined.
    pub diagnostics: Vec<Diagnostic>,
    pub max_depth_reached: usize,
}

impl Reachability {
    pub fn qualified_names(&self) -> impl Iterator<Item = &str> {
        self.dependencies.iter().map(|d| d.qualified_name.as_str())
    }

    pub fn contains(&self, qualified_name: &str) -> bool {
        self.qualified_names().any(|name| name == qualified_name)
    }
}

/// Use case: breadth-first walk from a target over the static types of call
/// receivers, expanding each newly reached source type through all of its
/// methods and constructors.
pub struct ExploreReachabilityUseCase {
    index: Rc<dyn SourceIndex>,
    exclusions: ExclusionFilter,
}

impl ExploreReachabilityUseCase {
    pub fn new(index: Rc<dyn SourceIndex>, exclusions: ExclusionFilter) -> Self {
        Self { index, exclusions }
    }

    /// `max_depth` of `Some(1)` stops after the target's own receivers;
    /// `None` walks until nothing new is found.
    pub fn explore(
        &self,
        target: &MethodTarget,
        max_depth: Option<usize>,
    ) -> Result<Reachability, DomainError> {
        let mut visited: HashSet<String> = HashSet::new();
        visited.insert(target.owner.clone());

        // (type, depth)
        let mut pending: VecDeque<(String, usize)> = VecDeque::new();
        let mut dependencies: Vec<ReachedType> = Vec::new();
        let mut diagnostics: Vec<Diagnostic> = Vec::new();

        if max_depth != Some(0) {
            let receivers = self.receivers(target, &mut diagnostics)?;
            self.enqueue(
                receivers,
                &target.owner,
                1,
                &mut visited,
                &mut pending,
                &mut dependencies,
            );
        }

        while let Some((current, depth)) = pending.pop_front() {
            if max_depth.map_or(false, |max| depth >= max) {
                continue;
            }

            let targets = self.method_targets(&current);
            if targets.is_empty() {
                debug!("No source methods to expand for {}", current);
                continue;
            }

            let mut receivers = Vec::new();
            for method in &targets {
                match self.receivers(method, &mut diagnostics) {
                    Ok(found) => receivers.extend(found),
                    Err(e) => warn!("Skipping {}: {}", method.qualified_method(), e),
                }
            }

            self.enqueue(
                receivers,
                &current,
                depth + 1,
                &mut visited,
                &mut pending,
                &mut dependencies,
            );
        }

        let max_depth_reached = dependencies.iter().map(|d| d.depth).max().unwrap_or(0);

        info!(
            "Reached {} types from {} (max depth {})",
            dependencies.len(),
            target.qualified_method(),
            max_depth_reached
        );

        Ok(Reachability {
            root: target.owner.clone(),
            dependencies,
            diagnostics,
            max_depth_reached,
        })
    }

    fn enqueue(
        &self,
        receivers: Vec<String>,
        via: &str,
        depth: usize,
        visited: &mut HashSet<String>,
        pending: &mut VecDeque<(String, usize)>,
        dependencies: &mut Vec<ReachedType>,
    ) {
        for receiver in receivers {
            if self.exclusions.is_excluded(&receiver) || !visited.insert(receiver.clone()) {
                continue;
            }
            dependencies.push(ReachedType {
                qualified_name: receiver.clone(),
                depth,
                via: via.to_string(),
            });
            pending.push_back((receiver, depth));
        }
    }

    /// Static types of explicit call receivers in `target`, in source order.
    /// Primitive, array and type-variable receivers are dropped.
    fn receivers(
        &self,
        target: &MethodTarget,
        diagnostics: &mut Vec<Diagnostic>,
    ) -> Result<Vec<String>, DomainError> {
        let sites = self.index.expression_sites(target)?;
        let mut receivers = Vec::new();

        for site in &sites {
            let SiteKind::MethodCall(call) = &site.kind else {
                continue;
            };
            match &call.receiver {
                Some(Ok(ResolvedType::Reference(name))) => receivers.push(name.clone()),
                Some(Ok(_)) | None => {}
                Some(Err(reason)) => {
                    let text = call.receiver_text.as_deref().unwrap_or(site.text.as_str());
                    diagnostics.push(Diagnostic::new(
                        text,
                        "receiver",
                        site.line,
                        site.column,
                        reason.to_string(),
                    ));
                }
            }
        }

        Ok(receivers)
    }

    /// Every method and constructor `qualified_name` declares in source.
    fn method_targets(&self, qualified_name: &str) -> Vec<MethodTarget> {
        let Some(solved) = self.index.solve_type(qualified_name) else {
            return Vec::new();
        };
        let (Some(unit), Some(declaration)) = (solved.unit(), solved.declaration()) else {
            return Vec::new();
        };

        declaration
            .methods
            .iter()
            .filter_map(|method| {
                method.span.map(|span| {
                    MethodTarget::method(
                        declaration.qualified_name.clone(),
                        method.name.clone(),
                        method.signature(),
                        unit.path.clone(),
                        method.start_line,
                        method.end_line,
                        span,
                    )
                })
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::collections::HashMap;
    use std::path::{Path, PathBuf};

    use super::*;
    use crate::application::SolvedType;
    use crate::domain::{
        CompilationUnit, ExpressionSite, MethodCallSite, MethodDeclaration, Resolution,
        ResolutionError, SourceSpan, TypeDeclaration, TypeKind,
    };

    /// Each type declares one `run()` whose calls go to the listed receivers.
    struct CallGraphIndex {
        receivers: HashMap<String, Vec<Result<ResolvedType, ResolutionError>>>,
        expanded: RefCell<Vec<String>>,
    }

    impl CallGraphIndex {
        fn new(edges: &[(&str, Vec<Result<ResolvedType, ResolutionError>>)]) -> Self {
            Self {
                receivers: edges
                    .iter()
                    .map(|(owner, receivers)| (owner.to_string(), receivers.clone()))
                    .collect(),
                expanded: RefCell::new(Vec::new()),
            }
        }
    }

    fn calls(targets: &[&str]) -> Vec<Result<ResolvedType, ResolutionError>> {
        targets.iter().map(|t| Ok(ResolvedType::reference(*t))).collect()
    }

    fn declaration(qualified_name: &str) -> TypeDeclaration {
        TypeDeclaration {
            qualified_name: qualified_name.to_string(),
            name: qualified_name.rsplit('.').next().unwrap_or_default().to_string(),
            kind: TypeKind::Class,
            enclosing: None,
            type_parameters: Vec::new(),
            super_types: Vec::new(),
            fields: Vec::new(),
            enum_constants: Vec::new(),
            methods: vec![MethodDeclaration {
                name: "run".to_string(),
                type_parameters: Vec::new(),
                parameters: Vec::new(),
                return_type: Some("void".to_string()),
                is_static: false,
                is_varargs: false,
                start_line: 2,
                end_line: 4,
                span: Some(SourceSpan::new(10, 40)),
            }],
            member_types: Vec::new(),
            start_line: 1,
            end_line: 5,
        }
    }

    impl SourceIndex for CallGraphIndex {
        fn compilation_unit(&self, path: &Path) -> Result<Rc<CompilationUnit>, DomainError> {
            Err(DomainError::not_found(path.display().to_string()))
        }

        fn solve_type(&self, qualified_name: &str) -> Option<SolvedType> {
            if !self.receivers.contains_key(qualified_name) {
                return None;
            }
            let mut unit = CompilationUnit::new(PathBuf::from("/src/Graph.java"), None);
            unit.types.push(declaration(qualified_name));
            Some(SolvedType::Source {
                unit: Rc::new(unit),
                index: 0,
            })
        }

        fn expression_sites(
            &self,
            target: &MethodTarget,
        ) -> Result<Vec<ExpressionSite>, DomainError> {
            self.expanded.borrow_mut().push(target.owner.clone());
            let receivers = self.receivers.get(&target.owner).cloned().unwrap_or_default();
            Ok(receivers
                .into_iter()
                .enumerate()
                .map(|(i, receiver)| {
                    let call = MethodCallSite {
                        name: "go".to_string(),
                        arity: 0,
                        receiver: Some(receiver),
                        receiver_text: Some(format!("r{}", i)),
                        resolution: Resolution::Unresolved {
                            scope_text: None,
                            reason: ResolutionError::unknown_symbol("go"),
                        },
                        argument_owners: Vec::new(),
                    };
                    ExpressionSite::new(format!("r{}.go()", i), 3, 9, SiteKind::MethodCall(call))
                })
                .collect())
        }
    }

    fn root(owner: &str) -> MethodTarget {
        MethodTarget::method(
            owner,
            "run",
            "run()",
            PathBuf::from("/src/Graph.java"),
            2,
            4,
            SourceSpan::new(10, 40),
        )
    }

    fn explorer(
        index: CallGraphIndex,
        exclusions: ExclusionFilter,
    ) -> (ExploreReachabilityUseCase, Rc<CallGraphIndex>) {
        let index = Rc::new(index);
        (ExploreReachabilityUseCase::new(index.clone(), exclusions), index)
    }

    fn chain() -> CallGraphIndex {
        CallGraphIndex::new(&[
            ("pkg.A", calls(&["pkg.B"])),
            ("pkg.B", calls(&["pkg.C", "pkg.A"])),
            ("pkg.C", calls(&["pkg.B"])),
        ])
    }

    #[test]
    fn test_depth_caps() {
        let (explorer, _) = explorer(chain(), ExclusionFilter::default());

        let none = explorer.explore(&root("pkg.A"), Some(0)).unwrap();
        assert!(none.dependencies.is_empty());
        assert_eq!(none.max_depth_reached, 0);

        let direct = explorer.explore(&root("pkg.A"), Some(1)).unwrap();
        assert_eq!(direct.qualified_names().collect::<Vec<_>>(), vec!["pkg.B"]);
        assert_eq!(direct.max_depth_reached, 1);
    }

    #[test]
    fn test_unbounded_walk_visits_each_type_once() {
        let (explorer, index) = explorer(chain(), ExclusionFilter::default());

        let all = explorer.explore(&root("pkg.A"), None).unwrap();

        assert_eq!(
            all.dependencies,
            vec![
                ReachedType {
                    qualified_name: "pkg.B".to_string(),
                    depth: 1,
                    via: "pkg.A".to_string(),
                },
                ReachedType {
                    qualified_name: "pkg.C".to_string(),
                    depth: 2,
                    via: "pkg.B".to_string(),
                },
            ]
        );
        assert_eq!(all.root, "pkg.A");
        assert_eq!(*index.expanded.borrow(), vec!["pkg.A", "pkg.B", "pkg.C"]);
    }

    #[test]
    fn test_excluded_types_are_not_expanded() {
        let index = CallGraphIndex::new(&[
            ("pkg.A", calls(&["java.util.List", "pkg.B"])),
            ("java.util.List", calls(&["pkg.Hidden"])),
            ("pkg.B", Vec::new()),
            ("pkg.Hidden", Vec::new()),
        ]);
        let (explorer, index) = explorer(index, ExclusionFilter::default());

        let all = explorer.explore(&root("pkg.A"), None).unwrap();

        assert_eq!(all.qualified_names().collect::<Vec<_>>(), vec!["pkg.B"]);
        assert!(!index.expanded.borrow().iter().any(|t| t == "java.util.List"));
    }

    #[test]
    fn test_unresolved_receivers_become_diagnostics() {
        let index = CallGraphIndex::new(&[(
            "pkg.A",
            vec![
                Err(ResolutionError::unknown_symbol("ghost")),
                Ok(ResolvedType::primitive("int")),
                Ok(ResolvedType::array_of(ResolvedType::reference("pkg.B"), 1)),
            ],
        )]);
        let (explorer, _) = explorer(index, ExclusionFilter::none());

        let all = explorer.explore(&root("pkg.A"), None).unwrap();

        assert!(all.dependencies.is_empty());
        assert_eq!(all.diagnostics.len(), 1);
        assert_eq!(all.diagnostics[0].expression, "r0");
        assert_eq!(all.diagnostics[0].kind, "receiver");
    }
}
