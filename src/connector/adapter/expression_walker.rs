use tree_sitter::Node;

use super::java_parser::{compact, line_of};
use super::java_symbol_solver::{FieldAccessTarget, JavaSymbolSolver};
use crate::domain::{
    DomainError, ExpressionSite, MemberRef, MethodTarget, NameTarget, Resolution, ResolutionError,
    SiteKind,
};

const MAX_SITE_TEXT: usize = 160;

const METHOD_KINDS: &[&str] = &[
    "method_declaration",
    "constructor_declaration",
    "compact_constructor_declaration",
];

/// Walks the syntax of one target and resolves every symbol-producing
/// expression it meets, in source order.
pub struct ExpressionWalker<'s, 'a> {
    solver: &'s JavaSymbolSolver<'a>,
    range: Option<(u32, u32)>,
    /// Enum type of each enclosing `switch`, innermost last.
    switch_enums: Vec<Option<String>>,
    sites: Vec<ExpressionSite>,
}

impl<'s, 'a> ExpressionWalker<'s, 'a> {
    pub fn new(solver: &'s JavaSymbolSolver<'a>) -> Self {
        Self {
            solver,
            range: None,
            switch_enums: Vec::new(),
            sites: Vec::new(),
        }
    }

    pub fn walk(mut self, target: &MethodTarget) -> Result<Vec<ExpressionSite>, DomainError> {
        let parsed = self.solver.parsed();
        let root = parsed.tree.root_node();

        if target.is_line_range() {
            self.range = Some((target.start_line, target.end_line));
            self.visit(root);
            return Ok(self.sites);
        }

        let declaration = target
            .span
            .and_then(|span| {
                let mut current = root.descendant_for_byte_range(span.start_byte, span.end_byte);
                while let Some(node) = current {
                    if node.start_byte() == span.start_byte
                        && node.end_byte() == span.end_byte
                        && METHOD_KINDS.contains(&node.kind())
                    {
                        return Some(node);
                    }
                    current = node.parent();
                }
                None
            })
            .ok_or_else(|| {
                DomainError::not_found(format!(
                    "Declaration of {} not found in {}",
                    target.qualified_method(),
                    target.source_file.display()
                ))
            })?;

        self.visit(declaration);
        Ok(self.sites)
    }

    fn in_range(&self, line: u32) -> bool {
        self.range
            .map_or(true, |(start, end)| start <= line && line <= end)
    }

    fn push(&mut self, node: Node<'a>, kind: SiteKind) {
        let line = line_of(node);
        if !self.in_range(line) {
            return;
        }
        let text = truncate(compact(self.solver.parsed().text(node)));
        let column = node.start_position().column as u32 + 1;
        self.sites.push(ExpressionSite::new(text, line, column, kind));
    }

    fn visit_children(&mut self, node: Node<'a>) {
        let mut cursor = node.walk();
        if !cursor.goto_first_child() {
            return;
        }
        loop {
            let child = cursor.node();
            let skipped = matches!(cursor.field_name(), Some("name") | Some("key"))
                || matches!(child.kind(), "line_comment" | "block_comment");
            if child.is_named() && !skipped {
                self.visit(child);
            }
            if !cursor.goto_next_sibling() {
                break;
            }
        }
    }

    fn visit_field(&mut self, node: Node<'a>, field: &str) {
        if let Some(child) = node.child_by_field_name(field) {
            self.visit(child);
        }
    }

    fn visit(&mut self, node: Node<'a>) {
        if let Some((start, end)) = self.range {
            if line_of(node) > end || (node.end_position().row as u32 + 1) < start {
                return;
            }
        }

        match node.kind() {
            "package_declaration" | "import_declaration" => {}
            "marker_annotation" | "annotation" => {
                let (name, resolved) = self.solver.resolve_annotation(node);
                self.push(node, SiteKind::Annotation { name, resolved });
                self.visit_field(node, "arguments");
            }
            "type_identifier" => {
                if self.solver.parsed().text(node) != "var" {
                    let resolved = self.solver.resolve_type_node(node);
                    self.push(node, SiteKind::TypeReference(resolved));
                }
            }
            "scoped_type_identifier" => {
                let resolved = self.solver.resolve_type_node(node);
                self.push(node, SiteKind::TypeReference(resolved));
            }
            "object_creation_expression" => {
                let created = self.solver.construction_type(node);
                self.push(node, SiteKind::Construction(created));
                self.visit_field(node, "object");
                if let Some(type_node) = node.child_by_field_name("type") {
                    if type_node.kind() == "generic_type" {
                        let mut cursor = type_node.walk();
                        let arguments: Vec<Node<'a>> = type_node
                            .named_children(&mut cursor)
                            .filter(|n| n.kind() == "type_arguments")
                            .collect();
                        for argument in arguments {
                            self.visit(argument);
                        }
                    }
                }
                self.visit_field(node, "arguments");
                let mut cursor = node.walk();
                let body = node
                    .named_children(&mut cursor)
                    .find(|n| n.kind() == "class_body");
                if let Some(body) = body {
                    self.visit(body);
                }
            }
            "class_literal" => {
                let resolved = node
                    .named_child(0)
                    .ok_or_else(|| {
                        ResolutionError::Unsupported(compact(self.solver.parsed().text(node)))
                    })
                    .and_then(|type_node| self.solver.resolve_type_node(type_node));
                self.push(node, SiteKind::ClassLiteral(resolved));
            }
            "method_invocation" => {
                let call = self.solver.resolve_method_call(node);
                let failed = matches!(call.resolution, Resolution::Unresolved { .. });
                self.push(node, SiteKind::MethodCall(call));
                self.visit_receiver(node, failed);
                self.visit_field(node, "type_arguments");
                self.visit_field(node, "arguments");
            }
            "field_access" => match self.solver.resolve_field_access(node) {
                FieldAccessTarget::Type(qualified_name) => {
                    self.push(node, SiteKind::Name(Ok(NameTarget::Type(qualified_name))));
                }
                FieldAccessTarget::Package | FieldAccessTarget::Qualifier => {}
                FieldAccessTarget::ArrayLength => self.visit_field(node, "object"),
                FieldAccessTarget::Member(resolution) => {
                    let name = node
                        .child_by_field_name("field")
                        .map(|f| self.solver.parsed().text(f).to_string())
                        .unwrap_or_default();
                    let failed = matches!(resolution, Resolution::Unresolved { .. });
                    self.push(node, SiteKind::FieldAccess { name, resolution });
                    self.visit_receiver(node, failed);
                }
            },
            "identifier" => {
                if let Some(member) = self.switch_label_constant(node) {
                    self.push(node, SiteKind::Name(Ok(NameTarget::Member(member))));
                } else {
                    let resolved = self.solver.resolve_name(node);
                    self.push(node, SiteKind::Name(resolved));
                }
            }
            "lambda_expression" => {
                if let Some(parameters) = node.child_by_field_name("parameters") {
                    if parameters.kind() == "formal_parameters" {
                        self.visit(parameters);
                    }
                }
                self.visit_field(node, "body");
            }
            "method_reference" => {
                if let Some(first) = node.named_child(0) {
                    self.visit(first);
                }
            }
            "labeled_statement" => {
                let mut cursor = node.walk();
                let statements: Vec<Node<'a>> = node
                    .named_children(&mut cursor)
                    .filter(|n| n.kind() != "identifier")
                    .collect();
                for statement in statements {
                    self.visit(statement);
                }
            }
            "break_statement" | "continue_statement" | "record_pattern" => {}
            "type_pattern" => {
                let mut cursor = node.walk();
                let types: Vec<Node<'a>> = node
                    .named_children(&mut cursor)
                    .filter(|n| n.kind() != "identifier")
                    .collect();
                for type_node in types {
                    self.visit(type_node);
                }
            }
            "switch_expression" | "switch_statement" => {
                let condition = node.child_by_field_name("condition");
                if let Some(condition) = condition {
                    self.visit(condition);
                }
                let selected = condition.and_then(|c| self.solver.switch_enum(c));
                self.switch_enums.push(selected);
                self.visit_field(node, "body");
                self.switch_enums.pop();
            }
            "explicit_constructor_invocation" => {
                self.visit_field(node, "object");
                self.visit_field(node, "arguments");
            }
            _ => self.visit_children(node),
        }
    }

    /// Visits the `object` of a call or field access unless it is `this`,
    /// `super` or a type name, whose owner the enclosing site already covers.
    /// An unresolvable bare name is skipped when the enclosing site already
    /// failed on it.
    fn visit_receiver(&mut self, node: Node<'a>, enclosing_failed: bool) {
        let Some(object) = node.child_by_field_name("object") else {
            return;
        };
        let names_type = match object.kind() {
            "this" | "super" => true,
            "identifier" => match self.solver.resolve_name(object) {
                Ok(NameTarget::Type(_)) => true,
                Ok(_) => false,
                Err(_) => enclosing_failed,
            },
            "field_access" => matches!(
                self.solver.resolve_field_access(object),
                FieldAccessTarget::Type(_) | FieldAccessTarget::Package
            ),
            _ => false,
        };
        if !names_type {
            self.visit(object);
        }
    }

    /// `RED` in `case RED ->` when switching over an enum that declares it.
    fn switch_label_constant(&self, node: Node<'a>) -> Option<MemberRef> {
        let enum_type = self.switch_enums.last()?.as_deref()?;
        node.parent().filter(|p| p.kind() == "switch_label")?;
        self.solver
            .enum_constant(enum_type, self.solver.parsed().text(node))
    }
}

fn truncate(text: String) -> String {
    if text.chars().count() <= MAX_SITE_TEXT {
        return text;
    }
    let mut truncated: String = text.chars().take(MAX_SITE_TEXT).collect();
    truncated.push_str("...");
    truncated
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::fs;
    use std::path::Path;
    use std::rc::Rc;

    use tempfile::TempDir;

    use crate::connector::adapter::{
        LocationHints, PlatformTypeResolver, SourceRootResolver, SourceTreeIndex, TypeIndex,
    };
    use crate::domain::{MemberKind, Resolution, ResolvedType, SourceSpan};

    fn write(root: &Path, relative: &str, content: &str) {
        let path = root.join(relative);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, content).unwrap();
    }

    fn index(root: &Path) -> TypeIndex {
        let tree = Rc::new(SourceTreeIndex::new(vec![root.to_path_buf()]));
        let hints: LocationHints = Rc::new(RefCell::new(None));
        TypeIndex::new(Rc::clone(&tree), Rc::clone(&hints))
            .with_resolver(Box::new(SourceRootResolver::new(
                root.to_path_buf(),
                tree,
                hints,
            )))
            .with_resolver(Box::new(PlatformTypeResolver::new()))
    }

    fn sites_of(index: &TypeIndex, file: &Path, owner: &str, method: &str) -> Vec<ExpressionSite> {
        let parsed = index.tree().parse_file(file).unwrap();
        let declaration = parsed.unit.find_type(owner).unwrap();
        let method = declaration.methods_named(method).next().unwrap();
        let span: SourceSpan = method.span.unwrap();
        let target = MethodTarget::method(
            owner,
            method.name.clone(),
            method.signature(),
            parsed.path().to_path_buf(),
            method.start_line,
            method.end_line,
            span,
        );
        let solver = JavaSymbolSolver::new(index, &parsed);
        ExpressionWalker::new(&solver).walk(&target).unwrap()
    }

    fn project() -> TempDir {
        let dir = TempDir::new().unwrap();
        write(
            dir.path(),
            "shop/Status.java",
            "package shop;\npublic enum Status { OPEN, CLOSED }\n",
        );
        write(
            dir.path(),
            "shop/Limits.java",
            "package shop;\npublic class Limits { public static final int MAX = 3; }\n",
        );
        write(
            dir.path(),
            "shop/Order.java",
            r#"package shop;

public class Order {
    private Status status = Status.OPEN;

    public Order(int size) {}

    public Status getStatus() { return status; }

    public int weight() { return Limits.MAX; }
}
"#,
        );
        write(
            dir.path(),
            "shop/Checkout.java",
            r#"package shop;

import java.util.List;

public class Checkout {
    public String run(List<Order> orders) {
        Order order = new Order(Limits.MAX);
        String label = "";
        switch (order.getStatus()) {
            case OPEN:
                label = "open";
                break;
            default:
                label = order.toString();
        }
        for (Order each : orders) {
            each.weight();
        }
        return label;
    }
}
"#,
        );
        dir
    }

    #[test]
    fn test_resolves_sites_of_method() {
        let dir = project();
        let index = index(dir.path());
        let sites = sites_of(
            &index,
            &dir.path().join("shop/Checkout.java"),
            "shop.Checkout",
            "run",
        );

        let constructed = sites.iter().any(|s| {
            s.kind == SiteKind::Construction(Ok(ResolvedType::reference("shop.Order")))
        });
        assert!(constructed);

        let limit = sites.iter().any(|s| match &s.kind {
            SiteKind::FieldAccess {
                resolution: Resolution::Resolved(member),
                ..
            } => member.owner == "shop.Limits" && member.name == "MAX",
            _ => false,
        });
        assert!(limit);

        let calls: Vec<String> = sites
            .iter()
            .filter_map(|s| match &s.kind {
                SiteKind::MethodCall(call) => call
                    .resolution
                    .resolved()
                    .map(|m| format!("{}#{}", m.owner, m.signature)),
                _ => None,
            })
            .collect();
        assert!(calls.contains(&"shop.Order#getStatus()".to_string()));
        assert!(calls.contains(&"shop.Order#weight()".to_string()));
        assert!(calls.contains(&"java.lang.Object#toString()".to_string()));
    }

    #[test]
    fn test_switch_labels_resolve_to_enum_constants() {
        let dir = project();
        let index = index(dir.path());
        let sites = sites_of(
            &index,
            &dir.path().join("shop/Checkout.java"),
            "shop.Checkout",
            "run",
        );

        let label = sites
            .iter()
            .find(|s| s.text == "OPEN")
            .expect("switch label site");
        match &label.kind {
            SiteKind::Name(Ok(NameTarget::Member(member))) => {
                assert_eq!(member.owner, "shop.Status");
                assert_eq!(member.kind, MemberKind::EnumConstant);
            }
            other => panic!("unexpected site {:?}", other),
        }
    }

    #[test]
    fn test_bare_field_name_resolves_to_member() {
        let dir = project();
        let index = index(dir.path());
        let sites = sites_of(
            &index,
            &dir.path().join("shop/Order.java"),
            "shop.Order",
            "getStatus",
        );

        let status = sites.iter().find(|s| s.text == "status").unwrap();
        assert_eq!(
            status.kind,
            SiteKind::Name(Ok(NameTarget::Member(MemberRef::field("shop.Order", "status"))))
        );
    }

    #[test]
    fn test_line_range_only_reports_covered_lines() {
        let dir = project();
        let index = index(dir.path());
        let file = dir.path().join("shop/Checkout.java");
        let parsed = index.tree().parse_file(&file).unwrap();
        let target = MethodTarget::line_range("shop.Checkout", parsed.path().to_path_buf(), 7, 7);

        let solver = JavaSymbolSolver::new(&index, &parsed);
        let sites = ExpressionWalker::new(&solver).walk(&target).unwrap();

        assert!(!sites.is_empty());
        assert!(sites.iter().all(|s| s.line == 7));
        assert!(sites.iter().any(|s| matches!(s.kind, SiteKind::Construction(_))));
    }

    #[test]
    fn test_unknown_receiver_fails_once() {
        let dir = project();
        write(
            dir.path(),
            "shop/Legacy.java",
            "package shop;\n\npublic class Legacy {\n    void sync() {\n        Ghost.call();\n        int n = ghost.size;\n    }\n}\n",
        );
        let index = index(dir.path());
        let sites = sites_of(&index, &dir.path().join("shop/Legacy.java"), "shop.Legacy", "sync");

        let failed: Vec<&str> = sites
            .iter()
            .filter(|s| match &s.kind {
                SiteKind::MethodCall(call) => !call.resolution.is_resolved(),
                SiteKind::FieldAccess { resolution, .. } => !resolution.is_resolved(),
                SiteKind::Name(resolved) => resolved.is_err(),
                _ => false,
            })
            .map(|s| s.text.as_str())
            .collect();
        assert_eq!(failed, vec!["Ghost.call()", "ghost.size"]);
    }

    #[test]
    fn test_truncate_is_char_safe() {
        let long = "é".repeat(MAX_SITE_TEXT + 10);
        let truncated = truncate(long);
        assert_eq!(truncated.chars().count(), MAX_SITE_TEXT + 3);
        assert_eq!(truncate("short".to_string()), "short");
    }
}
