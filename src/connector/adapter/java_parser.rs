use std::path::{Path, PathBuf};
use std::rc::Rc;

use streaming_iterator::StreamingIterator;
use tracing::debug;
use tree_sitter::{Node, Parser, Query, QueryCursor, Tree};

use crate::domain::{
    CompilationUnit, DomainError, FieldDeclaration, ImportDeclaration, MethodDeclaration,
    Parameter, SourceSpan, TypeDeclaration, TypeKind,
};

const TOP_LEVEL_QUERY: &str = r#"
(program (package_declaration [(scoped_identifier) (identifier)] @package))
(program (class_declaration name: (identifier) @name))
(program (interface_declaration name: (identifier) @name))
(program (enum_declaration name: (identifier) @name))
(program (record_declaration name: (identifier) @name))
(program (annotation_type_declaration name: (identifier) @name))
"#;

/// A parsed source file: the declaration model plus the syntax tree it came from.
pub struct ParsedUnit {
    pub unit: Rc<CompilationUnit>,
    pub source: String,
    pub tree: Tree,
}

impl ParsedUnit {
    pub fn path(&self) -> &Path {
        &self.unit.path
    }

    pub fn text(&self, node: Node) -> &str {
        node.utf8_text(self.source.as_bytes()).unwrap_or("")
    }
}

/// Package and top-level type names of one file, without the full model.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TopLevelDeclarations {
    pub package: Option<String>,
    pub type_names: Vec<String>,
}

impl TopLevelDeclarations {
    pub fn qualified_names(&self) -> impl Iterator<Item = String> + '_ {
        self.type_names.iter().map(|name| match &self.package {
            Some(package) => format!("{}.{}", package, name),
            None => name.clone(),
        })
    }
}

/// Tree-sitter based Java parser.
pub struct JavaParser {
    language: tree_sitter::Language,
}

impl JavaParser {
    pub fn new() -> Self {
        Self {
            language: tree_sitter_java::LANGUAGE.into(),
        }
    }

    fn create_parser(&self) -> Result<Parser, DomainError> {
        let mut parser = Parser::new();
        parser
            .set_language(&self.language)
            .map_err(|e| DomainError::parse(format!("Failed to set language: {}", e)))?;
        Ok(parser)
    }

    fn parse_tree(&self, path: &Path, source: &str) -> Result<Tree, DomainError> {
        let tree = self
            .create_parser()?
            .parse(source, None)
            .ok_or_else(|| DomainError::parse(format!("Failed to parse {}", path.display())))?;

        if tree.root_node().has_error() {
            return Err(DomainError::parse(format!(
                "Syntax errors in {}",
                path.display()
            )));
        }
        Ok(tree)
    }

    /// Parses a file and extracts its declarations.
    pub fn parse(&self, path: &Path, source: String) -> Result<ParsedUnit, DomainError> {
        let tree = self.parse_tree(path, &source)?;
        let unit = DeclarationExtractor::new(&source, path.to_path_buf()).extract(tree.root_node());

        debug!(
            "Parsed {} types from {}",
            unit.types.len(),
            path.display()
        );

        Ok(ParsedUnit {
            unit: Rc::new(unit),
            source,
            tree,
        })
    }

    /// Reads only the package and top-level type names.
    pub fn top_level_declarations(
        &self,
        path: &Path,
        source: &str,
    ) -> Result<TopLevelDeclarations, DomainError> {
        let tree = self.parse_tree(path, source)?;

        let query = Query::new(&self.language, TOP_LEVEL_QUERY)
            .map_err(|e| DomainError::parse(format!("Failed to create query: {}", e)))?;
        let capture_names: Vec<&str> = query.capture_names().to_vec();

        let mut cursor = QueryCursor::new();
        let mut matches_iter = cursor.matches(&query, tree.root_node(), source.as_bytes());
        let mut declarations = TopLevelDeclarations::default();

        while let Some(query_match) = matches_iter.next() {
            for capture in query_match.captures {
                let text = source[capture.node.byte_range()].to_string();
                match capture_names.get(capture.index as usize).copied() {
                    Some("package") => declarations.package = Some(text),
                    Some("name") => declarations.type_names.push(text),
                    _ => {}
                }
            }
        }

        Ok(declarations)
    }
}

impl Default for JavaParser {
    fn default() -> Self {
        Self::new()
    }
}

pub fn is_type_declaration(kind: &str) -> bool {
    matches!(
        kind,
        "class_declaration"
            | "interface_declaration"
            | "enum_declaration"
            | "record_declaration"
            | "annotation_type_declaration"
    )
}

pub fn line_of(node: Node) -> u32 {
    node.start_position().row as u32 + 1
}

pub fn end_line_of(node: Node) -> u32 {
    node.end_position().row as u32 + 1
}

/// Collapses runs of whitespace so multi-line source reads as one line.
pub fn compact(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

struct DeclarationExtractor<'a> {
    source: &'a str,
    unit: CompilationUnit,
}

impl<'a> DeclarationExtractor<'a> {
    fn new(source: &'a str, path: PathBuf) -> Self {
        Self {
            source,
            unit: CompilationUnit::new(path, None),
        }
    }

    fn text(&self, node: Node) -> &'a str {
        node.utf8_text(self.source.as_bytes()).unwrap_or("")
    }

    fn extract(mut self, root: Node) -> CompilationUnit {
        let mut cursor = root.walk();
        for child in root.named_children(&mut cursor) {
            match child.kind() {
                "package_declaration" => self.package(child),
                "import_declaration" => self.import(child),
                kind if is_type_declaration(kind) => self.type_declaration(child, None),
                _ => {}
            }
        }
        self.unit
    }

    fn package(&mut self, node: Node) {
        let mut cursor = node.walk();
        for child in node.named_children(&mut cursor) {
            if matches!(child.kind(), "scoped_identifier" | "identifier") {
                self.unit.package = Some(self.text(child).to_string());
            }
        }
    }

    fn import(&mut self, node: Node) {
        let mut is_static = false;
        let mut on_demand = false;
        let mut path = String::new();

        let mut cursor = node.walk();
        for child in node.children(&mut cursor) {
            match child.kind() {
                "static" => is_static = true,
                "asterisk" => on_demand = true,
                "scoped_identifier" | "identifier" => path = self.text(child).to_string(),
                _ => {}
            }
        }

        if !path.is_empty() {
            self.unit
                .imports
                .push(ImportDeclaration::new(path, is_static, on_demand));
        }
    }

    fn type_declaration(&mut self, node: Node, enclosing: Option<&str>) {
        let Some(name_node) = node.child_by_field_name("name") else {
            return;
        };
        let name = self.text(name_node).to_string();
        let qualified_name = match enclosing {
            Some(outer) => format!("{}.{}", outer, name),
            None => self.unit.qualify(&name),
        };
        let kind = match node.kind() {
            "interface_declaration" => TypeKind::Interface,
            "enum_declaration" => TypeKind::Enum,
            "record_declaration" => TypeKind::Record,
            "annotation_type_declaration" => TypeKind::Annotation,
            _ => TypeKind::Class,
        };

        let mut declaration = TypeDeclaration {
            qualified_name: qualified_name.clone(),
            name: name.clone(),
            kind,
            enclosing: enclosing.map(str::to_string),
            type_parameters: node
                .child_by_field_name("type_parameters")
                .map(|tp| self.type_parameter_names(tp))
                .unwrap_or_default(),
            super_types: self.super_types(node),
            fields: Vec::new(),
            enum_constants: Vec::new(),
            methods: Vec::new(),
            member_types: Vec::new(),
            start_line: line_of(node),
            end_line: end_line_of(node),
        };

        if kind == TypeKind::Record {
            if let Some(components) = node.child_by_field_name("parameters") {
                self.record_components(components, &mut declaration);
            }
        }

        let mut nested = Vec::new();
        if let Some(body) = node.child_by_field_name("body") {
            self.body(body, &mut declaration, &mut nested);
        }

        if kind == TypeKind::Enum {
            implicit_enum_methods(&mut declaration);
        }

        self.unit.types.push(declaration);
        for child in nested {
            self.type_declaration(child, Some(&qualified_name));
        }
    }

    fn type_parameter_names(&self, node: Node) -> Vec<String> {
        let mut names = Vec::new();
        let mut cursor = node.walk();
        for child in node.named_children(&mut cursor) {
            if child.kind() != "type_parameter" {
                continue;
            }
            let mut inner = child.walk();
            let name = child
                .named_children(&mut inner)
                .find(|n| matches!(n.kind(), "type_identifier" | "identifier"));
            if let Some(name) = name {
                names.push(self.text(name).to_string());
            }
        }
        names
    }

    /// `extends` first, then `implements`, as written.
    fn super_types(&self, node: Node) -> Vec<String> {
        let mut super_types = Vec::new();

        if let Some(superclass) = node.child_by_field_name("superclass") {
            let mut cursor = superclass.walk();
            for child in superclass.named_children(&mut cursor) {
                super_types.push(self.type_text(child));
            }
        }
        if let Some(interfaces) = node.child_by_field_name("interfaces") {
            self.type_list(interfaces, &mut super_types);
        }
        let mut cursor = node.walk();
        for child in node.named_children(&mut cursor) {
            if child.kind() == "extends_interfaces" {
                self.type_list(child, &mut super_types);
            }
        }

        super_types
    }

    fn type_list(&self, node: Node, out: &mut Vec<String>) {
        let mut cursor = node.walk();
        for child in node.named_children(&mut cursor) {
            if child.kind() == "type_list" {
                self.type_list(child, out);
            } else {
                out.push(self.type_text(child));
            }
        }
    }

    fn body<'t>(&self, body: Node<'t>, declaration: &mut TypeDeclaration, nested: &mut Vec<Node<'t>>) {
        let mut cursor = body.walk();
        for member in body.named_children(&mut cursor) {
            self.member(member, declaration, nested);
        }
    }

    fn member<'t>(&self, member: Node<'t>, declaration: &mut TypeDeclaration, nested: &mut Vec<Node<'t>>) {
        match member.kind() {
            "field_declaration" => {
                let is_static = has_modifier(member, "static");
                self.fields(member, is_static, declaration);
            }
            "constant_declaration" => self.fields(member, true, declaration),
            "method_declaration" | "annotation_type_element_declaration" => {
                let is_static = has_modifier(member, "static");
                if let Some(method) = self.method(member, is_static, false) {
                    declaration.methods.push(method);
                }
            }
            "constructor_declaration" | "compact_constructor_declaration" => {
                if let Some(method) = self.method(member, false, true) {
                    declaration.methods.push(method);
                }
            }
            "enum_constant" => {
                if let Some(name) = member.child_by_field_name("name") {
                    declaration.enum_constants.push(self.text(name).to_string());
                }
            }
            "enum_body_declarations" => {
                let mut cursor = member.walk();
                for inner in member.named_children(&mut cursor) {
                    self.member(inner, declaration, nested);
                }
            }
            kind if is_type_declaration(kind) => {
                if let Some(name) = member.child_by_field_name("name") {
                    declaration.member_types.push(self.text(name).to_string());
                    nested.push(member);
                }
            }
            _ => {}
        }
    }

    fn fields(&self, node: Node, is_static: bool, declaration: &mut TypeDeclaration) {
        let Some(type_node) = node.child_by_field_name("type") else {
            return;
        };
        let type_text = self.type_text(type_node);

        let mut cursor = node.walk();
        for declarator in node.children_by_field_name("declarator", &mut cursor) {
            let Some(name) = declarator.child_by_field_name("name") else {
                continue;
            };
            let dims = declarator
                .child_by_field_name("dimensions")
                .map(|d| self.text(d).matches('[').count())
                .unwrap_or(0);
            declaration.fields.push(FieldDeclaration {
                name: self.text(name).to_string(),
                type_text: format!("{}{}", type_text, "[]".repeat(dims)),
                is_static,
            });
        }
    }

    fn method(&self, node: Node, is_static: bool, is_constructor: bool) -> Option<MethodDeclaration> {
        let name = self.text(node.child_by_field_name("name")?).to_string();
        let return_type = if is_constructor {
            None
        } else {
            Some(
                node.child_by_field_name("type")
                    .map(|t| self.type_text(t))
                    .unwrap_or_else(|| "void".to_string()),
            )
        };

        let mut parameters = Vec::new();
        let mut is_varargs = false;
        if let Some(params) = node.child_by_field_name("parameters") {
            let mut cursor = params.walk();
            for param in params.named_children(&mut cursor) {
                match param.kind() {
                    "formal_parameter" => {
                        if let Some(p) = self.formal_parameter(param) {
                            parameters.push(p);
                        }
                    }
                    "spread_parameter" => {
                        is_varargs = true;
                        if let Some(p) = self.spread_parameter(param) {
                            parameters.push(p);
                        }
                    }
                    _ => {}
                }
            }
        }

        Some(MethodDeclaration {
            name,
            type_parameters: node
                .child_by_field_name("type_parameters")
                .map(|tp| self.type_parameter_names(tp))
                .unwrap_or_default(),
            parameters,
            return_type,
            is_static,
            is_varargs,
            start_line: line_of(node),
            end_line: end_line_of(node),
            span: Some(SourceSpan::new(node.start_byte(), node.end_byte())),
        })
    }

    fn formal_parameter(&self, node: Node) -> Option<Parameter> {
        let type_text = self.type_text(node.child_by_field_name("type")?);
        let name = self.text(node.child_by_field_name("name")?).to_string();
        let dims = node
            .child_by_field_name("dimensions")
            .map(|d| self.text(d).matches('[').count())
            .unwrap_or(0);
        Some(Parameter {
            name,
            type_text: format!("{}{}", type_text, "[]".repeat(dims)),
        })
    }

    fn spread_parameter(&self, node: Node) -> Option<Parameter> {
        let mut type_text = None;
        let mut name = None;

        let mut cursor = node.walk();
        for child in node.named_children(&mut cursor) {
            match child.kind() {
                "modifiers" => {}
                "variable_declarator" => {
                    name = child
                        .child_by_field_name("name")
                        .map(|n| self.text(n).to_string());
                }
                "identifier" => name = Some(self.text(child).to_string()),
                _ if type_text.is_none() => type_text = Some(self.type_text(child)),
                _ => {}
            }
        }

        Some(Parameter {
            name: name.unwrap_or_default(),
            type_text: format!("{}...", type_text?),
        })
    }

    fn record_components(&self, components: Node, declaration: &mut TypeDeclaration) {
        let mut cursor = components.walk();
        for component in components.named_children(&mut cursor) {
            if component.kind() != "formal_parameter" {
                continue;
            }
            let Some(parameter) = self.formal_parameter(component) else {
                continue;
            };
            declaration.methods.push(MethodDeclaration {
                name: parameter.name.clone(),
                type_parameters: Vec::new(),
                parameters: Vec::new(),
                return_type: Some(parameter.type_text.clone()),
                is_static: false,
                is_varargs: false,
                start_line: line_of(component),
                end_line: end_line_of(component),
                span: None,
            });
            declaration.fields.push(FieldDeclaration {
                name: parameter.name,
                type_text: parameter.type_text,
                is_static: false,
            });
        }
    }

    fn type_text(&self, node: Node) -> String {
        type_text(node, self.source)
    }
}

/// Type as written, without annotations and with whitespace collapsed.
pub fn type_text(node: Node, source: &str) -> String {
    if node.kind() == "annotated_type" {
        let mut cursor = node.walk();
        let inner = node
            .named_children(&mut cursor)
            .filter(|n| !matches!(n.kind(), "marker_annotation" | "annotation"))
            .last();
        if let Some(inner) = inner {
            return type_text(inner, source);
        }
    }
    compact(node.utf8_text(source.as_bytes()).unwrap_or(""))
}

fn has_modifier(node: Node, modifier: &str) -> bool {
    let mut cursor = node.walk();
    let modifiers = node
        .children(&mut cursor)
        .find(|child| child.kind() == "modifiers");
    match modifiers {
        Some(modifiers) => {
            let mut inner = modifiers.walk();
            let found = modifiers.children(&mut inner).any(|m| m.kind() == modifier);
            found
        }
        None => false,
    }
}

/// `values()` and `valueOf(String)`, declared implicitly by every enum.
fn implicit_enum_methods(declaration: &mut TypeDeclaration) {
    let synthetic = |name: &str, parameters: Vec<Parameter>, return_type: String| MethodDeclaration {
        name: name.to_string(),
        type_parameters: Vec::new(),
        parameters,
        return_type: Some(return_type),
        is_static: true,
        is_varargs: false,
        start_line: declaration.start_line,
        end_line: declaration.start_line,
        span: None,
    };

    let values = synthetic("values", Vec::new(), format!("{}[]", declaration.name));
    let value_of = synthetic(
        "valueOf",
        vec![Parameter {
            name: "name".to_string(),
            type_text: "String".to_string(),
        }],
        declaration.name.clone(),
    );
    declaration.methods.push(values);
    declaration.methods.push(value_of);
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(source: &str) -> ParsedUnit {
        JavaParser::new()
            .parse(Path::new("Test.java"), source.to_string())
            .unwrap()
    }

    #[test]
    fn test_package_imports_and_types() {
        let parsed = parse(
            r#"
package com.acme;

import java.util.List;
import static com.acme.util.Limits.MAX;
import com.acme.model.*;

public class Service extends Base implements Runnable, Comparable<Service> {
    private static final int LIMIT = 3;
    private List<Order> orders, archived[];

    public Service(Repo repo) {}

    public <T> T process(String name, Object... rest) { return null; }

    static class Inner {}
}
"#,
        );
        let unit = &parsed.unit;

        assert_eq!(unit.package.as_deref(), Some("com.acme"));
        assert_eq!(unit.imports.len(), 3);
        assert_eq!(unit.static_imports().count(), 1);
        assert_eq!(unit.on_demand_imports().next().unwrap().path, "com.acme.model");

        let service = unit.find_type("com.acme.Service").unwrap();
        assert_eq!(service.super_types, vec!["Base", "Runnable", "Comparable<Service>"]);
        assert!(service.find_field("LIMIT").unwrap().is_static);
        assert_eq!(service.find_field("archived").unwrap().type_text, "List<Order>[]");
        assert!(service.has_member_type("Inner"));

        let process = service.methods_named("process").next().unwrap();
        assert!(process.is_varargs);
        assert_eq!(process.signature(), "process(String, Object...)");
        assert_eq!(process.type_parameters, vec!["T"]);

        let constructor = service.methods_named("Service").next().unwrap();
        assert!(constructor.is_constructor());

        let inner = unit.find_type("com.acme.Service.Inner").unwrap();
        assert_eq!(inner.enclosing.as_deref(), Some("com.acme.Service"));
    }

    #[test]
    fn test_enum_and_record_members() {
        let parsed = parse(
            r#"
package shop;

enum Status { OPEN, CLOSED; boolean done() { return this == CLOSED; } }

record Point(int x, @Deprecated String label) {}
"#,
        );
        let unit = &parsed.unit;

        let status = unit.find_type("shop.Status").unwrap();
        assert_eq!(status.enum_constants, vec!["OPEN", "CLOSED"]);
        assert!(status.methods_named("done").next().unwrap().span.is_some());
        assert!(status.methods_named("values").next().unwrap().span.is_none());

        let point = unit.find_type("shop.Point").unwrap();
        assert_eq!(point.find_field("label").unwrap().type_text, "String");
        assert_eq!(
            point.methods_named("x").next().unwrap().return_type.as_deref(),
            Some("int")
        );
    }

    #[test]
    fn test_syntax_error_is_parse_error() {
        let result = JavaParser::new().parse(
            Path::new("Broken.java"),
            "public class Broken { void f( { }".to_string(),
        );

        assert!(matches!(result, Err(ref e) if e.is_parse_error()));
    }

    #[test]
    fn test_top_level_declarations() {
        let declarations = JavaParser::new()
            .top_level_declarations(
                Path::new("Foo.java"),
                "package a.b; public class Foo { class Nested {} } interface Bar {}",
            )
            .unwrap();

        let names: Vec<String> = declarations.qualified_names().collect();
        assert_eq!(names, vec!["a.b.Foo", "a.b.Bar"]);
    }
}
