use std::cell::RefCell;
use std::collections::{HashMap, HashSet, VecDeque};
use std::path::PathBuf;
use std::rc::Rc;

use tree_sitter::Node;

use super::java_parser::{compact, is_type_declaration, line_of, type_text, ParsedUnit};
use super::type_index::TypeIndex;
use crate::application::SolvedType;
use crate::domain::{
    CompilationUnit, MemberKind, MemberRef, MethodCallSite, MethodRef, NameTarget, Resolution,
    ResolutionError, ResolvedType, TypeDeclaration, JAVA_LANG_CLASS, JAVA_LANG_OBJECT,
};

const PRIMITIVES: &[&str] = &[
    "boolean", "byte", "char", "short", "int", "long", "float", "double",
];

const JAVA_LANG_ENUM: &str = "java.lang.Enum";
const JAVA_LANG_RECORD: &str = "java.lang.Record";

/// Members every type inherits without declaring them.
/// (owner, method, parameter types, return type)
const IMPLICIT_METHODS: &[(&str, &str, &[&str], &str)] = &[
    (JAVA_LANG_OBJECT, "equals", &["Object"], "boolean"),
    (JAVA_LANG_OBJECT, "hashCode", &[], "int"),
    (JAVA_LANG_OBJECT, "toString", &[], "java.lang.String"),
    (JAVA_LANG_OBJECT, "getClass", &[], JAVA_LANG_CLASS),
    (JAVA_LANG_OBJECT, "clone", &[], JAVA_LANG_OBJECT),
    (JAVA_LANG_OBJECT, "finalize", &[], "void"),
    (JAVA_LANG_OBJECT, "notify", &[], "void"),
    (JAVA_LANG_OBJECT, "notifyAll", &[], "void"),
    (JAVA_LANG_OBJECT, "wait", &[], "void"),
    (JAVA_LANG_OBJECT, "wait", &["long"], "void"),
    (JAVA_LANG_ENUM, "name", &[], "java.lang.String"),
    (JAVA_LANG_ENUM, "ordinal", &[], "int"),
    (JAVA_LANG_ENUM, "compareTo", &["E"], "int"),
    (JAVA_LANG_ENUM, "getDeclaringClass", &[], JAVA_LANG_CLASS),
];

/// Where a type name is being resolved: the file, the innermost type and
/// the type variables in scope.
#[derive(Debug, Clone)]
pub struct Scope {
    unit: Rc<CompilationUnit>,
    type_name: Option<String>,
    type_variables: Vec<String>,
}

enum Lookup<T> {
    Found(T),
    /// Not found, but some type in the hierarchy could not be inspected.
    Opaque(String),
    Missing,
}

struct FieldHit {
    owner: String,
    name: String,
    kind: MemberKind,
    field_type: Result<ResolvedType, ResolutionError>,
}

impl FieldHit {
    fn member_ref(&self) -> MemberRef {
        MemberRef {
            owner: self.owner.clone(),
            name: self.name.clone(),
            kind: self.kind,
        }
    }
}

struct MethodHit {
    owner: String,
    signature: String,
    return_type: Result<ResolvedType, ResolutionError>,
}

#[derive(Clone, Copy)]
enum LocalDeclaration<'t> {
    Typed {
        type_node: Node<'t>,
        value: Option<Node<'t>>,
        dimensions: usize,
    },
    ForEach {
        type_node: Node<'t>,
        iterable: Node<'t>,
    },
    /// Lambda parameters without a declared type.
    Untyped,
}

enum Binding<'t> {
    Local(LocalDeclaration<'t>),
    Field(FieldHit),
    Type(String),
}

/// What the left side of a `.` denotes.
enum Qualifier {
    Value(ResolvedType),
    Type(String),
    Package(String),
}

/// What `scope.name` turned out to be.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldAccessTarget {
    Member(Resolution<MemberRef>),
    /// The whole access names a type (`Outer.Inner`, `com.acme.Util`).
    Type(String),
    /// A package prefix of a qualified type name.
    Package,
    /// `array.length`
    ArrayLength,
    /// `Outer.this`
    Qualifier,
}

/// Resolves names, types and members inside one parsed file against the
/// project's resolver chain.
pub struct JavaSymbolSolver<'a> {
    types: &'a TypeIndex,
    parsed: &'a ParsedUnit,
    expression_types: RefCell<HashMap<usize, Result<ResolvedType, ResolutionError>>>,
    simple_names: RefCell<HashMap<(PathBuf, Option<String>, String), Result<String, ResolutionError>>>,
    resolving: RefCell<HashSet<(PathBuf, Option<String>, String)>>,
}

impl<'a> JavaSymbolSolver<'a> {
    pub fn new(types: &'a TypeIndex, parsed: &'a ParsedUnit) -> Self {
        Self {
            types,
            parsed,
            expression_types: RefCell::new(HashMap::new()),
            simple_names: RefCell::new(HashMap::new()),
            resolving: RefCell::new(HashSet::new()),
        }
    }

    pub fn parsed(&self) -> &'a ParsedUnit {
        self.parsed
    }

    pub fn unit(&self) -> &'a CompilationUnit {
        &self.parsed.unit
    }

    fn text(&self, node: Node<'a>) -> &'a str {
        node.utf8_text(self.parsed.source.as_bytes()).unwrap_or("")
    }

    /// Types declared in this file are found even when the file name does
    /// not match.
    fn solve(&self, qualified_name: &str) -> Option<SolvedType> {
        match self.parsed.unit.type_index(qualified_name) {
            Some(index) => Some(SolvedType::Source {
                unit: Rc::clone(&self.parsed.unit),
                index,
            }),
            None => self.types.solve(qualified_name),
        }
    }

    // Context

    /// Qualified name of the innermost named type around `node`.
    pub fn enclosing_type(&self, node: Node<'a>) -> Option<String> {
        let mut current = node.parent();
        while let Some(ancestor) = current {
            if is_type_declaration(ancestor.kind()) {
                let qualified_name = self.declared_name(ancestor);
                if self.parsed.unit.find_type(&qualified_name).is_some() {
                    return Some(qualified_name);
                }
            }
            current = ancestor.parent();
        }
        self.parsed
            .unit
            .type_at_line(line_of(node))
            .map(|t| t.qualified_name.clone())
    }

    fn declared_name(&self, declaration: Node<'a>) -> String {
        let mut names = Vec::new();
        let mut current = Some(declaration);
        while let Some(node) = current {
            if is_type_declaration(node.kind()) {
                if let Some(name) = node.child_by_field_name("name") {
                    names.push(self.text(name));
                }
            }
            current = node.parent();
        }
        names.reverse();
        self.parsed.unit.qualify(&names.join("."))
    }

    fn type_variables_at(&self, node: Node<'a>) -> Vec<String> {
        let mut names = Vec::new();
        let mut current = Some(node);
        while let Some(ancestor) = current {
            let declares_parameters = matches!(
                ancestor.kind(),
                "method_declaration" | "constructor_declaration"
            ) || is_type_declaration(ancestor.kind());
            if declares_parameters {
                if let Some(parameters) = ancestor.child_by_field_name("type_parameters") {
                    let mut cursor = parameters.walk();
                    for parameter in parameters.named_children(&mut cursor) {
                        let mut inner = parameter.walk();
                        let name = parameter
                            .named_children(&mut inner)
                            .find(|n| matches!(n.kind(), "type_identifier" | "identifier"));
                        if let Some(name) = name {
                            names.push(self.text(name).to_string());
                        }
                    }
                }
            }
            current = ancestor.parent();
        }
        names
    }

    pub fn scope_at(&self, node: Node<'a>) -> Scope {
        Scope {
            unit: Rc::clone(&self.parsed.unit),
            type_name: self.enclosing_type(node),
            type_variables: self.type_variables_at(node),
        }
    }

    /// Types whose members are visible unqualified at `node`, innermost
    /// first: anonymous class supertypes, then the enclosing type chain.
    fn member_owners(&self, node: Node<'a>) -> Vec<String> {
        let unit = &self.parsed.unit;
        let mut owners = Vec::new();
        let mut child = node;
        let mut current = node.parent();

        while let Some(ancestor) = current {
            if ancestor.kind() == "object_creation_expression" && child.kind() == "class_body" {
                if let Ok(ResolvedType::Reference(created)) = self.construction_type(ancestor) {
                    owners.push(created);
                }
            } else if is_type_declaration(ancestor.kind()) {
                let qualified_name = self.declared_name(ancestor);
                if unit.find_type(&qualified_name).is_some() {
                    owners.extend(
                        enclosing_chain(unit, Some(qualified_name.as_str()))
                            .into_iter()
                            .map(|t| t.qualified_name.clone()),
                    );
                    return owners;
                }
            }
            child = ancestor;
            current = ancestor.parent();
        }

        if let Some(declaration) = unit.type_at_line(line_of(node)) {
            owners.extend(
                enclosing_chain(unit, Some(declaration.qualified_name.as_str()))
                    .into_iter()
                    .map(|t| t.qualified_name.clone()),
            );
        }
        owners
    }

    // Type names

    pub fn resolve_type_node(&self, node: Node<'a>) -> Result<ResolvedType, ResolutionError> {
        let scope = self.scope_at(node);
        self.resolve_type_text(&scope, &type_text(node, &self.parsed.source))
    }

    /// Resolves a type as written (`List<Foo>[]`, `Map.Entry`, `T...`).
    pub fn resolve_type_text(&self, scope: &Scope, text: &str) -> Result<ResolvedType, ResolutionError> {
        let (base, dimensions) = split_type_text(text);

        let element = if base.is_empty() {
            if text.trim_start().starts_with('?') {
                ResolvedType::reference(JAVA_LANG_OBJECT)
            } else {
                return Err(ResolutionError::Unsupported(text.to_string()));
            }
        } else if base == "var" {
            return Err(ResolutionError::Uninferable(text.to_string()));
        } else if PRIMITIVES.contains(&base.as_str()) {
            ResolvedType::primitive(base)
        } else if base == "void" {
            ResolvedType::Void
        } else if self.is_type_variable(scope, &base) {
            ResolvedType::TypeVariable(base)
        } else {
            ResolvedType::reference(self.resolve_type_name(scope, &base)?)
        };

        Ok(ResolvedType::array_of(element, dimensions))
    }

    fn is_type_variable(&self, scope: &Scope, name: &str) -> bool {
        if name.contains('.') {
            return false;
        }
        scope.type_variables.iter().any(|v| v == name)
            || enclosing_chain(&scope.unit, scope.type_name.as_deref())
                .iter()
                .any(|t| t.type_parameters.iter().any(|v| v == name))
    }

    /// Qualified name for a simple or dotted type name.
    pub fn resolve_type_name(&self, scope: &Scope, name: &str) -> Result<String, ResolutionError> {
        let Some((head, rest)) = name.split_once('.') else {
            return self.resolve_simple_name(scope, name);
        };

        if let Ok(outer) = self.resolve_simple_name(scope, head) {
            let nested = format!("{}.{}", outer, rest);
            if self.solve(&nested).is_some() {
                return Ok(nested);
            }
        }
        if self.solve(name).is_some() {
            return Ok(name.to_string());
        }
        Err(ResolutionError::unknown_type(name))
    }

    fn resolve_simple_name(&self, scope: &Scope, name: &str) -> Result<String, ResolutionError> {
        let key = (scope.unit.path.clone(), scope.type_name.clone(), name.to_string());
        if let Some(known) = self.simple_names.borrow().get(&key) {
            return known.clone();
        }
        // Cyclic hierarchies would otherwise recurse forever.
        if !self.resolving.borrow_mut().insert(key.clone()) {
            return Err(ResolutionError::unknown_type(name));
        }

        let resolved = self.lookup_simple_name(scope, name);

        self.resolving.borrow_mut().remove(&key);
        self.simple_names.borrow_mut().insert(key, resolved.clone());
        resolved
    }

    fn lookup_simple_name(&self, scope: &Scope, name: &str) -> Result<String, ResolutionError> {
        let unit = &scope.unit;

        for declaration in enclosing_chain(unit, scope.type_name.as_deref()) {
            if declaration.name == name {
                return Ok(declaration.qualified_name.clone());
            }
            if let Some(member) = self.member_type(&declaration.qualified_name, name) {
                return Ok(member);
            }
        }

        if let Some(top) = unit.top_level_types().find(|t| t.name == name) {
            return Ok(top.qualified_name.clone());
        }

        for import in unit.single_type_imports() {
            if import.simple_name() == name && self.solve(&import.path).is_some() {
                return Ok(import.path.clone());
            }
        }

        let same_package = unit.qualify(name);
        if self.solve(&same_package).is_some() {
            return Ok(same_package);
        }

        for import in unit.on_demand_imports() {
            let candidate = format!("{}.{}", import.path, name);
            if self.solve(&candidate).is_some() {
                return Ok(candidate);
            }
        }

        let java_lang = format!("java.lang.{}", name);
        if self.solve(&java_lang).is_some() {
            return Ok(java_lang);
        }

        Err(ResolutionError::unknown_type(name))
    }

    /// A member type `name` declared by `owner` or inherited from its supertypes.
    fn member_type(&self, owner: &str, name: &str) -> Option<String> {
        let mut visited = HashSet::new();
        let mut pending = VecDeque::from([owner.to_string()]);

        while let Some(current) = pending.pop_front() {
            if !visited.insert(current.clone()) {
                continue;
            }
            let Some(SolvedType::Source { unit, index }) = self.solve(&current) else {
                continue;
            };
            let declaration = &unit.types[index];
            if declaration.has_member_type(name) {
                return Some(format!("{}.{}", declaration.qualified_name, name));
            }
            pending.extend(self.super_types(&unit, declaration).into_iter().flatten());
        }
        None
    }

    /// Declared supertypes; `Err` carries the text of the ones that cannot be solved.
    fn super_types(
        &self,
        unit: &Rc<CompilationUnit>,
        declaration: &TypeDeclaration,
    ) -> Vec<Result<String, String>> {
        let scope = Scope {
            unit: Rc::clone(unit),
            type_name: declaration.enclosing.clone(),
            type_variables: declaration.type_parameters.clone(),
        };
        declaration
            .super_types
            .iter()
            .map(|text| match self.resolve_type_text(&scope, text) {
                Ok(ResolvedType::Reference(qualified_name)) => Ok(qualified_name),
                _ => Err(text.clone()),
            })
            .collect()
    }

    // Members

    fn find_field(&self, owner: &str, name: &str) -> Lookup<FieldHit> {
        let mut opaque = None;
        let mut visited = HashSet::new();
        let mut pending = VecDeque::from([owner.to_string()]);

        while let Some(current) = pending.pop_front() {
            if !visited.insert(current.clone()) {
                continue;
            }
            match self.solve(&current) {
                None => {
                    opaque.get_or_insert(current);
                }
                Some(SolvedType::Opaque {
                    qualified_name,
                    fields,
                    ..
                }) => {
                    if let Some(field) = fields.iter().find(|f| f.name == name) {
                        return Lookup::Found(FieldHit {
                            owner: qualified_name,
                            name: name.to_string(),
                            kind: MemberKind::Field,
                            field_type: Ok(platform_type(&field.type_text)),
                        });
                    }
                    if !is_implicit_supertype(&qualified_name) {
                        opaque.get_or_insert(qualified_name);
                    }
                }
                Some(SolvedType::Source { unit, index }) => {
                    let declaration = &unit.types[index];
                    if declaration.has_enum_constant(name) {
                        return Lookup::Found(FieldHit {
                            owner: declaration.qualified_name.clone(),
                            name: name.to_string(),
                            kind: MemberKind::EnumConstant,
                            field_type: Ok(ResolvedType::reference(
                                declaration.qualified_name.clone(),
                            )),
                        });
                    }
                    if let Some(field) = declaration.find_field(name) {
                        let scope = Scope {
                            unit: Rc::clone(&unit),
                            type_name: Some(declaration.qualified_name.clone()),
                            type_variables: declaration.type_parameters.clone(),
                        };
                        return Lookup::Found(FieldHit {
                            owner: declaration.qualified_name.clone(),
                            name: name.to_string(),
                            kind: MemberKind::Field,
                            field_type: self.resolve_type_text(&scope, &field.type_text),
                        });
                    }
                    for super_type in self.super_types(&unit, declaration) {
                        match super_type {
                            Ok(qualified_name) => pending.push_back(qualified_name),
                            Err(text) => {
                                opaque.get_or_insert(text);
                            }
                        }
                    }
                }
            }
        }

        opaque.map_or(Lookup::Missing, Lookup::Opaque)
    }

    /// First method named `name` accepting `arity` arguments, searching the
    /// type, then its supertypes breadth-first, then the implicit ones.
    fn find_method(&self, owner: &str, name: &str, arity: usize) -> Lookup<MethodHit> {
        let mut opaque = None;
        let mut is_enum = false;
        let mut visited = HashSet::new();
        let mut pending = VecDeque::from([owner.to_string()]);

        while let Some(current) = pending.pop_front() {
            if !visited.insert(current.clone()) {
                continue;
            }
            match self.solve(&current) {
                None => {
                    opaque.get_or_insert(current);
                }
                Some(SolvedType::Opaque { qualified_name, .. }) => {
                    if is_implicit_supertype(&qualified_name) {
                        if let Some(hit) = implicit_method(&qualified_name, name, arity) {
                            return Lookup::Found(hit);
                        }
                    } else {
                        opaque.get_or_insert(qualified_name);
                    }
                }
                Some(SolvedType::Source { unit, index }) => {
                    let declaration = &unit.types[index];
                    is_enum |= declaration.is_enum();

                    let method = declaration
                        .methods_named(name)
                        .find(|m| !m.is_constructor() && m.accepts_arity(arity));
                    if let Some(method) = method {
                        let mut type_variables = declaration.type_parameters.clone();
                        type_variables.extend(method.type_parameters.iter().cloned());
                        let scope = Scope {
                            unit: Rc::clone(&unit),
                            type_name: Some(declaration.qualified_name.clone()),
                            type_variables,
                        };
                        let return_type = method.return_type.as_deref().unwrap_or("void");
                        return Lookup::Found(MethodHit {
                            owner: declaration.qualified_name.clone(),
                            signature: method.signature(),
                            return_type: self.resolve_type_text(&scope, return_type),
                        });
                    }

                    for super_type in self.super_types(&unit, declaration) {
                        match super_type {
                            Ok(qualified_name) => pending.push_back(qualified_name),
                            Err(text) => {
                                opaque.get_or_insert(text);
                            }
                        }
                    }
                }
            }
        }

        let implicit = is_enum
            .then_some(JAVA_LANG_ENUM)
            .into_iter()
            .chain(std::iter::once(JAVA_LANG_OBJECT));
        for owner in implicit {
            if let Some(hit) = implicit_method(owner, name, arity) {
                return Lookup::Found(hit);
            }
        }

        opaque.map_or(Lookup::Missing, Lookup::Opaque)
    }

    fn field_resolution(&self, owner: &str, name: &str) -> Resolution<MemberRef> {
        match self.find_field(owner, name) {
            Lookup::Found(hit) => Resolution::Resolved(hit.member_ref()),
            Lookup::Opaque(opaque) => Resolution::ScopeOnly {
                owner: owner.to_string(),
                reason: ResolutionError::OpaqueType(opaque),
            },
            Lookup::Missing => Resolution::ScopeOnly {
                owner: owner.to_string(),
                reason: ResolutionError::member_not_found(owner, name),
            },
        }
    }

    fn method_resolution(
        &self,
        owner: &str,
        name: &str,
        arity: usize,
    ) -> (Resolution<MethodRef>, Result<ResolvedType, ResolutionError>) {
        match self.find_method(owner, name, arity) {
            Lookup::Found(hit) => (
                Resolution::Resolved(MethodRef {
                    owner: hit.owner,
                    name: name.to_string(),
                    signature: hit.signature,
                }),
                hit.return_type,
            ),
            Lookup::Opaque(opaque) => {
                let reason = ResolutionError::OpaqueType(opaque);
                (
                    Resolution::ScopeOnly {
                        owner: owner.to_string(),
                        reason: reason.clone(),
                    },
                    Err(reason),
                )
            }
            Lookup::Missing => {
                let reason = ResolutionError::member_not_found(owner, name);
                (
                    Resolution::ScopeOnly {
                        owner: owner.to_string(),
                        reason: reason.clone(),
                    },
                    Err(reason),
                )
            }
        }
    }

    fn static_import_field(&self, name: &str) -> Option<FieldHit> {
        for import in self.parsed.unit.static_imports() {
            if import.on_demand {
                if let Lookup::Found(hit) = self.find_field(&import.path, name) {
                    return Some(hit);
                }
            } else if import.simple_name() == name {
                let owner = import.container().to_string();
                return Some(match self.find_field(&owner, name) {
                    Lookup::Found(hit) => hit,
                    _ => FieldHit {
                        owner,
                        name: name.to_string(),
                        kind: MemberKind::Field,
                        field_type: Err(ResolutionError::OpaqueType(import.path.clone())),
                    },
                });
            }
        }
        None
    }

    // Locals

    fn find_local(&self, node: Node<'a>, name: &str) -> Option<LocalDeclaration<'a>> {
        let mut child = node;
        let mut current = node.parent();

        while let Some(ancestor) = current {
            match ancestor.kind() {
                "block" | "constructor_body" | "switch_block_statement_group" => {
                    let mut cursor = ancestor.walk();
                    for statement in ancestor.named_children(&mut cursor) {
                        if statement.start_byte() > child.start_byte() {
                            break;
                        }
                        if statement.kind() == "local_variable_declaration" {
                            if let Some(local) = self.declared_in(statement, name) {
                                return Some(local);
                            }
                        }
                    }
                }
                "method_declaration" | "constructor_declaration" => {
                    let local = ancestor
                        .child_by_field_name("parameters")
                        .and_then(|parameters| self.parameter(parameters, name));
                    if local.is_some() {
                        return local;
                    }
                }
                "lambda_expression" => {
                    if let Some(parameters) = ancestor.child_by_field_name("parameters") {
                        match parameters.kind() {
                            "identifier" => {
                                if self.text(parameters) == name {
                                    return Some(LocalDeclaration::Untyped);
                                }
                            }
                            "inferred_parameters" => {
                                let mut cursor = parameters.walk();
                                let declared = parameters
                                    .named_children(&mut cursor)
                                    .any(|p| self.text(p) == name);
                                if declared {
                                    return Some(LocalDeclaration::Untyped);
                                }
                            }
                            _ => {
                                let local = self.parameter(parameters, name);
                                if local.is_some() {
                                    return local;
                                }
                            }
                        }
                    }
                }
                "for_statement" => {
                    let mut cursor = ancestor.walk();
                    let inits: Vec<Node<'a>> =
                        ancestor.children_by_field_name("init", &mut cursor).collect();
                    for init in inits {
                        if init.kind() == "local_variable_declaration" {
                            if let Some(local) = self.declared_in(init, name) {
                                return Some(local);
                            }
                        }
                    }
                }
                "enhanced_for_statement" => {
                    let declared = ancestor
                        .child_by_field_name("name")
                        .map_or(false, |n| self.text(n) == name);
                    if declared {
                        if let (Some(type_node), Some(iterable)) = (
                            ancestor.child_by_field_name("type"),
                            ancestor.child_by_field_name("value"),
                        ) {
                            return Some(LocalDeclaration::ForEach {
                                type_node,
                                iterable,
                            });
                        }
                    }
                }
                "catch_clause" => {
                    if let Some(local) = self.catch_parameter(ancestor, name) {
                        return Some(local);
                    }
                }
                "try_with_resources_statement" => {
                    if let Some(resources) = ancestor.child_by_field_name("resources") {
                        let mut cursor = resources.walk();
                        for resource in resources.named_children(&mut cursor) {
                            let declared = resource
                                .child_by_field_name("name")
                                .map_or(false, |n| self.text(n) == name);
                            if let (true, Some(type_node)) =
                                (declared, resource.child_by_field_name("type"))
                            {
                                return Some(LocalDeclaration::Typed {
                                    type_node,
                                    value: resource.child_by_field_name("value"),
                                    dimensions: 0,
                                });
                            }
                        }
                    }
                }
                "if_statement" | "while_statement" | "ternary_expression" => {
                    if let Some(condition) = ancestor.child_by_field_name("condition") {
                        if condition.id() != child.id() {
                            if let Some(local) = self.pattern_binding(condition, name) {
                                return Some(local);
                            }
                        }
                    }
                }
                "binary_expression" => {
                    if let Some(left) = ancestor.child_by_field_name("left") {
                        if left.id() != child.id() {
                            if let Some(local) = self.pattern_binding(left, name) {
                                return Some(local);
                            }
                        }
                    }
                }
                "class_body" => {
                    // Anonymous and local classes still see the enclosing locals.
                    let sees_locals = ancestor.parent().map_or(false, |parent| {
                        parent.kind() == "object_creation_expression"
                            || parent.parent().map_or(false, |p| p.kind() == "block")
                    });
                    if !sees_locals {
                        return None;
                    }
                }
                "interface_body" | "enum_body" | "annotation_type_body" | "program" => {
                    return None;
                }
                _ => {}
            }
            child = ancestor;
            current = ancestor.parent();
        }
        None
    }

    fn declared_in(&self, declaration: Node<'a>, name: &str) -> Option<LocalDeclaration<'a>> {
        let type_node = declaration.child_by_field_name("type")?;
        let mut cursor = declaration.walk();
        let declarators: Vec<Node<'a>> = declaration
            .children_by_field_name("declarator", &mut cursor)
            .collect();

        declarators.into_iter().find_map(|declarator| {
            let declared = declarator
                .child_by_field_name("name")
                .map_or(false, |n| self.text(n) == name);
            declared.then(|| LocalDeclaration::Typed {
                type_node,
                value: declarator.child_by_field_name("value"),
                dimensions: self.dimensions(declarator),
            })
        })
    }

    fn dimensions(&self, node: Node<'a>) -> usize {
        node.child_by_field_name("dimensions")
            .map_or(0, |d| self.text(d).matches('[').count())
    }

    fn parameter(&self, parameters: Node<'a>, name: &str) -> Option<LocalDeclaration<'a>> {
        let mut cursor = parameters.walk();
        let children: Vec<Node<'a>> = parameters.named_children(&mut cursor).collect();

        for parameter in children {
            match parameter.kind() {
                "formal_parameter" => {
                    let declared = parameter
                        .child_by_field_name("name")
                        .map_or(false, |n| self.text(n) == name);
                    if let (true, Some(type_node)) = (declared, parameter.child_by_field_name("type")) {
                        return Some(LocalDeclaration::Typed {
                            type_node,
                            value: None,
                            dimensions: self.dimensions(parameter),
                        });
                    }
                }
                "spread_parameter" => {
                    let mut inner = parameter.walk();
                    let parts: Vec<Node<'a>> = parameter.named_children(&mut inner).collect();
                    let declared = parts.iter().any(|part| match part.kind() {
                        "variable_declarator" => part
                            .child_by_field_name("name")
                            .map_or(false, |n| self.text(n) == name),
                        "identifier" => self.text(*part) == name,
                        _ => false,
                    });
                    let type_node = parts.iter().copied().find(|part| {
                        !matches!(part.kind(), "modifiers" | "variable_declarator" | "identifier")
                    });
                    if let (true, Some(type_node)) = (declared, type_node) {
                        return Some(LocalDeclaration::Typed {
                            type_node,
                            value: None,
                            dimensions: 1,
                        });
                    }
                }
                _ => {}
            }
        }
        None
    }

    fn catch_parameter(&self, clause: Node<'a>, name: &str) -> Option<LocalDeclaration<'a>> {
        let mut cursor = clause.walk();
        let parameter = clause
            .named_children(&mut cursor)
            .find(|c| c.kind() == "catch_formal_parameter")?;

        let declared = parameter
            .child_by_field_name("name")
            .map_or(false, |n| self.text(n) == name);
        if !declared {
            return None;
        }

        let mut inner = parameter.walk();
        let catch_type = parameter
            .named_children(&mut inner)
            .find(|c| c.kind() == "catch_type")?;
        let mut types = catch_type.walk();
        let first = catch_type.named_children(&mut types).next()?;
        Some(LocalDeclaration::Typed {
            type_node: first,
            value: None,
            dimensions: 0,
        })
    }

    /// `x instanceof Foo f` bindings inside `condition`.
    fn pattern_binding(&self, condition: Node<'a>, name: &str) -> Option<LocalDeclaration<'a>> {
        let mut stack = vec![condition];
        while let Some(node) = stack.pop() {
            if node.kind() == "instanceof_expression" {
                let declared = node
                    .child_by_field_name("name")
                    .map_or(false, |n| self.text(n) == name);
                if let (true, Some(type_node)) = (declared, node.child_by_field_name("right")) {
                    return Some(LocalDeclaration::Typed {
                        type_node,
                        value: None,
                        dimensions: 0,
                    });
                }
            }
            if matches!(node.kind(), "lambda_expression" | "class_body") {
                continue;
            }
            let mut cursor = node.walk();
            stack.extend(node.named_children(&mut cursor));
        }
        None
    }

    fn local_type(
        &self,
        local: LocalDeclaration<'a>,
        name: &str,
    ) -> Result<ResolvedType, ResolutionError> {
        match local {
            LocalDeclaration::Typed {
                type_node,
                value,
                dimensions,
            } => {
                if self.text(type_node) == "var" {
                    return match value {
                        Some(value) => self.type_of(value),
                        None => Err(ResolutionError::Uninferable(name.to_string())),
                    };
                }
                self.resolve_type_node(type_node)
                    .map(|element| ResolvedType::array_of(element, dimensions))
            }
            LocalDeclaration::ForEach {
                type_node,
                iterable,
            } => {
                if self.text(type_node) != "var" {
                    return self.resolve_type_node(type_node);
                }
                match self.type_of(iterable)? {
                    ResolvedType::Array(element) => Ok(*element),
                    _ => Err(ResolutionError::Uninferable(format!(
                        "element type of {}",
                        name
                    ))),
                }
            }
            LocalDeclaration::Untyped => Err(ResolutionError::Uninferable(format!(
                "lambda parameter {}",
                name
            ))),
        }
    }

    // Names

    /// Locals, then fields visible from `node`, then static imports, then
    /// type names.
    fn binding(&self, node: Node<'a>, name: &str) -> Result<Binding<'a>, ResolutionError> {
        if let Some(local) = self.find_local(node, name) {
            return Ok(Binding::Local(local));
        }

        let mut opaque = None;
        for owner in self.member_owners(node) {
            match self.find_field(&owner, name) {
                Lookup::Found(hit) => return Ok(Binding::Field(hit)),
                Lookup::Opaque(type_name) => {
                    opaque.get_or_insert(type_name);
                }
                Lookup::Missing => {}
            }
        }

        if let Some(hit) = self.static_import_field(name) {
            return Ok(Binding::Field(hit));
        }

        let scope = self.scope_at(node);
        if let Ok(qualified_name) = self.resolve_simple_name(&scope, name) {
            return Ok(Binding::Type(qualified_name));
        }

        Err(match opaque {
            Some(type_name) => ResolutionError::OpaqueType(type_name),
            None => ResolutionError::unknown_symbol(name),
        })
    }

    /// What a bare identifier in expression position refers to.
    pub fn resolve_name(&self, node: Node<'a>) -> Result<NameTarget, ResolutionError> {
        match self.binding(node, self.text(node))? {
            Binding::Local(_) => Ok(NameTarget::Local),
            Binding::Field(hit) => Ok(NameTarget::Member(hit.member_ref())),
            Binding::Type(qualified_name) => Ok(NameTarget::Type(qualified_name)),
        }
    }

    fn qualifier(&self, node: Node<'a>) -> Result<Qualifier, ResolutionError> {
        match node.kind() {
            "identifier" => {
                let name = self.text(node);
                match self.binding(node, name) {
                    Ok(Binding::Local(local)) => self.local_type(local, name).map(Qualifier::Value),
                    Ok(Binding::Field(hit)) => hit.field_type.map(Qualifier::Value),
                    Ok(Binding::Type(qualified_name)) => Ok(Qualifier::Type(qualified_name)),
                    Err(e) => {
                        if self.types.has_package(name) {
                            Ok(Qualifier::Package(name.to_string()))
                        } else {
                            Err(e)
                        }
                    }
                }
            }
            "field_access" => {
                let (Some(object), Some(field)) = (
                    node.child_by_field_name("object"),
                    node.child_by_field_name("field"),
                ) else {
                    return Err(ResolutionError::Unsupported(compact(self.text(node))));
                };
                let name = self.text(field);

                match self.qualifier(object)? {
                    Qualifier::Value(ResolvedType::Array(_)) if name == "length" => {
                        Ok(Qualifier::Value(ResolvedType::primitive("int")))
                    }
                    Qualifier::Value(ResolvedType::Reference(owner)) => {
                        match self.find_field(&owner, name) {
                            Lookup::Found(hit) => hit.field_type.map(Qualifier::Value),
                            Lookup::Opaque(type_name) => Err(ResolutionError::OpaqueType(type_name)),
                            Lookup::Missing => Err(ResolutionError::member_not_found(owner, name)),
                        }
                    }
                    Qualifier::Value(other) => {
                        Err(ResolutionError::NotAReferenceType(other.describe()))
                    }
                    Qualifier::Type(owner) => {
                        if field.kind() == "this" {
                            return Ok(Qualifier::Value(ResolvedType::reference(owner)));
                        }
                        match self.find_field(&owner, name) {
                            Lookup::Found(hit) => hit.field_type.map(Qualifier::Value),
                            lookup => {
                                let nested = format!("{}.{}", owner, name);
                                if self.solve(&nested).is_some() {
                                    return Ok(Qualifier::Type(nested));
                                }
                                Err(match lookup {
                                    Lookup::Opaque(type_name) => ResolutionError::OpaqueType(type_name),
                                    _ => ResolutionError::member_not_found(owner, name),
                                })
                            }
                        }
                    }
                    Qualifier::Package(package) => {
                        let qualified_name = format!("{}.{}", package, name);
                        if self.solve(&qualified_name).is_some() {
                            Ok(Qualifier::Type(qualified_name))
                        } else if self.types.has_package(&qualified_name) {
                            Ok(Qualifier::Package(qualified_name))
                        } else {
                            Err(ResolutionError::unknown_type(qualified_name))
                        }
                    }
                }
            }
            _ => self.type_of(node).map(Qualifier::Value),
        }
    }

    /// Resolves `scope.name`, falling back to the scope's type and then to
    /// its text.
    pub fn resolve_field_access(&self, node: Node<'a>) -> FieldAccessTarget {
        let (Some(object), Some(field)) = (
            node.child_by_field_name("object"),
            node.child_by_field_name("field"),
        ) else {
            return FieldAccessTarget::Member(Resolution::Unresolved {
                scope_text: None,
                reason: ResolutionError::Unsupported(compact(self.text(node))),
            });
        };
        if field.kind() == "this" {
            return FieldAccessTarget::Qualifier;
        }

        let name = self.text(field);
        let scope_text = Some(compact(self.text(object)));

        match self.qualifier(object) {
            Ok(Qualifier::Value(ResolvedType::Array(_))) if name == "length" => {
                FieldAccessTarget::ArrayLength
            }
            Ok(Qualifier::Value(ResolvedType::Reference(owner))) => {
                FieldAccessTarget::Member(self.field_resolution(&owner, name))
            }
            Ok(Qualifier::Value(other)) => FieldAccessTarget::Member(Resolution::Unresolved {
                scope_text,
                reason: ResolutionError::NotAReferenceType(other.describe()),
            }),
            Ok(Qualifier::Type(owner)) => match self.field_resolution(&owner, name) {
                Resolution::Resolved(member) => FieldAccessTarget::Member(Resolution::Resolved(member)),
                unresolved => {
                    let nested = format!("{}.{}", owner, name);
                    if self.solve(&nested).is_some() {
                        FieldAccessTarget::Type(nested)
                    } else {
                        FieldAccessTarget::Member(unresolved)
                    }
                }
            },
            Ok(Qualifier::Package(package)) => {
                let qualified_name = format!("{}.{}", package, name);
                if self.solve(&qualified_name).is_some() {
                    FieldAccessTarget::Type(qualified_name)
                } else if self.types.has_package(&qualified_name) {
                    FieldAccessTarget::Package
                } else {
                    FieldAccessTarget::Member(Resolution::Unresolved {
                        scope_text,
                        reason: ResolutionError::unknown_type(qualified_name),
                    })
                }
            }
            Err(reason) => FieldAccessTarget::Member(Resolution::Unresolved { scope_text, reason }),
        }
    }

    // Calls

    pub fn resolve_method_call(&self, node: Node<'a>) -> MethodCallSite {
        self.invoke(node).0
    }

    fn invoke(&self, node: Node<'a>) -> (MethodCallSite, Result<ResolvedType, ResolutionError>) {
        let name = node
            .child_by_field_name("name")
            .map(|n| self.text(n))
            .unwrap_or_default()
            .to_string();
        let arguments = node
            .child_by_field_name("arguments")
            .map(arguments_of)
            .unwrap_or_default();
        let arity = arguments.len();

        let argument_owners = arguments
            .iter()
            .filter(|argument| argument.kind() == "field_access")
            .filter_map(|argument| match self.resolve_field_access(*argument) {
                FieldAccessTarget::Member(Resolution::Resolved(member)) => Some(member.owner),
                FieldAccessTarget::Member(Resolution::ScopeOnly { owner, .. }) => Some(owner),
                _ => None,
            })
            .collect();

        let (receiver, receiver_text, resolution, return_type) =
            match node.child_by_field_name("object") {
                Some(object) => {
                    let receiver = self.type_of(object);
                    let scope_text = compact(self.text(object));
                    let (resolution, return_type) = match &receiver {
                        Ok(ResolvedType::Reference(owner)) => {
                            self.method_resolution(owner, &name, arity)
                        }
                        Ok(other) => match implicit_method(JAVA_LANG_OBJECT, &name, arity) {
                            Some(hit) if matches!(other, ResolvedType::Array(_) | ResolvedType::TypeVariable(_)) => (
                                Resolution::Resolved(MethodRef {
                                    owner: hit.owner,
                                    name: name.clone(),
                                    signature: hit.signature,
                                }),
                                hit.return_type,
                            ),
                            _ => {
                                let reason = ResolutionError::NotAReferenceType(other.describe());
                                (
                                    Resolution::Unresolved {
                                        scope_text: Some(scope_text.clone()),
                                        reason: reason.clone(),
                                    },
                                    Err(reason),
                                )
                            }
                        },
                        Err(reason) => (
                            Resolution::Unresolved {
                                scope_text: Some(scope_text.clone()),
                                reason: reason.clone(),
                            },
                            Err(reason.clone()),
                        ),
                    };
                    (Some(receiver), Some(scope_text), resolution, return_type)
                }
                None => {
                    let (resolution, return_type) = self.unqualified_call(node, &name, arity);
                    (None, None, resolution, return_type)
                }
            };

        (
            MethodCallSite {
                name,
                arity,
                receiver,
                receiver_text,
                resolution,
                argument_owners,
            },
            return_type,
        )
    }

    fn unqualified_call(
        &self,
        node: Node<'a>,
        name: &str,
        arity: usize,
    ) -> (Resolution<MethodRef>, Result<ResolvedType, ResolutionError>) {
        let owners = self.member_owners(node);
        let mut opaque: Option<(String, String)> = None;

        for owner in &owners {
            match self.find_method(owner, name, arity) {
                Lookup::Found(hit) => {
                    return (
                        Resolution::Resolved(MethodRef {
                            owner: hit.owner,
                            name: name.to_string(),
                            signature: hit.signature,
                        }),
                        hit.return_type,
                    );
                }
                Lookup::Opaque(type_name) => {
                    opaque.get_or_insert((owner.clone(), type_name));
                }
                Lookup::Missing => {}
            }
        }

        for import in self.parsed.unit.static_imports() {
            if import.on_demand {
                if let (Resolution::Resolved(method), return_type) =
                    self.method_resolution(&import.path, name, arity)
                {
                    return (Resolution::Resolved(method), return_type);
                }
            } else if import.simple_name() == name {
                return self.method_resolution(import.container(), name, arity);
            }
        }

        if let Some((owner, type_name)) = opaque {
            let reason = ResolutionError::OpaqueType(type_name);
            return (
                Resolution::ScopeOnly {
                    owner,
                    reason: reason.clone(),
                },
                Err(reason),
            );
        }

        let reason = match owners.first() {
            Some(owner) => ResolutionError::member_not_found(owner.as_str(), name),
            None => ResolutionError::unknown_symbol(name),
        };
        (
            Resolution::Unresolved {
                scope_text: None,
                reason: reason.clone(),
            },
            Err(reason),
        )
    }

    // Other sites

    pub fn construction_type(&self, node: Node<'a>) -> Result<ResolvedType, ResolutionError> {
        let type_node = node
            .child_by_field_name("type")
            .ok_or_else(|| ResolutionError::Unsupported(compact(self.text(node))))?;
        self.resolve_type_node(type_node)
    }

    pub fn resolve_annotation(&self, node: Node<'a>) -> (String, Result<ResolvedType, ResolutionError>) {
        let Some(name_node) = node.child_by_field_name("name") else {
            let text = compact(self.text(node));
            return (text.clone(), Err(ResolutionError::Unsupported(text)));
        };
        let name = self.text(name_node).to_string();
        let scope = self.scope_at(node);
        let resolved = self
            .resolve_type_name(&scope, &name)
            .map(ResolvedType::reference);
        (name, resolved)
    }

    /// The enum type a `switch` selects on, when it is one.
    pub fn switch_enum(&self, selector: Node<'a>) -> Option<String> {
        let ResolvedType::Reference(qualified_name) = self.type_of(selector).ok()? else {
            return None;
        };
        self.solve(&qualified_name)?
            .declaration()
            .filter(|d| d.is_enum())
            .map(|d| d.qualified_name.clone())
    }

    pub fn enum_constant(&self, enum_type: &str, name: &str) -> Option<MemberRef> {
        self.solve(enum_type)?
            .declaration()
            .filter(|d| d.has_enum_constant(name))
            .map(|d| MemberRef::enum_constant(d.qualified_name.clone(), name))
    }

    // Expressions

    /// Static type of an expression.
    pub fn type_of(&self, node: Node<'a>) -> Result<ResolvedType, ResolutionError> {
        if let Some(known) = self.expression_types.borrow().get(&node.id()) {
            return known.clone();
        }
        let resolved = self.compute_type(node);
        self.expression_types
            .borrow_mut()
            .insert(node.id(), resolved.clone());
        resolved
    }

    fn compute_type(&self, node: Node<'a>) -> Result<ResolvedType, ResolutionError> {
        let missing = || ResolutionError::Unsupported(compact(self.text(node)));

        match node.kind() {
            "decimal_integer_literal" | "hex_integer_literal" | "octal_integer_literal"
            | "binary_integer_literal" => {
                let long = self.text(node).ends_with(['l', 'L']);
                Ok(ResolvedType::primitive(if long { "long" } else { "int" }))
            }
            "decimal_floating_point_literal" | "hex_floating_point_literal" => {
                let float = self.text(node).ends_with(['f', 'F']);
                Ok(ResolvedType::primitive(if float { "float" } else { "double" }))
            }
            "true" | "false" => Ok(ResolvedType::primitive("boolean")),
            "character_literal" => Ok(ResolvedType::primitive("char")),
            "string_literal" | "text_block" => Ok(ResolvedType::string()),
            "null_literal" => Ok(ResolvedType::Null),
            "class_literal" => Ok(ResolvedType::reference(JAVA_LANG_CLASS)),
            "instanceof_expression" => Ok(ResolvedType::primitive("boolean")),
            "this" => self
                .enclosing_type(node)
                .map(ResolvedType::reference)
                .ok_or_else(|| ResolutionError::Uninferable("this".to_string())),
            "super" => self.superclass_of(node),
            "identifier" | "field_access" => match self.qualifier(node)? {
                Qualifier::Value(resolved) => Ok(resolved),
                Qualifier::Type(qualified_name) => Ok(ResolvedType::reference(qualified_name)),
                Qualifier::Package(package) => Err(ResolutionError::unknown_symbol(package)),
            },
            "method_invocation" => self.invoke(node).1,
            "object_creation_expression" => self.construction_type(node),
            "array_creation_expression" => {
                let element = self.resolve_type_node(node.child_by_field_name("type").ok_or_else(missing)?)?;
                let mut dimensions = 0;
                let mut cursor = node.walk();
                for child in node.children(&mut cursor) {
                    match child.kind() {
                        "dimensions_expr" => dimensions += 1,
                        "dimensions" => dimensions += self.text(child).matches('[').count(),
                        _ => {}
                    }
                }
                Ok(ResolvedType::array_of(element, dimensions))
            }
            "array_access" => {
                let array = node.child_by_field_name("array").ok_or_else(missing)?;
                match self.type_of(array)? {
                    ResolvedType::Array(element) => Ok(*element),
                    other => Err(ResolutionError::NotAReferenceType(other.describe())),
                }
            }
            "cast_expression" => {
                self.resolve_type_node(node.child_by_field_name("type").ok_or_else(missing)?)
            }
            "parenthesized_expression" | "update_expression" => {
                let inner = arguments_of(node).into_iter().next().ok_or_else(missing)?;
                self.type_of(inner)
            }
            "ternary_expression" => {
                let consequence = node.child_by_field_name("consequence").ok_or_else(missing)?;
                match self.type_of(consequence)? {
                    ResolvedType::Null => {
                        self.type_of(node.child_by_field_name("alternative").ok_or_else(missing)?)
                    }
                    resolved => Ok(resolved),
                }
            }
            "assignment_expression" => {
                self.type_of(node.child_by_field_name("left").ok_or_else(missing)?)
            }
            "unary_expression" => {
                let operator = node.child_by_field_name("operator").map(|o| o.kind());
                if operator == Some("!") {
                    return Ok(ResolvedType::primitive("boolean"));
                }
                self.type_of(node.child_by_field_name("operand").ok_or_else(missing)?)
            }
            "binary_expression" => self.binary_type(node),
            "lambda_expression" | "method_reference" | "array_initializer" | "switch_expression" => {
                Err(ResolutionError::Uninferable(compact(self.text(node))))
            }
            other => Err(ResolutionError::Unsupported(other.to_string())),
        }
    }

    fn binary_type(&self, node: Node<'a>) -> Result<ResolvedType, ResolutionError> {
        let operator = node
            .child_by_field_name("operator")
            .map(|o| o.kind())
            .unwrap_or_default();
        if matches!(operator, "==" | "!=" | "<" | ">" | "<=" | ">=" | "&&" | "||") {
            return Ok(ResolvedType::primitive("boolean"));
        }

        let missing = || ResolutionError::Unsupported(compact(self.text(node)));
        let left = self.type_of(node.child_by_field_name("left").ok_or_else(missing)?)?;
        let right = self.type_of(node.child_by_field_name("right").ok_or_else(missing)?)?;

        let string = ResolvedType::string();
        if operator == "+" && (left == string || right == string) {
            return Ok(string);
        }
        if matches!(operator, "<<" | ">>" | ">>>") {
            return Ok(promote(&left, &left));
        }
        Ok(promote(&left, &right))
    }

    fn superclass_of(&self, node: Node<'a>) -> Result<ResolvedType, ResolutionError> {
        let mut current = node.parent();
        while let Some(ancestor) = current {
            if is_type_declaration(ancestor.kind()) {
                let superclass = ancestor.child_by_field_name("superclass").and_then(|s| {
                    let mut cursor = s.walk();
                    let first = s.named_children(&mut cursor).next();
                    first
                });
                return match superclass {
                    Some(type_node) => self.resolve_type_node(type_node),
                    None => Ok(ResolvedType::reference(JAVA_LANG_OBJECT)),
                };
            }
            current = ancestor.parent();
        }
        Err(ResolutionError::Uninferable("super".to_string()))
    }
}

/// `type_name` and the types enclosing it, innermost first.
fn enclosing_chain<'u>(unit: &'u CompilationUnit, type_name: Option<&str>) -> Vec<&'u TypeDeclaration> {
    let mut chain = Vec::new();
    let mut current = type_name.and_then(|name| unit.find_type(name));
    while let Some(declaration) = current {
        chain.push(declaration);
        current = declaration
            .enclosing
            .as_deref()
            .and_then(|name| unit.find_type(name));
    }
    chain
}

/// Argument expressions, without comments.
pub fn arguments_of(node: Node<'_>) -> Vec<Node<'_>> {
    let mut cursor = node.walk();
    let arguments = node
        .named_children(&mut cursor)
        .filter(|n| !matches!(n.kind(), "line_comment" | "block_comment"))
        .collect();
    arguments
}

/// `Map<K, V>[]` → (`Map`, 1), `? extends Foo` → (`Foo`, 0).
fn split_type_text(text: &str) -> (String, usize) {
    let text = text.trim();
    let text = match text.strip_prefix('?') {
        Some(rest) => {
            let rest = rest.trim_start();
            rest.strip_prefix("extends")
                .or_else(|| rest.strip_prefix("super"))
                .map(str::trim_start)
                .unwrap_or(rest)
        }
        None => text,
    };

    let mut base = String::new();
    let mut depth = 0usize;
    for c in text.chars() {
        match c {
            '<' => depth += 1,
            '>' => depth = depth.saturating_sub(1),
            c if depth == 0 && !c.is_whitespace() => base.push(c),
            _ => {}
        }
    }

    let mut dimensions = 0;
    loop {
        if let Some(stripped) = base.strip_suffix("[]") {
            base = stripped.to_string();
        } else if let Some(stripped) = base.strip_suffix("...") {
            base = stripped.to_string();
        } else {
            break;
        }
        dimensions += 1;
    }
    (base, dimensions)
}

fn is_implicit_supertype(qualified_name: &str) -> bool {
    matches!(
        qualified_name,
        JAVA_LANG_OBJECT | JAVA_LANG_ENUM | JAVA_LANG_RECORD
    )
}

fn implicit_method(owner: &str, name: &str, arity: usize) -> Option<MethodHit> {
    IMPLICIT_METHODS
        .iter()
        .find(|(o, n, params, _)| *o == owner && *n == name && params.len() == arity)
        .map(|(o, n, params, return_type)| MethodHit {
            owner: o.to_string(),
            signature: format!("{}({})", n, params.join(", ")),
            return_type: Ok(platform_type(return_type)),
        })
}

/// Types written fully qualified, as in the platform tables.
fn platform_type(text: &str) -> ResolvedType {
    if PRIMITIVES.contains(&text) {
        ResolvedType::primitive(text)
    } else if text == "void" {
        ResolvedType::Void
    } else {
        ResolvedType::reference(text)
    }
}

fn unboxed(resolved: &ResolvedType) -> Option<&str> {
    match resolved {
        ResolvedType::Primitive(name) => Some(name),
        ResolvedType::Reference(name) => match name.as_str() {
            "java.lang.Integer" => Some("int"),
            "java.lang.Long" => Some("long"),
            "java.lang.Double" => Some("double"),
            "java.lang.Float" => Some("float"),
            "java.lang.Short" => Some("short"),
            "java.lang.Byte" => Some("byte"),
            "java.lang.Character" => Some("char"),
            "java.lang.Boolean" => Some("boolean"),
            _ => None,
        },
        _ => None,
    }
}

/// Binary numeric promotion; `&`, `|` and `^` on booleans stay boolean.
fn promote(left: &ResolvedType, right: &ResolvedType) -> ResolvedType {
    let rank = |name: Option<&str>| match name {
        Some("double") => 4,
        Some("float") => 3,
        Some("long") => 2,
        _ => 1,
    };
    let (left, right) = (unboxed(left), unboxed(right));
    if left == Some("boolean") && right == Some("boolean") {
        return ResolvedType::primitive("boolean");
    }
    let name = match rank(left).max(rank(right)) {
        4 => "double",
        3 => "float",
        2 => "long",
        _ => "int",
    };
    ResolvedType::primitive(name)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_type_text() {
        assert_eq!(split_type_text("Map<String, List<Foo>>"), ("Map".to_string(), 0));
        assert_eq!(split_type_text("int[][]"), ("int".to_string(), 2));
        assert_eq!(split_type_text("Object..."), ("Object".to_string(), 1));
        assert_eq!(split_type_text("? extends Foo"), ("Foo".to_string(), 0));
        assert_eq!(split_type_text("Outer<T>.Inner"), ("Outer.Inner".to_string(), 0));
    }

    #[test]
    fn test_promotion() {
        let int = ResolvedType::primitive("int");
        let long = ResolvedType::primitive("long");
        let boxed_double = ResolvedType::reference("java.lang.Double");

        assert_eq!(promote(&int, &long), long);
        assert_eq!(promote(&int, &boxed_double), ResolvedType::primitive("double"));
        assert_eq!(
            promote(&ResolvedType::primitive("boolean"), &ResolvedType::primitive("boolean")),
            ResolvedType::primitive("boolean")
        );
    }

    #[test]
    fn test_implicit_methods() {
        let hit = implicit_method(JAVA_LANG_OBJECT, "equals", 1).unwrap();
        assert_eq!(hit.signature, "equals(Object)");
        assert_eq!(hit.return_type, Ok(ResolvedType::primitive("boolean")));

        assert!(implicit_method(JAVA_LANG_ENUM, "ordinal", 0).is_some());
        assert!(implicit_method(JAVA_LANG_OBJECT, "ordinal", 0).is_none());
    }
}
