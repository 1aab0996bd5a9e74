//! Structure Scanner (Pass 1): walks one file's syntax tree, classifies
//! every function/class declaration, and populates the Function Registry
//! and Class Inheritance Table.

use crate::error::ScanError;
use crate::grammar::Grammar;
use crate::graphsink::{GraphSink, NodeProperties};
use crate::inheritance::InheritanceTable;
use crate::qualifiedname::Qn;
use crate::registry::{FunctionRegistry, SymbolKind};
use tree_sitter::Node;

/// Runs the Structure Scanner over one file's already-parsed tree.
///
/// `module_qn` is the QN this file's module root resolves to (an
/// `__init__`-style package initializer resolves to its *package's* QN, not
/// a synthetic submodule, per the module-naming rule).
pub struct Scanner<'a> {
    grammar: &'a Grammar,
    registry: &'a FunctionRegistry,
    inheritance: &'a InheritanceTable,
    sink: &'a dyn GraphSink,
}

impl<'a> Scanner<'a> {
    /// Creates a scanner writing into the shared Pass-1 tables and sink.
    #[must_use]
    pub fn new(
        grammar: &'a Grammar,
        registry: &'a FunctionRegistry,
        inheritance: &'a InheritanceTable,
        sink: &'a dyn GraphSink,
    ) -> Self {
        Self {
            grammar,
            registry,
            inheritance,
            sink,
        }
    }

    /// Scans one module's root node, registering every class/function found
    /// and emitting `DEFINES` edges for the containment hierarchy.
    pub fn scan_module(&self, root: Node, module_qn: &Qn, source: &[u8]) -> Result<(), ScanError> {
        self.emit_module_node(module_qn);
        self.walk(root, module_qn, source);
        Ok(())
    }

    fn walk(&self, node: Node, module_qn: &Qn, source: &[u8]) {
        let config = &self.grammar.config;

        if config.class_node_types.contains(node.kind()) {
            self.scan_class(node, module_qn, source);
            return;
        }

        if config.function_node_types.contains(node.kind()) {
            self.scan_function(node, module_qn, source);
            return;
        }

        let mut cursor = node.walk();
        for child in node.children(&mut cursor) {
            self.walk(child, module_qn, source);
        }
    }

    fn scan_class(&self, node: Node, module_qn: &Qn, source: &[u8]) {
        let Some(name) = class_name(node, source) else {
            return;
        };
        let class_qn = build_nested_qualified_name(node, module_qn, &self.grammar.config, source)
            .unwrap_or_else(|| module_qn.join(&name));

        match self.registry.insert(&class_qn, SymbolKind::Class) {
            Ok(()) => {}
            Err(err) => {
                tracing::warn!(qn = %class_qn, %err, "duplicate symbol, keeping first registration");
            }
        }

        let parent_qn = class_qn.parent().unwrap_or_else(|| module_qn.clone());
        self.emit_class_node(&class_qn);
        self.emit_defines_edge(&parent_qn, &class_qn);

        let bases = base_class_short_names(node, source);
        if !bases.is_empty() {
            self.inheritance.set_parents(
                &class_qn,
                bases.into_iter().map(|b| module_qn.join(&b)).collect(),
            );
        }

        // Descend into the class body so nested methods/classes are found.
        let mut cursor = node.walk();
        for child in node.children(&mut cursor) {
            self.walk(child, module_qn, source);
        }
    }

    fn scan_function(&self, node: Node, module_qn: &Qn, source: &[u8]) {
        let Some(name) = function_name(node, source) else {
            return;
        };
        let config = &self.grammar.config;

        let is_method = has_class_ancestor(node, config);
        let func_qn = build_nested_qualified_name(node, module_qn, config, source)
            .unwrap_or_else(|| module_qn.join(&name));
        let kind = if is_method {
            SymbolKind::Method
        } else {
            SymbolKind::Function
        };

        match self.registry.insert(&func_qn, kind) {
            Ok(()) => {}
            Err(err) => {
                tracing::warn!(qn = %func_qn, %err, "duplicate symbol, keeping first registration");
            }
        }

        let parent_qn = func_qn.parent().unwrap_or_else(|| module_qn.clone());
        self.emit_callable_node(&func_qn, kind);
        self.emit_defines_edge(&parent_qn, &func_qn);

        // Nested functions inside this body are scanned too (their QN
        // includes this function's name as an enclosing segment), but we
        // do not descend into calls/expressions here — that is Pass 4's job.
        if let Some(body) = node.child_by_field_name("body") {
            let mut cursor = body.walk();
            for child in body.children(&mut cursor) {
                self.walk_nested_only(child, module_qn, source);
            }
        }
    }

    /// Like [`Self::walk`], but only descends to find nested function/class
    /// declarations — it does not re-walk non-declaration statements beyond
    /// what's needed to find them, since call-site extraction is Pass 4's.
    fn walk_nested_only(&self, node: Node, module_qn: &Qn, source: &[u8]) {
        let config = &self.grammar.config;
        if config.class_node_types.contains(node.kind()) {
            self.scan_class(node, module_qn, source);
            return;
        }
        if config.function_node_types.contains(node.kind()) {
            self.scan_function(node, module_qn, source);
            return;
        }
        let mut cursor = node.walk();
        for child in node.children(&mut cursor) {
            self.walk_nested_only(child, module_qn, source);
        }
    }

    fn emit_module_node(&self, module_qn: &Qn) {
        let mut props = NodeProperties::new();
        props.insert("qualified_name".to_owned(), module_qn.to_dotted());
        self.sink.ensure_node_batch("Module", vec![props]);
    }

    fn emit_class_node(&self, class_qn: &Qn) {
        let mut props = NodeProperties::new();
        props.insert("qualified_name".to_owned(), class_qn.to_dotted());
        self.sink.ensure_node_batch("Class", vec![props]);
    }

    fn emit_callable_node(&self, func_qn: &Qn, kind: SymbolKind) {
        let label = match kind {
            SymbolKind::Method => "Method",
            _ => "Function",
        };
        let mut props = NodeProperties::new();
        props.insert("qualified_name".to_owned(), func_qn.to_dotted());
        self.sink.ensure_node_batch(label, vec![props]);
    }

    fn emit_defines_edge(&self, parent_qn: &Qn, child_qn: &Qn) {
        self.sink.ensure_relationship_batch(
            "DEFINES",
            vec![(
                ("", "qualified_name", parent_qn.to_dotted()),
                ("", "qualified_name", child_qn.to_dotted()),
            )],
        );
    }
}

/// Derives the module QN for a file path relative to the repository root,
/// treating `__init__`-style package-initializer files as the package
/// itself rather than a distinct submodule.
#[must_use]
pub fn module_qn_for_path(project_name: &str, relative_path: &std::path::Path, package_init_stems: &[&str]) -> Qn {
    let mut parts = vec![project_name.to_owned()];
    let mut components: Vec<String> = relative_path
        .components()
        .map(|c| c.as_os_str().to_string_lossy().into_owned())
        .collect();

    if let Some(last) = components.last_mut() {
        if let Some(stem) = std::path::Path::new(last).file_stem() {
            let stem = stem.to_string_lossy().into_owned();
            if package_init_stems.contains(&stem.as_str()) {
                components.pop();
            } else {
                *last = stem;
            }
        }
    }

    parts.extend(components);
    Qn::from_parts(parts)
}

fn class_name(node: Node, source: &[u8]) -> Option<String> {
    node.child_by_field_name("name")
        .and_then(|n| n.utf8_text(source).ok())
        .map(str::to_owned)
}

fn function_name(node: Node, source: &[u8]) -> Option<String> {
    node.child_by_field_name("name")
        .and_then(|n| n.utf8_text(source).ok())
        .map(str::to_owned)
}

/// Extracts the short (unresolved) names listed as base classes, skipping
/// keyword arguments (e.g. Python's `metaclass=...`) that aren't bases.
fn base_class_short_names(node: Node, source: &[u8]) -> Vec<String> {
    let Some(bases) = node.child_by_field_name("superclasses") else {
        return Vec::new();
    };
    let mut names = Vec::new();
    let mut cursor = bases.walk();
    for child in bases.children(&mut cursor) {
        if matches!(child.kind(), "identifier" | "type_identifier") {
            if let Ok(text) = child.utf8_text(source) {
                names.push(text.rsplit('.').next().unwrap_or(text).to_owned());
            }
        }
    }
    names
}

/// True if `node` has a class-node ancestor before the nearest module root
/// — i.e. it is a method, not a free (possibly nested) function.
pub(crate) fn has_class_ancestor(node: Node, config: &crate::grammar::LanguageConfig) -> bool {
    let mut current = node.parent();
    while let Some(n) = current {
        if config.module_node_types.contains(n.kind()) {
            return false;
        }
        if config.class_node_types.contains(n.kind()) {
            return true;
        }
        current = n.parent();
    }
    false
}

/// Walks `node`'s ancestors collecting enclosing function/class names (in
/// outer-to-inner order) until a module root, building
/// `module.outer.inner.leaf`. Returns `None` if no declared name could be
/// found for some enclosing scope (falls back to a direct `module.leaf`
/// QN at the call site).
pub(crate) fn build_nested_qualified_name(
    node: Node,
    module_qn: &Qn,
    config: &crate::grammar::LanguageConfig,
    source: &[u8],
) -> Option<Qn> {
    let mut segments = Vec::new();
    let mut current = Some(node);
    while let Some(n) = current {
        if config.module_node_types.contains(n.kind()) {
            break;
        }
        if config.class_node_types.contains(n.kind()) || config.function_node_types.contains(n.kind()) {
            let name = n
                .child_by_field_name("name")
                .and_then(|nm| nm.utf8_text(source).ok())?;
            segments.push(name.to_owned());
        }
        current = n.parent();
    }
    segments.reverse();
    if segments.is_empty() {
        return None;
    }
    Some(Qn::from_parts(
        module_qn.components().iter().map(std::string::ToString::to_string).chain(segments),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graphsink::InMemoryGraphSink;
    use crate::grammar::{self, LanguageId};

    fn parse(source: &str) -> (Grammar, tree_sitter::Tree) {
        let grammar = grammar::load(LanguageId::Python).unwrap();
        let mut parser = tree_sitter::Parser::new();
        parser.set_language(&grammar.language).unwrap();
        let tree = parser.parse(source, None).unwrap();
        (grammar, tree)
    }

    #[test]
    fn classifies_module_level_function() {
        let (grammar, tree) = parse("def helper():\n    pass\n");
        let registry = FunctionRegistry::new();
        let inheritance = InheritanceTable::new();
        let sink = InMemoryGraphSink::new();
        let scanner = Scanner::new(&grammar, &registry, &inheritance, &sink);
        let module_qn = Qn::parse("project.m");
        scanner
            .scan_module(tree.root_node(), &module_qn, b"def helper():\n    pass\n")
            .unwrap();

        assert_eq!(registry.lookup(&Qn::parse("project.m.helper")), Some(SymbolKind::Function));
    }

    #[test]
    fn classifies_class_method() {
        let source = "class Repo:\n    def find_by_id(self, id):\n        pass\n";
        let (grammar, tree) = parse(source);
        let registry = FunctionRegistry::new();
        let inheritance = InheritanceTable::new();
        let sink = InMemoryGraphSink::new();
        let scanner = Scanner::new(&grammar, &registry, &inheritance, &sink);
        let module_qn = Qn::parse("project.m");
        scanner.scan_module(tree.root_node(), &module_qn, source.as_bytes()).unwrap();

        assert!(registry.is_class(&Qn::parse("project.m.Repo")));
        assert_eq!(
            registry.lookup(&Qn::parse("project.m.Repo.find_by_id")),
            Some(SymbolKind::Method)
        );
    }

    #[test]
    fn records_base_class_short_names() {
        let source = "class Car(Vehicle):\n    pass\n";
        let (grammar, tree) = parse(source);
        let registry = FunctionRegistry::new();
        let inheritance = InheritanceTable::new();
        let sink = InMemoryGraphSink::new();
        let scanner = Scanner::new(&grammar, &registry, &inheritance, &sink);
        let module_qn = Qn::parse("project.v");
        scanner.scan_module(tree.root_node(), &module_qn, source.as_bytes()).unwrap();

        let parents = inheritance.parents_of(&Qn::parse("project.v.Car"));
        assert_eq!(parents, vec![Qn::parse("project.v.Vehicle")]);
    }

    #[test]
    fn emits_defines_edges_for_module_and_class_containment() {
        let source = "class Repo:\n    def find_by_id(self, id):\n        pass\n";
        let (grammar, tree) = parse(source);
        let registry = FunctionRegistry::new();
        let inheritance = InheritanceTable::new();
        let sink = InMemoryGraphSink::new();
        let scanner = Scanner::new(&grammar, &registry, &inheritance, &sink);
        let module_qn = Qn::parse("project.m");
        scanner.scan_module(tree.root_node(), &module_qn, source.as_bytes()).unwrap();

        let edges = sink.edges_of_type("DEFINES");
        assert!(edges.iter().any(|e| e.from == "project.m" && e.to == "project.m.Repo"));
        assert!(edges
            .iter()
            .any(|e| e.from == "project.m.Repo" && e.to == "project.m.Repo.find_by_id"));
    }

    #[test]
    fn module_qn_for_path_collapses_package_init_files() {
        let qn = module_qn_for_path(
            "project",
            std::path::Path::new("pkg/sub/__init__.py"),
            &["__init__"],
        );
        assert_eq!(qn.to_dotted(), "project.pkg.sub");
    }

    #[test]
    fn module_qn_for_path_keeps_regular_module_stem() {
        let qn = module_qn_for_path("project", std::path::Path::new("pkg/sub/mod.py"), &["__init__"]);
        assert_eq!(qn.to_dotted(), "project.pkg.sub.mod");
    }

    #[test]
    fn duplicate_function_keeps_first_registration() {
        let source = "def f():\n    pass\ndef f():\n    pass\n";
        let (grammar, tree) = parse(source);
        let registry = FunctionRegistry::new();
        let inheritance = InheritanceTable::new();
        let sink = InMemoryGraphSink::new();
        let scanner = Scanner::new(&grammar, &registry, &inheritance, &sink);
        let module_qn = Qn::parse("project.m");
        scanner.scan_module(tree.root_node(), &module_qn, source.as_bytes()).unwrap();

        assert_eq!(registry.lookup(&Qn::parse("project.m.f")), Some(SymbolKind::Function));
        assert_eq!(registry.len(), 1);
    }
}
