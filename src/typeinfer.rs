//! Type Inference Engine (Pass 3): `Expression -> ClassName` per callable.

use crate::grammar::LanguageConfig;
use crate::imports::ImportMap;
use crate::qualifiedname::Qn;
use crate::registry::{FunctionRegistry, SymbolKind};
use std::collections::HashMap;
use tree_sitter::Node;

/// `Expression -> ClassName`, where *Expression* is a bare identifier or a
/// dotted self-attribute path (`self.repo`). A missing key means "unknown
/// type"; values may be a short class name (to be resolved against the
/// Import Map / same module) or an already-absolute QN.
pub type LocalVarTypeMap = HashMap<String, String>;

/// Builds [`LocalVarTypeMap`]s for callable bodies.
pub struct TypeInferenceEngine<'a> {
    registry: &'a FunctionRegistry,
}

impl<'a> TypeInferenceEngine<'a> {
    /// Creates an engine over the (frozen) Function Registry.
    #[must_use]
    pub fn new(registry: &'a FunctionRegistry) -> Self {
        Self { registry }
    }

    /// Builds the Local Variable Type Map for one callable body.
    ///
    /// `params_node`, when present, is the callable's parameter list;
    /// syntactically present type annotations seed the map before the body
    /// is walked. `body_node` is then walked in source order; assignments
    /// whose right-hand side is a recognizable constructor call bind the
    /// left-hand side to that class name, with later assignments to the
    /// same expression overwriting earlier ones (straight-line,
    /// last-assignment-wins semantics).
    #[must_use]
    pub fn build_local_variable_type_map(
        &self,
        params_node: Option<Node>,
        body_node: Node,
        import_map: &ImportMap,
        module_qn: &Qn,
        config: &LanguageConfig,
        source: &[u8],
    ) -> LocalVarTypeMap {
        let mut map = LocalVarTypeMap::new();

        if let Some(params) = params_node {
            self.seed_from_parameter_annotations(params, source, &mut map);
        }

        self.walk_assignments(body_node, import_map, module_qn, config, source, &mut map);
        map
    }

    fn seed_from_parameter_annotations(&self, params: Node, source: &[u8], map: &mut LocalVarTypeMap) {
        let mut cursor = params.walk();
        for param in params.children(&mut cursor) {
            let name_node = param
                .child_by_field_name("name")
                .or_else(|| param.child_by_field_name("pattern"));
            let type_node = param
                .child_by_field_name("type")
                .or_else(|| param.child_by_field_name("annotation"));
            if let (Some(name_node), Some(type_node)) = (name_node, type_node) {
                if let (Ok(name), Ok(ty)) = (
                    name_node.utf8_text(source),
                    type_node.utf8_text(source),
                ) {
                    map.insert(name.to_owned(), strip_type_decoration(ty));
                }
            }
        }
    }

    fn walk_assignments(
        &self,
        node: Node,
        import_map: &ImportMap,
        module_qn: &Qn,
        config: &LanguageConfig,
        source: &[u8],
        map: &mut LocalVarTypeMap,
    ) {
        if config.assignment_node_types.contains(node.kind()) {
            self.process_assignment(node, import_map, module_qn, config, source, map);
        }

        let mut cursor = node.walk();
        for child in node.children(&mut cursor) {
            // Don't descend into nested function bodies: their own
            // assignments belong to a different callable's type map.
            if config.function_node_types.contains(child.kind()) {
                continue;
            }
            self.walk_assignments(child, import_map, module_qn, config, source, map);
        }
    }

    fn process_assignment(
        &self,
        node: Node,
        import_map: &ImportMap,
        module_qn: &Qn,
        config: &LanguageConfig,
        source: &[u8],
        map: &mut LocalVarTypeMap,
    ) {
        let lhs = node
            .child_by_field_name("left")
            .or_else(|| node.child_by_field_name("target"))
            .or_else(|| node.child_by_field_name("name"));
        let rhs = node
            .child_by_field_name("right")
            .or_else(|| node.child_by_field_name("value"));

        let (Some(lhs), Some(rhs)) = (lhs, rhs) else {
            return;
        };

        let Some(class_name) =
            self.constructor_class_name(rhs, import_map, module_qn, config, source)
        else {
            return;
        };

        if let Some(expr_key) = self.expression_key(lhs, config, source) {
            map.insert(expr_key, class_name);
        }
    }

    /// Renders an assignment target as the map key: a bare identifier, or
    /// `self.attr` for a member access on the instance receiver.
    fn expression_key(&self, node: Node, config: &LanguageConfig, source: &[u8]) -> Option<String> {
        if node.kind() == "identifier" {
            return node.utf8_text(source).ok().map(str::to_owned);
        }
        if config.member_access_node_types.contains(node.kind()) {
            let object = node.child_by_field_name("object").or_else(|| node.child_by_field_name("value"))?;
            let attr = node
                .child_by_field_name("attribute")
                .or_else(|| node.child_by_field_name("property"))
                .or_else(|| node.child_by_field_name("field"))?;
            let object_text = object.utf8_text(source).ok()?;
            if object_text == config.self_name {
                let attr_text = attr.utf8_text(source).ok()?;
                return Some(format!("{}.{attr_text}", config.self_name));
            }
        }
        None
    }

    /// Returns the class name a call node constructs, if it looks like a
    /// constructor call: either the language has explicit `new`-style
    /// syntax for it, or the callee is capitalized by convention, or the
    /// callee resolves to a registered class.
    fn constructor_class_name(
        &self,
        node: Node,
        import_map: &ImportMap,
        module_qn: &Qn,
        config: &LanguageConfig,
        source: &[u8],
    ) -> Option<String> {
        if !config.call_node_types.contains(node.kind()) {
            return None;
        }
        let callee = node
            .child_by_field_name("function")
            .or_else(|| node.child_by_field_name("constructor"))
            .or_else(|| node.child_by_field_name("type"))
            .or_else(|| node.child_by_field_name("name"))?;
        let callee_text = callee.utf8_text(source).ok()?;
        let short_name = callee_text.rsplit('.').next().unwrap_or(callee_text);

        let looks_like_class = short_name
            .chars()
            .next()
            .is_some_and(char::is_uppercase);
        let is_known_class = import_map
            .get(short_name)
            .is_some_and(|qn| self.registry.is_class(&qn))
            || self.registry.is_class(&module_qn.join(short_name));

        if looks_like_class || is_known_class {
            Some(short_name.to_owned())
        } else {
            None
        }
    }

    /// Recursive return-type inference for the simple case method chaining
    /// needs: `Recv.method(args)` where `Recv`'s type is already known.
    ///
    /// If `TypeQN.method` is registered, returns the statically declared
    /// return class when syntactically available (not modeled here — the
    /// reference behavior falls back to the receiver's own type, a
    /// fluent-builder heuristic); otherwise returns `None`.
    #[must_use]
    pub fn infer_expression_return_type(
        &self,
        expr: &str,
        module_qn: &Qn,
        local_var_types: &LocalVarTypeMap,
    ) -> Option<String> {
        if let Some(ty) = local_var_types.get(expr) {
            return Some(ty.clone());
        }

        // `expr` might itself be `recv.method(...)`: resolve `recv`'s type
        // and, if `Type.method` is registered, fall back to `Type` as the
        // fluent-builder return type.
        let trimmed = expr.trim_end_matches(|c| c == ')');
        let open_paren = trimmed.find('(')?;
        let before_call = &trimmed[..open_paren];
        let (recv, method) = before_call.rsplit_once('.')?;

        let recv_type = local_var_types.get(recv).cloned().or_else(|| {
            if recv == "self" || recv == "this" {
                None
            } else {
                Some(recv.to_owned())
            }
        })?;

        let candidate = if recv_type.contains('.') {
            Qn::parse(&recv_type)
        } else {
            module_qn.join(&recv_type)
        };
        let method_qn = candidate.join(method);
        if matches!(
            self.registry.lookup(&method_qn),
            Some(SymbolKind::Method | SymbolKind::Function)
        ) {
            Some(recv_type)
        } else {
            None
        }
    }
}

fn strip_type_decoration(ty: &str) -> String {
    ty.trim_start_matches(':').trim().to_owned()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::imports::ImportResolver;

    #[test]
    fn infers_simple_constructor_assignment_via_python_source() {
        let source = "def run():\n    r = Repo()\n    r.find_by_id(1)\n";
        let grammar = crate::grammar::load(crate::grammar::LanguageId::Python).unwrap();
        let mut parser = tree_sitter::Parser::new();
        parser.set_language(&grammar.language).unwrap();
        let tree = parser.parse(source, None).unwrap();
        let root = tree.root_node();
        let func_node = root.child(0).unwrap();
        let body = func_node.child_by_field_name("body").unwrap();

        let registry = FunctionRegistry::new();
        registry
            .insert(&Qn::parse("project.m.Repo"), SymbolKind::Class)
            .unwrap();
        let resolver = ImportResolver::new();
        let import_map = resolver.map_for(&Qn::parse("project.u"));

        let engine = TypeInferenceEngine::new(&registry);
        let map = engine.build_local_variable_type_map(
            None,
            body,
            &import_map,
            &Qn::parse("project.u"),
            &grammar.config,
            source.as_bytes(),
        );

        assert_eq!(map.get("r").map(String::as_str), Some("Repo"));
    }

    #[test]
    fn chained_call_falls_back_to_receiver_type() {
        let registry = FunctionRegistry::new();
        registry
            .insert(&Qn::parse("project.u.User.update_name"), SymbolKind::Method)
            .unwrap();
        let engine = TypeInferenceEngine::new(&registry);
        let mut locals = LocalVarTypeMap::new();
        locals.insert("user".to_owned(), "User".to_owned());

        let result = engine.infer_expression_return_type(
            "user.update_name(\"x\")",
            &Qn::parse("project.u"),
            &locals,
        );
        assert_eq!(result.as_deref(), Some("User"));
    }
}
