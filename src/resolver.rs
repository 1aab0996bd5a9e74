//! Call Resolver (Pass 4, core): the central resolution algorithm.
//!
//! Resolves a textual callee expression to a qualified target through a
//! strict, short-circuiting phase order (Phase 0 through Phase 6). Each
//! phase, if it produces a hit, ends the search — later phases are never
//! consulted.

use crate::imports::ImportMap;
use crate::inheritance::InheritanceTable;
use crate::qualifiedname::Qn;
use crate::registry::{FunctionRegistry, SymbolKind};
use crate::typeinfer::{LocalVarTypeMap, TypeInferenceEngine};

/// Resolves call-site text to qualified targets against the frozen Pass
/// 1-3 tables.
pub struct Resolver<'a> {
    registry: &'a FunctionRegistry,
    inheritance: &'a InheritanceTable,
    type_inference: &'a TypeInferenceEngine<'a>,
    self_name: &'a str,
    suffix_fallback_enabled: bool,
}

impl<'a> Resolver<'a> {
    /// Creates a resolver over the frozen tables produced by earlier passes.
    #[must_use]
    pub fn new(
        registry: &'a FunctionRegistry,
        inheritance: &'a InheritanceTable,
        type_inference: &'a TypeInferenceEngine<'a>,
        self_name: &'a str,
        suffix_fallback_enabled: bool,
    ) -> Self {
        Self {
            registry,
            inheritance,
            type_inference,
            self_name,
            suffix_fallback_enabled,
        }
    }

    /// Resolves `call_name` as it appeared at one call site in
    /// `module_qn`, returning the resolved kind and QN, or `None` if every
    /// phase fails (a resolution miss — logged at debug level by the
    /// caller and dropped without emitting a CALLS edge).
    #[must_use]
    pub fn resolve_call(
        &self,
        call_name: &str,
        module_qn: &Qn,
        import_map: &ImportMap,
        local_var_types: &LocalVarTypeMap,
        class_context: Option<&Qn>,
    ) -> Option<(SymbolKind, Qn)> {
        // Phase 0 — super calls.
        if let Some(method_name) = call_name.strip_prefix("super().") {
            let class_context = class_context?;
            return self
                .inheritance
                .resolve_inherited_method(class_context, method_name, self.registry);
        }

        // Phase 1 — method chains.
        if is_method_chain(call_name) {
            if let Some(hit) = self.resolve_chained_call(call_name, module_qn, import_map, local_var_types) {
                return Some(hit);
            }
        }

        // Phase 2 — import-map exact.
        if let Some(target) = import_map.get(call_name) {
            if let Some(kind) = self.registry.lookup(&target) {
                return Some((kind, target));
            }
        }

        // Phase 3 — qualified dotted calls.
        if call_name.contains('.') {
            if let Some(hit) =
                self.resolve_qualified_dotted(call_name, module_qn, import_map, local_var_types)
            {
                return Some(hit);
            }
        }

        // Phase 4 — wildcard expansion.
        for package in import_map.wildcard_packages() {
            let candidate = package.join(call_name);
            if let Some(kind) = self.registry.lookup(&candidate) {
                return Some((kind, candidate));
            }
        }

        // Phase 5 — same-module shortcut.
        let same_module = Qn::parse(&format!("{module_qn}.{call_name}"));
        if let Some(kind) = self.registry.lookup(&same_module) {
            return Some((kind, same_module));
        }

        // Phase 6 — suffix fallback (heuristic).
        if self.suffix_fallback_enabled {
            let mut candidates = self.registry.find_ending_with(call_name);
            if !candidates.is_empty() {
                candidates.sort_by_key(|candidate| import_distance(candidate, module_qn));
                let best = candidates.into_iter().next()?;
                let kind = self.registry.lookup(&best)?;
                return Some((kind, best));
            }
        }

        None
    }

    fn resolve_qualified_dotted(
        &self,
        call_name: &str,
        module_qn: &Qn,
        import_map: &ImportMap,
        local_var_types: &LocalVarTypeMap,
    ) -> Option<(SymbolKind, Qn)> {
        let mut parts = call_name.split('.');
        let head = parts.next()?;
        let rest: Vec<&str> = parts.collect();
        if rest.is_empty() {
            return None;
        }

        if head == self.self_name && rest.len() >= 2 {
            let method_name = rest[rest.len() - 1];
            let attribute_ref = format!("{}.{}", self.self_name, rest[..rest.len() - 1].join("."));
            if let Some(var_type) = local_var_types.get(&attribute_ref) {
                let class_qn = self.resolve_class_name(var_type, import_map, module_qn)?;
                return self.exact_then_inherited(&class_qn, method_name);
            }
            return None;
        }

        let method_name = rest.join(".");

        if let Some(class_qn) = import_map.get(head) {
            let method_qn = class_qn.join(&method_name);
            if let Some(kind) = self.registry.lookup(&method_qn) {
                return Some((kind, method_qn));
            }
        }

        if let Some(var_type) = local_var_types.get(head) {
            let class_qn = self.resolve_class_name(var_type, import_map, module_qn)?;
            return self.exact_then_inherited(&class_qn, &method_name);
        }

        None
    }

    fn resolve_chained_call(
        &self,
        call_name: &str,
        module_qn: &Qn,
        import_map: &ImportMap,
        local_var_types: &LocalVarTypeMap,
    ) -> Option<(SymbolKind, Qn)> {
        let split_at = final_method_split(call_name)?;
        let (object_expr, final_method) = (&call_name[..split_at.0], &call_name[split_at.1..]);

        let object_type = self
            .type_inference
            .infer_expression_return_type(object_expr, module_qn, local_var_types)?;

        let full_object_type = if object_type.contains('.') {
            Qn::parse(&object_type)
        } else {
            self.resolve_class_name(&object_type, import_map, module_qn)?
        };

        self.exact_then_inherited(&full_object_type, final_method)
    }

    /// Tries `class_qn.method_name` exactly, then walks the inheritance
    /// chain if the method isn't declared directly on `class_qn`.
    fn exact_then_inherited(&self, class_qn: &Qn, method_name: &str) -> Option<(SymbolKind, Qn)> {
        let candidate = class_qn.join(method_name);
        if let Some(kind) = self.registry.lookup(&candidate) {
            return Some((kind, candidate));
        }
        self.inheritance
            .resolve_inherited_method(class_qn, method_name, self.registry)
    }

    /// Converts a short class name to its fully qualified name, via the
    /// Import Map first, then the same-module Function Registry.
    fn resolve_class_name(&self, class_name: &str, import_map: &ImportMap, module_qn: &Qn) -> Option<Qn> {
        if class_name.contains('.') {
            return Some(Qn::parse(class_name));
        }
        if let Some(qn) = import_map.get(class_name) {
            return Some(qn);
        }
        let same_module = module_qn.join(class_name);
        if self.registry.is_class(&same_module) {
            return Some(same_module);
        }
        None
    }
}

/// A call name looks like a method chain when it contains a parenthesized
/// call *before* its terminal member access, e.g. `obj.build("x").clone`,
/// as opposed to a plain `obj.method` or `self.attr`.
fn is_method_chain(call_name: &str) -> bool {
    if !call_name.contains('(') || !call_name.contains(')') {
        return false;
    }
    let parts: Vec<&str> = call_name.split('.').collect();
    parts.len() >= 2 && parts.iter().any(|p| p.contains('(') && p.contains(')'))
}

/// Finds the byte range that splits a chained call into `(object_expr,
/// final_method)` at the last `.` that is not nested inside parentheses.
fn final_method_split(call_name: &str) -> Option<(usize, usize)> {
    let bytes = call_name.as_bytes();
    let mut depth = 0i32;
    let mut split_at = None;
    for (i, &b) in bytes.iter().enumerate() {
        match b {
            b'(' => depth += 1,
            b')' => depth -= 1,
            b'.' if depth == 0 => split_at = Some(i),
            _ => {}
        }
    }
    let dot = split_at?;
    // The final segment must itself be a bare identifier, not a call.
    let tail = &call_name[dot + 1..];
    if tail.contains('(') {
        return None;
    }
    Some((dot, dot + 1))
}

/// Heuristic "how likely is this candidate to be what the caller meant"
/// distance: lower is closer. Common-prefix length dominates; candidates
/// inside the caller's own parent package get a bonus.
fn import_distance(candidate: &Qn, caller_module_qn: &Qn) -> i64 {
    let caller_parts = caller_module_qn.components();
    let candidate_parts = candidate.components();

    let common_prefix = caller_parts
        .iter()
        .zip(candidate_parts.iter())
        .take_while(|(a, b)| a == b)
        .count();

    let mut distance =
        caller_parts.len().max(candidate_parts.len()) as i64 - common_prefix as i64;

    if let Some(caller_parent) = caller_module_qn.parent() {
        if candidate.is_within_package(&caller_parent) {
            distance -= 1;
        }
    }

    distance
}
