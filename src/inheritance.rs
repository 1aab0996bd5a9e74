//! Class Inheritance Table: `ClassQN -> ordered parent QNs`, plus the BFS
//! walk used to find an inherited method.

use crate::qualifiedname::Qn;
use crate::registry::{FunctionRegistry, SymbolKind};
use dashmap::DashMap;
use std::collections::VecDeque;
use std::sync::Arc;

/// Append-only table of declared base classes, keyed by the derived class's
/// QN. Order is the source-declared base-class order, significant for
/// linearization tie-breaks and for super-call resolution (first-listed
/// parent wins ties).
#[derive(Debug, Clone, Default)]
pub struct InheritanceTable {
    parents: Arc<DashMap<String, Vec<Qn>>>,
}

impl InheritanceTable {
    /// Creates an empty table.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Records `class_qn`'s base classes, in declaration order.
    ///
    /// Parents that could not be resolved to a QN during Pass 1 may be
    /// passed as their best-effort short name; the Import Resolver pass
    /// revisits and can overwrite this entry once real QNs are known.
    pub fn set_parents(&self, class_qn: &Qn, parents: Vec<Qn>) {
        self.parents.insert(class_qn.to_dotted(), parents);
    }

    /// Returns the declared parents of `class_qn`, if any are recorded.
    #[must_use]
    pub fn parents_of(&self, class_qn: &Qn) -> Vec<Qn> {
        self.parents
            .get(&class_qn.to_dotted())
            .map(|entry| entry.clone())
            .unwrap_or_default()
    }

    /// Breadth-first search over the declared ancestor chain of `class_qn`
    /// for a method named `method_name`, returning the first hit in
    /// declared-parent order. A visited set guards against cycles in
    /// pathological input.
    #[must_use]
    pub fn resolve_inherited_method(
        &self,
        class_qn: &Qn,
        method_name: &str,
        registry: &FunctionRegistry,
    ) -> Option<(SymbolKind, Qn)> {
        let mut queue: VecDeque<Qn> = self.parents_of(class_qn).into_iter().collect();
        let mut visited: std::collections::HashSet<Qn> = queue.iter().cloned().collect();

        while let Some(parent_qn) = queue.pop_front() {
            let candidate = parent_qn.join(method_name);
            if let Some(kind) = registry.lookup(&candidate) {
                return Some((kind, candidate));
            }
            for grandparent in self.parents_of(&parent_qn) {
                if visited.insert(grandparent.clone()) {
                    queue.push_back(grandparent);
                }
            }
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn registry_with(methods: &[&str]) -> FunctionRegistry {
        let reg = FunctionRegistry::new();
        for m in methods {
            reg.insert(&Qn::parse(m), SymbolKind::Method).unwrap();
        }
        reg
    }

    #[test]
    fn finds_method_on_direct_parent() {
        let table = InheritanceTable::new();
        table.set_parents(
            &Qn::parse("project.v.Car"),
            vec![Qn::parse("project.v.Vehicle")],
        );
        let reg = registry_with(&["project.v.Vehicle.start_engine"]);
        let (kind, qn) = table
            .resolve_inherited_method(&Qn::parse("project.v.Car"), "start_engine", &reg)
            .unwrap();
        assert_eq!(kind, SymbolKind::Method);
        assert_eq!(qn.to_dotted(), "project.v.Vehicle.start_engine");
    }

    #[test]
    fn walks_multiple_levels_and_respects_declared_order() {
        let table = InheritanceTable::new();
        table.set_parents(&Qn::parse("project.C"), vec![Qn::parse("project.B")]);
        table.set_parents(&Qn::parse("project.B"), vec![Qn::parse("project.A")]);
        let reg = registry_with(&["project.A.greet"]);
        let (_, qn) = table
            .resolve_inherited_method(&Qn::parse("project.C"), "greet", &reg)
            .unwrap();
        assert_eq!(qn.to_dotted(), "project.A.greet");
    }

    #[test]
    fn terminates_on_cycles() {
        let table = InheritanceTable::new();
        table.set_parents(&Qn::parse("project.A"), vec![Qn::parse("project.B")]);
        table.set_parents(&Qn::parse("project.B"), vec![Qn::parse("project.A")]);
        let reg = FunctionRegistry::new();
        let result = table.resolve_inherited_method(&Qn::parse("project.A"), "missing", &reg);
        assert_eq!(result, None);
    }

    #[test]
    fn no_parents_returns_none() {
        let table = InheritanceTable::new();
        let reg = FunctionRegistry::new();
        assert_eq!(
            table.resolve_inherited_method(&Qn::parse("project.Lonely"), "m", &reg),
            None
        );
    }
}
