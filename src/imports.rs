//! Import Resolver (Pass 2): per-module Import Map construction.
//!
//! Turns the raw import statements a grammar adapter extracts from a file's
//! syntax tree into `LocalName -> TargetQN` bindings, handling direct,
//! aliased, relative, wildcard, and grouped forms.

use crate::qualifiedname::Qn;
use dashmap::DashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

/// One raw import statement as extracted by a grammar adapter, before any
/// resolution. `module_path` is the dotted path as written in source (for a
/// relative import, the leading dots are stripped into `relative_level` and
/// the remainder, possibly empty, is `module_path`).
#[derive(Debug, Clone)]
pub struct ImportStatement {
    /// Dotted module path as written, with any leading relative dots removed.
    pub module_path: String,
    /// Number of leading dots in a relative import (`0` for absolute).
    pub relative_level: u32,
    /// Specific names imported from `module_path`, with optional aliases.
    /// Empty with `is_wildcard == false` means a bare `import module_path`
    /// (or `import module_path as alias`, carried in `module_alias`).
    pub names: Vec<ImportedName>,
    /// Alias for a bare module import (`import pkg.sub as P`).
    pub module_alias: Option<String>,
    /// True for `from module_path import *`.
    pub is_wildcard: bool,
}

/// A single name pulled out of a `from ... import a, b as B` list.
#[derive(Debug, Clone)]
pub struct ImportedName {
    /// Name as it appears in the source module.
    pub name: String,
    /// Local alias, if `as` was used.
    pub alias: Option<String>,
}

/// Per-module table: `LocalName -> TargetQN`.
///
/// Wildcard entries are stored under a synthetic key `*<n>` so that plain
/// name lookups never collide with them; resolution code iterates wildcard
/// entries explicitly (see the Call Resolver's Phase 4).
#[derive(Debug, Clone, Default)]
pub struct ImportMap {
    bindings: Arc<DashMap<String, Qn>>,
    wildcard_counter: Arc<AtomicUsize>,
}

impl ImportMap {
    fn new() -> Self {
        Self::default()
    }

    fn bind(&self, local_name: &str, target: Qn) {
        self.bindings.insert(local_name.to_owned(), target);
    }

    fn bind_wildcard(&self, package: Qn) {
        let n = self.wildcard_counter.fetch_add(1, Ordering::Relaxed);
        self.bindings.insert(format!("*{n}"), package);
    }

    /// Exact lookup of a plain (non-wildcard) local name.
    #[must_use]
    pub fn get(&self, local_name: &str) -> Option<Qn> {
        self.bindings.get(local_name).map(|entry| entry.clone())
    }

    /// Iterates the target package QN of every wildcard entry.
    pub fn wildcard_packages(&self) -> impl Iterator<Item = Qn> + '_ {
        self.bindings
            .iter()
            .filter(|entry| entry.key().starts_with('*'))
            .map(|entry| entry.value().clone())
            .collect::<Vec<_>>()
            .into_iter()
    }

    /// True if `local_name` is bound (used by the resolver's Phase 2/3 to
    /// decide whether `call_name`'s head segment is an import).
    #[must_use]
    pub fn contains(&self, local_name: &str) -> bool {
        self.bindings.contains_key(local_name)
    }
}

/// Builds and caches per-module [`ImportMap`]s across the whole repository.
///
/// Writers in Pass 2 touch disjoint per-module partitions, so concurrent
/// construction across files needs no cross-module locking; the resolved
/// absolute-path cache only needs intra-module caching to avoid recomputing
/// the same relative-import ascent repeatedly.
#[derive(Debug, Clone, Default)]
pub struct ImportResolver {
    per_module: Arc<DashMap<String, ImportMap>>,
    relative_cache: Arc<DashMap<(String, u32, String), Qn>>,
}

impl ImportResolver {
    /// Creates an empty resolver.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the Import Map for `module_qn`, creating an empty one if this
    /// is the first statement processed for that module.
    #[must_use]
    pub fn map_for(&self, module_qn: &Qn) -> ImportMap {
        self.per_module
            .entry(module_qn.to_dotted())
            .or_insert_with(ImportMap::new)
            .clone()
    }

    /// Processes one [`ImportStatement`] for `module_qn`, adding the
    /// resulting bindings to that module's Import Map.
    ///
    /// Malformed statements (empty module path on an absolute import) are
    /// skipped; the caller logs this as a warning per the error handling
    /// design and proceeds with the rest of the file.
    pub fn process_statement(&self, module_qn: &Qn, stmt: &ImportStatement) {
        let map = self.map_for(module_qn);

        let resolved_module = if stmt.relative_level > 0 {
            self.resolve_relative(module_qn, stmt.relative_level, &stmt.module_path)
        } else if stmt.module_path.is_empty() {
            tracing::warn!(module = %module_qn, "skipping malformed import: empty absolute module path");
            return;
        } else {
            Qn::parse(&stmt.module_path)
        };

        if stmt.is_wildcard {
            map.bind_wildcard(resolved_module);
            return;
        }

        if stmt.names.is_empty() {
            // Bare `import pkg.sub[.deeper]` or `import pkg.sub as P`.
            if let Some(alias) = &stmt.module_alias {
                map.bind(alias, resolved_module);
            } else {
                // Bind the top segment (so `pkg.x()` resolves via Phase 3's
                // class-name form) and the full dotted path (for direct
                // qualified access).
                if let Some(top) = resolved_module.components().first() {
                    map.bind(top, Qn::from_parts([top.as_str()]));
                }
                map.bind(&resolved_module.to_dotted(), resolved_module);
            }
            return;
        }

        for imported in &stmt.names {
            let local = imported.alias.as_deref().unwrap_or(&imported.name);
            let target = resolved_module.join(&imported.name);
            map.bind(local, target);
        }
    }

    /// Resolves a relative import's module path to an absolute QN, caching
    /// the result since the same relative target is commonly re-imported
    /// across sibling modules.
    fn resolve_relative(&self, module_qn: &Qn, level: u32, module_path: &str) -> Qn {
        let cache_key = (module_qn.to_dotted(), level, module_path.to_owned());
        if let Some(cached) = self.relative_cache.get(&cache_key) {
            return cached.clone();
        }

        // `from . import X` ascends zero extra levels beyond the current
        // package; `from .. import X` ascends one level above that, etc.
        // The current module's own QN always points at a *file*, so the
        // base package is its parent.
        let mut base = module_qn.parent().unwrap_or_else(|| module_qn.clone());
        for _ in 1..level {
            base = base.parent().unwrap_or(base);
        }

        let resolved = if module_path.is_empty() {
            base
        } else {
            let mut parts: Vec<compact_str::CompactString> =
                base.components().iter().cloned().collect();
            parts.extend(Qn::parse(module_path).components().iter().cloned());
            Qn::from_parts(parts)
        };

        self.relative_cache.insert(cache_key, resolved.clone());
        resolved
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn module(s: &str) -> Qn {
        Qn::parse(s)
    }

    #[test]
    fn direct_import_binds_top_and_full_path() {
        let resolver = ImportResolver::new();
        let stmt = ImportStatement {
            module_path: "pkg.sub".to_owned(),
            relative_level: 0,
            names: vec![],
            module_alias: None,
            is_wildcard: false,
        };
        resolver.process_statement(&module("project.x"), &stmt);
        let map = resolver.map_for(&module("project.x"));
        assert_eq!(map.get("pkg").unwrap().to_dotted(), "pkg");
        assert_eq!(map.get("pkg.sub").unwrap().to_dotted(), "pkg.sub");
    }

    #[test]
    fn aliased_module_import() {
        let resolver = ImportResolver::new();
        let stmt = ImportStatement {
            module_path: "pkg.sub".to_owned(),
            relative_level: 0,
            names: vec![],
            module_alias: Some("P".to_owned()),
            is_wildcard: false,
        };
        resolver.process_statement(&module("project.x"), &stmt);
        let map = resolver.map_for(&module("project.x"));
        assert_eq!(map.get("P").unwrap().to_dotted(), "pkg.sub");
    }

    #[test]
    fn from_import_with_alias() {
        let resolver = ImportResolver::new();
        let stmt = ImportStatement {
            module_path: "a.b".to_owned(),
            relative_level: 0,
            names: vec![ImportedName {
                name: "f".to_owned(),
                alias: Some("ff".to_owned()),
            }],
            module_alias: None,
            is_wildcard: false,
        };
        resolver.process_statement(&module("project.x"), &stmt);
        let map = resolver.map_for(&module("project.x"));
        assert_eq!(map.get("ff").unwrap().to_dotted(), "a.b.f");
    }

    #[test]
    fn grouped_imports_each_get_own_entry() {
        let resolver = ImportResolver::new();
        let stmt = ImportStatement {
            module_path: "pkg".to_owned(),
            relative_level: 0,
            names: vec![
                ImportedName { name: "a".to_owned(), alias: None },
                ImportedName { name: "b".to_owned(), alias: Some("B".to_owned()) },
            ],
            module_alias: None,
            is_wildcard: false,
        };
        resolver.process_statement(&module("project.x"), &stmt);
        let map = resolver.map_for(&module("project.x"));
        assert_eq!(map.get("a").unwrap().to_dotted(), "pkg.a");
        assert_eq!(map.get("B").unwrap().to_dotted(), "pkg.b");
    }

    #[test]
    fn relative_import_ascends_by_dot_count() {
        let resolver = ImportResolver::new();
        // module `project.pkg.sub.mod`, `from . import X` binds within `project.pkg.sub`.
        let stmt = ImportStatement {
            module_path: String::new(),
            relative_level: 1,
            names: vec![ImportedName { name: "X".to_owned(), alias: None }],
            module_alias: None,
            is_wildcard: false,
        };
        resolver.process_statement(&module("project.pkg.sub.mod"), &stmt);
        let map = resolver.map_for(&module("project.pkg.sub.mod"));
        assert_eq!(map.get("X").unwrap().to_dotted(), "project.pkg.sub.X");
    }

    #[test]
    fn wildcard_import_is_recorded_under_synthetic_key() {
        let resolver = ImportResolver::new();
        let stmt = ImportStatement {
            module_path: "helpers".to_owned(),
            relative_level: 0,
            names: vec![],
            module_alias: None,
            is_wildcard: true,
        };
        resolver.process_statement(&module("project.m"), &stmt);
        let map = resolver.map_for(&module("project.m"));
        let packages: Vec<_> = map.wildcard_packages().collect();
        assert_eq!(packages, vec![Qn::parse("helpers")]);
    }

    #[test]
    fn malformed_absolute_import_is_skipped() {
        let resolver = ImportResolver::new();
        let stmt = ImportStatement {
            module_path: String::new(),
            relative_level: 0,
            names: vec![ImportedName { name: "X".to_owned(), alias: None }],
            module_alias: None,
            is_wildcard: false,
        };
        resolver.process_statement(&module("project.x"), &stmt);
        let map = resolver.map_for(&module("project.x"));
        assert!(!map.contains("X"));
    }
}
