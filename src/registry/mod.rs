//! Function Registry: the global `QN -> Kind` table, plus suffix lookup.

mod trie;

use crate::error::SemanticError;
use crate::qualifiedname::Qn;
use dashmap::DashMap;
use std::sync::Arc;
use trie::SuffixTrie;

/// The kind of declaration a registered qualified name denotes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SymbolKind {
    /// A module-level or nested free function.
    Function,
    /// A function defined inside a class body.
    Method,
    /// A class or interface declaration.
    Class,
}

/// Global, append-only table mapping every declared callable and class to
/// its [`SymbolKind`].
///
/// Writable concurrently during Pass 1 (the Structure Scanner); read-only
/// thereafter. Cloning a `FunctionRegistry` is cheap and yields a handle to
/// the same underlying tables, matching the "sealed after build" lifecycle
/// the pipeline relies on.
#[derive(Debug, Clone, Default)]
pub struct FunctionRegistry {
    symbols: Arc<DashMap<String, SymbolKind>>,
    suffix_trie: Arc<SuffixTrie>,
}

impl FunctionRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `qn` with the given `kind`.
    ///
    /// Returns `Err(SemanticError::DuplicateSymbol)` if `qn` is already
    /// present; per the error handling design, the caller is expected to log
    /// this as a warning and keep the first registration rather than abort.
    pub fn insert(&self, qn: &Qn, kind: SymbolKind) -> Result<(), SemanticError> {
        let dotted = qn.to_dotted();
        if self.symbols.contains_key(&dotted) {
            return Err(SemanticError::DuplicateSymbol(dotted));
        }
        self.symbols.insert(dotted, kind);
        self.suffix_trie.insert(qn);
        Ok(())
    }

    /// Exact lookup of a qualified name's kind.
    #[must_use]
    pub fn lookup(&self, qn: &Qn) -> Option<SymbolKind> {
        self.symbols.get(&qn.to_dotted()).map(|entry| *entry)
    }

    /// Exact lookup by pre-rendered dotted string, avoiding a `Qn::parse`
    /// round-trip when the caller already has the dotted form on hand.
    #[must_use]
    pub fn lookup_str(&self, dotted: &str) -> Option<SymbolKind> {
        self.symbols.get(dotted).map(|entry| *entry)
    }

    /// True iff `qn` is registered with `Kind::Class`.
    #[must_use]
    pub fn is_class(&self, qn: &Qn) -> bool {
        matches!(self.lookup(qn), Some(SymbolKind::Class))
    }

    /// Returns every registered QN whose dotted-path suffix equals `tail`
    /// (which may itself be dotted, e.g. `Class.method`), in insertion order.
    #[must_use]
    pub fn find_ending_with(&self, tail: &str) -> Vec<Qn> {
        self.suffix_trie.find_ending_with(tail)
    }

    /// Number of registered symbols.
    #[must_use]
    pub fn len(&self) -> usize {
        self.symbols.len()
    }

    /// True if no symbols have been registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.symbols.is_empty()
    }
}
