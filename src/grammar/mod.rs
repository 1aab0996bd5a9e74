//! Pluggable grammar layer: one tree-sitter grammar and language-configuration
//! record per supported source language. `LanguageConfig`'s node-type sets
//! are the mechanism every pass (scanner, import extraction, resolver) uses
//! to classify nodes — a raw node-kind lookup, not a compiled query.

mod java;
mod javascript;
mod python;
mod typescript;

use crate::error::ScanError;
use std::collections::HashSet;
use tree_sitter::Language;

/// Identifies one of the supported source languages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LanguageId {
    /// Python.
    Python,
    /// JavaScript (and JSX).
    JavaScript,
    /// TypeScript (and TSX).
    TypeScript,
    /// Java.
    Java,
}

impl LanguageId {
    /// Maps a file extension (without the leading dot) to a language, if
    /// one of the supported grammars claims it.
    #[must_use]
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext {
            "py" | "pyi" => Some(Self::Python),
            "js" | "jsx" | "mjs" | "cjs" => Some(Self::JavaScript),
            "ts" | "tsx" => Some(Self::TypeScript),
            "java" => Some(Self::Java),
            _ => None,
        }
    }

    /// Human-readable name, used in log fields and error messages.
    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            Self::Python => "python",
            Self::JavaScript => "javascript",
            Self::TypeScript => "typescript",
            Self::Java => "java",
        }
    }
}

/// Declares, for one language, which tree-sitter node-type names denote
/// modules, classes, and functions/methods, plus the QN wire-separator this
/// ecosystem natively uses.
#[derive(Debug, Clone)]
pub struct LanguageConfig {
    /// Node-type name(s) that delimit a module/file root.
    pub module_node_types: HashSet<&'static str>,
    /// Node-type name(s) that introduce a class (or interface) scope.
    pub class_node_types: HashSet<&'static str>,
    /// Node-type name(s) that introduce a function/method scope.
    pub function_node_types: HashSet<&'static str>,
    /// Node-type name(s) for a call expression (used by the Call Processor
    /// to find nested calls and by the Type Inference engine to recognize
    /// constructor calls).
    pub call_node_types: HashSet<&'static str>,
    /// Node-type name(s) for a simple assignment (`x = expr`, a variable
    /// declarator, etc.), consulted by the Type Inference engine.
    pub assignment_node_types: HashSet<&'static str>,
    /// Node-type name(s) for a dotted/member access (`obj.attr`), used both
    /// to extract call-target text and to recognize `self.attr = ...`.
    pub member_access_node_types: HashSet<&'static str>,
    /// This language's conventional name for the instance-receiver
    /// parameter (`self` in Python, `this` in JavaScript/Java), used to
    /// recognize the self-attribute form in Phase 3 of the resolver.
    pub self_name: &'static str,
    /// Separator this ecosystem uses at the graph-writer boundary, when it
    /// differs from the internal `.`-separated QN form.
    pub wire_separator: Option<&'static str>,
}

/// A compiled grammar: the tree-sitter `Language` paired with the node-type
/// classification every pass uses to interpret it.
pub struct Grammar {
    /// Which language this grammar parses.
    pub id: LanguageId,
    /// The tree-sitter language definition.
    pub language: Language,
    /// Node-type classification for this language.
    pub config: LanguageConfig,
}

/// Compiles the grammar for `id`, or an error if no grammar is wired up for
/// it (this implementation provides Python, JavaScript, TypeScript, Java).
pub fn load(id: LanguageId) -> Result<Grammar, ScanError> {
    match id {
        LanguageId::Python => python::load(),
        LanguageId::JavaScript => javascript::load(),
        LanguageId::TypeScript => typescript::load(),
        LanguageId::Java => java::load(),
    }
}
