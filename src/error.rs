//! Error types for the ingestion engine.

use std::path::PathBuf;
use thiserror::Error;

/// Errors raised while building or querying the core symbol tables.
///
/// These are the "structural bug" class of error from the resolution pipeline:
/// conditions that indicate the engine itself did something wrong, as opposed
/// to a source file being unparsable (which is handled per-file, see
/// [`ScanError`]).
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SemanticError {
    /// A qualified name was inserted into the Function Registry twice.
    #[error("duplicate symbol registration for `{0}`")]
    DuplicateSymbol(String),
}

/// Per-file errors raised while scanning, resolving imports, or processing calls.
///
/// Every variant here is caught at the file boundary: a file that fails is
/// logged and skipped, never aborting the run (see the error handling design).
#[derive(Debug, Error)]
pub enum ScanError {
    /// The file's contents could not be read from disk.
    #[error("failed to read {path}: {source}")]
    Io {
        /// Path of the file that could not be read.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },
    /// The grammar layer could not parse the file's contents at all.
    #[error("failed to parse {path} as {language}")]
    Parse {
        /// Path of the file that failed to parse.
        path: PathBuf,
        /// Name of the language grammar that was used.
        language: String,
    },
    /// No grammar is registered for the file's language.
    #[error("no grammar registered for language `{0}`")]
    UnsupportedLanguage(String),
}

/// Fatal errors that abort the run before any file is processed.
#[derive(Debug, Error)]
pub enum EngineError {
    /// The repository root does not exist or cannot be read.
    #[error("repository root {0} does not exist or is not readable")]
    RepoRootUnreadable(PathBuf),
    /// Configuration could not be parsed.
    #[error("failed to parse configuration: {0}")]
    InvalidConfig(#[from] toml::de::Error),
    /// A language named in configuration has no corresponding grammar.
    #[error("no grammar available for configured language `{0}`")]
    MissingGrammar(String),
}
