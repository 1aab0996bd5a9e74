//! Core library for the multi-language source-code ingestion engine.
//!
//! Four globally-barriered passes over a repository build a call graph:
//! the Structure Scanner (symbol declarations), the Import Resolver
//! (per-module import bindings), Type Inference (local variable types),
//! and the Call Processor (call-site resolution). See [`pipeline::Pipeline`]
//! for the driving loop.

#![cfg_attr(test, allow(clippy::unwrap_used, clippy::expect_used))]

/// Command-line interface definitions.
pub mod cli;
/// Layered TOML configuration.
pub mod config;
/// Shared constants (default exclusions, package-initializer stems).
pub mod constants;
/// Error types for the engine.
pub mod error;
/// Pluggable per-language grammar/query layer.
pub mod grammar;
/// Graph writer trait boundary and in-memory adapter.
pub mod graphsink;
/// Class Inheritance Table and the inherited-method BFS walk.
pub mod inheritance;
/// Import Resolver (Pass 2): per-module Import Map construction.
pub mod imports;
/// Per-language import-statement extraction.
pub mod imports_extract;
/// Structured logging initialization.
pub mod logging;
/// Top-level `Pipeline` orchestrating all four passes.
pub mod pipeline;
/// Qualified names (QNs): the universal key used by every table.
pub mod qualifiedname;
/// Function Registry: the global `QN -> Kind` table, plus suffix lookup.
pub mod registry;
/// Call Resolver (Pass 4, core): the central resolution algorithm.
pub mod resolver;
/// Structure Scanner (Pass 1).
pub mod scanner;
/// Type Inference Engine (Pass 3).
pub mod typeinfer;
/// Gitignore-aware, multi-language file discovery.
pub mod walk;
