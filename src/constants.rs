//! Shared constants.

use rustc_hash::FxHashSet;
use std::sync::OnceLock;

/// Folders excluded from traversal by default, regardless of `.gitignore`
/// contents: build artifacts, dependency caches, and interpreter/VM caches
/// across the supported ecosystems (Python, JavaScript/TypeScript, Java).
pub fn get_default_exclude_folders() -> &'static FxHashSet<&'static str> {
    static SET: OnceLock<FxHashSet<&'static str>> = OnceLock::new();
    SET.get_or_init(|| {
        let mut s = FxHashSet::default();
        s.insert("__pycache__");
        s.insert(".git");
        s.insert(".pytest_cache");
        s.insert(".mypy_cache");
        s.insert(".tox");
        s.insert("htmlcov");
        s.insert("build");
        s.insert("dist");
        s.insert("venv");
        s.insert(".venv");
        s.insert("node_modules");
        s.insert("target");
        s.insert(".gradle");
        s.insert(".idea");
        s
    })
}

/// Stems treated as a package initializer rather than a distinct submodule
/// when deriving a file's module QN (e.g. Python's `__init__.py`).
pub fn get_package_init_stems() -> &'static [&'static str] {
    &["__init__"]
}

pub use get_default_exclude_folders as DEFAULT_EXCLUDE_FOLDERS;
