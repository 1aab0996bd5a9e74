//! Gitignore-aware, multi-language file discovery.
//!
//! Generalizes the reference implementation's single-language Python walker
//! to every extension the grammar layer claims, via [`LanguageId::from_extension`].

use crate::constants::DEFAULT_EXCLUDE_FOLDERS;
use crate::grammar::LanguageId;
use ignore::WalkBuilder;
use std::path::{Path, PathBuf};

/// One discovered source file, already classified by language.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiscoveredFile {
    /// Path to the file, relative to the process's current directory (or
    /// absolute, if `root` was given as absolute).
    pub path: PathBuf,
    /// Language grammar that will parse this file.
    pub language: LanguageId,
}

/// Checks if a directory name matches any exclusion pattern. Supports exact
/// matching and wildcard patterns starting with `*.`.
#[must_use]
pub fn is_excluded(name: &str, excludes: &[String]) -> bool {
    for exclude in excludes {
        if let Some(suffix) = exclude.strip_prefix('*') {
            if name.ends_with(suffix) {
                return true;
            }
        } else if name == exclude {
            return true;
        }
    }
    false
}

/// Walks `root`, respecting `.gitignore`/global gitignore/`.git/info/exclude`
/// in addition to the hardcoded default exclusions, and returns every file
/// whose extension maps to a supported language plus a count of directories
/// visited.
///
/// `languages`, if non-empty, restricts results to only those languages
/// (matching the CLI's `--languages` filter); an empty slice auto-detects
/// every supported extension.
#[must_use]
pub fn discover_files(
    root: &Path,
    exclude: &[String],
    include: &[String],
    languages: &[LanguageId],
    verbose: bool,
) -> (Vec<DiscoveredFile>, usize) {
    let default_excludes: Vec<String> = DEFAULT_EXCLUDE_FOLDERS()
        .iter()
        .map(|&s| s.to_owned())
        .collect();
    let mut all_excludes: Vec<String> = exclude.iter().cloned().chain(default_excludes).collect();
    all_excludes.retain(|ex| !include.iter().any(|inc| ex == inc));

    let excludes_for_filter = all_excludes.clone();
    let root_for_filter = root.to_path_buf();

    let walker = WalkBuilder::new(root)
        .hidden(false)
        .git_ignore(true)
        .git_global(true)
        .git_exclude(true)
        .filter_entry(move |entry| {
            if entry.path() == root_for_filter {
                return true;
            }
            if !entry.file_type().is_some_and(|ft| ft.is_dir()) {
                return true;
            }
            if let Some(name) = entry.file_name().to_str() {
                if is_excluded(name, &excludes_for_filter) {
                    return false;
                }
            }
            true
        })
        .build();

    let mut files = Vec::new();
    let mut dir_count = 0;

    for result in walker {
        match result {
            Ok(entry) => {
                let path = entry.path();
                if entry.file_type().is_some_and(|ft| ft.is_dir()) {
                    if path != root {
                        dir_count += 1;
                    }
                    continue;
                }

                let Some(ext) = path.extension().and_then(std::ffi::OsStr::to_str) else {
                    continue;
                };
                let Some(language) = LanguageId::from_extension(ext) else {
                    continue;
                };
                if !languages.is_empty() && !languages.contains(&language) {
                    continue;
                }

                files.push(DiscoveredFile {
                    path: path.to_path_buf(),
                    language,
                });
            }
            Err(err) => {
                if verbose {
                    tracing::warn!(%err, "walk error");
                }
            }
        }
    }

    (files, dir_count)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn discovers_files_across_languages_and_skips_defaults() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join("main.py"), "# main").unwrap();
        fs::write(dir.path().join("app.ts"), "// app").unwrap();
        fs::create_dir_all(dir.path().join("node_modules")).unwrap();
        fs::write(dir.path().join("node_modules/lib.js"), "// dep").unwrap();
        fs::create_dir_all(dir.path().join("src")).unwrap();
        fs::write(dir.path().join("src/Main.java"), "class Main {}").unwrap();

        let (files, _) = discover_files(dir.path(), &[], &[], &[], false);
        let names: Vec<_> = files
            .iter()
            .filter_map(|f| f.path.file_name())
            .filter_map(|n| n.to_str())
            .collect();

        assert!(names.contains(&"main.py"));
        assert!(names.contains(&"app.ts"));
        assert!(names.contains(&"Main.java"));
        assert!(!names.contains(&"lib.js"));
    }

    #[test]
    fn languages_filter_restricts_results() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join("main.py"), "# main").unwrap();
        fs::write(dir.path().join("app.ts"), "// app").unwrap();

        let (files, _) = discover_files(dir.path(), &[], &[], &[LanguageId::Python], false);
        assert_eq!(files.len(), 1);
        assert_eq!(files[0].language, LanguageId::Python);
    }

    #[test]
    fn force_include_overrides_default_exclusion() {
        let dir = tempdir().unwrap();
        fs::create_dir_all(dir.path().join("build")).unwrap();
        fs::write(dir.path().join("build/gen.py"), "# generated").unwrap();

        let (without, _) = discover_files(dir.path(), &[], &[], &[], false);
        assert!(without.is_empty());

        let (with_include, _) =
            discover_files(dir.path(), &[], &["build".to_owned()], &[], false);
        assert_eq!(with_include.len(), 1);
    }
}
