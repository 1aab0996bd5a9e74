//! Layered TOML configuration: `.codegraph.toml`, then `[tool.codegraph]`
//! inside a `pyproject.toml`-style host project file, walking up from the
//! target directory until one is found or the filesystem root is reached.

use serde::Deserialize;
use std::fs;
use std::path::Path;

/// Top-level configuration, as loaded from `.codegraph.toml`.
#[derive(Debug, Deserialize, Default, Clone)]
pub struct Config {
    /// Project/repository name; used as the root segment of every QN.
    /// Defaults to the last component of the scanned path when unset.
    pub project_name: Option<String>,
    /// Additional folder names to exclude, merged with the built-in
    /// defaults and any CLI `--exclude` flags.
    #[serde(default)]
    pub exclude_folders: Vec<String>,
    /// Folder names to force-include even if otherwise excluded.
    #[serde(default)]
    pub include_folders: Vec<String>,
    /// Language names to restrict scanning to (`python`, `javascript`,
    /// `typescript`, `java`). Empty means auto-detect by extension.
    #[serde(default)]
    pub languages: Vec<String>,
    /// Call Resolver configuration.
    #[serde(default)]
    pub resolver: ResolverConfig,
}

/// Resolver-specific configuration.
#[derive(Debug, Deserialize, Clone)]
pub struct ResolverConfig {
    /// Whether Phase 6 (suffix fallback) is enabled.
    #[serde(default = "default_suffix_fallback")]
    pub suffix_fallback: bool,
}

fn default_suffix_fallback() -> bool {
    true
}

impl Default for ResolverConfig {
    fn default() -> Self {
        Self {
            suffix_fallback: default_suffix_fallback(),
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
struct PyProjectHost {
    tool: ToolTable,
}

#[derive(Debug, Deserialize, Clone)]
struct ToolTable {
    codegraph: Config,
}

impl Config {
    /// Loads configuration from the current directory, walking upward.
    #[must_use]
    pub fn load() -> Self {
        Self::load_from_path(Path::new("."))
    }

    /// Loads configuration starting from `path` (a file or directory) and
    /// walking up through its ancestors.
    #[must_use]
    pub fn load_from_path(path: &Path) -> Self {
        let mut current = path.to_path_buf();
        if current.is_file() {
            current.pop();
        }

        loop {
            let codegraph_toml = current.join(".codegraph.toml");
            if codegraph_toml.exists() {
                if let Ok(content) = fs::read_to_string(&codegraph_toml) {
                    match toml::from_str::<Config>(&content) {
                        Ok(config) => return config,
                        Err(err) => {
                            tracing::warn!(path = %codegraph_toml.display(), %err, "ignoring malformed config file");
                        }
                    }
                }
            }

            let pyproject_toml = current.join("pyproject.toml");
            if pyproject_toml.exists() {
                if let Ok(content) = fs::read_to_string(&pyproject_toml) {
                    if let Ok(host) = toml::from_str::<PyProjectHost>(&content) {
                        return host.tool.codegraph;
                    }
                }
            }

            if !current.pop() {
                break;
            }
        }

        Config::default()
    }
}
