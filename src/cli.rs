//! Command-line interface: a thin adapter over [`crate::config::Config`] and
//! [`crate::pipeline::Pipeline`] — never the core algorithm itself.

use clap::Parser;
use std::path::PathBuf;

/// Help text for the configuration file, shown at the bottom of `--help`.
const CONFIG_HELP: &str = "\
CONFIGURATION FILE (.codegraph.toml):
  Create this file in the repository root to set defaults.

  project_name = \"my-project\"
  exclude_folders = [\"generated\"]
  include_folders = [\"vendor/ours\"]
  languages = [\"python\", \"typescript\"]

  [resolver]
  suffix_fallback = true
";

/// Builds a multi-language call graph over one or more source trees.
#[derive(Parser, Debug)]
#[command(name = "codegraph", version, after_help = CONFIG_HELP)]
pub struct Cli {
    /// One or more root paths to scan.
    #[arg(required = true)]
    pub paths: Vec<PathBuf>,

    /// Project name used as the first QN segment (defaults to the last
    /// path component of the first root).
    #[arg(long)]
    pub project_name: Option<String>,

    /// Restrict scanning to these languages (`python`, `javascript`,
    /// `typescript`, `java`); defaults to auto-detecting every extension
    /// the grammar layer supports.
    #[arg(long, value_delimiter = ',')]
    pub languages: Vec<String>,

    /// Disable Phase 6 (suffix-fallback) call resolution.
    #[arg(long)]
    pub no_suffix_fallback: bool,

    /// Additional folder names to exclude from traversal.
    #[arg(long = "exclude", value_delimiter = ',')]
    pub exclude: Vec<String>,

    /// Folder names to force-include even if otherwise excluded.
    #[arg(long = "include", value_delimiter = ',')]
    pub include: Vec<String>,

    /// Emit the final run summary as JSON instead of a human-readable table.
    #[arg(long)]
    pub json: bool,

    /// Enable verbose logging (raises the default filter by one level).
    #[arg(short, long)]
    pub verbose: bool,
}

impl Cli {
    /// Parses `--languages` into grammar [`LanguageId`](crate::grammar::LanguageId)s,
    /// warning about (and dropping) any name with no matching grammar.
    #[must_use]
    pub fn language_filter(&self) -> Vec<crate::grammar::LanguageId> {
        self.languages
            .iter()
            .filter_map(|name| match name.as_str() {
                "python" => Some(crate::grammar::LanguageId::Python),
                "javascript" => Some(crate::grammar::LanguageId::JavaScript),
                "typescript" => Some(crate::grammar::LanguageId::TypeScript),
                "java" => Some(crate::grammar::LanguageId::Java),
                other => {
                    tracing::warn!(language = other, "unknown language name, ignoring");
                    None
                }
            })
            .collect()
    }
}
