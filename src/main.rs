//! Main binary entry point: wires the CLI, layered configuration, file
//! discovery, and the `Pipeline` together, then prints a run summary.

use codegraph::cli::Cli;
use codegraph::config::Config;
use codegraph::graphsink::InMemoryGraphSink;
use codegraph::grammar::LanguageId;
use codegraph::pipeline::{Pipeline, PipelineStats};
use codegraph::walk::discover_files;

use anyhow::{Context, Result};
use clap::Parser;

fn main() -> Result<()> {
    let cli = Cli::parse();
    codegraph::logging::init(cli.verbose);

    let root = cli
        .paths
        .first()
        .context("at least one path is required")?;
    let config = Config::load_from_path(root);

    let project_name = cli
        .project_name
        .clone()
        .or_else(|| config.project_name.clone())
        .or_else(|| {
            root.file_name()
                .and_then(|n| n.to_str())
                .map(str::to_owned)
        })
        .unwrap_or_else(|| "project".to_owned());

    let mut exclude_folders = config.exclude_folders.clone();
    exclude_folders.extend(cli.exclude.iter().cloned());

    let mut include_folders = config.include_folders.clone();
    include_folders.extend(cli.include.iter().cloned());

    let languages = if !cli.languages.is_empty() {
        cli.language_filter()
    } else {
        config
            .languages
            .iter()
            .filter_map(|name| language_from_name(name))
            .collect()
    };

    let suffix_fallback_enabled = !cli.no_suffix_fallback && config.resolver.suffix_fallback;

    let mut total_stats = PipelineStats::default();

    for path in &cli.paths {
        let (files, dirs_visited) =
            discover_files(path, &exclude_folders, &include_folders, &languages, cli.verbose);
        tracing::info!(root = %path.display(), files = files.len(), dirs_visited, "discovered files");

        let pipeline = Pipeline::new(Box::new(InMemoryGraphSink::new()), suffix_fallback_enabled);
        let stats = pipeline.run(path, &project_name, &files)?;
        merge_stats(&mut total_stats, stats);
    }

    if cli.json {
        println!("{}", serde_json::to_string_pretty(&summary_json(&total_stats))?);
    } else {
        print_summary(&total_stats);
    }

    Ok(())
}

fn language_from_name(name: &str) -> Option<LanguageId> {
    match name {
        "python" => Some(LanguageId::Python),
        "javascript" => Some(LanguageId::JavaScript),
        "typescript" => Some(LanguageId::TypeScript),
        "java" => Some(LanguageId::Java),
        other => {
            tracing::warn!(language = other, "unknown language name, ignoring");
            None
        }
    }
}

fn merge_stats(total: &mut PipelineStats, stats: PipelineStats) {
    total.files_scanned += stats.files_scanned;
    total.files_skipped += stats.files_skipped;
    total.symbols_registered += stats.symbols_registered;
    total.resolution_misses += stats.resolution_misses;
    for (rel_type, count) in stats.edges_by_type {
        *total.edges_by_type.entry(rel_type).or_insert(0) += count;
    }
}

fn summary_json(stats: &PipelineStats) -> serde_json::Value {
    serde_json::json!({
        "files_scanned": stats.files_scanned,
        "files_skipped": stats.files_skipped,
        "symbols_registered": stats.symbols_registered,
        "resolution_misses": stats.resolution_misses,
        "edges_by_type": stats.edges_by_type,
    })
}

fn print_summary(stats: &PipelineStats) {
    println!("files scanned:      {}", stats.files_scanned);
    println!("files skipped:      {}", stats.files_skipped);
    println!("symbols registered: {}", stats.symbols_registered);
    println!("resolution misses:  {}", stats.resolution_misses);

    if !stats.edges_by_type.is_empty() {
        println!("edges emitted:");
        let mut edges: Vec<_> = stats.edges_by_type.iter().collect();
        edges.sort_by(|a, b| a.0.cmp(b.0));
        for (rel_type, count) in edges {
            println!("  {rel_type:<16} {count}");
        }
    }
}
