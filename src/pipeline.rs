//! Top-level `Pipeline`: owns the four barriered passes, the shared
//! `GraphSink`, and per-run statistics.

use crate::error::ScanError;
use crate::grammar::{self, Grammar, LanguageConfig, LanguageId};
use crate::graphsink::GraphSink;
use crate::imports::ImportResolver;
use crate::imports_extract::extract_imports;
use crate::inheritance::InheritanceTable;
use crate::qualifiedname::Qn;
use crate::registry::FunctionRegistry;
use crate::resolver::Resolver;
use crate::scanner::{self, Scanner};
use crate::typeinfer::TypeInferenceEngine;
use crate::walk::DiscoveredFile;
use rayon::prelude::*;
use rustc_hash::FxHashMap;
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

/// Run statistics reported by the CLI at the end of a run.
#[derive(Debug, Clone, Default)]
pub struct PipelineStats {
    /// Number of files successfully scanned (parsed without a fatal error).
    pub files_scanned: usize,
    /// Number of files skipped due to a per-file [`ScanError`].
    pub files_skipped: usize,
    /// Total symbols registered in the Function Registry.
    pub symbols_registered: usize,
    /// Edges emitted, grouped by relationship type.
    pub edges_by_type: HashMap<String, usize>,
    /// Number of call sites that failed to resolve in any phase.
    pub resolution_misses: usize,
}

/// One successfully parsed file, carried across all four passes.
struct ParsedFile {
    module_qn: Qn,
    language: LanguageId,
    source: Vec<u8>,
    tree: tree_sitter::Tree,
}

/// Orchestrates the Structure Scanner, Import Resolver, Type Inference, and
/// Call Processor passes over a discovered file list.
pub struct Pipeline {
    registry: FunctionRegistry,
    inheritance: InheritanceTable,
    import_resolver: ImportResolver,
    sink: Box<dyn GraphSink>,
    suffix_fallback_enabled: bool,
    package_init_stems: Vec<&'static str>,
}

impl Pipeline {
    /// Creates a pipeline with fresh (empty) tables over the given sink.
    #[must_use]
    pub fn new(sink: Box<dyn GraphSink>, suffix_fallback_enabled: bool) -> Self {
        Self {
            registry: FunctionRegistry::new(),
            inheritance: InheritanceTable::new(),
            import_resolver: ImportResolver::new(),
            sink,
            suffix_fallback_enabled,
            package_init_stems: crate::constants::get_package_init_stems().to_vec(),
        }
    }

    /// Runs all four passes over `files`, relative to `root`, using
    /// `project_name` as the first QN segment.
    ///
    /// # Errors
    ///
    /// Returns `Err` only for conditions that prevent the run from starting
    /// at all (e.g. no grammar available for any discovered file's
    /// language); per-file parse failures are logged and skipped.
    pub fn run(
        &self,
        root: &std::path::Path,
        project_name: &str,
        files: &[DiscoveredFile],
    ) -> Result<PipelineStats, ScanError> {
        let mut languages: std::collections::HashSet<LanguageId> = std::collections::HashSet::new();
        for file in files {
            languages.insert(file.language);
        }
        let mut grammars: FxHashMap<LanguageId, Grammar> = FxHashMap::default();
        for language in languages {
            grammars.insert(language, grammar::load(language)?);
        }

        let stats = PipelineStats::default();
        let files_scanned = AtomicUsize::new(0);
        let files_skipped = AtomicUsize::new(0);
        let resolution_misses = AtomicUsize::new(0);

        // Pass 1 — Structure Scanner.
        let parsed: Vec<(PathBuf, ParsedFile)> = files
            .par_iter()
            .filter_map(|file| {
                let grammar = grammars.get(&file.language)?;
                match self.parse_and_scan(root, project_name, file, grammar) {
                    Ok(parsed_file) => {
                        files_scanned.fetch_add(1, Ordering::Relaxed);
                        Some((file.path.clone(), parsed_file))
                    }
                    Err(err) => {
                        tracing::warn!(path = %file.path.display(), %err, "skipping file");
                        files_skipped.fetch_add(1, Ordering::Relaxed);
                        None
                    }
                }
            })
            .collect();

        // Pass 2 — Import Resolver.
        parsed.par_iter().for_each(|(_, pf)| {
            let statements = extract_imports(pf.language, pf.tree.root_node(), &pf.source);
            for stmt in &statements {
                self.import_resolver.process_statement(&pf.module_qn, stmt);
            }
        });

        // Pass 3 + Pass 4 — Type Inference and Call Processor, per callable.
        let type_inference = TypeInferenceEngine::new(&self.registry);
        let edge_counts: Mutex<HashMap<String, usize>> = Mutex::new(HashMap::new());

        parsed.par_iter().for_each(|(_, pf)| {
            let Some(grammar) = grammars.get(&pf.language) else {
                return;
            };
            let import_map = self.import_resolver.map_for(&pf.module_qn);
            let resolver = Resolver::new(
                &self.registry,
                &self.inheritance,
                &type_inference,
                grammar.config.self_name,
                self.suffix_fallback_enabled,
            );

            self.process_callables(
                pf.tree.root_node(),
                &pf.module_qn,
                None,
                &grammar.config,
                &pf.source,
                &import_map,
                &type_inference,
                &resolver,
                &resolution_misses,
                &edge_counts,
            );
        });

        let mut stats = stats;
        stats.files_scanned = files_scanned.load(Ordering::Relaxed);
        stats.files_skipped = files_skipped.load(Ordering::Relaxed);
        stats.symbols_registered = self.registry.len();
        stats.resolution_misses = resolution_misses.load(Ordering::Relaxed);
        stats.edges_by_type = edge_counts.into_inner().unwrap_or_else(std::sync::PoisonError::into_inner);

        Ok(stats)
    }

    fn parse_and_scan(
        &self,
        root: &std::path::Path,
        project_name: &str,
        file: &DiscoveredFile,
        grammar: &Grammar,
    ) -> Result<ParsedFile, ScanError> {
        let source = std::fs::read(&file.path).map_err(|source| ScanError::Io {
            path: file.path.clone(),
            source,
        })?;

        let mut parser = tree_sitter::Parser::new();
        parser
            .set_language(&grammar.language)
            .map_err(|_| ScanError::UnsupportedLanguage(file.language.name().to_owned()))?;
        let tree = parser.parse(&source, None).ok_or_else(|| ScanError::Parse {
            path: file.path.clone(),
            language: file.language.name().to_owned(),
        })?;

        let relative = file.path.strip_prefix(root).unwrap_or(&file.path);
        let module_qn = scanner::module_qn_for_path(project_name, relative, &self.package_init_stems);

        let scan = Scanner::new(grammar, &self.registry, &self.inheritance, self.sink.as_ref());
        scan.scan_module(tree.root_node(), &module_qn, &source)?;

        Ok(ParsedFile {
            module_qn,
            language: file.language,
            source,
            tree,
        })
    }

    /// Walks `node` looking for function/method declarations, building each
    /// one's Local Variable Type Map (Pass 3) and then resolving its call
    /// sites (Pass 4), recursing into nested functions/classes along the way.
    #[allow(clippy::too_many_arguments)]
    fn process_callables(
        &self,
        node: tree_sitter::Node,
        module_qn: &Qn,
        class_context: Option<&Qn>,
        config: &LanguageConfig,
        source: &[u8],
        import_map: &crate::imports::ImportMap,
        type_inference: &TypeInferenceEngine,
        resolver: &Resolver,
        resolution_misses: &AtomicUsize,
        edge_counts: &Mutex<HashMap<String, usize>>,
    ) {
        if config.class_node_types.contains(node.kind()) {
            let class_qn = scanner::build_nested_qualified_name(node, module_qn, config, source)
                .unwrap_or_else(|| module_qn.clone());
            let mut cursor = node.walk();
            for child in node.children(&mut cursor) {
                self.process_callables(
                    child,
                    module_qn,
                    Some(&class_qn),
                    config,
                    source,
                    import_map,
                    type_inference,
                    resolver,
                    resolution_misses,
                    edge_counts,
                );
            }
            return;
        }

        if config.function_node_types.contains(node.kind()) {
            let func_qn = scanner::build_nested_qualified_name(node, module_qn, config, source)
                .unwrap_or_else(|| module_qn.clone());
            let params = node.child_by_field_name("parameters");
            if let Some(body) = node.child_by_field_name("body") {
                let local_vars = type_inference.build_local_variable_type_map(
                    params,
                    body,
                    import_map,
                    module_qn,
                    config,
                    source,
                );

                self.resolve_calls_in(
                    body,
                    &func_qn,
                    module_qn,
                    class_context,
                    config,
                    source,
                    import_map,
                    &local_vars,
                    resolver,
                    resolution_misses,
                    edge_counts,
                );

                // Nested functions/classes defined in this body get their own pass.
                let mut cursor = body.walk();
                for child in body.children(&mut cursor) {
                    self.process_callables(
                        child,
                        module_qn,
                        class_context,
                        config,
                        source,
                        import_map,
                        type_inference,
                        resolver,
                        resolution_misses,
                        edge_counts,
                    );
                }
            }
            return;
        }

        let mut cursor = node.walk();
        for child in node.children(&mut cursor) {
            self.process_callables(
                child,
                module_qn,
                class_context,
                config,
                source,
                import_map,
                type_inference,
                resolver,
                resolution_misses,
                edge_counts,
            );
        }
    }

    /// Extracts call-site text from `body` (not descending into nested
    /// callable bodies, which get their own `local_var_types`) and resolves
    /// each one, emitting `CALLS` edges and recording resolution misses.
    #[allow(clippy::too_many_arguments)]
    fn resolve_calls_in(
        &self,
        node: tree_sitter::Node,
        caller_qn: &Qn,
        module_qn: &Qn,
        class_context: Option<&Qn>,
        config: &LanguageConfig,
        source: &[u8],
        import_map: &crate::imports::ImportMap,
        local_vars: &crate::typeinfer::LocalVarTypeMap,
        resolver: &Resolver,
        resolution_misses: &AtomicUsize,
        edge_counts: &Mutex<HashMap<String, usize>>,
    ) {
        if config.function_node_types.contains(node.kind()) || config.class_node_types.contains(node.kind()) {
            return;
        }

        if config.call_node_types.contains(node.kind()) {
            if let Some(callee) = node
                .child_by_field_name("function")
                .or_else(|| node.child_by_field_name("constructor"))
                .and_then(|n| n.utf8_text(source).ok())
            {
                match resolver.resolve_call(callee, module_qn, import_map, local_vars, class_context) {
                    Some((_, target_qn)) => {
                        self.sink.ensure_relationship_batch(
                            "CALLS",
                            vec![(
                                ("", "qualified_name", caller_qn.to_dotted()),
                                ("", "qualified_name", target_qn.to_dotted()),
                            )],
                        );
                        let mut counts = edge_counts.lock().unwrap_or_else(std::sync::PoisonError::into_inner);
                        *counts.entry("CALLS".to_owned()).or_insert(0) += 1;
                    }
                    None => {
                        tracing::debug!(caller = %caller_qn, call = callee, "unresolved call");
                        resolution_misses.fetch_add(1, Ordering::Relaxed);
                    }
                }
            }
        }

        let mut cursor = node.walk();
        for child in node.children(&mut cursor) {
            self.resolve_calls_in(
                child,
                caller_qn,
                module_qn,
                class_context,
                config,
                source,
                import_map,
                local_vars,
                resolver,
                resolution_misses,
                edge_counts,
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graphsink::InMemoryGraphSink;
    use tempfile::tempdir;

    #[test]
    fn end_to_end_same_module_call_resolves() {
        let dir = tempdir().unwrap();
        std::fs::write(
            dir.path().join("main.py"),
            "def helper():\n    pass\n\ndef run():\n    helper()\n",
        )
        .unwrap();

        let sink = InMemoryGraphSink::new();
        let pipeline = Pipeline::new(Box::new(sink), true);
        let files = vec![DiscoveredFile {
            path: dir.path().join("main.py"),
            language: LanguageId::Python,
        }];

        let stats = pipeline.run(dir.path(), "project", &files).unwrap();
        assert_eq!(stats.files_scanned, 1);
        assert_eq!(stats.resolution_misses, 0);
        assert_eq!(stats.edges_by_type.get("CALLS").copied(), Some(1));
    }

    #[test]
    fn end_to_end_unresolved_call_is_counted_as_a_miss() {
        let dir = tempdir().unwrap();
        std::fs::write(dir.path().join("main.py"), "def run():\n    nonexistent_thing()\n").unwrap();

        let sink = InMemoryGraphSink::new();
        let pipeline = Pipeline::new(Box::new(sink), true);
        let files = vec![DiscoveredFile {
            path: dir.path().join("main.py"),
            language: LanguageId::Python,
        }];

        let stats = pipeline.run(dir.path(), "project", &files).unwrap();
        assert_eq!(stats.resolution_misses, 1);
    }

    #[test]
    fn end_to_end_instance_method_call_via_constructor_assignment() {
        let dir = tempdir().unwrap();
        std::fs::write(
            dir.path().join("main.py"),
            "class Repo:\n    def find_by_id(self, id):\n        pass\n\ndef run():\n    r = Repo()\n    r.find_by_id(1)\n",
        )
        .unwrap();

        let sink = InMemoryGraphSink::new();
        let pipeline = Pipeline::new(Box::new(sink), true);
        let files = vec![DiscoveredFile {
            path: dir.path().join("main.py"),
            language: LanguageId::Python,
        }];

        let stats = pipeline.run(dir.path(), "project", &files).unwrap();
        assert_eq!(stats.resolution_misses, 0);
        assert_eq!(stats.edges_by_type.get("CALLS").copied(), Some(1));
    }
}
