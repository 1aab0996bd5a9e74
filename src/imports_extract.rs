//! Per-language import-statement extraction: walks a parsed tree's raw
//! import-like nodes and produces the [`ImportStatement`]s the Import
//! Resolver consumes. Kept separate from the grammar layer's query/capture
//! metadata (used for documentation and capture-index lookups) because the
//! exact shape of each language's import syntax needs dedicated, per-node
//! handling rather than a single generic walk.

use crate::grammar::LanguageId;
use crate::imports::{ImportStatement, ImportedName};
use tree_sitter::Node;

/// Walks `root` and returns every import statement found, dispatching on
/// `language` for the node shapes that differ.
#[must_use]
pub fn extract_imports(language: LanguageId, root: Node, source: &[u8]) -> Vec<ImportStatement> {
    let mut statements = Vec::new();
    walk(language, root, source, &mut statements);
    statements
}

fn walk(language: LanguageId, node: Node, source: &[u8], out: &mut Vec<ImportStatement>) {
    let is_import_node = match language {
        LanguageId::Python => matches!(node.kind(), "import_statement" | "import_from_statement"),
        LanguageId::JavaScript | LanguageId::TypeScript => node.kind() == "import_statement",
        LanguageId::Java => node.kind() == "import_declaration",
    };

    if is_import_node {
        match language {
            LanguageId::Python => extract_python(node, source, out),
            LanguageId::JavaScript | LanguageId::TypeScript => extract_js(node, source, out),
            LanguageId::Java => extract_java(node, source, out),
        }
        return;
    }

    let mut cursor = node.walk();
    for child in node.children(&mut cursor) {
        walk(language, child, source, out);
    }
}

fn text<'a>(node: Node, source: &'a [u8]) -> Option<&'a str> {
    node.utf8_text(source).ok()
}

fn extract_python(node: Node, source: &[u8], out: &mut Vec<ImportStatement>) {
    match node.kind() {
        "import_statement" => {
            // `import pkg.sub[.deeper]` or `import pkg.sub as alias`, possibly
            // comma-separated (each a separate `name` child).
            let mut cursor = node.walk();
            for child in node.children_by_field_name("name", &mut cursor) {
                if child.kind() == "aliased_import" {
                    let Some(module) = child.child_by_field_name("name").and_then(|n| text(n, source)) else {
                        continue;
                    };
                    let alias = child.child_by_field_name("alias").and_then(|n| text(n, source));
                    out.push(ImportStatement {
                        module_path: module.to_owned(),
                        relative_level: 0,
                        names: Vec::new(),
                        module_alias: alias.map(str::to_owned),
                        is_wildcard: false,
                    });
                } else if let Some(module) = text(child, source) {
                    out.push(ImportStatement {
                        module_path: module.to_owned(),
                        relative_level: 0,
                        names: Vec::new(),
                        module_alias: None,
                        is_wildcard: false,
                    });
                }
            }
        }
        "import_from_statement" => {
            let module_field = node.child_by_field_name("module_name");
            let (relative_level, module_path) = match module_field {
                Some(m) if m.kind() == "relative_import" => {
                    let dots = m
                        .utf8_text(source)
                        .ok()
                        .map(|s| s.chars().take_while(|&c| c == '.').count())
                        .unwrap_or(1) as u32;
                    let rest = m
                        .child(0)
                        .filter(|c| c.kind() == "dotted_name")
                        .and_then(|c| text(c, source))
                        .unwrap_or("");
                    (dots, rest.to_owned())
                }
                Some(m) => (0, text(m, source).unwrap_or("").to_owned()),
                None => (1, String::new()),
            };

            if node.child_by_field_name("name").is_none() {
                // `from pkg import *`
                let has_wildcard = {
                    let mut cursor = node.walk();
                    node.children(&mut cursor).any(|c| c.kind() == "wildcard_import")
                };
                if has_wildcard {
                    out.push(ImportStatement {
                        module_path,
                        relative_level,
                        names: Vec::new(),
                        module_alias: None,
                        is_wildcard: true,
                    });
                }
                return;
            }

            let mut cursor = node.walk();
            for child in node.children_by_field_name("name", &mut cursor) {
                let (name, alias) = if child.kind() == "aliased_import" {
                    let n = child.child_by_field_name("name").and_then(|n| text(n, source));
                    let a = child.child_by_field_name("alias").and_then(|n| text(n, source));
                    (n, a)
                } else {
                    (text(child, source), None)
                };
                let Some(name) = name else { continue };
                out.push(ImportStatement {
                    module_path: module_path.clone(),
                    relative_level,
                    names: vec![ImportedName {
                        name: name.to_owned(),
                        alias: alias.map(str::to_owned),
                    }],
                    module_alias: None,
                    is_wildcard: false,
                });
            }
        }
        _ => {}
    }
}

fn extract_js(node: Node, source: &[u8], out: &mut Vec<ImportStatement>) {
    let Some(source_node) = node.child_by_field_name("source") else {
        return;
    };
    let Some(raw_source) = text(source_node, source) else {
        return;
    };
    let module_path = raw_source.trim_matches(|c| c == '"' || c == '\'' || c == '`').to_owned();

    let Some(clause) = node.child(1).filter(|c| c.kind() == "import_clause") else {
        // Bare `import "mod"` for side effects only; nothing to bind.
        return;
    };

    let mut cursor = clause.walk();
    for child in clause.children(&mut cursor) {
        match child.kind() {
            "identifier" => {
                if let Some(default_name) = text(child, source) {
                    out.push(ImportStatement {
                        module_path: module_path.clone(),
                        relative_level: 0,
                        names: vec![ImportedName {
                            name: "default".to_owned(),
                            alias: Some(default_name.to_owned()),
                        }],
                        module_alias: None,
                        is_wildcard: false,
                    });
                }
            }
            "namespace_import" => {
                if let Some(alias) = child.child(1).and_then(|n| text(n, source)) {
                    out.push(ImportStatement {
                        module_path: module_path.clone(),
                        relative_level: 0,
                        names: Vec::new(),
                        module_alias: Some(alias.to_owned()),
                        is_wildcard: true,
                    });
                }
            }
            "named_imports" => {
                let mut spec_cursor = child.walk();
                for spec in child.children(&mut spec_cursor) {
                    if spec.kind() != "import_specifier" {
                        continue;
                    }
                    let Some(name) = spec
                        .child_by_field_name("name")
                        .and_then(|n| text(n, source))
                    else {
                        continue;
                    };
                    let alias = spec.child_by_field_name("alias").and_then(|n| text(n, source));
                    out.push(ImportStatement {
                        module_path: module_path.clone(),
                        relative_level: 0,
                        names: vec![ImportedName {
                            name: name.to_owned(),
                            alias: alias.map(str::to_owned),
                        }],
                        module_alias: None,
                        is_wildcard: false,
                    });
                }
            }
            _ => {}
        }
    }
}

fn extract_java(node: Node, source: &[u8], out: &mut Vec<ImportStatement>) {
    let mut cursor = node.walk();
    let children: Vec<Node> = node.children(&mut cursor).collect();
    let is_wildcard = children.iter().any(|c| c.kind() == "asterisk");

    let Some(path_node) = children
        .iter()
        .find(|c| matches!(c.kind(), "scoped_identifier" | "identifier"))
        .copied()
    else {
        return;
    };
    let Some(full_path) = text(path_node, source) else {
        return;
    };

    if is_wildcard {
        out.push(ImportStatement {
            module_path: full_path.to_owned(),
            relative_level: 0,
            names: Vec::new(),
            module_alias: None,
            is_wildcard: true,
        });
        return;
    }

    let (module_path, name) = full_path
        .rsplit_once('.')
        .unwrap_or(("", full_path));
    out.push(ImportStatement {
        module_path: module_path.to_owned(),
        relative_level: 0,
        names: vec![ImportedName {
            name: name.to_owned(),
            alias: None,
        }],
        module_alias: None,
        is_wildcard: false,
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grammar;

    fn parse(language: LanguageId, source: &str) -> tree_sitter::Tree {
        let grammar = grammar::load(language).unwrap();
        let mut parser = tree_sitter::Parser::new();
        parser.set_language(&grammar.language).unwrap();
        parser.parse(source, None).unwrap()
    }

    #[test]
    fn python_direct_and_aliased_and_from_import() {
        let source = "import pkg.sub\nimport other as O\nfrom a.b import f, g as gg\nfrom . import X\nfrom pkg import *\n";
        let tree = parse(LanguageId::Python, source);
        let stmts = extract_imports(LanguageId::Python, tree.root_node(), source.as_bytes());

        assert!(stmts.iter().any(|s| s.module_path == "pkg.sub" && !s.is_wildcard));
        assert!(stmts
            .iter()
            .any(|s| s.module_path == "other" && s.module_alias.as_deref() == Some("O")));
        assert!(stmts.iter().any(|s| s.module_path == "a.b"
            && s.names.iter().any(|n| n.name == "f" && n.alias.is_none())));
        assert!(stmts.iter().any(|s| s.module_path == "a.b"
            && s.names.iter().any(|n| n.name == "g" && n.alias.as_deref() == Some("gg"))));
        assert!(stmts.iter().any(|s| s.relative_level == 1 && s.names.iter().any(|n| n.name == "X")));
        assert!(stmts.iter().any(|s| s.module_path == "pkg" && s.is_wildcard));
    }

    #[test]
    fn javascript_named_default_and_namespace_imports() {
        let source = "import Def from \"./mod\";\nimport { a, b as B } from \"pkg\";\nimport * as NS from \"pkg2\";\n";
        let tree = parse(LanguageId::JavaScript, source);
        let stmts = extract_imports(LanguageId::JavaScript, tree.root_node(), source.as_bytes());

        assert!(stmts.iter().any(|s| s.module_path == "./mod"
            && s.names.iter().any(|n| n.alias.as_deref() == Some("Def"))));
        assert!(stmts.iter().any(|s| s.module_path == "pkg"
            && s.names.iter().any(|n| n.name == "a")));
        assert!(stmts.iter().any(|s| s.module_path == "pkg"
            && s.names.iter().any(|n| n.name == "b" && n.alias.as_deref() == Some("B"))));
        assert!(stmts
            .iter()
            .any(|s| s.module_path == "pkg2" && s.is_wildcard && s.module_alias.as_deref() == Some("NS")));
    }

    #[test]
    fn java_single_and_wildcard_imports() {
        let source = "import com.example.Foo;\nimport com.example.util.*;\n";
        let tree = parse(LanguageId::Java, source);
        let stmts = extract_imports(LanguageId::Java, tree.root_node(), source.as_bytes());

        assert!(stmts.iter().any(|s| s.module_path == "com.example"
            && s.names.iter().any(|n| n.name == "Foo")));
        assert!(stmts.iter().any(|s| s.module_path == "com.example.util" && s.is_wildcard));
    }
}
