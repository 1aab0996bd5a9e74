use super::{Grammar, LanguageConfig, LanguageId};
use crate::error::ScanError;
use std::collections::HashSet;

pub(super) fn load() -> Result<Grammar, ScanError> {
    let language: tree_sitter::Language = tree_sitter_java::LANGUAGE.into();

    let config = LanguageConfig {
        module_node_types: HashSet::from(["program"]),
        class_node_types: HashSet::from(["class_declaration", "interface_declaration"]),
        function_node_types: HashSet::from(["method_declaration", "constructor_declaration"]),
        call_node_types: HashSet::from(["method_invocation", "object_creation_expression"]),
        assignment_node_types: HashSet::from(["variable_declarator"]),
        member_access_node_types: HashSet::from(["field_access"]),
        self_name: "this",
        // Java ecosystems (e.g. a Maven coordinate graph) conventionally use `::`
        // for method references at external boundaries.
        wire_separator: Some("::"),
    };

    Ok(Grammar {
        id: LanguageId::Java,
        language,
        config,
    })
}
