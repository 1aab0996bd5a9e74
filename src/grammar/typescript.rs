use super::{Grammar, LanguageConfig, LanguageId};
use crate::error::ScanError;
use std::collections::HashSet;

pub(super) fn load() -> Result<Grammar, ScanError> {
    let language: tree_sitter::Language = tree_sitter_typescript::LANGUAGE_TYPESCRIPT.into();

    let config = LanguageConfig {
        module_node_types: HashSet::from(["program"]),
        class_node_types: HashSet::from(["class_declaration", "interface_declaration"]),
        function_node_types: HashSet::from([
            "function_declaration",
            "method_definition",
            "arrow_function",
            "function_expression",
        ]),
        call_node_types: HashSet::from(["call_expression", "new_expression"]),
        assignment_node_types: HashSet::from(["variable_declarator", "assignment_expression"]),
        member_access_node_types: HashSet::from(["member_expression"]),
        self_name: "this",
        wire_separator: None,
    };

    Ok(Grammar {
        id: LanguageId::TypeScript,
        language,
        config,
    })
}
