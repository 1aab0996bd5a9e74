use super::{Grammar, LanguageConfig, LanguageId};
use crate::error::ScanError;
use std::collections::HashSet;

pub(super) fn load() -> Result<Grammar, ScanError> {
    let language: tree_sitter::Language = tree_sitter_python::LANGUAGE.into();

    let config = LanguageConfig {
        module_node_types: HashSet::from(["module"]),
        class_node_types: HashSet::from(["class_definition"]),
        function_node_types: HashSet::from(["function_definition"]),
        call_node_types: HashSet::from(["call"]),
        assignment_node_types: HashSet::from(["assignment"]),
        member_access_node_types: HashSet::from(["attribute"]),
        self_name: "self",
        wire_separator: None,
    };

    Ok(Grammar {
        id: LanguageId::Python,
        language,
        config,
    })
}
