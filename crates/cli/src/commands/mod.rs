//! Subcommand implementations. Each `cmd_*` reports its own errors and
//! exits with status 1 on failure.

pub(crate) mod inspect;
pub(crate) mod publish;
pub(crate) mod step;
pub(crate) mod validate;

use std::path::Path;

use tick_core::{Declaration, STORY_SCHEMA};

/// Read a story document as raw JSON.
pub(crate) fn read_document(path: &Path) -> Result<serde_json::Value, String> {
    let source = std::fs::read_to_string(path)
        .map_err(|e| format!("error reading file '{}': {}", path.display(), e))?;
    serde_json::from_str(&source)
        .map_err(|e| format!("error parsing JSON in '{}': {}", path.display(), e))
}

/// Schema violations of a story document; empty when it conforms.
pub(crate) fn schema_errors(document: &serde_json::Value) -> Result<Vec<String>, String> {
    let schema: serde_json::Value = serde_json::from_str(STORY_SCHEMA)
        .map_err(|e| format!("internal error: failed to parse embedded story schema: {}", e))?;
    let validator = jsonschema::validator_for(&schema)
        .map_err(|e| format!("internal error: failed to compile story schema: {}", e))?;
    Ok(validator
        .iter_errors(document)
        .map(|e| format!("{}", e))
        .collect())
}

/// Read, schema-check and decode a story document.
pub(crate) fn load_story(path: &Path) -> Result<Declaration, String> {
    let document = read_document(path)?;
    let errors = schema_errors(&document)?;
    if let Some(first) = errors.first() {
        return Err(format!(
            "'{}' is not a valid story document: {}",
            path.display(),
            first
        ));
    }
    serde_json::from_value(document)
        .map_err(|e| format!("error decoding story '{}': {}", path.display(), e))
}
