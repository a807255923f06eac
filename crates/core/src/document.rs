//! Story documents: the persisted JSON form of a [`Declaration`].

use std::path::Path;

use crate::declaration::Declaration;
use crate::error::DocumentError;

/// JSON Schema every story document conforms to.
pub static STORY_SCHEMA: &str = include_str!("../../../schema/story-schema.json");

pub fn parse_declaration(source: &str) -> Result<Declaration, DocumentError> {
    Ok(serde_json::from_str(source)?)
}

pub fn load_declaration(path: &Path) -> Result<Declaration, DocumentError> {
    let source = std::fs::read_to_string(path).map_err(|source| DocumentError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    parse_declaration(&source)
}
