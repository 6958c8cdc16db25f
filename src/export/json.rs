//! JSON export of a scoped document.

use std::fs;
use std::path::Path;

use tracing::info;

use crate::error::Result;
use crate::models::Document;

/// Pretty-printed JSON of `doc`.
pub fn to_json(doc: &Document) -> Result<String> {
    Ok(serde_json::to_string_pretty(doc)?)
}

pub fn write_json(doc: &Document, path: &Path) -> Result<()> {
    fs::write(path, to_json(doc)?)?;
    info!("Exported JSON to {}", path.display());
    Ok(())
}
