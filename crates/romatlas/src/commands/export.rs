//! JSON export.

use anyhow::{Context, Result};
use romatlas_core::{canonicalize_db, export_json, load_path, Category};
use std::fs;
use std::path::Path;

/// Handle `romatlas export`: load a database, put fields in canonical
/// order, and render it as JSON with hex-string integers.
pub fn handle_export(path: &Path, category: Category, out: Option<&Path>) -> Result<()> {
    let db = load_path(path).with_context(|| format!("failed to load {}", path.display()))?;
    let json = export_json(&canonicalize_db(&db, category));
    let text = serde_json::to_string_pretty(&json)?;
    match out {
        Some(out) => {
            fs::write(out, text).with_context(|| format!("failed to write {}", out.display()))?;
        }
        None => println!("{text}"),
    }
    Ok(())
}
