//! Canonical reformatting.

use anyhow::{Context, Result};
use romatlas_core::{load_path, serialize_db, Category};
use std::fs;
use std::path::Path;

/// Handle `romatlas fmt`: load (combining multi-file input) and
/// re-serialize in canonical form.
pub fn handle_fmt(path: &Path, category: Category, out: Option<&Path>) -> Result<()> {
    let db = load_path(path).with_context(|| format!("failed to load {}", path.display()))?;
    let text = serialize_db(&db, category)?;
    match out {
        Some(out) => {
            fs::write(out, text).with_context(|| format!("failed to write {}", out.display()))?;
        }
        None => print!("{text}"),
    }
    Ok(())
}
