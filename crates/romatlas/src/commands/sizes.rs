//! Per-region size report.

use anyhow::{bail, Context, Result};
use indexmap::IndexMap;
use romatlas_core::{entry_size, load_path, Category, Value};
use std::path::Path;

/// Handle `romatlas sizes`: resolve every record of a data/ram database
/// against the structs database and print the per-region byte sizes.
pub fn handle_sizes(path: &Path, category: Category, structs: Option<&Path>) -> Result<()> {
    if !matches!(category, Category::Data | Category::Ram) {
        bail!("size reports apply to data and ram databases, not {category}");
    }
    let db = load_path(path).with_context(|| format!("failed to load {}", path.display()))?;
    let Some(entries) = db.as_sequence() else {
        bail!("{} is not a record sequence", path.display());
    };

    let structs = match structs {
        Some(path) => {
            let db =
                load_path(path).with_context(|| format!("failed to load {}", path.display()))?;
            db.as_mapping()
                .cloned()
                .with_context(|| format!("{} is not a structs database", path.display()))?
        }
        None => IndexMap::new(),
    };

    for entry in entries {
        let name = entry
            .get("desc")
            .and_then(Value::as_str)
            .unwrap_or("(unnamed)");
        let sizes = entry_size(entry, &structs)
            .with_context(|| format!("failed to resolve size of {name}"))?;
        let report: Vec<String> = sizes
            .iter()
            .map(|(region, size)| format!("{region}:0x{size:X}"))
            .collect();
        println!("{name:<32} {}", report.join(" "));
    }
    Ok(())
}
