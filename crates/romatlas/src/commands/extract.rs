//! The full extraction pipeline.
//!
//! Sections and symbols come from the image; declarations from the
//! preprocessed translation unit enrich the registry; each map kind is
//! then projected into records and written as its own database file.

use anyhow::{Context, Result};
use romatlas_cdecl::{apply_facts, extract_facts, parse_translation_unit};
use romatlas_core::{project_records, save_database, ConstantTable, MapKind};
use romatlas_elf::{load_image, Toolchain};
use std::fs;
use std::path::Path;
use tracing::info;

/// Handle `romatlas extract`.
pub fn handle_extract(
    image: &Path,
    source: &Path,
    out: &Path,
    toolchain: Option<&str>,
) -> Result<()> {
    let toolchain = match toolchain {
        Some(prefix) => Toolchain::new(prefix),
        None => Toolchain::from_env(),
    };
    let (_sections, mut symbols) = load_image(&toolchain, image)
        .with_context(|| format!("failed to read {}", image.display()))?;

    let text = fs::read_to_string(source)
        .with_context(|| format!("failed to read {}", source.display()))?;
    let unit = parse_translation_unit(&text)
        .with_context(|| format!("failed to parse declarations in {}", source.display()))?;
    let facts = extract_facts(&unit);
    let mut constants = ConstantTable::new();
    apply_facts(&facts, &mut symbols, &mut constants);

    fs::create_dir_all(out)
        .with_context(|| format!("failed to create {}", out.display()))?;
    for kind in MapKind::ALL {
        let records = project_records(&symbols, kind, &constants)
            .with_context(|| format!("failed to project {kind} records"))?;
        let path = out.join(format!("{kind}.yml"));
        save_database(&path, &records, kind.category())
            .with_context(|| format!("failed to write {}", path.display()))?;
        let count = records.as_sequence().map(|s| s.len()).unwrap_or(0);
        info!(path = %path.display(), records = count, "wrote database");
        println!("{}: {} records", path.display(), count);
    }
    Ok(())
}
