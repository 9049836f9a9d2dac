//! Database file I/O.
//!
//! A category database is either a single `<name>.yml` file or a directory
//! of `.yml` parts combined per the multi-source rules. Parts combine in
//! sorted file-name order so the result does not depend on directory
//! enumeration order. Saving serializes through the validating emitter, so
//! a file that was written completely always loads back to the same tree.

use std::fs;
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::combine::combine;
use crate::emit::serialize_db;
use crate::error::{MapError, MapResult};
use crate::parse::parse_document;
use crate::schema::Category;
use crate::value::Value;

/// Load a database from a file or a directory of `.yml` parts.
pub fn load_path(path: &Path) -> MapResult<Value> {
    if path.is_file() {
        debug!(path = %path.display(), "loading database file");
        let text = fs::read_to_string(path)?;
        return parse_document(&text);
    }
    if path.is_dir() {
        let mut files: Vec<PathBuf> = fs::read_dir(path)?
            .filter_map(|entry| entry.ok().map(|e| e.path()))
            .filter(|p| p.extension().is_some_and(|ext| ext == "yml"))
            .collect();
        files.sort();
        if files.is_empty() {
            return Err(MapError::MissingDatabase(path.to_path_buf()));
        }
        debug!(path = %path.display(), parts = files.len(), "combining database directory");
        let mut parts = Vec::with_capacity(files.len());
        for file in &files {
            let text = fs::read_to_string(file)?;
            parts.push(parse_document(&text)?);
        }
        return combine(parts);
    }
    Err(MapError::MissingDatabase(path.to_path_buf()))
}

/// Load `<root>/<category>.yml`, or the `<root>/<category>/` directory.
pub fn load_category(root: &Path, category: Category) -> MapResult<Value> {
    let file = root.join(format!("{category}.yml"));
    if file.is_file() {
        return load_path(&file);
    }
    let dir = root.join(category.name());
    if dir.is_dir() {
        return load_path(&dir);
    }
    Err(MapError::MissingDatabase(file))
}

/// Serialize and write a database as one whole file.
///
/// Round-trip validation happens inside serialization, before anything
/// touches the filesystem.
pub fn save_database(path: &Path, top: &Value, category: Category) -> MapResult<()> {
    let text = serialize_db(top, category)?;
    debug!(path = %path.display(), bytes = text.len(), "writing database");
    fs::write(path, text)?;
    Ok(())
}

/// Render a database as JSON, with integers as upper-case hex strings.
///
/// External viewers take addresses and sizes as bare hex text without the
/// `0x` prefix.
pub fn export_json(top: &Value) -> serde_json::Value {
    match top {
        Value::Int(n) => {
            if *n < 0 {
                serde_json::Value::String(format!("-{:X}", n.unsigned_abs()))
            } else {
                serde_json::Value::String(format!("{n:X}"))
            }
        }
        Value::Str(s) => serde_json::Value::String(s.clone()),
        Value::PerRegion(map) => serde_json::Value::Object(
            map.iter()
                .map(|(region, v)| (region.name().to_string(), export_json(v)))
                .collect(),
        ),
        Value::Mapping(fields) => serde_json::Value::Object(
            fields
                .iter()
                .map(|(k, v)| (k.clone(), export_json(v)))
                .collect(),
        ),
        Value::Sequence(items) => {
            serde_json::Value::Array(items.iter().map(export_json).collect())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value::Region;
    use indexmap::IndexMap;
    use std::collections::BTreeMap;

    fn record(pairs: &[(&str, Value)]) -> Value {
        let mut fields = IndexMap::new();
        for (name, value) in pairs {
            fields.insert(name.to_string(), value.clone());
        }
        Value::Mapping(fields)
    }

    #[test]
    fn test_save_and_load_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("ram.yml");
        let db = Value::Sequence(vec![record(&[
            ("desc", Value::from("gWork")),
            ("type", Value::from("u16")),
            ("addr", Value::Int(0x200_0000)),
            ("size", Value::Int(2)),
        ])]);

        save_database(&path, &db, Category::Ram).unwrap();
        let loaded = load_path(&path).unwrap();
        assert_eq!(loaded, db);
    }

    #[test]
    fn test_load_directory_combines_sorted() {
        let dir = tempfile::tempdir().unwrap();
        // Written out of name order; sorted combination puts a.yml first,
        // then the address sort interleaves the records.
        fs::write(dir.path().join("b.yml"), "-\n  desc: Second\n  addr: 0x30\n").unwrap();
        fs::write(dir.path().join("a.yml"), "-\n  desc: First\n  addr: 0x10\n").unwrap();
        fs::write(dir.path().join("notes.txt"), "ignored").unwrap();

        let loaded = load_path(dir.path()).unwrap();
        let descs: Vec<&str> = loaded
            .as_sequence()
            .unwrap()
            .iter()
            .map(|e| e.get("desc").unwrap().as_str().unwrap())
            .collect();
        assert_eq!(descs, vec!["First", "Second"]);
    }

    #[test]
    fn test_load_category_prefers_file() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("enums.yml"), "ranks:\n- desc: E\n  val: 0x1\n").unwrap();
        let loaded = load_category(dir.path(), Category::Enums).unwrap();
        assert!(loaded.get("ranks").is_some());
    }

    #[test]
    fn test_load_missing_database() {
        let dir = tempfile::tempdir().unwrap();
        match load_category(dir.path(), Category::Code) {
            Err(MapError::MissingDatabase(path)) => {
                assert!(path.ends_with("code.yml"));
            }
            other => panic!("expected missing database error, got {other:?}"),
        }
    }

    #[test]
    fn test_export_json_hex_strings() {
        let mut addr = BTreeMap::new();
        addr.insert(Region::U, Value::Int(0x200_0010));
        let db = Value::Sequence(vec![record(&[
            ("desc", Value::from("gThing")),
            ("addr", Value::PerRegion(addr)),
            ("size", Value::Int(0xB0)),
            ("offset", Value::Int(-8)),
        ])]);

        let json = export_json(&db);
        let entry = &json.as_array().unwrap()[0];
        assert_eq!(entry["desc"], "gThing");
        assert_eq!(entry["addr"]["U"], "2000010");
        assert_eq!(entry["size"], "B0");
        assert_eq!(entry["offset"], "-8");
    }
}
