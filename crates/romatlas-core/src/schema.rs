//! Database categories and per-category field schemas.
//!
//! Field order in serialized records is not construction order: each record
//! category has a closed, hand-specified field list, and nested fields look
//! up their own schema under the field's name (a `params` element uses the
//! `params` schema, a `vars` element the `vars` schema). Canonicalization
//! rewrites a tree into that order before emission.

use std::fmt;
use std::str::FromStr;

use indexmap::IndexMap;

use crate::error::MapError;
use crate::value::Value;

/// A database category. Selects the file name and the field schema.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Category {
    /// Executable code symbols.
    Code,
    /// Initialized data symbols in the image.
    Data,
    /// Runtime working-memory symbols.
    Ram,
    /// User-defined structure layouts.
    Structs,
    /// Named-constant groups.
    Enums,
}

impl Category {
    /// All categories, in conventional listing order.
    pub const ALL: [Category; 5] = [
        Category::Code,
        Category::Data,
        Category::Enums,
        Category::Ram,
        Category::Structs,
    ];

    /// Category name; also the schema key and the database file stem.
    pub fn name(&self) -> &'static str {
        match self {
            Category::Code => "code",
            Category::Data => "data",
            Category::Ram => "ram",
            Category::Structs => "structs",
            Category::Enums => "enums",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Category {
    type Err = MapError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "code" => Ok(Category::Code),
            "data" => Ok(Category::Data),
            "ram" => Ok(Category::Ram),
            "structs" => Ok(Category::Structs),
            "enums" => Ok(Category::Enums),
            _ => Err(MapError::schema(format!("unknown category: {s}"))),
        }
    }
}

const CODE_FIELDS: &[&str] = &[
    "desc", "label", "addr", "size", "mode", "params", "return", "notes",
];
const DATA_FIELDS: &[&str] = &["desc", "label", "type", "addr", "size", "count", "enum"];
const STRUCT_FIELDS: &[&str] = &["size", "vars"];
const ENUM_FIELDS: &[&str] = &["desc", "val"];
const VAR_FIELDS: &[&str] = &["desc", "type", "offset", "size", "count", "enum"];
const CODE_VAR_FIELDS: &[&str] = &["desc", "type", "enum"];

/// The field schema for a schema key, or `None` for keys without one.
///
/// Schema keys are category names plus the nested field names that carry
/// their own record shape.
pub fn schema_for(key: &str) -> Option<&'static [&'static str]> {
    match key {
        "code" => Some(CODE_FIELDS),
        "data" | "ram" => Some(DATA_FIELDS),
        "structs" => Some(STRUCT_FIELDS),
        "enums" => Some(ENUM_FIELDS),
        "vars" => Some(VAR_FIELDS),
        "params" | "return" => Some(CODE_VAR_FIELDS),
        _ => None,
    }
}

/// Rewrite a database tree into canonical field order.
///
/// Sequence databases order each record by the category schema. Mapping
/// databases (structs, enums) additionally serialize their entries in
/// ascending name order; the entry values themselves use the category
/// schema, not the entry name.
pub fn canonicalize_db(top: &Value, category: Category) -> Value {
    match top {
        Value::Sequence(items) => Value::Sequence(
            items
                .iter()
                .map(|item| canonicalize_node(item, category.name()))
                .collect(),
        ),
        Value::Mapping(entries) => {
            let mut names: Vec<&String> = entries.keys().collect();
            names.sort();
            let mut out = IndexMap::new();
            for name in names {
                out.insert(name.clone(), canonicalize_node(&entries[name], category.name()));
            }
            Value::Mapping(out)
        }
        other => other.clone(),
    }
}

/// Canonicalize one node under the given schema key.
fn canonicalize_node(value: &Value, key: &str) -> Value {
    match value {
        Value::Mapping(fields) => {
            let mut out = IndexMap::new();
            if let Some(schema) = schema_for(key) {
                for &field in schema {
                    if let Some(v) = fields.get(field) {
                        out.insert(field.to_string(), canonicalize_node(v, field));
                    }
                }
            }
            // Fields outside the schema keep a deterministic trailing order.
            let mut rest: Vec<&String> = fields
                .keys()
                .filter(|name| !out.contains_key(name.as_str()))
                .collect();
            rest.sort();
            for name in rest {
                out.insert(name.clone(), canonicalize_node(&fields[name], name));
            }
            Value::Mapping(out)
        }
        Value::Sequence(items) => Value::Sequence(
            items
                .iter()
                .map(|item| canonicalize_node(item, key))
                .collect(),
        ),
        Value::PerRegion(map) => Value::PerRegion(
            map.iter()
                .map(|(region, v)| (*region, canonicalize_node(v, region.name())))
                .collect(),
        ),
        scalar => scalar.clone(),
    }
}
