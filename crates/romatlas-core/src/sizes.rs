//! Per-region size resolution for database records.
//!
//! A record's byte size per region comes from, in priority order: an
//! explicit `size` field, absence of a `type` (size unknown, zero), or the
//! type's element size multiplied by `count`. Element sizes come from a
//! fixed primitive table or from the declared size of a user-defined
//! structure.

use std::collections::BTreeMap;

use indexmap::IndexMap;

use crate::error::{MapError, MapResult};
use crate::value::{Region, Value};

/// Byte sizes of the primitive type names.
const TYPE_SIZES: &[(&str, i64)] = &[
    ("u8", 1),
    ("s8", 1),
    ("flags8", 1),
    ("bool", 1),
    ("u16", 2),
    ("s16", 2),
    ("flags16", 2),
    ("char", 2),
    ("u32", 4),
    ("s32", 4),
    ("ptr", 4),
    ("palette", 32),
];

/// Element size of a type name against the structs database.
///
/// A trailing `.qualifier` is stripped before lookup. A name that is
/// neither a primitive nor a defined structure is an invalid-type error.
pub fn type_size(type_name: &str, structs: &IndexMap<String, Value>) -> MapResult<i64> {
    let base = type_name.split('.').next().unwrap_or(type_name);
    if let Some(&(_, size)) = TYPE_SIZES.iter().find(|(name, _)| *name == base) {
        return Ok(size);
    }
    if let Some(def) = structs.get(base) {
        return match def.get("size") {
            Some(Value::Int(size)) => Ok(*size),
            Some(other) => Err(MapError::schema(format!(
                "struct {base} size is {}, expected a scalar integer",
                other.shape()
            ))),
            None => Err(MapError::schema(format!("struct {base} has no size"))),
        };
    }
    Err(MapError::InvalidType(type_name.to_string()))
}

/// Resolve a record's byte size for every region it applies to.
///
/// The applicable regions are the keys of a per-region `addr`, or all
/// recognized regions otherwise. An explicit per-region `size` or `count`
/// is returned over its own keys; scalars broadcast over the applicable
/// regions.
pub fn entry_size(
    entry: &Value,
    structs: &IndexMap<String, Value>,
) -> MapResult<BTreeMap<Region, i64>> {
    let regions: Vec<Region> = match entry.get("addr") {
        Some(Value::PerRegion(map)) => map.keys().copied().collect(),
        _ => Region::ALL.to_vec(),
    };

    if let Some(size) = entry.get("size") {
        return spread(size, &regions, "size");
    }

    let type_name = match entry.get("type") {
        Some(Value::Str(name)) => name,
        Some(other) => {
            return Err(MapError::schema(format!(
                "type field is {}, expected a string",
                other.shape()
            )))
        }
        None => return Ok(regions.iter().map(|&r| (r, 0)).collect()),
    };

    let element = type_size(type_name, structs)?;
    let counts = match entry.get("count") {
        Some(count) => spread(count, &regions, "count")?,
        None => regions.iter().map(|&r| (r, 1)).collect(),
    };
    Ok(counts
        .into_iter()
        .map(|(region, count)| (region, count * element))
        .collect())
}

/// Broadcast a scalar over the applicable regions, or take a per-region
/// value over its own keys.
fn spread(value: &Value, regions: &[Region], field: &str) -> MapResult<BTreeMap<Region, i64>> {
    match value {
        Value::Int(n) => Ok(regions.iter().map(|&r| (r, *n)).collect()),
        Value::PerRegion(map) => map
            .iter()
            .map(|(&region, v)| match v {
                Value::Int(n) => Ok((region, *n)),
                other => Err(MapError::schema(format!(
                    "{field} for region {region} is {}, expected an integer",
                    other.shape()
                ))),
            })
            .collect(),
        other => Err(MapError::schema(format!(
            "{field} field is {}, expected an integer",
            other.shape()
        ))),
    }
}
