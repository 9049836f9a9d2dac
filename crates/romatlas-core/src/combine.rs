//! Multi-source database combination.
//!
//! A category database may be split across several files; `combine` folds
//! the parsed parts into one tree. Sequences concatenate, mappings union
//! with later parts overwriting earlier keys, and anything else is a shape
//! mismatch. Combined sequences are then stably sorted by address.

use std::cmp::Ordering;

use crate::error::{MapError, MapResult};
use crate::value::{Region, Value};

/// Merge partial databases of one category into a single tree.
pub fn combine(parts: Vec<Value>) -> MapResult<Value> {
    let mut parts = parts.into_iter();
    let mut combined = parts
        .next()
        .ok_or_else(|| MapError::schema("nothing to combine"))?;
    for part in parts {
        combined = match (combined, part) {
            (Value::Sequence(mut items), Value::Sequence(more)) => {
                items.extend(more);
                Value::Sequence(items)
            }
            (Value::Mapping(mut entries), Value::Mapping(more)) => {
                for (key, value) in more {
                    entries.insert(key, value);
                }
                Value::Mapping(entries)
            }
            (left, right) => {
                return Err(MapError::CombineMismatch {
                    left: left.shape(),
                    right: right.shape(),
                })
            }
        };
    }
    if let Value::Sequence(items) = &mut combined {
        sort_by_addr(items)?;
    }
    Ok(combined)
}

/// Stable sort of record entries by address.
fn sort_by_addr(items: &mut [Value]) -> MapResult<()> {
    // Every entry must carry an addr before the comparator runs.
    for entry in items.iter() {
        if entry.get("addr").is_none() {
            return Err(MapError::schema("record entry without addr"));
        }
    }
    items.sort_by(|a, b| {
        let a = a.get("addr").unwrap();
        let b = b.get("addr").unwrap();
        compare_addrs(a, b)
    });
    Ok(())
}

/// Region-aware address comparison.
///
/// Scalar addresses compare numerically and act as defined for every
/// region against a per-region address. Two per-region addresses compare
/// on the first region (in canonical order) present in both; entries with
/// no common region compare equal, which keeps their input order under the
/// stable sort.
fn compare_addrs(a: &Value, b: &Value) -> Ordering {
    if let (Value::Int(x), Value::Int(y)) = (a, b) {
        return x.cmp(y);
    }
    for region in Region::ALL {
        if let (Some(x), Some(y)) = (region_addr(a, region), region_addr(b, region)) {
            return x.cmp(&y);
        }
    }
    Ordering::Equal
}

fn region_addr(addr: &Value, region: Region) -> Option<i64> {
    match addr {
        Value::Int(n) => Some(*n),
        Value::PerRegion(map) => map.get(&region).and_then(Value::as_int),
        _ => None,
    }
}
