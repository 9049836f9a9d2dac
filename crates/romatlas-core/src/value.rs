//! Value model for map databases.
//!
//! Every node of a database file is one of five shapes:
//! - a scalar integer or string
//! - a per-region mapping, for values that differ between releases
//! - an ordered field mapping (one record or definition)
//! - a sequence of values
//!
//! Field order inside a `Mapping` is insertion order; equality between
//! mappings ignores order, which is what round-trip validation compares.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use indexmap::IndexMap;

/// Release region of a ROM image.
///
/// The variant order is the canonical serialization order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Region {
    /// Japanese release.
    J,
    /// North American release.
    U,
    /// European release.
    E,
}

impl Region {
    /// All recognized regions, in canonical order.
    pub const ALL: [Region; 3] = [Region::J, Region::U, Region::E];

    /// Region key as it appears in database files.
    pub fn name(&self) -> &'static str {
        match self {
            Region::J => "J",
            Region::U => "U",
            Region::E => "E",
        }
    }
}

impl fmt::Display for Region {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Region {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "J" => Ok(Region::J),
            "U" => Ok(Region::U),
            "E" => Ok(Region::E),
            _ => Err(format!("unknown region: {s}")),
        }
    }
}

/// A node in a map database tree.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    /// Scalar integer (addresses, sizes, counts, enumerator values).
    Int(i64),
    /// Scalar string (descriptions, labels, type names).
    Str(String),
    /// A value that differs per region.
    PerRegion(BTreeMap<Region, Value>),
    /// An ordered set of named fields.
    Mapping(IndexMap<String, Value>),
    /// An ordered list of values.
    Sequence(Vec<Value>),
}

impl Value {
    /// Create an empty mapping.
    pub fn mapping() -> Value {
        Value::Mapping(IndexMap::new())
    }

    /// Create an empty sequence.
    pub fn sequence() -> Value {
        Value::Sequence(Vec::new())
    }

    /// Short name of the value's shape, for diagnostics.
    pub fn shape(&self) -> &'static str {
        match self {
            Value::Int(_) => "integer",
            Value::Str(_) => "string",
            Value::PerRegion(_) => "per-region mapping",
            Value::Mapping(_) => "mapping",
            Value::Sequence(_) => "sequence",
        }
    }

    pub fn as_int(&self) -> Option<i64> {
        match self {
            Value::Int(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Str(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_per_region(&self) -> Option<&BTreeMap<Region, Value>> {
        match self {
            Value::PerRegion(map) => Some(map),
            _ => None,
        }
    }

    pub fn as_mapping(&self) -> Option<&IndexMap<String, Value>> {
        match self {
            Value::Mapping(fields) => Some(fields),
            _ => None,
        }
    }

    pub fn as_mapping_mut(&mut self) -> Option<&mut IndexMap<String, Value>> {
        match self {
            Value::Mapping(fields) => Some(fields),
            _ => None,
        }
    }

    pub fn as_sequence(&self) -> Option<&[Value]> {
        match self {
            Value::Sequence(items) => Some(items),
            _ => None,
        }
    }

    /// Field lookup on a mapping value; `None` for any other shape.
    pub fn get(&self, field: &str) -> Option<&Value> {
        self.as_mapping().and_then(|fields| fields.get(field))
    }
}

impl From<i64> for Value {
    fn from(n: i64) -> Self {
        Value::Int(n)
    }
}

impl From<u64> for Value {
    fn from(n: u64) -> Self {
        Value::Int(n as i64)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::Str(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::Str(s)
    }
}

impl From<Vec<Value>> for Value {
    fn from(items: Vec<Value>) -> Self {
        Value::Sequence(items)
    }
}
