//! Emitter for the canonical database text form.
//!
//! `serialize_db` is the only entry point used by callers: it canonicalizes
//! the tree into schema field order, emits text, then re-parses the text and
//! compares it against the canonical tree before returning. A comparison
//! failure means the emitter and parser disagree about some value, which is
//! an internal defect, never an input problem.
//!
//! Output conventions: two-space indent steps, integers as upper-case `0x`
//! hex, top-level sequence items on their own `-` line with fields beneath
//! (the hand-editing form), nested sequence items inline.

use std::fmt::Write;

use crate::error::{MapError, MapResult};
use crate::parse::{is_int_literal, parse_document};
use crate::schema::{canonicalize_db, Category};
use crate::value::Value;

/// Serialize a database tree to canonical text.
///
/// The returned text is validated by re-parsing before this function
/// returns, so writing it to disk cannot produce a file that loads back
/// differently.
pub fn serialize_db(top: &Value, category: Category) -> MapResult<String> {
    let canonical = canonicalize_db(top, category);
    let text = emit_document(&canonical);
    let reparsed = parse_document(&text).map_err(|_| MapError::Validation {
        category: category.name(),
    })?;
    if reparsed != canonical {
        return Err(MapError::Validation {
            category: category.name(),
        });
    }
    Ok(text)
}

/// Emit a tree without canonicalization or validation.
pub fn emit_document(top: &Value) -> String {
    let mut out = String::new();
    match top {
        Value::Sequence(items) if !items.is_empty() => {
            for item in items {
                out.push_str("-\n");
                emit_block(&mut out, item, 1);
            }
        }
        other => emit_node(&mut out, other, 0),
    }
    out
}

/// Emit a node at top level or under a `key:` line.
fn emit_node(out: &mut String, value: &Value, indent: usize) {
    match value {
        Value::Sequence(items) if !items.is_empty() => {
            for item in items {
                emit_item(out, item, indent);
            }
        }
        Value::Mapping(fields) if !fields.is_empty() => {
            emit_block(out, value, indent);
        }
        Value::PerRegion(map) if !map.is_empty() => {
            emit_block(out, value, indent);
        }
        scalar => {
            pad(out, indent);
            emit_scalar(out, scalar);
            out.push('\n');
        }
    }
}

/// Emit the `key: ...` lines of a mapping or per-region value.
fn emit_block(out: &mut String, value: &Value, indent: usize) {
    let pairs: Vec<(&str, &Value)> = match value {
        Value::Mapping(fields) => fields.iter().map(|(k, v)| (k.as_str(), v)).collect(),
        Value::PerRegion(map) => map.iter().map(|(r, v)| (r.name(), v)).collect(),
        _ => unreachable!("emit_block is only called on mappings"),
    };
    for (key, field) in pairs {
        pad(out, indent);
        out.push_str(key);
        match field {
            Value::Sequence(items) if !items.is_empty() => {
                out.push_str(":\n");
                // Indentless style: items sit at the key's own indent.
                for item in items {
                    emit_item(out, item, indent);
                }
            }
            Value::Mapping(fields) if !fields.is_empty() => {
                out.push_str(":\n");
                emit_block(out, field, indent + 1);
            }
            Value::PerRegion(map) if !map.is_empty() => {
                out.push_str(":\n");
                emit_block(out, field, indent + 1);
            }
            scalar => {
                out.push_str(": ");
                emit_scalar(out, scalar);
                out.push('\n');
            }
        }
    }
}

/// Emit one sequence item in the inline `- ...` form.
fn emit_item(out: &mut String, item: &Value, indent: usize) {
    match item {
        Value::Mapping(fields) if !fields.is_empty() => {
            let mut block = String::new();
            emit_block(&mut block, item, indent + 1);
            splice_dash(out, &block, indent);
        }
        Value::PerRegion(map) if !map.is_empty() => {
            let mut block = String::new();
            emit_block(&mut block, item, indent + 1);
            splice_dash(out, &block, indent);
        }
        Value::Sequence(_) => {
            // Nested bare sequences do not occur in any schema; keep them
            // representable by putting the inner items under the dash.
            out.push_str(&" ".repeat(indent * 2));
            out.push_str("-\n");
            emit_node(out, item, indent + 1);
        }
        scalar => {
            pad(out, indent);
            out.push_str("- ");
            emit_scalar(out, scalar);
            out.push('\n');
        }
    }
}

/// Replace the first item line's indentation with `- ` so the first field
/// shares the dash line.
fn splice_dash(out: &mut String, block: &str, indent: usize) {
    let mut first = true;
    for line in block.lines() {
        if first {
            pad(out, indent);
            out.push_str("- ");
            out.push_str(line.trim_start());
            first = false;
        } else {
            out.push_str(line);
        }
        out.push('\n');
    }
}

fn pad(out: &mut String, indent: usize) {
    for _ in 0..indent {
        out.push_str("  ");
    }
}

fn emit_scalar(out: &mut String, value: &Value) {
    match value {
        Value::Int(n) => {
            if *n < 0 {
                let _ = write!(out, "-0x{:X}", n.unsigned_abs());
            } else {
                let _ = write!(out, "0x{n:X}");
            }
        }
        Value::Str(s) => {
            if needs_quoting(s) {
                emit_quoted(out, s);
            } else {
                out.push_str(s);
            }
        }
        Value::Sequence(items) if items.is_empty() => out.push_str("[]"),
        Value::Mapping(fields) if fields.is_empty() => out.push_str("{}"),
        Value::PerRegion(map) if map.is_empty() => out.push_str("{}"),
        _ => unreachable!("emit_scalar is only called on scalar values"),
    }
}

/// A plain string must not re-parse as anything but itself.
fn needs_quoting(s: &str) -> bool {
    if s.is_empty() || s == "[]" || s == "{}" || is_int_literal(s) {
        return true;
    }
    if s.starts_with(' ') || s.ends_with(' ') || s.starts_with('"') {
        return true;
    }
    if s == "-" || s.starts_with("- ") {
        return true;
    }
    if s.ends_with(':') || s.contains(": ") {
        return true;
    }
    // `#` opens a comment at line start or after whitespace.
    if s.starts_with('#') || s.contains(" #") {
        return true;
    }
    s.chars().any(|c| c.is_control())
}

fn emit_quoted(out: &mut String, s: &str) {
    out.push('"');
    for ch in s.chars() {
        match ch {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\t' => out.push_str("\\t"),
            '\r' => out.push_str("\\r"),
            other => out.push(other),
        }
    }
    out.push('"');
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
    fn test_emit_record_sequence() {
        let db = Value::Sequence(vec![record(&[
            ("desc", Value::from("EntryPoint")),
            ("label", Value::from("EntryPoint")),
            ("addr", Value::Int(0x800_0000)),
            ("size", Value::Int(0xC0)),
            ("mode", Value::from("thumb")),
        ])]);
        let text = serialize_db(&db, Category::Code).unwrap();
        assert_eq!(
            text,
            "-\n  desc: EntryPoint\n  label: EntryPoint\n  addr: 0x8000000\n  size: 0xC0\n  mode: thumb\n"
        );
    }

    #[test]
    fn test_emit_nested_params_inline() {
        let db = Value::Sequence(vec![record(&[
            ("desc", Value::from("DoThing")),
            (
                "params",
                Value::Sequence(vec![
                    record(&[("desc", Value::from("item")), ("type", Value::from("u16"))]),
                    record(&[("desc", Value::from("flags")), ("type", Value::from("u8"))]),
                ]),
            ),
            (
                "return",
                record(&[("desc", Value::from("result")), ("type", Value::from("s8"))]),
            ),
        ])]);
        let text = serialize_db(&db, Category::Code).unwrap();
        assert_eq!(
            text,
            "-\n  desc: DoThing\n  params:\n  - desc: item\n    type: u16\n  - desc: flags\n    type: u8\n  return:\n    desc: result\n    type: s8\n"
        );
    }

    #[test]
    fn test_emit_per_region_address() {
        let mut addr = BTreeMap::new();
        addr.insert(Region::E, Value::Int(0x200_0140));
        addr.insert(Region::J, Value::Int(0x200_0100));
        addr.insert(Region::U, Value::Int(0x200_0120));
        let db = Value::Sequence(vec![record(&[
            ("desc", Value::from("gUnits")),
            ("addr", Value::PerRegion(addr)),
        ])]);
        let text = serialize_db(&db, Category::Data).unwrap();
        assert_eq!(
            text,
            "-\n  desc: gUnits\n  addr:\n    J: 0x2000100\n    U: 0x2000120\n    E: 0x2000140\n"
        );
    }

    #[test]
    fn test_emit_definition_mapping() {
        let mut entries = IndexMap::new();
        entries.insert(
            "Unit".to_string(),
            record(&[
                ("size", Value::Int(0x48)),
                (
                    "vars",
                    Value::Sequence(vec![record(&[
                        ("desc", Value::from("unk_00")),
                        ("type", Value::from("u16")),
                        ("offset", Value::Int(0)),
                    ])]),
                ),
            ]),
        );
        let text = serialize_db(&Value::Mapping(entries), Category::Structs).unwrap();
        assert_eq!(
            text,
            "Unit:\n  size: 0x48\n  vars:\n  - desc: unk_00\n    type: u16\n    offset: 0x0\n"
        );
    }

    #[test]
    fn test_field_order_determinism() {
        // Same logical record, different construction order.
        let a = Value::Sequence(vec![record(&[
            ("size", Value::Int(4)),
            ("desc", Value::from("x")),
            ("addr", Value::Int(0x10)),
        ])]);
        let b = Value::Sequence(vec![record(&[
            ("addr", Value::Int(0x10)),
            ("size", Value::Int(4)),
            ("desc", Value::from("x")),
        ])]);
        let text_a = serialize_db(&a, Category::Data).unwrap();
        let text_b = serialize_db(&b, Category::Data).unwrap();
        assert_eq!(text_a, text_b);
    }

    #[test]
    fn test_emit_quoting() {
        let mut out = String::new();
        emit_scalar(&mut out, &Value::from("plain text"));
        assert_eq!(out, "plain text");

        for tricky in ["", "0x10", "42", "-", "- x", "a: b", "#note", "x #y", "key:", "[]"] {
            let mut out = String::new();
            emit_scalar(&mut out, &Value::from(tricky));
            assert!(out.starts_with('"'), "{tricky:?} should be quoted, got {out}");
        }

        let mut out = String::new();
        emit_scalar(&mut out, &Value::from("a \"b\"\nc"));
        assert_eq!(out, "\"a \\\"b\\\"\\nc\"");
    }

    #[test]
    fn test_emit_negative_int() {
        let mut out = String::new();
        emit_scalar(&mut out, &Value::Int(-16));
        assert_eq!(out, "-0x10");
    }

    #[test]
    fn test_roundtrip_tricky_strings() {
        let db = Value::Sequence(vec![record(&[
            ("desc", Value::from("0x10")),
            ("label", Value::from("a: b #c")),
            ("type", Value::from("u8 [4]")),
            ("addr", Value::Int(0)),
        ])]);
        let text = serialize_db(&db, Category::Data).unwrap();
        let back = parse_document(&text).unwrap();
        assert_eq!(back, canonicalize_db(&db, Category::Data));
    }

    #[test]
    fn test_empty_collections_inline() {
        let db = Value::Sequence(vec![record(&[
            ("desc", Value::from("x")),
            ("params", Value::sequence()),
        ])]);
        let text = serialize_db(&db, Category::Code).unwrap();
        assert_eq!(text, "-\n  desc: x\n  params: []\n");
    }
}
