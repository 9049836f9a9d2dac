//! Parser for the canonical database text form.
//!
//! The grammar is the block-style subset that `emit` produces: two-space
//! indentation, `key: value` mappings, `-` sequence items (indentless under
//! their key), upper-case `0x` hex integers, and double-quoted strings where
//! plain text would be ambiguous. Comments (`# ...`) and blank lines are
//! accepted and discarded. Tabs in indentation are an error.

use std::collections::BTreeMap;

use indexmap::IndexMap;

use crate::error::{MapError, MapResult};
use crate::value::{Region, Value};

/// Parse a whole database document.
pub fn parse_document(text: &str) -> MapResult<Value> {
    let lines = split_lines(text)?;
    if lines.is_empty() {
        return Err(MapError::parse(1, "empty document"));
    }
    let mut parser = Parser { lines, pos: 0 };
    let value = parser.parse_node()?;
    if let Some(line) = parser.peek() {
        return Err(MapError::parse(line.number, "misaligned indentation"));
    }
    Ok(value)
}

struct Line {
    number: usize,
    indent: usize,
    content: String,
}

/// Strip comments and blanks; measure indentation.
fn split_lines(text: &str) -> MapResult<Vec<Line>> {
    let mut out = Vec::new();
    for (idx, raw) in text.lines().enumerate() {
        let number = idx + 1;
        let mut indent = 0;
        for ch in raw.chars() {
            match ch {
                ' ' => indent += 1,
                '\t' => return Err(MapError::parse(number, "tab in indentation")),
                _ => break,
            }
        }
        let body = strip_comment(&raw[indent..]);
        let body = body.trim_end();
        if body.is_empty() {
            continue;
        }
        out.push(Line {
            number,
            indent,
            content: body.to_string(),
        });
    }
    Ok(out)
}

/// Cut an unquoted `#` comment from a line body.
fn strip_comment(body: &str) -> &str {
    let mut in_quotes = false;
    let mut escaped = false;
    let mut prev_is_space = true;
    for (pos, ch) in body.char_indices() {
        if in_quotes {
            if escaped {
                escaped = false;
            } else if ch == '\\' {
                escaped = true;
            } else if ch == '"' {
                in_quotes = false;
            }
        } else if ch == '"' {
            in_quotes = true;
        } else if ch == '#' && prev_is_space {
            return &body[..pos];
        }
        prev_is_space = ch.is_whitespace();
    }
    body
}

struct Parser {
    lines: Vec<Line>,
    pos: usize,
}

impl Parser {
    fn peek(&self) -> Option<&Line> {
        self.lines.get(self.pos)
    }

    fn advance(&mut self) {
        self.pos += 1;
    }

    fn parse_node(&mut self) -> MapResult<Value> {
        let line = match self.peek() {
            Some(line) => line,
            None => return Err(MapError::parse(0, "unexpected end of document")),
        };
        if is_dash(&line.content) {
            let indent = line.indent;
            self.parse_sequence(indent)
        } else if !line.content.starts_with('"') && has_key_marker(&line.content) {
            let indent = line.indent;
            self.parse_mapping(indent)
        } else {
            let number = line.number;
            let content = line.content.clone();
            self.advance();
            parse_scalar(&content, number)
        }
    }

    fn parse_sequence(&mut self, indent: usize) -> MapResult<Value> {
        let mut items = Vec::new();
        while let Some(line) = self.peek() {
            if line.indent != indent || !is_dash(&line.content) {
                break;
            }
            let number = line.number;
            if line.content == "-" {
                self.advance();
                match self.peek() {
                    Some(next) if next.indent > indent => items.push(self.parse_node()?),
                    _ => return Err(MapError::parse(number, "sequence item has no content")),
                }
            } else {
                // Inline form: the rest of the line is the start of the item,
                // positioned past the dash.
                let rest = &line.content[1..];
                let pad = rest.len() - rest.trim_start().len();
                let item_indent = indent + 1 + pad;
                let content = rest.trim_start().to_string();
                self.lines[self.pos] = Line {
                    number,
                    indent: item_indent,
                    content,
                };
                items.push(self.parse_node()?);
            }
        }
        Ok(Value::Sequence(items))
    }

    fn parse_mapping(&mut self, indent: usize) -> MapResult<Value> {
        let mut fields: IndexMap<String, Value> = IndexMap::new();
        while let Some(line) = self.peek() {
            if line.indent != indent
                || is_dash(&line.content)
                || line.content.starts_with('"')
                || !has_key_marker(&line.content)
            {
                break;
            }
            let number = line.number;
            let (key, rest) = split_key(&line.content, number)?;
            if fields.contains_key(&key) {
                return Err(MapError::parse(number, format!("duplicate field `{key}`")));
            }
            self.advance();
            let value = match rest {
                Some(text) => parse_scalar(&text, number)?,
                None => match self.peek() {
                    Some(next) if next.indent > indent => self.parse_node()?,
                    Some(next) if next.indent == indent && is_dash(&next.content) => {
                        self.parse_sequence(indent)?
                    }
                    _ => {
                        return Err(MapError::parse(
                            number,
                            format!("missing value for `{key}`"),
                        ))
                    }
                },
            };
            fields.insert(key, value);
        }
        Ok(promote_regions(fields))
    }
}

fn is_dash(content: &str) -> bool {
    content == "-" || content.starts_with("- ")
}

fn has_key_marker(content: &str) -> bool {
    content.ends_with(':') || content.contains(": ")
}

/// Split `key: value` or `key:` into key and optional inline value.
fn split_key(content: &str, number: usize) -> MapResult<(String, Option<String>)> {
    let (key, rest) = match content.find(": ") {
        Some(pos) => (&content[..pos], Some(content[pos + 2..].trim_start().to_string())),
        None => match content.strip_suffix(':') {
            Some(key) => (key, None),
            None => return Err(MapError::parse(number, "expected `key: value`")),
        },
    };
    if key.is_empty() || key.contains(':') {
        return Err(MapError::parse(number, format!("bad field name `{key}`")));
    }
    Ok((key.to_string(), rest))
}

/// A mapping whose keys are all region names is a per-region value.
fn promote_regions(fields: IndexMap<String, Value>) -> Value {
    if !fields.is_empty() && fields.keys().all(|k| k.parse::<Region>().is_ok()) {
        let mut map = BTreeMap::new();
        for (key, value) in fields {
            if let Ok(region) = key.parse::<Region>() {
                map.insert(region, value);
            }
        }
        return Value::PerRegion(map);
    }
    Value::Mapping(fields)
}

fn parse_scalar(text: &str, number: usize) -> MapResult<Value> {
    if text == "[]" {
        return Ok(Value::sequence());
    }
    if text == "{}" {
        return Ok(Value::mapping());
    }
    if text.starts_with('"') {
        return parse_quoted(text, number);
    }
    if is_int_literal(text) {
        return parse_int(text, number);
    }
    Ok(Value::Str(text.to_string()))
}

pub(crate) fn is_int_literal(text: &str) -> bool {
    let digits = text.strip_prefix('-').unwrap_or(text);
    if let Some(hex) = digits.strip_prefix("0x").or_else(|| digits.strip_prefix("0X")) {
        return !hex.is_empty() && hex.chars().all(|c| c.is_ascii_hexdigit());
    }
    !digits.is_empty() && digits.chars().all(|c| c.is_ascii_digit())
}

fn parse_int(text: &str, number: usize) -> MapResult<Value> {
    let (negative, digits) = match text.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, text),
    };
    let parsed = match digits.strip_prefix("0x").or_else(|| digits.strip_prefix("0X")) {
        Some(hex) => u64::from_str_radix(hex, 16).map_err(|_| ()),
        None => digits.parse::<u64>().map_err(|_| ()),
    };
    let magnitude =
        parsed.map_err(|_| MapError::parse(number, format!("integer out of range: {text}")))?;
    let value = if negative {
        if magnitude > (i64::MAX as u64) + 1 {
            return Err(MapError::parse(number, format!("integer out of range: {text}")));
        }
        (magnitude as i64).wrapping_neg()
    } else {
        if magnitude > i64::MAX as u64 {
            return Err(MapError::parse(number, format!("integer out of range: {text}")));
        }
        magnitude as i64
    };
    Ok(Value::Int(value))
}

fn parse_quoted(text: &str, number: usize) -> MapResult<Value> {
    let mut chars = text.char_indices().skip(1);
    let mut out = String::new();
    while let Some((pos, ch)) = chars.next() {
        match ch {
            '"' => {
                let rest = &text[pos + 1..];
                if !rest.trim().is_empty() {
                    return Err(MapError::parse(number, "trailing text after quoted string"));
                }
                return Ok(Value::Str(out));
            }
            '\\' => match chars.next() {
                Some((_, 'n')) => out.push('\n'),
                Some((_, 't')) => out.push('\t'),
                Some((_, 'r')) => out.push('\r'),
                Some((_, '"')) => out.push('"'),
                Some((_, '\\')) => out.push('\\'),
                Some((_, other)) => {
                    return Err(MapError::parse(number, format!("bad escape `\\{other}`")))
                }
                None => return Err(MapError::parse(number, "unterminated string")),
            },
            _ => out.push(ch),
        }
    }
    Err(MapError::parse(number, "unterminated string"))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn field<'a>(value: &'a Value, name: &str) -> &'a Value {
        value.get(name).unwrap()
    }

    #[test]
    fn test_parse_record_sequence() {
        let text = "\
-
  desc: EntryPoint
  label: EntryPoint
  addr: 0x8000000
  size: 0xC0
  mode: thumb
  line: crt0.s:12
-
  desc: Main
  addr: 0x80000C0
";
        let doc = parse_document(text).unwrap();
        let items = doc.as_sequence().unwrap();
        assert_eq!(items.len(), 2);
        assert_eq!(field(&items[0], "addr"), &Value::Int(0x800_0000));
        assert_eq!(field(&items[0], "mode"), &Value::from("thumb"));
        assert_eq!(field(&items[0], "line"), &Value::from("crt0.s:12"));
        assert_eq!(field(&items[1], "desc"), &Value::from("Main"));
    }

    #[test]
    fn test_parse_nested_sequence_inline_items() {
        let text = "\
-
  desc: DoThing
  params:
  - desc: item
    type: u16
  - desc: flags
    type: u8
  return:
    desc: result
    type: s8
";
        let doc = parse_document(text).unwrap();
        let entry = &doc.as_sequence().unwrap()[0];
        let params = field(entry, "params").as_sequence().unwrap();
        assert_eq!(params.len(), 2);
        assert_eq!(field(&params[1], "type"), &Value::from("u8"));
        let ret = field(entry, "return");
        assert_eq!(field(ret, "desc"), &Value::from("result"));
    }

    #[test]
    fn test_parse_per_region_promotion() {
        let text = "\
-
  desc: gUnits
  addr:
    J: 0x2000100
    U: 0x2000120
";
        let doc = parse_document(text).unwrap();
        let addr = field(&doc.as_sequence().unwrap()[0], "addr");
        let map = addr.as_per_region().unwrap();
        assert_eq!(map.get(&Region::J), Some(&Value::Int(0x200_0100)));
        assert_eq!(map.get(&Region::U), Some(&Value::Int(0x200_0120)));
        assert_eq!(map.get(&Region::E), None);
    }

    #[test]
    fn test_parse_top_level_mapping() {
        let text = "\
ArenaData:
  size: 0x30
  vars:
  - desc: unk_00
    type: u16
    offset: 0x0
Unit:
  size: 0x48
";
        let doc = parse_document(text).unwrap();
        let entries = doc.as_mapping().unwrap();
        assert_eq!(entries.len(), 2);
        let arena = &entries["ArenaData"];
        assert_eq!(field(arena, "size"), &Value::Int(0x30));
        let vars = field(arena, "vars").as_sequence().unwrap();
        assert_eq!(field(&vars[0], "offset"), &Value::Int(0));
    }

    #[test]
    fn test_parse_indentless_sequence_under_key() {
        let text = "\
weapon_ranks:
- desc: WPN_LEVEL_E
  val: 0x1
- desc: WPN_LEVEL_D
  val: 0x1F
other:
- desc: X
  val: 0x0
";
        let doc = parse_document(text).unwrap();
        let groups = doc.as_mapping().unwrap();
        assert_eq!(groups["weapon_ranks"].as_sequence().unwrap().len(), 2);
        assert_eq!(groups["other"].as_sequence().unwrap().len(), 1);
    }

    #[test]
    fn test_parse_scalars() {
        assert_eq!(parse_scalar("0x1F", 1).unwrap(), Value::Int(31));
        assert_eq!(parse_scalar("-0x10", 1).unwrap(), Value::Int(-16));
        assert_eq!(parse_scalar("42", 1).unwrap(), Value::Int(42));
        assert_eq!(parse_scalar("-7", 1).unwrap(), Value::Int(-7));
        assert_eq!(parse_scalar("u8 [4]", 1).unwrap(), Value::from("u8 [4]"));
        assert_eq!(parse_scalar("[]", 1).unwrap(), Value::sequence());
        assert_eq!(parse_scalar("{}", 1).unwrap(), Value::mapping());
        assert_eq!(
            parse_scalar("\"0x10\"", 1).unwrap(),
            Value::from("0x10"),
            "quoted numbers stay strings"
        );
        assert_eq!(
            parse_scalar("\"a \\\"b\\\" c\"", 1).unwrap(),
            Value::from("a \"b\" c")
        );
    }

    #[test]
    fn test_parse_comments_and_blanks() {
        let text = "\
# generated database
-
  desc: Foo # trailing note

  addr: 0x10
";
        let doc = parse_document(text).unwrap();
        let entry = &doc.as_sequence().unwrap()[0];
        assert_eq!(field(entry, "desc"), &Value::from("Foo"));
        assert_eq!(field(entry, "addr"), &Value::Int(0x10));
    }

    #[test]
    fn test_parse_hash_inside_string_kept() {
        let doc = parse_document("desc: \"issue #4\"\n").unwrap();
        assert_eq!(doc.get("desc"), Some(&Value::from("issue #4")));
    }

    #[test]
    fn test_parse_errors() {
        match parse_document("") {
            Err(MapError::Parse { line: 1, .. }) => {}
            other => panic!("expected parse error, got {other:?}"),
        }
        match parse_document("\tdesc: x\n") {
            Err(MapError::Parse { message, .. }) => {
                assert!(message.contains("tab"));
            }
            other => panic!("expected tab error, got {other:?}"),
        }
        match parse_document("desc:\n") {
            Err(MapError::Parse { message, .. }) => {
                assert!(message.contains("missing value"));
            }
            other => panic!("expected missing value error, got {other:?}"),
        }
        match parse_document("desc: a\ndesc: b\n") {
            Err(MapError::Parse { line: 2, message }) => {
                assert!(message.contains("duplicate"));
            }
            other => panic!("expected duplicate field error, got {other:?}"),
        }
        match parse_document("-\n") {
            Err(MapError::Parse { message, .. }) => {
                assert!(message.contains("no content"));
            }
            other => panic!("expected empty item error, got {other:?}"),
        }
    }

    #[test]
    fn test_parse_misaligned_trailing_line() {
        let text = "desc: x\n    stray: y\n";
        match parse_document(text) {
            Err(MapError::Parse { line: 2, .. }) => {}
            other => panic!("expected misalignment error, got {other:?}"),
        }
    }

    #[test]
    fn test_int_literal_recognition() {
        assert!(is_int_literal("0x1A"));
        assert!(is_int_literal("-0x1A"));
        assert!(is_int_literal("123"));
        assert!(!is_int_literal("0x"));
        assert!(!is_int_literal("12abc"));
        assert!(!is_int_literal("thumb"));
        assert!(!is_int_literal("-"));
    }
}
