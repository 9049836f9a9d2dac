//! Parsers for the introspection tool listings.
//!
//! The section listing is the `readelf -S` table; the symbol listing is
//! the `nm` sysv table, pre-sorted by address. Both have an exact shape,
//! and any deviation is fatal. The symbol pass builds the registry:
//! section-based classification, size inference from the next listed
//! entry, and execution-mode assignment from the symbol name.

use indexmap::IndexMap;
use regex::Regex;
use romatlas_core::{ExecMode, MapKind, Symbol, SymbolTable};
use tracing::debug;

use crate::error::{ExtractError, ExtractResult};

/// The sections that contribute symbols, by listing name.
pub const RECOGNIZED_SECTIONS: [&str; 3] = ["ROM", "EWRAM", "IWRAM"];

/// Symbol-name prefixes that mark wide-encoding code regions.
const ARM_PREFIXES: [&str; 2] = ["ARM_", "IRAMARM_"];

/// Address and byte extent of one section.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SectionInfo {
    pub addr: u64,
    pub size: u64,
}

impl SectionInfo {
    /// One past the last address of the section.
    pub fn end(&self) -> u64 {
        self.addr + self.size
    }
}

/// Section name to extent, in listing order.
#[derive(Debug, Clone, Default)]
pub struct SectionTable {
    sections: IndexMap<String, SectionInfo>,
}

impl SectionTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, name: impl Into<String>, info: SectionInfo) {
        self.sections.insert(name.into(), info);
    }

    pub fn get(&self, name: &str) -> Option<&SectionInfo> {
        self.sections.get(name)
    }

    pub fn len(&self) -> usize {
        self.sections.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sections.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &SectionInfo)> {
        self.sections.iter().map(|(name, info)| (name.as_str(), info))
    }
}

/// Parse the section header listing into a section table.
pub fn parse_section_listing(text: &str) -> ExtractResult<SectionTable> {
    let lines: Vec<&str> = text.lines().collect();
    let first = lines.first().copied().unwrap_or_default();
    let count_re = Regex::new(r"(?i)There are (\d+) section headers").unwrap();
    let count: usize = match count_re.captures(first) {
        Some(caps) => caps[1]
            .parse()
            .map_err(|_| ExtractError::MissingSectionCount(first.to_string()))?,
        None => return Err(ExtractError::MissingSectionCount(first.to_string())),
    };

    // Rows start after the two-line column header at lines 3-4; the null
    // section row (index 0) is skipped.
    let row_re =
        Regex::new(r"^\s*\[\s*\d+\]\s+(\S+)\s+\S+\s+([0-9A-Fa-f]+)\s+[0-9A-Fa-f]+\s+([0-9A-Fa-f]+)")
            .unwrap();
    let mut table = SectionTable::new();
    for idx in 5..(4 + count) {
        let line = lines
            .get(idx)
            .ok_or_else(|| ExtractError::section(idx + 1, "section listing truncated"))?;
        let caps = row_re
            .captures(line)
            .ok_or_else(|| ExtractError::section(idx + 1, format!("unrecognized row: {line}")))?;
        let addr = parse_hex(&caps[2])
            .ok_or_else(|| ExtractError::section(idx + 1, "bad address field"))?;
        let size = parse_hex(&caps[3])
            .ok_or_else(|| ExtractError::section(idx + 1, "bad size field"))?;
        table.insert(&caps[1], SectionInfo { addr, size });
    }
    debug!(sections = table.len(), "parsed section listing");
    Ok(table)
}

/// One raw row of the sysv symbol listing.
struct SymbolRow {
    name: String,
    value: u64,
    type_tag: String,
    size: Option<u64>,
    section: String,
    line_hint: String,
}

/// Parse the symbol listing into the symbol registry.
///
/// Size inference for an entry with an empty size column uses the address
/// of the next listed row, whether or not that row's section is
/// recognized, capped at the entry's section end.
pub fn parse_symbol_listing(text: &str, sections: &SectionTable) -> ExtractResult<SymbolTable> {
    let lines: Vec<&str> = text.lines().collect();
    let mut rows = Vec::new();
    // Six header lines precede the rows.
    for (idx, line) in lines.iter().enumerate().skip(6) {
        rows.push(parse_symbol_row(line, idx + 1)?);
    }

    let mut table = SymbolTable::new();
    for (pos, row) in rows.iter().enumerate() {
        if !RECOGNIZED_SECTIONS.contains(&row.section.as_str()) {
            continue;
        }
        let size = match row.size {
            Some(size) => size,
            None => {
                let section = sections.get(&row.section).ok_or_else(|| {
                    ExtractError::symbol(
                        pos + 7,
                        format!("section {} missing from section listing", row.section),
                    )
                })?;
                let mut end = section.end();
                if let Some(next) = rows.get(pos + 1) {
                    end = end.min(next.value);
                }
                end.saturating_sub(row.value)
            }
        };
        let kind = match (row.section.as_str(), row.type_tag.as_str()) {
            ("ROM", "FUNC") => MapKind::Code,
            ("ROM", _) => MapKind::Data,
            _ => MapKind::Ram,
        };
        let mut symbol = Symbol::new(&row.name, kind, row.value, size, &row.line_hint);
        if kind == MapKind::Code && ARM_PREFIXES.iter().any(|p| row.name.starts_with(p)) {
            symbol.mode = Some(ExecMode::Arm);
        }
        table.insert(symbol);
    }
    debug!(symbols = table.len(), "parsed symbol listing");
    Ok(table)
}

fn parse_symbol_row(line: &str, number: usize) -> ExtractResult<SymbolRow> {
    let columns: Vec<&str> = line.split('|').map(str::trim).collect();
    let [name, value, _class, type_tag, size, _line, last] = columns[..] else {
        return Err(ExtractError::symbol(
            number,
            format!("expected 7 columns, got {}", columns.len()),
        ));
    };
    let value = parse_hex(value)
        .ok_or_else(|| ExtractError::symbol(number, format!("bad address: {value}")))?;
    let size = if size.is_empty() {
        None
    } else {
        Some(
            parse_hex(size)
                .ok_or_else(|| ExtractError::symbol(number, format!("bad size: {size}")))?,
        )
    };
    let mut parts = last.split_whitespace();
    let section = parts.next().unwrap_or_default().to_string();
    let line_hint = parts
        .next()
        .map(|path| path.rsplit('/').next().unwrap_or(path).to_string())
        .unwrap_or_default();
    Ok(SymbolRow {
        name: name.to_string(),
        value,
        type_tag: type_tag.split_whitespace().next().unwrap_or_default().to_string(),
        size,
        section,
        line_hint,
    })
}

fn parse_hex(text: &str) -> Option<u64> {
    u64::from_str_radix(text, 16).ok()
}
