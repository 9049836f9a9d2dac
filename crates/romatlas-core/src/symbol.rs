//! Symbol registry.
//!
//! Symbols are created once, from the binary's linked symbol table, and
//! enriched in place by declaration analysis. The map kind is fixed at
//! creation and never changes; enrichment only ever adds the optional
//! fields.

use std::fmt;
use std::str::FromStr;

use indexmap::IndexMap;

use crate::schema::Category;

/// Which database a symbol belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MapKind {
    /// Executable code in the image.
    Code,
    /// Initialized data in the image.
    Data,
    /// Runtime working memory.
    Ram,
}

impl MapKind {
    /// The three symbol kinds, in extraction output order.
    pub const ALL: [MapKind; 3] = [MapKind::Code, MapKind::Data, MapKind::Ram];

    pub fn name(&self) -> &'static str {
        match self {
            MapKind::Code => "code",
            MapKind::Data => "data",
            MapKind::Ram => "ram",
        }
    }

    /// The database category this kind serializes into.
    pub fn category(&self) -> Category {
        match self {
            MapKind::Code => Category::Code,
            MapKind::Data => Category::Data,
            MapKind::Ram => Category::Ram,
        }
    }
}

impl fmt::Display for MapKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Instruction encoding of a code symbol.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExecMode {
    /// 16-bit encoding; the default for this platform.
    Thumb,
    /// 32-bit encoding, used by a few interrupt-adjacent routines.
    Arm,
}

impl ExecMode {
    pub fn name(&self) -> &'static str {
        match self {
            ExecMode::Thumb => "thumb",
            ExecMode::Arm => "arm",
        }
    }
}

impl fmt::Display for ExecMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for ExecMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "thumb" => Ok(ExecMode::Thumb),
            "arm" => Ok(ExecMode::Arm),
            _ => Err(format!("unknown execution mode: {s}")),
        }
    }
}

/// A formal parameter of a code symbol.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Param {
    /// Parameter name as declared (`...` for varargs).
    pub desc: String,
    /// Rendered type string (`varargs` for varargs).
    pub ty: String,
}

/// Return descriptor of a code symbol with a non-void return type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReturnInfo {
    /// Rendered return type string.
    pub ty: String,
}

/// One entry of the symbol registry.
#[derive(Debug, Clone)]
pub struct Symbol {
    /// Unique symbol name.
    pub name: String,
    /// Map kind, fixed at creation from the originating section.
    pub kind: MapKind,
    /// Absolute address.
    pub addr: u64,
    /// Size in bytes; zero when unknown.
    pub size: u64,
    /// Source file/line hint from the symbol listing, diagnostic only.
    pub line: String,
    /// Instruction encoding; code symbols only.
    pub mode: Option<ExecMode>,
    /// Ordered parameter list from declaration analysis.
    pub params: Option<Vec<Param>>,
    /// Return descriptor from declaration analysis.
    pub ret: Option<ReturnInfo>,
    /// Rendered type string; data/ram symbols only.
    pub ty: Option<String>,
    /// Unevaluated array-count expression from declaration analysis.
    pub count: Option<String>,
}

impl Symbol {
    pub fn new(
        name: impl Into<String>,
        kind: MapKind,
        addr: u64,
        size: u64,
        line: impl Into<String>,
    ) -> Self {
        let mode = match kind {
            MapKind::Code => Some(ExecMode::Thumb),
            _ => None,
        };
        Self {
            name: name.into(),
            kind,
            addr,
            size,
            line: line.into(),
            mode,
            params: None,
            ret: None,
            ty: None,
            count: None,
        }
    }

    pub fn is_code(&self) -> bool {
        self.kind == MapKind::Code
    }
}

/// In-memory registry of symbols keyed by name, in listing (address) order.
#[derive(Debug, Clone, Default)]
pub struct SymbolTable {
    symbols: IndexMap<String, Symbol>,
}

impl SymbolTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a symbol; a repeated name replaces the earlier entry.
    pub fn insert(&mut self, symbol: Symbol) {
        self.symbols.insert(symbol.name.clone(), symbol);
    }

    pub fn get(&self, name: &str) -> Option<&Symbol> {
        self.symbols.get(name)
    }

    pub fn get_mut(&mut self, name: &str) -> Option<&mut Symbol> {
        self.symbols.get_mut(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.symbols.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.symbols.len()
    }

    pub fn is_empty(&self) -> bool {
        self.symbols.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Symbol> {
        self.symbols.values()
    }

    /// Symbols of one kind, in insertion order.
    pub fn of_kind(&self, kind: MapKind) -> impl Iterator<Item = &Symbol> {
        self.symbols.values().filter(move |s| s.kind == kind)
    }
}
