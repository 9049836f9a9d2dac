//! # romatlas-elf
//!
//! Binary metadata extraction for ROM map databases. Drives the cross
//! toolchain's `readelf`/`nm` against a linked image and turns their
//! listings into the symbol registry: classified map kinds, inferred
//! sizes, and execution modes.

pub mod error;
pub mod listing;
pub mod tools;

pub use error::{ExtractError, ExtractResult};
pub use listing::{
    parse_section_listing, parse_symbol_listing, SectionInfo, SectionTable, RECOGNIZED_SECTIONS,
};
pub use tools::{Toolchain, DEFAULT_PREFIX, TOOLCHAIN_ENV};

use std::path::Path;

use romatlas_core::SymbolTable;
use tracing::info;

/// Run the introspection tools against an image and build the registry.
pub fn load_image(toolchain: &Toolchain, image: &Path) -> ExtractResult<(SectionTable, SymbolTable)> {
    let sections = parse_section_listing(&toolchain.section_listing(image)?)?;
    let symbols = parse_symbol_listing(&toolchain.symbol_listing(image)?, &sections)?;
    info!(
        image = %image.display(),
        sections = sections.len(),
        symbols = symbols.len(),
        "loaded binary metadata"
    );
    Ok((sections, symbols))
}
