//! # romatlas-cdecl
//!
//! Declaration analysis for ROM map databases. Reads preprocessed C
//! translation units and enriches the symbol registry in two passes:
//! fact extraction over the parsed declarations, then a guarded merge
//! into the registry and the named-constant table.

pub mod ast;
pub mod enrich;
pub mod facts;
pub mod lexer;
pub mod parser;

pub use ast::{
    Declaration, EnumDef, Enumerator, FunctionDef, Item, ParamDecl, TranslationUnit, TypeRef,
};
pub use enrich::apply_facts;
pub use facts::{extract_facts, Fact};
pub use lexer::{ParseError, ParseResult};
pub use parser::parse_translation_unit;
