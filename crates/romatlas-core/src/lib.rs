//! # romatlas-core
//!
//! Core model and pipeline pieces for ROM map databases. This crate
//! defines:
//! - the tagged value model for database trees, with per-region values
//! - database categories and their fixed field schemas
//! - the canonical text emitter and parser (round-trip validated)
//! - multi-source combination and region-aware address sorting
//! - the symbol registry and its projection into record trees
//! - per-region size resolution and the count-expression evaluator
//! - database file I/O and JSON export

pub mod combine;
pub mod constants;
pub mod db;
pub mod emit;
pub mod error;
pub mod expr;
pub mod parse;
pub mod records;
pub mod schema;
pub mod sizes;
pub mod symbol;
pub mod value;

pub use combine::combine;
pub use constants::ConstantTable;
pub use db::{export_json, load_category, load_path, save_database};
pub use emit::serialize_db;
pub use error::{MapError, MapResult};
pub use expr::evaluate;
pub use parse::parse_document;
pub use records::project_records;
pub use schema::{canonicalize_db, schema_for, Category};
pub use sizes::{entry_size, type_size};
pub use symbol::{ExecMode, MapKind, Param, ReturnInfo, Symbol, SymbolTable};
pub use value::{Region, Value};
