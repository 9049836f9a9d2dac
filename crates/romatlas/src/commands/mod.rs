//! Command handlers for the romatlas CLI.
//!
//! Each submodule handles one subcommand; the clap surface stays in
//! `main.rs` and hands parsed arguments down here.

pub mod export;
pub mod extract;
pub mod fmt;
pub mod sizes;

pub use export::handle_export;
pub use extract::handle_extract;
pub use fmt::handle_fmt;
pub use sizes::handle_sizes;
