//! Command-Line Interface
//!
//! Subcommand implementations and the shared source/provider helpers. The
//! argument surface itself lives in `main.rs`.

pub mod commands;
pub(crate) mod util;
