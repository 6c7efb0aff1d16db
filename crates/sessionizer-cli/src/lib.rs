//! Sessionizer CLI library.
//!
//! Argument parsing, the fuzzy picker and the subcommand handlers behind the
//! `sessionizer` binary.

pub mod cli;
pub mod commands;
pub mod picker;
