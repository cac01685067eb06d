//! Subcommands.

pub mod config;
pub mod convert;
