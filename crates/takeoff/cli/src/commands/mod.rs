//! CLI subcommands

pub mod eval;
pub mod generate;
pub mod replay;
pub mod rules;
