//! Subcommand implementations.

pub mod check;
pub mod keys;
pub mod serve;
pub mod token;
