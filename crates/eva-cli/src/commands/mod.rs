//! CLI subcommand implementations.

pub mod session;
pub mod status;
pub mod track;
pub mod tracking;
