//! Subcommand implementations

pub mod dump;
pub mod scan;
pub mod strings;
pub mod verify;
