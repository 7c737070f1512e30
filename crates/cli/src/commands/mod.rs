//! Subcommand implementations

pub mod model;
pub mod predict;
pub mod schema;
