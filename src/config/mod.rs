//! Configuration: YAML schema and multi-source loader.

pub mod loader;
pub mod schema;
