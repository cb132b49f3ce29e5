//! Database layer: logical schema, row converters, and the read-only store.

pub mod converters;
pub mod schema;
pub mod store;
