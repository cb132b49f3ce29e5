//! cpgview: read-only query engine over a prebuilt code property graph.
//!
//! Turns a large persisted call graph (a SQLite file written by an external
//! ingestion pipeline) into small, deterministic, renderable results: name
//! search, one-hop neighborhoods, bounded call chains, pruned package graphs,
//! and passthrough of precomputed summaries. Served over HTTP by [`server`]
//! and from the command line by [`cli`].

pub mod cli;
pub mod config;
pub mod db;
pub mod error;
pub mod graph;
pub mod observability;
pub mod server;
pub mod types;

pub use db::store::GraphStore;
pub use error::{CpgError, Result};
