//! Query engine over the code property graph.
//!
//! Each resolver takes the shared [`GraphStore`], issues parameterized
//! queries, and shapes a bounded, deterministic result. Resolvers never call
//! each other.

pub mod call_chain;
pub mod neighborhood;
pub mod overview;
pub mod packages;
pub mod search;
pub mod source;

use rusqlite::{params, Connection};

use crate::db::converters::{row_to_node, NODE_COLUMNS};
use crate::db::store::query_opt;
use crate::error::{CpgError, Result};
use crate::types::Node;

/// Clamp a caller-supplied count into `1..=max`, using `default` when absent.
pub(crate) fn clamp_limit(requested: Option<i64>, default: usize, max: usize) -> usize {
    match requested {
        None => default,
        Some(n) if n < 1 => 1,
        Some(n) => usize::try_from(n).map_or(max, |n| n.min(max)),
    }
}

/// Clamp a caller-supplied depth into `0..=max`, using `default` when absent.
pub(crate) fn clamp_depth(requested: Option<i64>, default: usize, max: usize) -> usize {
    match requested {
        None => default,
        Some(n) if n < 0 => 0,
        Some(n) => usize::try_from(n).map_or(max, |n| n.min(max)),
    }
}

/// Look up one node by id, failing with [`CpgError::NotFound`].
pub(crate) fn require_node(conn: &Connection, id: &str) -> Result<Node> {
    let sql = format!("SELECT {NODE_COLUMNS} FROM nodes WHERE id = ?1");
    query_opt(conn, &sql, params![id], row_to_node)?
        .ok_or_else(|| CpgError::NotFound(format!("node {id}")))
}

/// Reject a blank node id before touching the store.
pub(crate) fn require_id(id: &str) -> Result<&str> {
    if id.is_empty() {
        return Err(CpgError::InvalidArgument(
            "id query param required".to_string(),
        ));
    }
    Ok(id)
}
