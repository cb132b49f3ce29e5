//! Name search over functions and methods.

use rusqlite::params;

use crate::db::converters::{row_to_node, NODE_COLUMNS};
use crate::db::store::GraphStore;
use crate::error::Result;
use crate::graph::clamp_limit;
use crate::types::Node;

pub const DEFAULT_SEARCH_LIMIT: usize = 30;
pub const MAX_SEARCH_LIMIT: usize = 100;

/// Functions and methods whose name contains `query`, shortest names first.
///
/// Matching is a literal substring test that ignores ASCII case, so `parse`
/// finds `ParseFile` while `%` and `_` carry no wildcard meaning. An empty
/// query matches nothing.
pub fn search_functions(store: &GraphStore, query: &str, limit: Option<i64>) -> Result<Vec<Node>> {
    if query.is_empty() {
        return Ok(Vec::new());
    }
    let limit = clamp_limit(limit, DEFAULT_SEARCH_LIMIT, MAX_SEARCH_LIMIT);

    let sql = format!(
        "SELECT {NODE_COLUMNS} FROM nodes \
         WHERE kind IN ('function', 'method') AND instr(lower(name), lower(?1)) > 0 \
         ORDER BY length(name), name, id \
         LIMIT ?2"
    );
    let nodes = store.query(&sql, params![query, limit as i64], row_to_node)?;
    tracing::debug!(query, results = nodes.len(), "search");
    Ok(nodes)
}
