//! One-hop callers and callees of a node.

use rusqlite::params;
use serde::Serialize;

use crate::db::converters::{row_to_node, NODE_COLUMNS_N};
use crate::db::store::{query_rows, GraphStore};
use crate::error::Result;
use crate::graph::{require_id, require_node};
use crate::types::Node;

/// Upper bound on each side of the neighborhood.
pub const MAX_NEIGHBORS: usize = 50;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Caller,
    Callee,
}

/// A neighbor node tagged with its relation to the center.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Neighbor {
    #[serde(flatten)]
    pub node: Node,
    pub role: Role,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Neighborhood {
    pub center: Node,
    pub callers: Vec<Neighbor>,
    pub callees: Vec<Neighbor>,
}

/// The center node plus its direct call-graph neighbors.
///
/// Only function and method neighbors are returned, each at most once,
/// ordered by name then id.
pub fn neighborhood(store: &GraphStore, id: &str) -> Result<Neighborhood> {
    let id = require_id(id)?;
    store.with_connection(|conn| {
        let center = require_node(conn, id)?;

        let callees_sql = format!(
            "SELECT DISTINCT {NODE_COLUMNS_N} FROM edges e \
             JOIN nodes n ON n.id = e.target \
             WHERE e.source = ?1 AND e.kind = 'call' AND n.kind IN ('function', 'method') \
             ORDER BY n.name, n.id \
             LIMIT ?2"
        );
        let callers_sql = format!(
            "SELECT DISTINCT {NODE_COLUMNS_N} FROM edges e \
             JOIN nodes n ON n.id = e.source \
             WHERE e.target = ?1 AND e.kind = 'call' AND n.kind IN ('function', 'method') \
             ORDER BY n.name, n.id \
             LIMIT ?2"
        );

        let cap = MAX_NEIGHBORS as i64;
        let callees = query_rows(conn, &callees_sql, params![id, cap], |row| {
            Ok(Neighbor {
                node: row_to_node(row)?,
                role: Role::Callee,
            })
        })?;
        let callers = query_rows(conn, &callers_sql, params![id, cap], |row| {
            Ok(Neighbor {
                node: row_to_node(row)?,
                role: Role::Caller,
            })
        })?;

        tracing::debug!(
            id,
            callers = callers.len(),
            callees = callees.len(),
            "neighborhood"
        );
        Ok(Neighborhood {
            center,
            callers,
            callees,
        })
    })
}
