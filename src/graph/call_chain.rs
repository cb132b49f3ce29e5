//! Bounded transitive call chain from a seed function.
//!
//! Expansion is breadth-first over `call` edges. A node is expanded once, at
//! the level it is first discovered. Every node within `d` hops along some
//! simple path is within `d` hops along a shortest one, so re-expanding a node
//! reached by another route can never add a node or lower a depth. Work is
//! therefore bounded by the size of the reachable subgraph.

use std::collections::hash_map::Entry;
use std::collections::{HashMap, VecDeque};

use rusqlite::{params, params_from_iter, Connection};
use serde::Serialize;

use crate::db::converters::{row_to_node, NODE_COLUMNS};
use crate::db::store::{query_rows, GraphStore};
use crate::error::Result;
use crate::graph::{clamp_depth, require_id, require_node};
use crate::types::{CallEdge, Node};

pub const DEFAULT_CHAIN_DEPTH: usize = 4;
pub const MAX_CHAIN_DEPTH: usize = 8;
/// Maximum number of nodes returned.
pub const MAX_CHAIN_NODES: usize = 80;

/// Ids bound per `IN (...)` lookup.
const ID_CHUNK: usize = 500;

const CALLEES_SQL: &str = "\
SELECT DISTINCT target FROM edges
WHERE source = ?1 AND kind = 'call'
ORDER BY target";

// ---------------------------------------------------------------------------
// Result types
// ---------------------------------------------------------------------------

/// A node reached by the expansion, with the minimum depth it was seen at.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChainNode {
    #[serde(flatten)]
    pub node: Node,
    pub depth: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CallChain {
    pub nodes: Vec<ChainNode>,
    pub edges: Vec<CallEdge>,
}

/// Raw output of [`expand_call_paths`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Expansion {
    /// Every discovered id (seed included) with its minimum depth.
    pub depths: HashMap<String, usize>,
}

// ---------------------------------------------------------------------------
// Expansion
// ---------------------------------------------------------------------------

/// Breadth-first expansion from `seed` up to `max_depth` hops.
///
/// `callees` is asked for the direct call targets of each expanded node
/// exactly once. Nodes at `max_depth` are recorded but never expanded.
/// Cycles, self-loops and nodes reached along several routes are recorded at
/// their first (minimum) depth only.
pub fn expand_call_paths<F>(seed: &str, max_depth: usize, mut callees: F) -> Result<Expansion>
where
    F: FnMut(&str) -> Result<Vec<String>>,
{
    let mut expansion = Expansion::default();
    expansion.depths.insert(seed.to_string(), 0);

    let mut queue: VecDeque<(String, usize)> = VecDeque::new();
    queue.push_back((seed.to_string(), 0));

    while let Some((id, depth)) = queue.pop_front() {
        if depth >= max_depth {
            continue;
        }
        let next = depth + 1;
        for target in callees(&id)? {
            if let Entry::Vacant(slot) = expansion.depths.entry(target) {
                queue.push_back((slot.key().clone(), next));
                slot.insert(next);
            }
        }
    }

    Ok(expansion)
}

// ---------------------------------------------------------------------------
// Resolver
// ---------------------------------------------------------------------------

/// The call chain rooted at `id`, bounded by `depth` (default 4, at most 8).
pub fn call_chain(store: &GraphStore, id: &str, depth: Option<i64>) -> Result<CallChain> {
    let id = require_id(id)?;
    let max_depth = clamp_depth(depth, DEFAULT_CHAIN_DEPTH, MAX_CHAIN_DEPTH);

    store.with_connection(|conn| {
        require_node(conn, id)?;

        let expansion = expand_call_paths(id, max_depth, |node| {
            query_rows(conn, CALLEES_SQL, params![node], |row| row.get(0))
        })?;

        let nodes = load_chain_nodes(conn, &expansion.depths)?;
        let edges = induced_call_edges(conn, &nodes)?;
        tracing::debug!(
            seed = id,
            depth = max_depth,
            nodes = nodes.len(),
            edges = edges.len(),
            "call chain"
        );
        Ok(CallChain { nodes, edges })
    })
}

/// Join discovered ids with `nodes`, keeping functions and methods only.
fn load_chain_nodes(conn: &Connection, depths: &HashMap<String, usize>) -> Result<Vec<ChainNode>> {
    let ids: Vec<&String> = depths.keys().collect();
    let mut nodes = Vec::with_capacity(ids.len());

    for chunk in ids.chunks(ID_CHUNK) {
        let sql = format!(
            "SELECT {NODE_COLUMNS} FROM nodes \
             WHERE kind IN ('function', 'method') AND id IN ({})",
            placeholders(chunk.len())
        );
        let found = query_rows(conn, &sql, params_from_iter(chunk.iter()), row_to_node)?;
        nodes.extend(found.into_iter().filter_map(|node| {
            let depth = *depths.get(&node.id)?;
            Some(ChainNode { node, depth })
        }));
    }

    nodes.sort_by(|a, b| {
        a.depth
            .cmp(&b.depth)
            .then_with(|| a.node.name.cmp(&b.node.name))
            .then_with(|| a.node.id.cmp(&b.node.id))
    });
    nodes.truncate(MAX_CHAIN_NODES);
    Ok(nodes)
}

/// Distinct call edges with both endpoints among `nodes`.
fn induced_call_edges(conn: &Connection, nodes: &[ChainNode]) -> Result<Vec<CallEdge>> {
    if nodes.is_empty() {
        return Ok(Vec::new());
    }
    let list = placeholders(nodes.len());
    let sql = format!(
        "SELECT DISTINCT source, target FROM edges \
         WHERE kind = 'call' AND source IN ({list}) AND target IN ({list}) \
         ORDER BY source, target"
    );
    let ids = nodes.iter().map(|n| n.node.id.as_str());
    query_rows(conn, &sql, params_from_iter(ids), |row| {
        Ok(CallEdge {
            source: row.get(0)?,
            target: row.get(1)?,
        })
    })
}

/// `?1, ?2, ..., ?n`; numbered so one parameter list can fill repeated lists.
fn placeholders(n: usize) -> String {
    (1..=n)
        .map(|i| format!("?{i}"))
        .collect::<Vec<_>>()
        .join(", ")
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
