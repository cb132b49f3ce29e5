//! Package-level views: totals, the pruned dependency graph, and the
//! functions of a single package.

use std::collections::HashSet;

use rusqlite::params;
use serde::Serialize;

use crate::db::converters::{row_to_node, row_to_package_edge, row_to_package_summary, NODE_COLUMNS};
use crate::db::store::{query_rows, GraphStore};
use crate::error::Result;
use crate::graph::clamp_limit;
use crate::types::{Node, PackageEdge, PackageSummary};

pub const DEFAULT_PACKAGE_LIMIT: usize = 30;
pub const MAX_PACKAGE_LIMIT: usize = 200;
/// Retained edges per selected package.
pub const EDGES_PER_PACKAGE: usize = 4;
pub const MAX_PACKAGE_FUNCTIONS: usize = 200;

const PACKAGE_LIST_SQL: &str = "\
SELECT package, function_count, total_loc, total_complexity
FROM dashboard_package_treemap
ORDER BY function_count DESC, package";

const PACKAGE_CANDIDATES_SQL: &str = "\
SELECT package, function_count, total_loc, total_complexity
FROM dashboard_package_treemap
WHERE ?1 = '' OR substr(package, 1, length(?1)) = ?1
ORDER BY function_count DESC, package
LIMIT ?2";

const PACKAGE_EDGES_SQL: &str = "\
SELECT source, target, weight
FROM dashboard_package_graph
ORDER BY weight DESC, source, target";

// ---------------------------------------------------------------------------
// Result types
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PackageNode {
    pub id: String,
    /// Last `/` segment of the package path.
    pub label: String,
    #[serde(rename = "fullPath")]
    pub full_path: String,
    pub function_count: i64,
    pub total_loc: i64,
    pub total_complexity: i64,
}

impl From<PackageSummary> for PackageNode {
    fn from(summary: PackageSummary) -> Self {
        Self {
            id: summary.package.clone(),
            label: package_label(&summary.package).to_string(),
            full_path: summary.package,
            function_count: summary.function_count,
            total_loc: summary.total_loc,
            total_complexity: summary.total_complexity,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct PackageGraph {
    pub nodes: Vec<PackageNode>,
    pub edges: Vec<PackageEdge>,
}

fn package_label(package: &str) -> &str {
    package.rsplit('/').next().unwrap_or(package)
}

// ---------------------------------------------------------------------------
// Pruning
// ---------------------------------------------------------------------------

/// Trim the package graph for display.
///
/// `candidates` must already be ranked and truncated; `edges` must be ordered
/// by descending weight. Self-edges and edges leaving the candidate set are
/// dropped, at most `EDGES_PER_PACKAGE * limit` edges are kept, and
/// candidates left without any edge are removed.
pub fn prune_package_graph(
    candidates: Vec<PackageSummary>,
    edges: Vec<PackageEdge>,
    limit: usize,
) -> PackageGraph {
    let selected: HashSet<&str> = candidates.iter().map(|c| c.package.as_str()).collect();

    let kept: Vec<PackageEdge> = edges
        .into_iter()
        .filter(|e| e.source != e.target)
        .filter(|e| selected.contains(e.source.as_str()) && selected.contains(e.target.as_str()))
        .take(EDGES_PER_PACKAGE * limit)
        .collect();

    let touched: HashSet<&str> = kept
        .iter()
        .flat_map(|e| [e.source.as_str(), e.target.as_str()])
        .collect();
    let nodes: Vec<PackageNode> = candidates
        .iter()
        .filter(|c| touched.contains(c.package.as_str()))
        .cloned()
        .map(PackageNode::from)
        .collect();

    PackageGraph { nodes, edges: kept }
}

// ---------------------------------------------------------------------------
// Resolvers
// ---------------------------------------------------------------------------

/// The largest packages (optionally under `module_prefix`) and the heaviest
/// dependencies between them.
pub fn package_graph(
    store: &GraphStore,
    limit: Option<i64>,
    module_prefix: Option<&str>,
) -> Result<PackageGraph> {
    let limit = clamp_limit(limit, DEFAULT_PACKAGE_LIMIT, MAX_PACKAGE_LIMIT);
    let prefix = module_prefix.unwrap_or("");

    let graph = store.with_connection(|conn| {
        let candidates = query_rows(
            conn,
            PACKAGE_CANDIDATES_SQL,
            params![prefix, limit as i64],
            row_to_package_summary,
        )?;
        if candidates.is_empty() {
            return Ok(PackageGraph::default());
        }
        let edges = query_rows(conn, PACKAGE_EDGES_SQL, [], row_to_package_edge)?;
        Ok(prune_package_graph(candidates, edges, limit))
    })?;

    tracing::debug!(
        limit,
        prefix,
        nodes = graph.nodes.len(),
        edges = graph.edges.len(),
        "package graph"
    );
    Ok(graph)
}

/// Totals for every package, largest first.
pub fn package_list(store: &GraphStore) -> Result<Vec<PackageSummary>> {
    store.query(PACKAGE_LIST_SQL, [], row_to_package_summary)
}

/// Functions and methods declared in `package`, by name.
pub fn package_functions(store: &GraphStore, package: &str) -> Result<Vec<Node>> {
    let sql = format!(
        "SELECT {NODE_COLUMNS} FROM nodes \
         WHERE package = ?1 AND kind IN ('function', 'method') \
         ORDER BY name, id \
         LIMIT ?2"
    );
    store.query(&sql, params![package, MAX_PACKAGE_FUNCTIONS as i64], row_to_node)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
