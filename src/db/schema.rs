//! Logical schema of the code property graph store.
//!
//! The store is written by the external ingestion pipeline; this crate only
//! reads it. The DDL lives here so fixtures and test stores can be built with
//! exactly the layout the resolvers query, and so a store can be checked for
//! completeness before it is served.

use rusqlite::{params, Connection};

// ---------------------------------------------------------------------------
// DDL constants
// ---------------------------------------------------------------------------

const CREATE_NODES: &str = "\
CREATE TABLE IF NOT EXISTS nodes (
  id TEXT PRIMARY KEY,
  kind TEXT NOT NULL,
  name TEXT NOT NULL,
  package TEXT NOT NULL DEFAULT '',
  file TEXT,
  line INTEGER,
  end_line INTEGER,
  type_info TEXT
)";

const CREATE_EDGES: &str = "\
CREATE TABLE IF NOT EXISTS edges (
  source TEXT NOT NULL,
  target TEXT NOT NULL,
  kind TEXT NOT NULL
)";

const CREATE_METRICS: &str = "\
CREATE TABLE IF NOT EXISTS metrics (
  function_id TEXT PRIMARY KEY,
  cyclomatic_complexity INTEGER NOT NULL DEFAULT 0,
  fan_in INTEGER NOT NULL DEFAULT 0,
  fan_out INTEGER NOT NULL DEFAULT 0,
  loc INTEGER NOT NULL DEFAULT 0,
  num_params INTEGER NOT NULL DEFAULT 0
)";

const CREATE_SOURCES: &str = "\
CREATE TABLE IF NOT EXISTS sources (
  file TEXT PRIMARY KEY,
  content TEXT NOT NULL
)";

// Precomputed aggregate views --------------------------------------------

const CREATE_DASHBOARD_OVERVIEW: &str = "\
CREATE TABLE IF NOT EXISTS dashboard_overview (
  key TEXT NOT NULL,
  value
)";

const CREATE_DASHBOARD_HOTSPOTS: &str = "\
CREATE TABLE IF NOT EXISTS dashboard_hotspots (
  function_id TEXT NOT NULL,
  name TEXT NOT NULL,
  package TEXT NOT NULL,
  hotspot_score REAL NOT NULL,
  complexity INTEGER NOT NULL,
  fan_in INTEGER NOT NULL,
  fan_out INTEGER NOT NULL,
  loc INTEGER NOT NULL
)";

const CREATE_DASHBOARD_NODE_DISTRIBUTION: &str = "\
CREATE TABLE IF NOT EXISTS dashboard_node_distribution (
  node_kind TEXT NOT NULL,
  count INTEGER NOT NULL
)";

const CREATE_DASHBOARD_EDGE_DISTRIBUTION: &str = "\
CREATE TABLE IF NOT EXISTS dashboard_edge_distribution (
  edge_kind TEXT NOT NULL,
  count INTEGER NOT NULL
)";

const CREATE_DASHBOARD_PACKAGE_TREEMAP: &str = "\
CREATE TABLE IF NOT EXISTS dashboard_package_treemap (
  package TEXT NOT NULL,
  function_count INTEGER NOT NULL,
  total_loc INTEGER NOT NULL,
  total_complexity INTEGER NOT NULL
)";

const CREATE_DASHBOARD_PACKAGE_GRAPH: &str = "\
CREATE TABLE IF NOT EXISTS dashboard_package_graph (
  source TEXT NOT NULL,
  target TEXT NOT NULL,
  weight INTEGER NOT NULL
)";

// Indexes ----------------------------------------------------------------

const CREATE_INDEXES: &[&str] = &[
    "CREATE INDEX IF NOT EXISTS idx_nodes_kind_name ON nodes(kind, name)",
    "CREATE INDEX IF NOT EXISTS idx_nodes_package ON nodes(package)",
    "CREATE INDEX IF NOT EXISTS idx_edges_source ON edges(source, kind)",
    "CREATE INDEX IF NOT EXISTS idx_edges_target ON edges(target, kind)",
];

/// Tables (or views) every servable store must contain.
pub const REQUIRED_TABLES: &[&str] = &[
    "nodes",
    "edges",
    "metrics",
    "sources",
    "dashboard_overview",
    "dashboard_hotspots",
    "dashboard_node_distribution",
    "dashboard_edge_distribution",
    "dashboard_package_treemap",
    "dashboard_package_graph",
];

// ---------------------------------------------------------------------------
// Public API
// ---------------------------------------------------------------------------

/// Create every table and index of the logical schema on a writable
/// connection. Idempotent.
///
/// Used to build fixture stores; the serving path never calls it.
pub fn apply_schema(conn: &Connection) -> rusqlite::Result<()> {
    conn.execute_batch(CREATE_NODES)?;
    conn.execute_batch(CREATE_EDGES)?;
    conn.execute_batch(CREATE_METRICS)?;
    conn.execute_batch(CREATE_SOURCES)?;

    conn.execute_batch(CREATE_DASHBOARD_OVERVIEW)?;
    conn.execute_batch(CREATE_DASHBOARD_HOTSPOTS)?;
    conn.execute_batch(CREATE_DASHBOARD_NODE_DISTRIBUTION)?;
    conn.execute_batch(CREATE_DASHBOARD_EDGE_DISTRIBUTION)?;
    conn.execute_batch(CREATE_DASHBOARD_PACKAGE_TREEMAP)?;
    conn.execute_batch(CREATE_DASHBOARD_PACKAGE_GRAPH)?;

    for ddl in CREATE_INDEXES {
        conn.execute_batch(ddl)?;
    }
    Ok(())
}

/// Return the entries of [`REQUIRED_TABLES`] that are absent from the
/// database. Read-only: only consults `sqlite_master`.
pub fn missing_tables(conn: &Connection) -> rusqlite::Result<Vec<&'static str>> {
    let mut stmt = conn.prepare_cached(
        "SELECT COUNT(*) FROM sqlite_master WHERE type IN ('table', 'view') AND name = ?1",
    )?;
    let mut missing = Vec::new();
    for table in REQUIRED_TABLES {
        let count: i64 = stmt.query_row(params![table], |row| row.get(0))?;
        if count == 0 {
            missing.push(*table);
        }
    }
    Ok(missing)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
