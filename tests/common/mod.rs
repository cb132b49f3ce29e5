//! Shared fixture builder for integration tests.
//!
//! Writes a temporary SQLite store with the logical schema, then opens it
//! through the read-only [`GraphStore`] exactly as the service does.

#![allow(dead_code)]

use std::path::PathBuf;

use cpgview::config::schema::StoreConfig;
use cpgview::db::schema::apply_schema;
use cpgview::GraphStore;
use rusqlite::{params, Connection};
use tempfile::TempDir;

pub struct Fixture {
    pub dir: TempDir,
    pub path: PathBuf,
    conn: Connection,
}

impl Fixture {
    pub fn new() -> Self {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("cpg.db");
        let conn = Connection::open(&path).unwrap();
        apply_schema(&conn).unwrap();
        Self { dir, path, conn }
    }

    /// Insert a node named after the last `.` segment of its id.
    pub fn node(&self, id: &str, kind: &str, package: &str) -> &Self {
        let name = id.rsplit('.').next().unwrap_or(id);
        self.conn
            .execute(
                "INSERT INTO nodes (id, kind, name, package) VALUES (?1, ?2, ?3, ?4)",
                params![id, kind, name, package],
            )
            .unwrap();
        self
    }

    pub fn function(&self, id: &str) -> &Self {
        let package = id.rsplit_once('.').map_or("main", |(pkg, _)| pkg);
        self.node(id, "function", package)
    }

    pub fn located(&self, id: &str, file: &str, line: i64, end_line: i64) -> &Self {
        self.conn
            .execute(
                "INSERT INTO nodes (id, kind, name, package, file, line, end_line) \
                 VALUES (?1, 'function', ?1, 'main', ?2, ?3, ?4)",
                params![id, file, line, end_line],
            )
            .unwrap();
        self
    }

    pub fn edge(&self, source: &str, target: &str, kind: &str) -> &Self {
        self.conn
            .execute(
                "INSERT INTO edges (source, target, kind) VALUES (?1, ?2, ?3)",
                params![source, target, kind],
            )
            .unwrap();
        self
    }

    pub fn call(&self, source: &str, target: &str) -> &Self {
        self.edge(source, target, "call")
    }

    pub fn metrics(&self, id: &str, complexity: i64, fan_in: i64, fan_out: i64, loc: i64) -> &Self {
        self.conn
            .execute(
                "INSERT INTO metrics VALUES (?1, ?2, ?3, ?4, ?5, 0)",
                params![id, complexity, fan_in, fan_out, loc],
            )
            .unwrap();
        self
    }

    pub fn source(&self, file: &str, content: &str) -> &Self {
        self.conn
            .execute(
                "INSERT INTO sources (file, content) VALUES (?1, ?2)",
                params![file, content],
            )
            .unwrap();
        self
    }

    pub fn package(&self, package: &str, function_count: i64) -> &Self {
        self.conn
            .execute(
                "INSERT INTO dashboard_package_treemap VALUES (?1, ?2, ?3, ?4)",
                params![package, function_count, function_count * 10, function_count * 2],
            )
            .unwrap();
        self
    }

    pub fn package_edge(&self, source: &str, target: &str, weight: i64) -> &Self {
        self.conn
            .execute(
                "INSERT INTO dashboard_package_graph VALUES (?1, ?2, ?3)",
                params![source, target, weight],
            )
            .unwrap();
        self
    }

    pub fn stat(&self, key: &str, value: rusqlite::types::Value) -> &Self {
        self.conn
            .execute(
                "INSERT INTO dashboard_overview (key, value) VALUES (?1, ?2)",
                params![key, value],
            )
            .unwrap();
        self
    }

    pub fn hotspot(&self, id: &str, score: f64) -> &Self {
        self.conn
            .execute(
                "INSERT INTO dashboard_hotspots VALUES (?1, ?1, 'main', ?2, 5, 1, 2, 30)",
                params![id, score],
            )
            .unwrap();
        self
    }

    pub fn node_count(&self, kind: &str, count: i64) -> &Self {
        self.conn
            .execute(
                "INSERT INTO dashboard_node_distribution VALUES (?1, ?2)",
                params![kind, count],
            )
            .unwrap();
        self
    }

    pub fn edge_count(&self, kind: &str, count: i64) -> &Self {
        self.conn
            .execute(
                "INSERT INTO dashboard_edge_distribution VALUES (?1, ?2)",
                params![kind, count],
            )
            .unwrap();
        self
    }

    pub fn execute(&self, sql: &str) -> &Self {
        self.conn.execute_batch(sql).unwrap();
        self
    }

    pub fn config(&self) -> StoreConfig {
        StoreConfig {
            path: self.path.clone(),
            min_ready_bytes: 0,
            pool_size: 2,
            ..StoreConfig::default()
        }
    }

    /// Open the store read-only; the fixture stays writable.
    pub fn store(&self) -> GraphStore {
        GraphStore::open(&self.config()).unwrap()
    }
}

/// A store whose file does not exist.
pub fn missing_store() -> (TempDir, GraphStore) {
    let dir = TempDir::new().unwrap();
    let store = GraphStore::open(&StoreConfig {
        path: dir.path().join("absent.db"),
        min_ready_bytes: 0,
        ..StoreConfig::default()
    })
    .unwrap();
    (dir, store)
}
