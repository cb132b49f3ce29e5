//! Read-only access to the persisted graph store.
//!
//! [`GraphStore`] is built once at startup and cloned into every consumer.
//! Connections come from an r2d2 pool opened with `SQLITE_OPEN_READ_ONLY`
//! and tuned for scan-heavy reads. The pool never connects eagerly, so the
//! store file may appear (or finish growing) after the process starts;
//! readiness is re-checked before every checkout.

use std::path::PathBuf;
use std::time::Duration;

use r2d2::{Pool, PooledConnection};
use r2d2_sqlite::SqliteConnectionManager;
use rusqlite::{Connection, OpenFlags, OptionalExtension, Params, Row};
use serde::Serialize;

use crate::config::schema::StoreConfig;
use crate::db::schema::missing_tables;
use crate::error::{CpgError, Result};

/// A pooled read-only connection.
pub type StoreConnection = PooledConnection<SqliteConnectionManager>;

// ---------------------------------------------------------------------------
// Connection tuning
// ---------------------------------------------------------------------------

#[derive(Debug)]
struct ReadTuning {
    cache_size_kib: u32,
    mmap_size_bytes: u64,
}

impl r2d2::CustomizeConnection<Connection, rusqlite::Error> for ReadTuning {
    fn on_acquire(&self, conn: &mut Connection) -> std::result::Result<(), rusqlite::Error> {
        conn.execute_batch(&format!(
            "
            PRAGMA cache_size = -{};
            PRAGMA mmap_size = {};
            PRAGMA temp_store = MEMORY;
            PRAGMA query_only = ON;
            ",
            self.cache_size_kib, self.mmap_size_bytes
        ))
    }
}

// ---------------------------------------------------------------------------
// Readiness
// ---------------------------------------------------------------------------

/// Snapshot of whether the store file can be served.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Readiness {
    pub ready: bool,
    pub path: PathBuf,
    /// `None` when the file does not exist.
    pub size_bytes: Option<u64>,
}

// ---------------------------------------------------------------------------
// GraphStore
// ---------------------------------------------------------------------------

/// Shared, cloneable handle to the read-only graph store.
#[derive(Clone)]
pub struct GraphStore {
    pool: Pool<SqliteConnectionManager>,
    path: PathBuf,
    min_ready_bytes: u64,
}

impl std::fmt::Debug for GraphStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GraphStore")
            .field("path", &self.path)
            .field("min_ready_bytes", &self.min_ready_bytes)
            .finish_non_exhaustive()
    }
}

impl GraphStore {
    /// Build the handle. Does not require the file to exist yet.
    pub fn open(config: &StoreConfig) -> Result<Self> {
        let manager = SqliteConnectionManager::file(&config.path).with_flags(
            OpenFlags::SQLITE_OPEN_READ_ONLY
                | OpenFlags::SQLITE_OPEN_URI
                | OpenFlags::SQLITE_OPEN_NO_MUTEX,
        );
        let pool = Pool::builder()
            .max_size(config.pool_size.max(1))
            .min_idle(Some(0))
            .connection_timeout(Duration::from_secs(10))
            .connection_customizer(Box::new(ReadTuning {
                cache_size_kib: config.cache_size_kib,
                mmap_size_bytes: config.mmap_size_bytes,
            }))
            .build_unchecked(manager);

        let store = Self {
            pool,
            path: config.path.clone(),
            min_ready_bytes: config.min_ready_bytes,
        };

        let readiness = store.readiness();
        tracing::info!(
            path = %store.path.display(),
            size_bytes = ?readiness.size_bytes,
            ready = readiness.ready,
            "graph store opened"
        );
        Ok(store)
    }

    /// The file exists and is strictly larger than the configured threshold.
    pub fn readiness(&self) -> Readiness {
        let size_bytes = std::fs::metadata(&self.path)
            .ok()
            .filter(|meta| meta.is_file())
            .map(|meta| meta.len());
        Readiness {
            ready: size_bytes.is_some_and(|size| size > self.min_ready_bytes),
            path: self.path.clone(),
            size_bytes,
        }
    }

    pub fn is_ready(&self) -> bool {
        self.readiness().ready
    }

    /// Fail with [`CpgError::StoreUnavailable`] unless the store is ready.
    pub fn ensure_ready(&self) -> Result<()> {
        let readiness = self.readiness();
        if readiness.ready {
            return Ok(());
        }
        let reason = match readiness.size_bytes {
            None => "file not found".to_string(),
            Some(size) => format!(
                "file is {size} bytes, expected more than {}",
                self.min_ready_bytes
            ),
        };
        tracing::debug!(path = %self.path.display(), %reason, "graph store not ready");
        Err(CpgError::unavailable(&self.path, reason))
    }

    /// Check out a pooled connection after confirming readiness.
    pub fn conn(&self) -> Result<StoreConnection> {
        self.ensure_ready()?;
        Ok(self.pool.get()?)
    }

    /// Run `f` with one pooled connection, for operations issuing several
    /// queries.
    pub fn with_connection<T, F>(&self, f: F) -> Result<T>
    where
        F: FnOnce(&Connection) -> Result<T>,
    {
        let conn = self.conn()?;
        f(&conn)
    }

    /// Run a parameterized query and map every row.
    pub fn query<T, P, F>(&self, sql: &str, params: P, map: F) -> Result<Vec<T>>
    where
        P: Params,
        F: FnMut(&Row<'_>) -> rusqlite::Result<T>,
    {
        let conn = self.conn()?;
        query_rows(&conn, sql, params, map)
    }

    /// Run a parameterized query expected to yield at most one row.
    pub fn query_one<T, P, F>(&self, sql: &str, params: P, map: F) -> Result<Option<T>>
    where
        P: Params,
        F: FnOnce(&Row<'_>) -> rusqlite::Result<T>,
    {
        let conn = self.conn()?;
        query_opt(&conn, sql, params, map)
    }

    /// Fail with [`CpgError::StoreUnavailable`] naming any missing table.
    pub fn verify_schema(&self) -> Result<()> {
        let conn = self.conn()?;
        let missing = missing_tables(&conn)?;
        if missing.is_empty() {
            return Ok(());
        }
        Err(CpgError::unavailable(
            &self.path,
            format!("missing tables: {}", missing.join(", ")),
        ))
    }
}

// ---------------------------------------------------------------------------
// Connection-level helpers
// ---------------------------------------------------------------------------

/// Map every row of a cached prepared statement.
pub fn query_rows<T, P, F>(conn: &Connection, sql: &str, params: P, map: F) -> Result<Vec<T>>
where
    P: Params,
    F: FnMut(&Row<'_>) -> rusqlite::Result<T>,
{
    let mut stmt = conn.prepare_cached(sql)?;
    let rows = stmt
        .query_map(params, map)?
        .collect::<rusqlite::Result<Vec<T>>>()?;
    Ok(rows)
}

/// First row of a cached prepared statement, if any.
pub fn query_opt<T, P, F>(conn: &Connection, sql: &str, params: P, map: F) -> Result<Option<T>>
where
    P: Params,
    F: FnOnce(&Row<'_>) -> rusqlite::Result<T>,
{
    let mut stmt = conn.prepare_cached(sql)?;
    let row = stmt.query_row(params, map).optional()?;
    Ok(row)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
