//! Configuration data structures for cpgview.
//!
//! Defines the YAML config format: where the graph store lives, how its
//! read-only connections are tuned, and how the HTTP service binds.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Top-level config
// ---------------------------------------------------------------------------

/// Root configuration.
///
/// Loaded from YAML files and environment variables, then overridden by CLI
/// flags. Every field has a default so partial files are valid.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CpgViewConfig {
    #[serde(default)]
    pub store: StoreConfig,

    #[serde(default)]
    pub server: ServerConfig,
}

// ---------------------------------------------------------------------------
// StoreConfig
// ---------------------------------------------------------------------------

/// Location and tuning of the read-only graph store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoreConfig {
    /// Path of the SQLite file produced by the ingestion pipeline.
    #[serde(default = "default_store_path")]
    pub path: PathBuf,

    /// The store counts as ready once the file is strictly larger than this.
    #[serde(default = "default_min_ready_bytes")]
    pub min_ready_bytes: u64,

    /// Maximum number of pooled read-only connections.
    #[serde(default = "default_pool_size")]
    pub pool_size: u32,

    /// Page cache per connection, in KiB.
    #[serde(default = "default_cache_size_kib")]
    pub cache_size_kib: u32,

    /// Memory-mapped I/O window per connection, in bytes.
    #[serde(default = "default_mmap_size_bytes")]
    pub mmap_size_bytes: u64,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            path: default_store_path(),
            min_ready_bytes: default_min_ready_bytes(),
            pool_size: default_pool_size(),
            cache_size_kib: default_cache_size_kib(),
            mmap_size_bytes: default_mmap_size_bytes(),
        }
    }
}

// ---------------------------------------------------------------------------
// ServerConfig
// ---------------------------------------------------------------------------

/// HTTP service settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Socket address to listen on.
    #[serde(default = "default_bind")]
    pub bind: String,

    /// Allow cross-origin requests from any origin.
    #[serde(default = "default_cors")]
    pub cors: bool,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: default_bind(),
            cors: default_cors(),
        }
    }
}

// ---------------------------------------------------------------------------
// Defaults
// ---------------------------------------------------------------------------

fn default_store_path() -> PathBuf {
    PathBuf::from("cpg.db")
}

fn default_min_ready_bytes() -> u64 {
    1024 * 1024
}

fn default_pool_size() -> u32 {
    8
}

fn default_cache_size_kib() -> u32 {
    64_000
}

fn default_mmap_size_bytes() -> u64 {
    268_435_456
}

fn default_bind() -> String {
    "127.0.0.1:3001".to_string()
}

fn default_cors() -> bool {
    true
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
