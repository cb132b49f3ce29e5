//! Command-line interface: argument definitions and dispatch.

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use serde::Serialize;

use crate::config::loader::load_config;
use crate::config::schema::CpgViewConfig;
use crate::db::store::{GraphStore, Readiness};
use crate::error::Result;
use crate::graph::{call_chain, neighborhood, overview, packages, search, source};
use crate::server::run_server;

/// Exit code of `status` when the store is not ready.
pub const EXIT_NOT_READY: i32 = 2;

#[derive(Debug, Parser)]
#[command(
    name = "cpgview",
    version,
    about = "Query service over a prebuilt code property graph",
    after_help = r#"Examples:
  cpgview --db ./cpg.db serve --bind 0.0.0.0:3001
  cpgview status
  cpgview query search Parse --limit 10
  cpgview query call-chain 'pkg/server.(*Server).Start' --depth 3
  cpgview query package-graph --module github.com/acme --limit 20
"#
)]
pub struct Cli {
    /// YAML config file (defaults: ./cpgview.yaml, then the user config dir).
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Graph store path; overrides config and environment.
    #[arg(long, global = true)]
    pub db: Option<PathBuf>,

    /// Log at debug level unless RUST_LOG says otherwise.
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Start the HTTP API.
    Serve {
        /// Socket address to listen on.
        #[arg(long)]
        bind: Option<String>,
        /// Disable permissive CORS.
        #[arg(long)]
        no_cors: bool,
    },
    /// Print store readiness as JSON; exits 2 when not ready.
    Status,
    /// Run a single query and print the JSON result.
    Query {
        #[command(subcommand)]
        query: QueryCommand,
    },
}

#[derive(Debug, Subcommand)]
pub enum QueryCommand {
    /// Functions and methods whose name contains TEXT.
    Search {
        text: String,
        #[arg(long)]
        limit: Option<i64>,
    },
    /// Direct callers and callees of a node.
    Neighborhood { id: String },
    /// Transitive callees of a node.
    CallChain {
        id: String,
        #[arg(long)]
        depth: Option<i64>,
    },
    /// Totals for every package.
    Packages,
    /// Pruned package dependency graph.
    PackageGraph {
        #[arg(long)]
        limit: Option<i64>,
        /// Only packages whose path starts with this prefix.
        #[arg(long)]
        module: Option<String>,
    },
    /// Functions declared in a package.
    PackageFunctions { package: String },
    /// Precomputed summary views.
    Overview,
    /// Source text of a node.
    Source { id: String },
    /// A node with its metrics.
    Detail { id: String },
}

/// Resolve the effective configuration for `cli`.
pub fn resolve_config(cli: &Cli) -> Result<CpgViewConfig> {
    let cwd = std::env::current_dir().ok();
    let mut config = load_config(cli.config.as_deref(), cwd.as_deref())?;
    if let Some(db) = &cli.db {
        config.store.path = db.clone();
    }
    if let Command::Serve { bind, no_cors } = &cli.command {
        if let Some(bind) = bind {
            config.server.bind = bind.clone();
        }
        if *no_cors {
            config.server.cors = false;
        }
    }
    Ok(config)
}

/// Execute the parsed command; returns the process exit code.
pub fn run(cli: Cli) -> Result<i32> {
    let config = resolve_config(&cli)?;
    let store = GraphStore::open(&config.store)?;

    match cli.command {
        Command::Serve { .. } => {
            let runtime = tokio::runtime::Builder::new_multi_thread()
                .enable_all()
                .build()?;
            runtime.block_on(run_server(store, &config.server))?;
            Ok(0)
        }
        Command::Status => {
            let report = status_report(&store);
            print_json(&report)?;
            Ok(report.exit_code())
        }
        Command::Query { query } => {
            run_query(&store, query)?;
            Ok(0)
        }
    }
}

/// Output of `status`: file readiness plus the schema check of a ready store.
#[derive(Debug, Serialize)]
pub struct StatusReport {
    #[serde(flatten)]
    pub readiness: Readiness,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub schema_error: Option<String>,
}

impl StatusReport {
    pub fn exit_code(&self) -> i32 {
        if self.readiness.ready && self.schema_error.is_none() {
            0
        } else {
            EXIT_NOT_READY
        }
    }
}

/// Readiness, and for a ready store, the names of any missing tables.
pub fn status_report(store: &GraphStore) -> StatusReport {
    let readiness = store.readiness();
    let schema_error = if readiness.ready {
        store.verify_schema().err().map(|err| {
            tracing::warn!(error = %err, "graph store failed the schema check");
            err.to_string()
        })
    } else {
        None
    };
    StatusReport {
        readiness,
        schema_error,
    }
}

fn run_query(store: &GraphStore, query: QueryCommand) -> Result<()> {
    match query {
        QueryCommand::Search { text, limit } => {
            print_json(&search::search_functions(store, &text, limit)?)
        }
        QueryCommand::Neighborhood { id } => print_json(&neighborhood::neighborhood(store, &id)?),
        QueryCommand::CallChain { id, depth } => {
            print_json(&call_chain::call_chain(store, &id, depth)?)
        }
        QueryCommand::Packages => print_json(&packages::package_list(store)?),
        QueryCommand::PackageGraph { limit, module } => print_json(&packages::package_graph(
            store,
            limit,
            module.as_deref(),
        )?),
        QueryCommand::PackageFunctions { package } => {
            print_json(&packages::package_functions(store, &package)?)
        }
        QueryCommand::Overview => print_json(&overview::overview(store)?),
        QueryCommand::Source { id } => print_json(&source::source_slice(store, &id)?),
        QueryCommand::Detail { id } => print_json(&source::node_detail(store, &id)?),
    }
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    let text = serde_json::to_string_pretty(value)
        .map_err(|e| crate::error::CpgError::Other(format!("serialize result: {e}")))?;
    println!("{text}");
    Ok(())
}
