//! HTTP service exposing the query engine as JSON endpoints.
//!
//! Every `/api` route except `/api/health` sits behind a readiness guard that
//! answers 503 until the graph store is ready.

pub mod error;
pub mod handlers;

use std::sync::Arc;

use axum::{middleware, routing::get, Router};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::config::schema::ServerConfig;
use crate::db::store::GraphStore;
use crate::error::Result;

// ---------------------------------------------------------------------------
// State
// ---------------------------------------------------------------------------

/// Shared handler state.
#[derive(Debug, Clone)]
pub struct AppState {
    pub store: GraphStore,
}

// ---------------------------------------------------------------------------
// Router
// ---------------------------------------------------------------------------

/// Build the API router (extracted for testability).
pub fn build_router(store: GraphStore, cors: bool) -> Router {
    let state = Arc::new(AppState { store });

    let guarded = Router::new()
        .route("/api/overview", get(handlers::get_overview))
        .route("/api/packages", get(handlers::package_list))
        .route("/api/packages/graph", get(handlers::package_graph))
        .route(
            "/api/packages/{pkg}/functions",
            get(handlers::package_functions),
        )
        .route("/api/functions/search", get(handlers::search_functions))
        .route(
            "/api/functions/neighborhood",
            get(handlers::function_neighborhood),
        )
        .route(
            "/api/functions/call-chain",
            get(handlers::function_call_chain),
        )
        .route("/api/functions/source", get(handlers::function_source))
        .route("/api/functions/detail", get(handlers::function_detail))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            handlers::require_ready,
        ));

    let router = Router::new()
        .route("/api/health", get(handlers::health))
        .merge(guarded)
        .layer(TraceLayer::new_for_http())
        .with_state(state);

    if cors {
        router.layer(CorsLayer::permissive())
    } else {
        router
    }
}

// ---------------------------------------------------------------------------
// Server entry point
// ---------------------------------------------------------------------------

/// Serve the API on `config.bind` until Ctrl-C.
pub async fn run_server(store: GraphStore, config: &ServerConfig) -> Result<()> {
    let readiness = store.readiness();
    if readiness.ready {
        tracing::info!(db = %readiness.path.display(), "graph store ready");
        if let Err(err) = store.verify_schema() {
            tracing::warn!(error = %err, "graph store failed the schema check; affected routes will fail");
        }
    } else {
        tracing::warn!(
            db = %readiness.path.display(),
            "graph store not ready yet; /api routes answer 503 until it is"
        );
    }

    let app = build_router(store, config.cors);
    let listener = tokio::net::TcpListener::bind(&config.bind).await?;
    let addr = listener.local_addr()?;
    tracing::info!(%addr, cors = config.cors, "cpgview listening");
    eprintln!("cpgview API: http://{addr}/api");

    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
            tracing::info!("shutting down cpgview server");
        })
        .await?;

    Ok(())
}
