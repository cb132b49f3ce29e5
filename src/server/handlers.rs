//! Route handlers. Each one runs its resolver on the blocking pool.

use std::sync::Arc;

use axum::{
    extract::{Path, Query, Request, State},
    http::StatusCode,
    middleware::Next,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};

use crate::db::store::GraphStore;
use crate::error::Result;
use crate::graph::{call_chain, neighborhood, overview, packages, search, source};
use crate::server::error::{not_ready_response, ApiError};
use crate::server::AppState;

// ---------------------------------------------------------------------------
// Query parameters
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
pub struct SearchQuery {
    pub q: Option<String>,
    pub limit: Option<i64>,
}

#[derive(Debug, Deserialize)]
pub struct IdQuery {
    pub id: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct CallChainQuery {
    pub id: Option<String>,
    pub depth: Option<i64>,
}

#[derive(Debug, Deserialize)]
pub struct PackageGraphQuery {
    pub limit: Option<i64>,
    pub module: Option<String>,
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Run a resolver against a clone of the store on tokio's blocking pool.
async fn blocking<T, F>(state: &AppState, resolve: F) -> std::result::Result<Json<T>, ApiError>
where
    T: Serialize + Send + 'static,
    F: FnOnce(&GraphStore) -> Result<T> + Send + 'static,
{
    let store = state.store.clone();
    let value = tokio::task::spawn_blocking(move || resolve(&store)).await??;
    Ok(Json(value))
}

// ---------------------------------------------------------------------------
// Readiness
// ---------------------------------------------------------------------------

#[derive(Debug, Serialize)]
pub struct HealthJson {
    pub status: &'static str,
    pub db: String,
    #[serde(rename = "dbReady")]
    pub db_ready: bool,
}

pub async fn health(State(state): State<Arc<AppState>>) -> (StatusCode, Json<HealthJson>) {
    let readiness = state.store.readiness();
    let (status, code) = if readiness.ready {
        ("ok", StatusCode::OK)
    } else {
        ("db_not_ready", StatusCode::SERVICE_UNAVAILABLE)
    };
    (
        code,
        Json(HealthJson {
            status,
            db: readiness.path.display().to_string(),
            db_ready: readiness.ready,
        }),
    )
}

/// Short-circuit every guarded route with 503 while the store is not ready.
pub async fn require_ready(
    State(state): State<Arc<AppState>>,
    request: Request,
    next: Next,
) -> Response {
    let readiness = state.store.readiness();
    if !readiness.ready {
        tracing::debug!(uri = %request.uri(), "rejecting request: graph store not ready");
        return not_ready_response(&readiness);
    }
    next.run(request).await
}

// ---------------------------------------------------------------------------
// Functions
// ---------------------------------------------------------------------------

pub async fn search_functions(
    State(state): State<Arc<AppState>>,
    Query(params): Query<SearchQuery>,
) -> impl IntoResponse {
    let q = params.q.unwrap_or_default();
    blocking(&state, move |store| {
        search::search_functions(store, &q, params.limit)
    })
    .await
}

pub async fn function_neighborhood(
    State(state): State<Arc<AppState>>,
    Query(params): Query<IdQuery>,
) -> impl IntoResponse {
    let id = params.id.unwrap_or_default();
    blocking(&state, move |store| neighborhood::neighborhood(store, &id)).await
}

pub async fn function_call_chain(
    State(state): State<Arc<AppState>>,
    Query(params): Query<CallChainQuery>,
) -> impl IntoResponse {
    let id = params.id.unwrap_or_default();
    blocking(&state, move |store| {
        call_chain::call_chain(store, &id, params.depth)
    })
    .await
}

pub async fn function_source(
    State(state): State<Arc<AppState>>,
    Query(params): Query<IdQuery>,
) -> impl IntoResponse {
    let id = params.id.unwrap_or_default();
    blocking(&state, move |store| source::source_slice(store, &id)).await
}

pub async fn function_detail(
    State(state): State<Arc<AppState>>,
    Query(params): Query<IdQuery>,
) -> impl IntoResponse {
    let id = params.id.unwrap_or_default();
    blocking(&state, move |store| source::node_detail(store, &id)).await
}

// ---------------------------------------------------------------------------
// Packages & overview
// ---------------------------------------------------------------------------

pub async fn package_list(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    blocking(&state, packages::package_list).await
}

pub async fn package_graph(
    State(state): State<Arc<AppState>>,
    Query(params): Query<PackageGraphQuery>,
) -> impl IntoResponse {
    blocking(&state, move |store| {
        packages::package_graph(store, params.limit, params.module.as_deref())
    })
    .await
}

pub async fn package_functions(
    State(state): State<Arc<AppState>>,
    Path(package): Path<String>,
) -> impl IntoResponse {
    blocking(&state, move |store| {
        packages::package_functions(store, &package)
    })
    .await
}

pub async fn get_overview(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    blocking(&state, overview::overview).await
}
