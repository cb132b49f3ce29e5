//! Mapping of crate errors onto HTTP responses.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;

use crate::db::store::Readiness;
use crate::error::CpgError;

/// Error returned by every handler.
#[derive(Debug)]
pub struct ApiError(pub CpgError);

impl From<CpgError> for ApiError {
    fn from(err: CpgError) -> Self {
        Self(err)
    }
}

impl From<tokio::task::JoinError> for ApiError {
    fn from(err: tokio::task::JoinError) -> Self {
        Self(CpgError::Other(format!("query task failed: {err}")))
    }
}

impl ApiError {
    pub fn status_code(&self) -> StatusCode {
        match &self.0 {
            CpgError::StoreUnavailable { .. } => StatusCode::SERVICE_UNAVAILABLE,
            CpgError::NotFound(_) => StatusCode::NOT_FOUND,
            CpgError::InvalidArgument(_) => StatusCode::BAD_REQUEST,
            CpgError::Query(_)
            | CpgError::Pool(_)
            | CpgError::Io(_)
            | CpgError::Config(_)
            | CpgError::Other(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Short label placed in the `error` field.
    pub fn label(&self) -> &'static str {
        match &self.0 {
            CpgError::StoreUnavailable { .. } => NOT_READY_LABEL,
            CpgError::NotFound(_) => "Not found",
            CpgError::InvalidArgument(_) => "Bad request",
            _ => "Internal error",
        }
    }
}

const NOT_READY_LABEL: &str = "Database not ready";

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let message = self.0.to_string();
        if !self.0.is_client_error() && !self.0.is_retryable() {
            tracing::error!(error = %message, "request failed");
        }

        let body = match &self.0 {
            CpgError::StoreUnavailable { path, .. } => json!({
                "error": self.label(),
                "message": message,
                "db": path.display().to_string(),
            }),
            _ => json!({
                "error": self.label(),
                "message": message,
            }),
        };
        (status, Json(body)).into_response()
    }
}

/// 503 body returned by the readiness guard.
pub fn not_ready_response(readiness: &Readiness) -> Response {
    let message = match readiness.size_bytes {
        None => "The graph store file does not exist yet. Run the ingestion pipeline first.".to_string(),
        Some(size) => format!(
            "The graph store is still being populated ({size} bytes). Retry shortly."
        ),
    };
    (
        StatusCode::SERVICE_UNAVAILABLE,
        Json(json!({
            "error": NOT_READY_LABEL,
            "message": message,
            "db": readiness.path.display().to_string(),
        })),
    )
        .into_response()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;
    use test_case::test_case;

    #[test_case(CpgError::NotFound("x".into()), StatusCode::NOT_FOUND ; "not found")]
    #[test_case(CpgError::InvalidArgument("id".into()), StatusCode::BAD_REQUEST ; "invalid argument")]
    #[test_case(CpgError::unavailable("cpg.db", "missing"), StatusCode::SERVICE_UNAVAILABLE ; "unavailable")]
    #[test_case(CpgError::Query(rusqlite::Error::InvalidQuery), StatusCode::INTERNAL_SERVER_ERROR ; "query")]
    #[test_case(CpgError::Other("boom".into()), StatusCode::INTERNAL_SERVER_ERROR ; "other")]
    fn status_mapping(err: CpgError, expected: StatusCode) {
        let api = ApiError::from(err);
        assert_eq!(api.status_code(), expected);
        assert_eq!(api.into_response().status(), expected);
    }

    #[test]
    fn client_errors_map_to_4xx() {
        for err in [CpgError::NotFound("a".into()), CpgError::InvalidArgument("b".into())] {
            assert!(err.is_client_error());
            assert!(ApiError(err).status_code().is_client_error());
        }
    }

    #[test]
    fn not_ready_response_is_503() {
        let readiness = Readiness {
            ready: false,
            path: PathBuf::from("/data/cpg.db"),
            size_bytes: Some(4096),
        };
        let response = not_ready_response(&readiness);
        assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
    }
}
