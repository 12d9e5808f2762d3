//! Actuator error taxonomy and its HTTP mapping (§7 ambient).

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("allocation for variant {0:?} has no matching resource handle")]
    MissingHandle(String),

    #[error("failed to persist applied allocation at {path}: {source}")]
    Write {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

pub type Result<T> = std::result::Result<T, Error>;

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        let status = match &self {
            Error::MissingHandle(_) => StatusCode::UNPROCESSABLE_ENTITY,
            Error::Write { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        };
        let body = Json(json!({ "error": self.to_string() }));
        (status, body).into_response()
    }
}
