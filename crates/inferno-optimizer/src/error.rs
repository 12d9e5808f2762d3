//! Optimizer-service error taxonomy and its HTTP mapping (§7 ambient).

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use inferno_core::Error as CoreError;
use serde_json::json;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Core(#[from] CoreError),
}

pub type Result<T> = std::result::Result<T, Error>;

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        let status = match &self {
            Error::Core(CoreError::ConfigInvalid(_)) => StatusCode::BAD_REQUEST,
            Error::Core(CoreError::OptimizerInfeasible) | Error::Core(CoreError::SolverNoSolution(_)) => {
                StatusCode::UNPROCESSABLE_ENTITY
            }
            Error::Core(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };
        let body = Json(json!({ "error": self.to_string() }));
        (status, body).into_response()
    }
}
