use axum::http::StatusCode;
use axum::response::{IntoResponse, Json, Response};
use sidediff_sdk::{ComparisonId, SdkError};
use thiserror::Error;

use crate::envelope::DiffResponse;

#[derive(Debug, Error)]
pub enum ServerError {
    #[error("malformed input: {0}")]
    MalformedInput(String),

    #[error("could not stage part for comparison {id}: {source}")]
    Stage {
        id: ComparisonId,
        #[source]
        source: SdkError,
    },

    #[error("could not compare parts of comparison {id}: {source}")]
    Compare {
        id: ComparisonId,
        #[source]
        source: SdkError,
    },

    #[error("configuration error: {0}")]
    Config(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("internal error: {0}")]
    Internal(String),
}

pub type ServerResult<T> = Result<T, ServerError>;

impl From<tokio::task::JoinError> for ServerError {
    fn from(err: tokio::task::JoinError) -> Self {
        ServerError::Internal(err.to_string())
    }
}

/// Part submissions answer in plain text, diff requests in the JSON shape of
/// a successful diff with an empty run list.
impl IntoResponse for ServerError {
    fn into_response(self) -> Response {
        match self {
            ServerError::MalformedInput(message) => {
                tracing::debug!(%message, "rejected malformed request");
                (StatusCode::BAD_REQUEST, message).into_response()
            }
            ServerError::Stage { id, source } => {
                tracing::error!(%id, error = %source, "part submission failed");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    format!("Could not write to file content for id: {id}"),
                )
                    .into_response()
            }
            ServerError::Compare { id, source } => {
                let (status, message) = match source {
                    SdkError::NotFound(_) => (
                        StatusCode::NOT_FOUND,
                        format!("Nothing to compare with id: {id}, it may be expired already"),
                    ),
                    SdkError::Incomplete { .. } => (
                        StatusCode::BAD_REQUEST,
                        format!("One of the parts to compare with are missing with id: {id}"),
                    ),
                    other => {
                        tracing::error!(%id, error = %other, "diff failed");
                        (
                            StatusCode::INTERNAL_SERVER_ERROR,
                            format!("Could not read file content for id: {id}"),
                        )
                    }
                };
                (status, Json(DiffResponse::failure(message))).into_response()
            }
            other => {
                tracing::error!(error = %other, "request failed");
                (StatusCode::INTERNAL_SERVER_ERROR, other.to_string()).into_response()
            }
        }
    }
}
