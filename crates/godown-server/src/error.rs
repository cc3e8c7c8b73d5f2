use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use godown_core::GodownError;

// ---------------------------------------------------------------------------
// AppError — unified error type for HTTP responses
// ---------------------------------------------------------------------------

/// Unified error type for HTTP responses.
#[derive(Debug)]
pub struct AppError(pub anyhow::Error);

impl AppError {
    /// Construct a 400 Bad Request error with the given message.
    pub fn bad_request(msg: impl Into<String>) -> Self {
        Self(anyhow::anyhow!(BadRequest(msg.into())))
    }
}

/// Private sentinel error type carrying an explicit 400 through the
/// `anyhow::Error` chain.
#[derive(Debug)]
struct BadRequest(String);

impl std::fmt::Display for BadRequest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::error::Error for BadRequest {}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        if let Some(b) = self.0.downcast_ref::<BadRequest>() {
            let body = serde_json::json!({ "error": b.0.clone() });
            return (StatusCode::BAD_REQUEST, axum::Json(body)).into_response();
        }

        let status = if let Some(e) = self.0.downcast_ref::<GodownError>() {
            match e {
                GodownError::FacilityNotFound(_)
                | GodownError::LotNotFound(_)
                | GodownError::NoFacilities(_) => StatusCode::NOT_FOUND,
                GodownError::UnknownCrop(_) | GodownError::InvalidCapacity(_) => {
                    StatusCode::BAD_REQUEST
                }
                GodownError::Weather { .. } => StatusCode::BAD_GATEWAY,
                GodownError::Store(_)
                | GodownError::Io(_)
                | GodownError::Yaml(_)
                | GodownError::Json(_) => StatusCode::INTERNAL_SERVER_ERROR,
            }
        } else {
            StatusCode::INTERNAL_SERVER_ERROR
        };

        let body = serde_json::json!({ "error": self.0.to_string() });
        (status, axum::Json(body)).into_response()
    }
}

impl<E> From<E> for AppError
where
    E: Into<anyhow::Error>,
{
    fn from(err: E) -> Self {
        Self(err.into())
    }
}
