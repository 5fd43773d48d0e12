pub mod health;
pub mod reconcile;
pub mod reference;
pub mod sheets;
pub mod upload;

use axum::http::StatusCode;
use axum::response::{IntoResponse, Json, Response};

use bomline_utils::{BomlineError, ErrorResponse};

/// Axum-facing wrapper mapping `BomlineError` onto its HTTP status and
/// the shared error body.
pub struct ApiError(pub BomlineError);

pub type ApiResult<T> = Result<T, ApiError>;

impl From<BomlineError> for ApiError {
    fn from(error: BomlineError) -> Self {
        Self(error)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = StatusCode::from_u16(self.0.http_status_code())
            .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        (status, Json(ErrorResponse::from(self.0))).into_response()
    }
}
