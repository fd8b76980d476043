use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Error half of the standard JSON envelope:
/// `{ success: false, error: { code, message } }` (built by
/// `AppError::error_response`).
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ApiError {
    pub code: String,
    pub message: String,
}
