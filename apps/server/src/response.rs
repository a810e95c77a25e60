//! Uniform response envelope.
//!
//! ```json
//! { "success": true,  "data": { ... } }
//! { "success": false, "error": "Sale batch not found: TX-...", "code": "NOT_FOUND" }
//! ```

use serde::Serialize;

use crate::error::ApiError;

#[derive(Debug, Serialize)]
pub struct ApiResponse<T: Serialize> {
    pub success: bool,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub code: Option<&'static str>,
}

impl<T: Serialize> ApiResponse<T> {
    pub fn ok(data: T) -> Self {
        ApiResponse {
            success: true,
            data: Some(data),
            error: None,
            code: None,
        }
    }

    pub fn failure(err: &ApiError) -> Self {
        ApiResponse {
            success: false,
            data: None,
            error: Some(err.message.clone()),
            code: Some(err.code.as_str()),
        }
    }
}
