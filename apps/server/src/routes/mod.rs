//! HTTP handlers.
//!
//! ```text
//! GET   /health                          (public)
//! POST  /sales                           seller | admin
//! GET   /sales/transaction/{batchKey}    any authenticated caller
//! PATCH /sales/{lineId}/status           admin
//! GET   /sales/analytics?from&to         admin
//! ```

pub mod health;
pub mod sales;

use std::future::Future;

use crate::error::{ApiError, ErrorCode};
use tally_db::DbResult;

/// Runs an engine call on its own task.
///
/// If the client disconnects axum drops the handler future; the spawned
/// task still runs the unit of work to COMMIT or ROLLBACK.
pub(crate) async fn run_detached<T, F>(work: F) -> Result<T, ApiError>
where
    F: Future<Output = DbResult<T>> + Send + 'static,
    T: Send + 'static,
{
    tokio::spawn(work)
        .await
        .map_err(ApiError::internal)?
        .map_err(ApiError::from)
}

pub async fn not_found() -> ApiError {
    ApiError::new(ErrorCode::NotFound, "Route not found")
}
