//! Sale endpoints: checkout, receipt lookup, status changes, analytics.

use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use tally_core::validation::validate_id;
use tally_core::CoreError;
use tracing::debug;

use crate::auth::Caller;
use crate::dto::{AnalyticsQuery, CheckoutBody, SaleBatchView, SalesSummaryView, StatusBody, StatusChangeView};
use crate::error::ApiError;
use crate::response::ApiResponse;
use crate::routes::run_detached;
use crate::AppState;

type ApiResult<T> = Result<Json<ApiResponse<T>>, ApiError>;

/// `POST /sales`: commits a cart as one batch.
pub async fn create_sale(
    State(state): State<AppState>,
    Caller(capability): Caller,
    body: Result<Json<CheckoutBody>, JsonRejection>,
) -> Result<(StatusCode, Json<ApiResponse<SaleBatchView>>), ApiError> {
    let Json(body) = body?;
    let request = body.into_request().map_err(CoreError::from)?;

    debug!(
        seller_id = %capability.user_id,
        lines = request.items.len(),
        "Checkout requested"
    );

    let db = state.db.clone();
    let batch = run_detached(async move { db.coordinator().commit_checkout(&capability, request).await }).await?;

    Ok((StatusCode::CREATED, Json(ApiResponse::ok(batch.into()))))
}

/// `GET /sales/transaction/{batchKey}`. The key is opaque: anything
/// non-empty and within the id length limit is looked up, and an unknown
/// key is a 404.
pub async fn get_batch(
    State(state): State<AppState>,
    Caller(_): Caller,
    Path(batch_key): Path<String>,
) -> ApiResult<SaleBatchView> {
    validate_id("batchKey", &batch_key).map_err(CoreError::from)?;

    let batch = state.db.reader().get_batch(&batch_key).await?;
    Ok(Json(ApiResponse::ok(batch.into())))
}

/// `PATCH /sales/{lineId}/status`
pub async fn update_status(
    State(state): State<AppState>,
    Caller(capability): Caller,
    Path(line_id): Path<String>,
    body: Result<Json<StatusBody>, JsonRejection>,
) -> ApiResult<StatusChangeView> {
    let Json(body) = body?;

    let db = state.db.clone();
    let change = run_detached(async move {
        db.status_processor()
            .update_status(&capability, &line_id, body.payment_status, body.notes.as_deref())
            .await
    })
    .await?;

    Ok(Json(ApiResponse::ok(change.into())))
}

/// `GET /sales/analytics?from=..&to=..`
pub async fn analytics(
    State(state): State<AppState>,
    Caller(capability): Caller,
    query: Result<Query<AnalyticsQuery>, QueryRejection>,
) -> ApiResult<SalesSummaryView> {
    capability.require_admin()?;
    let Query(query) = query?;

    if let (Some(from), Some(to)) = (query.from, query.to) {
        if from > to {
            return Err(ApiError::validation("from must not be after to"));
        }
    }

    let summary = state.db.analytics().summary(query.from, query.to).await?;
    Ok(Json(ApiResponse::ok(SalesSummaryView::new(query, summary))))
}
