//! # Tally Server
//!
//! REST API over the sale-transaction engine.
//!
//! ## Architecture
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Tally Server                                    │
//! │                                                                         │
//! │  ┌────────────────┐  ┌────────────────┐  ┌────────────────────────────┐│
//! │  │  auth          │  │  routes        │  │  dto / response            ││
//! │  │                │  │                │  │                            ││
//! │  │ • JwtManager   │  │ • POST /sales  │  │ • cents ⇄ decimals         ││
//! │  │ • Caller       │─►│ • GET receipt  │─►│ • {success, data, error,   ││
//! │  │   (Capability) │  │ • PATCH status │  │    code} envelope          ││
//! │  └────────────────┘  │ • analytics    │  └────────────────────────────┘│
//! │                      │ • health       │                                │
//! │                      └───────┬────────┘                                │
//! │                              ▼                                          │
//! │                   tally_db::Database (SQLite, WAL)                      │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Configuration
//! See [`config`]: defaults, `tally.toml`, then `TALLY_*` environment
//! variables.

pub mod auth;
pub mod config;
pub mod dto;
pub mod error;
pub mod response;
pub mod routes;

use std::sync::Arc;

use axum::routing::{get, patch, post};
use axum::Router;
use tally_db::Database;

pub use auth::JwtManager;
pub use config::ServerConfig;
pub use error::{ApiError, ErrorCode};

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub db: Database,
    pub jwt: Arc<JwtManager>,
}

impl AppState {
    pub fn new(db: Database, jwt: JwtManager) -> Self {
        AppState {
            db,
            jwt: Arc::new(jwt),
        }
    }
}

/// Builds the router with every endpoint mounted.
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(routes::health::health))
        .route("/sales", post(routes::sales::create_sale))
        .route("/sales/analytics", get(routes::sales::analytics))
        .route("/sales/transaction/{batch_key}", get(routes::sales::get_batch))
        .route("/sales/{line_id}/status", patch(routes::sales::update_status))
        .fallback(routes::not_found)
        .with_state(state)
}
