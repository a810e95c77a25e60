//! # tally-db: Database Layer for Tally POS
//!
//! SQLite storage plus the sale-transaction engine that runs on it: the
//! inventory and credit ledgers, the checkout coordinator, the batch
//! reader and the refund/status processor.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Tally POS Data Flow                              │
//! │                                                                         │
//! │  REST handler (POST /sales)                                            │
//! │       │  Capability + CheckoutRequest                                  │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                     tally-db (THIS CRATE)                       │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────────┐    ┌───────────────┐    ┌──────────────┐  │   │
//! │  │   │    engine     │    │    ledger     │    │  repository  │  │   │
//! │  │   │               │    │               │    │              │  │   │
//! │  │   │ Coordinator   │───►│ inventory     │    │ products     │  │   │
//! │  │   │ Reader        │    │ credit        │    │ customers    │  │   │
//! │  │   │ StatusProc.   │    │               │    │ sale_lines   │  │   │
//! │  │   │ WriteUnit     │    │               │    │              │  │   │
//! │  │   └───────────────┘    └───────────────┘    └──────────────┘  │   │
//! │  │                                                                 │   │
//! │  │   pool (DbConfig, Database)      migrations (embedded)         │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                     SQLite Database (WAL)                       │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Module Organization
//!
//! - [`pool`] - Connection pool creation and configuration
//! - [`migrations`] - Embedded database migrations
//! - [`error`] - Database error types
//! - [`repository`] - Repository implementations (product, customer, sale)
//! - [`ledger`] - Floor-at-zero stock and credit adjustments
//! - [`engine`] - Checkout, batch reads, status changes
//! - [`analytics`] - Read-only sales summary
//!
//! ## Usage
//!
//! ```rust,ignore
//! use tally_db::{Database, DbConfig};
//!
//! let db = Database::new(DbConfig::new("./tally.db")).await?;
//!
//! let batch = db.coordinator().commit_checkout(&capability, request).await?;
//! let receipt = db.reader().get_batch(&batch.batch_key).await?;
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod analytics;
pub mod engine;
pub mod error;
pub mod ledger;
pub mod migrations;
pub mod pool;
pub mod repository;

#[cfg(test)]
pub(crate) mod testing;

// =============================================================================
// Re-exports
// =============================================================================

pub use analytics::{SalesAnalytics, SalesSummary, StatusCount};
pub use engine::coordinator::TransactionCoordinator;
pub use engine::reader::TransactionReader;
pub use engine::status::{StatusChange, StatusProcessor};
pub use error::{DbError, DbResult};
pub use pool::{Database, DbConfig};

// Repository re-exports for convenience
pub use repository::customer::CustomerRepository;
pub use repository::product::ProductRepository;
pub use repository::sale::SaleRepository;
