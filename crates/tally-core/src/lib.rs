//! # tally-core: Pure Business Logic for Tally POS
//!
//! The rules of the sale-transaction engine, as pure functions with zero
//! I/O dependencies. `tally-db` runs them inside SQLite transactions;
//! `tally-server` exposes them over REST.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Tally POS Architecture                           │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                    Web UI (external)                            │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │ REST + JWT                             │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │                    tally-server (axum)                          │   │
//! │  │    POST /sales, GET /sales/transaction/{key}, PATCH status     │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │ Capability                             │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │               ★ tally-core (THIS CRATE) ★                       │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────┐  ┌───────────┐  ┌───────────┐  ┌───────────┐  │   │
//! │  │   │   types   │  │   money   │  │ checkout  │  │   batch   │  │   │
//! │  │   │ SaleLine  │  │   Money   │  │ validate_ │  │ SaleBatch │  │   │
//! │  │   │  Status   │  │  (cents)  │  │   line    │  │ batch key │  │   │
//! │  │   └───────────┘  └───────────┘  └───────────┘  └───────────┘  │   │
//! │  │                                                                 │   │
//! │  │   NO I/O • NO DATABASE • NO NETWORK • PURE FUNCTIONS           │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │                    tally-db (Database Layer)                    │   │
//! │  │        ledgers, coordinator, reader, status processor           │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`types`] - Domain types (Product, Customer, SaleLine, PaymentStatus)
//! - [`money`] - Money type with integer arithmetic (no floating point!)
//! - [`checkout`] - Cart shape and line-item validation, credit capping
//! - [`batch`] - SaleBatch folding and batch-key generation
//! - [`capability`] - Roles passed in from the auth layer
//! - [`error`] - Domain error types
//! - [`validation`] - Field-level input rules
//!
//! ## Example Usage
//!
//! ```rust
//! use tally_core::checkout::{validate_line, LineItem};
//! use tally_core::{CoreError, Money};
//!
//! let item = LineItem::new("prod-a", 3, Money::from_cents(200));
//!
//! // No product row → ProductNotFound, before anything is mutated
//! assert_eq!(
//!     validate_line(&item, None),
//!     Err(CoreError::ProductNotFound("prod-a".to_string()))
//! );
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod batch;
pub mod capability;
pub mod checkout;
pub mod error;
pub mod money;
pub mod types;
pub mod validation;

// =============================================================================
// Re-exports for Convenience
// =============================================================================

pub use batch::SaleBatch;
pub use capability::{Capability, Role};
pub use checkout::{CheckoutRequest, LineItem, ValidatedLine};
pub use error::{CoreError, CoreResult, ValidationError};
pub use money::Money;
pub use types::*;

// =============================================================================
// Crate-Level Constants
// =============================================================================

/// Maximum line items allowed in a single checkout
///
/// ## Business Reason
/// Prevents runaway carts and keeps one atomic unit short enough that
/// concurrent checkouts do not wait long on the write lock.
pub const MAX_CART_ITEMS: usize = 100;

/// Maximum quantity of a single line item
///
/// ## Business Reason
/// Prevents accidental over-ordering (e.g., typing 1000 instead of 10)
pub const MAX_ITEM_QUANTITY: i64 = 999;
