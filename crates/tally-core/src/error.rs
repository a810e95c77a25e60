//! # Error Types
//!
//! Domain-specific error types for tally-core.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Error Types                                     │
//! │                                                                         │
//! │  tally-core errors (this file)                                         │
//! │  ├── CoreError        - Business rule violations                       │
//! │  └── ValidationError  - Input validation failures                      │
//! │                                                                         │
//! │  tally-db errors (separate crate)                                      │
//! │  └── DbError          - Storage failures (+ wrapped CoreError)         │
//! │                                                                         │
//! │  server errors (apps/server)                                           │
//! │  └── ApiError         - What the web UI sees (serialized envelope)     │
//! │                                                                         │
//! │  Flow: ValidationError → CoreError → DbError → ApiError → Client       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Design Principles
//! 1. Use `thiserror` for derive macros (not manual impl)
//! 2. Include context in error messages (product ID, line ID, amounts)
//! 3. Errors are enum variants, never String
//! 4. Each error variant maps to a machine-readable API code

use thiserror::Error;

use crate::types::PaymentStatus;

// =============================================================================
// Core Error
// =============================================================================

/// Core business logic errors.
///
/// Any of these raised inside a checkout aborts the whole batch.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CoreError {
    /// Product cannot be found.
    #[error("Product not found: {0}")]
    ProductNotFound(String),

    /// Product exists but was soft-deactivated.
    #[error("Product is inactive: {0}")]
    ProductInactive(String),

    /// Requested quantity exceeds the stock left for the product.
    ///
    /// ## User Workflow
    /// ```text
    /// Cart: [{B, qty 1}, {B, qty 1}]   B.stock = 1
    ///      │
    ///      ▼
    /// line 1: available 1 → ok, stock becomes 0 inside the unit
    ///      │
    ///      ▼
    /// line 2: InsufficientStock { product_id: B, available: 0, requested: 1 }
    ///      │
    ///      ▼
    /// whole batch rolled back, B.stock = 1
    /// ```
    #[error("Insufficient stock for product {product_id}: available {available}, requested {requested}")]
    InsufficientStock {
        product_id: String,
        available: i64,
        requested: i64,
    },

    /// Customer cannot be found.
    #[error("Customer not found: {0}")]
    CustomerNotFound(String),

    /// Credit adjustment would take a balance below zero.
    #[error("Invalid credit operation for customer {customer_id}: balance {balance_cents}, requested {requested_cents}")]
    InvalidCreditOperation {
        customer_id: String,
        balance_cents: i64,
        requested_cents: i64,
    },

    /// No sale lines exist under the batch key.
    #[error("Sale batch not found: {0}")]
    BatchNotFound(String),

    /// Sale line cannot be found.
    #[error("Sale line not found: {0}")]
    SaleLineNotFound(String),

    /// The payment status state machine does not allow this move.
    #[error("Sale line {line_id} cannot move from {from} to {to}")]
    InvalidStatusTransition {
        line_id: String,
        from: PaymentStatus,
        to: PaymentStatus,
    },

    /// Checkout submitted without line items.
    #[error("Cart is empty")]
    EmptyCart,

    /// Cart has exceeded maximum allowed line items.
    #[error("Cart cannot have more than {max} items")]
    CartTooLarge { max: usize },

    /// Caller lacks the capability for the operation.
    #[error("Operation requires {required} capability")]
    Forbidden { required: String },

    /// Validation error (wraps ValidationError).
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),
}

// =============================================================================
// Validation Error
// =============================================================================

/// Input validation errors.
///
/// Raised before any state is read or written.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// A required field is missing or empty.
    #[error("{field} is required")]
    Required { field: String },

    /// Field value is too long.
    #[error("{field} must be at most {max} characters")]
    TooLong { field: String, max: usize },

    /// Numeric value is out of range.
    #[error("{field} must be between {min} and {max}")]
    OutOfRange { field: String, min: i64, max: i64 },

    /// Value must be positive.
    #[error("{field} must be positive")]
    MustBePositive { field: String },

    /// Invalid format (e.g., invalid UUID, too many decimal places).
    #[error("{field} has invalid format: {reason}")]
    InvalidFormat { field: String, reason: String },

    /// Value is not in allowed set.
    #[error("{field} must be one of: {allowed:?}")]
    NotAllowed { field: String, allowed: Vec<String> },
}

// =============================================================================
// Result Type Alias
// =============================================================================

/// Convenience type alias for Results with CoreError.
pub type CoreResult<T> = Result<T, CoreError>;

// =============================================================================
// Unit Tests
// =============================================================================
