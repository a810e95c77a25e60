//! # Validation Module
//!
//! Input validation utilities for Tally POS.
//!
//! ## Validation Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Validation Layers                                  │
//! │                                                                         │
//! │  Layer 1: REST handler                                                 │
//! │  ├── JSON shape (deserialization)                                      │
//! │  └── Decimal → Money conversion                                        │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 2: THIS MODULE (shape rules, no state)                          │
//! │  ├── quantity range, positive price                                    │
//! │  └── id / notes length                                                 │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 3: checkout::validate_line (against a product snapshot)         │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 4: SQLite CHECK constraints (stock >= 0, credit >= 0)           │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use crate::error::ValidationError;
use crate::MAX_ITEM_QUANTITY;

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

/// Maximum length of free-text notes.
pub const MAX_NOTES_LEN: usize = 500;

/// Maximum length of entity identifiers.
pub const MAX_ID_LEN: usize = 64;

/// Maximum unit sale price in cents ($1,000,000.00).
///
/// Keeps `quantity * price` and the analytics sums well inside `i64`.
pub const MAX_UNIT_PRICE_CENTS: i64 = 100_000_000;

// =============================================================================
// Numeric Validators
// =============================================================================

/// Validates a line-item quantity.
///
/// ## Rules
/// - Must be positive (> 0)
/// - Must not exceed MAX_ITEM_QUANTITY (999)
///
/// ## Example
/// ```rust
/// use tally_core::validation::validate_quantity;
///
/// assert!(validate_quantity(3).is_ok());
/// assert!(validate_quantity(0).is_err());
/// ```
pub fn validate_quantity(qty: i64) -> ValidationResult<()> {
    if qty <= 0 {
        return Err(ValidationError::MustBePositive {
            field: "quantity".to_string(),
        });
    }

    if qty > MAX_ITEM_QUANTITY {
        return Err(ValidationError::OutOfRange {
            field: "quantity".to_string(),
            min: 1,
            max: MAX_ITEM_QUANTITY,
        });
    }

    Ok(())
}

/// Validates a unit sale price in cents.
///
/// ## Rules
/// - Must be positive (> 0); free items are not sold through checkout
/// - Must not exceed MAX_UNIT_PRICE_CENTS
pub fn validate_unit_price_cents(cents: i64) -> ValidationResult<()> {
    if cents <= 0 {
        return Err(ValidationError::MustBePositive {
            field: "unitSalePrice".to_string(),
        });
    }

    if cents > MAX_UNIT_PRICE_CENTS {
        return Err(ValidationError::OutOfRange {
            field: "unitSalePrice".to_string(),
            min: 1,
            max: MAX_UNIT_PRICE_CENTS,
        });
    }

    Ok(())
}

/// Validates a ledger delta (always given as a positive magnitude).
pub fn validate_delta(field: &str, delta: i64) -> ValidationResult<()> {
    if delta <= 0 {
        return Err(ValidationError::MustBePositive {
            field: field.to_string(),
        });
    }

    Ok(())
}

// =============================================================================
// String Validators
// =============================================================================

/// Validates an entity identifier (product, customer, sale line).
///
/// ## Rules
/// - Must not be empty
/// - At most 64 characters
///
/// Identifiers are not required to be UUIDs: an unknown but well-formed id
/// must surface as "not found", not as a format error.
pub fn validate_id(field: &str, id: &str) -> ValidationResult<()> {
    let id = id.trim();

    if id.is_empty() {
        return Err(ValidationError::Required {
            field: field.to_string(),
        });
    }

    if id.len() > MAX_ID_LEN {
        return Err(ValidationError::TooLong {
            field: field.to_string(),
            max: MAX_ID_LEN,
        });
    }

    Ok(())
}

/// Validates optional free-text notes.
pub fn validate_notes(notes: Option<&str>) -> ValidationResult<()> {
    match notes {
        Some(notes) if notes.len() > MAX_NOTES_LEN => Err(ValidationError::TooLong {
            field: "notes".to_string(),
            max: MAX_NOTES_LEN,
        }),
        _ => Ok(()),
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
