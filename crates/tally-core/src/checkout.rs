//! # Checkout Rules
//!
//! The pure half of the sale-transaction engine: what a cart must look
//! like, what makes a single line sellable, and how much credit a
//! checkout may consume. `tally-db` runs these rules inside its atomic
//! unit against product and customer rows it has just read.
//!
//! ## Line-Item Validation
//! ```text
//! LineItem { product_id, quantity, unit_price }
//!      │
//!      ├── product row missing?        → ProductNotFound
//!      ├── product.is_active == false? → ProductInactive
//!      ├── quantity > product.stock?   → InsufficientStock
//!      │
//!      ▼
//! ValidatedLine { .., line_total = unit_price × quantity }
//! ```

use serde::{Deserialize, Serialize};

use crate::error::{CoreError, CoreResult, ValidationError};
use crate::money::Money;
use crate::types::{PaymentMethod, Product};
use crate::validation::{
    validate_id, validate_notes, validate_quantity, validate_unit_price_cents,
};
use crate::MAX_CART_ITEMS;

// =============================================================================
// Requests
// =============================================================================

/// One requested (product, quantity, unit price) tuple.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LineItem {
    pub product_id: String,
    pub quantity: i64,
    pub unit_price: Money,
}

impl LineItem {
    pub fn new(product_id: impl Into<String>, quantity: i64, unit_price: Money) -> Self {
        LineItem {
            product_id: product_id.into(),
            quantity,
            unit_price,
        }
    }

    /// Shape checks that need no stored state.
    pub fn validate(&self) -> CoreResult<()> {
        validate_id("productId", &self.product_id)?;
        validate_quantity(self.quantity)?;
        validate_unit_price_cents(self.unit_price.cents())?;
        Ok(())
    }
}

/// A cart submitted for checkout.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckoutRequest {
    /// Line items in submission order.
    pub items: Vec<LineItem>,
    pub customer_id: Option<String>,
    pub payment_method: Option<PaymentMethod>,
    pub notes: Option<String>,
}

impl CheckoutRequest {
    /// Validates the cart shape before any state is touched.
    ///
    /// ## Rules
    /// - At least one line, at most MAX_CART_ITEMS (100)
    /// - Every line passes [`LineItem::validate`]
    /// - Customer id (if any) well-formed, notes within length
    pub fn validate(&self) -> CoreResult<()> {
        if self.items.is_empty() {
            return Err(CoreError::EmptyCart);
        }

        if self.items.len() > MAX_CART_ITEMS {
            return Err(CoreError::CartTooLarge { max: MAX_CART_ITEMS });
        }

        for item in &self.items {
            item.validate()?;
        }

        if let Some(customer_id) = &self.customer_id {
            validate_id("customerId", customer_id)?;
        }

        validate_notes(self.notes.as_deref())?;

        Ok(())
    }
}

// =============================================================================
// Line Validation
// =============================================================================

/// A line that passed validation against the product's current state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidatedLine {
    pub product_id: String,
    pub product_name: String,
    pub quantity: i64,
    pub unit_price: Money,
    pub line_total: Money,
}

/// Checks one line item against a product snapshot.
///
/// `product` is the row as read inside the atomic unit, so stock already
/// reflects decrements made by earlier lines of the same batch.
///
/// ## Example
/// ```rust,ignore
/// let line = validate_line(&item, products.get(&item.product_id))?;
/// ```
pub fn validate_line(item: &LineItem, product: Option<&Product>) -> CoreResult<ValidatedLine> {
    item.validate()?;

    let product = product.ok_or_else(|| CoreError::ProductNotFound(item.product_id.clone()))?;

    if !product.is_active {
        return Err(CoreError::ProductInactive(product.id.clone()));
    }

    if item.quantity > product.stock {
        return Err(CoreError::InsufficientStock {
            product_id: product.id.clone(),
            available: product.stock,
            requested: item.quantity,
        });
    }

    let line_total = item
        .unit_price
        .multiply_quantity(item.quantity)
        .ok_or_else(|| ValidationError::OutOfRange {
            field: "unitSalePrice".to_string(),
            min: 1,
            max: i64::MAX / item.quantity,
        })?;

    Ok(ValidatedLine {
        product_id: product.id.clone(),
        product_name: product.name.clone(),
        quantity: item.quantity,
        unit_price: item.unit_price,
        line_total,
    })
}

// =============================================================================
// Credit
// =============================================================================

/// Credit a checkout may consume: `min(balance, total)`, never negative.
///
/// ## Example
/// ```rust
/// use tally_core::checkout::credit_to_apply;
/// use tally_core::Money;
///
/// // Balance 10.00, total 15.00 → 10.00 consumed
/// assert_eq!(
///     credit_to_apply(Money::from_cents(1000), Money::from_cents(1500)),
///     Money::from_cents(1000)
/// );
/// // Balance 20.00, total 15.00 → 15.00 consumed
/// assert_eq!(
///     credit_to_apply(Money::from_cents(2000), Money::from_cents(1500)),
///     Money::from_cents(1500)
/// );
/// ```
pub fn credit_to_apply(balance: Money, total: Money) -> Money {
    balance.min(total).max(Money::zero())
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn product(stock: i64, active: bool) -> Product {
        let now = Utc::now();
        Product {
            id: "prod-a".to_string(),
            name: "Espresso Beans 250g".to_string(),
            category: Some("coffee".to_string()),
            is_active: active,
            price_cents: 200,
            cost_cents: 120,
            stock,
            min_stock: 1,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn test_validate_line_ok() {
        let item = LineItem::new("prod-a", 3, Money::from_cents(200));
        let line = validate_line(&item, Some(&product(5, true))).unwrap();

        assert_eq!(line.line_total, Money::from_cents(600));
        assert_eq!(line.product_name, "Espresso Beans 250g");
    }

    #[test]
    fn test_validate_line_failures() {
        let item = LineItem::new("prod-a", 3, Money::from_cents(200));

        assert_eq!(
            validate_line(&item, None),
            Err(CoreError::ProductNotFound("prod-a".to_string()))
        );
        assert_eq!(
            validate_line(&item, Some(&product(5, false))),
            Err(CoreError::ProductInactive("prod-a".to_string()))
        );
        assert_eq!(
            validate_line(&item, Some(&product(2, true))),
            Err(CoreError::InsufficientStock {
                product_id: "prod-a".to_string(),
                available: 2,
                requested: 3,
            })
        );
    }

    #[test]
    fn test_validate_line_rejects_bad_shape() {
        let zero_qty = LineItem::new("prod-a", 0, Money::from_cents(200));
        assert!(matches!(
            validate_line(&zero_qty, Some(&product(5, true))),
            Err(CoreError::Validation(_))
        ));

        let free = LineItem::new("prod-a", 1, Money::zero());
        assert!(matches!(
            validate_line(&free, Some(&product(5, true))),
            Err(CoreError::Validation(_))
        ));
    }

    #[test]
    fn test_checkout_request_shape() {
        assert_eq!(CheckoutRequest::default().validate(), Err(CoreError::EmptyCart));

        let too_many = CheckoutRequest {
            items: vec![LineItem::new("prod-a", 1, Money::from_cents(100)); MAX_CART_ITEMS + 1],
            ..Default::default()
        };
        assert_eq!(
            too_many.validate(),
            Err(CoreError::CartTooLarge { max: MAX_CART_ITEMS })
        );

        let ok = CheckoutRequest {
            items: vec![LineItem::new("prod-a", 1, Money::from_cents(100))],
            customer_id: Some("cust-1".to_string()),
            ..Default::default()
        };
        assert!(ok.validate().is_ok());
    }

    #[test]
    fn test_credit_to_apply() {
        assert_eq!(
            credit_to_apply(Money::zero(), Money::from_cents(1500)),
            Money::zero()
        );
        assert_eq!(
            credit_to_apply(Money::from_cents(1500), Money::from_cents(1500)),
            Money::from_cents(1500)
        );
    }
}
