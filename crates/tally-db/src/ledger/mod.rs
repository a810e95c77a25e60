//! # Ledgers
//!
//! Floor-at-zero balance adjustments. Product stock and customer credit
//! are the only values the engine mutates from more than one place, and
//! both change only through these functions.
//!
//! ```text
//! ┌──────────────────────────┐        ┌──────────────────────────┐
//! │  inventory::adjust_stock │        │  credit::adjust_credit   │
//! │  products.stock >= 0     │        │  customers.credit >= 0   │
//! │  → stock_movements       │        │  → credit_movements      │
//! └──────────────────────────┘        └──────────────────────────┘
//!              ▲                                    ▲
//!              └──────── caller's WriteUnit ────────┘
//! ```
//!
//! Ledgers take a bare connection: they never open, commit or roll back,
//! and they know nothing about roles.

pub mod credit;
pub mod inventory;
