//! # Repository Module
//!
//! Database repository implementations for Tally POS.
//!
//! ## Repository Pattern
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Two Ways In                                          │
//! │                                                                         │
//! │  Pool-backed repositories (one statement, autocommit)                  │
//! │       db.products().get_by_id("prod-a")                                │
//! │       db.sales().lines_for_batch("TX-...")                             │
//! │                                                                         │
//! │  Executor-generic functions (pub(crate), used by the engine)           │
//! │       fetch_product(unit.conn(), id)                                   │
//! │       insert_line(unit.conn(), &line, n)                               │
//! │       → run on the caller's WriteUnit, so they join its transaction    │
//! │                                                                         │
//! │  SQL stays in this module either way.                                  │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Available Repositories
//!
//! - [`ProductRepository`](product::ProductRepository) - Product catalog reads, restock
//! - [`CustomerRepository`](customer::CustomerRepository) - Customer reads, credit top-up
//! - [`SaleRepository`](sale::SaleRepository) - Sale line reads

pub mod customer;
pub mod product;
pub mod sale;
