//! # Sale-Transaction Engine
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                                                                         │
//! │   coordinator ──┐                       reader                          │
//! │   (checkout)    │                       (pool, read-only)               │
//! │                 ├──► unit::WriteUnit                                    │
//! │   status     ───┘    BEGIN IMMEDIATE … COMMIT / ROLLBACK                │
//! │   (refunds)              │                                              │
//! │                          ▼                                              │
//! │                  ledger::inventory / ledger::credit                     │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Role checks happen at the top of `coordinator` and `status` against the
//! [`Capability`](tally_core::Capability) handed in by the caller.

pub mod coordinator;
pub mod reader;
pub mod status;
pub mod unit;
