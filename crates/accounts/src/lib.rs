//! # Fleetbooks Account Engine
//!
//! This crate turns raw ledger rows into per-driver settlement statements:
//! what a driver has earned the company, what they have cost it, and which
//! side of the ledger the difference lands on.
//!
//! ## Architectural Principles
//!
//! - **Layer 1 Logic:** A pure computation crate. It reads through the
//!   `LedgerStore` capability it is handed and never writes anything.
//! - **Stateless Calculation:** The `AccountEngine` carries no state of its
//!   own; every operation is a bounded sequence of store reads folded into a
//!   typed statement. This makes it reliable and easy to test against the
//!   in-memory store.
//!
//! ## Public API
//!
//! - `AccountEngine`: the calculator.
//! - `DriverAccount` / `DriverStatement` / `DriversSummary`: the typed
//!   settlement records.
//! - `AccountError`: the specific error types that can be returned from this crate.

// Declare the modules that constitute this crate.
pub mod engine;
pub mod error;
pub mod statement;

// Re-export the key components to create a clean, public-facing API.
pub use engine::AccountEngine;
pub use error::AccountError;
pub use statement::{DriverAccount, DriverStatement, DriversSummary, ExpenseLine, ShipmentLine};
