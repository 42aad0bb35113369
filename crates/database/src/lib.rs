//! # Fleetbooks Database Crate
//!
//! This crate is the ledger store: the single place the rest of the
//! application reads raw financial rows from and writes notifications to.
//!
//! ## Architectural Principles
//!
//! - **Layer 3 Adapter:** Encapsulates all persistence-specific logic behind
//!   the `LedgerStore` trait. The account, analytics, and alerting engines
//!   receive the store as an explicit parameter and never see SQL.
//! - **Substitutable:** `PgLedger` is the production PostgreSQL-backed
//!   implementation; `MemoryLedger` is a complete in-memory implementation
//!   used by the test suites and the demo mode of the CLI.
//! - **Asynchronous & Pooled:** All operations are asynchronous, and the
//!   PostgreSQL implementation uses a connection pool (`PgPool`).
//!
//! ## Public API
//!
//! - `connect`: The async function to establish the database connection pool.
//! - `run_migrations`: A utility to apply database migrations, ensuring the schema is up-to-date.
//! - `LedgerStore`: The capability set handed to every engine.
//! - `PgLedger` / `MemoryLedger`: the two implementations.
//! - `StoreError`: The specific error types that can be returned from this crate.

// Declare the modules that constitute this crate.
pub mod connection;
pub mod error;
pub mod memory;
pub mod postgres;
pub mod store;

// Re-export the key components to create a clean, public-facing API.
pub use connection::{connect, run_migrations};
pub use error::StoreError;
pub use memory::MemoryLedger;
pub use postgres::PgLedger;
pub use store::{
    DriverUpdate, LedgerStore, NewDriver, NewExpense, NewMaintenanceRecord, NewNotification,
    NewRevenue, NewShipment, NewTruck, ShipmentUpdate, TruckUpdate,
};
