//! # Fleetbooks Analytics Engine
//!
//! This crate derives windowed performance metrics from the raw ledger:
//! per-truck and per-driver activity, fleet-wide efficiency rollups, expense
//! breakdowns, and the operational dashboard counts.
//!
//! ## Architectural Principles
//!
//! - **Layer 1 Logic:** A pure computation crate. It reads through the
//!   `LedgerStore` capability it is handed and never writes anything.
//! - **One clock per report:** every top-level operation captures a single
//!   timestamp and threads it through its sub-computations, so a fleet-wide
//!   report is internally consistent no matter how long the iteration takes.
//! - **Guarded ratios:** every rate with a zero denominator resolves to
//!   zero, never an error or a NaN.
//!
//! ## Public API
//!
//! - `AnalyticsEngine`: the calculator.
//! - The report structs in `report`: `TruckPerformance`, `DriverPerformance`,
//!   `FleetEfficiencyReport`, `ExpenseAnalysis`, `TruckProfit`,
//!   `FleetSummaryReport`, `Dashboard`.
//! - `AnalyticsError`: the specific error types that can be returned from this crate.

// Declare the modules that constitute this crate.
pub mod engine;
pub mod error;
pub mod report;

// Re-export the key components to create a clean, public-facing API.
pub use engine::{AnalyticsEngine, DEFAULT_WINDOW_DAYS};
pub use error::AnalyticsError;
pub use report::{
    Dashboard, DriverPerformance, ExpenseAnalysis, FleetEfficiencyReport, FleetSummary,
    FleetSummaryReport, TruckFinancials, TruckPerformance, TruckProfit,
};
