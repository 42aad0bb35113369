use chrono::{DateTime, Utc};
use core_types::{ExpenseType, Truck};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Windowed activity and profitability metrics for one truck.
///
/// Revenue and expenses come from the Revenue and Expense tables; the
/// shipment rows only contribute counts here. All rates are percentages and
/// fall back to zero when their denominator is zero.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TruckPerformance {
    pub truck_id: i64,
    pub period_days: i64,
    pub total_shipments: usize,
    pub delivered_shipments: usize,
    pub delivery_rate: Decimal,
    pub total_revenue: Decimal,
    pub total_expenses: Decimal,
    pub profit: Decimal,
    pub profitability_rate: Decimal,
    pub avg_revenue_per_shipment: Decimal,
}

/// Windowed activity metrics for one driver.
///
/// Unlike the truck variant, revenue here is the sum of the shipments' own
/// `revenue` fields: the driver is credited for the freight they hauled, not
/// for what was booked against the truck. The two sources of truth are kept
/// separate on purpose.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DriverPerformance {
    pub driver_id: i64,
    pub period_days: i64,
    pub total_shipments: usize,
    pub delivered_shipments: usize,
    pub delivery_rate: Decimal,
    pub total_revenue: Decimal,
    pub total_expenses: Decimal,
    pub net_contribution: Decimal,
}

/// The fleet-wide averages and totals inside an efficiency report.
///
/// The averages are simple arithmetic means across trucks, not
/// revenue-weighted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FleetSummary {
    pub total_revenue: Decimal,
    pub total_expenses: Decimal,
    pub total_profit: Decimal,
    pub avg_profitability_rate: Decimal,
    pub avg_delivery_rate: Decimal,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FleetEfficiencyReport {
    pub period_days: i64,
    pub total_trucks: usize,
    pub trucks_metrics: Vec<TruckPerformance>,
    pub fleet_summary: FleetSummary,
}

/// Windowed expense totals, grouped two independent ways.
///
/// Each grouping re-sums to `total_expenses`; key order is not significant.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExpenseAnalysis {
    pub period_days: i64,
    pub total_expenses: Decimal,
    pub expenses_by_type: HashMap<ExpenseType, Decimal>,
    pub expenses_by_truck: HashMap<i64, Decimal>,
}

/// Profit/loss for one truck over an explicit, inclusive date range.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TruckProfit {
    pub truck_id: i64,
    pub revenue: Decimal,
    pub expenses: Decimal,
    pub profit: Decimal,
    pub start_date: DateTime<Utc>,
    pub end_date: DateTime<Utc>,
}

/// One truck's financial line in the explicit-range fleet summary.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TruckFinancials {
    pub truck: Truck,
    pub revenue: Decimal,
    pub expenses: Decimal,
    pub profit: Decimal,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FleetSummaryReport {
    pub trucks: Vec<TruckFinancials>,
    pub total_revenue: Decimal,
    pub total_expenses: Decimal,
    pub total_profit: Decimal,
    pub start_date: DateTime<Utc>,
    pub end_date: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TruckCounts {
    pub total: usize,
    pub active: usize,
    pub maintenance: usize,
    pub stopped: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DriverCounts {
    pub total: usize,
    pub active: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShipmentCounts {
    pub total: usize,
    pub pending: usize,
    pub in_transit: usize,
    pub delivered: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Financials {
    pub revenue: Decimal,
    pub expenses: Decimal,
    pub profit: Decimal,
}

/// The operational overview: entity counts by status plus the trailing
/// 30-day financial picture.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Dashboard {
    pub trucks: TruckCounts,
    pub drivers: DriverCounts,
    pub shipments: ShipmentCounts,
    pub financials: Financials,
}
