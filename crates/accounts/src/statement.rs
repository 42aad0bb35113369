use chrono::{DateTime, Utc};
use core_types::{AccountStatus, Expense, ExpenseType, Shipment, ShipmentStatus};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// One driver's settlement statement.
///
/// `balance = total_revenue - (salary + driver_expenses)`. Truck-level
/// expenses are reported alongside (and folded into `total_expenses`) but do
/// not reduce the balance: the truck's running costs are the company's, not
/// the driver's. That asymmetry is part of the settlement contract.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DriverAccount {
    pub driver_id: i64,
    pub driver_name: String,
    pub phone: String,
    pub truck_id: Option<i64>,
    pub salary: Decimal,
    pub shipment_count: usize,
    pub total_revenue: Decimal,
    pub driver_expenses: Decimal,
    pub truck_expenses: Decimal,
    pub total_expenses: Decimal,
    pub balance: Decimal,
    pub account_status: AccountStatus,
    pub is_active: bool,
}

/// An itemized shipment line on the detailed statement.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShipmentLine {
    pub id: i64,
    pub origin: String,
    pub destination: String,
    pub cargo: String,
    pub revenue: Decimal,
    pub status: ShipmentStatus,
    pub date: DateTime<Utc>,
}

impl From<Shipment> for ShipmentLine {
    fn from(shipment: Shipment) -> Self {
        Self {
            id: shipment.id,
            origin: shipment.origin,
            destination: shipment.destination,
            cargo: shipment.cargo,
            revenue: shipment.revenue,
            status: shipment.status,
            date: shipment.shipment_date,
        }
    }
}

/// An itemized expense line on the detailed statement.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExpenseLine {
    pub id: i64,
    pub expense_type: ExpenseType,
    pub amount: Decimal,
    pub description: Option<String>,
    pub date: DateTime<Utc>,
}

impl From<Expense> for ExpenseLine {
    fn from(expense: Expense) -> Self {
        Self {
            id: expense.id,
            expense_type: expense.expense_type,
            amount: expense.amount,
            description: expense.description,
            date: expense.expense_date,
        }
    }
}

/// The settlement statement plus the full history it was derived from.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DriverStatement {
    pub account: DriverAccount,
    pub shipments: Vec<ShipmentLine>,
    pub expenses: Vec<ExpenseLine>,
}

/// The fleet-wide settlement rollup across all drivers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DriversSummary {
    pub total_drivers: usize,
    pub active_drivers: usize,
    pub total_revenue: Decimal,
    pub total_expenses: Decimal,
    pub total_balance: Decimal,
    pub creditor_drivers: usize,
    pub debtor_drivers: usize,
    pub drivers: Vec<DriverAccount>,
}
