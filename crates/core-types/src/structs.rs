use crate::enums::{DriverStatus, ExpenseType, NotificationType, ShipmentStatus, TruckStatus};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// A tractor unit in the fleet. The plate is unique across all trucks.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Truck {
    pub id: i64,
    pub truck_type: String,
    pub plate: String,
    pub status: TruckStatus,
    pub last_maintenance_date: Option<DateTime<Utc>>,
    /// Running count, bumped by the store whenever a shipment is booked
    /// against this truck.
    pub total_shipments: i64,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Driver {
    pub id: i64,
    pub name: String,
    pub phone: String,
    /// Monthly salary obligation, always positive.
    pub salary: Decimal,
    pub truck_id: Option<i64>,
    pub status: DriverStatus,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Shipment {
    pub id: i64,
    pub truck_id: i64,
    pub driver_id: i64,
    pub origin: String,
    pub destination: String,
    pub cargo: String,
    /// The agreed freight charge for this shipment. This is a separate
    /// source of truth from the Revenue table and is what driver-side
    /// aggregation sums.
    pub revenue: Decimal,
    pub status: ShipmentStatus,
    pub shipment_date: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
}

/// A booked income row, optionally tied to the shipment that produced it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Revenue {
    pub id: i64,
    pub truck_id: i64,
    pub shipment_id: Option<i64>,
    pub amount: Decimal,
    pub revenue_date: DateTime<Utc>,
    pub description: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Expense {
    pub id: i64,
    pub truck_id: i64,
    /// Present when the expense is charged to a driver rather than to the
    /// truck as a whole.
    pub driver_id: Option<i64>,
    pub expense_type: ExpenseType,
    pub amount: Decimal,
    pub expense_date: DateTime<Utc>,
    pub description: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MaintenanceRecord {
    pub id: i64,
    pub truck_id: i64,
    pub maintenance_type: String,
    pub cost: Decimal,
    pub maintenance_date: DateTime<Utc>,
    pub description: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Notification {
    pub id: i64,
    pub truck_id: Option<i64>,
    pub title: String,
    pub message: String,
    pub notification_type: NotificationType,
    pub is_read: bool,
    pub created_at: DateTime<Utc>,
}
