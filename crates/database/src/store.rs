use crate::error::StoreError;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use core_types::{
    Driver, DriverStatus, Expense, ExpenseType, MaintenanceRecord, Notification,
    NotificationType, Revenue, Shipment, ShipmentStatus, Truck, TruckStatus, Window,
};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

fn default_truck_status() -> TruckStatus {
    TruckStatus::Active
}

fn default_driver_status() -> DriverStatus {
    DriverStatus::Active
}

fn default_shipment_status() -> ShipmentStatus {
    ShipmentStatus::Pending
}

/// Input record for creating a truck.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewTruck {
    pub truck_type: String,
    pub plate: String,
    #[serde(default = "default_truck_status")]
    pub status: TruckStatus,
}

/// Partial update for a truck; absent fields are left untouched.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TruckUpdate {
    pub truck_type: Option<String>,
    pub plate: Option<String>,
    pub status: Option<TruckStatus>,
    pub last_maintenance_date: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewDriver {
    pub name: String,
    pub phone: String,
    pub salary: Decimal,
    pub truck_id: Option<i64>,
    #[serde(default = "default_driver_status")]
    pub status: DriverStatus,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DriverUpdate {
    pub name: Option<String>,
    pub phone: Option<String>,
    pub salary: Option<Decimal>,
    pub truck_id: Option<i64>,
    pub status: Option<DriverStatus>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewShipment {
    pub truck_id: i64,
    pub driver_id: i64,
    pub origin: String,
    pub destination: String,
    pub cargo: String,
    pub revenue: Decimal,
    #[serde(default = "default_shipment_status")]
    pub status: ShipmentStatus,
    /// Defaults to the insertion time when absent.
    pub shipment_date: Option<DateTime<Utc>>,
}

/// Only the status and the agreed charge can change after booking.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ShipmentUpdate {
    pub status: Option<ShipmentStatus>,
    pub revenue: Option<Decimal>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewRevenue {
    pub truck_id: i64,
    pub shipment_id: Option<i64>,
    pub amount: Decimal,
    pub revenue_date: Option<DateTime<Utc>>,
    pub description: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewExpense {
    pub truck_id: i64,
    pub driver_id: Option<i64>,
    pub expense_type: ExpenseType,
    pub amount: Decimal,
    pub expense_date: Option<DateTime<Utc>>,
    pub description: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewMaintenanceRecord {
    pub truck_id: i64,
    pub maintenance_type: String,
    pub cost: Decimal,
    pub maintenance_date: Option<DateTime<Utc>>,
    pub description: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewNotification {
    pub truck_id: Option<i64>,
    pub title: String,
    pub message: String,
    pub notification_type: NotificationType,
}

/// The full capability set the engines are handed.
///
/// Every aggregation the application performs goes through these filtered
/// list/sum queries; the only write the computation layer performs is the
/// notification insert. Entity mutation (CRUD, maintenance recording) is
/// used by the HTTP boundary.
///
/// List queries return rows in store iteration order (insertion order for
/// the in-memory store, primary-key order for PostgreSQL). Sum queries
/// return zero when no row matches.
#[async_trait]
pub trait LedgerStore: Send + Sync {
    // ---- Trucks ----
    async fn truck(&self, id: i64) -> Result<Option<Truck>, StoreError>;
    async fn trucks(&self) -> Result<Vec<Truck>, StoreError>;
    async fn truck_with_plate(&self, plate: &str) -> Result<Option<Truck>, StoreError>;
    async fn insert_truck(&self, new: NewTruck) -> Result<Truck, StoreError>;
    async fn update_truck(&self, id: i64, update: TruckUpdate)
        -> Result<Option<Truck>, StoreError>;
    /// Deletes the truck and cascades to its drivers, shipments, revenues,
    /// expenses, and maintenance records. Notifications keep their row but
    /// lose the truck reference.
    async fn delete_truck(&self, id: i64) -> Result<bool, StoreError>;

    // ---- Drivers ----
    async fn driver(&self, id: i64) -> Result<Option<Driver>, StoreError>;
    async fn drivers(&self) -> Result<Vec<Driver>, StoreError>;
    async fn insert_driver(&self, new: NewDriver) -> Result<Driver, StoreError>;
    async fn update_driver(
        &self,
        id: i64,
        update: DriverUpdate,
    ) -> Result<Option<Driver>, StoreError>;
    /// Deletes the driver and cascades to their shipments and driver-scoped
    /// expenses.
    async fn delete_driver(&self, id: i64) -> Result<bool, StoreError>;

    // ---- Shipments ----
    async fn shipments(&self) -> Result<Vec<Shipment>, StoreError>;
    async fn shipments_for_driver(
        &self,
        driver_id: i64,
        window: &Window,
    ) -> Result<Vec<Shipment>, StoreError>;
    async fn shipments_for_truck(
        &self,
        truck_id: i64,
        window: &Window,
    ) -> Result<Vec<Shipment>, StoreError>;
    /// Booking a shipment also bumps the truck's running shipment count.
    async fn insert_shipment(&self, new: NewShipment) -> Result<Shipment, StoreError>;
    async fn update_shipment(
        &self,
        id: i64,
        update: ShipmentUpdate,
    ) -> Result<Option<Shipment>, StoreError>;

    // ---- Revenues ----
    async fn revenues(&self) -> Result<Vec<Revenue>, StoreError>;
    async fn insert_revenue(&self, new: NewRevenue) -> Result<Revenue, StoreError>;
    async fn revenue_total_for_truck(
        &self,
        truck_id: i64,
        window: &Window,
    ) -> Result<Decimal, StoreError>;
    async fn revenue_total(&self, window: &Window) -> Result<Decimal, StoreError>;

    // ---- Expenses ----
    async fn expenses(&self) -> Result<Vec<Expense>, StoreError>;
    /// The full expense history charged to one driver, unwindowed.
    async fn expenses_for_driver(&self, driver_id: i64) -> Result<Vec<Expense>, StoreError>;
    async fn expenses_in(&self, window: &Window) -> Result<Vec<Expense>, StoreError>;
    async fn insert_expense(&self, new: NewExpense) -> Result<Expense, StoreError>;
    async fn expense_total_for_truck(
        &self,
        truck_id: i64,
        window: &Window,
    ) -> Result<Decimal, StoreError>;
    async fn expense_total_for_driver(
        &self,
        driver_id: i64,
        window: &Window,
    ) -> Result<Decimal, StoreError>;
    async fn expense_total(&self, window: &Window) -> Result<Decimal, StoreError>;

    // ---- Maintenance ----
    async fn maintenance_records(&self) -> Result<Vec<MaintenanceRecord>, StoreError>;
    /// Records a maintenance event atomically: the record itself, a matching
    /// `maintenance` expense for the same amount against the truck, and the
    /// truck's `last_maintenance_date` stamped to the current time.
    ///
    /// Returns `None` when the truck does not exist; nothing is written.
    async fn record_maintenance(
        &self,
        new: NewMaintenanceRecord,
    ) -> Result<Option<MaintenanceRecord>, StoreError>;

    // ---- Notifications ----
    async fn insert_notification(&self, new: NewNotification)
        -> Result<Notification, StoreError>;
    /// The most recent notifications, newest first.
    async fn notifications(&self, limit: i64) -> Result<Vec<Notification>, StoreError>;
    async fn unread_notifications(&self) -> Result<Vec<Notification>, StoreError>;
    /// Returns `false` for an unknown id; a missing notification is not an
    /// error.
    async fn mark_notification_read(&self, id: i64) -> Result<bool, StoreError>;
    async fn delete_notification(&self, id: i64) -> Result<bool, StoreError>;
}
