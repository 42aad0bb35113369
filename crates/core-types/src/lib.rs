pub mod enums;
pub mod error;
pub mod structs;
pub mod window;

// Re-export the core types to provide a clean public API.
pub use enums::{
    AccountStatus, DriverStatus, ExpenseType, NotificationType, ShipmentStatus, TruckStatus,
};
pub use error::CoreError;
pub use structs::{
    Driver, Expense, MaintenanceRecord, Notification, Revenue, Shipment, Truck,
};
pub use window::Window;
