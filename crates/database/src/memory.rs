use crate::error::StoreError;
use crate::store::{
    DriverUpdate, LedgerStore, NewDriver, NewExpense, NewMaintenanceRecord, NewNotification,
    NewRevenue, NewShipment, NewTruck, ShipmentUpdate, TruckUpdate,
};
use async_trait::async_trait;
use chrono::Utc;
use core_types::{
    Driver, Expense, ExpenseType, MaintenanceRecord, Notification, Revenue, Shipment, Truck,
    Window,
};
use rust_decimal::Decimal;
use tokio::sync::RwLock;

/// A complete in-memory `LedgerStore`.
///
/// Rows live in plain vectors in insertion order, with per-table id
/// sequences starting at 1, mirroring the relational store closely enough
/// that every engine behaves identically against either implementation.
/// Used by the test suites and by `serve --memory`.
#[derive(Debug, Default)]
pub struct MemoryLedger {
    tables: RwLock<Tables>,
}

#[derive(Debug, Default)]
struct Tables {
    trucks: Vec<Truck>,
    drivers: Vec<Driver>,
    shipments: Vec<Shipment>,
    revenues: Vec<Revenue>,
    maintenance: Vec<MaintenanceRecord>,
    expenses: Vec<Expense>,
    notifications: Vec<Notification>,
    truck_seq: i64,
    driver_seq: i64,
    shipment_seq: i64,
    revenue_seq: i64,
    expense_seq: i64,
    maintenance_seq: i64,
    notification_seq: i64,
}

fn next(seq: &mut i64) -> i64 {
    *seq += 1;
    *seq
}

impl Tables {
    fn push_expense(&mut self, new: NewExpense) -> Expense {
        let now = Utc::now();
        let expense = Expense {
            id: next(&mut self.expense_seq),
            truck_id: new.truck_id,
            driver_id: new.driver_id,
            expense_type: new.expense_type,
            amount: new.amount,
            expense_date: new.expense_date.unwrap_or(now),
            description: new.description,
            created_at: now,
        };
        self.expenses.push(expense.clone());
        expense
    }

    /// Removes the given shipments along with the revenue rows booked
    /// against them.
    fn drop_shipments<F: Fn(&Shipment) -> bool>(&mut self, doomed: F) {
        let removed: Vec<i64> = self
            .shipments
            .iter()
            .filter(|s| doomed(s))
            .map(|s| s.id)
            .collect();
        self.shipments.retain(|s| !removed.contains(&s.id));
        self.revenues
            .retain(|r| !r.shipment_id.map_or(false, |sid| removed.contains(&sid)));
    }
}

impl MemoryLedger {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl LedgerStore for MemoryLedger {
    // ---- Trucks ----

    async fn truck(&self, id: i64) -> Result<Option<Truck>, StoreError> {
        let t = self.tables.read().await;
        Ok(t.trucks.iter().find(|x| x.id == id).cloned())
    }

    async fn trucks(&self) -> Result<Vec<Truck>, StoreError> {
        Ok(self.tables.read().await.trucks.clone())
    }

    async fn truck_with_plate(&self, plate: &str) -> Result<Option<Truck>, StoreError> {
        let t = self.tables.read().await;
        Ok(t.trucks.iter().find(|x| x.plate == plate).cloned())
    }

    async fn insert_truck(&self, new: NewTruck) -> Result<Truck, StoreError> {
        let mut t = self.tables.write().await;
        let truck = Truck {
            id: next(&mut t.truck_seq),
            truck_type: new.truck_type,
            plate: new.plate,
            status: new.status,
            last_maintenance_date: None,
            total_shipments: 0,
            created_at: Utc::now(),
        };
        t.trucks.push(truck.clone());
        Ok(truck)
    }

    async fn update_truck(
        &self,
        id: i64,
        update: TruckUpdate,
    ) -> Result<Option<Truck>, StoreError> {
        let mut t = self.tables.write().await;
        let Some(truck) = t.trucks.iter_mut().find(|x| x.id == id) else {
            return Ok(None);
        };
        if let Some(truck_type) = update.truck_type {
            truck.truck_type = truck_type;
        }
        if let Some(plate) = update.plate {
            truck.plate = plate;
        }
        if let Some(status) = update.status {
            truck.status = status;
        }
        if let Some(at) = update.last_maintenance_date {
            truck.last_maintenance_date = Some(at);
        }
        Ok(Some(truck.clone()))
    }

    async fn delete_truck(&self, id: i64) -> Result<bool, StoreError> {
        let mut t = self.tables.write().await;
        let before = t.trucks.len();
        t.trucks.retain(|x| x.id != id);
        if t.trucks.len() == before {
            return Ok(false);
        }
        let orphaned: Vec<i64> = t
            .drivers
            .iter()
            .filter(|d| d.truck_id == Some(id))
            .map(|d| d.id)
            .collect();
        t.drivers.retain(|d| d.truck_id != Some(id));
        t.drop_shipments(|s| s.truck_id == id || orphaned.contains(&s.driver_id));
        t.revenues.retain(|r| r.truck_id != id);
        t.expenses.retain(|e| {
            e.truck_id != id && !e.driver_id.map_or(false, |d| orphaned.contains(&d))
        });
        t.maintenance.retain(|m| m.truck_id != id);
        for n in t.notifications.iter_mut() {
            if n.truck_id == Some(id) {
                n.truck_id = None;
            }
        }
        Ok(true)
    }

    // ---- Drivers ----

    async fn driver(&self, id: i64) -> Result<Option<Driver>, StoreError> {
        let t = self.tables.read().await;
        Ok(t.drivers.iter().find(|x| x.id == id).cloned())
    }

    async fn drivers(&self) -> Result<Vec<Driver>, StoreError> {
        Ok(self.tables.read().await.drivers.clone())
    }

    async fn insert_driver(&self, new: NewDriver) -> Result<Driver, StoreError> {
        let mut t = self.tables.write().await;
        let driver = Driver {
            id: next(&mut t.driver_seq),
            name: new.name,
            phone: new.phone,
            salary: new.salary,
            truck_id: new.truck_id,
            status: new.status,
            created_at: Utc::now(),
        };
        t.drivers.push(driver.clone());
        Ok(driver)
    }

    async fn update_driver(
        &self,
        id: i64,
        update: DriverUpdate,
    ) -> Result<Option<Driver>, StoreError> {
        let mut t = self.tables.write().await;
        let Some(driver) = t.drivers.iter_mut().find(|x| x.id == id) else {
            return Ok(None);
        };
        if let Some(name) = update.name {
            driver.name = name;
        }
        if let Some(phone) = update.phone {
            driver.phone = phone;
        }
        if let Some(salary) = update.salary {
            driver.salary = salary;
        }
        if let Some(truck_id) = update.truck_id {
            driver.truck_id = Some(truck_id);
        }
        if let Some(status) = update.status {
            driver.status = status;
        }
        Ok(Some(driver.clone()))
    }

    async fn delete_driver(&self, id: i64) -> Result<bool, StoreError> {
        let mut t = self.tables.write().await;
        let before = t.drivers.len();
        t.drivers.retain(|x| x.id != id);
        if t.drivers.len() == before {
            return Ok(false);
        }
        t.drop_shipments(|s| s.driver_id == id);
        t.expenses.retain(|e| e.driver_id != Some(id));
        Ok(true)
    }

    // ---- Shipments ----

    async fn shipments(&self) -> Result<Vec<Shipment>, StoreError> {
        Ok(self.tables.read().await.shipments.clone())
    }

    async fn shipments_for_driver(
        &self,
        driver_id: i64,
        window: &Window,
    ) -> Result<Vec<Shipment>, StoreError> {
        let t = self.tables.read().await;
        Ok(t.shipments
            .iter()
            .filter(|s| s.driver_id == driver_id && window.contains(s.shipment_date))
            .cloned()
            .collect())
    }

    async fn shipments_for_truck(
        &self,
        truck_id: i64,
        window: &Window,
    ) -> Result<Vec<Shipment>, StoreError> {
        let t = self.tables.read().await;
        Ok(t.shipments
            .iter()
            .filter(|s| s.truck_id == truck_id && window.contains(s.shipment_date))
            .cloned()
            .collect())
    }

    async fn insert_shipment(&self, new: NewShipment) -> Result<Shipment, StoreError> {
        let mut t = self.tables.write().await;
        let now = Utc::now();
        let shipment = Shipment {
            id: next(&mut t.shipment_seq),
            truck_id: new.truck_id,
            driver_id: new.driver_id,
            origin: new.origin,
            destination: new.destination,
            cargo: new.cargo,
            revenue: new.revenue,
            status: new.status,
            shipment_date: new.shipment_date.unwrap_or(now),
            created_at: now,
        };
        t.shipments.push(shipment.clone());
        if let Some(truck) = t.trucks.iter_mut().find(|x| x.id == new.truck_id) {
            truck.total_shipments += 1;
        }
        Ok(shipment)
    }

    async fn update_shipment(
        &self,
        id: i64,
        update: ShipmentUpdate,
    ) -> Result<Option<Shipment>, StoreError> {
        let mut t = self.tables.write().await;
        let Some(shipment) = t.shipments.iter_mut().find(|x| x.id == id) else {
            return Ok(None);
        };
        if let Some(status) = update.status {
            shipment.status = status;
        }
        if let Some(revenue) = update.revenue {
            shipment.revenue = revenue;
        }
        Ok(Some(shipment.clone()))
    }

    // ---- Revenues ----

    async fn revenues(&self) -> Result<Vec<Revenue>, StoreError> {
        Ok(self.tables.read().await.revenues.clone())
    }

    async fn insert_revenue(&self, new: NewRevenue) -> Result<Revenue, StoreError> {
        let mut t = self.tables.write().await;
        let now = Utc::now();
        let revenue = Revenue {
            id: next(&mut t.revenue_seq),
            truck_id: new.truck_id,
            shipment_id: new.shipment_id,
            amount: new.amount,
            revenue_date: new.revenue_date.unwrap_or(now),
            description: new.description,
            created_at: now,
        };
        t.revenues.push(revenue.clone());
        Ok(revenue)
    }

    async fn revenue_total_for_truck(
        &self,
        truck_id: i64,
        window: &Window,
    ) -> Result<Decimal, StoreError> {
        let t = self.tables.read().await;
        Ok(t.revenues
            .iter()
            .filter(|r| r.truck_id == truck_id && window.contains(r.revenue_date))
            .map(|r| r.amount)
            .sum())
    }

    async fn revenue_total(&self, window: &Window) -> Result<Decimal, StoreError> {
        let t = self.tables.read().await;
        Ok(t.revenues
            .iter()
            .filter(|r| window.contains(r.revenue_date))
            .map(|r| r.amount)
            .sum())
    }

    // ---- Expenses ----

    async fn expenses(&self) -> Result<Vec<Expense>, StoreError> {
        Ok(self.tables.read().await.expenses.clone())
    }

    async fn expenses_for_driver(&self, driver_id: i64) -> Result<Vec<Expense>, StoreError> {
        let t = self.tables.read().await;
        Ok(t.expenses
            .iter()
            .filter(|e| e.driver_id == Some(driver_id))
            .cloned()
            .collect())
    }

    async fn expenses_in(&self, window: &Window) -> Result<Vec<Expense>, StoreError> {
        let t = self.tables.read().await;
        Ok(t.expenses
            .iter()
            .filter(|e| window.contains(e.expense_date))
            .cloned()
            .collect())
    }

    async fn insert_expense(&self, new: NewExpense) -> Result<Expense, StoreError> {
        let mut t = self.tables.write().await;
        Ok(t.push_expense(new))
    }

    async fn expense_total_for_truck(
        &self,
        truck_id: i64,
        window: &Window,
    ) -> Result<Decimal, StoreError> {
        let t = self.tables.read().await;
        Ok(t.expenses
            .iter()
            .filter(|e| e.truck_id == truck_id && window.contains(e.expense_date))
            .map(|e| e.amount)
            .sum())
    }

    async fn expense_total_for_driver(
        &self,
        driver_id: i64,
        window: &Window,
    ) -> Result<Decimal, StoreError> {
        let t = self.tables.read().await;
        Ok(t.expenses
            .iter()
            .filter(|e| e.driver_id == Some(driver_id) && window.contains(e.expense_date))
            .map(|e| e.amount)
            .sum())
    }

    async fn expense_total(&self, window: &Window) -> Result<Decimal, StoreError> {
        let t = self.tables.read().await;
        Ok(t.expenses
            .iter()
            .filter(|e| window.contains(e.expense_date))
            .map(|e| e.amount)
            .sum())
    }

    // ---- Maintenance ----

    async fn maintenance_records(&self) -> Result<Vec<MaintenanceRecord>, StoreError> {
        Ok(self.tables.read().await.maintenance.clone())
    }

    async fn record_maintenance(
        &self,
        new: NewMaintenanceRecord,
    ) -> Result<Option<MaintenanceRecord>, StoreError> {
        let mut t = self.tables.write().await;
        let now = Utc::now();
        let Some(truck) = t.trucks.iter_mut().find(|x| x.id == new.truck_id) else {
            tracing::debug!(truck_id = new.truck_id, "maintenance for unknown truck ignored");
            return Ok(None);
        };
        truck.last_maintenance_date = Some(now);
        let record = MaintenanceRecord {
            id: next(&mut t.maintenance_seq),
            truck_id: new.truck_id,
            maintenance_type: new.maintenance_type.clone(),
            cost: new.cost,
            maintenance_date: new.maintenance_date.unwrap_or(now),
            description: new.description.clone(),
            created_at: now,
        };
        t.maintenance.push(record.clone());
        let description = match new.description {
            Some(detail) => format!("Maintenance: {} - {}", new.maintenance_type, detail),
            None => format!("Maintenance: {}", new.maintenance_type),
        };
        t.push_expense(NewExpense {
            truck_id: new.truck_id,
            driver_id: None,
            expense_type: ExpenseType::Maintenance,
            amount: new.cost,
            expense_date: Some(now),
            description: Some(description),
        });
        Ok(Some(record))
    }

    // ---- Notifications ----

    async fn insert_notification(
        &self,
        new: NewNotification,
    ) -> Result<Notification, StoreError> {
        let mut t = self.tables.write().await;
        let notification = Notification {
            id: next(&mut t.notification_seq),
            truck_id: new.truck_id,
            title: new.title,
            message: new.message,
            notification_type: new.notification_type,
            is_read: false,
            created_at: Utc::now(),
        };
        t.notifications.push(notification.clone());
        Ok(notification)
    }

    async fn notifications(&self, limit: i64) -> Result<Vec<Notification>, StoreError> {
        let t = self.tables.read().await;
        let mut rows = t.notifications.clone();
        rows.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
        rows.truncate(limit.max(0) as usize);
        Ok(rows)
    }

    async fn unread_notifications(&self) -> Result<Vec<Notification>, StoreError> {
        let t = self.tables.read().await;
        Ok(t.notifications.iter().filter(|n| !n.is_read).cloned().collect())
    }

    async fn mark_notification_read(&self, id: i64) -> Result<bool, StoreError> {
        let mut t = self.tables.write().await;
        match t.notifications.iter_mut().find(|n| n.id == id) {
            Some(notification) => {
                notification.is_read = true;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn delete_notification(&self, id: i64) -> Result<bool, StoreError> {
        let mut t = self.tables.write().await;
        let before = t.notifications.len();
        t.notifications.retain(|n| n.id != id);
        Ok(t.notifications.len() != before)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use core_types::{DriverStatus, NotificationType, ShipmentStatus, TruckStatus};
    use rust_decimal_macros::dec;

    fn a_truck() -> NewTruck {
        NewTruck {
            truck_type: "flatbed".to_string(),
            plate: "QX-1042".to_string(),
            status: TruckStatus::Active,
        }
    }

    #[tokio::test]
    async fn booking_a_shipment_bumps_the_truck_counter() {
        let store = MemoryLedger::new();
        let truck = store.insert_truck(a_truck()).await.unwrap();
        let driver = store
            .insert_driver(NewDriver {
                name: "Samir".to_string(),
                phone: "555-0101".to_string(),
                salary: dec!(2500),
                truck_id: Some(truck.id),
                status: DriverStatus::Active,
            })
            .await
            .unwrap();

        store
            .insert_shipment(NewShipment {
                truck_id: truck.id,
                driver_id: driver.id,
                origin: "Aqaba".to_string(),
                destination: "Amman".to_string(),
                cargo: "containers".to_string(),
                revenue: dec!(1800),
                status: ShipmentStatus::Pending,
                shipment_date: None,
            })
            .await
            .unwrap();

        let truck = store.truck(truck.id).await.unwrap().unwrap();
        assert_eq!(truck.total_shipments, 1);
    }

    #[tokio::test]
    async fn recording_maintenance_stamps_truck_and_books_one_expense() {
        let store = MemoryLedger::new();
        let truck = store.insert_truck(a_truck()).await.unwrap();
        assert!(truck.last_maintenance_date.is_none());

        let record = store
            .record_maintenance(NewMaintenanceRecord {
                truck_id: truck.id,
                maintenance_type: "oil change".to_string(),
                cost: dec!(320.50),
                maintenance_date: None,
                description: None,
            })
            .await
            .unwrap()
            .expect("truck exists");
        assert_eq!(record.cost, dec!(320.50));

        let truck = store.truck(truck.id).await.unwrap().unwrap();
        assert!(truck.last_maintenance_date.is_some());

        let expenses = store.expenses().await.unwrap();
        assert_eq!(expenses.len(), 1);
        assert_eq!(expenses[0].expense_type, ExpenseType::Maintenance);
        assert_eq!(expenses[0].amount, dec!(320.50));
        assert_eq!(expenses[0].driver_id, None);
    }

    #[tokio::test]
    async fn recording_maintenance_for_unknown_truck_writes_nothing() {
        let store = MemoryLedger::new();
        let record = store
            .record_maintenance(NewMaintenanceRecord {
                truck_id: 99,
                maintenance_type: "brakes".to_string(),
                cost: dec!(100),
                maintenance_date: None,
                description: None,
            })
            .await
            .unwrap();
        assert!(record.is_none());
        assert!(store.expenses().await.unwrap().is_empty());
        assert!(store.maintenance_records().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn deleting_a_truck_cascades_and_detaches_notifications() {
        let store = MemoryLedger::new();
        let truck = store.insert_truck(a_truck()).await.unwrap();
        let driver = store
            .insert_driver(NewDriver {
                name: "Hani".to_string(),
                phone: "555-0102".to_string(),
                salary: dec!(2000),
                truck_id: Some(truck.id),
                status: DriverStatus::Active,
            })
            .await
            .unwrap();
        store
            .insert_shipment(NewShipment {
                truck_id: truck.id,
                driver_id: driver.id,
                origin: "A".to_string(),
                destination: "B".to_string(),
                cargo: "steel".to_string(),
                revenue: dec!(900),
                status: ShipmentStatus::Delivered,
                shipment_date: None,
            })
            .await
            .unwrap();
        store
            .insert_expense(NewExpense {
                truck_id: truck.id,
                driver_id: Some(driver.id),
                expense_type: ExpenseType::Fuel,
                amount: dec!(150),
                expense_date: None,
                description: None,
            })
            .await
            .unwrap();
        store
            .insert_notification(NewNotification {
                truck_id: Some(truck.id),
                title: "note".to_string(),
                message: "msg".to_string(),
                notification_type: NotificationType::Info,
            })
            .await
            .unwrap();

        assert!(store.delete_truck(truck.id).await.unwrap());
        assert!(store.trucks().await.unwrap().is_empty());
        assert!(store.drivers().await.unwrap().is_empty());
        assert!(store.shipments().await.unwrap().is_empty());
        assert!(store.expenses().await.unwrap().is_empty());
        let notifications = store.notifications(10).await.unwrap();
        assert_eq!(notifications.len(), 1);
        assert_eq!(notifications[0].truck_id, None);
    }

    #[tokio::test]
    async fn marking_an_unknown_notification_read_is_a_false_return() {
        let store = MemoryLedger::new();
        assert!(!store.mark_notification_read(7).await.unwrap());
    }
}
