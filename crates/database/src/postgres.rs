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
use sqlx::postgres::{PgPool, PgRow};
use sqlx::Row;
use std::str::FromStr;

/// The PostgreSQL-backed `LedgerStore`.
///
/// All queries are runtime-bound so the crate compiles without a live
/// database; status and type columns are stored as text and decoded through
/// the enum `FromStr` impls.
#[derive(Debug, Clone)]
pub struct PgLedger {
    pool: PgPool,
}

impl PgLedger {
    /// Creates a new `PgLedger` with a shared database connection pool.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

fn parse_enum<T>(value: &str) -> Result<T, StoreError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    value
        .parse::<T>()
        .map_err(|e| StoreError::Corrupt(e.to_string()))
}

fn truck_from_row(row: &PgRow) -> Result<Truck, StoreError> {
    Ok(Truck {
        id: row.try_get("id")?,
        truck_type: row.try_get("truck_type")?,
        plate: row.try_get("plate")?,
        status: parse_enum(row.try_get::<String, _>("status")?.as_str())?,
        last_maintenance_date: row.try_get("last_maintenance_date")?,
        total_shipments: row.try_get("total_shipments")?,
        created_at: row.try_get("created_at")?,
    })
}

fn driver_from_row(row: &PgRow) -> Result<Driver, StoreError> {
    Ok(Driver {
        id: row.try_get("id")?,
        name: row.try_get("name")?,
        phone: row.try_get("phone")?,
        salary: row.try_get("salary")?,
        truck_id: row.try_get("truck_id")?,
        status: parse_enum(row.try_get::<String, _>("status")?.as_str())?,
        created_at: row.try_get("created_at")?,
    })
}

fn shipment_from_row(row: &PgRow) -> Result<Shipment, StoreError> {
    Ok(Shipment {
        id: row.try_get("id")?,
        truck_id: row.try_get("truck_id")?,
        driver_id: row.try_get("driver_id")?,
        origin: row.try_get("origin")?,
        destination: row.try_get("destination")?,
        cargo: row.try_get("cargo")?,
        revenue: row.try_get("revenue")?,
        status: parse_enum(row.try_get::<String, _>("status")?.as_str())?,
        shipment_date: row.try_get("shipment_date")?,
        created_at: row.try_get("created_at")?,
    })
}

fn revenue_from_row(row: &PgRow) -> Result<Revenue, StoreError> {
    Ok(Revenue {
        id: row.try_get("id")?,
        truck_id: row.try_get("truck_id")?,
        shipment_id: row.try_get("shipment_id")?,
        amount: row.try_get("amount")?,
        revenue_date: row.try_get("revenue_date")?,
        description: row.try_get("description")?,
        created_at: row.try_get("created_at")?,
    })
}

fn expense_from_row(row: &PgRow) -> Result<Expense, StoreError> {
    Ok(Expense {
        id: row.try_get("id")?,
        truck_id: row.try_get("truck_id")?,
        driver_id: row.try_get("driver_id")?,
        expense_type: parse_enum(row.try_get::<String, _>("expense_type")?.as_str())?,
        amount: row.try_get("amount")?,
        expense_date: row.try_get("expense_date")?,
        description: row.try_get("description")?,
        created_at: row.try_get("created_at")?,
    })
}

fn maintenance_from_row(row: &PgRow) -> Result<MaintenanceRecord, StoreError> {
    Ok(MaintenanceRecord {
        id: row.try_get("id")?,
        truck_id: row.try_get("truck_id")?,
        maintenance_type: row.try_get("maintenance_type")?,
        cost: row.try_get("cost")?,
        maintenance_date: row.try_get("maintenance_date")?,
        description: row.try_get("description")?,
        created_at: row.try_get("created_at")?,
    })
}

fn notification_from_row(row: &PgRow) -> Result<Notification, StoreError> {
    Ok(Notification {
        id: row.try_get("id")?,
        truck_id: row.try_get("truck_id")?,
        title: row.try_get("title")?,
        message: row.try_get("message")?,
        notification_type: parse_enum(row.try_get::<String, _>("notification_type")?.as_str())?,
        is_read: row.try_get("is_read")?,
        created_at: row.try_get("created_at")?,
    })
}

// The window bounds are always bound as the last two parameters; a NULL
// bound leaves that side of the range open.
const REVENUE_WINDOW: &str =
    "($2::timestamptz IS NULL OR revenue_date >= $2) AND ($3::timestamptz IS NULL OR revenue_date <= $3)";
const EXPENSE_WINDOW: &str =
    "($2::timestamptz IS NULL OR expense_date >= $2) AND ($3::timestamptz IS NULL OR expense_date <= $3)";
const SHIPMENT_WINDOW: &str =
    "($2::timestamptz IS NULL OR shipment_date >= $2) AND ($3::timestamptz IS NULL OR shipment_date <= $3)";

#[async_trait]
impl LedgerStore for PgLedger {
    // ---- Trucks ----

    async fn truck(&self, id: i64) -> Result<Option<Truck>, StoreError> {
        let row = sqlx::query("SELECT * FROM trucks WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        row.as_ref().map(truck_from_row).transpose()
    }

    async fn trucks(&self) -> Result<Vec<Truck>, StoreError> {
        let rows = sqlx::query("SELECT * FROM trucks ORDER BY id")
            .fetch_all(&self.pool)
            .await?;
        rows.iter().map(truck_from_row).collect()
    }

    async fn truck_with_plate(&self, plate: &str) -> Result<Option<Truck>, StoreError> {
        let row = sqlx::query("SELECT * FROM trucks WHERE plate = $1")
            .bind(plate)
            .fetch_optional(&self.pool)
            .await?;
        row.as_ref().map(truck_from_row).transpose()
    }

    async fn insert_truck(&self, new: NewTruck) -> Result<Truck, StoreError> {
        let row = sqlx::query(
            "INSERT INTO trucks (truck_type, plate, status) VALUES ($1, $2, $3) RETURNING *",
        )
        .bind(new.truck_type)
        .bind(new.plate)
        .bind(new.status.to_string())
        .fetch_one(&self.pool)
        .await?;
        truck_from_row(&row)
    }

    async fn update_truck(
        &self,
        id: i64,
        update: TruckUpdate,
    ) -> Result<Option<Truck>, StoreError> {
        let row = sqlx::query(
            r#"
            UPDATE trucks SET
                truck_type = COALESCE($2, truck_type),
                plate = COALESCE($3, plate),
                status = COALESCE($4, status),
                last_maintenance_date = COALESCE($5, last_maintenance_date)
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(update.truck_type)
        .bind(update.plate)
        .bind(update.status.map(|s| s.to_string()))
        .bind(update.last_maintenance_date)
        .fetch_optional(&self.pool)
        .await?;
        row.as_ref().map(truck_from_row).transpose()
    }

    async fn delete_truck(&self, id: i64) -> Result<bool, StoreError> {
        // Notifications are detached rather than deleted; the FK is
        // ON DELETE SET NULL while every other dependent cascades.
        let result = sqlx::query("DELETE FROM trucks WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    // ---- Drivers ----

    async fn driver(&self, id: i64) -> Result<Option<Driver>, StoreError> {
        let row = sqlx::query("SELECT * FROM drivers WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        row.as_ref().map(driver_from_row).transpose()
    }

    async fn drivers(&self) -> Result<Vec<Driver>, StoreError> {
        let rows = sqlx::query("SELECT * FROM drivers ORDER BY id")
            .fetch_all(&self.pool)
            .await?;
        rows.iter().map(driver_from_row).collect()
    }

    async fn insert_driver(&self, new: NewDriver) -> Result<Driver, StoreError> {
        let row = sqlx::query(
            "INSERT INTO drivers (name, phone, salary, truck_id, status) VALUES ($1, $2, $3, $4, $5) RETURNING *",
        )
        .bind(new.name)
        .bind(new.phone)
        .bind(new.salary)
        .bind(new.truck_id)
        .bind(new.status.to_string())
        .fetch_one(&self.pool)
        .await?;
        driver_from_row(&row)
    }

    async fn update_driver(
        &self,
        id: i64,
        update: DriverUpdate,
    ) -> Result<Option<Driver>, StoreError> {
        let row = sqlx::query(
            r#"
            UPDATE drivers SET
                name = COALESCE($2, name),
                phone = COALESCE($3, phone),
                salary = COALESCE($4, salary),
                truck_id = COALESCE($5, truck_id),
                status = COALESCE($6, status)
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(update.name)
        .bind(update.phone)
        .bind(update.salary)
        .bind(update.truck_id)
        .bind(update.status.map(|s| s.to_string()))
        .fetch_optional(&self.pool)
        .await?;
        row.as_ref().map(driver_from_row).transpose()
    }

    async fn delete_driver(&self, id: i64) -> Result<bool, StoreError> {
        let result = sqlx::query("DELETE FROM drivers WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    // ---- Shipments ----

    async fn shipments(&self) -> Result<Vec<Shipment>, StoreError> {
        let rows = sqlx::query("SELECT * FROM shipments ORDER BY id")
            .fetch_all(&self.pool)
            .await?;
        rows.iter().map(shipment_from_row).collect()
    }

    async fn shipments_for_driver(
        &self,
        driver_id: i64,
        window: &Window,
    ) -> Result<Vec<Shipment>, StoreError> {
        let sql = format!(
            "SELECT * FROM shipments WHERE driver_id = $1 AND {SHIPMENT_WINDOW} ORDER BY id"
        );
        let rows = sqlx::query(&sql)
            .bind(driver_id)
            .bind(window.start)
            .bind(window.end)
            .fetch_all(&self.pool)
            .await?;
        rows.iter().map(shipment_from_row).collect()
    }

    async fn shipments_for_truck(
        &self,
        truck_id: i64,
        window: &Window,
    ) -> Result<Vec<Shipment>, StoreError> {
        let sql = format!(
            "SELECT * FROM shipments WHERE truck_id = $1 AND {SHIPMENT_WINDOW} ORDER BY id"
        );
        let rows = sqlx::query(&sql)
            .bind(truck_id)
            .bind(window.start)
            .bind(window.end)
            .fetch_all(&self.pool)
            .await?;
        rows.iter().map(shipment_from_row).collect()
    }

    async fn insert_shipment(&self, new: NewShipment) -> Result<Shipment, StoreError> {
        let mut tx = self.pool.begin().await?;
        let row = sqlx::query(
            r#"
            INSERT INTO shipments
                (truck_id, driver_id, origin, destination, cargo, revenue, status, shipment_date)
            VALUES ($1, $2, $3, $4, $5, $6, $7, COALESCE($8, NOW()))
            RETURNING *
            "#,
        )
        .bind(new.truck_id)
        .bind(new.driver_id)
        .bind(new.origin)
        .bind(new.destination)
        .bind(new.cargo)
        .bind(new.revenue)
        .bind(new.status.to_string())
        .bind(new.shipment_date)
        .fetch_one(&mut *tx)
        .await?;
        sqlx::query("UPDATE trucks SET total_shipments = total_shipments + 1 WHERE id = $1")
            .bind(new.truck_id)
            .execute(&mut *tx)
            .await?;
        tx.commit().await?;
        shipment_from_row(&row)
    }

    async fn update_shipment(
        &self,
        id: i64,
        update: ShipmentUpdate,
    ) -> Result<Option<Shipment>, StoreError> {
        let row = sqlx::query(
            r#"
            UPDATE shipments SET
                status = COALESCE($2, status),
                revenue = COALESCE($3, revenue)
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(update.status.map(|s| s.to_string()))
        .bind(update.revenue)
        .fetch_optional(&self.pool)
        .await?;
        row.as_ref().map(shipment_from_row).transpose()
    }

    // ---- Revenues ----

    async fn revenues(&self) -> Result<Vec<Revenue>, StoreError> {
        let rows = sqlx::query("SELECT * FROM revenues ORDER BY id")
            .fetch_all(&self.pool)
            .await?;
        rows.iter().map(revenue_from_row).collect()
    }

    async fn insert_revenue(&self, new: NewRevenue) -> Result<Revenue, StoreError> {
        let row = sqlx::query(
            r#"
            INSERT INTO revenues (truck_id, shipment_id, amount, revenue_date, description)
            VALUES ($1, $2, $3, COALESCE($4, NOW()), $5)
            RETURNING *
            "#,
        )
        .bind(new.truck_id)
        .bind(new.shipment_id)
        .bind(new.amount)
        .bind(new.revenue_date)
        .bind(new.description)
        .fetch_one(&self.pool)
        .await?;
        revenue_from_row(&row)
    }

    async fn revenue_total_for_truck(
        &self,
        truck_id: i64,
        window: &Window,
    ) -> Result<Decimal, StoreError> {
        let sql = format!(
            "SELECT COALESCE(SUM(amount), 0) AS total FROM revenues WHERE truck_id = $1 AND {REVENUE_WINDOW}"
        );
        let row = sqlx::query(&sql)
            .bind(truck_id)
            .bind(window.start)
            .bind(window.end)
            .fetch_one(&self.pool)
            .await?;
        Ok(row.try_get("total")?)
    }

    async fn revenue_total(&self, window: &Window) -> Result<Decimal, StoreError> {
        let row = sqlx::query(
            "SELECT COALESCE(SUM(amount), 0) AS total FROM revenues \
             WHERE ($1::timestamptz IS NULL OR revenue_date >= $1) \
             AND ($2::timestamptz IS NULL OR revenue_date <= $2)",
        )
        .bind(window.start)
        .bind(window.end)
        .fetch_one(&self.pool)
        .await?;
        Ok(row.try_get("total")?)
    }

    // ---- Expenses ----

    async fn expenses(&self) -> Result<Vec<Expense>, StoreError> {
        let rows = sqlx::query("SELECT * FROM expenses ORDER BY id")
            .fetch_all(&self.pool)
            .await?;
        rows.iter().map(expense_from_row).collect()
    }

    async fn expenses_for_driver(&self, driver_id: i64) -> Result<Vec<Expense>, StoreError> {
        let rows = sqlx::query("SELECT * FROM expenses WHERE driver_id = $1 ORDER BY id")
            .bind(driver_id)
            .fetch_all(&self.pool)
            .await?;
        rows.iter().map(expense_from_row).collect()
    }

    async fn expenses_in(&self, window: &Window) -> Result<Vec<Expense>, StoreError> {
        let rows = sqlx::query(
            "SELECT * FROM expenses \
             WHERE ($1::timestamptz IS NULL OR expense_date >= $1) \
             AND ($2::timestamptz IS NULL OR expense_date <= $2) ORDER BY id",
        )
        .bind(window.start)
        .bind(window.end)
        .fetch_all(&self.pool)
        .await?;
        rows.iter().map(expense_from_row).collect()
    }

    async fn insert_expense(&self, new: NewExpense) -> Result<Expense, StoreError> {
        let row = sqlx::query(
            r#"
            INSERT INTO expenses (truck_id, driver_id, expense_type, amount, expense_date, description)
            VALUES ($1, $2, $3, $4, COALESCE($5, NOW()), $6)
            RETURNING *
            "#,
        )
        .bind(new.truck_id)
        .bind(new.driver_id)
        .bind(new.expense_type.to_string())
        .bind(new.amount)
        .bind(new.expense_date)
        .bind(new.description)
        .fetch_one(&self.pool)
        .await?;
        expense_from_row(&row)
    }

    async fn expense_total_for_truck(
        &self,
        truck_id: i64,
        window: &Window,
    ) -> Result<Decimal, StoreError> {
        let sql = format!(
            "SELECT COALESCE(SUM(amount), 0) AS total FROM expenses WHERE truck_id = $1 AND {EXPENSE_WINDOW}"
        );
        let row = sqlx::query(&sql)
            .bind(truck_id)
            .bind(window.start)
            .bind(window.end)
            .fetch_one(&self.pool)
            .await?;
        Ok(row.try_get("total")?)
    }

    async fn expense_total_for_driver(
        &self,
        driver_id: i64,
        window: &Window,
    ) -> Result<Decimal, StoreError> {
        let sql = format!(
            "SELECT COALESCE(SUM(amount), 0) AS total FROM expenses WHERE driver_id = $1 AND {EXPENSE_WINDOW}"
        );
        let row = sqlx::query(&sql)
            .bind(driver_id)
            .bind(window.start)
            .bind(window.end)
            .fetch_one(&self.pool)
            .await?;
        Ok(row.try_get("total")?)
    }

    async fn expense_total(&self, window: &Window) -> Result<Decimal, StoreError> {
        let row = sqlx::query(
            "SELECT COALESCE(SUM(amount), 0) AS total FROM expenses \
             WHERE ($1::timestamptz IS NULL OR expense_date >= $1) \
             AND ($2::timestamptz IS NULL OR expense_date <= $2)",
        )
        .bind(window.start)
        .bind(window.end)
        .fetch_one(&self.pool)
        .await?;
        Ok(row.try_get("total")?)
    }

    // ---- Maintenance ----

    async fn maintenance_records(&self) -> Result<Vec<MaintenanceRecord>, StoreError> {
        let rows = sqlx::query("SELECT * FROM maintenance_records ORDER BY id")
            .fetch_all(&self.pool)
            .await?;
        rows.iter().map(maintenance_from_row).collect()
    }

    async fn record_maintenance(
        &self,
        new: NewMaintenanceRecord,
    ) -> Result<Option<MaintenanceRecord>, StoreError> {
        let mut tx = self.pool.begin().await?;
        let now = Utc::now();

        let truck = sqlx::query("SELECT id FROM trucks WHERE id = $1 FOR UPDATE")
            .bind(new.truck_id)
            .fetch_optional(&mut *tx)
            .await?;
        if truck.is_none() {
            tracing::debug!(truck_id = new.truck_id, "maintenance for unknown truck ignored");
            return Ok(None);
        }

        let row = sqlx::query(
            r#"
            INSERT INTO maintenance_records (truck_id, maintenance_type, cost, maintenance_date, description)
            VALUES ($1, $2, $3, COALESCE($4, $5), $6)
            RETURNING *
            "#,
        )
        .bind(new.truck_id)
        .bind(&new.maintenance_type)
        .bind(new.cost)
        .bind(new.maintenance_date)
        .bind(now)
        .bind(&new.description)
        .fetch_one(&mut *tx)
        .await?;

        sqlx::query("UPDATE trucks SET last_maintenance_date = $2 WHERE id = $1")
            .bind(new.truck_id)
            .bind(now)
            .execute(&mut *tx)
            .await?;

        let description = match &new.description {
            Some(detail) => format!("Maintenance: {} - {}", new.maintenance_type, detail),
            None => format!("Maintenance: {}", new.maintenance_type),
        };
        sqlx::query(
            "INSERT INTO expenses (truck_id, driver_id, expense_type, amount, expense_date, description) \
             VALUES ($1, NULL, $2, $3, $4, $5)",
        )
        .bind(new.truck_id)
        .bind(ExpenseType::Maintenance.to_string())
        .bind(new.cost)
        .bind(now)
        .bind(description)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(Some(maintenance_from_row(&row)?))
    }

    // ---- Notifications ----

    async fn insert_notification(
        &self,
        new: NewNotification,
    ) -> Result<Notification, StoreError> {
        let row = sqlx::query(
            r#"
            INSERT INTO notifications (truck_id, title, message, notification_type)
            VALUES ($1, $2, $3, $4)
            RETURNING *
            "#,
        )
        .bind(new.truck_id)
        .bind(new.title)
        .bind(new.message)
        .bind(new.notification_type.to_string())
        .fetch_one(&self.pool)
        .await?;
        notification_from_row(&row)
    }

    async fn notifications(&self, limit: i64) -> Result<Vec<Notification>, StoreError> {
        let rows = sqlx::query(
            "SELECT * FROM notifications ORDER BY created_at DESC, id DESC LIMIT $1",
        )
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;
        rows.iter().map(notification_from_row).collect()
    }

    async fn unread_notifications(&self) -> Result<Vec<Notification>, StoreError> {
        let rows = sqlx::query("SELECT * FROM notifications WHERE is_read = FALSE ORDER BY id")
            .fetch_all(&self.pool)
            .await?;
        rows.iter().map(notification_from_row).collect()
    }

    async fn mark_notification_read(&self, id: i64) -> Result<bool, StoreError> {
        let result = sqlx::query("UPDATE notifications SET is_read = TRUE WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn delete_notification(&self, id: i64) -> Result<bool, StoreError> {
        let result = sqlx::query("DELETE FROM notifications WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
