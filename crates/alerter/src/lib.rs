//! # Fleetbooks Alerter
//!
//! Threshold checks over the derived financial state. Each check is a pure
//! comparison with a single side effect on breach: a Notification row is
//! inserted through the ledger store for the operations team to work
//! through.

use chrono::Utc;
use core_types::{Notification, NotificationType, Window};
use database::{LedgerStore, NewNotification};
use rust_decimal::Decimal;

pub mod error;

pub use error::AlerterError;

/// A truck is considered overdue when its last service is at least this many
/// days old, unless the caller picks another threshold.
pub const DEFAULT_MAINTENANCE_THRESHOLD_DAYS: i64 = 30;

/// The trailing window the profitability check looks back over by default.
pub const DEFAULT_PROFIT_WINDOW_DAYS: i64 = 30;

/// Evaluates notification thresholds and raises Notification rows on breach.
#[derive(Debug, Clone, Default)]
pub struct NotificationEvaluator {}

impl NotificationEvaluator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether the truck is due for maintenance; raises a `maintenance`
    /// notification when it is.
    ///
    /// A truck with no service on record is always due, whatever the
    /// threshold. An unknown truck id returns `false` and raises nothing.
    ///
    /// The check itself is idempotent but the side effect is not: every due
    /// call inserts a fresh row. There is no dedup key, so concurrent or
    /// repeated checks against the same overdue truck stack notifications.
    pub async fn check_maintenance_due(
        &self,
        store: &dyn LedgerStore,
        truck_id: i64,
        days_threshold: i64,
    ) -> Result<bool, AlerterError> {
        let Some(truck) = store.truck(truck_id).await? else {
            return Ok(false);
        };
        let now = Utc::now();

        let message = match truck.last_maintenance_date {
            None => format!(
                "Truck {} has never been serviced. Please schedule maintenance.",
                truck.plate
            ),
            Some(last) => {
                let days_since = (now - last).num_days();
                if days_since < days_threshold {
                    return Ok(false);
                }
                format!(
                    "Last service was {} days ago. Please schedule maintenance.",
                    days_since
                )
            }
        };

        store
            .insert_notification(NewNotification {
                truck_id: Some(truck_id),
                title: format!("Maintenance due for truck {}", truck.plate),
                message,
                notification_type: NotificationType::Maintenance,
            })
            .await?;
        tracing::info!(truck_id, plate = %truck.plate, "maintenance notification raised");
        Ok(true)
    }

    /// Whether the truck ran profitably over the trailing window; on a loss,
    /// raises a `loss` notification and returns `false`.
    ///
    /// An unknown truck id returns `false` and raises nothing. The
    /// profitable path leaves no trace.
    pub async fn check_truck_profitability(
        &self,
        store: &dyn LedgerStore,
        truck_id: i64,
        days: i64,
    ) -> Result<bool, AlerterError> {
        let Some(truck) = store.truck(truck_id).await? else {
            return Ok(false);
        };
        let now = Utc::now();
        let window = Window::trailing(now, days);

        let revenue = store.revenue_total_for_truck(truck_id, &window).await?;
        let expenses = store.expense_total_for_truck(truck_id, &window).await?;
        let profit = revenue - expenses;

        if profit >= Decimal::ZERO {
            return Ok(true);
        }

        let loss = profit.abs();
        store
            .insert_notification(NewNotification {
                truck_id: Some(truck_id),
                title: format!("Warning: truck {} is running at a loss", truck.plate),
                message: format!(
                    "Truck {} recorded a loss of {:.2} over the last {} days.",
                    truck.plate, loss, days
                ),
                notification_type: NotificationType::Loss,
            })
            .await?;
        tracing::warn!(truck_id, plate = %truck.plate, %loss, "loss notification raised");
        Ok(false)
    }

    /// All notifications still waiting to be read, in store order.
    pub async fn unread_notifications(
        &self,
        store: &dyn LedgerStore,
    ) -> Result<Vec<Notification>, AlerterError> {
        Ok(store.unread_notifications().await?)
    }

    /// Marks a notification read. A missing id is a `false` return, not a
    /// fault.
    pub async fn mark_notification_read(
        &self,
        store: &dyn LedgerStore,
        id: i64,
    ) -> Result<bool, AlerterError> {
        Ok(store.mark_notification_read(id).await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use core_types::{ExpenseType, TruckStatus};
    use database::{
        MemoryLedger, NewExpense, NewMaintenanceRecord, NewRevenue, NewTruck, TruckUpdate,
    };
    use rust_decimal_macros::dec;

    async fn seed_truck(store: &MemoryLedger) -> i64 {
        store
            .insert_truck(NewTruck {
                truck_type: "lowboy".to_string(),
                plate: "AL-7301".to_string(),
                status: TruckStatus::Active,
            })
            .await
            .unwrap()
            .id
    }

    async fn set_last_maintenance(store: &MemoryLedger, truck_id: i64, days_ago: i64) {
        store
            .update_truck(
                truck_id,
                TruckUpdate {
                    last_maintenance_date: Some(Utc::now() - Duration::days(days_ago)),
                    ..TruckUpdate::default()
                },
            )
            .await
            .unwrap()
            .unwrap();
    }

    #[tokio::test]
    async fn never_serviced_truck_is_due_regardless_of_threshold() {
        let store = MemoryLedger::new();
        let evaluator = NotificationEvaluator::new();
        let truck_id = seed_truck(&store).await;

        let due = evaluator
            .check_maintenance_due(&store, truck_id, 10_000)
            .await
            .unwrap();

        assert!(due);
        let unread = store.unread_notifications().await.unwrap();
        assert_eq!(unread.len(), 1);
        assert_eq!(unread[0].notification_type, NotificationType::Maintenance);
        assert_eq!(unread[0].truck_id, Some(truck_id));
    }

    #[tokio::test]
    async fn overdue_truck_raises_and_reports_the_age() {
        let store = MemoryLedger::new();
        let evaluator = NotificationEvaluator::new();
        let truck_id = seed_truck(&store).await;
        set_last_maintenance(&store, truck_id, 45).await;

        let due = evaluator
            .check_maintenance_due(&store, truck_id, 30)
            .await
            .unwrap();

        assert!(due);
        let unread = store.unread_notifications().await.unwrap();
        assert!(unread[0].message.contains("45 days"));
    }

    #[tokio::test]
    async fn freshly_serviced_truck_is_not_due() {
        let store = MemoryLedger::new();
        let evaluator = NotificationEvaluator::new();
        let truck_id = seed_truck(&store).await;
        store
            .record_maintenance(NewMaintenanceRecord {
                truck_id,
                maintenance_type: "full service".to_string(),
                cost: dec!(500),
                maintenance_date: None,
                description: None,
            })
            .await
            .unwrap()
            .unwrap();

        let due = evaluator
            .check_maintenance_due(&store, truck_id, 30)
            .await
            .unwrap();

        assert!(!due);
        assert!(store.unread_notifications().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn maintenance_check_inserts_on_every_due_call() {
        // There is no dedup key; stacking rows on repeated checks is the
        // contract under test, not an accident.
        let store = MemoryLedger::new();
        let evaluator = NotificationEvaluator::new();
        let truck_id = seed_truck(&store).await;

        evaluator
            .check_maintenance_due(&store, truck_id, 30)
            .await
            .unwrap();
        evaluator
            .check_maintenance_due(&store, truck_id, 30)
            .await
            .unwrap();

        assert_eq!(store.unread_notifications().await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn losing_truck_raises_a_loss_with_the_amount_and_window() {
        let store = MemoryLedger::new();
        let evaluator = NotificationEvaluator::new();
        let truck_id = seed_truck(&store).await;
        store
            .insert_revenue(NewRevenue {
                truck_id,
                shipment_id: None,
                amount: dec!(10000),
                revenue_date: None,
                description: None,
            })
            .await
            .unwrap();
        store
            .insert_expense(NewExpense {
                truck_id,
                driver_id: None,
                expense_type: ExpenseType::Fuel,
                amount: dec!(12000),
                expense_date: None,
                description: None,
            })
            .await
            .unwrap();

        let profitable = evaluator
            .check_truck_profitability(&store, truck_id, 30)
            .await
            .unwrap();

        assert!(!profitable);
        let unread = store.unread_notifications().await.unwrap();
        assert_eq!(unread.len(), 1);
        assert_eq!(unread[0].notification_type, NotificationType::Loss);
        assert!(unread[0].message.contains("2000.00"));
        assert!(unread[0].message.contains("30 days"));
    }

    #[tokio::test]
    async fn profitable_truck_leaves_no_trace() {
        let store = MemoryLedger::new();
        let evaluator = NotificationEvaluator::new();
        let truck_id = seed_truck(&store).await;
        store
            .insert_revenue(NewRevenue {
                truck_id,
                shipment_id: None,
                amount: dec!(500),
                revenue_date: None,
                description: None,
            })
            .await
            .unwrap();

        let profitable = evaluator
            .check_truck_profitability(&store, truck_id, 30)
            .await
            .unwrap();

        assert!(profitable);
        assert!(store.unread_notifications().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn unknown_truck_fails_both_checks_quietly() {
        let store = MemoryLedger::new();
        let evaluator = NotificationEvaluator::new();

        assert!(!evaluator.check_maintenance_due(&store, 99, 30).await.unwrap());
        assert!(!evaluator
            .check_truck_profitability(&store, 99, 30)
            .await
            .unwrap());
        assert!(store.unread_notifications().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn unread_listing_is_stable_and_mark_read_removes() {
        let store = MemoryLedger::new();
        let evaluator = NotificationEvaluator::new();
        let truck_id = seed_truck(&store).await;
        evaluator
            .check_maintenance_due(&store, truck_id, 30)
            .await
            .unwrap();

        let first = evaluator.unread_notifications(&store).await.unwrap();
        let second = evaluator.unread_notifications(&store).await.unwrap();
        assert_eq!(first, second);

        assert!(evaluator
            .mark_notification_read(&store, first[0].id)
            .await
            .unwrap());
        assert!(evaluator.unread_notifications(&store).await.unwrap().is_empty());

        // A second mark on the same id still succeeds; an unknown id does not.
        assert!(evaluator
            .mark_notification_read(&store, first[0].id)
            .await
            .unwrap());
        assert!(!evaluator.mark_notification_read(&store, 999).await.unwrap());
    }
}
