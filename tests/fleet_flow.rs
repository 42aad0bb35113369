//! End-to-end flows across the store, the engines, and the evaluator,
//! driven through the in-memory ledger.

use accounts::AccountEngine;
use alerter::NotificationEvaluator;
use analytics::AnalyticsEngine;
use core_types::{
    DriverStatus, ExpenseType, NotificationType, ShipmentStatus, TruckStatus,
};
use database::{
    LedgerStore, MemoryLedger, NewDriver, NewExpense, NewMaintenanceRecord, NewRevenue,
    NewShipment, NewTruck,
};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

async fn seed_fleet(store: &MemoryLedger) -> (i64, i64, i64, i64) {
    let hauler = store
        .insert_truck(NewTruck {
            truck_type: "flatbed".to_string(),
            plate: "FL-9001".to_string(),
            status: TruckStatus::Active,
        })
        .await
        .unwrap()
        .id;
    let tanker = store
        .insert_truck(NewTruck {
            truck_type: "tanker".to_string(),
            plate: "FL-9002".to_string(),
            status: TruckStatus::Active,
        })
        .await
        .unwrap()
        .id;

    let rami = store
        .insert_driver(NewDriver {
            name: "Rami".to_string(),
            phone: "555-0201".to_string(),
            salary: dec!(2500),
            truck_id: Some(hauler),
            status: DriverStatus::Active,
        })
        .await
        .unwrap()
        .id;
    let layla = store
        .insert_driver(NewDriver {
            name: "Layla".to_string(),
            phone: "555-0202".to_string(),
            salary: dec!(2800),
            truck_id: Some(tanker),
            status: DriverStatus::Active,
        })
        .await
        .unwrap()
        .id;

    for (truck, driver, revenue, status) in [
        (hauler, rami, dec!(4200), ShipmentStatus::Delivered),
        (hauler, rami, dec!(1800), ShipmentStatus::InTransit),
        (tanker, layla, dec!(3100), ShipmentStatus::Delivered),
    ] {
        store
            .insert_shipment(NewShipment {
                truck_id: truck,
                driver_id: driver,
                origin: "Aqaba".to_string(),
                destination: "Amman".to_string(),
                cargo: "general freight".to_string(),
                revenue,
                status,
                shipment_date: None,
            })
            .await
            .unwrap();
        store
            .insert_revenue(NewRevenue {
                truck_id: truck,
                shipment_id: None,
                amount: revenue,
                revenue_date: None,
                description: None,
            })
            .await
            .unwrap();
    }

    store
        .insert_expense(NewExpense {
            truck_id: hauler,
            driver_id: Some(rami),
            expense_type: ExpenseType::Fuel,
            amount: dec!(600),
            expense_date: None,
            description: None,
        })
        .await
        .unwrap();

    (hauler, tanker, rami, layla)
}

#[tokio::test]
async fn settlement_summary_agrees_with_each_account() {
    let store = MemoryLedger::new();
    let engine = AccountEngine::new();
    let (_, _, rami, layla) = seed_fleet(&store).await;

    let summary = engine.drivers_summary(&store).await.unwrap();
    assert_eq!(summary.total_drivers, 2);

    let rami_account = engine.driver_account(&store, rami).await.unwrap().unwrap();
    let layla_account = engine.driver_account(&store, layla).await.unwrap().unwrap();

    assert_eq!(
        summary.total_balance,
        rami_account.balance + layla_account.balance
    );
    assert_eq!(
        summary.total_revenue,
        rami_account.total_revenue + layla_account.total_revenue
    );
    // Rami: 6000 - (2500 + 600); Layla: 3100 - 2800.
    assert_eq!(rami_account.balance, dec!(2900));
    assert_eq!(layla_account.balance, dec!(300));
    assert_eq!(summary.creditor_drivers, 2);
    assert_eq!(summary.debtor_drivers, 0);
}

#[tokio::test]
async fn fleet_report_totals_are_the_sum_of_the_truck_metrics() {
    let store = MemoryLedger::new();
    let engine = AnalyticsEngine::new();
    seed_fleet(&store).await;

    let report = engine.fleet_efficiency(&store, 30).await.unwrap();
    assert_eq!(report.total_trucks, 2);

    let revenue: Decimal = report.trucks_metrics.iter().map(|m| m.total_revenue).sum();
    let expenses: Decimal = report
        .trucks_metrics
        .iter()
        .map(|m| m.total_expenses)
        .sum();
    assert_eq!(report.fleet_summary.total_revenue, revenue);
    assert_eq!(report.fleet_summary.total_expenses, expenses);
    assert_eq!(
        report.fleet_summary.total_profit,
        revenue - expenses
    );
}

#[tokio::test]
async fn maintenance_flows_into_expenses_analysis_and_silences_the_check() {
    let store = MemoryLedger::new();
    let analytics = AnalyticsEngine::new();
    let evaluator = NotificationEvaluator::new();
    let (hauler, _, _, _) = seed_fleet(&store).await;

    store
        .record_maintenance(NewMaintenanceRecord {
            truck_id: hauler,
            maintenance_type: "gearbox overhaul".to_string(),
            cost: dec!(1250.75),
            maintenance_date: None,
            description: Some("replaced clutch pack".to_string()),
        })
        .await
        .unwrap()
        .expect("truck exists");

    // The booked expense shows up in the analysis, and both groupings still
    // re-sum to the flat total.
    let analysis = analytics.expense_analysis(&store, 30).await.unwrap();
    assert_eq!(
        analysis.expenses_by_type[&ExpenseType::Maintenance],
        dec!(1250.75)
    );
    let by_type: Decimal = analysis.expenses_by_type.values().copied().sum();
    let by_truck: Decimal = analysis.expenses_by_truck.values().copied().sum();
    assert_eq!(by_type, analysis.total_expenses);
    assert_eq!(by_truck, analysis.total_expenses);

    // Freshly serviced, so the maintenance check stays quiet.
    let due = evaluator
        .check_maintenance_due(&store, hauler, 30)
        .await
        .unwrap();
    assert!(!due);
    assert!(store.unread_notifications().await.unwrap().is_empty());
}

#[tokio::test]
async fn alerts_surface_through_the_unread_feed_until_read() {
    let store = MemoryLedger::new();
    let evaluator = NotificationEvaluator::new();
    let (hauler, tanker, _, _) = seed_fleet(&store).await;

    // The tanker has never been serviced; the hauler gets pushed into a loss.
    store
        .insert_expense(NewExpense {
            truck_id: hauler,
            driver_id: None,
            expense_type: ExpenseType::Fine,
            amount: dec!(20000),
            expense_date: None,
            description: None,
        })
        .await
        .unwrap();

    assert!(evaluator
        .check_maintenance_due(&store, tanker, 30)
        .await
        .unwrap());
    assert!(!evaluator
        .check_truck_profitability(&store, hauler, 30)
        .await
        .unwrap());

    let unread = evaluator.unread_notifications(&store).await.unwrap();
    assert_eq!(unread.len(), 2);
    assert!(unread
        .iter()
        .any(|n| n.notification_type == NotificationType::Maintenance));
    assert!(unread
        .iter()
        .any(|n| n.notification_type == NotificationType::Loss));

    for notification in &unread {
        assert!(evaluator
            .mark_notification_read(&store, notification.id)
            .await
            .unwrap());
    }
    assert!(evaluator.unread_notifications(&store).await.unwrap().is_empty());

    // The read rows are still in the recent feed, newest first.
    let recent = store.notifications(50).await.unwrap();
    assert_eq!(recent.len(), 2);
    assert!(recent.iter().all(|n| n.is_read));
}
