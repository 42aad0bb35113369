use crate::error::AnalyticsError;
use crate::report::{
    Dashboard, DriverCounts, DriverPerformance, ExpenseAnalysis, FleetEfficiencyReport,
    FleetSummary, FleetSummaryReport, Financials, ShipmentCounts, TruckCounts, TruckFinancials,
    TruckPerformance, TruckProfit,
};
use chrono::{DateTime, Utc};
use core_types::{DriverStatus, ExpenseType, ShipmentStatus, TruckStatus, Window};
use database::LedgerStore;
use rust_decimal::Decimal;
use std::collections::HashMap;

/// The trailing window applied when a report is asked for without one.
pub const DEFAULT_WINDOW_DAYS: i64 = 30;

/// Percentage of `part` in `whole`, zero when `whole` is zero.
fn percentage(part: usize, whole: usize) -> Decimal {
    if whole == 0 {
        return Decimal::ZERO;
    }
    Decimal::from(part) / Decimal::from(whole) * Decimal::from(100)
}

/// A stateless calculator for windowed fleet performance metrics.
#[derive(Debug, Clone, Default)]
pub struct AnalyticsEngine {}

impl AnalyticsEngine {
    pub fn new() -> Self {
        Self::default()
    }

    /// Activity and profitability for one truck over the trailing window.
    ///
    /// An unknown truck id is not an error; it produces the all-zero record,
    /// the same as a truck with no activity.
    pub async fn truck_performance(
        &self,
        store: &dyn LedgerStore,
        truck_id: i64,
        days: i64,
    ) -> Result<TruckPerformance, AnalyticsError> {
        let now = Utc::now();
        self.truck_performance_at(store, truck_id, days, now).await
    }

    async fn truck_performance_at(
        &self,
        store: &dyn LedgerStore,
        truck_id: i64,
        days: i64,
        now: DateTime<Utc>,
    ) -> Result<TruckPerformance, AnalyticsError> {
        let window = Window::trailing(now, days);

        let shipments = store.shipments_for_truck(truck_id, &window).await?;
        let total_shipments = shipments.len();
        let delivered_shipments = shipments
            .iter()
            .filter(|s| s.status == ShipmentStatus::Delivered)
            .count();

        let total_revenue = store.revenue_total_for_truck(truck_id, &window).await?;
        let total_expenses = store.expense_total_for_truck(truck_id, &window).await?;
        let profit = total_revenue - total_expenses;

        let profitability_rate = if total_revenue > Decimal::ZERO {
            profit / total_revenue * Decimal::from(100)
        } else {
            Decimal::ZERO
        };
        let avg_revenue_per_shipment = if total_shipments > 0 {
            total_revenue / Decimal::from(total_shipments)
        } else {
            Decimal::ZERO
        };

        Ok(TruckPerformance {
            truck_id,
            period_days: days,
            total_shipments,
            delivered_shipments,
            delivery_rate: percentage(delivered_shipments, total_shipments),
            total_revenue,
            total_expenses,
            profit,
            profitability_rate,
            avg_revenue_per_shipment,
        })
    }

    /// Activity for one driver over the trailing window.
    ///
    /// Revenue is summed from the shipments' own `revenue` fields rather
    /// than the Revenue table; see `DriverPerformance`.
    pub async fn driver_performance(
        &self,
        store: &dyn LedgerStore,
        driver_id: i64,
        days: i64,
    ) -> Result<DriverPerformance, AnalyticsError> {
        let now = Utc::now();
        let window = Window::trailing(now, days);

        let shipments = store.shipments_for_driver(driver_id, &window).await?;
        let total_shipments = shipments.len();
        let delivered_shipments = shipments
            .iter()
            .filter(|s| s.status == ShipmentStatus::Delivered)
            .count();
        let total_revenue: Decimal = shipments.iter().map(|s| s.revenue).sum();
        let total_expenses = store.expense_total_for_driver(driver_id, &window).await?;

        Ok(DriverPerformance {
            driver_id,
            period_days: days,
            total_shipments,
            delivered_shipments,
            delivery_rate: percentage(delivered_shipments, total_shipments),
            total_revenue,
            total_expenses,
            net_contribution: total_revenue - total_expenses,
        })
    }

    /// Per-truck metrics for the whole fleet plus their rollup.
    ///
    /// Every per-truck computation shares the timestamp captured at entry,
    /// so the report describes one instant even across a slow iteration.
    pub async fn fleet_efficiency(
        &self,
        store: &dyn LedgerStore,
        days: i64,
    ) -> Result<FleetEfficiencyReport, AnalyticsError> {
        let now = Utc::now();
        let trucks = store.trucks().await?;

        let mut trucks_metrics = Vec::with_capacity(trucks.len());
        for truck in &trucks {
            trucks_metrics.push(
                self.truck_performance_at(store, truck.id, days, now).await?,
            );
        }

        let total_trucks = trucks.len();
        let (avg_profitability_rate, avg_delivery_rate) = if total_trucks > 0 {
            let profitability: Decimal =
                trucks_metrics.iter().map(|m| m.profitability_rate).sum();
            let delivery: Decimal = trucks_metrics.iter().map(|m| m.delivery_rate).sum();
            (
                profitability / Decimal::from(total_trucks),
                delivery / Decimal::from(total_trucks),
            )
        } else {
            tracing::debug!("no trucks on record; fleet averages default to zero");
            (Decimal::ZERO, Decimal::ZERO)
        };

        let total_revenue: Decimal = trucks_metrics.iter().map(|m| m.total_revenue).sum();
        let total_expenses: Decimal = trucks_metrics.iter().map(|m| m.total_expenses).sum();

        Ok(FleetEfficiencyReport {
            period_days: days,
            total_trucks,
            trucks_metrics,
            fleet_summary: FleetSummary {
                total_revenue,
                total_expenses,
                total_profit: total_revenue - total_expenses,
                avg_profitability_rate,
                avg_delivery_rate,
            },
        })
    }

    /// Windowed expense totals grouped by type and, independently, by truck.
    pub async fn expense_analysis(
        &self,
        store: &dyn LedgerStore,
        days: i64,
    ) -> Result<ExpenseAnalysis, AnalyticsError> {
        let now = Utc::now();
        let window = Window::trailing(now, days);
        let expenses = store.expenses_in(&window).await?;

        let mut expenses_by_type: HashMap<ExpenseType, Decimal> = HashMap::new();
        let mut expenses_by_truck: HashMap<i64, Decimal> = HashMap::new();
        for expense in &expenses {
            *expenses_by_type
                .entry(expense.expense_type)
                .or_insert(Decimal::ZERO) += expense.amount;
            *expenses_by_truck
                .entry(expense.truck_id)
                .or_insert(Decimal::ZERO) += expense.amount;
        }

        Ok(ExpenseAnalysis {
            period_days: days,
            total_expenses: expenses.iter().map(|e| e.amount).sum(),
            expenses_by_type,
            expenses_by_truck,
        })
    }

    /// Profit/loss for one truck over an explicit range, inclusive of both
    /// bounds.
    pub async fn truck_profit(
        &self,
        store: &dyn LedgerStore,
        truck_id: i64,
        start_date: DateTime<Utc>,
        end_date: DateTime<Utc>,
    ) -> Result<TruckProfit, AnalyticsError> {
        let window = Window::between(start_date, end_date);
        let revenue = store.revenue_total_for_truck(truck_id, &window).await?;
        let expenses = store.expense_total_for_truck(truck_id, &window).await?;

        Ok(TruckProfit {
            truck_id,
            revenue,
            expenses,
            profit: revenue - expenses,
            start_date,
            end_date,
        })
    }

    /// Per-truck financials and fleet totals over an explicit range,
    /// inclusive of both bounds.
    pub async fn fleet_summary(
        &self,
        store: &dyn LedgerStore,
        start_date: DateTime<Utc>,
        end_date: DateTime<Utc>,
    ) -> Result<FleetSummaryReport, AnalyticsError> {
        let window = Window::between(start_date, end_date);
        let trucks = store.trucks().await?;

        let mut lines = Vec::with_capacity(trucks.len());
        let mut total_revenue = Decimal::ZERO;
        let mut total_expenses = Decimal::ZERO;
        for truck in trucks {
            let revenue = store.revenue_total_for_truck(truck.id, &window).await?;
            let expenses = store.expense_total_for_truck(truck.id, &window).await?;
            total_revenue += revenue;
            total_expenses += expenses;
            lines.push(TruckFinancials {
                truck,
                revenue,
                expenses,
                profit: revenue - expenses,
            });
        }

        Ok(FleetSummaryReport {
            trucks: lines,
            total_revenue,
            total_expenses,
            total_profit: total_revenue - total_expenses,
            start_date,
            end_date,
        })
    }

    /// Entity counts by status plus the trailing 30-day financial picture.
    pub async fn dashboard(&self, store: &dyn LedgerStore) -> Result<Dashboard, AnalyticsError> {
        let now = Utc::now();
        let window = Window::trailing(now, DEFAULT_WINDOW_DAYS);

        let trucks = store.trucks().await?;
        let drivers = store.drivers().await?;
        let shipments = store.shipments().await?;
        let revenue = store.revenue_total(&window).await?;
        let expenses = store.expense_total(&window).await?;

        let active = trucks.iter().filter(|t| t.status == TruckStatus::Active).count();
        let maintenance = trucks
            .iter()
            .filter(|t| t.status == TruckStatus::Maintenance)
            .count();

        Ok(Dashboard {
            trucks: TruckCounts {
                total: trucks.len(),
                active,
                maintenance,
                stopped: trucks.len() - active - maintenance,
            },
            drivers: DriverCounts {
                total: drivers.len(),
                active: drivers
                    .iter()
                    .filter(|d| d.status == DriverStatus::Active)
                    .count(),
            },
            shipments: ShipmentCounts {
                total: shipments.len(),
                pending: shipments
                    .iter()
                    .filter(|s| s.status == ShipmentStatus::Pending)
                    .count(),
                in_transit: shipments
                    .iter()
                    .filter(|s| s.status == ShipmentStatus::InTransit)
                    .count(),
                delivered: shipments
                    .iter()
                    .filter(|s| s.status == ShipmentStatus::Delivered)
                    .count(),
            },
            financials: Financials {
                revenue,
                expenses,
                profit: revenue - expenses,
            },
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use database::{
        MemoryLedger, NewDriver, NewExpense, NewRevenue, NewShipment, NewTruck,
    };
    use rust_decimal_macros::dec;

    async fn seed_truck(store: &MemoryLedger, plate: &str) -> i64 {
        store
            .insert_truck(NewTruck {
                truck_type: "tanker".to_string(),
                plate: plate.to_string(),
                status: TruckStatus::Active,
            })
            .await
            .unwrap()
            .id
    }

    async fn seed_driver(store: &MemoryLedger, truck_id: i64) -> i64 {
        store
            .insert_driver(NewDriver {
                name: "Faris".to_string(),
                phone: "555-0120".to_string(),
                salary: dec!(2000),
                truck_id: Some(truck_id),
                status: DriverStatus::Active,
            })
            .await
            .unwrap()
            .id
    }

    async fn seed_shipment(
        store: &MemoryLedger,
        truck_id: i64,
        driver_id: i64,
        revenue: Decimal,
        status: ShipmentStatus,
        age_days: i64,
    ) {
        store
            .insert_shipment(NewShipment {
                truck_id,
                driver_id,
                origin: "Aqaba".to_string(),
                destination: "Mafraq".to_string(),
                cargo: "grain".to_string(),
                revenue,
                status,
                shipment_date: Some(Utc::now() - Duration::days(age_days)),
            })
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn truck_metrics_cover_counts_rates_and_profit() {
        let store = MemoryLedger::new();
        let engine = AnalyticsEngine::new();
        let truck_id = seed_truck(&store, "AN-1001").await;
        let driver_id = seed_driver(&store, truck_id).await;

        seed_shipment(&store, truck_id, driver_id, dec!(100), ShipmentStatus::Delivered, 1).await;
        seed_shipment(&store, truck_id, driver_id, dec!(100), ShipmentStatus::Pending, 2).await;
        store
            .insert_revenue(NewRevenue {
                truck_id,
                shipment_id: None,
                amount: dec!(4000),
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
                amount: dec!(1000),
                expense_date: None,
                description: None,
            })
            .await
            .unwrap();

        let metrics = engine.truck_performance(&store, truck_id, 30).await.unwrap();

        assert_eq!(metrics.total_shipments, 2);
        assert_eq!(metrics.delivered_shipments, 1);
        assert_eq!(metrics.delivery_rate, dec!(50));
        assert_eq!(metrics.total_revenue, dec!(4000));
        assert_eq!(metrics.total_expenses, dec!(1000));
        assert_eq!(metrics.profit, dec!(3000));
        assert_eq!(metrics.profitability_rate, dec!(75));
        assert_eq!(metrics.avg_revenue_per_shipment, dec!(2000));
    }

    #[tokio::test]
    async fn quiet_truck_yields_zero_rates_without_faulting() {
        let store = MemoryLedger::new();
        let engine = AnalyticsEngine::new();
        let truck_id = seed_truck(&store, "AN-1002").await;

        let metrics = engine.truck_performance(&store, truck_id, 30).await.unwrap();

        assert_eq!(metrics.total_shipments, 0);
        assert_eq!(metrics.delivery_rate, Decimal::ZERO);
        assert_eq!(metrics.avg_revenue_per_shipment, Decimal::ZERO);
        assert_eq!(metrics.profitability_rate, Decimal::ZERO);
    }

    #[tokio::test]
    async fn trailing_window_excludes_older_activity() {
        let store = MemoryLedger::new();
        let engine = AnalyticsEngine::new();
        let truck_id = seed_truck(&store, "AN-1003").await;
        let driver_id = seed_driver(&store, truck_id).await;

        seed_shipment(&store, truck_id, driver_id, dec!(500), ShipmentStatus::Delivered, 5).await;
        seed_shipment(&store, truck_id, driver_id, dec!(900), ShipmentStatus::Delivered, 60).await;

        let metrics = engine.driver_performance(&store, driver_id, 30).await.unwrap();

        assert_eq!(metrics.total_shipments, 1);
        assert_eq!(metrics.total_revenue, dec!(500));
    }

    #[tokio::test]
    async fn driver_revenue_comes_from_shipments_not_the_revenue_table() {
        let store = MemoryLedger::new();
        let engine = AnalyticsEngine::new();
        let truck_id = seed_truck(&store, "AN-1004").await;
        let driver_id = seed_driver(&store, truck_id).await;

        seed_shipment(&store, truck_id, driver_id, dec!(1200), ShipmentStatus::Delivered, 1).await;
        // A larger amount booked in the Revenue table must not leak into the
        // driver's metrics.
        store
            .insert_revenue(NewRevenue {
                truck_id,
                shipment_id: None,
                amount: dec!(9999),
                revenue_date: None,
                description: None,
            })
            .await
            .unwrap();
        store
            .insert_expense(NewExpense {
                truck_id,
                driver_id: Some(driver_id),
                expense_type: ExpenseType::Fine,
                amount: dec!(200),
                expense_date: None,
                description: None,
            })
            .await
            .unwrap();

        let metrics = engine.driver_performance(&store, driver_id, 30).await.unwrap();

        assert_eq!(metrics.total_revenue, dec!(1200));
        assert_eq!(metrics.total_expenses, dec!(200));
        assert_eq!(metrics.net_contribution, dec!(1000));
    }

    #[tokio::test]
    async fn empty_fleet_report_is_all_zeros() {
        let store = MemoryLedger::new();
        let engine = AnalyticsEngine::new();

        let report = engine.fleet_efficiency(&store, 30).await.unwrap();

        assert_eq!(report.total_trucks, 0);
        assert_eq!(report.fleet_summary.avg_profitability_rate, Decimal::ZERO);
        assert_eq!(report.fleet_summary.avg_delivery_rate, Decimal::ZERO);
        assert_eq!(report.fleet_summary.total_revenue, Decimal::ZERO);
        assert_eq!(report.fleet_summary.total_profit, Decimal::ZERO);
    }

    #[tokio::test]
    async fn fleet_averages_are_simple_means_across_trucks() {
        let store = MemoryLedger::new();
        let engine = AnalyticsEngine::new();
        let first = seed_truck(&store, "AN-1005").await;
        let second = seed_truck(&store, "AN-1006").await;
        let driver_id = seed_driver(&store, first).await;

        // First truck: one delivered shipment out of one.
        seed_shipment(&store, first, driver_id, dec!(100), ShipmentStatus::Delivered, 1).await;
        // Second truck: one pending shipment out of one.
        seed_shipment(&store, second, driver_id, dec!(100), ShipmentStatus::Pending, 1).await;

        let report = engine.fleet_efficiency(&store, 30).await.unwrap();

        assert_eq!(report.total_trucks, 2);
        // (100% + 0%) / 2, regardless of how much revenue each truck carries.
        assert_eq!(report.fleet_summary.avg_delivery_rate, dec!(50));
    }

    #[tokio::test]
    async fn expense_groupings_each_resum_to_the_flat_total() {
        let store = MemoryLedger::new();
        let engine = AnalyticsEngine::new();
        let first = seed_truck(&store, "AN-1007").await;
        let second = seed_truck(&store, "AN-1008").await;

        for (truck_id, expense_type, amount) in [
            (first, ExpenseType::Fuel, dec!(300)),
            (first, ExpenseType::Maintenance, dec!(450.25)),
            (second, ExpenseType::Fuel, dec!(120.50)),
            (second, ExpenseType::Other, dec!(75)),
        ] {
            store
                .insert_expense(NewExpense {
                    truck_id,
                    driver_id: None,
                    expense_type,
                    amount,
                    expense_date: None,
                    description: None,
                })
                .await
                .unwrap();
        }

        let analysis = engine.expense_analysis(&store, 30).await.unwrap();

        let by_type: Decimal = analysis.expenses_by_type.values().copied().sum();
        let by_truck: Decimal = analysis.expenses_by_truck.values().copied().sum();
        assert_eq!(analysis.total_expenses, dec!(945.75));
        assert_eq!(by_type, analysis.total_expenses);
        assert_eq!(by_truck, analysis.total_expenses);
        assert_eq!(analysis.expenses_by_type[&ExpenseType::Fuel], dec!(420.50));
    }

    #[tokio::test]
    async fn explicit_range_is_inclusive_of_both_bounds() {
        let store = MemoryLedger::new();
        let engine = AnalyticsEngine::new();
        let truck_id = seed_truck(&store, "AN-1009").await;

        let now = Utc::now();
        let start = now - Duration::days(10);
        let end = now - Duration::days(2);
        for (offset, amount) in [(10, dec!(100)), (2, dec!(40)), (1, dec!(7))] {
            store
                .insert_revenue(NewRevenue {
                    truck_id,
                    shipment_id: None,
                    amount,
                    revenue_date: Some(now - Duration::days(offset)),
                    description: None,
                })
                .await
                .unwrap();
        }

        let profit = engine
            .truck_profit(&store, truck_id, start, end)
            .await
            .unwrap();

        // The rows on both bounds count; the one after the end does not.
        assert_eq!(profit.revenue, dec!(140));
        assert_eq!(profit.profit, dec!(140));
    }

    #[tokio::test]
    async fn dashboard_counts_statuses_and_recent_financials() {
        let store = MemoryLedger::new();
        let engine = AnalyticsEngine::new();
        let truck_id = seed_truck(&store, "AN-1010").await;
        store
            .insert_truck(NewTruck {
                truck_type: "tipper".to_string(),
                plate: "AN-1011".to_string(),
                status: TruckStatus::Maintenance,
            })
            .await
            .unwrap();
        let driver_id = seed_driver(&store, truck_id).await;
        seed_shipment(&store, truck_id, driver_id, dec!(600), ShipmentStatus::InTransit, 3).await;
        store
            .insert_revenue(NewRevenue {
                truck_id,
                shipment_id: None,
                amount: dec!(600),
                revenue_date: None,
                description: None,
            })
            .await
            .unwrap();

        let dashboard = engine.dashboard(&store).await.unwrap();

        assert_eq!(dashboard.trucks.total, 2);
        assert_eq!(dashboard.trucks.active, 1);
        assert_eq!(dashboard.trucks.maintenance, 1);
        assert_eq!(dashboard.trucks.stopped, 0);
        assert_eq!(dashboard.drivers.active, 1);
        assert_eq!(dashboard.shipments.in_transit, 1);
        assert_eq!(dashboard.financials.revenue, dec!(600));
        assert_eq!(dashboard.financials.profit, dec!(600));
    }
}
