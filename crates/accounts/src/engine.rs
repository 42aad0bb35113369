use crate::error::AccountError;
use crate::statement::{
    DriverAccount, DriverStatement, DriversSummary, ExpenseLine, ShipmentLine,
};
use core_types::{AccountStatus, DriverStatus, Window};
use database::LedgerStore;
use rust_decimal::Decimal;

/// A stateless calculator for driver settlement statements.
#[derive(Debug, Clone, Default)]
pub struct AccountEngine {}

impl AccountEngine {
    pub fn new() -> Self {
        Self::default()
    }

    /// Computes one driver's settlement statement over their full history.
    ///
    /// Returns `Ok(None)` for an unknown driver id; a missing driver is a
    /// normal outcome here, not a fault.
    pub async fn driver_account(
        &self,
        store: &dyn LedgerStore,
        driver_id: i64,
    ) -> Result<Option<DriverAccount>, AccountError> {
        let Some(driver) = store.driver(driver_id).await? else {
            return Ok(None);
        };

        let all_time = Window::all_time();
        let driver_expenses = store.expense_total_for_driver(driver_id, &all_time).await?;
        let shipments = store.shipments_for_driver(driver_id, &all_time).await?;
        let total_revenue: Decimal = shipments.iter().map(|s| s.revenue).sum();

        let truck_expenses = match driver.truck_id {
            Some(truck_id) => store.expense_total_for_truck(truck_id, &all_time).await?,
            None => Decimal::ZERO,
        };

        // The truck's running costs are reported but deliberately excluded
        // from the driver's balance.
        let balance = total_revenue - (driver.salary + driver_expenses);

        let account_status = if balance > Decimal::ZERO {
            AccountStatus::Creditor
        } else if balance < Decimal::ZERO {
            AccountStatus::Debtor
        } else {
            AccountStatus::Balanced
        };

        Ok(Some(DriverAccount {
            driver_id,
            driver_name: driver.name,
            phone: driver.phone,
            truck_id: driver.truck_id,
            salary: driver.salary,
            shipment_count: shipments.len(),
            total_revenue,
            driver_expenses,
            truck_expenses,
            total_expenses: driver_expenses + truck_expenses,
            balance,
            account_status,
            is_active: driver.status == DriverStatus::Active,
        }))
    }

    /// The settlement statement plus the itemized shipment and expense
    /// history it was derived from.
    pub async fn driver_account_details(
        &self,
        store: &dyn LedgerStore,
        driver_id: i64,
    ) -> Result<Option<DriverStatement>, AccountError> {
        let Some(account) = self.driver_account(store, driver_id).await? else {
            return Ok(None);
        };

        let all_time = Window::all_time();
        let (shipments, expenses) = tokio::join!(
            store.shipments_for_driver(driver_id, &all_time),
            store.expenses_for_driver(driver_id),
        );

        Ok(Some(DriverStatement {
            account,
            shipments: shipments?.into_iter().map(ShipmentLine::from).collect(),
            expenses: expenses?.into_iter().map(ExpenseLine::from).collect(),
        }))
    }

    /// Settlement statements for every driver, in store iteration order.
    pub async fn all_driver_accounts(
        &self,
        store: &dyn LedgerStore,
    ) -> Result<Vec<DriverAccount>, AccountError> {
        let drivers = store.drivers().await?;
        let mut accounts = Vec::with_capacity(drivers.len());
        for driver in drivers {
            match self.driver_account(store, driver.id).await? {
                Some(account) => accounts.push(account),
                // A driver deleted between the listing and the lookup drops
                // out of the batch rather than aborting it.
                None => tracing::debug!(driver_id = driver.id, "driver vanished mid-batch"),
            }
        }
        Ok(accounts)
    }

    /// Folds every driver's statement into the fleet-wide settlement rollup.
    pub async fn drivers_summary(
        &self,
        store: &dyn LedgerStore,
    ) -> Result<DriversSummary, AccountError> {
        let accounts = self.all_driver_accounts(store).await?;

        let total_revenue: Decimal = accounts.iter().map(|a| a.total_revenue).sum();
        let total_expenses: Decimal = accounts.iter().map(|a| a.total_expenses).sum();
        let total_balance: Decimal = accounts.iter().map(|a| a.balance).sum();
        let active_drivers = accounts.iter().filter(|a| a.is_active).count();
        let creditor_drivers = accounts
            .iter()
            .filter(|a| a.account_status == AccountStatus::Creditor)
            .count();
        let debtor_drivers = accounts
            .iter()
            .filter(|a| a.account_status == AccountStatus::Debtor)
            .count();

        Ok(DriversSummary {
            total_drivers: accounts.len(),
            active_drivers,
            total_revenue,
            total_expenses,
            total_balance,
            creditor_drivers,
            debtor_drivers,
            drivers: accounts,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use core_types::{ExpenseType, ShipmentStatus, TruckStatus};
    use database::{
        MemoryLedger, NewDriver, NewExpense, NewShipment, NewTruck,
    };
    use rust_decimal_macros::dec;

    async fn seed_truck(store: &MemoryLedger) -> i64 {
        store
            .insert_truck(NewTruck {
                truck_type: "reefer".to_string(),
                plate: "TR-2201".to_string(),
                status: TruckStatus::Active,
            })
            .await
            .unwrap()
            .id
    }

    async fn seed_driver(store: &MemoryLedger, salary: Decimal, truck_id: Option<i64>) -> i64 {
        store
            .insert_driver(NewDriver {
                name: "Omar".to_string(),
                phone: "555-0110".to_string(),
                salary,
                truck_id,
                status: DriverStatus::Active,
            })
            .await
            .unwrap()
            .id
    }

    async fn seed_shipment(store: &MemoryLedger, truck_id: i64, driver_id: i64, revenue: Decimal) {
        store
            .insert_shipment(NewShipment {
                truck_id,
                driver_id,
                origin: "Zarqa".to_string(),
                destination: "Irbid".to_string(),
                cargo: "cement".to_string(),
                revenue,
                status: ShipmentStatus::Delivered,
                shipment_date: None,
            })
            .await
            .unwrap();
    }

    async fn seed_expense(
        store: &MemoryLedger,
        truck_id: i64,
        driver_id: Option<i64>,
        amount: Decimal,
    ) {
        store
            .insert_expense(NewExpense {
                truck_id,
                driver_id,
                expense_type: ExpenseType::Fuel,
                amount,
                expense_date: None,
                description: None,
            })
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn settlement_reconciles_salary_revenue_and_expenses() {
        let store = MemoryLedger::new();
        let engine = AccountEngine::new();
        let truck_id = seed_truck(&store).await;
        let driver_id = seed_driver(&store, dec!(3000), Some(truck_id)).await;
        seed_shipment(&store, truck_id, driver_id, dec!(5000)).await;
        seed_expense(&store, truck_id, Some(driver_id), dec!(500)).await;

        let account = engine
            .driver_account(&store, driver_id)
            .await
            .unwrap()
            .expect("driver exists");

        assert_eq!(account.total_revenue, dec!(5000));
        assert_eq!(account.driver_expenses, dec!(500));
        assert_eq!(account.balance, dec!(1500));
        assert_eq!(account.account_status, AccountStatus::Creditor);
        assert_eq!(account.shipment_count, 1);
        assert!(account.is_active);
    }

    #[tokio::test]
    async fn driver_with_no_activity_owes_their_salary() {
        let store = MemoryLedger::new();
        let engine = AccountEngine::new();
        let driver_id = seed_driver(&store, dec!(2400), None).await;

        let account = engine
            .driver_account(&store, driver_id)
            .await
            .unwrap()
            .unwrap();

        assert_eq!(account.balance, dec!(-2400));
        assert_eq!(account.account_status, AccountStatus::Debtor);
        assert_eq!(account.truck_expenses, Decimal::ZERO);
    }

    #[tokio::test]
    async fn exactly_settled_driver_is_balanced() {
        let store = MemoryLedger::new();
        let engine = AccountEngine::new();
        let truck_id = seed_truck(&store).await;
        let driver_id = seed_driver(&store, dec!(1000), Some(truck_id)).await;
        seed_shipment(&store, truck_id, driver_id, dec!(1500)).await;
        seed_expense(&store, truck_id, Some(driver_id), dec!(500)).await;

        let account = engine
            .driver_account(&store, driver_id)
            .await
            .unwrap()
            .unwrap();

        assert_eq!(account.balance, Decimal::ZERO);
        assert_eq!(account.account_status, AccountStatus::Balanced);
    }

    #[tokio::test]
    async fn truck_expenses_are_reported_but_never_settled_against_the_driver() {
        let store = MemoryLedger::new();
        let engine = AccountEngine::new();
        let truck_id = seed_truck(&store).await;
        let driver_id = seed_driver(&store, dec!(1000), Some(truck_id)).await;
        seed_shipment(&store, truck_id, driver_id, dec!(4000)).await;
        // Charged to the truck, not the driver.
        seed_expense(&store, truck_id, None, dec!(700)).await;

        let account = engine
            .driver_account(&store, driver_id)
            .await
            .unwrap()
            .unwrap();

        assert_eq!(account.driver_expenses, Decimal::ZERO);
        assert_eq!(account.truck_expenses, dec!(700));
        assert_eq!(account.total_expenses, dec!(700));
        // Balance ignores the truck expense entirely.
        assert_eq!(account.balance, dec!(3000));
    }

    #[tokio::test]
    async fn unknown_driver_yields_no_statement() {
        let store = MemoryLedger::new();
        let engine = AccountEngine::new();
        assert!(engine.driver_account(&store, 42).await.unwrap().is_none());
        assert!(engine
            .driver_account_details(&store, 42)
            .await
            .unwrap()
            .is_none());
    }

    #[tokio::test]
    async fn detailed_statement_itemizes_full_history() {
        let store = MemoryLedger::new();
        let engine = AccountEngine::new();
        let truck_id = seed_truck(&store).await;
        let driver_id = seed_driver(&store, dec!(2000), Some(truck_id)).await;
        seed_shipment(&store, truck_id, driver_id, dec!(1200)).await;
        seed_shipment(&store, truck_id, driver_id, dec!(800)).await;
        seed_expense(&store, truck_id, Some(driver_id), dec!(90)).await;

        let statement = engine
            .driver_account_details(&store, driver_id)
            .await
            .unwrap()
            .unwrap();

        assert_eq!(statement.shipments.len(), 2);
        assert_eq!(statement.expenses.len(), 1);
        assert_eq!(statement.account.total_revenue, dec!(2000));
    }

    #[tokio::test]
    async fn summary_folds_every_account() {
        let store = MemoryLedger::new();
        let engine = AccountEngine::new();
        let truck_id = seed_truck(&store).await;

        // One creditor...
        let creditor = seed_driver(&store, dec!(1000), Some(truck_id)).await;
        seed_shipment(&store, truck_id, creditor, dec!(3000)).await;
        // ...and one debtor with no activity.
        let debtor = store
            .insert_driver(NewDriver {
                name: "Khalid".to_string(),
                phone: "555-0111".to_string(),
                salary: dec!(1800),
                truck_id: None,
                status: DriverStatus::Inactive,
            })
            .await
            .unwrap()
            .id;

        let summary = engine.drivers_summary(&store).await.unwrap();

        assert_eq!(summary.total_drivers, 2);
        assert_eq!(summary.active_drivers, 1);
        assert_eq!(summary.creditor_drivers, 1);
        assert_eq!(summary.debtor_drivers, 1);
        assert_eq!(summary.total_revenue, dec!(3000));
        assert_eq!(summary.total_balance, dec!(2000) + dec!(-1800));
        assert_eq!(summary.drivers.len(), 2);
        // Store iteration order is preserved.
        assert_eq!(summary.drivers[0].driver_id, creditor);
        assert_eq!(summary.drivers[1].driver_id, debtor);
    }
}
