use accounts::AccountEngine;
use alerter::NotificationEvaluator;
use analytics::AnalyticsEngine;
use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use comfy_table::Table;
use configuration::Config;
use database::{connect, run_migrations, LedgerStore, MemoryLedger, PgLedger};
use futures::future::join_all;
use indicatif::{ProgressBar, ProgressStyle};
use std::net::SocketAddr;
use std::sync::Arc;

/// The main entry point for the Fleetbooks application.
#[tokio::main]
async fn main() {
    // Load environment variables from .env file when present.
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    // Parse command-line arguments
    let cli = Cli::parse();

    let config = match configuration::load_config() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Failed to load configuration: {}", e);
            std::process::exit(1);
        }
    };

    // Execute the appropriate command
    let result = match cli.command {
        Commands::Serve(args) => handle_serve(args, config).await,
        Commands::Sweep(args) => handle_sweep(args, config).await,
        Commands::Report(args) => handle_report(args).await,
        Commands::Accounts(args) => handle_accounts(args).await,
    };

    if let Err(e) = result {
        eprintln!("Error: {:#}", e);
        std::process::exit(1);
    }
}

// ==============================================================================
// CLI Structure
// ==============================================================================

/// A fleet-accounting service: trucks, drivers, shipments, and the money
/// they move.
#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the HTTP API server.
    Serve(ServeArgs),
    /// Run the maintenance and profitability checks across the whole fleet.
    Sweep(SweepArgs),
    /// Print the fleet efficiency report.
    Report(ReportArgs),
    /// Print every driver's settlement account.
    Accounts(AccountsArgs),
}

#[derive(Parser)]
struct ServeArgs {
    /// Bind address override (e.g. "0.0.0.0").
    #[arg(long)]
    host: Option<String>,

    /// Port override.
    #[arg(long)]
    port: Option<u16>,

    /// Serve from a fresh in-memory store instead of PostgreSQL (demo mode).
    #[arg(long)]
    memory: bool,
}

#[derive(Parser)]
struct SweepArgs {
    /// Days since the last service before a truck counts as overdue.
    #[arg(long)]
    threshold_days: Option<i64>,

    /// Trailing window (days) for the profitability check.
    #[arg(long)]
    window_days: Option<i64>,
}

#[derive(Parser)]
struct ReportArgs {
    /// Trailing window in days.
    #[arg(long, default_value_t = 30)]
    days: i64,

    /// Explicit range start (format: YYYY-MM-DD); use together with --to.
    #[arg(long)]
    from: Option<NaiveDate>,

    /// Explicit range end (format: YYYY-MM-DD); use together with --from.
    #[arg(long)]
    to: Option<NaiveDate>,

    /// Emit the report as JSON instead of a table.
    #[arg(long)]
    json: bool,
}

#[derive(Parser)]
struct AccountsArgs {
    /// Emit the accounts as JSON instead of a table.
    #[arg(long)]
    json: bool,
}

/// Connects to PostgreSQL, applies migrations, and wraps the pool.
async fn open_store() -> anyhow::Result<Arc<dyn LedgerStore>> {
    let pool = connect().await?;
    run_migrations(&pool).await?;
    Ok(Arc::new(PgLedger::new(pool)))
}

// ==============================================================================
// Command Logic
// ==============================================================================

async fn handle_serve(args: ServeArgs, config: Config) -> anyhow::Result<()> {
    let store: Arc<dyn LedgerStore> = if args.memory {
        tracing::warn!("Serving from an in-memory store; nothing will be persisted.");
        Arc::new(MemoryLedger::new())
    } else {
        open_store().await?
    };

    let host = args.host.unwrap_or(config.server.host);
    let port = args.port.unwrap_or(config.server.port);
    let addr: SocketAddr = format!("{}:{}", host, port).parse()?;

    web_server::run_server(addr, store).await
}

async fn handle_sweep(args: SweepArgs, config: Config) -> anyhow::Result<()> {
    let threshold_days = args
        .threshold_days
        .unwrap_or(config.alerts.maintenance_threshold_days);
    let window_days = args.window_days.unwrap_or(config.alerts.profit_window_days);

    let store = open_store().await?;
    let evaluator = NotificationEvaluator::new();
    let trucks = store.trucks().await?;

    // Set up the progress bar
    let progress_bar = ProgressBar::new(trucks.len() as u64);
    progress_bar.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{bar:40.cyan/blue}] {pos}/{len} {msg}")?
            .progress_chars("#>-"),
    );

    // Run both checks for every truck concurrently.
    let checks: Vec<_> = trucks
        .iter()
        .map(|truck| {
            let store = store.clone();
            let evaluator = evaluator.clone();
            let pb = progress_bar.clone();
            let truck_id = truck.id;
            let plate = truck.plate.clone();
            async move {
                pb.set_message(format!("Checking {}...", plate));
                let due = evaluator
                    .check_maintenance_due(store.as_ref(), truck_id, threshold_days)
                    .await?;
                let profitable = evaluator
                    .check_truck_profitability(store.as_ref(), truck_id, window_days)
                    .await?;
                pb.inc(1);
                Ok::<(bool, bool), anyhow::Error>((due, profitable))
            }
        })
        .collect();

    let results = join_all(checks).await;
    progress_bar.finish_with_message("Sweep complete");

    let mut overdue = 0usize;
    let mut losing = 0usize;
    for result in results {
        match result {
            Ok((due, profitable)) => {
                if due {
                    overdue += 1;
                }
                if !profitable {
                    losing += 1;
                }
            }
            Err(e) => eprintln!("A check failed: {}", e),
        }
    }

    println!(
        "Checked {} trucks: {} due for maintenance, {} running at a loss.",
        trucks.len(),
        overdue,
        losing
    );
    Ok(())
}

async fn handle_report(args: ReportArgs) -> anyhow::Result<()> {
    let store = open_store().await?;
    let engine = AnalyticsEngine::new();

    if let (Some(from), Some(to)) = (args.from, args.to) {
        let start = from.and_hms_opt(0, 0, 0).unwrap().and_utc();
        let end = to.and_hms_opt(23, 59, 59).unwrap().and_utc();
        let summary = engine.fleet_summary(store.as_ref(), start, end).await?;

        if args.json {
            println!("{}", serde_json::to_string_pretty(&summary)?);
            return Ok(());
        }

        let mut table = Table::new();
        table.set_header(vec!["Plate", "Revenue", "Expenses", "Profit"]);
        for line in &summary.trucks {
            table.add_row(vec![
                line.truck.plate.clone(),
                format!("{:.2}", line.revenue),
                format!("{:.2}", line.expenses),
                format!("{:.2}", line.profit),
            ]);
        }
        println!("{table}");
        println!(
            "Fleet {} to {}: revenue {:.2}, expenses {:.2}, profit {:.2}",
            from, to, summary.total_revenue, summary.total_expenses, summary.total_profit
        );
        return Ok(());
    }

    let report = engine.fleet_efficiency(store.as_ref(), args.days).await?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    let mut table = Table::new();
    table.set_header(vec![
        "Truck",
        "Shipments",
        "Delivered",
        "Delivery %",
        "Revenue",
        "Expenses",
        "Profit",
        "Profitability %",
    ]);
    for metrics in &report.trucks_metrics {
        table.add_row(vec![
            metrics.truck_id.to_string(),
            metrics.total_shipments.to_string(),
            metrics.delivered_shipments.to_string(),
            format!("{:.1}", metrics.delivery_rate),
            format!("{:.2}", metrics.total_revenue),
            format!("{:.2}", metrics.total_expenses),
            format!("{:.2}", metrics.profit),
            format!("{:.1}", metrics.profitability_rate),
        ]);
    }
    println!("{table}");
    println!(
        "Fleet over the last {} days: revenue {:.2}, expenses {:.2}, profit {:.2} \
         (avg profitability {:.1}%, avg delivery {:.1}%)",
        report.period_days,
        report.fleet_summary.total_revenue,
        report.fleet_summary.total_expenses,
        report.fleet_summary.total_profit,
        report.fleet_summary.avg_profitability_rate,
        report.fleet_summary.avg_delivery_rate,
    );
    Ok(())
}

async fn handle_accounts(args: AccountsArgs) -> anyhow::Result<()> {
    let store = open_store().await?;
    let engine = AccountEngine::new();
    let summary = engine.drivers_summary(store.as_ref()).await?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&summary)?);
        return Ok(());
    }

    let mut table = Table::new();
    table.set_header(vec![
        "Driver", "Salary", "Shipments", "Revenue", "Expenses", "Balance", "Status",
    ]);
    for account in &summary.drivers {
        table.add_row(vec![
            account.driver_name.clone(),
            format!("{:.2}", account.salary),
            account.shipment_count.to_string(),
            format!("{:.2}", account.total_revenue),
            format!("{:.2}", account.total_expenses),
            format!("{:.2}", account.balance),
            account.account_status.to_string(),
        ]);
    }
    println!("{table}");
    println!(
        "{} drivers ({} active): {} creditors, {} debtors, net balance {:.2}",
        summary.total_drivers,
        summary.active_drivers,
        summary.creditor_drivers,
        summary.debtor_drivers,
        summary.total_balance,
    );
    Ok(())
}
