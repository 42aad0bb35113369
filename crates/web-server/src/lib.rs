use accounts::AccountEngine;
use alerter::NotificationEvaluator;
use analytics::AnalyticsEngine;
use axum::{
    routing::{get, post, put},
    Router,
};
use database::LedgerStore;
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::{
    cors::{AllowHeaders, AllowOrigin, Any, CorsLayer, ExposeHeaders},
    trace::TraceLayer,
};

pub mod error;
pub mod handlers;
pub mod validation;

/// The shared application state that all handlers can access.
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn LedgerStore>,
    pub accounts: AccountEngine,
    pub analytics: AnalyticsEngine,
    pub alerts: NotificationEvaluator,
}

impl AppState {
    pub fn new(store: Arc<dyn LedgerStore>) -> Self {
        Self {
            store,
            accounts: AccountEngine::new(),
            analytics: AnalyticsEngine::new(),
            alerts: NotificationEvaluator::new(),
        }
    }
}

/// The main function to configure and run the web server.
///
/// The caller picks the store (PostgreSQL in production, in-memory for the
/// demo mode) and hands it in; everything behind the routes is agnostic to
/// that choice.
pub async fn run_server(addr: SocketAddr, store: Arc<dyn LedgerStore>) -> anyhow::Result<()> {
    let app_state = Arc::new(AppState::new(store));
    let cors = CorsLayer::new()
        .allow_origin(AllowOrigin::any())
        .allow_methods(Any)
        .allow_headers(AllowHeaders::any())
        .expose_headers(ExposeHeaders::any());

    // --- DEFINE THE APPLICATION ROUTES ---
    let app = Router::new()
        .route("/api/health", get(|| async { "OK" }))
        // Fleet entities
        .route(
            "/api/trucks",
            get(handlers::get_trucks).post(handlers::create_truck),
        )
        .route(
            "/api/trucks/:truck_id",
            get(handlers::get_truck)
                .put(handlers::update_truck)
                .delete(handlers::delete_truck),
        )
        .route(
            "/api/drivers",
            get(handlers::get_drivers).post(handlers::create_driver),
        )
        .route(
            "/api/drivers/:driver_id",
            put(handlers::update_driver).delete(handlers::delete_driver),
        )
        .route(
            "/api/shipments",
            get(handlers::get_shipments).post(handlers::create_shipment),
        )
        .route("/api/shipments/:shipment_id", put(handlers::update_shipment))
        .route(
            "/api/revenues",
            get(handlers::get_revenues).post(handlers::create_revenue),
        )
        .route(
            "/api/expenses",
            get(handlers::get_expenses).post(handlers::create_expense),
        )
        .route(
            "/api/maintenance",
            get(handlers::get_maintenance).post(handlers::create_maintenance),
        )
        // Driver settlement accounts
        .route("/api/drivers/:driver_id/account", get(handlers::get_driver_account))
        .route(
            "/api/drivers/:driver_id/account-details",
            get(handlers::get_driver_account_details),
        )
        .route("/api/drivers/accounts/all", get(handlers::get_all_driver_accounts))
        .route("/api/drivers/accounts/summary", get(handlers::get_drivers_summary))
        // Analytics and reports
        .route(
            "/api/analytics/truck-performance/:truck_id",
            get(handlers::get_truck_performance),
        )
        .route(
            "/api/analytics/driver-performance/:driver_id",
            get(handlers::get_driver_performance),
        )
        .route("/api/analytics/fleet-efficiency", get(handlers::get_fleet_efficiency))
        .route("/api/analytics/expense-analysis", get(handlers::get_expense_analysis))
        .route(
            "/api/analytics/truck-profit/:truck_id",
            get(handlers::get_truck_profit),
        )
        .route("/api/analytics/fleet-summary", get(handlers::get_fleet_summary))
        .route("/api/dashboard", get(handlers::get_dashboard))
        // Notifications
        .route("/api/notifications", get(handlers::get_notifications))
        .route(
            "/api/notifications/:notification_id",
            axum::routing::delete(handlers::delete_notification),
        )
        .route("/api/notifications/unread", get(handlers::get_unread_notifications))
        .route(
            "/api/notifications/:notification_id/read",
            put(handlers::mark_notification_read),
        )
        .route(
            "/api/notifications/check-maintenance/:truck_id",
            post(handlers::check_maintenance),
        )
        .route(
            "/api/notifications/check-profitability/:truck_id",
            post(handlers::check_profitability),
        )
        // Validation gate
        .route("/api/validate/truck", post(handlers::validate_truck))
        .route("/api/validate/driver", post(handlers::validate_driver))
        .route("/api/validate/shipment", post(handlers::validate_shipment))
        .with_state(app_state)
        .layer(cors)
        // This middleware will automatically log information about every incoming request.
        .layer(TraceLayer::new_for_http());

    tracing::info!("Web server listening on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
