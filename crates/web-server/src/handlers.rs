use crate::validation::{self, DriverDraft, ShipmentDraft, TruckDraft};
use crate::{error::AppError, AppState};
use accounts::{DriverAccount, DriverStatement, DriversSummary};
use alerter::{DEFAULT_MAINTENANCE_THRESHOLD_DAYS, DEFAULT_PROFIT_WINDOW_DAYS};
use analytics::{
    Dashboard, DriverPerformance, ExpenseAnalysis, FleetEfficiencyReport, FleetSummaryReport,
    TruckPerformance, TruckProfit, DEFAULT_WINDOW_DAYS,
};
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use chrono::{DateTime, Duration, NaiveDate, NaiveDateTime, Utc};
use core_types::{Driver, Expense, MaintenanceRecord, Notification, Revenue, Shipment, Truck};
use database::{
    DriverUpdate, LedgerStore, NewDriver, NewExpense, NewMaintenanceRecord, NewRevenue,
    NewShipment, NewTruck, ShipmentUpdate, TruckUpdate,
};
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::sync::Arc;

#[derive(Debug, Deserialize)]
pub struct DaysQuery {
    pub days: Option<i64>,
}

#[derive(Debug, Deserialize)]
pub struct RangeQuery {
    pub start_date: Option<String>,
    pub end_date: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct LimitQuery {
    pub limit: Option<i64>,
}

#[derive(Debug, Serialize)]
pub struct MaintenanceCheck {
    pub truck_id: i64,
    pub maintenance_due: bool,
    pub threshold_days: i64,
}

#[derive(Debug, Serialize)]
pub struct ProfitabilityCheck {
    pub truck_id: i64,
    pub is_profitable: bool,
    pub period_days: i64,
}

#[derive(Debug, Serialize)]
pub struct UnreadNotifications {
    pub count: usize,
    pub notifications: Vec<Notification>,
}

#[derive(Debug, Serialize)]
pub struct ValidationOutcome {
    pub valid: bool,
    pub errors: Vec<String>,
}

/// Parses an explicit report-range timestamp. Accepts RFC 3339, a bare
/// date-time, or a bare date (midnight UTC).
fn parse_datetime(raw: &str) -> Option<DateTime<Utc>> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc));
    }
    if let Ok(dt) = raw.parse::<NaiveDateTime>() {
        return Some(dt.and_utc());
    }
    raw.parse::<NaiveDate>()
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|dt| dt.and_utc())
}

/// Resolves an explicit date range. An absent or unparseable bound falls
/// back to the default trailing window, never to an error.
fn resolve_range(query: &RangeQuery) -> (DateTime<Utc>, DateTime<Utc>) {
    let now = Utc::now();
    let start = query
        .start_date
        .as_deref()
        .and_then(parse_datetime)
        .unwrap_or_else(|| now - Duration::days(DEFAULT_WINDOW_DAYS));
    let end = query
        .end_date
        .as_deref()
        .and_then(parse_datetime)
        .unwrap_or(now);
    (start, end)
}

// ==============================================================================
// Fleet entities
// ==============================================================================

/// # GET /api/trucks
pub async fn get_trucks(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<Truck>>, AppError> {
    Ok(Json(state.store.trucks().await?))
}

/// # GET /api/trucks/:truck_id
pub async fn get_truck(
    Path(truck_id): Path<i64>,
    State(state): State<Arc<AppState>>,
) -> Result<Json<Truck>, AppError> {
    match state.store.truck(truck_id).await? {
        Some(truck) => Ok(Json(truck)),
        None => Err(AppError::NotFound("Truck not found".to_string())),
    }
}

/// # POST /api/trucks
pub async fn create_truck(
    State(state): State<Arc<AppState>>,
    Json(new): Json<NewTruck>,
) -> Result<impl IntoResponse, AppError> {
    let truck = state.store.insert_truck(new).await?;
    Ok((StatusCode::CREATED, Json(truck)))
}

/// # PUT /api/trucks/:truck_id
pub async fn update_truck(
    Path(truck_id): Path<i64>,
    State(state): State<Arc<AppState>>,
    Json(update): Json<TruckUpdate>,
) -> Result<Json<Truck>, AppError> {
    match state.store.update_truck(truck_id, update).await? {
        Some(truck) => Ok(Json(truck)),
        None => Err(AppError::NotFound("Truck not found".to_string())),
    }
}

/// # DELETE /api/trucks/:truck_id
pub async fn delete_truck(
    Path(truck_id): Path<i64>,
    State(state): State<Arc<AppState>>,
) -> Result<StatusCode, AppError> {
    if state.store.delete_truck(truck_id).await? {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(AppError::NotFound("Truck not found".to_string()))
    }
}

/// # GET /api/drivers
pub async fn get_drivers(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<Driver>>, AppError> {
    Ok(Json(state.store.drivers().await?))
}

/// # POST /api/drivers
pub async fn create_driver(
    State(state): State<Arc<AppState>>,
    Json(new): Json<NewDriver>,
) -> Result<impl IntoResponse, AppError> {
    let driver = state.store.insert_driver(new).await?;
    Ok((StatusCode::CREATED, Json(driver)))
}

/// # PUT /api/drivers/:driver_id
pub async fn update_driver(
    Path(driver_id): Path<i64>,
    State(state): State<Arc<AppState>>,
    Json(update): Json<DriverUpdate>,
) -> Result<Json<Driver>, AppError> {
    match state.store.update_driver(driver_id, update).await? {
        Some(driver) => Ok(Json(driver)),
        None => Err(AppError::NotFound("Driver not found".to_string())),
    }
}

/// # DELETE /api/drivers/:driver_id
pub async fn delete_driver(
    Path(driver_id): Path<i64>,
    State(state): State<Arc<AppState>>,
) -> Result<StatusCode, AppError> {
    if state.store.delete_driver(driver_id).await? {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(AppError::NotFound("Driver not found".to_string()))
    }
}

/// # GET /api/shipments
pub async fn get_shipments(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<Shipment>>, AppError> {
    Ok(Json(state.store.shipments().await?))
}

/// # POST /api/shipments
pub async fn create_shipment(
    State(state): State<Arc<AppState>>,
    Json(new): Json<NewShipment>,
) -> Result<impl IntoResponse, AppError> {
    let shipment = state.store.insert_shipment(new).await?;
    Ok((StatusCode::CREATED, Json(shipment)))
}

/// # PUT /api/shipments/:shipment_id
pub async fn update_shipment(
    Path(shipment_id): Path<i64>,
    State(state): State<Arc<AppState>>,
    Json(update): Json<ShipmentUpdate>,
) -> Result<Json<Shipment>, AppError> {
    match state.store.update_shipment(shipment_id, update).await? {
        Some(shipment) => Ok(Json(shipment)),
        None => Err(AppError::NotFound("Shipment not found".to_string())),
    }
}

/// # GET /api/revenues
pub async fn get_revenues(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<Revenue>>, AppError> {
    Ok(Json(state.store.revenues().await?))
}

/// # POST /api/revenues
pub async fn create_revenue(
    State(state): State<Arc<AppState>>,
    Json(new): Json<NewRevenue>,
) -> Result<impl IntoResponse, AppError> {
    let revenue = state.store.insert_revenue(new).await?;
    Ok((StatusCode::CREATED, Json(revenue)))
}

/// # GET /api/expenses
pub async fn get_expenses(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<Expense>>, AppError> {
    Ok(Json(state.store.expenses().await?))
}

/// # POST /api/expenses
pub async fn create_expense(
    State(state): State<Arc<AppState>>,
    Json(new): Json<NewExpense>,
) -> Result<impl IntoResponse, AppError> {
    let expense = state.store.insert_expense(new).await?;
    Ok((StatusCode::CREATED, Json(expense)))
}

/// # GET /api/maintenance
pub async fn get_maintenance(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<MaintenanceRecord>>, AppError> {
    Ok(Json(state.store.maintenance_records().await?))
}

/// # POST /api/maintenance
///
/// Recording maintenance also books the matching expense and stamps the
/// truck's last service date; see `LedgerStore::record_maintenance`.
pub async fn create_maintenance(
    State(state): State<Arc<AppState>>,
    Json(new): Json<NewMaintenanceRecord>,
) -> Result<impl IntoResponse, AppError> {
    match state.store.record_maintenance(new).await? {
        Some(record) => Ok((StatusCode::CREATED, Json(record))),
        None => Err(AppError::NotFound("Truck not found".to_string())),
    }
}

// ==============================================================================
// Driver settlement accounts
// ==============================================================================

/// # GET /api/drivers/:driver_id/account
pub async fn get_driver_account(
    Path(driver_id): Path<i64>,
    State(state): State<Arc<AppState>>,
) -> Result<Json<DriverAccount>, AppError> {
    match state.accounts.driver_account(state.store.as_ref(), driver_id).await? {
        Some(account) => Ok(Json(account)),
        None => Err(AppError::NotFound("Driver not found".to_string())),
    }
}

/// # GET /api/drivers/:driver_id/account-details
pub async fn get_driver_account_details(
    Path(driver_id): Path<i64>,
    State(state): State<Arc<AppState>>,
) -> Result<Json<DriverStatement>, AppError> {
    match state
        .accounts
        .driver_account_details(state.store.as_ref(), driver_id)
        .await?
    {
        Some(statement) => Ok(Json(statement)),
        None => Err(AppError::NotFound("Driver not found".to_string())),
    }
}

/// # GET /api/drivers/accounts/all
pub async fn get_all_driver_accounts(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<DriverAccount>>, AppError> {
    let accounts = state.accounts.all_driver_accounts(state.store.as_ref()).await?;
    Ok(Json(accounts))
}

/// # GET /api/drivers/accounts/summary
pub async fn get_drivers_summary(
    State(state): State<Arc<AppState>>,
) -> Result<Json<DriversSummary>, AppError> {
    let summary = state.accounts.drivers_summary(state.store.as_ref()).await?;
    Ok(Json(summary))
}

// ==============================================================================
// Analytics and reports
// ==============================================================================

/// # GET /api/analytics/truck-performance/:truck_id
pub async fn get_truck_performance(
    Path(truck_id): Path<i64>,
    Query(query): Query<DaysQuery>,
    State(state): State<Arc<AppState>>,
) -> Result<Json<TruckPerformance>, AppError> {
    let days = query.days.unwrap_or(DEFAULT_WINDOW_DAYS);
    let metrics = state
        .analytics
        .truck_performance(state.store.as_ref(), truck_id, days)
        .await?;
    Ok(Json(metrics))
}

/// # GET /api/analytics/driver-performance/:driver_id
pub async fn get_driver_performance(
    Path(driver_id): Path<i64>,
    Query(query): Query<DaysQuery>,
    State(state): State<Arc<AppState>>,
) -> Result<Json<DriverPerformance>, AppError> {
    let days = query.days.unwrap_or(DEFAULT_WINDOW_DAYS);
    let metrics = state
        .analytics
        .driver_performance(state.store.as_ref(), driver_id, days)
        .await?;
    Ok(Json(metrics))
}

/// # GET /api/analytics/fleet-efficiency
pub async fn get_fleet_efficiency(
    Query(query): Query<DaysQuery>,
    State(state): State<Arc<AppState>>,
) -> Result<Json<FleetEfficiencyReport>, AppError> {
    let days = query.days.unwrap_or(DEFAULT_WINDOW_DAYS);
    let report = state
        .analytics
        .fleet_efficiency(state.store.as_ref(), days)
        .await?;
    Ok(Json(report))
}

/// # GET /api/analytics/expense-analysis
pub async fn get_expense_analysis(
    Query(query): Query<DaysQuery>,
    State(state): State<Arc<AppState>>,
) -> Result<Json<ExpenseAnalysis>, AppError> {
    let days = query.days.unwrap_or(DEFAULT_WINDOW_DAYS);
    let analysis = state
        .analytics
        .expense_analysis(state.store.as_ref(), days)
        .await?;
    Ok(Json(analysis))
}

/// # GET /api/analytics/truck-profit/:truck_id
///
/// Takes an explicit `start_date`/`end_date` range, inclusive of both
/// bounds; either bound may be omitted or malformed, in which case it falls
/// back to the default trailing window.
pub async fn get_truck_profit(
    Path(truck_id): Path<i64>,
    Query(query): Query<RangeQuery>,
    State(state): State<Arc<AppState>>,
) -> Result<Json<TruckProfit>, AppError> {
    let (start, end) = resolve_range(&query);
    let profit = state
        .analytics
        .truck_profit(state.store.as_ref(), truck_id, start, end)
        .await?;
    Ok(Json(profit))
}

/// # GET /api/analytics/fleet-summary
pub async fn get_fleet_summary(
    Query(query): Query<RangeQuery>,
    State(state): State<Arc<AppState>>,
) -> Result<Json<FleetSummaryReport>, AppError> {
    let (start, end) = resolve_range(&query);
    let summary = state
        .analytics
        .fleet_summary(state.store.as_ref(), start, end)
        .await?;
    Ok(Json(summary))
}

/// # GET /api/dashboard
pub async fn get_dashboard(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Dashboard>, AppError> {
    let dashboard = state.analytics.dashboard(state.store.as_ref()).await?;
    Ok(Json(dashboard))
}

// ==============================================================================
// Notifications
// ==============================================================================

/// # GET /api/notifications
pub async fn get_notifications(
    Query(query): Query<LimitQuery>,
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<Notification>>, AppError> {
    let limit = query.limit.unwrap_or(50);
    Ok(Json(state.store.notifications(limit).await?))
}

/// # DELETE /api/notifications/:notification_id
pub async fn delete_notification(
    Path(notification_id): Path<i64>,
    State(state): State<Arc<AppState>>,
) -> Result<StatusCode, AppError> {
    if state.store.delete_notification(notification_id).await? {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(AppError::NotFound("Notification not found".to_string()))
    }
}

/// # GET /api/notifications/unread
pub async fn get_unread_notifications(
    State(state): State<Arc<AppState>>,
) -> Result<Json<UnreadNotifications>, AppError> {
    let notifications = state.alerts.unread_notifications(state.store.as_ref()).await?;
    Ok(Json(UnreadNotifications {
        count: notifications.len(),
        notifications,
    }))
}

/// # PUT /api/notifications/:notification_id/read
pub async fn mark_notification_read(
    Path(notification_id): Path<i64>,
    State(state): State<Arc<AppState>>,
) -> Result<Json<serde_json::Value>, AppError> {
    if state
        .alerts
        .mark_notification_read(state.store.as_ref(), notification_id)
        .await?
    {
        Ok(Json(json!({ "message": "notification marked as read" })))
    } else {
        Err(AppError::NotFound("Notification not found".to_string()))
    }
}

/// # POST /api/notifications/check-maintenance/:truck_id
pub async fn check_maintenance(
    Path(truck_id): Path<i64>,
    Query(query): Query<DaysQuery>,
    State(state): State<Arc<AppState>>,
) -> Result<Json<MaintenanceCheck>, AppError> {
    let threshold_days = query.days.unwrap_or(DEFAULT_MAINTENANCE_THRESHOLD_DAYS);
    let maintenance_due = state
        .alerts
        .check_maintenance_due(state.store.as_ref(), truck_id, threshold_days)
        .await?;
    Ok(Json(MaintenanceCheck {
        truck_id,
        maintenance_due,
        threshold_days,
    }))
}

/// # POST /api/notifications/check-profitability/:truck_id
pub async fn check_profitability(
    Path(truck_id): Path<i64>,
    Query(query): Query<DaysQuery>,
    State(state): State<Arc<AppState>>,
) -> Result<Json<ProfitabilityCheck>, AppError> {
    let period_days = query.days.unwrap_or(DEFAULT_PROFIT_WINDOW_DAYS);
    let is_profitable = state
        .alerts
        .check_truck_profitability(state.store.as_ref(), truck_id, period_days)
        .await?;
    Ok(Json(ProfitabilityCheck {
        truck_id,
        is_profitable,
        period_days,
    }))
}

// ==============================================================================
// Validation gate
// ==============================================================================

fn validation_response(problems: Vec<String>) -> (StatusCode, Json<ValidationOutcome>) {
    let status = if problems.is_empty() {
        StatusCode::OK
    } else {
        StatusCode::BAD_REQUEST
    };
    (
        status,
        Json(ValidationOutcome {
            valid: problems.is_empty(),
            errors: problems,
        }),
    )
}

/// # POST /api/validate/truck
pub async fn validate_truck(
    State(state): State<Arc<AppState>>,
    Json(draft): Json<TruckDraft>,
) -> Result<impl IntoResponse, AppError> {
    let problems = validation::validate_truck(state.store.as_ref(), &draft).await?;
    Ok(validation_response(problems))
}

/// # POST /api/validate/driver
pub async fn validate_driver(Json(draft): Json<DriverDraft>) -> impl IntoResponse {
    validation_response(validation::validate_driver(&draft))
}

/// # POST /api/validate/shipment
pub async fn validate_shipment(Json(draft): Json<ShipmentDraft>) -> impl IntoResponse {
    validation_response(validation::validate_shipment(&draft))
}
