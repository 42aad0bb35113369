use database::{LedgerStore, StoreError};
use rust_decimal::Decimal;
use serde::Deserialize;

/// Pre-creation validation of incoming entity payloads.
///
/// Every field is optional at this stage; the gate's job is to turn missing
/// or out-of-range fields into readable problems rather than letting the
/// store reject them. An empty problem list means the payload is valid.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TruckDraft {
    pub truck_type: Option<String>,
    pub plate: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct DriverDraft {
    pub name: Option<String>,
    pub phone: Option<String>,
    pub salary: Option<Decimal>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ShipmentDraft {
    pub truck_id: Option<i64>,
    pub driver_id: Option<i64>,
    pub origin: Option<String>,
    pub destination: Option<String>,
    pub cargo: Option<String>,
    pub revenue: Option<Decimal>,
}

fn missing(value: &Option<String>) -> bool {
    value.as_deref().map_or(true, |v| v.trim().is_empty())
}

/// Checks a truck payload, including plate uniqueness against the store.
pub async fn validate_truck(
    store: &dyn LedgerStore,
    draft: &TruckDraft,
) -> Result<Vec<String>, StoreError> {
    let mut problems = Vec::new();

    if missing(&draft.truck_type) {
        problems.push("truck type is required".to_string());
    }

    match draft.plate.as_deref().map(str::trim) {
        None | Some("") => problems.push("plate number is required".to_string()),
        Some(plate) => {
            if store.truck_with_plate(plate).await?.is_some() {
                problems.push("plate number is already registered".to_string());
            }
        }
    }

    Ok(problems)
}

pub fn validate_driver(draft: &DriverDraft) -> Vec<String> {
    let mut problems = Vec::new();

    if missing(&draft.name) {
        problems.push("driver name is required".to_string());
    }
    if missing(&draft.phone) {
        problems.push("phone number is required".to_string());
    }
    if draft.salary.map_or(true, |s| s <= Decimal::ZERO) {
        problems.push("salary must be greater than zero".to_string());
    }

    problems
}

pub fn validate_shipment(draft: &ShipmentDraft) -> Vec<String> {
    let mut problems = Vec::new();

    if draft.truck_id.is_none() {
        problems.push("truck is required".to_string());
    }
    if draft.driver_id.is_none() {
        problems.push("driver is required".to_string());
    }
    if missing(&draft.origin) {
        problems.push("origin is required".to_string());
    }
    if missing(&draft.destination) {
        problems.push("destination is required".to_string());
    }
    if missing(&draft.cargo) {
        problems.push("cargo description is required".to_string());
    }
    if draft.revenue.map_or(true, |r| r <= Decimal::ZERO) {
        problems.push("revenue must be greater than zero".to_string());
    }

    problems
}
