use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Database error: {0}")]
    Store(#[from] database::StoreError),
    #[error("Account engine error: {0}")]
    Accounts(#[from] accounts::AccountError),
    #[error("Analytics engine error: {0}")]
    Analytics(#[from] analytics::AnalyticsError),
    #[error("Alerter error: {0}")]
    Alerter(#[from] alerter::AlerterError),
    #[error("Not found: {0}")]
    NotFound(String),
}

/// Converts our custom `AppError` into an HTTP response.
impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error_message) = match self {
            AppError::Store(store_err) => {
                tracing::error!(error = ?store_err, "Ledger store error.");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "An internal database error occurred".to_string(),
                )
            }
            AppError::Accounts(account_err) => {
                tracing::error!(error = ?account_err, "Account engine error.");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "An error occurred while computing accounts".to_string(),
                )
            }
            AppError::Analytics(analytics_err) => {
                tracing::error!(error = ?analytics_err, "Analytics engine error.");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "An error occurred during analytics".to_string(),
                )
            }
            AppError::Alerter(alerter_err) => {
                tracing::error!(error = ?alerter_err, "Alerter error.");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "An error occurred while evaluating alerts".to_string(),
                )
            }
            AppError::NotFound(message) => (StatusCode::NOT_FOUND, message),
        };

        let body = Json(json!({ "error": error_message }));
        (status, body).into_response()
    }
}
