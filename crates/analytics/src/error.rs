use thiserror::Error;

#[derive(Error, Debug)]
pub enum AnalyticsError {
    #[error("Ledger store error: {0}")]
    Store(#[from] database::StoreError),
}
