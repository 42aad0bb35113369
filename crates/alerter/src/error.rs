use thiserror::Error;

#[derive(Error, Debug)]
pub enum AlerterError {
    #[error("Ledger store error: {0}")]
    Store(#[from] database::StoreError),
}
