use thiserror::Error;

#[derive(Error, Debug)]
pub enum AccountError {
    #[error("Ledger store error: {0}")]
    Store(#[from] database::StoreError),
}
