#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum TransactionError {
    #[error("amount must be positive")]
    AmountNotPositive,
    #[error("transfer's source and destination account/currency pair must differ")]
    InvalidAccountPair,
    #[error("same-currency transfer legs must carry equal amounts")]
    CurrencyMismatch,
}

impl crate::error::DomainError for TransactionError {}
