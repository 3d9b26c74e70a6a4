#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum AccountError {
    #[error("amount must be positive")]
    AmountNotPositive,
    #[error("account is not opened")]
    AccountNotOpened,
    #[error("account is already opened")]
    AccountAlreadyOpened,
}

impl crate::error::DomainError for AccountError {}
