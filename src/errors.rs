use thiserror::Error;

pub type Result<T> = std::result::Result<T, AppError>;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Quote error: {0}")]
    Quote(String),

    #[error("Account preparation error: {0}")]
    AccountPreparation(String),

    #[error("Broadcast error: {0}")]
    Broadcast(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("RPC error: {0}")]
    Rpc(#[from] solana_client::client_error::ClientError),

    #[error("Serialization error: {0}")]
    SerdeJson(#[from] serde_json::Error),
}

impl AppError {
    /// Re-tag a collaborator failure as a quote failure.
    pub fn into_quote(self) -> Self {
        match self {
            AppError::Quote(_) => self,
            other => AppError::Quote(other.to_string()),
        }
    }

    /// Re-tag a collaborator failure as an account preparation failure.
    pub fn into_account_preparation(self) -> Self {
        match self {
            AppError::AccountPreparation(_) => self,
            other => AppError::AccountPreparation(other.to_string()),
        }
    }
}
