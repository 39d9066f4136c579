use alloy::primitives::B256;
use thiserror::Error;

/// Process-wide failure taxonomy. Configuration problems are fatal at
/// startup; the other variants surface through the recovery flow.
#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Config(#[from] config::ConfigError),
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
    #[error("signer unavailable: {0}")]
    Signer(String),
    #[error("network unavailable: {message}")]
    Network { message: String },
    #[error("quote unavailable: {message}")]
    Quote { message: String, code: Option<i64> },
    #[error("transaction failed: {reason}")]
    Transaction {
        reason: String,
        code: Option<i64>,
        tx_hash: Option<B256>,
    },
    #[error(transparent)]
    Anyhow(#[from] anyhow::Error),
}

pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    /// Stable label for metrics and structured logs.
    pub fn kind(&self) -> &'static str {
        match self {
            Error::Config(_) | Error::InvalidConfig(_) => "config",
            Error::Signer(_) => "signer",
            Error::Network { .. } => "network",
            Error::Quote { .. } => "quote",
            Error::Transaction { .. } => "transaction",
            Error::Anyhow(_) => "other",
        }
    }

    pub fn code(&self) -> Option<i64> {
        match self {
            Error::Quote { code, .. } | Error::Transaction { code, .. } => *code,
            _ => None,
        }
    }

    pub fn tx_hash(&self) -> Option<B256> {
        match self {
            Error::Transaction { tx_hash, .. } => *tx_hash,
            _ => None,
        }
    }
}
