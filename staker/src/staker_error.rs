use std::path::PathBuf;

use thiserror::Error;

/// Failure reported by a wallet or chain collaborator.
#[derive(Error, Debug)]
pub enum ServiceError {
    #[error("validator not found: {0}")]
    ValidatorNotFound(String),
    #[error("service unavailable: {0}")]
    Unavailable(String),
    #[error("request rejected: {0}")]
    Rejected(String),
    #[error("invalid password")]
    InvalidPassword,
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

impl ServiceError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, ServiceError::ValidatorNotFound(_))
    }
}

#[derive(Error, Debug)]
pub enum StakerError {
    #[error("invalid configuration: {0}")]
    Config(String),
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("failed to parse configuration: {0}")]
    Yaml(#[from] serde_yaml::Error),
    #[error("invalid amount: {0}")]
    InvalidAmount(String),
    #[error("invalid trigger time {value:?}: {source}")]
    TriggerTime {
        value: String,
        source: chrono::ParseError,
    },
    #[error("no retry delay found")]
    EmptyRetryLadder,
    #[error("no pipelines found")]
    NoPipelines,
    #[error("pipeline {pipeline} has {count} actions, limit to one action per pipeline")]
    ActionCount { pipeline: String, count: usize },
    #[error("unknown action type: {0}")]
    UnknownActionType(String),
    #[error("action {0} has no trigger time")]
    NoTriggerTimes(String),
    #[error("no actions found")]
    NoPendingActions,
    #[error("failed to open wallet {path}: {source}")]
    WalletOpen { path: PathBuf, source: ServiceError },
    #[error("failed to connect to blockchain {endpoint}: {source}")]
    Connect {
        endpoint: String,
        source: ServiceError,
    },
    #[error("failed to get balance of {address}: {source}")]
    Balance {
        address: String,
        source: ServiceError,
    },
    #[error("failed to get validator {address}: {source}")]
    ValidatorQuery {
        address: String,
        source: ServiceError,
    },
    #[error("failed to get wallet for address: {0}")]
    AccountWalletNotFound(String),
    #[error("failed to get public key for address: {0}")]
    PublicKeyNotFound(String),
    #[error("failed to make bond transaction: {0}")]
    MakeBondTx(#[source] ServiceError),
    #[error("failed to sign transaction: {0}")]
    SignTx(#[source] ServiceError),
    #[error("failed to broadcast transaction: {0}")]
    Broadcast(#[source] ServiceError),
}
