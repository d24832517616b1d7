use staker::ServiceError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum NetworkError {
    #[error("validator not found: {0}")]
    ValidatorNotFound(String),
    #[error("account: {0} not found")]
    AccountNotFound(String),
    #[error("insufficient balance of {0} to bond")]
    InsufficientBalance(String),
    #[error("transaction is not signed")]
    Unsigned,
    #[error("fee {fee} is below the minimum fee {min}")]
    FeeTooLow { fee: String, min: String },
    #[error("bond would raise validator {0} above the maximum stake")]
    MaxStakeExceeded(String),
    #[error("node is not connected")]
    NotConnected,
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

impl From<NetworkError> for ServiceError {
    fn from(err: NetworkError) -> Self {
        match err {
            NetworkError::ValidatorNotFound(address) => ServiceError::ValidatorNotFound(address),
            NetworkError::NotConnected => {
                ServiceError::Unavailable("node is not connected".to_string())
            }
            NetworkError::Io(err) => ServiceError::Io(err),
            NetworkError::Json(err) => ServiceError::Json(err),
            other => ServiceError::Rejected(other.to_string()),
        }
    }
}
