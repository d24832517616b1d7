pub mod amount;
pub mod transaction;

pub use amount::{Amount, NANO_PER_COIN};
pub use transaction::{PayloadType, Transaction, TransactionType};

/// A validator-role address owned by a wallet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AddressInfo {
    pub address: String,
    pub public_key: String,
}

/// On-chain view of a validator.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidatorInfo {
    pub address: String,
    pub number: u32,
    pub stake: Amount,
    pub availability_score: f64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BlockchainInfo {
    pub last_block_height: u64,
    pub total_validators: usize,
    pub total_stake: Amount,
}
