use serde::{Deserialize, Serialize};
use staker::primitives::Transaction;
use staker::Amount;

use crate::network_error::NetworkError;

#[derive(Serialize, Deserialize, Debug, Clone)]
pub enum Request {
    GetBlockchainInfo,
    GetValidator(String),
    GetBalance(String),
    CalculateFee(Amount),
    BroadcastTransaction(Transaction),
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub enum Response {
    BlockchainInfo {
        last_block_height: u64,
        total_validators: usize,
        total_stake: Amount,
    },
    Validator {
        address: String,
        number: u32,
        stake: Amount,
        availability_score: f64,
    },
    Balance(Amount),
    Fee(Amount),
    TransactionId(String),
}

pub trait MessageHandler {
    fn receive(&mut self, request: &Request) -> Result<Response, NetworkError>;
}
