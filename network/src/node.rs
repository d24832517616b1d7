use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use log::{debug, info};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use staker::primitives::{Transaction, TransactionType};
use staker::{static_config, Amount};

use crate::message::{MessageHandler, Request, Response};
use crate::network_error::NetworkError;

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct FeeParams {
    /// Fee as a fraction of the amount, in basis points.
    pub fraction_bps: u64,
    pub min_fee: Amount,
    pub max_fee: Amount,
}

impl Default for FeeParams {
    fn default() -> Self {
        Self {
            fraction_bps: 1,
            min_fee: Amount::from_nano(1_000_000),
            max_fee: Amount::from_nano(1_000_000_000),
        }
    }
}

impl FeeParams {
    pub fn fee_for(&self, amount: Amount) -> Amount {
        let proportional = amount.nano() as i128 * self.fraction_bps as i128 / 10_000;
        let proportional = Amount::from_nano(proportional.clamp(0, i64::MAX as i128) as i64);
        proportional.clamp(self.min_fee, self.max_fee)
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct ValidatorRecord {
    pub public_key: String,
    pub number: u32,
    pub stake: Amount,
    #[serde(default = "full_availability")]
    pub availability_score: f64,
}

fn full_availability() -> f64 {
    1.0
}

fn default_max_stake() -> Amount {
    static_config::MAX_STAKE
}

/// Ledger of the local devnet, stored as JSON.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct NodeState {
    #[serde(default)]
    pub height: u64,
    #[serde(default)]
    pub fee: FeeParams,
    #[serde(default = "default_max_stake")]
    pub max_stake: Amount,
    #[serde(default)]
    pub accounts: BTreeMap<String, Amount>,
    #[serde(default)]
    pub validators: BTreeMap<String, ValidatorRecord>,
}

impl Default for NodeState {
    fn default() -> Self {
        Self {
            height: 0,
            fee: FeeParams::default(),
            max_stake: default_max_stake(),
            accounts: BTreeMap::new(),
            validators: BTreeMap::new(),
        }
    }
}

impl NodeState {
    pub fn total_stake(&self) -> Amount {
        self.validators.values().map(|v| v.stake).sum()
    }

    /// Moves `stake + fee` out of the sender's balance into the validator's
    /// stake, registering unknown validators.
    pub fn bond(
        &mut self,
        sender: &str,
        validator: &str,
        public_key: &str,
        stake: Amount,
        fee: Amount,
    ) -> Result<(), NetworkError> {
        let current = self
            .validators
            .get(validator)
            .map_or(Amount::ZERO, |v| v.stake);
        if current + stake > self.max_stake {
            return Err(NetworkError::MaxStakeExceeded(validator.to_string()));
        }

        let balance = self
            .accounts
            .get_mut(sender)
            .ok_or_else(|| NetworkError::AccountNotFound(sender.to_string()))?;
        if *balance < stake + fee {
            return Err(NetworkError::InsufficientBalance(sender.to_string()));
        }
        *balance -= stake + fee;

        let number = self.validators.len() as u32;
        self.validators
            .entry(validator.to_string())
            .or_insert_with(|| ValidatorRecord {
                public_key: public_key.to_string(),
                number,
                stake: Amount::ZERO,
                availability_score: 1.0,
            })
            .stake += stake;
        Ok(())
    }
}

pub fn transaction_id(tx: &Transaction) -> Result<String, NetworkError> {
    let mut hasher = Sha256::new();
    hasher.update(tx.bytes()?);
    Ok(hex::encode(hasher.finalize()))
}

#[derive(Debug)]
pub struct LocalNode {
    state: NodeState,
    path: Option<PathBuf>,
}

impl LocalNode {
    pub fn in_memory(state: NodeState) -> Self {
        Self { state, path: None }
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, NetworkError> {
        let path = path.as_ref();
        let state = serde_json::from_str(&fs::read_to_string(path)?)?;
        Ok(Self {
            state,
            path: Some(path.to_path_buf()),
        })
    }

    pub fn state(&self) -> &NodeState {
        &self.state
    }

    fn persist(&self) -> Result<(), NetworkError> {
        if let Some(path) = &self.path {
            fs::write(path, serde_json::to_vec_pretty(&self.state)?)?;
        }
        Ok(())
    }

    fn apply(&mut self, tx: &Transaction) -> Result<String, NetworkError> {
        if !tx.is_signed() {
            return Err(NetworkError::Unsigned);
        }

        let TransactionType::Bond {
            validator,
            public_key,
            stake,
        } = &tx.tx_type;
        let min = self.state.fee.min_fee;
        if tx.fee < min {
            return Err(NetworkError::FeeTooLow {
                fee: tx.fee.to_string(),
                min: min.to_string(),
            });
        }

        // validate on a copy so a failed write leaves the ledger untouched
        let mut next = self.state.clone();
        next.bond(&tx.sender, validator, public_key, *stake, tx.fee)?;
        next.height += 1;

        let id = transaction_id(tx)?;
        let previous = std::mem::replace(&mut self.state, next);
        if let Err(err) = self.persist() {
            self.state = previous;
            return Err(err);
        }

        info!(
            "block {}: {} bonded {} to {}",
            self.state.height, tx.sender, stake, validator
        );
        Ok(id)
    }
}

impl MessageHandler for LocalNode {
    fn receive(&mut self, request: &Request) -> Result<Response, NetworkError> {
        debug!("request: {:?}", request);
        match request {
            Request::GetBlockchainInfo => Ok(Response::BlockchainInfo {
                last_block_height: self.state.height,
                total_validators: self.state.validators.len(),
                total_stake: self.state.total_stake(),
            }),
            Request::GetValidator(address) => {
                let record = self
                    .state
                    .validators
                    .get(address)
                    .ok_or_else(|| NetworkError::ValidatorNotFound(address.clone()))?;
                Ok(Response::Validator {
                    address: address.clone(),
                    number: record.number,
                    stake: record.stake,
                    availability_score: record.availability_score,
                })
            }
            Request::GetBalance(address) => {
                let balance = self.state.accounts.get(address).copied();
                Ok(Response::Balance(balance.unwrap_or_default()))
            }
            Request::CalculateFee(amount) => Ok(Response::Fee(self.state.fee.fee_for(*amount))),
            Request::BroadcastTransaction(tx) => self.apply(tx).map(Response::TransactionId),
        }
    }
}
