//! Interfaces to the collaborators the pipeline drives: wallets, the chain
//! node, and the pipeline view consumed by actions.

use std::path::Path;
use std::time::Duration;

use crate::primitives::{
    AddressInfo, Amount, BlockchainInfo, PayloadType, Transaction, ValidatorInfo,
};
use crate::staker_error::{ServiceError, StakerError};

#[derive(Debug, Clone, Default)]
pub struct WalletOptions {
    pub timeout: Option<Duration>,
    pub custom_servers: Vec<String>,
}

#[derive(Debug, Clone, Default)]
pub struct TxOptions {
    pub fee: Amount,
    pub memo: String,
}

/// An opened wallet file.
pub trait WalletService {
    fn all_account_addresses(&self) -> Vec<String>;

    fn all_validator_addresses(&self) -> Vec<AddressInfo>;

    fn balance(&self, address: &str) -> Result<Amount, ServiceError>;

    fn calculate_fee(&self, amount: Amount, payload: PayloadType) -> Result<Amount, ServiceError>;

    fn make_bond_tx(
        &self,
        sender: &str,
        validator: &str,
        public_key: &str,
        stake: Amount,
        options: &TxOptions,
    ) -> Result<Transaction, ServiceError>;

    fn sign_transaction(&self, password: &str, tx: &mut Transaction) -> Result<(), ServiceError>;

    /// Returns the transaction id.
    fn broadcast_transaction(&self, tx: &Transaction) -> Result<String, ServiceError>;
}

pub trait WalletOpener {
    fn open(
        &self,
        path: &Path,
        options: &WalletOptions,
    ) -> Result<Box<dyn WalletService>, ServiceError>;
}

/// Read access to the chain node.
pub trait ChainQuery {
    fn blockchain_info(&self) -> Result<BlockchainInfo, ServiceError>;

    /// Fails with [`ServiceError::ValidatorNotFound`] for addresses the chain
    /// has never seen.
    fn validator(&self, address: &str) -> Result<ValidatorInfo, ServiceError>;
}

pub trait ChainConnector {
    fn connect(
        &self,
        endpoint: &str,
        timeout: Duration,
    ) -> Result<Box<dyn ChainQuery>, ServiceError>;
}

/// What an action sees of its pipeline.
pub trait PipelineProvider {
    fn name(&self) -> &str;

    /// Every account of every reward wallet, in wallet order.
    fn all_balances(&self) -> Result<Vec<(String, Amount)>, StakerError>;

    /// The wallet owning `address` and its password.
    fn account_wallet(&self, address: &str) -> Option<(&dyn WalletService, &str)>;

    /// Current stake of a validator. An unknown validator has zero stake and
    /// no info.
    fn validator_stake(
        &self,
        address: &str,
    ) -> Result<(Amount, Option<ValidatorInfo>), StakerError>;
}
