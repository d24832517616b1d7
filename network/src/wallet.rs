use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use staker::primitives::{AddressInfo, PayloadType, Transaction, TransactionType};
use staker::provider::{TxOptions, WalletService};
use staker::{Amount, ServiceError};

use crate::client::SharedNode;
use crate::message::{MessageHandler, Request, Response};
use crate::network_error::NetworkError;

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct ValidatorEntry {
    pub address: String,
    pub public_key: String,
}

/// On-disk wallet of the local devnet.
#[derive(Serialize, Deserialize, Debug, Clone, Default)]
pub struct WalletFile {
    #[serde(default)]
    pub accounts: Vec<String>,
    #[serde(default)]
    pub validators: Vec<ValidatorEntry>,
    pub password_hash: String,
}

impl WalletFile {
    pub fn hash_password(password: &str) -> String {
        let mut hasher = Sha256::new();
        hasher.update(password.as_bytes());
        hex::encode(hasher.finalize())
    }

    pub fn load(path: &Path) -> Result<Self, NetworkError> {
        Ok(serde_json::from_str(&fs::read_to_string(path)?)?)
    }

    pub fn save(&self, path: &Path) -> Result<(), NetworkError> {
        fs::write(path, serde_json::to_vec_pretty(self)?)?;
        Ok(())
    }
}

pub struct FileWallet {
    file: WalletFile,
    node: Option<SharedNode>,
}

impl FileWallet {
    pub fn new(file: WalletFile, node: Option<SharedNode>) -> Self {
        Self { file, node }
    }

    fn request(&self, request: Request) -> Result<Response, NetworkError> {
        let node = self.node.as_ref().ok_or(NetworkError::NotConnected)?;
        node.borrow_mut().receive(&request)
    }
}

fn unexpected(response: Response) -> ServiceError {
    ServiceError::Unavailable(format!("unexpected response: {:?}", response))
}

impl WalletService for FileWallet {
    fn all_account_addresses(&self) -> Vec<String> {
        self.file.accounts.clone()
    }

    fn all_validator_addresses(&self) -> Vec<AddressInfo> {
        self.file
            .validators
            .iter()
            .map(|v| AddressInfo {
                address: v.address.clone(),
                public_key: v.public_key.clone(),
            })
            .collect()
    }

    fn balance(&self, address: &str) -> Result<Amount, ServiceError> {
        match self.request(Request::GetBalance(address.to_string()))? {
            Response::Balance(balance) => Ok(balance),
            other => Err(unexpected(other)),
        }
    }

    fn calculate_fee(&self, amount: Amount, _payload: PayloadType) -> Result<Amount, ServiceError> {
        match self.request(Request::CalculateFee(amount))? {
            Response::Fee(fee) => Ok(fee),
            other => Err(unexpected(other)),
        }
    }

    fn make_bond_tx(
        &self,
        sender: &str,
        validator: &str,
        public_key: &str,
        stake: Amount,
        options: &TxOptions,
    ) -> Result<Transaction, ServiceError> {
        if !self.file.accounts.iter().any(|a| a == sender) {
            return Err(NetworkError::AccountNotFound(sender.to_string()).into());
        }
        let mut tx = Transaction::new(
            sender.to_string(),
            TransactionType::Bond {
                validator: validator.to_string(),
                public_key: public_key.to_string(),
                stake,
            },
            options.fee,
        );
        tx.memo = options.memo.clone();
        Ok(tx)
    }

    fn sign_transaction(&self, password: &str, tx: &mut Transaction) -> Result<(), ServiceError> {
        if WalletFile::hash_password(password) != self.file.password_hash {
            return Err(ServiceError::InvalidPassword);
        }
        let mut hasher = Sha256::new();
        hasher.update(self.file.password_hash.as_bytes());
        hasher.update(tx.sign_bytes()?);
        tx.signature = Some(hex::encode(hasher.finalize()));
        Ok(())
    }

    fn broadcast_transaction(&self, tx: &Transaction) -> Result<String, ServiceError> {
        match self.request(Request::BroadcastTransaction(tx.clone()))? {
            Response::TransactionId(id) => Ok(id),
            other => Err(unexpected(other)),
        }
    }
}
