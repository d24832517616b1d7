//! In-memory wallets and chain used by the unit tests.

use std::cell::{Cell, RefCell};
use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};
use std::rc::Rc;
use std::time::Duration;

use crate::clock::Sleeper;
use crate::primitives::{
    AddressInfo, Amount, BlockchainInfo, PayloadType, Transaction, TransactionType, ValidatorInfo,
};
use crate::provider::{
    ChainConnector, ChainQuery, PipelineProvider, TxOptions, WalletOpener, WalletOptions,
    WalletService,
};
use crate::staker_error::{ServiceError, StakerError};

pub const PASSWORD: &str = "pw";

pub fn coins(c: i64) -> Amount {
    Amount::from_whole_coins(c)
}

pub fn validator_info(address: &str, stake: Amount) -> ValidatorInfo {
    ValidatorInfo {
        address: address.to_string(),
        number: 0,
        stake,
        availability_score: 0.9,
    }
}

#[derive(Default)]
pub struct LedgerState {
    pub validators: HashMap<String, ValidatorInfo>,
    pub balances: HashMap<String, Amount>,
    pub broadcasts: Vec<Transaction>,
    pub stake_queries: usize,
    pub fee: Amount,
    pub fail_fee: bool,
    pub fail_make_tx: bool,
    pub fail_broadcast: bool,
    pub fail_balance: bool,
    pub fail_validator_query: bool,
    pub offline: bool,
}

/// Shared chain state behind the mock wallets and mock chain client.
#[derive(Clone, Default)]
pub struct Ledger(pub Rc<RefCell<LedgerState>>);

impl Ledger {
    pub fn new() -> Self {
        let ledger = Self::default();
        ledger.0.borrow_mut().fee = Amount::from_nano(10_000_000);
        ledger
    }

    pub fn set_validator(&self, address: &str, stake: Amount) {
        self.0
            .borrow_mut()
            .validators
            .insert(address.to_string(), validator_info(address, stake));
    }

    pub fn set_balance(&self, address: &str, balance: Amount) {
        self.0
            .borrow_mut()
            .balances
            .insert(address.to_string(), balance);
    }

    pub fn stake_of(&self, address: &str) -> Option<Amount> {
        self.0.borrow().validators.get(address).map(|v| v.stake)
    }

    pub fn broadcasts(&self) -> Vec<Transaction> {
        self.0.borrow().broadcasts.clone()
    }

    /// (sender, validator, stake) of every broadcast bond.
    pub fn bonds(&self) -> Vec<(String, String, Amount)> {
        self.broadcasts()
            .into_iter()
            .map(|tx| match tx.tx_type {
                TransactionType::Bond {
                    validator, stake, ..
                } => (tx.sender, validator, stake),
            })
            .collect()
    }

    fn query_validator(&self, address: &str) -> Result<ValidatorInfo, ServiceError> {
        let mut state = self.0.borrow_mut();
        state.stake_queries += 1;
        if state.fail_validator_query {
            return Err(ServiceError::Unavailable("validator query".to_string()));
        }
        state
            .validators
            .get(address)
            .cloned()
            .ok_or_else(|| ServiceError::ValidatorNotFound(address.to_string()))
    }
}

pub struct MockWallet {
    pub ledger: Ledger,
    pub accounts: Vec<String>,
    pub validators: Vec<AddressInfo>,
    pub password: String,
}

impl MockWallet {
    pub fn accounts(ledger: &Ledger, accounts: &[&str]) -> Self {
        Self {
            ledger: ledger.clone(),
            accounts: accounts.iter().map(|a| a.to_string()).collect(),
            validators: vec![],
            password: PASSWORD.to_string(),
        }
    }

    pub fn validators(ledger: &Ledger, validators: &[&str]) -> Self {
        Self {
            ledger: ledger.clone(),
            accounts: vec![],
            validators: validators
                .iter()
                .map(|v| AddressInfo {
                    address: v.to_string(),
                    public_key: format!("pub-{v}"),
                })
                .collect(),
            password: PASSWORD.to_string(),
        }
    }
}

impl WalletService for MockWallet {
    fn all_account_addresses(&self) -> Vec<String> {
        self.accounts.clone()
    }

    fn all_validator_addresses(&self) -> Vec<AddressInfo> {
        self.validators.clone()
    }

    fn balance(&self, address: &str) -> Result<Amount, ServiceError> {
        let state = self.ledger.0.borrow();
        if state.fail_balance {
            return Err(ServiceError::Unavailable("balance".to_string()));
        }
        Ok(state.balances.get(address).copied().unwrap_or_default())
    }

    fn calculate_fee(
        &self,
        _amount: Amount,
        _payload: PayloadType,
    ) -> Result<Amount, ServiceError> {
        let state = self.ledger.0.borrow();
        if state.fail_fee {
            return Err(ServiceError::Unavailable("fee".to_string()));
        }
        Ok(state.fee)
    }

    fn make_bond_tx(
        &self,
        sender: &str,
        validator: &str,
        public_key: &str,
        stake: Amount,
        options: &TxOptions,
    ) -> Result<Transaction, ServiceError> {
        if self.ledger.0.borrow().fail_make_tx {
            return Err(ServiceError::Rejected("make tx".to_string()));
        }
        Ok(Transaction::new(
            sender.to_string(),
            TransactionType::Bond {
                validator: validator.to_string(),
                public_key: public_key.to_string(),
                stake,
            },
            options.fee,
        ))
    }

    fn sign_transaction(&self, password: &str, tx: &mut Transaction) -> Result<(), ServiceError> {
        if password != self.password {
            return Err(ServiceError::InvalidPassword);
        }
        tx.signature = Some("signed".to_string());
        Ok(())
    }

    fn broadcast_transaction(&self, tx: &Transaction) -> Result<String, ServiceError> {
        let mut state = self.ledger.0.borrow_mut();
        if state.fail_broadcast {
            return Err(ServiceError::Rejected("broadcast".to_string()));
        }
        let TransactionType::Bond {
            validator, stake, ..
        } = &tx.tx_type;
        state
            .validators
            .entry(validator.clone())
            .or_insert_with(|| validator_info(validator, Amount::ZERO))
            .stake += *stake;
        if let Some(balance) = state.balances.get_mut(&tx.sender) {
            *balance -= *stake + tx.fee;
        }
        state.broadcasts.push(tx.clone());
        Ok(format!("tx-{}", state.broadcasts.len()))
    }
}

pub struct MockChain {
    pub ledger: Ledger,
}

impl ChainQuery for MockChain {
    fn blockchain_info(&self) -> Result<BlockchainInfo, ServiceError> {
        let state = self.ledger.0.borrow();
        if state.offline {
            return Err(ServiceError::Unavailable("offline".to_string()));
        }
        Ok(BlockchainInfo {
            last_block_height: state.broadcasts.len() as u64,
            total_validators: state.validators.len(),
            total_stake: state.validators.values().map(|v| v.stake).sum(),
        })
    }

    fn validator(&self, address: &str) -> Result<ValidatorInfo, ServiceError> {
        self.ledger.query_validator(address)
    }
}

pub struct MockConnector {
    pub ledger: Ledger,
}

impl ChainConnector for MockConnector {
    fn connect(
        &self,
        _endpoint: &str,
        _timeout: Duration,
    ) -> Result<Box<dyn ChainQuery>, ServiceError> {
        Ok(Box::new(MockChain {
            ledger: self.ledger.clone(),
        }))
    }
}

/// Opens wallets registered by path.
#[derive(Default)]
pub struct MockOpener {
    pub ledger: Ledger,
    pub accounts: HashMap<PathBuf, Vec<String>>,
    pub validators: HashMap<PathBuf, Vec<String>>,
    pub opened: RefCell<Vec<(PathBuf, WalletOptions)>>,
}

impl MockOpener {
    pub fn new(ledger: &Ledger) -> Self {
        Self {
            ledger: ledger.clone(),
            ..Default::default()
        }
    }

    pub fn with_accounts(mut self, path: &str, accounts: &[&str]) -> Self {
        self.accounts.insert(
            PathBuf::from(path),
            accounts.iter().map(|a| a.to_string()).collect(),
        );
        self
    }

    pub fn with_validators(mut self, path: &str, validators: &[&str]) -> Self {
        self.validators.insert(
            PathBuf::from(path),
            validators.iter().map(|v| v.to_string()).collect(),
        );
        self
    }
}

impl WalletOpener for MockOpener {
    fn open(
        &self,
        path: &Path,
        options: &WalletOptions,
    ) -> Result<Box<dyn WalletService>, ServiceError> {
        self.opened
            .borrow_mut()
            .push((path.to_path_buf(), options.clone()));
        if let Some(accounts) = self.accounts.get(path) {
            let accounts: Vec<&str> = accounts.iter().map(String::as_str).collect();
            return Ok(Box::new(MockWallet::accounts(&self.ledger, &accounts)));
        }
        if let Some(validators) = self.validators.get(path) {
            let validators: Vec<&str> = validators.iter().map(String::as_str).collect();
            return Ok(Box::new(MockWallet::validators(&self.ledger, &validators)));
        }
        Err(ServiceError::Io(std::io::Error::new(
            std::io::ErrorKind::NotFound,
            path.display().to_string(),
        )))
    }
}

/// A pipeline with a single wallet owning every listed account.
pub struct MockProvider {
    pub ledger: Ledger,
    pub wallet: MockWallet,
    pub orphans: HashSet<String>,
}

impl MockProvider {
    pub fn new(ledger: &Ledger, accounts: &[(&str, Amount)]) -> Self {
        for (address, balance) in accounts {
            ledger.set_balance(address, *balance);
        }
        let names: Vec<&str> = accounts.iter().map(|(a, _)| *a).collect();
        Self {
            ledger: ledger.clone(),
            wallet: MockWallet::accounts(ledger, &names),
            orphans: HashSet::new(),
        }
    }
}

impl PipelineProvider for MockProvider {
    fn name(&self) -> &str {
        "mock"
    }

    fn all_balances(&self) -> Result<Vec<(String, Amount)>, StakerError> {
        self.wallet
            .accounts
            .iter()
            .map(|address| {
                let balance = self
                    .wallet
                    .balance(address)
                    .map_err(|source| StakerError::Balance {
                        address: address.clone(),
                        source,
                    })?;
                Ok((address.clone(), balance))
            })
            .collect()
    }

    fn account_wallet(&self, address: &str) -> Option<(&dyn WalletService, &str)> {
        if self.orphans.contains(address) || !self.wallet.accounts.iter().any(|a| a == address) {
            return None;
        }
        Some((&self.wallet, PASSWORD))
    }

    fn validator_stake(
        &self,
        address: &str,
    ) -> Result<(Amount, Option<ValidatorInfo>), StakerError> {
        match self.ledger.query_validator(address) {
            Ok(info) => Ok((info.stake, Some(info))),
            Err(err) if err.is_not_found() => Ok((Amount::ZERO, None)),
            Err(source) => Err(StakerError::ValidatorQuery {
                address: address.to_string(),
                source,
            }),
        }
    }
}

#[derive(Default)]
pub struct RecordingSleeper {
    pub sleeps: RefCell<Vec<Duration>>,
}

impl RecordingSleeper {
    pub fn sleeps(&self) -> Vec<Duration> {
        self.sleeps.borrow().clone()
    }
}

impl Sleeper for RecordingSleeper {
    fn sleep(&self, duration: Duration) {
        self.sleeps.borrow_mut().push(duration);
    }
}

/// Counts calls to a callback; used to stub actions.
#[derive(Default)]
pub struct CallCounter(pub Cell<usize>);

impl CallCounter {
    pub fn bump(&self) -> usize {
        let n = self.0.get() + 1;
        self.0.set(n);
        n
    }
}
