pub mod plan;

use std::collections::{HashMap, HashSet, VecDeque};
use std::rc::Rc;
use std::time::Duration;

use log::{debug, info, warn};

use crate::actions::Action;
use crate::clock::Sleeper;
use crate::config::config_utils::{self, StakeBounds, TriggerTime};
use crate::config::{ActionConfig, Options};
use crate::primitives::{AddressInfo, Amount, PayloadType, ValidatorInfo};
use crate::provider::{PipelineProvider, TxOptions, WalletOpener, WalletOptions, WalletService};
use crate::staker_error::StakerError;
use crate::static_config;

use plan::{confirmation_policy, has_spendable, plan_bond, BondPlan, Confirmation, StakeCache};

#[derive(Debug, Clone, Copy)]
pub struct BondSettings {
    pub reserve_fees: Amount,
    /// Used when the wallet fails to estimate a fee.
    pub fallback_fee: Amount,
    pub bounds: StakeBounds,
    pub confirmation_wait: Duration,
}

impl BondSettings {
    pub fn from_options(options: &Options) -> Result<Self, StakerError> {
        Ok(Self {
            reserve_fees: options.reserve_fees()?,
            fallback_fee: options.fallback_fee()?,
            bounds: StakeBounds::default(),
            confirmation_wait: static_config::CONFIRMATION_WAIT,
        })
    }
}

/// Spreads the reward accounts' spendable balance over the target validators.
pub struct BondAction {
    index: usize,
    validator_addresses: Vec<String>,
    validator_address_info: HashMap<String, AddressInfo>,
    pipeline: Rc<dyn PipelineProvider>,
    time: Vec<TriggerTime>,
    settings: BondSettings,
    sleeper: Rc<dyn Sleeper>,
}

/// Keeps the first occurrence of every validator address across the target
/// wallets.
pub fn collect_targets(wallets: &[Box<dyn WalletService>]) -> Vec<AddressInfo> {
    let mut processed = HashSet::new();
    let mut targets = Vec::new();
    for wallet in wallets {
        for address in wallet.all_validator_addresses() {
            if !processed.insert(address.address.clone()) {
                warn!("ignore duplicate target address: {}", address.address);
                continue;
            }
            targets.push(address);
        }
    }
    targets
}

impl BondAction {
    pub fn create(
        pipeline: Rc<dyn PipelineProvider>,
        index: usize,
        options: &Options,
        action_config: &ActionConfig,
        opener: &dyn WalletOpener,
        sleeper: Rc<dyn Sleeper>,
    ) -> Result<Self, StakerError> {
        let settings = BondSettings::from_options(options)?;
        let time = config_utils::parse_trigger_times(&action_config.time)?;

        let mut wallets = Vec::with_capacity(action_config.targets.len());
        for target in &action_config.targets {
            let wallet = opener
                .open(target, &WalletOptions::default())
                .map_err(|source| StakerError::WalletOpen {
                    path: target.clone(),
                    source,
                })?;
            wallets.push(wallet);
        }

        let action = Self::new(
            pipeline,
            index,
            collect_targets(&wallets),
            time,
            settings,
            sleeper,
        );
        action.log_targets()?;
        Ok(action)
    }

    pub fn new(
        pipeline: Rc<dyn PipelineProvider>,
        index: usize,
        targets: Vec<AddressInfo>,
        time: Vec<TriggerTime>,
        settings: BondSettings,
        sleeper: Rc<dyn Sleeper>,
    ) -> Self {
        let validator_addresses = targets.iter().map(|t| t.address.clone()).collect();
        let validator_address_info = targets
            .into_iter()
            .map(|t| (t.address.clone(), t))
            .collect();
        Self {
            index,
            validator_addresses,
            validator_address_info,
            pipeline,
            time,
            settings,
            sleeper,
        }
    }

    pub fn validator_addresses(&self) -> &[String] {
        &self.validator_addresses
    }

    fn log_targets(&self) -> Result<(), StakerError> {
        info!(
            "Pipeline {} action {} has {} bond targets",
            self.pipeline.name(),
            self.index,
            self.validator_addresses.len()
        );

        let mut total_stake = Amount::ZERO;
        for (i, address) in self.validator_addresses.iter().enumerate() {
            let (stake, validator_info) = self.pipeline.validator_stake(address)?;
            let availability_score = validator_info
                .as_ref()
                .map_or(1.0, |v| v.availability_score);
            info!(
                "{} - {} - stake: {} (score: {})",
                i + 1,
                address,
                stake,
                availability_score
            );
            total_stake += stake;
        }
        info!("Total stake: {}", total_stake);
        Ok(())
    }

    fn cached_stake(
        &self,
        cache: &mut StakeCache,
        address: &str,
    ) -> Result<(Amount, Option<ValidatorInfo>), StakerError> {
        if let Some(cached) = cache.get(address) {
            return Ok((cached.stake, cached.info.clone()));
        }
        let (stake, info) = self.pipeline.validator_stake(address)?;
        cache.insert(address, stake, info.clone());
        Ok((stake, info))
    }

    /// Builds, signs and broadcasts one bond. Returns the fee paid.
    fn bond(
        &self,
        wallet: &dyn WalletService,
        password: &str,
        account: &str,
        validator: &str,
        stake: Amount,
        after: Amount,
    ) -> Result<Amount, StakerError> {
        let public_key = self
            .validator_address_info
            .get(validator)
            .map(|info| info.public_key.as_str())
            .ok_or_else(|| StakerError::PublicKeyNotFound(validator.to_string()))?;

        let fee = match wallet.calculate_fee(stake, PayloadType::Bond) {
            Ok(fee) => fee,
            Err(err) => {
                warn!("Failed to calculate fee: {}", err);
                self.settings.fallback_fee
            }
        };

        info!(
            "[validator bond] validator={} bond={} fee={} after={}",
            validator, stake, fee, after
        );

        let options = TxOptions {
            fee,
            ..Default::default()
        };
        let mut trx = wallet
            .make_bond_tx(account, validator, public_key, stake, &options)
            .map_err(StakerError::MakeBondTx)?;
        wallet
            .sign_transaction(password, &mut trx)
            .map_err(StakerError::SignTx)?;

        if let Ok(bytes) = trx.bytes() {
            debug!("Signed transaction data: {}", hex::encode(bytes));
        }

        let id = wallet
            .broadcast_transaction(&trx)
            .map_err(StakerError::Broadcast)?;
        info!("Transaction hash: {}", id);

        Ok(fee)
    }
}

impl Action for BondAction {
    fn name(&self) -> &str {
        "bond"
    }

    fn trigger_times(&self) -> &[TriggerTime] {
        &self.time
    }

    fn run(&self) -> Result<(), StakerError> {
        let balances = self.pipeline.all_balances()?;
        let BondSettings {
            reserve_fees,
            bounds,
            confirmation_wait,
            ..
        } = self.settings;

        let mut cache = StakeCache::new();
        let mut broadcast_count = 0;
        let last_account = balances.len().saturating_sub(1);

        for (account_index, (account, balance)) in balances.iter().enumerate() {
            let mut balance = *balance;
            info!("[account facts] - {} - balance: {}", account, balance);

            if !has_spendable(balance, reserve_fees, &bounds) {
                continue;
            }

            let (wallet, password) = self
                .pipeline
                .account_wallet(account)
                .ok_or_else(|| StakerError::AccountWalletNotFound(account.clone()))?;

            let addresses = self.validator_addresses.iter().map(String::as_str);
            let mut candidates: VecDeque<&str> = addresses.collect();

            while let Some(&validator) = candidates.front() {
                let (stake, validator_info) = self.cached_stake(&mut cache, validator)?;
                let available = balance - reserve_fees;

                debug!(
                    "[validator facts] validator={} stake={} wants={}",
                    validator,
                    stake,
                    bounds.max - stake
                );

                let (stake_available, after) = match plan_bond(&bounds, stake, available) {
                    BondPlan::Full | BondPlan::BelowMinimum => {
                        candidates.pop_front();
                        continue;
                    }
                    BondPlan::Bond { amount, after } => (amount, after),
                };

                let fee = self.bond(wallet, password, account, validator, stake_available, after)?;
                broadcast_count += 1;

                balance -= stake_available + fee;
                info!("[account update] - {} - balance: {}", account, balance);

                match confirmation_policy(&bounds, validator_info.is_some(), after) {
                    Confirmation::WaitAndRefresh => {
                        // the final wait below covers the last bond of the run
                        if account_index == last_account && candidates.len() == 1 {
                            break;
                        }
                        info!(
                            "[validator bond] validator={} wait block confirm",
                            validator
                        );
                        self.sleeper.sleep(confirmation_wait);
                        let (stake, info) = self.pipeline.validator_stake(validator)?;
                        cache.insert(validator, stake, info);
                    }
                    Confirmation::Optimistic => cache.set_stake(validator, after),
                }

                candidates.pop_front();

                if !has_spendable(balance, reserve_fees, &bounds) {
                    break;
                }
            }
        }

        if broadcast_count > 0 {
            info!("wait block confirm");
            self.sleeper.sleep(confirmation_wait);
        }

        Ok(())
    }
}
