use std::collections::HashMap;
use std::rc::Rc;

use log::info;

use crate::actions::{self, Action};
use crate::clock::Sleeper;
use crate::config::{Options, PipelineConfig};
use crate::primitives::{Amount, ValidatorInfo};
use crate::provider::{
    ChainConnector, ChainQuery, PipelineProvider, WalletOpener, WalletOptions, WalletService,
};
use crate::staker_error::{ServiceError, StakerError};
use crate::static_config;

/// Reward wallets and the chain connection shared by a pipeline's actions.
pub struct PipelineContext {
    name: String,
    wallet_list: Vec<Box<dyn WalletService>>,
    wallet_password: Vec<String>,
    account_addresses: HashMap<String, usize>,
    blockchain_client: Box<dyn ChainQuery>,
}

impl PipelineContext {
    pub fn new(
        name: String,
        wallets: Vec<(Box<dyn WalletService>, String)>,
        blockchain_client: Box<dyn ChainQuery>,
    ) -> Self {
        let (wallet_list, wallet_password): (Vec<_>, Vec<_>) = wallets.into_iter().unzip();

        // a later wallet wins when two wallets share an address
        let mut account_addresses = HashMap::new();
        for (i, wallet) in wallet_list.iter().enumerate() {
            for address in wallet.all_account_addresses() {
                account_addresses.insert(address, i);
            }
        }

        Self {
            name,
            wallet_list,
            wallet_password,
            account_addresses,
            blockchain_client,
        }
    }

    pub fn wallet_count(&self) -> usize {
        self.wallet_list.len()
    }
}

impl PipelineProvider for PipelineContext {
    fn name(&self) -> &str {
        &self.name
    }

    fn all_balances(&self) -> Result<Vec<(String, Amount)>, StakerError> {
        let mut balances = Vec::new();
        for wallet in &self.wallet_list {
            for address in wallet.all_account_addresses() {
                let balance = wallet
                    .balance(&address)
                    .map_err(|source| StakerError::Balance {
                        address: address.clone(),
                        source,
                    })?;
                balances.push((address, balance));
            }
        }
        Ok(balances)
    }

    fn account_wallet(&self, address: &str) -> Option<(&dyn WalletService, &str)> {
        let i = *self.account_addresses.get(address)?;
        Some((self.wallet_list[i].as_ref(), self.wallet_password[i].as_str()))
    }

    fn validator_stake(
        &self,
        address: &str,
    ) -> Result<(Amount, Option<ValidatorInfo>), StakerError> {
        match self.blockchain_client.validator(address) {
            Ok(info) => Ok((info.stake, Some(info))),
            Err(err) if err.is_not_found() => Ok((Amount::ZERO, None)),
            Err(source) => Err(StakerError::ValidatorQuery {
                address: address.to_string(),
                source,
            }),
        }
    }
}

/// A named group of reward wallets with exactly one scheduled action.
pub struct Pipeline {
    name: String,
    actions: Vec<Box<dyn Action>>,
}

impl Pipeline {
    pub fn create(
        options: &Options,
        pipeline_config: &PipelineConfig,
        connector: &dyn ChainConnector,
        opener: &dyn WalletOpener,
        sleeper: Rc<dyn Sleeper>,
    ) -> Result<Self, StakerError> {
        let blockchain_client = connect(connector, &options.grpc_server)?;

        let wallet_options = WalletOptions {
            timeout: Some(static_config::DIAL_TIMEOUT),
            custom_servers: vec![options.grpc_server.clone()],
        };
        let mut wallets = Vec::with_capacity(pipeline_config.reward.wallets.len());
        for reward_wallet in &pipeline_config.reward.wallets {
            let wallet = opener
                .open(&reward_wallet.path, &wallet_options)
                .map_err(|source| StakerError::WalletOpen {
                    path: reward_wallet.path.clone(),
                    source,
                })?;
            wallets.push((wallet, reward_wallet.password.clone()));
        }

        let context =
            PipelineContext::new(pipeline_config.name.clone(), wallets, blockchain_client);
        info!(
            "Pipeline {} has {} wallets",
            pipeline_config.name,
            context.wallet_count()
        );

        let balances = context.all_balances()?;
        for (i, (address, balance)) in balances.iter().enumerate() {
            info!("{} - {} - balance: {}", i + 1, address, balance);
        }
        let total: Amount = balances.iter().map(|(_, b)| *b).sum();
        info!("Total balance: {}", total);

        let context: Rc<dyn PipelineProvider> = Rc::new(context);
        let mut pipeline_actions = Vec::with_capacity(pipeline_config.actions.len());
        for (i, action_config) in pipeline_config.actions.iter().enumerate() {
            let action = actions::create_action(
                context.clone(),
                i,
                options,
                action_config,
                opener,
                sleeper.clone(),
            )?;
            pipeline_actions.push(action);
        }

        Self::new(pipeline_config.name.clone(), pipeline_actions)
    }

    pub fn new(name: String, actions: Vec<Box<dyn Action>>) -> Result<Self, StakerError> {
        if actions.len() != 1 {
            return Err(StakerError::ActionCount {
                pipeline: name,
                count: actions.len(),
            });
        }
        Ok(Self { name, actions })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn actions(&self) -> &[Box<dyn Action>] {
        &self.actions
    }
}

/// Connects and asks the node for its status; a client that cannot answer
/// is dropped.
fn connect(
    connector: &dyn ChainConnector,
    endpoint: &str,
) -> Result<Box<dyn ChainQuery>, StakerError> {
    let to_error = |source: ServiceError| StakerError::Connect {
        endpoint: endpoint.to_string(),
        source,
    };
    let client = connector
        .connect(endpoint, static_config::DIAL_TIMEOUT)
        .map_err(to_error)?;
    let status = client.blockchain_info().map_err(to_error)?;
    info!(
        "Connected to {} at height {} ({} validators, {} staked)",
        endpoint, status.last_block_height, status.total_validators, status.total_stake
    );
    Ok(client)
}
