pub mod config_utils;
pub mod static_config;

use std::fs;
use std::path::{Path, PathBuf};

use log::warn;
use serde::Deserialize;

use crate::primitives::Amount;
use crate::staker_error::StakerError;

#[derive(Deserialize, Debug, Clone)]
pub struct Config {
    pub options: Options,
    #[serde(default)]
    pub pipeline: Vec<PipelineConfig>,
}

#[derive(Deserialize, Debug, Clone)]
pub struct Options {
    pub grpc_server: String,
    #[serde(default)]
    pub retry_delay: Vec<u64>,
    #[serde(default)]
    pub reserve_fees: f64,
    #[serde(default)]
    pub tx_fee: f64,
}

impl Options {
    pub fn reserve_fees(&self) -> Result<Amount, StakerError> {
        Amount::from_coins(self.reserve_fees)
    }

    /// Fee used for a bond when the wallet cannot estimate one.
    pub fn fallback_fee(&self) -> Result<Amount, StakerError> {
        Amount::from_coins(self.tx_fee)
    }
}

#[derive(Deserialize, Debug, Clone)]
pub struct PipelineConfig {
    pub name: String,
    #[serde(default)]
    pub reward: Reward,
    #[serde(default)]
    pub actions: Vec<ActionConfig>,
}

#[derive(Deserialize, Debug, Clone, Default)]
pub struct Reward {
    #[serde(default)]
    pub wallets: Vec<WalletConfig>,
}

#[derive(Deserialize, Debug, Clone)]
pub struct WalletConfig {
    pub path: PathBuf,
    #[serde(default)]
    pub password: String,
}

#[derive(Deserialize, Debug, Clone)]
pub struct ActionConfig {
    #[serde(rename = "type")]
    pub action_type: String,
    #[serde(default)]
    pub time: Vec<String>,
    #[serde(default)]
    pub targets: Vec<PathBuf>,
}

impl Config {
    pub fn load_from_file(path: impl AsRef<Path>) -> Result<Self, StakerError> {
        let path = path.as_ref();
        let data = fs::read_to_string(path).map_err(|source| StakerError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_yaml(&data)
    }

    pub fn from_yaml(data: &str) -> Result<Self, StakerError> {
        let mut config: Config = serde_yaml::from_str(data)?;

        if config.options.reserve_fees < static_config::MIN_RESERVE_FEES {
            warn!(
                "reserve_fees {} raised to {}",
                config.options.reserve_fees,
                static_config::MIN_RESERVE_FEES
            );
            config.options.reserve_fees = static_config::MIN_RESERVE_FEES;
        }

        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), StakerError> {
        if self.options.retry_delay.is_empty() {
            return Err(StakerError::EmptyRetryLadder);
        }
        if self.options.tx_fee < 0.0 {
            return Err(StakerError::Config("tx_fee must not be negative".to_string()));
        }
        if self.options.reserve_fees > static_config::MAX_RESERVE_FEES {
            return Err(StakerError::Config(format!(
                "reserve_fees must not exceed {}",
                static_config::MAX_RESERVE_FEES
            )));
        }
        self.options.reserve_fees()?;
        self.options.fallback_fee()?;

        if self.pipeline.is_empty() {
            return Err(StakerError::NoPipelines);
        }
        for pipeline in &self.pipeline {
            if pipeline.actions.len() != 1 {
                return Err(StakerError::ActionCount {
                    pipeline: pipeline.name.clone(),
                    count: pipeline.actions.len(),
                });
            }
            for action in &pipeline.actions {
                if action.time.is_empty() {
                    return Err(StakerError::NoTriggerTimes(format!(
                        "{}/{}",
                        pipeline.name, action.action_type
                    )));
                }
                config_utils::parse_trigger_times(&action.time)?;
            }
        }
        Ok(())
    }
}
