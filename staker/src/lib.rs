//! Scheduled bonding of reward balances into validators.
//!
//! A [`pipeline::Pipeline`] groups reward wallets, a chain connection and one
//! scheduled action. The [`executor::PipelineExecutor`] derives the day's
//! queue of triggers from every pipeline, runs each due action and retries
//! failures along the configured retry ladder.

pub mod actions;
pub mod clock;
pub mod config;
pub mod executor;
pub mod pipeline;
pub mod primitives;
pub mod provider;
pub mod scheduler;
pub mod staker_error;

#[cfg(test)]
mod testing;

pub use config::static_config;
pub use config::Config;
pub use executor::PipelineExecutor;
pub use primitives::Amount;
pub use staker_error::{ServiceError, StakerError};
