use std::time::Duration;

use crate::primitives::Amount;

pub const MIN_STAKE: Amount = Amount::from_nano(1_000_000_000);
pub const MAX_STAKE: Amount = Amount::from_nano(1_000_000_000_000);
pub const NEAR_MAX_STAKE: Amount = Amount::from_nano(MAX_STAKE.nano() - MIN_STAKE.nano());

/// Reserve fees below this many coins are raised to it at load time.
pub const MIN_RESERVE_FEES: f64 = 0.01;
/// Upper bound on reserve fees, in coins.
pub const MAX_RESERVE_FEES: f64 = 1_000_000.0;

pub const DIAL_TIMEOUT: Duration = Duration::from_secs(10);
/// Time given to the chain to include a broadcast bond.
pub const CONFIRMATION_WAIT: Duration = Duration::from_secs(11);
pub const POLL_INTERVAL: Duration = Duration::from_secs(10);
pub const THROTTLE_INTERVAL: Duration = Duration::from_secs(1);

pub const DEFAULT_CONFIG_PATH: &str = "config.yml";
