use std::collections::HashMap;

use crate::config::config_utils::StakeBounds;
use crate::primitives::{Amount, ValidatorInfo};

/// Outcome of weighing one validator against one account's spendable funds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BondPlan {
    /// The validator cannot take another minimum bond.
    Full,
    /// What the account can place (after near-max shaping) is under the
    /// minimum bond.
    BelowMinimum,
    /// Bond `amount`, leaving the validator at `after`.
    Bond { amount: Amount, after: Amount },
}

/// How the cached stake is refreshed after a bond.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Confirmation {
    /// Wait for the block, then re-read the stake from the chain.
    WaitAndRefresh,
    /// Trust the computed post-bond stake.
    Optimistic,
}

/// True while an account can pay the reserve fee and still place a minimum bond.
pub fn has_spendable(balance: Amount, reserve_fees: Amount, bounds: &StakeBounds) -> bool {
    reserve_fees
        .checked_add(bounds.min)
        .is_some_and(|floor| balance > floor)
}

pub fn plan_bond(bounds: &StakeBounds, stake: Amount, available: Amount) -> BondPlan {
    let wants = bounds.max - stake;
    if wants < bounds.min {
        return BondPlan::Full;
    }

    let mut amount = wants.min(available);
    let mut after = amount + stake;

    // A single bond lands exactly on max or at/below near-max.
    if after != bounds.max && after > bounds.near_max {
        amount = bounds.near_max - stake;
        after = stake + amount;
    }

    if amount < bounds.min {
        return BondPlan::BelowMinimum;
    }

    BondPlan::Bond { amount, after }
}

pub fn confirmation_policy(bounds: &StakeBounds, had_info: bool, after: Amount) -> Confirmation {
    if !had_info && after != bounds.max {
        Confirmation::WaitAndRefresh
    } else {
        Confirmation::Optimistic
    }
}

#[derive(Debug, Clone)]
pub struct CachedStake {
    pub stake: Amount,
    pub info: Option<ValidatorInfo>,
}

/// Validator stakes seen during a single run.
#[derive(Debug, Default)]
pub struct StakeCache {
    entries: HashMap<String, CachedStake>,
}

impl StakeCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, address: &str) -> Option<&CachedStake> {
        self.entries.get(address)
    }

    pub fn insert(&mut self, address: &str, stake: Amount, info: Option<ValidatorInfo>) {
        self.entries.insert(address.to_string(), CachedStake { stake, info });
    }

    /// Records an optimistic post-bond stake, keeping the known info.
    pub fn set_stake(&mut self, address: &str, stake: Amount) {
        self.entries
            .entry(address.to_string())
            .or_insert(CachedStake { stake, info: None })
            .stake = stake;
    }
}
