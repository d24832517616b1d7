pub mod bond;

use std::rc::Rc;

use crate::clock::Sleeper;
use crate::config::config_utils::TriggerTime;
use crate::config::{ActionConfig, Options};
use crate::provider::{PipelineProvider, WalletOpener};
use crate::staker_error::StakerError;

/// A scheduled unit of work owned by a pipeline.
///
/// `run` is invoked once per trigger and again for every retry, so it must
/// derive all of its state from the chain on each call.
pub trait Action {
    fn name(&self) -> &str;

    fn trigger_times(&self) -> &[TriggerTime];

    fn run(&self) -> Result<(), StakerError>;
}

pub fn create_action(
    pipeline: Rc<dyn PipelineProvider>,
    index: usize,
    options: &Options,
    action_config: &ActionConfig,
    opener: &dyn WalletOpener,
    sleeper: Rc<dyn Sleeper>,
) -> Result<Box<dyn Action>, StakerError> {
    match action_config.action_type.as_str() {
        "bond" => {
            let action =
                bond::BondAction::create(pipeline, index, options, action_config, opener, sleeper)?;
            Ok(Box::new(action))
        }
        other => Err(StakerError::UnknownActionType(other.to_string())),
    }
}
