use std::collections::VecDeque;
use std::rc::Rc;
use std::time::Duration;

use chrono::Local;
use log::{error, info, warn};

use crate::clock::{Clock, Sleeper};
use crate::config::config_utils;
use crate::config::Config;
use crate::pipeline::Pipeline;
use crate::provider::{ChainConnector, WalletOpener};
use crate::scheduler::{self, PendingAction};
use crate::staker_error::StakerError;
use crate::static_config;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Intervals {
    /// Pause after an executed action before looking at the next one.
    pub throttle: Duration,
    /// Pause while the head of the queue is not due yet.
    pub poll: Duration,
}

impl Default for Intervals {
    fn default() -> Self {
        Self {
            throttle: static_config::THROTTLE_INTERVAL,
            poll: static_config::POLL_INTERVAL,
        }
    }
}

/// What one pass of the loop did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Step {
    Executed {
        pipeline_index: usize,
        action_index: usize,
        succeeded: bool,
    },
    Waiting,
}

pub struct PipelineExecutor {
    pipelines: Vec<Pipeline>,
    retry: Vec<Duration>,
    pending: VecDeque<PendingAction<Local>>,
    clock: Box<dyn Clock>,
    sleeper: Rc<dyn Sleeper>,
    intervals: Intervals,
}

impl PipelineExecutor {
    pub fn create(
        config: &Config,
        connector: &dyn ChainConnector,
        opener: &dyn WalletOpener,
        clock: Box<dyn Clock>,
        sleeper: Rc<dyn Sleeper>,
    ) -> Result<Self, StakerError> {
        let retry = config_utils::retry_ladder(&config.options.retry_delay)?;

        let mut pipelines = Vec::with_capacity(config.pipeline.len());
        for pipeline_config in &config.pipeline {
            let pipeline = Pipeline::create(
                &config.options,
                pipeline_config,
                connector,
                opener,
                sleeper.clone(),
            )?;
            pipelines.push(pipeline);
        }

        Self::new(pipelines, retry, clock, sleeper)
    }

    pub fn new(
        pipelines: Vec<Pipeline>,
        retry: Vec<Duration>,
        clock: Box<dyn Clock>,
        sleeper: Rc<dyn Sleeper>,
    ) -> Result<Self, StakerError> {
        if retry.is_empty() {
            return Err(StakerError::EmptyRetryLadder);
        }
        if pipelines.is_empty() {
            return Err(StakerError::NoPipelines);
        }
        for pipeline in &pipelines {
            for action in pipeline.actions() {
                if action.trigger_times().is_empty() {
                    return Err(StakerError::NoTriggerTimes(format!(
                        "{}/{}",
                        pipeline.name(),
                        action.name()
                    )));
                }
            }
        }
        Ok(Self {
            pipelines,
            retry,
            pending: VecDeque::new(),
            clock,
            sleeper,
            intervals: Intervals::default(),
        })
    }

    pub fn with_intervals(mut self, intervals: Intervals) -> Self {
        self.intervals = intervals;
        self
    }

    pub fn pipelines(&self) -> &[Pipeline] {
        &self.pipelines
    }

    pub fn pending(&self) -> &VecDeque<PendingAction<Local>> {
        &self.pending
    }

    /// Runs until the schedule cannot be derived.
    pub fn run(&mut self) -> Result<(), StakerError> {
        loop {
            self.step()?;
        }
    }

    /// One pass of the loop: refill the queue if drained, then either run the
    /// head item or wait for it.
    pub fn step(&mut self) -> Result<Step, StakerError> {
        if self.pending.is_empty() {
            let now = self.clock.now();
            self.pending = scheduler::next_actions(&self.pipelines, &now)?.into();
        }

        let due = match self.pending.front() {
            Some(head) => self.clock.now() >= head.trigger_time,
            None => return Err(StakerError::NoPendingActions),
        };

        if !due {
            self.sleeper.sleep(self.intervals.poll);
            return Ok(Step::Waiting);
        }

        let Some(pending) = self.pending.pop_front() else {
            return Err(StakerError::NoPendingActions);
        };
        let succeeded = self.execute(&pending).is_ok();
        self.sleeper.sleep(self.intervals.throttle);

        Ok(Step::Executed {
            pipeline_index: pending.pipeline_index,
            action_index: pending.action_index,
            succeeded,
        })
    }

    /// Runs an occurrence, walking the retry ladder on failure.
    pub fn execute(&self, pending: &PendingAction<Local>) -> Result<(), StakerError> {
        let label = pending.label();
        let action = &self.pipelines[pending.pipeline_index].actions()[pending.action_index];

        info!("{} Running at {}", label, pending.trigger_time);

        let mut delays = self.retry.iter();
        let mut result = action.run();

        while let Err(err) = &result {
            match delays.next() {
                Some(delay) => {
                    warn!(
                        "{} Error running action: {}, retry in {:?} ...",
                        label, err, delay
                    );
                    self.sleeper.sleep(*delay);
                    result = action.run();
                }
                None => {
                    warn!("{} Error running action: {}, no retry left", label, err);
                    break;
                }
            }
        }

        match &result {
            Ok(()) => info!("{} done", label),
            Err(err) => error!("{} failed: {}", label, err),
        }
        result
    }
}
