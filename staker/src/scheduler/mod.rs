use chrono::{DateTime, NaiveDate, TimeZone};
use log::{info, warn};

use crate::config::config_utils::TriggerTime;
use crate::pipeline::Pipeline;
use crate::staker_error::StakerError;

/// One scheduled occurrence of a pipeline action.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingAction<Tz: TimeZone> {
    pub pipeline_index: usize,
    pub action_index: usize,
    pub pipeline_name: String,
    pub action_name: String,
    pub trigger_time: DateTime<Tz>,
}

impl<Tz: TimeZone> PendingAction<Tz> {
    /// Log prefix naming the pipeline and action.
    pub fn label(&self) -> String {
        format!(
            "[pipeline {} {} action {} {}]",
            self.pipeline_index, self.pipeline_name, self.action_index, self.action_name
        )
    }
}

fn start_of_day<Tz: TimeZone>(tz: &Tz, date: NaiveDate) -> Option<DateTime<Tz>> {
    tz.from_local_datetime(&date.and_hms_opt(0, 0, 0)?).earliest()
}

fn trigger_on<Tz: TimeZone>(tz: &Tz, date: NaiveDate, time: &TriggerTime) -> Option<DateTime<Tz>> {
    start_of_day(tz, date).map(|midnight| midnight + time.offset_from_midnight())
}

/// Collects every trigger on `date` accepted by `keep`, sorted by time then
/// pipeline index then action index.
fn pending_on<Tz, F>(
    pipelines: &[Pipeline],
    tz: &Tz,
    date: NaiveDate,
    keep: F,
) -> Vec<PendingAction<Tz>>
where
    Tz: TimeZone,
    F: Fn(&DateTime<Tz>) -> bool,
{
    let mut actions = Vec::new();
    for (pipeline_index, pipeline) in pipelines.iter().enumerate() {
        for (action_index, action) in pipeline.actions().iter().enumerate() {
            for time in action.trigger_times() {
                let Some(trigger_time) = trigger_on(tz, date, time) else {
                    warn!("no local midnight on {}, skipping trigger {}", date, time);
                    continue;
                };
                if keep(&trigger_time) {
                    actions.push(PendingAction {
                        pipeline_index,
                        action_index,
                        pipeline_name: pipeline.name().to_string(),
                        action_name: action.name().to_string(),
                        trigger_time,
                    });
                }
            }
        }
    }

    actions.sort_by(|a, b| {
        a.trigger_time
            .cmp(&b.trigger_time)
            .then(a.pipeline_index.cmp(&b.pipeline_index))
            .then(a.action_index.cmp(&b.action_index))
    });
    actions
}

/// Triggers still ahead of `now` today, or all of tomorrow's triggers when
/// none remain.
pub fn next_actions<Tz: TimeZone>(
    pipelines: &[Pipeline],
    now: &DateTime<Tz>,
) -> Result<Vec<PendingAction<Tz>>, StakerError> {
    let tz = now.timezone();
    let today = now.date_naive();

    let mut actions = pending_on(pipelines, &tz, today, |t| t > now);

    if actions.is_empty() {
        let tomorrow = today.succ_opt().ok_or(StakerError::NoPendingActions)?;
        let midnight = start_of_day(&tz, tomorrow).ok_or(StakerError::NoPendingActions)?;
        actions = pending_on(pipelines, &tz, tomorrow, |t| *t >= midnight && t > now);

        if actions.is_empty() {
            return Err(StakerError::NoPendingActions);
        }
    }

    for action in &actions {
        info!("{} Waiting at {:?}", action.label(), action.trigger_time);
    }

    Ok(actions)
}
