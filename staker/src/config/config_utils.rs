use std::fmt;
use std::time::Duration;

use chrono::{NaiveTime, Timelike};

use crate::primitives::Amount;
use crate::staker_error::StakerError;
use crate::static_config;

/// Stake limits the allocator works against.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StakeBounds {
    pub min: Amount,
    pub max: Amount,
    pub near_max: Amount,
}

impl StakeBounds {
    pub fn new(min: Amount, max: Amount) -> Self {
        Self {
            min,
            max,
            near_max: max - min,
        }
    }
}

impl Default for StakeBounds {
    fn default() -> Self {
        Self {
            min: static_config::MIN_STAKE,
            max: static_config::MAX_STAKE,
            near_max: static_config::NEAR_MAX_STAKE,
        }
    }
}

/// Daily wall-clock trigger, written as `HH:MM` in configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TriggerTime {
    raw: String,
    time: NaiveTime,
}

impl TriggerTime {
    pub fn parse(value: &str) -> Result<Self, StakerError> {
        let time = NaiveTime::parse_from_str(value.trim(), "%H:%M").map_err(|source| {
            StakerError::TriggerTime {
                value: value.to_string(),
                source,
            }
        })?;
        Ok(Self {
            raw: value.to_string(),
            time,
        })
    }

    pub fn hour(&self) -> u32 {
        self.time.hour()
    }

    pub fn minute(&self) -> u32 {
        self.time.minute()
    }

    /// Offset from local midnight.
    pub fn offset_from_midnight(&self) -> chrono::Duration {
        chrono::Duration::hours(self.hour() as i64)
            + chrono::Duration::minutes(self.minute() as i64)
    }
}

impl fmt::Display for TriggerTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw)
    }
}

pub fn parse_trigger_times(values: &[String]) -> Result<Vec<TriggerTime>, StakerError> {
    values.iter().map(|v| TriggerTime::parse(v)).collect()
}

/// Converts the configured retry delays (seconds) into the retry ladder.
pub fn retry_ladder(delays: &[u64]) -> Result<Vec<Duration>, StakerError> {
    if delays.is_empty() {
        return Err(StakerError::EmptyRetryLadder);
    }
    Ok(delays.iter().map(|s| Duration::from_secs(*s)).collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_bounds() {
        let bounds = StakeBounds::default();
        assert_eq!(bounds.min, Amount::from_nano(1_000_000_000));
        assert_eq!(bounds.max, Amount::from_nano(1_000_000_000_000));
        assert_eq!(bounds.near_max, bounds.max - bounds.min);
        assert_eq!(StakeBounds::new(bounds.min, bounds.max), bounds);
    }

    #[test]
    fn test_parse_trigger_time() {
        let t = TriggerTime::parse("08:30").unwrap();
        assert_eq!((t.hour(), t.minute()), (8, 30));
        assert_eq!(t.to_string(), "08:30");
        assert_eq!(
            t.offset_from_midnight(),
            chrono::Duration::minutes(8 * 60 + 30)
        );

        let t = TriggerTime::parse("23:59").unwrap();
        assert_eq!((t.hour(), t.minute()), (23, 59));
    }

    #[test]
    fn test_parse_trigger_time_rejects_garbage() {
        for bad in ["24:00", "12:60", "noon", "", "12"] {
            let result = TriggerTime::parse(bad);
            assert!(
                matches!(result, Err(StakerError::TriggerTime { .. })),
                "{bad:?} should not parse"
            );
        }
        assert!(parse_trigger_times(&["10:00".to_string(), "xx".to_string()]).is_err());
    }

    #[test]
    fn test_retry_ladder() {
        assert!(matches!(retry_ladder(&[]), Err(StakerError::EmptyRetryLadder)));
        assert_eq!(
            retry_ladder(&[0, 5, 15]).unwrap(),
            vec![
                Duration::from_secs(0),
                Duration::from_secs(5),
                Duration::from_secs(15),
            ]
        );
    }
}
