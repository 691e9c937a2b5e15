//! Schedule specifications
//!
//! The model describes *when* with a tagged object
//! (`{"type": "scheduled" | "delayed" | "cron" | "no-schedule", ...}`).
//! [`WhenArgs`] is that raw shape; [`ScheduleSpec`] is the checked form.

use crate::error::SchedulerError;
use chrono::{DateTime, NaiveDateTime, Utc};
use serde::Deserialize;

/// Raw `when` argument as the model sends it
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WhenArgs {
    #[serde(rename = "type")]
    pub kind: String,
    pub date: Option<String>,
    pub delay_in_seconds: Option<f64>,
    pub cron: Option<String>,
}

/// Checked schedule specification
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScheduleSpec {
    /// Run once at a point in time
    Scheduled { date: DateTime<Utc> },
    /// Run once after a delay
    Delayed { delay_in_seconds: u64 },
    /// Run on a cron expression
    Cron { cron: String },
    /// The model could not produce a schedule
    NoSchedule,
}

impl ScheduleSpec {
    /// Wire name of the variant
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Scheduled { .. } => "scheduled",
            Self::Delayed { .. } => "delayed",
            Self::Cron { .. } => "cron",
            Self::NoSchedule => "no-schedule",
        }
    }

    /// The one timing field forwarded to the scheduler, if any
    pub fn timing(&self) -> Option<Timing> {
        match self {
            Self::Scheduled { date } => Some(Timing::At(*date)),
            Self::Delayed { delay_in_seconds } => Some(Timing::Delay(*delay_in_seconds)),
            Self::Cron { cron } => Some(Timing::Cron(cron.clone())),
            Self::NoSchedule => None,
        }
    }
}

impl TryFrom<WhenArgs> for ScheduleSpec {
    type Error = SchedulerError;

    fn try_from(when: WhenArgs) -> Result<Self, Self::Error> {
        match when.kind.as_str() {
            "no-schedule" => Ok(Self::NoSchedule),
            "scheduled" => {
                let raw = when.date.ok_or_else(|| {
                    SchedulerError::InvalidSpec("missing `date` for a scheduled task".to_string())
                })?;
                Ok(Self::Scheduled {
                    date: parse_date(&raw)?,
                })
            }
            "delayed" => {
                let delay = when.delay_in_seconds.ok_or_else(|| {
                    SchedulerError::InvalidSpec(
                        "missing `delayInSeconds` for a delayed task".to_string(),
                    )
                })?;
                if !delay.is_finite() || delay < 0.0 {
                    return Err(SchedulerError::InvalidSpec(format!(
                        "delayInSeconds must be a non-negative number, got {delay}"
                    )));
                }
                Ok(Self::Delayed {
                    delay_in_seconds: delay.round() as u64,
                })
            }
            "cron" => {
                let cron = when
                    .cron
                    .filter(|c| !c.trim().is_empty())
                    .ok_or_else(|| {
                        SchedulerError::InvalidSpec("missing `cron` for a cron task".to_string())
                    })?;
                Ok(Self::Cron { cron })
            }
            other => Err(SchedulerError::InvalidSpec(format!("unknown schedule type '{other}'"))),
        }
    }
}

/// Accepts RFC 3339, or a naive `YYYY-MM-DDTHH:MM[:SS]` taken as UTC
fn parse_date(raw: &str) -> Result<DateTime<Utc>, SchedulerError> {
    if let Ok(date) = DateTime::parse_from_rfc3339(raw) {
        return Ok(date.with_timezone(&Utc));
    }
    ["%Y-%m-%dT%H:%M:%S", "%Y-%m-%dT%H:%M", "%Y-%m-%d %H:%M:%S"]
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(raw, fmt).ok())
        .map(|naive| naive.and_utc())
        .ok_or_else(|| SchedulerError::InvalidSpec(format!("'{raw}' is not a valid date")))
}

/// Timing forwarded to the scheduler
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Timing {
    At(DateTime<Utc>),
    /// Seconds from now
    Delay(u64),
    Cron(String),
}
