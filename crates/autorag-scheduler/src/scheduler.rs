//! Scheduler collaborator
//!
//! Persistence and timer delivery belong to the platform. The tools only
//! forward through [`Scheduler`]. [`InMemoryScheduler`] is a process-local
//! implementation for the CLI and tests.

use crate::error::{Result, SchedulerError};
use crate::spec::Timing;
use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tokio::sync::RwLock;
use tracing::{debug, info};

/// Callback name the agent registers for every scheduled task
pub const EXECUTE_TASK: &str = "executeTask";

/// When a stored schedule fires
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ScheduleKind {
    Scheduled { time: DateTime<Utc> },
    Delayed { delay_in_seconds: u64, time: DateTime<Utc> },
    Cron { cron: String },
}

impl ScheduleKind {
    /// Next firing time for one-shot schedules
    pub fn fire_time(&self) -> Option<DateTime<Utc>> {
        match self {
            Self::Scheduled { time } | Self::Delayed { time, .. } => Some(*time),
            Self::Cron { .. } => None,
        }
    }
}

/// A stored schedule as reported by the scheduler
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScheduleHandle {
    pub id: String,
    /// Callback invoked when the schedule fires
    pub task_name: String,
    /// Free-text payload handed to the callback
    pub payload: String,
    #[serde(flatten)]
    pub kind: ScheduleKind,
    pub created_at: DateTime<Utc>,
}

/// External scheduler contract
#[async_trait]
pub trait Scheduler: Send + Sync {
    /// Store a schedule and return its handle
    async fn schedule(
        &self,
        timing: Timing,
        task_name: &str,
        payload: String,
    ) -> Result<ScheduleHandle>;

    /// Every stored schedule
    async fn list_schedules(&self) -> Result<Vec<ScheduleHandle>>;

    /// Remove a schedule by id
    async fn cancel_schedule(&self, id: &str) -> Result<()>;
}

/// Process-local scheduler
#[derive(Debug, Default)]
pub struct InMemoryScheduler {
    schedules: RwLock<HashMap<String, ScheduleHandle>>,
}

impl InMemoryScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Remove and return one-shot schedules due at `now`, earliest first
    ///
    /// Cron schedules are never returned; evaluating cron expressions is the
    /// hosting platform's job.
    pub async fn take_due(&self, now: DateTime<Utc>) -> Vec<ScheduleHandle> {
        let mut schedules = self.schedules.write().await;
        let due_ids: Vec<String> = schedules
            .values()
            .filter(|h| h.kind.fire_time().is_some_and(|t| t <= now))
            .map(|h| h.id.clone())
            .collect();

        let mut due: Vec<ScheduleHandle> = due_ids
            .iter()
            .filter_map(|id| schedules.remove(id))
            .collect();
        due.sort_by_key(|h| h.kind.fire_time());

        if !due.is_empty() {
            debug!(count = due.len(), "Schedules due");
        }
        due
    }

    /// Put previously taken schedules back, keeping their ids
    pub async fn restore(&self, handles: Vec<ScheduleHandle>) {
        let mut schedules = self.schedules.write().await;
        for handle in handles {
            schedules.insert(handle.id.clone(), handle);
        }
    }
}

#[async_trait]
impl Scheduler for InMemoryScheduler {
    async fn schedule(
        &self,
        timing: Timing,
        task_name: &str,
        payload: String,
    ) -> Result<ScheduleHandle> {
        let now = Utc::now();
        let kind = match timing {
            Timing::At(time) => ScheduleKind::Scheduled { time },
            Timing::Delay(secs) => {
                let too_large =
                    || SchedulerError::InvalidSpec(format!("delay of {secs}s is too large"));
                let delta = i64::try_from(secs)
                    .ok()
                    .and_then(Duration::try_seconds)
                    .ok_or_else(too_large)?;
                let time = now.checked_add_signed(delta).ok_or_else(too_large)?;
                ScheduleKind::Delayed {
                    delay_in_seconds: secs,
                    time,
                }
            }
            Timing::Cron(cron) => ScheduleKind::Cron { cron },
        };

        let handle = ScheduleHandle {
            id: uuid::Uuid::new_v4().to_string(),
            task_name: task_name.to_string(),
            payload,
            kind,
            created_at: now,
        };

        info!(schedule_id = %handle.id, task_name = %task_name, "Schedule stored");
        self.schedules
            .write()
            .await
            .insert(handle.id.clone(), handle.clone());
        Ok(handle)
    }

    async fn list_schedules(&self) -> Result<Vec<ScheduleHandle>> {
        let mut all: Vec<ScheduleHandle> = self.schedules.read().await.values().cloned().collect();
        all.sort_by(|a, b| a.created_at.cmp(&b.created_at).then_with(|| a.id.cmp(&b.id)));
        Ok(all)
    }

    async fn cancel_schedule(&self, id: &str) -> Result<()> {
        match self.schedules.write().await.remove(id) {
            Some(_) => {
                info!(schedule_id = %id, "Schedule canceled");
                Ok(())
            }
            None => Err(SchedulerError::NotFound(id.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[tokio::test]
    async fn test_schedule_list_cancel() {
        let scheduler = InMemoryScheduler::new();

        let a = scheduler
            .schedule(Timing::Delay(60), EXECUTE_TASK, "water the plants".to_string())
            .await
            .unwrap();
        let b = scheduler
            .schedule(
                Timing::Cron("0 9 * * 1".to_string()),
                EXECUTE_TASK,
                "weekly digest".to_string(),
            )
            .await
            .unwrap();

        let listed = scheduler.list_schedules().await.unwrap();
        assert_eq!(listed.len(), 2);
        assert!(listed.iter().any(|h| h.id == a.id));

        scheduler.cancel_schedule(&b.id).await.unwrap();
        assert_eq!(scheduler.list_schedules().await.unwrap().len(), 1);

        assert_eq!(
            scheduler.cancel_schedule(&b.id).await,
            Err(SchedulerError::NotFound(b.id.clone()))
        );
    }

    #[tokio::test]
    async fn test_take_due_only_returns_due_one_shots() {
        let scheduler = InMemoryScheduler::new();
        let early = Utc.with_ymd_and_hms(2026, 1, 1, 8, 0, 0).unwrap();
        let late = Utc.with_ymd_and_hms(2026, 1, 1, 12, 0, 0).unwrap();

        scheduler
            .schedule(Timing::At(late), EXECUTE_TASK, "late".to_string())
            .await
            .unwrap();
        scheduler
            .schedule(Timing::At(early), EXECUTE_TASK, "early".to_string())
            .await
            .unwrap();
        scheduler
            .schedule(Timing::Cron("* * * * *".to_string()), EXECUTE_TASK, "cron".to_string())
            .await
            .unwrap();

        let due = scheduler
            .take_due(Utc.with_ymd_and_hms(2026, 1, 1, 9, 0, 0).unwrap())
            .await;
        assert_eq!(due.len(), 1);
        assert_eq!(due[0].payload, "early");

        let due = scheduler
            .take_due(Utc.with_ymd_and_hms(2026, 1, 2, 0, 0, 0).unwrap())
            .await;
        assert_eq!(due.len(), 1);
        assert_eq!(due[0].payload, "late");

        // cron stays registered
        assert_eq!(scheduler.list_schedules().await.unwrap().len(), 1);
    }

    #[test]
    fn test_handle_serialization() {
        let handle = ScheduleHandle {
            id: "s1".to_string(),
            task_name: EXECUTE_TASK.to_string(),
            payload: "remind me".to_string(),
            kind: ScheduleKind::Cron {
                cron: "0 9 * * *".to_string(),
            },
            created_at: Utc.with_ymd_and_hms(2026, 1, 1, 0, 0, 0).unwrap(),
        };
        let json = serde_json::to_value(&handle).unwrap();
        assert_eq!(json["type"], "cron");
        assert_eq!(json["cron"], "0 9 * * *");
        assert_eq!(json["payload"], "remind me");
    }
}
