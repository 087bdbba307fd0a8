//! Calendar schedules for timed trigger groups.

use chrono::{DateTime, TimeDelta, Utc, Weekday};
use croner::Cron;
use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::{Error, Result};

/// When a scheduled trigger group fires.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Schedule {
    /// Fires at `hour:minute` UTC on each listed day (every day when empty).
    Weekly {
        days: Vec<Weekday>,
        hour: u32,
        minute: u32,
    },
    /// Fires every `interval`.
    Periodic { interval: Duration },
}

impl Schedule {
    pub fn weekly(days: Vec<Weekday>, hour: u32, minute: u32) -> Result<Self> {
        if hour > 23 {
            return Err(Error::InvalidSchedule(format!("hour {} out of range", hour)));
        }
        if minute > 59 {
            return Err(Error::InvalidSchedule(format!(
                "minute {} out of range",
                minute
            )));
        }
        let schedule = Schedule::Weekly { days, hour, minute };
        if let Some(expr) = schedule.cron_expression() {
            expr.parse::<Cron>()
                .map_err(|e| Error::InvalidSchedule(format!("{}: {}", expr, e)))?;
        }
        Ok(schedule)
    }

    pub fn daily(hour: u32, minute: u32) -> Result<Self> {
        Self::weekly(Vec::new(), hour, minute)
    }

    pub fn periodic(interval: Duration) -> Result<Self> {
        if interval.is_zero() {
            return Err(Error::InvalidSchedule(
                "periodic interval must be non-zero".to_string(),
            ));
        }
        Ok(Schedule::Periodic { interval })
    }

    /// Six-field cron form (`sec min hour dom month dow`) of a weekly schedule.
    pub fn cron_expression(&self) -> Option<String> {
        let Schedule::Weekly { days, hour, minute } = self else {
            return None;
        };
        let dow = if days.is_empty() {
            "*".to_string()
        } else {
            days.iter()
                .map(|d| d.num_days_from_sunday().to_string())
                .collect::<Vec<_>>()
                .join(",")
        };
        Some(format!("0 {} {} * * {}", minute, hour, dow))
    }

    /// The first firing instant strictly after `after`.
    pub fn next_after(&self, after: DateTime<Utc>) -> Option<DateTime<Utc>> {
        match self {
            Schedule::Weekly { .. } => {
                let cron = self.cron_expression()?.parse::<Cron>().ok()?;
                cron.iter_after(after).next()
            }
            Schedule::Periodic { interval } => {
                let step = TimeDelta::from_std(*interval).ok()?;
                after.checked_add_signed(step)
            }
        }
    }
}
