use core::time::Duration;
use std::collections::BTreeMap;

use bevy::log::{debug, info};
use bevy::prelude::*;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Daily progress is a percentage.
pub const MAX_DAILY_PROGRESS: u32 = 100;

/// Visits this short or shorter are not worth recording.
pub const MIN_TRACKED_VISIT_SECS: u64 = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProgressUpdate {
    pub streak: u32,
    pub daily_progress: u32,
}

/// A player's completion streak, today's progress, and time spent per activity.
///
/// Dates are passed in by the caller so the host decides what "today" means
/// (local calendar day, server day, ...).
#[derive(Resource, Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProgressTracker {
    streak: u32,
    last_completion: Option<NaiveDate>,
    daily_progress: u32,
    progress_day: Option<NaiveDate>,
    activity: BTreeMap<NaiveDate, BTreeMap<String, u64>>,
}

impl ProgressTracker {
    pub const fn streak(&self) -> u32 {
        self.streak
    }

    pub const fn last_completion(&self) -> Option<NaiveDate> {
        self.last_completion
    }

    /// Progress made on `day`; nothing carries over from earlier days.
    pub fn daily_progress(&self, day: NaiveDate) -> u32 {
        if self.progress_day == Some(day) {
            self.daily_progress
        } else {
            0
        }
    }

    /// Marks `today` as completed and returns the streak.
    ///
    /// A completion the day after the last one extends the streak, a second
    /// one on the same day leaves it alone, anything else starts over at 1.
    pub fn complete(&mut self, today: NaiveDate) -> u32 {
        let previous = self.streak;
        self.streak = match self.last_completion {
            Some(last) if Some(last) == today.pred_opt() => self.streak.saturating_add(1),
            Some(last) if last == today => self.streak,
            _ => 1,
        };
        self.last_completion = Some(today);
        if self.streak != previous {
            info!("Streak {previous} -> {}", self.streak);
        }
        self.streak
    }

    /// Adds `percent` to today's progress, capped at 100.
    pub fn add_progress(&mut self, today: NaiveDate, percent: u32) -> u32 {
        if self.progress_day != Some(today) {
            self.progress_day = Some(today);
            self.daily_progress = 0;
        }
        self.daily_progress = self
            .daily_progress
            .saturating_add(percent)
            .min(MAX_DAILY_PROGRESS);
        self.daily_progress
    }

    /// A finished exercise: updates the streak and today's progress together.
    pub fn record_completion(&mut self, today: NaiveDate, percent: u32) -> ProgressUpdate {
        ProgressUpdate {
            streak: self.complete(today),
            daily_progress: self.add_progress(today, percent),
        }
    }

    /// Adds a visit to `activity` on `day`. Returns the new total in seconds,
    /// or `None` when the visit was too short to count.
    pub fn track_activity(&mut self, day: NaiveDate, activity: &str, visit: Duration) -> Option<u64> {
        let secs = visit.as_secs_f64().round() as u64;
        if secs <= MIN_TRACKED_VISIT_SECS {
            return None;
        }
        let total = self
            .activity
            .entry(day)
            .or_default()
            .entry(activity.to_owned())
            .or_default();
        *total += secs;
        debug!("Tracked {secs}s for {activity}, {total}s on {day}");
        Some(*total)
    }

    pub fn activity_seconds(&self, day: NaiveDate, activity: &str) -> u64 {
        self.activity
            .get(&day)
            .and_then(|per_activity| per_activity.get(activity))
            .copied()
            .unwrap_or(0)
    }
}
