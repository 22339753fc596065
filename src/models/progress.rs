// ABOUTME: Per-week progress rows tracking completions, streaks, and percent-better
// ABOUTME: One row per (user, week number) with a contiguous 7-day date window
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 LevelFit

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::constants::schedule;

/// Progress within a single plan week
///
/// Created at plan initialization for week 1 and again each time the
/// engine advances the user to a new week; windows are contiguous and
/// non-overlapping per user.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct WeekProgress {
    /// Plan week this row tracks (1-based)
    pub week_number: u32,
    /// First calendar day of the window
    pub week_start_date: NaiveDate,
    /// Last calendar day of the window, inclusive
    pub week_end_date: NaiveDate,
    /// Workout days scheduled for this week
    pub workouts_planned: u32,
    /// Completed workouts; overcompletion past planned is allowed
    pub workouts_completed: u32,
    /// Streak length as of the last update within this week
    pub current_streak_days: u32,
    /// Days the step goal was hit
    pub step_goal_days_hit: u32,
    /// Days the step goal was tracked
    pub step_goal_days_total: u32,
    /// Signed comparison against the prior week; 0 for week 1
    pub x_percent_better: f64,
}

impl WeekProgress {
    /// Open a fresh progress row for a 7-day window starting at `start`
    #[must_use]
    pub fn opening(week_number: u32, start: NaiveDate, workouts_planned: u32) -> Self {
        Self {
            week_number,
            week_start_date: start,
            week_end_date: start + chrono::Days::new(u64::from(schedule::DAYS_PER_WEEK - 1)),
            workouts_planned,
            workouts_completed: 0,
            current_streak_days: 0,
            step_goal_days_hit: 0,
            step_goal_days_total: schedule::DAYS_PER_WEEK,
            x_percent_better: 0.0,
        }
    }

    /// Open the row for the week immediately after this one
    #[must_use]
    pub fn next_week(&self) -> Self {
        Self::opening(
            self.week_number + 1,
            self.week_end_date + chrono::Days::new(1),
            self.workouts_planned,
        )
    }

    /// Fraction of planned workouts completed, capped at 1.0
    ///
    /// Overcompletion is meaningful for display but not for scoring.
    #[must_use]
    pub fn completion_ratio(&self) -> f64 {
        if self.workouts_planned == 0 {
            return 0.0;
        }
        (f64::from(self.workouts_completed) / f64::from(self.workouts_planned)).min(1.0)
    }

    /// Fraction of tracked days on which the step goal was hit
    #[must_use]
    pub fn step_goal_ratio(&self) -> f64 {
        if self.step_goal_days_total == 0 {
            return 0.0;
        }
        f64::from(self.step_goal_days_hit) / f64::from(self.step_goal_days_total)
    }
}
