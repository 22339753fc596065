// ABOUTME: Per-user aggregate progression stats
// ABOUTME: Cumulative XP, cached level, streaks, badge count, and weekly percent roll-ups
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 LevelFit

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::engine::leveling;

/// Aggregate progression stats, one row per user
///
/// `level` is a cached value derived from `total_xp` through the level
/// curve; the two only ever change together via [`UserStats::grant_xp`].
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct UserStats {
    /// Owning user
    pub user_id: Uuid,
    /// Cumulative XP, monotonically non-decreasing
    pub total_xp: u64,
    /// Current level, always `level_for_xp(total_xp)`
    pub level: u32,
    /// Index into the active plan's schedule (1-based)
    pub current_week: u32,
    /// Length of the running consecutive-day workout streak
    pub current_streak_days: u32,
    /// Longest streak ever achieved
    pub longest_streak_days: u32,
    /// Calendar day of the most recent finished workout
    pub last_workout_date: Option<NaiveDate>,
    /// Number of badges earned so far
    pub total_badges_earned: u32,
    /// Percent-better of the most recently closed week
    pub current_x_percent: f64,
    /// Best weekly percent-better so far
    pub best_x_percent: f64,
    /// Running mean of weekly percent-better over closed weeks
    pub average_x_percent: f64,
    /// Row creation time
    pub created_at: DateTime<Utc>,
    /// Last mutation time
    pub updated_at: DateTime<Utc>,
}

impl UserStats {
    /// Create a fresh stats row with zero XP at level 1
    #[must_use]
    pub fn new(user_id: Uuid, current_week: u32, now: DateTime<Utc>) -> Self {
        Self {
            user_id,
            total_xp: 0,
            level: leveling::level_for_xp(0),
            current_week: current_week.max(1),
            current_streak_days: 0,
            longest_streak_days: 0,
            last_workout_date: None,
            total_badges_earned: 0,
            current_x_percent: 0.0,
            best_x_percent: 0.0,
            average_x_percent: 0.0,
            created_at: now,
            updated_at: now,
        }
    }

    /// Add XP and recompute the cached level in the same mutation
    ///
    /// This is the only way `total_xp` changes, which keeps the
    /// level-derivation invariant intact across every XP-granting event.
    pub fn grant_xp(&mut self, amount: u64, now: DateTime<Utc>) {
        self.total_xp = self.total_xp.saturating_add(amount);
        self.level = leveling::level_for_xp(self.total_xp);
        self.updated_at = now;
    }

    /// Record a finished workout on `day` and update streak counters
    ///
    /// Returns `true` when the workout lands on a new calendar day
    /// (streak extended or restarted) - the qualifying event for
    /// streak-triggered badges. Same-day repeats and out-of-order
    /// backfills leave the streak untouched.
    pub fn record_workout_day(&mut self, day: NaiveDate, now: DateTime<Utc>) -> bool {
        let qualifying = match self.last_workout_date {
            Some(last) if day == last => false,
            Some(last) if day < last => false,
            Some(last) if last.succ_opt() == Some(day) => {
                self.current_streak_days += 1;
                true
            }
            _ => {
                self.current_streak_days = 1;
                true
            }
        };

        if qualifying {
            self.last_workout_date = Some(day);
            self.longest_streak_days = self.longest_streak_days.max(self.current_streak_days);
            self.updated_at = now;
        }
        qualifying
    }

    /// Fold a closed week's percent-better into the roll-up fields
    ///
    /// `closed_week_number` is used as the sample count for the running
    /// mean, matching one closed row per week.
    pub fn record_week_percent(&mut self, percent: f64, closed_week_number: u32) {
        self.current_x_percent = percent;
        self.best_x_percent = self.best_x_percent.max(percent);
        let n = f64::from(closed_week_number.max(1));
        self.average_x_percent = (self.average_x_percent * (n - 1.0) + percent) / n;
    }
}
