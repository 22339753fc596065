// ABOUTME: Workout session lifecycle with pause/resume and derived completion metrics
// ABOUTME: Completion percentage and calorie estimates are always derived, never stored inputs
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 LevelFit

use std::fmt::{Display, Formatter, Result as FmtResult};
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::constants::schedule;
use crate::errors::{AppError, AppResult};

/// Lifecycle states of a workout session
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum SessionStatus {
    /// Timer running
    InProgress,
    /// Timer suspended
    Paused,
    /// Finalized; the row is immutable from here on
    Completed,
}

impl Display for SessionStatus {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        match self {
            Self::InProgress => write!(f, "in_progress"),
            Self::Paused => write!(f, "paused"),
            Self::Completed => write!(f, "completed"),
        }
    }
}

impl FromStr for SessionStatus {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "in_progress" => Ok(Self::InProgress),
            "paused" => Ok(Self::Paused),
            "completed" => Ok(Self::Completed),
            _ => Err(AppError::invalid_input(format!(
                "Invalid session status: {s}"
            ))),
        }
    }
}

/// One attempted workout against a schedule day
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct WorkoutSession {
    /// Row id
    pub id: Uuid,
    /// Owning user
    pub user_id: Uuid,
    /// Plan this session belongs to
    pub plan_id: Uuid,
    /// Schedule day label this session executes
    pub workout_day: String,
    /// Plan week the session was started in
    pub week_number: u32,
    /// Session start time
    pub started_at: DateTime<Utc>,
    /// Finalization time, set once
    pub finished_at: Option<DateTime<Utc>>,
    /// Wall-clock duration in minutes, derived at finalization
    pub total_duration_minutes: u32,
    /// Exercises scheduled for the day
    pub total_exercises: u32,
    /// Exercises ticked off, never above `total_exercises`
    pub completed_exercises: u32,
    /// Derived: `floor(completed / total * 100)`, 0 when total is 0
    pub completion_percentage: u32,
    /// Derived: duration minutes times the per-minute estimate
    pub estimated_calories_burned: u32,
    /// Lifecycle state
    pub status: SessionStatus,
}

impl WorkoutSession {
    /// Start a session against a schedule day
    #[must_use]
    pub fn start(
        user_id: Uuid,
        plan_id: Uuid,
        workout_day: impl Into<String>,
        week_number: u32,
        total_exercises: u32,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            user_id,
            plan_id,
            workout_day: workout_day.into(),
            week_number,
            started_at: now,
            finished_at: None,
            total_duration_minutes: 0,
            total_exercises,
            completed_exercises: 0,
            completion_percentage: 0,
            estimated_calories_burned: 0,
            status: SessionStatus::InProgress,
        }
    }

    /// Suspend the session timer
    ///
    /// # Errors
    ///
    /// Returns `InvalidState` unless the session is in progress.
    pub fn pause(&mut self) -> AppResult<()> {
        if self.status != SessionStatus::InProgress {
            return Err(AppError::invalid_state(format!(
                "cannot pause a session in state '{}'",
                self.status
            )));
        }
        self.status = SessionStatus::Paused;
        Ok(())
    }

    /// Resume a paused session
    ///
    /// # Errors
    ///
    /// Returns `InvalidState` unless the session is paused.
    pub fn resume(&mut self) -> AppResult<()> {
        if self.status != SessionStatus::Paused {
            return Err(AppError::invalid_state(format!(
                "cannot resume a session in state '{}'",
                self.status
            )));
        }
        self.status = SessionStatus::InProgress;
        Ok(())
    }

    /// Record how many exercises were ticked off, clamped to the total
    ///
    /// Garbage counts above the scheduled total are clamped rather than
    /// rejected so a buggy client cannot inflate the XP grant.
    pub fn record_completed_exercises(&mut self, completed: u32) {
        self.completed_exercises = completed.min(self.total_exercises);
    }

    /// Finalize the session: derive duration, completion percentage, and
    /// the calorie estimate, then freeze the row
    ///
    /// # Errors
    ///
    /// Returns `InvalidState` when the session is already completed.
    pub fn finalize(&mut self, now: DateTime<Utc>) -> AppResult<()> {
        if self.status == SessionStatus::Completed {
            return Err(AppError::invalid_state("session is already finalized")
                .with_resource_id(self.id.to_string()));
        }

        let minutes = (now - self.started_at).num_minutes().max(0) as u32;
        self.finished_at = Some(now);
        self.total_duration_minutes = minutes;
        self.completion_percentage = completion_percentage(self.completed_exercises, self.total_exercises);
        self.estimated_calories_burned = minutes * schedule::CALORIES_PER_MINUTE;
        self.status = SessionStatus::Completed;
        Ok(())
    }
}

/// Canonical completion percentage: `floor(completed / total * 100)`
///
/// Division-by-zero is defined away: a day with zero scheduled exercises
/// completes at 0%.
#[must_use]
pub fn completion_percentage(completed: u32, total: u32) -> u32 {
    if total == 0 {
        return 0;
    }
    completed.min(total) * 100 / total
}
