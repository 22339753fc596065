// ABOUTME: Training plan document (LLM-generated JSON) plus engine-owned progression metadata
// ABOUTME: Milestones with week ranges, the repeating weekly schedule, and plan status
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 LevelFit

use std::collections::HashSet;
use std::fmt::{Display, Formatter, Result as FmtResult};
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::errors::{AppError, AppResult};

/// Lifecycle status of a plan; exactly one plan per user is `Active`
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum PlanStatus {
    /// The plan currently driving progression
    #[default]
    Active,
    /// Superseded by regeneration or fully completed
    Archived,
}

impl Display for PlanStatus {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        match self {
            Self::Active => write!(f, "active"),
            Self::Archived => write!(f, "archived"),
        }
    }
}

impl FromStr for PlanStatus {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "active" => Ok(Self::Active),
            "archived" => Ok(Self::Archived),
            _ => Err(AppError::invalid_input(format!("Invalid plan status: {s}"))),
        }
    }
}

/// Inclusive week range of a milestone
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct WeekRange {
    /// First week of the range (1-based)
    pub start: u32,
    /// Last week of the range, inclusive
    pub end: u32,
}

impl WeekRange {
    /// Whether `week` falls inside this range
    #[must_use]
    pub const fn contains(&self, week: u32) -> bool {
        week >= self.start && week <= self.end
    }
}

/// One milestone of the plan's journey map
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Milestone {
    /// Weeks this milestone spans
    pub week_range: WeekRange,
    /// Display title, e.g. "Foundation Phase"
    pub title: String,
    /// Focus points for the phase
    #[serde(default)]
    pub focus: Vec<String>,
}

/// One exercise entry of a workout day
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Exercise {
    /// Exercise name; the generator has emitted both `exercise` and
    /// `name`/`exercise_name` for this field over time
    #[serde(alias = "name", alias = "exercise_name")]
    pub exercise: String,
    /// Number of sets
    #[serde(default)]
    pub sets: u32,
    /// Rep scheme, e.g. "8-10" or "AMRAP"
    #[serde(default)]
    pub reps: String,
    /// Rest between sets in seconds
    #[serde(default)]
    pub rest_seconds: Option<u32>,
    /// Execution notes
    #[serde(default)]
    pub notes: Option<String>,
}

/// One entry of the repeating weekly schedule
///
/// An empty (or absent) `workout` list marks a rest day; rest days never
/// count toward week completion.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ScheduleDay {
    /// Label matching workout sessions, e.g. "Day 1: Push"
    pub day_label: String,
    /// Short session description
    #[serde(default)]
    pub session_focus: String,
    /// Exercise list; empty means rest day
    #[serde(default)]
    pub workout: Vec<Exercise>,
}

impl ScheduleDay {
    /// Whether this entry is a rest day
    #[must_use]
    pub fn is_rest_day(&self) -> bool {
        self.workout.is_empty()
    }
}

/// The repeating weekly template of the plan
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct WeeklySchedule {
    /// Total program length in weeks, as stated by the generator
    #[serde(default)]
    pub program_length_weeks: u32,
    /// Intended training days per week
    #[serde(default)]
    pub days_per_week: Option<u32>,
    /// Expected session length in minutes
    #[serde(default)]
    pub session_length_minutes: Option<u32>,
    /// Ordered day entries; the same template repeats every week
    pub schedule: Vec<ScheduleDay>,
}

/// The plan document as produced by the plan-generation service
///
/// Only the two arrays the progression engine reads are modeled here;
/// nutrition, cardio, and narrative sections stay with the host app.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct PlanDocument {
    /// Journey-map milestones, ordered by week range
    #[serde(default)]
    pub milestones: Vec<Milestone>,
    /// The repeating weekly schedule
    pub weekly_plan: WeeklySchedule,
}

impl PlanDocument {
    /// Validate the structural invariants the engine depends on
    ///
    /// Called once at the plan-generation/persistence boundary so the
    /// pure engine can assume well-formed input. Missing milestone
    /// coverage for a given week is handled gracefully downstream and is
    /// deliberately not rejected here.
    ///
    /// # Errors
    ///
    /// Returns [`crate::errors::ErrorCode::InvalidState`] when the weekly
    /// schedule is empty or a milestone range is inverted.
    pub fn validate(&self) -> AppResult<()> {
        if self.weekly_plan.schedule.is_empty() {
            return Err(AppError::invalid_state("plan has an empty weekly schedule"));
        }
        for milestone in &self.milestones {
            if milestone.week_range.start == 0 || milestone.week_range.end < milestone.week_range.start {
                return Err(AppError::invalid_state(format!(
                    "milestone '{}' has an invalid week range {}..{}",
                    milestone.title, milestone.week_range.start, milestone.week_range.end
                )));
            }
        }
        Ok(())
    }

    /// Number of actual workout days in the weekly template
    ///
    /// Fixed per plan: the same template repeats each week.
    #[must_use]
    pub fn workout_day_count(&self) -> u32 {
        self.weekly_plan
            .schedule
            .iter()
            .filter(|day| !day.is_rest_day())
            .count() as u32
    }

    /// Labels of the actual workout days (rest days excluded)
    #[must_use]
    pub fn workout_day_labels(&self) -> HashSet<&str> {
        self.weekly_plan
            .schedule
            .iter()
            .filter(|day| !day.is_rest_day())
            .map(|day| day.day_label.as_str())
            .collect()
    }

    /// Find the schedule entry with the given label
    #[must_use]
    pub fn schedule_day(&self, day_label: &str) -> Option<&ScheduleDay> {
        self.weekly_plan
            .schedule
            .iter()
            .find(|day| day.day_label == day_label)
    }

    /// Locate the milestone containing `week`, with its list position
    #[must_use]
    pub fn milestone_for_week(&self, week: u32) -> Option<(usize, &Milestone)> {
        self.milestones
            .iter()
            .enumerate()
            .find(|(_, m)| m.week_range.contains(week))
    }

    /// Total program length: the last milestone's end week, falling back
    /// to the generator's stated length
    #[must_use]
    pub fn total_program_weeks(&self) -> u32 {
        self.milestones
            .last()
            .map_or(self.weekly_plan.program_length_weeks, |m| m.week_range.end)
    }
}

/// A user's plan: the generated document plus progression metadata
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Plan {
    /// Row id
    pub id: Uuid,
    /// Owning user
    pub user_id: Uuid,
    /// Lifecycle status
    pub status: PlanStatus,
    /// Monotonically increasing per user across regenerations
    pub version: u32,
    /// Week the user is currently training in (1-based)
    pub current_week: u32,
    /// Phase index, advances only at milestone boundaries (1-based)
    pub current_phase: u32,
    /// Plan creation time; week 1 starts on this date
    pub created_at: DateTime<Utc>,
    /// The generated plan document
    pub document: PlanDocument,
}

impl Plan {
    /// Human-readable label for the current phase
    ///
    /// Falls back to a generic "Phase N" label when milestone data does
    /// not cover the current week, so malformed documents degrade
    /// instead of failing the whole operation.
    #[must_use]
    pub fn phase_label(&self) -> String {
        self.document
            .milestone_for_week(self.current_week)
            .map_or_else(
                || format!("Phase {}", self.current_phase),
                |(_, m)| m.title.clone(),
            )
    }
}
