// ABOUTME: Engine tunables with environment overrides
// ABOUTME: Defaults mirror the shipped product values; overrides exist for tests and experiments
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 LevelFit

//! Engine configuration
//!
//! All tunables default to the shipped product values from
//! [`crate::constants`]; environment variables override them per
//! deployment. Curve shape constants are deliberately not configurable,
//! changing them would corrupt every stored level.

use std::env;

use serde::{Deserialize, Serialize};

use crate::constants::{schedule, xp};
use crate::errors::{AppError, AppResult};

/// Tunable parameters of the progression engine
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ProgressionConfig {
    /// XP granted on first-time initialization, before any badge XP
    pub starting_xp: u64,
    /// Multiplier applied to the session completion percentage
    pub workout_xp_multiplier: f64,
    /// Flat calories-per-minute estimate for finished sessions
    pub calories_per_minute: u32,
    /// Days per week the step goal is tracked
    pub step_goal_days_per_week: u32,
}

impl Default for ProgressionConfig {
    fn default() -> Self {
        Self {
            starting_xp: xp::STARTING_XP,
            workout_xp_multiplier: xp::WORKOUT_XP_MULTIPLIER,
            calories_per_minute: schedule::CALORIES_PER_MINUTE,
            step_goal_days_per_week: schedule::DAYS_PER_WEEK,
        }
    }
}

impl ProgressionConfig {
    /// Load the configuration from the environment, falling back to the
    /// defaults for anything unset
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` when a variable is set but unparseable, or
    /// when the resulting configuration fails [`Self::validate`].
    pub fn from_env() -> AppResult<Self> {
        let mut config = Self::default();

        if let Some(value) = parse_env("LEVELFIT_STARTING_XP")? {
            config.starting_xp = value;
        }
        if let Some(value) = parse_env("LEVELFIT_WORKOUT_XP_MULTIPLIER")? {
            config.workout_xp_multiplier = value;
        }
        if let Some(value) = parse_env("LEVELFIT_CALORIES_PER_MINUTE")? {
            config.calories_per_minute = value;
        }
        if let Some(value) = parse_env("LEVELFIT_STEP_GOAL_DAYS_PER_WEEK")? {
            config.step_goal_days_per_week = value;
        }

        config.validate()?;
        Ok(config)
    }

    /// Check the cross-field invariants
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` when a value is outside its sane range.
    pub fn validate(&self) -> AppResult<()> {
        if !(0.0..=10.0).contains(&self.workout_xp_multiplier) {
            return Err(AppError::config(format!(
                "workout_xp_multiplier {} outside 0.0..=10.0",
                self.workout_xp_multiplier
            )));
        }
        if self.step_goal_days_per_week == 0 || self.step_goal_days_per_week > schedule::DAYS_PER_WEEK
        {
            return Err(AppError::config(format!(
                "step_goal_days_per_week {} outside 1..=7",
                self.step_goal_days_per_week
            )));
        }
        Ok(())
    }
}

fn parse_env<T: std::str::FromStr>(name: &str) -> AppResult<Option<T>> {
    match env::var(name) {
        Ok(raw) => raw.parse().map(Some).map_err(|_| {
            AppError::config(format!("environment variable {name} has invalid value '{raw}'"))
        }),
        Err(env::VarError::NotPresent) => Ok(None),
        Err(env::VarError::NotUnicode(_)) => Err(AppError::config(format!(
            "environment variable {name} is not valid unicode"
        ))),
    }
}
