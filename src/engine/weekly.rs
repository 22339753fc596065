// ABOUTME: Weekly performance scoring and the percent-better comparison metric
// ABOUTME: The scoring formula is pluggable; the default consistency scorer is a placeholder
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 LevelFit

//! Weekly percent-better
//!
//! The exact "performance score" a week aggregates is an open business
//! question upstream, so the engine is generic over a [`WeeklyScorer`]
//! and only fixes the comparison contract: a signed percentage of the
//! current week's score against the immediately preceding week's,
//! defaulting to 0 for week 1.

use crate::constants::scoring;
use crate::models::WeekProgress;

/// Pluggable weekly performance score
pub trait WeeklyScorer: Send + Sync {
    /// Aggregate a week into a single non-negative performance score
    fn score(&self, week: &WeekProgress) -> f64;
}

/// Default placeholder scorer: workout-completion ratio weighted with
/// the step-goal ratio, on a 0-100 scale
#[derive(Debug, Clone, Copy, Default)]
pub struct ConsistencyScorer;

impl WeeklyScorer for ConsistencyScorer {
    fn score(&self, week: &WeekProgress) -> f64 {
        (week.completion_ratio() * scoring::COMPLETION_WEIGHT
            + week.step_goal_ratio() * scoring::STEP_GOAL_WEIGHT)
            * 100.0
    }
}

/// Signed percent-better of `current` against `previous`
///
/// No previous week (week 1) compares to nothing and reports 0. A
/// previous score of zero maps to a full improvement when the current
/// week scored at all, avoiding the division by zero.
#[must_use]
pub fn percent_better(current: f64, previous: Option<f64>) -> f64 {
    let Some(previous) = previous else {
        return 0.0;
    };
    if previous == 0.0 {
        return if current > 0.0 {
            scoring::FULL_IMPROVEMENT_PERCENT
        } else {
            0.0
        };
    }
    (current - previous) / previous * 100.0
}
