// ABOUTME: Canonical XP curve and level derivation used by every XP consumer
// ABOUTME: One floor-rounded implementation so display and grant math can never disagree
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 LevelFit

//! XP and level curve
//!
//! The RPG-style curve: advancing from level `L` to `L+1` costs
//! `floor(100 * L^1.5)` XP. Historically this formula was duplicated
//! across call sites with inconsistent rounding; this module is the
//! single source of truth for derivation and display alike.

use serde::{Deserialize, Serialize};

use crate::constants::xp;

/// XP required to advance from `level` to `level + 1`
#[must_use]
pub fn xp_for_level(level: u32) -> u64 {
    let level = level.max(1);
    (xp::XP_CURVE_BASE * f64::from(level).powf(xp::XP_CURVE_EXPONENT)).floor() as u64
}

/// Cumulative XP required to reach `level` from level 1
///
/// `cumulative_xp(1) == 0`: a fresh account is already level 1.
#[must_use]
pub fn cumulative_xp(level: u32) -> u64 {
    (1..level).map(xp_for_level).sum()
}

/// Current level for a cumulative XP total: the largest `L >= 1` whose
/// cumulative requirement does not exceed `total_xp`
#[must_use]
pub fn level_for_xp(total_xp: u64) -> u32 {
    let mut level = 1;
    let mut threshold = 0u64;
    loop {
        let next = threshold.saturating_add(xp_for_level(level));
        if next > total_xp {
            return level;
        }
        threshold = next;
        level += 1;
    }
}

/// Progress decomposition within the current level
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct LevelProgress {
    /// Current level
    pub level: u32,
    /// XP accumulated past the current level's threshold
    pub xp_into_level: u64,
    /// XP cost of the current level (to reach the next one)
    pub xp_for_next_level: u64,
    /// XP still missing to the next level
    pub xp_remaining: u64,
    /// Floor-rounded percentage toward the next level
    pub percent_to_next: u32,
}

/// Decompose a cumulative XP total into level progress
///
/// Integer arithmetic throughout so the displayed percentage always
/// agrees with the "XP to next level" figure.
#[must_use]
pub fn progress_for_xp(total_xp: u64) -> LevelProgress {
    let level = level_for_xp(total_xp);
    let xp_into_level = total_xp - cumulative_xp(level);
    let xp_for_next_level = xp_for_level(level);
    LevelProgress {
        level,
        xp_into_level,
        xp_for_next_level,
        xp_remaining: xp_for_next_level - xp_into_level,
        percent_to_next: (xp_into_level * 100 / xp_for_next_level) as u32,
    }
}

/// XP granted for a finished workout: `floor(percentage * multiplier)`
///
/// Monotone in the completion percentage; caps at 50 XP with the
/// default multiplier.
#[must_use]
pub fn workout_xp(completion_percentage: u32, multiplier: f64) -> u32 {
    (f64::from(completion_percentage.min(100)) * multiplier).floor() as u32
}
