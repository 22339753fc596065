// ABOUTME: Awarded achievement instances and badge tiers
// ABOUTME: Badge rows with progress tracking toward an award threshold
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 LevelFit

use std::fmt::{Display, Formatter, Result as FmtResult};
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::errors::AppError;

/// Ordinal badge tiers, lowest to highest
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord)]
#[serde(rename_all = "lowercase")]
pub enum BadgeTier {
    /// Entry tier
    Bronze,
    /// Mid tier
    Silver,
    /// High tier
    Gold,
    /// Top tier
    Platinum,
}

impl Display for BadgeTier {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        match self {
            Self::Bronze => write!(f, "bronze"),
            Self::Silver => write!(f, "silver"),
            Self::Gold => write!(f, "gold"),
            Self::Platinum => write!(f, "platinum"),
        }
    }
}

impl FromStr for BadgeTier {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "bronze" => Ok(Self::Bronze),
            "silver" => Ok(Self::Silver),
            "gold" => Ok(Self::Gold),
            "platinum" => Ok(Self::Platinum),
            _ => Err(AppError::invalid_input(format!("Invalid badge tier: {s}"))),
        }
    }
}

/// One badge row per (user, badge key)
///
/// A badge is "in progress" while `progress_current < progress_required`
/// and transitions to earned exactly once, at which point `xp_earned`
/// and `unlocked_at` are set and the row becomes immutable.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Badge {
    /// Unique identifier within the badge catalog
    pub badge_key: String,
    /// Display name
    pub name: String,
    /// Display description
    pub description: String,
    /// Tier of the badge
    pub tier: BadgeTier,
    /// XP granted at award time; 0 while still in progress
    pub xp_earned: u32,
    /// Progress so far, monotone, never above `progress_required`
    pub progress_current: u32,
    /// Threshold at which the badge is earned
    pub progress_required: u32,
    /// Award timestamp, set once when the threshold is reached
    pub unlocked_at: Option<DateTime<Utc>>,
}

impl Badge {
    /// Whether this badge has reached its threshold and granted its XP
    #[must_use]
    pub const fn earned(&self) -> bool {
        self.unlocked_at.is_some()
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use super::*;

    #[test]
    fn tier_ordering_is_ordinal() {
        assert!(BadgeTier::Bronze < BadgeTier::Silver);
        assert!(BadgeTier::Silver < BadgeTier::Gold);
        assert!(BadgeTier::Gold < BadgeTier::Platinum);
    }

    #[test]
    fn tier_round_trips_through_str() {
        for tier in [
            BadgeTier::Bronze,
            BadgeTier::Silver,
            BadgeTier::Gold,
            BadgeTier::Platinum,
        ] {
            assert_eq!(tier.to_string().parse::<BadgeTier>().unwrap(), tier);
        }
        assert!("diamond".parse::<BadgeTier>().is_err());
    }
}
