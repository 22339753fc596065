// ABOUTME: Catalog-driven badge mechanism: progress toward a threshold, award exactly once
// ABOUTME: Catalog membership and qualifying-event rules are configuration, not engine logic
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 LevelFit

//! Badge progress and awarding
//!
//! The engine implements only the generic mechanism: increment progress
//! on qualifying events, transition to earned at the threshold, grant
//! the badge's XP exactly once. Which badges exist and what qualifies
//! them is catalog data.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::constants::badges as badge_constants;
use crate::models::{Badge, BadgeTier};

/// Event classes that can feed badge progress
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum BadgeTrigger {
    /// First-time account/plan initialization
    PlanInitialized,
    /// A finished workout extended (or restarted) the daily streak
    StreakExtended,
    /// All workout days of a plan week were completed
    WeekCompleted,
}

/// Catalog entry describing one badge
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct BadgeDefinition {
    /// Unique key within the catalog
    pub key: String,
    /// Display name
    pub name: String,
    /// Display description
    pub description: String,
    /// Tier
    pub tier: BadgeTier,
    /// XP granted once, when the badge is earned
    pub xp_reward: u32,
    /// Qualifying events needed to earn the badge
    pub progress_required: u32,
    /// Which event class feeds this badge's progress
    pub trigger: BadgeTrigger,
}

/// The set of badges a deployment hands out
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct BadgeCatalog {
    definitions: Vec<BadgeDefinition>,
}

impl Default for BadgeCatalog {
    fn default() -> Self {
        Self {
            definitions: vec![
                BadgeDefinition {
                    key: badge_constants::STARTER_BADGE_KEY.to_owned(),
                    name: badge_constants::STARTER_BADGE_NAME.to_owned(),
                    description: badge_constants::STARTER_BADGE_DESCRIPTION.to_owned(),
                    tier: BadgeTier::Bronze,
                    xp_reward: badge_constants::STARTER_BADGE_XP,
                    progress_required: 1,
                    trigger: BadgeTrigger::PlanInitialized,
                },
                BadgeDefinition {
                    key: "on_a_roll".to_owned(),
                    name: "On a Roll".to_owned(),
                    description: "Worked out three days in a row".to_owned(),
                    tier: BadgeTier::Bronze,
                    xp_reward: 50,
                    progress_required: 3,
                    trigger: BadgeTrigger::StreakExtended,
                },
                BadgeDefinition {
                    key: "week_warrior".to_owned(),
                    name: "Week Warrior".to_owned(),
                    description: "Worked out seven days in a row".to_owned(),
                    tier: BadgeTier::Silver,
                    xp_reward: 150,
                    progress_required: 7,
                    trigger: BadgeTrigger::StreakExtended,
                },
                BadgeDefinition {
                    key: "perfect_week".to_owned(),
                    name: "Perfect Week".to_owned(),
                    description: "Completed every workout day of a plan week".to_owned(),
                    tier: BadgeTier::Gold,
                    xp_reward: 200,
                    progress_required: 1,
                    trigger: BadgeTrigger::WeekCompleted,
                },
            ],
        }
    }
}

impl BadgeCatalog {
    /// Build a catalog from explicit definitions
    #[must_use]
    pub fn new(definitions: Vec<BadgeDefinition>) -> Self {
        Self { definitions }
    }

    /// All definitions
    #[must_use]
    pub fn definitions(&self) -> &[BadgeDefinition] {
        &self.definitions
    }

    /// Look up a definition by key
    #[must_use]
    pub fn definition(&self, key: &str) -> Option<&BadgeDefinition> {
        self.definitions.iter().find(|d| d.key == key)
    }

    /// Definitions fed by a given event class
    #[must_use]
    pub fn triggered_by(&self, trigger: BadgeTrigger) -> impl Iterator<Item = &BadgeDefinition> {
        self.definitions.iter().filter(move |d| d.trigger == trigger)
    }
}

/// Result of feeding one qualifying event into one badge
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BadgeOutcome {
    /// Threshold reached now; the badge grants its XP with this row
    Awarded(Badge),
    /// Progress moved but the threshold is not reached yet
    Progressed(Badge),
    /// The user already holds the earned badge; no-op by design
    AlreadyEarned,
}

/// Feed one qualifying event (weight `increment`) into a badge
///
/// Idempotent for earned badges: a duplicate award attempt is a no-op
/// success, never an error surfaced to callers.
#[must_use]
pub fn record_progress(
    owned: &[Badge],
    definition: &BadgeDefinition,
    increment: u32,
    now: DateTime<Utc>,
) -> BadgeOutcome {
    let existing = owned.iter().find(|b| b.badge_key == definition.key);

    if existing.is_some_and(Badge::earned) {
        return BadgeOutcome::AlreadyEarned;
    }

    let progress_before = existing.map_or(0, |b| b.progress_current);
    let progress_now = progress_before
        .saturating_add(increment)
        .min(definition.progress_required);

    let mut badge = Badge {
        badge_key: definition.key.clone(),
        name: definition.name.clone(),
        description: definition.description.clone(),
        tier: definition.tier,
        xp_earned: 0,
        progress_current: progress_now,
        progress_required: definition.progress_required,
        unlocked_at: None,
    };

    if progress_now >= definition.progress_required {
        badge.xp_earned = definition.xp_reward;
        badge.unlocked_at = Some(now);
        BadgeOutcome::Awarded(badge)
    } else {
        BadgeOutcome::Progressed(badge)
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, clippy::panic)]

    use super::*;

    fn streak_badge() -> BadgeDefinition {
        BadgeDefinition {
            key: "on_a_roll".to_owned(),
            name: "On a Roll".to_owned(),
            description: "Three in a row".to_owned(),
            tier: BadgeTier::Bronze,
            xp_reward: 50,
            progress_required: 3,
            trigger: BadgeTrigger::StreakExtended,
        }
    }

    #[test]
    fn progress_accumulates_to_award() {
        let def = streak_badge();
        let now = Utc::now();

        let BadgeOutcome::Progressed(first) = record_progress(&[], &def, 1, now) else {
            panic!("expected progress");
        };
        assert_eq!(first.progress_current, 1);
        assert_eq!(first.xp_earned, 0);
        assert!(!first.earned());

        let BadgeOutcome::Progressed(second) = record_progress(&[first], &def, 1, now) else {
            panic!("expected progress");
        };

        let BadgeOutcome::Awarded(earned) = record_progress(&[second], &def, 1, now) else {
            panic!("expected award");
        };
        assert!(earned.earned());
        assert_eq!(earned.xp_earned, 50);
        assert_eq!(earned.progress_current, 3);
    }

    #[test]
    fn awarding_twice_is_a_noop() {
        let def = streak_badge();
        let now = Utc::now();
        let BadgeOutcome::Awarded(earned) = record_progress(&[], &def, 3, now) else {
            panic!("expected award");
        };
        assert_eq!(record_progress(&[earned], &def, 1, now), BadgeOutcome::AlreadyEarned);
    }

    #[test]
    fn progress_clamps_at_the_threshold() {
        let def = streak_badge();
        let BadgeOutcome::Awarded(earned) = record_progress(&[], &def, 10, Utc::now()) else {
            panic!("expected award");
        };
        assert_eq!(earned.progress_current, 3);
    }

    #[test]
    fn default_catalog_contains_the_starter_badge() {
        let catalog = BadgeCatalog::default();
        let starter = catalog.definition("journey_begins").unwrap();
        assert_eq!(starter.trigger, BadgeTrigger::PlanInitialized);
        assert_eq!(starter.xp_reward, 100);
        assert_eq!(
            catalog.triggered_by(BadgeTrigger::StreakExtended).count(),
            2
        );
    }
}
