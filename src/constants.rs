// ABOUTME: Application-wide constants for the progression engine
// ABOUTME: XP curve parameters, badge grants, schedule defaults, and scoring weights
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 LevelFit

//! Centralized constants for progression rules
//!
//! Every numeric rule the engine applies lives here so that display
//! code, grant computation, and tests share one source of truth.

/// XP curve and grant parameters
pub mod xp {
    /// Base XP cost of the level curve: advancing from level L to L+1
    /// costs `floor(XP_CURVE_BASE * L^XP_CURVE_EXPONENT)`
    pub const XP_CURVE_BASE: f64 = 100.0;

    /// Exponent of the RPG-style level curve
    pub const XP_CURVE_EXPONENT: f64 = 1.5;

    /// XP granted once at account/plan initialization
    pub const STARTING_XP: u64 = 100;

    /// Workout XP is `floor(completion_percentage * WORKOUT_XP_MULTIPLIER)`
    pub const WORKOUT_XP_MULTIPLIER: f64 = 0.5;

    /// Implicit cap on a single workout grant (100% completion)
    pub const MAX_WORKOUT_XP: u32 = 50;
}

/// Badge catalog anchors
pub mod badges {
    /// Key of the badge awarded on first-time initialization
    pub const STARTER_BADGE_KEY: &str = "journey_begins";

    /// Display name of the starter badge
    pub const STARTER_BADGE_NAME: &str = "Journey Begins";

    /// Description shown with the starter badge
    pub const STARTER_BADGE_DESCRIPTION: &str =
        "Generated your first AI-powered fitness plan";

    /// XP bonus granted with the starter badge
    pub const STARTER_BADGE_XP: u32 = 100;
}

/// Weekly schedule defaults
pub mod schedule {
    /// Calendar days per plan week
    pub const DAYS_PER_WEEK: u32 = 7;

    /// Week numbering starts at 1
    pub const FIRST_WEEK: u32 = 1;

    /// Rough calorie estimate applied per workout minute
    pub const CALORIES_PER_MINUTE: u32 = 5;
}

/// Weights of the default weekly consistency score
///
/// The percent-better formula is an open business question upstream;
/// these weights belong to the placeholder scorer only.
pub mod scoring {
    /// Weight of the workout-completion ratio in the weekly score
    pub const COMPLETION_WEIGHT: f64 = 0.7;

    /// Weight of the step-goal ratio in the weekly score
    pub const STEP_GOAL_WEIGHT: f64 = 0.3;

    /// Percent-better reported when the previous week scored zero but
    /// the current week scored above zero
    pub const FULL_IMPROVEMENT_PERCENT: f64 = 100.0;
}

/// Service identifiers for structured logging
pub mod service_names {
    /// Canonical service name of this crate
    pub const LEVELFIT_ENGINE: &str = "levelfit-engine";
}
