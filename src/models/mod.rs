// ABOUTME: Typed data records shared by the progression engine and its collaborators
// ABOUTME: UserStats, Badge, WeekProgress, Plan document, and WorkoutSession definitions
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 LevelFit

//! Data model for the progression core
//!
//! These records mirror the rows the host application keeps in its
//! hosted store. Validation happens once at the persistence boundary
//! (`PlanDocument::validate`), so the engine can assume well-formed
//! input everywhere else.

/// Awarded achievement instances and tiers
pub mod badge;

/// Training plan document (LLM-generated) plus progression metadata
pub mod plan;

/// Per-week progress rows
pub mod progress;

/// Workout session lifecycle
pub mod session;

/// Per-user aggregate stats
pub mod stats;

pub use badge::{Badge, BadgeTier};
pub use plan::{
    Exercise, Milestone, Plan, PlanDocument, PlanStatus, ScheduleDay, WeekRange, WeeklySchedule,
};
pub use progress::WeekProgress;
pub use session::{SessionStatus, WorkoutSession};
pub use stats::UserStats;
