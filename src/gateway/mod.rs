// ABOUTME: Persistence gateway trait the service layer talks through
// ABOUTME: Updates are applied atomically so progression rows can never drift apart
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 LevelFit

//! Persistence gateway
//!
//! The engine is pure, so everything stateful funnels through this
//! trait. The contract that matters is [`ProgressionGateway::apply`]:
//! one [`ProgressionUpdate`] lands atomically or not at all. Reads are
//! individually consistent; the service layer serializes writers per
//! user.

pub mod memory;

use std::collections::HashSet;

use async_trait::async_trait;
use uuid::Uuid;

use crate::engine::ProgressionUpdate;
use crate::models::{Badge, Plan, UserStats, WeekProgress, WorkoutSession};

/// Storage operations the progression service needs
#[async_trait]
pub trait ProgressionGateway: Send + Sync {
    /// Load a user's stats row, `None` before initialization
    async fn user_stats(&self, user_id: Uuid) -> anyhow::Result<Option<UserStats>>;

    /// Load the user's active plan, `None` when none is active
    async fn active_plan(&self, user_id: Uuid) -> anyhow::Result<Option<Plan>>;

    /// Load the progress row for one plan week
    async fn week_progress(
        &self,
        user_id: Uuid,
        week_number: u32,
    ) -> anyhow::Result<Option<WeekProgress>>;

    /// Load all badge rows the user holds
    async fn badges(&self, user_id: Uuid) -> anyhow::Result<Vec<Badge>>;

    /// Load one workout session by id
    async fn session(
        &self,
        user_id: Uuid,
        session_id: Uuid,
    ) -> anyhow::Result<Option<WorkoutSession>>;

    /// Insert or replace a session row
    async fn save_session(&self, session: &WorkoutSession) -> anyhow::Result<()>;

    /// Distinct day labels with a completed session for a plan week
    async fn completed_day_labels(
        &self,
        user_id: Uuid,
        plan_id: Uuid,
        week_number: u32,
    ) -> anyhow::Result<HashSet<String>>;

    /// Persist everything in `update` atomically
    async fn apply(&self, user_id: Uuid, update: &ProgressionUpdate) -> anyhow::Result<()>;
}
