// ABOUTME: In-memory gateway used by tests and single-process deployments
// ABOUTME: One RwLock over all user records; apply() mutates under a single write guard
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 LevelFit

use std::collections::{HashMap, HashSet};
use std::sync::RwLock;

use anyhow::anyhow;
use async_trait::async_trait;
use uuid::Uuid;

use crate::engine::ProgressionUpdate;
use crate::logging::AppLogger;
use crate::models::{Badge, Plan, PlanStatus, SessionStatus, UserStats, WeekProgress, WorkoutSession};

use super::ProgressionGateway;

#[derive(Debug, Default)]
struct UserRecord {
    stats: Option<UserStats>,
    plan: Option<Plan>,
    badges: Vec<Badge>,
    weeks: HashMap<u32, WeekProgress>,
    sessions: HashMap<Uuid, WorkoutSession>,
}

/// Gateway keeping all state in process memory
///
/// Atomicity of [`ProgressionGateway::apply`] comes from holding the
/// write lock across the whole mutation.
#[derive(Debug, Default)]
pub struct InMemoryGateway {
    records: RwLock<HashMap<Uuid, UserRecord>>,
}

impl InMemoryGateway {
    /// Empty gateway
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Store a plan as the user's active plan
    ///
    /// Test and bootstrap seam; plan generation itself lives upstream.
    ///
    /// # Errors
    ///
    /// Returns an error when the lock is poisoned.
    pub fn seed_plan(&self, plan: Plan) -> anyhow::Result<()> {
        let mut records = self.write()?;
        let user_id = plan.user_id;
        records.entry(user_id).or_default().plan = Some(plan);
        Ok(())
    }

    fn read(
        &self,
    ) -> anyhow::Result<std::sync::RwLockReadGuard<'_, HashMap<Uuid, UserRecord>>> {
        self.records
            .read()
            .map_err(|_| anyhow!("gateway lock poisoned"))
    }

    fn write(
        &self,
    ) -> anyhow::Result<std::sync::RwLockWriteGuard<'_, HashMap<Uuid, UserRecord>>> {
        self.records
            .write()
            .map_err(|_| anyhow!("gateway lock poisoned"))
    }
}

#[async_trait]
impl ProgressionGateway for InMemoryGateway {
    async fn user_stats(&self, user_id: Uuid) -> anyhow::Result<Option<UserStats>> {
        Ok(self.read()?.get(&user_id).and_then(|r| r.stats.clone()))
    }

    async fn active_plan(&self, user_id: Uuid) -> anyhow::Result<Option<Plan>> {
        Ok(self
            .read()?
            .get(&user_id)
            .and_then(|r| r.plan.clone())
            .filter(|p| p.status == PlanStatus::Active))
    }

    async fn week_progress(
        &self,
        user_id: Uuid,
        week_number: u32,
    ) -> anyhow::Result<Option<WeekProgress>> {
        Ok(self
            .read()?
            .get(&user_id)
            .and_then(|r| r.weeks.get(&week_number).cloned()))
    }

    async fn badges(&self, user_id: Uuid) -> anyhow::Result<Vec<Badge>> {
        Ok(self
            .read()?
            .get(&user_id)
            .map(|r| r.badges.clone())
            .unwrap_or_default())
    }

    async fn session(
        &self,
        user_id: Uuid,
        session_id: Uuid,
    ) -> anyhow::Result<Option<WorkoutSession>> {
        Ok(self
            .read()?
            .get(&user_id)
            .and_then(|r| r.sessions.get(&session_id).cloned()))
    }

    async fn save_session(&self, session: &WorkoutSession) -> anyhow::Result<()> {
        let mut records = self.write()?;
        records
            .entry(session.user_id)
            .or_default()
            .sessions
            .insert(session.id, session.clone());
        Ok(())
    }

    async fn completed_day_labels(
        &self,
        user_id: Uuid,
        plan_id: Uuid,
        week_number: u32,
    ) -> anyhow::Result<HashSet<String>> {
        Ok(self.read()?.get(&user_id).map_or_else(HashSet::new, |r| {
            r.sessions
                .values()
                .filter(|s| {
                    s.plan_id == plan_id
                        && s.week_number == week_number
                        && s.status == SessionStatus::Completed
                })
                .map(|s| s.workout_day.clone())
                .collect()
        }))
    }

    async fn apply(&self, user_id: Uuid, update: &ProgressionUpdate) -> anyhow::Result<()> {
        let mut records = self.write()?;
        let record = records.entry(user_id).or_default();

        record.stats = Some(update.stats.clone());

        for badge in &update.badges {
            if let Some(slot) = record
                .badges
                .iter_mut()
                .find(|b| b.badge_key == badge.badge_key)
            {
                *slot = badge.clone();
            } else {
                record.badges.push(badge.clone());
            }
        }

        if let Some(plan_update) = &update.plan {
            let plan = record
                .plan
                .as_mut()
                .filter(|p| p.id == plan_update.plan_id)
                .ok_or_else(|| anyhow!("plan {} not found for update", plan_update.plan_id))?;
            plan.current_week = plan_update.current_week;
            plan.current_phase = plan_update.current_phase;
            plan.status = plan_update.status;
        }

        for week in &update.week_progress {
            record.weeks.insert(week.week_number, week.clone());
        }

        if let Some(session) = &update.session {
            record.sessions.insert(session.id, session.clone());
        }

        let rows_touched = 1
            + update.badges.len()
            + update.week_progress.len()
            + usize::from(update.plan.is_some())
            + usize::from(update.session.is_some());
        AppLogger::log_gateway_operation("apply", user_id, rows_touched);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use super::*;
    use chrono::Utc;

    fn finished_session(user_id: Uuid, plan_id: Uuid, day: &str, week: u32) -> WorkoutSession {
        let mut s = WorkoutSession::start(user_id, plan_id, day, week, 4, Utc::now());
        s.record_completed_exercises(4);
        s.finalize(Utc::now()).unwrap();
        s
    }

    #[tokio::test]
    async fn completed_day_labels_deduplicate_and_filter() {
        let gateway = InMemoryGateway::new();
        let user_id = Uuid::new_v4();
        let plan_id = Uuid::new_v4();

        gateway
            .save_session(&finished_session(user_id, plan_id, "Day 1", 2))
            .await
            .unwrap();
        gateway
            .save_session(&finished_session(user_id, plan_id, "Day 1", 2))
            .await
            .unwrap();
        // A different week and an unfinished session do not count.
        gateway
            .save_session(&finished_session(user_id, plan_id, "Day 2", 1))
            .await
            .unwrap();
        gateway
            .save_session(&WorkoutSession::start(
                user_id,
                plan_id,
                "Day 2",
                2,
                4,
                Utc::now(),
            ))
            .await
            .unwrap();

        let labels = gateway
            .completed_day_labels(user_id, plan_id, 2)
            .await
            .unwrap();
        assert_eq!(labels.len(), 1);
        assert!(labels.contains("Day 1"));
    }

    #[tokio::test]
    async fn apply_upserts_stats_badges_and_weeks() {
        let gateway = InMemoryGateway::new();
        let user_id = Uuid::new_v4();
        let now = Utc::now();

        let update = ProgressionUpdate {
            stats: UserStats::new(user_id, 1, now),
            badges: vec![],
            plan: None,
            week_progress: vec![WeekProgress::opening(1, now.date_naive(), 4)],
            session: None,
            notification: None,
        };
        gateway.apply(user_id, &update).await.unwrap();

        assert!(gateway.user_stats(user_id).await.unwrap().is_some());
        assert!(gateway.week_progress(user_id, 1).await.unwrap().is_some());
        assert!(gateway.week_progress(user_id, 2).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn plan_update_against_a_missing_plan_fails() {
        let gateway = InMemoryGateway::new();
        let user_id = Uuid::new_v4();
        let now = Utc::now();

        let update = ProgressionUpdate {
            stats: UserStats::new(user_id, 1, now),
            badges: vec![],
            plan: Some(crate::engine::PlanUpdate {
                plan_id: Uuid::new_v4(),
                current_week: 2,
                current_phase: 1,
                status: crate::models::PlanStatus::Active,
            }),
            week_progress: vec![],
            session: None,
            notification: None,
        };
        assert!(gateway.apply(user_id, &update).await.is_err());
    }
}
