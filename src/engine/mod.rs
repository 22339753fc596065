// ABOUTME: Progression engine orchestrating XP grants, badges, streaks, and plan advancement
// ABOUTME: Pure state-in/state-out core; persistence happens through the gateway layer
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 LevelFit

//! Progression engine
//!
//! The engine is a pure core: every operation takes the relevant slice
//! of user state, applies the progression rules, and returns a
//! [`ProgressionUpdate`] describing the rows to persist. The gateway
//! applies an update atomically, so a crash between computing and
//! persisting can never leave XP granted without its level recomputed
//! or a badge awarded twice.

pub mod advancement;
pub mod badges;
pub mod leveling;
pub mod weekly;

use std::collections::HashSet;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};
use uuid::Uuid;

use crate::config::ProgressionConfig;
use crate::constants::schedule;
use crate::errors::{AppError, AppResult};
use crate::logging::AppLogger;
use crate::models::{Badge, Plan, PlanStatus, UserStats, WeekProgress, WorkoutSession};

use advancement::{ProgressionNotification, WeekEvaluation};
use badges::{BadgeCatalog, BadgeOutcome, BadgeTrigger};
use weekly::{ConsistencyScorer, WeeklyScorer};

/// Plan-level fields changed by an operation
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct PlanUpdate {
    /// Plan row to update
    pub plan_id: Uuid,
    /// New current week
    pub current_week: u32,
    /// New current phase
    pub current_phase: u32,
    /// New lifecycle status
    pub status: PlanStatus,
}

/// Everything an operation wants persisted, applied atomically
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ProgressionUpdate {
    /// Stats row after the operation
    pub stats: UserStats,
    /// Badge rows that changed (progressed or newly awarded)
    pub badges: Vec<Badge>,
    /// Plan fields to update, if the plan changed
    pub plan: Option<PlanUpdate>,
    /// Week-progress rows to upsert (current week, plus the next one on
    /// advancement)
    pub week_progress: Vec<WeekProgress>,
    /// Finalized session row, when the operation closed one
    pub session: Option<WorkoutSession>,
    /// Congratulation to surface, when a transition fired
    pub notification: Option<ProgressionNotification>,
}

/// Result of [`ProgressionEngine::initialize`]
#[derive(Debug, Clone, PartialEq)]
pub enum InitializationOutcome {
    /// Stats already existed; nothing was granted
    AlreadyInitialized {
        /// The pre-existing stats row, untouched
        stats: UserStats,
    },
    /// First-time initialization; persist the update
    Initialized {
        /// Rows to persist
        update: Box<ProgressionUpdate>,
    },
}

/// Result of [`ProgressionEngine::complete_workout`]
#[derive(Debug, Clone, PartialEq)]
pub struct WorkoutOutcome {
    /// Rows to persist
    pub update: ProgressionUpdate,
    /// XP granted for the session itself
    pub session_xp: u32,
    /// XP granted by badges awarded during the operation
    pub badge_xp: u64,
    /// Whether the combined grant crossed a level boundary
    pub leveled_up: bool,
}

/// Input slice of user state for [`ProgressionEngine::complete_workout`]
#[derive(Debug, Clone)]
pub struct WorkoutSnapshot {
    /// Current stats row
    pub stats: UserStats,
    /// The active plan
    pub plan: Plan,
    /// The session being finished (in progress or paused)
    pub session: WorkoutSession,
    /// Progress row of the plan's current week
    pub week_progress: WeekProgress,
    /// Closed progress row of the previous week, if any
    pub previous_week: Option<WeekProgress>,
    /// Distinct day labels already completed this week, excluding the
    /// session being finished
    pub completed_day_labels: HashSet<String>,
    /// Badge rows the user currently holds
    pub badges: Vec<Badge>,
}

/// How a badge trigger moves progress
enum BadgeFeed {
    /// Add a fixed amount
    Increment(u32),
    /// Raise progress to at least this value; never lowers it
    RaiseTo(u32),
}

/// XP and rows produced by feeding one trigger
struct BadgeBatch {
    xp: u64,
    awarded: u32,
    changed: Vec<Badge>,
}

/// The progression engine, generic over the weekly scoring strategy
pub struct ProgressionEngine<S: WeeklyScorer = ConsistencyScorer> {
    config: ProgressionConfig,
    catalog: BadgeCatalog,
    scorer: S,
}

impl ProgressionEngine<ConsistencyScorer> {
    /// Engine with default configuration, catalog, and scorer
    #[must_use]
    pub fn new() -> Self {
        Self {
            config: ProgressionConfig::default(),
            catalog: BadgeCatalog::default(),
            scorer: ConsistencyScorer,
        }
    }

    /// Engine with explicit configuration and the default catalog/scorer
    #[must_use]
    pub fn with_config(config: ProgressionConfig) -> Self {
        Self {
            config,
            catalog: BadgeCatalog::default(),
            scorer: ConsistencyScorer,
        }
    }
}

impl Default for ProgressionEngine<ConsistencyScorer> {
    fn default() -> Self {
        Self::new()
    }
}

impl<S: WeeklyScorer> ProgressionEngine<S> {
    /// Engine with a custom weekly scoring strategy
    #[must_use]
    pub fn with_scorer(config: ProgressionConfig, catalog: BadgeCatalog, scorer: S) -> Self {
        Self {
            config,
            catalog,
            scorer,
        }
    }

    /// The engine's configuration
    #[must_use]
    pub const fn config(&self) -> &ProgressionConfig {
        &self.config
    }

    /// The badge catalog in effect
    #[must_use]
    pub const fn catalog(&self) -> &BadgeCatalog {
        &self.catalog
    }

    /// Score a week with the engine's scoring strategy
    #[must_use]
    pub fn score_week(&self, week: &WeekProgress) -> f64 {
        self.scorer.score(week)
    }

    /// First-time initialization: starting XP, the initialization badges,
    /// and the week 1 progress row
    ///
    /// Idempotent: when a stats row already exists the call reports
    /// [`InitializationOutcome::AlreadyInitialized`] and grants nothing,
    /// so a retried signup flow cannot double-grant starting XP.
    ///
    /// # Errors
    ///
    /// Returns `InvalidState` when the plan document fails validation.
    pub fn initialize(
        &self,
        user_id: Uuid,
        existing: Option<&UserStats>,
        plan: &Plan,
        now: DateTime<Utc>,
    ) -> AppResult<InitializationOutcome> {
        if let Some(stats) = existing {
            debug!(user_id = %user_id, "stats already initialized, skipping");
            return Ok(InitializationOutcome::AlreadyInitialized {
                stats: stats.clone(),
            });
        }

        plan.document.validate()?;

        let mut stats = UserStats::new(user_id, schedule::FIRST_WEEK, now);
        stats.grant_xp(self.config.starting_xp, now);

        let mut owned = Vec::new();
        let batch = self.feed_trigger(
            user_id,
            &mut owned,
            BadgeTrigger::PlanInitialized,
            &BadgeFeed::Increment(1),
            now,
        );
        stats.grant_xp(batch.xp, now);
        stats.total_badges_earned += batch.awarded;

        let mut week = WeekProgress::opening(
            schedule::FIRST_WEEK,
            now.date_naive(),
            plan.document.workout_day_count(),
        );
        week.step_goal_days_total = self.config.step_goal_days_per_week;

        info!(
            user_id = %user_id,
            total_xp = stats.total_xp,
            level = stats.level,
            badges = batch.awarded,
            "initialized progression state"
        );

        Ok(InitializationOutcome::Initialized {
            update: Box::new(ProgressionUpdate {
                stats,
                badges: batch.changed,
                plan: None,
                week_progress: vec![week],
                session: None,
                notification: None,
            }),
        })
    }

    /// Finish a workout session and run the full progression flow
    ///
    /// Finalizes the session, grants its XP, updates the streak, feeds
    /// badge triggers, updates the week's progress row, and evaluates
    /// week/phase/program advancement.
    ///
    /// # Errors
    ///
    /// Returns `InvalidInput` when the session does not belong to the
    /// snapshot's user and plan, and `InvalidState` when the plan is not
    /// active or the session is already finalized.
    pub fn complete_workout(
        &self,
        snapshot: WorkoutSnapshot,
        now: DateTime<Utc>,
    ) -> AppResult<WorkoutOutcome> {
        let WorkoutSnapshot {
            mut stats,
            plan,
            mut session,
            mut week_progress,
            previous_week,
            completed_day_labels,
            mut badges,
        } = snapshot;

        if session.user_id != stats.user_id || session.plan_id != plan.id {
            return Err(AppError::invalid_input(
                "session does not belong to this user and plan",
            )
            .with_user_id(stats.user_id)
            .with_resource_id(session.id.to_string()));
        }
        if plan.status != PlanStatus::Active {
            return Err(AppError::invalid_state("plan is not active")
                .with_resource_id(plan.id.to_string()));
        }

        let level_before = stats.level;

        session.finalize(now)?;
        let session_xp = leveling::workout_xp(
            session.completion_percentage,
            self.config.workout_xp_multiplier,
        );

        let streak_extended = stats.record_workout_day(now.date_naive(), now);
        stats.grant_xp(u64::from(session_xp), now);

        let mut badge_xp = 0u64;
        let mut changed_badges = Vec::new();
        if streak_extended {
            let batch = self.feed_trigger(
                stats.user_id,
                &mut badges,
                BadgeTrigger::StreakExtended,
                &BadgeFeed::RaiseTo(stats.current_streak_days),
                now,
            );
            badge_xp += batch.xp;
            stats.total_badges_earned += batch.awarded;
            changed_badges.extend(batch.changed);
        }

        week_progress.workouts_completed += 1;
        week_progress.current_streak_days = stats.current_streak_days;

        let mut labels = completed_day_labels;
        labels.insert(session.workout_day.clone());
        let evaluation = advancement::evaluate_week(&plan, &labels);

        let mut plan_update = None;
        let mut notification = None;
        let mut week_rows = Vec::new();

        match evaluation {
            WeekEvaluation::Incomplete {
                completed,
                required,
            } => {
                debug!(
                    user_id = %stats.user_id,
                    completed,
                    required,
                    week = plan.current_week,
                    "week not yet complete"
                );
                week_rows.push(week_progress);
            }
            WeekEvaluation::WeekAdvanced {
                next_week,
                notification: note,
            } => {
                self.close_week(&mut stats, &mut week_progress, previous_week.as_ref());
                let next = self.open_next_week(&week_progress);
                stats.current_week = next_week;
                plan_update = Some(PlanUpdate {
                    plan_id: plan.id,
                    current_week: next_week,
                    current_phase: plan.current_phase,
                    status: PlanStatus::Active,
                });
                let batch = self.feed_trigger(
                    stats.user_id,
                    &mut badges,
                    BadgeTrigger::WeekCompleted,
                    &BadgeFeed::Increment(1),
                    now,
                );
                badge_xp += batch.xp;
                stats.total_badges_earned += batch.awarded;
                changed_badges.extend(batch.changed);
                week_rows.push(week_progress);
                week_rows.push(next);
                notification = Some(note);
            }
            WeekEvaluation::PhaseAdvanced {
                next_week,
                next_phase,
                notification: note,
            } => {
                self.close_week(&mut stats, &mut week_progress, previous_week.as_ref());
                let next = self.open_next_week(&week_progress);
                stats.current_week = next_week;
                plan_update = Some(PlanUpdate {
                    plan_id: plan.id,
                    current_week: next_week,
                    current_phase: next_phase,
                    status: PlanStatus::Active,
                });
                let batch = self.feed_trigger(
                    stats.user_id,
                    &mut badges,
                    BadgeTrigger::WeekCompleted,
                    &BadgeFeed::Increment(1),
                    now,
                );
                badge_xp += batch.xp;
                stats.total_badges_earned += batch.awarded;
                changed_badges.extend(batch.changed);
                week_rows.push(week_progress);
                week_rows.push(next);
                notification = Some(note);
            }
            WeekEvaluation::ProgramComplete {
                notification: note,
            } => {
                self.close_week(&mut stats, &mut week_progress, previous_week.as_ref());
                // Week and phase freeze at their final values.
                plan_update = Some(PlanUpdate {
                    plan_id: plan.id,
                    current_week: plan.current_week,
                    current_phase: plan.current_phase,
                    status: PlanStatus::Archived,
                });
                let batch = self.feed_trigger(
                    stats.user_id,
                    &mut badges,
                    BadgeTrigger::WeekCompleted,
                    &BadgeFeed::Increment(1),
                    now,
                );
                badge_xp += batch.xp;
                stats.total_badges_earned += batch.awarded;
                changed_badges.extend(batch.changed);
                week_rows.push(week_progress);
                notification = Some(note);
            }
        }

        stats.grant_xp(badge_xp, now);
        let leveled_up = stats.level > level_before;

        AppLogger::log_xp_grant(
            stats.user_id,
            session_xp,
            badge_xp,
            stats.total_xp,
            stats.level,
            leveled_up,
        );
        if let Some(advance) = &plan_update {
            AppLogger::log_plan_advancement(
                stats.user_id,
                advance.current_week,
                advance.current_phase,
                advance.status == PlanStatus::Archived,
            );
        }

        Ok(WorkoutOutcome {
            update: ProgressionUpdate {
                stats,
                badges: changed_badges,
                plan: plan_update,
                week_progress: week_rows,
                session: Some(session),
                notification,
            },
            session_xp,
            badge_xp,
            leveled_up,
        })
    }

    /// Close the current week: score it against the previous one and fold
    /// the percent into the stats roll-ups
    fn close_week(
        &self,
        stats: &mut UserStats,
        week: &mut WeekProgress,
        previous: Option<&WeekProgress>,
    ) {
        let current_score = self.scorer.score(week);
        let previous_score = previous.map(|p| self.scorer.score(p));
        week.x_percent_better = weekly::percent_better(current_score, previous_score);
        stats.record_week_percent(week.x_percent_better, week.week_number);
    }

    fn open_next_week(&self, closed: &WeekProgress) -> WeekProgress {
        let mut next = closed.next_week();
        next.step_goal_days_total = self.config.step_goal_days_per_week;
        next
    }

    /// Feed one trigger through every catalog badge it applies to
    fn feed_trigger(
        &self,
        user_id: Uuid,
        owned: &mut Vec<Badge>,
        trigger: BadgeTrigger,
        feed: &BadgeFeed,
        now: DateTime<Utc>,
    ) -> BadgeBatch {
        let mut batch = BadgeBatch {
            xp: 0,
            awarded: 0,
            changed: Vec::new(),
        };

        for definition in self.catalog.triggered_by(trigger) {
            let progress_before = owned
                .iter()
                .find(|b| b.badge_key == definition.key)
                .map_or(0, |b| b.progress_current);
            let increment = match *feed {
                BadgeFeed::Increment(amount) => amount,
                BadgeFeed::RaiseTo(target) => target.saturating_sub(progress_before),
            };
            if increment == 0 {
                continue;
            }

            match badges::record_progress(owned, definition, increment, now) {
                BadgeOutcome::Awarded(badge) => {
                    AppLogger::log_badge_award(user_id, &badge.badge_key, badge.xp_earned);
                    batch.xp += u64::from(badge.xp_earned);
                    batch.awarded += 1;
                    upsert_badge(owned, badge.clone());
                    batch.changed.push(badge);
                }
                BadgeOutcome::Progressed(badge) => {
                    upsert_badge(owned, badge.clone());
                    batch.changed.push(badge);
                }
                BadgeOutcome::AlreadyEarned => {}
            }
        }
        batch
    }
}

fn upsert_badge(owned: &mut Vec<Badge>, badge: Badge) {
    if let Some(slot) = owned.iter_mut().find(|b| b.badge_key == badge.badge_key) {
        *slot = badge;
    } else {
        owned.push(badge);
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, clippy::panic)]

    use super::*;
    use crate::models::{Exercise, Milestone, PlanDocument, ScheduleDay, WeekRange, WeeklySchedule};

    fn exercise(name: &str) -> Exercise {
        Exercise {
            exercise: name.to_owned(),
            sets: 3,
            reps: "8-10".to_owned(),
            rest_seconds: Some(60),
            notes: None,
        }
    }

    fn sample_plan(user_id: Uuid, current_week: u32) -> Plan {
        Plan {
            id: Uuid::new_v4(),
            user_id,
            status: PlanStatus::Active,
            version: 1,
            current_week,
            current_phase: 1,
            created_at: Utc::now(),
            document: PlanDocument {
                milestones: vec![
                    Milestone {
                        week_range: WeekRange { start: 1, end: 4 },
                        title: "Foundation".to_owned(),
                        focus: vec![],
                    },
                    Milestone {
                        week_range: WeekRange { start: 5, end: 8 },
                        title: "Build".to_owned(),
                        focus: vec![],
                    },
                ],
                weekly_plan: WeeklySchedule {
                    program_length_weeks: 8,
                    days_per_week: Some(2),
                    session_length_minutes: Some(45),
                    schedule: vec![
                        ScheduleDay {
                            day_label: "Day 1".to_owned(),
                            session_focus: "Push".to_owned(),
                            workout: vec![exercise("Bench Press")],
                        },
                        ScheduleDay {
                            day_label: "Day 2".to_owned(),
                            session_focus: "Pull".to_owned(),
                            workout: vec![exercise("Row")],
                        },
                        ScheduleDay {
                            day_label: "Rest".to_owned(),
                            session_focus: "Recovery".to_owned(),
                            workout: vec![],
                        },
                    ],
                },
            },
        }
    }

    fn snapshot_for(plan: &Plan, workout_day: &str, now: DateTime<Utc>) -> WorkoutSnapshot {
        let user_id = plan.user_id;
        let mut session =
            WorkoutSession::start(user_id, plan.id, workout_day, plan.current_week, 4, now);
        session.record_completed_exercises(4);
        WorkoutSnapshot {
            stats: UserStats::new(user_id, plan.current_week, now),
            plan: plan.clone(),
            session,
            week_progress: WeekProgress::opening(plan.current_week, now.date_naive(), 2),
            previous_week: None,
            completed_day_labels: HashSet::new(),
            badges: Vec::new(),
        }
    }

    #[test]
    fn initialization_grants_starting_xp_and_the_starter_badge() {
        let engine = ProgressionEngine::new();
        let user_id = Uuid::new_v4();
        let plan = sample_plan(user_id, 1);

        let outcome = engine
            .initialize(user_id, None, &plan, Utc::now())
            .unwrap();
        let InitializationOutcome::Initialized { update } = outcome else {
            panic!("expected first-time initialization");
        };

        // 100 starting XP + 100 badge XP puts the user exactly at level 2.
        assert_eq!(update.stats.total_xp, 200);
        assert_eq!(update.stats.level, 2);
        assert_eq!(update.stats.total_badges_earned, 1);
        assert_eq!(update.badges.len(), 1);
        assert_eq!(update.badges[0].badge_key, "journey_begins");
        assert!(update.badges[0].earned());
        assert_eq!(update.week_progress.len(), 1);
        assert_eq!(update.week_progress[0].week_number, 1);
        assert_eq!(update.week_progress[0].workouts_planned, 2);
    }

    #[test]
    fn initialization_is_idempotent() {
        let engine = ProgressionEngine::new();
        let user_id = Uuid::new_v4();
        let plan = sample_plan(user_id, 1);
        let existing = UserStats::new(user_id, 1, Utc::now());

        let outcome = engine
            .initialize(user_id, Some(&existing), &plan, Utc::now())
            .unwrap();
        assert_eq!(
            outcome,
            InitializationOutcome::AlreadyInitialized { stats: existing }
        );
    }

    #[test]
    fn finishing_a_mid_week_workout_grants_xp_without_advancing() {
        let engine = ProgressionEngine::new();
        let user_id = Uuid::new_v4();
        let plan = sample_plan(user_id, 2);
        let now = Utc::now();

        let outcome = engine
            .complete_workout(snapshot_for(&plan, "Day 1", now), now)
            .unwrap();

        assert_eq!(outcome.session_xp, 50);
        assert!(outcome.update.plan.is_none());
        assert!(outcome.update.notification.is_none());
        assert_eq!(outcome.update.week_progress.len(), 1);
        assert_eq!(outcome.update.week_progress[0].workouts_completed, 1);
        assert_eq!(outcome.update.stats.current_streak_days, 1);
    }

    #[test]
    fn finishing_the_last_workout_day_advances_the_week() {
        let engine = ProgressionEngine::new();
        let user_id = Uuid::new_v4();
        let plan = sample_plan(user_id, 2);
        let now = Utc::now();

        let mut snapshot = snapshot_for(&plan, "Day 2", now);
        snapshot.completed_day_labels.insert("Day 1".to_owned());
        snapshot.week_progress.workouts_completed = 1;

        let outcome = engine.complete_workout(snapshot, now).unwrap();

        let plan_update = outcome.update.plan.unwrap();
        assert_eq!(plan_update.current_week, 3);
        assert_eq!(plan_update.current_phase, 1);
        assert_eq!(plan_update.status, PlanStatus::Active);
        assert_eq!(outcome.update.stats.current_week, 3);
        // Closed week plus the freshly opened week 3 row.
        assert_eq!(outcome.update.week_progress.len(), 2);
        assert_eq!(outcome.update.week_progress[1].week_number, 3);
        assert_eq!(
            outcome.update.notification.unwrap().kind,
            advancement::NotificationKind::WeekComplete
        );
    }

    #[test]
    fn finishing_the_final_program_week_archives_the_plan() {
        let engine = ProgressionEngine::new();
        let user_id = Uuid::new_v4();
        let plan = sample_plan(user_id, 8);
        let now = Utc::now();

        let mut snapshot = snapshot_for(&plan, "Day 2", now);
        snapshot.completed_day_labels.insert("Day 1".to_owned());

        let outcome = engine.complete_workout(snapshot, now).unwrap();

        let plan_update = outcome.update.plan.unwrap();
        assert_eq!(plan_update.status, PlanStatus::Archived);
        assert_eq!(plan_update.current_week, 8);
        assert_eq!(plan_update.current_phase, 1);
        // No new week opens after the program ends.
        assert_eq!(outcome.update.week_progress.len(), 1);
    }

    #[test]
    fn sessions_from_another_plan_are_rejected() {
        let engine = ProgressionEngine::new();
        let user_id = Uuid::new_v4();
        let plan = sample_plan(user_id, 2);
        let now = Utc::now();

        let mut snapshot = snapshot_for(&plan, "Day 1", now);
        snapshot.session.plan_id = Uuid::new_v4();

        assert!(engine.complete_workout(snapshot, now).is_err());
    }

    #[test]
    fn archived_plans_do_not_accept_workouts() {
        let engine = ProgressionEngine::new();
        let user_id = Uuid::new_v4();
        let mut plan = sample_plan(user_id, 2);
        plan.status = PlanStatus::Archived;
        let now = Utc::now();

        let snapshot = snapshot_for(&plan, "Day 1", now);
        assert!(engine.complete_workout(snapshot, now).is_err());
    }
}
