// ABOUTME: Async service layer tying the pure engine to the gateway
// ABOUTME: Serializes writers per user so concurrent finishes cannot interleave stale state
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 LevelFit

//! Progression service
//!
//! Host applications call this layer. Each operation loads the state
//! slice it needs, runs the pure engine, and applies the resulting
//! update through the gateway. A per-user async mutex serializes
//! read-compute-apply cycles, so two concurrent workout finishes for
//! the same user always observe each other's effects.

use std::collections::HashSet;
use std::sync::Arc;

use chrono::Utc;
use dashmap::DashMap;
use tokio::sync::Mutex;
use tracing::instrument;
use uuid::Uuid;

use crate::engine::advancement::ProgressionNotification;
use crate::engine::leveling::{self, LevelProgress};
use crate::engine::weekly::{self, ConsistencyScorer, WeeklyScorer};
use crate::engine::{InitializationOutcome, ProgressionEngine, WorkoutSnapshot};
use crate::errors::{AppError, AppResult};
use crate::gateway::ProgressionGateway;
use crate::models::{Badge, Plan, UserStats, WeekProgress, WorkoutSession};

/// What a finished workout amounted to, for the caller's UI
#[derive(Debug, Clone)]
pub struct WorkoutSummary {
    /// XP granted for the session itself
    pub session_xp: u32,
    /// XP granted by badges awarded along the way
    pub badge_xp: u64,
    /// Whether the grant crossed a level boundary
    pub leveled_up: bool,
    /// Stats row after the operation
    pub stats: UserStats,
    /// Badges newly awarded by this workout
    pub badges_awarded: Vec<Badge>,
    /// Congratulation to surface, when a transition fired
    pub notification: Option<ProgressionNotification>,
}

/// Live view of the current plan week, for dashboards
#[derive(Debug, Clone)]
pub struct WeeklySummary {
    /// Progress row of the current plan week
    pub week: WeekProgress,
    /// Closed row of the previous week, if any
    pub previous_week: Option<WeekProgress>,
    /// The scorer's aggregate for the current week as it stands
    pub score: f64,
    /// Percent-better of the current score against the previous week
    pub percent_better: f64,
}

/// The progression service
pub struct ProgressionService<G: ProgressionGateway, S: WeeklyScorer = ConsistencyScorer> {
    gateway: Arc<G>,
    engine: ProgressionEngine<S>,
    user_locks: DashMap<Uuid, Arc<Mutex<()>>>,
}

impl<G: ProgressionGateway> ProgressionService<G> {
    /// Service with the default engine
    #[must_use]
    pub fn new(gateway: Arc<G>) -> Self {
        Self {
            gateway,
            engine: ProgressionEngine::new(),
            user_locks: DashMap::new(),
        }
    }
}

impl<G: ProgressionGateway, S: WeeklyScorer> ProgressionService<G, S> {
    /// Service with an explicit engine
    #[must_use]
    pub fn with_engine(gateway: Arc<G>, engine: ProgressionEngine<S>) -> Self {
        Self {
            gateway,
            engine,
            user_locks: DashMap::new(),
        }
    }

    /// Shared handle to the underlying gateway
    #[must_use]
    pub fn gateway(&self) -> Arc<G> {
        Arc::clone(&self.gateway)
    }

    fn user_lock(&self, user_id: Uuid) -> Arc<Mutex<()>> {
        self.user_locks
            .entry(user_id)
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone()
    }

    async fn require_plan(&self, user_id: Uuid) -> AppResult<Plan> {
        self.gateway
            .active_plan(user_id)
            .await?
            .ok_or_else(|| AppError::not_found("no active plan").with_user_id(user_id))
    }

    async fn require_session(
        &self,
        user_id: Uuid,
        session_id: Uuid,
    ) -> AppResult<WorkoutSession> {
        self.gateway.session(user_id, session_id).await?.ok_or_else(|| {
            AppError::not_found("workout session not found")
                .with_user_id(user_id)
                .with_resource_id(session_id.to_string())
        })
    }

    /// Run first-time initialization against the user's active plan
    ///
    /// Safe to call from a retried signup flow; see
    /// [`ProgressionEngine::initialize`].
    ///
    /// # Errors
    ///
    /// Returns `ResourceNotFound` without an active plan, `InvalidState`
    /// for a malformed plan document, and `StorageError` on gateway
    /// failures.
    #[instrument(skip(self))]
    pub async fn initialize_user(&self, user_id: Uuid) -> AppResult<InitializationOutcome> {
        let lock = self.user_lock(user_id);
        let _guard = lock.lock().await;

        let existing = self.gateway.user_stats(user_id).await?;
        let plan = self.require_plan(user_id).await?;

        let outcome = self
            .engine
            .initialize(user_id, existing.as_ref(), &plan, Utc::now())?;
        if let InitializationOutcome::Initialized { update } = &outcome {
            self.gateway.apply(user_id, update).await?;
        }
        Ok(outcome)
    }

    /// Start a workout session against a schedule day of the active plan
    ///
    /// # Errors
    ///
    /// Returns `ResourceNotFound` when the day label is not in the
    /// schedule and `InvalidInput` when it names a rest day.
    #[instrument(skip(self))]
    pub async fn start_workout(
        &self,
        user_id: Uuid,
        day_label: &str,
    ) -> AppResult<WorkoutSession> {
        let plan = self.require_plan(user_id).await?;

        let day = plan.document.schedule_day(day_label).ok_or_else(|| {
            AppError::not_found(format!("schedule day '{day_label}' not found"))
                .with_user_id(user_id)
                .with_resource_id(plan.id.to_string())
        })?;
        if day.is_rest_day() {
            return Err(AppError::invalid_input(format!(
                "'{day_label}' is a rest day, nothing to start"
            ))
            .with_user_id(user_id));
        }

        let session = WorkoutSession::start(
            user_id,
            plan.id,
            day_label,
            plan.current_week,
            day.workout.len() as u32,
            Utc::now(),
        );
        self.gateway.save_session(&session).await?;
        Ok(session)
    }

    /// Pause a running session
    ///
    /// # Errors
    ///
    /// Returns `ResourceNotFound` for an unknown session and
    /// `InvalidState` unless it is in progress.
    #[instrument(skip(self))]
    pub async fn pause_workout(&self, user_id: Uuid, session_id: Uuid) -> AppResult<()> {
        let mut session = self.require_session(user_id, session_id).await?;
        session.pause()?;
        self.gateway.save_session(&session).await?;
        Ok(())
    }

    /// Resume a paused session
    ///
    /// # Errors
    ///
    /// Returns `ResourceNotFound` for an unknown session and
    /// `InvalidState` unless it is paused.
    #[instrument(skip(self))]
    pub async fn resume_workout(&self, user_id: Uuid, session_id: Uuid) -> AppResult<()> {
        let mut session = self.require_session(user_id, session_id).await?;
        session.resume()?;
        self.gateway.save_session(&session).await?;
        Ok(())
    }

    /// Finish a session and run the full progression flow
    ///
    /// # Errors
    ///
    /// Returns `ResourceNotFound` when the user, plan, or session is
    /// missing, `InvalidState` when the session is already finalized or
    /// the plan inactive, and `StorageError` on gateway failures.
    #[instrument(skip(self))]
    pub async fn finish_workout(
        &self,
        user_id: Uuid,
        session_id: Uuid,
        completed_exercises: u32,
    ) -> AppResult<WorkoutSummary> {
        let lock = self.user_lock(user_id);
        let _guard = lock.lock().await;

        let stats = self.gateway.user_stats(user_id).await?.ok_or_else(|| {
            AppError::not_found("progression stats not initialized")
                .with_user_id(user_id)
        })?;
        let plan = self.require_plan(user_id).await?;
        let mut session = self.require_session(user_id, session_id).await?;
        session.record_completed_exercises(completed_exercises);

        let now = Utc::now();
        // Self-heal a missing week row rather than stranding the user.
        let week_progress = self
            .gateway
            .week_progress(user_id, plan.current_week)
            .await?
            .unwrap_or_else(|| {
                WeekProgress::opening(
                    plan.current_week,
                    now.date_naive(),
                    plan.document.workout_day_count(),
                )
            });
        let previous_week = if plan.current_week > 1 {
            self.gateway
                .week_progress(user_id, plan.current_week - 1)
                .await?
        } else {
            None
        };
        let mut completed_day_labels: HashSet<String> = self
            .gateway
            .completed_day_labels(user_id, plan.id, plan.current_week)
            .await?;
        // The session being finished must not pre-satisfy its own day.
        completed_day_labels.remove(&session.workout_day);

        let outcome = self.engine.complete_workout(
            WorkoutSnapshot {
                stats,
                plan,
                session,
                week_progress,
                previous_week,
                completed_day_labels,
                badges: self.gateway.badges(user_id).await?,
            },
            now,
        )?;
        self.gateway.apply(user_id, &outcome.update).await?;

        let badges_awarded = outcome
            .update
            .badges
            .iter()
            .filter(|b| b.earned())
            .cloned()
            .collect();
        Ok(WorkoutSummary {
            session_xp: outcome.session_xp,
            badge_xp: outcome.badge_xp,
            leveled_up: outcome.leveled_up,
            stats: outcome.update.stats,
            badges_awarded,
            notification: outcome.update.notification,
        })
    }

    /// Live summary of the current plan week against the previous one
    ///
    /// Read-only: the percent-better here is the scorer's view of the
    /// week as it stands, not the value frozen when the week closes.
    ///
    /// # Errors
    ///
    /// Returns `ResourceNotFound` without an active plan or when the
    /// current week has no progress row yet.
    #[instrument(skip(self))]
    pub async fn weekly_summary(&self, user_id: Uuid) -> AppResult<WeeklySummary> {
        let plan = self.require_plan(user_id).await?;
        let week = self
            .gateway
            .week_progress(user_id, plan.current_week)
            .await?
            .ok_or_else(|| {
                AppError::not_found(format!(
                    "progress row for week {}",
                    plan.current_week
                ))
                .with_user_id(user_id)
            })?;
        let previous_week = if plan.current_week > 1 {
            self.gateway
                .week_progress(user_id, plan.current_week - 1)
                .await?
        } else {
            None
        };

        let score = self.engine.score_week(&week);
        let previous_score = previous_week.as_ref().map(|w| self.engine.score_week(w));
        Ok(WeeklySummary {
            week,
            previous_week,
            score,
            percent_better: weekly::percent_better(score, previous_score),
        })
    }

    /// Level progress decomposition for the user's current XP total
    ///
    /// # Errors
    ///
    /// Returns `ResourceNotFound` before initialization.
    #[instrument(skip(self))]
    pub async fn level_progress(&self, user_id: Uuid) -> AppResult<LevelProgress> {
        let stats = self.gateway.user_stats(user_id).await?.ok_or_else(|| {
            AppError::not_found("progression stats not initialized")
                .with_user_id(user_id)
        })?;
        Ok(leveling::progress_for_xp(stats.total_xp))
    }
}
