// ABOUTME: Week and phase advancement state machine over a plan's milestone timeline
// ABOUTME: Rest days never count toward a week's denominator; bad milestone data degrades, never blocks
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 LevelFit

//! Plan advancement
//!
//! Evaluates whether a plan week is complete and, if so, which of the
//! three transitions applies: plain week advance, phase boundary, or
//! program completion. Only schedule days that carry exercises count;
//! evaluation is set-based over day labels, so repeating the same day
//! can never satisfy a different one.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::models::Plan;

/// Category of a progression notification
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum NotificationKind {
    /// A week finished and the next one in the same phase opened
    WeekComplete,
    /// A week finished on a milestone boundary
    PhaseComplete,
    /// The final program week finished
    ProgramComplete,
}

/// User-facing congratulation emitted on a transition
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ProgressionNotification {
    /// Notification category
    pub kind: NotificationKind,
    /// Short headline
    pub title: String,
    /// Body copy
    pub message: String,
}

/// Outcome of evaluating the current plan week
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WeekEvaluation {
    /// Not all workout days are done yet; no state changes
    Incomplete {
        /// Distinct workout days completed so far
        completed: u32,
        /// Workout days the week requires
        required: u32,
    },
    /// Week done, next week stays inside the current phase
    WeekAdvanced {
        /// Week the plan moves to
        next_week: u32,
        /// Congratulation to surface
        notification: ProgressionNotification,
    },
    /// Week done and it closed a milestone
    PhaseAdvanced {
        /// Week the plan moves to
        next_week: u32,
        /// Phase the plan moves to (1-based milestone ordinal)
        next_phase: u32,
        /// Congratulation to surface
        notification: ProgressionNotification,
    },
    /// The final program week is done; week and phase stay frozen
    ProgramComplete {
        /// Congratulation to surface
        notification: ProgressionNotification,
    },
}

/// Evaluate the plan's current week against the set of completed day labels
///
/// `completed_day_labels` holds the distinct schedule-day labels with a
/// completed session this week. Labels that are not workout days in the
/// schedule (rest days, stale labels from an older plan version) are
/// ignored, so schedule edits cannot leave a week permanently satisfied
/// by days that no longer exist.
#[must_use]
pub fn evaluate_week(plan: &Plan, completed_day_labels: &HashSet<String>) -> WeekEvaluation {
    let workout_days = plan.document.workout_day_labels();
    let required = workout_days.len() as u32;
    let completed = completed_day_labels
        .iter()
        .filter(|label| workout_days.contains(label.as_str()))
        .count() as u32;

    // A week with zero workout days can never self-complete; advancing
    // it is a manual/administrative action, not an engine transition.
    if required == 0 || completed < required {
        return WeekEvaluation::Incomplete {
            completed,
            required,
        };
    }

    let week = plan.current_week;
    let total_weeks = plan.document.total_program_weeks();

    if total_weeks > 0 && week >= total_weeks {
        return WeekEvaluation::ProgramComplete {
            notification: ProgressionNotification {
                kind: NotificationKind::ProgramComplete,
                title: "Program Complete!".to_owned(),
                message: format!(
                    "You finished all {total_weeks} weeks of your program. Incredible work!"
                ),
            },
        };
    }

    let next_week = week + 1;

    // Positional rule: a phase ends when the current week is the final
    // week of its containing milestone, and the next phase is the next
    // milestone by list position. Weeks not covered by any milestone
    // degrade to plain week advancement rather than blocking the user.
    if let Some((idx, milestone)) = plan
        .document
        .milestone_for_week(week)
        .filter(|(_, m)| m.week_range.end == week)
    {
        let next_phase = plan.current_phase + 1;
        // Milestone titles degrade to generic phase labels when absent.
        let next_title = plan
            .document
            .milestones
            .get(idx + 1)
            .map_or_else(|| format!("Phase {next_phase}"), |m| m.title.clone());
        return WeekEvaluation::PhaseAdvanced {
            next_week,
            next_phase,
            notification: ProgressionNotification {
                kind: NotificationKind::PhaseComplete,
                title: "Phase Complete!".to_owned(),
                message: format!("{} complete. Next up: {next_title}.", milestone.title),
            },
        };
    }

    WeekEvaluation::WeekAdvanced {
        next_week,
        notification: ProgressionNotification {
            kind: NotificationKind::WeekComplete,
            title: "Week Complete!".to_owned(),
            message: format!("Week {week} is in the books. Week {next_week} starts now."),
        },
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, clippy::panic)]

    use super::*;
    use crate::models::{
        Exercise, Milestone, Plan, PlanDocument, PlanStatus, ScheduleDay, WeekRange,
        WeeklySchedule,
    };
    use chrono::Utc;
    use uuid::Uuid;

    fn exercise(name: &str) -> Exercise {
        Exercise {
            exercise: name.to_owned(),
            sets: 3,
            reps: "10".to_owned(),
            rest_seconds: Some(60),
            notes: None,
        }
    }

    fn day(label: &str, exercises: Vec<Exercise>) -> ScheduleDay {
        ScheduleDay {
            day_label: label.to_owned(),
            session_focus: "Strength".to_owned(),
            workout: exercises,
        }
    }

    fn plan_with(current_week: u32, current_phase: u32) -> Plan {
        let document = PlanDocument {
            milestones: vec![
                Milestone {
                    week_range: WeekRange { start: 1, end: 4 },
                    title: "Foundation".to_owned(),
                    focus: vec!["form".to_owned()],
                },
                Milestone {
                    week_range: WeekRange { start: 5, end: 8 },
                    title: "Build".to_owned(),
                    focus: vec!["volume".to_owned()],
                },
            ],
            weekly_plan: WeeklySchedule {
                program_length_weeks: 8,
                days_per_week: Some(4),
                session_length_minutes: Some(45),
                schedule: vec![
                    day("Day 1", vec![exercise("Squat")]),
                    day("Day 2", vec![exercise("Bench Press")]),
                    day("Day 3", vec![]),
                    day("Day 4", vec![exercise("Deadlift")]),
                    day("Day 5", vec![exercise("Overhead Press")]),
                ],
            },
        };
        Plan {
            id: Uuid::new_v4(),
            user_id: Uuid::new_v4(),
            status: PlanStatus::Active,
            version: 1,
            current_week,
            current_phase,
            created_at: Utc::now(),
            document,
        }
    }

    fn labels(days: &[&str]) -> HashSet<String> {
        days.iter().map(|d| (*d).to_owned()).collect()
    }

    #[test]
    fn partial_week_is_incomplete() {
        let plan = plan_with(2, 1);
        let evaluation = evaluate_week(&plan, &labels(&["Day 1", "Day 2", "Day 4"]));
        assert_eq!(
            evaluation,
            WeekEvaluation::Incomplete {
                completed: 3,
                required: 4
            }
        );
    }

    #[test]
    fn rest_days_never_count_toward_completion() {
        let plan = plan_with(2, 1);
        // Day 3 is a rest day; with it the label set has 4 entries but
        // only 3 workout days are covered.
        let evaluation = evaluate_week(&plan, &labels(&["Day 1", "Day 2", "Day 3", "Day 4"]));
        assert_eq!(
            evaluation,
            WeekEvaluation::Incomplete {
                completed: 3,
                required: 4
            }
        );
    }

    #[test]
    fn mid_phase_week_advances_within_the_phase() {
        let plan = plan_with(2, 1);
        let evaluation = evaluate_week(&plan, &labels(&["Day 1", "Day 2", "Day 4", "Day 5"]));
        let WeekEvaluation::WeekAdvanced {
            next_week,
            notification,
        } = evaluation
        else {
            panic!("expected week advancement");
        };
        assert_eq!(next_week, 3);
        assert_eq!(notification.kind, NotificationKind::WeekComplete);
    }

    #[test]
    fn milestone_boundary_advances_the_phase() {
        let plan = plan_with(4, 1);
        let evaluation = evaluate_week(&plan, &labels(&["Day 1", "Day 2", "Day 4", "Day 5"]));
        let WeekEvaluation::PhaseAdvanced {
            next_week,
            next_phase,
            notification,
        } = evaluation
        else {
            panic!("expected phase advancement");
        };
        assert_eq!(next_week, 5);
        assert_eq!(next_phase, 2);
        assert_eq!(notification.kind, NotificationKind::PhaseComplete);
        assert!(notification.message.contains("Build"));
    }

    #[test]
    fn final_week_completes_the_program() {
        let plan = plan_with(8, 2);
        let evaluation = evaluate_week(&plan, &labels(&["Day 1", "Day 2", "Day 4", "Day 5"]));
        let WeekEvaluation::ProgramComplete { notification } = evaluation else {
            panic!("expected program completion");
        };
        assert_eq!(notification.kind, NotificationKind::ProgramComplete);
    }

    #[test]
    fn unknown_labels_are_ignored() {
        let plan = plan_with(2, 1);
        let evaluation = evaluate_week(&plan, &labels(&["Day 9", "Leg Day"]));
        assert_eq!(
            evaluation,
            WeekEvaluation::Incomplete {
                completed: 0,
                required: 4
            }
        );
    }

    #[test]
    fn gapped_milestone_list_still_advances_the_phase_at_its_end_week() {
        let mut plan = plan_with(4, 1);
        // Week 5 is covered by no milestone; the boundary is keyed off
        // the containing milestone's own end week, not the next week's
        // coverage.
        plan.document.milestones[1].week_range = WeekRange { start: 6, end: 8 };
        let evaluation = evaluate_week(&plan, &labels(&["Day 1", "Day 2", "Day 4", "Day 5"]));
        let WeekEvaluation::PhaseAdvanced {
            next_week,
            next_phase,
            notification,
        } = evaluation
        else {
            panic!("expected phase advancement");
        };
        assert_eq!(next_week, 5);
        assert_eq!(next_phase, 2);
        assert!(notification.message.contains("Build"));
    }

    #[test]
    fn missing_milestones_degrade_to_week_advancement() {
        let mut plan = plan_with(4, 1);
        plan.document.milestones.clear();
        let evaluation = evaluate_week(&plan, &labels(&["Day 1", "Day 2", "Day 4", "Day 5"]));
        assert!(matches!(
            evaluation,
            WeekEvaluation::WeekAdvanced { next_week: 5, .. }
        ));
    }

    #[test]
    fn all_rest_weeks_never_self_complete() {
        let mut plan = plan_with(2, 1);
        for d in &mut plan.document.weekly_plan.schedule {
            d.workout.clear();
        }
        let evaluation = evaluate_week(&plan, &HashSet::new());
        assert_eq!(
            evaluation,
            WeekEvaluation::Incomplete {
                completed: 0,
                required: 0
            }
        );
    }
}
