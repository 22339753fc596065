// ABOUTME: End-to-end tests for phase boundaries and program completion
// ABOUTME: Drives a short two-phase program through the service to its archived end state
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 LevelFit

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
#![allow(missing_docs)]

use std::sync::Arc;

use chrono::Utc;
use levelfit_engine::engine::advancement::NotificationKind;
use levelfit_engine::gateway::memory::InMemoryGateway;
use levelfit_engine::gateway::ProgressionGateway;
use levelfit_engine::models::{
    Exercise, Milestone, Plan, PlanDocument, PlanStatus, ScheduleDay, WeekRange, WeeklySchedule,
};
use levelfit_engine::service::ProgressionService;
use uuid::Uuid;

fn one_day_plan(user_id: Uuid, milestones: Vec<Milestone>) -> Plan {
    Plan {
        id: Uuid::new_v4(),
        user_id,
        status: PlanStatus::Active,
        version: 1,
        current_week: 1,
        current_phase: 1,
        created_at: Utc::now(),
        document: PlanDocument {
            milestones,
            weekly_plan: WeeklySchedule {
                program_length_weeks: 2,
                days_per_week: Some(1),
                session_length_minutes: Some(30),
                schedule: vec![
                    ScheduleDay {
                        day_label: "Day 1".to_owned(),
                        session_focus: "Full body".to_owned(),
                        workout: vec![Exercise {
                            exercise: "Squat".to_owned(),
                            sets: 3,
                            reps: "5".to_owned(),
                            rest_seconds: Some(120),
                            notes: None,
                        }],
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

fn two_phase_milestones() -> Vec<Milestone> {
    vec![
        Milestone {
            week_range: WeekRange { start: 1, end: 1 },
            title: "Kickoff".to_owned(),
            focus: vec![],
        },
        Milestone {
            week_range: WeekRange { start: 2, end: 2 },
            title: "Finisher".to_owned(),
            focus: vec![],
        },
    ]
}

async fn complete_day(
    service: &ProgressionService<InMemoryGateway>,
    user_id: Uuid,
) -> levelfit_engine::service::WorkoutSummary {
    let session = service.start_workout(user_id, "Day 1").await.unwrap();
    service.finish_workout(user_id, session.id, 1).await.unwrap()
}

#[tokio::test]
async fn completing_a_milestone_boundary_week_advances_the_phase() {
    let user_id = Uuid::new_v4();
    let gateway = Arc::new(InMemoryGateway::new());
    gateway
        .seed_plan(one_day_plan(user_id, two_phase_milestones()))
        .unwrap();
    let service = ProgressionService::new(gateway);
    service.initialize_user(user_id).await.unwrap();

    let summary = complete_day(&service, user_id).await;

    let notification = summary.notification.expect("phase should complete");
    assert_eq!(notification.kind, NotificationKind::PhaseComplete);
    assert!(notification.message.contains("Finisher"));

    let plan = service.gateway().active_plan(user_id).await.unwrap().unwrap();
    assert_eq!(plan.current_week, 2);
    assert_eq!(plan.current_phase, 2);
}

#[tokio::test]
async fn completing_the_final_week_archives_the_program() {
    let user_id = Uuid::new_v4();
    let gateway = Arc::new(InMemoryGateway::new());
    gateway
        .seed_plan(one_day_plan(user_id, two_phase_milestones()))
        .unwrap();
    let service = ProgressionService::new(Arc::clone(&gateway));
    service.initialize_user(user_id).await.unwrap();

    complete_day(&service, user_id).await;
    let summary = complete_day(&service, user_id).await;

    let notification = summary.notification.expect("program should complete");
    assert_eq!(notification.kind, NotificationKind::ProgramComplete);

    // The archived plan is no longer served as active; week and phase
    // freeze at their final values.
    assert!(gateway.active_plan(user_id).await.unwrap().is_none());
    assert!(service.start_workout(user_id, "Day 1").await.is_err());

    // No week 3 row opens after the program ends.
    assert!(gateway.week_progress(user_id, 3).await.unwrap().is_none());
}

#[tokio::test]
async fn missing_milestones_degrade_to_plain_week_advancement() {
    let user_id = Uuid::new_v4();
    let gateway = Arc::new(InMemoryGateway::new());
    gateway.seed_plan(one_day_plan(user_id, vec![])).unwrap();
    let service = ProgressionService::new(Arc::clone(&gateway));
    service.initialize_user(user_id).await.unwrap();

    let summary = complete_day(&service, user_id).await;
    assert_eq!(
        summary.notification.expect("week should complete").kind,
        NotificationKind::WeekComplete
    );

    // program_length_weeks still bounds the program without milestones.
    let summary = complete_day(&service, user_id).await;
    assert_eq!(
        summary.notification.expect("program should complete").kind,
        NotificationKind::ProgramComplete
    );
}

#[tokio::test]
async fn percent_better_rolls_up_when_weeks_close() {
    let user_id = Uuid::new_v4();
    let gateway = Arc::new(InMemoryGateway::new());
    gateway
        .seed_plan(one_day_plan(user_id, two_phase_milestones()))
        .unwrap();
    let service = ProgressionService::new(Arc::clone(&gateway));
    service.initialize_user(user_id).await.unwrap();

    complete_day(&service, user_id).await;

    // Week 1 has no predecessor to compare against.
    let week1 = gateway.week_progress(user_id, 1).await.unwrap().unwrap();
    assert!(week1.x_percent_better.abs() < f64::EPSILON);

    let summary = complete_day(&service, user_id).await;
    // Identical consecutive weeks score identically: 0% better.
    assert!(summary.stats.current_x_percent.abs() < f64::EPSILON);
}
