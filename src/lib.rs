// ABOUTME: Main library entry point for the LevelFit progression engine
// ABOUTME: Pure progression core plus persistence gateway trait and orchestration service
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 LevelFit

#![deny(unsafe_code)]

//! # LevelFit Progression Engine
//!
//! The progression core of an AI-coached consumer fitness application:
//! XP accrual and level derivation, badge progress and awarding, weekly
//! percent-better aggregation, and training-plan milestone/phase
//! advancement.
//!
//! The engine itself is pure: it consumes state snapshots (user stats,
//! the active plan, week progress, completed sessions) and produces new
//! snapshots bundled into a single write instruction. All I/O lives
//! behind the [`gateway::ProgressionGateway`] trait and is orchestrated
//! by [`service::ProgressionService`].
//!
//! ## Architecture
//!
//! - **Models**: typed records for stats, badges, plans, and sessions
//! - **Engine**: pure computation over snapshots (no I/O, no clocks)
//! - **Gateway**: async persistence abstraction with an in-memory backend
//! - **Service**: read snapshot → compute → one atomic write, per event
//!
//! ## Example
//!
//! ```rust,no_run
//! use levelfit_engine::engine::leveling;
//!
//! let progress = leveling::progress_for_xp(200);
//! println!(
//!     "level {} - {}/{} XP into level",
//!     progress.level, progress.xp_into_level, progress.xp_for_next_level
//! );
//! ```

/// Engine and badge-catalog configuration with environment overrides
pub mod config;

/// Application-wide constants (XP curve, badges, schedule defaults)
pub mod constants;

/// Pure progression computation: leveling, badges, weekly scoring, advancement
pub mod engine;

/// Unified error handling: `AppError`, `ErrorCode`, `AppResult`
pub mod errors;

/// Persistence gateway abstraction and the in-memory backend
pub mod gateway;

/// Structured logging configuration and event helpers
pub mod logging;

/// Typed data records shared by the engine and its collaborators
pub mod models;

/// Orchestration layer owning all I/O around the pure engine
pub mod service;
