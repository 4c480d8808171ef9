//! # TreadPro Core Library
//!
//! This library provides the core logic of the TreadPro treadmill workout
//! companion. All operations are available through the standalone `treadpro`
//! CLI; any graphical front end is a thin layer over the same library.
//!
//! ## Architecture
//!
//! - **Workout Engine**: a logical-second state machine over a session's
//!   segments. Transitions are pure functions returning [`Signal`]s; the
//!   caller invokes `tick()` once per elapsed second
//! - **Runner**: tokio driver that ticks the engine on a wall-clock cadence
//!   and serializes user commands with the ticks
//! - **Audio**: countdown and segment-end beeps behind the [`CueNotifier`]
//!   trait
//! - **Catalog / Editor**: built-in plans and clamped authoring of custom ones
//! - **Storage**: TOML-based configuration
//!
//! ## Key Components
//!
//! - [`WorkoutEngine`]: Core timer state machine
//! - [`WorkoutRunner`]: Wall-clock driver
//! - [`SessionEditor`]: Authoring with limits
//! - [`Config`]: Application configuration management

pub mod audio;
pub mod catalog;
pub mod editor;
pub mod error;
pub mod events;
pub mod storage;
pub mod workout;

pub use audio::{Chime, CueNotifier, SilentNotifier};
pub use catalog::{custom_template, Catalog};
pub use editor::{SegmentSpec, SessionEditor};
pub use error::{ConfigError, CoreError, ValidationError};
pub use events::{Event, Signal};
pub use storage::{Config, Limits};
pub use workout::{
    RunSnapshot, RunState, RunStatus, Segment, Session, WorkoutEngine, WorkoutRunner,
    WorkoutSummary,
};
