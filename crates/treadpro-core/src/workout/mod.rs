pub mod engine;
mod runner;
mod session;
mod summary;

pub use engine::{RunSnapshot, RunState, RunStatus, WorkoutEngine};
pub use runner::{WorkoutRunner, DEFAULT_TICK_INTERVAL};
pub use session::{ProfilePoint, Segment, Session, MAX_INCLINE, MAX_SPEED, MIN_SEGMENTS};
pub use summary::WorkoutSummary;
