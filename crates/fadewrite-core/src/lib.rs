//! # fadewrite Core Library
//!
//! This library provides the core logic for fadewrite, a writing exercise
//! that fades and then erases the text once the writer stops typing. The
//! `fadewrite` binary is a thin terminal layer over the same library.
//!
//! ## Architecture
//!
//! - **Timer Service**: one-shot and repeating callbacks plus a clock, either
//!   virtual ([`ManualTimers`]) or on tokio ([`TokioTimers`])
//! - **Decay Engine**: a wall-clock-based state machine
//!   (`Idle -> Grace -> Decaying`) that derives every visual value from
//!   elapsed time and fires the single destructive event at the deadline
//! - **Writing Session**: start/activity/reset over one buffer; archives long
//!   enough buffers before they are wiped
//! - **Storage**: SQLite history and key-value drafts, TOML configuration
//!
//! ## Key Components
//!
//! - [`DecayEngine`]: Core decay state machine
//! - [`WritingSession`]: Session controller
//! - [`Presenter`]: Rendering contract
//! - [`Database`]: History and draft persistence
//! - [`Config`]: Application configuration management

pub mod decay;
pub mod driver;
pub mod error;
pub mod events;
pub mod present;
pub mod session;
pub mod simulation;
pub mod storage;
pub mod timer;

pub use decay::{DecayEngine, DecayOutput, DecayPhase, Easing, TimeoutSeconds};
pub use driver::{drive, DriveSummary, Input};
pub use error::{ConfigError, CoreError, PersistenceError, SessionError};
pub use events::{Command, Event};
pub use present::{DecayFrame, Presenter};
pub use session::{word_count, Session, WritingSession};
pub use simulation::{Simulation, SimulationReport, Step};
pub use storage::{Archive, Config, Database, Draft, HistoryEntry, KvStore, MemoryStore};
pub use timer::{ManualTimers, TimerService, TokioTimers, Wakeup};
