//! # StudyMate Common Library
//!
//! Shared code for the StudyMate tools:
//! - Boss progress engine (damage, passive healing, level-up chaining)
//! - Similarity matcher for "asked this before" recall
//! - Focus-session log and daily statistics
//! - SQLite persistence for progress, chat history and sessions
//! - Configuration loading and data folder resolution

pub mod boss;
pub mod config;
pub mod db;
pub mod error;
pub mod focus_log;
pub mod progress;
pub mod service;
pub mod similarity;
pub mod time;

pub use boss::{boss_info, BossDefinition};
pub use error::{Error, Result};
pub use progress::{apply_session, peek_state, EngineResult, ProgressState};
pub use similarity::{find_similar, similarity, HistoryEntry, RecallSettings, SessionKind};
pub use time::{Clock, SystemClock};
