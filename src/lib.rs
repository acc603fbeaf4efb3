//! Lifequest - discovery and scoring engine for a gamified journal

pub mod core;
pub mod discovery;
pub mod engine;
pub mod host;
pub mod llm;
pub mod scoring;
pub mod skills;

pub use engine::{AnswerOutcome, Engine, JournalOutcome};
