//! Domain discovery
//!
//! The user starts with nine hidden life domains. Answering questions
//! reveals them one by one, and each answer feeds that domain's 0-100
//! score. When the core bank runs dry, the supplier asks the AI
//! collaborator for new questions aimed at the weakest domains.

pub mod domain;
pub mod fallback;
pub mod ordered_set;
pub mod question;
pub mod state;
pub mod supplier;
pub mod tracker;

pub use domain::{Domain, DomainBoard};
pub use fallback::fallback_question;
pub use ordered_set::OrderedSet;
pub use question::{Question, QuestionBank, QuestionDefinition, QuestionProvenance, CORE_QUESTIONS};
pub use state::{DiscoveryState, SynthesizedAnswer};
pub use supplier::{QuestionSource, QuestionSupplier, SuppliedQuestion};
pub use tracker::{
    AnswerRecord, DiscoveryProgress, DiscoveryTracker, DomainProgress, LegacyResponse,
    MigrationReport, NextQuestion,
};
