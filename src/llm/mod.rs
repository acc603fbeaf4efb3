//! AI collaborator: question generation and journal skill extraction

pub mod client;
pub mod collaborator;
pub mod context;
pub mod parser;

pub use client::{AiProvider, LlmClient, Prompt, SendParams};
pub use collaborator::{AiCollaborator, LlmCollaborator};
pub use context::{AnsweredPrompt, DomainContext, HistoryContext};
pub use parser::{extract_json, GeneratedQuestion};
