//! The AI collaborator seam
//!
//! Everything model-backed goes through `AiCollaborator` so the engine can
//! run against a real provider, a test double, or nothing at all.

use crate::core::config::LlmConfig;
use crate::core::error::{EngineError, Result};
use crate::llm::client::{LlmClient, SendParams};
use crate::llm::context::{DomainContext, HistoryContext};
use crate::llm::parser::{parse_question, parse_skills, question_prompt, skills_prompt, GeneratedQuestion};
use crate::skills::DiscoveredSkill;
use async_trait::async_trait;
use std::time::Duration;

#[async_trait]
pub trait AiCollaborator: Send + Sync {
    /// One new positively framed statement about `domain`
    async fn generate_question(
        &self,
        domain: &DomainContext,
        history: &HistoryContext,
    ) -> Result<GeneratedQuestion>;

    /// Skills practiced in a free-text journal entry
    async fn extract_skills(&self, text: &str, existing: &[String]) -> Result<Vec<DiscoveredSkill>>;
}

/// Collaborator backed by an `LlmClient`, or disabled when none is configured
pub struct LlmCollaborator {
    client: Option<LlmClient>,
    params: SendParams,
}

impl LlmCollaborator {
    pub fn new(client: Option<LlmClient>, config: &LlmConfig) -> Self {
        Self {
            client,
            params: SendParams {
                max_tokens: config.max_tokens,
                ..SendParams::default()
            },
        }
    }

    /// A collaborator that fails every request
    pub fn disabled() -> Self {
        Self::new(None, &LlmConfig::default())
    }

    /// Build from LLM_* environment variables; disabled if no key is set
    pub fn from_env(config: &LlmConfig) -> Self {
        let client = LlmClient::from_env()
            .and_then(|client| client.with_timeout(Duration::from_secs(config.timeout_secs)));
        match client {
            Ok(client) => {
                tracing::info!(provider = ?client.provider(), model = %client.model(), "AI collaborator enabled");
                Self::new(Some(client), config)
            }
            Err(e) => {
                tracing::info!(reason = %e, "AI collaborator disabled");
                Self::new(None, config)
            }
        }
    }

    pub fn is_available(&self) -> bool {
        self.client.is_some()
    }

    fn client(&self) -> Result<&LlmClient> {
        self.client
            .as_ref()
            .ok_or_else(|| EngineError::Provider("AI collaborator not configured".into()))
    }
}

#[async_trait]
impl AiCollaborator for LlmCollaborator {
    async fn generate_question(
        &self,
        domain: &DomainContext,
        history: &HistoryContext,
    ) -> Result<GeneratedQuestion> {
        let client = self.client()?;
        let response = client.send(&question_prompt(domain, history), &self.params).await?;
        parse_question(&response)
    }

    async fn extract_skills(&self, text: &str, existing: &[String]) -> Result<Vec<DiscoveredSkill>> {
        let client = self.client()?;
        let response = client.send(&skills_prompt(text, existing), &self.params).await?;
        parse_skills(&response)
    }
}
