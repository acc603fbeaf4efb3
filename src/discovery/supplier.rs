//! Question supplier
//!
//! Serves bank questions while any remain, then asks the AI collaborator
//! for a question about one of the user's weakest domains. Any provider
//! failure falls back to a template question; the supplier never fails.
//!
//! Callers must not run two `next_question` calls at once for the same
//! user: the second would stash a competing pending question.

use crate::core::config::SupplierConfig;
use crate::core::types::{DomainId, QuestionId};
use crate::discovery::fallback::fallback_question;
use crate::discovery::question::{Question, QuestionProvenance};
use crate::discovery::tracker::{DiscoveryTracker, NextQuestion};
use crate::discovery::DomainBoard;
use crate::llm::{AiCollaborator, DomainContext, HistoryContext};
use rand::Rng;
use serde::Serialize;

/// Where a supplied question came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum QuestionSource {
    Bank,
    Retry,
    Pending,
    AiGenerated,
    Fallback,
}

/// A question ready to show, plus why the AI path was not used
#[derive(Debug, Clone, PartialEq)]
pub struct SuppliedQuestion {
    pub question: Question,
    pub source: QuestionSource,
    /// Set when generation failed and a template was used instead
    pub provider_error: Option<String>,
}

impl SuppliedQuestion {
    fn stored(question: Question, source: QuestionSource) -> Self {
        Self {
            question,
            source,
            provider_error: None,
        }
    }

    /// The caller should show a "used a default question" notice
    pub fn used_fallback(&self) -> bool {
        self.source == QuestionSource::Fallback
    }
}

/// Chooses and generates questions with an injected random source
pub struct QuestionSupplier<R: Rng> {
    rng: R,
    config: SupplierConfig,
    default_score: u8,
}

impl<R: Rng> QuestionSupplier<R> {
    pub fn new(rng: R, config: SupplierConfig, default_score: u8) -> Self {
        Self {
            rng,
            config,
            default_score,
        }
    }

    /// The lowest-scoring domains that are candidates for generation
    pub fn candidate_domains(&self, domains: &DomainBoard) -> Vec<DomainId> {
        let mut scored: Vec<(DomainId, u8)> = DomainId::ALL
            .iter()
            .map(|id| (*id, domains.score_of(*id).unwrap_or(self.default_score)))
            .collect();
        // Stable sort keeps catalog order among equal scores
        scored.sort_by_key(|(_, score)| *score);
        scored
            .into_iter()
            .take(self.config.candidate_domain_count.max(1))
            .map(|(id, _)| id)
            .collect()
    }

    /// Pick one of the weakest domains uniformly at random
    pub fn pick_target_domain(&mut self, domains: &DomainBoard) -> DomainId {
        let candidates = self.candidate_domains(domains);
        candidates[self.rng.gen_range(0..candidates.len())]
    }

    /// Ask the collaborator for a question, falling back to a template
    pub async fn generate(
        &mut self,
        collaborator: &dyn AiCollaborator,
        domain: &DomainContext,
        history: &HistoryContext,
        ai_questions_answered: u32,
    ) -> SuppliedQuestion {
        let error = match collaborator.generate_question(domain, history).await {
            Ok(generated) => {
                let text = generated.text.trim();
                if !text.is_empty() {
                    let question = Question::synthesized(
                        QuestionId::new(format!("ai-{}-{}", domain.domain, ai_questions_answered + 1)),
                        domain.domain,
                        text,
                        generated.hint.filter(|h| !h.trim().is_empty()),
                        QuestionProvenance::AiGenerated,
                    );
                    return SuppliedQuestion::stored(question, QuestionSource::AiGenerated);
                }
                "AI returned an empty question".to_string()
            }
            Err(e) => e.to_string(),
        };

        tracing::warn!(domain = %domain.domain, error = %error, "Question generation failed, using template");
        SuppliedQuestion {
            question: fallback_question(domain.domain, ai_questions_answered),
            source: QuestionSource::Fallback,
            provider_error: Some(error),
        }
    }

    /// Next question to show
    ///
    /// Generated and fallback questions are stashed as pending so they
    /// survive until answered or skipped. Returns `None` only when
    /// `domain_order` is empty and nothing is stored.
    pub async fn next_question(
        &mut self,
        tracker: &mut DiscoveryTracker<'_>,
        domain_order: &[DomainId],
        collaborator: &dyn AiCollaborator,
    ) -> Option<SuppliedQuestion> {
        let supplied = match tracker.next_question(domain_order)? {
            NextQuestion::Fresh(q) => SuppliedQuestion::stored(q, QuestionSource::Bank),
            NextQuestion::Retry(q) => SuppliedQuestion::stored(q, QuestionSource::Retry),
            NextQuestion::Pending(q) => SuppliedQuestion::stored(q, QuestionSource::Pending),
            NextQuestion::NeedsAiGeneration => {
                let target = self.pick_target_domain(tracker.domains());
                let (domain, history) = tracker.prompt_context(target);
                let answered = tracker.state().ai_questions_answered;
                let supplied = self.generate(collaborator, &domain, &history, answered).await;
                tracker.stash_pending(supplied.question.clone());
                supplied
            }
        };
        Some(supplied)
    }
}
