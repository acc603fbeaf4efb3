//! Discovery tracker
//!
//! Records answers and skips, reveals domains as they receive data, keeps
//! domain scores current and decides which stored question comes next.
//!
//! Per question: unanswered -> answered (re-answering overwrites the value).
//! Skipping is a side state; answering a skipped question clears it.

use crate::core::config::ScoringConfig;
use crate::core::error::{EngineError, Result};
use crate::core::types::{DomainId, QuestionId};
use crate::discovery::question::{Question, QuestionBank};
use crate::discovery::state::{DiscoveryState, SynthesizedAnswer};
use crate::discovery::DomainBoard;
use crate::llm::{AnsweredPrompt, DomainContext, HistoryContext};
use crate::scoring::{
    average_to_percent, blend_score, likert_to_percent, reflect, weighted_average, LikertEntry,
    LIKERT_MAX, LIKERT_MIN,
};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Answers handed to the AI collaborator as history
const MAX_HISTORY: usize = 10;

/// What recording an answer changed
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AnswerRecord {
    pub question_id: QuestionId,
    pub domain: DomainId,
    /// First data point ever for this domain
    pub domain_discovered: bool,
    /// Answer to an AI-generated or fallback question
    pub is_ai_question: bool,
    pub domain_score: u8,
    pub score_visible: bool,
}

/// Next stored question, or a request to generate one
#[derive(Debug, Clone, PartialEq)]
pub enum NextQuestion {
    /// Unanswered, unskipped bank question
    Fresh(Question),
    /// Previously skipped bank question, offered again
    Retry(Question),
    /// Generated question still waiting for an answer
    Pending(Question),
    /// Nothing stored is left; the caller must generate a question
    NeedsAiGeneration,
}

/// An answer from an older settings format
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LegacyResponse {
    pub question_id: QuestionId,
    pub value: u8,
}

/// Outcome of a legacy import
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct MigrationReport {
    pub imported: usize,
    pub ignored: usize,
    /// Import skipped because discovery data already existed
    pub already_migrated: bool,
}

/// Dashboard view of one domain
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DomainProgress {
    pub id: DomainId,
    pub name: String,
    pub icon: String,
    pub discovered: bool,
    pub data_points: u32,
    /// Hidden until the domain has enough data points
    pub score: Option<u8>,
}

/// Dashboard view of discovery as a whole
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DiscoveryProgress {
    pub discovered_domains: Vec<DomainId>,
    pub domains: Vec<DomainProgress>,
    pub answered_core: usize,
    pub total_core: usize,
    pub all_core_complete: bool,
    pub questions_today: u32,
    pub ai_questions_answered: u32,
    pub skipped: usize,
}

/// Mutable view over one user's discovery state
pub struct DiscoveryTracker<'a> {
    state: &'a mut DiscoveryState,
    domains: &'a mut DomainBoard,
    bank: &'a QuestionBank,
    config: &'a ScoringConfig,
    today: NaiveDate,
}

impl<'a> DiscoveryTracker<'a> {
    pub fn new(
        state: &'a mut DiscoveryState,
        domains: &'a mut DomainBoard,
        bank: &'a QuestionBank,
        config: &'a ScoringConfig,
        today: NaiveDate,
    ) -> Self {
        Self {
            state,
            domains,
            bank,
            config,
            today,
        }
    }

    pub fn state(&self) -> &DiscoveryState {
        self.state
    }

    pub fn domains(&self) -> &DomainBoard {
        self.domains
    }

    /// Record a 1..=5 answer
    ///
    /// `current` is the question as shown to the user; it identifies the
    /// domain of AI-generated and fallback questions, which are not in the
    /// bank. Bank answers recompute the domain score from all its bank
    /// answers, synthesized answers only nudge it.
    pub fn record_answer(
        &mut self,
        question_id: &QuestionId,
        value: u8,
        current: Option<&Question>,
    ) -> Result<AnswerRecord> {
        if !(LIKERT_MIN..=LIKERT_MAX).contains(&value) {
            return Err(EngineError::InvalidAnswer(value));
        }

        let question = self.resolve(question_id, current)?;
        let domain = question.domain;
        let is_ai_question = question.is_synthesized();

        self.state.roll_day(self.today);
        let previous = self.state.question_responses.insert(question_id.clone(), value);
        self.state.skipped_questions.remove(question_id);

        // Re-answering overwrites the value but is not new data
        let domain_discovered = if previous.is_none() {
            self.state.add_data_point(domain)
        } else {
            false
        };

        let domain_score = if is_ai_question {
            let old = self
                .domains
                .score_of(domain)
                .unwrap_or(self.config.default_domain_score);
            let answer = likert_to_percent(value, question.positive_framing);
            blend_score(old, answer, self.config.ai_blend_alpha)
        } else {
            self.bank_score(domain)?
        };
        self.domains.set_score(domain, domain_score);

        self.state.questions_today += 1;
        if is_ai_question {
            self.state.ai_questions_answered += 1;
            self.state.synthesized_answers.push(SynthesizedAnswer {
                id: question_id.clone(),
                domain,
                text: question.text.clone(),
                value,
            });
            if self.is_pending(question_id) {
                self.state.pending_ai_question = None;
            }
        }

        if domain_discovered {
            tracing::info!(domain = %domain, "Domain discovered");
        }
        tracing::debug!(
            question = %question_id,
            domain = %domain,
            value,
            score = domain_score,
            "Answer recorded"
        );

        Ok(AnswerRecord {
            question_id: question_id.clone(),
            domain,
            domain_discovered,
            is_ai_question,
            domain_score,
            score_visible: self.domain_score_visible(domain),
        })
    }

    fn resolve(&self, id: &QuestionId, current: Option<&Question>) -> Result<Question> {
        if let Some(question) = current.filter(|q| &q.id == id && q.is_synthesized()) {
            return Ok(question.clone());
        }
        if let Some(question) = self.bank.get(id) {
            return Ok(question.clone());
        }
        self.state
            .pending_ai_question
            .as_ref()
            .filter(|q| &q.id == id)
            .cloned()
            .ok_or_else(|| EngineError::NotFound(format!("question {}", id)))
    }

    fn is_pending(&self, id: &QuestionId) -> bool {
        self.state
            .pending_ai_question
            .as_ref()
            .map_or(false, |q| &q.id == id)
    }

    /// Full recompute of a domain score from its bank answers
    fn bank_score(&self, domain: DomainId) -> Result<u8> {
        let entries: Vec<LikertEntry> = self
            .bank
            .in_domain(domain)
            .filter_map(|q| {
                let value = self.state.response(&q.id)?;
                let score = if q.positive_framing { value } else { reflect(value) };
                Some(LikertEntry::new(score, q.weight))
            })
            .collect();

        Ok(average_to_percent(weighted_average(&entries)?))
    }

    /// Put a question at the back of the retry queue
    ///
    /// Skipping the pending generated question discards it instead, so the
    /// next request produces a new one.
    pub fn skip(&mut self, question_id: &QuestionId) {
        if self.is_pending(question_id) {
            self.state.pending_ai_question = None;
            tracing::debug!(question = %question_id, "Pending generated question discarded");
            return;
        }
        if self.state.skipped_questions.insert(question_id.clone()) {
            tracing::debug!(question = %question_id, "Question skipped");
        }
    }

    /// Decide what to ask next
    ///
    /// Fresh bank questions come first (domains in `domain_order`, questions
    /// in bank order), then skipped ones, then a pending generated question.
    /// Returns `None` only when there is no domain to generate for.
    pub fn next_question(&self, domain_order: &[DomainId]) -> Option<NextQuestion> {
        for domain in domain_order {
            let fresh = self
                .bank
                .in_domain(*domain)
                .find(|q| !self.state.is_answered(&q.id) && !self.state.is_skipped(&q.id));
            if let Some(question) = fresh {
                return Some(NextQuestion::Fresh(question.clone()));
            }
        }

        let retry = self
            .state
            .skipped_questions
            .iter()
            .filter(|id| !self.state.is_answered(id))
            .find_map(|id| self.bank.get(id));
        if let Some(question) = retry {
            return Some(NextQuestion::Retry(question.clone()));
        }

        if let Some(pending) = &self.state.pending_ai_question {
            return Some(NextQuestion::Pending(pending.clone()));
        }

        if domain_order.is_empty() {
            return None;
        }
        Some(NextQuestion::NeedsAiGeneration)
    }

    /// Keep a generated question until it is answered or skipped
    pub fn stash_pending(&mut self, question: Question) {
        self.state.pending_ai_question = Some(question);
    }

    /// True when every bank question has an answer
    pub fn all_core_complete(&self) -> bool {
        self.bank.iter().all(|q| self.state.is_answered(&q.id))
    }

    /// Answers recorded today (resets on a new day)
    ///
    /// No daily limit is enforced.
    pub fn daily_count(&mut self) -> u32 {
        self.state.roll_day(self.today);
        self.state.questions_today
    }

    /// A domain's score is shown once it has enough data points
    pub fn domain_score_visible(&self, domain: DomainId) -> bool {
        self.state.data_points(domain) >= self.config.min_data_points_for_score
    }

    /// One-time import of answers from the legacy format
    ///
    /// Does nothing if any discovery data exists. Unknown questions and
    /// out-of-range values are ignored. Daily counters are left alone.
    pub fn migrate_legacy(&mut self, old_responses: &[LegacyResponse]) -> Result<MigrationReport> {
        if self.state.has_data() {
            return Ok(MigrationReport {
                already_migrated: true,
                ..Default::default()
            });
        }

        let mut report = MigrationReport::default();
        let mut touched = BTreeSet::new();

        for response in old_responses {
            let valid = (LIKERT_MIN..=LIKERT_MAX).contains(&response.value);
            let domain = self.bank.domain_of(&response.question_id);
            let Some(domain) = domain.filter(|_| valid) else {
                tracing::warn!(
                    question = %response.question_id,
                    value = response.value,
                    "Ignoring legacy response"
                );
                report.ignored += 1;
                continue;
            };

            let previous = self
                .state
                .question_responses
                .insert(response.question_id.clone(), response.value);
            if previous.is_none() {
                self.state.add_data_point(domain);
            }
            touched.insert(domain);
            report.imported += 1;
        }

        for domain in touched {
            let score = self.bank_score(domain)?;
            self.domains.set_score(domain, score);
        }

        tracing::info!(imported = report.imported, ignored = report.ignored, "Legacy answers migrated");
        Ok(report)
    }

    /// Domain and history context for generating a question
    pub fn prompt_context(&self, domain: DomainId) -> (DomainContext, HistoryContext) {
        let domain_context = DomainContext {
            domain,
            name: domain.display_name().to_string(),
            score: self
                .domain_score_visible(domain)
                .then(|| self.domains.score_of(domain))
                .flatten(),
            data_points: self.state.data_points(domain),
        };

        let mut recent_answers: Vec<AnsweredPrompt> = self
            .bank
            .in_domain(domain)
            .filter_map(|q| {
                self.state.response(&q.id).map(|value| AnsweredPrompt {
                    text: q.text.clone(),
                    value,
                })
            })
            .collect();
        recent_answers.extend(
            self.state
                .synthesized_answers
                .iter()
                .filter(|a| a.domain == domain)
                .map(|a| AnsweredPrompt {
                    text: a.text.clone(),
                    value: a.value,
                }),
        );
        let overflow = recent_answers.len().saturating_sub(MAX_HISTORY);
        recent_answers.drain(..overflow);

        let history = HistoryContext {
            recent_answers,
            total_answered: self.state.question_responses.len(),
        };

        (domain_context, history)
    }

    /// Snapshot for the dashboard
    pub fn progress(&self) -> DiscoveryProgress {
        let domains = self
            .domains
            .iter()
            .map(|d| DomainProgress {
                id: d.id,
                name: d.name.clone(),
                icon: d.icon.clone(),
                discovered: self.state.is_discovered(d.id),
                data_points: self.state.data_points(d.id),
                score: self.domain_score_visible(d.id).then_some(d.score),
            })
            .collect();

        DiscoveryProgress {
            discovered_domains: self.state.discovered_domains.iter().copied().collect(),
            domains,
            answered_core: self
                .bank
                .iter()
                .filter(|q| self.state.is_answered(&q.id))
                .count(),
            total_core: self.bank.len(),
            all_core_complete: self.all_core_complete(),
            questions_today: self.state.questions_on(self.today),
            ai_questions_answered: self.state.ai_questions_answered,
            skipped: self.state.skipped_questions.len(),
        }
    }
}
