//! Per-user discovery bookkeeping

use crate::core::types::{DomainId, QuestionId};
use crate::discovery::question::Question;
use crate::discovery::OrderedSet;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Record of an answered AI or fallback question
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SynthesizedAnswer {
    pub id: QuestionId,
    pub domain: DomainId,
    pub text: String,
    pub value: u8,
}

/// Everything the tracker remembers about one user's answers
///
/// Invariant: every domain in `discovered_domains` has at least one
/// entry in `domain_data_points`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DiscoveryState {
    /// Raw 1..=5 answers keyed by question id (bank and synthesized)
    pub question_responses: BTreeMap<QuestionId, u8>,
    /// Domains in the order they received their first data point
    pub discovered_domains: OrderedSet<DomainId>,
    pub domain_data_points: BTreeMap<DomainId, u32>,
    pub questions_today: u32,
    pub last_question_date: Option<NaiveDate>,
    /// Skipped questions, oldest first
    pub skipped_questions: OrderedSet<QuestionId>,
    /// Generated question waiting for an answer
    pub pending_ai_question: Option<Question>,
    pub ai_questions_answered: u32,
    /// Answered synthesized questions, oldest first
    pub synthesized_answers: Vec<SynthesizedAnswer>,
}

impl DiscoveryState {
    pub fn new() -> Self {
        Self::default()
    }

    /// True once anything has been recorded
    pub fn has_data(&self) -> bool {
        !self.question_responses.is_empty()
            || !self.discovered_domains.is_empty()
            || !self.domain_data_points.is_empty()
    }

    pub fn is_answered(&self, id: &QuestionId) -> bool {
        self.question_responses.contains_key(id)
    }

    pub fn is_skipped(&self, id: &QuestionId) -> bool {
        self.skipped_questions.contains(id)
    }

    pub fn response(&self, id: &QuestionId) -> Option<u8> {
        self.question_responses.get(id).copied()
    }

    pub fn data_points(&self, domain: DomainId) -> u32 {
        self.domain_data_points.get(&domain).copied().unwrap_or(0)
    }

    pub fn is_discovered(&self, domain: DomainId) -> bool {
        self.discovered_domains.contains(&domain)
    }

    /// Today's answer count without resetting stored state
    pub fn questions_on(&self, today: NaiveDate) -> u32 {
        match self.last_question_date {
            Some(date) if date == today => self.questions_today,
            _ => 0,
        }
    }

    /// Reset the daily counter when the tracked date is not `today`
    pub(crate) fn roll_day(&mut self, today: NaiveDate) {
        if self.last_question_date != Some(today) {
            self.questions_today = 0;
            self.last_question_date = Some(today);
        }
    }

    /// Count a new data point; returns true if it was the domain's first
    pub(crate) fn add_data_point(&mut self, domain: DomainId) -> bool {
        let points = self.domain_data_points.entry(domain).or_insert(0);
        *points += 1;
        self.discovered_domains.insert(domain)
    }
}
