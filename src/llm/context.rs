//! Context handed to the AI collaborator
//!
//! Question generation sees one domain plus the user's recent answers in
//! it, rendered into a compact text block for the prompt.

use crate::core::types::DomainId;
use serde::{Deserialize, Serialize};

/// The domain a new question should explore
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DomainContext {
    pub domain: DomainId,
    pub name: String,
    /// Current score, if the domain has enough data to show one
    pub score: Option<u8>,
    pub data_points: u32,
}

/// A question the user already answered
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnsweredPrompt {
    pub text: String,
    /// Raw 1..=5 answer
    pub value: u8,
}

/// What the user has already told us, oldest first
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct HistoryContext {
    pub recent_answers: Vec<AnsweredPrompt>,
    pub total_answered: usize,
}

impl DomainContext {
    /// Text summary for the prompt
    pub fn summary(&self) -> String {
        let score = match self.score {
            Some(score) => format!("{}/100", score),
            None => "not enough data yet".to_string(),
        };
        format!(
            "Domain: {} ({})\nCurrent score: {}\nAnswers so far: {}",
            self.name, self.domain, score, self.data_points
        )
    }
}

impl HistoryContext {
    pub fn is_empty(&self) -> bool {
        self.recent_answers.is_empty()
    }

    /// Text summary for the prompt
    pub fn summary(&self) -> String {
        if self.recent_answers.is_empty() {
            return "No previous answers in this domain.".to_string();
        }

        let mut lines = vec![format!(
            "Previous answers (1 = strongly disagree, 5 = strongly agree), {} in total:",
            self.total_answered
        )];
        for answer in &self.recent_answers {
            lines.push(format!("- \"{}\" -> {}", answer.text, answer.value));
        }
        lines.join("\n")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_domain_summary_without_score() {
        let ctx = DomainContext {
            domain: DomainId::Finances,
            name: "Finances".into(),
            score: None,
            data_points: 1,
        };
        let summary = ctx.summary();
        assert!(summary.contains("Finances"));
        assert!(summary.contains("not enough data"));
    }

    #[test]
    fn test_domain_summary_with_score() {
        let ctx = DomainContext {
            domain: DomainId::Health,
            name: "Health & Fitness".into(),
            score: Some(72),
            data_points: 3,
        };
        assert!(ctx.summary().contains("72/100"));
    }

    #[test]
    fn test_history_summary_lists_answers() {
        let history = HistoryContext {
            recent_answers: vec![
                AnsweredPrompt { text: "I sleep well.".into(), value: 2 },
                AnsweredPrompt { text: "I exercise.".into(), value: 5 },
            ],
            total_answered: 12,
        };
        let summary = history.summary();
        assert!(summary.contains("12 in total"));
        assert!(summary.contains("\"I sleep well.\" -> 2"));
        assert!(summary.contains("\"I exercise.\" -> 5"));
    }

    #[test]
    fn test_empty_history_summary() {
        let history = HistoryContext::default();
        assert!(history.is_empty());
        assert!(history.summary().contains("No previous answers"));
    }
}
