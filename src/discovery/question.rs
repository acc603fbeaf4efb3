//! Questions and the core question bank

use crate::core::types::{DomainId, QuestionId};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Where a question came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QuestionProvenance {
    /// Static core bank
    Bank,
    /// Written by the AI collaborator
    AiGenerated,
    /// Template used when the AI collaborator was unavailable
    Fallback,
}

/// A Likert-scale self-assessment question
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Question {
    pub id: QuestionId,
    pub text: String,
    #[serde(default)]
    pub hint: Option<String>,
    pub domain: DomainId,
    /// Relative weight within its domain (> 0)
    pub weight: f64,
    /// Agreement means a better domain score
    pub positive_framing: bool,
    pub provenance: QuestionProvenance,
}

impl Question {
    /// Synthesized question; always weight 1.0 and positively framed
    pub fn synthesized(
        id: QuestionId,
        domain: DomainId,
        text: impl Into<String>,
        hint: Option<String>,
        provenance: QuestionProvenance,
    ) -> Self {
        Self {
            id,
            text: text.into(),
            hint,
            domain,
            weight: 1.0,
            positive_framing: true,
            provenance,
        }
    }

    pub fn is_ai_generated(&self) -> bool {
        self.provenance == QuestionProvenance::AiGenerated
    }

    pub fn is_fallback(&self) -> bool {
        self.provenance == QuestionProvenance::Fallback
    }

    /// AI-generated or fallback, i.e. not from the core bank
    pub fn is_synthesized(&self) -> bool {
        self.provenance != QuestionProvenance::Bank
    }
}

/// Static definition of a core question
#[derive(Debug, Clone)]
pub struct QuestionDefinition {
    pub id: &'static str,
    pub domain: DomainId,
    pub text: &'static str,
    pub hint: Option<&'static str>,
    pub weight: f64,
    pub positive_framing: bool,
}

/// Core question bank, grouped by domain in catalog order
pub static CORE_QUESTIONS: &[QuestionDefinition] = &[
    // === HEALTH ===
    QuestionDefinition {
        id: "health_energy",
        domain: DomainId::Health,
        text: "I have enough energy to get through my day.",
        hint: Some("Think about a typical weekday."),
        weight: 1.0,
        positive_framing: true,
    },
    QuestionDefinition {
        id: "health_exercise",
        domain: DomainId::Health,
        text: "I move my body regularly in ways I enjoy.",
        hint: None,
        weight: 1.0,
        positive_framing: true,
    },
    QuestionDefinition {
        id: "health_sleep",
        domain: DomainId::Health,
        text: "I often wake up feeling unrested.",
        hint: None,
        weight: 0.8,
        positive_framing: false,
    },
    // === EDUCATION ===
    QuestionDefinition {
        id: "education_learning",
        domain: DomainId::Education,
        text: "I am actively learning something new.",
        hint: Some("Courses, books, hobbies and skills all count."),
        weight: 1.0,
        positive_framing: true,
    },
    QuestionDefinition {
        id: "education_curiosity",
        domain: DomainId::Education,
        text: "I make time to explore topics that interest me.",
        hint: None,
        weight: 0.8,
        positive_framing: true,
    },
    // === CAREER ===
    QuestionDefinition {
        id: "career_satisfaction",
        domain: DomainId::Career,
        text: "My work feels meaningful to me.",
        hint: Some("Paid work, study or caregiving all count as work."),
        weight: 1.2,
        positive_framing: true,
    },
    QuestionDefinition {
        id: "career_growth",
        domain: DomainId::Career,
        text: "I see a clear path for growing in my work.",
        hint: None,
        weight: 1.0,
        positive_framing: true,
    },
    QuestionDefinition {
        id: "career_burnout",
        domain: DomainId::Career,
        text: "I dread the start of my work week.",
        hint: None,
        weight: 1.0,
        positive_framing: false,
    },
    // === FINANCES ===
    QuestionDefinition {
        id: "finances_security",
        domain: DomainId::Finances,
        text: "I could handle an unexpected expense without stress.",
        hint: None,
        weight: 1.2,
        positive_framing: true,
    },
    QuestionDefinition {
        id: "finances_worry",
        domain: DomainId::Finances,
        text: "I worry about money most weeks.",
        hint: None,
        weight: 1.0,
        positive_framing: false,
    },
    // === RELATIONSHIPS ===
    QuestionDefinition {
        id: "relationships_support",
        domain: DomainId::Relationships,
        text: "I have people I can count on when things get hard.",
        hint: None,
        weight: 1.2,
        positive_framing: true,
    },
    QuestionDefinition {
        id: "relationships_lonely",
        domain: DomainId::Relationships,
        text: "I feel lonely more often than I would like.",
        hint: None,
        weight: 1.0,
        positive_framing: false,
    },
    // === FAMILY ===
    QuestionDefinition {
        id: "family_connection",
        domain: DomainId::Family,
        text: "I feel connected to my family.",
        hint: Some("Family is whoever you consider family."),
        weight: 1.0,
        positive_framing: true,
    },
    QuestionDefinition {
        id: "family_time",
        domain: DomainId::Family,
        text: "I spend quality time with the people closest to me.",
        hint: None,
        weight: 0.8,
        positive_framing: true,
    },
    // === LEISURE ===
    QuestionDefinition {
        id: "leisure_fun",
        domain: DomainId::Leisure,
        text: "I regularly do things just for fun.",
        hint: None,
        weight: 1.0,
        positive_framing: true,
    },
    QuestionDefinition {
        id: "leisure_rest",
        domain: DomainId::Leisure,
        text: "I feel guilty when I take time off.",
        hint: None,
        weight: 0.8,
        positive_framing: false,
    },
    // === ENVIRONMENT ===
    QuestionDefinition {
        id: "environment_home",
        domain: DomainId::Environment,
        text: "My home is a place where I can relax.",
        hint: None,
        weight: 1.0,
        positive_framing: true,
    },
    QuestionDefinition {
        id: "environment_clutter",
        domain: DomainId::Environment,
        text: "Clutter in my space drains my energy.",
        hint: None,
        weight: 0.8,
        positive_framing: false,
    },
    // === SPIRITUALITY ===
    QuestionDefinition {
        id: "spirituality_purpose",
        domain: DomainId::Spirituality,
        text: "I have a sense of purpose that guides my choices.",
        hint: None,
        weight: 1.2,
        positive_framing: true,
    },
    QuestionDefinition {
        id: "spirituality_reflection",
        domain: DomainId::Spirituality,
        text: "I take time to reflect on what matters to me.",
        hint: Some("Meditation, prayer, journaling or quiet walks all count."),
        weight: 1.0,
        positive_framing: true,
    },
];

impl QuestionDefinition {
    pub fn to_question(&self) -> Question {
        Question {
            id: QuestionId::new(self.id),
            text: self.text.to_string(),
            hint: self.hint.map(str::to_string),
            domain: self.domain,
            weight: self.weight,
            positive_framing: self.positive_framing,
            provenance: QuestionProvenance::Bank,
        }
    }
}

/// Immutable question bank with an id index
///
/// The question -> domain lookup is derived once at construction;
/// the bank is never mutated afterwards.
#[derive(Debug, Clone)]
pub struct QuestionBank {
    questions: Vec<Question>,
    by_id: HashMap<QuestionId, usize>,
}

impl QuestionBank {
    /// Build a bank; later duplicates of an id are dropped
    pub fn new(questions: Vec<Question>) -> Self {
        let mut kept = Vec::with_capacity(questions.len());
        let mut by_id = HashMap::with_capacity(questions.len());
        for question in questions {
            if by_id.contains_key(&question.id) {
                tracing::warn!(id = %question.id, "Duplicate question id in bank");
                continue;
            }
            by_id.insert(question.id.clone(), kept.len());
            kept.push(question);
        }
        Self { questions: kept, by_id }
    }

    /// The shipped core bank
    pub fn builtin() -> Self {
        Self::new(CORE_QUESTIONS.iter().map(QuestionDefinition::to_question).collect())
    }

    pub fn get(&self, id: &QuestionId) -> Option<&Question> {
        self.by_id.get(id).map(|i| &self.questions[*i])
    }

    pub fn domain_of(&self, id: &QuestionId) -> Option<DomainId> {
        self.get(id).map(|q| q.domain)
    }

    pub fn contains(&self, id: &QuestionId) -> bool {
        self.by_id.contains_key(id)
    }

    /// Questions of one domain, in bank order
    pub fn in_domain(&self, domain: DomainId) -> impl Iterator<Item = &Question> {
        self.questions.iter().filter(move |q| q.domain == domain)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Question> {
        self.questions.iter()
    }

    pub fn len(&self) -> usize {
        self.questions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.questions.is_empty()
    }
}

impl Default for QuestionBank {
    fn default() -> Self {
        Self::builtin()
    }
}
