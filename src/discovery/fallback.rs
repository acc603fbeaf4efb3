//! Template questions used when the AI collaborator is unavailable

use crate::core::types::{DomainId, QuestionId};
use crate::discovery::question::{Question, QuestionProvenance};

/// Templates per domain; all positively framed
pub fn templates(domain: DomainId) -> &'static [&'static str] {
    match domain {
        DomainId::Health => &[
            "I feel comfortable in my body most days.",
            "I eat in a way that supports how I want to feel.",
            "I recover well after stressful days.",
        ],
        DomainId::Education => &[
            "I finished a book, course or tutorial recently.",
            "I feel confident picking up new skills.",
            "I apply what I learn in everyday life.",
        ],
        DomainId::Career => &[
            "I use my strengths in my work.",
            "I feel appreciated for the work I do.",
            "I have a healthy boundary between work and rest.",
        ],
        DomainId::Finances => &[
            "I know where my money goes each month.",
            "I am making progress toward a financial goal.",
            "My spending reflects what I value.",
        ],
        DomainId::Relationships => &[
            "I reached out to a friend this week.",
            "I feel understood by the people around me.",
            "I can be myself with my friends.",
        ],
        DomainId::Family => &[
            "Conversations with my family feel easy.",
            "I feel supported by my family.",
            "I contribute to my family in ways I am proud of.",
        ],
        DomainId::Leisure => &[
            "I had a moment of pure enjoyment recently.",
            "I have a hobby I look forward to.",
            "I make room for play in my week.",
        ],
        DomainId::Environment => &[
            "My surroundings help me focus.",
            "I spend time outdoors regularly.",
            "I feel safe where I live.",
        ],
        DomainId::Spirituality => &[
            "My daily actions line up with my values.",
            "I feel connected to something larger than myself.",
            "I feel at peace with where my life is heading.",
        ],
    }
}

/// Fallback question for `domain`
///
/// Templates rotate with the number of synthesized answers so consecutive
/// fallbacks in one domain do not repeat the same text.
pub fn fallback_question(domain: DomainId, ai_questions_answered: u32) -> Question {
    let options = templates(domain);
    let index = ai_questions_answered as usize % options.len();
    Question::synthesized(
        QuestionId::new(format!("fallback-{}-{}", domain, ai_questions_answered + 1)),
        domain,
        options[index],
        None,
        QuestionProvenance::Fallback,
    )
}
