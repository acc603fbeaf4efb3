//! Prompts and response parsing for the AI collaborator
//!
//! Models wrap their JSON in prose or code fences often enough that every
//! response goes through `extract_json` before deserializing.

use crate::core::error::{EngineError, Result};
use crate::llm::client::Prompt;
use crate::llm::context::{DomainContext, HistoryContext};
use crate::skills::DiscoveredSkill;
use serde::{Deserialize, Serialize};

/// A question produced by the model
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeneratedQuestion {
    pub text: String,
    #[serde(default)]
    pub hint: Option<String>,
}

#[derive(Deserialize)]
struct SkillsEnvelope {
    #[serde(default)]
    skills: Vec<DiscoveredSkill>,
}

/// Prompt asking for one new self-assessment statement
pub fn question_prompt(domain: &DomainContext, history: &HistoryContext) -> Prompt {
    let user = format!(
        "{}\n\n{}\n\nWrite one new statement for this domain as JSON:",
        domain.summary(),
        history.summary()
    );
    Prompt::new(QUESTION_SYSTEM_PROMPT, user)
}

/// Prompt asking for skills demonstrated in a journal entry
pub fn skills_prompt(text: &str, existing: &[String]) -> Prompt {
    let existing = if existing.is_empty() {
        "none".to_string()
    } else {
        existing.join(", ")
    };
    let user = format!(
        "EXISTING SKILLS: {}\n\nJOURNAL ENTRY:\n{}\n\nList the skills as JSON:",
        existing, text
    );
    Prompt::new(SKILLS_SYSTEM_PROMPT, user)
}

/// Parse a question-generation response
pub fn parse_question(response: &str) -> Result<GeneratedQuestion> {
    let json_str = extract_json(response)?;
    serde_json::from_str(json_str).map_err(|e| {
        EngineError::Provider(format!("Failed to parse question: {} - Response: {}", e, response))
    })
}

/// Parse a skill-extraction response
///
/// Accepts either `{"skills": [...]}` or a bare array.
pub fn parse_skills(response: &str) -> Result<Vec<DiscoveredSkill>> {
    let json_str = extract_json(response)?;
    let parsed = if json_str.starts_with('[') {
        serde_json::from_str::<Vec<DiscoveredSkill>>(json_str)
    } else {
        serde_json::from_str::<SkillsEnvelope>(json_str).map(|envelope| envelope.skills)
    };
    parsed.map_err(|e| {
        EngineError::Provider(format!("Failed to parse skills: {} - Response: {}", e, response))
    })
}

/// Extract a JSON object or array from an LLM response (handles surrounding text)
pub fn extract_json(response: &str) -> Result<&str> {
    let start = response
        .find(&['{', '['][..])
        .ok_or_else(|| EngineError::Provider("No JSON found in response".into()))?;
    let close = if response[start..].starts_with('{') { '}' } else { ']' };
    let end = response
        .rfind(close)
        .filter(|end| *end > start)
        .ok_or_else(|| EngineError::Provider("No closing bracket found in response".into()))?;
    Ok(&response[start..=end])
}

const QUESTION_SYSTEM_PROMPT: &str = r#"You help people reflect on their lives.
Write ONE short first-person statement the user can rate from 1 (strongly disagree) to 5 (strongly agree).

RULES:
- The statement must be about the given life domain
- Agreeing must mean things are going well (positive framing)
- Do not repeat or rephrase any previous statement
- Keep it under 15 words, plain language, no jargon
- The hint is an optional one-line clarification

OUTPUT FORMAT (JSON only, no explanation):
{"text": "the statement", "hint": "optional clarification or null"}

Examples:
{"text": "I have enough energy for the things I care about.", "hint": null}
{"text": "I set aside money each month.", "hint": "Even small amounts count."}
"#;

const SKILLS_SYSTEM_PROMPT: &str = r#"You read journal entries and identify skills the writer practiced.

CATEGORIES:
- vocation: work and craft skills (programming, writing, carpentry)
- mind: learning and thinking skills (reading, languages, chess)
- body: physical skills (running, yoga, cooking)
- spirit: inner and social skills (meditation, listening, patience)

RULES:
- Reuse the exact name of an existing skill when it matches
- Only list skills the entry shows being practiced
- xp is 5-50 depending on how much effort the entry describes

OUTPUT FORMAT (JSON only, no explanation):
{"skills": [{"name": "Skill Name", "category": "vocation|mind|body|spirit", "xp": 20, "description": "one line"}]}

Return {"skills": []} when no skill was practiced.
"#;
