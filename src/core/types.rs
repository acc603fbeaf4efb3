//! Core type definitions used throughout the codebase

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

/// One of the nine fixed life areas the user reports on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DomainId {
    Health,
    Education,
    Career,
    Finances,
    Relationships,
    Family,
    Leisure,
    Environment,
    Spirituality,
}

impl DomainId {
    /// Catalog order, also the default discovery order
    pub const ALL: [DomainId; 9] = [
        DomainId::Health,
        DomainId::Education,
        DomainId::Career,
        DomainId::Finances,
        DomainId::Relationships,
        DomainId::Family,
        DomainId::Leisure,
        DomainId::Environment,
        DomainId::Spirituality,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Health => "health",
            Self::Education => "education",
            Self::Career => "career",
            Self::Finances => "finances",
            Self::Relationships => "relationships",
            Self::Family => "family",
            Self::Leisure => "leisure",
            Self::Environment => "environment",
            Self::Spirituality => "spirituality",
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            Self::Health => "Health & Fitness",
            Self::Education => "Learning & Education",
            Self::Career => "Career & Work",
            Self::Finances => "Finances",
            Self::Relationships => "Friends & Relationships",
            Self::Family => "Family",
            Self::Leisure => "Fun & Recreation",
            Self::Environment => "Home & Environment",
            Self::Spirituality => "Purpose & Spirituality",
        }
    }

    pub fn icon(&self) -> &'static str {
        match self {
            Self::Health => "💪",
            Self::Education => "📚",
            Self::Career => "💼",
            Self::Finances => "💰",
            Self::Relationships => "🤝",
            Self::Family => "🏡",
            Self::Leisure => "🎨",
            Self::Environment => "🌿",
            Self::Spirituality => "🧘",
        }
    }
}

impl fmt::Display for DomainId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DomainId {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lower = s.trim().to_lowercase();
        DomainId::ALL
            .iter()
            .copied()
            .find(|d| d.as_str() == lower)
            .ok_or_else(|| format!("Unknown domain: {}", s))
    }
}

/// Identifier of a question (bank, AI-generated or fallback)
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct QuestionId(pub String);

impl QuestionId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for QuestionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for QuestionId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

/// Unique identifier for skills
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SkillId(pub String);

impl SkillId {
    pub fn new() -> Self {
        Self(format!("skill-{}", Uuid::new_v4()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for SkillId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for SkillId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for SkillId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

/// Skill grouping shown on the character sheet
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SkillCategory {
    /// Work and craft
    Vocation,
    /// Knowledge and reasoning
    Mind,
    /// Physical practice
    Body,
    /// Inner life and relationships
    Spirit,
}

impl SkillCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Vocation => "vocation",
            Self::Mind => "mind",
            Self::Body => "body",
            Self::Spirit => "spirit",
        }
    }
}

impl fmt::Display for SkillCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SkillCategory {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "vocation" => Ok(Self::Vocation),
            "mind" => Ok(Self::Mind),
            "body" => Ok(Self::Body),
            "spirit" => Ok(Self::Spirit),
            other => Err(format!("Unknown skill category: {}", other)),
        }
    }
}
