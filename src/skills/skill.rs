//! Skill entity and the per-user skill collection

use crate::core::types::{SkillCategory, SkillId};
use crate::scoring::{xp_required_for_level, XpState};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// How a skill first entered the ledger
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SkillSource {
    /// Added by hand from the skills tab
    Manual,
    /// Extracted by the AI collaborator from journal text
    Journal,
    /// Carried over from an older settings format
    Imported,
}

/// A leveled, XP-bearing user capability
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Skill {
    pub id: SkillId,
    /// Display name, unique within a ledger ignoring case
    pub name: String,
    pub category: SkillCategory,
    #[serde(default)]
    pub description: Option<String>,
    pub level: u32,
    /// Progress toward the next level (0 <= xp < xp_to_next_level)
    pub xp: f64,
    pub xp_to_next_level: f64,
    #[serde(default)]
    pub total_practice_count: u32,
    pub discovered_from: SkillSource,
    pub discovered_date: DateTime<Utc>,
    #[serde(default)]
    pub last_practiced: Option<DateTime<Utc>>,
}

impl Skill {
    /// New level 1 skill with a fresh id
    pub fn new(
        name: impl Into<String>,
        category: SkillCategory,
        source: SkillSource,
        description: Option<String>,
    ) -> Self {
        Self {
            id: SkillId::new(),
            name: name.into(),
            category,
            description,
            level: 1,
            xp: 0.0,
            xp_to_next_level: xp_required_for_level(1),
            total_practice_count: 0,
            discovered_from: source,
            discovered_date: Utc::now(),
            last_practiced: None,
        }
    }

    pub fn xp_state(&self) -> XpState {
        XpState {
            xp: self.xp,
            level: self.level,
            xp_to_next_level: self.xp_to_next_level,
        }
    }

    pub(crate) fn set_xp_state(&mut self, state: XpState) {
        self.xp = state.xp;
        self.level = state.level;
        self.xp_to_next_level = state.xp_to_next_level;
    }

    /// Fraction of the way to the next level (0.0 to 1.0)
    pub fn progress(&self) -> f64 {
        if self.xp_to_next_level <= 0.0 {
            return 0.0;
        }
        (self.xp / self.xp_to_next_level).clamp(0.0, 1.0)
    }

    pub fn name_matches(&self, name: &str) -> bool {
        self.name.to_lowercase() == name.trim().to_lowercase()
    }
}

/// All skills of one user plus the shared skill point pool
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SkillsLedger {
    #[serde(default)]
    pub skills: Vec<Skill>,
    /// Skills ever created (not decremented by delete or merge)
    #[serde(default)]
    pub total_skills_discovered: u32,
    /// Points spendable on any skill
    #[serde(default)]
    pub available_skill_points: u32,
}
