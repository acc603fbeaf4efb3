//! Engine configuration with documented constants
//!
//! All tunable numbers are collected here with explanations of their purpose
//! and how they interact with each other. Every field has a default, so a
//! config file only needs to name what it overrides.

use crate::core::error::{EngineError, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Domain score settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScoringConfig {
    /// Blend weight applied to an AI or fallback answer
    ///
    /// At 0.1 a single maximal answer moves a score of 50 to 55.
    /// Ad-hoc questions nudge a domain score, bank answers define it.
    pub ai_blend_alpha: f64,

    /// Data points a domain needs before its score is shown
    ///
    /// At 2, a single answer never surfaces a score on its own.
    pub min_data_points_for_score: u32,

    /// Score a domain starts with before any answers
    ///
    /// Also used when ranking domains for AI question targeting.
    pub default_domain_score: u8,
}

impl Default for ScoringConfig {
    fn default() -> Self {
        Self {
            ai_blend_alpha: 0.1,
            min_data_points_for_score: 2,
            default_domain_score: 50,
        }
    }
}

/// Skill ledger settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SkillsConfig {
    /// XP granted to a skill found in journal text when the AI gives none
    pub default_discovery_xp: f64,

    /// XP carried over per level of a skill absorbed by a merge
    ///
    /// A level 3 source with 40 xp adds 40 + 3 * 50 = 190 xp to the target.
    pub merge_xp_per_level: f64,

    /// Minimum level before a skill may evolve into its advanced name
    pub evolution_min_level: u32,
}

impl Default for SkillsConfig {
    fn default() -> Self {
        Self {
            default_discovery_xp: 20.0,
            merge_xp_per_level: 50.0,
            evolution_min_level: 5,
        }
    }
}

/// Question supplier settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SupplierConfig {
    /// How many of the lowest-scoring domains are candidates for an AI question
    ///
    /// At 3, exploration leans toward weak areas without always hitting
    /// the single weakest one.
    pub candidate_domain_count: usize,
}

impl Default for SupplierConfig {
    fn default() -> Self {
        Self { candidate_domain_count: 3 }
    }
}

/// Hero XP and gold handed to the reward sink
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RewardConfig {
    /// Per answered bank question
    pub answer_xp: u32,
    pub answer_gold: u32,
    /// Per answered AI or fallback question
    pub ai_answer_xp: u32,
    pub ai_answer_gold: u32,
    /// Extra reward the first time a domain receives data
    pub discovery_bonus_xp: u32,
    pub discovery_bonus_gold: u32,
}

impl Default for RewardConfig {
    fn default() -> Self {
        Self {
            answer_xp: 10,
            answer_gold: 5,
            ai_answer_xp: 15,
            ai_answer_gold: 5,
            discovery_bonus_xp: 25,
            discovery_bonus_gold: 10,
        }
    }
}

/// AI provider request settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LlmConfig {
    /// Per-request timeout; a slow provider falls through to the template path
    pub timeout_secs: u64,
    /// Output token cap for question and skill extraction calls
    pub max_tokens: u32,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            timeout_secs: 30,
            max_tokens: 1024,
        }
    }
}

/// Configuration for the discovery and scoring engine
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub scoring: ScoringConfig,
    pub skills: SkillsConfig,
    pub supplier: SupplierConfig,
    pub rewards: RewardConfig,
    pub llm: LlmConfig,
}

impl EngineConfig {
    /// Create a new config with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a config from TOML text and validate it
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: EngineConfig = toml::from_str(content)
            .map_err(|e| EngineError::Config(format!("Invalid TOML: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    /// Validate configuration for internal consistency
    pub fn validate(&self) -> Result<()> {
        let alpha = self.scoring.ai_blend_alpha;
        if !(alpha > 0.0 && alpha <= 1.0) {
            return Err(EngineError::Config(format!(
                "ai_blend_alpha ({}) must be in (0, 1]",
                alpha
            )));
        }

        if self.scoring.default_domain_score > 100 {
            return Err(EngineError::Config(format!(
                "default_domain_score ({}) must be <= 100",
                self.scoring.default_domain_score
            )));
        }

        if self.scoring.min_data_points_for_score == 0 {
            return Err(EngineError::Config("min_data_points_for_score must be >= 1".into()));
        }

        if self.supplier.candidate_domain_count == 0 {
            return Err(EngineError::Config("candidate_domain_count must be >= 1".into()));
        }

        if self.skills.evolution_min_level == 0 {
            return Err(EngineError::Config("evolution_min_level must be >= 1".into()));
        }

        if self.skills.default_discovery_xp < 0.0 || self.skills.merge_xp_per_level < 0.0 {
            return Err(EngineError::Config("Skill XP settings must not be negative".into()));
        }

        Ok(())
    }
}

/// Load and validate a config file
pub fn load_config(path: &Path) -> Result<EngineConfig> {
    let content = fs::read_to_string(path)
        .map_err(|e| EngineError::Config(format!("Failed to read {:?}: {}", path, e)))?;
    EngineConfig::from_toml_str(&content)
}
