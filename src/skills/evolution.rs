//! Skill evolution table
//!
//! A practiced skill can evolve into an advanced form ("Writing" becomes
//! "Storytelling"). The mapping is data: a built-in table that a TOML file
//! can replace, keyed on the exact skill name.

use crate::core::error::{EngineError, Result};
use crate::skills::Skill;
use serde::Deserialize;
use std::collections::HashMap;
use std::fs;
use std::path::Path;

/// Level a skill must reach before it may evolve
pub const DEFAULT_EVOLUTION_MIN_LEVEL: u32 = 5;

const BUILTIN_EVOLUTIONS: &[(&str, &str)] = &[
    ("Writing", "Storytelling"),
    ("Reading", "Scholarship"),
    ("Running", "Endurance Running"),
    ("Cooking", "Culinary Arts"),
    ("Meditation", "Mindfulness Mastery"),
    ("Programming", "Software Architecture"),
    ("Public Speaking", "Oratory"),
    ("Drawing", "Illustration"),
    ("Guitar", "Musicianship"),
    ("Budgeting", "Financial Planning"),
    ("Gardening", "Horticulture"),
    ("Journaling", "Self-Reflection"),
];

/// TOML representation of an evolution file
#[derive(Debug, Deserialize)]
struct TomlEvolutions {
    #[serde(default)]
    min_level: Option<u32>,
    evolutions: HashMap<String, String>,
}

/// Name -> evolved name lookup
#[derive(Debug, Clone, PartialEq)]
pub struct EvolutionTable {
    min_level: u32,
    entries: HashMap<String, String>,
}

impl EvolutionTable {
    /// Empty table (nothing ever evolves)
    pub fn new(min_level: u32) -> Self {
        Self {
            min_level: min_level.max(1),
            entries: HashMap::new(),
        }
    }

    /// Table with the shipped evolutions
    pub fn builtin(min_level: u32) -> Self {
        let mut table = Self::new(min_level);
        for (from, to) in BUILTIN_EVOLUTIONS {
            table.insert(*from, *to);
        }
        table
    }

    pub fn insert(&mut self, from: impl Into<String>, to: impl Into<String>) {
        self.entries.insert(from.into(), to.into());
    }

    pub fn min_level(&self) -> u32 {
        self.min_level
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Evolved name for a skill, if it is eligible
    ///
    /// Pure lookup: the skill must be at `min_level` or above and its
    /// current name must be in the table.
    pub fn check_evolution(&self, skill: &Skill) -> Option<&str> {
        if skill.level < self.min_level {
            return None;
        }
        self.entries.get(&skill.name).map(String::as_str)
    }

    /// Parse a table from TOML text
    ///
    /// A `min_level` key in the file overrides `default_min_level`.
    pub fn parse_toml(content: &str, default_min_level: u32) -> Result<Self> {
        let data: TomlEvolutions = toml::from_str(content)
            .map_err(|e| EngineError::Config(format!("Invalid evolution table: {}", e)))?;

        let mut table = Self::new(data.min_level.unwrap_or(default_min_level));
        for (from, to) in data.evolutions {
            if from.trim().is_empty() || to.trim().is_empty() {
                return Err(EngineError::Config(format!(
                    "Evolution entry with empty name: {:?} -> {:?}",
                    from, to
                )));
            }
            table.insert(from, to);
        }
        Ok(table)
    }

    /// Load a table from a TOML file
    pub fn load_from_toml(path: &Path, default_min_level: u32) -> Result<Self> {
        let content = fs::read_to_string(path)
            .map_err(|e| EngineError::Config(format!("Failed to read {:?}: {}", path, e)))?;
        Self::parse_toml(&content, default_min_level)
    }
}

impl Default for EvolutionTable {
    fn default() -> Self {
        Self::builtin(DEFAULT_EVOLUTION_MIN_LEVEL)
    }
}
