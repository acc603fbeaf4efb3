//! Skill ledger
//!
//! Skills are leveled capabilities the user practices: added by hand or
//! extracted from journal text by the AI collaborator. XP overflow rolls
//! into level-ups, pooled skill points buy levels directly, similar skills
//! can be merged, and practiced skills evolve into advanced names.

pub mod evolution;
pub mod ledger;
pub mod similarity;
pub mod skill;

pub use evolution::{EvolutionTable, DEFAULT_EVOLUTION_MIN_LEVEL};
pub use ledger::{DiscoveredSkill, DiscoveryAction, DiscoveryOutcome, MergeOutcome, SkillXpOutcome};
pub use similarity::{find_similar, SimilarMatch, Similarity};
pub use skill::{Skill, SkillSource, SkillsLedger};
