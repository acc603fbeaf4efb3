//! Reward sink
//!
//! Hero XP, gold and the activity log belong to the surrounding
//! application. The engine only reports events through `RewardSink`.

use crate::core::types::DomainId;
use serde::Serialize;
use serde_json::Value;

/// Kinds of activity-log entries the engine produces
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ActivityKind {
    QuestionAnswered,
    DomainDiscovered,
    SkillDiscovered,
    SkillPracticed,
    SkillLeveledUp,
    SkillEvolved,
    SkillsMerged,
    SkillDeleted,
    JournalAnalyzed,
}

pub trait RewardSink {
    fn grant_xp_and_gold(&mut self, xp: u32, gold: u32, domain: Option<DomainId>);
    fn log_activity(&mut self, kind: ActivityKind, description: &str, details: Value);
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Grant {
    pub xp: u32,
    pub gold: u32,
    pub domain: Option<DomainId>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Activity {
    pub kind: ActivityKind,
    pub description: String,
    pub details: Value,
}

/// Keeps every grant and activity in memory
#[derive(Debug, Clone, Default, Serialize)]
pub struct RewardLedger {
    pub total_xp: u64,
    pub total_gold: u64,
    pub grants: Vec<Grant>,
    pub activities: Vec<Activity>,
}

impl RewardLedger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn activities_of(&self, kind: ActivityKind) -> impl Iterator<Item = &Activity> {
        self.activities.iter().filter(move |a| a.kind == kind)
    }
}

impl RewardSink for RewardLedger {
    fn grant_xp_and_gold(&mut self, xp: u32, gold: u32, domain: Option<DomainId>) {
        self.total_xp += xp as u64;
        self.total_gold += gold as u64;
        self.grants.push(Grant { xp, gold, domain });
    }

    fn log_activity(&mut self, kind: ActivityKind, description: &str, details: Value) {
        self.activities.push(Activity {
            kind,
            description: description.to_string(),
            details,
        });
    }
}

/// Only logs; for hosts that track rewards elsewhere
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingRewardSink;

impl RewardSink for TracingRewardSink {
    fn grant_xp_and_gold(&mut self, xp: u32, gold: u32, domain: Option<DomainId>) {
        tracing::info!(xp, gold, domain = ?domain, "Reward granted");
    }

    fn log_activity(&mut self, kind: ActivityKind, description: &str, details: Value) {
        tracing::info!(kind = ?kind, %details, "{}", description);
    }
}
