//! Engine facade
//!
//! The single actor that sequences user actions. Every mutating call
//! finishes, reports rewards, and saves the settings blob before returning,
//! so `&mut self` is all the serialization the engine needs.

use crate::core::config::EngineConfig;
use crate::core::error::Result;
use crate::core::types::{DomainId, QuestionId, SkillCategory, SkillId};
use crate::discovery::{
    AnswerRecord, DiscoveryProgress, DiscoveryTracker, LegacyResponse, MigrationReport, Question,
    QuestionBank, QuestionSupplier, SuppliedQuestion,
};
use crate::host::{ActivityKind, RewardSink, Settings, SettingsStore};
use crate::llm::AiCollaborator;
use crate::skills::{
    DiscoveryAction, DiscoveryOutcome, EvolutionTable, MergeOutcome, Skill, SkillSource,
    SkillXpOutcome, SkillsLedger,
};
use chrono::NaiveDate;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use serde::Serialize;
use serde_json::json;
use std::sync::Arc;

/// Result of answering a question, including the rewards handed out
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AnswerOutcome {
    pub record: AnswerRecord,
    pub xp_awarded: u32,
    pub gold_awarded: u32,
}

/// Result of analyzing a journal entry
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct JournalOutcome {
    pub outcomes: Vec<DiscoveryOutcome>,
    /// Set when the collaborator failed; no skills were changed
    pub provider_error: Option<String>,
}

impl JournalOutcome {
    /// The caller should show a "could not reach the AI provider" notice
    pub fn used_fallback(&self) -> bool {
        self.provider_error.is_some()
    }
}

pub struct Engine<S: SettingsStore, K: RewardSink> {
    config: EngineConfig,
    bank: QuestionBank,
    evolutions: EvolutionTable,
    domain_order: Vec<DomainId>,
    store: S,
    rewards: K,
    collaborator: Arc<dyn AiCollaborator>,
    supplier: QuestionSupplier<ChaCha8Rng>,
    settings: Settings,
    /// Last question handed out, used to resolve generated question ids
    current: Option<Question>,
}

impl<S: SettingsStore, K: RewardSink> Engine<S, K> {
    /// Load settings from `store` and build an engine over the built-in bank
    pub fn new(
        config: EngineConfig,
        store: S,
        rewards: K,
        collaborator: Arc<dyn AiCollaborator>,
        seed: u64,
    ) -> Result<Self> {
        config.validate()?;

        let mut settings = store.load()?;
        settings.domains.ensure_catalog(config.scoring.default_domain_score);

        let supplier = QuestionSupplier::new(
            ChaCha8Rng::seed_from_u64(seed),
            config.supplier.clone(),
            config.scoring.default_domain_score,
        );
        let evolutions = EvolutionTable::builtin(config.skills.evolution_min_level);

        tracing::info!(
            skills = settings.skills.len(),
            discovered = settings.discovery.as_ref().map_or(0, |d| d.discovered_domains.len()),
            "Engine ready"
        );

        Ok(Self {
            config,
            bank: QuestionBank::builtin(),
            evolutions,
            domain_order: DomainId::ALL.to_vec(),
            store,
            rewards,
            collaborator,
            supplier,
            settings,
            current: None,
        })
    }

    pub fn with_evolutions(mut self, evolutions: EvolutionTable) -> Self {
        self.evolutions = evolutions;
        self
    }

    pub fn with_bank(mut self, bank: QuestionBank) -> Self {
        self.bank = bank;
        self
    }

    /// Order in which domains are walked for fresh bank questions
    pub fn with_domain_order(mut self, order: Vec<DomainId>) -> Self {
        self.domain_order = order;
        self
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn skills(&self) -> &SkillsLedger {
        &self.settings.skills
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn rewards(&self) -> &K {
        &self.rewards
    }

    pub fn current_question(&self) -> Option<&Question> {
        self.current.as_ref()
    }

    fn save(&self) -> Result<()> {
        self.store.save(&self.settings)
    }

    // ===== Discovery =====

    /// Next question to show, generating one when the bank is exhausted
    pub async fn next_question(&mut self, today: NaiveDate) -> Result<Option<SuppliedQuestion>> {
        let (state, domains) = self.settings.discovery_parts();
        let mut tracker = DiscoveryTracker::new(state, domains, &self.bank, &self.config.scoring, today);
        let supplied = self
            .supplier
            .next_question(&mut tracker, &self.domain_order, self.collaborator.as_ref())
            .await;

        if let Some(supplied) = &supplied {
            self.current = Some(supplied.question.clone());
            if supplied.question.is_synthesized() {
                // A new pending question was stashed
                self.save()?;
            }
        }
        Ok(supplied)
    }

    /// Record an answer and hand out its rewards
    pub fn answer(&mut self, question_id: &QuestionId, value: u8, today: NaiveDate) -> Result<AnswerOutcome> {
        let (state, domains) = self.settings.discovery_parts();
        let mut tracker = DiscoveryTracker::new(state, domains, &self.bank, &self.config.scoring, today);
        let record = tracker.record_answer(question_id, value, self.current.as_ref())?;

        if self.current.as_ref().map_or(false, |q| &q.id == question_id) {
            self.current = None;
        }

        let payout = &self.config.rewards;
        let (mut xp, mut gold) = if record.is_ai_question {
            (payout.ai_answer_xp, payout.ai_answer_gold)
        } else {
            (payout.answer_xp, payout.answer_gold)
        };
        self.rewards.grant_xp_and_gold(xp, gold, Some(record.domain));
        self.rewards.log_activity(
            ActivityKind::QuestionAnswered,
            &format!("Answered a {} question", record.domain.display_name()),
            json!({ "question": question_id, "value": value, "domain": record.domain }),
        );

        if record.domain_discovered {
            let (bonus_xp, bonus_gold) = (payout.discovery_bonus_xp, payout.discovery_bonus_gold);
            self.rewards.grant_xp_and_gold(bonus_xp, bonus_gold, Some(record.domain));
            self.rewards.log_activity(
                ActivityKind::DomainDiscovered,
                &format!(
                    "Discovered {} {}",
                    record.domain.icon(),
                    record.domain.display_name()
                ),
                json!({ "domain": record.domain }),
            );
            xp += bonus_xp;
            gold += bonus_gold;
        }

        self.save()?;
        Ok(AnswerOutcome {
            record,
            xp_awarded: xp,
            gold_awarded: gold,
        })
    }

    /// Move a question to the retry queue, or discard a pending generated one
    pub fn skip(&mut self, question_id: &QuestionId, today: NaiveDate) -> Result<()> {
        let (state, domains) = self.settings.discovery_parts();
        DiscoveryTracker::new(state, domains, &self.bank, &self.config.scoring, today).skip(question_id);

        if self.current.as_ref().map_or(false, |q| &q.id == question_id) {
            self.current = None;
        }
        self.save()
    }

    /// Answers recorded today
    pub fn daily_count(&mut self, today: NaiveDate) -> Result<u32> {
        let (state, domains) = self.settings.discovery_parts();
        let count = DiscoveryTracker::new(state, domains, &self.bank, &self.config.scoring, today).daily_count();
        self.save()?;
        Ok(count)
    }

    pub fn progress(&mut self, today: NaiveDate) -> DiscoveryProgress {
        let (state, domains) = self.settings.discovery_parts();
        DiscoveryTracker::new(state, domains, &self.bank, &self.config.scoring, today).progress()
    }

    /// One-time import of answers from the legacy format; grants no rewards
    pub fn migrate_legacy(&mut self, responses: &[LegacyResponse], today: NaiveDate) -> Result<MigrationReport> {
        let (state, domains) = self.settings.discovery_parts();
        let report = DiscoveryTracker::new(state, domains, &self.bank, &self.config.scoring, today)
            .migrate_legacy(responses)?;
        if report.imported > 0 {
            self.save()?;
        }
        Ok(report)
    }

    // ===== Skills =====

    /// Add a skill by hand; returns the existing skill on a name clash
    pub fn add_skill(
        &mut self,
        name: &str,
        category: SkillCategory,
        description: Option<String>,
    ) -> Result<Skill> {
        let before = self.settings.skills.total_skills_discovered;
        let skill = self
            .settings
            .skills
            .create(name, category, SkillSource::Manual, description)?
            .clone();

        if self.settings.skills.total_skills_discovered > before {
            self.rewards.log_activity(
                ActivityKind::SkillDiscovered,
                &format!("New skill: {}", skill.name),
                json!({ "skill": skill.id, "category": skill.category }),
            );
            self.save()?;
        }
        Ok(skill)
    }

    /// Grant practice XP to a skill
    pub fn practice_skill(&mut self, id: &SkillId, xp: f64) -> Result<SkillXpOutcome> {
        let outcome = self.settings.skills.add_xp(id, xp)?;
        self.log_practice(&outcome.skill, xp, outcome.levels_gained);
        self.save()?;
        Ok(outcome)
    }

    fn log_practice(&mut self, skill: &Skill, xp: f64, levels_gained: u32) {
        self.rewards.log_activity(
            ActivityKind::SkillPracticed,
            &format!("Practiced {}", skill.name),
            json!({ "skill": skill.id, "xp": xp }),
        );
        if levels_gained > 0 {
            self.rewards.log_activity(
                ActivityKind::SkillLeveledUp,
                &format!("{} reached level {}", skill.name, skill.level),
                json!({ "skill": skill.id, "level": skill.level, "gained": levels_gained }),
            );
        }
    }

    /// Spend one pooled skill point on a skill
    pub fn spend_skill_point(&mut self, id: &SkillId) -> Result<Skill> {
        let skill = self.settings.skills.level_up_by_skill_point(id)?.clone();
        self.rewards.log_activity(
            ActivityKind::SkillLeveledUp,
            &format!("{} reached level {}", skill.name, skill.level),
            json!({ "skill": skill.id, "level": skill.level, "skill_point": true }),
        );
        self.save()?;
        Ok(skill)
    }

    /// Add points to the shared pool (the host calls this on hero level-ups)
    pub fn grant_skill_points(&mut self, points: u32) -> Result<u32> {
        self.settings.skills.grant_skill_points(points);
        self.save()?;
        Ok(self.settings.skills.available_skill_points)
    }

    pub fn delete_skill(&mut self, id: &SkillId) -> Result<Skill> {
        let skill = self.settings.skills.delete(id)?;
        self.rewards.log_activity(
            ActivityKind::SkillDeleted,
            &format!("Removed {}", skill.name),
            json!({ "skill": skill.id }),
        );
        self.save()?;
        Ok(skill)
    }

    /// Fold `source` into `target`; irreversible
    pub fn merge_skills(&mut self, source: &SkillId, target: &SkillId) -> Result<MergeOutcome> {
        let outcome = self
            .settings
            .skills
            .merge(source, target, &self.config.skills)?;
        self.rewards.log_activity(
            ActivityKind::SkillsMerged,
            &format!("Merged {} into {}", outcome.absorbed_name, outcome.merged.name),
            json!({
                "skill": outcome.merged.id,
                "absorbed": outcome.absorbed_name,
                "xp": outcome.xp_transferred,
            }),
        );
        self.save()?;
        Ok(outcome)
    }

    /// Rename a skill to its evolved form when eligible
    ///
    /// Returns the previous name when the skill evolved.
    pub fn evolve_skill(&mut self, id: &SkillId) -> Result<Option<String>> {
        let Some(previous) = self.settings.skills.evolve(id, &self.evolutions)? else {
            return Ok(None);
        };
        let name = self
            .settings
            .skills
            .get(id)
            .map(|s| s.name.clone())
            .unwrap_or_default();
        self.rewards.log_activity(
            ActivityKind::SkillEvolved,
            &format!("{} evolved into {}", previous, name),
            json!({ "skill": id, "from": previous, "to": name }),
        );
        self.save()?;
        Ok(Some(previous))
    }

    /// Extract skills from journal text and apply them to the ledger
    ///
    /// A provider failure leaves the ledger untouched and is reported in
    /// the outcome rather than as an error.
    pub async fn analyze_journal(&mut self, text: &str) -> Result<JournalOutcome> {
        if text.trim().is_empty() {
            return Ok(JournalOutcome::default());
        }

        let existing = self.settings.skills.names();
        let discovered = match self.collaborator.extract_skills(text, &existing).await {
            Ok(discovered) => discovered,
            Err(e) => {
                tracing::warn!(error = %e, "Skill extraction failed");
                return Ok(JournalOutcome {
                    outcomes: Vec::new(),
                    provider_error: Some(e.to_string()),
                });
            }
        };

        let outcomes = self
            .settings
            .skills
            .process_discovered(&discovered, &self.evolutions, &self.config.skills);

        for outcome in &outcomes {
            let (kind, description) = match &outcome.action {
                DiscoveryAction::Discovered => {
                    (ActivityKind::SkillDiscovered, format!("New skill: {}", outcome.skill_name))
                }
                DiscoveryAction::XpAdded { .. } => (
                    ActivityKind::SkillPracticed,
                    format!("Practiced {} (+{} XP)", outcome.skill_name, outcome.xp_awarded),
                ),
                DiscoveryAction::Evolved { from, .. } => (
                    ActivityKind::SkillEvolved,
                    format!("{} evolved into {}", from, outcome.skill_name),
                ),
            };
            let details = serde_json::to_value(outcome)?;
            self.rewards.log_activity(kind, &description, details);
        }
        self.rewards.log_activity(
            ActivityKind::JournalAnalyzed,
            &format!("Journal analyzed: {} skill update(s)", outcomes.len()),
            json!({ "updates": outcomes.len() }),
        );

        self.save()?;
        Ok(JournalOutcome {
            outcomes,
            provider_error: None,
        })
    }
}
