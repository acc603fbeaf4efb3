//! Skill ledger operations
//!
//! Create, practice, spend points, delete, merge and the AI discovery pass.
//! Every operation validates first and mutates last, so a failed call
//! leaves the ledger untouched.

use crate::core::config::SkillsConfig;
use crate::core::error::{EngineError, Result};
use crate::core::types::{SkillCategory, SkillId};
use crate::scoring::{apply_xp, xp_required_for_level, MAX_LEVEL};
use crate::skills::similarity::{find_similar, SimilarMatch, Similarity};
use crate::skills::{EvolutionTable, Skill, SkillSource, SkillsLedger};
use chrono::Utc;
use serde::{Deserialize, Serialize};

/// Result of granting XP to a skill
#[derive(Debug, Clone, PartialEq)]
pub struct SkillXpOutcome {
    pub skill: Skill,
    pub levels_gained: u32,
}

/// Result of folding one skill into another
#[derive(Debug, Clone, PartialEq)]
pub struct MergeOutcome {
    pub merged: Skill,
    pub absorbed_name: String,
    pub xp_transferred: f64,
    pub levels_gained: u32,
}

/// A skill candidate reported by the AI collaborator
///
/// Fields are optional because they come from model output; entries
/// without a usable name or category are dropped.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DiscoveredSkill {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub xp: Option<f64>,
    #[serde(default)]
    pub description: Option<String>,
}

impl DiscoveredSkill {
    pub fn new(name: &str, category: SkillCategory, xp: Option<f64>) -> Self {
        Self {
            name: Some(name.to_string()),
            category: Some(category.as_str().to_string()),
            xp,
            description: None,
        }
    }
}

/// What happened to one discovered skill
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum DiscoveryAction {
    /// A new skill entered the ledger
    Discovered,
    /// XP went to an existing skill
    XpAdded { similarity: Similarity },
    /// XP went to an existing skill, which then evolved
    Evolved { similarity: Similarity, from: String },
}

/// Outcome for one processed discovery
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DiscoveryOutcome {
    #[serde(flatten)]
    pub action: DiscoveryAction,
    pub skill_id: SkillId,
    /// Name after processing (the evolved name when evolution fired)
    pub skill_name: String,
    pub xp_awarded: f64,
    pub levels_gained: u32,
}

impl SkillsLedger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.skills.len()
    }

    pub fn is_empty(&self) -> bool {
        self.skills.is_empty()
    }

    pub fn get(&self, id: &SkillId) -> Option<&Skill> {
        self.skills.iter().find(|s| &s.id == id)
    }

    fn get_mut(&mut self, id: &SkillId) -> Option<&mut Skill> {
        self.skills.iter_mut().find(|s| &s.id == id)
    }

    fn position(&self, id: &SkillId) -> Result<usize> {
        self.skills
            .iter()
            .position(|s| &s.id == id)
            .ok_or_else(|| EngineError::NotFound(format!("skill {}", id)))
    }

    pub fn find_by_name(&self, name: &str) -> Option<&Skill> {
        self.skills.iter().find(|s| s.name_matches(name))
    }

    pub fn names(&self) -> Vec<String> {
        self.skills.iter().map(|s| s.name.clone()).collect()
    }

    /// Skills ordered by level, then progress, for dashboards
    pub fn ranked(&self) -> Vec<&Skill> {
        let mut ranked: Vec<&Skill> = self.skills.iter().collect();
        ranked.sort_by(|a, b| {
            b.level
                .cmp(&a.level)
                .then(b.xp.total_cmp(&a.xp))
                .then_with(|| a.name.cmp(&b.name))
        });
        ranked
    }

    /// Create a skill, or return the existing one with the same name
    ///
    /// Name comparison ignores case. Only a real creation counts toward
    /// `total_skills_discovered`.
    pub fn create(
        &mut self,
        name: &str,
        category: SkillCategory,
        source: SkillSource,
        description: Option<String>,
    ) -> Result<&Skill> {
        let name = name.trim();
        if name.is_empty() {
            return Err(EngineError::InvalidOperation("skill name is empty".into()));
        }

        if let Some(index) = self.skills.iter().position(|s| s.name_matches(name)) {
            return Ok(&self.skills[index]);
        }

        let skill = Skill::new(name, category, source, description);
        tracing::info!(skill = %skill.name, category = %category, "Skill discovered");
        self.skills.push(skill);
        self.total_skills_discovered += 1;
        Ok(&self.skills[self.skills.len() - 1])
    }

    /// Grant XP to a skill and count it as a practice session
    pub fn add_xp(&mut self, id: &SkillId, amount: f64) -> Result<SkillXpOutcome> {
        let skill = self
            .get_mut(id)
            .ok_or_else(|| EngineError::NotFound(format!("skill {}", id)))?;

        let gain = apply_xp(skill.xp_state(), amount);
        skill.set_xp_state(gain.state);
        skill.total_practice_count += 1;
        skill.last_practiced = Some(Utc::now());

        if gain.levels_gained > 0 {
            tracing::info!(
                skill = %skill.name,
                level = skill.level,
                gained = gain.levels_gained,
                "Skill leveled up"
            );
        }

        Ok(SkillXpOutcome {
            skill: skill.clone(),
            levels_gained: gain.levels_gained,
        })
    }

    /// Add points to the shared pool
    pub fn grant_skill_points(&mut self, points: u32) {
        self.available_skill_points = self.available_skill_points.saturating_add(points);
    }

    /// Spend one pooled point to raise a skill by one level
    ///
    /// Progress toward the next level is reset.
    pub fn level_up_by_skill_point(&mut self, id: &SkillId) -> Result<&Skill> {
        if self.available_skill_points == 0 {
            return Err(EngineError::NoPointsAvailable);
        }
        let index = self.position(id)?;
        if self.skills[index].level >= MAX_LEVEL {
            return Err(EngineError::InvalidOperation(format!(
                "{} is already at the maximum level",
                self.skills[index].name
            )));
        }

        self.available_skill_points -= 1;
        let skill = &mut self.skills[index];
        skill.level += 1;
        skill.xp = 0.0;
        skill.xp_to_next_level = xp_required_for_level(skill.level);

        tracing::info!(skill = %skill.name, level = skill.level, "Skill point spent");
        Ok(&self.skills[index])
    }

    /// Remove a skill
    pub fn delete(&mut self, id: &SkillId) -> Result<Skill> {
        let index = self.position(id)?;
        Ok(self.skills.remove(index))
    }

    /// Fold `source` into `target`
    ///
    /// The target receives the source's XP plus a per-level bonus, then
    /// levels up as usual. Practice counts are summed and the source is
    /// removed. Nothing changes unless both skills exist and differ.
    pub fn merge(
        &mut self,
        source_id: &SkillId,
        target_id: &SkillId,
        config: &SkillsConfig,
    ) -> Result<MergeOutcome> {
        if source_id == target_id {
            return Err(EngineError::InvalidOperation(format!(
                "cannot merge skill {} into itself",
                source_id
            )));
        }
        let source_index = self.position(source_id)?;
        let target_index = self.position(target_id)?;

        let source = self.skills[source_index].clone();
        let transferred = source.xp + source.level as f64 * config.merge_xp_per_level;

        let target = &mut self.skills[target_index];
        let gain = apply_xp(target.xp_state(), transferred);
        target.set_xp_state(gain.state);
        target.total_practice_count += source.total_practice_count;
        target.last_practiced = target.last_practiced.max(source.last_practiced);
        let merged = target.clone();

        self.skills.remove(source_index);

        tracing::info!(
            from = %source.name,
            into = %merged.name,
            xp = transferred,
            "Skills merged"
        );

        Ok(MergeOutcome {
            merged,
            absorbed_name: source.name,
            xp_transferred: transferred,
            levels_gained: gain.levels_gained,
        })
    }

    /// First skill resembling `name` (see [`find_similar`])
    pub fn find_similar(&self, name: &str) -> Option<SimilarMatch<'_>> {
        find_similar(&self.skills, name)
    }

    /// Rename a skill to its evolved form if the table allows it
    ///
    /// Returns the previous name. Evolution is skipped when another skill
    /// already carries the evolved name, keeping names unique.
    pub fn evolve(&mut self, id: &SkillId, table: &EvolutionTable) -> Result<Option<String>> {
        let index = self.position(id)?;
        let Some(evolved) = table.check_evolution(&self.skills[index]) else {
            return Ok(None);
        };

        let current = &self.skills[index];
        if current.name == evolved {
            return Ok(None);
        }
        let taken = self
            .skills
            .iter()
            .any(|s| s.id != current.id && s.name_matches(evolved));
        if taken {
            tracing::debug!(skill = %current.name, evolved, "Evolved name already in use");
            return Ok(None);
        }

        let skill = &mut self.skills[index];
        let previous = std::mem::replace(&mut skill.name, evolved.to_string());
        tracing::info!(from = %previous, to = %skill.name, "Skill evolved");
        Ok(Some(previous))
    }

    /// Apply a batch of AI-discovered skills
    ///
    /// Each entry either feeds XP into a resembling skill (possibly
    /// evolving it) or creates a new one. Entries lacking a name or a known
    /// category are skipped; outcomes follow input order.
    pub fn process_discovered(
        &mut self,
        discoveries: &[DiscoveredSkill],
        table: &EvolutionTable,
        config: &SkillsConfig,
    ) -> Vec<DiscoveryOutcome> {
        let mut outcomes = Vec::with_capacity(discoveries.len());

        for discovery in discoveries {
            let Some(name) = discovery.name.as_deref().map(str::trim).filter(|n| !n.is_empty())
            else {
                continue;
            };
            let Some(category) = discovery
                .category
                .as_deref()
                .and_then(|c| c.parse::<SkillCategory>().ok())
            else {
                tracing::debug!(skill = name, category = ?discovery.category, "Skipping discovery without category");
                continue;
            };

            let matched = self
                .find_similar(name)
                .map(|m| (m.skill.id.clone(), m.similarity));

            let outcome = match matched {
                Some((id, similarity)) => {
                    let xp = discovery
                        .xp
                        .filter(|xp| xp.is_finite())
                        .unwrap_or(config.default_discovery_xp)
                        .max(0.0);
                    self.feed_existing(&id, similarity, xp, table)
                }
                None => self.create_discovered(name, category, discovery),
            };

            match outcome {
                Ok(outcome) => outcomes.push(outcome),
                Err(e) => tracing::warn!(skill = name, error = %e, "Discovery not applied"),
            }
        }

        outcomes
    }

    fn feed_existing(
        &mut self,
        id: &SkillId,
        similarity: Similarity,
        xp: f64,
        table: &EvolutionTable,
    ) -> Result<DiscoveryOutcome> {
        let gained = self.add_xp(id, xp)?;
        let action = match self.evolve(id, table)? {
            Some(from) => DiscoveryAction::Evolved { similarity, from },
            None => DiscoveryAction::XpAdded { similarity },
        };
        let skill_name = self.get(id).map(|s| s.name.clone()).unwrap_or_default();

        Ok(DiscoveryOutcome {
            action,
            skill_id: id.clone(),
            skill_name,
            xp_awarded: xp,
            levels_gained: gained.levels_gained,
        })
    }

    fn create_discovered(
        &mut self,
        name: &str,
        category: SkillCategory,
        discovery: &DiscoveredSkill,
    ) -> Result<DiscoveryOutcome> {
        let id = self
            .create(name, category, SkillSource::Journal, discovery.description.clone())?
            .id
            .clone();

        let granted = discovery.xp.filter(|xp| xp.is_finite() && *xp > 0.0);
        let (xp_awarded, levels_gained) = match granted {
            Some(xp) => (xp, self.add_xp(&id, xp)?.levels_gained),
            None => (0.0, 0),
        };

        Ok(DiscoveryOutcome {
            action: DiscoveryAction::Discovered,
            skill_id: id,
            skill_name: name.to_string(),
            xp_awarded,
            levels_gained,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ledger_with(names: &[&str]) -> SkillsLedger {
        let mut ledger = SkillsLedger::new();
        for name in names {
            ledger
                .create(name, SkillCategory::Mind, SkillSource::Manual, None)
                .unwrap();
        }
        ledger
    }

    fn id_of(ledger: &SkillsLedger, name: &str) -> SkillId {
        ledger.find_by_name(name).unwrap().id.clone()
    }

    #[test]
    fn test_create_is_idempotent_by_name() {
        let mut ledger = SkillsLedger::new();
        let first = ledger
            .create("Writing", SkillCategory::Mind, SkillSource::Manual, None)
            .unwrap()
            .id
            .clone();
        let second = ledger
            .create("  WRITING", SkillCategory::Body, SkillSource::Journal, None)
            .unwrap()
            .id
            .clone();

        assert_eq!(first, second);
        assert_eq!(ledger.len(), 1);
        assert_eq!(ledger.total_skills_discovered, 1);
        assert_eq!(ledger.skills[0].category, SkillCategory::Mind);
    }

    #[test]
    fn test_create_rejects_blank_name() {
        let mut ledger = SkillsLedger::new();
        assert!(ledger
            .create("  ", SkillCategory::Mind, SkillSource::Manual, None)
            .is_err());
        assert_eq!(ledger.total_skills_discovered, 0);
    }

    #[test]
    fn test_add_xp_levels_and_counts_practice() {
        let mut ledger = ledger_with(&["Running"]);
        let id = id_of(&ledger, "Running");

        let outcome = ledger.add_xp(&id, 250.0).unwrap();
        assert_eq!(outcome.levels_gained, 2);
        assert_eq!(outcome.skill.level, 3);
        assert_eq!(outcome.skill.xp, 0.0);
        assert_eq!(outcome.skill.total_practice_count, 1);
        assert!(outcome.skill.last_practiced.is_some());
    }

    #[test]
    fn test_add_xp_unknown_skill() {
        let mut ledger = SkillsLedger::new();
        let err = ledger.add_xp(&SkillId::from("missing"), 10.0).unwrap_err();
        assert!(matches!(err, EngineError::NotFound(_)));
    }

    #[test]
    fn test_skill_point_requires_pool() {
        let mut ledger = ledger_with(&["Chess"]);
        let id = id_of(&ledger, "Chess");

        assert!(matches!(
            ledger.level_up_by_skill_point(&id),
            Err(EngineError::NoPointsAvailable)
        ));

        ledger.grant_skill_points(1);
        ledger.add_xp(&id, 60.0).unwrap();
        let skill = ledger.level_up_by_skill_point(&id).unwrap();
        assert_eq!(skill.level, 2);
        assert_eq!(skill.xp, 0.0);
        assert_eq!(skill.xp_to_next_level, 150.0);
        assert_eq!(ledger.available_skill_points, 0);
    }

    #[test]
    fn test_skill_point_missing_skill_keeps_pool() {
        let mut ledger = SkillsLedger::new();
        ledger.grant_skill_points(2);
        assert!(ledger.level_up_by_skill_point(&SkillId::from("nope")).is_err());
        assert_eq!(ledger.available_skill_points, 2);
    }

    #[test]
    fn test_delete() {
        let mut ledger = ledger_with(&["Yoga", "Chess"]);
        let id = id_of(&ledger, "Yoga");
        let removed = ledger.delete(&id).unwrap();
        assert_eq!(removed.name, "Yoga");
        assert_eq!(ledger.len(), 1);
        assert!(matches!(ledger.delete(&id), Err(EngineError::NotFound(_))));
        assert_eq!(ledger.total_skills_discovered, 2);
    }

    #[test]
    fn test_merge_transfers_xp_and_removes_source() {
        let mut ledger = ledger_with(&["Jogging", "Running"]);
        let source = id_of(&ledger, "Jogging");
        let target = id_of(&ledger, "Running");
        ledger.add_xp(&source, 30.0).unwrap();
        ledger.add_xp(&target, 40.0).unwrap();

        // 40 + (30 + 1 * 50) = 120 -> level 2 with 20 xp
        let outcome = ledger.merge(&source, &target, &SkillsConfig::default()).unwrap();
        assert_eq!(outcome.xp_transferred, 80.0);
        assert_eq!(outcome.levels_gained, 1);
        assert_eq!(outcome.merged.level, 2);
        assert_eq!(outcome.merged.xp, 20.0);
        assert_eq!(outcome.merged.total_practice_count, 2);
        assert_eq!(outcome.absorbed_name, "Jogging");

        assert_eq!(ledger.len(), 1);
        assert!(ledger.get(&source).is_none());
        assert!(ledger.find_similar("Jogging").is_none());
    }

    #[test]
    fn test_merge_missing_skill_is_atomic() {
        let mut ledger = ledger_with(&["Painting"]);
        let id = id_of(&ledger, "Painting");
        let before = ledger.clone();

        let err = ledger
            .merge(&SkillId::from("ghost"), &id, &SkillsConfig::default())
            .unwrap_err();
        assert!(matches!(err, EngineError::NotFound(_)));
        assert!(ledger
            .merge(&id, &SkillId::from("ghost"), &SkillsConfig::default())
            .is_err());
        assert_eq!(ledger, before);
    }

    #[test]
    fn test_merge_into_itself_rejected() {
        let mut ledger = ledger_with(&["Painting"]);
        let id = id_of(&ledger, "Painting");
        assert!(matches!(
            ledger.merge(&id, &id, &SkillsConfig::default()),
            Err(EngineError::InvalidOperation(_))
        ));
        assert_eq!(ledger.len(), 1);
    }

    #[test]
    fn test_evolve_renames_eligible_skill() {
        let mut ledger = ledger_with(&["Writing"]);
        let id = id_of(&ledger, "Writing");
        let table = EvolutionTable::default();

        assert_eq!(ledger.evolve(&id, &table).unwrap(), None);

        ledger.skills[0].level = 5;
        assert_eq!(ledger.evolve(&id, &table).unwrap(), Some("Writing".to_string()));
        assert_eq!(ledger.get(&id).unwrap().name, "Storytelling");
    }

    #[test]
    fn test_evolve_skips_taken_name() {
        let mut ledger = ledger_with(&["Writing", "Storytelling"]);
        let id = id_of(&ledger, "Writing");
        ledger.skills[0].level = 6;
        assert_eq!(ledger.evolve(&id, &EvolutionTable::default()).unwrap(), None);
        assert_eq!(ledger.skills[0].name, "Writing");
    }

    #[test]
    fn test_process_discovered_mixed_batch() {
        let mut ledger = ledger_with(&["Writing"]);
        let table = EvolutionTable::default();
        let config = SkillsConfig::default();

        let batch = vec![
            DiscoveredSkill::new("writing", SkillCategory::Mind, None),
            DiscoveredSkill::new("Woodworking", SkillCategory::Vocation, Some(30.0)),
            DiscoveredSkill { name: None, category: Some("mind".into()), ..Default::default() },
            DiscoveredSkill { name: Some("Tarot".into()), category: Some("magic".into()), ..Default::default() },
            DiscoveredSkill::new("Sketching", SkillCategory::Spirit, None),
        ];

        let outcomes = ledger.process_discovered(&batch, &table, &config);
        assert_eq!(outcomes.len(), 3);

        assert_eq!(
            outcomes[0].action,
            DiscoveryAction::XpAdded { similarity: Similarity::Exact }
        );
        assert_eq!(outcomes[0].xp_awarded, 20.0);

        assert_eq!(outcomes[1].action, DiscoveryAction::Discovered);
        assert_eq!(outcomes[1].xp_awarded, 30.0);
        assert_eq!(ledger.find_by_name("Woodworking").unwrap().xp, 30.0);

        assert_eq!(outcomes[2].action, DiscoveryAction::Discovered);
        assert_eq!(ledger.find_by_name("Sketching").unwrap().total_practice_count, 0);

        assert_eq!(ledger.total_skills_discovered, 3);
    }

    #[test]
    fn test_process_discovered_reports_evolution() {
        let mut ledger = ledger_with(&["Cooking"]);
        ledger.skills[0].level = 5;
        ledger.skills[0].xp_to_next_level = xp_required_for_level(5);

        let outcomes = ledger.process_discovered(
            &[DiscoveredSkill::new("Cooking", SkillCategory::Body, Some(10.0))],
            &EvolutionTable::default(),
            &SkillsConfig::default(),
        );

        assert_eq!(
            outcomes[0].action,
            DiscoveryAction::Evolved { similarity: Similarity::Exact, from: "Cooking".into() }
        );
        assert_eq!(outcomes[0].skill_name, "Culinary Arts");
        assert!(ledger.find_by_name("Culinary Arts").is_some());
    }

    #[test]
    fn test_process_discovered_reports_applied_xp() {
        let mut ledger = ledger_with(&["Writing", "Chess", "Baking"]);
        let batch = vec![
            DiscoveredSkill::new("Writing", SkillCategory::Mind, Some(-40.0)),
            DiscoveredSkill::new("Chess", SkillCategory::Mind, Some(f64::NAN)),
            DiscoveredSkill::new("Baking", SkillCategory::Body, Some(f64::INFINITY)),
            DiscoveredSkill::new("Pottery", SkillCategory::Spirit, Some(f64::INFINITY)),
        ];

        let outcomes =
            ledger.process_discovered(&batch, &EvolutionTable::default(), &SkillsConfig::default());
        let awarded: Vec<f64> = outcomes.iter().map(|o| o.xp_awarded).collect();
        assert_eq!(awarded, vec![0.0, 20.0, 20.0, 0.0]);

        assert_eq!(ledger.find_by_name("Writing").unwrap().xp, 0.0);
        assert_eq!(ledger.find_by_name("Chess").unwrap().xp, 20.0);
        assert_eq!(ledger.find_by_name("Baking").unwrap().xp, 20.0);
        assert_eq!(ledger.find_by_name("Pottery").unwrap().xp, 0.0);
    }

    #[test]
    fn test_huge_xp_grant_keeps_invariant() {
        let mut ledger = ledger_with(&["Running"]);
        let id = id_of(&ledger, "Running");

        let outcome = ledger.add_xp(&id, 1e30).unwrap();
        assert!(outcome.levels_gained > 100);
        assert!(outcome.skill.xp < outcome.skill.xp_to_next_level);

        let outcome = ledger.add_xp(&id, f64::MAX).unwrap();
        assert_eq!(outcome.skill.level, MAX_LEVEL);
        assert!(outcome.skill.xp < outcome.skill.xp_to_next_level);
    }

    #[test]
    fn test_skill_point_rejected_at_max_level() {
        let mut ledger = ledger_with(&["Running"]);
        let id = id_of(&ledger, "Running");
        ledger.add_xp(&id, f64::MAX).unwrap();
        ledger.grant_skill_points(1);

        assert!(matches!(
            ledger.level_up_by_skill_point(&id),
            Err(EngineError::InvalidOperation(_))
        ));
        assert_eq!(ledger.available_skill_points, 1);
        assert_eq!(ledger.get(&id).unwrap().level, MAX_LEVEL);
    }

    #[test]
    fn test_ranked_orders_by_level_then_xp() {
        let mut ledger = ledger_with(&["A", "B", "C"]);
        let b = id_of(&ledger, "B");
        let c = id_of(&ledger, "C");
        ledger.add_xp(&b, 120.0).unwrap();
        ledger.add_xp(&c, 50.0).unwrap();

        let names: Vec<_> = ledger.ranked().iter().map(|s| s.name.as_str()).collect();
        assert_eq!(names, vec!["B", "C", "A"]);
    }
}
