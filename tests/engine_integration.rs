//! Integration tests for the engine facade: rewards, persistence and the
//! AI collaborator paths

use async_trait::async_trait;
use chrono::NaiveDate;
use lifequest::core::config::EngineConfig;
use lifequest::core::error::{EngineError, Result};
use lifequest::core::types::{DomainId, QuestionId, SkillCategory};
use lifequest::discovery::{LegacyResponse, QuestionBank, QuestionSource};
use lifequest::host::{ActivityKind, JsonFileStore, MemoryStore, RewardLedger};
use lifequest::llm::{AiCollaborator, DomainContext, GeneratedQuestion, HistoryContext};
use lifequest::skills::{DiscoveredSkill, DiscoveryAction};
use lifequest::Engine;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tempfile::tempdir;

/// Replies with canned questions and skills, or fails when offline
struct ScriptedCollaborator {
    online: bool,
    skills: Vec<DiscoveredSkill>,
    question_calls: AtomicUsize,
}

impl ScriptedCollaborator {
    fn online(skills: Vec<DiscoveredSkill>) -> Arc<Self> {
        Arc::new(Self {
            online: true,
            skills,
            question_calls: AtomicUsize::new(0),
        })
    }

    fn offline() -> Arc<Self> {
        Arc::new(Self {
            online: false,
            skills: Vec::new(),
            question_calls: AtomicUsize::new(0),
        })
    }
}

#[async_trait]
impl AiCollaborator for ScriptedCollaborator {
    async fn generate_question(
        &self,
        domain: &DomainContext,
        history: &HistoryContext,
    ) -> Result<GeneratedQuestion> {
        self.question_calls.fetch_add(1, Ordering::SeqCst);
        if !self.online {
            return Err(EngineError::Provider("connection refused".into()));
        }
        Ok(GeneratedQuestion {
            text: format!("I feel good about my {} ({} answers so far).", domain.name, history.total_answered),
            hint: Some("Think about the last month.".into()),
        })
    }

    async fn extract_skills(&self, _text: &str, _existing: &[String]) -> Result<Vec<DiscoveredSkill>> {
        if !self.online {
            return Err(EngineError::Provider("connection refused".into()));
        }
        Ok(self.skills.clone())
    }
}

fn today() -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 6, 10).unwrap()
}

fn engine_with(collaborator: Arc<ScriptedCollaborator>) -> Engine<MemoryStore, RewardLedger> {
    Engine::new(
        EngineConfig::default(),
        MemoryStore::new(),
        RewardLedger::new(),
        collaborator,
        7,
    )
    .unwrap()
}

/// Answer every bank question, then switch to generated questions
#[tokio::test]
async fn test_full_discovery_run() {
    let collaborator = ScriptedCollaborator::online(Vec::new());
    let mut engine = engine_with(collaborator.clone());
    let bank_size = QuestionBank::builtin().len();

    for _ in 0..bank_size {
        let supplied = engine.next_question(today()).await.unwrap().unwrap();
        assert_eq!(supplied.source, QuestionSource::Bank);
        let id = supplied.question.id.clone();
        engine.answer(&id, 3, today()).unwrap();
    }

    let progress = engine.progress(today());
    assert!(progress.all_core_complete);
    assert_eq!(progress.discovered_domains, DomainId::ALL.to_vec());
    assert_eq!(progress.questions_today as usize, bank_size);
    assert!(progress.domains.iter().all(|d| d.score == Some(50)));

    // 10 per answer plus 25 per discovered domain
    let rewards = engine.rewards();
    assert_eq!(rewards.total_xp, bank_size as u64 * 10 + 9 * 25);
    assert_eq!(rewards.total_gold, bank_size as u64 * 5 + 9 * 10);
    assert_eq!(rewards.activities_of(ActivityKind::DomainDiscovered).count(), 9);

    let generated = engine.next_question(today()).await.unwrap().unwrap();
    assert_eq!(generated.source, QuestionSource::AiGenerated);
    assert!(generated.question.is_ai_generated());
    assert_eq!(generated.question.hint.as_deref(), Some("Think about the last month."));
    let domain = generated.question.domain;
    assert!(matches!(domain, DomainId::Health | DomainId::Education | DomainId::Career));

    let outcome = engine.answer(&generated.question.id, 5, today()).unwrap();
    assert!(outcome.record.is_ai_question);
    assert!(!outcome.record.domain_discovered);
    assert_eq!(outcome.record.domain_score, 55);
    assert_eq!(outcome.xp_awarded, 15);
    assert_eq!(collaborator.question_calls.load(Ordering::SeqCst), 1);
    assert!(engine.settings().discovery.as_ref().unwrap().pending_ai_question.is_none());
}

/// A pending question survives repeated requests and a restart
#[tokio::test]
async fn test_pending_question_is_persisted() {
    let collaborator = ScriptedCollaborator::online(Vec::new());
    let mut engine = engine_with(collaborator.clone()).with_domain_order(Vec::new());

    let first = engine.next_question(today()).await.unwrap();
    assert!(first.is_none());

    let mut engine = engine.with_domain_order(vec![DomainId::Leisure]);
    for id in ["leisure_fun", "leisure_rest"] {
        engine.answer(&QuestionId::from(id), 4, today()).unwrap();
    }

    let generated = engine.next_question(today()).await.unwrap().unwrap();
    let again = engine.next_question(today()).await.unwrap().unwrap();
    assert_eq!(again.source, QuestionSource::Pending);
    assert_eq!(again.question, generated.question);
    assert_eq!(collaborator.question_calls.load(Ordering::SeqCst), 1);

    let saved = engine.store().snapshot().unwrap();
    assert_eq!(
        saved.discovery.unwrap().pending_ai_question,
        Some(generated.question.clone())
    );

    // Skipping the pending question discards it; the next request generates anew
    engine.skip(&generated.question.id, today()).unwrap();
    let fresh = engine.next_question(today()).await.unwrap().unwrap();
    assert_eq!(fresh.source, QuestionSource::AiGenerated);
    assert_eq!(collaborator.question_calls.load(Ordering::SeqCst), 2);
}

/// Without a provider the engine serves template questions
#[tokio::test]
async fn test_offline_fallback_questions() {
    let mut engine = engine_with(ScriptedCollaborator::offline()).with_bank(QuestionBank::new(Vec::new()));

    let supplied = engine.next_question(today()).await.unwrap().unwrap();
    assert_eq!(supplied.source, QuestionSource::Fallback);
    assert!(supplied.used_fallback());
    assert!(supplied.provider_error.as_deref().unwrap().contains("connection refused"));
    assert!(supplied.question.id.as_str().starts_with("fallback-"));

    let outcome = engine.answer(&supplied.question.id, 1, today()).unwrap();
    assert!(outcome.record.is_ai_question);
    assert!(outcome.record.domain_discovered);
    assert_eq!(outcome.record.domain_score, 45);
    // AI answer reward plus discovery bonus
    assert_eq!(outcome.xp_awarded, 40);
}

/// Settings round-trip through a JSON file between sessions
#[tokio::test]
async fn test_json_store_survives_restart() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("settings.json");

    {
        let mut engine = Engine::new(
            EngineConfig::default(),
            JsonFileStore::new(&path),
            RewardLedger::new(),
            ScriptedCollaborator::offline(),
            1,
        )
        .unwrap();
        engine.answer(&QuestionId::from("education_learning"), 5, today()).unwrap();
        engine.add_skill("Spanish", SkillCategory::Mind, None).unwrap();
    }

    let mut engine = Engine::new(
        EngineConfig::default(),
        JsonFileStore::new(&path),
        RewardLedger::new(),
        ScriptedCollaborator::offline(),
        1,
    )
    .unwrap();
    let progress = engine.progress(today());
    assert_eq!(progress.discovered_domains, vec![DomainId::Education]);
    assert_eq!(progress.questions_today, 1);
    assert!(engine.skills().find_by_name("spanish").is_some());

    // A new day resets the counter but keeps the answers
    let tomorrow = today().succ_opt().unwrap();
    assert_eq!(engine.daily_count(tomorrow).unwrap(), 0);
    assert_eq!(engine.progress(tomorrow).answered_core, 1);
}

/// Journal analysis evolves, feeds and creates skills and logs each one
#[tokio::test]
async fn test_analyze_journal() {
    let collaborator = ScriptedCollaborator::online(vec![
        DiscoveredSkill::new("Writing", SkillCategory::Vocation, Some(25.0)),
        DiscoveredSkill::new("Bouldering", SkillCategory::Body, None),
        DiscoveredSkill {
            name: None,
            category: Some("mind".into()),
            ..Default::default()
        },
    ]);
    let mut engine = engine_with(collaborator);

    let writing = engine.add_skill("Writing", SkillCategory::Vocation, None).unwrap();
    engine.grant_skill_points(4).unwrap();
    for _ in 0..4 {
        engine.spend_skill_point(&writing.id).unwrap();
    }

    let outcome = engine.analyze_journal("Wrote two chapters, then went climbing.").await.unwrap();
    assert!(!outcome.used_fallback());
    assert_eq!(outcome.outcomes.len(), 2);
    assert!(matches!(&outcome.outcomes[0].action, DiscoveryAction::Evolved { from, .. } if from == "Writing"));
    assert_eq!(outcome.outcomes[1].action, DiscoveryAction::Discovered);

    let skills = engine.skills();
    assert!(skills.find_by_name("Storytelling").is_some());
    assert!(skills.find_by_name("Writing").is_none());
    let bouldering = skills.find_by_name("Bouldering").unwrap();
    assert_eq!(bouldering.xp, 0.0);

    let rewards = engine.rewards();
    assert_eq!(rewards.activities_of(ActivityKind::SkillEvolved).count(), 1);
    assert_eq!(rewards.activities_of(ActivityKind::SkillDiscovered).count(), 2);
    assert_eq!(rewards.activities_of(ActivityKind::JournalAnalyzed).count(), 1);
}

/// Merging through the engine logs and saves once
#[test]
fn test_merge_and_delete_through_engine() {
    let mut engine = engine_with(ScriptedCollaborator::offline());
    let guitar = engine.add_skill("Guitar", SkillCategory::Spirit, None).unwrap();
    let music = engine.add_skill("Music Theory", SkillCategory::Mind, None).unwrap();
    engine.practice_skill(&guitar.id, 60.0).unwrap();

    let saves = engine.store().save_count();
    let outcome = engine.merge_skills(&guitar.id, &music.id).unwrap();
    assert_eq!(outcome.xp_transferred, 110.0);
    assert_eq!(outcome.merged.level, 2);
    assert_eq!(engine.store().save_count(), saves + 1);

    assert!(matches!(engine.delete_skill(&guitar.id), Err(EngineError::NotFound(_))));
    engine.delete_skill(&music.id).unwrap();
    assert!(engine.skills().is_empty());
    assert_eq!(engine.rewards().activities_of(ActivityKind::SkillsMerged).count(), 1);
}

/// Legacy migration imports once and grants nothing
#[test]
fn test_legacy_migration() {
    let mut engine = engine_with(ScriptedCollaborator::offline());
    let legacy = vec![
        LegacyResponse { question_id: QuestionId::from("health_energy"), value: 5 },
        LegacyResponse { question_id: QuestionId::from("health_sleep"), value: 1 },
        LegacyResponse { question_id: QuestionId::from("retired_question"), value: 3 },
        LegacyResponse { question_id: QuestionId::from("family_time"), value: 9 },
    ];

    let report = engine.migrate_legacy(&legacy, today()).unwrap();
    assert_eq!(report.imported, 2);
    assert_eq!(report.ignored, 2);
    assert!(!report.already_migrated);

    let progress = engine.progress(today());
    assert_eq!(progress.discovered_domains, vec![DomainId::Health]);
    assert_eq!(progress.questions_today, 0);
    let health = progress.domains.iter().find(|d| d.id == DomainId::Health).unwrap();
    assert_eq!(health.score, Some(100));
    assert_eq!(engine.rewards().total_xp, 0);

    let again = engine.migrate_legacy(&legacy, today()).unwrap();
    assert!(again.already_migrated);
    assert_eq!(again.imported, 0);
}
