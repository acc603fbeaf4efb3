//! Integration tests for domain discovery and question supply

use async_trait::async_trait;
use chrono::NaiveDate;
use lifequest::core::config::{ScoringConfig, SupplierConfig};
use lifequest::core::error::{EngineError, Result};
use lifequest::core::types::{DomainId, QuestionId};
use lifequest::discovery::{
    DiscoveryState, DiscoveryTracker, DomainBoard, NextQuestion, Question, QuestionBank,
    QuestionProvenance, QuestionSource, QuestionSupplier,
};
use lifequest::llm::{AiCollaborator, DomainContext, GeneratedQuestion, HistoryContext};
use lifequest::skills::DiscoveredSkill;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use std::sync::atomic::{AtomicUsize, Ordering};

fn day(d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 5, d).unwrap()
}

struct CountingCollaborator {
    available: bool,
    calls: AtomicUsize,
}

impl CountingCollaborator {
    fn new(available: bool) -> Self {
        Self {
            available,
            calls: AtomicUsize::new(0),
        }
    }
}

#[async_trait]
impl AiCollaborator for CountingCollaborator {
    async fn generate_question(
        &self,
        domain: &DomainContext,
        _history: &HistoryContext,
    ) -> Result<GeneratedQuestion> {
        let n = self.calls.fetch_add(1, Ordering::SeqCst) + 1;
        if !self.available {
            return Err(EngineError::Provider("no key".into()));
        }
        Ok(GeneratedQuestion {
            text: format!("Generated question {} about {}", n, domain.name),
            hint: None,
        })
    }

    async fn extract_skills(&self, _text: &str, _existing: &[String]) -> Result<Vec<DiscoveredSkill>> {
        Ok(Vec::new())
    }
}

struct Fixture {
    state: DiscoveryState,
    domains: DomainBoard,
    bank: QuestionBank,
    config: ScoringConfig,
}

impl Fixture {
    fn new() -> Self {
        Self {
            state: DiscoveryState::new(),
            domains: DomainBoard::from_catalog(50),
            bank: QuestionBank::builtin(),
            config: ScoringConfig::default(),
        }
    }

    fn tracker(&mut self, today: NaiveDate) -> DiscoveryTracker<'_> {
        DiscoveryTracker::new(&mut self.state, &mut self.domains, &self.bank, &self.config, today)
    }
}

/// Answering two questions in a domain discovers it once and then shows its score
#[test]
fn test_discovery_then_visibility() {
    let mut fx = Fixture::new();
    let mut tracker = fx.tracker(day(1));

    let first = tracker
        .record_answer(&QuestionId::from("finances_security"), 5, None)
        .unwrap();
    assert!(first.domain_discovered);
    assert!(!first.score_visible);
    assert!(!tracker.domain_score_visible(DomainId::Finances));

    let second = tracker
        .record_answer(&QuestionId::from("finances_worry"), 1, None)
        .unwrap();
    assert!(!second.domain_discovered);
    assert!(second.score_visible);
    assert_eq!(tracker.state().data_points(DomainId::Finances), 2);

    // Both answers are maximally positive once "worry" is reflected
    assert_eq!(second.domain_score, 100);
    assert_eq!(
        tracker.state().discovered_domains.iter().copied().collect::<Vec<_>>(),
        vec![DomainId::Finances]
    );
}

/// Generated answers nudge the score: 50 -> 55 -> 60
#[test]
fn test_ai_answers_blend_from_default() {
    let mut fx = Fixture::new();
    let mut tracker = fx.tracker(day(1));

    let make = |n: u32| {
        Question::synthesized(
            QuestionId::new(format!("ai-leisure-{}", n)),
            DomainId::Leisure,
            "I play every week.",
            None,
            QuestionProvenance::AiGenerated,
        )
    };

    let q1 = make(1);
    let r1 = tracker.record_answer(&q1.id, 5, Some(&q1)).unwrap();
    assert!(r1.is_ai_question);
    assert_eq!(r1.domain_score, 55);

    let q2 = make(2);
    let r2 = tracker.record_answer(&q2.id, 5, Some(&q2)).unwrap();
    assert_eq!(r2.domain_score, 60);
    assert_eq!(tracker.state().ai_questions_answered, 2);
}

/// Walk the whole bank, then hand off to generation
#[test]
fn test_bank_walk_follows_domain_order() {
    let mut fx = Fixture::new();
    let order = [DomainId::Spirituality, DomainId::Health];
    let mut tracker = fx.tracker(day(1));

    let mut seen = Vec::new();
    while let Some(NextQuestion::Fresh(question)) = tracker.next_question(&order) {
        seen.push(question.domain);
        tracker.record_answer(&question.id, 4, None).unwrap();
    }

    // Only the ordered domains are walked
    assert!(seen.iter().all(|d| matches!(d, DomainId::Spirituality | DomainId::Health)));
    assert_eq!(seen.first(), Some(&DomainId::Spirituality));
    assert_eq!(seen.last(), Some(&DomainId::Health));
    assert_eq!(
        tracker.next_question(&order),
        Some(NextQuestion::NeedsAiGeneration)
    );
    assert!(!tracker.all_core_complete());
}

/// Skipped questions come back once fresh ones run out
#[test]
fn test_skipped_questions_resurface_last() {
    let mut fx = Fixture::new();
    let order = [DomainId::Family];
    let mut tracker = fx.tracker(day(1));

    let Some(NextQuestion::Fresh(first)) = tracker.next_question(&order) else {
        panic!("expected a fresh question");
    };
    tracker.skip(&first.id);
    tracker.skip(&first.id);
    assert_eq!(tracker.state().skipped_questions.len(), 1);

    let Some(NextQuestion::Fresh(second)) = tracker.next_question(&order) else {
        panic!("expected a fresh question");
    };
    assert_ne!(second.id, first.id);
    tracker.record_answer(&second.id, 3, None).unwrap();

    assert_eq!(
        tracker.next_question(&order),
        Some(NextQuestion::Retry(first.clone()))
    );
    tracker.record_answer(&first.id, 3, None).unwrap();
    assert!(!tracker.state().is_skipped(&first.id));
}

/// The supplier stashes a generated question and serves it until answered
#[tokio::test]
async fn test_supplier_generates_once_then_serves_pending() {
    let mut fx = Fixture::new();
    let collaborator = CountingCollaborator::new(true);
    let mut supplier = QuestionSupplier::new(ChaCha8Rng::seed_from_u64(3), SupplierConfig::default(), 50);
    let order = [DomainId::Career];

    let mut tracker = fx.tracker(day(2));
    for q in ["career_satisfaction", "career_growth", "career_burnout"] {
        tracker.record_answer(&QuestionId::from(q), 3, None).unwrap();
    }

    let generated = supplier
        .next_question(&mut tracker, &order, &collaborator)
        .await
        .unwrap();
    assert_eq!(generated.source, QuestionSource::AiGenerated);
    assert!(generated.question.id.as_str().starts_with("ai-"));
    assert!(generated.question.id.as_str().ends_with("-1"));

    let again = supplier
        .next_question(&mut tracker, &order, &collaborator)
        .await
        .unwrap();
    assert_eq!(again.source, QuestionSource::Pending);
    assert_eq!(again.question, generated.question);
    assert_eq!(collaborator.calls.load(Ordering::SeqCst), 1);

    // Answering without passing the question resolves it from the pending slot
    let record = tracker.record_answer(&generated.question.id, 4, None).unwrap();
    assert!(record.is_ai_question);
    assert!(tracker.state().pending_ai_question.is_none());
}

/// With no provider every generated question is a rotating template
#[tokio::test]
async fn test_supplier_falls_back_without_provider() {
    let mut fx = Fixture::new();
    let collaborator = CountingCollaborator::new(false);
    let mut supplier = QuestionSupplier::new(ChaCha8Rng::seed_from_u64(9), SupplierConfig::default(), 50);

    let mut tracker = fx.tracker(day(3));
    for _ in 0..2 {
        let supplied = supplier
            .next_question(&mut tracker, &[], &collaborator)
            .await;
        // Empty order: nothing fresh, nothing to generate for
        assert!(supplied.is_none());
    }

    let order = DomainId::ALL;
    for question in QuestionBank::builtin().iter() {
        tracker.record_answer(&question.id, 3, None).unwrap();
    }
    for _ in 0..2 {
        let supplied = supplier
            .next_question(&mut tracker, &order, &collaborator)
            .await
            .unwrap();
        assert!(supplied.used_fallback());
        assert!(supplied.provider_error.is_some());
        tracker
            .record_answer(&supplied.question.id, 3, Some(&supplied.question))
            .unwrap();
    }
    assert_eq!(collaborator.calls.load(Ordering::SeqCst), 2);
    assert_eq!(tracker.state().ai_questions_answered, 2);
}
