//! Fuzzy skill name matching
//!
//! AI extraction tends to produce near-duplicates ("Writing",
//! "Creative Writing", "writing skills"). Matching against the existing
//! ledger keeps one skill per practice instead of a growing pile.

use crate::skills::Skill;
use serde::{Deserialize, Serialize};

/// Share of the new name's words that must appear in an existing name
const TOKEN_OVERLAP_THRESHOLD: f64 = 0.5;

/// How closely a name matched an existing skill
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Similarity {
    /// Same name ignoring case
    Exact,
    /// One name contains the other
    Partial,
    /// More than half of the new name's words overlap
    Similar,
}

/// A matched skill and the strength of the match
#[derive(Debug, Clone, Copy)]
pub struct SimilarMatch<'a> {
    pub skill: &'a Skill,
    pub similarity: Similarity,
}

/// Find the first skill resembling `name`
///
/// Exact matches win over everything else. Otherwise skills are checked in
/// ledger order and the first partial or similar match is returned.
pub fn find_similar<'a>(skills: &'a [Skill], name: &str) -> Option<SimilarMatch<'a>> {
    let needle = name.trim().to_lowercase();
    if needle.is_empty() {
        return None;
    }

    if let Some(skill) = skills.iter().find(|s| s.name.to_lowercase() == needle) {
        return Some(SimilarMatch { skill, similarity: Similarity::Exact });
    }

    let new_words = words(&needle);

    for skill in skills {
        let existing = skill.name.trim().to_lowercase();
        if existing.is_empty() {
            continue;
        }

        if existing.contains(&needle) || needle.contains(&existing) {
            return Some(SimilarMatch { skill, similarity: Similarity::Partial });
        }

        if token_overlap(&new_words, &words(&existing)) > TOKEN_OVERLAP_THRESHOLD {
            return Some(SimilarMatch { skill, similarity: Similarity::Similar });
        }
    }

    None
}

fn words(name: &str) -> Vec<&str> {
    name.split_whitespace().collect()
}

/// Fraction of `new_words` present in `existing_words`
fn token_overlap(new_words: &[&str], existing_words: &[&str]) -> f64 {
    if new_words.is_empty() {
        return 0.0;
    }
    let shared = new_words
        .iter()
        .filter(|w| existing_words.contains(w))
        .count();
    shared as f64 / new_words.len() as f64
}
