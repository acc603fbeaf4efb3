//! Likert answer conversion and domain score blending

use crate::core::error::{EngineError, Result};

/// Lowest Likert answer ("strongly disagree")
pub const LIKERT_MIN: u8 = 1;

/// Highest Likert answer ("strongly agree")
pub const LIKERT_MAX: u8 = 5;

/// Percent points per Likert step (4 steps span 0..=100)
const PERCENT_PER_STEP: f64 = 25.0;

/// A single answer with its question weight
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LikertEntry {
    /// Raw answer, already reflected for negatively framed questions
    pub score: u8,
    /// Question weight (> 0)
    pub weight: f64,
}

impl LikertEntry {
    pub fn new(score: u8, weight: f64) -> Self {
        Self { score, weight }
    }
}

/// Mirror an answer on the 1..=5 scale (1 <-> 5, 2 <-> 4)
pub fn reflect(score: u8) -> u8 {
    (LIKERT_MAX + LIKERT_MIN).saturating_sub(score.clamp(LIKERT_MIN, LIKERT_MAX))
}

/// Convert a Likert answer into a 0-100 score
///
/// Negatively framed questions are reflected first, so "strongly agree"
/// with "I often feel exhausted" counts as a low health score.
pub fn likert_to_percent(score: u8, positive_framing: bool) -> u8 {
    let score = score.clamp(LIKERT_MIN, LIKERT_MAX);
    let score = if positive_framing { score } else { reflect(score) };
    (score - LIKERT_MIN) * PERCENT_PER_STEP as u8
}

/// Weighted mean of Likert entries, in the 1..=5 range
///
/// Fails with `EmptyInput` when there is nothing to average.
pub fn weighted_average(entries: &[LikertEntry]) -> Result<f64> {
    let (sum, total_weight) = entries
        .iter()
        .filter(|e| e.weight > 0.0)
        .fold((0.0, 0.0), |(sum, total), e| {
            (sum + e.score as f64 * e.weight, total + e.weight)
        });

    if total_weight <= 0.0 {
        return Err(EngineError::EmptyInput);
    }

    Ok(sum / total_weight)
}

/// Convert a 1..=5 average into a 0-100 score
pub fn average_to_percent(average: f64) -> u8 {
    clamp_score((average - LIKERT_MIN as f64) * PERCENT_PER_STEP)
}

/// Exponential moving average of a domain score toward a new answer
///
/// `new = round(old * (1 - alpha) + answer * alpha)`
pub fn blend_score(old_score: u8, answer_percent: u8, alpha: f64) -> u8 {
    let alpha = alpha.clamp(0.0, 1.0);
    clamp_score(old_score as f64 * (1.0 - alpha) + answer_percent as f64 * alpha)
}

/// Round and clamp a raw score into 0..=100
pub fn clamp_score(raw: f64) -> u8 {
    if raw.is_nan() {
        return 0;
    }
    raw.round().clamp(0.0, 100.0) as u8
}
