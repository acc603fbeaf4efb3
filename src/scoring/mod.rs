//! Score math
//!
//! Pure numeric helpers shared by the discovery tracker and the skill ledger:
//! Likert answers become 0-100 domain scores, XP becomes levels.

pub mod likert;
pub mod xp;

pub use likert::{
    average_to_percent, blend_score, clamp_score, likert_to_percent, reflect, weighted_average,
    LikertEntry, LIKERT_MAX, LIKERT_MIN,
};
pub use xp::{apply_xp, xp_required_for_level, XpGain, XpState, MAX_LEVEL};
