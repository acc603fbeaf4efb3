//! Experience curve and level-up arithmetic
//!
//! Thresholds grow geometrically: 100, 150, 225, 337, ...
//! Overflow XP rolls into the next level, so after any grant
//! `0 <= xp < xp_to_next_level` holds. Levels stop at [`MAX_LEVEL`], where
//! the threshold is still finite and the curve still strictly increasing.

/// XP needed to clear level 1
const BASE_XP: f64 = 100.0;

/// Threshold multiplier per level
const XP_GROWTH: f64 = 1.5;

/// Highest reachable level
pub const MAX_LEVEL: u32 = 1000;

/// XP required to advance from `level` to `level + 1`
///
/// Always a whole number. Levels past [`MAX_LEVEL`] use the cap's threshold.
pub fn xp_required_for_level(level: u32) -> f64 {
    let exponent = level.clamp(1, MAX_LEVEL) - 1;
    (BASE_XP * XP_GROWTH.powi(exponent as i32)).floor()
}

/// Leveling state of anything that accumulates XP
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct XpState {
    pub xp: f64,
    pub level: u32,
    pub xp_to_next_level: f64,
}

impl XpState {
    /// Fresh level 1 state
    pub fn new() -> Self {
        Self {
            xp: 0.0,
            level: 1,
            xp_to_next_level: xp_required_for_level(1),
        }
    }
}

impl Default for XpState {
    fn default() -> Self {
        Self::new()
    }
}

/// Result of applying XP
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct XpGain {
    pub state: XpState,
    pub levels_gained: u32,
}

/// Add XP and roll any overflow into level-ups
///
/// Zero, negative or non-finite amounts add nothing, but the level-up
/// loop still runs so a state that arrived over its threshold is repaired.
/// At [`MAX_LEVEL`] leftover XP is held just under the threshold.
pub fn apply_xp(current: XpState, amount: f64) -> XpGain {
    let mut state = current;
    state.level = state.level.clamp(1, MAX_LEVEL);

    if !state.xp.is_finite() || state.xp < 0.0 {
        state.xp = 0.0;
    }
    if !state.xp_to_next_level.is_finite() || state.xp_to_next_level <= 0.0 {
        state.xp_to_next_level = xp_required_for_level(state.level);
    }

    if amount.is_finite() && amount > 0.0 {
        state.xp += amount;
    }

    let mut levels_gained = 0;
    while state.xp >= state.xp_to_next_level && state.level < MAX_LEVEL {
        state.xp -= state.xp_to_next_level;
        state.level += 1;
        levels_gained += 1;
        state.xp_to_next_level = xp_required_for_level(state.level);
    }
    if state.xp >= state.xp_to_next_level {
        state.xp = state.xp_to_next_level * (1.0 - f64::EPSILON);
    }

    XpGain { state, levels_gained }
}
