//! Level curve.
//!
//! Level `L` starts at `100 * (L - 1)^2` XP, so each level takes
//! progressively longer: 0, 100, 400, 900, 1600, ...

use serde::Serialize;

const XP_PER_LEVEL_UNIT: i64 = 100;

/// A level derived from cumulative XP.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Level {
    pub level: u32,
    /// Percent of the way to the next level, in `[0, 100)`
    pub progress: f64,
    pub current_threshold: i64,
    pub next_threshold: i64,
}

/// XP at which `level` begins.
pub fn level_threshold(level: u32) -> i64 {
    let steps = i64::from(level.saturating_sub(1));
    XP_PER_LEVEL_UNIT * steps * steps
}

/// Compute the level for an XP total. Negative totals count as zero.
pub fn compute_level(xp: i64) -> Level {
    let xp = xp.max(0);

    // floor(sqrt(xp / 100)) + 1, corrected for float rounding at the edges
    let mut level = ((xp as f64 / XP_PER_LEVEL_UNIT as f64).sqrt().floor() as u32).saturating_add(1);
    while level > 1 && level_threshold(level) > xp {
        level -= 1;
    }
    while level_threshold(level + 1) <= xp {
        level += 1;
    }

    let current_threshold = level_threshold(level);
    let next_threshold = level_threshold(level + 1);
    let span = (next_threshold - current_threshold) as f64;
    let progress = (xp - current_threshold) as f64 / span * 100.0;

    Level {
        level,
        progress,
        current_threshold,
        next_threshold,
    }
}
