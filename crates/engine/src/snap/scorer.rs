//! Candidate scoring and selection.

use super::axis::{admits, Axis};
use super::{SnapCandidate, SnapType};
use crate::state::settings::{SnapSettings, StrengthCurve};

/// Candidates scoring at or below this are discarded
pub const MIN_SCORE: f64 = 0.1;
/// Multiplier for face candidates closer than half the tolerance
pub const CLOSE_FACE_BONUS: f64 = 1.2;

/// `1 - d/tol` (linear) or its square (quadratic), clamped to `[0, 1]`
pub fn distance_score(distance: f64, tolerance: f64, curve: StrengthCurve) -> f64 {
    if tolerance <= 0.0 {
        return 0.0;
    }
    let t = (1.0 - distance / tolerance).clamp(0.0, 1.0);
    match curve {
        StrengthCurve::Linear => t,
        StrengthCurve::Quadratic => t * t,
    }
}

pub fn type_bonus(candidate: &SnapCandidate, tolerance: f64) -> f64 {
    if candidate.kind == SnapType::Face && candidate.distance < tolerance * 0.5 {
        CLOSE_FACE_BONUS
    } else {
        1.0
    }
}

/// `distanceScore × alignment × typeBonus`
pub fn score(candidate: &SnapCandidate, settings: &SnapSettings) -> f64 {
    distance_score(candidate.distance, settings.distance, settings.strength_curve)
        * candidate.alignment
        * type_bonus(candidate, settings.distance)
}

/// Score, drop weak and axis-misaligned candidates, sort best first,
/// keep at most `settings.max_candidates`.
pub fn rank(
    candidates: impl IntoIterator<Item = SnapCandidate>,
    axis: Option<Axis>,
    settings: &SnapSettings,
) -> Vec<SnapCandidate> {
    let mut ranked: Vec<SnapCandidate> = candidates
        .into_iter()
        .filter(|c| admits(axis, c.offset))
        .map(|mut c| {
            c.score = score(&c, settings);
            c
        })
        .filter(|c| c.score > MIN_SCORE)
        .collect();
    ranked.sort_by(|a, b| b.score.total_cmp(&a.score));
    ranked.truncate(settings.max_candidates);
    ranked
}

/// Fraction of the offset to apply. 1.0 unless magnetic pull is on and the
/// candidate is still outside half the tolerance.
pub fn pull_factor(candidate: &SnapCandidate, settings: &SnapSettings) -> f64 {
    if !settings.magnetic_pull {
        return 1.0;
    }
    (2.0 * distance_score(candidate.distance, settings.distance, StrengthCurve::Linear)).min(1.0)
}
