//! Two-axis (planar) drag resolution.
//!
//! Priority is fixed: corner snap, then multi-body snap on both axes at once,
//! then independent per-axis wall snap. The first step that produces a result
//! wins.

use glam::DVec3;

use super::axis::{apply_constrained, Axis};
use super::{guide_points, scorer, settle, CandidateSet, SnapCandidate, SnapPoint, SnapResult};
use super::{MAX_SNAP_POINTS, SETTLED_EPS};
use crate::state::settings::SnapSettings;

pub(super) fn resolve(
    set: CandidateSet,
    reference: DVec3,
    plane: Axis,
    settings: &SnapSettings,
) -> SnapResult {
    let CandidateSet { body, wall, corner } = set;

    if settings.wall && settings.corner {
        let ranked = scorer::rank(corner, Some(plane), settings);
        if let Some(best) = best_corner(&ranked, plane) {
            tracing::debug!("Planar snap: corner {}", best.target_id);
            let offset = settle(best.offset * scorer::pull_factor(best, settings));
            return SnapResult {
                snapped: true,
                position: apply_constrained(reference, offset, Some(plane)),
                points: guide_points(&ranked, best.offset),
            };
        }
    }

    if let Some(result) = per_axis(&body, reference, plane, settings) {
        tracing::debug!("Planar snap: multi-body");
        return result;
    }

    if let Some(result) = per_axis(&wall, reference, plane, settings) {
        tracing::debug!("Planar snap: per-axis wall");
        return result;
    }

    SnapResult::unsnapped(reference)
}

/// Highest-scoring corner. Ties go to the corner that moves more in-plane
/// components, so a true wall-wall corner beats a floor-wall pair.
fn best_corner(ranked: &[SnapCandidate], plane: Axis) -> Option<&SnapCandidate> {
    let reach = |c: &SnapCandidate| {
        plane
            .components()
            .iter()
            .filter(|&&i| c.offset[i].abs() > SETTLED_EPS)
            .count()
    };
    ranked.iter().fold(None, |best: Option<&SnapCandidate>, c| match best {
        Some(b) if b.score > c.score || (b.score == c.score && reach(b) >= reach(c)) => Some(b),
        _ => Some(c),
    })
}

/// Best candidate for each in-plane axis independently, combined into one offset.
fn per_axis(
    candidates: &[SnapCandidate],
    reference: DVec3,
    plane: Axis,
    settings: &SnapSettings,
) -> Option<SnapResult> {
    let mut offset = DVec3::ZERO;
    let mut points: Vec<SnapPoint> = Vec::new();
    let mut found = false;

    for &i in plane.components() {
        let axis = Axis::from_component(i)?;
        let ranked = scorer::rank(candidates.iter().cloned(), Some(axis), settings);
        if let Some(best) = ranked.first() {
            offset[i] = best.offset[i] * scorer::pull_factor(best, settings);
            points.extend(guide_points(&ranked, best.offset));
            found = true;
        }
    }

    if !found {
        return None;
    }
    points.truncate(MAX_SNAP_POINTS);
    Some(SnapResult {
        snapped: true,
        position: apply_constrained(reference, settle(offset), Some(plane)),
        points,
    })
}
