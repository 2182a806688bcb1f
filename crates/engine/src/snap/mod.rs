//! Snapping: candidate generation, scoring and selection under an axis constraint.
//!
//! Every call is a pure function of its inputs. Settings, the body snapshot and
//! the set of moving bodies are passed in explicitly.

pub mod axis;
pub mod candidates;
mod planar;
pub mod scorer;
mod strategy;

use std::collections::HashSet;

use glam::DVec3;
use serde::Serialize;
use shared::{BodyId, GroupId, RigidBody, Room};

pub use axis::{apply_constrained, Axis};
pub use strategy::SnapStrategy;

use crate::geometry::BoundingGeometry;
use crate::state::settings::SnapSettings;

/// At most this many snap points are reported for visualization
pub const MAX_SNAP_POINTS: usize = 5;

/// Offsets closer than this are the same alignment
const SAME_OFFSET_EPS: f64 = 1e-6;

/// Offsets shorter than this mean the mover already sits on the alignment
const SETTLED_EPS: f64 = 1e-9;

/// Kind of alignment a candidate proposes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SnapType {
    Edge,
    Face,
    Wall,
    Corner,
}

/// A proposed alignment between the moving body and something static
#[derive(Debug, Clone, PartialEq)]
pub struct SnapCandidate {
    pub kind: SnapType,
    /// Body, group or wall id the mover would align with
    pub target_id: String,
    /// Translation to apply to the mover
    pub offset: DVec3,
    pub distance: f64,
    /// Dot-product based, in `[0, 1]`
    pub alignment: f64,
    /// Mover-side and target-side anchor points
    pub anchors: [DVec3; 2],
    /// Filled in by the scorer
    pub score: f64,
}

impl SnapCandidate {
    pub fn new(
        kind: SnapType,
        target_id: &str,
        offset: DVec3,
        distance: f64,
        alignment: f64,
        anchors: [DVec3; 2],
    ) -> Self {
        Self {
            kind,
            target_id: target_id.to_string(),
            offset,
            distance,
            alignment: alignment.clamp(0.0, 1.0),
            anchors,
            score: 0.0,
        }
    }

    fn point(&self) -> SnapPoint {
        SnapPoint {
            kind: self.kind,
            target_id: self.target_id.clone(),
            position: self.anchors[1].to_array(),
        }
    }
}

/// A snap guide for the renderer
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SnapPoint {
    pub kind: SnapType,
    pub target_id: String,
    pub position: [f64; 3],
}

/// Outcome of one snap query.
///
/// Invariant: when `snapped` is false, `position` is the unmodified input.
#[derive(Debug, Clone, PartialEq)]
pub struct SnapResult {
    pub snapped: bool,
    pub position: DVec3,
    pub points: Vec<SnapPoint>,
}

impl SnapResult {
    pub fn unsnapped(position: DVec3) -> Self {
        Self {
            snapped: false,
            position,
            points: Vec::new(),
        }
    }
}

/// A static body that passed the pre-filter
#[derive(Debug, Clone)]
pub struct SnapTarget {
    pub id: BodyId,
    pub group_id: Option<GroupId>,
    pub geometry: BoundingGeometry,
}

impl SnapTarget {
    pub fn of(body: &RigidBody) -> Option<Self> {
        Some(Self {
            id: body.id.clone(),
            group_id: body.group_id.clone(),
            geometry: BoundingGeometry::of(body)?,
        })
    }
}

/// Raw candidates, split by source so the planar resolver can prioritise them
#[derive(Debug, Default)]
pub struct CandidateSet {
    pub body: Vec<SnapCandidate>,
    pub wall: Vec<SnapCandidate>,
    pub corner: Vec<SnapCandidate>,
}

impl CandidateSet {
    pub fn is_empty(&self) -> bool {
        self.body.is_empty() && self.wall.is_empty() && self.corner.is_empty()
    }

    fn into_all(self) -> impl Iterator<Item = SnapCandidate> {
        self.body
            .into_iter()
            .chain(self.wall)
            .chain(self.corner)
    }
}

/// Everything a snap query reads besides the movers themselves
pub struct SnapContext<'a> {
    pub bodies: &'a [RigidBody],
    pub room: &'a Room,
    pub settings: &'a SnapSettings,
    /// Bodies that are moving in this session; never snap targets
    pub moving: &'a HashSet<BodyId>,
}

impl SnapContext<'_> {
    /// Static bodies worth testing: not moving, not in a moving body's group,
    /// and within bounding-sphere reach of at least one mover.
    pub fn targets(&self, movers: &[BoundingGeometry]) -> Vec<SnapTarget> {
        let moving_groups: HashSet<&str> = self
            .bodies
            .iter()
            .filter(|b| self.moving.contains(&b.id))
            .filter_map(|b| b.group_id.as_deref())
            .collect();

        self.bodies
            .iter()
            .filter(|b| !self.moving.contains(&b.id))
            .filter(|b| {
                b.group_id
                    .as_deref()
                    .is_none_or(|g| !moving_groups.contains(g))
            })
            .filter_map(SnapTarget::of)
            .filter(|t| {
                movers
                    .iter()
                    .any(|m| m.within_reach(&t.geometry, self.settings.distance))
            })
            .collect()
    }
}

/// Snap a translation.
///
/// `movers` are the moving bodies' geometries already placed at the candidate
/// position; `reference` is the point whose snapped value is returned (the
/// primary body's center or the group pivot).
pub fn snap_translation(
    movers: &[BoundingGeometry],
    reference: DVec3,
    axis: Option<Axis>,
    ctx: &SnapContext<'_>,
) -> SnapResult {
    let settings = ctx.settings;
    if !settings.enabled || movers.is_empty() {
        return SnapResult::unsnapped(reference);
    }

    let targets = ctx.targets(movers);
    let set = settings.version.collect(movers, &targets, ctx.room, settings);
    if set.is_empty() {
        return SnapResult::unsnapped(reference);
    }

    let result = match axis {
        Some(a) if a.is_planar() => planar::resolve(set, reference, a, settings),
        _ => resolve_single(set, reference, axis, settings),
    };

    if result.snapped {
        tracing::debug!(
            "Snapped {:?} -> {:?} ({} guide points)",
            reference,
            result.position,
            result.points.len()
        );
    }
    result
}

/// Single-axis or unconstrained resolution: the best admitted candidate wins.
fn resolve_single(
    set: CandidateSet,
    reference: DVec3,
    axis: Option<Axis>,
    settings: &SnapSettings,
) -> SnapResult {
    let ranked = scorer::rank(set.into_all(), axis, settings);
    let Some(best) = ranked.first() else {
        return SnapResult::unsnapped(reference);
    };
    let offset = settle(best.offset * scorer::pull_factor(best, settings));
    SnapResult {
        snapped: true,
        position: apply_constrained(reference, offset, axis),
        points: guide_points(&ranked, best.offset),
    }
}

/// Zero out numerically negligible offsets so repeated snaps do not drift.
fn settle(offset: DVec3) -> DVec3 {
    if offset.length() < SETTLED_EPS {
        DVec3::ZERO
    } else {
        offset
    }
}

/// Points of the retained candidates that agree with the applied offset, best first.
fn guide_points(ranked: &[SnapCandidate], applied: DVec3) -> Vec<SnapPoint> {
    ranked
        .iter()
        .filter(|c| (c.offset - applied).length() < SAME_OFFSET_EPS)
        .take(MAX_SNAP_POINTS)
        .map(SnapCandidate::point)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures::{cube_at, panel_at};

    fn settings() -> SnapSettings {
        SnapSettings {
            distance: 10.0,
            collision_offset: 0.5,
            ..SnapSettings::default()
        }
    }

    fn moving(ids: &[&str]) -> HashSet<BodyId> {
        ids.iter().map(|s| s.to_string()).collect()
    }

    fn snap_body(
        mover: &RigidBody,
        at: DVec3,
        bodies: &[RigidBody],
        axis: Option<Axis>,
        settings: &SnapSettings,
    ) -> SnapResult {
        let room = Room::default();
        let moving = moving(&[mover.id.as_str()]);
        let ctx = SnapContext {
            bodies,
            room: &room,
            settings,
            moving: &moving,
        };
        let geometry = BoundingGeometry::of_at(mover, at).unwrap();
        snap_translation(&[geometry], at, axis, &ctx)
    }

    #[test]
    fn test_face_snap_leaves_collision_gap() {
        let a = cube_at("a", 100.0, [0.0; 3]);
        let b = cube_at("b", 100.0, [103.0, 0.0, 0.0]);
        let bodies = vec![a.clone(), b];
        let r = snap_body(&a, DVec3::ZERO, &bodies, Some(Axis::X), &settings());
        assert!(r.snapped);
        // Right face of a at x + 50, left face of b at 53
        let gap = 53.0 - (r.position.x + 50.0);
        assert!((gap - 0.5).abs() < 1e-9, "gap was {gap}");
    }

    #[test]
    fn test_snap_is_idempotent() {
        let a = cube_at("a", 100.0, [0.0; 3]);
        let b = cube_at("b", 100.0, [103.0, 0.0, 0.0]);
        let bodies = vec![a.clone(), b];
        let s = settings();
        let first = snap_body(&a, DVec3::new(1.0, 0.0, 0.0), &bodies, Some(Axis::X), &s);
        let second = snap_body(&a, first.position, &bodies, Some(Axis::X), &s);
        assert_eq!(first.position, second.position);
    }

    #[test]
    fn test_snap_is_idempotent_from_penetrating_starts() {
        let a = cube_at("a", 100.0, [0.0; 3]);
        let s = settings();
        for x in 85..=113 {
            for z in [0.0, 3.0, -7.0] {
                let b = cube_at("b", 100.0, [f64::from(x), 0.0, z]);
                let bodies = vec![a.clone(), b];
                let first = snap_body(&a, DVec3::ZERO, &bodies, Some(Axis::X), &s);
                let second = snap_body(&a, first.position, &bodies, Some(Axis::X), &s);
                assert!(
                    (first.position - second.position).length() < 1e-9,
                    "target at ({x}, 0, {z}): {:?} then {:?}",
                    first.position,
                    second.position
                );
            }
        }
    }

    #[test]
    fn test_penetrating_start_ends_at_collision_gap() {
        let a = cube_at("a", 100.0, [0.0; 3]);
        let b = cube_at("b", 100.0, [92.0, 0.0, 0.0]);
        let bodies = vec![a.clone(), b];
        let r = snap_body(&a, DVec3::ZERO, &bodies, Some(Axis::X), &settings());
        assert!(r.snapped);
        assert!((r.position.x + 8.5).abs() < 1e-9, "x = {}", r.position.x);
    }

    #[test]
    fn test_magnetic_pull_applies_partial_offset() {
        let a = cube_at("a", 100.0, [0.0; 3]);
        let b = cube_at("b", 100.0, [107.0, 0.0, 0.0]);
        let bodies = vec![a.clone(), b];
        let s = SnapSettings {
            magnetic_pull: true,
            ..settings()
        };
        // Face travel 6.5 of tolerance 10: pulled by 2 * (1 - 0.65) = 70 %
        let r = snap_body(&a, DVec3::ZERO, &bodies, Some(Axis::X), &s);
        assert!(r.snapped);
        assert!((r.position.x - 6.5 * 0.7).abs() < 1e-9, "x = {}", r.position.x);
        assert_eq!(r.points[0].kind, SnapType::Face);
    }

    #[test]
    fn test_magnetic_pull_full_inside_half_tolerance() {
        let a = cube_at("a", 100.0, [0.0; 3]);
        let b = cube_at("b", 100.0, [103.0, 0.0, 0.0]);
        let bodies = vec![a.clone(), b];
        let s = SnapSettings {
            magnetic_pull: true,
            ..settings()
        };
        let r = snap_body(&a, DVec3::ZERO, &bodies, Some(Axis::X), &s);
        assert!(r.snapped);
        assert!((r.position.x - 2.5).abs() < 1e-9);
    }

    #[test]
    fn test_no_candidate_passes_position_through() {
        let a = cube_at("a", 10.0, [0.0; 3]);
        let b = cube_at("b", 10.0, [500.0, 0.0, 0.0]);
        let bodies = vec![a.clone(), b];
        let input = DVec3::new(1.25, 2.5, -3.75);
        let r = snap_body(&a, input, &bodies, None, &settings());
        assert!(!r.snapped);
        assert_eq!(r.position, input);
        assert!(r.points.is_empty());
    }

    #[test]
    fn test_disabled_snapping_passes_through() {
        let a = cube_at("a", 100.0, [0.0; 3]);
        let b = cube_at("b", 100.0, [103.0, 0.0, 0.0]);
        let bodies = vec![a.clone(), b];
        let s = SnapSettings {
            enabled: false,
            ..settings()
        };
        let r = snap_body(&a, DVec3::ZERO, &bodies, Some(Axis::X), &s);
        assert!(!r.snapped);
        assert_eq!(r.position, DVec3::ZERO);
    }

    #[test]
    fn test_axis_constraint_leaves_other_components() {
        // Target is slightly offset in Y and Z; an X drag must not pick that up
        let a = cube_at("a", 100.0, [0.0; 3]);
        let b = cube_at("b", 100.0, [104.0, 0.4, -0.1]);
        let bodies = vec![a.clone(), b];
        let input = DVec3::new(0.0, 7.0, -2.0);
        let r = snap_body(&a, input, &bodies, Some(Axis::X), &settings());
        assert!(r.snapped);
        assert_eq!(r.position.y, 7.0);
        assert_eq!(r.position.z, -2.0);
    }

    #[test]
    fn test_same_group_never_targets() {
        let a = cube_at("a", 100.0, [0.0; 3]).in_group("cab");
        let b = cube_at("b", 100.0, [103.0, 0.0, 0.0]).in_group("cab");
        let bodies = vec![a.clone(), b];
        let r = snap_body(&a, DVec3::ZERO, &bodies, Some(Axis::X), &settings());
        assert!(!r.snapped);
    }

    #[test]
    fn test_concrete_panel_scenario() {
        // Mover dragged along X towards a matching panel centered at x = 150
        let mover = panel_at("m", [100.0, 50.0, 18.0], [0.0; 3]);
        let target = panel_at("t", [100.0, 50.0, 18.0], [150.0, 0.0, 0.0]);
        let bodies = vec![mover.clone(), target];
        let s = settings();
        let r = snap_body(&mover, DVec3::new(46.0, 0.0, 0.0), &bodies, Some(Axis::X), &s);

        assert!(r.snapped);
        // Faces touch at x = 100, minus the configured gap
        assert!((r.position.x + 50.0 - (100.0 - s.collision_offset)).abs() < 1e-9);
        assert_eq!(r.points.len(), 1);
        assert_eq!(r.points[0].kind, SnapType::Face);
    }

    #[test]
    fn test_snap_points_capped() {
        let a = cube_at("a", 100.0, [0.0; 3]);
        let bodies: Vec<RigidBody> = std::iter::once(a.clone())
            .chain((0..8).map(|i| cube_at(&format!("t{i}"), 100.0, [102.0, 0.0, 0.0])))
            .collect();
        let r = snap_body(&a, DVec3::ZERO, &bodies, Some(Axis::X), &settings());
        assert!(r.snapped);
        assert_eq!(r.points.len(), MAX_SNAP_POINTS);
    }
}
