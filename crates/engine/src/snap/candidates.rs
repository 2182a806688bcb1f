//! Candidate generation: edge-edge, face-face, wall-plane and wall-corner alignments.

use glam::DVec3;
use shared::{Room, Wall};

use super::{SnapCandidate, SnapType};
use crate::geometry::{BoundingGeometry, Face};

/// `|dot|` above which two edges count as parallel
pub const PARALLEL_EDGE_DOT: f64 = 0.95;
/// `dot` below which two faces count as facing each other
pub const OPPOSING_FACE_DOT: f64 = -0.95;
/// Edge midpoints may be this many tolerances apart
pub const EDGE_REACH: f64 = 3.0;
/// `|dot|` below which two walls count as perpendicular
const PERPENDICULAR_WALL_DOT: f64 = 0.05;
/// Edge motion across face normals below this is treated as none
const LATERAL_EPS: f64 = 1e-6;

/// Edge candidates: near-parallel edges whose midpoints are close.
///
/// The offset brings the two midpoints together, except along the normal of
/// any facing face pair it brings within tolerance: there the faces end
/// `collision_offset` apart, as after a face snap. Edges that would only
/// repeat a face snap are skipped.
pub fn edge_candidates(
    mover: &BoundingGeometry,
    target: &BoundingGeometry,
    target_id: &str,
    tolerance: f64,
    collision_offset: f64,
    out: &mut Vec<SnapCandidate>,
) {
    let reach = EDGE_REACH * tolerance;
    for ea in &mover.edges {
        for eb in &target.edges {
            let alignment = ea.direction.dot(eb.direction).abs();
            if alignment < PARALLEL_EDGE_DOT {
                continue;
            }
            let aligned = eb.midpoint - ea.midpoint;
            if aligned.length() > reach {
                continue;
            }
            let Some(offset) = with_face_clearance(mover, target, aligned, tolerance, collision_offset)
            else {
                continue;
            };
            out.push(SnapCandidate::new(
                SnapType::Edge,
                target_id,
                offset,
                offset.length(),
                alignment,
                [ea.midpoint, eb.midpoint],
            ));
        }
    }
}

/// Correct `offset` so every facing face pair it leaves within tolerance ends
/// at exactly `collision_offset`. `None` when nothing but that correction
/// would remain of the edge alignment.
fn with_face_clearance(
    mover: &BoundingGeometry,
    target: &BoundingGeometry,
    offset: DVec3,
    tolerance: f64,
    collision_offset: f64,
) -> Option<DVec3> {
    let mut adjusted = offset;
    let mut normals: Vec<DVec3> = Vec::new();
    for fa in &mover.faces {
        for fb in &target.faces {
            if fa.normal.dot(fb.normal) > OPPOSING_FACE_DOT {
                continue;
            }
            let gap = (fb.center - fa.center - adjusted).dot(fa.normal);
            if gap.abs() > tolerance || !faces_overlap(fa, adjusted, fb, tolerance) {
                continue;
            }
            adjusted += fa.normal * (gap - collision_offset);
            normals.push(fa.normal);
        }
    }
    if normals.is_empty() {
        return Some(offset);
    }
    let lateral = normals.iter().fold(offset, |rest, n| rest - *n * rest.dot(*n));
    (lateral.length() > LATERAL_EPS).then_some(adjusted)
}

/// Face candidates: faces looking at each other within tolerance.
///
/// The offset closes the gap to exactly `collision_offset`, never to zero.
pub fn face_candidates(
    mover: &BoundingGeometry,
    target: &BoundingGeometry,
    target_id: &str,
    tolerance: f64,
    collision_offset: f64,
    out: &mut Vec<SnapCandidate>,
) {
    for fa in &mover.faces {
        for fb in &target.faces {
            let facing = fa.normal.dot(fb.normal);
            if facing > OPPOSING_FACE_DOT {
                continue;
            }
            let gap = (fb.center - fa.center).dot(fa.normal);
            if gap.abs() > tolerance || !faces_overlap(fa, DVec3::ZERO, fb, tolerance) {
                continue;
            }
            let travel = gap - collision_offset;
            out.push(SnapCandidate::new(
                SnapType::Face,
                target_id,
                fa.normal * travel,
                travel.abs(),
                -facing,
                [fa.center, fb.center],
            ));
        }
    }
}

/// Whether the footprints of `a` (moved by `shift`) and `b` overlap in the
/// plane of `a`, with slack.
fn faces_overlap(a: &Face, shift: DVec3, b: &Face, slack: f64) -> bool {
    let u = (a.corners[1] - a.corners[0]).normalize_or_zero();
    let v = (a.corners[3] - a.corners[0]).normalize_or_zero();
    [u, v].iter().all(|axis| {
        let (a_lo, a_hi) = interval(&a.corners, *axis);
        let moved = shift.dot(*axis);
        let (a_lo, a_hi) = (a_lo + moved, a_hi + moved);
        let (b_lo, b_hi) = interval(&b.corners, *axis);
        a_hi + slack > b_lo && b_hi + slack > a_lo
    })
}

fn interval(points: &[DVec3; 4], axis: DVec3) -> (f64, f64) {
    points.iter().fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), p| {
        let d = p.dot(axis);
        (lo.min(d), hi.max(d))
    })
}

/// Gap between the mover's closest corner and a wall (positive = inside the room)
fn wall_gap(mover: &BoundingGeometry, wall: &Wall) -> f64 {
    mover.support_min(DVec3::from_array(wall.normal)) - wall.offset
}

/// How square the mover sits against a wall: best `|axis · normal|`
fn wall_alignment(mover: &BoundingGeometry, normal: DVec3) -> f64 {
    mover
        .axes
        .iter()
        .map(|a| a.dot(normal).abs())
        .fold(0.0, f64::max)
}

fn closest_corner(mover: &BoundingGeometry, normal: DVec3) -> DVec3 {
    mover
        .corners
        .iter()
        .copied()
        .min_by(|a, b| a.dot(normal).total_cmp(&b.dot(normal)))
        .unwrap_or(mover.center)
}

/// Wall candidates: the mover's closest corner lies within tolerance of a wall plane.
/// The offset puts the mover flush against the wall.
pub fn wall_candidates(
    mover: &BoundingGeometry,
    room: &Room,
    tolerance: f64,
    out: &mut Vec<SnapCandidate>,
) {
    for wall in &room.walls {
        let normal = DVec3::from_array(wall.normal);
        let gap = wall_gap(mover, wall);
        if gap.abs() > tolerance {
            continue;
        }
        let anchor = closest_corner(mover, normal);
        out.push(SnapCandidate::new(
            SnapType::Wall,
            &wall.id,
            -normal * gap,
            gap.abs(),
            wall_alignment(mover, normal),
            [anchor, anchor - normal * gap],
        ));
    }
}

/// Corner candidates: two perpendicular walls both within tolerance.
/// The offset puts the mover flush against both at once.
pub fn corner_candidates(
    mover: &BoundingGeometry,
    room: &Room,
    tolerance: f64,
    out: &mut Vec<SnapCandidate>,
) {
    let near: Vec<(&Wall, DVec3, f64)> = room
        .walls
        .iter()
        .map(|w| (w, DVec3::from_array(w.normal), wall_gap(mover, w)))
        .filter(|(_, _, gap)| gap.abs() <= tolerance)
        .collect();

    for (i, (wa, na, ga)) in near.iter().enumerate() {
        for (wb, nb, gb) in &near[i + 1..] {
            if na.dot(*nb).abs() > PERPENDICULAR_WALL_DOT {
                continue;
            }
            let offset = -*na * *ga - *nb * *gb;
            let anchor = closest_corner(mover, *na + *nb);
            out.push(SnapCandidate::new(
                SnapType::Corner,
                &format!("{}+{}", wa.id, wb.id),
                offset,
                ga.abs().max(gb.abs()),
                wall_alignment(mover, *na).min(wall_alignment(mover, *nb)),
                [anchor, anchor + offset],
            ));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures::cube_at;

    fn geom(b: &shared::RigidBody) -> BoundingGeometry {
        BoundingGeometry::of(b).unwrap()
    }

    #[test]
    fn test_face_candidate_leaves_collision_gap() {
        let a = geom(&cube_at("a", 100.0, [0.0, 0.0, 0.0]));
        let b = geom(&cube_at("b", 100.0, [103.0, 0.0, 0.0]));
        let mut out = Vec::new();
        face_candidates(&a, &b, "b", 10.0, 0.5, &mut out);

        assert_eq!(out.len(), 1);
        let c = &out[0];
        assert_eq!(c.kind, SnapType::Face);
        assert!((c.offset - DVec3::new(2.5, 0.0, 0.0)).length() < 1e-9);
        assert!((c.distance - 2.5).abs() < 1e-9);
        assert!((c.alignment - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_face_candidate_out_of_tolerance() {
        let a = geom(&cube_at("a", 100.0, [0.0, 0.0, 0.0]));
        let b = geom(&cube_at("b", 100.0, [120.0, 0.0, 0.0]));
        let mut out = Vec::new();
        face_candidates(&a, &b, "b", 10.0, 0.5, &mut out);
        assert!(out.is_empty());
    }

    #[test]
    fn test_face_candidate_requires_lateral_overlap() {
        // Right of `a` faces left of `b`, but `b` sits far above
        let a = geom(&cube_at("a", 10.0, [0.0, 0.0, 0.0]));
        let b = geom(&cube_at("b", 10.0, [12.0, 40.0, 0.0]));
        let mut out = Vec::new();
        face_candidates(&a, &b, "b", 5.0, 0.0, &mut out);
        assert!(out.is_empty());
    }

    #[test]
    fn test_edge_candidates_parallel_only() {
        let a = geom(&cube_at("a", 10.0, [0.0, 0.0, 0.0]));
        let b = geom(&cube_at("b", 10.0, [12.0, 3.0, 0.0]));
        let mut out = Vec::new();
        edge_candidates(&a, &b, "b", 5.0, 0.5, &mut out);
        assert!(!out.is_empty());
        for c in &out {
            assert_eq!(c.kind, SnapType::Edge);
            assert!(c.alignment >= PARALLEL_EDGE_DOT);
            assert!(c.distance <= EDGE_REACH * 5.0);
        }
        // Right vertical edges of `a` onto the left ones of `b`: aligned in Y,
        // but the facing sides keep the collision gap
        assert!(out
            .iter()
            .any(|c| (c.offset - DVec3::new(1.5, 3.0, 0.0)).length() < 1e-9));
    }

    #[test]
    fn test_edge_repeating_face_snap_is_skipped() {
        let a = geom(&cube_at("a", 10.0, [0.0, 0.0, 0.0]));
        let b = geom(&cube_at("b", 10.0, [12.0, 0.0, 0.0]));
        let mut out = Vec::new();
        edge_candidates(&a, &b, "b", 5.0, 0.5, &mut out);
        assert!(!out.iter().any(|c| {
            (c.offset - DVec3::new(2.0, 0.0, 0.0)).length() < 1e-9
                || (c.offset - DVec3::new(1.5, 0.0, 0.0)).length() < 1e-9
        }));
    }

    #[test]
    fn test_edge_from_penetration_keeps_clearance() {
        // `b` sinks 8 into `a`; the side edges line up at 8 back, the gap at 8.5
        let a = geom(&cube_at("a", 100.0, [0.0, 0.0, 0.0]));
        let b = geom(&cube_at("b", 100.0, [92.0, 0.0, 3.0]));
        let mut out = Vec::new();
        edge_candidates(&a, &b, "b", 10.0, 0.5, &mut out);
        assert!(out
            .iter()
            .any(|c| (c.offset - DVec3::new(-8.5, 0.0, 3.0)).length() < 1e-9));
        assert!(!out
            .iter()
            .any(|c| (c.offset - DVec3::new(-8.0, 0.0, 3.0)).length() < 1e-9));
    }

    #[test]
    fn test_wall_candidate_flush() {
        let room = Room::rectangular(1000.0, 1000.0);
        let a = geom(&cube_at("a", 100.0, [56.0, 300.0, 500.0]));
        let mut out = Vec::new();
        wall_candidates(&a, &room, 10.0, &mut out);
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].target_id, "wall_left");
        assert!((out[0].offset - DVec3::new(-6.0, 0.0, 0.0)).length() < 1e-9);
    }

    #[test]
    fn test_corner_candidate_combines_two_walls() {
        let room = Room::rectangular(1000.0, 1000.0);
        let a = geom(&cube_at("a", 100.0, [54.0, 300.0, 57.0]));
        let mut out = Vec::new();
        corner_candidates(&a, &room, 10.0, &mut out);
        assert_eq!(out.len(), 1);
        let c = &out[0];
        assert_eq!(c.kind, SnapType::Corner);
        assert_eq!(c.target_id, "wall_left+wall_back");
        assert!((c.offset - DVec3::new(-4.0, 0.0, -7.0)).length() < 1e-9);
        assert!((c.distance - 7.0).abs() < 1e-9);
    }
}
