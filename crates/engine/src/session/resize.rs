//! Face-handle resizing: one face moves, the opposite face stays put.

use glam::DVec3;
use serde::{Deserialize, Serialize};
use shared::RigidBody;

use super::inference::quantize;
use super::preview::PreviewEntry;
use crate::geometry::{rotation_matrix, vec3, BoundingGeometry};
use crate::snap::candidates::OPPOSING_FACE_DOT;
use crate::snap::{Axis, SnapContext, SnapPoint, SnapType};
use crate::state::settings::EngineSettings;

/// Which face of the body is being dragged
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResizeHandle {
    /// Local axis the face is perpendicular to (`X`, `Y` or `Z`)
    pub axis: Axis,
    /// The `+` face when true, the `-` face otherwise
    #[serde(default = "default_positive")]
    pub positive: bool,
}

fn default_positive() -> bool {
    true
}

impl ResizeHandle {
    pub fn new(axis: Axis, positive: bool) -> Self {
        Self { axis, positive }
    }

    /// Local component index; planar axes use their normal
    fn index(&self) -> usize {
        match self.axis {
            Axis::X | Axis::YZ => 0,
            Axis::Y | Axis::XZ => 1,
            Axis::Z | Axis::XY => 2,
        }
    }

    /// World-space outward normal of the dragged face
    pub fn direction(&self, body: &RigidBody) -> DVec3 {
        let mut local = DVec3::ZERO;
        local[self.index()] = if self.positive { 1.0 } else { -1.0 };
        rotation_matrix(body.rotation) * local
    }
}

/// Resized preview plus the face it snapped to, if any
#[derive(Debug, Clone, PartialEq)]
pub struct ResizeOutcome {
    pub entry: PreviewEntry,
    pub snap_point: Option<SnapPoint>,
}

/// Resize `frozen` by dragging `handle` through `pointer_delta`.
///
/// Order: project the pointer onto the face normal, quantize (precision),
/// clamp to the minimum dimension, then snap the moving face flush with or
/// `collision_offset` short of nearby target faces.
pub fn resize(
    frozen: &RigidBody,
    handle: ResizeHandle,
    pointer_delta: DVec3,
    precision: bool,
    settings: &EngineSettings,
    ctx: &SnapContext<'_>,
) -> ResizeOutcome {
    let index = handle.index();
    let dir = handle.direction(frozen);
    let center = vec3(frozen.position);
    let old = frozen.dimensions.to_array()[index];
    let min = settings.session.min_dimension;

    let mut size = old + pointer_delta.dot(dir);
    if precision {
        size = quantize(size, settings.grid.step);
    }
    size = size.max(min);

    let mut snap_point = None;
    if settings.snap.enabled && settings.snap.face {
        let fixed = center.dot(dir) - old * 0.5;
        if let Some((snapped, point)) = snap_face(frozen, index, size, fixed, dir, settings, ctx) {
            size = snapped;
            snap_point = Some(point);
        }
    }

    let mut dims = frozen.dimensions.to_array();
    dims[index] = size;
    let position = if size == old {
        frozen.position
    } else {
        (center + dir * ((size - old) * 0.5)).to_array()
    };

    ResizeOutcome {
        entry: PreviewEntry {
            position,
            rotation: frozen.rotation,
            dimensions: shared::Dimensions::from_array(dims),
        },
        snap_point,
    }
}

/// Closest target face the moving face can reach within tolerance.
fn snap_face(
    frozen: &RigidBody,
    index: usize,
    size: f64,
    fixed: f64,
    dir: DVec3,
    settings: &EngineSettings,
    ctx: &SnapContext<'_>,
) -> Option<(f64, SnapPoint)> {
    let tolerance = settings.snap.distance;
    let min = settings.session.min_dimension;

    let mut trial = frozen.clone();
    let mut dims = trial.dimensions.to_array();
    dims[index] = size;
    trial.dimensions = shared::Dimensions::from_array(dims);
    let geometry = BoundingGeometry::of(&trial)?;
    let geometry = geometry.translated(dir * ((size - frozen.dimensions.to_array()[index]) * 0.5));

    let moving_face = fixed + size;
    let mut best: Option<(f64, f64, SnapPoint)> = None;
    for target in ctx.targets(std::slice::from_ref(&geometry)) {
        for face in &target.geometry.faces {
            let facing = face.normal.dot(dir);
            let plane = face.center.dot(dir);
            let wanted = if facing <= OPPOSING_FACE_DOT {
                plane - settings.snap.collision_offset
            } else if facing >= -OPPOSING_FACE_DOT {
                plane
            } else {
                continue;
            };
            let travel = (wanted - moving_face).abs();
            if travel > tolerance || wanted - fixed < min {
                continue;
            }
            if best.as_ref().is_none_or(|(t, _, _)| travel < *t) {
                let point = SnapPoint {
                    kind: SnapType::Face,
                    target_id: target.id.clone(),
                    position: face.center.to_array(),
                };
                best = Some((travel, wanted - fixed, point));
            }
        }
    }
    best.map(|(_, size, point)| (size, point))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures::panel_at;
    use shared::{BodyId, Room};
    use std::collections::HashSet;

    fn run(
        body: &RigidBody,
        others: &[RigidBody],
        handle: ResizeHandle,
        delta: DVec3,
        precision: bool,
    ) -> ResizeOutcome {
        let settings = EngineSettings::default();
        let mut bodies = vec![body.clone()];
        bodies.extend_from_slice(others);
        let room = Room::default();
        let moving: HashSet<BodyId> = HashSet::from([body.id.clone()]);
        let ctx = SnapContext {
            bodies: &bodies,
            room: &room,
            settings: &settings.snap,
            moving: &moving,
        };
        resize(body, handle, delta, precision, &settings, &ctx)
    }

    #[test]
    fn test_opposite_face_stays_fixed() {
        let body = panel_at("a", [100.0, 50.0, 18.0], [0.0; 3]);
        let out = run(&body, &[], ResizeHandle::new(Axis::X, true), DVec3::new(30.0, 5.0, 0.0), false);
        assert_eq!(out.entry.dimensions.width, 130.0);
        // Left face was at -50 and still is
        assert_eq!(out.entry.position[0] - 65.0, -50.0);
        assert_eq!(out.entry.position[1], 0.0);
    }

    #[test]
    fn test_negative_handle_grows_the_other_way() {
        let body = panel_at("a", [100.0, 50.0, 18.0], [0.0; 3]);
        let out = run(&body, &[], ResizeHandle::new(Axis::X, false), DVec3::new(-20.0, 0.0, 0.0), false);
        assert_eq!(out.entry.dimensions.width, 120.0);
        assert_eq!(out.entry.position[0], -10.0);
    }

    #[test]
    fn test_minimum_dimension() {
        let body = panel_at("a", [100.0, 50.0, 18.0], [0.0; 3]);
        let out = run(&body, &[], ResizeHandle::new(Axis::Y, true), DVec3::new(0.0, -500.0, 0.0), false);
        assert_eq!(out.entry.dimensions.height, 1.0);
    }

    #[test]
    fn test_precision_quantizes_dimension() {
        let body = panel_at("a", [100.0, 50.0, 18.0], [0.0; 3]);
        let out = run(&body, &[], ResizeHandle::new(Axis::X, true), DVec3::new(13.0, 0.0, 0.0), true);
        assert_eq!(out.entry.dimensions.width, 110.0);
    }

    #[test]
    fn test_face_snaps_short_of_neighbour() {
        let body = panel_at("a", [100.0, 50.0, 18.0], [0.0; 3]);
        // Neighbour's left face at x = 110
        let other = panel_at("b", [40.0, 50.0, 18.0], [130.0, 0.0, 0.0]);
        let out = run(&body, &[other], ResizeHandle::new(Axis::X, true), DVec3::new(57.0, 0.0, 0.0), false);
        let right_face = out.entry.position[0] + out.entry.dimensions.width * 0.5;
        assert!((right_face - 109.5).abs() < 1e-9, "right face at {right_face}");
        assert_eq!(out.snap_point.unwrap().target_id, "b");
    }

    #[test]
    fn test_face_snaps_flush_with_coplanar_face() {
        let body = panel_at("a", [100.0, 50.0, 18.0], [0.0; 3]);
        // Neighbour above whose right face sits at x = 80
        let other = panel_at("b", [60.0, 20.0, 18.0], [50.0, 40.0, 0.0]);
        let out = run(&body, &[other], ResizeHandle::new(Axis::X, true), DVec3::new(27.0, 0.0, 0.0), false);
        let right_face = out.entry.position[0] + out.entry.dimensions.width * 0.5;
        assert!((right_face - 80.0).abs() < 1e-9, "right face at {right_face}");
    }
}
