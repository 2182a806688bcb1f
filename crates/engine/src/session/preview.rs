//! Live preview transforms and the frames emitted to the renderer.

use std::collections::BTreeMap;

use glam::{DMat3, DVec3};
use serde::Serialize;
use shared::{BodyId, BodyPatch, Dimensions, RigidBody};

use crate::geometry::{euler_from_matrix, rotation_matrix, vec3};
use crate::snap::{Axis, SnapPoint};

/// Where a body is drawn during a session
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PreviewEntry {
    pub position: [f64; 3],
    pub rotation: [f64; 3],
    pub dimensions: Dimensions,
}

impl PreviewEntry {
    pub fn of(body: &RigidBody) -> Self {
        Self {
            position: body.position,
            rotation: body.rotation,
            dimensions: body.dimensions,
        }
    }

    /// Patch turning `frozen` into this entry; `None` when nothing changed
    pub fn patch_against(&self, frozen: &RigidBody) -> Option<BodyPatch> {
        let patch = BodyPatch {
            id: frozen.id.clone(),
            position: (self.position != frozen.position).then_some(self.position),
            rotation: (self.rotation != frozen.rotation).then_some(self.rotation),
            dimensions: (self.dimensions != frozen.dimensions).then_some(self.dimensions),
        };
        (!patch.is_empty()).then_some(patch)
    }
}

/// Body id → live transform
pub type PreviewMap = BTreeMap<BodyId, PreviewEntry>;

/// One emitted preview: everything the renderer needs for a frame
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PreviewFrame {
    /// Increases with every emitted frame
    pub version: u64,
    pub transforms: PreviewMap,
    pub snap_points: Vec<SnapPoint>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub axis: Option<Axis>,
}

/// Rigidly rotate a body by `angle` about the line through `pivot` along `axis`.
pub fn rotate_about(body: &RigidBody, pivot: DVec3, axis: DVec3, angle: f64) -> PreviewEntry {
    if angle == 0.0 {
        return PreviewEntry::of(body);
    }
    let turn = DMat3::from_axis_angle(axis.normalize(), angle);
    let orientation = turn * rotation_matrix(body.rotation);
    let position = pivot + turn * (vec3(body.position) - pivot);
    PreviewEntry {
        position: position.to_array(),
        rotation: euler_from_matrix(orientation),
        dimensions: body.dimensions,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures::panel_at;
    use crate::geometry::corners_of;
    use std::f64::consts::FRAC_PI_2;

    #[test]
    fn test_unchanged_entry_has_no_patch() {
        let body = panel_at("a", [100.0, 50.0, 18.0], [1.0, 2.0, 3.0]);
        assert!(PreviewEntry::of(&body).patch_against(&body).is_none());
    }

    #[test]
    fn test_patch_carries_only_changes() {
        let body = panel_at("a", [100.0, 50.0, 18.0], [0.0; 3]);
        let mut entry = PreviewEntry::of(&body);
        entry.position[0] = 5.0;
        let patch = entry.patch_against(&body).unwrap();
        assert_eq!(patch.position, Some([5.0, 0.0, 0.0]));
        assert!(patch.rotation.is_none());
        assert!(patch.dimensions.is_none());
    }

    #[test]
    fn test_rotate_about_group_pivot() {
        // Quarter turn about +Y through the origin: (10, 0, 0) -> (0, 0, -10)
        let body = panel_at("a", [2.0, 4.0, 6.0], [10.0, 0.0, 0.0]);
        let entry = rotate_about(&body, DVec3::ZERO, DVec3::Y, FRAC_PI_2);
        assert!((vec3(entry.position) - DVec3::new(0.0, 0.0, -10.0)).length() < 1e-9);

        // Corners agree with rotating the corners directly
        let mut moved = body.clone();
        moved.position = entry.position;
        moved.rotation = entry.rotation;
        let turn = DMat3::from_rotation_y(FRAC_PI_2);
        let expected: Vec<DVec3> = corners_of(&body).iter().map(|c| turn * *c).collect();
        for c in corners_of(&moved) {
            assert!(expected.iter().any(|e| (*e - c).length() < 1e-9));
        }
    }

    #[test]
    fn test_zero_angle_is_exact() {
        let body = panel_at("a", [2.0, 4.0, 6.0], [0.1, 0.2, 0.3]).rotated([0.3, -0.2, 0.1]);
        assert_eq!(rotate_about(&body, DVec3::ONE, DVec3::Z, 0.0), PreviewEntry::of(&body));
    }
}
