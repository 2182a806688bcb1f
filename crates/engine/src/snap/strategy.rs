//! Versioned candidate-generation strategies.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use shared::Room;

use super::candidates::{
    corner_candidates, edge_candidates, face_candidates, wall_candidates,
};
use super::{CandidateSet, SnapTarget};
use crate::geometry::{Aabb, BoundingGeometry};
use crate::state::settings::SnapSettings;

/// Which candidate generator is active, selected by `SnapSettings::version`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SnapStrategy {
    /// Edge and face alignment between oriented boxes
    EdgeFace,
    /// Face alignment between world AABBs, target parts merged per group
    GroupBoundingBox,
    /// Edge/face plus room walls and wall corners
    #[default]
    WallAware,
}

impl SnapStrategy {
    /// Generate all candidates for the moving bodies (already placed at their
    /// candidate positions) against the pre-filtered targets.
    pub fn collect(
        &self,
        movers: &[BoundingGeometry],
        targets: &[SnapTarget],
        room: &Room,
        settings: &SnapSettings,
    ) -> CandidateSet {
        let mut set = CandidateSet::default();
        match self {
            SnapStrategy::EdgeFace => {
                edge_face(movers, targets, settings, &mut set);
            }
            SnapStrategy::GroupBoundingBox => {
                group_bounding_box(movers, targets, settings, &mut set);
            }
            SnapStrategy::WallAware => {
                edge_face(movers, targets, settings, &mut set);
                walls(movers, room, settings, &mut set);
            }
        }
        set
    }
}

fn edge_face(
    movers: &[BoundingGeometry],
    targets: &[SnapTarget],
    settings: &SnapSettings,
    set: &mut CandidateSet,
) {
    let tol = settings.distance;
    for mover in movers {
        for target in targets {
            if !mover.within_reach(&target.geometry, tol) {
                continue;
            }
            if settings.edge {
                edge_candidates(
                    mover,
                    &target.geometry,
                    &target.id,
                    tol,
                    settings.collision_offset,
                    &mut set.body,
                );
            }
            if settings.face {
                face_candidates(
                    mover,
                    &target.geometry,
                    &target.id,
                    tol,
                    settings.collision_offset,
                    &mut set.body,
                );
            }
        }
    }
}

fn group_bounding_box(
    movers: &[BoundingGeometry],
    targets: &[SnapTarget],
    settings: &SnapSettings,
    set: &mut CandidateSet,
) {
    if !settings.face {
        return;
    }
    let Some(mover_box) = movers
        .iter()
        .map(Aabb::of_geometry)
        .reduce(|a, b| a.union(&b))
    else {
        return;
    };
    let mover = mover_box.to_geometry();

    // One box per cabinet, one per loose part
    let mut boxes: BTreeMap<String, Aabb> = BTreeMap::new();
    for target in targets {
        let key = target.group_id.clone().unwrap_or_else(|| target.id.clone());
        let b = Aabb::of_geometry(&target.geometry);
        boxes
            .entry(key)
            .and_modify(|acc| *acc = acc.union(&b))
            .or_insert(b);
    }

    let tol = settings.distance;
    for (id, b) in boxes {
        let geometry = b.to_geometry();
        if !mover.within_reach(&geometry, tol) {
            continue;
        }
        face_candidates(
            &mover,
            &geometry,
            &id,
            tol,
            settings.collision_offset,
            &mut set.body,
        );
    }
}

fn walls(movers: &[BoundingGeometry], room: &Room, settings: &SnapSettings, set: &mut CandidateSet) {
    if !settings.wall || room.is_empty() {
        return;
    }
    for mover in movers {
        wall_candidates(mover, room, settings.distance, &mut set.wall);
        if settings.corner {
            corner_candidates(mover, room, settings.distance, &mut set.corner);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures::{cube_at, panel_at};
    use crate::snap::SnapType;

    fn target(body: &shared::RigidBody) -> SnapTarget {
        SnapTarget::of(body).unwrap()
    }

    #[test]
    fn test_edge_face_generates_both_kinds() {
        let mover = BoundingGeometry::of(&cube_at("m", 100.0, [0.0; 3])).unwrap();
        // Fronts 6 apart, so edge alignment adds motion beyond the face snap
        let targets = [target(&cube_at("t", 100.0, [104.0, 0.0, 6.0]))];
        let set = SnapStrategy::EdgeFace.collect(
            &[mover],
            &targets,
            &Room::rectangular(5000.0, 5000.0),
            &SnapSettings::default(),
        );
        assert!(set.body.iter().any(|c| c.kind == SnapType::Face));
        assert!(set.body.iter().any(|c| c.kind == SnapType::Edge));
        // EdgeFace ignores the room entirely
        assert!(set.wall.is_empty() && set.corner.is_empty());
    }

    #[test]
    fn test_toggles_disable_kinds() {
        let mover = BoundingGeometry::of(&cube_at("m", 100.0, [0.0; 3])).unwrap();
        let targets = [target(&cube_at("t", 100.0, [104.0, 0.0, 0.0]))];
        let settings = SnapSettings {
            edge: false,
            ..SnapSettings::default()
        };
        let set = SnapStrategy::EdgeFace.collect(&[mover], &targets, &Room::default(), &settings);
        assert!(set.body.iter().all(|c| c.kind == SnapType::Face));
    }

    #[test]
    fn test_group_bounding_box_merges_cabinet() {
        // Two sides of one cabinet, the mover approaches the right side
        let left = panel_at("l", [18.0, 720.0, 560.0], [0.0, 360.0, 0.0]).in_group("cab");
        let right = panel_at("r", [18.0, 720.0, 560.0], [582.0, 360.0, 0.0]).in_group("cab");
        let mover = BoundingGeometry::of(&panel_at("m", [18.0, 720.0, 560.0], [604.0, 360.0, 0.0])).unwrap();
        let targets = [target(&left), target(&right)];
        let set = SnapStrategy::GroupBoundingBox.collect(
            &[mover],
            &targets,
            &Room::default(),
            &SnapSettings::default(),
        );
        assert!(!set.body.is_empty());
        assert!(set.body.iter().all(|c| c.target_id == "cab"));
        let best = set
            .body
            .iter()
            .min_by(|a, b| a.distance.total_cmp(&b.distance))
            .unwrap();
        // Cabinet box spans x ∈ [-9, 591]; mover's left face is at 595
        assert!((best.offset.x - (-4.0 + 0.5)).abs() < 1e-9);
    }

    #[test]
    fn test_wall_aware_adds_room_candidates() {
        let mover = BoundingGeometry::of(&cube_at("m", 100.0, [55.0, 52.0, 57.0])).unwrap();
        let set = SnapStrategy::WallAware.collect(
            &[mover],
            &[],
            &Room::rectangular(3000.0, 3000.0),
            &SnapSettings::default(),
        );
        assert_eq!(set.wall.len(), 3);
        assert_eq!(set.corner.len(), 3);
    }
}
