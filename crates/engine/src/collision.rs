//! Pairwise collision detection between rigid bodies.
//!
//! Advisory only: the result drives highlighting and never blocks a commit.

use std::collections::{BTreeSet, HashMap};

use glam::DVec3;
use serde::Serialize;
use shared::{BodyId, BodyTransform, GroupId, RigidBody};

use crate::geometry::BoundingGeometry;

/// Penetration below this is touching, not colliding
pub const COLLISION_EPS: f64 = 1e-6;

/// One colliding pair. `a < b`, so each unordered pair appears once.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CollisionRecord {
    pub a: BodyId,
    pub b: BodyId,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub group_a: Option<GroupId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub group_b: Option<GroupId>,
}

impl CollisionRecord {
    fn new(x: &RigidBody, y: &RigidBody) -> Self {
        let (first, second) = if x.id <= y.id { (x, y) } else { (y, x) };
        Self {
            a: first.id.clone(),
            b: second.id.clone(),
            group_a: first.group_id.clone(),
            group_b: second.group_id.clone(),
        }
    }

    pub fn involves(&self, id: &str) -> bool {
        self.a == id || self.b == id
    }

    pub fn involves_group(&self, group: &str) -> bool {
        self.group_a.as_deref() == Some(group) || self.group_b.as_deref() == Some(group)
    }
}

/// Flat list of colliding pairs; membership queries are derived from it
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct CollisionSet {
    records: Vec<CollisionRecord>,
}

impl CollisionSet {
    pub fn records(&self) -> &[CollisionRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn is_body_colliding(&self, id: &str) -> bool {
        self.records.iter().any(|r| r.involves(id))
    }

    pub fn is_group_colliding(&self, group: &str) -> bool {
        self.records.iter().any(|r| r.involves_group(group))
    }

    pub fn contains_pair(&self, x: &str, y: &str) -> bool {
        self.records
            .iter()
            .any(|r| (r.a == x && r.b == y) || (r.a == y && r.b == x))
    }

    /// Every body that appears in at least one pair
    pub fn colliding_bodies(&self) -> BTreeSet<&str> {
        self.records
            .iter()
            .flat_map(|r| [r.a.as_str(), r.b.as_str()])
            .collect()
    }

    /// Every group with at least one member in a pair
    pub fn colliding_groups(&self) -> BTreeSet<&str> {
        self.records
            .iter()
            .flat_map(|r| [r.group_a.as_deref(), r.group_b.as_deref()])
            .flatten()
            .collect()
    }
}

/// Separating-axis test between two oriented boxes.
///
/// Tests the 3 + 3 face axes and the 9 edge-edge cross products. Touching
/// boxes (penetration below `epsilon`) do not overlap.
pub fn obb_overlap(a: &BoundingGeometry, b: &BoundingGeometry, epsilon: f64) -> bool {
    let t = b.center - a.center;
    if t.length() >= a.radius + b.radius {
        return false;
    }

    let mut axes: Vec<DVec3> = Vec::with_capacity(15);
    axes.extend_from_slice(&a.axes);
    axes.extend_from_slice(&b.axes);
    for ea in &a.axes {
        for eb in &b.axes {
            let c = ea.cross(*eb);
            // Parallel edges give no new axis
            if c.length_squared() > 1e-12 {
                axes.push(c.normalize());
            }
        }
    }

    !axes.iter().any(|l| {
        let ra = projected_radius(a, *l);
        let rb = projected_radius(b, *l);
        t.dot(*l).abs() >= ra + rb - epsilon
    })
}

fn projected_radius(g: &BoundingGeometry, axis: DVec3) -> f64 {
    (0..3)
        .map(|i| g.half_extents[i] * g.axes[i].dot(axis).abs())
        .sum()
}

/// Collision set for the bodies as they are stored
pub fn detect_collisions(bodies: &[RigidBody]) -> CollisionSet {
    detect_with_overrides(bodies, &HashMap::new())
}

/// Collision set with some bodies replaced by preview transforms
pub fn detect_with_overrides(
    bodies: &[RigidBody],
    overrides: &HashMap<BodyId, BodyTransform>,
) -> CollisionSet {
    let placed: Vec<(&RigidBody, BoundingGeometry)> = bodies
        .iter()
        .filter_map(|b| {
            let geometry = match overrides.get(&b.id) {
                Some(t) => {
                    let mut moved = b.clone();
                    moved.set_transform(*t);
                    BoundingGeometry::of(&moved)
                }
                None => BoundingGeometry::of(b),
            }?;
            Some((b, geometry))
        })
        .collect();

    let mut records = Vec::new();
    for (i, (ba, ga)) in placed.iter().enumerate() {
        for (bb, gb) in &placed[i + 1..] {
            if ba.shares_group_with(bb) {
                continue;
            }
            if obb_overlap(ga, gb, COLLISION_EPS) {
                records.push(CollisionRecord::new(ba, bb));
            }
        }
    }

    if !records.is_empty() {
        tracing::debug!("Detected {} colliding pairs", records.len());
    }
    CollisionSet { records }
}
