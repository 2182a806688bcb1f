//! World-space corners, edges and faces of a rotated cuboid.
//!
//! Everything here is a pure function of `(position, rotation, dimensions)`.
//! Nothing is cached between frames.

use glam::{DMat3, DVec3};
use shared::{Dimensions, RigidBody};

use crate::validation::is_usable;

/// Sign pattern of the 8 corners in local space. Bottom ring 0..4, top ring 4..8.
const CORNER_SIGNS: [[f64; 3]; 8] = [
    [-1.0, -1.0, -1.0],
    [1.0, -1.0, -1.0],
    [1.0, -1.0, 1.0],
    [-1.0, -1.0, 1.0],
    [-1.0, 1.0, -1.0],
    [1.0, 1.0, -1.0],
    [1.0, 1.0, 1.0],
    [-1.0, 1.0, 1.0],
];

/// Corner index pairs: 4 bottom, 4 top, 4 vertical.
const EDGE_INDICES: [(usize, usize); 12] = [
    (0, 1),
    (1, 2),
    (2, 3),
    (3, 0),
    (4, 5),
    (5, 6),
    (6, 7),
    (7, 4),
    (0, 4),
    (1, 5),
    (2, 6),
    (3, 7),
];

/// (local axis, sign, corner indices) for each face.
const FACE_LAYOUT: [(usize, f64, [usize; 4]); 6] = [
    (0, 1.0, [1, 2, 6, 5]),
    (0, -1.0, [0, 3, 7, 4]),
    (1, 1.0, [4, 5, 6, 7]),
    (1, -1.0, [0, 1, 2, 3]),
    (2, 1.0, [3, 2, 6, 7]),
    (2, -1.0, [0, 1, 5, 4]),
];

/// An edge of a cuboid in world space
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Edge {
    pub start: DVec3,
    pub end: DVec3,
    /// Normalized start → end
    pub direction: DVec3,
    pub midpoint: DVec3,
}

impl Edge {
    fn between(start: DVec3, end: DVec3) -> Self {
        Self {
            start,
            end,
            direction: (end - start).normalize_or_zero(),
            midpoint: (start + end) * 0.5,
        }
    }

    pub fn length(&self) -> f64 {
        (self.end - self.start).length()
    }
}

/// A face of a cuboid in world space
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Face {
    /// Local axis the face is perpendicular to (0 = X, 1 = Y, 2 = Z)
    pub axis: usize,
    /// +1.0 for the positive side, -1.0 for the negative side
    pub sign: f64,
    pub center: DVec3,
    /// Outward unit normal
    pub normal: DVec3,
    pub corners: [DVec3; 4],
}

/// Rotation matrix for intrinsic Euler angles applied X, then Y, then Z.
///
/// Every consumer in the engine goes through this function, so snapping,
/// collision and preview all agree on orientation.
pub fn rotation_matrix(rotation: [f64; 3]) -> DMat3 {
    DMat3::from_rotation_x(rotation[0])
        * DMat3::from_rotation_y(rotation[1])
        * DMat3::from_rotation_z(rotation[2])
}

/// Inverse of [`rotation_matrix`]: recover XYZ Euler angles from a rotation matrix.
pub fn euler_from_matrix(m: DMat3) -> [f64; 3] {
    // Row/column naming: mRC = m.col(C)[R]
    let m11 = m.x_axis.x;
    let m12 = m.y_axis.x;
    let m13 = m.z_axis.x;
    let m22 = m.y_axis.y;
    let m23 = m.z_axis.y;
    let m32 = m.y_axis.z;
    let m33 = m.z_axis.z;

    let y = m13.clamp(-1.0, 1.0).asin();
    if m13.abs() < 0.999_999_9 {
        [(-m23).atan2(m33), y, (-m12).atan2(m11)]
    } else {
        // Gimbal lock: fold Z into X
        [m32.atan2(m22), y, 0.0]
    }
}

/// Bounding-sphere radius: `sqrt(Σ half-extent²)`
pub fn bounding_radius(dimensions: &Dimensions) -> f64 {
    DVec3::from_array(dimensions.half_extents()).length()
}

/// The 8 world-space corners of a body
pub fn corners_of(body: &RigidBody) -> [DVec3; 8] {
    corners_from(
        DVec3::from_array(body.position),
        DVec3::from_array(body.dimensions.half_extents()),
        &rotation_matrix(body.rotation),
    )
}

/// The 12 world-space edges of a body
pub fn edges_of(body: &RigidBody) -> [Edge; 12] {
    edges_from(&corners_of(body))
}

/// The 6 world-space faces of a body
pub fn faces_of(body: &RigidBody) -> [Face; 6] {
    let rot = rotation_matrix(body.rotation);
    let center = DVec3::from_array(body.position);
    let half = DVec3::from_array(body.dimensions.half_extents());
    faces_from(center, half, &rot, &corners_from(center, half, &rot))
}

fn corners_from(center: DVec3, half: DVec3, rot: &DMat3) -> [DVec3; 8] {
    CORNER_SIGNS.map(|s| center + *rot * (DVec3::from_array(s) * half))
}

fn edges_from(corners: &[DVec3; 8]) -> [Edge; 12] {
    EDGE_INDICES.map(|(a, b)| Edge::between(corners[a], corners[b]))
}

fn faces_from(center: DVec3, half: DVec3, rot: &DMat3, corners: &[DVec3; 8]) -> [Face; 6] {
    FACE_LAYOUT.map(|(axis, sign, idx)| {
        let mut local = DVec3::ZERO;
        local[axis] = sign;
        let normal = *rot * local;
        Face {
            axis,
            sign,
            center: center + normal * half[axis],
            normal,
            corners: idx.map(|i| corners[i]),
        }
    })
}

/// All derived geometry of one body for one query.
///
/// Built fresh from the body's current transform every time it is needed.
#[derive(Debug, Clone)]
pub struct BoundingGeometry {
    pub center: DVec3,
    pub half_extents: DVec3,
    /// World directions of the local X, Y and Z axes
    pub axes: [DVec3; 3],
    pub corners: [DVec3; 8],
    pub edges: [Edge; 12],
    pub faces: [Face; 6],
    pub radius: f64,
}

impl BoundingGeometry {
    /// Geometry of a body, or `None` if the body is malformed.
    pub fn of(body: &RigidBody) -> Option<Self> {
        if !is_usable(body) {
            return None;
        }
        Some(Self::from_parts(
            DVec3::from_array(body.position),
            DVec3::from_array(body.dimensions.half_extents()),
            body.rotation,
        ))
    }

    /// Geometry of a body placed at `position` instead of its stored one.
    pub fn of_at(body: &RigidBody, position: DVec3) -> Option<Self> {
        Self::of(body).map(|g| g.translated(position - g.center))
    }

    pub fn from_parts(center: DVec3, half_extents: DVec3, rotation: [f64; 3]) -> Self {
        let rot = rotation_matrix(rotation);
        let corners = corners_from(center, half_extents, &rot);
        Self {
            center,
            half_extents,
            axes: [rot.x_axis, rot.y_axis, rot.z_axis],
            corners,
            edges: edges_from(&corners),
            faces: faces_from(center, half_extents, &rot, &corners),
            radius: half_extents.length(),
        }
    }

    /// Same shape shifted by `offset`
    pub fn translated(&self, offset: DVec3) -> Self {
        let mut out = self.clone();
        out.center += offset;
        for c in &mut out.corners {
            *c += offset;
        }
        for e in &mut out.edges {
            e.start += offset;
            e.end += offset;
            e.midpoint += offset;
        }
        for f in &mut out.faces {
            f.center += offset;
            for c in &mut f.corners {
                *c += offset;
            }
        }
        out
    }

    /// Bounding-sphere early exit: can anything within `tolerance` touch?
    pub fn within_reach(&self, other: &BoundingGeometry, tolerance: f64) -> bool {
        self.center.distance(other.center) <= self.radius + other.radius + tolerance
    }

    /// Lowest value of `dot(direction, corner)` over all corners
    pub fn support_min(&self, direction: DVec3) -> f64 {
        self.corners
            .iter()
            .map(|c| c.dot(direction))
            .fold(f64::INFINITY, f64::min)
    }
}
