//! Geometry kernel: derived bounding geometry of rigid bodies.

mod aabb;
mod kernel;

pub use aabb::Aabb;
pub use kernel::{
    bounding_radius, corners_of, edges_of, euler_from_matrix, faces_of, rotation_matrix,
    BoundingGeometry, Edge, Face,
};

use glam::DVec3;

/// Convert a wire-format vector into glam
pub fn vec3(v: [f64; 3]) -> DVec3 {
    DVec3::from_array(v)
}
