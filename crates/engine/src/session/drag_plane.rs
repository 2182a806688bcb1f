//! Drag plane construction and pointer-ray intersection.

use glam::DVec3;
use serde::{Deserialize, Serialize};

use crate::geometry::vec3;
use crate::snap::Axis;

/// A ray in world space
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Ray {
    pub origin: DVec3,
    pub direction: DVec3,
}

impl Ray {
    pub fn new(origin: DVec3, direction: DVec3) -> Self {
        Self {
            origin,
            direction: direction.normalize_or_zero(),
        }
    }

    /// Point at parameter `t`
    pub fn at(&self, t: f64) -> DVec3 {
        self.origin + self.direction * t
    }
}

/// Pointer ray as reported by the renderer, with the camera viewing direction
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PointerRay {
    pub origin: [f64; 3],
    pub direction: [f64; 3],
    pub view: [f64; 3],
}

impl PointerRay {
    pub fn new(origin: [f64; 3], direction: [f64; 3], view: [f64; 3]) -> Self {
        Self {
            origin,
            direction,
            view,
        }
    }

    pub fn ray(&self) -> Ray {
        Ray::new(vec3(self.origin), vec3(self.direction))
    }

    /// World point where the ray meets the drag plane through `origin`
    pub fn resolve(&self, axis: Option<Axis>, origin: DVec3) -> Option<DVec3> {
        DragPlane::for_axis(axis, vec3(self.view), origin).intersect(&self.ray())
    }
}

/// Plane the pointer ray is intersected with while dragging
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DragPlane {
    pub origin: DVec3,
    pub normal: DVec3,
}

impl DragPlane {
    /// Build the drag plane through `origin` for a constraint and camera.
    ///
    /// - planar constraint: the constraint plane itself
    /// - single axis: the plane containing the axis that faces the camera most
    /// - no constraint: the screen-facing plane
    pub fn for_axis(axis: Option<Axis>, camera_dir: DVec3, origin: DVec3) -> Self {
        let view = camera_dir.normalize_or_zero();
        let normal = match axis {
            Some(a) if a.is_planar() => a.direction(),
            Some(a) => {
                let along = a.direction();
                let facing = along.cross(view.cross(along));
                if facing.length_squared() < 1e-12 {
                    // Looking straight down the axis
                    along.any_orthonormal_vector()
                } else {
                    facing.normalize()
                }
            }
            None if view.length_squared() > 0.0 => -view,
            None => DVec3::Y,
        };
        Self { origin, normal }
    }

    /// Where the ray hits the plane, if in front of the ray origin
    pub fn intersect(&self, ray: &Ray) -> Option<DVec3> {
        let denom = self.normal.dot(ray.direction);
        if denom.abs() < 1e-9 {
            return None;
        }
        let t = self.normal.dot(self.origin - ray.origin) / denom;
        if t < 0.0 {
            return None;
        }
        Some(ray.at(t))
    }
}
