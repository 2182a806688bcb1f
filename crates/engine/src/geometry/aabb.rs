use glam::DVec3;

use super::kernel::BoundingGeometry;

/// Axis-aligned bounding box in world space
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Aabb {
    pub min: DVec3,
    pub max: DVec3,
}

impl Aabb {
    /// Smallest box containing all points
    pub fn from_points(points: &[DVec3]) -> Self {
        let mut min = DVec3::splat(f64::MAX);
        let mut max = DVec3::splat(f64::MIN);
        for p in points {
            min = min.min(*p);
            max = max.max(*p);
        }
        Self { min, max }
    }

    /// World-space box around a (possibly rotated) body
    pub fn of_geometry(geometry: &BoundingGeometry) -> Self {
        Self::from_points(&geometry.corners)
    }

    /// Center of the bounding box
    pub fn center(&self) -> DVec3 {
        (self.min + self.max) * 0.5
    }

    pub fn size(&self) -> DVec3 {
        self.max - self.min
    }

    pub fn half_extents(&self) -> DVec3 {
        self.size() * 0.5
    }

    pub fn union(&self, other: &Aabb) -> Aabb {
        Aabb {
            min: self.min.min(other.min),
            max: self.max.max(other.max),
        }
    }

    pub fn translated(&self, offset: DVec3) -> Aabb {
        Aabb {
            min: self.min + offset,
            max: self.max + offset,
        }
    }

    /// Interiors overlap by more than `epsilon` on every axis.
    /// Touching faces do not count.
    pub fn overlaps(&self, other: &Aabb, epsilon: f64) -> bool {
        (0..3).all(|i| self.max[i] - other.min[i] > epsilon && other.max[i] - self.min[i] > epsilon)
    }

    /// As an unrotated cuboid, for reuse of the face/edge machinery
    pub fn to_geometry(&self) -> BoundingGeometry {
        BoundingGeometry::from_parts(self.center(), self.half_extents(), [0.0; 3])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_points_and_center() {
        let b = Aabb::from_points(&[DVec3::new(-1.0, 2.0, 0.0), DVec3::new(3.0, -2.0, 4.0)]);
        assert_eq!(b.min, DVec3::new(-1.0, -2.0, 0.0));
        assert_eq!(b.max, DVec3::new(3.0, 2.0, 4.0));
        assert_eq!(b.center(), DVec3::new(1.0, 0.0, 2.0));
    }

    #[test]
    fn test_touching_boxes_do_not_overlap() {
        let a = Aabb::from_points(&[DVec3::ZERO, DVec3::ONE]);
        let b = a.translated(DVec3::X);
        assert!(!a.overlaps(&b, 1e-9));
        assert!(a.overlaps(&a.translated(DVec3::splat(0.5)), 1e-9));
    }

    #[test]
    fn test_union() {
        let a = Aabb::from_points(&[DVec3::ZERO, DVec3::ONE]);
        let b = a.translated(DVec3::new(5.0, 0.0, 0.0));
        let u = a.union(&b);
        assert_eq!(u.size(), DVec3::new(6.0, 1.0, 1.0));
    }
}
