use glam::DVec3;
use serde::{Deserialize, Serialize};

/// Share of the offset magnitude the constrained components must carry.
pub const DOMINANCE_THRESHOLD: f64 = 0.7;

/// Which axis (or plane) a drag is constrained to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Axis {
    X,
    Y,
    Z,
    XY,
    XZ,
    YZ,
}

impl Axis {
    /// World component indices this constraint allows to move
    pub fn components(&self) -> &'static [usize] {
        match self {
            Axis::X => &[0],
            Axis::Y => &[1],
            Axis::Z => &[2],
            Axis::XY => &[0, 1],
            Axis::XZ => &[0, 2],
            Axis::YZ => &[1, 2],
        }
    }

    /// Two-axis (planar) constraint
    pub fn is_planar(&self) -> bool {
        self.components().len() == 2
    }

    /// Single axis for a component index
    pub fn from_component(index: usize) -> Option<Axis> {
        match index {
            0 => Some(Axis::X),
            1 => Some(Axis::Y),
            2 => Some(Axis::Z),
            _ => None,
        }
    }

    /// Unit direction of a single axis, or the plane normal for a planar one
    pub fn direction(&self) -> DVec3 {
        match self {
            Axis::X | Axis::YZ => DVec3::X,
            Axis::Y | Axis::XZ => DVec3::Y,
            Axis::Z | Axis::XY => DVec3::Z,
        }
    }

    /// 1.0 on allowed components, 0.0 elsewhere
    pub fn mask(&self) -> DVec3 {
        let mut m = DVec3::ZERO;
        for &i in self.components() {
            m[i] = 1.0;
        }
        m
    }

    /// Keep only the constrained components of `delta`
    pub fn project(&self, delta: DVec3) -> DVec3 {
        delta * self.mask()
    }

    /// Whether an offset is dominantly aligned with this constraint.
    ///
    /// The largest constrained component must carry at least 70% of the
    /// offset magnitude. A zero offset is always admitted.
    pub fn admits(&self, offset: DVec3) -> bool {
        let magnitude = offset.length();
        if magnitude <= f64::EPSILON {
            return true;
        }
        let dominant = self
            .components()
            .iter()
            .map(|&i| offset[i].abs())
            .fold(0.0, f64::max);
        dominant >= DOMINANCE_THRESHOLD * magnitude
    }
}

/// `Axis::admits` that treats "no constraint" as admitting everything
pub fn admits(axis: Option<Axis>, offset: DVec3) -> bool {
    axis.is_none_or(|a| a.admits(offset))
}

/// Apply `offset` to `input`, overwriting only the constrained components.
/// Unconstrained components pass through bit-for-bit.
pub fn apply_constrained(input: DVec3, offset: DVec3, axis: Option<Axis>) -> DVec3 {
    match axis {
        None => input + offset,
        Some(a) => {
            let mut out = input;
            for &i in a.components() {
                out[i] = input[i] + offset[i];
            }
            out
        }
    }
}
