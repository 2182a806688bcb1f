//! Active-axis inference and precision quantization.

use glam::DVec3;

use crate::snap::Axis;

/// Active axis for a drag.
///
/// The device constraint wins. Without one, the dominant component of the
/// accumulated delta picks the axis; deltas shorter than `threshold` keep the
/// previous choice so noise cannot flip the axis back and forth.
pub fn infer_axis(
    delta: DVec3,
    device: Option<Axis>,
    previous: Option<Axis>,
    threshold: f64,
) -> Option<Axis> {
    if device.is_some() {
        return device;
    }
    if delta.length() < threshold {
        return previous;
    }
    let abs = delta.abs();
    let index = if abs.x >= abs.y && abs.x >= abs.z {
        0
    } else if abs.y >= abs.z {
        1
    } else {
        2
    };
    Axis::from_component(index)
}

/// Round to the nearest multiple of `step`. A non-positive step disables it.
pub fn quantize(value: f64, step: f64) -> f64 {
    if step <= 0.0 {
        return value;
    }
    (value / step).round() * step
}

pub fn quantize_vec(v: DVec3, step: f64) -> DVec3 {
    DVec3::new(quantize(v.x, step), quantize(v.y, step), quantize(v.z, step))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_device_constraint_wins() {
        let axis = infer_axis(DVec3::new(50.0, 0.0, 0.0), Some(Axis::Z), None, 1.0);
        assert_eq!(axis, Some(Axis::Z));
    }

    #[test]
    fn test_dominant_component() {
        assert_eq!(infer_axis(DVec3::new(3.0, -8.0, 1.0), None, None, 1.0), Some(Axis::Y));
        assert_eq!(infer_axis(DVec3::new(-3.0, 0.0, 2.0), None, None, 1.0), Some(Axis::X));
    }

    #[test]
    fn test_small_delta_keeps_previous() {
        let axis = infer_axis(DVec3::new(0.1, 0.6, 0.0), None, Some(Axis::X), 1.0);
        assert_eq!(axis, Some(Axis::X));
        assert_eq!(infer_axis(DVec3::new(0.1, 0.6, 0.0), None, None, 1.0), None);
    }

    #[test]
    fn test_quantize() {
        assert_eq!(quantize(14.0, 10.0), 10.0);
        assert_eq!(quantize(-16.0, 10.0), -20.0);
        assert_eq!(quantize(7.3, 0.0), 7.3);
        assert_eq!(
            quantize_vec(DVec3::new(4.9, 5.1, -0.2), 10.0),
            DVec3::new(0.0, 10.0, 0.0)
        );
    }
}
