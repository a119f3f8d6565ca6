//! Point-to-line distances in 3-D

use glam::Vec3;

/// Sum of perpendicular distances from every point to the infinite line
/// through `a` and `b`.
///
/// Each distance is `|(p - a) × (p - b)| / |b - a|`. Returns `None` when `a == b`.
pub fn summed_line_distance(points: &[Vec3], a: Vec3, b: Vec3) -> Option<f32> {
    let length = (b - a).length();
    if length <= f32::EPSILON {
        return None;
    }
    Some(points.iter().map(|&p| (p - a).cross(p - b).length()).sum::<f32>() / length)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_distance_to_axis() {
        let d = summed_line_distance(&[Vec3::new(3.0, 5.0, 0.0)], Vec3::ZERO, Vec3::Y).unwrap();
        assert!((d - 3.0).abs() < 1e-6);
    }

    #[test]
    fn test_point_on_line() {
        let d = summed_line_distance(&[Vec3::splat(2.0)], Vec3::ZERO, Vec3::ONE).unwrap();
        assert!(d.abs() < 1e-5);
    }

    #[test]
    fn test_degenerate_line() {
        assert!(summed_line_distance(&[Vec3::X], Vec3::ONE, Vec3::ONE).is_none());
    }

    #[test]
    fn test_summed_distance() {
        let points = [Vec3::new(1.0, 1.0, 0.0), Vec3::new(2.0, -2.0, 0.0)];
        let sum = summed_line_distance(&points, Vec3::ZERO, Vec3::X * 4.0).unwrap();
        assert!((sum - 3.0).abs() < 1e-5);
    }
}
