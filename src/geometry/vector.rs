/// 3D point / vector used throughout the geometry model (x aft, y right, z up).
pub type Vector3 = nalgebra::Vector3<f64>;

/// Reflect a point across the XZ plane.
pub fn mirror_y(v: &Vector3) -> Vector3 {
    Vector3::new(v.x, -v.y, v.z)
}

/// Component-wise scaling (the `.avl` SCALE keyword).
pub fn scale(v: &Vector3, factors: &Vector3) -> Vector3 {
    v.component_mul(factors)
}

/// Linear interpolation between two points, `t` in [0, 1].
pub fn lerp(a: &Vector3, b: &Vector3, t: f64) -> Vector3 {
    a + (b - a) * t
}

/// Distance between two points as seen from the front (YZ plane).
pub fn front_view_distance(a: &Vector3, b: &Vector3) -> f64 {
    ((b.y - a.y).powi(2) + (b.z - a.z).powi(2)).sqrt()
}

/// Space-separated components in plain decimal, as the solver reads them.
pub fn format_vector(v: &Vector3) -> String {
    format!("{} {} {}", v.x, v.y, v.z)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mirror_flips_only_y() {
        let v = mirror_y(&Vector3::new(1.0, 2.0, 3.0));
        assert_eq!(v, Vector3::new(1.0, -2.0, 3.0));
    }

    #[test]
    fn scale_is_component_wise() {
        let v = scale(&Vector3::new(1.0, 2.0, 3.0), &Vector3::new(2.0, 0.5, -1.0));
        assert_eq!(v, Vector3::new(2.0, 1.0, -3.0));
    }

    #[test]
    fn lerp_midpoint() {
        let m = lerp(&Vector3::zeros(), &Vector3::new(2.0, 4.0, -2.0), 0.5);
        assert_eq!(m, Vector3::new(1.0, 2.0, -1.0));
    }

    #[test]
    fn front_view_ignores_x() {
        let d = front_view_distance(&Vector3::new(5.0, 0.0, 0.0), &Vector3::new(-3.0, 3.0, 4.0));
        assert!((d - 5.0).abs() < 1e-12);
    }

    #[test]
    fn vector_formats_plain_decimal() {
        assert_eq!(format_vector(&Vector3::new(0.5, -1.0, 2.25)), "0.5 -1 2.25");
    }
}
