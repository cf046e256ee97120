//! Vector helpers for antenna frame transforms
//!
//! Positions and directions are plain `nalgebra` vectors; this module adds
//! the spherical-coordinate conversions and axis rotations the antenna
//! model needs. Azimuth is measured from +X in the XY plane, elevation
//! from the XY plane with positive up.

use nalgebra::{Rotation3, Vector3};

/// 3D position or direction in metres
pub type Vec3 = Vector3<f64>;

/// Magnitudes below this are treated as zero when normalizing
const NORM_EPSILON: f64 = 1e-10;

/// Rotate a vector around the Z axis (right-handed)
pub fn rotate_z(v: &Vec3, angle_rad: f64) -> Vec3 {
    Rotation3::from_axis_angle(&Vector3::z_axis(), angle_rad) * v
}

/// Rotate a vector around the Y axis (right-handed)
pub fn rotate_y(v: &Vec3, angle_rad: f64) -> Vec3 {
    Rotation3::from_axis_angle(&Vector3::y_axis(), angle_rad) * v
}

/// Rotate a vector around the X axis (right-handed)
pub fn rotate_x(v: &Vec3, angle_rad: f64) -> Vec3 {
    Rotation3::from_axis_angle(&Vector3::x_axis(), angle_rad) * v
}

/// Convert a direction to spherical angles `(azimuth_rad, elevation_rad)`
pub fn to_spherical(v: &Vec3) -> (f64, f64) {
    let r_xy = (v.x * v.x + v.y * v.y).sqrt();
    let azimuth = v.y.atan2(v.x);
    let elevation = v.z.atan2(r_xy);
    (azimuth, elevation)
}

/// Unit direction vector from spherical angles
pub fn from_spherical(azimuth_rad: f64, elevation_rad: f64) -> Vec3 {
    let cos_elev = elevation_rad.cos();
    Vec3::new(
        cos_elev * azimuth_rad.cos(),
        cos_elev * azimuth_rad.sin(),
        elevation_rad.sin(),
    )
}

/// Normalize a vector, returning the zero vector for near-zero magnitudes
pub fn normalize_or_zero(v: &Vec3) -> Vec3 {
    match v.try_normalize(NORM_EPSILON) {
        Some(unit) => unit,
        None => Vec3::zeros(),
    }
}

/// Normalize an angle in degrees into [0, 360)
pub fn wrap_degrees(mut angle_deg: f64) -> f64 {
    angle_deg %= 360.0;
    if angle_deg < 0.0 {
        angle_deg += 360.0;
    }
    // A tiny negative remainder can round up to exactly 360.0
    if angle_deg >= 360.0 {
        angle_deg = 0.0;
    }
    angle_deg
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f64::consts::{FRAC_PI_2, PI};

    const TOL: f64 = 1e-12;

    #[test]
    fn test_rotation_round_trip() {
        let v = Vec3::new(1.0, 2.0, 3.0);
        for angle in [0.3, -1.2, PI, 5.9] {
            let back = rotate_z(&rotate_z(&v, angle), -angle);
            assert!((back - v).norm() < TOL);
            let back = rotate_y(&rotate_y(&v, angle), -angle);
            assert!((back - v).norm() < TOL);
            let back = rotate_x(&rotate_x(&v, angle), -angle);
            assert!((back - v).norm() < TOL);
        }
    }

    #[test]
    fn test_rotation_preserves_magnitude() {
        let v = Vec3::new(-4.0, 0.5, 2.5);
        let mag = v.norm();
        assert!((rotate_z(&v, 1.1).norm() - mag).abs() < TOL);
        assert!((rotate_y(&v, -2.7).norm() - mag).abs() < TOL);
        assert!((rotate_x(&v, 0.4).norm() - mag).abs() < TOL);
    }

    #[test]
    fn test_rotate_z_quarter_turn() {
        let v = rotate_z(&Vec3::new(1.0, 0.0, 0.0), FRAC_PI_2);
        assert!(v.x.abs() < TOL);
        assert!((v.y - 1.0).abs() < TOL);
        assert!(v.z.abs() < TOL);
    }

    #[test]
    fn test_spherical_round_trip() {
        let (az, el) = to_spherical(&Vec3::new(0.0, 1.0, 0.0));
        assert!((az - FRAC_PI_2).abs() < TOL);
        assert!(el.abs() < TOL);

        let v = from_spherical(0.7, -0.3);
        let (az, el) = to_spherical(&v);
        assert!((az - 0.7).abs() < TOL);
        assert!((el + 0.3).abs() < TOL);
        assert!((v.norm() - 1.0).abs() < TOL);
    }

    #[test]
    fn test_straight_up_elevation() {
        let (_, el) = to_spherical(&Vec3::new(0.0, 0.0, 5.0));
        assert!((el - FRAC_PI_2).abs() < TOL);
    }

    #[test]
    fn test_normalize_near_zero_is_zero() {
        let v = Vec3::new(1e-12, -1e-13, 0.0);
        assert_eq!(normalize_or_zero(&v), Vec3::zeros());

        let unit = normalize_or_zero(&Vec3::new(3.0, 4.0, 0.0));
        assert!((unit.norm() - 1.0).abs() < TOL);
    }

    #[test]
    fn test_wrap_degrees() {
        assert!((wrap_degrees(-90.0) - 270.0).abs() < TOL);
        assert!((wrap_degrees(360.0)).abs() < TOL);
        assert!((wrap_degrees(725.0) - 5.0).abs() < TOL);
    }
}
