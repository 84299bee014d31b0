//! Ready-made generation functions for common surfaces.
//!
//! Parametric shapes take `u` as the angle around the local Z axis in
//! `[0, 2*PI]`; the meaning of `v` is given per function.

use msurf_math::DVec3;

use crate::functions::Shape;

/// Plane `z = a*x + b*y + c`.
pub fn plane(a: f64, b: f64, c: f64) -> Shape {
    Shape::explicit(move |x, y| a * x + b * y + c)
}

/// Paraboloid `z = x^2 + y^2`.
pub fn paraboloid() -> Shape {
    Shape::explicit(|x, y| x * x + y * y)
}

/// Sphere of constant `radius` around the origin.
pub fn sphere(radius: f64) -> Shape {
    Shape::spherical(move |_, _, _| radius)
}

/// Torus around the Z axis; `v` is the angle around the tube in `[0, 2*PI]`.
pub fn torus(major_radius: f64, minor_radius: f64) -> Shape {
    Shape::parametric(move |u, v| {
        let radial = DVec3::new(u.cos(), u.sin(), 0.0);
        major_radius * radial + minor_radius * (v.cos() * radial + v.sin() * DVec3::Z)
    })
}

/// Cylinder around the Z axis; `v` is the height.
pub fn cylinder(radius: f64) -> Shape {
    Shape::parametric(move |u, v| DVec3::new(radius * u.cos(), radius * u.sin(), v))
}

/// Cone with apex at the origin opening along +Z; `v` is the slant distance.
pub fn cone(half_angle: f64) -> Shape {
    Shape::parametric(move |u, v| {
        let radial = DVec3::new(u.cos(), u.sin(), 0.0);
        v * (half_angle.sin() * radial + half_angle.cos() * DVec3::Z)
    })
}

/// Zero set of `x^2 + y^2 + z^2 - radius^2`.
pub fn implicit_sphere(radius: f64) -> Shape {
    Shape::implicit(move |x, y, z| x * x + y * y + z * z - radius * radius)
}

/// Zero set of the torus around the Z axis.
pub fn implicit_torus(major_radius: f64, minor_radius: f64) -> Shape {
    Shape::implicit(move |x, y, z| {
        let q = (x * x + y * y).sqrt() - major_radius;
        q * q + z * z - minor_radius * minor_radius
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f64::consts::PI;

    #[test]
    fn test_torus_points_on_tube() {
        let shape = torus(3.0, 1.0);
        for i in 0..8 {
            for j in 0..8 {
                let u = i as f64 * PI / 4.0;
                let v = j as f64 * PI / 4.0;
                let p = shape.grid_point(u, v).unwrap();
                let ring = (p.x * p.x + p.y * p.y).sqrt() - 3.0;
                let dist = (ring * ring + p.z * p.z).sqrt();
                assert!((dist - 1.0).abs() < 1e-10, "dist={} at u={}, v={}", dist, u, v);
            }
        }
    }

    #[test]
    fn test_cylinder_radius() {
        let shape = cylinder(2.0);
        let p = shape.grid_point(PI / 3.0, 5.0).unwrap();
        assert!(((p.x * p.x + p.y * p.y).sqrt() - 2.0).abs() < 1e-10);
        assert!((p.z - 5.0).abs() < 1e-10);
    }

    #[test]
    fn test_cone_apex_at_origin() {
        let shape = cone(PI / 6.0);
        assert!(shape.grid_point(1.0, 0.0).unwrap().length() < 1e-12);
    }

    #[test]
    fn test_implicit_torus_zero_on_surface() {
        let Shape::Implicit(f) = implicit_torus(3.0, 1.0) else {
            panic!("expected an implicit shape");
        };
        assert!(f(4.0, 0.0, 0.0).abs() < 1e-12);
        assert!(f(0.0, 0.0, 0.0) > 0.0);
        assert!(f(3.0, 0.0, 0.0) < 0.0);
    }

    #[test]
    fn test_plane_height() {
        let p = plane(1.0, 2.0, 3.0).grid_point(1.0, 1.0).unwrap();
        assert!((p.z - 6.0).abs() < 1e-12);
    }
}
