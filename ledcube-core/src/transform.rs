/// Homogeneous 3D transforms and vector helpers
use nalgebra::{Matrix4, Vector3, Vector4};

/// Convert degrees to radians
pub fn radians(degrees: f32) -> f32 {
    degrees.to_radians()
}

/// A point in homogeneous coordinates (w = 1)
pub fn point(x: f32, y: f32, z: f32) -> Vector4<f32> {
    Vector4::new(x, y, z, 1.0)
}

/// A direction or normal in homogeneous coordinates (w = 0)
pub fn direction(x: f32, y: f32, z: f32) -> Vector4<f32> {
    Vector4::new(x, y, z, 0.0)
}

/// Dot product of the xyz parts.
pub fn dot(a: &Vector4<f32>, b: &Vector4<f32>) -> f32 {
    a.xyz().dot(&b.xyz())
}

/// Cross product of the xyz parts, returned as a direction.
pub fn cross(a: &Vector4<f32>, b: &Vector4<f32>) -> Vector4<f32> {
    let c = a.xyz().cross(&b.xyz());
    Vector4::new(c.x, c.y, c.z, 0.0)
}

/// Unit-length copy of the xyz part; the zero vector stays zero.
pub fn normalize(v: &Vector4<f32>) -> Vector4<f32> {
    let xyz = v.xyz();
    let norm = xyz.norm();
    if norm == 0.0 {
        return Vector4::zeros();
    }
    Vector4::new(xyz.x / norm, xyz.y / norm, xyz.z / norm, v.w)
}

/// Rotation state around three axes (in radians)
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RotationState {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

impl RotationState {
    pub fn new(x: f32, y: f32, z: f32) -> Self {
        Self { x, y, z }
    }

    pub fn zero() -> Self {
        Self::new(0.0, 0.0, 0.0)
    }

    pub fn matrix(&self) -> Matrix4<f32> {
        Transform::rotation(self.x, self.y, self.z)
    }
}

impl Default for RotationState {
    fn default() -> Self {
        Self::zero()
    }
}

/// Transform builder for 3D transformations
///
/// Composition is right-multiplication: `compose(a, b)` applied to a vector
/// runs `b` first, then `a`.
pub struct Transform;

impl Transform {
    pub fn rotation_x(angle: f32) -> Matrix4<f32> {
        Matrix4::from_axis_angle(&Vector3::x_axis(), angle)
    }

    pub fn rotation_y(angle: f32) -> Matrix4<f32> {
        Matrix4::from_axis_angle(&Vector3::y_axis(), angle)
    }

    pub fn rotation_z(angle: f32) -> Matrix4<f32> {
        Matrix4::from_axis_angle(&Vector3::z_axis(), angle)
    }

    /// `Rx * Ry * Rz`, written in X, Y, Z order.
    ///
    /// On a column vector the Z rotation acts first, then Y, then X.
    pub fn rotation(x: f32, y: f32, z: f32) -> Matrix4<f32> {
        Self::rotation_x(x) * Self::rotation_y(y) * Self::rotation_z(z)
    }

    pub fn translation(x: f32, y: f32, z: f32) -> Matrix4<f32> {
        Matrix4::new_translation(&Vector3::new(x, y, z))
    }

    pub fn scaling(sx: f32, sy: f32, sz: f32) -> Matrix4<f32> {
        Matrix4::new_nonuniform_scaling(&Vector3::new(sx, sy, sz))
    }

    pub fn compose(a: &Matrix4<f32>, b: &Matrix4<f32>) -> Matrix4<f32> {
        a * b
    }

    /// Inverse of `m`, or `None` when it is singular.
    pub fn inverse(m: &Matrix4<f32>) -> Option<Matrix4<f32>> {
        m.try_inverse()
    }

    pub fn apply(m: &Matrix4<f32>, v: &Vector4<f32>) -> Vector4<f32> {
        m * v
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f32::consts::{FRAC_PI_2, TAU};

    fn assert_close(a: &Vector4<f32>, b: &Vector4<f32>) {
        assert!((a - b).norm() < 1e-5, "{:?} != {:?}", a, b);
    }

    #[test]
    fn test_identity_rotation() {
        let matrix = RotationState::zero().matrix();
        assert!((matrix - Matrix4::identity()).norm() < 1e-6);
    }

    #[test]
    fn test_rotation_then_complement_is_identity() {
        let v = point(0.3, -1.2, 2.5);
        let rotations: [fn(f32) -> Matrix4<f32>; 3] = [
            Transform::rotation_x,
            Transform::rotation_y,
            Transform::rotation_z,
        ];
        for theta in [0.1_f32, 1.0, 2.5, 4.0] {
            for rot in rotations {
                let m = Transform::compose(&rot(TAU - theta), &rot(theta));
                assert_close(&Transform::apply(&m, &v), &v);
            }
        }
    }

    #[test]
    fn test_rotation_z_acts_first() {
        // Z takes +x to +y, then X takes +y to +z.
        let m = Transform::rotation(FRAC_PI_2, 0.0, FRAC_PI_2);
        assert_close(&(m * direction(1.0, 0.0, 0.0)), &direction(0.0, 0.0, 1.0));
    }

    #[test]
    fn test_translation_ignores_directions() {
        let t = Transform::translation(1.0, 2.0, 3.0);
        assert_close(&(t * point(0.0, 0.0, 0.0)), &point(1.0, 2.0, 3.0));
        assert_close(&(t * direction(0.0, 0.0, 1.0)), &direction(0.0, 0.0, 1.0));
    }

    #[test]
    fn test_rigid_inverse() {
        let m = Transform::compose(
            &Transform::translation(0.0, 0.0, 2.0),
            &Transform::rotation_y(0.7),
        );
        let inv = Transform::inverse(&m).expect("rigid transforms invert");
        let v = point(1.0, 2.0, 3.0);
        assert_close(&(inv * (m * v)), &v);
        assert!(Transform::inverse(&Transform::scaling(0.0, 1.0, 1.0)).is_none());
    }

    #[test]
    fn test_vector_helpers() {
        let x = direction(1.0, 0.0, 0.0);
        let y = direction(0.0, 1.0, 0.0);
        assert_eq!(dot(&x, &y), 0.0);
        assert_close(&cross(&x, &y), &direction(0.0, 0.0, 1.0));
        assert_close(&normalize(&direction(0.0, 3.0, 4.0)), &direction(0.0, 0.6, 0.8));
        assert_eq!(normalize(&direction(0.0, 0.0, 0.0)), Vector4::zeros());
    }
}
