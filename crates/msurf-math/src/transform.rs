use crate::{DMat3, DMat4, DQuat, Point3, Vector3};
use serde::{Deserialize, Serialize};

/// Placement of a surface in the scene: distortion first, then rotation,
/// then translation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SurfaceTransform {
    pub rotation: DQuat,
    pub position: Vector3,
    pub distortion: DMat3,
}

impl SurfaceTransform {
    pub fn identity() -> Self {
        Self {
            rotation: DQuat::IDENTITY,
            position: Vector3::ZERO,
            distortion: DMat3::IDENTITY,
        }
    }

    /// Rotation of `angle` radians around `axis`. A zero axis yields identity.
    pub fn axis_rotation(axis: Vector3, angle: f64) -> DQuat {
        match axis.try_normalize() {
            Some(axis) => DQuat::from_axis_angle(axis, angle),
            None => DQuat::IDENTITY,
        }
    }

    pub fn to_mat4(&self) -> DMat4 {
        DMat4::from_translation(self.position)
            * DMat4::from_quat(self.rotation)
            * DMat4::from_mat3(self.distortion)
    }

    pub fn transform_point(&self, p: Point3) -> Point3 {
        self.position + self.rotation * (self.distortion * p)
    }
}

impl Default for SurfaceTransform {
    fn default() -> Self {
        Self::identity()
    }
}
