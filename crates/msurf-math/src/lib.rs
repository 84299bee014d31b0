pub mod aabb;
pub mod color;
pub mod range;
pub mod transform;

pub use glam::{DMat3, DMat4, DQuat, DVec2, DVec3, DVec4};
pub use aabb::Aabb3;
pub use color::Color;
pub use range::{AxisSampling, ParamRange};
pub use transform::SurfaceTransform;

pub type Point2 = DVec2;
pub type Point3 = DVec3;
pub type Vector2 = DVec2;
pub type Vector3 = DVec3;
