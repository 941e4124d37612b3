//! Core types: math re-exports, Transform, scene/component model.

pub use glam::{EulerRot, Mat4, Quat, Vec3, vec3};

pub mod components;
pub mod error;
pub mod scene;
pub mod transform;

pub use error::{CoreError, CoreResult};
