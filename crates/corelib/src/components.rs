//! Built-in components.

use std::sync::Arc;

use asset::MeshData;

use crate::{
    Vec3,
    scene::{Component, ComponentContext},
};

/// Draws a mesh at the owner's transform with the named material.
#[derive(Clone, Debug)]
pub struct RenderComponent {
    pub mesh: Arc<MeshData>,
    pub material: String,
}

impl RenderComponent {
    pub fn new(mesh: Arc<MeshData>, material: impl Into<String>) -> Self {
        Self {
            mesh,
            material: material.into(),
        }
    }
}

impl Component for RenderComponent {
    fn type_name(&self) -> &'static str {
        "RenderComponent"
    }

    fn awake(&mut self, ctx: &mut ComponentContext<'_>) {
        if !self.mesh.is_valid() {
            log::warn!(
                "'{}' has a mesh with {} vertices, nothing to draw",
                ctx.name,
                self.mesh.vertex_count()
            );
            ctx.disable();
        }
    }
}

/// Spins the owner at a constant Euler rate (radians per second, XYZ).
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct RotatingBehaviour {
    pub speed: Vec3,
}

impl RotatingBehaviour {
    pub fn new(speed: Vec3) -> Self {
        Self { speed }
    }

    /// Convenience for degrees per second.
    pub fn from_degrees(speed_deg: Vec3) -> Self {
        Self {
            speed: Vec3::new(
                speed_deg.x.to_radians(),
                speed_deg.y.to_radians(),
                speed_deg.z.to_radians(),
            ),
        }
    }
}

impl Component for RotatingBehaviour {
    fn type_name(&self) -> &'static str {
        "RotatingBehaviour"
    }

    fn update(&mut self, dt: f32, ctx: &mut ComponentContext<'_>) {
        ctx.transform.rotation_euler += self.speed * dt;
    }
}
