//! Renderer boundary: turns assembled mesh data into GPU vertex buffers.
//! wgpu = 23.x

pub mod mesh;

use anyhow::{Context, Result};
use wgpu::{
    Device, DeviceDescriptor, Features, Instance, InstanceDescriptor, Limits, PowerPreference,
    Queue, RequestAdapterOptions,
};

pub use mesh::{GpuMesh, GpuUploader, vertex_buffer_layout};

/// Create a device/queue pair without a window surface.
/// Useful for tools and tests that only need buffer uploads.
pub fn headless_device() -> Result<(Device, Queue)> {
    pollster::block_on(request_headless_device())
}

async fn request_headless_device() -> Result<(Device, Queue)> {
    let instance = Instance::new(InstanceDescriptor::default());

    let adapter = instance
        .request_adapter(&RequestAdapterOptions {
            power_preference: PowerPreference::LowPower,
            compatible_surface: None,
            force_fallback_adapter: false,
        })
        .await
        .context("No suitable GPU adapter")?;

    let info = adapter.get_info();
    log::info!("Using adapter '{}' ({:?})", info.name, info.backend);

    let (device, queue) = adapter
        .request_device(
            &DeviceDescriptor {
                label: Some("Puck Headless Device"),
                required_features: Features::empty(),
                required_limits: Limits::downlevel_webgl2_defaults()
                    .using_resolution(adapter.limits()),
                memory_hints: Default::default(),
            },
            None,
        )
        .await
        .context("request_device failed")?;

    Ok((device, queue))
}
