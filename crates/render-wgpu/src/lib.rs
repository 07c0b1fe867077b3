//! wgpu render backend for the plane sketch.
//!
//! Draws every scene mesh with its material's own vertex/fragment shaders,
//! into a window surface with a depth buffer and optional 4× MSAA.
//!
//! # Invariants
//! - The renderer never mutates the scene or camera.
//! - Mesh GPU resources are created on first sight and dropped when the mesh leaves the scene.
//! - Depth and MSAA targets always match the surface size.

mod gpu;
mod surface;

pub use gpu::WgpuRenderer;
pub use surface::{FrameStatus, GpuContext, SurfaceRenderer};
