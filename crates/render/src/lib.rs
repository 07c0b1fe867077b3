//! Rendering adapter: renderer-agnostic interface.
//!
//! # Invariants
//! - Renderers read the scene and camera; they never mutate either.
//! - Output size is owned by the renderer and changed only through `set_size`.
//!
//! The GPU backend lives in `sketch-render-wgpu`. `DebugTextRenderer` implements
//! the same trait without a GPU and backs headless runs and tests.

mod renderer;

pub use renderer::{DebugTextRenderer, RenderError, Renderer};
