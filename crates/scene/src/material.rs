//! Shader material.
//!
//! A material carries its own WGSL sources for the vertex and fragment
//! stages. Backends bind uniforms in group 0:
//!
//! | binding | type                 | contents                          |
//! |---------|----------------------|-----------------------------------|
//! | 0       | uniform buffer       | `view_proj`, `model`, `time`      |
//! | 1       | `texture_2d<f32>`    | `texture` uniform or placeholder  |
//! | 2       | `sampler`            | linear clamp                      |
//!
//! Vertex inputs are position (location 0), normal (1) and uv (2).

use std::borrow::Cow;
use std::sync::Arc;

/// Errors from building scene data.
#[derive(Debug, thiserror::Error)]
pub enum SceneError {
    #[error("texture pixel data has {actual} bytes, expected {expected} for {width}x{height} RGBA8")]
    TextureSize {
        width: u32,
        height: u32,
        expected: usize,
        actual: usize,
    },
    #[error("texture dimensions must be non-zero, got {width}x{height}")]
    EmptyTexture { width: u32, height: u32 },
}

/// Which faces are rasterized.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Side {
    #[default]
    Front,
    Back,
    Double,
}

/// RGBA8 image bound to a material's `texture` uniform.
#[derive(Debug, Clone, PartialEq)]
pub struct TextureImage {
    width: u32,
    height: u32,
    pixels: Arc<[u8]>,
}

impl TextureImage {
    pub fn from_rgba8(width: u32, height: u32, pixels: Vec<u8>) -> Result<Self, SceneError> {
        if width == 0 || height == 0 {
            return Err(SceneError::EmptyTexture { width, height });
        }
        let expected = width as usize * height as usize * 4;
        if pixels.len() != expected {
            return Err(SceneError::TextureSize {
                width,
                height,
                expected,
                actual: pixels.len(),
            });
        }
        Ok(Self {
            width,
            height,
            pixels: pixels.into(),
        })
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn pixels(&self) -> &[u8] {
        &self.pixels
    }

    /// True if both handles share the same pixel allocation.
    pub fn ptr_eq(a: &Self, b: &Self) -> bool {
        Arc::ptr_eq(&a.pixels, &b.pixels)
    }
}

/// The two externally settable shader parameters.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ShaderUniforms {
    pub time: f32,
    pub texture: Option<TextureImage>,
}

/// Material rendered with a custom vertex/fragment shader pair.
#[derive(Debug, Clone)]
pub struct ShaderMaterial {
    pub vertex_shader: Cow<'static, str>,
    pub fragment_shader: Cow<'static, str>,
    pub side: Side,
    pub uniforms: ShaderUniforms,
}

impl ShaderMaterial {
    pub fn new(
        vertex_shader: impl Into<Cow<'static, str>>,
        fragment_shader: impl Into<Cow<'static, str>>,
    ) -> Self {
        Self {
            vertex_shader: vertex_shader.into(),
            fragment_shader: fragment_shader.into(),
            side: Side::Front,
            uniforms: ShaderUniforms::default(),
        }
    }

    pub fn with_side(mut self, side: Side) -> Self {
        self.side = side;
        self
    }
}
