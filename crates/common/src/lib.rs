//! Shared types and configuration for the plane sketch workspace.
//!
//! # Invariants
//! - Rotation angles are stored unwrapped; nothing here reduces them modulo 2π.
//! - Every configuration field has a default, so an empty file is a valid config.

pub mod config;
pub mod types;

pub use config::{
    CameraConfig, ConfigError, PlaneConfig, RendererConfig, RotationConfig, SketchConfig,
    WindowConfig,
};
pub use types::{EulerRotation, Size, Transform};
