//! Sketch configuration.
//!
//! Defaults reproduce the reference scene: camera 500 units out on +Z with
//! clip planes 10..2000, a 300×200 plane split into 10×10 segments, and a
//! rotation of one radian every 2000 (X) and 1000 (Y) frames.
//!
//! Files may be YAML (`.yaml`, `.yml`) or JSON (`.json`). Missing fields fall
//! back to their defaults.

use serde::{Deserialize, Serialize};
use std::path::Path;

/// Errors from loading or validating a configuration file.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("unsupported config format: {0}")]
    UnsupportedFormat(String),
    #[error("invalid config: {0}")]
    Invalid(String),
}

/// Perspective camera placement and clip planes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CameraConfig {
    /// Distance from the camera to the plane, in world units.
    pub distance: f64,
    pub near: f64,
    pub far: f64,
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            distance: 500.0,
            near: 10.0,
            far: 2000.0,
        }
    }
}

/// Primary plane geometry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlaneConfig {
    pub width: f64,
    pub height: f64,
    pub width_segments: u32,
    pub height_segments: u32,
}

impl Default for PlaneConfig {
    fn default() -> Self {
        Self {
            width: 300.0,
            height: 200.0,
            width_segments: 10,
            height_segments: 10,
        }
    }
}

/// Frame-counter divisors for the mesh rotation: `angle = frame / divisor`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RotationConfig {
    pub x_divisor: f64,
    pub y_divisor: f64,
}

impl Default for RotationConfig {
    fn default() -> Self {
        Self {
            x_divisor: 2000.0,
            y_divisor: 1000.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RendererConfig {
    /// Multisampled color target (4×) when true.
    pub antialias: bool,
    /// RGBA clear color.
    pub clear_color: [f64; 4],
}

impl Default for RendererConfig {
    fn default() -> Self {
        Self {
            antialias: true,
            clear_color: [0.0, 0.0, 0.0, 1.0],
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WindowConfig {
    pub title: String,
    pub width: u32,
    pub height: u32,
}

impl Default for WindowConfig {
    fn default() -> Self {
        Self {
            title: "Plane Sketch".into(),
            width: 1280,
            height: 720,
        }
    }
}

/// Top-level configuration.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SketchConfig {
    pub camera: CameraConfig,
    pub plane: PlaneConfig,
    pub rotation: RotationConfig,
    pub renderer: RendererConfig,
    pub window: WindowConfig,
}

impl SketchConfig {
    /// Load and validate a config file, choosing the parser by extension.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_ascii_lowercase)
            .unwrap_or_default();
        let text = std::fs::read_to_string(path)?;
        match ext.as_str() {
            "yaml" | "yml" => Self::from_yaml_str(&text),
            "json" => Self::from_json_str(&text),
            other => Err(ConfigError::UnsupportedFormat(other.to_string())),
        }
    }

    pub fn from_yaml_str(text: &str) -> Result<Self, ConfigError> {
        // An empty YAML document deserializes to unit, not to a map.
        if text.trim().is_empty() {
            return Ok(Self::default());
        }
        let config: Self = serde_yaml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_json_str(text: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    /// Reject values that would produce a degenerate camera, plane or rotation.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let cam = &self.camera;
        positive_finite("camera.distance", cam.distance)?;
        positive_finite("camera.near", cam.near)?;
        positive_finite("camera.far", cam.far)?;
        if cam.near >= cam.far {
            return Err(ConfigError::Invalid(format!(
                "camera clip planes must satisfy near < far, got near={} far={}",
                cam.near, cam.far
            )));
        }
        let plane = &self.plane;
        positive_finite("plane.width", plane.width)?;
        positive_finite("plane.height", plane.height)?;
        if plane.width_segments == 0 || plane.height_segments == 0 {
            return Err(ConfigError::Invalid(
                "plane segment counts must be at least 1".into(),
            ));
        }
        // Rotation must grow with the frame counter.
        positive_finite("rotation.x_divisor", self.rotation.x_divisor)?;
        positive_finite("rotation.y_divisor", self.rotation.y_divisor)?;
        if self.window.width == 0 || self.window.height == 0 {
            return Err(ConfigError::Invalid(format!(
                "window size must be non-zero, got {}x{}",
                self.window.width, self.window.height
            )));
        }
        Ok(())
    }
}

fn positive_finite(field: &str, value: f64) -> Result<(), ConfigError> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(ConfigError::Invalid(format!(
            "{field} must be positive and finite, got {value}"
        )))
    }
}
