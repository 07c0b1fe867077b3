//! Camera controls: pointer input mapped to camera actions, applied by an orbit controller.
//!
//! # Invariants
//! - Controls only move the camera; they never touch the scene.
//! - Raw window events are translated by the host; this crate sees `PointerButton`s and pixels.

pub mod action;
pub mod orbit;

pub use action::{CameraAction, PointerButton, PointerMapper};
pub use orbit::OrbitControls;
