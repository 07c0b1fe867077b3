//! Scene driver: owns the scene, camera, controls and renderer of one sketch.
//!
//! Startup is `construct → resize → add primary mesh`, then the host calls
//! [`RunLoop::tick`] once per display refresh and forwards resize
//! notifications through [`ResizeEvents`].
//!
//! # Invariants
//! - The frame counter only grows; mesh rotation is derived from it and never wrapped.
//! - Field of view is fixed at construction; resizes change only the aspect ratio.
//! - The driver never writes the material's `time` uniform or binds its `texture`.
//! - All work happens on the host's thread; only `StopHandle` crosses threads.

mod driver;
mod resize;
mod run_loop;
mod shaders;

pub use driver::{Container, DriverError, SceneDriver};
pub use resize::{ResizeEvents, ResizeSubscription};
pub use run_loop::{RunLoop, StopHandle};
pub use shaders::{PLANE_FRAGMENT_SHADER, PLANE_VERTEX_SHADER};
