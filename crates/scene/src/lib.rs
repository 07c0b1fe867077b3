//! Scene model: meshes, plane geometry, shader materials and the perspective camera.
//!
//! # Invariants
//! - The scene only holds data; it never talks to a GPU.
//! - A camera's projection matrix changes only through `update_projection_matrix`.
//! - Mesh iteration order is deterministic (BTreeMap keyed by `MeshId`).

pub mod camera;
pub mod geometry;
pub mod material;
pub mod scene;

pub use camera::PerspectiveCamera;
pub use geometry::{GeometryData, PlaneGeometry, PlaneVertex};
pub use material::{SceneError, ShaderMaterial, ShaderUniforms, Side, TextureImage};
pub use scene::{Mesh, MeshId, Scene};
