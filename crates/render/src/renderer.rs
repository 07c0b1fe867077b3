use sketch_common::Size;
use sketch_scene::{PerspectiveCamera, Scene, Side};

/// Errors a renderer can hand back to its caller.
#[derive(Debug, thiserror::Error)]
pub enum RenderError {
    #[error("no suitable GPU adapter found")]
    NoAdapter,
    #[error("failed to create GPU device: {0}")]
    RequestDevice(String),
    #[error("failed to create surface: {0}")]
    CreateSurface(String),
    #[error("GPU out of memory")]
    OutOfMemory,
}

/// Renderer-agnostic interface. All renderers implement this trait.
///
/// A renderer draws the scene as seen through the camera into an output of
/// `size()` pixels.
pub trait Renderer {
    /// The output type produced by this renderer.
    type Output;

    /// Resize the output. Zero dimensions are the caller's problem.
    fn set_size(&mut self, size: Size);

    /// Current output size.
    fn size(&self) -> Size;

    /// Render one frame.
    fn render(
        &mut self,
        scene: &Scene,
        camera: &PerspectiveCamera,
    ) -> Result<Self::Output, RenderError>;
}

/// Text renderer: describes each frame instead of drawing it.
///
/// Useful for headless runs, logging and testing the render interface.
#[derive(Debug, Default)]
pub struct DebugTextRenderer {
    size: Size,
    frames: u64,
}

impl DebugTextRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of successful `render` calls.
    pub fn frames_rendered(&self) -> u64 {
        self.frames
    }
}

fn side_label(side: Side) -> &'static str {
    match side {
        Side::Front => "front",
        Side::Back => "back",
        Side::Double => "double",
    }
}

impl Renderer for DebugTextRenderer {
    type Output = String;

    fn set_size(&mut self, size: Size) {
        self.size = size;
    }

    fn size(&self) -> Size {
        self.size
    }

    fn render(
        &mut self,
        scene: &Scene,
        camera: &PerspectiveCamera,
    ) -> Result<String, RenderError> {
        self.frames += 1;

        let mut out = String::new();
        out.push_str(&format!(
            "=== Frame {} ({}x{}) ===\n",
            self.frames, self.size.width, self.size.height
        ));
        let (p, t) = (camera.position, camera.target);
        out.push_str(&format!(
            "Camera: pos=({:.1}, {:.1}, {:.1}) target=({:.1}, {:.1}, {:.1}) fov={:.2} aspect={:.3}\n",
            p.x, p.y, p.z, t.x, t.y, t.z, camera.fov, camera.aspect
        ));
        out.push_str(&format!("Meshes: {}\n", scene.mesh_count()));

        for (id, mesh) in scene.meshes() {
            let g = &mesh.geometry;
            let r = mesh.transform.rotation;
            let u = &mesh.material.uniforms;
            out.push_str(&format!(
                "  [{:.8}] plane {}x{} seg={}x{} side={} rot=({:.4}, {:.4}, {:.4}) time={:.3} texture={}\n",
                &id.0.to_string()[..8],
                g.width,
                g.height,
                g.width_segments,
                g.height_segments,
                side_label(mesh.material.side),
                r.x,
                r.y,
                r.z,
                u.time,
                if u.texture.is_some() { "bound" } else { "none" },
            ));
        }

        tracing::trace!(frame = self.frames, "debug frame rendered");
        Ok(out)
    }
}
