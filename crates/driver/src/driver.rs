use crate::resize::{ResizeEvents, ResizeSubscription};
use crate::shaders::{PLANE_FRAGMENT_SHADER, PLANE_VERTEX_SHADER};
use glam::DVec3;
use sketch_common::{EulerRotation, Size, SketchConfig};
use sketch_input::{CameraAction, OrbitControls};
use sketch_render::{RenderError, Renderer};
use sketch_scene::{Mesh, MeshId, PerspectiveCamera, PlaneGeometry, Scene, ShaderMaterial, Side};
use std::cell::{Cell, RefCell};
use std::rc::Rc;

/// Errors surfaced by the driver. Nothing is retried; the host decides.
#[derive(Debug, thiserror::Error)]
pub enum DriverError {
    #[error("container has no drawable area: {width}x{height}")]
    DegenerateContainer { width: u32, height: u32 },
    #[error("render failed: {0}")]
    Render(#[from] RenderError),
}

/// Anything the sketch can be drawn into that reports a pixel size.
pub trait Container {
    /// Current size in physical pixels. Measured again on every resize.
    fn size(&self) -> Size;
}

impl Container for Size {
    fn size(&self) -> Size {
        *self
    }
}

/// A size cell shared with whoever owns the real surface.
impl Container for Rc<Cell<Size>> {
    fn size(&self) -> Size {
        self.get()
    }
}

/// Owns one rotating-plane sketch: scene, camera, orbit controls, renderer.
pub struct SceneDriver<C: Container, R: Renderer> {
    container: C,
    size: Size,
    frame: u64,
    scene: Scene,
    camera: PerspectiveCamera,
    controls: OrbitControls,
    renderer: R,
    primary_mesh: Option<MeshId>,
    config: SketchConfig,
}

impl<C: Container, R: Renderer> SceneDriver<C, R> {
    /// Measure the container, build the camera and size the renderer.
    ///
    /// The vertical fov is chosen so a plane at the origin is drawn at its
    /// real size in pixels. It is not recomputed on resize.
    pub fn new(container: C, mut renderer: R, config: SketchConfig) -> Result<Self, DriverError> {
        let size = container.size();
        if size.is_empty() {
            return Err(DriverError::DegenerateContainer {
                width: size.width,
                height: size.height,
            });
        }

        let cam_cfg = &config.camera;
        let fov = PerspectiveCamera::fov_for_pixel_plane(size.height as f64, cam_cfg.distance);
        let mut camera = PerspectiveCamera::new(fov, size.aspect(), cam_cfg.near, cam_cfg.far);
        camera.position = DVec3::new(0.0, 0.0, cam_cfg.distance);
        camera.look_at(DVec3::ZERO);

        renderer.set_size(size);
        let controls = OrbitControls::new(&camera);

        tracing::info!(
            width = size.width,
            height = size.height,
            fov = camera.fov,
            "scene driver initialized"
        );

        Ok(Self {
            container,
            size,
            frame: 0,
            scene: Scene::new(),
            camera,
            controls,
            renderer,
            primary_mesh: None,
            config,
        })
    }

    /// Full startup: construct, resize once, add the primary mesh.
    pub fn start(container: C, renderer: R, config: SketchConfig) -> Result<Self, DriverError> {
        let mut driver = Self::new(container, renderer, config)?;
        driver.resize();
        driver.add_primary_mesh();
        Ok(driver)
    }

    /// Add the double-sided shader plane. Each call adds another mesh; the
    /// most recent one becomes the one that rotates.
    pub fn add_primary_mesh(&mut self) -> MeshId {
        let plane = &self.config.plane;
        let geometry = PlaneGeometry::new(
            plane.width,
            plane.height,
            plane.width_segments,
            plane.height_segments,
        );
        let material =
            ShaderMaterial::new(PLANE_VERTEX_SHADER, PLANE_FRAGMENT_SHADER).with_side(Side::Double);
        let id = self.scene.add(Mesh::new(geometry, material));
        if self.primary_mesh.is_some() {
            tracing::warn!(count = self.scene.mesh_count(), "primary mesh added again");
        }
        self.primary_mesh = Some(id);
        tracing::info!(
            width = plane.width,
            height = plane.height,
            segments_x = plane.width_segments,
            segments_y = plane.height_segments,
            "primary mesh added"
        );
        id
    }

    /// Re-measure the container and update aspect, renderer size and projection.
    ///
    /// A container with zero area (e.g. a minimized window) is skipped and the
    /// previous size kept. Returns whether anything was applied.
    pub fn resize(&mut self) -> bool {
        let size = self.container.size();
        if size.is_empty() {
            tracing::debug!(width = size.width, height = size.height, "ignoring empty resize");
            return false;
        }
        self.size = size;
        self.camera.aspect = size.aspect();
        self.renderer.set_size(size);
        self.camera.update_projection_matrix();
        tracing::debug!(width = size.width, height = size.height, aspect = self.camera.aspect, "resized");
        true
    }

    /// Advance the frame counter, rotate the primary mesh and render once.
    pub fn render_frame(&mut self) -> Result<R::Output, DriverError> {
        self.frame += 1;
        let rotation = self.rotation_at(self.frame);
        if let Some(id) = self.primary_mesh {
            self.scene.set_rotation(id, rotation);
        }
        tracing::trace!(frame = self.frame, rx = rotation.x, ry = rotation.y, "render frame");
        Ok(self.renderer.render(&self.scene, &self.camera)?)
    }

    /// Rotation for a given frame: `frame / divisor` radians on X and Y.
    pub fn rotation_at(&self, frame: u64) -> EulerRotation {
        let rot = &self.config.rotation;
        EulerRotation {
            x: frame as f64 / rot.x_divisor,
            y: frame as f64 / rot.y_divisor,
            z: 0.0,
        }
    }

    /// Pass a pointer-derived action to the orbit controls.
    pub fn handle_camera_action(&mut self, action: CameraAction) -> bool {
        self.controls.apply(&mut self.camera, action, self.size)
    }

    pub fn frame(&self) -> u64 {
        self.frame
    }

    pub fn size(&self) -> Size {
        self.size
    }

    pub fn scene(&self) -> &Scene {
        &self.scene
    }

    pub fn camera(&self) -> &PerspectiveCamera {
        &self.camera
    }

    pub fn renderer(&self) -> &R {
        &self.renderer
    }

    pub fn primary_mesh(&self) -> Option<MeshId> {
        self.primary_mesh
    }
}

impl<C: Container + 'static, R: Renderer + 'static> SceneDriver<C, R> {
    /// Resize a shared driver on every notification from `events`.
    ///
    /// The subscription holds only a weak reference: once the driver is
    /// dropped the listener does nothing. Drop or `unsubscribe` the handle on
    /// teardown.
    pub fn subscribe_resize(
        driver: &Rc<RefCell<Self>>,
        events: &ResizeEvents,
    ) -> ResizeSubscription {
        let weak = Rc::downgrade(driver);
        events.subscribe(move |size| {
            let Some(driver) = weak.upgrade() else {
                return;
            };
            match driver.try_borrow_mut() {
                Ok(mut driver) => {
                    driver.resize();
                }
                Err(_) => {
                    tracing::warn!(
                        width = size.width,
                        height = size.height,
                        "resize notified while driver is borrowed, skipped"
                    );
                }
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sketch_render::DebugTextRenderer;

    fn shared(width: u32, height: u32) -> Rc<Cell<Size>> {
        Rc::new(Cell::new(Size::new(width, height)))
    }

    fn driver(
        width: u32,
        height: u32,
    ) -> (Rc<Cell<Size>>, SceneDriver<Rc<Cell<Size>>, DebugTextRenderer>) {
        let container = shared(width, height);
        let d = SceneDriver::new(container.clone(), DebugTextRenderer::new(), SketchConfig::default())
            .unwrap();
        (container, d)
    }

    #[test]
    fn fov_derived_from_height_and_distance() {
        let (_, d) = driver(1200, 800);
        let expected = 2.0 * (800.0f64 / 1000.0).atan() * (180.0 / std::f64::consts::PI);
        assert_eq!(d.camera().fov, expected);
        assert_eq!(d.camera().position, DVec3::new(0.0, 0.0, 500.0));
        assert_eq!(d.camera().near, 10.0);
        assert_eq!(d.camera().far, 2000.0);
    }

    #[test]
    fn renderer_sized_at_construction() {
        let (_, d) = driver(640, 480);
        assert_eq!(d.renderer().size(), Size::new(640, 480));
        assert_eq!(d.camera().aspect, 640.0 / 480.0);
    }

    #[test]
    fn zero_sized_container_is_rejected() {
        let result = SceneDriver::new(Size::new(0, 400), DebugTextRenderer::new(), SketchConfig::default());
        assert!(matches!(
            result,
            Err(DriverError::DegenerateContainer {
                width: 0,
                height: 400
            })
        ));
    }

    #[test]
    fn resize_updates_aspect_and_renderer() {
        let (container, mut d) = driver(500, 400);
        container.set(Size::new(1024, 768));
        assert!(d.resize());
        assert_eq!(d.camera().aspect, 1024.0 / 768.0);
        assert_eq!(d.renderer().size(), Size::new(1024, 768));
        assert_eq!(d.size(), Size::new(1024, 768));
    }

    #[test]
    fn resize_keeps_fov() {
        let (container, mut d) = driver(500, 400);
        let fov = d.camera().fov;
        container.set(Size::new(500, 900));
        d.resize();
        assert_eq!(d.camera().fov, fov);
    }

    #[test]
    fn resize_refreshes_projection() {
        let (container, mut d) = driver(500, 400);
        let before = d.camera().projection_matrix();
        container.set(Size::new(1000, 400));
        d.resize();
        assert_ne!(d.camera().projection_matrix(), before);
    }

    #[test]
    fn resize_twice_without_change_is_stable() {
        let (container, mut d) = driver(500, 400);
        container.set(Size::new(1024, 768));
        d.resize();
        let (aspect, size, proj) = (d.camera().aspect, d.renderer().size(), d.camera().projection_matrix());
        d.resize();
        assert_eq!(d.camera().aspect, aspect);
        assert_eq!(d.renderer().size(), size);
        assert_eq!(d.camera().projection_matrix(), proj);
    }

    #[test]
    fn empty_resize_keeps_previous_size() {
        let (container, mut d) = driver(500, 400);
        container.set(Size::new(0, 0));
        assert!(!d.resize());
        assert_eq!(d.camera().aspect, 1.25);
        assert_eq!(d.renderer().size(), Size::new(500, 400));
    }

    #[test]
    fn primary_mesh_is_double_sided_plane() {
        let (_, mut d) = driver(500, 400);
        let id = d.add_primary_mesh();
        assert_eq!(d.scene().mesh_count(), 1);
        let mesh = d.scene().get(id).unwrap();
        assert_eq!(mesh.geometry.width, 300.0);
        assert_eq!(mesh.geometry.height, 200.0);
        assert_eq!(mesh.geometry.width_segments, 10);
        assert_eq!(mesh.geometry.height_segments, 10);
        assert_eq!(mesh.material.side, Side::Double);
        assert_eq!(mesh.material.uniforms.time, 0.0);
        assert!(mesh.material.uniforms.texture.is_none());
    }

    #[test]
    fn adding_twice_does_not_dedup() {
        let (_, mut d) = driver(500, 400);
        let first = d.add_primary_mesh();
        let second = d.add_primary_mesh();
        assert_ne!(first, second);
        assert_eq!(d.scene().mesh_count(), 2);
        assert_eq!(d.primary_mesh(), Some(second));
    }

    #[test]
    fn rotation_follows_frame_counter() {
        let (_, mut d) = driver(500, 400);
        let id = d.add_primary_mesh();
        let mut last = EulerRotation::ZERO;
        for n in 1..=5u64 {
            d.render_frame().unwrap();
            let r = d.scene().get(id).unwrap().transform.rotation;
            assert_eq!(d.frame(), n);
            assert_eq!(r.x, n as f64 / 2000.0);
            assert_eq!(r.y, n as f64 / 1000.0);
            assert!(r.x > last.x && r.y > last.y);
            last = r;
        }
    }

    #[test]
    fn rotation_is_not_wrapped() {
        let (_, d) = driver(500, 400);
        let r = d.rotation_at(1_000_000);
        assert_eq!(r.x, 500.0);
        assert_eq!(r.y, 1000.0);
        assert!(r.y > std::f64::consts::TAU);
    }

    #[test]
    fn time_uniform_is_never_written() {
        let (_, mut d) = driver(500, 400);
        let id = d.add_primary_mesh();
        for _ in 0..10 {
            d.render_frame().unwrap();
        }
        assert_eq!(d.scene().get(id).unwrap().material.uniforms.time, 0.0);
    }

    #[test]
    fn render_without_mesh_still_counts_frames() {
        let (_, mut d) = driver(500, 400);
        let out = d.render_frame().unwrap();
        assert_eq!(d.frame(), 1);
        assert!(out.contains("Meshes: 0"));
    }

    #[test]
    fn startup_sequence() {
        let mut d = SceneDriver::start(Size::new(500, 400), DebugTextRenderer::new(), SketchConfig::default())
            .unwrap();
        assert!((d.camera().fov - 43.6028).abs() < 1e-3);
        assert_eq!(d.camera().aspect, 1.25);
        assert_eq!(d.scene().mesh_count(), 1);

        d.render_frame().unwrap();
        let r = d.scene().get(d.primary_mesh().unwrap()).unwrap().transform.rotation;
        assert_eq!(d.frame(), 1);
        assert_eq!(d.renderer().frames_rendered(), 1);
        assert_eq!(r.x, 0.0005);
        assert_eq!(r.y, 0.001);
    }

    #[test]
    fn camera_actions_reach_orbit_controls() {
        let (_, mut d) = driver(800, 800);
        assert!(d.handle_camera_action(CameraAction::Dolly(1.0)));
        assert!((d.camera().distance_to_target() - 475.0).abs() < 1e-9);
        assert!(d.handle_camera_action(CameraAction::Reset));
        assert_eq!(d.camera().position, DVec3::new(0.0, 0.0, 500.0));
    }

    #[test]
    fn config_changes_geometry_and_rates() {
        let mut config = SketchConfig::default();
        config.plane.width_segments = 4;
        config.rotation.y_divisor = 10.0;
        let mut d = SceneDriver::start(Size::new(100, 100), DebugTextRenderer::new(), config).unwrap();
        d.render_frame().unwrap();
        let mesh = d.scene().get(d.primary_mesh().unwrap()).unwrap();
        assert_eq!(mesh.geometry.width_segments, 4);
        assert_eq!(mesh.transform.rotation.y, 0.1);
    }

    #[test]
    fn resize_subscription_drives_resize() {
        let container = shared(500, 400);
        let d = SceneDriver::start(container.clone(), DebugTextRenderer::new(), SketchConfig::default())
            .unwrap();
        let d = Rc::new(RefCell::new(d));
        let events = ResizeEvents::new();
        let sub = SceneDriver::subscribe_resize(&d, &events);

        container.set(Size::new(1024, 768));
        events.emit(Size::new(1024, 768));
        assert_eq!(d.borrow().camera().aspect, 1024.0 / 768.0);

        sub.unsubscribe();
        container.set(Size::new(300, 300));
        events.emit(Size::new(300, 300));
        assert_eq!(d.borrow().camera().aspect, 1024.0 / 768.0);
        assert_eq!(events.listener_count(), 0);
    }

    #[test]
    fn subscription_outliving_driver_is_harmless() {
        let events = ResizeEvents::new();
        let d = Rc::new(RefCell::new(
            SceneDriver::new(shared(10, 10), DebugTextRenderer::new(), SketchConfig::default()).unwrap(),
        ));
        let _sub = SceneDriver::subscribe_resize(&d, &events);
        drop(d);
        events.emit(Size::new(20, 20));
        assert_eq!(events.listener_count(), 1);
    }
}
