use crate::gpu::WgpuRenderer;
use sketch_common::{RendererConfig, Size};
use sketch_render::{RenderError, Renderer};
use sketch_scene::{PerspectiveCamera, Scene};

/// Sample count used when antialiasing is requested.
const MSAA_SAMPLES: u32 = 4;

/// What happened to a frame handed to the surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameStatus {
    Presented,
    /// The surface was unavailable (lost, outdated, timed out); nothing was drawn.
    Skipped,
}

/// Device, queue and configured surface for one window.
pub struct GpuContext {
    pub surface: wgpu::Surface<'static>,
    pub device: wgpu::Device,
    pub queue: wgpu::Queue,
    pub config: wgpu::SurfaceConfiguration,
    pub adapter: wgpu::Adapter,
}

impl GpuContext {
    /// Create a surface on `target` and a device able to present to it.
    pub fn new(
        target: impl Into<wgpu::SurfaceTarget<'static>>,
        size: Size,
    ) -> Result<Self, RenderError> {
        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
            backends: wgpu::Backends::all(),
            ..Default::default()
        });

        let surface = instance
            .create_surface(target)
            .map_err(|e| RenderError::CreateSurface(e.to_string()))?;

        let adapter = pollster::block_on(instance.request_adapter(&wgpu::RequestAdapterOptions {
            power_preference: wgpu::PowerPreference::HighPerformance,
            compatible_surface: Some(&surface),
            force_fallback_adapter: false,
        }))
        .ok_or(RenderError::NoAdapter)?;

        let (device, queue) = pollster::block_on(adapter.request_device(
            &wgpu::DeviceDescriptor {
                label: Some("sketch_device"),
                required_features: wgpu::Features::empty(),
                required_limits: wgpu::Limits::default(),
                memory_hints: Default::default(),
            },
            None,
        ))
        .map_err(|e| RenderError::RequestDevice(e.to_string()))?;

        let surface_caps = surface.get_capabilities(&adapter);
        let surface_format = surface_caps
            .formats
            .iter()
            .find(|f| f.is_srgb())
            .or_else(|| surface_caps.formats.first())
            .copied()
            .ok_or_else(|| RenderError::CreateSurface("surface reports no formats".into()))?;
        let alpha_mode = surface_caps
            .alpha_modes
            .first()
            .copied()
            .unwrap_or(wgpu::CompositeAlphaMode::Auto);

        let config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format: surface_format,
            width: size.width.max(1),
            height: size.height.max(1),
            present_mode: wgpu::PresentMode::AutoVsync,
            alpha_mode,
            view_formats: vec![],
            desired_maximum_frame_latency: 2,
        };
        surface.configure(&device, &config);

        tracing::info!(
            backend = adapter.get_info().backend.to_str(),
            adapter = %adapter.get_info().name,
            format = ?surface_format,
            "GPU initialized"
        );

        Ok(Self {
            surface,
            device,
            queue,
            config,
            adapter,
        })
    }

    pub fn reconfigure(&mut self, size: Size) {
        self.config.width = size.width.max(1);
        self.config.height = size.height.max(1);
        self.surface.configure(&self.device, &self.config);
    }

    /// `requested` if the surface format supports it, otherwise 1.
    fn supported_sample_count(&self, requested: u32) -> u32 {
        let flags = self
            .adapter
            .get_texture_format_features(self.config.format)
            .flags;
        if requested <= 1 || flags.sample_count_supported(requested) {
            requested
        } else {
            tracing::warn!(requested, "multisampling not supported by surface format, disabling");
            1
        }
    }
}

/// Renderer that draws into a window surface.
pub struct SurfaceRenderer {
    gpu: GpuContext,
    renderer: WgpuRenderer,
    size: Size,
}

impl SurfaceRenderer {
    pub fn new(gpu: GpuContext, config: &RendererConfig) -> Self {
        let size = Size::new(gpu.config.width, gpu.config.height);
        let requested = if config.antialias { MSAA_SAMPLES } else { 1 };
        let sample_count = gpu.supported_sample_count(requested);
        let renderer = WgpuRenderer::new(
            &gpu.device,
            &gpu.queue,
            gpu.config.format,
            size,
            sample_count,
            config.clear_color,
        );
        tracing::info!(
            width = size.width,
            height = size.height,
            samples = renderer.sample_count(),
            "surface renderer ready"
        );
        Self {
            gpu,
            renderer,
            size,
        }
    }
}

impl Renderer for SurfaceRenderer {
    type Output = FrameStatus;

    fn set_size(&mut self, size: Size) {
        self.size = size;
        self.gpu.reconfigure(size);
        self.renderer.resize(&self.gpu.device, size);
    }

    fn size(&self) -> Size {
        self.size
    }

    fn render(
        &mut self,
        scene: &Scene,
        camera: &PerspectiveCamera,
    ) -> Result<FrameStatus, RenderError> {
        let output = match self.gpu.surface.get_current_texture() {
            Ok(t) => t,
            Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                tracing::debug!("surface lost or outdated, reconfiguring");
                self.gpu.surface.configure(&self.gpu.device, &self.gpu.config);
                return Ok(FrameStatus::Skipped);
            }
            Err(wgpu::SurfaceError::OutOfMemory) => return Err(RenderError::OutOfMemory),
            Err(e) => {
                tracing::error!("surface error: {e}");
                return Ok(FrameStatus::Skipped);
            }
        };

        let view = output
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());
        self.renderer
            .render(&self.gpu.device, &self.gpu.queue, &view, scene, camera);
        output.present();
        Ok(FrameStatus::Presented)
    }
}
