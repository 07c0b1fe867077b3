use anyhow::{Context, Result};
use clap::Parser;
use sketch_common::{Size, SketchConfig};
use sketch_driver::{Container, ResizeEvents, ResizeSubscription, RunLoop, SceneDriver};
use sketch_input::{CameraAction, PointerButton, PointerMapper};
use sketch_render::DebugTextRenderer;
use sketch_render_wgpu::{FrameStatus, GpuContext, SurfaceRenderer};
use std::cell::RefCell;
use std::path::PathBuf;
use std::rc::Rc;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;
use winit::application::ApplicationHandler;
use winit::dpi::PhysicalSize;
use winit::event::{ElementState, KeyEvent, MouseButton, MouseScrollDelta, WindowEvent};
use winit::event_loop::{ActiveEventLoop, ControlFlow, EventLoop};
use winit::keyboard::{KeyCode, PhysicalKey};
use winit::window::{Window, WindowId};

/// Frames rendered in headless mode when `--frames` is not given.
const HEADLESS_DEFAULT_FRAMES: u64 = 60;

/// Pixel-delta wheel events (touchpads) per dolly step.
const PIXELS_PER_WHEEL_STEP: f64 = 40.0;

#[derive(Parser)]
#[command(name = "sketch-desktop", about = "Rotating shader plane")]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    /// YAML or JSON config file
    #[arg(long)]
    config: Option<PathBuf>,

    /// Window width in pixels (overrides config)
    #[arg(long)]
    width: Option<u32>,

    /// Window height in pixels (overrides config)
    #[arg(long)]
    height: Option<u32>,

    /// Stop after this many frames
    #[arg(long)]
    frames: Option<u64>,

    /// Render with the text backend instead of opening a window
    #[arg(long)]
    headless: bool,
}

/// The host window as a sketch container.
struct WindowContainer(Arc<Window>);

impl Container for WindowContainer {
    fn size(&self) -> Size {
        let PhysicalSize { width, height } = self.0.inner_size();
        Size::new(width, height)
    }
}

type WindowDriver = SceneDriver<WindowContainer, SurfaceRenderer>;

/// Everything that exists only while the window does.
struct Session {
    window: Arc<Window>,
    driver: Rc<RefCell<WindowDriver>>,
    resize_events: ResizeEvents,
    resize_subscription: Option<ResizeSubscription>,
}

impl Session {
    fn open(event_loop: &ActiveEventLoop, config: &SketchConfig) -> Result<Self> {
        let attrs = Window::default_attributes()
            .with_title(config.window.title.clone())
            .with_inner_size(PhysicalSize::new(config.window.width, config.window.height));
        let window = Arc::new(event_loop.create_window(attrs).context("create window")?);

        let inner = window.inner_size();
        let gpu = GpuContext::new(window.clone(), Size::new(inner.width, inner.height))?;
        let renderer = SurfaceRenderer::new(gpu, &config.renderer);
        let driver = SceneDriver::start(WindowContainer(window.clone()), renderer, config.clone())?;
        let driver = Rc::new(RefCell::new(driver));

        let resize_events = ResizeEvents::new();
        let resize_subscription = SceneDriver::subscribe_resize(&driver, &resize_events);

        Ok(Self {
            window,
            driver,
            resize_events,
            resize_subscription: Some(resize_subscription),
        })
    }

    fn camera_action(&self, action: CameraAction) {
        if action == CameraAction::Noop {
            return;
        }
        if self.driver.borrow_mut().handle_camera_action(action) {
            self.window.request_redraw();
        }
    }

    fn close(&mut self) {
        if let Some(subscription) = self.resize_subscription.take() {
            subscription.unsubscribe();
        }
    }
}

struct SketchApp {
    config: SketchConfig,
    run_loop: RunLoop,
    pointer: PointerMapper,
    session: Option<Session>,
    error: Option<anyhow::Error>,
}

impl SketchApp {
    fn new(config: SketchConfig, frames: Option<u64>) -> Self {
        let run_loop = match frames {
            Some(limit) => RunLoop::new().with_frame_limit(limit),
            None => RunLoop::new(),
        };
        Self {
            config,
            run_loop,
            pointer: PointerMapper::new(),
            session: None,
            error: None,
        }
    }

    fn shutdown(&mut self, event_loop: &ActiveEventLoop) {
        self.run_loop.stop_handle().stop();
        if let Some(session) = &mut self.session {
            session.close();
        }
        tracing::info!(frames = self.run_loop.frames(), "shutting down");
        event_loop.exit();
    }

    fn fail(&mut self, event_loop: &ActiveEventLoop, error: anyhow::Error) {
        tracing::error!("{error:#}");
        self.error = Some(error);
        self.shutdown(event_loop);
    }

    fn redraw(&mut self, event_loop: &ActiveEventLoop) {
        let Some(session) = &self.session else {
            return;
        };
        let result = self.run_loop.tick(&mut session.driver.borrow_mut());
        match result {
            Ok(Some(FrameStatus::Presented)) => {}
            Ok(Some(FrameStatus::Skipped)) => tracing::debug!("frame skipped"),
            Ok(None) => self.shutdown(event_loop),
            Err(e) => self.fail(event_loop, e.into()),
        }
    }
}

fn pointer_button(button: MouseButton) -> Option<PointerButton> {
    match button {
        MouseButton::Left => Some(PointerButton::Primary),
        MouseButton::Right => Some(PointerButton::Secondary),
        MouseButton::Middle => Some(PointerButton::Middle),
        _ => None,
    }
}

impl ApplicationHandler for SketchApp {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.session.is_some() {
            return;
        }
        match Session::open(event_loop, &self.config) {
            Ok(session) => self.session = Some(session),
            Err(e) => self.fail(event_loop, e),
        }
    }

    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        _window_id: WindowId,
        event: WindowEvent,
    ) {
        match event {
            WindowEvent::CloseRequested => self.shutdown(event_loop),
            WindowEvent::KeyboardInput {
                event:
                    KeyEvent {
                        physical_key: PhysicalKey::Code(key),
                        state: ElementState::Pressed,
                        ..
                    },
                ..
            } => match key {
                KeyCode::Escape => self.shutdown(event_loop),
                KeyCode::KeyR => {
                    if let Some(session) = &self.session {
                        session.camera_action(CameraAction::Reset);
                    }
                }
                _ => {}
            },
            WindowEvent::Resized(new_size) => {
                if let Some(session) = &self.session {
                    session
                        .resize_events
                        .emit(Size::new(new_size.width, new_size.height));
                }
            }
            WindowEvent::MouseInput { state, button, .. } => {
                if let Some(button) = pointer_button(button) {
                    match state {
                        ElementState::Pressed => self.pointer.press(button),
                        ElementState::Released => self.pointer.release(button),
                    }
                }
            }
            WindowEvent::CursorMoved { position, .. } => {
                let action = self.pointer.cursor_moved(position.x, position.y);
                if let Some(session) = &self.session {
                    session.camera_action(action);
                }
            }
            WindowEvent::CursorLeft { .. } => self.pointer.cursor_left(),
            WindowEvent::MouseWheel { delta, .. } => {
                let steps = match delta {
                    MouseScrollDelta::LineDelta(_, y) => y as f64,
                    MouseScrollDelta::PixelDelta(p) => p.y / PIXELS_PER_WHEEL_STEP,
                };
                if let Some(session) = &self.session {
                    session.camera_action(self.pointer.wheel(steps));
                }
            }
            WindowEvent::RedrawRequested => self.redraw(event_loop),
            _ => {}
        }
    }

    fn about_to_wait(&mut self, _event_loop: &ActiveEventLoop) {
        if let Some(session) = &self.session {
            session.window.request_redraw();
        }
    }
}

/// Render frames with the text backend and print the last one.
fn run_headless(config: SketchConfig, frames: u64) -> Result<()> {
    let container = Size::new(config.window.width, config.window.height);
    let mut driver = SceneDriver::start(container, DebugTextRenderer::new(), config)?;
    let mut run_loop = RunLoop::new().with_frame_limit(frames);

    let mut last = None;
    let rendered = run_loop.run(&mut driver, |_, output| last = Some(output))?;
    tracing::info!(rendered, "headless run finished");
    if let Some(output) = last {
        println!("{output}");
    }
    Ok(())
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)))
        .init();

    tracing::info!("sketch-desktop starting");

    let mut config = match &cli.config {
        Some(path) => SketchConfig::load(path)
            .with_context(|| format!("loading config from {}", path.display()))?,
        None => SketchConfig::default(),
    };
    if let Some(width) = cli.width {
        config.window.width = width;
    }
    if let Some(height) = cli.height {
        config.window.height = height;
    }
    config.validate()?;

    if cli.headless {
        return run_headless(config, cli.frames.unwrap_or(HEADLESS_DEFAULT_FRAMES));
    }

    let event_loop = EventLoop::new()?;
    event_loop.set_control_flow(ControlFlow::Poll);

    let mut app = SketchApp::new(config, cli.frames);
    event_loop.run_app(&mut app)?;

    match app.error.take() {
        Some(e) => Err(e),
        None => Ok(()),
    }
}
