use crate::driver::{Container, DriverError, SceneDriver};
use sketch_render::Renderer;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

/// Cloneable, thread-safe request to stop a [`RunLoop`].
#[derive(Debug, Clone, Default)]
pub struct StopHandle(Arc<AtomicBool>);

impl StopHandle {
    pub fn stop(&self) {
        self.0.store(true, Ordering::Release);
    }

    pub fn is_stopped(&self) -> bool {
        self.0.load(Ordering::Acquire)
    }
}

/// Drives one frame per tick until stopped.
///
/// The host owns the cadence: call [`tick`](Self::tick) once per display
/// refresh (e.g. on a redraw request), or use [`run`](Self::run) to spin
/// without pacing.
#[derive(Debug, Default)]
pub struct RunLoop {
    stop: StopHandle,
    frames: u64,
    frame_limit: Option<u64>,
}

impl RunLoop {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stop by itself after `limit` frames.
    pub fn with_frame_limit(mut self, limit: u64) -> Self {
        self.frame_limit = Some(limit);
        self
    }

    pub fn stop_handle(&self) -> StopHandle {
        self.stop.clone()
    }

    /// Frames rendered through this loop.
    pub fn frames(&self) -> u64 {
        self.frames
    }

    pub fn is_running(&self) -> bool {
        !self.stop.is_stopped()
    }

    /// Render one frame unless stopped. `Ok(None)` means the loop is stopped.
    ///
    /// A render error stops the loop before it is returned.
    pub fn tick<C: Container, R: Renderer>(
        &mut self,
        driver: &mut SceneDriver<C, R>,
    ) -> Result<Option<R::Output>, DriverError> {
        if !self.is_running() {
            return Ok(None);
        }
        let output = match driver.render_frame() {
            Ok(output) => output,
            Err(e) => {
                tracing::error!(frame = driver.frame(), "stopping run loop: {e}");
                self.stop.stop();
                return Err(e);
            }
        };
        self.frames += 1;
        if self.frame_limit.is_some_and(|limit| self.frames >= limit) {
            tracing::info!(frames = self.frames, "frame limit reached");
            self.stop.stop();
        }
        Ok(Some(output))
    }

    /// Tick until stopped, handing each frame's output to `on_frame`.
    /// Returns the number of frames rendered by this call.
    pub fn run<C: Container, R: Renderer>(
        &mut self,
        driver: &mut SceneDriver<C, R>,
        mut on_frame: impl FnMut(u64, R::Output),
    ) -> Result<u64, DriverError> {
        let start = self.frames;
        while let Some(output) = self.tick(driver)? {
            on_frame(driver.frame(), output);
        }
        Ok(self.frames - start)
    }
}
