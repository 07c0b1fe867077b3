/// A camera operation produced from pointer input.
///
/// Deltas are in physical pixels. The orbit controller scales them by the
/// viewport height, so the same drag feels the same at any window size.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum CameraAction {
    /// Orbit around the target.
    Rotate { dx: f64, dy: f64 },
    /// Move camera and target together in the view plane.
    Pan { dx: f64, dy: f64 },
    /// Move towards (positive) or away from (negative) the target, in wheel steps.
    Dolly(f64),
    /// Restore the camera to where the controls first saw it.
    Reset,
    Noop,
}

/// Pointer buttons the mapper understands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PointerButton {
    Primary,
    Secondary,
    Middle,
}

/// Turns button/cursor/wheel events into [`CameraAction`]s.
///
/// Primary drag rotates, secondary drag pans, middle drag dollies.
#[derive(Debug, Default)]
pub struct PointerMapper {
    held: Option<PointerButton>,
    last: Option<(f64, f64)>,
}

/// Vertical pixels of middle-drag per dolly step.
const DRAG_PIXELS_PER_DOLLY_STEP: f64 = 25.0;

impl PointerMapper {
    pub fn new() -> Self {
        Self::default()
    }

    /// The first pressed button owns the drag until it is released.
    pub fn press(&mut self, button: PointerButton) {
        if self.held.is_none() {
            self.held = Some(button);
        }
    }

    pub fn release(&mut self, button: PointerButton) {
        if self.held == Some(button) {
            self.held = None;
        }
    }

    pub fn cursor_moved(&mut self, x: f64, y: f64) -> CameraAction {
        let prev = self.last.replace((x, y));
        let (Some(button), Some((px, py))) = (self.held, prev) else {
            return CameraAction::Noop;
        };
        let (dx, dy) = (x - px, y - py);
        if dx == 0.0 && dy == 0.0 {
            return CameraAction::Noop;
        }
        match button {
            PointerButton::Primary => CameraAction::Rotate { dx, dy },
            PointerButton::Secondary => CameraAction::Pan { dx, dy },
            PointerButton::Middle => CameraAction::Dolly(-dy / DRAG_PIXELS_PER_DOLLY_STEP),
        }
    }

    /// Cursor left the window: the next move starts a fresh drag segment.
    pub fn cursor_left(&mut self) {
        self.last = None;
    }

    /// Wheel scrolled by `steps` lines; positive scrolls up (zoom in).
    pub fn wheel(&self, steps: f64) -> CameraAction {
        if steps == 0.0 {
            CameraAction::Noop
        } else {
            CameraAction::Dolly(steps)
        }
    }
}
