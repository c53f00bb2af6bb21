mod capture;
mod replay;
mod surface;

pub use capture::StrokeCapture;
pub use replay::{IncompleteStroke, StrokeReplay};
pub use surface::{LineCanvas, Surface};

use crate::game::core::messages::StrokeEvent;
use tracing::trace;

pub const DEFAULT_COLOR: &str = "#000";
pub const DEFAULT_WIDTH: u32 = 5;

/// Current drawing tool. Replaced as a whole on every tool selection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolSettings {
    pub color: String,
    pub width: u32,
}

impl Default for ToolSettings {
    fn default() -> Self {
        Self {
            color: DEFAULT_COLOR.to_string(),
            width: DEFAULT_WIDTH,
        }
    }
}

impl ToolSettings {
    pub fn with_color(&self, color: impl Into<String>) -> Self {
        Self {
            color: color.into(),
            width: self.width,
        }
    }

    pub fn with_width(&self, width: u32) -> Self {
        Self {
            color: self.color.clone(),
            width,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PointerPhase {
    Down,
    Move,
    Up,
    Cancel,
}

/// Device-independent pointer input in surface coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PointerSample {
    pub pointer_id: u32,
    pub primary: bool,
    pub phase: PointerPhase,
    pub x: f32,
    pub y: f32,
}

impl PointerSample {
    pub fn new(phase: PointerPhase, x: f32, y: f32) -> Self {
        Self {
            pointer_id: 0,
            primary: true,
            phase,
            x,
            y,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    Capture,
    Replay,
}

/// Owns both directions of stroke replication; exactly one is live at a time.
#[derive(Debug)]
pub struct StrokeReplicator {
    mode: Mode,
    capture: StrokeCapture,
    replay: StrokeReplay,
}

impl Default for StrokeReplicator {
    fn default() -> Self {
        Self {
            mode: Mode::Replay,
            capture: StrokeCapture::default(),
            replay: StrokeReplay::default(),
        }
    }
}

impl StrokeReplicator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Switching mode tears down whatever the old mode had in flight.
    /// Setting the current mode again keeps it intact.
    pub fn set_mode(&mut self, mode: Mode) {
        if self.mode == mode {
            return;
        }
        self.capture.abort();
        self.replay.reset();
        self.mode = mode;
    }

    pub fn capture<S: Surface>(
        &mut self,
        sample: &PointerSample,
        tool: &ToolSettings,
        surface: &mut S,
    ) -> Option<StrokeEvent> {
        if self.mode != Mode::Capture {
            trace!("Pointer input while not capturing");
            return None;
        }
        self.capture.sample(sample, tool, surface)
    }

    /// Render one remote event. Reports a stroke that ended with a segment
    /// count different from what was drawn since its `start`.
    pub fn replay<S: Surface>(&mut self, event: &StrokeEvent, surface: &mut S) -> Option<IncompleteStroke> {
        if self.mode != Mode::Replay {
            trace!("Stroke event while capturing");
            return None;
        }
        self.replay.apply(event, surface)
    }

    /// Empty the surface; an incoming stroke continues from a clean slate.
    pub fn clear<S: Surface>(&mut self, surface: &mut S) {
        surface.clear();
        self.replay.reset();
    }

    pub fn is_drawing(&self) -> bool {
        self.capture.is_drawing()
    }
}
