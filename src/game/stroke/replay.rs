use super::surface::Surface;
use crate::game::core::messages::StrokeEvent;
use tracing::{debug, warn};

/// A replayed stroke whose `end` announced more or fewer segments than were drawn.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IncompleteStroke {
    pub expected: u32,
    pub received: u32,
}

/// Renders a remote drawer's stroke events in arrival order.
///
/// Segments are drawn from their own embedded endpoints, so the only state
/// kept here is what the end-of-stroke count check needs.
#[derive(Debug, Default)]
pub struct StrokeReplay {
    in_stroke: bool,
    segments: u32,
}

impl StrokeReplay {
    pub fn reset(&mut self) {
        self.in_stroke = false;
        self.segments = 0;
    }

    pub fn apply<S: Surface>(&mut self, event: &StrokeEvent, surface: &mut S) -> Option<IncompleteStroke> {
        match event {
            StrokeEvent::Begin(start) => {
                if self.in_stroke {
                    debug!("Stroke began before the previous one ended");
                }
                self.in_stroke = true;
                self.segments = 0;
                surface.begin_path(start.x, start.y);
                None
            }
            StrokeEvent::Segment(line) => {
                surface.draw_line(line);
                self.segments += 1;
                None
            }
            StrokeEvent::End(end) => {
                // Only strokes seen from their Begin can be checked
                let incomplete = match (self.in_stroke, end.segments) {
                    (true, Some(expected)) if expected != self.segments => Some(IncompleteStroke {
                        expected,
                        received: self.segments,
                    }),
                    _ => None,
                };
                if let Some(IncompleteStroke { expected, received }) = incomplete {
                    warn!(expected, received, "Stroke arrived incomplete");
                }
                self.reset();
                surface.end_path();
                incomplete
            }
        }
    }
}
