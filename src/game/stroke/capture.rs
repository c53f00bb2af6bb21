use super::surface::Surface;
use super::{PointerPhase, PointerSample, ToolSettings};
use crate::game::core::messages::{Line, StrokeEnd, StrokeEvent, StrokeStart};
use tracing::{debug, trace};

#[derive(Debug)]
struct ActiveStroke {
    pointer_id: u32,
    last_x: f32,
    last_y: f32,
    tool: ToolSettings,
    segments: u32,
}

/// Turns the drawer's pointer samples into stroke events, rendering each
/// segment locally before it is handed back for sending.
#[derive(Debug, Default)]
pub struct StrokeCapture {
    active: Option<ActiveStroke>,
}

impl StrokeCapture {
    pub fn is_drawing(&self) -> bool {
        self.active.is_some()
    }

    /// Drop the stroke in progress without emitting anything.
    pub fn abort(&mut self) {
        if self.active.take().is_some() {
            debug!("Abandoning stroke in progress");
        }
    }

    pub fn sample<S: Surface>(
        &mut self,
        sample: &PointerSample,
        tool: &ToolSettings,
        surface: &mut S,
    ) -> Option<StrokeEvent> {
        match sample.phase {
            PointerPhase::Down => self.begin(sample, tool, surface),
            PointerPhase::Move => self.extend(sample, surface),
            PointerPhase::Up | PointerPhase::Cancel => self.finish(sample, surface),
        }
    }

    fn begin<S: Surface>(
        &mut self,
        sample: &PointerSample,
        tool: &ToolSettings,
        surface: &mut S,
    ) -> Option<StrokeEvent> {
        if let Some(active) = &self.active {
            debug!(
                pointer_id = sample.pointer_id,
                tracked = active.pointer_id,
                "Ignoring concurrent contact"
            );
            return None;
        }
        if !sample.primary {
            debug!(pointer_id = sample.pointer_id, "Ignoring non-primary contact");
            return None;
        }

        surface.begin_path(sample.x, sample.y);
        self.active = Some(ActiveStroke {
            pointer_id: sample.pointer_id,
            last_x: sample.x,
            last_y: sample.y,
            tool: tool.clone(),
            segments: 0,
        });
        Some(StrokeEvent::Begin(StrokeStart {
            x: sample.x,
            y: sample.y,
            color: tool.color.clone(),
            width: tool.width,
        }))
    }

    fn extend<S: Surface>(&mut self, sample: &PointerSample, surface: &mut S) -> Option<StrokeEvent> {
        let active = self.tracked(sample)?;
        let line = Line {
            from_x: active.last_x,
            from_y: active.last_y,
            to_x: sample.x,
            to_y: sample.y,
            color: active.tool.color.clone(),
            width: active.tool.width,
        };
        surface.draw_line(&line);
        active.last_x = sample.x;
        active.last_y = sample.y;
        active.segments += 1;
        Some(StrokeEvent::Segment(line))
    }

    fn finish<S: Surface>(&mut self, sample: &PointerSample, surface: &mut S) -> Option<StrokeEvent> {
        let segments = self.tracked(sample)?.segments;
        self.active = None;
        surface.end_path();
        Some(StrokeEvent::End(StrokeEnd {
            segments: Some(segments),
        }))
    }

    fn tracked(&mut self, sample: &PointerSample) -> Option<&mut ActiveStroke> {
        match self.active.as_mut() {
            Some(active) if active.pointer_id == sample.pointer_id => Some(active),
            Some(_) => {
                trace!(pointer_id = sample.pointer_id, "Sample from untracked contact");
                None
            }
            None => None,
        }
    }
}
