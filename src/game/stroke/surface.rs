use crate::game::core::messages::Line;

/// Anything strokes can be rendered onto.
pub trait Surface {
    fn draw_line(&mut self, line: &Line);

    fn clear(&mut self);

    fn begin_path(&mut self, _x: f32, _y: f32) {}

    fn end_path(&mut self) {}
}

/// In-memory surface that records every line drawn since the last clear,
/// and the start of every path.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LineCanvas {
    lines: Vec<Line>,
    paths: Vec<(f32, f32)>,
    path_open: bool,
}

impl LineCanvas {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn lines(&self) -> &[Line] {
        &self.lines
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Start points of the paths begun since the last clear.
    pub fn paths(&self) -> &[(f32, f32)] {
        &self.paths
    }

    pub fn path_open(&self) -> bool {
        self.path_open
    }
}

impl Surface for LineCanvas {
    fn draw_line(&mut self, line: &Line) {
        self.lines.push(line.clone());
    }

    fn clear(&mut self) {
        self.lines.clear();
        self.paths.clear();
        self.path_open = false;
    }

    fn begin_path(&mut self, x: f32, y: f32) {
        self.paths.push((x, y));
        self.path_open = true;
    }

    fn end_path(&mut self) {
        self.path_open = false;
    }
}
