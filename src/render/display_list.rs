use crate::render::{Canvas, Point, Rgba, Stroke, TextAnchor};

/// One recorded drawing operation, in device pixels.
#[derive(Debug, Clone, PartialEq)]
pub enum DrawCommand {
    Clear {
        width: f64,
        height: f64,
        color: Rgba,
    },
    Line {
        from: Point,
        to: Point,
        width: f64,
        color: Rgba,
    },
    Rect {
        min: Point,
        width: f64,
        height: f64,
        stroke: Option<Stroke>,
        fill: Option<Rgba>,
    },
    Arc {
        center: Point,
        radius: f64,
        start_angle: f64,
        end_angle: f64,
        anticlockwise: bool,
        width: f64,
        color: Rgba,
    },
    Text {
        text: String,
        pos: Point,
        size: f64,
        color: Rgba,
        anchor: TextAnchor,
    },
}

/// A canvas that records what was drawn so it can be inspected or replayed
/// onto a real backend later.
#[derive(Debug, Clone, Default)]
pub struct DisplayList {
    commands: Vec<DrawCommand>,
}

impl DisplayList {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn commands(&self) -> &[DrawCommand] {
        &self.commands
    }

    pub fn len(&self) -> usize {
        self.commands.len()
    }

    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }

    /// Drop every recorded command.
    pub fn reset(&mut self) {
        self.commands.clear();
    }

    /// Number of commands matching a predicate.
    pub fn count(&self, pred: impl Fn(&DrawCommand) -> bool) -> usize {
        self.commands.iter().filter(|c| pred(c)).count()
    }

    /// All text drawn, in order.
    pub fn texts(&self) -> impl Iterator<Item = &str> {
        self.commands.iter().filter_map(|c| match c {
            DrawCommand::Text { text, .. } => Some(text.as_str()),
            _ => None,
        })
    }
}

impl Canvas for DisplayList {
    fn clear(&mut self, width: f64, height: f64, color: Rgba) {
        self.commands.push(DrawCommand::Clear {
            width,
            height,
            color,
        });
    }

    fn line(&mut self, from: Point, to: Point, width: f64, color: Rgba) {
        self.commands.push(DrawCommand::Line {
            from,
            to,
            width,
            color,
        });
    }

    fn rect(&mut self, min: Point, width: f64, height: f64, stroke: Option<Stroke>, fill: Option<Rgba>) {
        self.commands.push(DrawCommand::Rect {
            min,
            width,
            height,
            stroke,
            fill,
        });
    }

    fn arc(
        &mut self,
        center: Point,
        radius: f64,
        start_angle: f64,
        end_angle: f64,
        anticlockwise: bool,
        width: f64,
        color: Rgba,
    ) {
        self.commands.push(DrawCommand::Arc {
            center,
            radius,
            start_angle,
            end_angle,
            anticlockwise,
            width,
            color,
        });
    }

    fn text(&mut self, text: &str, pos: Point, size: f64, color: Rgba, anchor: TextAnchor) {
        self.commands.push(DrawCommand::Text {
            text: text.to_string(),
            pos,
            size,
            color,
            anchor,
        });
    }
}
