use crate::render::{Frame, GridMode, Painter, Rgba};

/// Side length of the idle cursor marker, in device pixels.
const CURSOR_SIZE: f64 = 6.0;
const CURSOR_COLOR: Rgba = Rgba::gray(128, 1.0);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MouseButton {
    Primary,
    Secondary,
    Middle,
}

/// Input in device pixels, relative to the canvas origin.
#[derive(Debug, Clone, PartialEq)]
pub enum InputEvent {
    MouseDown { button: MouseButton, x: f64, y: f64 },
    MouseUp { button: MouseButton, x: f64, y: f64 },
    MouseMove { x: f64, y: f64 },
    MouseDrag { dx: f64, dy: f64 },
    /// Positive deltas zoom in.
    MouseWheel { delta: f64 },
    DoubleClick { button: MouseButton, x: f64, y: f64 },
    KeyDown { keycode: u32, ch: Option<char> },
    KeyUp { keycode: u32, ch: Option<char> },
    KeyPress { keycode: u32, ch: Option<char> },
    Resize { width: f64, height: f64 },
}

/// Receiver of input events: the active tool or a focused widget.
///
/// Every handler defaults to doing nothing, so implementors only override
/// the events they care about.
pub trait InputHandler {
    fn mouse_down(&mut self, _painter: &mut Painter, _button: MouseButton, _x: f64, _y: f64) {}

    fn mouse_up(&mut self, _painter: &mut Painter, _button: MouseButton, _x: f64, _y: f64) {}

    fn mouse_move(&mut self, _painter: &mut Painter, _x: f64, _y: f64) {}

    fn mouse_drag(&mut self, _painter: &mut Painter, _dx: f64, _dy: f64) {}

    fn mouse_wheel(&mut self, _painter: &mut Painter, _delta: f64) {}

    fn double_click(&mut self, _painter: &mut Painter, _button: MouseButton, _x: f64, _y: f64) {}

    /// Returns whether the key was consumed.
    fn key_down(&mut self, _painter: &mut Painter, _keycode: u32, _ch: Option<char>) -> bool {
        false
    }

    fn key_up(&mut self, _painter: &mut Painter, _keycode: u32, _ch: Option<char>) {}

    fn key_press(&mut self, _painter: &mut Painter, _keycode: u32, _ch: Option<char>) {}

    /// Draw tool decorations in world space, under the graph.
    fn draw_overlay(&self, _frame: &mut Frame<'_>) {}
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum NavState {
    #[default]
    Idle,
    Dragging,
}

/// Pan and zoom tool: drag with the primary button to pan, wheel to zoom
/// around the cursor, `1`/`2`/`3` to switch the grid off, to points or to
/// lines.
#[derive(Debug, Default)]
pub struct NavTool {
    state: NavState,
    cursor_x: f64,
    cursor_y: f64,
}

impl NavTool {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> NavState {
        self.state
    }

    pub fn cursor(&self) -> (f64, f64) {
        (self.cursor_x, self.cursor_y)
    }
}

impl InputHandler for NavTool {
    fn mouse_down(&mut self, _painter: &mut Painter, button: MouseButton, x: f64, y: f64) {
        self.cursor_x = x;
        self.cursor_y = y;
        if button == MouseButton::Primary {
            self.state = NavState::Dragging;
        }
    }

    fn mouse_up(&mut self, _painter: &mut Painter, button: MouseButton, _x: f64, _y: f64) {
        if button == MouseButton::Primary {
            self.state = NavState::Idle;
        }
    }

    fn mouse_move(&mut self, painter: &mut Painter, x: f64, y: f64) {
        if self.state == NavState::Dragging {
            self.mouse_drag(painter, x - self.cursor_x, y - self.cursor_y);
        }
        self.cursor_x = x;
        self.cursor_y = y;
        // The cursor marker follows the pointer.
        painter.mark_dirty();
    }

    fn mouse_drag(&mut self, painter: &mut Painter, dx: f64, dy: f64) {
        painter.adjust_pan(dx, dy);
    }

    fn mouse_wheel(&mut self, painter: &mut Painter, delta: f64) {
        painter.adjust_zoom(self.cursor_x, self.cursor_y, delta);
    }

    fn key_down(&mut self, painter: &mut Painter, _keycode: u32, ch: Option<char>) -> bool {
        let grid = match ch {
            Some('1') => GridMode::Off,
            Some('2') => GridMode::Points,
            Some('3') => GridMode::Lines,
            _ => return false,
        };
        painter.set_grid(grid);
        true
    }

    fn draw_overlay(&self, frame: &mut Frame<'_>) {
        if self.state == NavState::Dragging {
            return;
        }
        let zoom = frame.zoom();
        let half = CURSOR_SIZE / 2.0;
        let corner = frame.dev_to_world(self.cursor_x - half, self.cursor_y - half);
        let size = CURSOR_SIZE / zoom;
        frame.rect(corner.x, corner.y, size, size, 1.0 / zoom, CURSOR_COLOR, None);
    }
}
