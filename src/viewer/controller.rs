use std::time::{Duration, Instant};

use crate::render::{Canvas, Frame, Painter, Rgba};
use crate::viewer::tool::{InputEvent, InputHandler};

/// How long an action message stays at full strength.
const SUSTAIN: Duration = Duration::from_millis(1500);
/// How long it then takes to fade out.
const DROPOFF: Duration = Duration::from_millis(500);
const ACTION_ALPHA: f32 = 0.4;
const STATUS_ALPHA: f32 = 0.4;
const SCREEN_FONT_SIZE: f64 = 15.0;

/// A short message that shows briefly and then fades out.
#[derive(Debug, Clone)]
struct ActionText {
    text: String,
    elapsed: Duration,
    last: Instant,
}

impl ActionText {
    fn alpha(&self) -> Option<f32> {
        if self.elapsed < SUSTAIN {
            Some(ACTION_ALPHA)
        } else if self.elapsed < SUSTAIN + DROPOFF {
            let left = (SUSTAIN + DROPOFF - self.elapsed).as_secs_f32();
            Some(ACTION_ALPHA * left / DROPOFF.as_secs_f32())
        } else {
            None
        }
    }
}

/// Routes input to the active tool or the focused widget and drives
/// redraws off the painter's dirty flag.
pub struct Controller {
    tool: Box<dyn InputHandler>,
    focus: Option<Box<dyn InputHandler>>,
    cursor_x: f64,
    cursor_y: f64,
    height: f64,
    status: String,
    action: Option<ActionText>,
}

impl Controller {
    pub fn new(tool: Box<dyn InputHandler>) -> Self {
        Self {
            tool,
            focus: None,
            cursor_x: 0.0,
            cursor_y: 0.0,
            height: 0.0,
            status: String::new(),
            action: None,
        }
    }

    pub fn set_tool(&mut self, tool: Box<dyn InputHandler>) {
        self.tool = tool;
    }

    /// Route keyboard input to a widget until the next mouse press.
    pub fn set_focus(&mut self, widget: Box<dyn InputHandler>) {
        self.focus = Some(widget);
    }

    pub fn has_focus(&self) -> bool {
        self.focus.is_some()
    }

    pub fn set_status(&mut self, text: impl Into<String>) {
        self.status = text.into();
    }

    pub fn status(&self) -> &str {
        &self.status
    }

    /// Show a message that fades after a moment.
    pub fn fade_message(&mut self, text: impl Into<String>, now: Instant) {
        self.action = Some(ActionText {
            text: text.into(),
            elapsed: Duration::ZERO,
            last: now,
        });
    }

    /// Current action message and its alpha, while it is still visible.
    pub fn action_message(&self) -> Option<(&str, f32)> {
        let action = self.action.as_ref()?;
        action.alpha().map(|a| (action.text.as_str(), a))
    }

    pub fn is_fading(&self) -> bool {
        self.action_message().is_some()
    }

    pub fn cursor(&self) -> (f64, f64) {
        (self.cursor_x, self.cursor_y)
    }

    fn key_target(&mut self) -> &mut dyn InputHandler {
        match self.focus.as_mut() {
            Some(focus) => focus.as_mut(),
            None => self.tool.as_mut(),
        }
    }

    pub fn handle(&mut self, event: &InputEvent, painter: &mut Painter) {
        match *event {
            InputEvent::MouseDown { button, x, y } => {
                self.focus = None;
                self.cursor_x = x;
                self.cursor_y = y;
                self.tool.mouse_down(painter, button, x, y);
            }
            InputEvent::MouseUp { button, x, y } => self.tool.mouse_up(painter, button, x, y),
            InputEvent::MouseMove { x, y } => {
                self.cursor_x = x;
                self.cursor_y = y;
                self.tool.mouse_move(painter, x, y);
            }
            InputEvent::MouseDrag { dx, dy } => self.tool.mouse_drag(painter, dx, dy),
            InputEvent::MouseWheel { delta } => self.tool.mouse_wheel(painter, delta),
            InputEvent::DoubleClick { button, x, y } => {
                self.tool.double_click(painter, button, x, y)
            }
            InputEvent::KeyDown { keycode, ch } => {
                self.key_target().key_down(painter, keycode, ch);
            }
            InputEvent::KeyUp { keycode, ch } => self.key_target().key_up(painter, keycode, ch),
            InputEvent::KeyPress { keycode, ch } => {
                self.key_target().key_press(painter, keycode, ch)
            }
            InputEvent::Resize { width, height } => {
                self.height = height;
                painter.set_size(width, height);
            }
        }
    }

    /// Advance the action fade, and if anything changed draw a new frame:
    /// background, grid, tool overlay, graph, then the status and action
    /// text in device space. Returns whether a frame was drawn.
    pub fn redraw<F>(
        &mut self,
        now: Instant,
        painter: &mut Painter,
        canvas: &mut dyn Canvas,
        draw_graph: F,
    ) -> bool
    where
        F: FnOnce(&mut Frame<'_>),
    {
        let action_alpha = self.action.as_mut().and_then(|action| {
            let alpha = action.alpha()?;
            action.elapsed += now.saturating_duration_since(action.last);
            action.last = now;
            Some(alpha)
        });
        if action_alpha.is_some() {
            painter.mark_dirty();
        }

        if !painter.is_dirty() {
            return false;
        }

        {
            let mut frame = painter.frame(canvas);
            frame.clear();
            frame.grid();
            self.tool.draw_overlay(&mut frame);
            draw_graph(&mut frame);

            if !self.status.is_empty() {
                frame.screen_text(
                    &self.status,
                    10.0,
                    self.height - 20.0,
                    Rgba::gray(0, STATUS_ALPHA),
                    SCREEN_FONT_SIZE,
                );
            }
            if let (Some(alpha), Some(action)) = (action_alpha, &self.action) {
                frame.screen_text(
                    &action.text,
                    10.0,
                    self.height - 50.0,
                    Rgba::gray(0, alpha),
                    SCREEN_FONT_SIZE,
                );
            }
        }

        painter.clear_dirty();
        true
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::rc::Rc;

    use super::*;
    use crate::config::ViewConfig;
    use crate::render::{DisplayList, DrawCommand, GridMode};
    use crate::viewer::tool::{MouseButton, NavTool};

    /// Records the keys it receives.
    struct KeyLog(Rc<RefCell<Vec<char>>>);

    impl InputHandler for KeyLog {
        fn key_down(&mut self, _painter: &mut Painter, _keycode: u32, ch: Option<char>) -> bool {
            self.0.borrow_mut().extend(ch);
            true
        }
    }

    fn setup() -> (Controller, Painter) {
        let mut controller = Controller::new(Box::new(NavTool::new()));
        let mut painter = Painter::new(&ViewConfig::default());
        controller.handle(
            &InputEvent::Resize {
                width: 800.0,
                height: 600.0,
            },
            &mut painter,
        );
        (controller, painter)
    }

    fn key(ch: char) -> InputEvent {
        InputEvent::KeyDown {
            keycode: ch as u32,
            ch: Some(ch),
        }
    }

    #[test]
    fn test_redraw_only_when_dirty() {
        let (mut controller, mut painter) = setup();
        let now = Instant::now();
        let mut list = DisplayList::new();
        let mut graph_calls = 0;

        assert!(controller.redraw(now, &mut painter, &mut list, |_| graph_calls += 1));
        assert!(!painter.is_dirty());
        let drawn = list.len();

        assert!(!controller.redraw(now, &mut painter, &mut list, |_| graph_calls += 1));
        assert_eq!(list.len(), drawn);
        assert_eq!(graph_calls, 1);

        controller.handle(&InputEvent::MouseWheel { delta: 1.0 }, &mut painter);
        assert!(controller.redraw(now, &mut painter, &mut list, |_| graph_calls += 1));
        assert_eq!(graph_calls, 2);
    }

    #[test]
    fn test_frame_order() {
        let (mut controller, mut painter) = setup();
        controller.set_status("BRCA1");
        painter.set_grid(GridMode::Off);
        let mut list = DisplayList::new();
        controller.redraw(Instant::now(), &mut painter, &mut list, |frame| {
            frame.line(0.0, 0.0, 10.0, 10.0, Rgba::gray(0, 1.0), 1.0);
        });

        let cmds = list.commands();
        assert!(matches!(cmds[0], DrawCommand::Clear { .. }));
        // Cursor overlay, then the graph, then status text.
        assert!(matches!(cmds[1], DrawCommand::Rect { .. }));
        assert!(matches!(cmds[2], DrawCommand::Line { .. }));
        assert!(matches!(&cmds[3], DrawCommand::Text { text, .. } if text == "BRCA1"));
        assert_eq!(cmds.len(), 4);
    }

    #[test]
    fn test_status_text_follows_canvas_height() {
        let (mut controller, mut painter) = setup();
        controller.set_status("BRCA1");
        controller.handle(
            &InputEvent::Resize {
                width: 400.0,
                height: 300.0,
            },
            &mut painter,
        );
        assert_eq!(painter.size(), (400.0, 300.0));

        let mut list = DisplayList::new();
        controller.redraw(Instant::now(), &mut painter, &mut list, |_| {});
        let status = list.commands().iter().find_map(|c| match c {
            DrawCommand::Text { text, pos, .. } if text == "BRCA1" => Some(*pos),
            _ => None,
        });
        assert_eq!(status.map(|p| (p.x, p.y)), Some((10.0, 280.0)));
    }

    #[test]
    fn test_fade_message_timeline() {
        let (mut controller, mut painter) = setup();
        let start = Instant::now();
        let mut list = DisplayList::new();
        controller.fade_message("loaded BRCA1", start);
        assert_eq!(controller.action_message(), Some(("loaded BRCA1", 0.4)));

        controller.redraw(start, &mut painter, &mut list, |_| {});
        controller.redraw(start + Duration::from_millis(1750), &mut painter, &mut list, |_| {});
        let (_, alpha) = controller.action_message().unwrap();
        assert!((alpha - 0.2).abs() < 1e-4);

        // Still fading: every tick redraws.
        list.reset();
        assert!(controller.redraw(
            start + Duration::from_millis(1800),
            &mut painter,
            &mut list,
            |_| {}
        ));
        assert!(list.texts().any(|t| t == "loaded BRCA1"));

        controller.redraw(start + Duration::from_millis(2100), &mut painter, &mut list, |_| {});
        assert!(!controller.is_fading());
        assert!(!controller.redraw(
            start + Duration::from_millis(2200),
            &mut painter,
            &mut list,
            |_| {}
        ));
    }

    #[test]
    fn test_keys_go_to_focus_until_mouse_down() {
        let (mut controller, mut painter) = setup();
        let keys = Rc::new(RefCell::new(Vec::new()));
        controller.set_focus(Box::new(KeyLog(Rc::clone(&keys))));
        assert!(controller.has_focus());

        controller.handle(&key('3'), &mut painter);
        assert_eq!(*keys.borrow(), vec!['3']);
        assert_eq!(painter.grid(), GridMode::Points);

        controller.handle(
            &InputEvent::MouseDown {
                button: MouseButton::Secondary,
                x: 5.0,
                y: 5.0,
            },
            &mut painter,
        );
        assert!(!controller.has_focus());
        controller.handle(&key('3'), &mut painter);
        assert_eq!(painter.grid(), GridMode::Lines);
        assert_eq!(keys.borrow().len(), 1);
    }

    #[test]
    fn test_drag_through_controller() {
        let (mut controller, mut painter) = setup();
        let origin = painter.origin();
        let down = InputEvent::MouseDown {
            button: MouseButton::Primary,
            x: 100.0,
            y: 100.0,
        };
        controller.handle(&down, &mut painter);
        controller.handle(&InputEvent::MouseMove { x: 120.0, y: 100.0 }, &mut painter);
        assert_eq!(controller.cursor(), (120.0, 100.0));
        assert!(painter.origin().x < origin.x);
    }
}
