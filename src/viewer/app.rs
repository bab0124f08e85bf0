use std::time::Instant;

use anyhow::Result;
use eframe::egui::{self, Align, Align2, Color32, FontId, Pos2, Rect, Sense, Shape, Stroke, Vec2};

use crate::render::{arc_points, DisplayList, DrawCommand, HAlign, Point, Rgba, TextAnchor, VAlign};
use crate::viewer::session::Session;
use crate::viewer::tool::{InputEvent, MouseButton};

/// Pixels of wheel travel per zoom step.
const WHEEL_STEP: f32 = 50.0;
const ARC_SEGMENTS: usize = 16;
/// Text smaller than this on screen is skipped.
const MIN_TEXT_PX: f64 = 1.0;

/// Desktop front-end: locus and sample pickers on the left, the graph
/// canvas in the middle.
pub struct ViewerApp {
    session: Session,
    /// Last frame produced by the session, replayed every egui pass.
    display: DisplayList,
    canvas_size: Vec2,
    pointer: Option<Pos2>,
    error: Option<String>,
}

impl ViewerApp {
    pub fn new(session: Session) -> Self {
        Self {
            session,
            display: DisplayList::new(),
            canvas_size: Vec2::ZERO,
            pointer: None,
            error: None,
        }
    }

    fn render_side_panel(&mut self, ui: &mut egui::Ui) {
        ui.heading("Locus");
        let names: Vec<String> = self.session.locus_names().map(String::from).collect();
        let current = self.session.current_locus().unwrap_or_default().to_string();
        let mut selected = current.clone();

        egui::ComboBox::from_id_salt("locus_selector")
            .selected_text(&selected)
            .show_ui(ui, |ui| {
                for name in &names {
                    ui.selectable_value(&mut selected, name.clone(), name);
                }
            });

        if selected != current {
            self.error = self
                .session
                .select_locus(&selected)
                .err()
                .map(|e| e.to_string());
        }

        ui.separator();
        ui.heading("Samples");

        let samples: Vec<String> = self
            .session
            .graph()
            .call_set_names()
            .map(String::from)
            .collect();
        let highlighted = self.session.graph().highlighted_sample().map(String::from);

        egui::ScrollArea::vertical().show(ui, |ui| {
            for name in &samples {
                let active = highlighted.as_deref() == Some(name.as_str());
                if ui.selectable_label(active, name).clicked() {
                    if active {
                        self.session.unhighlight_sample();
                        self.error = None;
                    } else {
                        self.error = self
                            .session
                            .highlight_sample(name)
                            .err()
                            .map(|e| e.to_string());
                    }
                }
            }
        });

        ui.separator();
        ui.label(format!("zoom {:.4}", self.session.painter().zoom()));
        if let Some((min, max)) = self.session.graph().step_range() {
            ui.label(format!("steps {min:x}..{max:x}"));
        }
        ui.label("drag to pan, wheel to zoom, 1/2/3 grid");

        if let Some(err) = &self.error {
            ui.colored_label(Color32::RED, err);
        }
    }

    fn render_canvas(&mut self, ui: &mut egui::Ui) {
        let (response, painter) = ui.allocate_painter(ui.available_size(), Sense::click_and_drag());
        let rect = response.rect;

        if rect.size() != self.canvas_size {
            self.canvas_size = rect.size();
            self.session.handle(&InputEvent::Resize {
                width: f64::from(rect.width()),
                height: f64::from(rect.height()),
            });
        }

        for event in self.collect_input(ui, &response, rect) {
            self.session.handle(&event);
        }

        let mut next = DisplayList::new();
        if self.session.tick(Instant::now(), &mut next) {
            self.display = next;
        }
        replay(&self.display, &painter, rect.min);
    }

    /// Translate this pass's egui input into canvas events.
    fn collect_input(&mut self, ui: &egui::Ui, response: &egui::Response, rect: Rect) -> Vec<InputEvent> {
        let mut events = Vec::new();
        let local = |p: Pos2| (f64::from(p.x - rect.min.x), f64::from(p.y - rect.min.y));

        if let Some(pos) = response.hover_pos()
            && self.pointer != Some(pos)
        {
            self.pointer = Some(pos);
            let (x, y) = local(pos);
            events.push(InputEvent::MouseMove { x, y });
        }

        let hovered = response.hovered();
        ui.input(|i| {
            for (egui_button, button) in [
                (egui::PointerButton::Primary, MouseButton::Primary),
                (egui::PointerButton::Secondary, MouseButton::Secondary),
                (egui::PointerButton::Middle, MouseButton::Middle),
            ] {
                let Some(pos) = i.pointer.interact_pos() else {
                    continue;
                };
                let (x, y) = local(pos);
                if hovered && i.pointer.button_pressed(egui_button) {
                    events.push(InputEvent::MouseDown { button, x, y });
                }
                if i.pointer.button_released(egui_button) {
                    events.push(InputEvent::MouseUp { button, x, y });
                }
            }

            if hovered && i.raw_scroll_delta.y != 0.0 {
                events.push(InputEvent::MouseWheel {
                    delta: f64::from(i.raw_scroll_delta.y / WHEEL_STEP),
                });
            }

            for event in &i.events {
                match event {
                    egui::Event::Key { key, pressed, .. } => {
                        let ch = key_char(*key);
                        let keycode = ch.map_or(0, u32::from);
                        events.push(if *pressed {
                            InputEvent::KeyDown { keycode, ch }
                        } else {
                            InputEvent::KeyUp { keycode, ch }
                        });
                    }
                    egui::Event::Text(text) => {
                        events.extend(text.chars().map(|c| InputEvent::KeyPress {
                            keycode: u32::from(c),
                            ch: Some(c),
                        }));
                    }
                    _ => {}
                }
            }
        });

        if response.double_clicked()
            && let Some(pos) = response.interact_pointer_pos()
        {
            let (x, y) = local(pos);
            events.push(InputEvent::DoubleClick {
                button: MouseButton::Primary,
                x,
                y,
            });
        }
        events
    }
}

impl eframe::App for ViewerApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        egui::SidePanel::left("locus_panel")
            .default_width(220.0)
            .show(ctx, |ui| self.render_side_panel(ui));

        egui::CentralPanel::default()
            .frame(egui::Frame::new())
            .show(ctx, |ui| self.render_canvas(ui));

        if self.session.needs_redraw() {
            ctx.request_repaint();
        }
    }
}

/// Single-character name of a key, as used by the tool shortcuts.
fn key_char(key: egui::Key) -> Option<char> {
    let mut chars = key.name().chars();
    match (chars.next(), chars.next()) {
        (Some(c), None) => Some(c),
        _ => None,
    }
}

fn color(c: Rgba) -> Color32 {
    let alpha = (c.a.clamp(0.0, 1.0) * 255.0).round() as u8;
    Color32::from_rgba_unmultiplied(c.r, c.g, c.b, alpha)
}

fn align(anchor: TextAnchor) -> Align2 {
    let h = match anchor.h {
        HAlign::Left => Align::Min,
        HAlign::Center => Align::Center,
        HAlign::Right => Align::Max,
    };
    let v = match anchor.v {
        VAlign::Top => Align::Min,
        VAlign::Center => Align::Center,
        VAlign::Bottom => Align::Max,
    };
    Align2([h, v])
}

/// Paint recorded commands with their device origin at `origin`.
fn replay(list: &DisplayList, painter: &egui::Painter, origin: Pos2) {
    let pos = |p: Point| Pos2::new(origin.x + p.x as f32, origin.y + p.y as f32);

    for cmd in list.commands() {
        match cmd {
            DrawCommand::Clear {
                width,
                height,
                color: c,
            } => {
                let rect = Rect::from_min_size(origin, Vec2::new(*width as f32, *height as f32));
                painter.rect_filled(rect, 0.0, color(*c));
            }
            DrawCommand::Line {
                from,
                to,
                width,
                color: c,
            } => {
                painter.line_segment([pos(*from), pos(*to)], Stroke::new(*width as f32, color(*c)));
            }
            DrawCommand::Rect {
                min,
                width,
                height,
                stroke,
                fill,
            } => {
                let rect = Rect::from_min_size(pos(*min), Vec2::new(*width as f32, *height as f32));
                if let Some(fill) = fill {
                    painter.rect_filled(rect, 0.0, color(*fill));
                }
                if let Some(stroke) = stroke {
                    let corners = vec![
                        rect.left_top(),
                        rect.right_top(),
                        rect.right_bottom(),
                        rect.left_bottom(),
                    ];
                    painter.add(Shape::closed_line(
                        corners,
                        Stroke::new(stroke.width as f32, color(stroke.color)),
                    ));
                }
            }
            DrawCommand::Arc {
                center,
                radius,
                start_angle,
                end_angle,
                anticlockwise,
                width,
                color: c,
            } => {
                let points = arc_points(
                    *center,
                    *radius,
                    *start_angle,
                    *end_angle,
                    *anticlockwise,
                    ARC_SEGMENTS,
                )
                .into_iter()
                .map(pos)
                .collect();
                painter.add(Shape::line(points, Stroke::new(*width as f32, color(*c))));
            }
            DrawCommand::Text {
                text,
                pos: at,
                size,
                color: c,
                anchor,
            } => {
                if *size < MIN_TEXT_PX {
                    continue;
                }
                painter.text(
                    pos(*at),
                    align(*anchor),
                    text,
                    FontId::monospace(*size as f32),
                    color(*c),
                );
            }
        }
    }
}

/// Open the viewer window and run until it is closed.
pub fn run(session: Session) -> Result<()> {
    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1400.0, 900.0])
            .with_title("Lightning Graph Viewer"),
        ..Default::default()
    };

    eframe::run_native(
        "Lightning Graph Viewer",
        options,
        Box::new(|_cc| Ok(Box::new(ViewerApp::new(session)))),
    )
    .map_err(|e| anyhow::anyhow!("Failed to run GUI: {}", e))?;

    Ok(())
}
