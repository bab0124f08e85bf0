use crate::config::ViewConfig;
use crate::render::{Canvas, GridMode, Point, Rgba, Stroke, TextAnchor};

/// Finest grid spacing, in device pixels, before the grid coarsens.
const MIN_GRID_PIXELS: f64 = 12.0;
const BACKGROUND: Rgba = Rgba::new(255, 255, 255, 1.0);
const GRID_COLOR: Rgba = Rgba::gray(128, 0.3);

/// Axis-aligned rectangle in world coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WorldRect {
    pub min: Point,
    pub max: Point,
}

impl WorldRect {
    pub fn new(min: Point, max: Point) -> Self {
        Self { min, max }
    }

    /// Whether `[x0, x1] x [y0, y1]` touches this rectangle.
    pub fn overlaps(&self, x0: f64, y0: f64, x1: f64, y1: f64) -> bool {
        !(x0 > self.max.x || x1 < self.min.x || y0 > self.max.y || y1 < self.min.y)
    }
}

/// Owner of the viewport: device size, pan origin and zoom, grid mode and the
/// dirty flag that gates redraws.
///
/// World coordinates map to device pixels as `dev = (world - origin) * zoom`.
#[derive(Debug, Clone)]
pub struct Painter {
    width: f64,
    height: f64,
    origin: Point,
    zoom: f64,
    zoom_factor: f64,
    min_zoom: f64,
    max_zoom: f64,
    grid: GridMode,
    grid_spacing: f64,
    dirty: bool,
}

impl Painter {
    /// Build a viewport from view settings. Settings that fail
    /// [`ViewConfig::validate`] fall back to the defaults.
    pub fn new(view: &ViewConfig) -> Self {
        let view = match view.validate() {
            Ok(()) => view.clone(),
            Err(e) => {
                log::warn!("{e}; using default view settings");
                ViewConfig {
                    grid: view.grid,
                    ..ViewConfig::default()
                }
            }
        };
        Self {
            width: 0.0,
            height: 0.0,
            origin: Point::default(),
            zoom: view.zoom.clamp(view.min_zoom, view.max_zoom),
            zoom_factor: view.zoom_factor,
            min_zoom: view.min_zoom,
            max_zoom: view.max_zoom,
            grid: view.grid,
            grid_spacing: view.grid_spacing,
            dirty: true,
        }
    }

    pub fn set_size(&mut self, width: f64, height: f64) {
        self.width = width;
        self.height = height;
        self.dirty = true;
    }

    pub fn size(&self) -> (f64, f64) {
        (self.width, self.height)
    }

    pub fn zoom(&self) -> f64 {
        self.zoom
    }

    pub fn origin(&self) -> Point {
        self.origin
    }

    pub fn dev_to_world(&self, x: f64, y: f64) -> Point {
        Point::new(x / self.zoom + self.origin.x, y / self.zoom + self.origin.y)
    }

    pub fn world_to_dev(&self, x: f64, y: f64) -> Point {
        Point::new((x - self.origin.x) * self.zoom, (y - self.origin.y) * self.zoom)
    }

    /// Pan by a device-pixel delta; content follows the pointer.
    pub fn adjust_pan(&mut self, dx: f64, dy: f64) {
        self.origin.x -= dx / self.zoom;
        self.origin.y -= dy / self.zoom;
        self.dirty = true;
    }

    /// Zoom by `zoom_factor^delta` keeping the world point under the device
    /// anchor `(ax, ay)` fixed on screen.
    pub fn adjust_zoom(&mut self, ax: f64, ay: f64, delta: f64) {
        let anchor = self.dev_to_world(ax, ay);
        let zoom = (self.zoom * self.zoom_factor.powf(delta)).clamp(self.min_zoom, self.max_zoom);
        if zoom == self.zoom {
            return;
        }
        self.zoom = zoom;
        self.origin = Point::new(anchor.x - ax / zoom, anchor.y - ay / zoom);
        self.dirty = true;
    }

    /// Put the given world point at the centre of the device area.
    pub fn center_on(&mut self, world: Point) {
        self.origin = Point::new(
            world.x - self.width / (2.0 * self.zoom),
            world.y - self.height / (2.0 * self.zoom),
        );
        self.dirty = true;
    }

    pub fn set_grid(&mut self, grid: GridMode) {
        if self.grid != grid {
            self.grid = grid;
            self.dirty = true;
        }
    }

    pub fn grid(&self) -> GridMode {
        self.grid
    }

    pub fn mark_dirty(&mut self) {
        self.dirty = true;
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    pub fn clear_dirty(&mut self) {
        self.dirty = false;
    }

    /// The world rectangle covered by the device area.
    pub fn visible_world(&self) -> WorldRect {
        WorldRect::new(self.dev_to_world(0.0, 0.0), self.dev_to_world(self.width, self.height))
    }

    /// Grid spacing in world units, coarsened by powers of ten until cells
    /// are at least `MIN_GRID_PIXELS` wide on screen.
    pub fn grid_spacing(&self) -> f64 {
        let mut spacing = self.grid_spacing.max(f64::EPSILON);
        while spacing * self.zoom < MIN_GRID_PIXELS {
            spacing *= 10.0;
        }
        spacing
    }

    /// Start drawing onto a canvas through this viewport.
    pub fn frame<'a>(&'a self, canvas: &'a mut dyn Canvas) -> Frame<'a> {
        Frame {
            painter: self,
            canvas,
        }
    }
}

/// World-space drawing through a painter's viewport.
///
/// Line widths and font sizes are world units and scale with the zoom.
pub struct Frame<'a> {
    painter: &'a Painter,
    canvas: &'a mut dyn Canvas,
}

impl Frame<'_> {
    pub fn zoom(&self) -> f64 {
        self.painter.zoom
    }

    pub fn visible_world(&self) -> WorldRect {
        self.painter.visible_world()
    }

    pub fn dev_to_world(&self, x: f64, y: f64) -> Point {
        self.painter.dev_to_world(x, y)
    }

    fn to_dev(&self, x: f64, y: f64) -> Point {
        self.painter.world_to_dev(x, y)
    }

    pub fn clear(&mut self) {
        let (w, h) = self.painter.size();
        self.canvas.clear(w, h, BACKGROUND);
    }

    pub fn line(&mut self, x0: f64, y0: f64, x1: f64, y1: f64, color: Rgba, width: f64) {
        let from = self.to_dev(x0, y0);
        let to = self.to_dev(x1, y1);
        self.canvas.line(from, to, width * self.zoom(), color);
    }

    /// Outline a rectangle, optionally filling it.
    #[allow(clippy::too_many_arguments)]
    pub fn rect(
        &mut self,
        x: f64,
        y: f64,
        w: f64,
        h: f64,
        line_width: f64,
        color: Rgba,
        fill: Option<Rgba>,
    ) {
        let zoom = self.zoom();
        let min = self.to_dev(x, y);
        let stroke = (line_width > 0.0).then_some(Stroke {
            width: line_width * zoom,
            color,
        });
        self.canvas.rect(min, w * zoom, h * zoom, stroke, fill);
    }

    #[allow(clippy::too_many_arguments)]
    pub fn arc(
        &mut self,
        cx: f64,
        cy: f64,
        r: f64,
        start_angle: f64,
        end_angle: f64,
        anticlockwise: bool,
        width: f64,
        color: Rgba,
    ) {
        let zoom = self.zoom();
        let center = self.to_dev(cx, cy);
        self.canvas.arc(
            center,
            r * zoom,
            start_angle,
            end_angle,
            anticlockwise,
            width * zoom,
            color,
        );
    }

    pub fn text(&mut self, text: &str, x: f64, y: f64, color: Rgba, size: f64, anchor: TextAnchor) {
        let pos = self.to_dev(x, y);
        self.canvas.text(text, pos, size * self.zoom(), color, anchor);
    }

    /// Text placed directly in device pixels, outside the world transform.
    pub fn screen_text(&mut self, text: &str, x: f64, y: f64, color: Rgba, size: f64) {
        self.canvas
            .text(text, Point::new(x, y), size, color, TextAnchor::default());
    }

    /// Draw the background grid for the current mode.
    pub fn grid(&mut self) {
        let mode = self.painter.grid;
        if mode == GridMode::Off {
            return;
        }

        let spacing = self.painter.grid_spacing();
        let view = self.visible_world();
        let first_x = (view.min.x / spacing).floor() as i64;
        let last_x = (view.max.x / spacing).ceil() as i64;
        let first_y = (view.min.y / spacing).floor() as i64;
        let last_y = (view.max.y / spacing).ceil() as i64;
        let (w, h) = self.painter.size();

        match mode {
            GridMode::Off => {}
            GridMode::Points => {
                for i in first_x..=last_x {
                    for j in first_y..=last_y {
                        let p = self.to_dev(i as f64 * spacing, j as f64 * spacing);
                        let dot = Point::new(p.x - 1.0, p.y - 1.0);
                        self.canvas.rect(dot, 2.0, 2.0, None, Some(GRID_COLOR));
                    }
                }
            }
            GridMode::Lines => {
                for i in first_x..=last_x {
                    let x = self.to_dev(i as f64 * spacing, 0.0).x;
                    self.canvas
                        .line(Point::new(x, 0.0), Point::new(x, h), 1.0, GRID_COLOR);
                }
                for j in first_y..=last_y {
                    let y = self.to_dev(0.0, j as f64 * spacing).y;
                    self.canvas
                        .line(Point::new(0.0, y), Point::new(w, y), 1.0, GRID_COLOR);
                }
            }
        }
    }
}
