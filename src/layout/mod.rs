//! Placement of graph components on the step grid.
//!
//! Each step is a column. Tags stack downwards at the left of the column,
//! body tiles stack downwards in the body column, and seed tiles (bodies
//! spanning several steps) stack upwards from just above the origin. The
//! layout is a pure function of the parsed components and the geometry
//! parameters.

pub mod join;

use std::collections::BTreeMap;

use crate::config::LayoutConfig;
use crate::error::GraphError;
use crate::sequence::{ComponentKind, SequenceName};
use crate::store::{SequenceId, SequenceRow};

pub use join::{resolve_joins, JoinLine, ResolvedJoins};

/// A parsed sequence waiting to be placed.
#[derive(Debug, Clone, PartialEq)]
pub struct Component {
    pub seq_id: SequenceId,
    pub seq_name: String,
    pub name: SequenceName,
    /// Sequence length in bases.
    pub length: u64,
}

/// World rectangle assigned to one sequence.
#[derive(Debug, Clone, PartialEq)]
pub struct ComponentPosition {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
    pub kind: ComponentKind,
    pub path: u32,
    pub step: u64,
    pub seq_id: SequenceId,
    pub seq_name: String,
    pub fan_out: Option<u32>,
}

impl ComponentPosition {
    pub fn right(&self) -> f64 {
        self.x + self.width
    }

    pub fn bottom(&self) -> f64 {
        self.y + self.height
    }

    pub fn center_y(&self) -> f64 {
        self.y + self.height / 2.0
    }

    /// Whether the y extents of two rectangles intersect.
    pub fn overlaps_y(&self, other: &ComponentPosition) -> bool {
        self.y < other.bottom() && other.y < self.bottom()
    }
}

/// Derived spacing constants, all in world units.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LayoutGeometry {
    pub font_size: f64,
    pub line_width: f64,
    pub fold_size: u64,
    pub seed_margin: f64,
    /// Height of one line of tile text.
    pub box_h: f64,
    /// Vertical padding added to every rectangle and between bodies.
    pub fudge_y: f64,
    /// Vertical distance between consecutive tags.
    pub tag_pitch: f64,
    /// x offset of the body column within a step.
    pub tag_shift: f64,
    /// Horizontal distance between consecutive steps.
    pub column_width: f64,
}

impl LayoutGeometry {
    pub fn new(config: &LayoutConfig) -> Self {
        let font = config.font_size;
        let lw = config.line_width;
        let fold_size = config.fold_size.max(1);
        let box_h = font;
        let tag_shift =
            config.tag_name_len * font + 2.0 * font + 2.0 * lw + config.edge_col_width * font;

        Self {
            font_size: font,
            line_width: lw,
            fold_size,
            seed_margin: config.seed_margin,
            box_h,
            fudge_y: 2.0 * font + 2.0 * lw,
            tag_pitch: box_h + 2.0 * font + 4.0 * lw,
            tag_shift,
            column_width: fold_size as f64 * font
                + 2.0 * lw
                + 2.0 * font
                + tag_shift
                + config.edge_col_width * font,
        }
    }

    /// Height of a body tile holding `length` bases.
    pub fn body_height(&self, length: u64) -> f64 {
        length.div_ceil(self.fold_size) as f64 * self.box_h + self.fudge_y
    }

    /// x of the left edge of a step's column.
    pub fn step_x(&self, step: u64, shift_step: u64) -> f64 {
        (step as f64 - shift_step as f64) * self.column_width
    }
}

/// Components grouped by step and sorted by rank within each step.
#[derive(Debug, Default)]
pub struct StepBuckets {
    pub steps: BTreeMap<u64, Vec<Component>>,
    /// Rows whose names could not be parsed.
    pub skipped: Vec<GraphError>,
}

impl StepBuckets {
    pub fn min_step(&self) -> Option<u64> {
        self.steps.keys().next().copied()
    }

    pub fn max_step(&self) -> Option<u64> {
        self.steps.keys().next_back().copied()
    }

    pub fn component_count(&self) -> usize {
        self.steps.values().map(Vec::len).sum()
    }
}

/// Parse sequence names and bucket the rows by step.
///
/// Within a step, components are ordered by rank; ties keep row order.
/// Malformed names are logged and collected in `skipped`.
pub fn bucket_components(rows: &[SequenceRow]) -> StepBuckets {
    let mut buckets = StepBuckets::default();

    for row in rows {
        match row.name.parse::<SequenceName>() {
            Ok(name) => buckets.steps.entry(name.step).or_default().push(Component {
                seq_id: row.id,
                seq_name: row.name.clone(),
                name,
                length: row.length,
            }),
            Err(e) => {
                log::warn!("skipping sequence {}: {e}", row.id);
                buckets.skipped.push(e);
            }
        }
    }

    for components in buckets.steps.values_mut() {
        components.sort_by_key(|c| c.name.kind.rank());
    }
    buckets
}

/// Rectangles for every placed component, keyed by sequence id.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Layout {
    pub positions: BTreeMap<SequenceId, ComponentPosition>,
    pub min_step: Option<u64>,
    pub max_step: Option<u64>,
}

impl Layout {
    pub fn get(&self, id: SequenceId) -> Option<&ComponentPosition> {
        self.positions.get(&id)
    }

    pub fn len(&self) -> usize {
        self.positions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }
}

/// Assign a rectangle to every bucketed component.
///
/// Step `shift_step` is drawn at x = 0.
pub fn choose_coords(buckets: &StepBuckets, geometry: &LayoutGeometry, shift_step: u64) -> Layout {
    let g = geometry;
    let mut layout = Layout {
        positions: BTreeMap::new(),
        min_step: buckets.min_step(),
        max_step: buckets.max_step(),
    };

    for (&step, components) in &buckets.steps {
        let x = g.step_x(step, shift_step);
        let mut tag_y = 2.0 * g.box_h;
        let mut body_y = 0.0;
        let mut seed_y = 2.0 * g.line_width;

        for comp in components {
            let (cx, cy, width, height) = match comp.name.kind {
                ComponentKind::Tag { .. } => {
                    let rect = (x, tag_y, comp.length as f64 * g.font_size, g.box_h + g.fudge_y);
                    tag_y += g.tag_pitch;
                    rect
                }
                ComponentKind::Body { seed_tile_len, .. } => {
                    let h = g.body_height(comp.length);
                    let tile_width = f64::from(seed_tile_len.max(1)) * g.font_size * g.fold_size as f64;
                    if seed_tile_len > 1 {
                        let rect = (x + g.tag_shift, -(seed_y + h), tile_width + g.seed_margin, h);
                        seed_y += h + g.fudge_y;
                        rect
                    } else {
                        let rect = (x + g.tag_shift, body_y, tile_width, h);
                        body_y += h + g.fudge_y;
                        rect
                    }
                }
            };

            layout.positions.insert(
                comp.seq_id,
                ComponentPosition {
                    x: cx,
                    y: cy,
                    width,
                    height,
                    kind: comp.name.kind,
                    path: comp.name.path,
                    step,
                    seq_id: comp.seq_id,
                    seq_name: comp.seq_name.clone(),
                    fan_out: comp.name.fan_out,
                },
            );
        }
    }

    log::debug!(
        "placed {} components over steps {:?}..={:?}",
        layout.len(),
        layout.min_step,
        layout.max_step
    );
    layout
}
