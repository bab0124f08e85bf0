//! The lightning graph model: loads a locus from the store, lays it out and
//! draws it through a [`Frame`].

use std::collections::{BTreeMap, HashMap};
use std::f64::consts::{FRAC_PI_2, PI};

use crate::config::{LayoutConfig, LocusConfig, StyleConfig};
use crate::error::GraphError;
use crate::layout::{
    bucket_components, choose_coords, resolve_joins, ComponentPosition, JoinLine, Layout,
    LayoutGeometry,
};
use crate::render::{Frame, Rgba, TextAnchor, WorldRect};
use crate::sequence::{no_call_mask, SequenceText, TileText};
use crate::store::{CallSetId, CallSetRow, GraphStore, SequenceId};

/// Alpha of join curves.
const JOIN_ALPHA: f32 = 0.4;

/// One haplotype of a sample: an ordered path of sequence ids.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Allele {
    pub name: String,
    pub path: Vec<SequenceId>,
}

/// Counts from a graph load, for logging and the headless summary.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LoadReport {
    pub components: usize,
    pub skipped_names: usize,
    pub joins: usize,
    pub dropped_joins: usize,
    pub call_sets: usize,
    /// Placed components whose name carries a path other than the locus path.
    pub foreign_path: usize,
}

/// Everything derived from one locus. Built completely before it replaces
/// the live state.
#[derive(Debug, Default)]
struct GraphState {
    locus: Option<LocusConfig>,
    layout: Layout,
    joins: Vec<JoinLine>,
    call_sets: Vec<CallSetRow>,
    call_set_ids: HashMap<String, CallSetId>,
    samples: HashMap<String, Vec<Allele>>,
    highlight: Option<String>,
}

pub struct LightningGraph {
    layout_config: LayoutConfig,
    geometry: LayoutGeometry,
    style: StyleConfig,
    state: GraphState,
}

impl LightningGraph {
    pub fn new(layout_config: LayoutConfig, style: StyleConfig) -> Self {
        Self {
            geometry: LayoutGeometry::new(&layout_config),
            layout_config,
            style,
            state: GraphState::default(),
        }
    }

    /// Load and lay out a locus.
    ///
    /// The current graph is kept when the sequence query fails. Missing
    /// joins or call sets only leave those parts empty.
    pub fn init(
        &mut self,
        store: &dyn GraphStore,
        locus: &LocusConfig,
    ) -> Result<LoadReport, GraphError> {
        let rows = store.sequences().inspect_err(|e| {
            log::warn!("cannot load locus {}: {e}", locus.name);
        })?;

        let buckets = bucket_components(&rows);
        let layout = choose_coords(&buckets, &self.geometry, locus.shift_step);

        let join_rows = store.graph_joins().unwrap_or_else(|e| {
            log::warn!("no joins for locus {}: {e}", locus.name);
            Vec::new()
        });
        let joins = resolve_joins(&join_rows, &layout.positions, &self.layout_config);

        let call_sets = store.call_sets().unwrap_or_else(|e| {
            log::warn!("no call sets for locus {}: {e}", locus.name);
            Vec::new()
        });
        let call_set_ids = call_sets.iter().map(|c| (c.name.clone(), c.id)).collect();

        let report = LoadReport {
            components: layout.len(),
            skipped_names: buckets.skipped.len(),
            joins: joins.lines.len(),
            dropped_joins: joins.dropped.len(),
            call_sets: call_sets.len(),
            foreign_path: foreign_path_count(&layout, locus),
        };

        self.state = GraphState {
            locus: Some(locus.clone()),
            layout,
            joins: joins.lines,
            call_sets,
            call_set_ids,
            samples: HashMap::new(),
            highlight: None,
        };

        log::info!(
            "loaded locus {}: {} components ({} skipped), {} joins ({} dropped), {} call sets",
            locus.name,
            report.components,
            report.skipped_names,
            report.joins,
            report.dropped_joins,
            report.call_sets
        );
        Ok(report)
    }

    /// Make a sample the active highlight, loading its alleles on first use.
    ///
    /// Any failed query leaves the highlight and the cache untouched.
    pub fn highlight_sample(
        &mut self,
        store: &dyn GraphStore,
        name: &str,
    ) -> Result<(), GraphError> {
        if !self.state.samples.contains_key(name) {
            let alleles = self.load_alleles(store, name).inspect_err(|e| {
                log::warn!("cannot highlight sample {name}: {e}");
            })?;
            log::debug!("cached {} alleles for sample {name}", alleles.len());
            self.state.samples.insert(name.to_string(), alleles);
        }
        self.state.highlight = Some(name.to_string());
        Ok(())
    }

    fn load_alleles(&self, store: &dyn GraphStore, name: &str) -> Result<Vec<Allele>, GraphError> {
        let call_set_id = *self
            .state
            .call_set_ids
            .get(name)
            .ok_or_else(|| GraphError::lookup_miss("sample", name))?;

        store
            .allele_ids(call_set_id)?
            .into_iter()
            .map(|allele_id| -> Result<Allele, GraphError> {
                Ok(Allele {
                    name: store.allele_name(allele_id)?,
                    path: store.allele_path(allele_id)?,
                })
            })
            .collect()
    }

    pub fn unhighlight_sample(&mut self) {
        self.state.highlight = None;
    }

    pub fn highlighted_sample(&self) -> Option<&str> {
        self.state.highlight.as_deref()
    }

    pub fn cached_sample(&self, name: &str) -> Option<&[Allele]> {
        self.state.samples.get(name).map(Vec::as_slice)
    }

    pub fn call_set_names(&self) -> impl Iterator<Item = &str> {
        self.state.call_sets.iter().map(|c| c.name.as_str())
    }

    pub fn positions(&self) -> &BTreeMap<SequenceId, ComponentPosition> {
        &self.state.layout.positions
    }

    pub fn joins(&self) -> &[JoinLine] {
        &self.state.joins
    }

    pub fn locus(&self) -> Option<&LocusConfig> {
        self.state.locus.as_ref()
    }

    pub fn geometry(&self) -> &LayoutGeometry {
        &self.geometry
    }

    pub fn step_range(&self) -> Option<(u64, u64)> {
        self.state.layout.min_step.zip(self.state.layout.max_step)
    }

    /// Whether a rectangle grown by `grow` on every side may be on screen.
    fn visible(&self, view: &WorldRect, pos: &ComponentPosition, grow: f64) -> bool {
        let lw = self.geometry.line_width;
        view.overlaps(
            pos.x - lw - grow,
            pos.y - lw - grow,
            pos.right() + 2.0 * lw + 2.0 * grow,
            pos.bottom() + 2.0 * lw + 2.0 * grow,
        )
    }

    /// Draw components, then the highlighted sample's alleles, then joins.
    pub fn draw(&self, frame: &mut Frame<'_>, texts: &SequenceText) {
        let view = frame.visible_world();
        let lw = self.geometry.line_width;
        let detail = frame.zoom() > self.style.sequence_zoom_detail;

        for pos in self.state.layout.positions.values() {
            if !self.visible(&view, pos, 0.0) {
                continue;
            }
            let color = if pos.kind.is_tag() {
                self.style.tag_color
            } else {
                self.style.body_color
            };
            frame.rect(pos.x, pos.y, pos.width, pos.height, lw, color, None);

            if detail {
                match texts.get(&pos.seq_name) {
                    Some(tile) => self.draw_text(frame, tile, pos.x + lw, pos.y + lw),
                    None => log::trace!("no sequence text for {}", pos.seq_name),
                }
            }
        }

        self.draw_highlight(frame, &view);

        let r = self.layout_config.path_radius;
        for line in &self.state.joins {
            let (x0, y0, x1, y1) = line.bounds(r);
            if view.overlaps(x0 - lw, y0 - lw, x1 + lw, y1 + lw) {
                self.draw_join(frame, line);
            }
        }
    }

    fn draw_highlight(&self, frame: &mut Frame<'_>, view: &WorldRect) {
        let Some(alleles) = self
            .state
            .highlight
            .as_ref()
            .and_then(|name| self.state.samples.get(name))
        else {
            return;
        };
        let colors = &self.style.allele_colors;
        if colors.is_empty() {
            return;
        }

        let lw = self.geometry.line_width;
        for (index, allele) in alleles.iter().enumerate() {
            let grow = lw * (index + 1) as f64;
            let color = colors[index % colors.len()];

            for id in &allele.path {
                let Some(pos) = self.state.layout.get(*id) else {
                    log::trace!("allele {} references unplaced sequence {id}", allele.name);
                    continue;
                };
                if !self.visible(view, pos, grow) {
                    continue;
                }
                frame.rect(
                    pos.x - grow,
                    pos.y - grow,
                    pos.width + 2.0 * grow,
                    pos.height + 2.0 * grow,
                    lw,
                    color,
                    None,
                );
            }
        }
    }

    /// Draw a join as a horizontal run, a rounded elbow, a vertical run at
    /// the offset column, a second elbow and a final horizontal run. Joins
    /// with little vertical rise are a single straight line.
    pub fn draw_join(&self, frame: &mut Frame<'_>, line: &JoinLine) {
        let r = self.layout_config.path_radius;
        let lw = self.geometry.line_width;
        let (sx, sy, ex, ey) = (line.start_x, line.start_y, line.end_x, line.end_y);
        let color = Rgba::gray(line_shade(ey, ex), JOIN_ALPHA);

        if (ey - sy).abs() < 2.0 * r {
            frame.line(sx, sy, ex, ey, color, lw);
            return;
        }

        let ((lx, ly), (rx, ry)) = if sx > ex || (sx == ex && ey > sy) {
            ((ex, ey), (sx, sy))
        } else {
            ((sx, sy), (ex, ey))
        };
        let mx = lx + line.mid_x_offset;

        frame.line(lx, ly, mx - r, ly, color, lw);
        if ly < ry {
            frame.arc(mx - r, ly + r, r, -FRAC_PI_2, 0.0, false, lw, color);
            frame.line(mx, ly + r, mx, ry - r, color, lw);
            frame.arc(mx + r, ry - r, r, FRAC_PI_2, PI, false, lw, color);
        } else {
            frame.arc(mx - r, ly - r, r, FRAC_PI_2, 0.0, true, lw, color);
            frame.line(mx, ly - r, mx, ry + r, color, lw);
            frame.arc(mx + r, ry + r, r, -FRAC_PI_2, PI, true, lw, color);
        }
        frame.line(mx + r, ry, rx, ry, color, lw);
    }

    /// Tile text: a small header line followed by the sequence lines, with
    /// no-call bases overlaid in the no-call colour.
    pub fn draw_text(&self, frame: &mut Frame<'_>, tile: &TileText, x: f64, y: f64) {
        let font = self.geometry.font_size;
        let anchor = TextAnchor::default();

        for (i, line) in tile.display_lines().enumerate() {
            let size = if i == 0 { 0.7 * font } else { 1.4 * font };
            let line_y = y + i as f64 * 1.1 * font;
            frame.text(line, x, line_y, self.style.font_color, size, anchor);

            if i > 0
                && let Some(mask) = no_call_mask(line)
            {
                frame.text(&mask, x, line_y, self.style.no_call_color, size, anchor);
            }
        }
    }
}

/// Count components laid out from another tile path than the locus's own.
/// An empty locus path matches everything.
fn foreign_path_count(layout: &Layout, locus: &LocusConfig) -> usize {
    if locus.path.is_empty() {
        return 0;
    }
    let Ok(path) = u32::from_str_radix(&locus.path, 16) else {
        log::warn!("locus {} has a non-hex path '{}'", locus.name, locus.path);
        return 0;
    };

    let foreign = layout.positions.values().filter(|p| p.path != path).count();
    if foreign > 0 {
        log::warn!(
            "locus {}: {foreign} sequences are not on path {}",
            locus.name,
            locus.path
        );
    }
    foreign
}

/// Grey level in `[40, 60)` derived from two join coordinates, so that
/// neighbouring joins get slightly different shades.
pub fn line_shade(a: f64, b: f64) -> u8 {
    let t = (a - b).abs() % 257.0 / 257.0;
    (20.0 * t + 40.0).floor() as u8
}
