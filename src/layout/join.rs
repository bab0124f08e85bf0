use std::collections::BTreeMap;

use crate::config::LayoutConfig;
use crate::error::GraphError;
use crate::layout::ComponentPosition;
use crate::store::{GraphJoinRow, SequenceId};

/// Geometry of one join edge, running left to right between two rectangles.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct JoinLine {
    pub start_x: f64,
    pub start_y: f64,
    pub end_x: f64,
    pub end_y: f64,
    /// x of the vertical run, relative to the leftmost endpoint.
    pub mid_x_offset: f64,
}

impl JoinLine {
    /// Line from the right edge of `a` to the left edge of `b`.
    pub fn between(a: &ComponentPosition, b: &ComponentPosition, dx: f64) -> Self {
        Self {
            start_x: a.right(),
            start_y: a.center_y(),
            end_x: b.x,
            end_y: b.center_y(),
            mid_x_offset: (b.x - a.right()) + dx,
        }
    }

    /// Bounding box `(min_x, min_y, max_x, max_y)` of the drawn curve,
    /// including the vertical run and its elbows of the given radius.
    pub fn bounds(&self, radius: f64) -> (f64, f64, f64, f64) {
        let left = self.start_x.min(self.end_x);
        let mid = left + self.mid_x_offset;
        (
            left.min(mid - radius),
            self.start_y.min(self.end_y),
            self.start_x.max(self.end_x).max(mid + radius),
            self.start_y.max(self.end_y),
        )
    }
}

/// Join lines that could be placed, plus the rows that could not.
#[derive(Debug, Default)]
pub struct ResolvedJoins {
    pub lines: Vec<JoinLine>,
    pub dropped: Vec<GraphError>,
}

fn lookup<'a>(
    positions: &'a BTreeMap<SequenceId, ComponentPosition>,
    id: SequenceId,
) -> Result<&'a ComponentPosition, GraphError> {
    positions
        .get(&id)
        .ok_or_else(|| GraphError::lookup_miss("sequence position", id))
}

/// Horizontal offset of a join's vertical run. Side 2's fan-out hint takes
/// precedence over side 1's.
fn fan_offset(side1: &ComponentPosition, side2: &ComponentPosition, config: &LayoutConfig) -> f64 {
    let fan = side2.fan_out.or(side1.fan_out).unwrap_or(0);
    config.join_base_offset - f64::from(fan) * config.join_fan_spacing
}

/// Turn join rows into lines between laid-out components.
///
/// Lines always run from the lower step to the higher one. Within a step a
/// join leaves from side 1 when side 1 is a tag, otherwise from side 2.
/// Rows referencing an unplaced sequence are logged and dropped.
pub fn resolve_joins(
    rows: &[GraphJoinRow],
    positions: &BTreeMap<SequenceId, ComponentPosition>,
    config: &LayoutConfig,
) -> ResolvedJoins {
    let mut resolved = ResolvedJoins::default();

    for row in rows {
        let sides = lookup(positions, row.side1_sequence_id)
            .and_then(|p1| Ok((p1, lookup(positions, row.side2_sequence_id)?)));
        let (p1, p2) = match sides {
            Ok(sides) => sides,
            Err(e) => {
                log::warn!("dropping join {}: {e}", row.id);
                resolved.dropped.push(e);
                continue;
            }
        };

        let dx = fan_offset(p1, p2, config);
        let side1_first = match p1.step.cmp(&p2.step) {
            std::cmp::Ordering::Less => true,
            std::cmp::Ordering::Greater => false,
            std::cmp::Ordering::Equal => p1.kind.is_tag(),
        };
        let line = if side1_first {
            JoinLine::between(p1, p2, dx)
        } else {
            JoinLine::between(p2, p1, dx)
        };
        resolved.lines.push(line);
    }

    log::debug!(
        "resolved {} joins, dropped {}",
        resolved.lines.len(),
        resolved.dropped.len()
    );
    resolved
}
