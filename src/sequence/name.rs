use std::fmt;
use std::str::FromStr;

use crate::error::GraphError;

/// Offset subtracted from a tag's set-bit count. Tag bit vectors are 24 bits
/// wide, so tag ranks run from -17 to 7 and may interleave with body ranks.
/// Tags and bodies are stacked in separate tracks, so this only orders tags
/// among themselves.
pub const TAG_RANK_OFFSET: i64 = 17;

/// The two kinds of component a sequence can be within a step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ComponentKind {
    /// A short path marker, ranked by the set bits of its no-call bit vector.
    Tag { rank: i64 },
    /// A sequence tile. Tiles spanning more than one step are seed tiles.
    Body { rank: i64, seed_tile_len: u32 },
}

impl ComponentKind {
    /// Sort key within a step.
    pub fn rank(&self) -> i64 {
        match self {
            ComponentKind::Tag { rank } | ComponentKind::Body { rank, .. } => *rank,
        }
    }

    pub fn is_tag(&self) -> bool {
        matches!(self, ComponentKind::Tag { .. })
    }

    /// Number of steps a body tile spans; tags always span one.
    pub fn seed_tile_len(&self) -> u32 {
        match self {
            ComponentKind::Tag { .. } => 1,
            ComponentKind::Body { seed_tile_len, .. } => *seed_tile_len,
        }
    }

    /// Whether this is a body tile drawn in the seed track above the row.
    pub fn is_seed_tile(&self) -> bool {
        matches!(self, ComponentKind::Body { seed_tile_len, .. } if *seed_tile_len > 1)
    }
}

impl fmt::Display for ComponentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ComponentKind::Tag { .. } => write!(f, "t"),
            ComponentKind::Body { .. } => write!(f, "r"),
        }
    }
}

/// A parsed tile-graph sequence name: `<prefix>.<path>.<step>.<rank or tag>`.
///
/// Path and step are hexadecimal. The last field is either `t<bits>` for a
/// tag or `r<rank>[+<seed tile length>]` for a body tile, all hexadecimal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SequenceName {
    pub prefix: String,
    pub path: u32,
    pub step: u64,
    pub kind: ComponentKind,
    /// Join fan-out hint taken from the `+N` suffix, when the name has one.
    pub fan_out: Option<u32>,
}

fn parse_hex(name: &str, field: &str, value: &str) -> Result<u64, GraphError> {
    if value.is_empty() {
        return Err(GraphError::parse_failure(name, format!("empty {field}")));
    }
    u64::from_str_radix(value, 16)
        .map_err(|_| GraphError::parse_failure(name, format!("invalid hex {field} '{value}'")))
}

fn narrow<T: TryFrom<u64>>(name: &str, field: &str, value: u64) -> Result<T, GraphError> {
    T::try_from(value)
        .map_err(|_| GraphError::parse_failure(name, format!("{field} {value:#x} out of range")))
}

/// Count the set bits of every hex digit in a tag's bit vector.
fn tag_bit_count(name: &str, bits: &str) -> Result<i64, GraphError> {
    bits.chars().try_fold(0i64, |acc, c| {
        c.to_digit(16)
            .map(|d| acc + i64::from(d.count_ones()))
            .ok_or_else(|| GraphError::parse_failure(name, format!("invalid tag digit '{c}'")))
    })
}

impl SequenceName {
    fn parse_kind(name: &str, token: &str) -> Result<(ComponentKind, Option<u32>), GraphError> {
        if let Some(bits) = token.strip_prefix('t') {
            let rank = tag_bit_count(name, bits)? - TAG_RANK_OFFSET;
            return Ok((ComponentKind::Tag { rank }, None));
        }

        if let Some(body) = token.strip_prefix('r') {
            let (rank_str, seed_str) = match body.split_once('+') {
                Some((rank, seed)) => (rank, Some(seed)),
                None => (body, None),
            };
            let rank: i64 = narrow(name, "rank", parse_hex(name, "rank", rank_str)?)?;
            let seed: Option<u32> = seed_str
                .map(|s| narrow(name, "seed tile length", parse_hex(name, "seed tile length", s)?))
                .transpose()?;
            let kind = ComponentKind::Body {
                rank,
                seed_tile_len: seed.unwrap_or(1),
            };
            return Ok((kind, seed));
        }

        Err(GraphError::parse_failure(
            name,
            format!("unknown component token '{token}'"),
        ))
    }
}

impl FromStr for SequenceName {
    type Err = GraphError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let parts: Vec<&str> = s.split('.').collect();
        if parts.len() < 4 {
            return Err(GraphError::parse_failure(
                s,
                format!("expected 4 dot-separated fields, got {}", parts.len()),
            ));
        }

        let path: u32 = narrow(s, "path", parse_hex(s, "path", parts[1])?)?;
        let step = parse_hex(s, "step", parts[2])?;
        let (kind, fan_out) = Self::parse_kind(s, parts[3])?;

        Ok(Self {
            prefix: parts[0].to_string(),
            path,
            step,
            kind,
            fan_out,
        })
    }
}
