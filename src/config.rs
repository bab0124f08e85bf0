//! Viewer configuration.
//!
//! Loci, sequence text sources and drawing parameters are read from a YAML
//! file; every section except `loci` is optional and falls back to defaults.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::render::{GridMode, Rgba};

/// Main configuration structure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ViewerConfig {
    /// Loci that can be selected, each backed by its own table directory.
    pub loci: Vec<LocusConfig>,

    /// FASTA files holding tile sequence text.
    #[serde(default)]
    pub sequence_text: Vec<PathBuf>,

    /// Locus shown at startup (first locus when absent).
    #[serde(default)]
    pub default_locus: Option<String>,

    #[serde(default)]
    pub layout: LayoutConfig,

    #[serde(default)]
    pub style: StyleConfig,

    #[serde(default)]
    pub view: ViewConfig,
}

/// One selectable locus.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LocusConfig {
    /// Display name, e.g. `BRCA1`.
    pub name: String,

    /// Directory with the locus tables as CSV files.
    #[serde(default)]
    pub store: PathBuf,

    /// Step drawn at x = 0.
    #[serde(default)]
    pub shift_step: u64,

    /// Tile path identifier (hex), e.g. `247`.
    #[serde(default)]
    pub path: String,
}

impl LocusConfig {
    pub fn new(name: impl Into<String>, shift_step: u64, path: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            store: PathBuf::new(),
            shift_step,
            path: path.into(),
        }
    }
}

/// Geometry parameters of the layout engine, in world units.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LayoutConfig {
    pub font_size: f64,
    pub line_width: f64,
    /// Characters per wrapped line of tile text.
    pub fold_size: u64,
    /// Width, in characters, reserved for the edge column on each side.
    pub edge_col_width: f64,
    /// Width, in characters, of the tag column.
    pub tag_name_len: f64,
    /// Extra width given to seed tiles.
    pub seed_margin: f64,
    /// Radius of the elbows of join curves.
    pub path_radius: f64,
    /// Base horizontal offset of a join's vertical segment.
    pub join_base_offset: f64,
    /// Additional offset per unit of fan-out.
    pub join_fan_spacing: f64,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            font_size: 15.0,
            line_width: 20.0,
            fold_size: 50,
            edge_col_width: 30.0,
            tag_name_len: 24.0,
            seed_margin: 40.0,
            path_radius: 50.0,
            join_base_offset: -200.0,
            join_fan_spacing: 50.0,
        }
    }
}

/// Colours and detail thresholds used when drawing the graph.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StyleConfig {
    pub tag_color: Rgba,
    pub body_color: Rgba,
    pub font_color: Rgba,
    pub no_call_color: Rgba,
    /// One colour per allele pass; passes beyond the list wrap around.
    pub allele_colors: Vec<Rgba>,
    /// Zoom above which tile text is drawn.
    pub sequence_zoom_detail: f64,
}

impl Default for StyleConfig {
    fn default() -> Self {
        Self {
            tag_color: Rgba::new(185, 114, 229, 0.5),
            body_color: Rgba::new(0, 0, 128, 0.5),
            font_color: Rgba::new(128, 128, 128, 0.5),
            no_call_color: Rgba::new(255, 0, 0, 0.5),
            allele_colors: vec![Rgba::new(0, 150, 250, 0.8), Rgba::new(100, 180, 230, 0.8)],
            sequence_zoom_detail: 0.13,
        }
    }
}

/// Initial viewport and navigation parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ViewConfig {
    pub zoom: f64,
    /// Multiplicative zoom per wheel tick.
    pub zoom_factor: f64,
    pub min_zoom: f64,
    pub max_zoom: f64,
    pub grid: GridMode,
    /// World spacing of the finest grid.
    pub grid_spacing: f64,
}

impl Default for ViewConfig {
    fn default() -> Self {
        Self {
            zoom: 0.1,
            zoom_factor: 1.1,
            min_zoom: 0.001,
            max_zoom: 20.0,
            grid: GridMode::Points,
            grid_spacing: 50.0,
        }
    }
}

impl ViewerConfig {
    /// Build a configuration around the given loci with default settings.
    pub fn with_loci(loci: Vec<LocusConfig>) -> Self {
        Self {
            loci,
            sequence_text: Vec::new(),
            default_locus: None,
            layout: LayoutConfig::default(),
            style: StyleConfig::default(),
            view: ViewConfig::default(),
        }
    }

    /// Load configuration from YAML file.
    ///
    /// Relative store and sequence paths are resolved against the directory
    /// holding the configuration file.
    pub fn from_yaml<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let mut config: ViewerConfig = serde_yaml::from_str(&content)
            .with_context(|| format!("Failed to parse YAML config: {}", path.display()))?;

        if let Some(base) = path.parent() {
            config.resolve_paths(base);
        }
        config.validate()?;
        Ok(config)
    }

    fn resolve_paths(&mut self, base: &Path) {
        for locus in &mut self.loci {
            if locus.store.is_relative() {
                locus.store = base.join(&locus.store);
            }
        }
        for text in &mut self.sequence_text {
            if text.is_relative() {
                *text = base.join(&*text);
            }
        }
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        if self.loci.is_empty() {
            anyhow::bail!("No loci defined in config");
        }

        let mut seen = std::collections::HashSet::new();
        for locus in &self.loci {
            if !seen.insert(locus.name.as_str()) {
                anyhow::bail!("Duplicate locus name: {}", locus.name);
            }
            if !locus.store.is_dir() {
                anyhow::bail!(
                    "Table directory for locus {} not found: {}",
                    locus.name,
                    locus.store.display()
                );
            }
        }

        if let Some(name) = &self.default_locus
            && self.locus(name).is_none()
        {
            anyhow::bail!("Default locus {name} is not defined");
        }

        if self.layout.fold_size == 0 {
            anyhow::bail!("layout.fold_size must be positive");
        }
        self.view.validate()
    }

    pub fn locus(&self, name: &str) -> Option<&LocusConfig> {
        self.loci.iter().find(|l| l.name == name)
    }

    /// Locus to show first.
    pub fn startup_locus(&self) -> Option<&LocusConfig> {
        match &self.default_locus {
            Some(name) => self.locus(name),
            None => self.loci.first(),
        }
    }
}

impl ViewConfig {
    /// Zoom limits must be positive, finite and ordered.
    pub fn validate(&self) -> Result<()> {
        let values = [
            ("zoom", self.zoom),
            ("zoom_factor", self.zoom_factor),
            ("min_zoom", self.min_zoom),
            ("max_zoom", self.max_zoom),
            ("grid_spacing", self.grid_spacing),
        ];
        for (name, value) in values {
            if !value.is_finite() || value <= 0.0 {
                anyhow::bail!("view.{name} must be a positive number, got {value}");
            }
        }
        if self.min_zoom > self.max_zoom {
            anyhow::bail!(
                "view.min_zoom ({}) is greater than view.max_zoom ({})",
                self.min_zoom,
                self.max_zoom
            );
        }
        if self.zoom_factor <= 1.0 {
            anyhow::bail!("view.zoom_factor must be greater than 1");
        }
        Ok(())
    }
}
