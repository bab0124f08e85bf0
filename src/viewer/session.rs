use std::time::Instant;

use anyhow::{Context, Result};

use crate::config::{LocusConfig, ViewerConfig};
use crate::error::GraphError;
use crate::graph::{LightningGraph, LoadReport};
use crate::render::{Canvas, Painter, Point};
use crate::sequence::SequenceText;
use crate::store::{GraphStore, MemoryStore};
use crate::viewer::controller::Controller;
use crate::viewer::tool::{InputEvent, NavTool};

/// A selectable locus and the store backing it.
struct Locus {
    config: LocusConfig,
    store: Box<dyn GraphStore>,
}

/// Everything one viewer window works on: the viewport, the input
/// controller, the loaded graph, the tile text and the available loci.
pub struct Session {
    painter: Painter,
    controller: Controller,
    graph: LightningGraph,
    texts: SequenceText,
    loci: Vec<Locus>,
    current: Option<String>,
    /// Centre the view once the canvas has a size.
    center_pending: bool,
}

impl Session {
    /// An empty session with no loci registered.
    pub fn new(config: &ViewerConfig, texts: SequenceText) -> Self {
        Self {
            painter: Painter::new(&config.view),
            controller: Controller::new(Box::new(NavTool::new())),
            graph: LightningGraph::new(config.layout.clone(), config.style.clone()),
            texts,
            loci: Vec::new(),
            current: None,
            center_pending: false,
        }
    }

    /// Open every configured locus from its table directory, read the tile
    /// text and show the startup locus.
    pub fn from_config(config: &ViewerConfig) -> Result<Self> {
        let fold_size = usize::try_from(config.layout.fold_size).unwrap_or(usize::MAX);
        let mut texts = SequenceText::new(fold_size);
        for path in &config.sequence_text {
            texts.extend_from_file(path)?;
        }
        log::info!("{} tile sequences available", texts.len());

        let mut session = Self::new(config, texts);
        for locus in &config.loci {
            let store = MemoryStore::from_csv_dir(&locus.store).with_context(|| {
                format!("Failed to open tables for locus {}", locus.name)
            })?;
            session.add_locus(locus.clone(), Box::new(store));
        }

        if let Some(locus) = config.startup_locus() {
            session
                .select_locus(&locus.name)
                .with_context(|| format!("Failed to load locus {}", locus.name))?;
        }
        Ok(session)
    }

    /// Register a locus. A locus with the same name is replaced.
    pub fn add_locus(&mut self, config: LocusConfig, store: Box<dyn GraphStore>) {
        self.loci.retain(|l| l.config.name != config.name);
        self.loci.push(Locus { config, store });
    }

    pub fn locus_names(&self) -> impl Iterator<Item = &str> {
        self.loci.iter().map(|l| l.config.name.as_str())
    }

    pub fn current_locus(&self) -> Option<&str> {
        self.current.as_deref()
    }

    /// Load a locus and show it from the shift step.
    pub fn select_locus(&mut self, name: &str) -> Result<LoadReport, GraphError> {
        let locus = self
            .loci
            .iter()
            .find(|l| l.config.name == name)
            .ok_or_else(|| GraphError::lookup_miss("locus", name))?;

        let report = match self.graph.init(locus.store.as_ref(), &locus.config) {
            Ok(report) => report,
            Err(e) => {
                self.controller
                    .fade_message(format!("failed to load {name}"), Instant::now());
                self.painter.mark_dirty();
                return Err(e);
            }
        };

        self.current = Some(name.to_string());
        self.controller.set_status(name);
        self.controller.fade_message(
            format!("{name}: {} tiles, {} joins", report.components, report.joins),
            Instant::now(),
        );
        self.center_view();
        Ok(report)
    }

    /// Highlight a sample of the current locus.
    pub fn highlight_sample(&mut self, name: &str) -> Result<(), GraphError> {
        let current = self
            .current
            .as_deref()
            .ok_or_else(|| GraphError::lookup_miss("locus", "<none selected>"))?;
        let locus = self
            .loci
            .iter()
            .find(|l| l.config.name == current)
            .ok_or_else(|| GraphError::lookup_miss("locus", current))?;

        self.graph.highlight_sample(locus.store.as_ref(), name)?;
        self.controller.set_status(format!("{current} / {name}"));
        self.painter.mark_dirty();
        Ok(())
    }

    pub fn unhighlight_sample(&mut self) {
        self.graph.unhighlight_sample();
        self.controller
            .set_status(self.current.clone().unwrap_or_default());
        self.painter.mark_dirty();
    }

    /// Put world (0, 0), the shift-step column, in the middle of the canvas.
    /// Before the first resize there is no middle yet, so this waits for one.
    fn center_view(&mut self) {
        let (width, height) = self.painter.size();
        if width > 0.0 && height > 0.0 {
            self.painter.center_on(Point::new(0.0, 0.0));
            self.center_pending = false;
        } else {
            self.center_pending = true;
        }
    }

    pub fn handle(&mut self, event: &InputEvent) {
        self.controller.handle(event, &mut self.painter);
        if self.center_pending && matches!(event, InputEvent::Resize { .. }) {
            self.center_view();
        }
    }

    /// Draw a frame if anything changed. Returns whether one was drawn.
    pub fn tick(&mut self, now: Instant, canvas: &mut dyn Canvas) -> bool {
        let graph = &self.graph;
        let texts = &self.texts;
        self.controller
            .redraw(now, &mut self.painter, canvas, |frame| graph.draw(frame, texts))
    }

    /// Whether the next tick will draw.
    pub fn needs_redraw(&self) -> bool {
        self.painter.is_dirty() || self.controller.is_fading()
    }

    pub fn graph(&self) -> &LightningGraph {
        &self.graph
    }

    pub fn painter(&self) -> &Painter {
        &self.painter
    }

    pub fn controller(&self) -> &Controller {
        &self.controller
    }
}
