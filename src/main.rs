use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};

use lightning_graph::config::{LocusConfig, ViewerConfig};
use lightning_graph::graph::LightningGraph;
use lightning_graph::store::{GraphStore, MemoryStore};
use lightning_graph::viewer::{self, Session};

#[derive(Parser)]
#[command(
    name = "lightning-viewer",
    about = "Interactive viewer for tile-graph (lightning graph) variant paths",
    version
)]
struct Cli {
    /// Log level when RUST_LOG is not set (error, warn, info, debug, trace)
    #[arg(long, default_value = "info", global = true)]
    log_level: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Open the graph viewer window
    View {
        /// Path to the viewer YAML config
        #[arg(short, long)]
        config: PathBuf,

        /// Locus to show first (defaults to the config's default locus)
        #[arg(short, long)]
        locus: Option<String>,
    },

    /// Lay out loci without a window and print a summary
    Layout {
        /// Path to the viewer YAML config
        #[arg(short, long)]
        config: PathBuf,

        /// Only this locus (all loci when omitted)
        #[arg(short, long)]
        locus: Option<String>,
    },

    /// List the samples (call sets) of a locus
    Samples {
        /// Path to the viewer YAML config
        #[arg(short, long)]
        config: PathBuf,

        /// Locus to list (defaults to the config's default locus)
        #[arg(short, long)]
        locus: Option<String>,
    },
}

fn load_config(path: &Path, locus: Option<String>) -> Result<ViewerConfig> {
    let mut config = ViewerConfig::from_yaml(path)?;
    if let Some(name) = locus {
        if config.locus(&name).is_none() {
            anyhow::bail!("locus {name} is not defined in {}", path.display());
        }
        config.default_locus = Some(name);
    }
    Ok(config)
}

fn open_store(locus: &LocusConfig) -> Result<MemoryStore> {
    MemoryStore::from_csv_dir(&locus.store)
        .with_context(|| format!("Failed to open tables for locus {}", locus.name))
}

fn selected_loci<'a>(config: &'a ViewerConfig, only: Option<&str>) -> Vec<&'a LocusConfig> {
    config
        .loci
        .iter()
        .filter(|l| only.is_none_or(|name| l.name == name))
        .collect()
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(&cli.log_level))
        .init();

    match cli.command {
        Commands::View { config, locus } => {
            let config = load_config(&config, locus)?;
            let session = Session::from_config(&config)?;
            log::info!(
                "starting viewer with {} loci",
                session.locus_names().count()
            );
            viewer::run(session)?;
        }

        Commands::Layout { config, locus } => {
            let config = load_config(&config, locus.clone())?;

            println!(
                "{:<12} {:>8} {:>14} {:>8} {:>8} {:>8} {:>8}",
                "Locus", "Tiles", "Steps", "Skipped", "Joins", "Dropped", "Samples"
            );
            println!("{}", "-".repeat(72));
            for locus in selected_loci(&config, locus.as_deref()) {
                let store = open_store(locus)?;
                let mut graph = LightningGraph::new(config.layout.clone(), config.style.clone());
                let report = graph
                    .init(&store, locus)
                    .with_context(|| format!("Failed to lay out locus {}", locus.name))?;
                let steps = graph
                    .step_range()
                    .map(|(min, max)| format!("{min:x}..{max:x}"))
                    .unwrap_or_else(|| "-".to_string());
                println!(
                    "{:<12} {:>8} {:>14} {:>8} {:>8} {:>8} {:>8}",
                    locus.name,
                    report.components,
                    steps,
                    report.skipped_names,
                    report.joins,
                    report.dropped_joins,
                    report.call_sets
                );
            }
        }

        Commands::Samples { config, locus } => {
            let config = load_config(&config, locus)?;
            let locus = config
                .startup_locus()
                .context("no locus selected")?;
            let store = open_store(locus)?;
            let call_sets = store.call_sets().unwrap_or_default();

            println!("{} samples in locus {}", call_sets.len(), locus.name);
            for call_set in &call_sets {
                let alleles = store.allele_ids(call_set.id).map_or(0, |ids| ids.len());
                println!("  {:<20} {} alleles", call_set.name, alleles);
            }
        }
    }

    Ok(())
}
