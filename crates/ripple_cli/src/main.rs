//! Ripple CLI
//!
//! Replays successive virtual-tree frames against the in-memory host and
//! reports what the renderer did to it.

mod frames;

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use ripple_core::{Renderer, RendererConfig};
use ripple_host::{MemoryHost, MutationStats};
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

use crate::frames::{FrameBuilder, Replay};

#[derive(Parser)]
#[command(name = "ripple")]
#[command(about = "Ripple renderer tools")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable debug logging
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Render each frame of a JSON replay file in turn
    Replay {
        /// Replay file (array of frames, or { container, frames })
        frames: PathBuf,

        /// Renderer configuration (ripple.toml)
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Print mutation counts per frame and in total
        #[arg(long)]
        stats: bool,
    },

    /// Validate a configuration file
    CheckConfig {
        /// Path to ripple.toml
        path: PathBuf,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let level = if cli.verbose {
        tracing::Level::DEBUG
    } else {
        tracing::Level::INFO
    };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive(level.into()))
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Commands::Replay {
            frames,
            config,
            stats,
        } => cmd_replay(&frames, config.as_deref(), stats),
        Commands::CheckConfig { path } => cmd_check_config(&path),
    }
}

fn load_config(path: Option<&Path>) -> Result<RendererConfig> {
    match path {
        Some(path) => RendererConfig::load(path)
            .with_context(|| format!("Invalid renderer config {}", path.display())),
        None => Ok(RendererConfig::default()),
    }
}

fn cmd_replay(path: &Path, config: Option<&Path>, show_stats: bool) -> Result<()> {
    let config = load_config(config)?;
    let replay = Replay::load(path)?;
    debug!(frames = replay.frames.len(), container = %replay.container, "loaded replay");

    let mut host = MemoryHost::new();
    let container = host.create_container(&replay.container);
    let mut renderer = Renderer::with_config(host, config);
    let mut builder = FrameBuilder::new();
    let mut total = MutationStats::default();

    for (index, frame) in replay.frames.iter().enumerate() {
        let vnode = frame
            .as_ref()
            .map(|spec| builder.build(spec))
            .transpose()
            .with_context(|| format!("Frame {index} is malformed"))?;

        renderer.render(vnode, &container);

        let mutations = renderer.host_mut().take_mutations();
        let freed = renderer.host_mut().sweep();
        debug!(frame = index, freed, "swept detached nodes");
        let stats = MutationStats::from_mutations(&mutations);
        total += stats;

        println!("== frame {index} ==");
        for mutation in &mutations {
            println!("  {mutation}");
        }
        println!("{}", renderer.host().to_markup(container));
        if show_stats {
            print_stats("frame", &stats);
        }
    }

    if show_stats {
        println!("== total ==");
        print_stats("total", &total);
    }
    info!(frames = replay.frames.len(), mutations = total.total(), "replay finished");
    Ok(())
}

fn print_stats(label: &str, stats: &MutationStats) {
    println!(
        "  {label}: {} created, {} inserted, {} moved, {} removed, {} props, {} text ({} total)",
        stats.created,
        stats.inserted,
        stats.moved,
        stats.removed,
        stats.prop_patches,
        stats.text_writes,
        stats.total()
    );
}

fn cmd_check_config(path: &Path) -> Result<()> {
    let config = load_config(Some(path))?;
    println!("{} is valid", path.display());
    println!("{}", toml::to_string_pretty(&config)?);
    Ok(())
}
