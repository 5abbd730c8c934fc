#![deny(clippy::all, clippy::pedantic)]
//! # Ragdoll Runtime
//!
//! Steps a ragdoll scene with its balance and upright controllers and logs
//! how well it stays on its feet. With `--watch`, edits to the scene file
//! retune the running controllers without restarting.

mod app;
mod watcher;

use anyhow::Result;
use clap::Parser;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

/// Headless ragdoll simulation with IK controllers.
#[derive(Parser, Debug)]
#[command(name = "ragdoll_main", version, long_about = None)]
pub struct Cli {
    /// Scene description (JSON). Defaults to a built-in three-link ragdoll.
    #[arg(long)]
    pub scene: Option<PathBuf>,

    /// Number of physics steps to run.
    #[arg(long, default_value_t = 600)]
    pub steps: usize,

    /// Physics time step in seconds, overriding the scene's.
    #[arg(long)]
    pub dt: Option<f32>,

    /// Retune controllers when the scene file changes.
    #[arg(long, requires = "scene")]
    pub watch: bool,

    /// Write the controllers' state as JSON on exit.
    #[arg(long, value_name = "PATH")]
    pub save_state: Option<PathBuf>,

    /// Switch the ragdoll to kinematic mode, and its controllers off, at this step.
    #[arg(long, value_name = "STEP")]
    pub kinematic_after: Option<usize>,
}

fn main() -> Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let cli = Cli::parse();
    app::run(&cli)
}
