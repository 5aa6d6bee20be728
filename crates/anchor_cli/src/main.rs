//! Anchor CLI
//!
//! Play scroll-linked anchor scenes against a headless page.

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use tracing::info;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

mod scene;
mod simulate;

use scene::Scene;
use simulate::Simulation;

#[derive(Parser)]
#[command(name = "anchor")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Scroll-linked anchor simulator", long_about = None)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Play a scene's script and print every focus/blur
    Simulate {
        /// Scene file (TOML)
        scene: PathBuf,

        /// Frames per second while waiting (1-1000)
        #[arg(long, default_value = "60", value_parser = clap::value_parser!(u32).range(1..=1000))]
        fps: u32,
    },

    /// Validate a scene file
    Check {
        /// Scene file (TOML)
        scene: PathBuf,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .init();

    match cli.command {
        Commands::Simulate { scene, fps } => cmd_simulate(&scene, fps),
        Commands::Check { scene } => cmd_check(&scene),
    }
}

fn cmd_simulate(path: &Path, fps: u32) -> Result<()> {
    let scene = Scene::load(path)?;
    info!("Simulating {} at {} fps", path.display(), fps);

    let report = Simulation::new(scene, fps)?.run()?;

    for transition in &report.transitions {
        println!(
            "{:>6}ms  {:<5}  #{}",
            transition.at_ms, transition.kind, transition.to
        );
    }
    println!();
    for (target, top) in &report.scroll {
        println!("scroll {}: {}", target, top);
    }
    if report.active.is_empty() {
        println!("active: (none)");
    } else {
        let active: Vec<String> = report.active.iter().map(|to| format!("#{}", to)).collect();
        println!("active: {}", active.join(", "));
    }

    Ok(())
}

fn cmd_check(path: &Path) -> Result<()> {
    let scene = Scene::load(path)?;
    let problems = scene.problems();

    if !problems.is_empty() {
        for problem in &problems {
            eprintln!("error: {}", problem);
        }
        anyhow::bail!("{} has {} problem(s)", path.display(), problems.len());
    }

    println!(
        "{}: ok ({} section(s), {} link(s), {} step(s))",
        path.display(),
        scene.sections.len(),
        scene.links.len(),
        scene.script.len()
    );
    Ok(())
}
