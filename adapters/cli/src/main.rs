#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Command-line adapter that runs tower platformer levels headlessly.

mod ascii;
mod input;
mod level_transfer;

use std::{fs, path::PathBuf};

use anyhow::{bail, Context, Result};
use clap::{Args, Parser, Subcommand};
use tower_platformer_core::{Event, GameState};
use tower_platformer_rendering::{Color, Flow, Presentation, Projector, RenderingBackend, Scene};
use tower_platformer_system_game_loop::Game;
use tower_platformer_world::{query, LevelDescription, Tuning};
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

use crate::{ascii::AsciiBackend, input::InputSource};

#[derive(Debug, Parser)]
#[command(name = "tower-platformer", about = "Headless tower platformer simulation")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Runs a level for a number of frames and prints a summary.
    Run(RunArgs),
    /// Loads and validates a level without running it.
    Validate(LevelArgs),
    /// Prints the single-line level code for a level file.
    Encode(LevelArgs),
    /// Expands a level code back into level JSON.
    Decode {
        /// Level code produced by `encode`.
        code: String,
    },
}

#[derive(Debug, Args)]
struct LevelArgs {
    /// Path to a level JSON file in structured or map form.
    #[arg(value_name = "LEVEL", required_unless_present = "code")]
    level: Option<PathBuf>,
    /// Level code to load instead of a file.
    #[arg(long, conflicts_with = "level")]
    code: Option<String>,
}

#[derive(Debug, Args)]
struct RunArgs {
    #[command(flatten)]
    level: LevelArgs,
    /// TOML file overriding the default tuning.
    #[arg(long, value_name = "FILE")]
    tuning: Option<PathBuf>,
    /// Number of frames to simulate.
    #[arg(long, default_value_t = 600)]
    frames: u32,
    /// JSON input script; idles once exhausted.
    #[arg(long, value_name = "FILE", conflicts_with = "seed")]
    script: Option<PathBuf>,
    /// Seed for reproducible random input.
    #[arg(long, default_value_t = 0)]
    seed: u64,
    /// Draw every N-th frame as text.
    #[arg(long, value_name = "N")]
    draw_every: Option<u32>,
    /// Print every simulation event as a JSON line.
    #[arg(long)]
    events: bool,
}

/// Entry point for the tower platformer command-line interface.
fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    match cli.command {
        Commands::Run(args) => run(args),
        Commands::Validate(args) => {
            let level = load_level(&args)?;
            println!(
                "level '{}' is valid: {}x{} tiles, {} monsters",
                level.name,
                level.columns,
                level.rows,
                level.monsters.len()
            );
            Ok(())
        }
        Commands::Encode(args) => {
            let level = load_level(&args)?;
            println!("{}", level_transfer::encode(&level)?);
            Ok(())
        }
        Commands::Decode { code } => {
            let level = level_transfer::decode(&code).context("failed to decode level code")?;
            println!("{}", level.to_json()?);
            Ok(())
        }
    }
}

fn load_level(args: &LevelArgs) -> Result<LevelDescription> {
    match (&args.level, &args.code) {
        (_, Some(code)) => Ok(level_transfer::decode(code).context("failed to decode level code")?),
        (Some(path), None) => {
            let source = fs::read_to_string(path)
                .with_context(|| format!("failed to read level {}", path.display()))?;
            LevelDescription::from_json(&source)
                .with_context(|| format!("failed to load level {}", path.display()))
        }
        (None, None) => bail!("either a level file or --code is required"),
    }
}

fn load_tuning(path: Option<&PathBuf>) -> Result<Tuning> {
    let Some(path) = path else {
        return Ok(Tuning::default());
    };
    let source = fs::read_to_string(path)
        .with_context(|| format!("failed to read tuning {}", path.display()))?;
    Tuning::from_toml_str(&source).with_context(|| format!("invalid tuning {}", path.display()))
}

fn run(args: RunArgs) -> Result<()> {
    let level = load_level(&args.level)?;
    let tuning = load_tuning(args.tuning.as_ref())?;
    let frame_time = tuning.tick_duration();
    let projector = Projector::new(tuning.fps)?;

    let input = match &args.script {
        Some(path) => {
            let source = fs::read_to_string(path)
                .with_context(|| format!("failed to read script {}", path.display()))?;
            InputSource::scripted(&source)
                .with_context(|| format!("invalid script {}", path.display()))?
        }
        None => InputSource::random(args.seed),
    };

    let mut game = Game::new(tuning)?;
    game.load(&level).context("level failed to load")?;
    game.notify_assets_ready();
    info!(level = %level.name, frames = args.frames, "starting headless run");

    let backend = AsciiBackend::new(
        std::io::stdout().lock(),
        input,
        frame_time,
        args.frames,
        args.draw_every,
    );
    let title = match game.world() {
        Some(world) => format!("{} ({})", query::welcome_banner(world), level.name),
        None => level.name.clone(),
    };
    let presentation = Presentation::new(
        title,
        Color::from_rgb_u8(0, 0, 0),
        Scene::default(),
    );

    let mut events: Vec<Event> = Vec::new();
    let mut ticks: u64 = 0;
    backend.run(presentation, |elapsed, frame, scene| {
        if frame.pause_toggle {
            match game.state() {
                GameState::Paused => game.resume(),
                _ => game.pause(),
            }
        }
        ticks += u64::from(game.advance(elapsed, &frame.input));
        events.extend(game.drain_events());

        if let (Some(world), Some(snapshot)) = (game.world(), game.frame()) {
            *scene = projector.project(query::tower(world), snapshot);
        }
        if game.state() == GameState::GameOver {
            Flow::Exit
        } else {
            Flow::Continue
        }
    })?;
    debug!(ticks, events = events.len(), "headless run finished");

    if args.events {
        for event in &events {
            println!("{}", serde_json::to_string(event)?);
        }
    }

    let reason = events.iter().find_map(|event| match event {
        Event::GameOver { reason } => Some(*reason),
        _ => None,
    });
    if let Some(snapshot) = game.frame() {
        println!(
            "ticks: {} | state: {:?} | score: {} | coins: {} | coins left: {}",
            snapshot.tick,
            snapshot.game_state,
            snapshot.score,
            snapshot.coins,
            snapshot.coins_remaining
        );
    }
    if let Some(reason) = reason {
        println!("game over: {reason:?}");
    }
    Ok(())
}
