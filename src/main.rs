//! Deckfield - headless table runner
//!
//! Loads a scene, runs the session for a fixed number of frames and prints
//! the final table as JSON (or a short text summary).

use clap::{Parser, ValueEnum};

use deckfield::core::error::Result;
use deckfield::simulation::{SceneFile, SessionSnapshot};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
enum OutputFormat {
    /// Full snapshot as JSON
    #[default]
    Json,
    /// One line per stack and agent
    Text,
}

/// Headless Deckfield runner
#[derive(Parser, Debug)]
#[command(name = "deckfield")]
#[command(about = "Run a card-table scene headless and dump the final state")]
struct Args {
    /// Scene file (TOML)
    #[arg(long, default_value = "scenes/demo.toml")]
    scene: String,

    /// Frames to simulate
    #[arg(long, default_value_t = 600)]
    ticks: u32,

    /// Seconds per frame
    #[arg(long, default_value_t = 1.0 / 60.0)]
    dt: f32,

    /// Override the scene's random seed
    #[arg(long)]
    seed: Option<u64>,

    /// Output format
    #[arg(long, value_enum, default_value_t = OutputFormat::Json)]
    format: OutputFormat,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter("deckfield=debug")
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();

    let mut scene = SceneFile::load(&args.scene)?;
    if let Some(seed) = args.seed {
        scene.config.seed = seed;
    }
    tracing::info!(scene = %args.scene, seed = scene.config.seed, "starting run");

    let mut session = scene.into_session()?;
    for _ in 0..args.ticks {
        session.tick(args.dt);
    }
    let events = session.drain_events();
    tracing::info!(events = events.len(), time = session.now(), "run finished");

    let snapshot = SessionSnapshot::capture(&session);
    match args.format {
        OutputFormat::Text => {
            println!("t = {:.2}s", snapshot.time);
            for stack in &snapshot.stacks {
                println!(
                    "  {} x{} at ({:.2}, {:.2}){}",
                    stack.key,
                    stack.members,
                    stack.position.x,
                    stack.position.y,
                    stack
                        .zone
                        .as_ref()
                        .map(|z| format!(" in {z}"))
                        .unwrap_or_default()
                );
            }
            for agent in &snapshot.agents {
                println!("  agent {} {:?}", agent.entity, agent.state);
            }
        }
        OutputFormat::Json => println!("{}", snapshot.to_json()?),
    }
    Ok(())
}
