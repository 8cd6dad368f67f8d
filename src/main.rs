//! Jungle-chess command line.
//!
//! ## Usage
//!
//! - `jungle-chess` - Show a demo game
//! - `jungle-chess play` - Start the text protocol on stdin/stdout
//! - `jungle-chess demo` - Run the demo game

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing::info;
use tracing_subscriber::EnvFilter;

use jungle_chess::board::Coord;
use jungle_chess::constants::{DEFAULT_LOG_PATH, DEFAULT_UNDO_ALLOWANCE};
use jungle_chess::movelog::NameStyle;
use jungle_chess::protocol::{Engine, EngineOptions};
use jungle_chess::session::SessionConfig;

/// Jungle-chess: rules engine for the animal chess game
#[derive(Parser)]
#[command(name = "jungle-chess")]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Move-log file
    #[arg(long, global = true, default_value = DEFAULT_LOG_PATH)]
    log: PathBuf,

    /// Do not write a move log
    #[arg(long, global = true)]
    no_log: bool,

    /// Name table used in the move log
    #[arg(long, global = true, value_enum, default_value_t = NameStyle::English)]
    names: NameStyle,

    /// Undos each player may take per game
    #[arg(long, global = true, default_value_t = DEFAULT_UNDO_ALLOWANCE)]
    undo_allowance: u32,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the text protocol on stdin/stdout
    Play,
    /// Run a short scripted game
    Demo,
}

/// A short opening in which the Blue rat takes the Red elephant, followed by
/// an out-of-turn move that the engine turns down.
const DEMO_MOVES: &[((usize, usize), (usize, usize))] = &[
    ((6, 6), (5, 6)),
    ((2, 0), (3, 0)),
    ((5, 6), (4, 6)),
    ((3, 0), (4, 0)),
    ((6, 0), (6, 1)),
    ((4, 0), (5, 0)),
    ((6, 1), (6, 0)),
    ((5, 0), (6, 0)),
    ((6, 0), (5, 0)),
];

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let options = EngineOptions {
        config: SessionConfig {
            undo_allowance: cli.undo_allowance,
        },
        log_path: (!cli.no_log).then_some(cli.log),
        names: cli.names,
    };

    match cli.command {
        Some(Commands::Play) => {
            info!("starting text protocol");
            let mut engine = Engine::new(options)?;
            engine.run()
        }
        Some(Commands::Demo) | None => run_demo(options),
    }
}

fn run_demo(options: EngineOptions) -> Result<()> {
    println!("Jungle-chess demo\n");
    let mut engine = Engine::new(options)?;
    println!("{}", engine.session().board());

    for &((r1, c1), (r2, c2)) in DEMO_MOVES {
        let (from, to) = (Coord::new(r1, c1), Coord::new(r2, c2));
        let args = [r1, c1, r2, c2].map(|n| n.to_string());
        let args: Vec<&str> = args.iter().map(String::as_str).collect();
        let (success, response) = engine.execute("play", &args);
        if success {
            println!("{response}");
        } else {
            println!("{from} -> {to} rejected: {response}");
        }
    }

    println!("\n{}", engine.session().board());
    println!(
        "To move: {:?}, winner: {}",
        engine.session().active_player(),
        engine
            .session()
            .winner()
            .map_or("none".to_string(), |w| format!("{w:?}"))
    );
    Ok(())
}
