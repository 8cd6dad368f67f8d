//! Line-oriented text protocol for driving a game.
//!
//! Modelled on GTP: each request is one line with an optional numeric id,
//! and each response is `=[id] text` on success or `?[id] text` on failure,
//! followed by a blank line. Coordinates are `row col` pairs.
//!
//! ## Supported Commands
//!
//! - `name`, `version`, `protocol_version`
//! - `list_commands`, `known_command <cmd>`
//! - `quit`
//! - `new` - start a fresh game with the standard layout
//! - `show` - print the board
//! - `turn` - player to move
//! - `moves <r> <c>` - legal destinations of the piece at (r,c)
//! - `play <r1> <c1> <r2> <c2>` - move a piece for the player to move
//! - `undo` - take back the last move
//! - `winner` - winner, or `none`
//! - `save <path>` / `load <path>` - position as JSON
//!
//! ## Example
//!
//! ```ignore
//! use jungle_chess::protocol::{Engine, EngineOptions};
//! let mut engine = Engine::new(EngineOptions::default())?;
//! engine.run()?;
//! ```

use std::fs;
use std::io::{self, BufRead, Write};
use std::path::PathBuf;

use anyhow::{Context, Result};
use tracing::{debug, instrument};

use crate::board::Coord;
use crate::movelog::{MoveLog, NameStyle};
use crate::session::{GameSession, SessionConfig, Snapshot};

/// The list of known commands.
const KNOWN_COMMANDS: &[&str] = &[
    "known_command",
    "list_commands",
    "load",
    "moves",
    "name",
    "new",
    "play",
    "protocol_version",
    "quit",
    "save",
    "show",
    "turn",
    "undo",
    "version",
    "winner",
];

/// How each new game is set up.
#[derive(Clone, Debug, Default)]
pub struct EngineOptions {
    pub config: SessionConfig,
    /// Move-log file; `None` disables the log.
    pub log_path: Option<PathBuf>,
    pub names: NameStyle,
}

/// Protocol engine state.
#[derive(Debug)]
pub struct Engine {
    session: GameSession,
    options: EngineOptions,
}

impl Engine {
    /// Start the first game. The log file, if any, is truncated.
    pub fn new(options: EngineOptions) -> Result<Self> {
        let session = Self::open_session(&options, false)?;
        Ok(Self { session, options })
    }

    fn open_session(options: &EngineOptions, append: bool) -> Result<GameSession> {
        let session = GameSession::with_config(options.config);
        let Some(path) = &options.log_path else {
            return Ok(session);
        };
        let opened = if append {
            MoveLog::append(path, options.names)
        } else {
            MoveLog::create(path, options.names)
        };
        let log = opened.with_context(|| format!("opening move log {}", path.display()))?;
        Ok(session.with_log(log))
    }

    pub fn session(&self) -> &GameSession {
        &self.session
    }

    /// Run the command loop on stdin/stdout.
    pub fn run(&mut self) -> Result<()> {
        let stdin = io::stdin();
        let stdout = io::stdout();
        self.run_with(stdin.lock(), stdout.lock())
    }

    /// Run the command loop until `quit` or end of input.
    pub fn run_with<R: BufRead, W: Write>(&mut self, input: R, mut output: W) -> Result<()> {
        for line in input.lines() {
            let line = line.context("reading command")?;

            // Skip empty lines and comments
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }

            let (id, command_line) = Self::parse_id(line);
            let parts: Vec<&str> = command_line.split_whitespace().collect();
            let Some((command, args)) = parts.split_first() else {
                continue;
            };
            let command = command.to_lowercase();

            let (success, message) = self.execute(&command, args);
            let prefix = if success { '=' } else { '?' };
            let id_str = id.map(|i| i.to_string()).unwrap_or_default();

            writeln!(output, "{prefix}{id_str} {message}\n")?;
            output.flush()?;

            if command == "quit" {
                break;
            }
        }
        Ok(())
    }

    /// Parse an optional numeric command id from the beginning of the line.
    fn parse_id(line: &str) -> (Option<u32>, &str) {
        let trimmed = line.trim();
        let end = trimmed
            .find(|c: char| !c.is_ascii_digit())
            .unwrap_or(trimmed.len());
        if end == 0 {
            return (None, trimmed);
        }
        match trimmed[..end].parse::<u32>() {
            Ok(id) => (Some(id), trimmed[end..].trim()),
            Err(_) => (None, trimmed),
        }
    }

    /// Execute one command and return (success, response).
    #[instrument(skip(self))]
    pub fn execute(&mut self, command: &str, args: &[&str]) -> (bool, String) {
        match command {
            "name" => (true, env!("CARGO_PKG_NAME").to_string()),

            "version" => (true, env!("CARGO_PKG_VERSION").to_string()),

            "protocol_version" => (true, "1".to_string()),

            "list_commands" => (true, KNOWN_COMMANDS.join("\n")),

            "known_command" => {
                let Some(name) = args.first() else {
                    return (false, "missing argument".to_string());
                };
                let known = KNOWN_COMMANDS.contains(&name.to_lowercase().as_str());
                (true, known.to_string())
            }

            "quit" => (true, String::new()),

            "new" => match Self::open_session(&self.options, true) {
                Ok(session) => {
                    self.session = session;
                    (true, String::new())
                }
                Err(err) => (false, format!("{err:#}")),
            },

            "show" => (true, format!("\n{}", self.session.board())),

            "turn" => (true, format!("{:?}", self.session.active_player())),

            "winner" => match self.session.winner() {
                Some(player) => (true, format!("{player:?}")),
                None => (true, "none".to_string()),
            },

            "moves" => {
                let from = match parse_coords::<1>(args) {
                    Ok([from]) => from,
                    Err(msg) => return (false, msg),
                };
                let targets: Vec<String> = self
                    .session
                    .legal_destinations(from)
                    .into_iter()
                    .map(|to| to.to_string())
                    .collect();
                (true, targets.join(" "))
            }

            "play" => {
                let (from, to) = match parse_coords::<2>(args) {
                    Ok([from, to]) => (from, to),
                    Err(msg) => return (false, msg),
                };
                match self.session.try_move(from, to) {
                    Ok(record) => match self.session.winner() {
                        Some(winner) => (true, format!("{record}; {winner:?} wins")),
                        None => (true, record.to_string()),
                    },
                    Err(err) => (false, err.to_string()),
                }
            }

            "undo" => match self.session.undo() {
                Ok(player) => (
                    true,
                    format!(
                        "{player:?} to move, {} undo(s) left",
                        self.session.undo_remaining(player)
                    ),
                ),
                Err(err) => (false, err.to_string()),
            },

            "save" => {
                let Some(path) = args.first() else {
                    return (false, "missing argument".to_string());
                };
                match self.save(path) {
                    Ok(()) => (true, String::new()),
                    Err(err) => (false, format!("{err:#}")),
                }
            }

            "load" => {
                let Some(path) = args.first() else {
                    return (false, "missing argument".to_string());
                };
                match self.load(path) {
                    Ok(()) => (true, String::new()),
                    Err(err) => (false, format!("{err:#}")),
                }
            }

            _ => (false, format!("unknown command: {command}")),
        }
    }

    fn save(&self, path: &str) -> Result<()> {
        let json = serde_json::to_string_pretty(&self.session.snapshot())?;
        fs::write(path, json).with_context(|| format!("writing {path}"))?;
        debug!(path, "position saved");
        Ok(())
    }

    fn load(&mut self, path: &str) -> Result<()> {
        let json = fs::read_to_string(path).with_context(|| format!("reading {path}"))?;
        let snapshot: Snapshot = serde_json::from_str(&json).context("parsing position")?;
        self.session.restore(&snapshot)?;
        debug!(path, "position loaded");
        Ok(())
    }
}

/// Parse `N` coordinates from `2 * N` integer arguments.
fn parse_coords<const N: usize>(args: &[&str]) -> Result<[Coord; N], String> {
    if args.len() < 2 * N {
        return Err("missing arguments".to_string());
    }
    let mut out = [Coord::new(0, 0); N];
    for (i, slot) in out.iter_mut().enumerate() {
        let row = args[2 * i].parse::<usize>();
        let col = args[2 * i + 1].parse::<usize>();
        match (row, col) {
            (Ok(row), Ok(col)) => *slot = Coord::new(row, col),
            _ => {
                return Err(format!(
                    "invalid coordinate: {} {}",
                    args[2 * i],
                    args[2 * i + 1]
                ));
            }
        }
    }
    Ok(out)
}
