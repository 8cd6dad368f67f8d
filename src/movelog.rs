//! Human-readable move log.
//!
//! The log is a write-only side channel: it observes applied moves and is
//! never consulted by the rules. Display names for players and animals live
//! here rather than on the game types.

use std::fmt;
use std::fs::{File, OpenOptions};
use std::io::{self, BufWriter, Write};
use std::path::Path;

use chrono::Local;

use crate::board::{Board, Coord};
use crate::piece::{PieceKind, Player};

const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Which name table the log writes with.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum NameStyle {
    #[default]
    English,
    Chinese,
}

impl NameStyle {
    pub fn player(self, player: Player) -> &'static str {
        match (self, player) {
            (NameStyle::English, Player::Red) => "Red",
            (NameStyle::English, Player::Blue) => "Blue",
            (NameStyle::Chinese, Player::Red) => "红方",
            (NameStyle::Chinese, Player::Blue) => "蓝方",
        }
    }

    pub fn piece(self, kind: PieceKind) -> &'static str {
        match self {
            NameStyle::English => match kind {
                PieceKind::Rat => "Rat",
                PieceKind::Cat => "Cat",
                PieceKind::Dog => "Dog",
                PieceKind::Wolf => "Wolf",
                PieceKind::Leopard => "Leopard",
                PieceKind::Tiger => "Tiger",
                PieceKind::Lion => "Lion",
                PieceKind::Elephant => "Elephant",
            },
            NameStyle::Chinese => match kind {
                PieceKind::Rat => "鼠",
                PieceKind::Cat => "猫",
                PieceKind::Dog => "狗",
                PieceKind::Wolf => "狼",
                PieceKind::Leopard => "豹",
                PieceKind::Tiger => "虎",
                PieceKind::Lion => "狮",
                PieceKind::Elephant => "象",
            },
        }
    }

    fn title(self) -> &'static str {
        match self {
            NameStyle::English => "Jungle game record",
            NameStyle::Chinese => "斗兽棋对战记录",
        }
    }
}

/// One applied move, as reported to the caller and the log.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct MoveRecord {
    pub player: Player,
    pub kind: PieceKind,
    pub from: Coord,
    pub to: Coord,
    pub captured: Option<PieceKind>,
}

impl fmt::Display for MoveRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&format_move(NameStyle::English, self))
    }
}

/// `<Player><Piece> moved from (r,c) to (r,c)[, capturing opponent's <Piece>]`
pub fn format_move(names: NameStyle, record: &MoveRecord) -> String {
    let player = names.player(record.player);
    let piece = names.piece(record.kind);
    let mut line = match names {
        NameStyle::English => format!(
            "{player} {piece} moved from {} to {}",
            record.from, record.to
        ),
        NameStyle::Chinese => format!("{player}{piece}从{}移动到{}", record.from, record.to),
    };
    if let Some(captured) = record.captured {
        let captured = names.piece(captured);
        match names {
            NameStyle::English => line.push_str(&format!(", capturing opponent's {captured}")),
            NameStyle::Chinese => line.push_str(&format!("，吃掉了对方的{captured}")),
        }
    }
    line
}

/// One side's surviving animals in board scan order.
pub fn format_remaining(names: NameStyle, player: Player, board: &Board) -> String {
    let kinds: Vec<&str> = board
        .remaining_kinds(player)
        .into_iter()
        .map(|k| names.piece(k))
        .collect();
    match names {
        NameStyle::English => format!("{} remaining: {}", names.player(player), kinds.join(",")),
        NameStyle::Chinese => format!("{}剩余棋子：{}", names.player(player), kinds.join(",")),
    }
}

pub fn format_winner(names: NameStyle, winner: Player) -> String {
    match names {
        NameStyle::English => format!("{} wins!", names.player(winner)),
        NameStyle::Chinese => format!("{}胜利！", names.player(winner)),
    }
}

pub fn format_undo(names: NameStyle, player: Player, remaining: u32) -> String {
    match names {
        NameStyle::English => format!(
            "{} took back a move, {remaining} undo(s) left",
            names.player(player)
        ),
        NameStyle::Chinese => format!(
            "{}进行了悔棋，剩余{remaining}次机会",
            names.player(player)
        ),
    }
}

/// Append-only text sink for a single game.
pub struct MoveLog {
    sink: Box<dyn Write>,
    names: NameStyle,
}

impl fmt::Debug for MoveLog {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MoveLog")
            .field("names", &self.names)
            .finish_non_exhaustive()
    }
}

impl MoveLog {
    pub fn new(sink: impl Write + 'static, names: NameStyle) -> Self {
        Self {
            sink: Box::new(sink),
            names,
        }
    }

    /// Create (truncating) a log file at `path`.
    pub fn create(path: &Path, names: NameStyle) -> io::Result<Self> {
        let file = File::create(path)?;
        Ok(Self::new(BufWriter::new(file), names))
    }

    /// Open a log file at `path` for appending, creating it if needed.
    pub fn append(path: &Path, names: NameStyle) -> io::Result<Self> {
        let file = OpenOptions::new().create(true).append(true).open(path)?;
        Ok(Self::new(BufWriter::new(file), names))
    }

    pub fn names(&self) -> NameStyle {
        self.names
    }

    fn now() -> String {
        Local::now().format(TIMESTAMP_FORMAT).to_string()
    }

    /// Title, start time, and a separator.
    pub fn start(&mut self) -> io::Result<()> {
        let started = match self.names {
            NameStyle::English => "Game started: ",
            NameStyle::Chinese => "对局开始时间：",
        };
        writeln!(self.sink, "{}", self.names.title())?;
        writeln!(self.sink, "{started}{}", Self::now())?;
        writeln!(self.sink, "{}", "=".repeat(30))?;
        self.sink.flush()
    }

    /// The move line followed by both sides' remaining pieces.
    pub fn record_move(&mut self, record: &MoveRecord, board: &Board) -> io::Result<()> {
        writeln!(
            self.sink,
            "[{}] {}",
            Self::now(),
            format_move(self.names, record)
        )?;
        writeln!(self.sink, "{}", format_remaining(self.names, Player::Red, board))?;
        writeln!(self.sink, "{}", format_remaining(self.names, Player::Blue, board))?;
        writeln!(self.sink, "{}", "-".repeat(30))?;
        self.sink.flush()
    }

    pub fn record_winner(&mut self, winner: Player) -> io::Result<()> {
        writeln!(self.sink)?;
        writeln!(self.sink, "{}", format_winner(self.names, winner))?;
        self.sink.flush()
    }

    pub fn record_undo(&mut self, player: Player, remaining: u32) -> io::Result<()> {
        writeln!(self.sink, "{}", format_undo(self.names, player, remaining))?;
        self.sink.flush()
    }
}
