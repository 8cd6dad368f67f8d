use std::fmt;

use serde::{Deserialize, Serialize};

use crate::constants::{COLS, INITIAL_LAYOUT, ROWS};
use crate::piece::{Piece, PieceKind, Player};
use crate::terrain::{self, Terrain};

/// A cell address: `row` in `0..9`, `col` in `0..7`.
///
/// A `Coord` may hold values outside the grid (it is what callers hand in);
/// use [`Coord::in_bounds`] before trusting it.
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Coord {
    pub row: usize,
    pub col: usize,
}

impl Coord {
    pub const fn new(row: usize, col: usize) -> Self {
        Self { row, col }
    }

    pub fn in_bounds(self) -> bool {
        self.row < ROWS && self.col < COLS
    }

    /// Orthogonal step count between two cells.
    pub fn manhattan(self, other: Coord) -> usize {
        self.row.abs_diff(other.row) + self.col.abs_diff(other.col)
    }

    /// Every cell of the grid in row-major order.
    pub fn all() -> impl Iterator<Item = Coord> {
        (0..ROWS).flat_map(|row| (0..COLS).map(move |col| Coord::new(row, col)))
    }
}

impl fmt::Display for Coord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({},{})", self.row, self.col)
    }
}

/// The 9x7 grid. Single source of truth for piece placement.
///
/// Every stored piece has `position` equal to the cell it sits in; [`Board::place`]
/// rewrites the position on the way in so the two cannot disagree.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Board {
    cells: Vec<Option<Piece>>,
}

impl Default for Board {
    fn default() -> Self {
        Self::new()
    }
}

impl Board {
    /// An empty board.
    pub fn new() -> Self {
        Self {
            cells: vec![None; ROWS * COLS],
        }
    }

    /// The standard starting position.
    pub fn standard() -> Self {
        let mut board = Self::new();
        for (owner, kind, row, col) in INITIAL_LAYOUT {
            let at = Coord::new(row, col);
            board.place(at, Piece::new(kind, owner, at));
        }
        board
    }

    fn idx(&self, at: Coord) -> usize {
        at.row * COLS + at.col
    }

    /// Piece at `at`, or `None` for an empty or off-board cell.
    pub fn get(&self, at: Coord) -> Option<&Piece> {
        if !at.in_bounds() {
            return None;
        }
        self.cells[self.idx(at)].as_ref()
    }

    /// Put `piece` on `at`, replacing whatever was there. Returns the replaced piece.
    ///
    /// No legality checking. Off-board coordinates are ignored.
    pub fn place(&mut self, at: Coord, mut piece: Piece) -> Option<Piece> {
        if !at.in_bounds() {
            return None;
        }
        piece.position = at;
        let i = self.idx(at);
        self.cells[i].replace(piece)
    }

    /// Empty `at`, returning the piece that was there.
    pub fn clear(&mut self, at: Coord) -> Option<Piece> {
        if !at.in_bounds() {
            return None;
        }
        let i = self.idx(at);
        self.cells[i].take()
    }

    /// Live pieces owned by `player`, in row-major order.
    pub fn pieces(&self, player: Player) -> impl Iterator<Item = &Piece> + '_ {
        self.all_pieces().filter(move |p| p.owner == player)
    }

    /// Every live piece, in row-major order.
    pub fn all_pieces(&self) -> impl Iterator<Item = &Piece> + '_ {
        self.cells.iter().flatten()
    }

    pub fn count(&self, player: Player) -> usize {
        self.pieces(player).count()
    }

    /// Kinds still alive for `player`, in row-major order.
    pub fn remaining_kinds(&self, player: Player) -> Vec<PieceKind> {
        self.pieces(player).map(|p| p.kind).collect()
    }
}

fn symbol(piece: &Piece) -> char {
    let ch = match piece.kind {
        PieceKind::Rat => 'R',
        PieceKind::Cat => 'C',
        PieceKind::Dog => 'D',
        PieceKind::Wolf => 'W',
        PieceKind::Leopard => 'P',
        PieceKind::Tiger => 'T',
        PieceKind::Lion => 'L',
        PieceKind::Elephant => 'E',
    };
    match piece.owner {
        Player::Red => ch,
        Player::Blue => ch.to_ascii_lowercase(),
    }
}

impl fmt::Display for Board {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "  ")?;
        for col in 0..COLS {
            write!(f, "{col} ")?;
        }
        writeln!(f)?;
        for row in 0..ROWS {
            write!(f, "{row} ")?;
            for col in 0..COLS {
                let at = Coord::new(row, col);
                let ch = match self.get(at) {
                    Some(piece) => symbol(piece),
                    None => match terrain::classify(at) {
                        Terrain::River => '~',
                        Terrain::Trap(_) => '#',
                        Terrain::Den(_) => '@',
                        Terrain::Land => '.',
                    },
                };
                write!(f, "{ch} ")?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}
