//! Animals, owners, and the per-piece movement and capture rules.
//!
//! Legality is split into two predicates that the session composes:
//! a move is legal when [`Piece::can_move`] holds and the destination is
//! either empty or holds a piece that [`Piece::can_capture`] may take.

use serde::{Deserialize, Serialize};
use strum::EnumIter;

use crate::board::{Board, Coord};
use crate::constants::{JUMP_SPAN_HORIZONTAL, JUMP_SPAN_VERTICAL};
use crate::terrain;

/// One of the two sides.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize, EnumIter)]
pub enum Player {
    Red,
    Blue,
}

impl Player {
    pub fn opponent(self) -> Self {
        match self {
            Player::Red => Player::Blue,
            Player::Blue => Player::Red,
        }
    }

    /// Stable array index for per-player tables.
    pub fn index(self) -> usize {
        match self {
            Player::Red => 0,
            Player::Blue => 1,
        }
    }
}

/// Animal kinds, weakest first.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize, EnumIter)]
pub enum PieceKind {
    Rat,
    Cat,
    Dog,
    Wolf,
    Leopard,
    Tiger,
    Lion,
    Elephant,
}

impl PieceKind {
    /// Combat rank, Rat = 1 through Elephant = 8.
    pub fn rank(self) -> u8 {
        match self {
            PieceKind::Rat => 1,
            PieceKind::Cat => 2,
            PieceKind::Dog => 3,
            PieceKind::Wolf => 4,
            PieceKind::Leopard => 5,
            PieceKind::Tiger => 6,
            PieceKind::Lion => 7,
            PieceKind::Elephant => 8,
        }
    }

    /// Lion and Tiger may leap across a lake.
    pub fn can_jump(self) -> bool {
        matches!(self, PieceKind::Lion | PieceKind::Tiger)
    }

    /// Only the Rat may enter the river.
    pub fn can_swim(self) -> bool {
        self == PieceKind::Rat
    }
}

/// A single animal token. Identity (kind, owner) never changes; `position`
/// follows the piece around the board.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Piece {
    pub kind: PieceKind,
    pub owner: Player,
    pub position: Coord,
}

impl Piece {
    pub fn new(kind: PieceKind, owner: Player, position: Coord) -> Self {
        Self {
            kind,
            owner,
            position,
        }
    }

    /// Whether this piece may travel to `target`. An opposing piece on
    /// `target` is not judged here; that is [`Piece::can_capture`]'s job.
    ///
    /// A Lion/Tiger jump spans exactly 3 columns or 4 rows and is blocked by
    /// a Rat of either side anywhere strictly between the endpoints. A clear
    /// jump ignores terrain, so it may land in the river, but it still may not
    /// land on a friendly piece or on the mover's own den.
    pub fn can_move(&self, target: Coord, board: &Board) -> bool {
        if !target.in_bounds() {
            return false;
        }
        let is_step = self.position.manhattan(target) == 1;
        let is_jump = !is_step && self.kind.can_jump() && self.is_clear_jump(target, board);
        if !is_step && !is_jump {
            return false;
        }
        if board.get(target).is_some_and(|p| p.owner == self.owner) {
            return false;
        }
        if is_step && terrain::is_river(target) && !self.kind.can_swim() {
            return false;
        }
        !terrain::is_own_den(target, self.owner)
    }

    /// Jump geometry plus the Rat-blocking rule.
    fn is_clear_jump(&self, target: Coord, board: &Board) -> bool {
        let from = self.position;
        let path: Vec<Coord> = if from.row == target.row
            && from.col.abs_diff(target.col) == JUMP_SPAN_HORIZONTAL
        {
            let (lo, hi) = (from.col.min(target.col), from.col.max(target.col));
            (lo + 1..hi).map(|col| Coord::new(from.row, col)).collect()
        } else if from.col == target.col && from.row.abs_diff(target.row) == JUMP_SPAN_VERTICAL {
            let (lo, hi) = (from.row.min(target.row), from.row.max(target.row));
            (lo + 1..hi).map(|row| Coord::new(row, from.col)).collect()
        } else {
            return false;
        };
        !path
            .into_iter()
            .any(|at| board.get(at).is_some_and(|p| p.kind == PieceKind::Rat))
    }

    /// Whether this piece, as attacker, may take `defender`.
    ///
    /// Checked in order: a defender standing in one of the attacker's traps
    /// is always taken; an attacker standing in one of the defender's traps
    /// can take nothing; Rat takes Elephant; Elephant never takes Rat;
    /// otherwise rank decides, ties going to the attacker.
    pub fn can_capture(&self, defender: &Piece) -> bool {
        if defender.owner == self.owner {
            return false;
        }
        if terrain::is_trap(defender.position, self.owner) {
            return true;
        }
        if terrain::is_trap(self.position, defender.owner) {
            return false;
        }
        match (self.kind, defender.kind) {
            (PieceKind::Rat, PieceKind::Elephant) => true,
            (PieceKind::Elephant, PieceKind::Rat) => false,
            (attacker, defender) => attacker.rank() >= defender.rank(),
        }
    }
}
