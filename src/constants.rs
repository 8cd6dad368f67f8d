//! Constants for board geometry, terrain placement, and the starting layout.
//!
//! The board is a fixed 9x7 grid. Row 0 is Blue's home edge and row 8 is
//! Red's home edge; the layout is mirrored across the horizontal midline.

use crate::board::Coord;
use crate::piece::{PieceKind, Player};

// =============================================================================
// Board Geometry
// =============================================================================

/// Number of rows on the board.
pub const ROWS: usize = 9;

/// Number of columns on the board.
pub const COLS: usize = 7;

/// Total number of cells.
pub const CELLS: usize = ROWS * COLS;

// =============================================================================
// Terrain
// =============================================================================

/// Rows covered by the two lakes (inclusive range).
pub const RIVER_ROWS: std::ops::RangeInclusive<usize> = 3..=5;

/// Columns covered by the two lakes.
pub const RIVER_COLS: [usize; 4] = [1, 2, 4, 5];

/// Red's den, on Red's back edge.
pub const RED_DEN: Coord = Coord::new(8, 3);

/// Blue's den, on Blue's back edge.
pub const BLUE_DEN: Coord = Coord::new(0, 3);

/// Traps guarding Red's den.
pub const RED_TRAPS: [Coord; 3] = [Coord::new(8, 2), Coord::new(8, 4), Coord::new(7, 3)];

/// Traps guarding Blue's den.
pub const BLUE_TRAPS: [Coord; 3] = [Coord::new(0, 2), Coord::new(0, 4), Coord::new(1, 3)];

// =============================================================================
// Jump Spans
// =============================================================================

/// Column distance of a horizontal Lion/Tiger jump.
pub const JUMP_SPAN_HORIZONTAL: usize = 3;

/// Row distance of a vertical Lion/Tiger jump.
pub const JUMP_SPAN_VERTICAL: usize = 4;

// =============================================================================
// Starting Layout
// =============================================================================

/// Animals each side starts with.
pub const PIECES_PER_SIDE: usize = 8;

/// Standard starting placement: (owner, kind, row, col).
pub const INITIAL_LAYOUT: [(Player, PieceKind, usize, usize); 2 * PIECES_PER_SIDE] = [
    (Player::Blue, PieceKind::Lion, 0, 0),
    (Player::Blue, PieceKind::Tiger, 0, 6),
    (Player::Blue, PieceKind::Dog, 1, 1),
    (Player::Blue, PieceKind::Cat, 1, 5),
    (Player::Blue, PieceKind::Rat, 2, 0),
    (Player::Blue, PieceKind::Leopard, 2, 2),
    (Player::Blue, PieceKind::Wolf, 2, 4),
    (Player::Blue, PieceKind::Elephant, 2, 6),
    (Player::Red, PieceKind::Lion, 8, 6),
    (Player::Red, PieceKind::Tiger, 8, 0),
    (Player::Red, PieceKind::Dog, 7, 5),
    (Player::Red, PieceKind::Cat, 7, 1),
    (Player::Red, PieceKind::Rat, 6, 6),
    (Player::Red, PieceKind::Leopard, 6, 4),
    (Player::Red, PieceKind::Wolf, 6, 2),
    (Player::Red, PieceKind::Elephant, 6, 0),
];

/// Player who moves first.
pub const FIRST_PLAYER: Player = Player::Red;

// =============================================================================
// Session Defaults
// =============================================================================

/// Default per-player undo budget. Zero disables undo.
pub const DEFAULT_UNDO_ALLOWANCE: u32 = 0;

/// Default move-log file name.
pub const DEFAULT_LOG_PATH: &str = "game_log.txt";
