//! Terrain classification for the fixed 9x7 grid.
//!
//! Terrain is never stored; every fact is derived from the coordinate.
//! Den queries come in two flavours that must not be confused:
//! [`is_own_den`] blocks a piece from stepping into its home den, while
//! [`is_opponent_den`] is the target that wins the game.

use crate::board::Coord;
use crate::constants::{BLUE_DEN, BLUE_TRAPS, RED_DEN, RED_TRAPS, RIVER_COLS, RIVER_ROWS};
use crate::piece::Player;

/// What a cell is made of.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Terrain {
    Land,
    River,
    /// A trap guarding the given player's den.
    Trap(Player),
    /// The given player's den.
    Den(Player),
}

pub fn classify(at: Coord) -> Terrain {
    if is_river(at) {
        Terrain::River
    } else if at == RED_DEN {
        Terrain::Den(Player::Red)
    } else if at == BLUE_DEN {
        Terrain::Den(Player::Blue)
    } else if is_trap(at, Player::Red) {
        Terrain::Trap(Player::Red)
    } else if is_trap(at, Player::Blue) {
        Terrain::Trap(Player::Blue)
    } else {
        Terrain::Land
    }
}

pub fn is_river(at: Coord) -> bool {
    RIVER_ROWS.contains(&at.row) && RIVER_COLS.contains(&at.col)
}

/// The den on `player`'s back edge.
pub fn den_of(player: Player) -> Coord {
    match player {
        Player::Red => RED_DEN,
        Player::Blue => BLUE_DEN,
    }
}

/// True if `at` is `player`'s own den, which that player may never enter.
pub fn is_own_den(at: Coord, player: Player) -> bool {
    at == den_of(player)
}

/// True if `at` is the den `player` wins by occupying.
pub fn is_opponent_den(at: Coord, player: Player) -> bool {
    at == den_of(player.opponent())
}

/// True if `at` is one of the three traps guarding `defending`'s den.
///
/// Such a trap is hostile to the *other* player's pieces.
pub fn is_trap(at: Coord, defending: Player) -> bool {
    let traps = match defending {
        Player::Red => &RED_TRAPS,
        Player::Blue => &BLUE_TRAPS,
    };
    traps.contains(&at)
}
