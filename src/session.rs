//! Game session: turn order, move application, win detection, and undo.
//!
//! A session is a plain value owned by whoever drives the game. Every call
//! either applies completely (board updated, turn advanced or game finished,
//! log appended) or is rejected with no observable change.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument, warn};

use crate::board::{Board, Coord};
use crate::constants::{DEFAULT_UNDO_ALLOWANCE, FIRST_PLAYER, PIECES_PER_SIDE};
use crate::movelog::{MoveLog, MoveRecord};
use crate::piece::{Piece, PieceKind, Player};
use crate::terrain;

/// Engine-level settings.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct SessionConfig {
    /// Undos each player may spend over the whole game.
    pub undo_allowance: u32,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            undo_allowance: DEFAULT_UNDO_ALLOWANCE,
        }
    }
}

/// Where the game stands.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Status {
    InProgress,
    Finished(Player),
}

/// Why a move (or undo) was turned down.
#[derive(Debug, Clone, PartialEq, Eq, derive_more::Display)]
pub enum MoveError {
    #[display("game is already over")]
    GameOver,

    #[display("{_0} is off the board")]
    OutOfBounds(Coord),

    #[display("no piece at {_0}")]
    NoPiece(Coord),

    #[display("it is {expected:?}'s turn, not {got:?}'s")]
    WrongTurn { expected: Player, got: Player },

    #[display("illegal move from {from} to {to}")]
    IllegalMove { from: Coord, to: Coord },

    #[display("{attacker:?} cannot capture {defender:?}")]
    CaptureForbidden {
        attacker: PieceKind,
        defender: PieceKind,
    },

    #[display("no move to take back")]
    NothingToUndo,

    #[display("{_0:?} has no undos left")]
    UndoExhausted(Player),
}

impl std::error::Error for MoveError {}

/// Reasons a saved position cannot be loaded.
#[derive(Debug, Clone, PartialEq, Eq, derive_more::Display)]
pub enum SnapshotError {
    #[display("piece at {_0} is off the board")]
    OffBoard(Coord),

    #[display("more than one piece at {_0}")]
    Overlap(Coord),

    #[display("{_0:?} at {_1} cannot be in the river")]
    InRiver(PieceKind, Coord),

    #[display("{_0:?} piece at {_1} is in its own den")]
    InOwnDen(Player, Coord),

    #[display("{_0:?} has too many pieces")]
    TooManyPieces(Player),
}

impl std::error::Error for SnapshotError {}

/// Result of [`GameSession::apply_move`].
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct MoveOutcome {
    pub applied: bool,
    pub captured: Option<PieceKind>,
    pub winner: Option<Player>,
}

/// A serializable position: every live piece plus the side to move.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Snapshot {
    pub pieces: Vec<Piece>,
    pub active: Player,
}

impl Snapshot {
    /// Rebuild a board, rejecting positions that play can never reach.
    pub fn to_board(&self) -> Result<Board, SnapshotError> {
        let mut board = Board::new();
        for piece in &self.pieces {
            let at = piece.position;
            if !at.in_bounds() {
                return Err(SnapshotError::OffBoard(at));
            }
            // Rats swim in; Lions and Tigers can land there from a jump.
            if terrain::is_river(at) && !piece.kind.can_swim() && !piece.kind.can_jump() {
                return Err(SnapshotError::InRiver(piece.kind, at));
            }
            if terrain::is_own_den(at, piece.owner) {
                return Err(SnapshotError::InOwnDen(piece.owner, at));
            }
            if board.place(at, *piece).is_some() {
                return Err(SnapshotError::Overlap(at));
            }
        }
        for player in [Player::Red, Player::Blue] {
            if board.count(player) > PIECES_PER_SIDE {
                return Err(SnapshotError::TooManyPieces(player));
            }
        }
        Ok(board)
    }
}

/// Den entry first, then elimination.
pub fn check_winner(board: &Board) -> Option<Player> {
    if let Some(invader) = board
        .all_pieces()
        .find(|p| terrain::is_opponent_den(p.position, p.owner))
    {
        return Some(invader.owner);
    }
    if board.count(Player::Red) == 0 {
        return Some(Player::Blue);
    }
    if board.count(Player::Blue) == 0 {
        return Some(Player::Red);
    }
    None
}

/// One game from the opening position to a winner.
#[derive(Debug)]
pub struct GameSession {
    board: Board,
    active: Player,
    winner: Option<Player>,
    /// Positions before each applied move, newest last. Only kept while
    /// some player still has an undo to spend.
    history: Vec<(Board, Player)>,
    last_mover: Option<Player>,
    undo_left: [u32; 2],
    log: Option<MoveLog>,
}

impl Default for GameSession {
    fn default() -> Self {
        Self::new()
    }
}

impl GameSession {
    /// Standard layout, Red to move, default settings, no log.
    pub fn new() -> Self {
        Self::with_config(SessionConfig::default())
    }

    #[instrument]
    pub fn with_config(config: SessionConfig) -> Self {
        Self {
            board: Board::standard(),
            active: FIRST_PLAYER,
            winner: None,
            history: Vec::new(),
            last_mover: None,
            undo_left: [config.undo_allowance; 2],
            log: None,
        }
    }

    /// Attach a move log and write its header.
    pub fn with_log(mut self, mut log: MoveLog) -> Self {
        if let Err(err) = log.start() {
            warn!(%err, "failed to write move log header");
        }
        self.log = Some(log);
        self
    }

    pub fn board(&self) -> &Board {
        &self.board
    }

    pub fn active_player(&self) -> Player {
        self.active
    }

    pub fn winner(&self) -> Option<Player> {
        self.winner
    }

    pub fn status(&self) -> Status {
        match self.winner {
            Some(player) => Status::Finished(player),
            None => Status::InProgress,
        }
    }

    pub fn undo_remaining(&self, player: Player) -> u32 {
        self.undo_left[player.index()]
    }

    /// Positions held for undo. Always zero when no player has undos left.
    pub fn history_len(&self) -> usize {
        self.history.len()
    }

    /// Every cell the piece at `from` could move or capture into right now.
    ///
    /// Empty for an empty or off-board cell and once the game is over.
    /// Turn order is not considered, so the opponent's options can be shown too.
    pub fn legal_destinations(&self, from: Coord) -> BTreeSet<Coord> {
        if self.winner.is_some() {
            return BTreeSet::new();
        }
        let Some(piece) = self.board.get(from) else {
            return BTreeSet::new();
        };
        Coord::all()
            .filter(|&to| {
                piece.can_move(to, &self.board)
                    && self
                        .board
                        .get(to)
                        .is_none_or(|defender| piece.can_capture(defender))
            })
            .collect()
    }

    /// Check a move for `player` without applying it.
    pub fn validate(&self, player: Player, from: Coord, to: Coord) -> Result<Piece, MoveError> {
        if self.winner.is_some() {
            return Err(MoveError::GameOver);
        }
        for at in [from, to] {
            if !at.in_bounds() {
                return Err(MoveError::OutOfBounds(at));
            }
        }
        if player != self.active {
            return Err(MoveError::WrongTurn {
                expected: self.active,
                got: player,
            });
        }
        let piece = *self.board.get(from).ok_or(MoveError::NoPiece(from))?;
        if piece.owner != player {
            return Err(MoveError::WrongTurn {
                expected: self.active,
                got: piece.owner,
            });
        }
        if !piece.can_move(to, &self.board) {
            return Err(MoveError::IllegalMove { from, to });
        }
        if let Some(defender) = self.board.get(to)
            && !piece.can_capture(defender)
        {
            return Err(MoveError::CaptureForbidden {
                attacker: piece.kind,
                defender: defender.kind,
            });
        }
        Ok(piece)
    }

    /// Move for whoever is to play.
    pub fn try_move(&mut self, from: Coord, to: Coord) -> Result<MoveRecord, MoveError> {
        self.try_move_as(self.active, from, to)
    }

    /// Validate and apply a move on behalf of `player`.
    #[instrument(skip(self), fields(active = ?self.active))]
    pub fn try_move_as(
        &mut self,
        player: Player,
        from: Coord,
        to: Coord,
    ) -> Result<MoveRecord, MoveError> {
        let piece = self.validate(player, from, to).inspect_err(|err| {
            debug!(%err, "move rejected");
        })?;

        if self.can_ever_undo() {
            self.history.push((self.board.clone(), self.active));
        }
        self.last_mover = Some(player);
        self.board.clear(from);
        let captured = self.board.place(to, piece).map(|defender| defender.kind);

        let record = MoveRecord {
            player,
            kind: piece.kind,
            from,
            to,
            captured,
        };
        info!(%record, "move applied");

        if let Some(log) = self.log.as_mut()
            && let Err(err) = log.record_move(&record, &self.board)
        {
            warn!(%err, "failed to write move log");
        }

        match check_winner(&self.board) {
            Some(winner) => {
                info!(?winner, "game over");
                self.winner = Some(winner);
                if let Some(log) = self.log.as_mut()
                    && let Err(err) = log.record_winner(winner)
                {
                    warn!(%err, "failed to write move log");
                }
            }
            None => self.active = self.active.opponent(),
        }
        Ok(record)
    }

    /// Apply a move, folding any rejection into `applied == false`.
    pub fn apply_move(&mut self, from: Coord, to: Coord) -> MoveOutcome {
        match self.try_move(from, to) {
            Ok(record) => MoveOutcome {
                applied: true,
                captured: record.captured,
                winner: self.winner,
            },
            Err(_) => MoveOutcome {
                applied: false,
                captured: None,
                winner: self.winner,
            },
        }
    }

    /// Take back the most recent move.
    ///
    /// The player who made that move is to play again and pays one undo.
    /// Returns that player.
    #[instrument(skip(self))]
    pub fn undo(&mut self) -> Result<Player, MoveError> {
        if self.winner.is_some() {
            return Err(MoveError::GameOver);
        }
        let Some(player) = self.last_mover else {
            return Err(MoveError::NothingToUndo);
        };
        if self.undo_left[player.index()] == 0 {
            return Err(MoveError::UndoExhausted(player));
        }
        let Some((board, active)) = self.history.pop() else {
            return Err(MoveError::NothingToUndo);
        };
        self.board = board;
        self.active = active;
        self.last_mover = self.history.last().map(|(_, mover)| *mover);
        self.undo_left[player.index()] -= 1;
        let remaining = self.undo_left[player.index()];
        if !self.can_ever_undo() {
            self.history.clear();
        }
        info!(?player, remaining, "move taken back");

        if let Some(log) = self.log.as_mut()
            && let Err(err) = log.record_undo(player, remaining)
        {
            warn!(%err, "failed to write move log");
        }
        Ok(player)
    }

    fn can_ever_undo(&self) -> bool {
        self.undo_left.iter().any(|&left| left > 0)
    }

    pub fn snapshot(&self) -> Snapshot {
        Snapshot {
            pieces: self.board.all_pieces().copied().collect(),
            active: self.active,
        }
    }

    /// Replace the position with `snapshot`.
    ///
    /// Undo history is dropped; remaining undo allowances are kept. The
    /// winner is recomputed, so a finished position loads as finished.
    pub fn restore(&mut self, snapshot: &Snapshot) -> Result<(), SnapshotError> {
        let board = snapshot.to_board()?;
        self.winner = check_winner(&board);
        self.board = board;
        self.active = snapshot.active;
        self.history.clear();
        self.last_mover = None;
        debug!(winner = ?self.winner, "position restored");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn c(row: usize, col: usize) -> Coord {
        Coord::new(row, col)
    }

    fn session_from(pieces: &[(Player, PieceKind, usize, usize)], active: Player) -> GameSession {
        let mut session = GameSession::new();
        let snapshot = Snapshot {
            pieces: pieces
                .iter()
                .map(|&(owner, kind, row, col)| Piece::new(kind, owner, c(row, col)))
                .collect(),
            active,
        };
        session.restore(&snapshot).expect("valid snapshot");
        session
    }

    #[test]
    fn test_new_session() {
        let session = GameSession::new();
        assert_eq!(session.active_player(), Player::Red);
        assert_eq!(session.status(), Status::InProgress);
        assert_eq!(session.winner(), None);
        assert_eq!(session.history_len(), 0);
    }

    #[test]
    fn test_red_rat_opening() {
        let mut session = GameSession::new();
        let outcome = session.apply_move(c(6, 6), c(5, 6));
        assert_eq!(
            outcome,
            MoveOutcome {
                applied: true,
                captured: None,
                winner: None
            }
        );
        assert_eq!(session.active_player(), Player::Blue);
        assert!(session.board().get(c(6, 6)).is_none());
        let rat = session.board().get(c(5, 6)).expect("rat moved");
        assert_eq!(rat.kind, PieceKind::Rat);
        assert_eq!(rat.position, c(5, 6));
    }

    #[test]
    fn test_wrong_turn_rejected() {
        let mut session = GameSession::new();
        let err = session.try_move(c(2, 0), c(3, 0)).unwrap_err();
        assert_eq!(
            err,
            MoveError::WrongTurn {
                expected: Player::Red,
                got: Player::Blue
            }
        );
        let err = session
            .try_move_as(Player::Blue, c(2, 0), c(3, 0))
            .unwrap_err();
        assert!(matches!(err, MoveError::WrongTurn { .. }));
        assert_eq!(session.active_player(), Player::Red);
    }

    #[test]
    fn test_empty_and_off_board_rejected() {
        let mut session = GameSession::new();
        assert_eq!(
            session.try_move(c(4, 3), c(5, 3)),
            Err(MoveError::NoPiece(c(4, 3)))
        );
        assert_eq!(
            session.try_move(c(6, 6), c(6, 7)),
            Err(MoveError::OutOfBounds(c(6, 7)))
        );
        assert_eq!(
            session.try_move(c(9, 0), c(8, 0)),
            Err(MoveError::OutOfBounds(c(9, 0)))
        );
    }

    #[test]
    fn test_rejection_is_idempotent() {
        let mut session = GameSession::new();
        let before = session.snapshot();
        for _ in 0..5 {
            let outcome = session.apply_move(c(6, 0), c(5, 1));
            assert!(!outcome.applied);
        }
        assert_eq!(session.snapshot(), before);
        assert_eq!(session.history_len(), 0);
    }

    #[test]
    fn test_capture_forbidden_by_rank() {
        let mut session = session_from(
            &[
                (Player::Red, PieceKind::Cat, 4, 3),
                (Player::Blue, PieceKind::Dog, 3, 3),
            ],
            Player::Red,
        );
        assert_eq!(
            session.try_move(c(4, 3), c(3, 3)),
            Err(MoveError::CaptureForbidden {
                attacker: PieceKind::Cat,
                defender: PieceKind::Dog
            })
        );
    }

    #[test]
    fn test_rat_captures_elephant() {
        let mut session = session_from(
            &[
                (Player::Red, PieceKind::Elephant, 4, 0),
                (Player::Red, PieceKind::Cat, 7, 1),
                (Player::Blue, PieceKind::Rat, 3, 0),
                (Player::Blue, PieceKind::Dog, 1, 1),
            ],
            Player::Blue,
        );
        let outcome = session.apply_move(c(3, 0), c(4, 0));
        assert!(outcome.applied);
        assert_eq!(outcome.captured, Some(PieceKind::Elephant));
        assert_eq!(outcome.winner, None);
        assert_eq!(session.board().count(Player::Red), 1);
    }

    #[test]
    fn test_den_entry_wins() {
        let mut session = session_from(
            &[
                (Player::Red, PieceKind::Dog, 1, 3),
                (Player::Blue, PieceKind::Lion, 2, 0),
                (Player::Blue, PieceKind::Elephant, 2, 6),
            ],
            Player::Red,
        );
        let outcome = session.apply_move(c(1, 3), c(0, 3));
        assert!(outcome.applied);
        assert_eq!(outcome.winner, Some(Player::Red));
        assert_eq!(session.status(), Status::Finished(Player::Red));
        // Winner's turn is not passed on.
        assert_eq!(session.active_player(), Player::Red);
        assert_eq!(
            session.try_move_as(Player::Red, c(0, 3), c(0, 2)),
            Err(MoveError::GameOver)
        );
        assert!(session.legal_destinations(c(2, 0)).is_empty());
    }

    #[test]
    fn test_elimination_wins() {
        let mut session = session_from(
            &[
                (Player::Red, PieceKind::Lion, 4, 3),
                (Player::Blue, PieceKind::Cat, 3, 3),
            ],
            Player::Red,
        );
        let outcome = session.apply_move(c(4, 3), c(3, 3));
        assert_eq!(outcome.captured, Some(PieceKind::Cat));
        assert_eq!(outcome.winner, Some(Player::Red));
    }

    #[test]
    fn test_legal_destinations_from_start() {
        let session = GameSession::new();
        let rat: Vec<Coord> = session.legal_destinations(c(6, 6)).into_iter().collect();
        assert_eq!(rat, vec![c(5, 6), c(6, 5), c(7, 6)]);
        let elephant: Vec<Coord> = session.legal_destinations(c(6, 0)).into_iter().collect();
        assert_eq!(elephant, vec![c(5, 0), c(6, 1), c(7, 0)]);
        assert!(session.legal_destinations(c(4, 3)).is_empty());
        assert!(session.legal_destinations(c(12, 3)).is_empty());
    }

    #[test]
    fn test_legal_destinations_match_validate() {
        let session = GameSession::new();
        for piece in session.board().pieces(Player::Red) {
            let from = piece.position;
            let hints = session.legal_destinations(from);
            for to in Coord::all() {
                assert_eq!(
                    hints.contains(&to),
                    session.validate(Player::Red, from, to).is_ok(),
                    "{from} -> {to}"
                );
            }
        }
    }

    #[test]
    fn test_undo_disabled_by_default() {
        let mut session = GameSession::new();
        session.apply_move(c(6, 6), c(5, 6));
        session.apply_move(c(2, 0), c(3, 0));
        assert_eq!(session.history_len(), 0);
        assert_eq!(session.undo(), Err(MoveError::UndoExhausted(Player::Blue)));
        assert_eq!(session.active_player(), Player::Red);
    }

    #[test]
    fn test_history_dropped_once_undos_spent() {
        let mut session = GameSession::with_config(SessionConfig { undo_allowance: 1 });
        session.apply_move(c(6, 6), c(5, 6));
        session.apply_move(c(2, 0), c(3, 0));
        session.apply_move(c(6, 0), c(5, 0));
        assert_eq!(session.history_len(), 3);

        assert_eq!(session.undo(), Ok(Player::Red));
        assert_eq!(session.undo(), Ok(Player::Blue));
        assert_eq!(session.history_len(), 0);
        assert_eq!(session.undo(), Err(MoveError::UndoExhausted(Player::Red)));

        assert!(session.apply_move(c(2, 0), c(3, 0)).applied);
        assert_eq!(session.history_len(), 0);
        assert_eq!(session.undo(), Err(MoveError::UndoExhausted(Player::Blue)));
    }

    #[test]
    fn test_undo_restores_and_charges_mover() {
        let mut session = GameSession::with_config(SessionConfig { undo_allowance: 1 });
        let opening = session.snapshot();
        assert_eq!(session.undo(), Err(MoveError::NothingToUndo));

        session.apply_move(c(6, 6), c(5, 6));
        assert_eq!(session.undo(), Ok(Player::Red));
        assert_eq!(session.snapshot(), opening);
        assert_eq!(session.active_player(), Player::Red);
        assert_eq!(session.undo_remaining(Player::Red), 0);
        assert_eq!(session.undo_remaining(Player::Blue), 1);

        session.apply_move(c(6, 6), c(5, 6));
        assert_eq!(session.undo(), Err(MoveError::UndoExhausted(Player::Red)));
    }

    #[test]
    fn test_undo_after_game_over_rejected() {
        let mut session = session_from(
            &[
                (Player::Red, PieceKind::Lion, 4, 3),
                (Player::Blue, PieceKind::Cat, 3, 3),
            ],
            Player::Red,
        );
        session.apply_move(c(4, 3), c(3, 3));
        assert_eq!(session.undo(), Err(MoveError::GameOver));
    }

    #[test]
    fn test_restore_rejects_bad_snapshots() {
        let mut session = GameSession::new();
        let overlap = Snapshot {
            pieces: vec![
                Piece::new(PieceKind::Rat, Player::Red, c(4, 3)),
                Piece::new(PieceKind::Cat, Player::Blue, c(4, 3)),
            ],
            active: Player::Red,
        };
        assert_eq!(
            session.restore(&overlap),
            Err(SnapshotError::Overlap(c(4, 3)))
        );
        let off_board = Snapshot {
            pieces: vec![Piece::new(PieceKind::Rat, Player::Red, c(9, 3))],
            active: Player::Red,
        };
        assert_eq!(
            session.restore(&off_board),
            Err(SnapshotError::OffBoard(c(9, 3)))
        );
        assert_eq!(session.board(), &Board::standard());
    }

    #[test]
    fn test_restore_rejects_unreachable_positions() {
        let mut session = GameSession::new();
        let swimming_cat = Snapshot {
            pieces: vec![
                Piece::new(PieceKind::Cat, Player::Red, c(4, 1)),
                Piece::new(PieceKind::Cat, Player::Blue, c(0, 0)),
            ],
            active: Player::Red,
        };
        assert_eq!(
            session.restore(&swimming_cat),
            Err(SnapshotError::InRiver(PieceKind::Cat, c(4, 1)))
        );

        let home = Snapshot {
            pieces: vec![
                Piece::new(PieceKind::Dog, Player::Blue, c(0, 3)),
                Piece::new(PieceKind::Cat, Player::Red, c(8, 0)),
            ],
            active: Player::Red,
        };
        assert_eq!(
            session.restore(&home),
            Err(SnapshotError::InOwnDen(Player::Blue, c(0, 3)))
        );

        let crowded = Snapshot {
            pieces: (0..9)
                .map(|i| Piece::new(PieceKind::Rat, Player::Red, c(7 - i / 7, i % 7)))
                .collect(),
            active: Player::Red,
        };
        assert_eq!(
            session.restore(&crowded),
            Err(SnapshotError::TooManyPieces(Player::Red))
        );
        assert_eq!(session.board(), &Board::standard());

        let lion_in_river = Snapshot {
            pieces: vec![
                Piece::new(PieceKind::Lion, Player::Blue, c(4, 1)),
                Piece::new(PieceKind::Cat, Player::Red, c(8, 0)),
            ],
            active: Player::Red,
        };
        assert!(session.restore(&lion_in_river).is_ok());
    }

    #[test]
    fn test_check_winner_prefers_den() {
        let mut board = Board::new();
        board.place(c(8, 3), Piece::new(PieceKind::Rat, Player::Blue, c(8, 3)));
        // Red has no pieces, but den entry is checked first either way.
        assert_eq!(check_winner(&board), Some(Player::Blue));
        board.place(c(0, 3), Piece::new(PieceKind::Cat, Player::Red, c(0, 3)));
        assert_eq!(check_winner(&board), Some(Player::Red));
    }
}
