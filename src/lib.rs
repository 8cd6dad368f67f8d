//! Jungle-chess: the rules engine of the two-player animal chess game (斗兽棋).
//!
//! The crate decides whether a proposed move is legal, whether it captures,
//! and whether the game has ended. Rendering and input are left to callers;
//! the [`protocol`] module is a text front end that drives a session.
//!
//! ## Modules
//!
//! - [`constants`] - Board dimensions, terrain coordinates, starting layout
//! - [`terrain`] - River, trap, and den classification
//! - [`piece`] - Players, animals, and move/capture predicates
//! - [`board`] - Coordinates and the 9x7 grid
//! - [`session`] - Turn order, move application, win detection, undo
//! - [`movelog`] - Human-readable move log
//! - [`protocol`] - Line-oriented command protocol
//!
//! ## Example
//!
//! ```
//! use jungle_chess::board::Coord;
//! use jungle_chess::piece::Player;
//! use jungle_chess::session::GameSession;
//!
//! let mut session = GameSession::new();
//! let outcome = session.apply_move(Coord::new(6, 6), Coord::new(5, 6));
//! assert!(outcome.applied);
//! assert_eq!(session.active_player(), Player::Blue);
//! ```

pub mod board;
pub mod constants;
pub mod movelog;
pub mod piece;
pub mod protocol;
pub mod session;
pub mod terrain;
