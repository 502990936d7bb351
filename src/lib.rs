//! Chess rules engine: position model, legal move generation and game-end
//! detection.
//!
//! ```
//! use chess_rules::{GameState, Square};
//!
//! let mut game = GameState::new();
//! game.play("e2e4").unwrap();
//! assert_eq!(game.moves_from("e7".parse::<Square>().unwrap()).len(), 2);
//! assert_eq!(game.status_text(), "Black's move");
//! ```

pub mod attacks;
pub mod game;
pub mod hasher;
pub mod movegen;
pub mod moves;
pub mod perft;
pub mod piece_set;
pub mod position;
pub mod session;
pub mod terminal;
pub mod types;

pub use game::{GameConfig, GameError, GameState, Outcome};
pub use hasher::PositionHasher;
pub use moves::{Move, MoveFlag};
pub use position::{CastleSide, CastlingRights, ParseError, Position, STARTING_POSITION};
pub use session::{GameId, SessionError, SessionStore};
pub use types::{Color, Direction, Piece, PieceKind, Square, SquareParseError, SquareSet};
