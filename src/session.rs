//! Explicit store of concurrent games keyed by id.
//!
//! The store owns every game it hands out; a host running games on several
//! threads wraps it in a mutex or keeps one store per worker.

use std::collections::HashMap;
use std::fmt;

use log::{debug, info};
use thiserror::Error;

use crate::game::{GameConfig, GameError, GameState};
use crate::moves::Move;
use crate::position::Position;

/// Identifier of a stored game.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct GameId(u64);

impl GameId {
    #[inline]
    pub const fn value(self) -> u64 {
        self.0
    }
}

impl fmt::Display for GameId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SessionError {
    #[error("no game with id {0}")]
    UnknownGame(GameId),
    #[error("game {0} is already over")]
    GameOver(GameId),
    #[error(transparent)]
    Game(#[from] GameError),
}

#[derive(Debug, Default)]
pub struct SessionStore {
    games: HashMap<GameId, GameState>,
    next_id: u64,
    config: GameConfig,
}

impl SessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// A store whose games all use `config`.
    pub fn with_config(config: GameConfig) -> Self {
        Self {
            config,
            ..Self::default()
        }
    }

    fn insert(&mut self, game: GameState) -> GameId {
        let id = GameId(self.next_id);
        self.next_id += 1;
        self.games.insert(id, game);
        info!("created game {id}");
        id
    }

    /// Starts a game from the standard layout.
    pub fn create(&mut self) -> GameId {
        let game = GameState::with_config(Position::startpos(), self.config.clone());
        self.insert(game)
    }

    /// Starts a game from position text.
    pub fn create_from_text(&mut self, text: &str) -> Result<GameId, SessionError> {
        let position = Position::from_text(text).map_err(GameError::from)?;
        Ok(self.insert(GameState::with_config(position, self.config.clone())))
    }

    pub fn get(&self, id: GameId) -> Option<&GameState> {
        self.games.get(&id)
    }

    /// Plays `mv` in game `id`. Finished games reject further moves.
    pub fn apply_move(&mut self, id: GameId, mv: Move) -> Result<&GameState, SessionError> {
        let game = self
            .games
            .get_mut(&id)
            .ok_or(SessionError::UnknownGame(id))?;
        if game.is_game_over() {
            return Err(SessionError::GameOver(id));
        }
        game.apply_move(mv)?;
        debug!("game {id}: {}", game.status_text());
        Ok(game)
    }

    /// Parses and plays a coordinate-notation move in game `id`.
    pub fn play(&mut self, id: GameId, text: &str) -> Result<&GameState, SessionError> {
        let mv = self
            .get(id)
            .ok_or(SessionError::UnknownGame(id))?
            .parse_move(text)?;
        self.apply_move(id, mv)
    }

    pub fn remove(&mut self, id: GameId) -> Option<GameState> {
        let removed = self.games.remove(&id);
        if removed.is_some() {
            info!("removed game {id}");
        }
        removed
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.games.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.games.is_empty()
    }

    /// Ids of all stored games, in creation order.
    pub fn ids(&self) -> Vec<GameId> {
        let mut ids: Vec<GameId> = self.games.keys().copied().collect();
        ids.sort();
        ids
    }
}
