use std::cell::OnceCell;
use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::sync::Arc;

use log::{debug, info};
use thiserror::Error;

use crate::attacks::{self, AttackContext};
use crate::hasher::PositionHasher;
use crate::movegen;
use crate::moves::Move;
use crate::position::{ParseError, Position};
use crate::types::{Color, PieceKind, Square};

/// Minor pieces (bishops plus knights) one side needs for mating material
/// once pawns, rooks and queens are gone.
const MATING_MINORS: usize = 2;

/// Tunable game rules.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GameConfig {
    /// Half-move clock value (in plies) at which the game is drawn.
    pub fifty_move_limit: u32,
    /// Occurrences of the same position that draw the game.
    pub repetition_limit: u32,
    /// Seed for a private hasher table; `None` shares the process-wide table.
    pub hash_seed: Option<u64>,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            fifty_move_limit: 100,
            repetition_limit: 3,
            hash_seed: None,
        }
    }
}

/// Error type for game operations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GameError {
    #[error("illegal move: {0}")]
    IllegalMove(Move),
    #[error("no legal move matches '{0}'")]
    UnknownMove(String),
    #[error("invalid position: {0}")]
    Parse(#[from] ParseError),
}

/// How a finished game ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Outcome {
    Checkmate { winner: Color },
    Stalemate,
    FiftyMoveRule,
    InsufficientMaterial,
    ThreefoldRepetition,
}

impl Outcome {
    /// The winning side, or `None` for a draw.
    pub fn winner(self) -> Option<Color> {
        match self {
            Outcome::Checkmate { winner } => Some(winner),
            Outcome::Stalemate
            | Outcome::FiftyMoveRule
            | Outcome::InsufficientMaterial
            | Outcome::ThreefoldRepetition => None,
        }
    }
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Outcome::Checkmate { winner } => write!(f, "Checkmate. {winner} wins"),
            Outcome::Stalemate => f.write_str("Stalemate"),
            Outcome::FiftyMoveRule => f.write_str("Draw by fifty-move rule"),
            Outcome::InsufficientMaterial => f.write_str("Draw by insufficient material"),
            Outcome::ThreefoldRepetition => f.write_str("Draw by threefold repetition"),
        }
    }
}

/// Attack context and legal moves of the current position, computed on first
/// query and dropped by every applied move.
#[derive(Debug, Clone)]
struct Analysis {
    ctx: AttackContext,
    moves: Vec<Move>,
}

/// One game: the position, its cached legal moves and the repetition record.
///
/// Not synchronized; a host sharing a game between threads must serialize
/// access to it.
#[derive(Debug, Clone)]
pub struct GameState {
    position: Position,
    config: GameConfig,
    hasher: Arc<PositionHasher>,
    repetitions: HashMap<u64, u32>,
    history: Vec<Move>,
    analysis: OnceCell<Analysis>,
}

impl Default for GameState {
    fn default() -> Self {
        Self::new()
    }
}

impl GameState {
    /// A new game from the standard start layout.
    #[inline]
    pub fn new() -> Self {
        Self::from_position(Position::startpos())
    }

    pub fn from_position(position: Position) -> Self {
        Self::with_config(position, GameConfig::default())
    }

    /// Loads a game from six-field position text.
    pub fn from_text(text: &str) -> Result<Self, GameError> {
        Ok(Self::from_position(Position::from_text(text)?))
    }

    pub fn with_config(position: Position, config: GameConfig) -> Self {
        let hasher = match config.hash_seed {
            Some(seed) => Arc::new(PositionHasher::new(seed)),
            None => PositionHasher::global(),
        };
        let mut repetitions = HashMap::new();
        repetitions.insert(hasher.hash(&position), 1);
        Self {
            position,
            config,
            hasher,
            repetitions,
            history: Vec::new(),
            analysis: OnceCell::new(),
        }
    }

    #[inline]
    pub fn position(&self) -> &Position {
        &self.position
    }

    #[inline]
    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    /// Side to move.
    #[inline]
    pub fn turn(&self) -> Color {
        self.position.side_to_move()
    }

    /// Moves applied since the game was created.
    #[inline]
    pub fn history(&self) -> &[Move] {
        &self.history
    }

    /// Occurrence count per repetition key over the whole game.
    #[inline]
    pub fn repetitions(&self) -> &HashMap<u64, u32> {
        &self.repetitions
    }

    /// How often the current position has occurred, this occurrence included.
    pub fn repetition_count(&self) -> u32 {
        self.repetitions
            .get(&self.hasher.hash(&self.position))
            .copied()
            .unwrap_or(0)
    }

    fn analysis(&self) -> &Analysis {
        self.analysis.get_or_init(|| {
            let ctx = attacks::analyze(&self.position);
            let moves = movegen::legal_moves_with(&self.position, &ctx);
            Analysis { ctx, moves }
        })
    }

    /// Attack analysis of the current position.
    pub fn attack_context(&self) -> &AttackContext {
        &self.analysis().ctx
    }

    /// All legal moves for the side to move, in no particular order.
    pub fn legal_moves(&self) -> &[Move] {
        &self.analysis().moves
    }

    /// Legal moves starting on `from`.
    pub fn moves_from(&self, from: Square) -> Vec<Move> {
        self.legal_moves()
            .iter()
            .copied()
            .filter(|mv| mv.from() == from)
            .collect()
    }

    /// Legal moves grouped by origin square.
    pub fn moves_by_origin(&self) -> BTreeMap<Square, Vec<Move>> {
        let mut grouped: BTreeMap<Square, Vec<Move>> = BTreeMap::new();
        for &mv in self.legal_moves() {
            grouped.entry(mv.from()).or_default().push(mv);
        }
        grouped
    }

    /// Resolves coordinate notation (`e2e4`, `e7e8q`, `e1g1`) against the
    /// current legal moves.
    pub fn parse_move(&self, text: &str) -> Result<Move, GameError> {
        let wanted = text.trim().to_ascii_lowercase();
        self.legal_moves()
            .iter()
            .copied()
            .find(|mv| mv.to_string() == wanted)
            .ok_or_else(|| GameError::UnknownMove(text.trim().to_string()))
    }

    /// Plays `mv` if it is in the current legal set; otherwise returns
    /// [`GameError::IllegalMove`] and leaves the game untouched.
    pub fn apply_move(&mut self, mv: Move) -> Result<(), GameError> {
        if !self.legal_moves().contains(&mv) {
            return Err(GameError::IllegalMove(mv));
        }

        self.position.apply_move(mv);
        self.analysis = OnceCell::new();
        self.history.push(mv);
        *self
            .repetitions
            .entry(self.hasher.hash(&self.position))
            .or_insert(0) += 1;

        debug!("played {mv}, position now {}", self.position);
        if let Some(outcome) = self.outcome() {
            info!("game over after {} plies: {outcome}", self.history.len());
        }
        Ok(())
    }

    /// Parses and plays a move given in coordinate notation.
    pub fn play(&mut self, text: &str) -> Result<Move, GameError> {
        let mv = self.parse_move(text)?;
        self.apply_move(mv)?;
        Ok(mv)
    }

    #[inline]
    pub fn is_check(&self) -> bool {
        self.attack_context().in_check()
    }

    #[inline]
    pub fn is_double_check(&self) -> bool {
        self.attack_context().in_double_check()
    }

    pub fn is_checkmate(&self) -> bool {
        self.legal_moves().is_empty() && self.is_check()
    }

    pub fn is_stalemate(&self) -> bool {
        self.legal_moves().is_empty() && !self.is_check()
    }

    pub fn is_fifty_move_draw(&self) -> bool {
        self.position.halfmove_clock() >= self.config.fifty_move_limit
    }

    /// No pawns, rooks or queens left, and neither side has enough minor
    /// pieces to mate.
    pub fn is_insufficient_material(&self) -> bool {
        [Color::White, Color::Black].into_iter().all(|color| {
            let heavy = [PieceKind::Pawn, PieceKind::Rook, PieceKind::Queen]
                .into_iter()
                .map(|kind| self.position.count(color, kind))
                .sum::<usize>();
            let minors = self.position.count(color, PieceKind::Bishop)
                + self.position.count(color, PieceKind::Knight);
            heavy == 0 && minors < MATING_MINORS
        })
    }

    pub fn is_threefold_repetition(&self) -> bool {
        self.repetition_count() >= self.config.repetition_limit
    }

    /// Terminal state of the game, if any. Checkmate takes priority over the
    /// draw conditions.
    pub fn outcome(&self) -> Option<Outcome> {
        if self.is_checkmate() {
            Some(Outcome::Checkmate {
                winner: self.turn().opposite(),
            })
        } else if self.is_stalemate() {
            Some(Outcome::Stalemate)
        } else if self.is_fifty_move_draw() {
            Some(Outcome::FiftyMoveRule)
        } else if self.is_insufficient_material() {
            Some(Outcome::InsufficientMaterial)
        } else if self.is_threefold_repetition() {
            Some(Outcome::ThreefoldRepetition)
        } else {
            None
        }
    }

    #[inline]
    pub fn is_game_over(&self) -> bool {
        self.outcome().is_some()
    }

    /// Human-readable status line.
    ///
    /// Conditions are checked in a fixed order: fifty-move draw, insufficient
    /// material, stalemate, checkmate, check, repetition, and finally whose
    /// move it is.
    pub fn status_text(&self) -> String {
        if self.is_fifty_move_draw() {
            Outcome::FiftyMoveRule.to_string()
        } else if self.is_insufficient_material() {
            Outcome::InsufficientMaterial.to_string()
        } else if self.is_stalemate() {
            Outcome::Stalemate.to_string()
        } else if self.is_checkmate() {
            Outcome::Checkmate {
                winner: self.turn().opposite(),
            }
            .to_string()
        } else if self.is_check() {
            format!("{} is in check", self.turn())
        } else if self.is_threefold_repetition() {
            Outcome::ThreefoldRepetition.to_string()
        } else {
            format!("{}'s move", self.turn())
        }
    }
}
