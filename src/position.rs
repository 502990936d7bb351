mod text;

pub use text::{ParseError, STARTING_POSITION};

use crate::moves::{Move, MoveFlag};
use crate::piece_set::PieceSet;
use crate::types::{Color, NUM_SQUARES, Piece, PieceKind, Square};

/// Which wing a castling move or right belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CastleSide {
    King,
    Queen,
}

impl CastleSide {
    pub const BOTH: [CastleSide; 2] = [CastleSide::King, CastleSide::Queen];

    /// File the king lands on.
    pub const fn king_file(self) -> u8 {
        match self {
            CastleSide::King => 6,
            CastleSide::Queen => 2,
        }
    }

    /// File the rook starts from.
    pub const fn rook_file(self) -> u8 {
        match self {
            CastleSide::King => 7,
            CastleSide::Queen => 0,
        }
    }

    /// File the rook lands on, adjacent to the king's destination.
    pub const fn rook_target_file(self) -> u8 {
        match self {
            CastleSide::King => 5,
            CastleSide::Queen => 3,
        }
    }

    pub const fn flag(self) -> MoveFlag {
        match self {
            CastleSide::King => MoveFlag::CastleKing,
            CastleSide::Queen => MoveFlag::CastleQueen,
        }
    }
}

/// The four castling-right flags, one bit each.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Hash)]
pub struct CastlingRights(u8);

impl CastlingRights {
    pub const NONE: CastlingRights = CastlingRights(0);
    pub const ALL: CastlingRights = CastlingRights(0b1111);

    const fn bit(color: Color, side: CastleSide) -> u8 {
        match (color, side) {
            (Color::White, CastleSide::King) => 0b0001,
            (Color::White, CastleSide::Queen) => 0b0010,
            (Color::Black, CastleSide::King) => 0b0100,
            (Color::Black, CastleSide::Queen) => 0b1000,
        }
    }

    #[inline]
    pub const fn has(self, color: Color, side: CastleSide) -> bool {
        self.0 & Self::bit(color, side) != 0
    }

    #[inline]
    pub fn set(&mut self, color: Color, side: CastleSide) {
        self.0 |= Self::bit(color, side);
    }

    #[inline]
    pub fn remove(&mut self, color: Color, side: CastleSide) {
        self.0 &= !Self::bit(color, side);
    }

    /// Drops both rights of `color`.
    #[inline]
    pub fn clear(&mut self, color: Color) {
        self.remove(color, CastleSide::King);
        self.remove(color, CastleSide::Queen);
    }

    /// Drops every right that depends on the piece that stood on `square`
    /// (a king's home square or an original rook corner).
    pub fn vacate(&mut self, square: Square) {
        match square {
            Square::E1 => self.clear(Color::White),
            Square::E8 => self.clear(Color::Black),
            Square::A1 => self.remove(Color::White, CastleSide::Queen),
            Square::H1 => self.remove(Color::White, CastleSide::King),
            Square::A8 => self.remove(Color::Black, CastleSide::Queen),
            Square::H8 => self.remove(Color::Black, CastleSide::King),
            _ => {}
        }
    }

    #[inline]
    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }

    #[inline]
    pub const fn bits(self) -> u8 {
        self.0
    }
}

/// Slot in the per-color piece-set array. Kings are tracked by square instead.
const fn set_slot(kind: PieceKind) -> Option<usize> {
    match kind {
        PieceKind::King => None,
        PieceKind::Queen => Some(0),
        PieceKind::Rook => Some(1),
        PieceKind::Bishop => Some(2),
        PieceKind::Knight => Some(3),
        PieceKind::Pawn => Some(4),
    }
}

/// A chess position: the board array, per-kind piece sets and game clocks.
///
/// `board` and the piece sets always describe the same placement; the only
/// mutator after construction is [`Position::apply_move`], which updates both
/// in one step.
#[derive(Clone, PartialEq, Eq)]
pub struct Position {
    board: [Option<Piece>; NUM_SQUARES],
    pieces: [[PieceSet; 5]; 2],
    king_squares: [Square; 2],
    castling: CastlingRights,
    en_passant_file: Option<u8>,
    halfmove_clock: u32,
    ply: u32,
    side_to_move: Color,
}

impl Default for Position {
    fn default() -> Self {
        Self::startpos()
    }
}

impl Position {
    /// Empty board with white to move; only used while loading.
    fn empty() -> Self {
        Self {
            board: [None; NUM_SQUARES],
            pieces: Default::default(),
            king_squares: [Square::E1, Square::E8],
            castling: CastlingRights::NONE,
            en_passant_file: None,
            halfmove_clock: 0,
            ply: 0,
            side_to_move: Color::White,
        }
    }

    /// The standard starting layout.
    pub fn startpos() -> Self {
        match Self::from_text(STARTING_POSITION) {
            Ok(position) => position,
            Err(e) => unreachable!("starting position must parse: {e}"),
        }
    }

    /// Get the piece at a given square, if any
    #[inline]
    pub fn piece_at(&self, square: Square) -> Option<Piece> {
        self.board[square.index()]
    }

    #[inline]
    pub fn side_to_move(&self) -> Color {
        self.side_to_move
    }

    #[inline]
    pub fn king_square(&self, color: Color) -> Square {
        self.king_squares[color.index()]
    }

    #[inline]
    pub fn castling_rights(&self) -> CastlingRights {
        self.castling
    }

    /// File of the pawn that just made a double push, if any.
    #[inline]
    pub fn en_passant_file(&self) -> Option<u8> {
        self.en_passant_file
    }

    /// Square a capturing pawn would land on for an en-passant capture.
    pub fn en_passant_square(&self) -> Option<Square> {
        let rank = match self.side_to_move {
            Color::White => 5,
            Color::Black => 2,
        };
        self.en_passant_file
            .map(|file| Square::from_coords(file, rank))
    }

    /// Plies since the last pawn move or capture.
    #[inline]
    pub fn halfmove_clock(&self) -> u32 {
        self.halfmove_clock
    }

    /// Plies played since the start of the game.
    #[inline]
    pub fn ply(&self) -> u32 {
        self.ply
    }

    #[inline]
    pub fn fullmove_number(&self) -> u32 {
        self.ply / 2 + 1
    }

    /// Piece set for a non-king kind.
    ///
    /// # Panics
    /// Kings have no piece set; use [`Position::king_square`].
    #[inline]
    pub fn pieces(&self, color: Color, kind: PieceKind) -> &PieceSet {
        let Some(slot) = set_slot(kind) else {
            panic!("kings are tracked by king_square, not a piece set");
        };
        &self.pieces[color.index()][slot]
    }

    /// Number of pieces of `kind` owned by `color`.
    pub fn count(&self, color: Color, kind: PieceKind) -> usize {
        match set_slot(kind) {
            Some(slot) => self.pieces[color.index()][slot].len(),
            None => 1,
        }
    }

    /// All occupied squares of `color`, kings included.
    pub fn occupied_by(&self, color: Color) -> impl Iterator<Item = (Square, Piece)> + '_ {
        Square::all().filter_map(move |sq| {
            self.piece_at(sq)
                .filter(|piece| piece.color == color)
                .map(|piece| (sq, piece))
        })
    }

    /// Plays `mv` without checking legality.
    ///
    /// The move must come from the legal move set of this position;
    /// [`GameState::apply_move`](crate::GameState::apply_move) enforces that.
    pub fn apply_move(&mut self, mv: Move) {
        let us = self.side_to_move;
        let (from, to) = (mv.from(), mv.to());
        let Some(moving) = self.piece_at(from) else {
            panic!("no piece on {from} for move {mv}");
        };
        debug_assert_eq!(moving.color, us, "moving piece of the wrong color");

        let mut irreversible = moving.kind == PieceKind::Pawn;

        match mv.flag() {
            MoveFlag::CastleKing | MoveFlag::CastleQueen => {
                let side = if mv.flag() == MoveFlag::CastleKing {
                    CastleSide::King
                } else {
                    CastleSide::Queen
                };
                let rank = us.back_rank();
                self.relocate(from, to);
                self.relocate(
                    Square::from_coords(side.rook_file(), rank),
                    Square::from_coords(side.rook_target_file(), rank),
                );
                self.castling.clear(us);
            }
            MoveFlag::EnPassant => {
                // The captured pawn sits beside the origin, behind the destination.
                self.remove(Square::from_coords(to.file(), from.rank()));
                self.relocate(from, to);
            }
            flag => {
                if self.piece_at(to).is_some() {
                    self.remove(to);
                    irreversible = true;
                }
                match flag.promotion() {
                    Some(kind) => {
                        self.remove(from);
                        self.put(to, Piece::new(us, kind));
                    }
                    None => self.relocate(from, to),
                }
            }
        }

        self.castling.vacate(from);
        self.castling.vacate(to);
        self.en_passant_file = (mv.flag() == MoveFlag::DoublePawnPush).then_some(from.file());
        self.halfmove_clock = if irreversible {
            0
        } else {
            self.halfmove_clock.saturating_add(1)
        };
        self.ply = self.ply.saturating_add(1);
        self.side_to_move = us.opposite();
    }

    fn put(&mut self, square: Square, piece: Piece) {
        debug_assert!(self.board[square.index()].is_none());
        match set_slot(piece.kind) {
            Some(slot) => self.pieces[piece.color.index()][slot].add(square),
            None => self.king_squares[piece.color.index()] = square,
        }
        self.board[square.index()] = Some(piece);
    }

    fn remove(&mut self, square: Square) -> Piece {
        let Some(piece) = self.board[square.index()].take() else {
            panic!("removing piece from empty square {square}");
        };
        match set_slot(piece.kind) {
            Some(slot) => self.pieces[piece.color.index()][slot].remove(square),
            None => panic!("attempted to remove the {} king on {square}", piece.color),
        }
        piece
    }

    fn relocate(&mut self, from: Square, to: Square) {
        let Some(piece) = self.board[from.index()].take() else {
            panic!("relocating piece from empty square {from}");
        };
        debug_assert!(self.board[to.index()].is_none());
        match set_slot(piece.kind) {
            Some(slot) => self.pieces[piece.color.index()][slot].relocate(from, to),
            None => self.king_squares[piece.color.index()] = to,
        }
        self.board[to.index()] = Some(piece);
    }
}

impl std::fmt::Debug for Position {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("Position").field(&self.to_text()).finish()
    }
}
