use std::fmt;
use std::str::FromStr;

use log::{debug, warn};
use thiserror::Error;

use super::{CastleSide, Position};
use crate::attacks;
use crate::types::{Color, Piece, PieceKind, Square, SquareParseError};

/// The standard start layout in six-field position text.
pub const STARTING_POSITION: &str = "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1";

/// Error when loading position text.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    #[error("expected 6 whitespace-separated fields, found {0}")]
    FieldCount(usize),
    #[error("expected 8 ranks in piece placement, found {0}")]
    RankCount(usize),
    #[error("rank {rank} does not describe exactly 8 squares")]
    RankLength { rank: u8 },
    #[error("unrecognized piece letter '{0}'")]
    UnknownPiece(char),
    #[error("side to move must be 'w' or 'b', found '{0}'")]
    SideToMove(String),
    #[error("unrecognized castling letter '{0}'")]
    Castling(char),
    #[error("invalid en-passant target '{0}'")]
    EnPassant(String),
    #[error("invalid en-passant square: {0}")]
    EnPassantSquare(#[from] SquareParseError),
    #[error("clock field is not a number: '{0}'")]
    Clock(String),
    #[error("{color} must have exactly one king, found {count}")]
    KingCount { color: Color, count: usize },
    #[error("too many {0:?} pieces")]
    TooManyPieces(Piece),
    #[error("pawn on back rank at {0}")]
    PawnOnBackRank(Square),
    #[error("side not to move is in check")]
    OpponentInCheck,
}

impl Position {
    /// Parses six-field position text (placement, side to move, castling
    /// rights, en-passant target, half-move clock, full-move number).
    ///
    /// Loading is all-or-nothing: any malformed field fails the whole parse.
    /// Castling rights whose king or rook is not on its home square are
    /// dropped with a warning.
    pub fn from_text(text: &str) -> Result<Self, ParseError> {
        let fields: Vec<&str> = text.split_whitespace().collect();
        let [placement, side, castling, en_passant, halfmove, fullmove] = fields[..] else {
            return Err(ParseError::FieldCount(fields.len()));
        };

        let mut position = Position::empty();
        parse_placement(&mut position, placement)?;

        position.side_to_move = match side {
            "w" => Color::White,
            "b" => Color::Black,
            other => return Err(ParseError::SideToMove(other.to_string())),
        };

        if castling != "-" {
            for ch in castling.chars() {
                let (color, side) = match ch {
                    'K' => (Color::White, CastleSide::King),
                    'Q' => (Color::White, CastleSide::Queen),
                    'k' => (Color::Black, CastleSide::King),
                    'q' => (Color::Black, CastleSide::Queen),
                    other => return Err(ParseError::Castling(other)),
                };
                if position.castle_pieces_home(color, side) {
                    position.castling.set(color, side);
                } else {
                    warn!("dropping castling right '{ch}': king or rook not on its home square");
                }
            }
        }

        if en_passant != "-" {
            let square: Square = en_passant.parse()?;
            let expected_rank = match position.side_to_move {
                Color::White => 5,
                Color::Black => 2,
            };
            if square.rank() != expected_rank {
                return Err(ParseError::EnPassant(en_passant.to_string()));
            }
            position.en_passant_file = Some(square.file());
        }

        position.halfmove_clock = parse_clock(halfmove)?;
        let fullmove_number = parse_clock(fullmove)?.max(1);
        position.ply = (fullmove_number - 1)
            .checked_mul(2)
            .and_then(|ply| ply.checked_add(position.side_to_move.index() as u32))
            .ok_or_else(|| ParseError::Clock(fullmove.to_string()))?;

        let them = position.side_to_move.opposite();
        if attacks::is_attacked(&position, position.king_square(them), position.side_to_move) {
            return Err(ParseError::OpponentInCheck);
        }

        debug!("loaded position {}", position.to_text());
        Ok(position)
    }

    fn castle_pieces_home(&self, color: Color, side: CastleSide) -> bool {
        let rank = color.back_rank();
        self.king_square(color) == Square::from_coords(4, rank)
            && self.piece_at(Square::from_coords(side.rook_file(), rank))
                == Some(Piece::new(color, PieceKind::Rook))
    }

    /// Renders the position back into six-field text.
    pub fn to_text(&self) -> String {
        let mut text = String::with_capacity(90);

        for rank in (0..8).rev() {
            let mut empty = 0;
            for file in 0..8 {
                match self.piece_at(Square::from_coords(file, rank)) {
                    Some(piece) => {
                        if empty > 0 {
                            text.push(char::from(b'0' + empty));
                            empty = 0;
                        }
                        text.push(piece.char());
                    }
                    None => empty += 1,
                }
            }
            if empty > 0 {
                text.push(char::from(b'0' + empty));
            }
            if rank > 0 {
                text.push('/');
            }
        }

        text.push(' ');
        text.push(match self.side_to_move {
            Color::White => 'w',
            Color::Black => 'b',
        });

        text.push(' ');
        if self.castling.is_empty() {
            text.push('-');
        } else {
            for (color, side, ch) in [
                (Color::White, CastleSide::King, 'K'),
                (Color::White, CastleSide::Queen, 'Q'),
                (Color::Black, CastleSide::King, 'k'),
                (Color::Black, CastleSide::Queen, 'q'),
            ] {
                if self.castling.has(color, side) {
                    text.push(ch);
                }
            }
        }

        text.push(' ');
        match self.en_passant_square() {
            Some(square) => text.push_str(&square.to_string()),
            None => text.push('-'),
        }

        text.push_str(&format!(
            " {} {}",
            self.halfmove_clock,
            self.fullmove_number()
        ));
        text
    }
}

fn parse_placement(position: &mut Position, placement: &str) -> Result<(), ParseError> {
    let ranks: Vec<&str> = placement.split('/').collect();
    if ranks.len() != 8 {
        return Err(ParseError::RankCount(ranks.len()));
    }

    let mut kings = [0usize; 2];
    // Ranks are listed from 8 down to 1
    for (row, rank_text) in ranks.iter().enumerate() {
        let rank = 7 - row as u8;
        let mut file = 0u8;
        for ch in rank_text.chars() {
            if let Some(run) = ch.to_digit(10) {
                if !(1..=8).contains(&run) || file as u32 + run > 8 {
                    return Err(ParseError::RankLength { rank: rank + 1 });
                }
                file += run as u8;
                continue;
            }
            let piece = Piece::from_char(ch).ok_or(ParseError::UnknownPiece(ch))?;
            if file >= 8 {
                return Err(ParseError::RankLength { rank: rank + 1 });
            }
            let square = Square::from_coords(file, rank);
            match piece.kind {
                PieceKind::King => kings[piece.color.index()] += 1,
                PieceKind::Pawn if rank == 0 || rank == 7 => {
                    return Err(ParseError::PawnOnBackRank(square));
                }
                kind if position.pieces(piece.color, kind).is_full() => {
                    return Err(ParseError::TooManyPieces(piece));
                }
                _ => {}
            }
            position.put(square, piece);
            file += 1;
        }
        if file != 8 {
            return Err(ParseError::RankLength { rank: rank + 1 });
        }
    }

    for color in [Color::White, Color::Black] {
        let count = kings[color.index()];
        if count != 1 {
            return Err(ParseError::KingCount { color, count });
        }
    }
    Ok(())
}

fn parse_clock(field: &str) -> Result<u32, ParseError> {
    field
        .parse()
        .map_err(|_| ParseError::Clock(field.to_string()))
}

impl FromStr for Position {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_text(s)
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_text())
    }
}
