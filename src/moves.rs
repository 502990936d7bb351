use std::fmt;

use crate::types::{PieceKind, Square};

/// What kind of transition a [`Move`] performs beyond relocating a piece.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MoveFlag {
    Normal,
    DoublePawnPush,
    EnPassant,
    CastleKing,
    CastleQueen,
    PromoteKnight,
    PromoteBishop,
    PromoteRook,
    PromoteQueen,
}

impl MoveFlag {
    pub const PROMOTIONS: [MoveFlag; 4] = [
        MoveFlag::PromoteQueen,
        MoveFlag::PromoteRook,
        MoveFlag::PromoteBishop,
        MoveFlag::PromoteKnight,
    ];

    /// Piece kind a promotion flag produces.
    #[inline]
    pub const fn promotion(self) -> Option<PieceKind> {
        match self {
            MoveFlag::PromoteKnight => Some(PieceKind::Knight),
            MoveFlag::PromoteBishop => Some(PieceKind::Bishop),
            MoveFlag::PromoteRook => Some(PieceKind::Rook),
            MoveFlag::PromoteQueen => Some(PieceKind::Queen),
            MoveFlag::Normal
            | MoveFlag::DoublePawnPush
            | MoveFlag::EnPassant
            | MoveFlag::CastleKing
            | MoveFlag::CastleQueen => None,
        }
    }

    #[inline]
    pub const fn is_castle(self) -> bool {
        matches!(self, MoveFlag::CastleKing | MoveFlag::CastleQueen)
    }
}

/// A single move: origin, destination and flag. Immutable once built.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Move {
    from: Square,
    to: Square,
    flag: MoveFlag,
}

impl Move {
    #[inline]
    pub const fn new(from: Square, to: Square, flag: MoveFlag) -> Self {
        Self { from, to, flag }
    }

    #[inline]
    pub const fn normal(from: Square, to: Square) -> Self {
        Self::new(from, to, MoveFlag::Normal)
    }

    #[inline]
    pub const fn from(self) -> Square {
        self.from
    }

    #[inline]
    pub const fn to(self) -> Square {
        self.to
    }

    #[inline]
    pub const fn flag(self) -> MoveFlag {
        self.flag
    }

    #[inline]
    pub const fn promotion(self) -> Option<PieceKind> {
        self.flag.promotion()
    }
}

/// Coordinate notation: `e2e4`, `e7e8q`, castling as the king's move (`e1g1`).
impl fmt::Display for Move {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.from, self.to)?;
        if let Some(kind) = self.promotion() {
            write!(f, "{}", kind.char())?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    fn sq(name: &str) -> Square {
        name.parse().expect("test square is invalid")
    }

    #[test_case(MoveFlag::Normal, "e2e4")]
    #[test_case(MoveFlag::PromoteQueen, "e2e4q")]
    #[test_case(MoveFlag::PromoteKnight, "e2e4n")]
    #[test_case(MoveFlag::CastleKing, "e2e4")]
    fn test_display(flag: MoveFlag, expected: &str) {
        let mv = Move::new(sq("e2"), sq("e4"), flag);
        assert_eq!(mv.to_string(), expected);
    }

    #[test]
    fn test_promotion_kinds() {
        let kinds: Vec<_> = MoveFlag::PROMOTIONS
            .iter()
            .filter_map(|flag| flag.promotion())
            .collect();
        assert_eq!(
            kinds,
            vec![
                PieceKind::Queen,
                PieceKind::Rook,
                PieceKind::Bishop,
                PieceKind::Knight
            ]
        );
        assert_eq!(MoveFlag::EnPassant.promotion(), None);
    }
}
