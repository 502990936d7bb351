use log::trace;

use crate::attacks::{self, AttackContext, knight_targets, pawn_capture_directions, slider_directions};
use crate::moves::{Move, MoveFlag};
use crate::position::{CastleSide, Position};
use crate::types::{Color, Direction, Piece, PieceKind, Square};

/// Generates the complete set of strictly legal moves for the side to move.
///
/// The result is unordered; callers must not rely on move order.
pub fn legal_moves(position: &Position) -> Vec<Move> {
    let ctx = attacks::analyze(position);
    legal_moves_with(position, &ctx)
}

/// Like [`legal_moves`], reusing an [`AttackContext`] already computed for
/// `position`.
pub fn legal_moves_with(position: &Position, ctx: &AttackContext) -> Vec<Move> {
    let generator = MoveGenerator::new(position, ctx);
    let moves = generator.generate();
    trace!(
        "generated {} moves for {} (checkers: {})",
        moves.len(),
        position.side_to_move(),
        ctx.checker_count()
    );
    moves
}

struct MoveGenerator<'a> {
    position: &'a Position,
    ctx: &'a AttackContext,
    us: Color,
    king: Square,
    moves: Vec<Move>,
}

impl<'a> MoveGenerator<'a> {
    fn new(position: &'a Position, ctx: &'a AttackContext) -> Self {
        let us = position.side_to_move();
        Self {
            position,
            ctx,
            us,
            king: position.king_square(us),
            moves: Vec::with_capacity(64),
        }
    }

    fn generate(mut self) -> Vec<Move> {
        self.king_moves();

        // Only the king can answer two checkers at once
        if self.ctx.in_double_check() {
            return self.moves;
        }

        let position = self.position;
        for kind in [
            PieceKind::Queen,
            PieceKind::Rook,
            PieceKind::Bishop,
            PieceKind::Knight,
            PieceKind::Pawn,
        ] {
            for from in position.pieces(self.us, kind).iter() {
                match kind {
                    PieceKind::Queen | PieceKind::Rook | PieceKind::Bishop => {
                        self.slider_moves(from, kind)
                    }
                    PieceKind::Knight => self.knight_moves(from),
                    PieceKind::Pawn => self.pawn_moves(from),
                    PieceKind::King => unreachable!("kings are not kept in piece sets"),
                }
            }
        }

        self.en_passant();

        if !self.ctx.in_check() {
            self.castling();
        }

        self.moves
    }

    #[inline]
    fn is_ours(&self, square: Square) -> bool {
        self.position
            .piece_at(square)
            .is_some_and(|piece| piece.color == self.us)
    }

    /// Whether a non-king piece on `from` may land on `to`: it must resolve a
    /// pending check and stay on its pin axis, if any.
    #[inline]
    fn permits(&self, from: Square, to: Square) -> bool {
        if self.ctx.in_check() && !self.ctx.resolving_squares().contains(to) {
            return false;
        }
        self.ctx.pin_on(from).is_none_or(|pin| pin.allows(to))
    }

    fn king_moves(&mut self) {
        for direction in Direction::ALL {
            let Some(to) = self.king.offset(direction) else {
                continue;
            };
            if !self.ctx.is_attacked(to) && !self.is_ours(to) {
                self.moves.push(Move::normal(self.king, to));
            }
        }
    }

    fn slider_moves(&mut self, from: Square, kind: PieceKind) {
        let pin = self.ctx.pin_on(from).copied();
        for &direction in slider_directions(kind) {
            // A pinned slider can only travel along its pin axis
            if pin.is_some_and(|pin| !pin.allows_direction(direction)) {
                continue;
            }
            let mut current = from;
            while let Some(to) = current.offset(direction) {
                current = to;
                let occupant = self.position.piece_at(to);
                if occupant.is_some_and(|piece| piece.color == self.us) {
                    break;
                }
                if self.permits(from, to) {
                    self.moves.push(Move::normal(from, to));
                }
                if occupant.is_some() {
                    break;
                }
            }
        }
    }

    fn knight_moves(&mut self, from: Square) {
        // A pinned knight can never stay on its pin axis
        if self.ctx.pin_on(from).is_some() {
            return;
        }
        for to in knight_targets(from) {
            if !self.is_ours(to) && self.permits(from, to) {
                self.moves.push(Move::normal(from, to));
            }
        }
    }

    fn pawn_moves(&mut self, from: Square) {
        let forward = self.us.forward();

        if let Some(one) = from.offset(forward)
            && self.position.piece_at(one).is_none()
        {
            if self.permits(from, one) {
                self.push_pawn_move(from, one);
            }
            if from.rank() == self.us.pawn_rank()
                && let Some(two) = one.offset(forward)
                && self.position.piece_at(two).is_none()
                && self.permits(from, two)
            {
                self.moves
                    .push(Move::new(from, two, MoveFlag::DoublePawnPush));
            }
        }

        for direction in pawn_capture_directions(self.us) {
            let Some(to) = from.offset(direction) else {
                continue;
            };
            let is_enemy = self
                .position
                .piece_at(to)
                .is_some_and(|piece| piece.color != self.us);
            if is_enemy && self.permits(from, to) {
                self.push_pawn_move(from, to);
            }
        }
    }

    /// Pushes a pawn move, expanding it into the four promotions on the last rank.
    fn push_pawn_move(&mut self, from: Square, to: Square) {
        if to.rank() == self.us.promotion_rank() {
            for flag in MoveFlag::PROMOTIONS {
                self.moves.push(Move::new(from, to, flag));
            }
        } else {
            self.moves.push(Move::normal(from, to));
        }
    }

    fn en_passant(&mut self) {
        let Some(target) = self.position.en_passant_square() else {
            return;
        };
        let Some(captured) = target.offset(self.us.opposite().forward()) else {
            return;
        };
        let our_pawn = Some(Piece::new(self.us, PieceKind::Pawn));
        if self.position.piece_at(captured) != Some(Piece::new(self.us.opposite(), PieceKind::Pawn))
            || self.position.piece_at(target).is_some()
        {
            return;
        }

        for side in [Direction::East, Direction::West] {
            let Some(from) = captured.offset(side) else {
                continue;
            };
            if self.position.piece_at(from) != our_pawn {
                continue;
            }

            // Under check the capture must either remove the checking pawn or
            // block a slider on the destination square
            if self.ctx.in_check()
                && !self.ctx.resolving_squares().contains(target)
                && !self.ctx.resolving_squares().contains(captured)
            {
                continue;
            }
            if self.ctx.pin_on(from).is_some_and(|pin| !pin.allows(target)) {
                continue;
            }
            if self.exposes_king(from, captured, target) {
                continue;
            }

            self.moves.push(Move::new(from, target, MoveFlag::EnPassant));
        }
    }

    /// Both pawns leave their squares at once and the capturer lands on
    /// `target`. On the king's rank this can uncover a rook or queen that
    /// neither pawn is pinned to on its own; the captured pawn may also have
    /// been the only piece on a diagonal into the king.
    fn exposes_king(&self, from: Square, captured: Square, target: Square) -> bool {
        Direction::ALL.into_iter().any(|direction| {
            let mut current = self.king;
            while let Some(next) = current.offset(direction) {
                current = next;
                if next == target {
                    return false;
                }
                if next == from || next == captured {
                    continue;
                }
                if let Some(piece) = self.position.piece_at(next) {
                    return piece.color != self.us && piece.kind.slides_along(direction);
                }
            }
            false
        })
    }

    fn castling(&mut self) {
        let rights = self.position.castling_rights();
        let rank = self.us.back_rank();
        let our_rook = Some(Piece::new(self.us, PieceKind::Rook));

        for side in CastleSide::BOTH {
            if !rights.has(self.us, side) {
                continue;
            }
            let rook = Square::from_coords(side.rook_file(), rank);
            if self.king != Square::from_coords(4, rank) || self.position.piece_at(rook) != our_rook
            {
                continue;
            }

            let (low, high) = if side.rook_file() < 4 {
                (side.rook_file() + 1, 4)
            } else {
                (5, side.rook_file())
            };
            let path_clear = (low..high)
                .all(|file| self.position.piece_at(Square::from_coords(file, rank)).is_none());
            if !path_clear {
                continue;
            }

            // The king may not pass through or land on an attacked square
            let transit = Square::from_coords(side.rook_target_file(), rank);
            let destination = Square::from_coords(side.king_file(), rank);
            if self.ctx.is_attacked(transit) || self.ctx.is_attacked(destination) {
                continue;
            }

            self.moves.push(Move::new(self.king, destination, side.flag()));
        }
    }
}
