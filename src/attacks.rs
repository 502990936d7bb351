//! Attack, check and pin analysis for the side to move.
//!
//! [`analyze`] walks the eight rays out of the friendly king to find slider
//! checks and pins, then marks every square the opponent attacks. Enemy
//! slider rays pass through the friendly king so that it cannot step
//! backwards along the line it is checked on.

use crate::position::Position;
use crate::types::{Color, Direction, PieceKind, Square, SquareSet};

/// Knight jump offsets. A legal jump never moves more than two files.
pub(crate) const KNIGHT_OFFSETS: [i8; 8] = [17, 15, 10, 6, -6, -10, -15, -17];

/// Diagonals a pawn of `color` captures along.
#[inline]
pub(crate) const fn pawn_capture_directions(color: Color) -> [Direction; 2] {
    match color {
        Color::White => [Direction::NorthWest, Direction::NorthEast],
        Color::Black => [Direction::SouthWest, Direction::SouthEast],
    }
}

#[inline]
pub(crate) fn knight_targets(from: Square) -> impl Iterator<Item = Square> {
    KNIGHT_OFFSETS
        .into_iter()
        .filter_map(move |offset| from.jump(offset, 2))
}

#[inline]
pub(crate) fn king_targets(from: Square) -> impl Iterator<Item = Square> {
    Direction::ALL
        .into_iter()
        .filter_map(move |direction| from.offset(direction))
}

/// Ray directions a sliding piece of `kind` moves along.
pub(crate) const fn slider_directions(kind: PieceKind) -> &'static [Direction] {
    match kind {
        PieceKind::Queen => &Direction::ALL,
        PieceKind::Rook => &Direction::ORTHOGONAL,
        PieceKind::Bishop => &Direction::DIAGONAL,
        PieceKind::King | PieceKind::Knight | PieceKind::Pawn => &[],
    }
}

/// A friendly piece that may only move along the line between its king and
/// an enemy slider.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pin {
    /// Square of the pinned piece.
    pub square: Square,
    /// Direction from the king towards the pinning slider.
    pub direction: Direction,
    /// Squares from the king (exclusive) to the pinner (inclusive).
    ray: SquareSet,
}

impl Pin {
    /// Whether the pinned piece may land on `to` without leaving the pin axis.
    #[inline]
    pub fn allows(&self, to: Square) -> bool {
        self.ray.contains(to)
    }

    /// Whether sliding along `direction` keeps the piece on the pin axis.
    #[inline]
    pub fn allows_direction(&self, direction: Direction) -> bool {
        direction == self.direction || direction == self.direction.opposite()
    }
}

/// How a checking piece attacks the king.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CheckKind {
    /// Bishop, rook or queen along a ray; may be blocked.
    Slider,
    Knight,
    Pawn,
}

impl CheckKind {
    #[inline]
    pub const fn is_blockable(self) -> bool {
        matches!(self, CheckKind::Slider)
    }
}

/// Snapshot of the opponent's attacks against the side to move.
///
/// Built fresh by [`analyze`] for every query and never stored in the
/// position.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AttackContext {
    attacked: SquareSet,
    checkers: SquareSet,
    unblockable: bool,
    resolving: SquareSet,
    pins: Vec<Pin>,
}

impl AttackContext {
    /// Squares the opponent attacks, counting the friendly king as transparent.
    #[inline]
    pub fn attacked(&self) -> SquareSet {
        self.attacked
    }

    #[inline]
    pub fn is_attacked(&self, square: Square) -> bool {
        self.attacked.contains(square)
    }

    /// Squares of the pieces giving check.
    #[inline]
    pub fn checkers(&self) -> SquareSet {
        self.checkers
    }

    #[inline]
    pub fn checker_count(&self) -> u32 {
        self.checkers.count()
    }

    #[inline]
    pub fn in_check(&self) -> bool {
        !self.checkers.is_empty()
    }

    #[inline]
    pub fn in_double_check(&self) -> bool {
        self.checkers.count() >= 2
    }

    /// True when a knight or pawn gives check, which only a capture or a
    /// king move can answer.
    #[inline]
    pub fn is_unblockable(&self) -> bool {
        self.unblockable
    }

    /// Under a single check: the squares a non-king move must land on to
    /// resolve it (the checker, plus the interposition squares of a slider
    /// check). Empty when not in check or in double check.
    #[inline]
    pub fn resolving_squares(&self) -> SquareSet {
        self.resolving
    }

    #[inline]
    pub fn pins(&self) -> &[Pin] {
        &self.pins
    }

    #[inline]
    pub fn pin_on(&self, square: Square) -> Option<&Pin> {
        self.pins.iter().find(|pin| pin.square == square)
    }

    fn add_check(&mut self, checker: Square, kind: CheckKind, ray: SquareSet) {
        if self.checkers.contains(checker) {
            return;
        }
        self.checkers.insert(checker);
        if self.checkers.count() == 1 {
            self.unblockable = !kind.is_blockable();
            self.resolving = match kind {
                CheckKind::Slider => ray,
                CheckKind::Knight | CheckKind::Pawn => [checker].into_iter().collect(),
            };
        } else {
            self.unblockable |= !kind.is_blockable();
            self.resolving = SquareSet::EMPTY;
        }
    }
}

/// Computes attacked squares, checkers and pins for the side to move.
pub fn analyze(position: &Position) -> AttackContext {
    let us = position.side_to_move();
    let them = us.opposite();
    let king = position.king_square(us);
    let mut ctx = AttackContext::default();

    scan_king_rays(position, us, king, &mut ctx);

    for kind in [PieceKind::Queen, PieceKind::Rook, PieceKind::Bishop] {
        for from in position.pieces(them, kind).iter() {
            for &direction in slider_directions(kind) {
                mark_ray(position, from, direction, king, &mut ctx.attacked);
            }
        }
    }

    for from in position.pieces(them, PieceKind::Knight).iter() {
        for to in knight_targets(from) {
            ctx.attacked.insert(to);
            if to == king {
                ctx.add_check(from, CheckKind::Knight, SquareSet::EMPTY);
            }
        }
    }

    for from in position.pieces(them, PieceKind::Pawn).iter() {
        for direction in pawn_capture_directions(them) {
            if let Some(to) = from.offset(direction) {
                ctx.attacked.insert(to);
                if to == king {
                    ctx.add_check(from, CheckKind::Pawn, SquareSet::EMPTY);
                }
            }
        }
    }

    for to in king_targets(position.king_square(them)) {
        ctx.attacked.insert(to);
    }

    ctx
}

/// Walks outwards from the friendly king along every ray, registering slider
/// checks (no friendly piece in between) and pins (exactly one).
fn scan_king_rays(position: &Position, us: Color, king: Square, ctx: &mut AttackContext) {
    let them = us.opposite();
    let has_orthogonal = !position.pieces(them, PieceKind::Rook).is_empty()
        || !position.pieces(them, PieceKind::Queen).is_empty();
    let has_diagonal = !position.pieces(them, PieceKind::Bishop).is_empty()
        || !position.pieces(them, PieceKind::Queen).is_empty();

    for direction in Direction::ALL {
        let relevant = if direction.is_diagonal() {
            has_diagonal
        } else {
            has_orthogonal
        };
        if !relevant {
            continue;
        }

        let mut ray = SquareSet::EMPTY;
        let mut blocker = None;
        let mut current = king;
        while let Some(next) = current.offset(direction) {
            current = next;
            ray.insert(next);
            let Some(piece) = position.piece_at(next) else {
                continue;
            };
            if piece.color == us {
                if blocker.is_some() {
                    break;
                }
                blocker = Some(next);
                continue;
            }
            if piece.kind.slides_along(direction) {
                match blocker {
                    None => ctx.add_check(next, CheckKind::Slider, ray),
                    Some(square) => ctx.pins.push(Pin {
                        square,
                        direction,
                        ray,
                    }),
                }
            }
            break;
        }
    }
}

/// Marks every square a slider on `from` attacks along `direction`. The
/// friendly king does not stop the ray.
fn mark_ray(
    position: &Position,
    from: Square,
    direction: Direction,
    transparent: Square,
    attacked: &mut SquareSet,
) {
    let mut current = from;
    while let Some(next) = current.offset(direction) {
        current = next;
        attacked.insert(next);
        if next != transparent && position.piece_at(next).is_some() {
            break;
        }
    }
}

/// Whether any piece of color `by` attacks `square`.
pub fn is_attacked(position: &Position, square: Square, by: Color) -> bool {
    for direction in Direction::ALL {
        let mut current = square;
        while let Some(next) = current.offset(direction) {
            current = next;
            if let Some(piece) = position.piece_at(next) {
                if piece.color == by && piece.kind.slides_along(direction) {
                    return true;
                }
                break;
            }
        }
    }

    let holds = |sq: Square, kind: PieceKind| {
        position
            .piece_at(sq)
            .is_some_and(|piece| piece.color == by && piece.kind == kind)
    };

    knight_targets(square).any(|sq| holds(sq, PieceKind::Knight))
        || king_targets(square).any(|sq| holds(sq, PieceKind::King))
        // A pawn attacking `square` sits one capture-step back from it
        || pawn_capture_directions(by.opposite())
            .into_iter()
            .filter_map(|direction| square.offset(direction))
            .any(|sq| holds(sq, PieceKind::Pawn))
}
