use crate::movegen::legal_moves;
use crate::moves::Move;
use crate::position::Position;

/// Counts leaf nodes of the legal move tree to `depth` plies.
pub fn perft(position: &Position, depth: u32) -> u64 {
    if depth == 0 {
        return 1;
    }

    let moves = legal_moves(position);
    if depth == 1 {
        return moves.len() as u64;
    }

    moves
        .into_iter()
        .map(|mv| {
            let mut next = position.clone();
            next.apply_move(mv);
            perft(&next, depth - 1)
        })
        .sum()
}

/// Per-root-move leaf counts, sorted by move text.
pub fn perft_divide(position: &Position, depth: u32) -> Vec<(Move, u64)> {
    let mut divided: Vec<(Move, u64)> = legal_moves(position)
        .into_iter()
        .map(|mv| {
            let mut next = position.clone();
            next.apply_move(mv);
            (mv, perft(&next, depth.saturating_sub(1)))
        })
        .collect();
    divided.sort_by_key(|(mv, _)| mv.to_string());
    divided
}
