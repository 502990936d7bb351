use std::sync::{Arc, OnceLock};

use log::debug;
use rand::rngs::StdRng;
use rand::{RngCore, SeedableRng};

use crate::position::Position;
use crate::types::{Color, NUM_SQUARES, Piece, Square};

const PIECE_VARIANTS: usize = 12;

/// Zobrist-style position fingerprints for repetition detection.
///
/// Every square/piece combination gets an independent random 64-bit key and
/// a position hashes to the XOR of the keys of its occupied squares.
/// Collisions are possible but negligible for a repetition count.
#[derive(Clone, PartialEq, Eq)]
pub struct PositionHasher {
    pieces: [[u64; PIECE_VARIANTS]; NUM_SQUARES],
    black_to_move: u64,
    castling: [u64; 16],
    en_passant: [u64; 8],
}

static GLOBAL: OnceLock<Arc<PositionHasher>> = OnceLock::new();

#[inline]
const fn variant(piece: Piece) -> usize {
    piece.color.index() * 6 + piece.kind.index()
}

impl PositionHasher {
    /// Builds a key table from a fixed seed; the same seed always yields the
    /// same hashes.
    pub fn new(seed: u64) -> Self {
        let mut rng = StdRng::seed_from_u64(seed);
        let mut pieces = [[0; PIECE_VARIANTS]; NUM_SQUARES];
        for square in pieces.iter_mut() {
            for key in square.iter_mut() {
                *key = rng.next_u64();
            }
        }
        let black_to_move = rng.next_u64();
        let castling = std::array::from_fn(|_| rng.next_u64());
        let en_passant = std::array::from_fn(|_| rng.next_u64());
        Self {
            pieces,
            black_to_move,
            castling,
            en_passant,
        }
    }

    /// Process-wide table, randomly seeded on first use.
    pub fn global() -> Arc<PositionHasher> {
        GLOBAL
            .get_or_init(|| {
                let seed = rand::random();
                debug!("seeding position hasher");
                Arc::new(PositionHasher::new(seed))
            })
            .clone()
    }

    /// Hash of the piece placement alone.
    pub fn placement_hash(&self, position: &Position) -> u64 {
        Square::all()
            .filter_map(|square| {
                position
                    .piece_at(square)
                    .map(|piece| self.pieces[square.index()][variant(piece)])
            })
            .fold(0, |hash, key| hash ^ key)
    }

    /// Repetition key: placement plus side to move, castling rights and the
    /// en-passant file.
    pub fn hash(&self, position: &Position) -> u64 {
        let mut hash = self.placement_hash(position);
        if position.side_to_move() == Color::Black {
            hash ^= self.black_to_move;
        }
        hash ^= self.castling[position.castling_rights().bits() as usize];
        if let Some(file) = position.en_passant_file() {
            hash ^= self.en_passant[file as usize];
        }
        hash
    }
}

impl std::fmt::Debug for PositionHasher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PositionHasher")
            .field("black_to_move", &format_args!("{:#018X}", self.black_to_move))
            .finish_non_exhaustive()
    }
}
