use crate::types::{NUM_SQUARES, Square};

/// Most pieces of one kind and color a legal game can produce
/// (two originals plus eight promotions).
pub const CAPACITY: usize = 16;

const ABSENT: u8 = u8::MAX;

/// Sparse set of the squares occupied by one kind of piece of one color.
///
/// Squares are packed densely in `squares[..len]`, with `index` mapping a
/// square back to its slot. Removal swaps the last entry into the freed slot,
/// so iteration order is unspecified and changes after any mutation.
///
/// Misuse (adding an occupied square, removing an absent one) is a bug in the
/// caller and panics.
#[derive(Clone)]
pub struct PieceSet {
    squares: [Square; CAPACITY],
    index: [u8; NUM_SQUARES],
    len: u8,
}

/// Equality is membership equality; slot order is ignored.
impl PartialEq for PieceSet {
    fn eq(&self, other: &Self) -> bool {
        self.len == other.len && self.iter().all(|square| other.contains(square))
    }
}

impl Eq for PieceSet {}

impl Default for PieceSet {
    fn default() -> Self {
        Self::new()
    }
}

impl PieceSet {
    #[inline]
    pub const fn new() -> Self {
        Self {
            squares: [Square::A1; CAPACITY],
            index: [ABSENT; NUM_SQUARES],
            len: 0,
        }
    }

    #[inline]
    pub const fn len(&self) -> usize {
        self.len as usize
    }

    #[inline]
    pub const fn is_empty(&self) -> bool {
        self.len == 0
    }

    #[inline]
    pub const fn is_full(&self) -> bool {
        self.len as usize == CAPACITY
    }

    #[inline]
    pub const fn contains(&self, square: Square) -> bool {
        self.index[square.index()] != ABSENT
    }

    /// Square stored in slot `i`; slots are only meaningful until the next mutation.
    #[inline]
    pub fn get(&self, i: usize) -> Square {
        self.as_slice()[i]
    }

    #[inline]
    pub fn as_slice(&self) -> &[Square] {
        &self.squares[..self.len()]
    }

    #[inline]
    pub fn iter(&self) -> impl Iterator<Item = Square> + '_ {
        (0..self.len()).map(|i| self.get(i))
    }

    pub fn add(&mut self, square: Square) {
        assert!(!self.contains(square), "{square} already in piece set");
        assert!(!self.is_full(), "piece set overflow adding {square}");
        let slot = self.len;
        self.squares[slot as usize] = square;
        self.index[square.index()] = slot;
        self.len += 1;
    }

    pub fn remove(&mut self, square: Square) {
        let slot = self.index[square.index()];
        assert!(slot != ABSENT, "{square} not in piece set");
        let last = self.squares[self.len as usize - 1];
        self.squares[slot as usize] = last;
        self.index[last.index()] = slot;
        self.index[square.index()] = ABSENT;
        self.len -= 1;
    }

    pub fn relocate(&mut self, from: Square, to: Square) {
        let slot = self.index[from.index()];
        assert!(slot != ABSENT, "{from} not in piece set");
        debug_assert!(!self.contains(to) || from == to);
        self.index[from.index()] = ABSENT;
        self.squares[slot as usize] = to;
        self.index[to.index()] = slot;
    }
}

impl std::fmt::Debug for PieceSet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_set()
            .entries(self.iter().map(|sq| sq.to_string()))
            .finish()
    }
}
