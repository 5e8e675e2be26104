//! Board grid representation and pattern hashing.
//!
//! The board is stored as a flat row-major `Vec` of block ids. Coordinates are
//! `(row, col)` pairs of `i32` so that translated cells can go negative before
//! the bounds check rejects them.

use std::collections::BTreeMap;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::rc::Rc;

use crate::error::{Error, GridKind, Result};
use crate::puzzle::{BlockId, Class, Coord};

/// Golden-ratio constant used by `hash_combine`.
const HASH_SEED_MIX: u64 = 0x9e37_79b9_7f4a_7c15;

/// A rectangular grid of block ids with a designated empty marker.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Board {
    rows: usize,
    cols: usize,
    cells: Vec<BlockId>,
    empty: BlockId,
}

impl Board {
    /// Builds a board from rows, rejecting empty or jagged input.
    pub fn from_rows<R: AsRef<[BlockId]>>(
        rows: &[R],
        empty: BlockId,
        kind: GridKind,
    ) -> Result<Self> {
        let width = rows.first().map_or(0, |row| row.as_ref().len());
        if width == 0 {
            return Err(Error::EmptyGrid(kind));
        }

        let mut cells = Vec::with_capacity(rows.len() * width);
        for (row_index, row) in rows.iter().enumerate() {
            let row = row.as_ref();
            if row.len() != width {
                return Err(Error::JaggedRow {
                    grid: kind,
                    row: row_index,
                    expected: width,
                    found: row.len(),
                });
            }
            cells.extend_from_slice(row);
        }

        Ok(Self {
            rows: rows.len(),
            cols: width,
            cells,
            empty,
        })
    }

    #[inline]
    pub fn rows(&self) -> usize {
        self.rows
    }

    #[inline]
    pub fn cols(&self) -> usize {
        self.cols
    }

    #[inline]
    pub fn empty(&self) -> BlockId {
        self.empty
    }

    /// Returns `(rows, cols)`.
    #[inline]
    pub fn shape(&self) -> (usize, usize) {
        (self.rows, self.cols)
    }

    /// Returns the flat row-major cell slice.
    #[inline]
    pub fn cells(&self) -> &[BlockId] {
        &self.cells
    }

    #[inline]
    pub fn in_bounds(&self, (row, col): Coord) -> bool {
        row >= 0 && col >= 0 && (row as usize) < self.rows && (col as usize) < self.cols
    }

    /// Returns the block id at `coord`, or `None` when out of bounds.
    #[inline]
    pub fn get(&self, coord: Coord) -> Option<BlockId> {
        if self.in_bounds(coord) {
            Some(self.cells[self.flat_index(coord)])
        } else {
            None
        }
    }

    /// Writes `block` at an in-bounds coordinate.
    #[inline]
    pub(crate) fn set(&mut self, coord: Coord, block: BlockId) {
        let index = self.flat_index(coord);
        self.cells[index] = block;
    }

    #[inline(always)]
    fn flat_index(&self, (row, col): Coord) -> usize {
        row as usize * self.cols + col as usize
    }

    /// Converts a flat index back to `(row, col)`.
    #[inline(always)]
    pub fn coord_of(&self, index: usize) -> Coord {
        ((index / self.cols) as i32, (index % self.cols) as i32)
    }

    /// Maps every non-empty block id to its cells in row-major order.
    pub fn coord_index(&self) -> BTreeMap<BlockId, Vec<Coord>> {
        let mut index: BTreeMap<BlockId, Vec<Coord>> = BTreeMap::new();
        for (cell_index, &block) in self.cells.iter().enumerate() {
            if block != self.empty {
                index.entry(block).or_default().push(self.coord_of(cell_index));
            }
        }
        index
    }

    /// Returns the board as nested rows.
    pub fn to_rows(&self) -> Vec<Vec<BlockId>> {
        self.cells.chunks(self.cols).map(<[BlockId]>::to_vec).collect()
    }

    /// Projects the board onto block classes.
    pub fn pattern(&self, class_of: impl Fn(BlockId) -> Class) -> PatternKey {
        let cells: Rc<[Class]> = self.cells.iter().map(|&block| class_of(block)).collect();
        PatternKey::new(cells)
    }
}

impl fmt::Display for Board {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let width = self
            .cells
            .iter()
            .filter(|&&block| block != self.empty)
            .map(|block| block.to_string().len())
            .max()
            .unwrap_or(1);

        for row in self.cells.chunks(self.cols) {
            for (col, &block) in row.iter().enumerate() {
                if col > 0 {
                    f.write_str(" ")?;
                }
                if block == self.empty {
                    write!(f, "{:>width$}", ".")?;
                } else {
                    write!(f, "{block:>width$}")?;
                }
            }
            writeln!(f)?;
        }
        Ok(())
    }
}

/// Mixes `value` into `seed`, order-sensitively.
#[inline(always)]
fn hash_combine(seed: u64, value: u64) -> u64 {
    seed ^ value
        .wrapping_add(HASH_SEED_MIX)
        .wrapping_add(seed << 6)
        .wrapping_add(seed >> 2)
}

/// Combined hash over a class-labeled pattern in row-major order.
pub fn hash_pattern(pattern: &[Class]) -> u64 {
    pattern
        .iter()
        .fold(0, |seed, &class| hash_combine(seed, u64::from(class)))
}

/// A class-labeled board projection used as the state identity.
///
/// `Hash` feeds only the precomputed combined hash; `Eq` checks the hash and
/// then every cell, so two patterns that collide still compare unequal.
#[derive(Debug, Clone)]
pub struct PatternKey {
    hash: u64,
    cells: Rc<[Class]>,
}

impl PatternKey {
    pub fn new(cells: Rc<[Class]>) -> Self {
        Self {
            hash: hash_pattern(&cells),
            cells,
        }
    }

    #[inline]
    pub fn hash_value(&self) -> u64 {
        self.hash
    }

    #[inline]
    pub fn cells(&self) -> &[Class] {
        &self.cells
    }
}

impl PartialEq for PatternKey {
    fn eq(&self, other: &Self) -> bool {
        self.hash == other.hash && self.cells == other.cells
    }
}

impl Eq for PatternKey {}

impl Hash for PatternKey {
    fn hash<H: Hasher>(&self, state: &mut H) {
        state.write_u64(self.hash);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn board(rows: &[&[BlockId]]) -> Board {
        Board::from_rows(rows, 0, GridKind::Board).unwrap()
    }

    #[test]
    fn test_rejects_jagged_rows() {
        let err = Board::from_rows(&[vec![1, 2], vec![3]], 0, GridKind::Goal).unwrap_err();
        match err {
            Error::JaggedRow {
                grid,
                row,
                expected,
                found,
            } => {
                assert_eq!(grid, GridKind::Goal);
                assert_eq!((row, expected, found), (1, 2, 1));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_rejects_empty_grid() {
        let rows: &[Vec<BlockId>] = &[];
        assert!(matches!(
            Board::from_rows(rows, 0, GridKind::Board),
            Err(Error::EmptyGrid(GridKind::Board))
        ));
        assert!(matches!(
            Board::from_rows(&[Vec::<BlockId>::new()], 0, GridKind::Board),
            Err(Error::EmptyGrid(_))
        ));
    }

    #[test]
    fn test_get_checks_bounds() {
        let b = board(&[&[1, 0], &[2, 3]]);
        assert_eq!(b.get((0, 0)), Some(1));
        assert_eq!(b.get((1, 1)), Some(3));
        assert_eq!(b.get((-1, 0)), None);
        assert_eq!(b.get((0, 2)), None);
        assert_eq!(b.get((2, 0)), None);
    }

    #[test]
    fn test_coord_index_skips_empty_and_keeps_row_major_order() {
        let b = board(&[&[1, 1, 0], &[2, 1, 0]]);
        let index = b.coord_index();
        assert_eq!(index.len(), 2);
        assert_eq!(index[&1], vec![(0, 0), (0, 1), (1, 1)]);
        assert_eq!(index[&2], vec![(1, 0)]);
        assert!(!index.contains_key(&0));
    }

    #[test]
    fn test_pattern_treats_same_class_blocks_as_equal() {
        let a = board(&[&[1, 2], &[0, 0]]);
        let b = board(&[&[2, 1], &[0, 0]]);
        // both blocks share class 1
        let class_of = |block: BlockId| if block == 0 { 0 } else { 1 };
        assert_eq!(a.pattern(class_of), b.pattern(class_of));
    }

    #[test]
    fn test_hash_is_order_sensitive() {
        assert_ne!(hash_pattern(&[1, 2, 0]), hash_pattern(&[2, 1, 0]));
        assert_eq!(hash_pattern(&[1, 2, 0]), hash_pattern(&[1, 2, 0]));
    }

    #[test]
    fn test_pattern_key_falls_back_to_cells_on_equal_hash() {
        let a = PatternKey {
            hash: 7,
            cells: Rc::from(vec![1, 2]),
        };
        let b = PatternKey {
            hash: 7,
            cells: Rc::from(vec![2, 1]),
        };
        assert_ne!(a, b);
    }

    #[test]
    fn test_display_pads_to_widest_id() {
        let b = board(&[&[10, 1], &[0, 2]]);
        assert_eq!(b.to_string(), "10  1\n .  2\n");
    }
}
