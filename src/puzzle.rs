//! Puzzle definition, move types and built-in presets.
//!
//! A puzzle is fixed at construction: the start board, the goal pattern and
//! the empty marker. From these it derives the block class table and the
//! per-block goal coordinates that every search state reads.

use std::collections::BTreeMap;
use std::fmt;

use log::warn;
use rustc_hash::FxHashMap;

use crate::board::Board;
use crate::error::{Error, GridKind, Result};

/// Integer id of a block; every cell of one block carries the same id.
pub type BlockId = i32;

/// A `(row, col)` board coordinate.
pub type Coord = (i32, i32);

/// Equivalence tag for interchangeable blocks (the block's cell count).
pub type Class = u32;

/// The four unit slide directions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Direction {
    Left,
    Right,
    Up,
    Down,
}

impl Direction {
    /// Expansion order used by successor generation.
    pub const ALL: [Direction; 4] = [
        Direction::Left,
        Direction::Right,
        Direction::Up,
        Direction::Down,
    ];

    /// Returns `(row_delta, col_delta)`.
    pub const fn delta(self) -> (i32, i32) {
        match self {
            Direction::Left => (0, -1),
            Direction::Right => (0, 1),
            Direction::Up => (-1, 0),
            Direction::Down => (1, 0),
        }
    }

    pub fn from_delta(dx: i32, dy: i32) -> Option<Self> {
        Self::ALL.into_iter().find(|dir| dir.delta() == (dx, dy))
    }

    pub const fn name(self) -> &'static str {
        match self {
            Direction::Left => "left",
            Direction::Right => "right",
            Direction::Up => "up",
            Direction::Down => "down",
        }
    }
}

/// Translate every cell of `block` by `(dx, dy)` (row delta, column delta).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Move {
    pub block: BlockId,
    pub dx: i32,
    pub dy: i32,
}

impl Move {
    pub const fn new(block: BlockId, dx: i32, dy: i32) -> Self {
        Self { block, dx, dy }
    }

    pub const fn toward(block: BlockId, direction: Direction) -> Self {
        let (dx, dy) = direction.delta();
        Self { block, dx, dy }
    }

    /// The unit direction of this move, if it is one.
    pub fn direction(&self) -> Option<Direction> {
        Direction::from_delta(self.dx, self.dy)
    }
}

impl fmt::Display for Move {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.direction() {
            Some(direction) => write!(f, "{} {}", self.block, direction.name()),
            None => write!(f, "{} ({}, {})", self.block, self.dx, self.dy),
        }
    }
}

/// Goal cells required of one block id.
#[derive(Debug, Clone)]
pub struct GoalBlock {
    pub block: BlockId,
    /// Index of the block in [`Puzzle::block_ids`], `None` if it is not on the board.
    pub slot: Option<usize>,
    /// Class of the block on the start board, `None` if it is not on the board.
    pub class: Option<Class>,
    /// Required cells in row-major order; never empty.
    pub cells: Vec<Coord>,
}

/// An immutable sliding-block puzzle.
#[derive(Debug, Clone)]
pub struct Puzzle {
    start: Board,
    goal: Board,
    empty: BlockId,
    /// Non-empty block ids on the start board, ascending.
    block_ids: Vec<BlockId>,
    slots: FxHashMap<BlockId, usize>,
    classes: FxHashMap<BlockId, Class>,
    goals: Vec<GoalBlock>,
}

impl Puzzle {
    /// Creates a puzzle from a start board, a goal pattern and the empty marker.
    ///
    /// Goal cells holding `empty` are don't-care cells. Rejects empty, jagged
    /// or mismatched grids.
    pub fn new<R: AsRef<[BlockId]>, G: AsRef<[BlockId]>>(
        board: &[R],
        goal: &[G],
        empty: BlockId,
    ) -> Result<Self> {
        let start = Board::from_rows(board, empty, GridKind::Board)?;
        let goal = Board::from_rows(goal, empty, GridKind::Goal)?;
        if start.shape() != goal.shape() {
            return Err(Error::ShapeMismatch {
                board: start.shape(),
                goal: goal.shape(),
            });
        }

        let mut classes: FxHashMap<BlockId, Class> = FxHashMap::default();
        let mut goal_cells: BTreeMap<BlockId, Vec<Coord>> = BTreeMap::new();
        for (index, (&block, &target)) in start.cells().iter().zip(goal.cells()).enumerate() {
            if block != empty {
                *classes.entry(block).or_default() += 1;
            }
            if target != empty {
                goal_cells.entry(target).or_default().push(start.coord_of(index));
            }
        }

        let mut block_ids: Vec<BlockId> = classes.keys().copied().collect();
        block_ids.sort_unstable();
        let slots = block_ids
            .iter()
            .enumerate()
            .map(|(slot, &block)| (block, slot))
            .collect::<FxHashMap<_, _>>();

        classes.insert(empty, 0);

        let goals = goal_cells
            .into_iter()
            .map(|(block, cells)| {
                let slot = slots.get(&block).copied();
                if slot.is_none() {
                    warn!("goal block {block} does not appear on the start board");
                }
                GoalBlock {
                    block,
                    slot,
                    class: slot.map(|_| classes[&block]),
                    cells,
                }
            })
            .collect();

        Ok(Self {
            start,
            goal,
            empty,
            block_ids,
            slots,
            classes,
            goals,
        })
    }

    /// The start board.
    pub fn board(&self) -> &Board {
        &self.start
    }

    /// The goal pattern, same shape as the board.
    pub fn goal(&self) -> &Board {
        &self.goal
    }

    pub fn empty(&self) -> BlockId {
        self.empty
    }

    /// Non-empty block ids on the start board, ascending.
    pub fn block_ids(&self) -> &[BlockId] {
        &self.block_ids
    }

    /// Position of `block` in [`Puzzle::block_ids`].
    pub fn slot_of(&self, block: BlockId) -> Option<usize> {
        self.slots.get(&block).copied()
    }

    /// Class of `block`; the empty marker is class 0.
    pub fn class_of(&self, block: BlockId) -> Option<Class> {
        self.classes.get(&block).copied()
    }

    /// Goal constraints, one per block id with at least one goal cell.
    pub fn goals(&self) -> &[GoalBlock] {
        &self.goals
    }
}

/// A named built-in puzzle.
pub struct Preset {
    pub name: &'static str,
    pub description: &'static str,
    pub board: &'static [&'static [BlockId]],
    pub goal: &'static [&'static [BlockId]],
    pub empty: BlockId,
}

impl Preset {
    pub fn puzzle(&self) -> Result<Puzzle> {
        Puzzle::new(self.board, self.goal, self.empty)
    }
}

/// Huarong Dao: bring the 2x2 block to the bottom centre.
pub const CLASSIC: Preset = Preset {
    name: "classic",
    description: "Huarong Dao, 5x4, the 2x2 block must reach the bottom centre",
    board: &[
        &[10, 1, 1, 2],
        &[10, 1, 1, 2],
        &[3, 4, 4, 5],
        &[3, 6, 7, 5],
        &[8, 0, 0, 9],
    ],
    goal: &[
        &[0, 0, 0, 0],
        &[0, 0, 0, 0],
        &[0, 0, 0, 0],
        &[0, 1, 1, 0],
        &[0, 1, 1, 0],
    ],
    empty: 0,
};

/// One slide of block 1 solves it.
pub const TINY: Preset = Preset {
    name: "tiny",
    description: "2x2, block 1 slides one cell left",
    board: &[&[0, 1], &[2, 3]],
    goal: &[&[1, 0], &[0, 0]],
    empty: 0,
};

/// A domino must get past a single cell blocking its row.
pub const CORRIDOR: Preset = Preset {
    name: "corridor",
    description: "3x4, the domino must pass the single block in its row",
    board: &[&[1, 1, 0, 2], &[0, 0, 0, 0], &[0, 0, 0, 0]],
    goal: &[&[0, 0, 1, 1], &[0, 0, 0, 0], &[0, 0, 0, 0]],
    empty: 0,
};

/// All built-in puzzles.
pub const PRESETS: &[Preset] = &[CLASSIC, TINY, CORRIDOR];

/// Looks up a preset by name and builds its puzzle.
pub fn preset(name: &str) -> Result<Puzzle> {
    PRESETS
        .iter()
        .find(|preset| preset.name == name)
        .ok_or_else(|| Error::UnknownPreset(name.to_string()))?
        .puzzle()
}
