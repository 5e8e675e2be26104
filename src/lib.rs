//! Sliding-Block Puzzle Solver Library
//!
//! Finds short move sequences for generalized Klotski puzzles: rigid
//! multi-cell blocks on a rectangular board, slid one cell at a time until
//! the goal pattern is met. Search is A* over class patterns, where blocks
//! with the same cell count are interchangeable.

pub mod board;
pub mod error;
pub mod persistence;
pub mod puzzle;
pub mod solver;
pub mod state;

pub use board::Board;
pub use error::{Error, GridKind, Result};
pub use puzzle::{preset, BlockId, Class, Coord, Direction, Move, Preset, Puzzle, PRESETS};
pub use solver::{replay, SearchConfig, SearchOutcome, SearchStats, Solution};
pub use state::{GoalMatch, State};
