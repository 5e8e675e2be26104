//! Error type shared by puzzle construction, replay and file I/O.

use thiserror::Error;

use crate::puzzle::Move;

/// Which of the two input grids a shape error refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GridKind {
    Board,
    Goal,
}

impl std::fmt::Display for GridKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            GridKind::Board => write!(f, "board"),
            GridKind::Goal => write!(f, "goal pattern"),
        }
    }
}

#[derive(Error, Debug)]
pub enum Error {
    #[error("{0} has no cells")]
    EmptyGrid(GridKind),
    #[error("{grid} row {row} has {found} cells, expected {expected}")]
    JaggedRow {
        grid: GridKind,
        row: usize,
        expected: usize,
        found: usize,
    },
    #[error("goal pattern is {goal:?} (rows, cols) but board is {board:?}")]
    ShapeMismatch {
        board: (usize, usize),
        goal: (usize, usize),
    },
    #[error("move {step} ({mv}) is illegal")]
    IllegalMove { step: usize, mv: Move },
    #[error("unknown preset: {0}")]
    UnknownPreset(String),
    #[error("line {line}: {message}")]
    Parse { line: usize, message: String },
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
