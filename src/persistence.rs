//! Text formats for puzzles and move lists.
//!
//! Puzzle file:
//! ```text
//! # comment
//! empty: 0
//! board:
//! 10 1 1 2
//! ...
//! goal:
//! 0 0 0 0
//! ...
//! ```
//! `empty:` is optional (default 0). Rows are whitespace-separated integers.
//!
//! Move file: one `block dx dy` triple per line, `dx` being the row delta.
//! Everything after `#` on a line is ignored in both formats.

use std::fmt::Write as _;
use std::fs;
use std::path::Path;

use crate::error::{Error, Result};
use crate::puzzle::{BlockId, Move, Puzzle};

/// Section of a puzzle file that rows are currently appended to.
#[derive(Clone, Copy, PartialEq, Eq)]
enum Section {
    Header,
    Board,
    Goal,
}

/// Strips the comment and surrounding whitespace from a line.
fn content(line: &str) -> &str {
    line.split('#').next().unwrap_or_default().trim()
}

fn parse_error(line: usize, message: impl Into<String>) -> Error {
    Error::Parse {
        line,
        message: message.into(),
    }
}

fn parse_int(token: &str, line: usize) -> Result<BlockId> {
    token
        .parse()
        .map_err(|e| parse_error(line, format!("invalid integer {token:?}: {e}")))
}

/// Parses a puzzle file.
pub fn parse_puzzle(text: &str) -> Result<Puzzle> {
    let mut empty: BlockId = 0;
    let mut board: Vec<Vec<BlockId>> = Vec::new();
    let mut goal: Vec<Vec<BlockId>> = Vec::new();
    let mut section = Section::Header;
    let mut last_line = 0;

    for (index, raw) in text.lines().enumerate() {
        let line_number = index + 1;
        last_line = line_number;
        let line = content(raw);
        if line.is_empty() {
            continue;
        }

        if let Some(value) = line.strip_prefix("empty:") {
            if section != Section::Header {
                return Err(parse_error(line_number, "empty: must precede the grids"));
            }
            empty = parse_int(value.trim(), line_number)?;
            continue;
        }

        let next_section = match line {
            "board:" => Some(Section::Board),
            "goal:" => Some(Section::Goal),
            _ => None,
        };
        if let Some(next) = next_section {
            let already_seen = match next {
                Section::Board => !board.is_empty() || section == Section::Board,
                _ => !goal.is_empty() || section == Section::Goal,
            };
            if already_seen {
                return Err(parse_error(line_number, format!("duplicate {line} section")));
            }
            section = next;
            continue;
        }

        let row = line
            .split_whitespace()
            .map(|token| parse_int(token, line_number))
            .collect::<Result<Vec<_>>>()?;
        match section {
            Section::Header => {
                return Err(parse_error(
                    line_number,
                    "row outside of a board: or goal: section",
                ))
            }
            Section::Board => board.push(row),
            Section::Goal => goal.push(row),
        }
    }

    if board.is_empty() {
        return Err(parse_error(last_line, "missing board: section"));
    }
    if goal.is_empty() {
        return Err(parse_error(last_line, "missing goal: section"));
    }

    Puzzle::new(&board, &goal, empty)
}

/// Writes a puzzle in the format read by [`parse_puzzle`].
pub fn format_puzzle(puzzle: &Puzzle) -> String {
    let mut output = format!("empty: {}\n", puzzle.empty());
    for (header, grid) in [("board:", puzzle.board()), ("goal:", puzzle.goal())] {
        output.push_str(header);
        output.push('\n');
        for row in grid.to_rows() {
            let cells: Vec<String> = row.iter().map(ToString::to_string).collect();
            output.push_str(&cells.join(" "));
            output.push('\n');
        }
    }
    output
}

/// Reads and parses a puzzle file.
pub fn load_puzzle(path: impl AsRef<Path>) -> Result<Puzzle> {
    parse_puzzle(&fs::read_to_string(path)?)
}

/// Parses a move file.
pub fn parse_moves(text: &str) -> Result<Vec<Move>> {
    let mut moves = Vec::new();
    for (index, raw) in text.lines().enumerate() {
        let line_number = index + 1;
        let line = content(raw);
        if line.is_empty() {
            continue;
        }

        let fields = line
            .split_whitespace()
            .map(|token| parse_int(token, line_number))
            .collect::<Result<Vec<_>>>()?;
        let &[block, dx, dy] = fields.as_slice() else {
            return Err(parse_error(
                line_number,
                format!("expected `block dx dy`, found {} fields", fields.len()),
            ));
        };
        moves.push(Move::new(block, dx, dy));
    }
    Ok(moves)
}

/// Formats moves one per line, readable by [`parse_moves`].
pub fn format_moves(moves: &[Move]) -> String {
    let mut output = String::from("# block dx dy\n");
    for mv in moves {
        let _ = writeln!(output, "{} {} {}", mv.block, mv.dx, mv.dy);
    }
    output
}

/// Writes moves to `path`.
pub fn save_moves(path: impl AsRef<Path>, moves: &[Move]) -> Result<()> {
    fs::write(path, format_moves(moves))?;
    Ok(())
}

/// Reads moves from `path`.
pub fn load_moves(path: impl AsRef<Path>) -> Result<Vec<Move>> {
    parse_moves(&fs::read_to_string(path)?)
}
