//! Search states: one board configuration plus how it was reached.

use std::rc::Rc;

use crate::board::{Board, PatternKey};
use crate::puzzle::{BlockId, Coord, Direction, Move, Puzzle};

/// How goal cells are matched against the board.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum GoalMatch {
    /// Every goal cell must hold exactly the goal's block id.
    ///
    /// The visited set still deduplicates on class patterns, so a goal that
    /// only swaps two same-class blocks shares the start's pattern and is
    /// never reached; such puzzles end `Unsolvable`.
    #[default]
    Id,
    /// Every goal cell must hold some block of the goal block's class.
    Class,
}

/// An immutable board snapshot.
///
/// Carries the per-block coordinate index so successor generation never
/// rescans the board, and the class pattern used as the state identity.
#[derive(Debug, Clone)]
pub struct State<'p> {
    puzzle: &'p Puzzle,
    board: Board,
    /// Cells of each block, indexed by the puzzle's block slot.
    coords: Vec<Rc<[Coord]>>,
    key: PatternKey,
    from_move: Option<Move>,
    depth: u32,
}

impl Puzzle {
    /// The root state: the start board at depth 0.
    pub fn initial_state(&self) -> State<'_> {
        State::from_board(self, self.board().clone())
    }
}

impl<'p> State<'p> {
    /// Builds a depth-0 state from an arbitrary board of this puzzle's shape.
    pub(crate) fn from_board(puzzle: &'p Puzzle, board: Board) -> Self {
        let mut index = board.coord_index();
        let coords = puzzle
            .block_ids()
            .iter()
            .map(|block| Rc::from(index.remove(block).unwrap_or_default()))
            .collect();
        Self::with_parts(puzzle, board, coords, None, 0)
    }

    fn with_parts(
        puzzle: &'p Puzzle,
        board: Board,
        coords: Vec<Rc<[Coord]>>,
        from_move: Option<Move>,
        depth: u32,
    ) -> Self {
        let key = board.pattern(|block| puzzle.class_of(block).unwrap_or(0));
        Self {
            puzzle,
            board,
            coords,
            key,
            from_move,
            depth,
        }
    }

    pub fn board(&self) -> &Board {
        &self.board
    }

    /// Cells currently occupied by `block`, in row-major order of the start board.
    pub fn cells_of(&self, block: BlockId) -> Option<&[Coord]> {
        self.puzzle
            .slot_of(block)
            .map(|slot| self.coords[slot].as_ref())
    }

    /// The class pattern identifying this state.
    pub fn key(&self) -> &PatternKey {
        &self.key
    }

    pub fn hash_value(&self) -> u64 {
        self.key.hash_value()
    }

    /// The move that produced this state, `None` for the root.
    pub fn from_move(&self) -> Option<Move> {
        self.from_move
    }

    /// Number of moves from the root.
    pub fn depth(&self) -> u32 {
        self.depth
    }

    /// Applies `mv`, returning the successor or `None` if the move is illegal.
    ///
    /// Every translated cell must be on the board and hold either the empty
    /// marker or `mv.block` itself.
    pub fn try_move(&self, mv: Move) -> Option<State<'p>> {
        let slot = self.puzzle.slot_of(mv.block)?;
        let empty = self.puzzle.empty();
        let cells = &self.coords[slot];

        let mut moved = Vec::with_capacity(cells.len());
        for &(row, col) in cells.iter() {
            // a delta that overflows lands off the board
            let target = (row.checked_add(mv.dx)?, col.checked_add(mv.dy)?);
            match self.board.get(target) {
                Some(occupant) if occupant == empty || occupant == mv.block => moved.push(target),
                _ => return None,
            }
        }

        let mut board = self.board.clone();
        for &cell in cells.iter() {
            board.set(cell, empty);
        }
        for &cell in &moved {
            board.set(cell, mv.block);
        }

        let mut coords = self.coords.clone();
        coords[slot] = Rc::from(moved);

        Some(Self::with_parts(
            self.puzzle,
            board,
            coords,
            Some(mv),
            self.depth + 1,
        ))
    }

    /// Every legal unit slide of every block, paired with its successor.
    pub fn next_states(&self) -> Vec<(Move, State<'p>)> {
        let mut successors = Vec::new();
        for &block in self.puzzle.block_ids() {
            for direction in Direction::ALL {
                let mv = Move::toward(block, direction);
                if let Some(next) = self.try_move(mv) {
                    successors.push((mv, next));
                }
            }
        }
        successors
    }

    /// Remaining-displacement estimate.
    ///
    /// Sums, over blocks with goal cells, the Manhattan distance from the
    /// block's first cell to its first goal cell. Blocks absent from the
    /// board contribute nothing.
    pub fn h(&self) -> u32 {
        self.puzzle
            .goals()
            .iter()
            .filter_map(|goal| {
                let slot = goal.slot?;
                let &(row, col) = self.coords[slot].first()?;
                let (goal_row, goal_col) = goal.cells[0];
                Some(row.abs_diff(goal_row) + col.abs_diff(goal_col))
            })
            .sum()
    }

    /// Whether every goal cell is satisfied; empty goal cells are ignored.
    pub fn is_terminal(&self, goal_match: GoalMatch) -> bool {
        self.puzzle.goals().iter().all(|goal| match goal_match {
            GoalMatch::Id => goal
                .cells
                .iter()
                .all(|&cell| self.board.get(cell) == Some(goal.block)),
            GoalMatch::Class => goal.class.is_some_and(|class| {
                goal.cells.iter().all(|&cell| {
                    self.board
                        .get(cell)
                        .and_then(|block| self.puzzle.class_of(block))
                        == Some(class)
                })
            }),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::puzzle::{CLASSIC, TINY};

    fn count_cells(board: &Board, block: BlockId) -> usize {
        board.cells().iter().filter(|&&cell| cell == block).count()
    }

    #[test]
    fn test_move_onto_other_block_is_rejected() {
        let puzzle = CLASSIC.puzzle().unwrap();
        let root = puzzle.initial_state();
        // 1 is the 2x2 block, boxed in by 10, 2 and 4
        for direction in Direction::ALL {
            assert!(root.try_move(Move::toward(1, direction)).is_none());
        }
    }

    #[test]
    fn test_move_out_of_bounds_is_rejected() {
        let puzzle = CLASSIC.puzzle().unwrap();
        let root = puzzle.initial_state();
        assert!(root.try_move(Move::toward(10, Direction::Left)).is_none());
        assert!(root.try_move(Move::toward(10, Direction::Up)).is_none());
        assert!(root.try_move(Move::toward(8, Direction::Down)).is_none());
    }

    #[test]
    fn test_move_into_empty_and_own_trailing_cell() {
        let puzzle = Puzzle::new(&[[1, 1, 0]], &[[0, 1, 1]], 0).unwrap();
        let root = puzzle.initial_state();
        let next = root.try_move(Move::new(1, 0, 1)).expect("slide right is legal");
        assert_eq!(next.board().cells(), &[0, 1, 1]);
        assert_eq!(next.cells_of(1), Some(&[(0, 1), (0, 2)][..]));
        assert_eq!(next.depth(), 1);
        assert_eq!(next.from_move(), Some(Move::new(1, 0, 1)));
        assert!(root.try_move(Move::new(1, 0, -1)).is_none());
    }

    #[test]
    fn test_overflowing_delta_is_rejected() {
        let puzzle = TINY.puzzle().unwrap();
        let root = puzzle.initial_state();
        assert!(root.try_move(Move::new(2, i32::MAX, 0)).is_none());
        assert!(root.try_move(Move::new(3, 0, i32::MAX)).is_none());
        assert!(root.try_move(Move::new(1, i32::MIN, 0)).is_none());
    }

    #[test]
    fn test_empty_marker_cannot_move() {
        let puzzle = TINY.puzzle().unwrap();
        let root = puzzle.initial_state();
        assert!(root.try_move(Move::toward(0, Direction::Right)).is_none());
        assert!(root.try_move(Move::toward(99, Direction::Right)).is_none());
    }

    #[test]
    fn test_legal_moves_conserve_block_cells() {
        let puzzle = CLASSIC.puzzle().unwrap();
        let root = puzzle.initial_state();
        let successors = root.next_states();
        assert!(!successors.is_empty());

        for (mv, next) in &successors {
            for &block in puzzle.block_ids() {
                assert_eq!(
                    count_cells(root.board(), block),
                    count_cells(next.board(), block),
                    "block {block} changed size after {mv}"
                );
            }
            // only cells that held or now hold the moved block may differ
            for (&before, &after) in root.board().cells().iter().zip(next.board().cells()) {
                if before != after {
                    assert!(before == mv.block || after == mv.block);
                }
            }
        }
    }

    #[test]
    fn test_next_states_of_classic_start() {
        let puzzle = CLASSIC.puzzle().unwrap();
        let root = puzzle.initial_state();
        let mut moves: Vec<Move> = root.next_states().into_iter().map(|(mv, _)| mv).collect();
        moves.sort_by_key(|mv| (mv.block, mv.dx, mv.dy));
        assert_eq!(
            moves,
            vec![
                Move::new(6, 1, 0),
                Move::new(7, 1, 0),
                Move::new(8, 0, 1),
                Move::new(9, 0, -1),
            ]
        );
    }

    #[test]
    fn test_successor_shares_untouched_coordinates() {
        let puzzle = CLASSIC.puzzle().unwrap();
        let root = puzzle.initial_state();
        let next = root.try_move(Move::toward(6, Direction::Down)).unwrap();
        let slot = puzzle.slot_of(1).unwrap();
        assert!(Rc::ptr_eq(&root.coords[slot], &next.coords[slot]));
        assert_eq!(next.cells_of(6), Some(&[(4, 1)][..]));
    }

    #[test]
    fn test_heuristic_uses_first_cells() {
        let puzzle = CLASSIC.puzzle().unwrap();
        // block 1 starts at (0, 1), first goal cell is (3, 1)
        assert_eq!(puzzle.initial_state().h(), 3);
    }

    #[test]
    fn test_heuristic_is_zero_at_goal() {
        let puzzle = TINY.puzzle().unwrap();
        let solved = puzzle
            .initial_state()
            .try_move(Move::new(1, 0, -1))
            .unwrap();
        assert!(solved.is_terminal(GoalMatch::Id));
        assert_eq!(solved.h(), 0);
        assert_eq!(puzzle.initial_state().h(), 1);
    }

    #[test]
    fn test_heuristic_ignores_missing_blocks() {
        let puzzle = Puzzle::new(&[[1, 0, 0]], &[[0, 0, 9]], 0).unwrap();
        assert_eq!(puzzle.initial_state().h(), 0);
        assert!(!puzzle.initial_state().is_terminal(GoalMatch::Id));
    }

    #[test]
    fn test_goal_cell_mutation_flips_terminal() {
        let puzzle = Puzzle::new(&[[1, 1, 2], [0, 0, 0]], &[[1, 1, 0], [0, 0, 0]], 0).unwrap();
        let root = puzzle.initial_state();
        assert!(root.is_terminal(GoalMatch::Id));

        for goal in puzzle.goals() {
            for &cell in &goal.cells {
                let mut board = root.board().clone();
                board.set(cell, 2);
                let mutated = State::from_board(&puzzle, board);
                assert!(!mutated.is_terminal(GoalMatch::Id), "cell {cell:?}");
            }
        }
    }

    #[test]
    fn test_dont_care_cells_are_ignored() {
        let puzzle = Puzzle::new(&[[1, 2], [3, 0]], &[[1, 0], [0, 0]], 0).unwrap();
        assert!(puzzle.initial_state().is_terminal(GoalMatch::Id));
    }

    #[test]
    fn test_class_match_accepts_interchangeable_block() {
        // 1 and 2 are both single cells; the goal names 1 but 2 sits there
        let puzzle = Puzzle::new(&[[2, 1]], &[[1, 0]], 0).unwrap();
        let root = puzzle.initial_state();
        assert!(!root.is_terminal(GoalMatch::Id));
        assert!(root.is_terminal(GoalMatch::Class));
    }

    #[test]
    fn test_class_match_rejects_other_class_and_missing_block() {
        let puzzle = Puzzle::new(&[[2, 2, 1]], &[[1, 0, 0]], 0).unwrap();
        assert!(!puzzle.initial_state().is_terminal(GoalMatch::Class));

        let missing = Puzzle::new(&[[2, 0]], &[[9, 0]], 0).unwrap();
        assert!(!missing.initial_state().is_terminal(GoalMatch::Class));
    }

    #[test]
    fn test_same_class_swap_gives_equal_key() {
        let a = Puzzle::new(&[[1, 2, 0]], &[[0, 0, 0]], 0).unwrap();
        let swapped = Board::from_rows(&[[2, 1, 0]], 0, crate::error::GridKind::Board).unwrap();
        let root = a.initial_state();
        let other = State::from_board(&a, swapped);
        assert_eq!(root.key(), other.key());
        assert_eq!(root.hash_value(), other.hash_value());
    }
}
