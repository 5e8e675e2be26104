//! A* search over the state graph.
//!
//! Key points:
//! - States live in an arena addressed by index; each node keeps its parent
//!   index and reaching move, and the path is rebuilt once on success
//! - A node's `State` is dropped from the arena as soon as it is expanded
//! - The visited set is an `FxHashSet` of class patterns whose equality falls
//!   back to a full cell comparison, so hash collisions never merge states
//! - Frontier ties on `f` pop in insertion order

use std::cmp::Reverse;
use std::collections::BinaryHeap;
use std::fmt::{self, Write};

use log::{debug, info};
use rustc_hash::FxHashSet;

use crate::board::PatternKey;
use crate::error::{Error, Result};
use crate::puzzle::{Move, Puzzle};
use crate::state::{GoalMatch, State};

/// Newly visited states between progress log lines.
const PROGRESS_INTERVAL: usize = 10_000;

/// Search tuning.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SearchConfig {
    /// Stop with [`SearchOutcome::Aborted`] once this many distinct states are visited.
    pub max_states: Option<usize>,
    pub goal_match: GoalMatch,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SearchOutcome {
    /// A goal state was reached by these moves (empty if the start is a goal).
    Solved(Vec<Move>),
    /// Every reachable pattern was visited without reaching a goal.
    Unsolvable,
    /// The state budget ran out first.
    Aborted,
}

/// Counters collected during one search.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SearchStats {
    /// Distinct patterns in the visited set when the search ended.
    pub visited: usize,
    /// States pushed onto the frontier, root included.
    pub generated: usize,
    /// Frontier entries discarded because their pattern was already visited.
    pub duplicates: usize,
    /// Largest frontier size seen.
    pub max_frontier: usize,
}

impl fmt::Display for SearchStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "visited {} states, generated {}, skipped {} duplicates, peak frontier {}",
            self.visited, self.generated, self.duplicates, self.max_frontier
        )
    }
}

#[derive(Debug, Clone)]
pub struct Solution {
    pub outcome: SearchOutcome,
    pub stats: SearchStats,
}

impl Solution {
    /// The winning moves, or an empty slice when there is none.
    pub fn moves(&self) -> &[Move] {
        match &self.outcome {
            SearchOutcome::Solved(moves) => moves.as_slice(),
            SearchOutcome::Unsolvable | SearchOutcome::Aborted => &[],
        }
    }

    pub fn into_moves(self) -> Vec<Move> {
        match self.outcome {
            SearchOutcome::Solved(moves) => moves,
            SearchOutcome::Unsolvable | SearchOutcome::Aborted => Vec::new(),
        }
    }

    pub fn is_solved(&self) -> bool {
        matches!(self.outcome, SearchOutcome::Solved(_))
    }

    /// Number of distinct states visited.
    pub fn visited(&self) -> usize {
        self.stats.visited
    }
}

/// Arena slot for one generated state.
struct Node<'p> {
    /// Taken when the node is popped.
    state: Option<State<'p>>,
    parent: Option<usize>,
    via: Option<Move>,
}

/// Walks parent links back to the root and returns the moves in order.
fn reconstruct_path(nodes: &[Node<'_>], mut index: usize) -> Vec<Move> {
    let mut moves = Vec::new();
    while let Some(parent) = nodes[index].parent {
        if let Some(mv) = nodes[index].via {
            moves.push(mv);
        }
        index = parent;
    }
    moves.reverse();
    moves
}

/// Runs A* from the puzzle's start board.
///
/// Priority is `f = g + h` with `g` the move count from the root. The goal
/// test runs when a state is popped, before the visited check.
pub fn solve(puzzle: &Puzzle, config: &SearchConfig) -> Solution {
    let root = puzzle.initial_state();
    debug!(
        "searching {}x{} board with {} blocks, root h = {}",
        puzzle.board().rows(),
        puzzle.board().cols(),
        puzzle.block_ids().len(),
        root.h()
    );

    let mut stats = SearchStats {
        generated: 1,
        max_frontier: 1,
        ..SearchStats::default()
    };
    let mut visited: FxHashSet<PatternKey> = FxHashSet::default();
    let mut frontier: BinaryHeap<Reverse<(u32, usize)>> = BinaryHeap::new();

    frontier.push(Reverse((root.h(), 0)));
    let mut nodes = vec![Node {
        state: Some(root),
        parent: None,
        via: None,
    }];

    let outcome = loop {
        let Some(Reverse((f, index))) = frontier.pop() else {
            break SearchOutcome::Unsolvable;
        };
        let Some(state) = nodes[index].state.take() else {
            continue;
        };

        if state.is_terminal(config.goal_match) {
            debug!("goal reached at depth {} (f = {f})", state.depth());
            break SearchOutcome::Solved(reconstruct_path(&nodes, index));
        }

        if visited.contains(state.key()) {
            stats.duplicates += 1;
            continue;
        }
        if config.max_states.is_some_and(|limit| visited.len() >= limit) {
            debug!("state budget of {} exhausted", visited.len());
            break SearchOutcome::Aborted;
        }
        visited.insert(state.key().clone());
        if visited.len() % PROGRESS_INTERVAL == 0 {
            debug!(
                "visited {} states, frontier {}, current f = {f}, depth {}",
                visited.len(),
                frontier.len(),
                state.depth()
            );
        }

        let child_g = state.depth() + 1;
        for (mv, child) in state.next_states() {
            if visited.contains(child.key()) {
                continue;
            }
            let child_f = child_g + child.h();
            let child_index = nodes.len();
            nodes.push(Node {
                state: Some(child),
                parent: Some(index),
                via: Some(mv),
            });
            frontier.push(Reverse((child_f, child_index)));
            stats.generated += 1;
        }
        stats.max_frontier = stats.max_frontier.max(frontier.len());
    };

    stats.visited = visited.len();
    match &outcome {
        SearchOutcome::Solved(moves) => info!("solved in {} moves; {stats}", moves.len()),
        SearchOutcome::Unsolvable => info!("no solution; {stats}"),
        SearchOutcome::Aborted => info!("search aborted; {stats}"),
    }

    Solution { outcome, stats }
}

/// Applies `moves` from the start board, failing on the first illegal one.
pub fn replay<'p>(puzzle: &'p Puzzle, moves: &[Move]) -> Result<State<'p>> {
    let mut state = puzzle.initial_state();
    for (step, &mv) in moves.iter().enumerate() {
        state = state
            .try_move(mv)
            .ok_or(Error::IllegalMove { step: step + 1, mv })?;
    }
    Ok(state)
}

/// Renders the start board followed by the board after every move.
pub fn format_solution(puzzle: &Puzzle, moves: &[Move]) -> Result<String> {
    let mut output = String::new();
    let mut state = puzzle.initial_state();
    // writing into a String cannot fail
    let _ = write!(output, "Start:\n{}", state.board());

    for (step, &mv) in moves.iter().enumerate() {
        state = state
            .try_move(mv)
            .ok_or(Error::IllegalMove { step: step + 1, mv })?;
        let _ = write!(output, "\nStep {}: {mv}\n{}", step + 1, state.board());
    }

    Ok(output)
}

impl Puzzle {
    /// Searches with the given configuration.
    pub fn solve(&self, config: &SearchConfig) -> Solution {
        solve(self, config)
    }

    /// Searches with defaults and returns only the moves (empty if none).
    pub fn a_star(&self) -> Vec<Move> {
        solve(self, &SearchConfig::default()).into_moves()
    }

    /// Whether replaying `moves` ends on a goal state.
    pub fn is_solved_by(&self, moves: &[Move], goal_match: GoalMatch) -> Result<bool> {
        Ok(replay(self, moves)?.is_terminal(goal_match))
    }
}
