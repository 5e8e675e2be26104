//! Klotski Solver
//!
//! Solves sliding-block puzzles loaded from a file or picked from the
//! built-in presets, prints the move sequence (optionally with every
//! intermediate board) and can replay a saved move file against a puzzle.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Args, Parser, Subcommand};
use log::LevelFilter;

use klotski::persistence;
use klotski::puzzle::{self, CLASSIC};
use klotski::solver::{self, SearchConfig, SearchOutcome, Solution};
use klotski::{GoalMatch, Puzzle, PRESETS};

/// Finds short solutions to sliding-block (Klotski) puzzles.
#[derive(Parser)]
#[command(name = "klotski")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Increase log output (-v info, -vv debug, -vvv trace).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Solve a puzzle and print the moves.
    Solve {
        #[command(flatten)]
        source: PuzzleSource,
        /// Give up after visiting this many distinct states.
        #[arg(long)]
        max_states: Option<usize>,
        /// Let blocks of the same size satisfy each other's goal cells.
        #[arg(long)]
        match_class: bool,
        /// Write the moves to this file.
        #[arg(short, long)]
        output: Option<PathBuf>,
        /// Print the board after every move.
        #[arg(long)]
        steps: bool,
    },
    /// Replay a move file and check that it ends on a goal state.
    Replay {
        /// Move file, one `block dx dy` per line.
        moves: PathBuf,
        #[command(flatten)]
        source: PuzzleSource,
        /// Let blocks of the same size satisfy each other's goal cells.
        #[arg(long)]
        match_class: bool,
    },
    /// List the built-in puzzles.
    Presets {
        /// Print this preset in puzzle file format.
        #[arg(long)]
        dump: Option<String>,
    },
}

/// Where the puzzle comes from; defaults to the classic preset.
#[derive(Args)]
struct PuzzleSource {
    /// Puzzle file to load.
    #[arg(short, long)]
    file: Option<PathBuf>,
    /// Built-in puzzle name.
    #[arg(short, long, conflicts_with = "file")]
    preset: Option<String>,
}

impl PuzzleSource {
    fn load(&self) -> klotski::Result<Puzzle> {
        match (&self.file, &self.preset) {
            (Some(path), _) => persistence::load_puzzle(path),
            (None, Some(name)) => puzzle::preset(name),
            (None, None) => CLASSIC.puzzle(),
        }
    }
}

fn goal_match(match_class: bool) -> GoalMatch {
    if match_class {
        GoalMatch::Class
    } else {
        GoalMatch::Id
    }
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => LevelFilter::Warn,
        1 => LevelFilter::Info,
        2 => LevelFilter::Debug,
        _ => LevelFilter::Trace,
    };
    env_logger::Builder::new()
        .filter_level(level)
        .parse_default_env()
        .init();
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let result = match cli.command {
        Some(Command::Solve {
            source,
            max_states,
            match_class,
            output,
            steps,
        }) => {
            let config = SearchConfig {
                max_states,
                goal_match: goal_match(match_class),
            };
            run_solve(&source, &config, output, steps)
        }
        Some(Command::Replay {
            moves,
            source,
            match_class,
        }) => run_replay(&source, moves, goal_match(match_class)),
        Some(Command::Presets { dump }) => run_presets(dump.as_deref()),
        None => {
            // default: solve the classic puzzle and show every step
            let source = PuzzleSource {
                file: None,
                preset: None,
            };
            run_solve(&source, &SearchConfig::default(), None, true)
        }
    };

    match result {
        Ok(code) => code,
        Err(e) => {
            eprintln!("Error: {e}");
            ExitCode::FAILURE
        }
    }
}

/// Formats the search result for the terminal.
fn format_report(puzzle: &Puzzle, solution: &Solution, steps: bool) -> klotski::Result<String> {
    let mut output = String::new();
    match &solution.outcome {
        SearchOutcome::Solved(moves) => {
            if steps {
                output.push_str(&solver::format_solution(puzzle, moves)?);
                output.push('\n');
            } else {
                for (i, mv) in moves.iter().enumerate() {
                    output.push_str(&format!("{:>4}. {}\n", i + 1, mv));
                }
            }
            output.push_str(&format!("Solved in {} moves\n", moves.len()));
        }
        SearchOutcome::Unsolvable => output.push_str("No solution\n"),
        SearchOutcome::Aborted => output.push_str(&format!(
            "Search aborted after {} states\n",
            solution.visited()
        )),
    }
    output.push_str(&format!("{}\n", solution.stats));
    Ok(output)
}

/// Solves the puzzle, prints the report and optionally saves the moves.
fn run_solve(
    source: &PuzzleSource,
    config: &SearchConfig,
    output: Option<PathBuf>,
    steps: bool,
) -> klotski::Result<ExitCode> {
    let puzzle = source.load()?;
    let solution = puzzle.solve(config);
    print!("{}", format_report(&puzzle, &solution, steps)?);

    if !solution.is_solved() {
        return Ok(ExitCode::FAILURE);
    }
    if let Some(path) = output {
        persistence::save_moves(&path, solution.moves())?;
        println!("Wrote {}", path.display());
    }
    Ok(ExitCode::SUCCESS)
}

/// Replays saved moves and reports whether they solve the puzzle.
fn run_replay(
    source: &PuzzleSource,
    moves_path: PathBuf,
    goal_match: GoalMatch,
) -> klotski::Result<ExitCode> {
    let puzzle = source.load()?;
    let moves = persistence::load_moves(&moves_path)?;
    let end = solver::replay(&puzzle, &moves)?;

    print!("{}", end.board());
    if end.is_terminal(goal_match) {
        println!("Solved after {} moves", moves.len());
        Ok(ExitCode::SUCCESS)
    } else {
        println!("Not solved after {} moves", moves.len());
        Ok(ExitCode::FAILURE)
    }
}

/// Lists presets, or prints one in puzzle file format.
fn run_presets(dump: Option<&str>) -> klotski::Result<ExitCode> {
    match dump {
        Some(name) => print!("{}", persistence::format_puzzle(&puzzle::preset(name)?)),
        None => {
            for preset in PRESETS {
                println!("{:<10} {}", preset.name, preset.description);
            }
        }
    }
    Ok(ExitCode::SUCCESS)
}
