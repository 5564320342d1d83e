use core::fmt::Debug;
use std::collections::VecDeque;
use std::fmt;
use std::hash::Hash;
use std::time::{Duration, Instant};

use derive_builder::Builder;
use fxhash::FxHashSet;

pub mod board;
pub mod direction;
pub mod error;
pub mod fingerprint;
pub mod grid;
pub mod level;
pub mod point;
pub mod puzzle;

pub use board::{Board, Color, Piece};
pub use direction::Direction;
pub use error::{PuzzleError, SearchError};
pub use fingerprint::Fingerprint;
pub use grid::Grid;
pub use point::Point;
pub use puzzle::Puzzle;

// How often (in expanded states) to log search progress
const PROGRESS_INTERVAL: usize = 10_000;

pub trait State<G>: Clone {
    type Step: Copy + Debug;
    type Key: Eq + Hash;

    /// Every (step, successor) pair in a fixed order, duplicates included.
    fn next_states(&self, global: &G) -> Vec<(Self::Step, Self)>;

    fn is_solved(&self, global: &G) -> bool;

    /// Canonical identity used to skip states that were already seen.
    fn key(&self) -> Self::Key;

    fn stringify(&self, global: &G) -> String;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Strategy {
    /// FIFO frontier, returns a shortest solution.
    #[default]
    BreadthFirst,
    /// LIFO frontier.
    DepthFirst,
    /// Same order and bookkeeping as `DepthFirst`, descending one branch at a
    /// time through an explicit stack of frames.
    RecursiveDepthFirst,
}

impl Strategy {
    pub const ALL: [Strategy; 3] = [
        Strategy::BreadthFirst,
        Strategy::DepthFirst,
        Strategy::RecursiveDepthFirst,
    ];
}

impl TryFrom<&str> for Strategy {
    type Error = anyhow::Error;

    fn try_from(value: &str) -> anyhow::Result<Self> {
        match value {
            "bfs" | "breadth-first" => Ok(Strategy::BreadthFirst),
            "dfs" | "depth-first" => Ok(Strategy::DepthFirst),
            "recursive" | "recursive-dfs" => Ok(Strategy::RecursiveDepthFirst),
            _ => Err(anyhow::anyhow!("Invalid strategy: {value}")),
        }
    }
}

impl fmt::Display for Strategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Strategy::BreadthFirst => "BFS",
            Strategy::DepthFirst => "DFS",
            Strategy::RecursiveDepthFirst => "recursive DFS",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Builder)]
#[builder(default)]
pub struct SearchConfig {
    pub strategy: Strategy,
    /// Stop with [`SearchError::StateLimit`] once this many states were seen.
    #[builder(setter(strip_option))]
    pub max_states: Option<usize>,
}

impl Default for SearchConfig {
    fn default() -> Self {
        SearchConfig {
            strategy: Strategy::default(),
            max_states: None,
        }
    }
}

impl SearchConfig {
    pub fn with_strategy(strategy: Strategy) -> Self {
        SearchConfig {
            strategy,
            ..SearchConfig::default()
        }
    }
}

/// Outcome of one search. A missing solution is a valid answer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchResult<Step> {
    pub strategy: Strategy,
    pub solution: Option<Vec<Step>>,
    /// Distinct states discovered, the start state included.
    pub states_visited: usize,
    pub elapsed: Duration,
}

impl<Step> SearchResult<Step> {
    pub fn is_solved(&self) -> bool {
        self.solution.is_some()
    }

    pub fn move_count(&self) -> Option<usize> {
        self.solution.as_ref().map(Vec::len)
    }
}

struct SearchNode<S, Step> {
    state: S,
    path: Vec<Step>,
}

pub struct Solver<'a, G, S: State<G>> {
    global: &'a G,
    initial_state: S,
    config: SearchConfig,
    checked: FxHashSet<S::Key>,
    time_spent: Duration,
}

impl<'a, G, S> Solver<'a, G, S>
where
    S: State<G>,
{
    pub fn new(global: &'a G, initial_state: &S) -> Solver<'a, G, S> {
        Solver {
            global,
            initial_state: initial_state.clone(),
            config: SearchConfig::default(),
            checked: FxHashSet::default(),
            time_spent: Duration::ZERO,
        }
    }

    pub fn set_config(&mut self, config: SearchConfig) -> &mut Self {
        self.config = config;
        self
    }

    pub fn set_mode(&mut self, strategy: Strategy) -> &mut Self {
        self.config.strategy = strategy;
        self
    }

    pub fn states_checked(&self) -> usize {
        self.checked.len()
    }

    pub fn time_spent(&self) -> Duration {
        self.time_spent
    }

    /// Search from the initial state. Each call starts from scratch.
    pub fn run(&mut self) -> Result<SearchResult<S::Step>, SearchError> {
        self.checked.clear();
        let start = Instant::now();

        let outcome = match self.config.strategy {
            Strategy::BreadthFirst => self.breadth_first(start),
            Strategy::DepthFirst => self.depth_first(start),
            Strategy::RecursiveDepthFirst => self.recursive_depth_first(start),
        };
        self.time_spent = start.elapsed();

        let solution = match outcome {
            Ok(solution) => solution,
            Err(e) => {
                log::warn!("{self} stopped: {e}");
                return Err(e);
            }
        };

        match &solution {
            Some(path) => log::info!("{self}: solved in {} moves", path.len()),
            None => log::info!("{self}: no solution"),
        }

        Ok(SearchResult {
            strategy: self.config.strategy,
            solution,
            states_visited: self.checked.len(),
            elapsed: self.time_spent,
        })
    }

    // Marks a state as seen, true if it was new
    fn discover(&mut self, key: S::Key) -> Result<bool, SearchError> {
        if self.checked.contains(&key) {
            return Ok(false);
        }

        if let Some(max_states) = self.config.max_states {
            if self.checked.len() >= max_states {
                return Err(SearchError::StateLimit {
                    visited: self.checked.len(),
                });
            }
        }

        self.checked.insert(key);
        Ok(true)
    }

    // Successors not seen before, all marked before any is explored
    fn discover_children(&mut self, state: &S) -> Result<Vec<(S::Step, S)>, SearchError> {
        let mut children = Vec::new();
        for (step, next_state) in state.next_states(self.global) {
            if self.discover(next_state.key())? {
                children.push((step, next_state));
            }
        }
        Ok(children)
    }

    fn report(&self, iter: usize, frontier: usize, state: &S, start: Instant) {
        if iter % PROGRESS_INTERVAL == 0 {
            tracing::debug!(
                "[{}] iter: {}, frontier: {}, checked: {}, time: {}, state:\n{}",
                self.config.strategy,
                iter,
                frontier,
                self.checked.len(),
                start.elapsed().as_secs_f32(),
                state.stringify(self.global)
            );
        }
    }

    fn breadth_first(&mut self, start: Instant) -> Result<Option<Vec<S::Step>>, SearchError> {
        let mut to_check = VecDeque::new();
        self.discover(self.initial_state.key())?;
        to_check.push_back(SearchNode {
            state: self.initial_state.clone(),
            path: Vec::new(),
        });

        let mut iter = 0;
        while let Some(current) = to_check.pop_front() {
            iter += 1;
            self.report(iter, to_check.len(), &current.state, start);

            if current.state.is_solved(self.global) {
                return Ok(Some(current.path));
            }

            for (step, next_state) in self.discover_children(&current.state)? {
                let mut path = current.path.clone();
                path.push(step);
                to_check.push_back(SearchNode {
                    state: next_state,
                    path,
                });
            }
        }

        Ok(None)
    }

    fn depth_first(&mut self, start: Instant) -> Result<Option<Vec<S::Step>>, SearchError> {
        let mut to_check = Vec::new();
        self.discover(self.initial_state.key())?;
        to_check.push(SearchNode {
            state: self.initial_state.clone(),
            path: Vec::new(),
        });

        let mut iter = 0;
        while let Some(current) = to_check.pop() {
            iter += 1;
            self.report(iter, to_check.len(), &current.state, start);

            if current.state.is_solved(self.global) {
                return Ok(Some(current.path));
            }

            // Pushed in reverse so the first step is explored first
            for (step, next_state) in self.discover_children(&current.state)?.into_iter().rev() {
                let mut path = current.path.clone();
                path.push(step);
                to_check.push(SearchNode {
                    state: next_state,
                    path,
                });
            }
        }

        Ok(None)
    }

    // The call stack is kept on the heap: one frame per state on the current
    // path, holding the children it has not descended into yet
    fn recursive_depth_first(&mut self, start: Instant) -> Result<Option<Vec<S::Step>>, SearchError> {
        self.discover(self.initial_state.key())?;
        if self.initial_state.is_solved(self.global) {
            return Ok(Some(Vec::new()));
        }

        let initial_state = self.initial_state.clone();
        let mut path = Vec::new();
        let mut frames = vec![self.discover_children(&initial_state)?.into_iter()];

        let mut iter = 1;
        while let Some(frame) = frames.last_mut() {
            let Some((step, next_state)) = frame.next() else {
                // Branch exhausted, return to the caller
                frames.pop();
                path.pop();
                continue;
            };

            iter += 1;
            self.report(iter, frames.len(), &next_state, start);

            path.push(step);
            if next_state.is_solved(self.global) {
                return Ok(Some(path));
            }

            let children = self.discover_children(&next_state)?;
            frames.push(children.into_iter());
        }

        Ok(None)
    }
}

impl<'a, G, S> fmt::Display for Solver<'a, G, S>
where
    S: State<G>,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Solver<{}, checked: {}, time: {:.3}s>",
            self.config.strategy,
            self.checked.len(),
            self.time_spent.as_secs_f32()
        )
    }
}

/// Run one search over `initial_state` with `config`.
pub fn solve<G, S>(
    global: &G,
    initial_state: &S,
    config: &SearchConfig,
) -> Result<SearchResult<S::Step>, SearchError>
where
    S: State<G>,
{
    let mut solver = Solver::new(global, initial_state);
    solver.set_config(config.clone());
    solver.run()
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use rayon::iter::{IntoParallelRefIterator, ParallelIterator};

    use super::*;
    use crate::level::parse_map;

    fn run(puzzle: &Puzzle, strategy: Strategy) -> SearchResult<Direction> {
        puzzle
            .solve(&SearchConfig::with_strategy(strategy))
            .unwrap()
    }

    // Every state reachable from the start, found by plain flood fill
    fn reachable(puzzle: &Puzzle) -> usize {
        let grid = puzzle.grid();
        let mut seen = HashSet::new();
        let mut stack = vec![puzzle.board().clone()];
        seen.insert(puzzle.board().fingerprint());

        while let Some(board) = stack.pop() {
            for direction in Direction::all() {
                let next = board.slide(grid, direction);
                if seen.insert(next.fingerprint()) {
                    stack.push(next);
                }
            }
        }
        seen.len()
    }

    const FIXTURES: &[&str] = &[
        "\
0.
.0",
        "\
0..0
.#..
1..1",
        "\
0.1
.#.
1.0",
        "\
00#1
....
#1..",
        "\
012
...
210",
        "\
0.#0.
.1#.1",
        "\
0.1.2
.#.#.
2.1.0",
    ];

    #[test]
    fn test_two_by_two_scenario() {
        let puzzle = parse_map("\
0.
.0").unwrap();

        let bfs = run(&puzzle, Strategy::BreadthFirst);
        assert_eq!(bfs.solution, Some(vec![Direction::Up, Direction::Left]));
        assert!(puzzle.replay(&bfs.solution.unwrap()).is_solved());

        for strategy in [Strategy::DepthFirst, Strategy::RecursiveDepthFirst] {
            let result = run(&puzzle, strategy);
            assert_eq!(result.solution, Some(vec![Direction::Up, Direction::Left]));
            assert_eq!(result.states_visited, 7);
        }
    }

    #[test]
    fn test_already_solved() {
        let puzzle = parse_map("0.1\n..2").unwrap();
        for strategy in Strategy::ALL {
            let result = run(&puzzle, strategy);
            assert_eq!(result.solution, Some(vec![]));
            assert_eq!(result.states_visited, 1);
            assert_eq!(result.strategy, strategy);
        }
    }

    #[test]
    fn test_separated_colors_have_no_solution() {
        let puzzle = parse_map("\
0.#0.
.1#.1").unwrap();
        let expected = reachable(&puzzle);
        assert!(expected > 1);

        for strategy in Strategy::ALL {
            let result = run(&puzzle, strategy);
            assert_eq!(result.solution, None);
            assert_eq!(result.states_visited, expected);
        }
    }

    #[test]
    fn test_frozen_board_visits_only_start() {
        let puzzle = parse_map("\
0#1
###
1#0").unwrap();
        for strategy in Strategy::ALL {
            let result = run(&puzzle, strategy);
            assert!(!result.is_solved());
            assert_eq!(result.states_visited, 1);
        }
    }

    #[test]
    fn test_strategies_agree() {
        FIXTURES.par_iter().for_each(|input| {
            let puzzle = parse_map(input).unwrap();

            let bfs = run(&puzzle, Strategy::BreadthFirst);
            let dfs = run(&puzzle, Strategy::DepthFirst);
            let recursive = run(&puzzle, Strategy::RecursiveDepthFirst);

            // Stack and recursive DFS walk the same states in the same order
            assert_eq!(dfs.solution, recursive.solution, "{input}");
            assert_eq!(dfs.states_visited, recursive.states_visited, "{input}");

            match bfs.move_count() {
                Some(shortest) => {
                    let dfs_moves = dfs.move_count().unwrap();
                    assert!(shortest <= dfs_moves, "{input}");
                    for result in [&bfs, &dfs] {
                        let solution = result.solution.as_ref().unwrap();
                        assert!(puzzle.replay(solution).is_solved(), "{input}");
                    }
                }
                None => {
                    assert!(!dfs.is_solved(), "{input}");
                    assert_eq!(bfs.states_visited, reachable(&puzzle), "{input}");
                    assert_eq!(dfs.states_visited, reachable(&puzzle), "{input}");
                }
            }
        });
    }

    #[test]
    fn test_bfs_is_shortest() {
        // Exhaustive check that no shorter sequence solves the fixtures
        for input in FIXTURES {
            let puzzle = parse_map(input).unwrap();
            let Some(shortest) = run(&puzzle, Strategy::BreadthFirst).move_count() else {
                continue;
            };

            let mut layer = vec![puzzle.board().clone()];
            for _ in 0..shortest {
                assert!(layer.iter().all(|board| !board.is_solved()), "{input}");
                layer = layer
                    .iter()
                    .flat_map(|board| {
                        Direction::all()
                            .into_iter()
                            .map(|direction| board.slide(puzzle.grid(), direction))
                    })
                    .collect();
                layer.sort_by_key(Board::fingerprint);
                layer.dedup();
            }
            assert!(layer.iter().any(Board::is_solved), "{input}");
        }
    }

    #[test]
    fn test_state_limit() {
        let puzzle = parse_map("\
0.#0.
.1#.1").unwrap();
        let config = SearchConfigBuilder::default()
            .strategy(Strategy::DepthFirst)
            .max_states(3)
            .build()
            .unwrap();

        assert_eq!(
            puzzle.solve(&config),
            Err(SearchError::StateLimit { visited: 3 })
        );
    }

    #[test]
    fn test_state_limit_recursive() {
        let puzzle = parse_map("\
0.#0.
.1#.1").unwrap();
        let config = SearchConfigBuilder::default()
            .strategy(Strategy::RecursiveDepthFirst)
            .max_states(4)
            .build()
            .unwrap();

        assert_eq!(
            puzzle.solve(&config),
            Err(SearchError::StateLimit { visited: 4 })
        );
    }

    #[test]
    fn test_deep_search_on_small_thread() {
        // Tens of thousands of states, explored along paths far deeper than a
        // default thread stack could hold one native frame per step for
        let puzzle = parse_map("\
0123#0
456.#.
.....#
......
......").unwrap();

        let handle = std::thread::spawn(move || {
            let dfs = puzzle.solve(&SearchConfig::with_strategy(Strategy::DepthFirst));
            let recursive =
                puzzle.solve(&SearchConfig::with_strategy(Strategy::RecursiveDepthFirst));
            (dfs, recursive)
        });
        let (dfs, recursive) = handle.join().unwrap();

        let dfs = dfs.unwrap();
        let recursive = recursive.unwrap();
        assert!(dfs.states_visited > 10_000);
        assert_eq!(recursive.states_visited, dfs.states_visited);
        assert_eq!(recursive.solution, dfs.solution);
    }

    #[test]
    fn test_solver_reuse_starts_fresh() {
        let puzzle = parse_map("\
0..0
.#..
1..1").unwrap();
        let mut solver = Solver::new(puzzle.grid(), puzzle.board());
        solver.set_mode(Strategy::DepthFirst);

        let first = solver.run().unwrap();
        let second = solver.run().unwrap();
        assert_eq!(first.solution, second.solution);
        assert_eq!(first.states_visited, second.states_visited);
        assert_eq!(solver.states_checked(), second.states_visited);
    }

    #[test]
    fn test_strategy_names() {
        assert_eq!(Strategy::try_from("bfs").unwrap(), Strategy::BreadthFirst);
        assert_eq!(Strategy::try_from("dfs").unwrap(), Strategy::DepthFirst);
        assert_eq!(
            Strategy::try_from("recursive").unwrap(),
            Strategy::RecursiveDepthFirst
        );
        assert!(Strategy::try_from("astar").is_err());
    }
}
