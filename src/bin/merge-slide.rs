use std::io::Read;

use anyhow::{anyhow, Result};
use rayon::iter::{IntoParallelIterator, ParallelIterator};

use merge_slide::direction::{arrows, parse_moves};
use merge_slide::{level, Direction, Puzzle, SearchConfig, SearchResult, Strategy};

#[derive(Debug, PartialEq)]
struct Args {
    strategies: Vec<Strategy>,
    max_states: Option<usize>,
    check: Option<Vec<Direction>>,
}

fn parse_args(mut args: impl Iterator<Item = String>) -> Result<Args> {
    let mut strategies = Vec::new();
    let mut max_states = None;
    let mut check = None;

    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--max-states" => {
                let value = args
                    .next()
                    .ok_or_else(|| anyhow!("--max-states needs a value"))?;
                max_states = Some(value.parse()?);
            }
            "--check" => {
                let value = args
                    .next()
                    .ok_or_else(|| anyhow!("--check needs a move string"))?;
                check = Some(parse_moves(&value)?);
            }
            "all" => strategies.extend(Strategy::ALL),
            name => strategies.push(Strategy::try_from(name)?),
        }
    }

    // Each named strategy runs once, in the order given
    let mut seen = Vec::new();
    strategies.retain(|strategy| {
        if seen.contains(strategy) {
            false
        } else {
            seen.push(*strategy);
            true
        }
    });

    if strategies.is_empty() {
        strategies.push(Strategy::BreadthFirst);
    }

    Ok(Args {
        strategies,
        max_states,
        check,
    })
}

fn report(puzzle: &Puzzle, result: &SearchResult<Direction>) {
    match &result.solution {
        Some(solution) => {
            println!(
                "{}: {} ({} moves), {} states in {} ms",
                result.strategy,
                arrows(solution),
                solution.len(),
                result.states_visited,
                result.elapsed.as_millis()
            );

            if !puzzle.replay(solution).is_solved() {
                log::warn!("{} solution does not solve the puzzle", result.strategy);
            }
        }
        None => println!(
            "{}: No solution, {} states in {} ms",
            result.strategy,
            result.states_visited,
            result.elapsed.as_millis()
        ),
    }
}

// Play a given move string from the start and say whether it solves the puzzle
fn check(puzzle: &Puzzle, moves: &[Direction]) -> Result<()> {
    let board = puzzle.replay(moves);
    println!("After {}:\n{}", arrows(moves), board.stringify(puzzle.grid()));

    if board.is_solved() {
        println!("Solved in {} moves", moves.len());
        Ok(())
    } else {
        Err(anyhow!("{} does not solve the puzzle", arrows(moves)))
    }
}

fn main() -> Result<()> {
    env_logger::init();

    let args = parse_args(std::env::args().skip(1))?;

    let mut input = String::new();
    std::io::stdin().read_to_string(&mut input)?;
    let puzzle = level::load(&input)?;

    println!("{}", puzzle.stringify());

    if let Some(moves) = &args.check {
        return check(&puzzle, moves);
    }

    let configs = args
        .strategies
        .iter()
        .map(|&strategy| SearchConfig {
            strategy,
            max_states: args.max_states,
        })
        .collect::<Vec<_>>();

    // Each search works on its own copy of the board
    let results = configs
        .into_par_iter()
        .map(|config| puzzle.solve(&config))
        .collect::<Vec<_>>();

    let mut failed = false;
    for result in results {
        match result {
            Ok(result) => report(&puzzle, &result),
            Err(e) => {
                log::error!("{e}");
                failed = true;
            }
        }
    }

    if failed {
        return Err(anyhow!("Search stopped before finishing"));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(input: &[&str]) -> Result<Args> {
        parse_args(input.iter().map(|s| s.to_string()))
    }

    #[test]
    fn test_default_strategy() {
        let parsed = args(&[]).unwrap();
        assert_eq!(parsed.strategies, vec![Strategy::BreadthFirst]);
        assert_eq!(parsed.max_states, None);
        assert_eq!(parsed.check, None);
    }

    #[test]
    fn test_every_named_strategy_runs() {
        let parsed = args(&["bfs", "dfs"]).unwrap();
        assert_eq!(
            parsed.strategies,
            vec![Strategy::BreadthFirst, Strategy::DepthFirst]
        );
    }

    #[test]
    fn test_repeated_strategies_run_once() {
        let parsed = args(&["recursive", "all", "dfs"]).unwrap();
        assert_eq!(
            parsed.strategies,
            vec![
                Strategy::RecursiveDepthFirst,
                Strategy::BreadthFirst,
                Strategy::DepthFirst
            ]
        );
    }

    #[test]
    fn test_options() {
        let parsed = args(&["--max-states", "500", "--check", "RD"]).unwrap();
        assert_eq!(parsed.max_states, Some(500));
        assert_eq!(parsed.check, Some(vec![Direction::Right, Direction::Down]));

        assert!(args(&["--max-states"]).is_err());
        assert!(args(&["--check", "RQ"]).is_err());
        assert!(args(&["astar"]).is_err());
    }

    #[test]
    fn test_check_moves() {
        let puzzle = level::parse_map("0.\n.0").unwrap();
        assert!(check(&puzzle, &[Direction::Right, Direction::Down]).is_ok());
        assert!(check(&puzzle, &[Direction::Right]).is_err());
    }
}
