//! Solves an Air Cargo scenario with A* search, driven by one of the core's
//! admissible heuristics.

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use graphplan::air_cargo::{air_cargo_p1, air_cargo_p2, air_cargo_p3, AirCargoScenario};
use graphplan::{ActionId, PlanningGraph, Problem, StateId};
use pathfinding::directed::astar::astar;

#[derive(Debug, Clone, Copy, ValueEnum)]
enum Scenario {
    P1,
    P2,
    P3,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum Heuristic {
    /// Constant heuristic of 1: uninformed search, kept only for comparison.
    H1,
    /// Count of unsatisfied goal literals.
    IgnorePreconditions,
    /// Sum, over goal literals, of their earliest planning-graph level.
    Levelsum,
}

/// Solves an Air Cargo scenario with A* search.
#[derive(Debug, Parser)]
#[command(name = "graphplan", rename_all = "kebab-case")]
struct Args {
    /// Which canonical scenario to solve.
    #[arg(value_enum, default_value_t = Scenario::P1)]
    scenario: Scenario,

    /// Which heuristic to guide the search with.
    #[arg(long, value_enum, default_value_t = Heuristic::Levelsum)]
    heuristic: Heuristic,

    /// Use the relaxed (non-serial) mutex graph instead of the serial one.
    #[arg(long)]
    non_serial: bool,

    /// Logging level to use: one of "error", "warn", "info", "debug", "trace".
    #[arg(short, long, default_value = "warn")]
    log_level: tracing::Level,
}

impl std::fmt::Display for Scenario {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Scenario::P1 => "p1",
            Scenario::P2 => "p2",
            Scenario::P3 => "p3",
        };
        write!(f, "{s}")
    }
}

impl std::fmt::Display for Heuristic {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Heuristic::H1 => "h1",
            Heuristic::IgnorePreconditions => "ignore-preconditions",
            Heuristic::Levelsum => "levelsum",
        };
        write!(f, "{s}")
    }
}

fn main() -> Result<()> {
    let args = Args::parse();

    let subscriber = tracing_subscriber::fmt().with_max_level(args.log_level).finish();
    tracing::subscriber::set_global_default(subscriber).context("failed to install global tracing subscriber")?;

    let AirCargoScenario { problem, .. } = match args.scenario {
        Scenario::P1 => air_cargo_p1(),
        Scenario::P2 => air_cargo_p2(),
        Scenario::P3 => air_cargo_p3(),
    };

    tracing::info!(heuristic = %args.heuristic, "starting search");
    let serial = !args.non_serial;

    let result = astar(
        &problem.initial_state,
        |state| successors(&problem, state),
        |state| heuristic_value(&problem, state, args.heuristic, serial),
        |state| problem.goal_test(state),
    );

    match result {
        Some((path, cost)) => {
            println!("plan found: {} action(s), cost {cost}", path.len() - 1);
            for window in path.windows(2) {
                let action = action_between(&problem, &window[0], &window[1])
                    .expect("every consecutive pair on an A* path is connected by some applicable action");
                println!("  {}", problem.action(action));
            }
        }
        None => println!("no plan found"),
    }
    Ok(())
}

fn successors(problem: &Problem, state: &StateId) -> Vec<(StateId, u32)> {
    problem
        .actions(state)
        .into_iter()
        .map(|action| {
            let next = problem
                .result(state, action)
                .expect("actions() only returns actions applicable in state");
            (next, 1u32)
        })
        .collect()
}

fn heuristic_value(problem: &Problem, state: &StateId, heuristic: Heuristic, serial: bool) -> u32 {
    match heuristic {
        Heuristic::H1 => problem.h_1(state),
        Heuristic::IgnorePreconditions => problem.h_ignore_preconditions(state),
        Heuristic::Levelsum => PlanningGraph::build(problem, state, serial, true).h_levelsum(),
    }
}

fn action_between(problem: &Problem, from: &StateId, to: &StateId) -> Option<ActionId> {
    problem.actions(from).into_iter().find(|&action| {
        problem
            .result(from, action)
            .map(|next| &next == to)
            .unwrap_or(false)
    })
}
