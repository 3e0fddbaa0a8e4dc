//! Grounded STRIPS problems, Graphplan planning graphs, and their two
//! admissible heuristics (ignore-preconditions and planning-graph level-sum),
//! specialized to the Air Cargo domain.

pub mod action;
pub mod air_cargo;
pub mod error;
pub mod graph;
pub mod literal;
pub mod precondition_index;
pub mod problem;
pub mod state;

pub use action::{ActionId, GroundAction};
pub use error::{GraphplanError, Result};
pub use graph::{PlanningGraph, LEVELSUM_UNREACHABLE};
pub use literal::{sym, GroundLiteral, Symbol};
pub use problem::Problem;
pub use state::{FluentState, Lit, StateId, StateMap, StateVarId};
