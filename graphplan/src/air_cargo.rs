//! The Air Cargo domain (component C1): concrete Load/Unload/Fly action
//! schemas, grounded over a scenario's cargos/planes/airports, and the three
//! canonical scenarios `air_cargo_p1`..`air_cargo_p3`.

use crate::action::GroundAction;
use crate::literal::{sym, GroundLiteral, Symbol};
use crate::problem::Problem;
use crate::state::{FluentState, Lit, StateId, StateMap};
use std::collections::HashSet;

/// A grounded Air Cargo scenario: the problem plus the symbol lists it was
/// built from (useful for printing plans back in domain terms).
pub struct AirCargoScenario {
    pub problem: Problem,
    pub cargos: Vec<Symbol>,
    pub planes: Vec<Symbol>,
    pub airports: Vec<Symbol>,
}

/// Interns every `At(x, airport)` (`x` ranging over cargos and planes) and
/// `In(cargo, plane)` literal, i.e. the full fluent universe for a scenario
/// with this signature — every action schema below only ever refers to
/// literals already present in this universe.
fn build_state_universe(map: &mut StateMap, cargos: &[Symbol], planes: &[Symbol], airports: &[Symbol]) {
    for thing in cargos.iter().chain(planes.iter()) {
        for airport in airports {
            map.intern(GroundLiteral::new("At", [thing.clone(), airport.clone()]));
        }
    }
    for cargo in cargos {
        for plane in planes {
            map.intern(GroundLiteral::new("In", [cargo.clone(), plane.clone()]));
        }
    }
}

fn lit_id(map: &StateMap, predicate: &str, args: [Symbol; 2]) -> Lit {
    let id = map
        .id_of(&GroundLiteral::new(predicate, args.clone()))
        .unwrap_or_else(|| panic!("{predicate}{args:?} missing from the scenario's fluent universe"));
    Lit::new(id, true)
}

/// `Load(cargo, plane, airport)`: requires the cargo and plane at the same
/// airport; moves the cargo into the plane.
fn load_actions(map: &StateMap, cargos: &[Symbol], planes: &[Symbol], airports: &[Symbol]) -> Vec<GroundAction> {
    let mut loads = Vec::new();
    for cargo in cargos {
        for plane in planes {
            for airport in airports {
                let at_cargo = lit_id(map, "At", [cargo.clone(), airport.clone()]);
                let at_plane = lit_id(map, "At", [plane.clone(), airport.clone()]);
                let in_cargo_plane = lit_id(map, "In", [cargo.clone(), plane.clone()]);
                loads.push(GroundAction::new(
                    "Load",
                    vec![cargo.clone(), plane.clone(), airport.clone()],
                    vec![at_cargo, at_plane],
                    vec![in_cargo_plane, !at_cargo],
                ));
            }
        }
    }
    loads
}

/// `Unload(cargo, plane, airport)`: requires the cargo in the plane and the
/// plane at the airport; moves the cargo out onto the airport.
fn unload_actions(map: &StateMap, cargos: &[Symbol], planes: &[Symbol], airports: &[Symbol]) -> Vec<GroundAction> {
    let mut unloads = Vec::new();
    for cargo in cargos {
        for plane in planes {
            for airport in airports {
                let in_cargo_plane = lit_id(map, "In", [cargo.clone(), plane.clone()]);
                let at_plane = lit_id(map, "At", [plane.clone(), airport.clone()]);
                let at_cargo = lit_id(map, "At", [cargo.clone(), airport.clone()]);
                unloads.push(GroundAction::new(
                    "Unload",
                    vec![cargo.clone(), plane.clone(), airport.clone()],
                    vec![in_cargo_plane, at_plane],
                    vec![at_cargo, !in_cargo_plane],
                ));
            }
        }
    }
    unloads
}

/// `Fly(plane, from, to)`: requires the plane at `from`; moves it to `to`.
fn fly_actions(map: &StateMap, planes: &[Symbol], airports: &[Symbol]) -> Vec<GroundAction> {
    let mut flys = Vec::new();
    for from in airports {
        for to in airports {
            if from == to {
                continue;
            }
            for plane in planes {
                let at_from = lit_id(map, "At", [plane.clone(), from.clone()]);
                let at_to = lit_id(map, "At", [plane.clone(), to.clone()]);
                flys.push(GroundAction::new(
                    "Fly",
                    vec![plane.clone(), from.clone(), to.clone()],
                    vec![at_from],
                    vec![at_to, !at_from],
                ));
            }
        }
    }
    flys
}

fn domain_actions(map: &StateMap, cargos: &[Symbol], planes: &[Symbol], airports: &[Symbol]) -> Vec<GroundAction> {
    let mut actions = load_actions(map, cargos, planes, airports);
    actions.extend(unload_actions(map, cargos, planes, airports));
    actions.extend(fly_actions(map, planes, airports));
    actions
}

/// Builds the complete fluent state over `map`'s full universe: literals in
/// `true_lits` go to `pos`, every other literal in the universe goes to `neg`.
fn complete_fluent_state(map: &StateMap, true_lits: HashSet<GroundLiteral>) -> FluentState {
    let mut pos = Vec::new();
    let mut neg = Vec::new();
    for var in map.variables() {
        let lit = map.literal_of(var).clone();
        if true_lits.contains(&lit) {
            pos.push(lit);
        } else {
            neg.push(lit);
        }
    }
    FluentState::new(pos, neg)
}

fn goal_literal(map: &StateMap, predicate: &str, args: [Symbol; 2]) -> Lit {
    lit_id(map, predicate, args)
}

/// The textbook two-cargo, two-plane, two-airport scenario: `C1`/`P1` start
/// at `SFO`, `C2`/`P2` start at `JFK`; goal swaps the cargos' airports.
pub fn air_cargo_p1() -> AirCargoScenario {
    let cargos = vec![sym("C1"), sym("C2")];
    let planes = vec![sym("P1"), sym("P2")];
    let airports = vec![sym("JFK"), sym("SFO")];

    let mut map = StateMap::new();
    build_state_universe(&mut map, &cargos, &planes, &airports);

    let mut true_lits = HashSet::new();
    true_lits.insert(GroundLiteral::new("At", [sym("C1"), sym("SFO")]));
    true_lits.insert(GroundLiteral::new("At", [sym("C2"), sym("JFK")]));
    true_lits.insert(GroundLiteral::new("At", [sym("P1"), sym("SFO")]));
    true_lits.insert(GroundLiteral::new("At", [sym("P2"), sym("JFK")]));

    let fs = complete_fluent_state(&map, true_lits);
    let initial_state = StateId::encode(&fs, &map).expect("p1's universe is self-consistent by construction");

    let goal = vec![
        goal_literal(&map, "At", [sym("C1"), sym("JFK")]),
        goal_literal(&map, "At", [sym("C2"), sym("SFO")]),
    ];

    let actions = domain_actions(&map, &cargos, &planes, &airports);
    let problem = Problem::new(map, initial_state, goal, actions);
    AirCargoScenario { problem, cargos, planes, airports }
}

/// Three cargos, three planes, three airports, each plane and its
/// same-numbered cargo starting at the matching airport. The source this
/// scenario was distilled from built its initial state by iterating a dict's
/// keys where it meant to iterate `(key, value)` pairs, silently dropping
/// every airport assignment; this builds the pairing directly instead.
pub fn air_cargo_p2() -> AirCargoScenario {
    let cargos = vec![sym("C1"), sym("C2"), sym("C3")];
    let planes = vec![sym("P1"), sym("P2"), sym("P3")];
    let airports = vec![sym("JFK"), sym("SFO"), sym("ATL")];

    let mut map = StateMap::new();
    build_state_universe(&mut map, &cargos, &planes, &airports);

    let plane_at = [(sym("P1"), sym("SFO")), (sym("P2"), sym("JFK")), (sym("P3"), sym("ATL"))];
    let cargo_at = [(sym("C1"), sym("SFO")), (sym("C2"), sym("JFK")), (sym("C3"), sym("ATL"))];

    let mut true_lits = HashSet::new();
    for (plane, airport) in &plane_at {
        true_lits.insert(GroundLiteral::new("At", [plane.clone(), airport.clone()]));
    }
    for (cargo, airport) in &cargo_at {
        true_lits.insert(GroundLiteral::new("At", [cargo.clone(), airport.clone()]));
    }

    let fs = complete_fluent_state(&map, true_lits);
    let initial_state = StateId::encode(&fs, &map).expect("p2's universe is self-consistent by construction");

    let goal = vec![
        goal_literal(&map, "At", [sym("C1"), sym("JFK")]),
        goal_literal(&map, "At", [sym("C2"), sym("SFO")]),
        goal_literal(&map, "At", [sym("C3"), sym("SFO")]),
    ];

    let actions = domain_actions(&map, &cargos, &planes, &airports);
    let problem = Problem::new(map, initial_state, goal, actions);
    AirCargoScenario { problem, cargos, planes, airports }
}

/// Four cargos, two planes, four airports — the larger scenario left as a
/// stub (`pass`) in the source this was distilled from.
pub fn air_cargo_p3() -> AirCargoScenario {
    let cargos = vec![sym("C1"), sym("C2"), sym("C3"), sym("C4")];
    let planes = vec![sym("P1"), sym("P2")];
    let airports = vec![sym("JFK"), sym("SFO"), sym("ATL"), sym("ORD")];

    let mut map = StateMap::new();
    build_state_universe(&mut map, &cargos, &planes, &airports);

    let plane_at = [(sym("P1"), sym("SFO")), (sym("P2"), sym("JFK"))];
    let cargo_at = [
        (sym("C1"), sym("SFO")),
        (sym("C2"), sym("JFK")),
        (sym("C3"), sym("ATL")),
        (sym("C4"), sym("ORD")),
    ];

    let mut true_lits = HashSet::new();
    for (plane, airport) in &plane_at {
        true_lits.insert(GroundLiteral::new("At", [plane.clone(), airport.clone()]));
    }
    for (cargo, airport) in &cargo_at {
        true_lits.insert(GroundLiteral::new("At", [cargo.clone(), airport.clone()]));
    }

    let fs = complete_fluent_state(&map, true_lits);
    let initial_state = StateId::encode(&fs, &map).expect("p3's universe is self-consistent by construction");

    let goal = vec![
        goal_literal(&map, "At", [sym("C1"), sym("JFK")]),
        goal_literal(&map, "At", [sym("C3"), sym("JFK")]),
        goal_literal(&map, "At", [sym("C2"), sym("SFO")]),
        goal_literal(&map, "At", [sym("C4"), sym("SFO")]),
    ];

    let actions = domain_actions(&map, &cargos, &planes, &airports);
    let problem = Problem::new(map, initial_state, goal, actions);
    AirCargoScenario { problem, cargos, planes, airports }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn p1_initial_actions_are_exactly_two_loads_and_two_flies_no_unloads() {
        let s = air_cargo_p1();
        let applicable: Vec<String> = s
            .problem
            .actions(&s.problem.initial_state)
            .into_iter()
            .map(|id| s.problem.action(id).to_string())
            .collect();
        assert!(applicable.contains(&"Load(C1, P1, SFO)".to_string()));
        assert!(applicable.contains(&"Load(C2, P2, JFK)".to_string()));
        assert!(applicable.contains(&"Fly(P1, SFO, JFK)".to_string()));
        assert!(applicable.contains(&"Fly(P2, JFK, SFO)".to_string()));
        assert!(!applicable.iter().any(|a| a.starts_with("Unload")));
        assert_eq!(applicable.len(), 4);
    }

    #[test]
    fn p1_ignore_preconditions_heuristic_is_two_at_the_start() {
        let s = air_cargo_p1();
        assert_eq!(s.problem.h_ignore_preconditions(&s.problem.initial_state), 2);
        assert!(!s.problem.goal_test(&s.problem.initial_state));
    }

    #[test]
    fn p1_load_removes_the_cargos_airport_literal_not_the_planes() {
        let s = air_cargo_p1();
        let load = s
            .problem
            .actions(&s.problem.initial_state)
            .into_iter()
            .find(|&id| s.problem.action(id).name.as_ref() == "Load")
            .unwrap();
        let next = s.problem.result(&s.problem.initial_state, load).unwrap();
        let decoded = s.problem.decode(&next);
        assert!(decoded.pos.contains(&GroundLiteral::new("In", [sym("C1"), sym("P1")])));
        assert!(!decoded.pos.contains(&GroundLiteral::new("At", [sym("C1"), sym("SFO")])));
        assert!(decoded.pos.contains(&GroundLiteral::new("At", [sym("P1"), sym("SFO")])));
    }

    #[test]
    fn p2_true_literals_cover_every_plane_and_cargo_pairing() {
        let s = air_cargo_p2();
        let decoded = s.problem.decode(&s.problem.initial_state);
        assert!(decoded.pos.contains(&GroundLiteral::new("At", [sym("P3"), sym("ATL")])));
        assert!(decoded.pos.contains(&GroundLiteral::new("At", [sym("C3"), sym("ATL")])));
    }

    #[test]
    fn p3_goal_is_not_satisfied_initially() {
        let s = air_cargo_p3();
        assert!(!s.problem.goal_test(&s.problem.initial_state));
        assert_eq!(s.problem.h_ignore_preconditions(&s.problem.initial_state), 4);
    }
}
