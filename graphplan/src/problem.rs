//! The grounded STRIPS problem (component C4): initial state, goal
//! conjunction, `actions(state)`, `result(state, action)`, `goal_test(state)`.

use crate::action::{ActionId, GroundAction};
use crate::error::{GraphplanError, Result};
use crate::literal::sym;
use crate::precondition_index::PreconditionIndex;
use crate::state::{FluentState, Lit, StateId, StateMap};
use graphplan_collections::ref_store::RefStore;

/// A grounded STRIPS problem. Referentially transparent: `actions`, `result`
/// and `goal_test` are pure functions of their `StateId` argument, and the
/// problem itself never mutates after construction.
pub struct Problem {
    pub state_map: StateMap,
    pub initial_state: StateId,
    pub goal: Vec<Lit>,
    /// All actions, domain actions first (in stable catalogue order) followed
    /// by the no-op actions synthesized for the planning graph. `actions()`
    /// only ever returns ids in `0..domain_action_count`.
    pub(crate) actions_table: RefStore<ActionId, GroundAction>,
    domain_action_count: usize,
    /// Precondition index over `actions_table` (domain actions + no-ops), built
    /// eagerly so every [`crate::graph::PlanningGraph`] derived from this
    /// problem can reuse it without recomputation.
    pub precondition_index: PreconditionIndex,
}

impl Problem {
    /// Constructs a problem from an already-grounded action catalogue. The
    /// no-op (persistence) actions used only by the planning graph are
    /// synthesized here and appended after the domain actions, and the
    /// precondition index is built eagerly over the combined set.
    pub fn new(state_map: StateMap, initial_state: StateId, goal: Vec<Lit>, domain_actions: Vec<GroundAction>) -> Self {
        let domain_action_count = domain_actions.len();
        let mut actions_table = RefStore::new();
        for action in domain_actions {
            actions_table.push(action);
        }
        for var in state_map.variables() {
            let display = sym(state_map.literal_of(var).to_string());
            actions_table.push(GroundAction::persistence(Lit::new(var, true), display.clone()));
            actions_table.push(GroundAction::persistence(Lit::new(var, false), display));
        }
        let precondition_index = PreconditionIndex::build(&actions_table, &state_map);
        Problem {
            state_map,
            initial_state,
            goal,
            actions_table,
            domain_action_count,
            precondition_index,
        }
    }

    pub fn action(&self, id: ActionId) -> &GroundAction {
        &self.actions_table[id]
    }

    pub fn all_actions(&self) -> &RefStore<ActionId, GroundAction> {
        &self.actions_table
    }

    /// Ids of the domain actions only (catalogue order, no-ops excluded) —
    /// the set `actions(state)` draws from.
    pub fn domain_action_ids(&self) -> impl Iterator<Item = ActionId> {
        (0..self.domain_action_count).map(ActionId::from)
    }

    /// Actions applicable in `state`, in stable catalogue order.
    pub fn actions(&self, state: &StateId) -> Vec<ActionId> {
        self.domain_action_ids()
            .filter(|&id| self.action(id).is_applicable(|l| state.entails(l)))
            .collect()
    }

    /// The state resulting from applying `action` to `state`. `action` must
    /// be one of `self.actions(state)`.
    pub fn result(&self, state: &StateId, action: ActionId) -> Result<StateId> {
        let op = self.action(action);
        if !op.is_applicable(|l| state.entails(l)) {
            return Err(GraphplanError::PreconditionViolated {
                action: op.to_string(),
            });
        }
        let mut next = state.clone();
        for &lit in &op.effect {
            next.set(lit);
        }
        Ok(next)
    }

    /// True iff every goal literal holds in `state`. Equivalent to a
    /// knowledge-base containment check over the positive-literal sentence
    /// of `state`, specialized to direct subset containment since every goal
    /// here is a positive literal (see DESIGN.md).
    pub fn goal_test(&self, state: &StateId) -> bool {
        state.entails_all(&self.goal)
    }

    /// Decodes `state` into its symbolic [`FluentState`] view.
    pub fn decode(&self, state: &StateId) -> FluentState {
        state.decode(&self.state_map)
    }

    /// Constant heuristic of 1: not a true estimate, kept for comparisons
    /// against the two admissible heuristics.
    pub fn h_1(&self, _state: &StateId) -> u32 {
        1
    }

    /// Ignore-preconditions heuristic: the number of goal literals not yet
    /// true in `state`. Admissible because each missing goal needs at least
    /// one action to achieve it. O(|goals|).
    pub fn h_ignore_preconditions(&self, state: &StateId) -> u32 {
        self.goal.iter().filter(|&&g| !state.entails(g)).count() as u32
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::literal::GroundLiteral;

    fn toy_problem() -> Problem {
        let mut map = StateMap::new();
        let at_a = map.intern(GroundLiteral::new("At", [sym("A")]));
        let at_b = map.intern(GroundLiteral::new("At", [sym("B")]));
        let initial = FluentState::new([map.literal_of(at_a).clone()], [map.literal_of(at_b).clone()]);
        let initial_state = StateId::encode(&initial, &map).unwrap();
        let goal = vec![Lit::new(at_b, true)];
        let mv = GroundAction::new(
            "Move",
            vec![sym("A"), sym("B")],
            vec![Lit::new(at_a, true)],
            vec![Lit::new(at_a, false), Lit::new(at_b, true)],
        );
        Problem::new(map, initial_state, goal, vec![mv])
    }

    #[test]
    fn ignore_preconditions_counts_missing_goals() {
        let p = toy_problem();
        assert_eq!(p.h_ignore_preconditions(&p.initial_state), 1);
        assert!(!p.goal_test(&p.initial_state));
    }

    #[test]
    fn result_applies_add_and_remove_effects() {
        let p = toy_problem();
        let applicable = p.actions(&p.initial_state);
        assert_eq!(applicable.len(), 1);
        let next = p.result(&p.initial_state, applicable[0]).unwrap();
        assert!(p.goal_test(&next));
        assert_eq!(p.h_ignore_preconditions(&next), 0);
    }

    #[test]
    fn goal_satisfaction_requires_every_goal_literal() {
        let scenario = crate::air_cargo::air_cargo_p1();
        let problem = &scenario.problem;
        let c1_jfk = GroundLiteral::new("At", [sym("C1"), sym("JFK")]);
        let c2_sfo = GroundLiteral::new("At", [sym("C2"), sym("SFO")]);

        let mut both = problem.decode(&problem.initial_state);
        both.neg.remove(&c1_jfk);
        both.pos.insert(c1_jfk.clone());
        both.neg.remove(&c2_sfo);
        both.pos.insert(c2_sfo.clone());
        let both_state = StateId::encode(&both, &problem.state_map).unwrap();
        assert!(problem.goal_test(&both_state));

        let mut missing_c1 = both.clone();
        missing_c1.pos.remove(&c1_jfk);
        missing_c1.neg.insert(c1_jfk);
        let missing_c1_state = StateId::encode(&missing_c1, &problem.state_map).unwrap();
        assert!(!problem.goal_test(&missing_c1_state));

        let mut missing_c2 = both.clone();
        missing_c2.pos.remove(&c2_sfo);
        missing_c2.neg.insert(c2_sfo);
        let missing_c2_state = StateId::encode(&missing_c2, &problem.state_map).unwrap();
        assert!(!problem.goal_test(&missing_c2_state));
    }

    #[test]
    fn precondition_index_covers_every_literal_with_both_polarities() {
        let p = toy_problem();
        for var in p.state_map.variables() {
            assert!(p.precondition_index.actions_requiring(Lit::new(var, true)).len() <= p.actions_table.len());
            assert!(p.precondition_index.actions_requiring(Lit::new(var, false)).len() <= p.actions_table.len());
        }
    }
}
