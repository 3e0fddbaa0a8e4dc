//! Precondition index (component C8): maps a literal (keyed by value and
//! polarity) to the set of actions that list it as a precondition. Built
//! once per problem and shared by every planning graph derived from it.

use crate::action::{ActionId, GroundAction};
use crate::state::{Lit, StateMap};
use graphplan_collections::ref_store::{RefStore, RefVec};

#[derive(Debug, Default)]
pub struct PreconditionIndex {
    /// Indexed by `usize::from(Lit)`: every literal in the state map has an
    /// entry for both polarities, possibly empty.
    by_literal: RefVec<Lit, Vec<ActionId>>,
}

impl PreconditionIndex {
    /// Builds the index over `actions` (which must already include any
    /// synthesized no-op actions), keying every literal in `map` with both
    /// polarities so lookups never miss.
    pub fn build(actions: &RefStore<ActionId, GroundAction>, map: &StateMap) -> Self {
        let mut by_literal: RefVec<Lit, Vec<ActionId>> = RefVec::new();
        for var in map.variables() {
            by_literal.fill_with(Lit::new(var, false), Vec::new);
            by_literal.fill_with(Lit::new(var, true), Vec::new);
        }
        for (id, action) in actions.entries() {
            for &lit in &action.precond {
                by_literal.fill_with(lit, Vec::new);
                by_literal[lit].push(id);
            }
        }
        PreconditionIndex { by_literal }
    }

    pub fn actions_requiring(&self, lit: Lit) -> &[ActionId] {
        if usize::from(lit) < self.by_literal.len() {
            &self.by_literal[lit]
        } else {
            &[]
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::literal::{sym, GroundLiteral};

    #[test]
    fn every_literal_is_keyed_with_both_polarities() {
        let mut map = StateMap::new();
        let v = map.intern(GroundLiteral::new("At", [sym("C1"), sym("SFO")]));
        let mut actions = RefStore::new();
        let a = crate::action::GroundAction::new(
            "Load",
            vec![sym("C1")],
            vec![crate::state::Lit::new(v, true)],
            vec![crate::state::Lit::new(v, false)],
        );
        let id = actions.push(a);
        let index = PreconditionIndex::build(&actions, &map);
        assert_eq!(index.actions_requiring(crate::state::Lit::new(v, true)), &[id]);
        assert_eq!(index.actions_requiring(crate::state::Lit::new(v, false)), &[] as &[ActionId]);
    }
}
