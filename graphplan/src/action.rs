//! Ground action catalogue (component C3): the representation of a single
//! ground action (or synthesized persistence action), independent of any
//! particular domain's schemas.

use crate::literal::Symbol;
use crate::state::Lit;
use graphplan_collections::create_ref_type;
use std::fmt;

create_ref_type!(ActionId);

/// A ground action: a name, its arguments, and its precondition/effect
/// literals. Preconditions and effects both carry their polarity in `Lit`
/// (a positive precondition is `Lit::new(var, true)`, a remove-effect is
/// `Lit::new(var, false)`), mirroring `aries_planning::classical::state::Operator`.
///
/// Persistence ("no-op") actions synthesized by the planning graph set
/// `persistent = true` and have `precond == effect` (a single literal).
#[derive(Debug, Clone)]
pub struct GroundAction {
    pub name: Symbol,
    pub args: Vec<Symbol>,
    pub precond: Vec<Lit>,
    pub effect: Vec<Lit>,
    pub persistent: bool,
}

impl GroundAction {
    pub fn new(name: impl Into<Symbol>, args: Vec<Symbol>, precond: Vec<Lit>, effect: Vec<Lit>) -> Self {
        GroundAction {
            name: name.into(),
            args,
            precond,
            effect,
            persistent: false,
        }
    }

    /// Builds a persistence action that requires and re-asserts `lit` with
    /// the same polarity: `Noop_pos(ℓ)` when `lit.val()` is true, `Noop_neg(ℓ)` otherwise.
    pub fn persistence(lit: Lit, display: Symbol) -> Self {
        let name = if lit.val() { "Noop_pos" } else { "Noop_neg" };
        GroundAction {
            name: Symbol::from(name),
            args: vec![display],
            precond: vec![lit],
            effect: vec![lit],
            persistent: true,
        }
    }

    pub fn is_applicable(&self, entails: impl Fn(Lit) -> bool) -> bool {
        self.precond.iter().all(|&l| entails(l))
    }
}

/// Persistence actions compare by literal and polarity (their one effect
/// literal); ordinary actions compare by name and arguments.
impl PartialEq for GroundAction {
    fn eq(&self, other: &Self) -> bool {
        if self.persistent != other.persistent {
            return false;
        }
        if self.persistent {
            self.effect == other.effect
        } else {
            self.name == other.name && self.args == other.args
        }
    }
}
impl Eq for GroundAction {}

impl std::hash::Hash for GroundAction {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.persistent.hash(state);
        if self.persistent {
            self.effect.hash(state);
        } else {
            self.name.hash(state);
            self.args.hash(state);
        }
    }
}

impl fmt::Display for GroundAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}(", self.name)?;
        for (i, a) in self.args.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{a}")?;
        }
        write!(f, ")")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::literal::sym;
    use crate::state::{StateMap, StateVarId};

    fn var(map: &mut StateMap, name: &str) -> StateVarId {
        map.intern(crate::literal::GroundLiteral::new(name, Vec::<Symbol>::new()))
    }

    #[test]
    fn persistence_actions_equate_on_literal_not_name() {
        let mut map = StateMap::new();
        let v = var(&mut map, "P");
        let lit = Lit::new(v, true);
        let a = GroundAction::persistence(lit, sym("P"));
        let b = GroundAction::persistence(lit, sym("P"));
        assert_eq!(a, b);
    }

    #[test]
    fn ordinary_actions_compare_by_name_and_args() {
        let mut map = StateMap::new();
        let v = var(&mut map, "P");
        let lit = Lit::new(v, true);
        let a = GroundAction::new("Fly", vec![sym("P1")], vec![lit], vec![lit]);
        let b = GroundAction::new("Fly", vec![sym("P1")], vec![!lit], vec![!lit]);
        // same name/args but different literal polarity: still equal per the ordinary-action rule
        assert_eq!(a, b);
        let c = GroundAction::new("Fly", vec![sym("P2")], vec![lit], vec![lit]);
        assert_ne!(a, c);
    }
}
