//! Fluent state & encoding (component C2): a bidirectional mapping between a
//! symbolic [`FluentState`] (positive/negative literal sets) and a compact
//! bit-string [`StateId`], plus the ordered literal index (the state map)
//! that positions index into.

use crate::error::{GraphplanError, Result};
use crate::literal::GroundLiteral;
use fixedbitset::FixedBitSet;
use graphplan_collections::create_ref_type;
use graphplan_collections::ref_store::RefPool;
use std::collections::HashSet;
use std::fmt;

create_ref_type!(StateVarId);

/// A literal: a state variable plus a truth value, packed into a single
/// `NonZeroU32` the way `aries_planning::classical::state::Lit` does, so that
/// it stays `Copy` and cheaply hashable/orderable.
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Debug)]
pub struct Lit {
    inner: std::num::NonZeroU32,
}

impl Lit {
    pub fn new(var: StateVarId, value: bool) -> Lit {
        let idx: usize = var.into();
        let packed = (((idx + 1) as u32) << 1) | (value as u32);
        Lit {
            inner: std::num::NonZeroU32::new(packed).unwrap(),
        }
    }

    pub fn var(self) -> StateVarId {
        StateVarId::from_u32((self.inner.get() >> 1) - 1)
    }

    pub fn val(self) -> bool {
        (self.inner.get() & 1) != 0
    }
}

impl std::ops::Not for Lit {
    type Output = Lit;
    fn not(self) -> Lit {
        Lit::new(self.var(), !self.val())
    }
}

impl From<Lit> for usize {
    fn from(lit: Lit) -> Self {
        lit.inner.get() as usize - 2
    }
}

impl From<usize> for Lit {
    fn from(x: usize) -> Self {
        Lit {
            inner: std::num::NonZeroU32::new(x as u32 + 2).unwrap(),
        }
    }
}

/// The ordered sequence of every literal that can appear in any state of a
/// problem, i.e. the initial state's `pos ∪ neg`. Stable for the problem's
/// lifetime; positions index [`StateId`]'s bitset.
#[derive(Clone, Debug, Default)]
pub struct StateMap {
    literals: RefPool<StateVarId, GroundLiteral>,
}

impl StateMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Interns `literal`, returning its existing id if already present.
    pub fn intern(&mut self, literal: GroundLiteral) -> StateVarId {
        self.literals.intern(literal)
    }

    pub fn id_of(&self, literal: &GroundLiteral) -> Option<StateVarId> {
        self.literals.get_ref(literal)
    }

    pub fn literal_of(&self, var: StateVarId) -> &GroundLiteral {
        self.literals.get(var)
    }

    pub fn len(&self) -> usize {
        self.literals.len()
    }

    pub fn is_empty(&self) -> bool {
        self.literals.is_empty()
    }

    pub fn variables(&self) -> impl Iterator<Item = StateVarId> + '_ {
        self.literals.keys()
    }
}

/// Two disjoint sets over the literal universe of a [`StateMap`]: the
/// literals asserted true (`pos`) and those asserted false (`neg`). Never
/// mutated in place — every transition produces a new value.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct FluentState {
    pub pos: HashSet<GroundLiteral>,
    pub neg: HashSet<GroundLiteral>,
}

impl FluentState {
    pub fn new(pos: impl IntoIterator<Item = GroundLiteral>, neg: impl IntoIterator<Item = GroundLiteral>) -> Self {
        FluentState {
            pos: pos.into_iter().collect(),
            neg: neg.into_iter().collect(),
        }
    }
}

/// A fixed-length bit-string over a [`StateMap`]: position `i` is `1` iff the
/// literal at index `i` is true in that state. Cheap to copy and compare;
/// the currency of the search frontier.
#[derive(Clone, PartialEq, Eq, Hash, Debug)]
pub struct StateId {
    bits: FixedBitSet,
}

impl StateId {
    pub fn with_len(len: usize) -> Self {
        StateId {
            bits: FixedBitSet::with_capacity(len),
        }
    }

    pub fn num_variables(&self) -> usize {
        self.bits.len()
    }

    pub fn is_set(&self, var: StateVarId) -> bool {
        self.bits.contains(var.into())
    }

    pub fn set_to(&mut self, var: StateVarId, value: bool) {
        self.bits.set(var.into(), value);
    }

    pub fn set(&mut self, lit: Lit) {
        self.set_to(lit.var(), lit.val());
    }

    pub fn entails(&self, lit: Lit) -> bool {
        self.is_set(lit.var()) == lit.val()
    }

    pub fn entails_all(&self, lits: &[Lit]) -> bool {
        lits.iter().all(|&l| self.entails(l))
    }

    pub fn literals(&self) -> impl Iterator<Item = Lit> + '_ {
        (0..self.bits.len())
            .map(StateVarId::from)
            .map(move |v| Lit::new(v, self.is_set(v)))
    }

    /// Encodes a symbolic [`FluentState`] into a [`StateId`] against `map`.
    /// Fails if any literal in `pos ∪ neg` is not part of the state map.
    pub fn encode(fs: &FluentState, map: &StateMap) -> Result<StateId> {
        let mut id = StateId::with_len(map.len());
        for var in map.variables() {
            let lit = map.literal_of(var);
            if fs.pos.contains(lit) {
                id.set_to(var, true);
            } else if fs.neg.contains(lit) {
                id.set_to(var, false);
            } else {
                return Err(GraphplanError::StateInvariant(format!(
                    "literal {lit} from the state map is neither positive nor negative in the given fluent state"
                )));
            }
        }
        Ok(id)
    }

    /// Decodes this [`StateId`] back into a symbolic [`FluentState`] against `map`.
    pub fn decode(&self, map: &StateMap) -> FluentState {
        let mut pos = HashSet::with_capacity(self.bits.count_ones(..));
        let mut neg = HashSet::new();
        for var in map.variables() {
            let lit = map.literal_of(var).clone();
            if self.is_set(var) {
                pos.insert(lit);
            } else {
                neg.insert(lit);
            }
        }
        FluentState { pos, neg }
    }

    pub fn displayable<'a>(&'a self, map: &'a StateMap) -> impl fmt::Display + 'a {
        DisplayState(self, map)
    }
}

struct DisplayState<'a>(&'a StateId, &'a StateMap);

impl<'a> fmt::Display for DisplayState<'a> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for var in self.1.variables() {
            if self.0.is_set(var) {
                writeln!(f, "{}", self.1.literal_of(var))?;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::literal::sym;

    fn sample_map() -> (StateMap, GroundLiteral, GroundLiteral) {
        let mut map = StateMap::new();
        let a = GroundLiteral::new("At", [sym("C1"), sym("SFO")]);
        let b = GroundLiteral::new("At", [sym("C2"), sym("JFK")]);
        map.intern(a.clone());
        map.intern(b.clone());
        (map, a, b)
    }

    #[test]
    fn lit_roundtrips_through_bit_packing() {
        let (map, a, _b) = sample_map();
        let var = map.id_of(&a).unwrap();
        let lit_true = Lit::new(var, true);
        let lit_false = Lit::new(var, false);
        assert_eq!(lit_true.var(), var);
        assert!(lit_true.val());
        assert_eq!(lit_false.var(), var);
        assert!(!lit_false.val());
        assert_eq!(!lit_true, lit_false);
    }

    #[test]
    fn encode_decode_round_trip() {
        let (map, a, b) = sample_map();
        let fs = FluentState::new([a.clone()], [b.clone()]);
        let id = StateId::encode(&fs, &map).unwrap();
        let decoded = id.decode(&map);
        assert_eq!(decoded, fs);
    }

    #[test]
    fn encode_rejects_literal_outside_the_map() {
        let (map, a, _b) = sample_map();
        let stray = GroundLiteral::new("At", [sym("C3"), sym("ATL")]);
        let fs = FluentState::new([a], [stray]);
        assert!(StateId::encode(&fs, &map).is_err());
    }

    #[test]
    fn pos_and_neg_are_always_disjoint_after_decode() {
        let (map, a, b) = sample_map();
        let fs = FluentState::new([a], [b]);
        let id = StateId::encode(&fs, &map).unwrap();
        let decoded = id.decode(&map);
        assert!(decoded.pos.is_disjoint(&decoded.neg));
    }
}
