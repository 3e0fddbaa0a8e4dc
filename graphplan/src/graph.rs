//! Planning graph builder and mutex engine (components C5 and C6): alternating
//! S-levels and A-levels built from a given state until leveled (or, in
//! short-circuit mode, until every goal literal appears), including
//! persistence actions and the four action-mutex / two literal-mutex rules.

use crate::action::{ActionId, GroundAction};
use crate::error::{GraphplanError, Result};
use crate::problem::Problem;
use crate::state::{Lit, StateId};
use graphplan_collections::create_ref_type;
use graphplan_collections::ref_store::RefStore;
use std::collections::{BTreeSet, HashMap, HashSet};

create_ref_type!(SNodeId);
create_ref_type!(ANodeId);

/// A state-level (S-node): a literal plus its parent/child/mutex relations.
/// `parents`/`children`/`mutex` hold handles into the sibling or
/// adjacent-level arena they refer to — never owning references, freed as a
/// unit when the level (and the graph) is dropped.
#[derive(Debug, Clone)]
pub struct SNode {
    pub lit: Lit,
    /// Handles into the preceding A-level (empty for S0).
    pub parents: Vec<ANodeId>,
    /// Handles into the following A-level.
    pub children: Vec<ANodeId>,
    /// Handles of mutex siblings within this same S-level.
    pub mutex: Vec<SNodeId>,
}

/// An action-level (A-node): a ground action (or persistence action) plus
/// its parent/child/mutex relations, same handle convention as [`SNode`].
#[derive(Debug, Clone)]
pub struct ANode {
    pub action: ActionId,
    /// Handles into the preceding S-level (its precondition S-nodes).
    pub parents: Vec<SNodeId>,
    /// Handles into the following S-level (its effect S-nodes).
    pub children: Vec<SNodeId>,
    /// Handles of mutex siblings within this same A-level.
    pub mutex: Vec<ANodeId>,
}

/// A planning graph: an ordered sequence of S-levels and A-levels built from
/// a single source state. Built once, immutable afterwards, owned entirely
/// by the caller and dropped as a unit when no longer needed.
pub struct PlanningGraph<'p> {
    problem: &'p Problem,
    serial: bool,
    short_circuit: bool,
    s_levels: Vec<RefStore<SNodeId, SNode>>,
    a_levels: Vec<RefStore<ANodeId, ANode>>,
    built: bool,
}

/// Sentinel returned by [`PlanningGraph::h_levelsum`] when a goal literal
/// never appears in the graph, i.e. the graph levels off without it.
pub const LEVELSUM_UNREACHABLE: u32 = u32::MAX;

impl<'p> PlanningGraph<'p> {
    /// Prepares a planning graph rooted at `state`, with S0 populated from its
    /// literals. Call [`Self::create_graph`] exactly once to actually build it,
    /// or use [`Self::build`] to do both in one step.
    pub fn new(problem: &'p Problem, state: &StateId, serial: bool, short_circuit: bool) -> Self {
        let mut s0 = RefStore::new();
        for lit in state.literals() {
            s0.push(SNode {
                lit,
                parents: Vec::new(),
                children: Vec::new(),
                mutex: Vec::new(),
            });
        }
        PlanningGraph {
            problem,
            serial,
            short_circuit,
            s_levels: vec![s0],
            a_levels: Vec::new(),
            built: false,
        }
    }

    /// Constructs and fully builds a planning graph rooted at `state` in one step.
    pub fn build(problem: &'p Problem, state: &StateId, serial: bool, short_circuit: bool) -> Self {
        let mut g = Self::new(problem, state, serial, short_circuit);
        g.create_graph().expect("freshly constructed graph can always be built");
        g
    }

    /// Grows the graph, alternating A-levels and S-levels, until leveled (or,
    /// in short-circuit mode, until the goal is reachable at the latest
    /// S-level). May only be called once per graph.
    pub fn create_graph(&mut self) -> Result<()> {
        if self.built {
            return Err(GraphplanError::GraphMisuse(
                "planning graph already created; construct a new planning graph for each new state".to_string(),
            ));
        }
        self.built = true;

        let goal_lits: HashSet<Lit> = self.problem.goal.iter().copied().collect();
        loop {
            self.add_action_level();
            if !self.short_circuit {
                self.update_a_mutex();
            }
            self.add_literal_level();
            if !self.short_circuit {
                self.update_s_mutex();
            }

            let k = self.s_levels.len() - 1;
            tracing::debug!(level = k, literals = self.s_levels[k].len(), "planning graph level built");
            if self.short_circuit {
                let present: HashSet<Lit> = self.s_levels[k].entries().map(|(_, n)| n.lit).collect();
                if goal_lits.is_subset(&present) {
                    tracing::debug!(level = k, "goal reachable, short-circuiting");
                    return Ok(());
                }
            }
            if Self::level_signature(&self.s_levels[k]) == Self::level_signature(&self.s_levels[k - 1]) {
                tracing::debug!(level = k, "graph leveled off");
                return Ok(());
            }
        }
    }

    pub fn s_levels(&self) -> &[RefStore<SNodeId, SNode>] {
        &self.s_levels
    }

    pub fn a_levels(&self) -> &[RefStore<ANodeId, ANode>] {
        &self.a_levels
    }

    fn level_signature(level: &RefStore<SNodeId, SNode>) -> (BTreeSet<Lit>, BTreeSet<(Lit, Lit)>) {
        let lits: BTreeSet<Lit> = level.entries().map(|(_, n)| n.lit).collect();
        let mut pairs = BTreeSet::new();
        for (_, n) in level.entries() {
            for &j in &n.mutex {
                let (a, b) = (n.lit, level[j].lit);
                pairs.insert(if a < b { (a, b) } else { (b, a) });
            }
        }
        (lits, pairs)
    }

    /// Builds the A-level from the last S-level: an action is admitted only
    /// if *all* of its precondition S-nodes are present in that S-level (the
    /// corrected rule — see DESIGN.md's note on the source's looser "any
    /// matching precondition" admission test).
    fn add_action_level(&mut self) {
        let problem = self.problem;
        let k = self.s_levels.len() - 1;

        let lit_to_idx: HashMap<Lit, SNodeId> = self.s_levels[k].entries().map(|(id, n)| (n.lit, id)).collect();

        let mut candidates: Vec<ActionId> = Vec::new();
        let mut seen = HashSet::new();
        for (_, s_node) in self.s_levels[k].entries() {
            for &aid in problem.precondition_index.actions_requiring(s_node.lit) {
                if seen.insert(aid) {
                    candidates.push(aid);
                }
            }
        }

        let mut a_nodes: RefStore<ANodeId, ANode> = RefStore::new();
        for aid in candidates {
            let action = problem.action(aid);
            let mut parents = Vec::with_capacity(action.precond.len());
            let mut admitted = true;
            for &p in &action.precond {
                match lit_to_idx.get(&p) {
                    Some(&idx) => parents.push(idx),
                    None => {
                        admitted = false;
                        break;
                    }
                }
            }
            if !admitted {
                continue;
            }
            let a_id = a_nodes.push(ANode {
                action: aid,
                parents: parents.clone(),
                children: Vec::new(),
                mutex: Vec::new(),
            });
            for sidx in parents {
                self.s_levels[k][sidx].children.push(a_id);
            }
        }
        self.a_levels.push(a_nodes);
    }

    /// Builds the next S-level from the last A-level: the union of every
    /// effect literal, each linked back to every action that produces it.
    fn add_literal_level(&mut self) {
        let problem = self.problem;
        let k = self.a_levels.len() - 1;

        let mut lit_to_idx: HashMap<Lit, SNodeId> = HashMap::new();
        let mut s_nodes: RefStore<SNodeId, SNode> = RefStore::new();
        for (_, a_node) in self.a_levels[k].entries() {
            for &eff in &problem.action(a_node.action).effect {
                lit_to_idx.entry(eff).or_insert_with(|| {
                    s_nodes.push(SNode {
                        lit: eff,
                        parents: Vec::new(),
                        children: Vec::new(),
                        mutex: Vec::new(),
                    })
                });
            }
        }

        let a_ids: Vec<ANodeId> = self.a_levels[k].keys().collect();
        for a_id in a_ids {
            let action_id = self.a_levels[k][a_id].action;
            for &eff in &problem.action(action_id).effect {
                let sidx = lit_to_idx[&eff];
                self.a_levels[k][a_id].children.push(sidx);
                s_nodes[sidx].parents.push(a_id);
            }
        }

        self.s_levels.push(s_nodes);
    }

    /// Action-mutex rules on the last A-level: serial graph rule,
    /// inconsistent effects, interference, competing needs.
    fn update_a_mutex(&mut self) {
        let problem = self.problem;
        let k = self.a_levels.len() - 1;
        let ids: Vec<ANodeId> = self.a_levels[k].keys().collect();
        let mut mutex_pairs = Vec::new();
        for (i, &id1) in ids.iter().enumerate() {
            for &id2 in &ids[i + 1..] {
                let a1 = &self.a_levels[k][id1];
                let a2 = &self.a_levels[k][id2];
                let op1 = problem.action(a1.action);
                let op2 = problem.action(a2.action);
                let is_mutex = Self::serial_mutex(self.serial, op1, op2)
                    || Self::inconsistent_effects_mutex(op1, op2)
                    || Self::interference_mutex(op1, op2)
                    || Self::competing_needs_mutex(a1, a2, &self.s_levels[k]);
                if is_mutex {
                    mutex_pairs.push((id1, id2));
                }
            }
        }
        for (id1, id2) in mutex_pairs {
            self.a_levels[k][id1].mutex.push(id2);
            self.a_levels[k][id2].mutex.push(id1);
        }
    }

    fn serial_mutex(serial: bool, a1: &GroundAction, a2: &GroundAction) -> bool {
        serial && !a1.persistent && !a2.persistent
    }

    fn inconsistent_effects_mutex(a1: &GroundAction, a2: &GroundAction) -> bool {
        Self::effects_conflict(a1, a2) || Self::effects_conflict(a2, a1)
    }

    fn effects_conflict(a: &GroundAction, b: &GroundAction) -> bool {
        a.effect
            .iter()
            .any(|&x| b.effect.iter().any(|&y| x.var() == y.var() && x.val() != y.val()))
    }

    fn interference_mutex(a1: &GroundAction, a2: &GroundAction) -> bool {
        Self::interferes_with(a1, a2) || Self::interferes_with(a2, a1)
    }

    /// True if an effect of `a` contradicts a precondition of `b`: an
    /// add-effect of `a` equalling a negative precondition of `b`, or a
    /// remove-effect of `a` equalling a positive precondition of `b`.
    fn interferes_with(a: &GroundAction, b: &GroundAction) -> bool {
        a.effect.iter().any(|&eff| {
            b.precond
                .iter()
                .any(|&pre| pre.var() == eff.var() && pre.val() != eff.val())
        })
    }

    fn competing_needs_mutex(a1: &ANode, a2: &ANode, s_level: &RefStore<SNodeId, SNode>) -> bool {
        a1.parents
            .iter()
            .any(|p1| a2.parents.iter().any(|p2| s_level[*p1].mutex.contains(p2)))
    }

    /// Literal-mutex rules on the last S-level: negation, inconsistent support.
    fn update_s_mutex(&mut self) {
        let k = self.s_levels.len() - 1;
        let a_level = &self.a_levels[k - 1];
        let ids: Vec<SNodeId> = self.s_levels[k].keys().collect();
        let mut mutex_pairs = Vec::new();
        for (i, &id1) in ids.iter().enumerate() {
            for &id2 in &ids[i + 1..] {
                let s1 = &self.s_levels[k][id1];
                let s2 = &self.s_levels[k][id2];
                let is_mutex = Self::negation_mutex(s1.lit, s2.lit) || Self::inconsistent_support_mutex(s1, s2, a_level);
                if is_mutex {
                    mutex_pairs.push((id1, id2));
                }
            }
        }
        for (id1, id2) in mutex_pairs {
            self.s_levels[k][id1].mutex.push(id2);
            self.s_levels[k][id2].mutex.push(id1);
        }
    }

    fn negation_mutex(l1: Lit, l2: Lit) -> bool {
        l1.var() == l2.var() && l1.val() != l2.val()
    }

    /// Mutex iff every pair of supporting actions (one per literal) is
    /// itself action-mutex; i.e. not mutex as soon as one non-mutex
    /// supporting pair is found.
    fn inconsistent_support_mutex(s1: &SNode, s2: &SNode, a_level: &RefStore<ANodeId, ANode>) -> bool {
        for &p1 in &s1.parents {
            for &p2 in &s2.parents {
                if !a_level[p1].mutex.contains(&p2) {
                    return false;
                }
            }
        }
        true
    }

    /// Level-sum heuristic: the sum, over goal literals, of the earliest
    /// level at which each first appears as a positive S-node. Returns
    /// [`LEVELSUM_UNREACHABLE`] if the graph levels off without some goal
    /// literal ever appearing. Admissible only under goal independence — the
    /// caller, not this function, is responsible for picking a search method
    /// that tolerates (or avoids) the non-admissible case.
    pub fn h_levelsum(&self) -> u32 {
        let mut remaining: HashSet<Lit> = self.problem.goal.iter().copied().collect();
        let mut sum: u64 = 0;
        for (level_idx, s_level) in self.s_levels.iter().enumerate() {
            if remaining.is_empty() {
                break;
            }
            let present: HashSet<Lit> = s_level.entries().map(|(_, n)| n.lit).collect();
            let found: Vec<Lit> = remaining.intersection(&present).copied().collect();
            for lit in found {
                remaining.remove(&lit);
                sum += level_idx as u64;
            }
        }
        if remaining.is_empty() {
            sum.min(LEVELSUM_UNREACHABLE as u64) as u32
        } else {
            LEVELSUM_UNREACHABLE
        }
    }
}
