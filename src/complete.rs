//! Branch-and-bound completion of a skeleton with pi bonds and lone pairs.

use crate::score::{evaluate, SCORE_EPSILON};
use crate::*;
use petgraph::graph::{EdgeIndex, NodeIndex};
use std::collections::HashSet;
use tracing::{debug, trace};

/// How a skeleton's remaining electrons are distributed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Strategy {
    /// Raise bond orders until the bonds hold exactly the ideal number of
    /// electrons, then fill every remaining octet with lone pairs.
    PiThenSaturate,
    /// Place one pi bond or one lone pair at a time until every electron is
    /// used. Needed when an atom may exceed its octet, because then the ideal
    /// bond electron count no longer applies.
    Incremental,
}

impl Strategy {
    pub fn for_molecule(molecule: &Molecule) -> Self {
        if molecule.has_expandable() {
            Strategy::Incremental
        } else {
            Strategy::PiThenSaturate
        }
    }
}

/// All complete structures reachable from `skeleton` that score no worse than
/// the best seen so far in `context`.
///
/// The returned structures may include some that a later, better structure
/// beat; the caller filters for the final minimum.
pub fn complete_skeleton(
    skeleton: &Molecule,
    scoring: &ScoringConfig,
    context: &mut SearchContext,
) -> Vec<Molecule> {
    let mut molecule = skeleton.clone();
    molecule.prepare_completion();
    let strategy = Strategy::for_molecule(&molecule);

    let mut completer = Completer {
        molecule,
        journal: Journal::new(),
        visited: HashSet::new(),
        scoring,
        found: Vec::new(),
    };
    match strategy {
        Strategy::PiThenSaturate => completer.promote(context),
        Strategy::Incremental => completer.extend(context, None),
    }
    debug_assert!(completer.journal.is_empty());

    debug!(
        "{:?} completion of {} visited {} states and kept {} structures",
        strategy,
        skeleton.canonical_string(),
        completer.visited.len(),
        completer.found.len()
    );
    completer.found
}

struct Completer<'a> {
    molecule: Molecule,
    journal: Journal,
    visited: HashSet<Vec<u8>>,
    scoring: &'a ScoringConfig,
    found: Vec<Molecule>,
}

impl Completer<'_> {
    /// Common entry checks. Returns `false` if this state should not be expanded.
    fn enter(&mut self, context: &mut SearchContext) -> bool {
        if !context.tick() {
            return false;
        }
        if !self.visited.insert(self.molecule.state_key()) {
            return false;
        }
        if self.molecule.settled_charge() as f64 > context.best() + SCORE_EPSILON {
            trace!(
                "pruned: settled charge {} exceeds best {}",
                self.molecule.settled_charge(),
                context.best()
            );
            return false;
        }
        true
    }

    fn promote(&mut self, context: &mut SearchContext) {
        if !self.enter(context) {
            return;
        }

        let bond_electrons = self.molecule.bond_electrons();
        let ideal = self.molecule.ideal_bond_electrons();
        if bond_electrons == ideal {
            self.saturate(context);
            return;
        }
        if bond_electrons > ideal {
            return;
        }

        for edge in self.molecule.pi_candidates() {
            let mark = self.journal.mark();
            if self.molecule.promote_bond(edge, &mut self.journal) {
                self.settle_bond(edge);
                if self.molecule.is_valid() {
                    self.promote(context);
                }
            }
            self.molecule.rollback(&mut self.journal, mark);
            if context.is_exhausted() {
                return;
            }
        }
    }

    /// Fill every open octet with lone pairs and keep the result if it is complete.
    fn saturate(&mut self, context: &mut SearchContext) {
        let mark = self.journal.mark();
        let open: Vec<NodeIndex> = self
            .molecule
            .atoms()
            .filter(|(idx, atom)| {
                atom.element().accepts_lone_pairs() && !self.molecule.is_settled(*idx)
            })
            .map(|(idx, _)| idx)
            .collect();
        for idx in open {
            while self.molecule.atom(idx).electrons() < 8 {
                self.molecule.place_lone_pair(idx, &mut self.journal);
            }
        }
        for i in 0..self.molecule.atom_count() {
            self.molecule.settle_octet(NodeIndex::new(i), &mut self.journal);
        }
        if self.molecule.all_settled() && self.molecule.is_complete() {
            self.accept(context);
        }
        self.molecule.rollback(&mut self.journal, mark);
    }

    /// Moves commute, so each final state is reached along one canonical
    /// path: every pi bond first, then lone pairs in atom order. `floor` is
    /// `None` while pi bonds may still be added, and otherwise the lowest atom
    /// that may still take a lone pair.
    fn extend(&mut self, context: &mut SearchContext, floor: Option<usize>) {
        if !self.enter(context) {
            return;
        }

        if self.molecule.current_electrons() == self.molecule.num_electrons() {
            if self.molecule.all_settled() && self.molecule.is_complete() {
                self.accept(context);
            }
            return;
        }

        for i in floor.unwrap_or(0)..self.molecule.atom_count() {
            let idx = NodeIndex::new(i);
            if !self.molecule.atom(idx).element().accepts_lone_pairs() {
                continue;
            }
            if !self.molecule.is_settled(idx) {
                let mark = self.journal.mark();
                self.molecule.place_lone_pair(idx, &mut self.journal);
                self.molecule.settle_octet(idx, &mut self.journal);
                if self.molecule.is_valid() {
                    self.extend(context, Some(i));
                }
                self.molecule.rollback(&mut self.journal, mark);
                if context.is_exhausted() {
                    return;
                }
            }
            // Moving past an open octet would leave it open for good.
            if !self.molecule.atom(idx).is_expandable() && !self.molecule.is_settled(idx) {
                break;
            }
        }

        if floor.is_some() {
            return;
        }
        for edge in self.molecule.pi_candidates() {
            let mark = self.journal.mark();
            if self.molecule.promote_bond(edge, &mut self.journal) {
                self.settle_bond(edge);
                if self.molecule.is_valid() {
                    self.extend(context, None);
                }
            }
            self.molecule.rollback(&mut self.journal, mark);
            if context.is_exhausted() {
                return;
            }
        }
    }

    fn settle_bond(&mut self, edge: EdgeIndex) {
        if let Some((a, b)) = self.molecule.graph().edge_endpoints(edge) {
            self.molecule.settle_octet(a, &mut self.journal);
            self.molecule.settle_octet(b, &mut self.journal);
        }
    }

    fn accept(&mut self, context: &mut SearchContext) {
        let score = evaluate(&self.molecule, self.scoring);
        if !context.admits(score) {
            trace!("complete structure scored {} against best {}", score, context.best());
            return;
        }
        context.offer(score);
        let mut structure = self.molecule.clone();
        structure.set_score(score);
        debug!("accepted {} with score {}", structure.formula(), score);
        self.found.push(structure);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn node(i: usize) -> NodeIndex {
        NodeIndex::new(i)
    }

    /// Build a skeleton from explicit single bonds.
    fn skeleton(symbols: &[&str], charge: i32, bonds: &[(usize, usize)]) -> Molecule {
        let mut molecule = Molecule::from_symbols(symbols, charge).unwrap();
        for &(a, b) in bonds {
            molecule.form_sigma_bond(node(a), node(b)).unwrap();
        }
        molecule
    }

    #[test]
    fn test_strategy_choice() {
        let water = skeleton(&["O", "H", "H"], 0, &[(0, 1), (0, 2)]);
        assert_eq!(Strategy::for_molecule(&water), Strategy::PiThenSaturate);
        let sulfur_dioxide = skeleton(&["S", "O", "O"], 0, &[(0, 1), (0, 2)]);
        assert_eq!(Strategy::for_molecule(&sulfur_dioxide), Strategy::Incremental);
    }

    #[test]
    fn test_water() {
        let water = skeleton(&["O", "H", "H"], 0, &[(0, 1), (0, 2)]);
        let mut context = SearchContext::default();
        let found = complete_skeleton(&water, &ScoringConfig::default(), &mut context);
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].atom(node(0)).lone_pairs(), 2);
        assert_eq!(found[0].score(), Some(0.0));
        assert!(found[0].all_settled());
        assert_eq!(context.best(), 0.0);
    }

    #[test]
    fn test_ozone_resonance() {
        let ozone = skeleton(&["O", "O", "O"], 0, &[(0, 1), (0, 2)]);
        let mut context = SearchContext::default();
        let found = complete_skeleton(&ozone, &ScoringConfig::default(), &mut context);
        assert_eq!(found.len(), 2);
        for structure in &found {
            assert!(structure.is_complete());
            assert_eq!(structure.formal_charge(node(0)), 1);
            assert!(same_score(structure.score().unwrap_or_default(), 13.0));
        }
        assert_ne!(found[0].state_key(), found[1].state_key());
    }

    #[test]
    fn test_skeleton_left_untouched() {
        let co2 = skeleton(&["C", "O", "O"], 0, &[(0, 1), (0, 2)]);
        let before = co2.state_key();
        let mut context = SearchContext::default();
        let found = complete_skeleton(&co2, &ScoringConfig::default(), &mut context);
        assert_eq!(found.len(), 1);
        assert_eq!(co2.state_key(), before);
        assert_eq!(co2.current_electrons(), 4);
    }

    #[test]
    fn test_existing_bound_prunes() {
        let ozone = skeleton(&["O", "O", "O"], 0, &[(0, 1), (0, 2)]);
        let mut context = SearchContext::default();
        context.offer(1.0);
        let found = complete_skeleton(&ozone, &ScoringConfig::default(), &mut context);
        assert!(found.is_empty());
    }

    #[test]
    fn test_expanded_octet() {
        let sulfur_dioxide = skeleton(&["S", "O", "O"], 0, &[(0, 1), (0, 2)]);
        let mut context = SearchContext::default();
        let found = complete_skeleton(&sulfur_dioxide, &ScoringConfig::default(), &mut context);
        let best: Vec<&Molecule> = found
            .iter()
            .filter(|structure| structure.score() == Some(0.0))
            .collect();
        assert_eq!(best.len(), 1);
        let structure = best[0];
        assert_eq!(structure.atom(node(0)).electrons(), 10);
        assert_eq!(structure.atom(node(0)).lone_pairs(), 1);
        assert_eq!(structure.bond_order_sum(node(0)), 4);
    }
}
