//! Enumeration of single-bond skeletons by depth-first search over atom pairs.

use crate::*;
use petgraph::graph::NodeIndex;
use std::collections::HashSet;
use tracing::{debug, trace};

/// Every distinct connected sigma-bond skeleton worth completing.
///
/// Acyclic skeletons are preferred. Cyclic ones are only returned when no
/// acyclic skeleton could be built.
pub fn enumerate_skeletons(molecule: &Molecule, context: &mut SearchContext) -> Vec<Molecule> {
    let mut enumerator = Enumerator {
        molecule: molecule.clone(),
        journal: Journal::new(),
        visited: HashSet::new(),
        acyclic: Vec::new(),
        cyclic: Vec::new(),
    };
    enumerator.explore(context);

    debug!(
        "{}: {} acyclic and {} cyclic skeletons after {} states",
        molecule.formula(),
        enumerator.acyclic.len(),
        enumerator.cyclic.len(),
        enumerator.visited.len()
    );

    if enumerator.acyclic.is_empty() {
        enumerator.cyclic
    } else {
        enumerator.acyclic
    }
}

struct Enumerator {
    molecule: Molecule,
    journal: Journal,
    visited: HashSet<String>,
    acyclic: Vec<Molecule>,
    cyclic: Vec<Molecule>,
}

impl Enumerator {
    fn has_candidate(&self) -> bool {
        !self.acyclic.is_empty() || !self.cyclic.is_empty()
    }

    fn explore(&mut self, context: &mut SearchContext) {
        if !context.tick() {
            return;
        }
        if !self.visited.insert(self.molecule.canonical_string()) {
            return;
        }

        let atom_count = self.molecule.atom_count();
        let bond_count = self.molecule.bond_count();
        let cyclic = self.molecule.is_cyclic();

        if bond_count + 1 >= atom_count && self.molecule.is_connected() {
            if !cyclic {
                if self.has_candidate() && has_terminal_carbon(&self.molecule) {
                    trace!("rejecting skeleton with a terminal carbon");
                } else {
                    self.acyclic.push(self.molecule.clone());
                }
            } else if self.acyclic.is_empty() {
                self.cyclic.push(self.molecule.clone());
            }
            // Any further bond only adds a cycle.
            return;
        }

        if cyclic && !self.acyclic.is_empty() {
            return;
        }

        for i in 0..atom_count {
            for j in (i + 1)..atom_count {
                let (a, b) = (NodeIndex::new(i), NodeIndex::new(j));
                if self.has_candidate() && self.redundant_bond(a, b) {
                    continue;
                }

                let mark = self.journal.mark();
                if self.molecule.form_bond(a, b, &mut self.journal).is_some() {
                    let over = self.molecule.octet(a) == Octet::Over
                        || self.molecule.octet(b) == Octet::Over;
                    if !over {
                        self.explore(context);
                    }
                    self.molecule.rollback(&mut self.journal, mark);
                }
                if context.is_exhausted() {
                    return;
                }
            }
        }
    }

    /// Bonds not worth trying once some skeleton is known.
    fn redundant_bond(&self, a: NodeIndex, b: NodeIndex) -> bool {
        self.molecule.is_over_bonded(a)
            || self.molecule.is_over_bonded(b)
            || (self.molecule.atom(a).symbol() == "O" && self.molecule.atom(b).symbol() == "O")
    }
}

/// A carbon with fewer than two bonds in a molecule of more than two atoms.
fn has_terminal_carbon(molecule: &Molecule) -> bool {
    molecule.atom_count() > 2
        && molecule
            .atoms()
            .any(|(idx, atom)| atom.element().is_carbon() && molecule.bond_counts(idx) < 2)
}
