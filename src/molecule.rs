use crate::*;
use petgraph::algo::{connected_components, is_cyclic_undirected};
use petgraph::graph::{EdgeIndex, NodeIndex, UnGraph};
use petgraph::visit::EdgeRef;
use std::collections::HashMap;

pub type StructureGraph = UnGraph<Atom, Bond>;

/// A set of atoms with a net charge, plus the bonds and lone pairs placed so far.
///
/// Atoms are nodes and bonds are edges of a petgraph `UnGraph`, so an atom's
/// identity is its `NodeIndex` and a bond's identity is its `EdgeIndex`.
/// Electron totals are kept up to date by every mutation.
#[derive(Debug, Clone)]
pub struct Molecule {
    graph: StructureGraph,
    charge: i32,
    formula: String,
    num_electrons: i32,
    current_electrons: i32,
    bond_electrons: i32,
    ideal_bond_electrons: i32,
    // Octet tracker: which non-expandable atoms are settled, how many are not,
    // and the summed |formal charge| of the settled ones.
    settled: Vec<bool>,
    unsettled: usize,
    settled_charge: i32,
    expandable: bool,
    score: Option<f64>,
}

impl Molecule {
    pub fn new(elements: Vec<&'static Element>, charge: i32) -> Self {
        Self::with_policy(elements, charge, &ExpansionPolicy::default())
    }

    pub fn with_policy(
        mut elements: Vec<&'static Element>,
        charge: i32,
        policy: &ExpansionPolicy,
    ) -> Self {
        let formula = formula_text(&elements, charge);

        // Likely hubs first.
        elements.sort_by(|a, b| {
            (b.preferred_bonds, b.atomic_number).cmp(&(a.preferred_bonds, a.atomic_number))
        });

        let mut counts: HashMap<&str, usize> = HashMap::new();
        for element in &elements {
            *counts.entry(element.symbol).or_default() += 1;
        }

        let atom_count = elements.len();
        let mut graph = StructureGraph::with_capacity(atom_count, atom_count * 2);
        let mut expandable = false;
        for element in &elements {
            let can_expand = policy.allows(
                element.can_expand_octet,
                counts[element.symbol],
                atom_count,
            );
            expandable |= can_expand;
            graph.add_node(Atom::new(element, can_expand));
        }

        let valence: i32 = elements.iter().map(|e| e.valence_electrons as i32).sum();
        let targets: i32 = elements.iter().map(|e| e.octet_target() as i32).sum();
        let num_electrons = valence - charge;

        Self {
            graph,
            charge,
            formula,
            num_electrons,
            current_electrons: 0,
            bond_electrons: 0,
            ideal_bond_electrons: targets - num_electrons,
            settled: vec![false; atom_count],
            unsettled: atom_count,
            settled_charge: 0,
            expandable,
            score: None,
        }
    }

    /// Build from element symbols, failing on the first unknown one.
    pub fn from_symbols(symbols: &[&str], charge: i32) -> Result<Self, FormulaError> {
        let elements = symbols
            .iter()
            .map(|symbol| {
                Element::lookup(symbol)
                    .ok_or_else(|| FormulaError::UnknownElement(symbol.to_string()))
            })
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self::new(elements, charge))
    }

    /// Replace the diagnostic formula text.
    pub fn with_formula(mut self, formula: impl Into<String>) -> Self {
        self.formula = formula.into();
        self
    }

    pub fn graph(&self) -> &StructureGraph {
        &self.graph
    }

    pub fn atom(&self, idx: NodeIndex) -> &Atom {
        &self.graph[idx]
    }

    pub fn atoms(&self) -> impl Iterator<Item = (NodeIndex, &Atom)> + '_ {
        self.graph.node_indices().map(move |idx| (idx, &self.graph[idx]))
    }

    pub fn bond(&self, edge: EdgeIndex) -> &Bond {
        &self.graph[edge]
    }

    /// Every bond as `(a, b, order)` in edge order.
    pub fn bonds(&self) -> impl Iterator<Item = (NodeIndex, NodeIndex, BondOrder)> + '_ {
        self.graph
            .edge_references()
            .map(|edge| (edge.source(), edge.target(), edge.weight().order()))
    }

    pub fn atom_count(&self) -> usize {
        self.graph.node_count()
    }

    pub fn bond_count(&self) -> usize {
        self.graph.edge_count()
    }

    pub fn charge(&self) -> i32 {
        self.charge
    }

    pub fn formula(&self) -> &str {
        &self.formula
    }

    /// Electrons the finished structure must hold: Σ valence − charge.
    pub fn num_electrons(&self) -> i32 {
        self.num_electrons
    }

    pub fn current_electrons(&self) -> i32 {
        self.current_electrons
    }

    pub fn bond_electrons(&self) -> i32 {
        self.bond_electrons
    }

    pub fn ideal_bond_electrons(&self) -> i32 {
        self.ideal_bond_electrons
    }

    /// Whether any atom of this molecule may hold more than eight electrons.
    pub fn has_expandable(&self) -> bool {
        self.expandable
    }

    pub fn score(&self) -> Option<f64> {
        self.score
    }

    pub(crate) fn set_score(&mut self, score: f64) {
        self.score = Some(score);
    }

    /// Number of bonds touching an atom, whatever their order.
    pub fn bond_counts(&self, idx: NodeIndex) -> usize {
        self.graph.edges(idx).count()
    }

    /// Sum of bond orders around an atom.
    pub fn bond_order_sum(&self, idx: NodeIndex) -> u8 {
        self.graph.edges(idx).map(|edge| edge.weight().order().order()).sum()
    }

    /// Bonds plus lone pairs.
    pub fn domains(&self, idx: NodeIndex) -> usize {
        self.bond_counts(idx) + self.graph[idx].lone_pairs() as usize
    }

    pub fn neighbors(&self, idx: NodeIndex) -> impl Iterator<Item = (NodeIndex, BondOrder)> + '_ {
        self.graph.edges(idx).map(move |edge| {
            let other = if edge.source() == idx { edge.target() } else { edge.source() };
            (other, edge.weight().order())
        })
    }

    pub fn octet(&self, idx: NodeIndex) -> Octet {
        let atom = &self.graph[idx];
        let bonds = self.bond_counts(idx);
        let all_single = self
            .graph
            .edges(idx)
            .all(|edge| edge.weight().order() == BondOrder::Single);

        match atom.element().octet_rule {
            OctetRule::Hydrogen => single_bond_octet(1, bonds, all_single, atom.lone_pairs()),
            OctetRule::SingleBonds(n) => {
                single_bond_octet(n as usize, bonds, all_single, atom.lone_pairs())
            }
            OctetRule::Standard if atom.is_expandable() => {
                let electrons = atom.electrons();
                if electrons < 8 {
                    Octet::Incomplete
                } else if electrons <= 16 && self.domains(idx) <= 6 {
                    Octet::Complete
                } else {
                    Octet::Over
                }
            }
            OctetRule::Standard => match atom.electrons() {
                8 => Octet::Complete,
                e if e > 8 => Octet::Over,
                _ => Octet::Incomplete,
            },
        }
    }

    /// Valence electrons minus lone-pair electrons minus bond orders.
    pub fn formal_charge(&self, idx: NodeIndex) -> i32 {
        let atom = &self.graph[idx];
        atom.element().valence_electrons as i32
            - 2 * atom.lone_pairs() as i32
            - self.bond_order_sum(idx) as i32
    }

    pub fn hybridization(&self, idx: NodeIndex) -> Hybridization {
        Hybridization::from_domains(self.domains(idx))
    }

    pub fn geometry(&self, idx: NodeIndex) -> Geometry {
        Geometry::from_domains(self.domains(idx), self.graph[idx].lone_pairs() as usize)
    }

    /// No atom over its octet and no more electrons than the molecule owns.
    pub fn is_valid(&self) -> bool {
        self.current_electrons <= self.num_electrons
            && self.graph.node_indices().all(|idx| self.octet(idx) != Octet::Over)
    }

    /// Every atom complete and every electron placed.
    pub fn is_complete(&self) -> bool {
        self.current_electrons == self.num_electrons
            && self.graph.node_indices().all(|idx| self.octet(idx) == Octet::Complete)
    }

    pub fn is_connected(&self) -> bool {
        connected_components(&self.graph) <= 1
    }

    pub fn is_cyclic(&self) -> bool {
        is_cyclic_undirected(&self.graph)
    }

    /// Recompute every electron count from the graph and compare with the
    /// incrementally tracked ones.
    pub fn electrons_consistent(&self) -> bool {
        let mut bond_electrons = 0;
        let mut lone_pair_electrons = 0;
        for idx in self.graph.node_indices() {
            let atom = &self.graph[idx];
            let from_bonds: u8 = self.graph.edges(idx).map(|edge| edge.weight().electrons()).sum();
            if atom.electrons() != from_bonds + 2 * atom.lone_pairs() {
                return false;
            }
            lone_pair_electrons += 2 * atom.lone_pairs() as i32;
        }
        for edge in self.graph.edge_references() {
            bond_electrons += edge.weight().electrons() as i32;
        }
        self.bond_electrons == bond_electrons
            && self.current_electrons == bond_electrons + lone_pair_electrons
    }

    /// Whether an atom already has as many sigma bonds as a sensible skeleton gives it.
    pub fn is_over_bonded(&self, idx: NodeIndex) -> bool {
        let atom = &self.graph[idx];
        let element = atom.element();
        let bonds = self.bond_counts(idx);
        if atom.electrons() >= 8 && !atom.is_expandable() {
            return true;
        }
        match element.atomic_number {
            1 => bonds >= 1,
            7 => bonds >= 3,
            8 => bonds >= 2,
            _ => element.is_halogen() && !atom.is_expandable() && bonds >= 1,
        }
    }

    /// Add a single bond between two distinct, unbonded atoms.
    ///
    /// Returns `None` for a self bond, a duplicate bond, or a hydrogen that is
    /// already bonded.
    pub fn form_sigma_bond(&mut self, a: NodeIndex, b: NodeIndex) -> Option<EdgeIndex> {
        if a == b || self.graph.find_edge(a, b).is_some() {
            return None;
        }
        for idx in [a, b] {
            if self.graph[idx].element().is_hydrogen() && self.bond_counts(idx) > 0 {
                return None;
            }
        }
        let bond = Bond::single();
        let electrons = bond.electrons();
        let edge = self.graph.add_edge(a, b, bond);
        self.graph[a].gain(electrons);
        self.graph[b].gain(electrons);
        self.bond_electrons += electrons as i32;
        self.current_electrons += electrons as i32;
        Some(edge)
    }

    /// Raise a bond's order by one, updating both endpoints.
    pub fn add_pi(&mut self, edge: EdgeIndex) -> bool {
        let Some((a, b)) = self.graph.edge_endpoints(edge) else {
            return false;
        };
        if !self.graph[edge].add_pi() {
            return false;
        }
        self.graph[a].gain(2);
        self.graph[b].gain(2);
        self.bond_electrons += 2;
        self.current_electrons += 2;
        true
    }

    pub fn remove_pi(&mut self, edge: EdgeIndex) -> bool {
        let Some((a, b)) = self.graph.edge_endpoints(edge) else {
            return false;
        };
        if !self.graph[edge].remove_pi() {
            return false;
        }
        self.graph[a].lose(2);
        self.graph[b].lose(2);
        self.bond_electrons -= 2;
        self.current_electrons -= 2;
        true
    }

    pub fn add_lone_pair(&mut self, idx: NodeIndex) {
        self.graph[idx].add_lone_pair();
        self.current_electrons += 2;
    }

    pub fn remove_lone_pair(&mut self, idx: NodeIndex) -> bool {
        if !self.graph[idx].remove_lone_pair() {
            return false;
        }
        self.current_electrons -= 2;
        true
    }

    /// Journaled [`Molecule::form_sigma_bond`].
    pub fn form_bond(
        &mut self,
        a: NodeIndex,
        b: NodeIndex,
        journal: &mut Journal,
    ) -> Option<EdgeIndex> {
        let edge = self.form_sigma_bond(a, b)?;
        journal.record(Edit::Sigma(edge));
        Some(edge)
    }

    /// Journaled [`Molecule::add_pi`].
    pub fn promote_bond(&mut self, edge: EdgeIndex, journal: &mut Journal) -> bool {
        if !self.add_pi(edge) {
            return false;
        }
        journal.record(Edit::Pi(edge));
        true
    }

    /// Journaled [`Molecule::add_lone_pair`].
    pub fn place_lone_pair(&mut self, idx: NodeIndex, journal: &mut Journal) {
        self.add_lone_pair(idx);
        journal.record(Edit::LonePair(idx));
    }

    /// Mark a non-expandable atom as settled if its octet is complete.
    ///
    /// A settled atom takes no more lone pairs or pi bonds, so its formal
    /// charge is final and counts towards the lower bound.
    pub fn settle_octet(&mut self, idx: NodeIndex, journal: &mut Journal) -> bool {
        if self.settled[idx.index()]
            || self.graph[idx].is_expandable()
            || self.octet(idx) != Octet::Complete
        {
            return false;
        }
        let charge = self.formal_charge(idx);
        self.mark_settled(idx, charge);
        journal.record(Edit::Settle(idx, charge));
        true
    }

    /// Undo every edit recorded after `mark`, newest first.
    pub fn rollback(&mut self, journal: &mut Journal, mark: usize) {
        while let Some(edit) = journal.pop_since(mark) {
            match edit {
                Edit::Sigma(edge) => {
                    // petgraph moves the last edge into a removed slot, so only
                    // the newest edge may go.
                    debug_assert_eq!(edge.index() + 1, self.graph.edge_count());
                    if let Some((a, b)) = self.graph.edge_endpoints(edge) {
                        if let Some(bond) = self.graph.remove_edge(edge) {
                            let electrons = bond.electrons();
                            self.graph[a].lose(electrons);
                            self.graph[b].lose(electrons);
                            self.bond_electrons -= electrons as i32;
                            self.current_electrons -= electrons as i32;
                        }
                    }
                }
                Edit::Pi(edge) => {
                    self.remove_pi(edge);
                }
                Edit::LonePair(idx) => {
                    self.remove_lone_pair(idx);
                }
                Edit::Settle(idx, charge) => {
                    self.settled[idx.index()] = false;
                    self.unsettled += 1;
                    self.settled_charge -= charge.abs();
                }
            }
        }
        debug_assert!(self.electrons_consistent());
    }

    fn mark_settled(&mut self, idx: NodeIndex, charge: i32) {
        self.settled[idx.index()] = true;
        self.unsettled -= 1;
        self.settled_charge += charge.abs();
    }

    /// Reset the octet tracker for a fresh completion search and settle every
    /// atom the skeleton already completes (hydrogens, boron with three bonds).
    pub fn prepare_completion(&mut self) {
        let atom_count = self.graph.node_count();
        self.settled = vec![false; atom_count];
        self.unsettled = self
            .graph
            .node_indices()
            .filter(|&idx| !self.graph[idx].is_expandable())
            .count();
        self.settled_charge = 0;
        self.score = None;

        let ready: Vec<NodeIndex> = self
            .graph
            .node_indices()
            .filter(|&idx| !self.graph[idx].is_expandable() && self.octet(idx) == Octet::Complete)
            .collect();
        for idx in ready {
            let charge = self.formal_charge(idx);
            self.mark_settled(idx, charge);
        }
    }

    pub fn is_settled(&self, idx: NodeIndex) -> bool {
        self.settled[idx.index()]
    }

    /// True when every non-expandable atom is settled.
    pub fn all_settled(&self) -> bool {
        self.unsettled == 0
    }

    /// Σ|formal charge| over settled atoms. Never exceeds the final base score.
    pub fn settled_charge(&self) -> i32 {
        self.settled_charge
    }

    /// Bonds that may still take a pi bond, best first: fewest prior
    /// modifications, then the endpoint wanting the fewest bonds.
    pub fn pi_candidates(&self) -> Vec<EdgeIndex> {
        let mut candidates: Vec<(u32, u8, EdgeIndex)> = self
            .graph
            .edge_references()
            .filter(|edge| !edge.weight().is_triple())
            .filter(|edge| {
                [edge.source(), edge.target()].iter().all(|&idx| {
                    self.graph[idx].element().accepts_lone_pairs() && !self.settled[idx.index()]
                })
            })
            .map(|edge| {
                let preferred = self.graph[edge.source()]
                    .element()
                    .preferred_bonds
                    .min(self.graph[edge.target()].element().preferred_bonds);
                (edge.weight().modifications(), preferred, edge.id())
            })
            .collect();
        candidates.sort();
        candidates.into_iter().map(|(_, _, edge)| edge).collect()
    }
}

fn single_bond_octet(wanted: usize, bonds: usize, all_single: bool, lone_pairs: u8) -> Octet {
    if lone_pairs > 0 || !all_single || bonds > wanted {
        Octet::Over
    } else if bonds == wanted {
        Octet::Complete
    } else {
        Octet::Incomplete
    }
}

/// Hill-style text such as `CO2` or `NH4^+`, keeping first-seen element order.
fn formula_text(elements: &[&'static Element], charge: i32) -> String {
    let mut order: Vec<&str> = Vec::new();
    let mut counts: HashMap<&str, usize> = HashMap::new();
    for element in elements {
        let count = counts.entry(element.symbol).or_default();
        if *count == 0 {
            order.push(element.symbol);
        }
        *count += 1;
    }

    let mut text = String::new();
    for symbol in order {
        text.push_str(symbol);
        if counts[symbol] > 1 {
            text.push_str(&counts[symbol].to_string());
        }
    }
    match charge {
        0 => {}
        1 => text.push_str("^+"),
        -1 => text.push_str("^-"),
        c if c > 0 => text.push_str(&format!("^{}+", c)),
        c => text.push_str(&format!("^{}-", -c)),
    }
    text
}

#[cfg(test)]
mod tests {
    use super::*;

    fn molecule(symbols: &[&str], charge: i32) -> Molecule {
        Molecule::from_symbols(symbols, charge).unwrap()
    }

    fn node(i: usize) -> NodeIndex {
        NodeIndex::new(i)
    }

    #[test]
    fn test_electron_targets() {
        let co2 = molecule(&["C", "O", "O"], 0);
        assert_eq!(co2.num_electrons(), 16);
        assert_eq!(co2.ideal_bond_electrons(), 8);
        assert_eq!(co2.formula(), "CO2");

        let ammonium = molecule(&["N", "H", "H", "H", "H"], 1);
        assert_eq!(ammonium.num_electrons(), 8);
        assert_eq!(ammonium.ideal_bond_electrons(), 8);
        assert_eq!(ammonium.formula(), "NH4^+");

        let sulfate = molecule(&["S", "O", "O", "O", "O"], -2);
        assert_eq!(sulfate.formula(), "SO4^2-");
        assert_eq!(sulfate.num_electrons(), 32);
    }

    #[test]
    fn test_atom_order() {
        let water = molecule(&["H", "O", "H"], 0);
        let symbols: Vec<&str> = water.atoms().map(|(_, atom)| atom.symbol()).collect();
        assert_eq!(symbols, vec!["O", "H", "H"]);

        let hcn = molecule(&["H", "C", "N"], 0);
        let symbols: Vec<&str> = hcn.atoms().map(|(_, atom)| atom.symbol()).collect();
        assert_eq!(symbols, vec!["C", "N", "H"]);
    }

    #[test]
    fn test_expansion_flags() {
        let sf6 = molecule(&["S", "F", "F", "F", "F", "F", "F"], 0);
        assert!(sf6.has_expandable());
        assert!(sf6.atom(node(0)).is_expandable());

        let water = molecule(&["H", "O", "H"], 0);
        assert!(!water.has_expandable());

        // Two chlorines: neither is unique.
        let cl2o = molecule(&["Cl", "Cl", "O"], 0);
        assert!(!cl2o.has_expandable());
    }

    #[test]
    fn test_form_sigma_bond() {
        let mut water = molecule(&["O", "H", "H"], 0);
        assert!(water.form_sigma_bond(node(0), node(0)).is_none());
        assert!(water.form_sigma_bond(node(0), node(1)).is_some());
        assert!(water.form_sigma_bond(node(1), node(0)).is_none());
        // Hydrogen already bonded.
        assert!(water.form_sigma_bond(node(1), node(2)).is_none());
        assert!(water.form_sigma_bond(node(0), node(2)).is_some());

        assert_eq!(water.bond_electrons(), 4);
        assert_eq!(water.atom(node(0)).electrons(), 4);
        assert!(water.is_connected());
        assert!(!water.is_cyclic());
        assert!(water.electrons_consistent());
    }

    #[test]
    fn test_octet_states() {
        let mut water = molecule(&["O", "H", "H"], 0);
        water.form_sigma_bond(node(0), node(1));
        water.form_sigma_bond(node(0), node(2));
        assert_eq!(water.octet(node(1)), Octet::Complete);
        assert_eq!(water.octet(node(0)), Octet::Incomplete);
        water.add_lone_pair(node(0));
        water.add_lone_pair(node(0));
        assert_eq!(water.octet(node(0)), Octet::Complete);
        assert!(water.is_complete());
        water.add_lone_pair(node(0));
        assert_eq!(water.octet(node(0)), Octet::Over);
        assert!(!water.is_valid());
        assert!(water.remove_lone_pair(node(0)));
        assert!(water.is_valid());

        // A lone pair on hydrogen is always over.
        water.add_lone_pair(node(1));
        assert_eq!(water.octet(node(1)), Octet::Over);
    }

    #[test]
    fn test_formal_charge() {
        let mut ammonium = molecule(&["N", "H", "H", "H", "H"], 1);
        for h in 1..5 {
            ammonium.form_sigma_bond(node(0), node(h));
        }
        assert_eq!(ammonium.formal_charge(node(0)), 1);
        assert_eq!(ammonium.formal_charge(node(1)), 0);
        assert!(ammonium.is_complete());
        assert_eq!(ammonium.hybridization(node(0)), Hybridization::Sp3);
        assert_eq!(ammonium.geometry(node(0)), Geometry::Tetrahedral);
    }

    #[test]
    fn test_pi_updates_both_endpoints() {
        let mut co2 = molecule(&["C", "O", "O"], 0);
        let left = co2.form_sigma_bond(node(0), node(1)).unwrap();
        co2.form_sigma_bond(node(0), node(2)).unwrap();
        assert!(co2.add_pi(left));
        assert_eq!(co2.atom(node(0)).electrons(), 6);
        assert_eq!(co2.atom(node(1)).electrons(), 4);
        assert_eq!(co2.bond_electrons(), 6);
        assert!(co2.remove_pi(left));
        assert!(!co2.remove_pi(left));
        assert!(co2.electrons_consistent());
    }

    #[test]
    fn test_rollback_restores_state() {
        let mut co2 = molecule(&["C", "O", "O"], 0);
        let mut journal = Journal::new();
        let start = journal.mark();

        let left = co2.form_bond(node(0), node(1), &mut journal).unwrap();
        co2.form_bond(node(0), node(2), &mut journal).unwrap();
        co2.prepare_completion();
        assert!(co2.promote_bond(left, &mut journal));
        co2.place_lone_pair(node(1), &mut journal);
        co2.place_lone_pair(node(1), &mut journal);
        assert!(co2.settle_octet(node(1), &mut journal));
        assert!(co2.is_settled(node(1)));
        assert!(!co2.settle_octet(node(1), &mut journal));
        assert!(!co2.all_settled());

        co2.rollback(&mut journal, start);
        assert!(journal.is_empty());
        assert_eq!(co2.bond_count(), 0);
        assert_eq!(co2.current_electrons(), 0);
        assert_eq!(co2.atom(node(1)).lone_pairs(), 0);
        assert!(!co2.is_settled(node(1)));
        assert_eq!(co2.settled_charge(), 0);
        assert!(co2.electrons_consistent());
    }

    #[test]
    fn test_pi_candidates() {
        let mut hcn = molecule(&["C", "N", "H"], 0);
        let cn = hcn.form_sigma_bond(node(0), node(1)).unwrap();
        hcn.form_sigma_bond(node(0), node(2)).unwrap();
        hcn.prepare_completion();
        assert!(hcn.is_settled(node(2)));
        assert_eq!(hcn.pi_candidates(), vec![cn]);

        hcn.add_pi(cn);
        hcn.add_pi(cn);
        assert!(hcn.pi_candidates().is_empty());
    }

    #[test]
    fn test_over_bonded() {
        let mut peroxide = molecule(&["O", "O", "H", "H"], 0);
        peroxide.form_sigma_bond(node(0), node(2));
        assert!(!peroxide.is_over_bonded(node(0)));
        assert!(peroxide.is_over_bonded(node(2)));
        peroxide.form_sigma_bond(node(0), node(1));
        assert!(peroxide.is_over_bonded(node(0)));
    }
}
