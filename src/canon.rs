use crate::*;
use petgraph::graph::NodeIndex;
use petgraph::visit::EdgeRef;
use std::cmp::Ordering;
use std::fmt::Write;

/// Signatures used to recognise structures the search has already seen.
pub trait Canonize {
    /// Signature that ignores atom and bond numbering: two isomorphic
    /// structures with the same bonds and lone pairs give the same string.
    fn canonical_string(&self) -> String;

    /// Signature tied to atom and bond indices. Two states of the same
    /// skeleton compare equal exactly when every lone pair count and bond
    /// order matches.
    fn state_key(&self) -> Vec<u8>;
}

impl Canonize for Molecule {
    fn canonical_string(&self) -> String {
        let mut keyed: Vec<(AtomKey, &str)> = self
            .graph()
            .node_indices()
            .map(|idx| (AtomKey::new(self, idx), atom_signature(self, idx)))
            .collect();
        // Descending on every key, with the signature breaking ties.
        keyed.sort_by(|(a_key, a_sig), (b_key, b_sig)| {
            b_key.cmp(a_key).then_with(|| b_sig.cmp(a_sig))
        });

        let mut canonical = String::new();
        for (_, signature) in keyed {
            canonical.push_str(signature);
            canonical.push('|');
        }
        canonical
    }

    fn state_key(&self) -> Vec<u8> {
        let graph = self.graph();
        let mut key = Vec::with_capacity(graph.node_count() + graph.edge_count());
        key.extend(graph.node_weights().map(|atom| atom.lone_pairs()));
        key.extend(graph.edge_weights().map(|bond| bond.order().order()));
        key
    }
}

/// An atom's symbol followed by its bonds, highest order then heaviest
/// neighbour first, then one `:` per lone pair. Cached on the atom until it
/// next changes.
pub fn atom_signature(molecule: &Molecule, idx: NodeIndex) -> &str {
    molecule
        .atom(idx)
        .signature_or(|| compute_signature(molecule, idx))
}

fn compute_signature(molecule: &Molecule, idx: NodeIndex) -> String {
    let graph = molecule.graph();
    let atom = &graph[idx];
    let mut bonds: Vec<(BondOrder, u8)> = graph
        .edges(idx)
        .map(|edge| {
            let other = if edge.source() == idx { edge.target() } else { edge.source() };
            (edge.weight().order(), graph[other].element().atomic_number)
        })
        .collect();
    bonds.sort_by(|a, b| b.cmp(a));

    let mut signature = String::from(atom.symbol());
    for (order, atomic_number) in bonds {
        // Writing to a String cannot fail.
        let _ = write!(signature, "{}{}", order.symbol(), atomic_number);
    }
    for _ in 0..atom.lone_pairs() {
        signature.push(':');
    }
    signature
}

/// Sort key placing atoms in a numbering-independent order.
struct AtomKey {
    molar_mass: f64,
    domains: usize,
    bond_orders: u8,
    neighbor_mass: f64,
}

impl AtomKey {
    fn new(molecule: &Molecule, idx: NodeIndex) -> Self {
        let neighbor_mass = molecule
            .neighbors(idx)
            .map(|(other, order)| {
                molecule.atom(other).element().molar_mass * order.order() as f64
            })
            .sum();
        Self {
            molar_mass: molecule.atom(idx).element().molar_mass,
            domains: molecule.domains(idx),
            bond_orders: molecule.bond_order_sum(idx),
            neighbor_mass,
        }
    }

    fn cmp(&self, other: &Self) -> Ordering {
        self.molar_mass
            .total_cmp(&other.molar_mass)
            .then(self.domains.cmp(&other.domains))
            .then(self.bond_orders.cmp(&other.bond_orders))
            .then(self.neighbor_mass.total_cmp(&other.neighbor_mass))
    }
}
