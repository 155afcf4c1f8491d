use crate::*;

/// Scores within this distance of each other are treated as a tie.
pub const SCORE_EPSILON: f64 = 1e-9;

/// Stability score of a structure; lower is better, zero is ideal.
///
/// The base is the sum of absolute formal charges. On top of that come fixed
/// penalties for unfavourable bonds, and the average charge of the atoms that
/// carry any charge.
pub fn evaluate(molecule: &Molecule, config: &ScoringConfig) -> f64 {
    let mut charge_sum = 0;
    let mut charged_atoms = 0;
    let mut penalty = 0.0;

    for (idx, atom) in molecule.atoms() {
        let charge = molecule.formal_charge(idx);
        if charge != 0 {
            charge_sum += charge.abs();
            charged_atoms += 1;
            if atom.element().is_noble_gas() {
                penalty += config.charged_noble_gas;
            }
        }
        if atom.symbol() == "O" && molecule.bond_counts(idx) > 2 {
            penalty += config.oxygen_overbonded;
        }
    }

    for (a, b, order) in molecule.bonds() {
        penalty += bond_penalty(
            molecule.atom(a).symbol(),
            molecule.atom(b).symbol(),
            order,
            config,
        );
    }

    let mut score = charge_sum as f64 + penalty;
    if config.charge_sharing && charged_atoms > 0 {
        score += charge_sum as f64 / charged_atoms as f64;
    }
    score
}

fn bond_penalty(a: &str, b: &str, order: BondOrder, config: &ScoringConfig) -> f64 {
    let (low, high) = if a <= b { (a, b) } else { (b, a) };
    match order {
        BondOrder::Single => match (low, high) {
            ("O", "O") => config.oxygen_oxygen_single,
            ("N", "N") => config.nitrogen_nitrogen_single,
            ("F", "F") => config.fluorine_fluorine_single,
            ("F", "O") => config.oxygen_fluorine_single,
            ("N", "O") => config.nitrogen_oxygen_single,
            _ => 0.0,
        },
        BondOrder::Double => match (low, high) {
            ("C", "F") => config.carbon_fluorine_double,
            _ => 0.0,
        },
        BondOrder::Triple => {
            let mut penalty = 0.0;
            if low == "O" || high == "O" {
                penalty += config.oxygen_triple;
            }
            if low == "F" || high == "F" {
                penalty += config.fluorine_triple;
            }
            if (low, high) == ("C", "F") {
                penalty += config.carbon_fluorine_triple;
            }
            penalty
        }
    }
}

/// Whether two scores count as equal.
pub fn same_score(a: f64, b: f64) -> bool {
    (a - b).abs() <= SCORE_EPSILON
}
