use crate::*;
use anyhow::Result;
use csv::Writer;
use std::fmt::{Display, Formatter, Result as FmtResult};
use std::io;
use tracing::info;

impl Display for Molecule {
    fn fmt(&self, f: &mut Formatter) -> FmtResult {
        write!(f, "{}", self.formula())?;
        if let Some(score) = self.score() {
            write!(f, " (score {})", score)?;
        }
        writeln!(f)?;

        for (idx, atom) in self.atoms() {
            let domains = self.domains(idx);
            let geometry = self.geometry(idx);
            writeln!(
                f,
                "  {}{:<3} fc {:+} lone pairs {} {} {} ({})",
                atom.symbol(),
                idx.index(),
                self.formal_charge(idx),
                atom.lone_pairs(),
                self.hybridization(idx),
                geometry,
                geometry.bond_angles(domains),
            )?;
        }

        let bonds: Vec<String> = self
            .bonds()
            .map(|(a, b, order)| {
                format!(
                    "{}{}{}{}{}",
                    self.atom(a).symbol(),
                    a.index(),
                    order,
                    self.atom(b).symbol(),
                    b.index()
                )
            })
            .collect();
        write!(f, "  bonds: {}", bonds.join(" "))
    }
}

/// Write one CSV row per atom of every structure.
pub fn write_csv<W: io::Write>(structures: &[Molecule], writer: W) -> Result<()> {
    let mut wtr = Writer::from_writer(writer);
    wtr.write_record([
        "formula",
        "structure",
        "score",
        "atom",
        "element",
        "formal_charge",
        "lone_pairs",
        "hybridization",
        "geometry",
        "bond_angles",
        "bonds",
    ])?;

    for (n, structure) in structures.iter().enumerate() {
        let score = structure.score().map(|s| s.to_string()).unwrap_or_default();
        for (idx, atom) in structure.atoms() {
            let geometry = structure.geometry(idx);
            let mut neighbors: Vec<_> = structure.neighbors(idx).collect();
            neighbors.sort_by_key(|(other, _)| other.index());
            let bonds: Vec<String> = neighbors
                .into_iter()
                .map(|(other, order)| format!("{}{}", order, other.index()))
                .collect();
            wtr.write_record([
                structure.formula().to_string(),
                n.to_string(),
                score.clone(),
                idx.index().to_string(),
                atom.symbol().to_string(),
                structure.formal_charge(idx).to_string(),
                atom.lone_pairs().to_string(),
                structure.hybridization(idx).to_string(),
                geometry.to_string(),
                geometry.bond_angles(structure.domains(idx)).to_string(),
                bonds.join(" "),
            ])?;
        }
    }
    wtr.flush()?;
    info!("wrote {} structures as CSV", structures.len());
    Ok(())
}
