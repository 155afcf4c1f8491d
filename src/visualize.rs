use crate::*;
use anyhow::{bail, Context, Result};
use petgraph::visit::EdgeRef;
use std::fmt::Write as FmtWrite;
use std::io::Write;
use tracing::info;

/// Export a structure as a Graphviz DOT file and optionally render it.
///
/// # Arguments
///
/// * `molecule` - The structure to draw.
/// * `output_dot` - The path to save the DOT file.
/// * `output_image` - Optional path to save a PNG rendered with Graphviz `dot`.
pub fn visualize_structure(
    molecule: &Molecule,
    output_dot: &str,
    output_image: Option<&str>,
) -> Result<()> {
    let dot_string = generate_dot(molecule);

    let mut file = std::fs::File::create(output_dot)
        .with_context(|| format!("Failed to create DOT file {output_dot}"))?;
    file.write_all(dot_string.as_bytes())
        .with_context(|| format!("Failed to write DOT file {output_dot}"))?;
    info!("DOT file saved to {}", output_dot);

    if let Some(image_path) = output_image {
        // Requires Graphviz on the PATH.
        let status = std::process::Command::new("dot")
            .args(["-Tpng", output_dot, "-o", image_path])
            .status()
            .context("Failed to execute Graphviz 'dot' command")?;

        if !status.success() {
            bail!("Graphviz 'dot' command failed with status: {}", status);
        }
        info!("Image rendered to {}", image_path);
    }

    Ok(())
}

/// DOT source for a structure. Each atom is labelled with its symbol, one `:`
/// per lone pair and its formal charge; a bond of order n is drawn as n edges.
pub fn generate_dot(molecule: &Molecule) -> String {
    let mut dot_output = String::new();
    // Writing to a String cannot fail.
    let _ = writeln!(dot_output, "graph Molecule {{");
    let _ = writeln!(dot_output, "    layout=neato;");
    let _ = writeln!(dot_output, "    multiedge=true;");

    for (idx, atom) in molecule.atoms() {
        let _ = writeln!(
            dot_output,
            "    {} [label=\"{}\", fontcolor=white, shape=circle, style=filled, fillcolor={}];",
            idx.index(),
            atom_label(molecule, idx),
            element_to_color(atom.element()),
        );
    }

    for edge in molecule.graph().edge_references() {
        let count = edge.weight().order().order();
        for _ in 0..count {
            let _ = writeln!(
                dot_output,
                "    {} -- {} [style=solid, penwidth=2];",
                edge.source().index(),
                edge.target().index()
            );
        }
    }

    let _ = writeln!(dot_output, "}}");
    dot_output
}

fn atom_label(molecule: &Molecule, idx: petgraph::graph::NodeIndex) -> String {
    let atom = molecule.atom(idx);
    let mut label = atom.symbol().to_string();
    for _ in 0..atom.lone_pairs() {
        label.push(':');
    }
    match molecule.formal_charge(idx) {
        0 => {}
        1 => label.push('+'),
        -1 => label.push('-'),
        charge => {
            let _ = write!(label, "{:+}", charge);
        }
    }
    label
}

/// Assigns colors to elements for visualization.
fn element_to_color(element: &Element) -> &'static str {
    match element.symbol {
        "C" => "black",
        "H" => "gray",
        "O" => "red",
        "N" => "blue",
        "Cl" => "darkgreen",
        "Br" => "brown",
        "F" => "pink",
        "S" => "yellow",
        "P" => "orange",
        "I" => "purple",
        "B" => "salmon",
        _ if element.is_noble_gas() => "cyan",
        _ => "slategray",
    }
}
