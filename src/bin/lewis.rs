use anyhow::{Context, Result};
use clap::Parser;
use lewis::*;
use std::path::PathBuf;
use tracing::{error, info};

#[derive(Parser)]
#[command(author, version, about = "Find the most stable Lewis structures of molecules and ions")]
struct Cli {
    /// Formulas such as CO2, NH4^+ or SO4^2-
    #[arg(required = true)]
    formulas: Vec<String>,

    /// Write a per-atom CSV report to this file instead of printing structures
    #[arg(long)]
    csv: Option<PathBuf>,

    /// Write one DOT file per structure into this directory
    #[arg(long)]
    dot: Option<PathBuf>,

    /// Also render each DOT file to PNG with Graphviz
    #[arg(long, requires = "dot")]
    png: bool,

    /// Drop results scoring above this
    #[arg(long, default_value_t = 40.0)]
    max_score: f64,

    /// Keep the best results whatever their score
    #[arg(long)]
    no_ceiling: bool,

    /// Stop each search after this many states
    #[arg(long)]
    node_budget: Option<usize>,

    #[arg(long, default_value = "warn")]
    log_level: String,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(&cli.log_level);

    let max_score = if cli.no_ceiling { None } else { Some(cli.max_score) };
    let config = SearchConfig::default()
        .with_max_score(max_score)
        .with_node_budget(cli.node_budget);
    let solver = LewisSolver::new(config);

    if let Some(dir) = &cli.dot {
        std::fs::create_dir_all(dir)
            .with_context(|| format!("Failed to create directory {}", dir.display()))?;
    }

    let mut all = Vec::new();
    let mut failed = false;
    for text in &cli.formulas {
        let structures = match solver.solve_formula(text) {
            Ok(structures) => structures,
            Err(e) => {
                error!("{:#}", e);
                eprintln!("{}: {:#}", text, e);
                failed = true;
                continue;
            }
        };
        if structures.is_empty() {
            println!("{}: no valid structure", text);
        }

        for (n, structure) in structures.iter().enumerate() {
            if cli.csv.is_none() {
                println!("{}\n", structure);
            }
            if let Some(dir) = &cli.dot {
                let stem = format!("{}-{}", file_stem(text), n);
                let dot_path = dir.join(format!("{stem}.dot"));
                let png_path = dir.join(format!("{stem}.png"));
                let png = cli.png.then(|| png_path.to_string_lossy().to_string());
                visualize_structure(structure, &dot_path.to_string_lossy(), png.as_deref())?;
            }
        }
        all.extend(structures);
    }

    if let Some(path) = &cli.csv {
        let file = std::fs::File::create(path)
            .with_context(|| format!("Failed to create {}", path.display()))?;
        write_csv(&all, file)?;
        info!("CSV report saved to {}", path.display());
    }

    if failed {
        std::process::exit(1);
    }
    Ok(())
}

/// File-name-safe version of a formula: `SO4^2-` becomes `SO4_2m`.
fn file_stem(formula: &str) -> String {
    formula
        .chars()
        .filter_map(|c| match c {
            '^' => Some('_'),
            '+' => Some('p'),
            '-' => Some('m'),
            '(' | ')' => None,
            c if c.is_ascii_alphanumeric() => Some(c),
            _ => None,
        })
        .collect()
}
