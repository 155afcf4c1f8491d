use crate::*;
use anyhow::Result;
use tracing::{debug, info, warn};

/// Finds the most stable Lewis structures of a molecule.
///
/// Skeletons are enumerated once, then each one is completed while a single
/// [`SearchContext`] carries the best score forward so later skeletons prune
/// against earlier ones.
#[derive(Debug, Clone, Default)]
pub struct LewisSolver {
    config: SearchConfig,
}

impl LewisSolver {
    pub fn new(config: SearchConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &SearchConfig {
        &self.config
    }

    /// Every complete structure sharing the lowest score. Empty when nothing
    /// valid exists or when the lowest score is above the configured ceiling.
    pub fn solve(&self, molecule: &Molecule) -> Vec<Molecule> {
        let mut context = SearchContext::new(self.config.node_budget);
        let skeletons = enumerate_skeletons(molecule, &mut context);
        info!("{}: {} skeletons", molecule.formula(), skeletons.len());

        let mut results = Vec::new();
        for (n, skeleton) in skeletons.iter().enumerate() {
            if context.is_exhausted() {
                break;
            }
            let found = complete_skeleton(skeleton, &self.config.scoring, &mut context);
            debug!("skeleton {} gave {} structures", n, found.len());
            results.extend(found);
        }

        if context.is_exhausted() {
            warn!("{}: search stopped after {} states", molecule.formula(), context.nodes());
        }

        let Some(best) = lowest_score(&results) else {
            info!(
                "{}: no structures after {} states",
                molecule.formula(),
                context.nodes()
            );
            return Vec::new();
        };
        results.retain(|structure| structure.score().is_some_and(|score| same_score(score, best)));

        if let Some(ceiling) = self.config.max_score {
            if best > ceiling + SCORE_EPSILON {
                warn!(
                    "{}: best score {} is above the ceiling {}, discarding {} structures",
                    molecule.formula(),
                    best,
                    ceiling,
                    results.len()
                );
                results.clear();
                return results;
            }
        }

        info!(
            "{}: {} structures with score {} after {} states",
            molecule.formula(),
            results.len(),
            best,
            context.nodes()
        );
        results
    }

    /// Parse and validate `text`, then solve it.
    pub fn solve_formula(&self, text: &str) -> Result<Vec<Molecule>> {
        let formula = parse_formula(text)?;
        let molecule = formula.to_molecule(&self.config.expansion);
        Ok(self.solve(&molecule))
    }
}

/// Lowest score among scored structures, `None` when there are none.
fn lowest_score(structures: &[Molecule]) -> Option<f64> {
    structures.iter().filter_map(Molecule::score).min_by(f64::total_cmp)
}

/// Solve `text` with the default configuration.
pub fn best_structures(text: &str) -> Result<Vec<Molecule>> {
    LewisSolver::default().solve_formula(text)
}
