//! Lewis structures for small molecules and ions.
//!
//! A formula is parsed into atoms and a net charge, every plausible
//! single-bond skeleton is enumerated, and each skeleton is completed with pi
//! bonds and lone pairs. The structures with the lowest stability score win.
//!
//! ```no_run
//! let structures = lewis::best_structures("CO2").unwrap();
//! for structure in &structures {
//!     println!("{}", structure);
//! }
//! ```

mod element;
pub use element::*;

mod atom;
pub use atom::*;

mod bond;
pub use bond::*;

mod geometry;
pub use geometry::*;

mod journal;
pub use journal::*;

mod molecule;
pub use molecule::*;

mod canon;
pub use canon::*;

mod score;
pub use score::*;

mod config;
pub use config::*;

mod context;
pub use context::*;

mod skeleton;
pub use skeleton::*;

mod complete;
pub use complete::*;

mod solver;
pub use solver::*;

mod parse;
pub use parse::*;

mod report;
pub use report::*;

mod visualize;
pub use visualize::*;

/// Install a `tracing` subscriber printing events at `level` and above.
///
/// Unknown levels fall back to `info`. Calling this more than once is harmless.
pub fn init_logging(level: &str) {
    let level = level.parse::<tracing::Level>().unwrap_or(tracing::Level::INFO);
    let _ = tracing_subscriber::fmt()
        .with_max_level(level)
        .with_target(false)
        .try_init();
}
