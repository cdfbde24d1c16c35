//! Structural cleanup of synthesized procedures.
//!
//! Synthesis emits forward branches before it knows whether the guarded block will
//! contain anything. When a block turns out empty the guard degenerates into a branch
//! that falls through to its own target, a branch looping onto itself, or a marker
//! nothing jumps to. The passes in this module sweep those shapes away:
//!
//! - [`MarkerEliminationPass`] - unreferenced markers and runs of adjacent markers
//! - [`SelfLoopEliminationPass`] - non-deterministic branches back onto themselves
//! - [`FallthroughEliminationPass`] - branches to the instruction right after them
//!
//! [`CleanupPipeline`] runs every enabled pass in rounds until a full round changes
//! nothing. None of the passes changes which calls are reachable.

mod fallthrough;
mod markers;
mod selfloops;

pub use fallthrough::FallthroughEliminationPass;
pub use markers::MarkerEliminationPass;
pub use selfloops::SelfLoopEliminationPass;

use crate::{events::EventLog, ir::Procedure};

/// Default bound on cleanup rounds.
pub const DEFAULT_MAX_ITERATIONS: usize = 64;

/// A structural simplification over a single procedure.
///
/// Passes must be idempotent once they report no change, and must never remove a
/// marker some branch still targets.
pub trait CleanupPass: Send + Sync {
    /// Unique name for logging and event attribution.
    fn name(&self) -> &'static str;

    /// Get a description of what this pass does.
    fn description(&self) -> &'static str {
        "No description available"
    }

    /// Runs the pass once over `procedure`, recording removals into `events`.
    ///
    /// Returns `true` if the procedure changed.
    fn run(&self, procedure: &mut Procedure, events: &EventLog) -> bool;
}

/// Which cleanup passes run and how many rounds they get.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CleanupConfig {
    /// Remove markers no branch targets and merge adjacent markers
    pub remove_unreferenced_markers: bool,
    /// Remove non-deterministic branches that only loop onto themselves
    pub remove_self_loops: bool,
    /// Remove branches whose target directly follows them
    pub remove_fallthrough_branches: bool,
    /// Upper bound on pipeline rounds
    pub max_iterations: usize,
}

impl Default for CleanupConfig {
    fn default() -> Self {
        Self {
            remove_unreferenced_markers: true,
            remove_self_loops: true,
            remove_fallthrough_branches: true,
            max_iterations: DEFAULT_MAX_ITERATIONS,
        }
    }
}

impl CleanupConfig {
    /// Creates the default configuration with every pass enabled.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// A configuration that runs no pass at all.
    #[must_use]
    pub fn disabled() -> Self {
        Self {
            remove_unreferenced_markers: false,
            remove_self_loops: false,
            remove_fallthrough_branches: false,
            max_iterations: DEFAULT_MAX_ITERATIONS,
        }
    }

    /// Sets the round bound.
    #[must_use]
    pub fn with_max_iterations(mut self, max_iterations: usize) -> Self {
        self.max_iterations = max_iterations;
        self
    }

    /// Returns true if at least one pass is enabled.
    #[must_use]
    pub fn any_enabled(&self) -> bool {
        self.remove_unreferenced_markers || self.remove_self_loops || self.remove_fallthrough_branches
    }
}

/// Runs the enabled cleanup passes to a fixpoint.
pub struct CleanupPipeline {
    passes: Vec<Box<dyn CleanupPass>>,
    max_iterations: usize,
}

impl Default for CleanupPipeline {
    fn default() -> Self {
        Self::new(CleanupConfig::default())
    }
}

impl CleanupPipeline {
    /// Creates a pipeline holding the passes enabled in `config`.
    ///
    /// Branch removals run before marker elimination so the markers they orphan are
    /// swept in the same round.
    #[must_use]
    pub fn new(config: CleanupConfig) -> Self {
        let mut passes: Vec<Box<dyn CleanupPass>> = Vec::new();
        if config.remove_fallthrough_branches {
            passes.push(Box::new(FallthroughEliminationPass::new()));
        }
        if config.remove_self_loops {
            passes.push(Box::new(SelfLoopEliminationPass::new()));
        }
        if config.remove_unreferenced_markers {
            passes.push(Box::new(MarkerEliminationPass::new()));
        }
        Self {
            passes,
            max_iterations: config.max_iterations,
        }
    }

    /// Names of the passes in execution order.
    pub fn pass_names(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.passes.iter().map(|p| p.name())
    }

    /// Runs every pass once, in order. Returns `true` if any of them changed something.
    pub fn run_once(&self, procedure: &mut Procedure, events: &EventLog) -> bool {
        let mut changed = false;
        for pass in &self.passes {
            changed |= pass.run(procedure, events);
        }
        changed
    }

    /// Runs rounds until one changes nothing or the round bound is reached.
    ///
    /// Returns the number of rounds that changed the procedure.
    pub fn run(&self, procedure: &mut Procedure, events: &EventLog) -> usize {
        let before = procedure.len();
        let mut rounds = 0;

        for _ in 0..self.max_iterations {
            if !self.run_once(procedure, events) {
                break;
            }
            rounds += 1;
        }

        if rounds == self.max_iterations && rounds > 0 {
            log::warn!(
                "cleanup of {} stopped after {} rounds without reaching a fixpoint",
                procedure.name(),
                rounds
            );
        }
        log::debug!(
            "cleanup of {}: {} -> {} instructions in {} rounds",
            procedure.name(),
            before,
            procedure.len(),
            rounds
        );
        rounds
    }
}

/// Returns true if every instruction strictly between `from` and `to` is a marker.
pub(crate) fn only_markers_between(procedure: &Procedure, from: usize, to: usize) -> bool {
    let (lo, hi) = if from < to { (from, to) } else { (to, from) };
    procedure.instructions()[lo + 1..hi]
        .iter()
        .all(|i| i.is_marker())
}
