//! Search results

use nalgebra::DVector;

use crate::engine::termination::StopCriterion;

/// An evaluated point, in genotype coordinates
#[derive(Clone, Debug, PartialEq)]
pub struct Candidate {
    x: DVector<f64>,
    f_value: f64,
}

impl Candidate {
    /// Create a candidate from a point and its (minimized) value
    pub fn new(x: DVector<f64>, f_value: f64) -> Self {
        Self { x, f_value }
    }

    /// The point, in the engine's internal coordinates
    pub fn x(&self) -> &DVector<f64> {
        &self.x
    }

    /// Value of the minimized function at this point
    pub fn f_value(&self) -> f64 {
        self.f_value
    }
}

/// Outcome of one engine invocation
#[derive(Clone, Debug, PartialEq)]
pub struct CmaSolutions {
    /// Best candidate over all generations and runs
    pub best_seen: Candidate,
    /// Function evaluations over all runs
    pub evaluations: usize,
    /// Generations over all runs
    pub iterations: usize,
    /// Number of runs performed (1 + restarts actually used)
    pub runs: usize,
    /// Criterion that ended the last run
    pub reason: StopCriterion,
}

impl CmaSolutions {
    /// Best candidate ever evaluated, not the last iterate
    pub fn best_seen_candidate(&self) -> &Candidate {
        &self.best_seen
    }
}
