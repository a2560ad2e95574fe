//! Engine parameters
//!
//! [`CmaParameters`] carries everything one engine invocation needs: the
//! starting distribution, the algorithm variant, budgets, stopping criteria
//! and the coordinate transform. It is built fresh for each search.

use std::collections::HashSet;

use nalgebra::DVector;
use serde::{Deserialize, Serialize};

use crate::engine::geno_pheno::{GenoPheno, Identity};
use crate::engine::termination::StopCriterion;
use crate::error::{OptError, OptResult};

/// CMA-ES variant
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum Algorithm {
    /// A single run; restarts are ignored
    #[default]
    Cmaes,
    /// Restarts with a doubled population after each run
    IpopCmaes,
}

impl Algorithm {
    /// Whether the variant honors the restart count
    pub fn supports_restarts(&self) -> bool {
        matches!(self, Algorithm::IpopCmaes)
    }
}

/// Default population size for a problem of dimension `n`: 4 + ⌊3 ln n⌋
pub fn default_lambda(n: usize) -> usize {
    (4.0 + (3.0 * (n as f64).ln()).floor()) as usize
}

/// Parameters for one engine invocation
#[derive(Clone, Debug)]
pub struct CmaParameters<G = Identity> {
    x0: DVector<f64>,
    sigma: f64,
    lambda: Option<usize>,
    seed: Option<u64>,
    mt_feval: bool,
    algo: Algorithm,
    restarts: usize,
    max_fevals: Option<usize>,
    max_iter: Option<usize>,
    ftarget: Option<f64>,
    disabled: HashSet<StopCriterion>,
    x0_range: Option<(f64, f64)>,
    geno_pheno: G,
}

impl CmaParameters<Identity> {
    /// Parameters for a search in raw coordinates starting at `x0`
    pub fn new(x0: DVector<f64>, sigma: f64) -> Self {
        Self::with_geno_pheno(x0, sigma, Identity)
    }
}

impl<G> CmaParameters<G> {
    /// Parameters for a search through a coordinate transform
    ///
    /// `x0` is given in external (phenotype) coordinates; `sigma` applies to
    /// the internal (genotype) space.
    pub fn with_geno_pheno(x0: DVector<f64>, sigma: f64, geno_pheno: G) -> Self {
        Self {
            x0,
            sigma,
            lambda: None,
            seed: None,
            mt_feval: false,
            algo: Algorithm::default(),
            restarts: 0,
            max_fevals: None,
            max_iter: None,
            ftarget: None,
            disabled: HashSet::new(),
            x0_range: None,
            geno_pheno,
        }
    }

    /// Problem dimension
    pub fn dim(&self) -> usize {
        self.x0.len()
    }

    /// Initial point, in external coordinates
    pub fn x0(&self) -> &DVector<f64> {
        &self.x0
    }

    /// Initial step size
    pub fn sigma(&self) -> f64 {
        self.sigma
    }

    /// Population size of the first run
    pub fn lambda(&self) -> usize {
        self.lambda.unwrap_or_else(|| default_lambda(self.dim()))
    }

    /// Set the population size of the first run
    pub fn set_lambda(&mut self, lambda: usize) {
        self.lambda = Some(lambda);
    }

    /// Seed for the engine's generator, if fixed
    pub fn seed(&self) -> Option<u64> {
        self.seed
    }

    /// Fix the seed of the engine's generator
    pub fn set_seed(&mut self, seed: u64) {
        self.seed = Some(seed);
    }

    /// Whether candidates of one generation are evaluated concurrently
    pub fn mt_feval(&self) -> bool {
        self.mt_feval
    }

    /// Evaluate candidates of one generation concurrently
    pub fn set_mt_feval(&mut self, mt_feval: bool) {
        self.mt_feval = mt_feval;
    }

    /// Algorithm variant
    pub fn algo(&self) -> Algorithm {
        self.algo
    }

    /// Select the algorithm variant
    pub fn set_algo(&mut self, algo: Algorithm) {
        self.algo = algo;
    }

    /// Number of restarts after the first run
    pub fn restarts(&self) -> usize {
        self.restarts
    }

    /// Set the number of restarts after the first run
    pub fn set_restarts(&mut self, restarts: usize) {
        self.restarts = restarts;
    }

    /// Total number of runs the selected variant will attempt
    pub fn max_runs(&self) -> usize {
        if self.algo.supports_restarts() {
            1 + self.restarts
        } else {
            1
        }
    }

    /// Function evaluation budget over all runs
    pub fn max_fevals(&self) -> Option<usize> {
        self.max_fevals
    }

    /// Set the function evaluation budget over all runs
    pub fn set_max_fevals(&mut self, max_fevals: usize) {
        self.max_fevals = Some(max_fevals);
    }

    /// Iteration cap over all runs
    pub fn max_iter(&self) -> Option<usize> {
        self.max_iter
    }

    /// Set the iteration cap over all runs
    pub fn set_max_iter(&mut self, max_iter: usize) {
        self.max_iter = Some(max_iter);
    }

    /// Target value for [`StopCriterion::FunTarget`]
    pub fn ftarget(&self) -> Option<f64> {
        self.ftarget
    }

    /// Stop once the best value drops to `ftarget`
    pub fn set_ftarget(&mut self, ftarget: f64) {
        self.ftarget = Some(ftarget);
    }

    /// Enable or disable a stopping criterion
    pub fn set_stopping_criterion(&mut self, criterion: StopCriterion, active: bool) {
        if active {
            self.disabled.remove(&criterion);
        } else {
            self.disabled.insert(criterion);
        }
    }

    /// Whether a stopping criterion is checked
    pub fn is_stopping_criterion_enabled(&self, criterion: StopCriterion) -> bool {
        !self.disabled.contains(&criterion)
    }

    /// Range used to re-seed the mean when a restart begins
    pub fn x0_range(&self) -> Option<(f64, f64)> {
        self.x0_range
    }

    /// Restarts draw their initial mean uniformly from `[low, high]^n`
    /// (external coordinates). The first run always starts at `x0`.
    pub fn set_x0_range(&mut self, low: f64, high: f64) {
        self.x0_range = Some((low, high));
    }

    /// Coordinate transform
    pub fn geno_pheno(&self) -> &G {
        &self.geno_pheno
    }
}

impl<G: GenoPheno> CmaParameters<G> {
    /// Check the parameters for consistency
    pub fn validate(&self) -> OptResult<()> {
        if self.dim() == 0 {
            return Err(OptError::Configuration(
                "problem dimension must be at least 1".to_string(),
            ));
        }
        if !self.sigma.is_finite() || self.sigma <= 0.0 {
            return Err(OptError::Configuration(format!(
                "initial step size must be positive and finite, got {}",
                self.sigma
            )));
        }
        if self.lambda() < 2 {
            return Err(OptError::Configuration(format!(
                "population size must be at least 2, got {}",
                self.lambda()
            )));
        }
        if let Some((low, high)) = self.x0_range {
            if !(low <= high) {
                return Err(OptError::Configuration(format!(
                    "invalid x0 range [{}, {}]",
                    low, high
                )));
            }
        }
        if let Some(expected) = self.geno_pheno.dimension() {
            if expected != self.dim() {
                return Err(OptError::DimensionMismatch {
                    expected,
                    actual: self.dim(),
                });
            }
        }
        if self.x0.iter().any(|v| !v.is_finite()) {
            return Err(OptError::Configuration(
                "initial point must be finite".to_string(),
            ));
        }
        Ok(())
    }
}
