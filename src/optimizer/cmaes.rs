//! CMA-ES backed maximizer
//!
//! Turns the objective into a minimization problem, picks the coordinate
//! regime from the `bounded` flag and hands a fully derived configuration to
//! the engine.

use nalgebra::DVector;
use tracing::debug;

use crate::engine::geno_pheno::{GenoPheno, PiecewiseQuadraticBounds};
use crate::engine::parameters::{Algorithm, CmaParameters};
use crate::engine::termination::StopCriterion;
use crate::engine::{CmaEngine, MinimizationEngine};
use crate::error::OptResult;
use crate::objective::traits::{Minimize, ObjectiveFunction, ParameterVector};
use crate::optimizer::config::{CmaesConfig, SearchBudget};
use crate::optimizer::Optimizer;

/// Lower bound of the bounded search box
pub const BOUNDED_LOWER: f64 = 0.0;
/// Upper bound of the bounded search box, with slack for rounding at 1.0
pub const BOUNDED_UPPER: f64 = 1.005;
/// Initial step size on both paths
pub const INITIAL_SIGMA: f64 = 0.5;

/// Maximizer driven by an evolutionary minimization engine
#[derive(Clone, Debug, Default)]
pub struct Cmaes<E = CmaEngine> {
    config: CmaesConfig,
    engine: E,
}

impl Cmaes<CmaEngine> {
    /// Optimizer using the built-in CMA-ES engine
    pub fn new(config: CmaesConfig) -> Self {
        Self::with_engine(config, CmaEngine)
    }
}

impl<E: MinimizationEngine> Cmaes<E> {
    /// Optimizer using a custom engine
    pub fn with_engine(config: CmaesConfig, engine: E) -> Self {
        Self { config, engine }
    }

    /// Current configuration
    pub fn config(&self) -> &CmaesConfig {
        &self.config
    }

    /// Settings shared by the bounded and unbounded paths
    fn apply_common_params<G>(&self, params: &mut CmaParameters<G>) {
        let budget = SearchBudget::derive(&self.config, params.dim());

        params.set_mt_feval(true);
        params.set_algo(Algorithm::IpopCmaes);
        params.set_restarts(self.config.restarts);
        params.set_max_fevals(budget.max_fun_evals);
        params.set_max_iter(budget.max_iterations);
        // the optimum of the wrapped objective is unknown
        params.set_stopping_criterion(StopCriterion::FunTarget, false);
        if let Some(seed) = self.config.seed {
            params.set_seed(seed);
        }
    }

    fn optimize_unbounded<F>(&self, f: &F) -> OptResult<ParameterVector>
    where
        F: ObjectiveFunction + ?Sized,
    {
        let dim = f.param_size();
        let minimize = Minimize::new(f);

        let mut params = CmaParameters::new(DVector::zeros(dim), INITIAL_SIGMA);
        self.apply_common_params(&mut params);
        params.set_x0_range(-1.0, 1.0);

        let sols = self.engine.minimize(|x| minimize.value(x), &params)?;
        Ok(sols.best_seen_candidate().x().clone())
    }

    fn optimize_bounded<F>(&self, f: &F) -> OptResult<ParameterVector>
    where
        F: ObjectiveFunction + ?Sized,
    {
        let dim = f.param_size();
        let minimize = Minimize::new(f);

        let gp = PiecewiseQuadraticBounds::uniform(BOUNDED_LOWER, BOUNDED_UPPER, dim)?;
        let x0 = DVector::from_element(dim, 0.5);
        let mut params = CmaParameters::with_geno_pheno(x0, INITIAL_SIGMA, gp);
        self.apply_common_params(&mut params);
        params.set_x0_range(0.0, 1.0);

        let sols = self.engine.minimize(|x| minimize.value(x), &params)?;
        Ok(params.geno_pheno().pheno(sols.best_seen_candidate().x()))
    }
}

impl<E: MinimizationEngine> Optimizer for Cmaes<E> {
    fn optimize<F>(&self, f: &F, bounded: bool) -> OptResult<ParameterVector>
    where
        F: ObjectiveFunction + ?Sized,
    {
        debug!(
            dim = f.param_size(),
            bounded,
            restarts = self.config.restarts,
            budget = SearchBudget::derive(&self.config, f.param_size()).max_fun_evals,
            "starting CMA-ES search"
        );

        if bounded {
            self.optimize_bounded(f)
        } else {
            self.optimize_unbounded(f)
        }
    }
}
