//! Maximizers
//!
//! Every optimizer exposes the same call, "maximize this objective, bounded
//! or not", so a caller can pick one at configuration time and treat it as an
//! interchangeable inner loop.

pub mod cmaes;
pub mod config;
pub mod random_point;

use crate::error::OptResult;
use crate::objective::traits::{ObjectiveFunction, ParameterVector};

use self::cmaes::Cmaes;
use self::random_point::RandomPoint;

/// A strategy that maximizes an objective
pub trait Optimizer {
    /// Find a point approximately maximizing `f.utility`
    ///
    /// Bounded searches return points inside `[0, 1.005]^d`. An optimizer
    /// that does not support the requested mode panics.
    fn optimize<F>(&self, f: &F, bounded: bool) -> OptResult<ParameterVector>
    where
        F: ObjectiveFunction + ?Sized;
}

/// Any optimizer shipped with the crate, as built from [`config::OptimizerConfig`]
#[derive(Clone, Debug)]
pub enum AnyOptimizer {
    Cmaes(Cmaes),
    RandomPoint(RandomPoint),
}

impl Optimizer for AnyOptimizer {
    fn optimize<F>(&self, f: &F, bounded: bool) -> OptResult<ParameterVector>
    where
        F: ObjectiveFunction + ?Sized,
    {
        match self {
            AnyOptimizer::Cmaes(o) => o.optimize(f, bounded),
            AnyOptimizer::RandomPoint(o) => o.optimize(f, bounded),
        }
    }
}

pub mod prelude {
    pub use super::cmaes::Cmaes;
    pub use super::config::*;
    pub use super::random_point::RandomPoint;
    pub use super::{AnyOptimizer, Optimizer};
}

#[cfg(test)]
mod tests {
    use super::config::{CmaesConfig, OptimizerConfig};
    use super::*;
    use crate::objective::benchmarks::Sphere;
    use nalgebra::DVector;

    #[test]
    fn test_dispatch() {
        let f = Sphere::centered_at(DVector::from_vec(vec![0.25, 0.75]));

        let cmaes = OptimizerConfig::Cmaes(CmaesConfig::default().with_seed(1)).build();
        let x = cmaes.optimize(&f, true).unwrap();
        assert!(f.distance_to_optimum(&x) < 1e-3);

        let random = OptimizerConfig::RandomPoint.build();
        let x = random.optimize(&f, true).unwrap();
        assert_eq!(x.len(), 2);
    }
}
