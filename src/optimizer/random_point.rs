//! Random sampling baseline

use nalgebra::DVector;
use rand::Rng;

use crate::error::OptResult;
use crate::objective::traits::{ObjectiveFunction, ParameterVector};
use crate::optimizer::Optimizer;

/// Returns one uniformly random point of the unit hypercube
///
/// The objective is never evaluated. Only bounded searches are supported.
#[derive(Clone, Copy, Debug, Default)]
pub struct RandomPoint;

impl Optimizer for RandomPoint {
    fn optimize<F>(&self, f: &F, bounded: bool) -> OptResult<ParameterVector>
    where
        F: ObjectiveFunction + ?Sized,
    {
        assert!(bounded, "RandomPoint only supports bounded search");

        let mut rng = rand::thread_rng();
        Ok(DVector::from_fn(f.param_size(), |_, _| rng.gen::<f64>()))
    }
}
