//! Evolutionary search engine
//!
//! A CMA-ES minimizer with IPOP restarts, optional bound handling through a
//! genotype/phenotype transform and individually switchable stopping
//! criteria. Optimizers reach it through [`MinimizationEngine`] so tests can
//! substitute a stub.

pub mod cmaes;
pub mod geno_pheno;
pub mod parameters;
pub mod solutions;
pub mod state;
pub mod termination;

use nalgebra::DVector;

use crate::error::OptResult;
use geno_pheno::GenoPheno;
use parameters::CmaParameters;
use solutions::CmaSolutions;

/// A black-box minimizer driven by [`CmaParameters`]
pub trait MinimizationEngine {
    /// Minimize `f` and report the best candidate seen
    fn minimize<F, G>(&self, f: F, params: &CmaParameters<G>) -> OptResult<CmaSolutions>
    where
        F: Fn(&DVector<f64>) -> f64 + Sync,
        G: GenoPheno;
}

/// The built-in CMA-ES engine
#[derive(Clone, Copy, Debug, Default)]
pub struct CmaEngine;

impl MinimizationEngine for CmaEngine {
    fn minimize<F, G>(&self, f: F, params: &CmaParameters<G>) -> OptResult<CmaSolutions>
    where
        F: Fn(&DVector<f64>) -> f64 + Sync,
        G: GenoPheno,
    {
        cmaes::cmaes(f, params)
    }
}

impl<E: MinimizationEngine + ?Sized> MinimizationEngine for &E {
    fn minimize<F, G>(&self, f: F, params: &CmaParameters<G>) -> OptResult<CmaSolutions>
    where
        F: Fn(&DVector<f64>) -> f64 + Sync,
        G: GenoPheno,
    {
        (**self).minimize(f, params)
    }
}

pub mod prelude {
    pub use super::cmaes::cmaes;
    pub use super::geno_pheno::*;
    pub use super::parameters::*;
    pub use super::solutions::*;
    pub use super::termination::StopCriterion;
    pub use super::{CmaEngine, MinimizationEngine};
}
