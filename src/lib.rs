//! # evo-opt
//!
//! Pluggable black-box maximizers for real-valued utilities.
//!
//! An [`Optimizer`](optimizer::Optimizer) takes an
//! [`ObjectiveFunction`](objective::traits::ObjectiveFunction) of any
//! dimension and returns a parameter vector that approximately maximizes it,
//! either over all reals or inside the hypercube `[0, 1.005]^d`. Callers pick
//! the strategy at configuration time and treat it as an interchangeable inner
//! loop.
//!
//! ## Optimizers
//!
//! - **Cmaes**: CMA-ES with IPOP restarts. Bounded searches go through a
//!   piecewise-quadratic genotype/phenotype transform so every evaluated point
//!   is feasible.
//! - **RandomPoint**: a single uniform sample of the unit cube, as a baseline.
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use evo_opt::prelude::*;
//! use nalgebra::DVector;
//!
//! let objective = Sphere::centered_at(DVector::from_vec(vec![0.2, 0.8]));
//! let optimizer = Cmaes::new(CmaesConfig::default().with_seed(42));
//!
//! let best = optimizer.optimize(&objective, true)?;
//! ```

pub mod engine;
pub mod error;
pub mod objective;
pub mod optimizer;

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::engine::prelude::*;
    pub use crate::error::*;
    pub use crate::objective::prelude::*;
    pub use crate::optimizer::prelude::*;
}
