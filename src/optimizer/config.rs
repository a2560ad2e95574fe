//! Optimizer configuration
//!
//! Configuration values are plain serde structs so the optimizer choice can
//! be loaded from a file at startup:
//!
//! ```json
//! { "type": "cmaes", "restarts": 2, "max_fun_evals": -1 }
//! ```

use serde::{Deserialize, Serialize};

use crate::optimizer::cmaes::Cmaes;
use crate::optimizer::random_point::RandomPoint;
use crate::optimizer::AnyOptimizer;

/// Hard cap on engine iterations, independent of the evaluation budget
pub const MAX_ITERATIONS: usize = 100_000;

/// Factor of the automatic evaluation budget `900 * (d + 3)^2`
pub const AUTO_BUDGET_FACTOR: usize = 900;

/// Tunables of the [`Cmaes`] optimizer
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CmaesConfig {
    /// Number of IPOP restarts after the first run
    pub restarts: usize,
    /// Function evaluation budget; negative derives it from the dimension
    pub max_fun_evals: i64,
    /// Fixed engine seed; `None` draws fresh entropy on every call
    pub seed: Option<u64>,
}

impl Default for CmaesConfig {
    fn default() -> Self {
        Self {
            restarts: 1,
            max_fun_evals: -1,
            seed: None,
        }
    }
}

impl CmaesConfig {
    /// Set the restart count
    pub fn with_restarts(mut self, restarts: usize) -> Self {
        self.restarts = restarts;
        self
    }

    /// Set the evaluation budget (negative = automatic)
    pub fn with_max_fun_evals(mut self, max_fun_evals: i64) -> Self {
        self.max_fun_evals = max_fun_evals;
        self
    }

    /// Fix the engine seed
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }
}

/// Budget derived for one search
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SearchBudget {
    pub max_fun_evals: usize,
    pub max_iterations: usize,
}

impl SearchBudget {
    /// Budget for a problem of dimension `dim`
    pub fn derive(config: &CmaesConfig, dim: usize) -> Self {
        let max_fun_evals = match usize::try_from(config.max_fun_evals) {
            Ok(explicit) => explicit,
            Err(_) => AUTO_BUDGET_FACTOR * (dim + 3).pow(2),
        };
        Self {
            max_fun_evals,
            max_iterations: MAX_ITERATIONS,
        }
    }
}

/// Selects the optimizer a caller plugs in
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum OptimizerConfig {
    Cmaes(CmaesConfig),
    RandomPoint,
}

impl Default for OptimizerConfig {
    fn default() -> Self {
        OptimizerConfig::Cmaes(CmaesConfig::default())
    }
}

impl OptimizerConfig {
    /// Build the configured optimizer
    pub fn build(&self) -> AnyOptimizer {
        match self {
            OptimizerConfig::Cmaes(config) => AnyOptimizer::Cmaes(Cmaes::new(config.clone())),
            OptimizerConfig::RandomPoint => AnyOptimizer::RandomPoint(RandomPoint),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = CmaesConfig::default();
        assert_eq!(config.restarts, 1);
        assert_eq!(config.max_fun_evals, -1);
        assert_eq!(config.seed, None);
    }

    #[test]
    fn test_auto_budget() {
        let budget = SearchBudget::derive(&CmaesConfig::default(), 2);
        assert_eq!(budget.max_fun_evals, 22_500);
        assert_eq!(budget.max_iterations, MAX_ITERATIONS);

        let budget = SearchBudget::derive(&CmaesConfig::default(), 1);
        assert_eq!(budget.max_fun_evals, 14_400);
    }

    #[test]
    fn test_explicit_budget_overrides_formula() {
        let config = CmaesConfig::default().with_max_fun_evals(500);
        let budget = SearchBudget::derive(&config, 2);
        assert_eq!(budget.max_fun_evals, 500);
        assert_eq!(budget.max_iterations, MAX_ITERATIONS);

        let zero = CmaesConfig::default().with_max_fun_evals(0);
        assert_eq!(SearchBudget::derive(&zero, 5).max_fun_evals, 0);
    }

    #[test]
    fn test_any_negative_means_auto() {
        let config = CmaesConfig::default().with_max_fun_evals(-7);
        assert_eq!(SearchBudget::derive(&config, 2).max_fun_evals, 22_500);
    }

    #[test]
    fn test_deserialize_partial_config() {
        let config: OptimizerConfig =
            serde_json::from_str(r#"{ "type": "cmaes", "restarts": 3 }"#).unwrap();
        assert_eq!(
            config,
            OptimizerConfig::Cmaes(CmaesConfig {
                restarts: 3,
                max_fun_evals: -1,
                seed: None,
            })
        );

        let config: OptimizerConfig =
            serde_json::from_str(r#"{ "type": "random_point" }"#).unwrap();
        assert_eq!(config, OptimizerConfig::RandomPoint);
    }

    #[test]
    fn test_serialize_roundtrip() {
        let config = OptimizerConfig::Cmaes(CmaesConfig::default().with_seed(9));
        let json = serde_json::to_string(&config).unwrap();
        let back: OptimizerConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(back, config);
    }

    #[test]
    fn test_build() {
        assert!(matches!(
            OptimizerConfig::default().build(),
            AnyOptimizer::Cmaes(_)
        ));
        assert!(matches!(
            OptimizerConfig::RandomPoint.build(),
            AnyOptimizer::RandomPoint(_)
        ));
    }
}
