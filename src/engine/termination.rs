//! Stopping criteria
//!
//! Every criterion can be switched off individually through
//! [`CmaParameters::set_stopping_criterion`]. Budget criteria end the whole
//! search; the others only end the current run, after which a restart
//! strategy may launch another one.
//!
//! [`CmaParameters::set_stopping_criterion`]: crate::engine::parameters::CmaParameters::set_stopping_criterion

use std::collections::VecDeque;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::engine::parameters::CmaParameters;
use crate::engine::state::CmaEsState;

/// Tolerance on the range of recent best values
pub const TOL_HIST_FUN: f64 = 1e-12;
/// Tolerance on the standard deviations and evolution path
pub const TOL_X: f64 = 1e-12;
/// Maximum growth of σ relative to its initial value
pub const TOL_UP_SIGMA: f64 = 1e20;
/// Maximum condition number of the covariance matrix
pub const MAX_CONDITION_COV: f64 = 1e14;

/// Reasons for the engine to stop
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum StopCriterion {
    /// Function evaluation budget exhausted
    MaxFunEvals,
    /// Iteration cap reached
    MaxIter,
    /// Best value reached the configured target
    FunTarget,
    /// Best values of recent generations are all within [`TOL_HIST_FUN`]
    TolHistFun,
    /// The best and k-th best values coincide too often
    EqualFunVals,
    /// All standard deviations and the evolution path are below [`TOL_X`]
    TolX,
    /// σ grew by more than [`TOL_UP_SIGMA`]
    TolUpSigma,
    /// Condition number of C above [`MAX_CONDITION_COV`]
    ConditionCov,
    /// A step along a principal axis does not change the mean
    NoEffectAxis,
    /// A step along a coordinate does not change the mean
    NoEffectCoor,
}

impl StopCriterion {
    /// All criteria, in the order they are checked
    pub const ALL: [StopCriterion; 10] = [
        StopCriterion::MaxFunEvals,
        StopCriterion::MaxIter,
        StopCriterion::FunTarget,
        StopCriterion::TolHistFun,
        StopCriterion::EqualFunVals,
        StopCriterion::TolX,
        StopCriterion::TolUpSigma,
        StopCriterion::ConditionCov,
        StopCriterion::NoEffectAxis,
        StopCriterion::NoEffectCoor,
    ];

    /// Whether this criterion exhausts the global budget (no restart follows)
    pub fn ends_search(&self) -> bool {
        matches!(
            self,
            StopCriterion::MaxFunEvals | StopCriterion::MaxIter | StopCriterion::FunTarget
        )
    }

    /// Human-readable description
    pub fn reason(&self) -> &'static str {
        match self {
            StopCriterion::MaxFunEvals => "Maximum function evaluations reached",
            StopCriterion::MaxIter => "Maximum iterations reached",
            StopCriterion::FunTarget => "Target function value reached",
            StopCriterion::TolHistFun => "Function value history stagnated",
            StopCriterion::EqualFunVals => "Too many equal function values",
            StopCriterion::TolX => "Search distribution collapsed",
            StopCriterion::TolUpSigma => "Step size diverged",
            StopCriterion::ConditionCov => "Covariance matrix ill-conditioned",
            StopCriterion::NoEffectAxis => "No effect along principal axis",
            StopCriterion::NoEffectCoor => "No effect along coordinate",
        }
    }
}

impl fmt::Display for StopCriterion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.reason())
    }
}

/// Global counters shared by all runs of one search
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Counters {
    /// Function evaluations so far
    pub evaluations: usize,
    /// Generations so far
    pub iterations: usize,
}

/// Per-run history used by the stagnation criteria
#[derive(Clone, Debug)]
pub struct RunHistory {
    window: usize,
    best_values: VecDeque<f64>,
    equal_values: VecDeque<bool>,
}

impl RunHistory {
    /// History sized for the given dimension and population size
    pub fn new(dimension: usize, lambda: usize) -> Self {
        let window = 10 + (30.0 * dimension as f64 / lambda as f64).ceil() as usize;
        Self {
            window,
            best_values: VecDeque::with_capacity(window),
            equal_values: VecDeque::with_capacity(window),
        }
    }

    /// Number of generations kept
    pub fn window(&self) -> usize {
        self.window
    }

    /// Record one ranked generation (best first)
    pub fn record(&mut self, ranked_values: &[f64]) {
        let Some(&best) = ranked_values.first() else {
            return;
        };
        let k = ((0.1 + ranked_values.len() as f64 / 4.0).ceil() as usize)
            .min(ranked_values.len() - 1);

        if self.best_values.len() == self.window {
            self.best_values.pop_front();
            self.equal_values.pop_front();
        }
        self.best_values.push_back(best);
        self.equal_values.push_back(best == ranked_values[k]);
    }

    fn is_full(&self) -> bool {
        self.best_values.len() >= self.window
    }

    fn best_range(&self) -> f64 {
        let max = self
            .best_values
            .iter()
            .cloned()
            .fold(f64::NEG_INFINITY, f64::max);
        let min = self.best_values.iter().cloned().fold(f64::INFINITY, f64::min);
        max - min
    }

    fn equal_count(&self) -> usize {
        self.equal_values.iter().filter(|&&eq| eq).count()
    }
}

/// Check all enabled criteria, returning the first that fires
pub fn check_termination<G>(
    params: &CmaParameters<G>,
    state: &CmaEsState,
    counters: &Counters,
    history: &RunHistory,
    best_value: f64,
) -> Option<StopCriterion> {
    StopCriterion::ALL
        .into_iter()
        .filter(|&c| params.is_stopping_criterion_enabled(c))
        .find(|&c| criterion_met(c, params, state, counters, history, best_value))
}

fn criterion_met<G>(
    criterion: StopCriterion,
    params: &CmaParameters<G>,
    state: &CmaEsState,
    counters: &Counters,
    history: &RunHistory,
    best_value: f64,
) -> bool {
    match criterion {
        StopCriterion::MaxFunEvals => params
            .max_fevals()
            .map_or(false, |max| counters.evaluations >= max),
        StopCriterion::MaxIter => params
            .max_iter()
            .map_or(false, |max| counters.iterations >= max),
        StopCriterion::FunTarget => params
            .ftarget()
            .map_or(false, |target| best_value <= target),
        StopCriterion::TolHistFun => history.is_full() && history.best_range() < TOL_HIST_FUN,
        StopCriterion::EqualFunVals => {
            history.is_full() && 3 * history.equal_count() > history.window()
        }
        StopCriterion::TolX => {
            let diag_small = state
                .covariance
                .diagonal()
                .iter()
                .all(|&c| state.sigma * c.max(0.0).sqrt() < TOL_X);
            let path_small = state.path_c.iter().all(|&p| state.sigma * p.abs() < TOL_X);
            diag_small && path_small
        }
        StopCriterion::TolUpSigma => {
            state.sigma / params.sigma() > TOL_UP_SIGMA * state.max_eigenvalue().sqrt()
        }
        StopCriterion::ConditionCov => {
            state.max_eigenvalue() / state.min_eigenvalue().max(1e-300) > MAX_CONDITION_COV
        }
        StopCriterion::NoEffectAxis => {
            let i = state.generation % state.dimension;
            let step = state.eigenvectors.column(i)
                * (0.1 * state.sigma * state.eigenvalues[i].sqrt());
            state
                .mean
                .iter()
                .zip(step.iter())
                .all(|(&m, &s)| m + s == m)
        }
        StopCriterion::NoEffectCoor => state
            .mean
            .iter()
            .zip(state.covariance.diagonal().iter())
            .any(|(&m, &c)| m + 0.2 * state.sigma * c.max(0.0).sqrt() == m),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use nalgebra::DVector;

    fn params(dim: usize) -> CmaParameters {
        CmaParameters::new(DVector::zeros(dim), 0.5)
    }

    fn state(dim: usize) -> CmaEsState {
        CmaEsState::new(DVector::zeros(dim), 0.5, 6)
    }

    #[test]
    fn test_fresh_run_does_not_stop() {
        let p = params(2);
        let s = state(2);
        let history = RunHistory::new(2, 6);
        assert_eq!(
            check_termination(&p, &s, &Counters::default(), &history, 1.0),
            None
        );
    }

    #[test]
    fn test_max_fun_evals() {
        let mut p = params(2);
        p.set_max_fevals(100);
        let s = state(2);
        let history = RunHistory::new(2, 6);

        let counters = Counters {
            evaluations: 99,
            iterations: 10,
        };
        assert_eq!(check_termination(&p, &s, &counters, &history, 1.0), None);

        let counters = Counters {
            evaluations: 100,
            iterations: 10,
        };
        assert_eq!(
            check_termination(&p, &s, &counters, &history, 1.0),
            Some(StopCriterion::MaxFunEvals)
        );
    }

    #[test]
    fn test_max_iter() {
        let mut p = params(2);
        p.set_max_iter(5);
        let s = state(2);
        let history = RunHistory::new(2, 6);
        let counters = Counters {
            evaluations: 30,
            iterations: 5,
        };
        assert_eq!(
            check_termination(&p, &s, &counters, &history, 1.0),
            Some(StopCriterion::MaxIter)
        );
    }

    #[test]
    fn test_fun_target_can_be_disabled() {
        let mut p = params(2);
        p.set_ftarget(0.0);
        let s = state(2);
        let history = RunHistory::new(2, 6);
        let counters = Counters::default();

        assert_eq!(
            check_termination(&p, &s, &counters, &history, -1.0),
            Some(StopCriterion::FunTarget)
        );

        p.set_stopping_criterion(StopCriterion::FunTarget, false);
        assert_eq!(check_termination(&p, &s, &counters, &history, -1.0), None);
    }

    #[test]
    fn test_tol_hist_fun_needs_full_window() {
        let p = params(2);
        let s = state(2);
        let mut history = RunHistory::new(2, 6);
        let counters = Counters::default();

        for _ in 0..history.window() - 1 {
            history.record(&[1.0, 2.0, 3.0, 4.0, 5.0, 6.0]);
        }
        assert_eq!(check_termination(&p, &s, &counters, &history, 1.0), None);

        history.record(&[1.0, 2.0, 3.0, 4.0, 5.0, 6.0]);
        assert_eq!(
            check_termination(&p, &s, &counters, &history, 1.0),
            Some(StopCriterion::TolHistFun)
        );
    }

    #[test]
    fn test_equal_fun_vals() {
        let mut p = params(2);
        p.set_stopping_criterion(StopCriterion::TolHistFun, false);
        let s = state(2);
        let mut history = RunHistory::new(2, 6);

        for i in 0..history.window() {
            history.record(&[i as f64, i as f64, i as f64, 4.0, 5.0, 6.0]);
        }
        assert_eq!(
            check_termination(&p, &s, &Counters::default(), &history, 0.0),
            Some(StopCriterion::EqualFunVals)
        );
    }

    #[test]
    fn test_condition_cov() {
        let p = params(2);
        let mut s = state(2);
        s.eigenvalues = DVector::from_vec(vec![1e15, 1.0]);
        assert_eq!(
            check_termination(&p, &s, &Counters::default(), &RunHistory::new(2, 6), 1.0),
            Some(StopCriterion::ConditionCov)
        );
    }

    #[test]
    fn test_tol_x() {
        let p = params(2);
        let mut s = state(2);
        s.sigma = 1e-20;
        assert_eq!(
            check_termination(&p, &s, &Counters::default(), &RunHistory::new(2, 6), 1.0),
            Some(StopCriterion::TolX)
        );
    }

    #[test]
    fn test_budget_criteria_end_search() {
        assert!(StopCriterion::MaxFunEvals.ends_search());
        assert!(StopCriterion::MaxIter.ends_search());
        assert!(!StopCriterion::TolX.ends_search());
        assert_eq!(
            StopCriterion::MaxIter.to_string(),
            "Maximum iterations reached"
        );
    }
}
