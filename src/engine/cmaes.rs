//! CMA-ES driver
//!
//! Runs one or more CMA-ES runs against a minimization function and keeps
//! the best candidate ever evaluated. With [`Algorithm::IpopCmaes`] every
//! restart doubles the population and re-seeds the mean inside the x0 range.
//!
//! [`Algorithm::IpopCmaes`]: crate::engine::parameters::Algorithm::IpopCmaes

use nalgebra::DVector;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing::{debug, info, trace};

#[cfg(feature = "parallel")]
use rayon::prelude::*;

use crate::engine::geno_pheno::GenoPheno;
use crate::engine::parameters::CmaParameters;
use crate::engine::solutions::{Candidate, CmaSolutions};
use crate::engine::state::CmaEsState;
use crate::engine::termination::{check_termination, Counters, RunHistory, StopCriterion};
use crate::error::{OptError, OptResult};

/// Minimize `f` with the given parameters
///
/// `f` is evaluated on phenotype points. It may be called from several
/// threads when `params.mt_feval()` is set.
pub fn cmaes<F, G>(f: F, params: &CmaParameters<G>) -> OptResult<CmaSolutions>
where
    F: Fn(&DVector<f64>) -> f64 + Sync,
    G: GenoPheno,
{
    params.validate()?;

    let seed = params.seed().unwrap_or_else(rand::random);
    let mut rng = StdRng::seed_from_u64(seed);
    let gp = params.geno_pheno();

    let mut counters = Counters::default();
    let mut best: Option<Candidate> = None;
    let mut reason = StopCriterion::MaxIter;
    let mut runs = 0;
    let mut lambda = params.lambda();

    for run in 0..params.max_runs() {
        let start = if run == 0 {
            params.x0().clone()
        } else {
            info!(run, lambda, "restarting CMA-ES with a larger population");
            reseed(params, &mut rng)
        };

        let mut state = CmaEsState::new(gp.geno(&start), params.sigma(), lambda);
        reason = run_once(&f, params, &mut state, &mut rng, &mut counters, &mut best)?;
        runs += 1;

        debug!(
            run,
            lambda,
            generations = state.generation,
            evaluations = counters.evaluations,
            %reason,
            "CMA-ES run finished"
        );

        if reason.ends_search() {
            break;
        }
        lambda *= 2;
    }

    let best_seen = best.ok_or(OptError::EmptyRun)?;
    Ok(CmaSolutions {
        best_seen,
        evaluations: counters.evaluations,
        iterations: counters.iterations,
        runs,
        reason,
    })
}

/// Mean for a restart: uniform in the x0 range, or x0 itself without one
fn reseed<G: GenoPheno>(params: &CmaParameters<G>, rng: &mut StdRng) -> DVector<f64> {
    match params.x0_range() {
        Some((low, high)) if low < high => {
            DVector::from_fn(params.dim(), |_, _| rng.gen_range(low..=high))
        }
        Some((low, _)) => DVector::from_element(params.dim(), low),
        None => params.x0().clone(),
    }
}

fn run_once<F, G>(
    f: &F,
    params: &CmaParameters<G>,
    state: &mut CmaEsState,
    rng: &mut StdRng,
    counters: &mut Counters,
    best: &mut Option<Candidate>,
) -> OptResult<StopCriterion>
where
    F: Fn(&DVector<f64>) -> f64 + Sync,
    G: GenoPheno,
{
    let mut history = RunHistory::new(state.dimension, state.lambda);

    loop {
        let offspring = state.sample_population(rng);
        let values = evaluate(f, params.geno_pheno(), &offspring, params.mt_feval());

        counters.evaluations += offspring.len();
        counters.iterations += 1;

        let mut ranked: Vec<(DVector<f64>, f64)> = offspring.into_iter().zip(values).collect();
        ranked.sort_by(|a, b| rank_value(a.1).total_cmp(&rank_value(b.1)));

        if let Some((x, value)) = ranked.first() {
            let improved = best
                .as_ref()
                .map_or(true, |b| rank_value(*value) < rank_value(b.f_value()));
            if improved {
                *best = Some(Candidate::new(x.clone(), *value));
            }
        }

        let ranked_values: Vec<f64> = ranked.iter().map(|(_, v)| *v).collect();
        history.record(&ranked_values);

        state.update(&ranked)?;

        trace!(
            generation = state.generation,
            sigma = state.sigma,
            best = ranked_values[0],
            "CMA-ES generation"
        );

        let best_value = best.as_ref().map_or(f64::INFINITY, Candidate::f_value);
        if let Some(reason) = check_termination(params, state, counters, &history, best_value) {
            return Ok(reason);
        }
    }
}

/// Ranking key: NaN sorts after every other value
fn rank_value(v: f64) -> f64 {
    if v.is_nan() {
        f64::INFINITY
    } else {
        v
    }
}

#[cfg(feature = "parallel")]
fn evaluate<F, G>(f: &F, gp: &G, offspring: &[DVector<f64>], mt_feval: bool) -> Vec<f64>
where
    F: Fn(&DVector<f64>) -> f64 + Sync,
    G: GenoPheno,
{
    if mt_feval {
        offspring.par_iter().map(|x| f(&gp.pheno(x))).collect()
    } else {
        offspring.iter().map(|x| f(&gp.pheno(x))).collect()
    }
}

/// Sequential fallback when the `parallel` feature is disabled
#[cfg(not(feature = "parallel"))]
fn evaluate<F, G>(f: &F, gp: &G, offspring: &[DVector<f64>], _mt_feval: bool) -> Vec<f64>
where
    F: Fn(&DVector<f64>) -> f64 + Sync,
    G: GenoPheno,
{
    offspring.iter().map(|x| f(&gp.pheno(x))).collect()
}
