//! CMA-ES state
//!
//! Mean, step size, covariance and evolution paths of one run, plus the
//! strategy constants derived from the dimension and population size.
//!
//! Reference: Hansen, N., & Ostermeier, A. (2001). Completely Derandomized
//! Self-Adaptation in Evolution Strategies. Evolutionary Computation, 9(2).

use nalgebra::{DMatrix, DVector, SymmetricEigen};
use rand::Rng;
use rand_distr::StandardNormal;

use crate::error::{OptError, OptResult};

/// Smallest eigenvalue kept after a decomposition
const MIN_EIGENVALUE: f64 = 1e-16;

/// State of one CMA-ES run
#[derive(Clone, Debug)]
pub struct CmaEsState {
    /// Current mean of the search distribution
    pub mean: DVector<f64>,

    /// Global step size (σ)
    pub sigma: f64,

    /// Covariance matrix C
    pub covariance: DMatrix<f64>,

    /// Evolution path for σ adaptation (p_σ)
    pub path_sigma: DVector<f64>,

    /// Evolution path for C adaptation (p_c)
    pub path_c: DVector<f64>,

    /// Eigenvalues of C (D²)
    pub eigenvalues: DVector<f64>,

    /// Eigenvectors of C (B), one per column
    pub eigenvectors: DMatrix<f64>,

    /// Generation of the last eigendecomposition
    pub eigen_eval: usize,

    /// Problem dimension
    pub dimension: usize,

    /// Population size (λ)
    pub lambda: usize,

    /// Parent number (μ)
    pub mu: usize,

    /// Recombination weights
    pub weights: Vec<f64>,

    /// Variance effective selection mass (μ_eff)
    pub mu_eff: f64,

    /// Learning rate for rank-1 update
    pub c_1: f64,

    /// Learning rate for rank-μ update
    pub c_mu: f64,

    /// Learning rate for cumulation for σ control
    pub c_sigma: f64,

    /// Damping for σ
    pub d_sigma: f64,

    /// Learning rate for cumulation for C
    pub c_c: f64,

    /// Expected length of random vector ||N(0, I)||
    pub chi_n: f64,

    /// Generations completed in this run
    pub generation: usize,
}

impl CmaEsState {
    /// Create a new state around `initial_mean` (genotype coordinates)
    pub fn new(initial_mean: DVector<f64>, initial_sigma: f64, lambda: usize) -> Self {
        let n = initial_mean.len();
        let nf = n as f64;
        let mu = (lambda / 2).max(1);

        // Recombination weights (log-linear)
        let mut weights: Vec<f64> = (0..mu)
            .map(|i| ((lambda as f64 + 1.0) / 2.0).ln() - ((i + 1) as f64).ln())
            .collect();
        let weight_sum: f64 = weights.iter().sum();
        for w in &mut weights {
            *w /= weight_sum;
        }

        let mu_eff = 1.0 / weights.iter().map(|w| w * w).sum::<f64>();

        // Time constants for cumulation
        let c_sigma = (mu_eff + 2.0) / (nf + mu_eff + 5.0);
        let c_c = (4.0 + mu_eff / nf) / (nf + 4.0 + 2.0 * mu_eff / nf);

        // Learning rates for covariance matrix update
        let c_1 = 2.0 / ((nf + 1.3).powi(2) + mu_eff);
        let alpha_mu = 2.0;
        let c_mu = (alpha_mu * (mu_eff - 2.0 + 1.0 / mu_eff))
            / ((nf + 2.0).powi(2) + alpha_mu * mu_eff / 2.0);
        let c_mu = c_mu.min(1.0 - c_1).max(0.0);

        let d_sigma = 1.0 + 2.0 * (0.0_f64.max(((mu_eff - 1.0) / (nf + 1.0)).sqrt() - 1.0)) + c_sigma;

        let chi_n = nf.sqrt() * (1.0 - 1.0 / (4.0 * nf) + 1.0 / (21.0 * nf.powi(2)));

        Self {
            mean: initial_mean,
            sigma: initial_sigma,
            covariance: DMatrix::identity(n, n),
            path_sigma: DVector::zeros(n),
            path_c: DVector::zeros(n),
            eigenvalues: DVector::from_element(n, 1.0),
            eigenvectors: DMatrix::identity(n, n),
            eigen_eval: 0,
            dimension: n,
            lambda,
            mu,
            weights,
            mu_eff,
            c_1,
            c_mu,
            c_sigma,
            d_sigma,
            c_c,
            chi_n,
            generation: 0,
        }
    }

    /// Sample λ offspring from N(m, σ²C)
    pub fn sample_population<R: Rng>(&self, rng: &mut R) -> Vec<DVector<f64>> {
        let n = self.dimension;
        let scale = self.eigenvalues.map(f64::sqrt);

        (0..self.lambda)
            .map(|_| {
                let z = DVector::<f64>::from_fn(n, |_, _| rng.sample(StandardNormal));
                // y = B * D * z
                let y = &self.eigenvectors * z.component_mul(&scale);
                &self.mean + y * self.sigma
            })
            .collect()
    }

    /// Update the state from a generation ranked best first
    pub fn update(&mut self, ranked: &[(DVector<f64>, f64)]) -> OptResult<()> {
        let n = self.dimension;
        let nf = n as f64;

        // Steps of the μ best, y_k = (x_k - m_old) / σ
        let steps: Vec<DVector<f64>> = ranked
            .iter()
            .take(self.mu)
            .map(|(x, _)| (x - &self.mean) / self.sigma)
            .collect();

        let mut y_w = DVector::<f64>::zeros(n);
        for (w, y) in self.weights.iter().zip(&steps) {
            y_w += y * *w;
        }

        // C^(-1/2) * y_w = B * D^-1 * B^T * y_w
        let inv_d = self
            .eigenvalues
            .map(|ev| 1.0 / ev.sqrt().max(MIN_EIGENVALUE));
        let c_inv_sqrt_yw =
            &self.eigenvectors * (self.eigenvectors.transpose() * &y_w).component_mul(&inv_d);

        let c_sigma_factor = (self.c_sigma * (2.0 - self.c_sigma) * self.mu_eff).sqrt();
        self.path_sigma = &self.path_sigma * (1.0 - self.c_sigma) + c_inv_sqrt_yw * c_sigma_factor;
        let path_sigma_norm = self.path_sigma.norm();

        // Heaviside function for stall detection
        let h_sigma = if path_sigma_norm
            / (1.0 - (1.0 - self.c_sigma).powi((2 * (self.generation + 1)) as i32)).sqrt()
            / self.chi_n
            < 1.4 + 2.0 / (nf + 1.0)
        {
            1.0
        } else {
            0.0
        };

        let c_c_factor = (self.c_c * (2.0 - self.c_c) * self.mu_eff).sqrt();
        self.path_c = &self.path_c * (1.0 - self.c_c) + &y_w * (h_sigma * c_c_factor);

        let delta_h = (1.0 - h_sigma) * self.c_c * (2.0 - self.c_c);

        let mut rank_mu = DMatrix::<f64>::zeros(n, n);
        for (w, y) in self.weights.iter().zip(&steps) {
            rank_mu += (y * y.transpose()) * *w;
        }
        let rank_one = &self.path_c * self.path_c.transpose();

        self.covariance = &self.covariance * (1.0 - self.c_1 - self.c_mu + delta_h * self.c_1)
            + rank_one * self.c_1
            + rank_mu * self.c_mu;

        self.mean += &y_w * self.sigma;

        self.sigma *= ((self.c_sigma / self.d_sigma) * (path_sigma_norm / self.chi_n - 1.0)).exp();
        if !self.sigma.is_finite() || self.sigma <= 0.0 {
            return Err(OptError::Numerical(format!(
                "step size became {} at generation {}",
                self.sigma, self.generation
            )));
        }

        self.generation += 1;

        // The decomposition is O(n³); refresh it only every few generations
        let gap = (self.lambda as f64 / (self.c_1 + self.c_mu) / nf / 10.0) as usize;
        if self.generation - self.eigen_eval > gap {
            self.update_eigensystem()?;
            self.eigen_eval = self.generation;
        }

        Ok(())
    }

    /// Recompute B and D² from C
    pub fn update_eigensystem(&mut self) -> OptResult<()> {
        let symmetric = (&self.covariance + self.covariance.transpose()) * 0.5;
        if symmetric.iter().any(|v| !v.is_finite()) {
            return Err(OptError::Numerical(format!(
                "covariance matrix has non-finite entries at generation {}",
                self.generation
            )));
        }

        let eigen = SymmetricEigen::try_new(symmetric.clone(), f64::EPSILON, 10_000).ok_or_else(
            || OptError::Numerical("eigendecomposition of C did not converge".to_string()),
        )?;

        self.covariance = symmetric;
        self.eigenvalues = eigen.eigenvalues.map(|ev| ev.max(MIN_EIGENVALUE));
        self.eigenvectors = eigen.eigenvectors;
        Ok(())
    }

    /// Largest eigenvalue of C
    pub fn max_eigenvalue(&self) -> f64 {
        self.eigenvalues
            .iter()
            .cloned()
            .fold(f64::NEG_INFINITY, f64::max)
    }

    /// Smallest eigenvalue of C
    pub fn min_eigenvalue(&self) -> f64 {
        self.eigenvalues.iter().cloned().fold(f64::INFINITY, f64::min)
    }
}
